//! End-to-end query: place → coordinates → hourly records → cards and
//! suggestions.

use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    api::ParadeApi,
    card::CardViewState,
    error::{ParadeError, ParadeResult},
    model::{Coordinates, EventQuery, EventType, HourlyWeatherRecord, RecordId},
    risk::RiskCalculator,
    suggest::derive_suggestions,
};

/// Everything one submission produces. Rebuilt from scratch per query.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsView {
    pub location: String,
    pub coordinates: Coordinates,
    pub event: EventType,
    pub event_time: DateTime<Utc>,
    /// One card per hourly record, oldest first.
    pub cards: Vec<CardViewState>,
    pub selected: Option<RecordId>,
    /// Empty when no record matches the selected hour.
    pub suggestions: Vec<String>,
    pub notice: Option<String>,
}

impl ResultsView {
    pub fn selected_card(&self) -> Option<&CardViewState> {
        let id = self.selected?;
        self.cards.iter().find(|card| card.id() == id)
    }
}

#[derive(Debug)]
pub struct ResultsAssembler<A> {
    api: A,
    calculator: RiskCalculator,
    in_flight: Mutex<()>,
}

impl<A: ParadeApi> ResultsAssembler<A> {
    pub fn new(api: A, calculator: RiskCalculator) -> Self {
        Self { api, calculator, in_flight: Mutex::new(()) }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Run one query. A second call while one is pending fails with
    /// `QueryInFlight` instead of racing it.
    pub async fn assemble(&self, query: &EventQuery) -> ParadeResult<ResultsView> {
        let _guard = self.in_flight.try_lock().map_err(|_| ParadeError::QueryInFlight)?;

        info!(location = %query.location, at = %query.at, event = %query.event, "checking weather");

        let coordinates = self.api.coordinates(&query.location).await.map_err(|err| {
            warn!(location = %query.location, error = %format!("{err:#}"), "location lookup failed");
            ParadeError::LocationNotFound {
                location: query.location.clone(),
                reason: format!("{err:#}"),
            }
        })?;

        let mut records =
            self.api.hourly_weather(coordinates, query.date()).await.map_err(|err| {
                warn!(%coordinates, date = %query.date(), error = %format!("{err:#}"), "weather fetch failed");
                ParadeError::WeatherFetch(format!("{err:#}"))
            })?;

        sort_by_time(&mut records);

        let hour = query.selected_hour();
        let selected = find_hour(&records, query.at);

        let cards: Vec<CardViewState> = records
            .into_iter()
            .map(|record| self.card_state(record, selected))
            .collect();

        let (suggestions, notice) =
            match selected.and_then(|id| cards.iter().find(|card| card.id() == id)) {
                Some(card) => (derive_suggestions(&card.assessment.details, &query.event), None),
                None => {
                    let err = ParadeError::NoDataForHour { hour };
                    warn!(hour, cards = cards.len(), "no record for the selected hour");
                    (Vec::new(), Some(err.to_string()))
                }
            };

        info!(cards = cards.len(), suggestions = suggestions.len(), "weather check complete");

        Ok(ResultsView {
            location: query.location.clone(),
            coordinates,
            event: query.event.clone(),
            event_time: query.at,
            cards,
            selected,
            suggestions,
            notice,
        })
    }

    fn card_state(&self, record: HourlyWeatherRecord, selected: Option<RecordId>) -> CardViewState {
        let assessment = record
            .risk_assessment
            .clone()
            .unwrap_or_else(|| self.calculator.assess_record(&record));

        let condition = record
            .condition
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| self.calculator.classify_record(&record).to_string());

        CardViewState {
            is_selected_hour: selected == Some(record.id()),
            record,
            assessment,
            condition,
        }
    }
}

/// Ascending by timestamp; stable.
pub fn sort_by_time(records: &mut [HourlyWeatherRecord]) {
    records.sort_by_key(|record| record.time);
}

/// First record in the same UTC date and hour as `at`.
pub fn find_hour(records: &[HourlyWeatherRecord], at: DateTime<Utc>) -> Option<RecordId> {
    records
        .iter()
        .find(|record| {
            record.time.date_naive() == at.date_naive() && record.time.hour() == at.hour()
        })
        .map(HourlyWeatherRecord::id)
}
