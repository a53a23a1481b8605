#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use parade_core::{
    Coordinates, HourlyWeatherRecord, LocationSuggestion, ParadeApi, RiskAssessment, RiskDetails,
    RiskTier, model::MetricRisk,
};
use tokio::sync::Notify;

/// In-memory stand-in for a data source.
#[derive(Debug, Default)]
pub struct FakeApi {
    pub coordinates: Option<Coordinates>,
    pub records: Vec<HourlyWeatherRecord>,
    pub weather_error: Option<String>,
    pub places: Vec<String>,
    pub searches: AtomicUsize,
    pub search_queries: Mutex<Vec<String>>,
    /// When set, `coordinates` waits for a notification before answering.
    pub hold: Option<Arc<Notify>>,
    /// Notified as soon as `coordinates` is called.
    pub entered: Option<Arc<Notify>>,
}

impl FakeApi {
    pub fn with_records(records: Vec<HourlyWeatherRecord>) -> Self {
        Self {
            coordinates: Some(Coordinates { lat: 48.8566, lon: 2.3522 }),
            records,
            ..Self::default()
        }
    }

    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ParadeApi for FakeApi {
    async fn coordinates(&self, place_name: &str) -> Result<Coordinates> {
        if let Some(entered) = &self.entered {
            entered.notify_one();
        }
        if let Some(hold) = &self.hold {
            hold.notified().await;
        }
        self.coordinates.ok_or_else(|| anyhow!("Location '{place_name}' not found"))
    }

    async fn search_locations(&self, query: &str) -> Result<Vec<LocationSuggestion>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.search_queries.lock().unwrap().push(query.to_string());
        Ok(self
            .places
            .iter()
            .filter(|p| p.to_lowercase().starts_with(&query.to_lowercase()))
            .map(|p| LocationSuggestion { place_name: p.clone() })
            .collect())
    }

    async fn hourly_weather(
        &self,
        _coordinates: Coordinates,
        _date: NaiveDate,
    ) -> Result<Vec<HourlyWeatherRecord>> {
        match &self.weather_error {
            Some(err) => Err(anyhow!("Backend hourly weather request failed with status 500: {err}")),
            None => Ok(self.records.clone()),
        }
    }
}

pub fn metric(risk: RiskTier, value: f64) -> Option<MetricRisk> {
    Some(MetricRisk { risk, value, message: format!("{risk} risk") })
}

pub fn record(hour: u32, details: RiskDetails) -> HourlyWeatherRecord {
    let overall_risk = details.iter().map(|(_, m)| m.risk).max().unwrap_or_default();
    HourlyWeatherRecord {
        time: Utc.with_ymd_and_hms(2024, 7, 1, hour, 0, 0).unwrap(),
        temperature: details.temperature.as_ref().map_or(20.0, |m| m.value),
        precipitation: details.precipitation.as_ref().map_or(0.0, |m| m.value),
        wind_speed: details.wind.as_ref().map_or(2.0, |m| m.value),
        humidity: details.humidity.as_ref().map(|m| m.value),
        condition: Some("Clear".to_string()),
        risk_assessment: Some(RiskAssessment {
            overall_risk,
            details,
            summary: "test summary".to_string(),
        }),
        source: Some("forecast".to_string()),
    }
}

pub fn calm(hour: u32) -> HourlyWeatherRecord {
    record(
        hour,
        RiskDetails {
            temperature: metric(RiskTier::Low, 21.0),
            precipitation: metric(RiskTier::Low, 0.0),
            wind: metric(RiskTier::Low, 2.0),
            humidity: metric(RiskTier::Low, 50.0),
        },
    )
}
