use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    model::{Coordinates, HourlyWeatherRecord, LocationSuggestion, parse_timestamp},
    risk::{RiskCalculator, Thresholds},
};

use super::{ParadeApi, truncate_body};

const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";
const OPEN_METEO_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const OPEN_METEO_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
/// The reanalysis archive trails real time by about this many days.
const ARCHIVE_LAG_DAYS: u64 = 5;
const HOURLY_FIELDS: &str = "temperature_2m,precipitation,relative_humidity_2m,windspeed_10m";
const SEARCH_LIMIT: usize = 5;

/// Talks to public services directly: Nominatim for places, Open-Meteo for
/// hourly data. Risk and condition are computed locally.
#[derive(Debug, Clone)]
pub struct OpenMeteoApi {
    http: Client,
    calculator: RiskCalculator,
}

impl OpenMeteoApi {
    pub fn new(thresholds: Thresholds) -> Result<Self> {
        // Nominatim rejects requests without a User-Agent.
        let http = Client::builder()
            .user_agent(concat!("parade-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client for Open-Meteo")?;

        Ok(Self { http, calculator: RiskCalculator::new(thresholds) })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T> {
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {what}"))?;

        let status = res.status();
        let body =
            res.text().await.with_context(|| format!("Failed to read {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "{what} request failed with status {status}: {}",
                truncate_body(&body)
            ));
        }

        serde_json::from_str(&body).with_context(|| format!("Failed to parse {what} JSON"))
    }

    async fn places(&self, query: &str, limit: usize) -> Result<Vec<NominatimPlace>> {
        self.get_json(
            NOMINATIM_SEARCH_URL,
            &[("q", query.to_string()), ("format", "json".into()), ("limit", limit.to_string())],
            "Nominatim search",
        )
        .await
    }
}

/// Which Open-Meteo dataset serves a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HourlyFeed {
    Forecast,
    Archive,
}

impl HourlyFeed {
    /// Days older than the archive lag come from the archive; everything
    /// newer, including recent past days, from the forecast API.
    fn for_date(date: NaiveDate, today: NaiveDate) -> Self {
        match today.checked_sub_days(Days::new(ARCHIVE_LAG_DAYS)) {
            Some(cutoff) if date < cutoff => HourlyFeed::Archive,
            _ => HourlyFeed::Forecast,
        }
    }

    fn url(self) -> &'static str {
        match self {
            HourlyFeed::Forecast => OPEN_METEO_FORECAST_URL,
            HourlyFeed::Archive => OPEN_METEO_ARCHIVE_URL,
        }
    }

    /// Value stored in `HourlyWeatherRecord::source`.
    fn source(self) -> &'static str {
        match self {
            HourlyFeed::Forecast => "forecast",
            HourlyFeed::Archive => "archive",
        }
    }

    fn label(self) -> &'static str {
        match self {
            HourlyFeed::Forecast => "Open-Meteo forecast",
            HourlyFeed::Archive => "Open-Meteo archive",
        }
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

impl NominatimPlace {
    fn coordinates(&self) -> Result<Coordinates> {
        let lat = self.lat.parse().with_context(|| format!("Invalid latitude '{}'", self.lat))?;
        let lon = self.lon.parse().with_context(|| format!("Invalid longitude '{}'", self.lon))?;
        Ok(Coordinates { lat, lon })
    }
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    hourly: OmHourly,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OmHourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    precipitation: Vec<Option<f64>>,
    relative_humidity_2m: Vec<Option<f64>>,
    windspeed_10m: Vec<Option<f64>>,
}

fn records_from_hourly(
    hourly: &OmHourly,
    date: NaiveDate,
    feed: HourlyFeed,
    calculator: &RiskCalculator,
) -> Vec<HourlyWeatherRecord> {
    fn at(series: &[Option<f64>], i: usize) -> Option<f64> {
        series.get(i).copied().flatten()
    }

    hourly
        .time
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| {
            let Some(time) = parse_timestamp(raw) else {
                warn!(time = %raw, "skipping Open-Meteo hour with unreadable time");
                return None;
            };
            if time.date_naive() != date {
                return None;
            }
            // An hour without temperature carries no usable data.
            let temperature = at(&hourly.temperature_2m, i)?;
            let precipitation = at(&hourly.precipitation, i).unwrap_or(0.0);
            let wind_speed = at(&hourly.windspeed_10m, i).unwrap_or(0.0);
            let humidity = at(&hourly.relative_humidity_2m, i);

            let assessment = calculator.assess(temperature, precipitation, wind_speed, humidity);
            let condition =
                calculator.classify_condition(temperature, precipitation, wind_speed, humidity);

            Some(HourlyWeatherRecord {
                time,
                temperature,
                precipitation,
                wind_speed,
                humidity,
                condition: Some(condition.to_string()),
                risk_assessment: Some(assessment),
                source: Some(feed.source().to_string()),
            })
        })
        .collect()
}

#[async_trait]
impl ParadeApi for OpenMeteoApi {
    async fn coordinates(&self, place_name: &str) -> Result<Coordinates> {
        let places = self.places(place_name, 1).await?;
        let place = places
            .first()
            .ok_or_else(|| anyhow!("No place matches '{place_name}'"))?;

        debug!(place = %place.display_name, "resolved place");
        place.coordinates()
    }

    async fn search_locations(&self, query: &str) -> Result<Vec<LocationSuggestion>> {
        let places = self.places(query, SEARCH_LIMIT).await?;
        Ok(places
            .into_iter()
            .map(|p| LocationSuggestion { place_name: p.display_name })
            .collect())
    }

    async fn hourly_weather(
        &self,
        coordinates: Coordinates,
        date: NaiveDate,
    ) -> Result<Vec<HourlyWeatherRecord>> {
        let day = date.format("%Y-%m-%d").to_string();
        let feed = HourlyFeed::for_date(date, Utc::now().date_naive());
        debug!(%coordinates, %day, feed = feed.source(), "fetching Open-Meteo hourly data");

        let parsed: OmResponse = self
            .get_json(
                feed.url(),
                &[
                    ("latitude", coordinates.lat.to_string()),
                    ("longitude", coordinates.lon.to_string()),
                    ("start_date", day.clone()),
                    ("end_date", day),
                    ("hourly", HOURLY_FIELDS.to_string()),
                    ("windspeed_unit", "ms".to_string()),
                    ("timezone", "GMT".to_string()),
                ],
                feed.label(),
            )
            .await?;

        Ok(records_from_hourly(&parsed.hourly, date, feed, &self.calculator))
    }
}
