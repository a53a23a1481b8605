use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::model::{Coordinates, HourlyWeatherRecord, LocationSuggestion};

use super::{ParadeApi, truncate_body};

/// Client for the parade backend's JSON API.
#[derive(Debug, Clone)]
pub struct BackendApi {
    base_url: String,
    http: Client,
}

impl BackendApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("parade-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client for the parade backend")?;

        Ok(Self { base_url: base_url.into(), http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct CoordinatesRequest<'a> {
    place_name: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CoordinatesPayload {
    Found(Coordinates),
    Failed { error: String },
}

#[derive(Debug, Deserialize)]
struct HourlyPayload {
    #[serde(default)]
    hourly_data: Vec<HourlyWeatherRecord>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: String,
}

/// Read the body, turning a non-success status into an error that carries
/// the backend's `error` message when it sent one.
async fn decode<T: DeserializeOwned>(res: Response, what: &str) -> Result<T> {
    let status = res.status();
    let body = res
        .text()
        .await
        .with_context(|| format!("Failed to read backend {what} response body"))?;

    if !status.is_success() {
        let detail = serde_json::from_str::<ErrorPayload>(&body)
            .map(|e| e.error)
            .unwrap_or_else(|_| truncate_body(&body));

        return Err(anyhow!("Backend {what} request failed with status {status}: {detail}"));
    }

    serde_json::from_str(&body).with_context(|| format!("Failed to parse backend {what} JSON"))
}

#[async_trait]
impl ParadeApi for BackendApi {
    async fn coordinates(&self, place_name: &str) -> Result<Coordinates> {
        let url = self.endpoint("api/location/coordinates");
        debug!(%url, place_name, "resolving coordinates");

        let res = self
            .http
            .post(&url)
            .json(&CoordinatesRequest { place_name })
            .send()
            .await
            .context("Failed to send request to backend (coordinates)")?;

        match decode::<CoordinatesPayload>(res, "coordinates").await? {
            CoordinatesPayload::Found(coordinates) => Ok(coordinates),
            CoordinatesPayload::Failed { error } => Err(anyhow!(error)),
        }
    }

    async fn search_locations(&self, query: &str) -> Result<Vec<LocationSuggestion>> {
        let url = self.endpoint("api/location/search");
        debug!(%url, query, "searching locations");

        let res = self
            .http
            .get(&url)
            .query(&[("query", query)])
            .send()
            .await
            .context("Failed to send request to backend (location search)")?;

        decode(res, "location search").await
    }

    async fn hourly_weather(
        &self,
        coordinates: Coordinates,
        date: NaiveDate,
    ) -> Result<Vec<HourlyWeatherRecord>> {
        let url = self.endpoint("api/weather/hourly");
        debug!(%url, %coordinates, %date, "fetching hourly weather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", coordinates.lat.to_string()),
                ("lon", coordinates.lon.to_string()),
                ("date", date.format("%Y-%m-%d").to_string()),
            ])
            .send()
            .await
            .context("Failed to send request to backend (hourly weather)")?;

        let payload: HourlyPayload = decode(res, "hourly weather").await?;
        Ok(payload.hourly_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slashes() {
        let api = BackendApi::new("http://localhost:5000/").unwrap();
        assert_eq!(api.endpoint("/api/weather/hourly"), "http://localhost:5000/api/weather/hourly");
        assert_eq!(api.base_url(), "http://localhost:5000/");
    }

    #[test]
    fn coordinates_payload_variants() {
        let found: CoordinatesPayload = serde_json::from_str(r#"{"lat": 48.85, "lon": 2.35}"#).unwrap();
        assert!(matches!(found, CoordinatesPayload::Found(c) if c.lat == 48.85));

        let failed: CoordinatesPayload =
            serde_json::from_str(r#"{"error": "Location not found"}"#).unwrap();
        assert!(matches!(failed, CoordinatesPayload::Failed { error } if error == "Location not found"));
    }

    #[test]
    fn hourly_payload_tolerates_extra_fields() {
        let body = r#"{
            "date": "2024-07-01",
            "location": {"latitude": "48.85", "longitude": "2.35"},
            "hourly_data": [
                {"time": "2024-07-01T01:00:00", "temperature": 18.0, "precipitation": 0.0, "wind_speed": 2.0, "humidity": 70.0},
                {"time": "2024-07-01T00:00:00", "temperature": 18.5, "precipitation": 0.0, "wind_speed": 2.1, "humidity": 71.0}
            ],
            "is_today": false,
            "is_future": true
        }"#;

        let payload: HourlyPayload = serde_json::from_str(body).unwrap();
        assert_eq!(payload.hourly_data.len(), 2);
        assert!(payload.hourly_data[0].risk_assessment.is_none());
    }
}
