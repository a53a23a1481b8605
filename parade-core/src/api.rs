use crate::{
    Config,
    api::{backend::BackendApi, open_meteo::OpenMeteoApi},
    model::{Coordinates, HourlyWeatherRecord, LocationSuggestion},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::{convert::TryFrom, fmt::Debug, sync::Arc};

pub mod backend;
pub mod open_meteo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    Backend,
    OpenMeteo,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Backend => "backend",
            SourceId::OpenMeteo => "open-meteo",
        }
    }

    pub const fn all() -> &'static [SourceId] {
        &[SourceId::Backend, SourceId::OpenMeteo]
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SourceId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "backend" => Ok(SourceId::Backend),
            "open-meteo" | "openmeteo" => Ok(SourceId::OpenMeteo),
            _ => Err(anyhow::anyhow!(
                "Unknown source '{value}'. Supported sources: backend, open-meteo."
            )),
        }
    }
}

/// Everything the results pipeline needs from the outside world.
#[async_trait]
pub trait ParadeApi: Send + Sync + Debug {
    /// Resolve free text to a single point.
    async fn coordinates(&self, place_name: &str) -> anyhow::Result<Coordinates>;

    /// Place names starting with or matching `query`, best first. May be empty.
    async fn search_locations(&self, query: &str) -> anyhow::Result<Vec<LocationSuggestion>>;

    /// Hourly records for one calendar day, in whatever order the source returns.
    async fn hourly_weather(
        &self,
        coordinates: Coordinates,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<HourlyWeatherRecord>>;
}

#[async_trait]
impl<T: ParadeApi + ?Sized> ParadeApi for Box<T> {
    async fn coordinates(&self, place_name: &str) -> anyhow::Result<Coordinates> {
        (**self).coordinates(place_name).await
    }

    async fn search_locations(&self, query: &str) -> anyhow::Result<Vec<LocationSuggestion>> {
        (**self).search_locations(query).await
    }

    async fn hourly_weather(
        &self,
        coordinates: Coordinates,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<HourlyWeatherRecord>> {
        (**self).hourly_weather(coordinates, date).await
    }
}

#[async_trait]
impl<T: ParadeApi + ?Sized> ParadeApi for Arc<T> {
    async fn coordinates(&self, place_name: &str) -> anyhow::Result<Coordinates> {
        (**self).coordinates(place_name).await
    }

    async fn search_locations(&self, query: &str) -> anyhow::Result<Vec<LocationSuggestion>> {
        (**self).search_locations(query).await
    }

    async fn hourly_weather(
        &self,
        coordinates: Coordinates,
        date: NaiveDate,
    ) -> anyhow::Result<Vec<HourlyWeatherRecord>> {
        (**self).hourly_weather(coordinates, date).await
    }
}

/// Construct a source from config and explicit SourceId.
pub fn source_from_config(id: SourceId, config: &Config) -> anyhow::Result<Box<dyn ParadeApi>> {
    let boxed: Box<dyn ParadeApi> = match id {
        SourceId::Backend => Box::new(BackendApi::new(config.backend.base_url.clone())?),
        SourceId::OpenMeteo => Box::new(OpenMeteoApi::new(config.thresholds.clone())?),
    };

    Ok(boxed)
}

/// Construct the configured source, falling back to the backend.
pub fn default_source_from_config(config: &Config) -> anyhow::Result<Box<dyn ParadeApi>> {
    let id = config.source_id()?;
    source_from_config(id, config)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
