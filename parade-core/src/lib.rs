//! Core library for the `parade` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - The data-source abstraction (parade backend, Open-Meteo)
//! - Risk bucketing, suggestions and hourly card view models
//! - The results pipeline that ties them together
//!
//! It is used by `parade-cli`, but can also be reused by other front ends.

pub mod api;
pub mod card;
pub mod config;
pub mod error;
pub mod model;
pub mod results;
pub mod risk;
pub mod share;
pub mod suggest;
pub mod typeahead;

pub use api::{ParadeApi, SourceId};
pub use card::{CardBoard, CardMode, CardView, CardViewState, card_view};
pub use config::{BackendConfig, Config, TypeaheadConfig};
pub use error::{ParadeError, ParadeResult};
pub use model::{
    Coordinates, EventQuery, EventType, HourlyWeatherRecord, LocationSuggestion, RecordId,
    RiskAssessment, RiskDetails, RiskTier,
};
pub use results::{ResultsAssembler, ResultsView};
pub use risk::{RiskCalculator, RiskGauge, Thresholds};
pub use suggest::derive_suggestions;
pub use typeahead::{Debouncer, LocationSuggester, SuggestionBatch};
