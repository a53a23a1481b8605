use thiserror::Error;

/// Failures a user can run into while checking an event.
///
/// Every variant is surfaced as a blocking message; none is retried.
#[derive(Debug, Error)]
pub enum ParadeError {
    #[error("{reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Could not find location '{location}': {reason}")]
    LocationNotFound { location: String, reason: String },

    #[error("Failed to fetch weather data: {0}")]
    WeatherFetch(String),

    #[error("No weather data for {hour:02}:00 UTC")]
    NoDataForHour { hour: u32 },

    #[error("Could not copy link to clipboard: {0}")]
    Clipboard(String),

    #[error("Sharing is not available here")]
    ShareUnavailable,

    #[error("A weather check is already running; wait for it to finish")]
    QueryInFlight,
}

pub type ParadeResult<T> = Result<T, ParadeError>;

impl ParadeError {
    pub(crate) fn missing(field: &'static str) -> Self {
        ParadeError::Validation {
            field,
            reason: format!("Please fill in all fields: {field} is required"),
        }
    }
}
