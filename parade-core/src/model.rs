use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ParadeError, ParadeResult};

/// Coarse risk bucket. Ordered so that `max()` yields the worst tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        }
    }

    /// Unknown labels fall back to `Low`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => RiskTier::High,
            "medium" => RiskTier::Medium,
            _ => RiskTier::Low,
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RiskTier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label.as_deref().map(RiskTier::from_label).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Temperature,
    Precipitation,
    Wind,
    Humidity,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Precipitation => "precipitation",
            Metric::Wind => "wind",
            Metric::Humidity => "humidity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRisk {
    #[serde(default)]
    pub risk: RiskTier,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub message: String,
}

/// Per-metric assessments. An absent metric is skipped, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<MetricRisk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<MetricRisk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind: Option<MetricRisk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<MetricRisk>,
}

impl RiskDetails {
    pub fn get(&self, metric: Metric) -> Option<&MetricRisk> {
        match metric {
            Metric::Temperature => self.temperature.as_ref(),
            Metric::Precipitation => self.precipitation.as_ref(),
            Metric::Wind => self.wind.as_ref(),
            Metric::Humidity => self.humidity.as_ref(),
        }
    }

    /// Present metrics in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, &MetricRisk)> {
        [Metric::Temperature, Metric::Precipitation, Metric::Wind, Metric::Humidity]
            .into_iter()
            .filter_map(|metric| self.get(metric).map(|risk| (metric, risk)))
    }

    pub fn is_high(&self, metric: Metric) -> bool {
        self.get(metric).is_some_and(|m| m.risk == RiskTier::High)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    #[serde(default)]
    pub overall_risk: RiskTier,
    #[serde(default)]
    pub details: RiskDetails,
    #[serde(default)]
    pub summary: String,
}

impl RiskAssessment {
    /// Worst tier among the present details, if any.
    pub fn highest_detail_tier(&self) -> Option<RiskTier> {
        self.details.iter().map(|(_, m)| m.risk).max()
    }
}

/// One hour of observed or forecast weather, as delivered by a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyWeatherRecord {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub precipitation: f64,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_assessment: Option<RiskAssessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl HourlyWeatherRecord {
    pub fn id(&self) -> RecordId {
        RecordId(self.time)
    }
}

/// Identifies a card by the UTC hour it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RecordId(pub DateTime<Utc>);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%MZ"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSuggestion {
    pub place_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    Parade,
    Concert,
    Picnic,
    Wedding,
    Sports,
    Festival,
    Birthday,
    Other(String),
}

impl EventType {
    pub const RECOGNIZED: [&'static str; 7] =
        ["parade", "concert", "picnic", "wedding", "sports", "festival", "birthday"];

    /// Never fails: unrecognized tags are kept verbatim as `Other`.
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "parade" => EventType::Parade,
            "concert" => EventType::Concert,
            "picnic" => EventType::Picnic,
            "wedding" => EventType::Wedding,
            "sports" => EventType::Sports,
            "festival" => EventType::Festival,
            "birthday" => EventType::Birthday,
            _ => EventType::Other(tag.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventType::Parade => "parade",
            EventType::Concert => "concert",
            EventType::Picnic => "picnic",
            EventType::Wedding => "wedding",
            EventType::Sports => "sports",
            EventType::Festival => "festival",
            EventType::Birthday => "birthday",
            EventType::Other(tag) => tag,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A validated form submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventQuery {
    pub location: String,
    /// Wall-clock time as the user entered it.
    pub local_time: NaiveDateTime,
    pub at: DateTime<Utc>,
    pub event: EventType,
}

impl EventQuery {
    /// Validate raw form input. Naive datetimes are read in `tz`.
    pub fn parse<Tz: TimeZone>(
        location: &str,
        at: &str,
        event: &str,
        tz: &Tz,
    ) -> ParadeResult<Self> {
        let location = location.trim();
        if location.is_empty() {
            return Err(ParadeError::missing("location"));
        }

        let at = at.trim();
        if at.is_empty() {
            return Err(ParadeError::missing("date/time"));
        }

        let event = event.trim();
        if event.is_empty() {
            return Err(ParadeError::missing("event type"));
        }

        let (local_time, utc) = parse_event_time(at, tz)?;

        Ok(Self {
            location: location.to_string(),
            local_time,
            at: utc,
            event: EventType::parse(event),
        })
    }

    /// Date sent to the hourly endpoint.
    pub fn date(&self) -> NaiveDate {
        self.local_time.date()
    }

    /// UTC hour used to pick the record that drives suggestions.
    pub fn selected_hour(&self) -> u32 {
        self.at.hour()
    }
}

fn parse_event_time<Tz: TimeZone>(
    raw: &str,
    tz: &Tz,
) -> ParadeResult<(NaiveDateTime, DateTime<Utc>)> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok((dt.naive_local(), dt.with_timezone(&Utc)));
    }

    let naive = parse_naive(raw).ok_or_else(|| ParadeError::Validation {
        field: "date/time",
        reason: format!("date/time '{raw}' is not an ISO date/time (YYYY-MM-DDTHH:MM)"),
    })?;

    // Ambiguous wall-clock times (clocks going back) take the earlier instant.
    let local = tz.from_local_datetime(&naive).earliest().ok_or_else(|| {
        ParadeError::Validation {
            field: "date/time",
            reason: format!(
                "date/time '{raw}' does not exist in the local time zone (clocks skip it)"
            ),
        }
    })?;
    Ok((naive, local.with_timezone(&Utc)))
}

fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// RFC 3339 timestamps are converted to UTC; naive ones are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| parse_naive(raw).map(|naive| naive.and_utc()))
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
}
