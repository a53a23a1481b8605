//! Hourly cards: typed view state plus the single-expanded-card rule.

use std::fmt::Display;

use chrono::TimeZone;
use serde::Serialize;

use crate::model::{HourlyWeatherRecord, RecordId, RiskAssessment};
use crate::risk::RiskGauge;

/// One hourly record ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardViewState {
    pub record: HourlyWeatherRecord,
    pub assessment: RiskAssessment,
    pub condition: String,
    pub is_selected_hour: bool,
}

impl CardViewState {
    pub fn id(&self) -> RecordId {
        self.record.id()
    }
}

/// Tracks which card, if any, is expanded. At most one is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardBoard {
    expanded: Option<RecordId>,
}

impl CardBoard {
    /// Click semantics: expanding a card collapses the previous one;
    /// clicking the expanded card collapses it. Returns the expanded card.
    pub fn toggle(&mut self, id: RecordId) -> Option<RecordId> {
        self.expanded = match self.expanded {
            Some(current) if current == id => None,
            _ => Some(id),
        };
        self.expanded
    }

    pub fn expanded(&self) -> Option<RecordId> {
        self.expanded
    }

    pub fn is_expanded(&self, id: RecordId) -> bool {
        self.expanded == Some(id)
    }

    pub fn collapse(&mut self) {
        self.expanded = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardMode {
    Compact,
    Expanded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardDetail {
    pub humidity: Option<f64>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub id: RecordId,
    pub icon: &'static str,
    pub time_label: String,
    pub condition: String,
    pub temperature: f64,
    pub precipitation: f64,
    pub wind_speed: f64,
    pub gauge: RiskGauge,
    pub highlighted: bool,
    /// Present only when expanded.
    pub detail: Option<CardDetail>,
}

impl CardView {
    pub fn mode(&self) -> CardMode {
        if self.detail.is_some() { CardMode::Expanded } else { CardMode::Compact }
    }
}

/// First matching keyword wins.
pub fn condition_icon(condition: &str) -> &'static str {
    let condition = condition.to_lowercase();
    [("storm", "⛈️"), ("rain", "🌧️"), ("cloud", "☁️"), ("sun", "☀️"), ("wind", "💨")]
        .into_iter()
        .find(|(keyword, _)| condition.contains(keyword))
        .map_or("🌤️", |(_, icon)| icon)
}

pub fn card_view<Tz>(state: &CardViewState, expanded: bool, tz: &Tz) -> CardView
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let record = &state.record;

    CardView {
        id: state.id(),
        icon: condition_icon(&state.condition),
        time_label: record.time.with_timezone(tz).format("%H:%M").to_string(),
        condition: state.condition.clone(),
        temperature: record.temperature,
        precipitation: record.precipitation,
        wind_speed: record.wind_speed,
        gauge: RiskGauge::from_tier(state.assessment.overall_risk),
        highlighted: state.is_selected_hour,
        detail: expanded.then(|| CardDetail {
            humidity: record.humidity,
            summary: state.assessment.summary.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RiskTier;
    use chrono::{FixedOffset, TimeZone, Utc};

    fn state(hour: u32, selected: bool) -> CardViewState {
        CardViewState {
            record: HourlyWeatherRecord {
                time: Utc.with_ymd_and_hms(2024, 7, 1, hour, 0, 0).unwrap(),
                temperature: 24.0,
                precipitation: 0.4,
                wind_speed: 5.0,
                humidity: Some(61.0),
                condition: None,
                risk_assessment: None,
                source: None,
            },
            assessment: RiskAssessment {
                overall_risk: RiskTier::Medium,
                summary: "Moderate winds".to_string(),
                ..Default::default()
            },
            condition: "Light Rain".to_string(),
            is_selected_hour: selected,
        }
    }

    #[test]
    fn icons_match_keywords_in_order() {
        assert_eq!(condition_icon("Stormy"), "⛈️");
        assert_eq!(condition_icon("Heavy Rain"), "🌧️");
        assert_eq!(condition_icon("Cloudy / Humid"), "☁️");
        assert_eq!(condition_icon("Hot & Sunny"), "☀️");
        assert_eq!(condition_icon("Windy"), "💨");
        assert_eq!(condition_icon("Clear / Pleasant"), "🌤️");
    }

    #[test]
    fn compact_view_hides_detail() {
        let view = card_view(&state(14, true), false, &Utc);

        assert_eq!(view.mode(), CardMode::Compact);
        assert_eq!(view.time_label, "14:00");
        assert_eq!(view.icon, "🌧️");
        assert_eq!(view.gauge, RiskGauge::from_tier(RiskTier::Medium));
        assert!(view.highlighted);
    }

    #[test]
    fn expanded_view_adds_humidity_and_summary() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let view = card_view(&state(14, false), true, &tz);

        assert_eq!(view.mode(), CardMode::Expanded);
        assert_eq!(view.time_label, "15:00");
        let detail = view.detail.unwrap();
        assert_eq!(detail.humidity, Some(61.0));
        assert_eq!(detail.summary, "Moderate winds");
    }

    #[test]
    fn only_one_card_expands() {
        let a = state(13, false).id();
        let b = state(14, false).id();
        let mut board = CardBoard::default();

        assert_eq!(board.toggle(a), Some(a));
        assert_eq!(board.toggle(b), Some(b));
        assert!(!board.is_expanded(a));
        assert!(board.is_expanded(b));

        assert_eq!(board.toggle(b), None);
        assert_eq!(board.expanded(), None);
    }

    #[test]
    fn highlight_does_not_expand() {
        let board = CardBoard::default();
        let selected = state(14, true);
        assert!(!board.is_expanded(selected.id()));
    }
}
