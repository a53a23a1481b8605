use crate::model::{EventType, Metric, RiskDetails};

/// Above this a high temperature risk means heat, otherwise cold.
const HEAT_CUTOFF_C: f64 = 28.0;

pub const PERFECT_CONDITIONS: &str = "🎉 Perfect conditions! Your event should go smoothly";
pub const PHOTO_WEATHER: &str = "📸 Great weather for photos and outdoor activities";

const HEAT: [&str; 2] = [
    "☀️ Provide shade structures and hydration stations",
    "🧴 Recommend sunscreen and light-colored clothing",
];

const COLD: [&str; 2] = [
    "🧥 Advise attendees to bring warm clothing",
    "☕ Set up warming stations with hot beverages",
];

const RAIN: [&str; 2] = [
    "☔ Provide covered areas and umbrellas",
    "👢 Recommend waterproof footwear",
];

const WIND: [&str; 2] = [
    "🎪 Secure all decorations and equipment",
    "📋 Have backup indoor venue ready",
];

const HUMIDITY: [&str; 2] = [
    "⏰ Consider rescheduling to a better time",
    "🏠 Prepare indoor alternatives",
];

pub fn event_suggestion(event: &EventType) -> Option<&'static str> {
    match event {
        EventType::Parade => Some("🎺 Plan a shorter route with sheltered rest points"),
        EventType::Concert => Some("🎤 Keep sound and lighting gear under weatherproof covers"),
        EventType::Picnic => Some("🧺 Pick a spot close to a covered shelter"),
        EventType::Wedding => Some("💍 Reserve a tent as a backup for the ceremony"),
        EventType::Sports => Some("🏃 Schedule extra hydration breaks for players"),
        EventType::Festival => Some("🎡 Assign a team to watch weather updates on site"),
        EventType::Birthday => Some("🎂 Keep the cake and decorations out of the sun"),
        EventType::Other(_) => None,
    }
}

/// Ordered suggestions for the selected hour. Never empty.
///
/// Mitigations are emitted for high-risk metrics in the order temperature,
/// precipitation, wind, humidity, followed by one line for the event type.
/// When no metric is high the result is the positive fallback alone and the
/// event line is dropped.
pub fn derive_suggestions(details: &RiskDetails, event: &EventType) -> Vec<String> {
    let mut lines: Vec<&str> = Vec::new();

    if details.is_high(Metric::Temperature) {
        let hot = details.temperature.as_ref().is_some_and(|t| t.value > HEAT_CUTOFF_C);
        if hot {
            lines.extend(HEAT);
        } else {
            lines.extend(COLD);
        }
    }

    if details.is_high(Metric::Precipitation) {
        lines.extend(RAIN);
    }

    if details.is_high(Metric::Wind) {
        lines.extend(WIND);
    }

    if details.is_high(Metric::Humidity) {
        lines.extend(HUMIDITY);
    }

    if lines.is_empty() {
        return vec![PERFECT_CONDITIONS.to_string(), PHOTO_WEATHER.to_string()];
    }

    lines.extend(event_suggestion(event));
    lines.into_iter().map(str::to_string).collect()
}
