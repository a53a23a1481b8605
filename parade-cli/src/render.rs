//! Terminal presentation of a results view.

use std::fmt::{Display, Write};

use chrono::TimeZone;
use parade_core::{CardBoard, CardView, ResultsView, RiskGauge, RiskTier, card_view};

const BAR_CELLS: usize = 10;

pub fn gauge_bar(gauge: &RiskGauge) -> String {
    let filled = (usize::from(gauge.percent) * BAR_CELLS + 50) / 100;
    format!(
        "[{}{}] {} {}%",
        "█".repeat(filled),
        "░".repeat(BAR_CELLS - filled),
        tier_label(gauge.tier),
        gauge.percent
    )
}

fn tier_label(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::High => "HIGH",
        RiskTier::Medium => "MEDIUM",
        RiskTier::Low => "LOW",
    }
}

pub fn card(view: &CardView) -> String {
    let mut out = String::new();
    let marker = if view.highlighted { "▶" } else { " " };

    let _ = writeln!(out, "{marker} {} {} {}", view.time_label, view.icon, view.condition);
    let _ = writeln!(
        out,
        "    {:.1}°C  {:.1} mm  {:.1} m/s",
        view.temperature, view.precipitation, view.wind_speed
    );
    let _ = writeln!(out, "    Risk {}", gauge_bar(&view.gauge));

    if let Some(detail) = &view.detail {
        match detail.humidity {
            Some(h) => {
                let _ = writeln!(out, "    Humidity: {h:.0}%");
            }
            None => {
                let _ = writeln!(out, "    Humidity: n/a");
            }
        }
        let _ = writeln!(out, "    {}", detail.summary);
    }

    out
}

pub fn results<Tz>(view: &ResultsView, board: &CardBoard, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();

    let _ = writeln!(out, "Will It Rain On My Parade?");
    let _ = writeln!(out, "Location: {} ({})", view.location, view.coordinates);
    let _ = writeln!(
        out,
        "Event:    {} at {}",
        view.event,
        view.event_time.with_timezone(tz).format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(out);

    if view.cards.is_empty() {
        let _ = writeln!(out, "No hourly data available for this day.");
    } else {
        let _ = writeln!(out, "Hourly outlook:");
        for state in &view.cards {
            let rendered = card_view(state, board.is_expanded(state.id()), tz);
            out.push_str(&card(&rendered));
        }
    }
    let _ = writeln!(out);

    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "⚠️  {notice}");
    }

    if !view.suggestions.is_empty() {
        let _ = writeln!(out, "Suggestions:");
        for line in &view.suggestions {
            let _ = writeln!(out, "  • {line}");
        }
    }

    out
}
