//! Risk bucketing and local risk assessment.
//!
//! `RiskGauge` turns a probability or a tier label into what the progress bar
//! shows. `RiskCalculator` assesses raw hourly values when a source delivers
//! no assessment of its own.

use serde::{Deserialize, Serialize};

use crate::model::{HourlyWeatherRecord, MetricRisk, RiskAssessment, RiskDetails, RiskTier};

const HIGH_ABOVE: f64 = 70.0;
const MEDIUM_ABOVE: f64 = 40.0;

impl RiskTier {
    /// Fixed bar width for a tier; the real probability is not kept.
    pub fn display_percent(&self) -> u8 {
        match self {
            RiskTier::High => 90,
            RiskTier::Medium => 60,
            RiskTier::Low => 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskGauge {
    pub tier: RiskTier,
    pub percent: u8,
}

impl RiskGauge {
    /// `> 70` is high, `> 40` medium, anything else low.
    pub fn from_probability(probability: f64) -> Self {
        if !probability.is_finite() {
            return Self::from_tier(RiskTier::Low);
        }

        let tier = if probability > HIGH_ABOVE {
            RiskTier::High
        } else if probability > MEDIUM_ABOVE {
            RiskTier::Medium
        } else {
            RiskTier::Low
        };

        Self { tier, percent: probability.clamp(0.0, 100.0).round() as u8 }
    }

    pub fn from_label(label: Option<&str>) -> Self {
        Self::from_tier(label.map(RiskTier::from_label).unwrap_or_default())
    }

    pub fn from_tier(tier: RiskTier) -> Self {
        Self { tier, percent: tier.display_percent() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureThresholds {
    pub extreme_heat: f64,
    pub heat: f64,
    pub cold: f64,
    pub extreme_cold: f64,
}

impl Default for TemperatureThresholds {
    fn default() -> Self {
        Self { extreme_heat: 35.0, heat: 30.0, cold: 5.0, extreme_cold: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecipitationThresholds {
    pub heavy: f64,
    pub moderate: f64,
    pub light: f64,
}

impl Default for PrecipitationThresholds {
    fn default() -> Self {
        Self { heavy: 10.0, moderate: 2.5, light: 0.5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindThresholds {
    pub strong: f64,
    pub moderate: f64,
}

impl Default for WindThresholds {
    fn default() -> Self {
        Self { strong: 15.0, moderate: 8.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HumidityThresholds {
    pub very_high: f64,
    pub high: f64,
    pub low: f64,
    pub very_low: f64,
}

impl Default for HumidityThresholds {
    fn default() -> Self {
        Self { very_high: 90.0, high: 75.0, low: 30.0, very_low: 20.0 }
    }
}

/// Example TOML:
/// [thresholds.wind]
/// strong = 12.0
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub temperature: TemperatureThresholds,
    pub precipitation: PrecipitationThresholds,
    pub wind: WindThresholds,
    pub humidity: HumidityThresholds,
}

#[derive(Debug, Clone, Default)]
pub struct RiskCalculator {
    thresholds: Thresholds,
}

impl RiskCalculator {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn temperature_risk(&self, temperature: f64) -> MetricRisk {
        let t = &self.thresholds.temperature;
        let (risk, message) = if temperature >= t.extreme_heat {
            (RiskTier::High, "Extreme heat risk")
        } else if temperature >= t.heat {
            (RiskTier::Medium, "Heat risk")
        } else if temperature <= t.extreme_cold {
            (RiskTier::High, "Extreme cold risk")
        } else if temperature <= t.cold {
            (RiskTier::Medium, "Cold risk")
        } else {
            (RiskTier::Low, "Comfortable temperature")
        };
        metric(risk, temperature, message)
    }

    pub fn precipitation_risk(&self, precipitation: f64) -> MetricRisk {
        let t = &self.thresholds.precipitation;
        let (risk, message) = if precipitation >= t.heavy {
            (RiskTier::High, "Heavy precipitation")
        } else if precipitation >= t.moderate {
            (RiskTier::Medium, "Moderate precipitation")
        } else {
            (RiskTier::Low, "Light or no precipitation")
        };
        metric(risk, precipitation, message)
    }

    pub fn wind_risk(&self, wind_speed: f64) -> MetricRisk {
        let t = &self.thresholds.wind;
        let (risk, message) = if wind_speed >= t.strong {
            (RiskTier::High, "Strong winds")
        } else if wind_speed >= t.moderate {
            (RiskTier::Medium, "Moderate winds")
        } else {
            (RiskTier::Low, "Calm conditions")
        };
        metric(risk, wind_speed, message)
    }

    pub fn humidity_risk(&self, humidity: f64) -> MetricRisk {
        let t = &self.thresholds.humidity;
        let (risk, message) = if humidity >= t.very_high {
            (RiskTier::High, "Very humid conditions")
        } else if humidity >= t.high {
            (RiskTier::Medium, "Humid conditions")
        } else if humidity <= t.very_low {
            (RiskTier::Medium, "Very dry conditions")
        } else {
            (RiskTier::Low, "Comfortable humidity")
        };
        metric(risk, humidity, message)
    }

    /// The overall tier is always the worst tier among the present metrics.
    pub fn assess(
        &self,
        temperature: f64,
        precipitation: f64,
        wind_speed: f64,
        humidity: Option<f64>,
    ) -> RiskAssessment {
        let details = RiskDetails {
            temperature: Some(self.temperature_risk(temperature)),
            precipitation: Some(self.precipitation_risk(precipitation)),
            wind: Some(self.wind_risk(wind_speed)),
            humidity: humidity.map(|h| self.humidity_risk(h)),
        };

        let overall_risk = details.iter().map(|(_, m)| m.risk).max().unwrap_or_default();

        let concerns: Vec<&str> = details
            .iter()
            .filter(|(_, m)| m.risk > RiskTier::Low)
            .map(|(_, m)| m.message.as_str())
            .collect();

        let summary = if concerns.is_empty() {
            "Ideal weather conditions".to_string()
        } else {
            concerns.join("; ")
        };

        RiskAssessment { overall_risk, details, summary }
    }

    pub fn assess_record(&self, record: &HourlyWeatherRecord) -> RiskAssessment {
        self.assess(record.temperature, record.precipitation, record.wind_speed, record.humidity)
    }

    /// Short condition label for records that arrive without one.
    pub fn classify_condition(
        &self,
        temperature: f64,
        precipitation: f64,
        wind_speed: f64,
        humidity: Option<f64>,
    ) -> &'static str {
        let t = &self.thresholds;

        if precipitation >= t.precipitation.heavy {
            if wind_speed >= t.wind.strong {
                return "Stormy";
            }
            return "Heavy Rain";
        } else if precipitation >= t.precipitation.moderate {
            return "Rainy";
        } else if precipitation >= t.precipitation.light {
            return "Light Rain";
        }

        if temperature <= t.temperature.extreme_cold {
            return "Freezing / Snowy";
        } else if temperature <= t.temperature.cold {
            return match humidity {
                Some(h) if h >= t.humidity.high => "Cold & Cloudy",
                _ => "Cold & Clear",
            };
        }

        if temperature >= t.temperature.extreme_heat {
            return "Very Hot / Heatwave";
        } else if temperature >= t.temperature.heat {
            return match humidity {
                Some(h) if h > t.humidity.low => "Hot & Humid",
                _ => "Hot & Sunny",
            };
        }

        match humidity {
            Some(h) if h >= t.humidity.high => "Cloudy / Humid",
            Some(h) if h <= t.humidity.very_low => "Dry & Clear",
            _ => "Clear / Pleasant",
        }
    }

    pub fn classify_record(&self, record: &HourlyWeatherRecord) -> &'static str {
        self.classify_condition(
            record.temperature,
            record.precipitation,
            record.wind_speed,
            record.humidity,
        )
    }
}

fn metric(risk: RiskTier, value: f64, message: &str) -> MetricRisk {
    MetricRisk { risk, value, message: message.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probability_thresholds_are_exclusive() {
        assert_eq!(RiskGauge::from_probability(70.0).tier, RiskTier::Medium);
        assert_eq!(RiskGauge::from_probability(70.1).tier, RiskTier::High);
        assert_eq!(RiskGauge::from_probability(40.0).tier, RiskTier::Low);
        assert_eq!(RiskGauge::from_probability(40.5).tier, RiskTier::Medium);
        assert_eq!(RiskGauge::from_probability(55.4).percent, 55);
    }

    #[test]
    fn malformed_input_defaults_to_low() {
        assert_eq!(RiskGauge::from_probability(f64::NAN), RiskGauge::from_tier(RiskTier::Low));
        assert_eq!(RiskGauge::from_label(None).percent, 20);
        assert_eq!(RiskGauge::from_label(Some("??")).tier, RiskTier::Low);
    }

    #[test]
    fn labels_quantize_percent() {
        assert_eq!(RiskGauge::from_label(Some("high")).percent, 90);
        assert_eq!(RiskGauge::from_label(Some("medium")).percent, 60);
        assert_eq!(RiskGauge::from_label(Some("low")).percent, 20);
    }

    #[test]
    fn assess_overall_is_worst_metric() {
        let calc = RiskCalculator::default();

        let calm = calc.assess(22.0, 0.0, 2.0, Some(50.0));
        assert_eq!(calc.assess(22.0, 0.0, 2.0, None).details.humidity, None);
        assert_eq!(calm.overall_risk, RiskTier::Low);
        assert_eq!(calm.summary, "Ideal weather conditions");

        let stormy = calc.assess(22.0, 12.0, 9.0, Some(95.0));
        assert_eq!(stormy.overall_risk, RiskTier::High);
        assert_eq!(stormy.summary, "Heavy precipitation; Moderate winds; Very humid conditions");
        assert_eq!(stormy.highest_detail_tier(), Some(stormy.overall_risk));
    }

    #[test]
    fn humidity_alone_can_raise_overall() {
        let calc = RiskCalculator::default();
        let dry = calc.assess(20.0, 0.0, 1.0, Some(10.0));

        assert_eq!(dry.overall_risk, RiskTier::Medium);
        assert_eq!(dry.summary, "Very dry conditions");
    }

    #[test]
    fn temperature_bands() {
        let calc = RiskCalculator::default();
        assert_eq!(calc.temperature_risk(36.0).risk, RiskTier::High);
        assert_eq!(calc.temperature_risk(31.0).risk, RiskTier::Medium);
        assert_eq!(calc.temperature_risk(-3.0).message, "Extreme cold risk");
        assert_eq!(calc.temperature_risk(4.0).message, "Cold risk");
        assert_eq!(calc.temperature_risk(18.0).risk, RiskTier::Low);
    }

    #[test]
    fn condition_labels() {
        let calc = RiskCalculator::default();
        assert_eq!(calc.classify_condition(20.0, 15.0, 20.0, None), "Stormy");
        assert_eq!(calc.classify_condition(20.0, 15.0, 2.0, None), "Heavy Rain");
        assert_eq!(calc.classify_condition(20.0, 1.0, 2.0, None), "Light Rain");
        assert_eq!(calc.classify_condition(-5.0, 0.0, 2.0, None), "Freezing / Snowy");
        assert_eq!(calc.classify_condition(32.0, 0.0, 2.0, Some(25.0)), "Hot & Sunny");
        assert_eq!(calc.classify_condition(32.0, 0.0, 2.0, Some(60.0)), "Hot & Humid");
        assert_eq!(calc.classify_condition(20.0, 0.0, 2.0, Some(80.0)), "Cloudy / Humid");
        assert_eq!(calc.classify_condition(20.0, 0.0, 2.0, Some(50.0)), "Clear / Pleasant");
    }
}
