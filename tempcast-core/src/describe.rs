//! Plain-language description of a forecast.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Temperature category (°C)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureClass {
    /// Below 5 °C
    VeryCold,
    /// [5, 12) °C
    Cold,
    /// [12, 18) °C
    CoolMild,
    /// [18, 24) °C
    WarmPleasant,
    /// 24 °C and above
    Hot,
}

impl TemperatureClass {
    /// Classify a temperature; `None` for non-finite values
    pub fn classify(temperature: f64) -> Option<Self> {
        if !temperature.is_finite() {
            return None;
        }
        Some(match temperature {
            t if t < 5.0 => TemperatureClass::VeryCold,
            t if t < 12.0 => TemperatureClass::Cold,
            t if t < 18.0 => TemperatureClass::CoolMild,
            t if t < 24.0 => TemperatureClass::WarmPleasant,
            _ => TemperatureClass::Hot,
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            TemperatureClass::VeryCold => "Very Cold",
            TemperatureClass::Cold => "Cold",
            TemperatureClass::CoolMild => "Cool/Mild",
            TemperatureClass::WarmPleasant => "Warm/Pleasant",
            TemperatureClass::Hot => "Hot",
        }
    }
}

impl fmt::Display for TemperatureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Precipitation category (mm)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrecipitationClass {
    /// Exactly 0 mm
    ClearSky,
    /// (0, 1] mm
    LightDrizzle,
    /// (1, 5] mm
    RainProbable,
    /// Above 5 mm
    HeavyRain,
}

impl PrecipitationClass {
    /// Classify an amount; `None` for negative or non-finite amounts
    pub fn classify(precipitation: f64) -> Option<Self> {
        if !precipitation.is_finite() || precipitation < 0.0 {
            return None;
        }
        Some(match precipitation {
            p if p == 0.0 => PrecipitationClass::ClearSky,
            p if p <= 1.0 => PrecipitationClass::LightDrizzle,
            p if p <= 5.0 => PrecipitationClass::RainProbable,
            _ => PrecipitationClass::HeavyRain,
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            PrecipitationClass::ClearSky => "clear sky",
            PrecipitationClass::LightDrizzle => "light drizzle possible",
            PrecipitationClass::RainProbable => "rain probable",
            PrecipitationClass::HeavyRain => "heavy rain expected",
        }
    }
}

impl fmt::Display for PrecipitationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Describe a forecast in one sentence
///
/// A missing or unusable input drops its clause instead of inventing a value.
///
/// ```rust
/// use tempcast_core::describe;
///
/// assert_eq!(
///     describe(Some(3.0), Some(0.0)),
///     "Forecast: Very Cold (approx. 3.0°C) with clear sky."
/// );
/// assert_eq!(describe(None, Some(2.0)), "Forecast: rain probable.");
/// ```
pub fn describe(temperature: Option<f64>, precipitation: Option<f64>) -> String {
    let temperature = temperature
        .and_then(|t| TemperatureClass::classify(t).map(|class| (t, class)));
    let precipitation = precipitation.and_then(PrecipitationClass::classify);

    match (temperature, precipitation) {
        (Some((t, class)), Some(rain)) => {
            format!("Forecast: {} (approx. {:.1}°C) with {}.", class, t, rain)
        }
        (Some((t, class)), None) => format!("Forecast: {} (approx. {:.1}°C).", class, t),
        (None, Some(rain)) => format!("Forecast: {}.", rain),
        (None, None) => "Forecast unavailable.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_bins_are_closed_below() {
        let cases = [
            (-10.0, TemperatureClass::VeryCold),
            (4.99, TemperatureClass::VeryCold),
            (5.0, TemperatureClass::Cold),
            (11.99, TemperatureClass::Cold),
            (12.0, TemperatureClass::CoolMild),
            (18.0, TemperatureClass::WarmPleasant),
            (23.99, TemperatureClass::WarmPleasant),
            (24.0, TemperatureClass::Hot),
            (41.0, TemperatureClass::Hot),
        ];
        for (t, expected) in cases {
            assert_eq!(TemperatureClass::classify(t), Some(expected), "{t}");
        }
        assert_eq!(TemperatureClass::classify(f64::NAN), None);
    }

    #[test]
    fn precipitation_bins_are_closed_above() {
        let cases = [
            (0.0, PrecipitationClass::ClearSky),
            (0.01, PrecipitationClass::LightDrizzle),
            (1.0, PrecipitationClass::LightDrizzle),
            (1.01, PrecipitationClass::RainProbable),
            (5.0, PrecipitationClass::RainProbable),
            (5.01, PrecipitationClass::HeavyRain),
        ];
        for (p, expected) in cases {
            assert_eq!(PrecipitationClass::classify(p), Some(expected), "{p}");
        }
        assert_eq!(PrecipitationClass::classify(-0.5), None);
        assert_eq!(PrecipitationClass::classify(f64::INFINITY), None);
    }

    #[test]
    fn very_cold_and_clear() {
        let text = describe(Some(3.0), Some(0.0));
        assert!(text.contains("Very Cold"));
        assert!(text.contains("clear sky"));
    }

    #[test]
    fn missing_temperature_omits_its_clause() {
        let text = describe(None, Some(2.0));
        assert!(text.contains("rain probable"));
        assert!(!text.contains("°C"));
        assert!(!text.contains("Cold") && !text.contains("Hot"));
    }

    #[test]
    fn missing_precipitation_omits_its_clause() {
        let text = describe(Some(20.0), None);
        assert_eq!(text, "Forecast: Warm/Pleasant (approx. 20.0°C).");
        assert!(!text.contains(" with "));
    }

    #[test]
    fn nothing_to_describe() {
        assert_eq!(describe(None, None), "Forecast unavailable.");
        assert_eq!(describe(Some(f64::NAN), Some(-1.0)), "Forecast unavailable.");
    }
}
