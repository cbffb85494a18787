//! Forecast parameters
//!
//! Defaults reproduce the reference configuration: a 2015–2024 historical
//! window and a straight-line trend only once four years have coverage.

use crate::errors::{TempcastError, TempcastResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

/// Parameters for the Clough-Tocher gradient estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationParameters {
    /// Maximum number of Gauss-Seidel sweeps over the vertices.
    /// Default: 400
    pub gradient_max_iterations: usize,

    /// Relative change below which the gradient iteration stops.
    /// Default: 1e-6
    pub gradient_tolerance: f64,
}

impl Default for InterpolationParameters {
    fn default() -> Self {
        Self {
            gradient_max_iterations: 400,
            gradient_tolerance: 1e-6,
        }
    }
}

/// Parameters for the forecast engine.
///
/// Loaded from TOML; missing fields take their default value.
///
/// ```toml
/// first_year = 2015
/// last_year = 2024
/// min_trend_years = 4
///
/// [interpolation]
/// gradient_max_iterations = 400
/// gradient_tolerance = 1e-6
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastParameters {
    /// First historical year queried (inclusive).
    /// Default: 2015
    pub first_year: i32,

    /// Last historical year queried (inclusive).
    /// Default: 2024
    pub last_year: i32,

    /// Number of yearly estimates needed before a trend line is fitted.
    /// With fewer estimates the forecast is their arithmetic mean.
    /// Default: 4
    pub min_trend_years: usize,

    pub interpolation: InterpolationParameters,
}

impl Default for ForecastParameters {
    fn default() -> Self {
        Self {
            first_year: 2015,
            last_year: 2024,
            min_trend_years: 4,
            interpolation: InterpolationParameters::default(),
        }
    }
}

impl ForecastParameters {
    /// Years searched for historical records, in ascending order
    pub fn history_years(&self) -> RangeInclusive<i32> {
        self.first_year..=self.last_year
    }

    pub fn validate(&self) -> TempcastResult<()> {
        if self.first_year > self.last_year {
            return Err(TempcastError::InvalidParameters(format!(
                "first_year ({}) is after last_year ({})",
                self.first_year, self.last_year
            )));
        }
        if self.min_trend_years < 2 {
            return Err(TempcastError::InvalidParameters(format!(
                "min_trend_years must be at least 2, got {}",
                self.min_trend_years
            )));
        }
        if self.interpolation.gradient_max_iterations == 0 {
            return Err(TempcastError::InvalidParameters(
                "gradient_max_iterations must be positive".to_string(),
            ));
        }
        if !(self.interpolation.gradient_tolerance > 0.0) {
            return Err(TempcastError::InvalidParameters(format!(
                "gradient_tolerance must be positive, got {}",
                self.interpolation.gradient_tolerance
            )));
        }
        Ok(())
    }

    /// Parse and validate parameters from a TOML document
    pub fn from_toml_str(contents: &str) -> TempcastResult<Self> {
        let parameters: Self = toml::from_str(contents)?;
        parameters.validate()?;
        Ok(parameters)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> TempcastResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_window() {
        let parameters = ForecastParameters::default();
        assert_eq!(parameters.history_years(), 2015..=2024);
        assert_eq!(parameters.history_years().count(), 10);
        assert_eq!(parameters.min_trend_years, 4);
        assert!(parameters.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let parameters = ForecastParameters::from_toml_str(
            r#"
            first_year = 2010

            [interpolation]
            gradient_tolerance = 1e-8
            "#,
        )
        .unwrap();

        assert_eq!(parameters.first_year, 2010);
        assert_eq!(parameters.last_year, 2024);
        assert_eq!(parameters.min_trend_years, 4);
        assert_eq!(parameters.interpolation.gradient_tolerance, 1e-8);
        assert_eq!(parameters.interpolation.gradient_max_iterations, 400);
    }

    #[test]
    fn rejects_inverted_window() {
        let result = ForecastParameters::from_toml_str("first_year = 2030\nlast_year = 2020");
        assert!(matches!(result, Err(TempcastError::InvalidParameters(_))));
    }

    #[test]
    fn rejects_trend_threshold_below_two() {
        let result = ForecastParameters::from_toml_str("min_trend_years = 1");
        assert!(matches!(result, Err(TempcastError::InvalidParameters(_))));
    }

    #[test]
    fn rejects_malformed_toml() {
        let result = ForecastParameters::from_toml_str("first_year = \"soon\"");
        assert!(matches!(result, Err(TempcastError::Toml(_))));
    }
}
