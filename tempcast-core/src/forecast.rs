//! Forecast engine
//!
//! A forecast for `(latitude, longitude, timestamp)` is produced in three steps:
//!
//! 1. For every year of the historical window, the record for the same
//!    calendar hour is interpolated at the query point (Clough-Tocher).
//!    Years without a record, or where the point lies outside the sampled
//!    area, are left out.
//! 2. With fewer than [`ForecastParameters::min_trend_years`] yearly
//!    estimates the forecast is their mean.
//! 3. Otherwise a straight line is fitted through the yearly estimates and
//!    evaluated at the requested year.
//!
//! Malformed requests and missing coverage never produce an error; they
//! produce [`ForecastResult::Unavailable`].

use crate::calendar::{CalendarHour, TargetTime};
use crate::dataset::{HistoricalDataset, HistoricalHourRecord, HistoricalLookup};
use crate::errors::{TempcastError, TempcastResult};
use crate::interpolate::CloughTocher2d;
use crate::parameters::{ForecastParameters, InterpolationParameters};
use crate::trend::{mean_estimate, TrendLine};
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Interpolated value at the query point for one historical year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearEstimate {
    pub year: i32,
    pub estimated_value: f64,
}

/// How the yearly estimates were combined
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimateMethod {
    /// Too few years for a trend: arithmetic mean of the estimates
    Mean,
    /// Least-squares line through the estimates, evaluated at the target year
    Trend(TrendLine),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEstimate {
    pub value: f64,
    pub method: EstimateMethod,
    /// Yearly estimates that contributed, in ascending year order
    pub years: Vec<YearEstimate>,
}

/// Why no forecast could be made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    MalformedTimestamp,
    InvalidCoordinates,
    /// No historical year produced an estimate for the point and hour
    NoCoverage,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UnavailableReason::MalformedTimestamp => "malformed timestamp",
            UnavailableReason::InvalidCoordinates => "invalid coordinates",
            UnavailableReason::NoCoverage => "no historical coverage",
        };
        f.write_str(text)
    }
}

/// Outcome of a forecast request
///
/// `Unavailable` is an expected outcome (sparse data, bad input), not an
/// exceptional one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ForecastResult {
    Available(ForecastEstimate),
    Unavailable(UnavailableReason),
}

impl ForecastResult {
    /// The forecast temperature, if any
    pub fn value(&self) -> Option<f64> {
        self.estimate().map(|estimate| estimate.value)
    }

    pub fn estimate(&self) -> Option<&ForecastEstimate> {
        match self {
            ForecastResult::Available(estimate) => Some(estimate),
            ForecastResult::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ForecastResult::Available(_))
    }
}

/// A validated geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// # Errors
    ///
    /// [`TempcastError::InvalidCoordinates`] unless latitude is in [-90, 90]
    /// and longitude in [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> TempcastResult<Self> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(TempcastError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// One request of a batch, see [`ForecastEngine::forecast_batch`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// `YYYY-MM-DD HH:MM`
    pub timestamp: String,
}

/// Computes forecasts against a shared, read-only historical dataset
///
/// The engine holds no per-request state and may be shared between threads.
#[derive(Debug)]
pub struct ForecastEngine<L = HistoricalDataset> {
    dataset: Arc<L>,
    parameters: ForecastParameters,
}

impl<L> Clone for ForecastEngine<L> {
    fn clone(&self) -> Self {
        Self {
            dataset: Arc::clone(&self.dataset),
            parameters: self.parameters.clone(),
        }
    }
}

impl<L: HistoricalLookup> ForecastEngine<L> {
    pub fn new(dataset: Arc<L>, parameters: ForecastParameters) -> Self {
        Self {
            dataset,
            parameters,
        }
    }

    pub fn with_default_parameters(dataset: Arc<L>) -> Self {
        Self::new(dataset, ForecastParameters::default())
    }

    pub fn parameters(&self) -> &ForecastParameters {
        &self.parameters
    }

    pub fn dataset(&self) -> &L {
        &self.dataset
    }

    /// Forecast the temperature at a point for a `YYYY-MM-DD HH:MM` timestamp
    pub fn forecast(
        &self,
        latitude: f64,
        longitude: f64,
        target_timestamp: &str,
    ) -> ForecastResult {
        let coordinates = match Coordinates::new(latitude, longitude) {
            Ok(coordinates) => coordinates,
            Err(e) => {
                debug!("Forecast unavailable: {}", e);
                return ForecastResult::Unavailable(UnavailableReason::InvalidCoordinates);
            }
        };
        let target = match TargetTime::parse(target_timestamp) {
            Ok(target) => target,
            Err(e) => {
                debug!("Forecast unavailable: {}", e);
                return ForecastResult::Unavailable(UnavailableReason::MalformedTimestamp);
            }
        };
        self.forecast_at(coordinates, target)
    }

    /// Forecast for already validated inputs
    pub fn forecast_at(&self, coordinates: Coordinates, target: TargetTime) -> ForecastResult {
        let estimates = self.year_estimates(coordinates, target.calendar_hour);
        self.combine(estimates, target.year)
    }

    /// Interpolated estimate for every historical year with coverage
    pub fn year_estimates(
        &self,
        coordinates: Coordinates,
        calendar_hour: CalendarHour,
    ) -> Vec<YearEstimate> {
        self.parameters
            .history_years()
            .filter_map(|year| {
                let key = calendar_hour.in_year(year);
                let record = self.dataset.lookup(&key)?;
                match estimate_year(record, coordinates, &self.parameters.interpolation) {
                    Ok(Some(estimated_value)) => Some(YearEstimate {
                        year,
                        estimated_value,
                    }),
                    Ok(None) => {
                        debug!("{}: query point is outside the sampled area", key);
                        None
                    }
                    Err(e) => {
                        debug!("{}: interpolation failed: {}", key, e);
                        None
                    }
                }
            })
            .collect()
    }

    /// Evaluate independent requests in parallel
    ///
    /// Results are returned in the order of `queries`.
    pub fn forecast_batch(&self, queries: &[ForecastQuery]) -> Vec<ForecastResult> {
        queries
            .par_iter()
            .map(|query| self.forecast(query.latitude, query.longitude, &query.timestamp))
            .collect()
    }

    fn combine(&self, years: Vec<YearEstimate>, target_year: i32) -> ForecastResult {
        let Some(mean) = mean_estimate(&years) else {
            return ForecastResult::Unavailable(UnavailableReason::NoCoverage);
        };

        if years.len() < self.parameters.min_trend_years {
            return ForecastResult::Available(ForecastEstimate {
                value: mean,
                method: EstimateMethod::Mean,
                years,
            });
        }

        match TrendLine::fit(&years) {
            Ok(line) => ForecastResult::Available(ForecastEstimate {
                value: line.evaluate(target_year),
                method: EstimateMethod::Trend(line),
                years,
            }),
            Err(e) => {
                warn!("Falling back to the mean of {} years: {}", years.len(), e);
                ForecastResult::Available(ForecastEstimate {
                    value: mean,
                    method: EstimateMethod::Mean,
                    years,
                })
            }
        }
    }
}

fn estimate_year(
    record: &HistoricalHourRecord,
    coordinates: Coordinates,
    parameters: &InterpolationParameters,
) -> TempcastResult<Option<f64>> {
    let interpolant = CloughTocher2d::new(record.points(), record.values(), parameters)?;
    // Records store (longitude, latitude) pairs
    Ok(interpolant.interpolate(coordinates.longitude, coordinates.latitude))
}
