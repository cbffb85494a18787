//! Location report
//!
//! Combines the forecast for a point with the place name, an observed
//! temperature and a precipitation amount supplied by external services.
//! The JSON field names of [`LocationReport`] are the ones existing web
//! clients read and must not change.

use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tempcast_core::dataset::{HistoricalDataset, HistoricalLookup};
use tempcast_core::{describe, ForecastEngine};
use thiserror::Error;

/// Shown when a value is unknown
pub const UNKNOWN: &str = "Unknown";
/// Shown when the geocoding service failed
pub const API_ERROR: &str = "API Error";
/// Shown when no observed temperature is available
pub const NOT_AVAILABLE: &str = "N/A";

/// Failure of an external service
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    #[error("Latitude and longitude must both be given as finite numbers")]
    InvalidCoordinates,
}

/// Administrative names for a point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub region: Option<String>,
    pub country: Option<String>,
}

pub trait ReverseGeocoder: Send + Sync {
    fn reverse(&self, latitude: f64, longitude: f64) -> Result<Place, CollaboratorError>;
}

/// Measured temperatures
pub trait ObservationSource: Send + Sync {
    /// Observed temperature (°C) for `date` (`YYYY-MM-DD`) at `time` (`HH:MM`)
    fn hourly_temperature(
        &self,
        latitude: f64,
        longitude: f64,
        date: &str,
        time: &str,
    ) -> Result<Option<f64>, CollaboratorError>;
}

pub trait PrecipitationSource: Send + Sync {
    /// Expected precipitation (mm) given the forecast temperature
    fn precipitation_mm(&self, latitude: f64, longitude: f64, temperature: f64) -> Option<f64>;
}

/// Geocoder for offline use: every place is unknown
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGeocoder;

impl ReverseGeocoder for OfflineGeocoder {
    fn reverse(&self, _latitude: f64, _longitude: f64) -> Result<Place, CollaboratorError> {
        Ok(Place::default())
    }
}

/// Observation source for offline use: nothing is ever observed
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObservations;

impl ObservationSource for NoObservations {
    fn hourly_temperature(
        &self,
        _latitude: f64,
        _longitude: f64,
        _date: &str,
        _time: &str,
    ) -> Result<Option<f64>, CollaboratorError> {
        Ok(None)
    }
}

/// Incoming request
///
/// Coordinates are accepted as JSON numbers or numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationRequest {
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub longitude: Option<f64>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date: Option<String>,
    /// `HH:MM`
    #[serde(default)]
    pub time: Option<String>,
}

impl LocationRequest {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..Default::default()
        }
    }

    pub fn at(mut self, date: &str, time: &str) -> Self {
        self.date = Some(date.to_string());
        self.time = Some(time.to_string());
        self
    }

    fn coordinates(&self) -> Result<(f64, f64), ReportError> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) if latitude.is_finite() && longitude.is_finite() => {
                Ok((latitude, longitude))
            }
            _ => Err(ReportError::InvalidCoordinates),
        }
    }

    /// Date and time, only when both are present and non-blank
    fn date_time(&self) -> Option<(&str, &str)> {
        let date = self.date.as_deref().map(str::trim).filter(|d| !d.is_empty())?;
        let time = self.time.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        Some((date, time))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Unparseable text is treated like a missing coordinate
fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<NumberOrText>::deserialize(deserializer)? {
            Some(NumberOrText::Number(value)) => Some(value),
            Some(NumberOrText::Text(text)) => text.trim().parse::<f64>().ok(),
            None => None,
        },
    )
}

/// Response sent back to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReport {
    #[serde(rename = "departamento")]
    pub region: String,
    #[serde(rename = "pais")]
    pub country: String,
    #[serde(rename = "prediccion_modelo")]
    pub model_prediction: String,
    /// `"{:.2}°C"` or `"N/A"`
    #[serde(rename = "temperatura_real")]
    pub real_temperature: String,
}

impl fmt::Display for LocationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}: {} (observed: {})",
            self.region, self.country, self.model_prediction, self.real_temperature
        )
    }
}

/// Builds [`LocationReport`]s from a forecast engine and external services
pub struct LocationService<L = HistoricalDataset> {
    engine: ForecastEngine<L>,
    geocoder: Box<dyn ReverseGeocoder>,
    observations: Box<dyn ObservationSource>,
    precipitation: Box<dyn PrecipitationSource>,
}

impl<L: HistoricalLookup> LocationService<L> {
    pub fn new(
        engine: ForecastEngine<L>,
        geocoder: Box<dyn ReverseGeocoder>,
        observations: Box<dyn ObservationSource>,
        precipitation: Box<dyn PrecipitationSource>,
    ) -> Self {
        Self {
            engine,
            geocoder,
            observations,
            precipitation,
        }
    }

    pub fn engine(&self) -> &ForecastEngine<L> {
        &self.engine
    }

    /// # Errors
    ///
    /// [`ReportError::InvalidCoordinates`] when either coordinate is missing
    /// or not a finite number. Every other problem degrades a single field.
    pub fn report(&self, request: &LocationRequest) -> Result<LocationReport, ReportError> {
        let (latitude, longitude) = request.coordinates()?;
        let date_time = request.date_time();

        let forecast = date_time
            .map(|(date, time)| {
                self.engine
                    .forecast(latitude, longitude, &format!("{} {}", date, time))
                    .value()
            })
            .unwrap_or_default();
        let precipitation = forecast.and_then(|temperature| {
            self.precipitation
                .precipitation_mm(latitude, longitude, temperature)
        });
        let model_prediction = describe(forecast, precipitation);

        let (region, country) = match self.geocoder.reverse(latitude, longitude) {
            Ok(place) => (
                place.region.unwrap_or_else(|| UNKNOWN.to_string()),
                place.country.unwrap_or_else(|| UNKNOWN.to_string()),
            ),
            Err(e) => {
                warn!("Reverse geocoding failed for ({}, {}): {}", latitude, longitude, e);
                (API_ERROR.to_string(), API_ERROR.to_string())
            }
        };

        let real_temperature = date_time
            .and_then(|(date, time)| {
                match self
                    .observations
                    .hourly_temperature(latitude, longitude, date, time)
                {
                    Ok(observed) => observed,
                    Err(e) => {
                        warn!("Observed temperature unavailable: {}", e);
                        None
                    }
                }
            })
            .filter(|t| t.is_finite())
            .map_or_else(|| NOT_AVAILABLE.to_string(), |t| format!("{:.2}°C", t));

        debug!(
            "Report for ({}, {}): forecast {:?}, precipitation {:?}",
            latitude, longitude, forecast, precipitation
        );

        Ok(LocationReport {
            region,
            country,
            model_prediction,
            real_temperature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_as_numbers_or_text() {
        let request: LocationRequest = serde_json::from_str(
            r#"{"latitude": "-12.05", "longitude": -77.03, "date": "2025-06-01", "time": "12:00"}"#,
        )
        .unwrap();
        assert_eq!(request.latitude, Some(-12.05));
        assert_eq!(request.longitude, Some(-77.03));
        assert_eq!(request.date_time(), Some(("2025-06-01", "12:00")));
    }

    #[test]
    fn bad_coordinates_are_rejected() {
        for body in [
            r#"{"longitude": -77.03}"#,
            r#"{"latitude": null, "longitude": -77.03}"#,
            r#"{"latitude": "north", "longitude": -77.03}"#,
            r#"{"latitude": "NaN", "longitude": -77.03}"#,
        ] {
            let request: LocationRequest = serde_json::from_str(body).unwrap();
            assert_eq!(request.coordinates(), Err(ReportError::InvalidCoordinates), "{body}");
        }
    }

    #[test]
    fn date_and_time_are_both_required() {
        let request = LocationRequest {
            date: Some("2025-06-01".to_string()),
            time: Some("  ".to_string()),
            ..LocationRequest::new(0.0, 0.0)
        };
        assert_eq!(request.date_time(), None);
        assert_eq!(LocationRequest::new(0.0, 0.0).date_time(), None);
    }

    #[test]
    fn report_uses_legacy_keys() {
        let report = LocationReport {
            region: "Lima".to_string(),
            country: "Peru".to_string(),
            model_prediction: "Forecast unavailable.".to_string(),
            real_temperature: NOT_AVAILABLE.to_string(),
        };
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["departamento"], "Lima");
        assert_eq!(value["pais"], "Peru");
        assert_eq!(value["prediccion_modelo"], "Forecast unavailable.");
        assert_eq!(value["temperatura_real"], "N/A");
    }
}
