//! Hourly temperature forecasts for arbitrary locations
//!
//! The forecasting engine lives in [`tempcast_core`]; this crate adds the
//! location report served to clients and the collaborators it depends on.

pub mod precipitation;
pub mod report;

pub use tempcast_core::{describe, ForecastEngine, ForecastResult};
