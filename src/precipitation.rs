//! Precipitation sources
//!
//! No precipitation model exists yet, so reports use a simulated amount.

use crate::report::PrecipitationSource;
use rand::Rng;

/// Upper bound (exclusive) of the simulated amount, in mm
pub const DEFAULT_MAX_PRECIPITATION_MM: f64 = 7.0;

/// Uniformly random precipitation amount in `[0, max_mm)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedPrecipitation {
    max_mm: f64,
}

impl SimulatedPrecipitation {
    pub fn new(max_mm: f64) -> Self {
        Self { max_mm }
    }

    pub fn max_mm(&self) -> f64 {
        self.max_mm
    }

    /// Draw an amount from `rng`
    ///
    /// A non-positive (or NaN) upper bound always yields 0 mm.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max_mm > 0.0 && self.max_mm.is_finite() {
            rng.gen_range(0.0..self.max_mm)
        } else {
            0.0
        }
    }
}

impl Default for SimulatedPrecipitation {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PRECIPITATION_MM)
    }
}

impl PrecipitationSource for SimulatedPrecipitation {
    fn precipitation_mm(&self, _latitude: f64, _longitude: f64, _temperature: f64) -> Option<f64> {
        Some(self.sample(&mut rand::thread_rng()))
    }
}

/// Always reports the same amount (or nothing)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedPrecipitation(pub Option<f64>);

impl PrecipitationSource for FixedPrecipitation {
    fn precipitation_mm(&self, _latitude: f64, _longitude: f64, _temperature: f64) -> Option<f64> {
        self.0
    }
}
