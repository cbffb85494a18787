//! Inter-annual trend of yearly estimates.

use crate::errors::{TempcastError, TempcastResult};
use crate::forecast::YearEstimate;
use nalgebra::{DMatrix, DVector};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Singular values below this threshold are treated as zero
const SVD_EPSILON: f64 = 1e-12;

/// Straight line `value = slope * year + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    /// Ordinary least-squares fit of estimate against year
    ///
    /// Years are centred before solving so the design matrix stays well
    /// conditioned for calendar years.
    ///
    /// # Errors
    ///
    /// Returns [`TempcastError::TrendFit`] with fewer than two distinct years.
    pub fn fit(estimates: &[YearEstimate]) -> TempcastResult<Self> {
        let n = estimates.len();
        if n < 2 {
            return Err(TempcastError::TrendFit(format!(
                "need at least 2 yearly estimates, got {}",
                n
            )));
        }

        let mean_year = estimates.iter().map(|e| e.year as f64).sum::<f64>() / n as f64;
        let design = DMatrix::from_fn(n, 2, |i, j| match j {
            0 => estimates[i].year as f64 - mean_year,
            _ => 1.0,
        });
        if design.column(0).iter().all(|offset| *offset == 0.0) {
            return Err(TempcastError::TrendFit(
                "all estimates belong to the same year".to_string(),
            ));
        }
        let observed = DVector::from_iterator(n, estimates.iter().map(|e| e.estimated_value));

        let coefficients = design
            .svd(true, true)
            .solve(&observed, SVD_EPSILON)
            .map_err(|e| TempcastError::TrendFit(e.to_string()))?;

        let slope = coefficients[0];
        let intercept = coefficients[1] - slope * mean_year;
        if !slope.is_finite() || !intercept.is_finite() {
            return Err(TempcastError::TrendFit(
                "non-finite regression coefficients".to_string(),
            ));
        }
        Ok(Self { slope, intercept })
    }

    pub fn evaluate(&self, year: i32) -> f64 {
        self.slope * year as f64 + self.intercept
    }
}

/// Arithmetic mean of the estimates, `None` when there are none
pub fn mean_estimate(estimates: &[YearEstimate]) -> Option<f64> {
    Array1::from_iter(estimates.iter().map(|e| e.estimated_value)).mean()
}
