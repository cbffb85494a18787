//! Scattered-data interpolation over a Delaunay triangulation
//!
//! [`CloughTocher2d`] builds a piecewise-cubic, C1-continuous interpolant from
//! irregularly placed samples:
//!
//! 1. the samples are triangulated (Delaunay, via `spade`);
//! 2. a gradient is estimated at every vertex by minimising the curvature of
//!    the interpolant along all triangulation edges ([`gradients`]);
//! 3. each triangle is split at its centroid into three cubic Bézier patches
//!    that match values and gradients at the vertices ([`patch`]).
//!
//! Queries outside the convex hull of the samples have no value.
//!
//! # Examples
//!
//! ```rust
//! use ndarray::array;
//! use tempcast_core::interpolate::CloughTocher2d;
//! use tempcast_core::parameters::InterpolationParameters;
//!
//! // f(x, y) = 2x - y + 1 sampled on the corners of a square
//! let points = array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
//! let values = array![1.0, 3.0, 0.0, 2.0];
//! let interpolant =
//!     CloughTocher2d::new(points.view(), values.view(), &InterpolationParameters::default())
//!         .unwrap();
//!
//! let value = interpolant.interpolate(0.25, 0.5).unwrap();
//! assert!((value - 1.0).abs() < 1e-4);
//! assert!(interpolant.interpolate(2.0, 2.0).is_none());
//! ```

mod gradients;
mod patch;

use crate::errors::{TempcastError, TempcastResult};
use crate::parameters::InterpolationParameters;
use log::debug;
use ndarray::{ArrayView1, ArrayView2};
use spade::{DelaunayTriangulation, HasPosition, Point2, PositionInTriangulation, Triangulation};

/// A measured value at a (x, y) position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    position: Point2<f64>,
    value: f64,
}

impl SamplePoint {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self {
            position: Point2::new(x, y),
            value,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl HasPosition for SamplePoint {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

/// Clough-Tocher interpolant over scattered 2D samples
#[derive(Debug, Clone)]
pub struct CloughTocher2d {
    triangulation: DelaunayTriangulation<SamplePoint>,
    /// Estimated gradient per vertex, indexed by the vertex handle index
    gradients: Vec<[f64; 2]>,
}

impl CloughTocher2d {
    /// Build the interpolant
    ///
    /// # Arguments
    ///
    /// * `points` - Sample positions, shape `(n, 2)`
    /// * `values` - Sample values, length `n`
    /// * `parameters` - Controls the gradient estimation
    ///
    /// # Errors
    ///
    /// * [`TempcastError::DegenerateTriangulation`] with fewer than three
    ///   samples or when all samples are collinear
    /// * [`TempcastError::InvalidSample`] for non-finite or out of range positions
    pub fn new(
        points: ArrayView2<f64>,
        values: ArrayView1<f64>,
        parameters: &InterpolationParameters,
    ) -> TempcastResult<Self> {
        if points.ncols() != 2 {
            return Err(TempcastError::InvalidPointShape(points.ncols()));
        }
        if points.nrows() != values.len() {
            return Err(TempcastError::MisalignedRecord {
                points: points.nrows(),
                values: values.len(),
            });
        }

        let mut triangulation = DelaunayTriangulation::<SamplePoint>::new();
        for (row, &value) in points.rows().into_iter().zip(values.iter()) {
            let (x, y) = (row[0], row[1]);
            if !x.is_finite() || !y.is_finite() {
                return Err(TempcastError::InvalidSample { x, y });
            }
            // Repeated positions keep the first sample
            if matches!(
                triangulation.locate(Point2::new(x, y)),
                PositionInTriangulation::OnVertex(_)
            ) {
                debug!("Ignoring repeated sample at ({}, {})", x, y);
                continue;
            }
            triangulation
                .insert(SamplePoint::new(x, y, value))
                .map_err(|_| TempcastError::InvalidSample { x, y })?;
        }

        if triangulation.num_inner_faces() == 0 {
            return Err(TempcastError::DegenerateTriangulation(points.nrows()));
        }

        let gradients = gradients::estimate_gradients(&triangulation, parameters);
        Ok(Self {
            triangulation,
            gradients,
        })
    }

    /// Number of distinct sample positions
    pub fn num_samples(&self) -> usize {
        self.triangulation.num_vertices()
    }

    /// Whether `(x, y)` lies inside (or on the boundary of) the convex hull
    pub fn contains(&self, x: f64, y: f64) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        !matches!(
            self.triangulation.locate(Point2::new(x, y)),
            PositionInTriangulation::OutsideOfConvexHull(_)
                | PositionInTriangulation::NoTriangulation
        )
    }

    /// Sample positions with their estimated gradients
    pub fn vertex_gradients(&self) -> Vec<([f64; 2], [f64; 2])> {
        self.triangulation
            .vertices()
            .map(|vertex| {
                let position = vertex.position();
                (
                    [position.x, position.y],
                    self.gradients[vertex.fix().index()],
                )
            })
            .collect()
    }

    /// Evaluate the interpolant at `(x, y)`
    ///
    /// Returns `None` outside the convex hull of the samples or when the
    /// result is not finite.
    pub fn interpolate(&self, x: f64, y: f64) -> Option<f64> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let query = Point2::new(x, y);

        let face = match self.triangulation.locate(query) {
            PositionInTriangulation::OnVertex(vertex) => {
                return Some(self.triangulation.vertex(vertex).data().value);
            }
            PositionInTriangulation::OnFace(face) => self.triangulation.face(face),
            PositionInTriangulation::OnEdge(edge) => {
                let edge = self.triangulation.directed_edge(edge);
                edge.face()
                    .as_inner()
                    .or_else(|| edge.rev().face().as_inner())?
            }
            PositionInTriangulation::OutsideOfConvexHull(_)
            | PositionInTriangulation::NoTriangulation => return None,
        };

        let value = patch::evaluate(face, &self.gradients, query);
        value.is_finite().then_some(value)
    }
}
