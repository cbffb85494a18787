//! Vertex gradient estimation for the Clough-Tocher interpolant.
//!
//! Restricted to an edge, the interpolant is the cubic fixed by the values
//! and the directional derivatives at both end points. The gradients are
//! chosen to minimise $\sum_E \int_E |W''|^2$, the summed squared second
//! derivative along every triangulation edge.
//!
//! With the neighbouring gradients held fixed, the minimisation for a single
//! vertex is a 2x2 linear problem, so the global problem is solved by
//! Gauss-Seidel sweeps over the vertices.

use super::SamplePoint;
use crate::parameters::InterpolationParameters;
use log::debug;
use nalgebra::{Matrix2, Vector2};
use spade::{DelaunayTriangulation, Triangulation};

/// Estimate a gradient at every vertex, indexed by vertex handle index
pub(super) fn estimate_gradients(
    triangulation: &DelaunayTriangulation<SamplePoint>,
    parameters: &InterpolationParameters,
) -> Vec<[f64; 2]> {
    let n = triangulation.num_vertices();
    let mut positions = vec![[0.0; 2]; n];
    let mut values = vec![0.0; n];
    let mut neighbours: Vec<Vec<usize>> = vec![Vec::new(); n];

    for vertex in triangulation.vertices() {
        let index = vertex.fix().index();
        let position = vertex.position();
        positions[index] = [position.x, position.y];
        values[index] = vertex.data().value;
        neighbours[index] = vertex
            .out_edges()
            .map(|edge| edge.to().fix().index())
            .collect();
    }

    let mut gradients = vec![[0.0; 2]; n];

    for sweep in 0..parameters.gradient_max_iterations {
        let mut max_change: f64 = 0.0;

        for i in 0..n {
            let mut q = Matrix2::<f64>::zeros();
            let mut s = Vector2::<f64>::zeros();

            for &j in &neighbours[i] {
                let edge = Vector2::new(
                    positions[j][0] - positions[i][0],
                    positions[j][1] - positions[i][1],
                );
                let length_cubed = edge.norm().powi(3);
                let f1 = values[i];
                let f2 = values[j];
                // Derivative at the far end, pointing back along the edge
                let df2 = -(edge[0] * gradients[j][0] + edge[1] * gradients[j][1]);

                q += edge * edge.transpose() * (4.0 / length_cubed);
                s += edge * ((6.0 * (f1 - f2) - 2.0 * df2) / length_cubed);
            }

            let Some(inverse) = q.try_inverse() else {
                continue;
            };
            let r = inverse * s;

            let change = (gradients[i][0] + r[0]).abs().max((gradients[i][1] + r[1]).abs())
                / 1.0_f64.max(r[0].abs()).max(r[1].abs());
            gradients[i] = [-r[0], -r[1]];
            max_change = max_change.max(change);
        }

        if max_change < parameters.gradient_tolerance {
            debug!(
                "Gradient estimation converged after {} sweeps over {} vertices",
                sweep + 1,
                n
            );
            return gradients;
        }
    }

    debug!(
        "Gradient estimation stopped after {} sweeps without converging",
        parameters.gradient_max_iterations
    );
    gradients
}
