//! Evaluation of a single Clough-Tocher macro-triangle.
//!
//! The triangle $(P_1, P_2, P_3)$ is split at its centroid $P_4$ into three
//! sub-triangles, each carrying a cubic Bézier patch. Control points are named
//! `cIJKL` after their barycentric multi-index over $(P_1, P_2, P_3, P_4)$.
//! Vertex values and gradients fix the corner and edge control points; the
//! cross-boundary derivative at each edge midpoint is chosen so that the
//! interpolant is C1 across interior edges and has a linear normal derivative
//! along the convex hull.

use super::SamplePoint;
use spade::handles::{FaceHandle, InnerTag};
use spade::Point2;

type Face<'a> = FaceHandle<'a, InnerTag, SamplePoint, (), (), ()>;

/// Barycentric coordinates of `p` with respect to `corners`
fn barycentric(corners: &[Point2<f64>; 3], p: Point2<f64>) -> [f64; 3] {
    let [a, b, c] = corners;
    let det = (b.y - c.y) * (a.x - c.x) + (c.x - b.x) * (a.y - c.y);
    let l1 = ((b.y - c.y) * (p.x - c.x) + (c.x - b.x) * (p.y - c.y)) / det;
    let l2 = ((c.y - a.y) * (p.x - c.x) + (a.x - c.x) * (p.y - c.y)) / det;
    [l1, l2, 1.0 - l1 - l2]
}

fn centroid(corners: [Point2<f64>; 3]) -> Point2<f64> {
    Point2::new(
        (corners[0].x + corners[1].x + corners[2].x) / 3.0,
        (corners[0].y + corners[1].y + corners[2].y) / 3.0,
    )
}

/// Cross-boundary derivative weights for the three edges of `face`
///
/// Entry `k` belongs to the edge opposite vertex `k`. Hull edges use `-1/2`.
fn edge_weights(face: Face<'_>, corners: &[Point2<f64>; 3]) -> [f64; 3] {
    let vertices = face.vertices().map(|vertex| vertex.fix());
    let edges = face.adjacent_edges();
    let mut g = [-0.5; 3];

    for (k, weight) in g.iter_mut().enumerate() {
        let opposite = edges
            .iter()
            .find(|edge| edge.from().fix() != vertices[k] && edge.to().fix() != vertices[k]);
        let Some(neighbour) = opposite.and_then(|edge| edge.rev().face().as_inner()) else {
            continue;
        };

        let c = barycentric(
            corners,
            centroid(neighbour.vertices().map(|vertex| vertex.position())),
        );
        *weight = match k {
            0 => (2.0 * c[2] + c[1] - 1.0) / (2.0 - 3.0 * c[2] - 3.0 * c[1]),
            1 => (2.0 * c[0] + c[2] - 1.0) / (2.0 - 3.0 * c[0] - 3.0 * c[2]),
            _ => (2.0 * c[1] + c[0] - 1.0) / (2.0 - 3.0 * c[1] - 3.0 * c[0]),
        };
    }
    g
}

/// Evaluate the interpolant inside `face` at `query`
pub(super) fn evaluate(face: Face<'_>, gradients: &[[f64; 2]], query: Point2<f64>) -> f64 {
    let vertices = face.vertices();
    let corners = vertices.map(|vertex| vertex.position());
    let [f1, f2, f3] = vertices.map(|vertex| vertex.data().value());
    let [df1, df2, df3] = vertices.map(|vertex| gradients[vertex.fix().index()]);

    let e12 = [corners[1].x - corners[0].x, corners[1].y - corners[0].y];
    let e23 = [corners[2].x - corners[1].x, corners[2].y - corners[1].y];
    let e31 = [corners[0].x - corners[2].x, corners[0].y - corners[2].y];
    let dot = |g: [f64; 2], e: [f64; 2]| g[0] * e[0] + g[1] * e[1];

    // Directional derivatives along the edges, leaving each vertex
    let df12 = dot(df1, e12);
    let df21 = -dot(df2, e12);
    let df23 = dot(df2, e23);
    let df32 = -dot(df3, e23);
    let df31 = dot(df3, e31);
    let df13 = -dot(df1, e31);

    let c3000 = f1;
    let c2100 = (df12 + 3.0 * c3000) / 3.0;
    let c2010 = (df13 + 3.0 * c3000) / 3.0;
    let c0300 = f2;
    let c1200 = (df21 + 3.0 * c0300) / 3.0;
    let c0210 = (df23 + 3.0 * c0300) / 3.0;
    let c0030 = f3;
    let c1020 = (df31 + 3.0 * c0030) / 3.0;
    let c0120 = (df32 + 3.0 * c0030) / 3.0;

    let c2001 = (c2100 + c2010 + c3000) / 3.0;
    let c0201 = (c1200 + c0300 + c0210) / 3.0;
    let c0021 = (c1020 + c0120 + c0030) / 3.0;

    let g = edge_weights(face, &corners);

    let c0111 = (g[0] * (-c0300 + 3.0 * c0210 - 3.0 * c0120 + c0030)
        + (-c0300 + 2.0 * c0210 - c0120 + c0021 + c0201))
        / 2.0;
    let c1011 = (g[1] * (-c0030 + 3.0 * c1020 - 3.0 * c2010 + c3000)
        + (-c0030 + 2.0 * c1020 - c2010 + c2001 + c0021))
        / 2.0;
    let c1101 = (g[2] * (-c3000 + 3.0 * c2100 - 3.0 * c1200 + c0300)
        + (-c3000 + 2.0 * c2100 - c1200 + c2001 + c0201))
        / 2.0;

    let c1002 = (c1101 + c1011 + c2001) / 3.0;
    let c0102 = (c1101 + c0111 + c0201) / 3.0;
    let c0012 = (c1011 + c0111 + c0021) / 3.0;
    let c0003 = (c1002 + c0102 + c0012) / 3.0;

    // Coordinates within the sub-triangle: the smallest barycentric weight
    // moves to the centroid, so one of b1, b2, b3 is always zero.
    let b = barycentric(&corners, query);
    let min = b[0].min(b[1]).min(b[2]);
    let (b1, b2, b3, b4) = (b[0] - min, b[1] - min, b[2] - min, 3.0 * min);

    b1.powi(3) * c3000
        + 3.0 * b1.powi(2) * b2 * c2100
        + 3.0 * b1.powi(2) * b3 * c2010
        + 3.0 * b1.powi(2) * b4 * c2001
        + 3.0 * b1 * b2.powi(2) * c1200
        + 6.0 * b1 * b2 * b4 * c1101
        + 3.0 * b1 * b3.powi(2) * c1020
        + 6.0 * b1 * b3 * b4 * c1011
        + 3.0 * b1 * b4.powi(2) * c1002
        + b2.powi(3) * c0300
        + 3.0 * b2.powi(2) * b3 * c0210
        + 3.0 * b2.powi(2) * b4 * c0201
        + 3.0 * b2 * b3.powi(2) * c0120
        + 6.0 * b2 * b3 * b4 * c0111
        + 3.0 * b2 * b4.powi(2) * c0102
        + b3.powi(3) * c0030
        + 3.0 * b3.powi(2) * b4 * c0021
        + 3.0 * b3 * b4.powi(2) * c0012
        + b4.powi(3) * c0003
}
