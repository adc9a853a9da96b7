//! Easing laws and Bézier evaluation for the interpolation engine.

use crate::model::ControlPoint;

/// Linear interpolation of scalars.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Quadratic ease-in: slow start, fast finish.
#[inline]
pub fn ease_in(t: f64) -> f64 {
    t * t
}

/// Quadratic ease-out: fast start, slow finish.
#[inline]
pub fn ease_out(t: f64) -> f64 {
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Smoothstep: slow at both ends.
#[inline]
pub fn ease_in_out(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// Evaluates one axis's Bézier easing curve at parameter `t`.
///
/// The control polygon is the axis's control points with implied endpoints
/// (0,0) and (1,1); the eased parameter is the curve's y component,
/// computed by De Casteljau reduction. An empty control array degenerates
/// to the linear law.
pub fn bezier_axis(points: &[ControlPoint], t: f64) -> f64 {
    if points.is_empty() {
        return t;
    }

    let mut polygon: Vec<(f64, f64)> = Vec::with_capacity(points.len() + 2);
    polygon.push((0.0, 0.0));
    polygon.extend(points.iter().map(|p| (p.x, p.y)));
    polygon.push((1.0, 1.0));

    while polygon.len() > 1 {
        for i in 0..polygon.len() - 1 {
            polygon[i] = (
                lerp(polygon[i].0, polygon[i + 1].0, t),
                lerp(polygon[i].1, polygon[i + 1].1, t),
            );
        }
        polygon.pop();
    }

    polygon[0].1
}
