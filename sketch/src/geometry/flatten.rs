use crate::geometry::tolerance::{EPS_LEN, MAX_ARC_SEGMENTS};
use crate::model::Point3;

/// Appends the arc's points after its start point. Segment count is chosen
/// so the sagitta of each chord stays within `tol`.
pub fn flatten_arc(points: &mut Vec<Point3>, center: &Point3, radius: f64, start_angle: f64, sweep: f64, tol: f64) {
    let r = radius.abs();
    let n = if r <= EPS_LEN || sweep.abs() <= EPS_LEN {
        1
    } else {
        // sagitta s = r (1 - cos(theta/2)) <= tol
        let ratio = (1.0 - tol / r).clamp(-1.0, 1.0);
        let max_step = 2.0 * ratio.acos();
        if max_step <= EPS_LEN {
            MAX_ARC_SEGMENTS
        } else {
            ((sweep.abs() / max_step).ceil() as usize).clamp(1, MAX_ARC_SEGMENTS)
        }
    };
    for i in 1..=n {
        let a = start_angle + sweep * (i as f64 / n as f64);
        points.push(Point3 { x: center.x + radius * a.cos(), y: center.y + radius * a.sin(), z: center.z });
    }
}
