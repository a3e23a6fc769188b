use super::tolerance::EPS_FACE_AREA;
use crate::model::Point3;

/// Shoelace area in the XY plane; positive for counter-clockwise.
pub fn signed_area(poly: &[Point3]) -> f64 {
    let mut a = 0.0f64;
    for i in 0..poly.len() {
        let j = (i + 1) % poly.len();
        a += poly[i].x * poly[j].y - poly[j].x * poly[i].y;
    }
    0.5 * a
}

pub fn seg_distance_sq(p: &Point3, a: &Point3, b: &Point3) -> f64 {
    let vx = b.x - a.x; let vy = b.y - a.y;
    let wx = p.x - a.x; let wy = p.y - a.y;
    let vv = vx*vx + vy*vy;
    let t = if vv > 0.0 { ((wx*vx + wy*vy) / vv).clamp(0.0, 1.0) } else { 0.0 };
    let dx = p.x - (a.x + t * vx); let dy = p.y - (a.y + t * vy);
    dx*dx + dy*dy
}

/// Even-odd containment. Points within `tol` of the boundary are reported
/// as outside.
pub fn point_in_polygon(p: &Point3, poly: &[Point3], tol: f64) -> bool {
    let n = poly.len();
    if n < 3 { return false; }
    for i in 0..n {
        if seg_distance_sq(p, &poly[i], &poly[(i + 1) % n]) <= tol * tol { return false; }
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (&poly[i], &poly[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x = pi.x + (p.y - pi.y) * (pj.x - pi.x) / (pj.y - pi.y);
            if p.x < x { inside = !inside; }
        }
        j = i;
    }
    inside
}

pub fn polygon_bbox(poly: &[Point3]) -> Option<(f64, f64, f64, f64)> {
    let first = poly.first()?;
    let mut b = (first.x, first.y, first.x, first.y);
    for p in &poly[1..] {
        b = (b.0.min(p.x), b.1.min(p.y), b.2.max(p.x), b.3.max(p.y));
    }
    Some(b)
}

pub fn union_bbox(
    a: Option<(f64, f64, f64, f64)>,
    b: Option<(f64, f64, f64, f64)>,
) -> Option<(f64, f64, f64, f64)> {
    match (a, b) {
        (None, x) => x,
        (x, None) => x,
        (Some((ax0, ay0, ax1, ay1)), Some((bx0, by0, bx1, by1))) => {
            Some((ax0.min(bx0), ay0.min(by0), ax1.max(bx1), ay1.max(by1)))
        }
    }
}

fn orient(a: &Point3, b: &Point3, c: &Point3) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// True when segments `ab` and `cd` cross, or come within `tol` of each
/// other at an endpoint.
pub fn segments_touch(a: &Point3, b: &Point3, c: &Point3, d: &Point3, tol: f64) -> bool {
    if orient(c, d, a) * orient(c, d, b) < 0.0 && orient(a, b, c) * orient(a, b, d) < 0.0 {
        return true;
    }
    let t2 = tol * tol;
    seg_distance_sq(a, c, d) <= t2
        || seg_distance_sq(b, c, d) <= t2
        || seg_distance_sq(c, a, b) <= t2
        || seg_distance_sq(d, a, b) <= t2
}

fn bbox_overlap(a: (f64, f64, f64, f64), b: (f64, f64, f64, f64), tol: f64) -> bool {
    a.0 <= b.2 + tol && b.0 <= a.2 + tol && a.1 <= b.3 + tol && b.1 <= a.3 + tol
}

/// True when any edge of closed polygon `p` touches any edge of `q`.
pub fn boundaries_touch(p: &[Point3], q: &[Point3], tol: f64) -> bool {
    match (polygon_bbox(p), polygon_bbox(q)) {
        (Some(bp), Some(bq)) if bbox_overlap(bp, bq, tol) => {}
        _ => return false,
    }
    let (n, m) = (p.len(), q.len());
    for i in 0..n {
        let (a, b) = (&p[i], &p[(i + 1) % n]);
        let ea = (a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y));
        for j in 0..m {
            let (c, d) = (&q[j], &q[(j + 1) % m]);
            let eb = (c.x.min(d.x), c.y.min(d.y), c.x.max(d.x), c.y.max(d.y));
            if bbox_overlap(ea, eb, tol) && segments_touch(a, b, c, d, tol) {
                return true;
            }
        }
    }
    false
}

pub fn is_degenerate_area(area: f64) -> bool { area.abs() < EPS_FACE_AREA }

/// True when both closed vertex cycles visit the same points in the same
/// cyclic order, in either direction.
pub fn same_cycle(a: &[Point3], b: &[Point3], tol: f64) -> bool {
    let n = a.len();
    if n != b.len() || n == 0 { return false; }
    for k in 0..n {
        if (0..n).all(|i| a[i].coincides(&b[(i + k) % n], tol)) { return true; }
        if (0..n).all(|i| a[i].coincides(&b[(k + n - i) % n], tol)) { return true; }
    }
    false
}
