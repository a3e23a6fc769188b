use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::flatten::flatten_arc;
use crate::geometry::tolerance::EPS_POS;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Point3 { x, y, z }
    }

    pub const fn xy(x: f64, y: f64) -> Self {
        Point3 { x, y, z: 0.0 }
    }

    pub fn distance_sq(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance(&self, other: &Point3) -> f64 {
        self.distance_sq(other).sqrt()
    }

    pub fn coincides(&self, other: &Point3, tol: f64) -> bool {
        self.distance_sq(other) <= tol * tol
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Oriented boundary primitive of a sketch loop.
///
/// Arcs are circular, lie in the plane `z = center.z` and run from
/// `start_angle` through `start_angle + sweep` (positive sweep is
/// counter-clockwise).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Curve {
    Line {
        start: Point3,
        end: Point3,
    },
    Arc {
        center: Point3,
        radius: f64,
        start_angle: f64,
        sweep: f64,
    },
}

impl Curve {
    pub fn line(start: Point3, end: Point3) -> Self {
        Curve::Line { start, end }
    }

    pub fn arc(center: Point3, radius: f64, start_angle: f64, sweep: f64) -> Self {
        Curve::Arc {
            center,
            radius,
            start_angle,
            sweep,
        }
    }

    pub fn start_pt(&self) -> Point3 {
        match self {
            Curve::Line { start, .. } => *start,
            Curve::Arc {
                center,
                radius,
                start_angle,
                ..
            } => arc_point(center, *radius, *start_angle),
        }
    }

    pub fn end_pt(&self) -> Point3 {
        match self {
            Curve::Line { end, .. } => *end,
            Curve::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => arc_point(center, *radius, start_angle + sweep),
        }
    }

    pub fn reversed(&self) -> Curve {
        match self {
            Curve::Line { start, end } => Curve::Line {
                start: *end,
                end: *start,
            },
            Curve::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => Curve::Arc {
                center: *center,
                radius: *radius,
                start_angle: start_angle + sweep,
                sweep: -sweep,
            },
        }
    }

    pub fn length(&self) -> f64 {
        match self {
            Curve::Line { start, end } => start.distance(end),
            Curve::Arc { radius, sweep, .. } => radius.abs() * sweep.abs(),
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Curve::Line { start, end } => start.is_finite() && end.is_finite(),
            Curve::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => center.is_finite() && radius.is_finite() && start_angle.is_finite() && sweep.is_finite(),
        }
    }

    /// Polyline approximation starting at `start_pt()`; the end point is
    /// included.
    pub fn flatten(&self, tol: f64) -> Vec<Point3> {
        match self {
            Curve::Line { start, end } => vec![*start, *end],
            Curve::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => {
                let mut pts = vec![self.start_pt()];
                flatten_arc(&mut pts, center, *radius, *start_angle, *sweep, tol);
                pts
            }
        }
    }

    /// True when the curve joins `other` head to tail.
    pub fn connects_to(&self, other: &Curve) -> bool {
        self.end_pt().coincides(&other.start_pt(), EPS_POS)
    }
}

fn arc_point(center: &Point3, radius: f64, angle: f64) -> Point3 {
    Point3 {
        x: center.x + radius * angle.cos(),
        y: center.y + radius * angle.sin(),
        z: center.z,
    }
}

/// Stable identifier of a parametric element taking part in constraints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    Positional,
    Rotational,
    Opaque,
}

/// A constraint as handed to the solver. `payload` is never interpreted
/// here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub id: ConstraintId,
    pub kind: ConstraintKind,
    #[serde(default)]
    pub targets: Vec<ElementId>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Constraint {
    pub fn new(id: u32, kind: ConstraintKind, targets: Vec<ElementId>) -> Self {
        Constraint {
            id: ConstraintId(id),
            kind,
            targets,
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Outer boundary plus holes of one sketch face, tagged with its topology
/// class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub outer: Vec<Curve>,
    #[serde(default)]
    pub holes: Vec<Vec<Curve>>,
    pub topo: String,
}

/// Caller-supplied curve loops for a region edit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionInput {
    pub outer: Vec<Curve>,
    #[serde(default)]
    pub holes: Vec<Vec<Curve>>,
}

impl RegionInput {
    pub fn new(outer: Vec<Curve>) -> Self {
        RegionInput {
            outer,
            holes: Vec::new(),
        }
    }

    pub fn with_hole(mut self, hole: Vec<Curve>) -> Self {
        self.holes.push(hole);
        self
    }
}

/// Convenience: closed polyline as line curves.
pub fn polygon_curves(points: &[(f64, f64)]) -> Vec<Curve> {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (ax, ay) = points[i];
            let (bx, by) = points[(i + 1) % n];
            Curve::line(Point3::xy(ax, ay), Point3::xy(bx, by))
        })
        .collect()
}
