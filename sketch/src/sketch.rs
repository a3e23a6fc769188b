//! Sketch builders and the registry that hands out non-owning handles to
//! them.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::error::{Result, SketchError};
use crate::geometry::math::{is_degenerate_area, polygon_bbox, same_cycle, signed_area, union_bbox};
use crate::geometry::tolerance::{valid_tolerance, ARC_FLATTEN_TOL, EPS_POS};
use crate::model::{Curve, Point3, Region};

/// Class suffix of a region replacing an existing open face.
pub const FACE_TOPO_TAG: &str = "face";
/// Class suffix of a freshly drawn face.
pub const DRAW_FACE_TOPO_TAG: &str = "drawface";

/// Parsed form of a region's `topo` string, `"<source>_<class>"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TopoTag {
    /// `"-1_face"`
    Replace,
    /// `"<n>_drawface"`
    Draw(u32),
}

impl TopoTag {
    pub fn parse(s: &str) -> Option<TopoTag> {
        let (source, class) = s.split_once('_')?;
        match class {
            FACE_TOPO_TAG if source == "-1" => Some(TopoTag::Replace),
            DRAW_FACE_TOPO_TAG => source.parse::<u32>().ok().map(TopoTag::Draw),
            _ => None,
        }
    }

    pub fn is_replacement(&self) -> bool {
        matches!(self, TopoTag::Replace)
    }
}

impl fmt::Display for TopoTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopoTag::Replace => write!(f, "-1_{}", FACE_TOPO_TAG),
            TopoTag::Draw(n) => write!(f, "{}_{}", n, DRAW_FACE_TOPO_TAG),
        }
    }
}

/// Polygonized face derived from one region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub topo: String,
    pub outer: Vec<Point3>,
    pub holes: Vec<Vec<Point3>>,
    /// Outer area minus hole areas, always non-negative.
    pub area: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Appendix {
    pub face_count: usize,
    pub bbox: Option<(f64, f64, f64, f64)>, // minx,miny,maxx,maxy
    /// Extents rectangle, counter-clockwise from the min corner.
    pub guide_lines: Vec<Curve>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sketch {
    pub faces: Vec<Face>,
    pub appendix: Appendix,
}

/// Closed boundary as a polygon, arcs flattened to `tol`.
pub fn loop_polygon(curves: &[Curve], tol: f64) -> Vec<Point3> {
    let mut poly = Vec::new();
    for c in curves {
        let pts = c.flatten(tol);
        if let Some((_, head)) = pts.split_last() {
            poly.extend_from_slice(head);
        }
    }
    poly
}

/// Start point of every curve, in order.
pub fn vertex_cycle(curves: &[Curve]) -> Vec<Point3> {
    curves.iter().map(Curve::start_pt).collect()
}

/// Builder-side half of a region edit: owns the regions and the derived
/// sketch.
pub trait SketchBuilder {
    fn sketch(&self) -> &Sketch;

    fn regions(&self) -> &[Region];

    /// Validates every region before mutating anything. Replacement regions
    /// swap out the existing region with the same outer vertex cycle; all
    /// others are appended. A replacement that matches no region, or a
    /// region already replaced in the same batch, is rejected.
    fn add_regions(&mut self, regions: Vec<Region>) -> Result<()>;

    /// Overwrites the region list wholesale (undo/redo).
    fn restore_regions(&mut self, regions: Vec<Region>);

    fn update_appendix(&mut self);

    /// Id the next call to `next_topo_id` will hand out.
    fn peek_topo_id(&self) -> u32;

    /// Monotonic per builder; never reused.
    fn next_topo_id(&mut self) -> u32;

    /// Point coincidence tolerance used when matching boundaries.
    fn tolerance(&self) -> f64 {
        EPS_POS
    }
}

#[derive(Clone, Debug)]
pub struct Sketch2dBuilder {
    regions: Vec<Region>,
    sketch: Sketch,
    next_topo: u32,
    flatten_tol: f64,
    tolerance: f64,
}

impl Default for Sketch2dBuilder {
    fn default() -> Self {
        Sketch2dBuilder {
            regions: Vec::new(),
            sketch: Sketch::default(),
            next_topo: 0,
            flatten_tol: ARC_FLATTEN_TOL,
            tolerance: EPS_POS,
        }
    }
}

impl Sketch2dBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flatten_tolerance(&self) -> f64 {
        self.flatten_tol
    }

    pub fn set_flatten_tolerance(&mut self, tol: f64) -> bool {
        if !valid_tolerance(tol) {
            return false;
        }
        self.flatten_tol = tol;
        true
    }

    pub fn set_tolerance(&mut self, tol: f64) -> bool {
        if !valid_tolerance(tol) {
            return false;
        }
        self.tolerance = tol;
        true
    }

    fn check_closed(&self, index: usize, what: &str, curves: &[Curve]) -> Result<()> {
        if curves.is_empty() {
            return Err(SketchError::region(index, format!("{} boundary is empty", what)));
        }
        if curves.iter().any(|c| !c.is_finite()) {
            return Err(SketchError::region(index, format!("{} boundary has non-finite geometry", what)));
        }
        let n = curves.len();
        for i in 0..n {
            let next = &curves[(i + 1) % n];
            if !curves[i].end_pt().coincides(&next.start_pt(), self.tolerance) {
                return Err(SketchError::region(
                    index,
                    format!("{} boundary is open after curve {}", what, i),
                ));
            }
        }
        Ok(())
    }

    fn find_coincident(&self, outer: &[Curve]) -> Option<usize> {
        let cycle = vertex_cycle(outer);
        self.regions
            .iter()
            .position(|r| same_cycle(&vertex_cycle(&r.outer), &cycle, self.tolerance))
    }

    fn face_of(&self, region: &Region) -> Option<Face> {
        let outer = loop_polygon(&region.outer, self.flatten_tol);
        let holes: Vec<Vec<Point3>> = region
            .holes
            .iter()
            .map(|h| loop_polygon(h, self.flatten_tol))
            .collect();
        let area = signed_area(&outer).abs() - holes.iter().map(|h| signed_area(h).abs()).sum::<f64>();
        if is_degenerate_area(area) || area < 0.0 {
            return None;
        }
        Some(Face {
            topo: region.topo.clone(),
            outer,
            holes,
            area,
        })
    }
}

impl SketchBuilder for Sketch2dBuilder {
    fn sketch(&self) -> &Sketch {
        &self.sketch
    }

    fn regions(&self) -> &[Region] {
        &self.regions
    }

    fn add_regions(&mut self, regions: Vec<Region>) -> Result<()> {
        let mut placement = Vec::with_capacity(regions.len());
        for (i, r) in regions.iter().enumerate() {
            let tag = TopoTag::parse(&r.topo)
                .ok_or_else(|| SketchError::region(i, format!("unrecognized topo tag '{}'", r.topo)))?;
            self.check_closed(i, "outer", &r.outer)?;
            for h in &r.holes {
                self.check_closed(i, "hole", h)?;
            }
            let slot = if tag.is_replacement() {
                let at = self
                    .find_coincident(&r.outer)
                    .ok_or_else(|| SketchError::region(i, "replacement matches no existing region"))?;
                if let Some(j) = placement.iter().position(|p| *p == Some(at)) {
                    return Err(SketchError::region(i, format!("replaces the same region as region {}", j)));
                }
                Some(at)
            } else {
                None
            };
            placement.push(slot);
        }
        for (r, slot) in regions.into_iter().zip(placement) {
            match slot {
                Some(at) => self.regions[at] = r,
                None => self.regions.push(r),
            }
        }
        Ok(())
    }

    fn restore_regions(&mut self, regions: Vec<Region>) {
        self.regions = regions;
    }

    fn update_appendix(&mut self) {
        let faces: Vec<Face> = self.regions.iter().filter_map(|r| self.face_of(r)).collect();
        let dropped = self.regions.len() - faces.len();
        if dropped > 0 {
            log::debug!("update_appendix: {} degenerate face(s) filtered", dropped);
        }
        let bbox = faces
            .iter()
            .fold(None, |acc, f| union_bbox(acc, polygon_bbox(&f.outer)));
        let guide_lines = match bbox {
            Some((x0, y0, x1, y1)) => {
                let corners = [
                    Point3::xy(x0, y0),
                    Point3::xy(x1, y0),
                    Point3::xy(x1, y1),
                    Point3::xy(x0, y1),
                ];
                (0..4).map(|i| Curve::line(corners[i], corners[(i + 1) % 4])).collect()
            }
            None => Vec::new(),
        };
        self.sketch = Sketch {
            appendix: Appendix {
                face_count: faces.len(),
                bbox,
                guide_lines,
            },
            faces,
        };
    }

    fn peek_topo_id(&self) -> u32 {
        self.next_topo
    }

    fn next_topo_id(&mut self) -> u32 {
        let id = self.next_topo;
        self.next_topo += 1;
        id
    }

    fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

/// Non-owning reference to a builder held by a [`SketchRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SketchHandle(pub u32);

struct Entry {
    builder: Box<dyn SketchBuilder>,
    in_flight: Rc<Cell<bool>>,
}

/// Slots are never reused, so a stale handle cannot reach another builder.
#[derive(Default)]
pub struct SketchRegistry {
    slots: Vec<Option<Entry>>,
}

/// Marks a builder as having an uncommitted request; cleared on drop.
#[derive(Debug)]
pub struct InFlight {
    handle: SketchHandle,
    flag: Rc<Cell<bool>>,
}

impl InFlight {
    pub fn handle(&self) -> SketchHandle {
        self.handle
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

impl SketchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, builder: Box<dyn SketchBuilder>) -> SketchHandle {
        let handle = SketchHandle(self.slots.len() as u32);
        self.slots.push(Some(Entry {
            builder,
            in_flight: Rc::new(Cell::new(false)),
        }));
        handle
    }

    fn entry(&self, h: SketchHandle) -> Option<&Entry> {
        self.slots.get(h.0 as usize).and_then(|s| s.as_ref())
    }

    pub fn contains(&self, h: SketchHandle) -> bool {
        self.entry(h).is_some()
    }

    pub fn get(&self, h: SketchHandle) -> Option<&dyn SketchBuilder> {
        self.entry(h).map(|e| e.builder.as_ref())
    }

    pub fn get_mut(&mut self, h: SketchHandle) -> Option<&mut dyn SketchBuilder> {
        match self.slots.get_mut(h.0 as usize) {
            Some(Some(e)) => {
                let builder: &mut dyn SketchBuilder = e.builder.as_mut();
                Some(builder)
            }
            _ => None,
        }
    }

    /// Refused while a request is in flight on the builder.
    pub fn remove(&mut self, h: SketchHandle) -> Option<Box<dyn SketchBuilder>> {
        if self.is_in_flight(h) {
            return None;
        }
        self.slots.get_mut(h.0 as usize)?.take().map(|e| e.builder)
    }

    pub fn is_in_flight(&self, h: SketchHandle) -> bool {
        self.entry(h).map_or(false, |e| e.in_flight.get())
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Claims the builder for one uncommitted request.
    pub fn acquire(&self, h: SketchHandle) -> Result<InFlight> {
        let e = self.entry(h).ok_or(SketchError::UnknownSketch(h))?;
        if e.in_flight.get() {
            return Err(SketchError::RequestInFlight(h));
        }
        e.in_flight.set(true);
        Ok(InFlight {
            handle: h,
            flag: Rc::clone(&e.in_flight),
        })
    }
}
