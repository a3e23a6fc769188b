use crate::error::{Result, SketchError};
use crate::geometry::limits::{in_coord_bounds, MAX_CURVES_PER_LOOP, MAX_HOLES_PER_REGION, MAX_REGIONS_PER_REQUEST};
use crate::geometry::math::{boundaries_touch, is_degenerate_area, point_in_polygon, same_cycle};
use crate::geometry::tolerance::ARC_FLATTEN_TOL;
use crate::model::{Curve, Point3, Region, RegionInput};
use crate::request::hook::PostCommitHook;
use crate::request::Request;
use crate::sketch::{loop_polygon, vertex_cycle, InFlight, SketchBuilder, SketchHandle, SketchRegistry, TopoTag};
use crate::topo::validate::validate_loop;
use crate::topo::{LoopBuilder, TopoStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestState {
    Created,
    Executed,
    Committed,
    Undone,
}

impl RequestState {
    pub fn name(&self) -> &'static str {
        match self {
            RequestState::Created => "not executed",
            RequestState::Executed => "executed but uncommitted",
            RequestState::Committed => "committed",
            RequestState::Undone => "undone",
        }
    }
}

/// Turns caller-supplied curve loops into topo-tagged regions of one sketch
/// builder, with commit/undo/redo.
pub struct RegionEditRequest {
    handle: SketchHandle,
    state: RequestState,
    inputs: Vec<RegionInput>,
    built: Vec<Region>,
    before: Vec<Region>,
    after: Vec<Region>,
    in_flight: Option<InFlight>,
    hook: Option<Box<dyn PostCommitHook>>,
}

fn check_count(what: &'static str, max: usize, got: usize) -> Result<()> {
    if got > max {
        return Err(SketchError::LimitExceeded { what, max, got });
    }
    Ok(())
}

fn check_input(input: &RegionInput) -> Result<()> {
    check_count("holes per region", MAX_HOLES_PER_REGION, input.holes.len())?;
    for curves in std::iter::once(&input.outer).chain(input.holes.iter()) {
        check_count("curves per loop", MAX_CURVES_PER_LOOP, curves.len())?;
        for c in curves {
            let (s, e) = (c.start_pt(), c.end_pt());
            let in_range = c.is_finite() && [s.x, s.y, e.x, e.y].iter().all(|v| in_coord_bounds(*v));
            if !in_range {
                return Err(SketchError::NonFinite("curve"));
            }
        }
    }
    Ok(())
}

fn reverse_loop(curves: &[Curve]) -> Vec<Curve> {
    curves.iter().rev().map(Curve::reversed).collect()
}

/// Materializes `curves` as a loop and returns them in traversal order,
/// oriented counter-clockwise when `ccw` and clockwise otherwise.
fn orient_loop(builder: &LoopBuilder, index: usize, what: &str, curves: &[Curve], ccw: bool) -> Result<Vec<Curve>> {
    if curves.is_empty() {
        return Err(SketchError::region(index, format!("{} boundary is empty", what)));
    }
    let mut store = TopoStore::new();
    let id = builder.create_loop(&mut store, curves);
    if let Some(issue) = validate_loop(&store, id, builder.tolerance()).first() {
        return Err(SketchError::region(index, format!("{} boundary: {:?}", what, issue)));
    }
    let traversal = store.loop_curves(id).ok_or(SketchError::UnknownLoop(id))?;
    let area = store.loop_signed_area(id, ARC_FLATTEN_TOL).ok_or(SketchError::UnknownLoop(id))?;
    if is_degenerate_area(area) {
        return Err(SketchError::region(index, format!("{} boundary encloses no area", what)));
    }
    Ok(if (area > 0.0) == ccw { traversal } else { reverse_loop(&traversal) })
}

/// Holes must lie strictly inside the outer boundary and apart from each
/// other.
fn check_holes(index: usize, outer: &[Point3], holes: &[Vec<Point3>], tol: f64) -> Result<()> {
    let starts_in = |a: &[Point3], b: &[Point3]| a.first().map_or(false, |p| point_in_polygon(p, b, tol));
    for (h, hole) in holes.iter().enumerate() {
        let inside = hole.iter().all(|p| point_in_polygon(p, outer, tol));
        if !inside || boundaries_touch(hole, outer, tol) {
            return Err(SketchError::region(index, format!("hole {} is not inside the outer boundary", h)));
        }
        for (k, other) in holes[..h].iter().enumerate() {
            let nested = starts_in(hole.as_slice(), other.as_slice()) || starts_in(other.as_slice(), hole.as_slice());
            if nested || boundaries_touch(hole, other, tol) {
                return Err(SketchError::region(index, format!("holes {} and {} overlap", k, h)));
            }
        }
    }
    Ok(())
}

/// Renumbers draw tags consecutively from `base` in region order. Returns
/// the stamped regions and how many ids they use.
fn stamp_draw_tags(regions: &[Region], base: u32) -> (Vec<Region>, u32) {
    let mut next = base;
    let stamped = regions
        .iter()
        .map(|r| {
            let mut r = r.clone();
            if let Some(TopoTag::Draw(_)) = TopoTag::parse(&r.topo) {
                r.topo = TopoTag::Draw(next).to_string();
                next += 1;
            }
            r
        })
        .collect();
    (stamped, next - base)
}

impl RegionEditRequest {
    pub fn new(handle: SketchHandle) -> Self {
        RegionEditRequest {
            handle,
            state: RequestState::Created,
            inputs: Vec::new(),
            built: Vec::new(),
            before: Vec::new(),
            after: Vec::new(),
            in_flight: None,
            hook: None,
        }
    }

    pub fn with_hook(mut self, hook: Box<dyn PostCommitHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn handle(&self) -> SketchHandle {
        self.handle
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Deep copies of the curves handed to `execute`.
    pub fn inputs(&self) -> &[RegionInput] {
        &self.inputs
    }

    /// Regions produced by `execute`, not yet written to the builder.
    pub fn built(&self) -> &[Region] {
        &self.built
    }

    fn expect_state(&self, op: &'static str, want: RequestState) -> Result<()> {
        if self.state != want {
            return Err(SketchError::InvalidState {
                op,
                state: self.state.name(),
            });
        }
        Ok(())
    }

    /// Undo and redo rewrite the region list, which would invalidate the
    /// tags of a request executed against it.
    fn check_not_claimed(&self, registry: &SketchRegistry) -> Result<()> {
        if registry.is_in_flight(self.handle) {
            return Err(SketchError::RequestInFlight(self.handle));
        }
        Ok(())
    }

    fn builder_mut<'r>(&self, registry: &'r mut SketchRegistry) -> Result<&'r mut dyn SketchBuilder> {
        registry
            .get_mut(self.handle)
            .ok_or(SketchError::UnknownSketch(self.handle))
    }

    /// Builds tagged regions from `inputs` without touching the builder's
    /// regions. Holds the builder's in-flight flag until commit or drop.
    pub fn execute(&mut self, registry: &mut SketchRegistry, inputs: &[RegionInput]) -> Result<()> {
        self.expect_state("execute", RequestState::Created)?;
        let guard = registry.acquire(self.handle)?;
        check_count("regions per request", MAX_REGIONS_PER_REQUEST, inputs.len())?;
        for input in inputs {
            check_input(input)?;
        }
        let inputs = inputs.to_vec();

        let builder = self.builder_mut(registry)?;
        let loops = LoopBuilder::with_tolerance(builder.tolerance());
        let tol = loops.tolerance();
        let mut shaped = Vec::with_capacity(inputs.len());
        for (i, input) in inputs.iter().enumerate() {
            let outer = orient_loop(&loops, i, "outer", &input.outer, true)?;
            let holes = input
                .holes
                .iter()
                .map(|hole| orient_loop(&loops, i, "hole", hole, false))
                .collect::<Result<Vec<_>>>()?;
            let hole_polys: Vec<Vec<Point3>> = holes.iter().map(|h| loop_polygon(h, ARC_FLATTEN_TOL)).collect();
            check_holes(i, &loop_polygon(&outer, ARC_FLATTEN_TOL), &hole_polys, tol)?;
            shaped.push((outer, holes));
        }

        // Draw ids are provisional here; commit reserves them.
        let existing: Vec<_> = builder.regions().iter().map(|r| vertex_cycle(&r.outer)).collect();
        let mut claimed = Vec::new();
        let mut next = builder.peek_topo_id();
        let mut built = Vec::with_capacity(shaped.len());
        for (i, (outer, holes)) in shaped.into_iter().enumerate() {
            let cycle = vertex_cycle(&outer);
            let tag = match existing.iter().position(|e| same_cycle(e, &cycle, tol)) {
                Some(at) if claimed.contains(&at) => {
                    return Err(SketchError::region(i, "redraws a face already redrawn in this request"));
                }
                Some(at) => {
                    claimed.push(at);
                    TopoTag::Replace
                }
                None => {
                    next += 1;
                    TopoTag::Draw(next - 1)
                }
            };
            built.push(Region {
                outer,
                holes,
                topo: tag.to_string(),
            });
        }

        log::debug!("region edit on {:?}: {} region(s) built", self.handle, built.len());
        self.inputs = inputs;
        self.built = built;
        self.in_flight = Some(guard);
        self.state = RequestState::Executed;
        Ok(())
    }

    /// Reserves topo ids and writes the built regions to the builder. On
    /// failure nothing is written and the request stays executed.
    pub fn commit(&mut self, registry: &mut SketchRegistry) -> Result<()> {
        self.expect_state("commit", RequestState::Executed)?;
        let handle = self.handle;
        let builder = self.builder_mut(registry)?;
        let before = builder.regions().to_vec();
        let (stamped, used) = stamp_draw_tags(&self.built, builder.peek_topo_id());
        if let Err(e) = builder.add_regions(stamped.clone()) {
            log::warn!("region edit on {:?} rejected: {}", handle, e);
            return Err(e);
        }
        for _ in 0..used {
            builder.next_topo_id();
        }
        builder.update_appendix();
        self.built = stamped;
        self.after = builder.regions().to_vec();
        self.before = before;
        if let Some(hook) = self.hook.as_mut() {
            hook.after_commit(builder.sketch());
        }
        self.in_flight = None;
        self.state = RequestState::Committed;
        log::debug!(
            "region edit on {:?} committed: {} face(s)",
            handle,
            builder.sketch().appendix.face_count
        );
        Ok(())
    }

    pub fn undo(&mut self, registry: &mut SketchRegistry) -> Result<()> {
        self.expect_state("undo", RequestState::Committed)?;
        self.check_not_claimed(registry)?;
        let builder = self.builder_mut(registry)?;
        builder.restore_regions(self.before.clone());
        builder.update_appendix();
        if let Some(hook) = self.hook.as_mut() {
            hook.after_undo(builder.sketch());
        }
        self.state = RequestState::Undone;
        Ok(())
    }

    /// Replays the committed result; nothing is re-derived.
    pub fn redo(&mut self, registry: &mut SketchRegistry) -> Result<()> {
        self.expect_state("redo", RequestState::Undone)?;
        self.check_not_claimed(registry)?;
        let builder = self.builder_mut(registry)?;
        builder.restore_regions(self.after.clone());
        builder.update_appendix();
        if let Some(hook) = self.hook.as_mut() {
            hook.after_redo(builder.sketch());
        }
        self.state = RequestState::Committed;
        Ok(())
    }
}

impl Request for RegionEditRequest {
    fn commit(&mut self, registry: &mut SketchRegistry) -> Result<()> {
        RegionEditRequest::commit(self, registry)
    }

    fn undo(&mut self, registry: &mut SketchRegistry) -> Result<()> {
        RegionEditRequest::undo(self, registry)
    }

    fn redo(&mut self, registry: &mut SketchRegistry) -> Result<()> {
        RegionEditRequest::redo(self, registry)
    }

    fn description(&self) -> &str {
        "edit sketch regions"
    }
}
