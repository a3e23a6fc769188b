use crate::geometry::tolerance::{valid_tolerance, EPS_POS};
use crate::model::{Curve, Point3};
use crate::topo::store::{LoopId, TopoStore};

/// Builds loops from ordered boundary curves, reusing an existing loop's
/// vertices and edges when the new curves retrace it.
#[derive(Clone, Copy, Debug)]
pub struct LoopBuilder {
    tolerance: f64,
}

impl Default for LoopBuilder {
    fn default() -> Self {
        LoopBuilder { tolerance: EPS_POS }
    }
}

/// Where each loop position takes its new curve from.
struct Alignment {
    curve: Vec<usize>,
    reversed: Vec<bool>,
    starts: Vec<Point3>,
}

impl LoopBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(tol: f64) -> Self {
        let mut b = Self::default();
        b.set_tolerance(tol);
        b
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn set_tolerance(&mut self, tol: f64) -> bool {
        if !valid_tolerance(tol) {
            return false;
        }
        self.tolerance = tol;
        true
    }

    /// Returns `existing` mutated in place when the curve count matches and
    /// an alignment offset exists; a freshly created loop otherwise.
    pub fn create_or_update_loop(
        &self,
        store: &mut TopoStore,
        existing: Option<LoopId>,
        curves: &[Curve],
        force_create: bool,
    ) -> LoopId {
        if !force_create {
            if let Some(id) = existing {
                let reusable = store
                    .get_loop(id)
                    .map_or(false, |lp| lp.len() == curves.len() && !curves.is_empty());
                if reusable {
                    if self.update_in_place(store, id, curves) {
                        log::debug!("loop {:?} updated in place ({} curves)", id, curves.len());
                        return id;
                    }
                    log::debug!("loop {:?}: no vertex alignment, recreating", id);
                }
            }
        }
        self.create_loop(store, curves)
    }

    /// Always allocates a new loop; one coedge per curve in input order.
    pub fn create_loop(&self, store: &mut TopoStore, curves: &[Curve]) -> LoopId {
        let flags = self.orientation_flags(curves);
        let mut coedges = Vec::with_capacity(curves.len());
        let mut vertices = Vec::with_capacity(curves.len());
        for (c, &rev) in curves.iter().zip(flags.iter()) {
            let start = if rev { c.end_pt() } else { c.start_pt() };
            let edge = store.add_edge(c.clone());
            coedges.push(store.add_coedge(edge, rev));
            vertices.push(store.add_vertex(start));
        }
        store.add_loop(coedges, vertices)
    }

    /// Reversed flag per curve, judged against its neighbour: curve 0 against
    /// curve 1, every later curve against the traversal end of its
    /// predecessor. Curves that touch nothing keep their own direction.
    fn orientation_flags(&self, curves: &[Curve]) -> Vec<bool> {
        let tol = self.tolerance;
        let n = curves.len();
        let mut flags = Vec::with_capacity(n);
        if n == 0 {
            return flags;
        }
        let c0 = &curves[0];
        let first_reversed = if n == 1 {
            false
        } else {
            let next = &curves[1];
            let touches = |p: Point3| p.coincides(&next.start_pt(), tol) || p.coincides(&next.end_pt(), tol);
            !touches(c0.end_pt()) && touches(c0.start_pt())
        };
        flags.push(first_reversed);
        let mut prev_end = if first_reversed { c0.start_pt() } else { c0.end_pt() };
        for c in &curves[1..] {
            let rev = !c.start_pt().coincides(&prev_end, tol) && c.end_pt().coincides(&prev_end, tol);
            prev_end = if rev { c.start_pt() } else { c.end_pt() };
            flags.push(rev);
        }
        flags
    }

    /// Lowest forward offset wins; reversed traversal is only tried when no
    /// forward offset fits.
    fn align(&self, curves: &[Curve], current: &[Point3]) -> Option<Alignment> {
        let tol = self.tolerance;
        let n = curves.len();
        let flags = self.orientation_flags(curves);
        let fwd_start: Vec<Point3> = curves
            .iter()
            .zip(&flags)
            .map(|(c, &r)| if r { c.end_pt() } else { c.start_pt() })
            .collect();
        for k in 0..n {
            if (0..n).all(|i| fwd_start[(i + k) % n].coincides(&current[i], tol)) {
                let curve: Vec<usize> = (0..n).map(|i| (i + k) % n).collect();
                return Some(Alignment {
                    reversed: curve.iter().map(|&m| flags[m]).collect(),
                    starts: curve.iter().map(|&m| fwd_start[m]).collect(),
                    curve,
                });
            }
        }
        // Traversal j of the retrace runs curve n-1-j backwards.
        let back_start: Vec<Point3> = (0..n)
            .map(|j| {
                let m = n - 1 - j;
                if flags[m] {
                    curves[m].start_pt()
                } else {
                    curves[m].end_pt()
                }
            })
            .collect();
        for k in 0..n {
            if (0..n).all(|i| back_start[(i + k) % n].coincides(&current[i], tol)) {
                let curve: Vec<usize> = (0..n).map(|i| n - 1 - (i + k) % n).collect();
                return Some(Alignment {
                    reversed: curve.iter().map(|&m| !flags[m]).collect(),
                    starts: (0..n).map(|i| back_start[(i + k) % n]).collect(),
                    curve,
                });
            }
        }
        None
    }

    fn update_in_place(&self, store: &mut TopoStore, id: LoopId, curves: &[Curve]) -> bool {
        let (coedges, vertices) = match store.get_loop(id) {
            Some(lp) => (lp.coedges.clone(), lp.vertices.clone()),
            None => return false,
        };
        let current: Option<Vec<Point3>> = vertices.iter().map(|v| store.vertex(*v).map(|v| v.pos)).collect();
        let current = match current {
            Some(c) => c,
            None => return false,
        };
        let plan = match self.align(curves, &current) {
            Some(p) => p,
            None => return false,
        };
        for i in 0..coedges.len() {
            let p = plan.starts[i];
            if let Some(v) = store.vertex_mut(vertices[i]) {
                v.set(p.x, p.y, p.z);
            }
            let edge_id = match store.coedge_mut(coedges[i]) {
                Some(co) => {
                    co.reversed = plan.reversed[i];
                    co.edge
                }
                None => continue,
            };
            if let Some(edge) = store.edge_mut(edge_id) {
                edge.curve = curves[plan.curve[i]].clone();
            }
        }
        store.bump();
        true
    }
}
