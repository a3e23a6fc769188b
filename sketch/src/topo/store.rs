use serde::{Deserialize, Serialize};

use crate::geometry::math::signed_area;
use crate::model::{Curve, Point3};

macro_rules! handle {
    ($(#[$m:meta])* $name:ident) => {
        $(#[$m])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            fn ix(self) -> usize {
                self.0 as usize
            }
        }
    };
}

handle!(
    /// Slot of a [`Vertex`] in a [`TopoStore`].
    VertexId
);
handle!(EdgeId);
handle!(CoEdgeId);
handle!(LoopId);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub pos: Point3,
}

impl Vertex {
    pub fn set(&mut self, x: f64, y: f64, z: f64) {
        self.pos = Point3 { x, y, z };
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub curve: Curve,
}

/// One traversal direction of an edge inside a loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoEdge {
    pub edge: EdgeId,
    pub reversed: bool,
}

/// Closed cycle of coedges. `vertices[i]` is where `coedges[i]` starts.
#[derive(Clone, Debug, PartialEq)]
pub struct Loop {
    pub(crate) coedges: Vec<CoEdgeId>,
    pub(crate) vertices: Vec<VertexId>,
}

impl Loop {
    pub fn coedges(&self) -> &[CoEdgeId] {
        &self.coedges
    }

    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.coedges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coedges.is_empty()
    }
}

/// Arena owning every vertex, edge, coedge and loop. Handles are slot
/// indices and stay valid until the owning loop is removed; slots are never
/// reused.
#[derive(Clone, Debug, Default)]
pub struct TopoStore {
    pub(crate) vertices: Vec<Option<Vertex>>, // id is index
    pub(crate) edges: Vec<Option<Edge>>,      // id is index
    pub(crate) coedges: Vec<Option<CoEdge>>,  // id is index
    pub(crate) loops: Vec<Option<Loop>>,      // id is index
    pub(crate) version: u64,
}

impl TopoStore {
    pub fn new() -> Self {
        TopoStore {
            version: 1,
            ..Default::default()
        }
    }

    /// Monotonic counter, bumped on every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub(crate) fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    pub(crate) fn add_vertex(&mut self, pos: Point3) -> VertexId {
        let id = VertexId(self.vertices.len() as u32);
        self.vertices.push(Some(Vertex { pos }));
        id
    }

    pub(crate) fn add_edge(&mut self, curve: Curve) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Some(Edge { curve }));
        id
    }

    pub(crate) fn add_coedge(&mut self, edge: EdgeId, reversed: bool) -> CoEdgeId {
        let id = CoEdgeId(self.coedges.len() as u32);
        self.coedges.push(Some(CoEdge { edge, reversed }));
        id
    }

    pub(crate) fn add_loop(&mut self, coedges: Vec<CoEdgeId>, vertices: Vec<VertexId>) -> LoopId {
        let id = LoopId(self.loops.len() as u32);
        self.loops.push(Some(Loop { coedges, vertices }));
        self.bump();
        id
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.ix()).and_then(|v| v.as_ref())
    }

    pub(crate) fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(id.ix()).and_then(|v| v.as_mut())
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.ix()).and_then(|e| e.as_ref())
    }

    pub(crate) fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(id.ix()).and_then(|e| e.as_mut())
    }

    pub fn coedge(&self, id: CoEdgeId) -> Option<&CoEdge> {
        self.coedges.get(id.ix()).and_then(|c| c.as_ref())
    }

    pub(crate) fn coedge_mut(&mut self, id: CoEdgeId) -> Option<&mut CoEdge> {
        self.coedges.get_mut(id.ix()).and_then(|c| c.as_mut())
    }

    pub fn get_loop(&self, id: LoopId) -> Option<&Loop> {
        self.loops.get(id.ix()).and_then(|l| l.as_ref())
    }

    pub fn contains_loop(&self, id: LoopId) -> bool {
        self.get_loop(id).is_some()
    }

    pub fn loop_count(&self) -> u32 {
        self.loops.iter().filter(|l| l.is_some()).count() as u32
    }

    /// Moves a vertex; every loop sharing the handle observes the change.
    pub fn set_vertex(&mut self, id: VertexId, x: f64, y: f64, z: f64) -> bool {
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return false;
        }
        match self.vertex_mut(id) {
            Some(v) => {
                v.set(x, y, z);
                self.bump();
                true
            }
            None => false,
        }
    }

    /// Removes a loop together with the vertices, edges and coedges it owns.
    pub fn remove_loop(&mut self, id: LoopId) -> bool {
        let lp = match self.loops.get_mut(id.ix()).and_then(|l| l.take()) {
            Some(lp) => lp,
            None => return false,
        };
        for cid in &lp.coedges {
            if let Some(co) = self.coedges.get_mut(cid.ix()).and_then(|c| c.take()) {
                if let Some(slot) = self.edges.get_mut(co.edge.ix()) {
                    *slot = None;
                }
            }
        }
        for vid in &lp.vertices {
            if let Some(slot) = self.vertices.get_mut(vid.ix()) {
                *slot = None;
            }
        }
        self.bump();
        true
    }

    /// Curve of a coedge in traversal direction.
    pub fn coedge_curve(&self, id: CoEdgeId) -> Option<Curve> {
        let co = self.coedge(id)?;
        let edge = self.edge(co.edge)?;
        Some(if co.reversed {
            edge.curve.reversed()
        } else {
            edge.curve.clone()
        })
    }

    /// All curves of a loop, oriented along the traversal.
    pub fn loop_curves(&self, id: LoopId) -> Option<Vec<Curve>> {
        let lp = self.get_loop(id)?;
        lp.coedges.iter().map(|c| self.coedge_curve(*c)).collect()
    }

    pub fn loop_points(&self, id: LoopId) -> Option<Vec<Point3>> {
        let lp = self.get_loop(id)?;
        lp.vertices
            .iter()
            .map(|v| self.vertex(*v).map(|v| v.pos))
            .collect()
    }

    /// Area of the polygonized loop, positive when counter-clockwise.
    pub fn loop_signed_area(&self, id: LoopId, flatten_tol: f64) -> Option<f64> {
        let curves = self.loop_curves(id)?;
        let mut poly = Vec::new();
        for c in &curves {
            let pts = c.flatten(flatten_tol);
            poly.extend_from_slice(&pts[..pts.len() - 1]);
        }
        Some(signed_area(&poly))
    }
}
