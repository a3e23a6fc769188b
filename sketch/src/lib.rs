pub mod model;
pub mod error;
pub mod geometry {
    pub mod flatten;
    pub mod limits;
    pub mod math;
    pub mod tolerance;
}
pub mod topo;
pub mod constraint;
pub mod scene;
pub mod wall;
pub mod sketch;
pub mod request;

pub use constraint::{collect_constraints, collect_constraints_with, ConstraintGraph, ConstraintScene, NodeId};
pub use error::{Result, SketchError};
pub use model::{Constraint, ConstraintId, ConstraintKind, Curve, ElementId, Point3, Region, RegionInput};
pub use request::{
    DrawingRegion, DrawingRegionHook, DrawingRegionList, PostCommitHook, RegionEditRequest, Request,
    TransactionManager,
};
pub use scene::EntityTree;
pub use sketch::{Sketch, Sketch2dBuilder, SketchBuilder, SketchHandle, SketchRegistry, TopoTag};
pub use topo::{LoopBuilder, LoopId, TopoStore};
pub use wall::{LayerId, Wall, WallId, WallTopologyInfo};
