//! Loop topology: arena store, loop builder and structural validation.

mod builder;
mod store;
pub mod validate;

pub use builder::LoopBuilder;
pub use store::{CoEdge, CoEdgeId, Edge, EdgeId, Loop, LoopId, TopoStore, Vertex, VertexId};
