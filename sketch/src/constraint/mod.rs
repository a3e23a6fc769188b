//! Constraint bookkeeping: the relation graph and the tree collector.

mod collector;
mod graph;

pub use collector::{collect_constraints, collect_constraints_with, ConstraintScene, NodeId};
pub use graph::{ConstraintGraph, GraphSnapshot, Relation};
