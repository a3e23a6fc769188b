use thiserror::Error;

use crate::topo::LoopId;
use crate::wall::{LayerId, WallId};
use crate::sketch::SketchHandle;

pub type Result<T> = std::result::Result<T, SketchError>;

#[derive(Debug, Error)]
pub enum SketchError {
    #[error("wall {wall} has no owning layer")]
    MissingLayer { wall: WallId },

    #[error("wall {wall} refers to unknown layer {layer}")]
    UnknownLayer { wall: WallId, layer: LayerId },

    #[error("unknown sketch handle {0:?}")]
    UnknownSketch(SketchHandle),

    #[error("unknown scene node {0}")]
    UnknownNode(u32),

    #[error("unknown loop {0:?}")]
    UnknownLoop(LoopId),

    #[error("sketch {0:?} already has an uncommitted request")]
    RequestInFlight(SketchHandle),

    #[error("region {index} rejected: {reason}")]
    InvalidRegion { index: usize, reason: String },

    #[error("{what} exceeds limit {max} (got {got})")]
    LimitExceeded { what: &'static str, max: usize, got: usize },

    #[error("parameter '{0}' must be finite and in range")]
    NonFinite(&'static str),

    #[error("cannot {op} a request that is {state}")]
    InvalidState { op: &'static str, state: &'static str },

    #[error("scene node {node} reached twice; traversal expects a tree")]
    CycleDetected { node: u32 },

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

impl SketchError {
    /// Stable machine-readable code, used by the host bindings.
    pub fn code(&self) -> &'static str {
        match self {
            SketchError::MissingLayer { .. } | SketchError::UnknownLayer { .. } => "missing_layer",
            SketchError::UnknownSketch(_) | SketchError::UnknownNode(_) | SketchError::UnknownLoop(_) => {
                "invalid_id"
            }
            SketchError::RequestInFlight(_) => "request_in_flight",
            SketchError::InvalidRegion { .. } => "invalid_region",
            SketchError::LimitExceeded { .. } => "limit_exceeded",
            SketchError::NonFinite(_) => "non_finite",
            SketchError::InvalidState { .. } => "invalid_state",
            SketchError::CycleDetected { .. } => "cycle_detected",
            SketchError::Json(_) => "invalid_json",
        }
    }

    pub(crate) fn region(index: usize, reason: impl Into<String>) -> Self {
        SketchError::InvalidRegion { index, reason: reason.into() }
    }
}
