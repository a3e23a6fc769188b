//! Undoable edits applied to sketch builders.

mod edit;
mod hook;

pub use edit::{RegionEditRequest, RequestState};
pub use hook::{DrawingRegion, DrawingRegionHook, DrawingRegionList, PostCommitHook};

use crate::error::Result;
use crate::sketch::SketchRegistry;

/// A committed unit of work the transaction stack can undo and redo.
pub trait Request {
    fn commit(&mut self, registry: &mut SketchRegistry) -> Result<()>;
    fn undo(&mut self, registry: &mut SketchRegistry) -> Result<()>;
    fn redo(&mut self, registry: &mut SketchRegistry) -> Result<()>;

    fn description(&self) -> &str {
        "request"
    }
}

/// Undo/redo stacks of committed requests.
#[derive(Default)]
pub struct TransactionManager {
    undo_stack: Vec<Box<dyn Request>>,
    redo_stack: Vec<Box<dyn Request>>,
}

impl TransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commits `request` and pushes it for undo. A new commit clears redo.
    /// A failed commit drops the request.
    pub fn commit(&mut self, registry: &mut SketchRegistry, mut request: Box<dyn Request>) -> Result<()> {
        request.commit(registry)?;
        log::debug!("committed '{}'", request.description());
        self.undo_stack.push(request);
        self.redo_stack.clear();
        Ok(())
    }

    /// `Ok(false)` when there is nothing to undo.
    pub fn undo(&mut self, registry: &mut SketchRegistry) -> Result<bool> {
        let mut request = match self.undo_stack.pop() {
            Some(r) => r,
            None => return Ok(false),
        };
        if let Err(e) = request.undo(registry) {
            self.undo_stack.push(request);
            return Err(e);
        }
        self.redo_stack.push(request);
        Ok(true)
    }

    pub fn redo(&mut self, registry: &mut SketchRegistry) -> Result<bool> {
        let mut request = match self.redo_stack.pop() {
            Some(r) => r,
            None => return Ok(false),
        };
        if let Err(e) = request.redo(registry) {
            self.redo_stack.push(request);
            return Err(e);
        }
        self.undo_stack.push(request);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
