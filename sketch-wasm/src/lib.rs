use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
mod api;
mod error;
mod interop;

#[wasm_bindgen]
pub struct ConstraintGraph { pub(crate) inner: sketch::ConstraintGraph }

/// Sketch builders of one document, their shared undo stack and the loop
/// arena the host edits directly.
#[wasm_bindgen]
pub struct SketchDocument {
    pub(crate) registry: sketch::SketchRegistry,
    pub(crate) transactions: sketch::TransactionManager,
    pub(crate) drawing_regions: Rc<RefCell<sketch::DrawingRegionList>>,
    pub(crate) loops: sketch::TopoStore,
    pub(crate) loop_builder: sketch::LoopBuilder,
}

impl SketchDocument {
    pub fn rs_new() -> SketchDocument {
        SketchDocument {
            registry: sketch::SketchRegistry::new(),
            transactions: sketch::TransactionManager::new(),
            drawing_regions: Rc::new(RefCell::new(sketch::DrawingRegionList::new())),
            loops: sketch::TopoStore::new(),
            loop_builder: sketch::LoopBuilder::new(),
        }
    }
}

#[wasm_bindgen(start)]
pub fn initialize() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    init_logger();
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        web_sys::console::warn_1(&JsValue::from_str("sketch-wasm: a logger is already installed"));
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {}
