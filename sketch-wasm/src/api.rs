use crate::{ConstraintGraph, SketchDocument};
use js_sys::Uint32Array;
use serde::Serialize;
use sketch::{Curve, DrawingRegionHook, ElementId, LoopId, RegionEditRequest, RegionInput, Sketch2dBuilder, SketchHandle};
use wasm_bindgen::prelude::*;
type JsValue = wasm_bindgen::JsValue;
use crate::error;
use crate::interop::{arr_u32, points_xy};

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn ids(v: Vec<ElementId>) -> Uint32Array {
    let raw: Vec<u32> = v.into_iter().map(|e| e.0).collect();
    arr_u32(&raw)
}

#[wasm_bindgen]
impl ConstraintGraph {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ConstraintGraph {
        ConstraintGraph { inner: sketch::ConstraintGraph::new() }
    }

    // Positional
    pub fn set_positional(&mut self, a: u32, b: u32, bidirectional: bool) -> bool {
        self.inner.set_positional(ElementId(a), ElementId(b), bidirectional)
    }
    pub fn remove_positional(&mut self, id: u32) -> bool {
        self.inner.remove_positional(ElementId(id))
    }
    pub fn get_positional(&self, id: u32) -> Uint32Array {
        ids(self.inner.get_positional(ElementId(id)))
    }
    pub fn positional_closure(&self, id: u32) -> Uint32Array {
        ids(self.inner.positional_closure(ElementId(id)))
    }

    // Rotational
    pub fn set_rotational(&mut self, a: u32, b: u32, bidirectional: bool) -> bool {
        self.inner.set_rotational(ElementId(a), ElementId(b), bidirectional)
    }
    pub fn remove_rotational(&mut self, id: u32) -> bool {
        self.inner.remove_rotational(ElementId(id))
    }
    pub fn get_rotational(&self, id: u32) -> Uint32Array {
        ids(self.inner.get_rotational(ElementId(id)))
    }
    pub fn rotational_closure(&self, id: u32) -> Uint32Array {
        ids(self.inner.rotational_closure(ElementId(id)))
    }

    pub fn remove_element(&mut self, id: u32) -> bool {
        self.inner.remove_element(ElementId(id))
    }
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    // Persistence
    pub fn to_json(&self) -> JsValue {
        let ser = serde_wasm_bindgen::Serializer::json_compatible();
        self.inner.to_json_value().serialize(&ser).unwrap_or(JsValue::NULL)
    }
    pub fn from_json_res(&mut self, v: JsValue) -> JsValue {
        let value = match serde_wasm_bindgen::from_value::<serde_json::Value>(v) {
            Ok(value) => value,
            Err(e) => return error::invalid_json(e),
        };
        match sketch::ConstraintGraph::from_json_value(value) {
            Ok(g) => {
                self.inner = g;
                error::ok(JsValue::from_bool(true))
            }
            Err(e) => error::from_sketch_error(&e),
        }
    }
}

#[wasm_bindgen]
impl SketchDocument {
    #[wasm_bindgen(constructor)]
    pub fn new() -> SketchDocument {
        SketchDocument::rs_new()
    }

    /// Registers an empty sketch and returns its handle.
    pub fn new_sketch(&mut self) -> u32 {
        self.registry.insert(Box::new(Sketch2dBuilder::new())).0
    }

    pub fn new_sketch_res(&mut self, tolerance: f64) -> JsValue {
        if !tolerance.is_finite() {
            return error::non_finite("tolerance");
        }
        let mut builder = Sketch2dBuilder::new();
        if !builder.set_tolerance(tolerance) {
            return error::out_of_range("tolerance", 0.0, f64::INFINITY, tolerance);
        }
        let h = self.registry.insert(Box::new(builder));
        error::ok(JsValue::from_f64(h.0 as f64))
    }

    /// Runs a region edit through the undo stack. `regions` is an array of
    /// `{ outer: Curve[], holes?: Curve[][] }`; the value is the new topo
    /// tags in input order.
    pub fn draw_regions_res(&mut self, sketch: u32, regions: JsValue, mark_drawing_region: bool) -> JsValue {
        let inputs: Vec<RegionInput> = match serde_wasm_bindgen::from_value(regions) {
            Ok(v) => v,
            Err(e) => return error::invalid_json(e),
        };
        let handle = SketchHandle(sketch);
        if !self.registry.contains(handle) {
            return error::invalid_id("sketch", sketch);
        }
        let mut req = RegionEditRequest::new(handle);
        if mark_drawing_region {
            req = req.with_hook(Box::new(DrawingRegionHook::new(self.drawing_regions.clone())));
        }
        if let Err(e) = req.execute(&mut self.registry, &inputs) {
            return error::from_sketch_error(&e);
        }
        let tags: Vec<String> = req.built().iter().map(|r| r.topo.clone()).collect();
        if let Err(e) = self.transactions.commit(&mut self.registry, Box::new(req)) {
            return error::from_sketch_error(&e);
        }
        error::ok(serde_wasm_bindgen::to_value(&tags).unwrap_or(JsValue::NULL))
    }

    pub fn undo(&mut self) -> JsValue {
        match self.transactions.undo(&mut self.registry) {
            Ok(done) => error::ok(JsValue::from_bool(done)),
            Err(e) => error::from_sketch_error(&e),
        }
    }
    pub fn redo(&mut self) -> JsValue {
        match self.transactions.redo(&mut self.registry) {
            Ok(done) => error::ok(JsValue::from_bool(done)),
            Err(e) => error::from_sketch_error(&e),
        }
    }
    pub fn can_undo(&self) -> bool {
        self.transactions.can_undo()
    }
    pub fn can_redo(&self) -> bool {
        self.transactions.can_redo()
    }

    /// `{ faces, appendix }`, or null for an unknown handle.
    pub fn get_sketch(&self, sketch: u32) -> JsValue {
        match self.registry.get(SketchHandle(sketch)) {
            Some(b) => serde_wasm_bindgen::to_value(b.sketch()).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }
    pub fn get_sketch_res(&self, sketch: u32) -> JsValue {
        match self.registry.get(SketchHandle(sketch)) {
            Some(b) => error::ok(serde_wasm_bindgen::to_value(b.sketch()).unwrap_or(JsValue::NULL)),
            None => error::invalid_id("sketch", sketch),
        }
    }

    pub fn get_drawing_regions(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.drawing_regions.borrow().regions()).unwrap_or(JsValue::NULL)
    }

    // Loops
    pub fn loop_version(&self) -> u64 {
        self.loops.version()
    }

    /// Returns the loop id: `existing` when the curves retrace it, a new
    /// loop otherwise.
    pub fn create_or_update_loop_res(&mut self, existing: Option<u32>, curves: JsValue, force_create: bool) -> JsValue {
        let curves: Vec<Curve> = match serde_wasm_bindgen::from_value(curves) {
            Ok(v) => v,
            Err(e) => return error::invalid_json(e),
        };
        if curves.is_empty() {
            return error::err("invalid_region", "a loop needs at least one curve", None);
        }
        if curves.iter().any(|c| !c.is_finite()) {
            return error::non_finite("curves");
        }
        let id = self
            .loop_builder
            .create_or_update_loop(&mut self.loops, existing.map(LoopId), &curves, force_create);
        error::ok(JsValue::from_f64(id.0 as f64))
    }

    /// Interleaved x/y of the loop's vertices, or null.
    pub fn get_loop_vertices(&self, id: u32) -> JsValue {
        match self.loops.loop_points(LoopId(id)) {
            Some(pts) => points_xy(&pts).into(),
            None => JsValue::NULL,
        }
    }

    pub fn remove_loop(&mut self, id: u32) -> bool {
        self.loops.remove_loop(LoopId(id))
    }

    pub fn set_loop_tolerance(&mut self, tol: f64) -> bool {
        self.loop_builder.set_tolerance(tol)
    }
}
