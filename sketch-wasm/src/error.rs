use js_sys::Object;
use sketch::SketchError;
use wasm_bindgen::prelude::*;

use crate::interop::{new_obj, set_kv};

pub fn ok(v: JsValue) -> JsValue {
    let o = new_obj();
    set_kv(&o, "ok", &JsValue::from_bool(true));
    set_kv(&o, "value", &v);
    o.into()
}

pub fn err(code: &'static str, message: impl Into<String>, data: Option<JsValue>) -> JsValue {
    let root = new_obj();
    set_kv(&root, "ok", &JsValue::from_bool(false));
    let e = new_obj();
    set_kv(&e, "code", &JsValue::from_str(code));
    set_kv(&e, "message", &JsValue::from_str(&message.into()));
    if let Some(d) = data { set_kv(&e, "data", &d); }
    set_kv(&root, "error", &e.into());
    root.into()
}

#[inline]
pub fn non_finite(param: &str) -> JsValue {
    let d = new_obj(); set_kv(&d, "param", &JsValue::from_str(param));
    err("non_finite", format!("parameter '{}' must be finite", param), Some(d.into()))
}

#[inline]
pub fn out_of_range(param: &str, min: f64, max: f64, got: f64) -> JsValue {
    let d = new_obj();
    set_kv(&d, "param", &JsValue::from_str(param));
    set_kv(&d, "min", &JsValue::from_f64(min));
    set_kv(&d, "max", &JsValue::from_f64(max));
    set_kv(&d, "got", &JsValue::from_f64(got));
    err("out_of_range", format!("parameter '{}' out of range", param), Some(d.into()))
}

#[inline]
pub fn invalid_id(kind: &str, id: u32) -> JsValue {
    let d = new_obj();
    set_kv(&d, "kind", &JsValue::from_str(kind));
    set_kv(&d, "id", &JsValue::from_f64(id as f64));
    err("invalid_id", format!("invalid {} id", kind), Some(d.into()))
}

#[inline]
pub fn invalid_json(e: impl std::fmt::Display) -> JsValue {
    err("invalid_json", e.to_string(), None)
}

fn data_for(e: &SketchError) -> Option<Object> {
    let d = new_obj();
    match e {
        SketchError::MissingLayer { wall } => set_kv(&d, "wall", &JsValue::from_f64(wall.0 as f64)),
        SketchError::UnknownLayer { wall, layer } => {
            set_kv(&d, "wall", &JsValue::from_f64(wall.0 as f64));
            set_kv(&d, "layer", &JsValue::from_f64(layer.0 as f64));
        }
        SketchError::UnknownSketch(h) | SketchError::RequestInFlight(h) => {
            set_kv(&d, "sketch", &JsValue::from_f64(h.0 as f64))
        }
        SketchError::UnknownNode(id) => set_kv(&d, "node", &JsValue::from_f64(*id as f64)),
        SketchError::UnknownLoop(id) => set_kv(&d, "loop", &JsValue::from_f64(id.0 as f64)),
        SketchError::InvalidRegion { index, .. } => set_kv(&d, "index", &JsValue::from_f64(*index as f64)),
        SketchError::LimitExceeded { what, max, got } => {
            set_kv(&d, "param", &JsValue::from_str(what));
            set_kv(&d, "max", &JsValue::from_f64(*max as f64));
            set_kv(&d, "got", &JsValue::from_f64(*got as f64));
        }
        SketchError::NonFinite(param) => set_kv(&d, "param", &JsValue::from_str(param)),
        SketchError::InvalidState { op, state } => {
            set_kv(&d, "op", &JsValue::from_str(op));
            set_kv(&d, "state", &JsValue::from_str(state));
        }
        SketchError::CycleDetected { node } => set_kv(&d, "node", &JsValue::from_f64(*node as f64)),
        SketchError::Json(_) => return None,
    }
    Some(d)
}

/// Typed envelope for a core error; `data` carries the variant's fields.
pub fn from_sketch_error(e: &SketchError) -> JsValue {
    err(e.code(), e.to_string(), data_for(e).map(Into::into))
}
