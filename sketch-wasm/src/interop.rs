use js_sys::{Float64Array, Object, Reflect, Uint32Array};
use sketch::Point3;
use wasm_bindgen::JsValue;

pub fn new_obj() -> Object { Object::new() }
pub fn set_kv(obj: &Object, k: &str, v: &JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(k), v);
}
pub fn arr_u32(slice: &[u32]) -> Uint32Array {
    let arr = Uint32Array::new_with_length(slice.len() as u32);
    arr.copy_from(slice); arr
}
pub fn arr_f64(slice: &[f64]) -> Float64Array {
    let arr = Float64Array::new_with_length(slice.len() as u32);
    arr.copy_from(slice); arr
}
/// Interleaved `[x0, y0, x1, y1, ...]`; z is dropped.
pub fn points_xy(points: &[Point3]) -> Float64Array {
    let flat: Vec<f64> = points.iter().flat_map(|p| [p.x, p.y]).collect();
    arr_f64(&flat)
}
