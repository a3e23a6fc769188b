use js_sys::Reflect;
use sketch_wasm::ConstraintGraph;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn relations_are_symmetric_and_independent() {
    let mut g = ConstraintGraph::new();
    assert!(g.set_positional(1, 2, true));
    assert!(!g.set_positional(1, 2, true));
    g.set_rotational(1, 3, false);
    assert_eq!(g.get_positional(2).to_vec(), vec![1]);
    assert_eq!(g.get_rotational(1).to_vec(), vec![3]);
    assert_eq!(g.get_rotational(3).length(), 0);

    assert!(g.remove_positional(1));
    assert_eq!(g.get_positional(2).length(), 0);
    assert_eq!(g.get_rotational(1).to_vec(), vec![3]);
}

#[wasm_bindgen_test]
fn json_round_trip() {
    let mut g = ConstraintGraph::new();
    g.set_positional(4, 5, true);
    g.set_positional(5, 6, true);
    let snap = g.to_json();

    let mut h = ConstraintGraph::new();
    let r = h.from_json_res(snap);
    assert_eq!(Reflect::get(&r, &JsValue::from_str("ok")).unwrap(), JsValue::TRUE);
    assert_eq!(h.positional_closure(4).to_vec(), vec![5, 6]);

    let bad = h.from_json_res(JsValue::from_str("nope"));
    let err = Reflect::get(&bad, &JsValue::from_str("error")).unwrap();
    let code = Reflect::get(&err, &JsValue::from_str("code")).unwrap();
    assert_eq!(code.as_string().as_deref(), Some("invalid_json"));
    assert_eq!(h.get_positional(4).to_vec(), vec![5]);
}
