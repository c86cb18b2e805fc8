#![cfg(target_arch = "wasm32")]

use js_sys::{Object, Reflect};
use outline_wasm::Editor;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn is_err(v: &JsValue, code: &str) -> bool {
    if let Ok(ok) =
        Reflect::get(v, &JsValue::from_str("ok")).and_then(|x| x.as_bool().ok_or(JsValue::NULL))
    {
        if ok {
            return false;
        }
        if let Ok(err) = Reflect::get(v, &JsValue::from_str("error")) {
            if let Ok(c) = Reflect::get(&err, &JsValue::from_str("code")) {
                return c.as_string().map_or(false, |s| s == code);
            }
        }
    }
    false
}

fn is_ok(v: &JsValue) -> bool {
    Reflect::get(v, &JsValue::from_str("ok")).ok().and_then(|x| x.as_bool()).unwrap_or(false)
}

#[wasm_bindgen_test]
fn construction_errors() {
    let mut ed = Editor::new();
    assert!(is_err(&ed.line_to_res(1.0, 1.0), "no_path"));
    assert!(is_err(&ed.move_to_res(f64::NAN, 0.0), "non_finite"));
    assert_eq!(ed.path_count(), 0, "state mutated on error");
    assert!(is_ok(&ed.move_to_res(0.0, 0.0)));
    assert!(is_err(&ed.curve_to_res(0.0, 1.0, f64::INFINITY, 1.0, 2.0, 0.0), "non_finite"));
    assert_eq!(ed.node_count(), 1);
    assert!(is_err(&ed.load_paths_res(JsValue::from_str("not paths")), "json_parse"));
}

#[wasm_bindgen_test]
fn selection_errors() {
    let mut ed = Editor::new();
    ed.move_to(0.0, 0.0);
    ed.line_to(10.0, 0.0);
    assert!(is_err(&ed.select_handle_res(3, 0, 0, 0), "invalid_index"));
    assert!(is_err(&ed.select_handle_res(0, 9, 0, 0), "invalid_index"));
    assert!(is_err(&ed.select_handle_res(0, 1, 1, 0), "not_curve"));
    assert!(is_err(&ed.select_handle_res(0, 1, 0, 9), "invalid_mode"));
    assert!(is_err(&ed.select_rect_res(0.0, 0.0, f64::NAN, 1.0, 0), "non_finite"));
    assert!(is_err(&ed.set_continuity_res(5), "invalid_mode"));
    assert!(is_ok(&ed.select_handle_res(0, 1, 0, 0)));
}

#[wasm_bindgen_test]
fn option_errors() {
    let mut ed = Editor::new();
    let bad = Object::new();
    Reflect::set(&bad, &JsValue::from_str("node_angle_step"), &JsValue::from_f64(-1.0)).unwrap();
    assert!(is_err(&ed.set_options_res(bad.into()), "out_of_range"));
    let good = Object::new();
    Reflect::set(&good, &JsValue::from_str("handle_angle_step"), &JsValue::from_f64(0.5)).unwrap();
    assert!(is_ok(&ed.set_options_res(good.into())));
}
