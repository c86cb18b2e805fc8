#![cfg(target_arch = "wasm32")]

use js_sys::{Float64Array, Reflect, Uint32Array, Uint8Array};
use outline::Path;
use outline_wasm::Editor;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn square(ed: &mut Editor) {
    ed.move_to(0.0, 0.0);
    assert!(ed.line_to(10.0, 0.0));
    assert!(ed.line_to(10.0, 10.0));
    assert!(ed.line_to(0.0, 10.0));
    assert!(ed.line_to(0.0, 0.0));
    assert!(ed.close_path());
}

#[wasm_bindgen_test]
fn build_and_export_paths() {
    let mut ed = Editor::new();
    square(&mut ed);
    assert_eq!(ed.path_count(), 1);
    assert!(!ed.line_to(5.0, 5.0), "closed path must not grow");

    let paths: Vec<Path> = serde_wasm_bindgen::from_value(ed.get_paths()).unwrap();
    assert!(paths[0].closed());
    assert_eq!(paths[0].len(), 5);

    let nd = ed.get_node_data();
    let pos = Float64Array::new(&Reflect::get(&nd, &JsValue::from_str("positions")).unwrap());
    let sel = Uint8Array::new(&Reflect::get(&nd, &JsValue::from_str("selected")).unwrap());
    let off = Uint32Array::new(&Reflect::get(&nd, &JsValue::from_str("path_offsets")).unwrap());
    assert_eq!(pos.length(), 10);
    assert_eq!(sel.length(), 5);
    assert_eq!(off.to_vec(), vec![0, 5]);
}

#[wasm_bindgen_test]
fn drag_commit_and_undo() {
    let mut ed = Editor::new();
    square(&mut ed);
    assert!(ed.select_handle(0, 1, 0, 0));
    let grab: Vec<f64> = serde_wasm_bindgen::from_value(ed.button_down(10.0, 0.0)).unwrap();
    assert_eq!(grab, vec![0.0, 0.0]);
    ed.mouse_move(12.0, 0.0, false);
    assert!(!ed.preview().is_null());
    assert!(ed.button_up(15.0, 0.0, false));

    let moved: Vec<Path> = serde_wasm_bindgen::from_value(ed.get_paths()).unwrap();
    assert_eq!(moved[0].node(1).x, 15.0);

    assert!(ed.undo());
    let restored: Vec<Path> = serde_wasm_bindgen::from_value(ed.get_paths()).unwrap();
    assert_eq!(restored[0].node(1).x, 10.0);
    // second undo is the redo
    assert!(ed.undo());
    let redone: Vec<Path> = serde_wasm_bindgen::from_value(ed.get_paths()).unwrap();
    assert_eq!(redone[0].node(1).x, 15.0);
}

#[wasm_bindgen_test]
fn commands_report_changes() {
    let mut ed = Editor::new();
    square(&mut ed);
    assert!(!ed.delete_nodes(), "nothing selected");
    ed.select_all_nodes();
    assert!(ed.segments_to_curve());
    ed.select_all_nodes();
    assert!(ed.set_continuity(2));
    assert!(!ed.set_continuity(7));
    ed.deselect();
    assert!(ed.select_handle(0, 2, 0, 0));
    assert_eq!(ed.info(), "1 node of PolyBezier");
    assert!(ed.open_nodes());
    let paths: Vec<Path> = serde_wasm_bindgen::from_value(ed.get_paths()).unwrap();
    assert_eq!(paths.len(), 1);
    assert!(!paths[0].closed());
    assert_eq!(paths[0].len(), 5);
}

#[wasm_bindgen_test]
fn curve_point_selection() {
    let mut ed = Editor::new();
    ed.move_to(0.0, 0.0);
    assert!(ed.curve_to(0.0, 10.0, 10.0, 10.0, 10.0, 0.0));
    assert!(ed.select_point(5.0, 20.0));
    let pos: (usize, f64) = serde_wasm_bindgen::from_value(ed.curve_position()).unwrap();
    assert_eq!(pos.0, 0);
    assert!((pos.1 - 0.5).abs() < 1e-3);
    assert!(ed.insert_nodes());
    assert_eq!(ed.node_count(), 3);
}
