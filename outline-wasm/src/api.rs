use crate::error;
use crate::interop::{arr_f64, arr_u32, arr_u8, new_obj, set_kv, to_js};
use crate::Editor;
use outline::{Continuity, Control, EditorOptions, Handle, Inverse, Path, Point, Rect, SelectMode};
use wasm_bindgen::prelude::*;
type JsValue = wasm_bindgen::JsValue;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn select_mode(mode: u8) -> Option<SelectMode> {
    match mode {
        0 => Some(SelectMode::Set),
        1 => Some(SelectMode::Add),
        2 => Some(SelectMode::Subtract),
        3 => Some(SelectMode::Drag),
        _ => None,
    }
}

fn control(code: u8) -> Option<Control> {
    match code {
        0 => Some(Control::None),
        1 => Some(Control::First),
        2 => Some(Control::Second),
        _ => None,
    }
}

fn first_non_finite(params: &[(&str, f64)]) -> Option<JsValue> {
    params.iter().find(|(_, v)| !v.is_finite()).map(|(n, _)| error::non_finite(n))
}

const MODE_NAMES: &str = "0:Set, 1:Add, 2:Subtract, 3:Drag";

#[wasm_bindgen]
impl Editor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Editor {
        crate::Editor::rs_new()
    }

    // Path construction
    pub fn move_to(&mut self, x: f64, y: f64) {
        let mut paths = self.rs_paths().to_vec();
        let mut path = Path::new();
        path.append_line(Point::new(x, y), Continuity::Angle);
        paths.push(path);
        self.rs_reload(paths);
    }
    pub fn move_to_res(&mut self, x: f64, y: f64) -> JsValue {
        if let Some(e) = first_non_finite(&[("x", x), ("y", y)]) {
            return e;
        }
        self.move_to(x, y);
        error::ok(JsValue::from_f64(self.path_count() as f64))
    }
    pub fn line_to(&mut self, x: f64, y: f64) -> bool {
        self.extend_last(|path| path.append_line(Point::new(x, y), Continuity::Angle))
    }
    pub fn line_to_res(&mut self, x: f64, y: f64) -> JsValue {
        if let Some(e) = first_non_finite(&[("x", x), ("y", y)]) {
            return e;
        }
        if !self.can_extend() {
            return error::no_path();
        }
        error::ok(JsValue::from_bool(self.line_to(x, y)))
    }
    pub fn curve_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) -> bool {
        self.extend_last(|path| {
            path.append_bezier(Point::new(c1x, c1y), Point::new(c2x, c2y), Point::new(x, y), Continuity::Angle)
        })
    }
    pub fn curve_to_res(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) -> JsValue {
        let params = [("c1x", c1x), ("c1y", c1y), ("c2x", c2x), ("c2y", c2y), ("x", x), ("y", y)];
        if let Some(e) = first_non_finite(&params) {
            return e;
        }
        if !self.can_extend() {
            return error::no_path();
        }
        error::ok(JsValue::from_bool(self.curve_to(c1x, c1y, c2x, c2y, x, y)))
    }
    /// Close the path under construction. Needs at least two nodes.
    pub fn close_path(&mut self) -> bool {
        match self.rs_paths().last() {
            Some(path) if path.len() >= 2 && !path.closed() => {}
            _ => return false,
        }
        self.extend_last(Path::close_path)
    }
    pub fn close_path_res(&mut self) -> JsValue {
        if !self.can_extend() {
            return error::no_path();
        }
        error::ok(JsValue::from_bool(self.close_path()))
    }
    /// Replace all paths with a serialized path list.
    pub fn load_paths(&mut self, v: JsValue) -> bool {
        match serde_wasm_bindgen::from_value::<Vec<Path>>(v) {
            Ok(paths) => {
                self.rs_reload(paths);
                true
            }
            Err(_) => false,
        }
    }
    pub fn load_paths_res(&mut self, v: JsValue) -> JsValue {
        match serde_wasm_bindgen::from_value::<Vec<Path>>(v) {
            Ok(paths) => {
                if let Some(k) = paths.iter().position(|p| !p.is_finite()) {
                    return error::err("non_finite", format!("path {} has non-finite coordinates", k), None);
                }
                self.rs_reload(paths);
                error::ok(JsValue::from_f64(self.path_count() as f64))
            }
            Err(e) => error::err("json_parse", format!("{}", e), None),
        }
    }
    pub fn set_options_res(&mut self, v: JsValue) -> JsValue {
        let options = match serde_wasm_bindgen::from_value::<EditorOptions>(v) {
            Ok(o) => o,
            Err(e) => return error::err("json_parse", format!("{}", e), None),
        };
        for (name, step) in [("node_angle_step", options.node_angle_step), ("handle_angle_step", options.handle_angle_step)] {
            if !step.is_finite() {
                return error::non_finite(name);
            }
            if step <= 0.0 || step > std::f64::consts::PI {
                return error::out_of_range(name, 0.0, std::f64::consts::PI, step);
            }
        }
        self.options = options;
        let paths = self.rs_paths().to_vec();
        self.rs_reload(paths);
        error::ok(JsValue::from_bool(true))
    }

    // Inspection
    pub fn path_count(&self) -> u32 {
        self.rs_paths().len() as u32
    }
    pub fn node_count(&self) -> u32 {
        self.inner.object().node_count() as u32
    }
    pub fn get_paths(&self) -> JsValue {
        to_js(self.rs_paths())
    }
    pub fn get_object(&self) -> JsValue {
        to_js(self.inner.object())
    }
    /// The edited object as a JSON string.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self.inner.object()).unwrap_or_default()
    }
    /// Flat node arrays: `positions` (x,y per node), `selected` (0/1 per node)
    /// and `path_offsets` (first node of each path, then the total).
    pub fn get_node_data(&self) -> JsValue {
        let mut positions = Vec::new();
        let mut selected = Vec::new();
        let mut offsets = Vec::with_capacity(self.rs_paths().len() + 1);
        for path in self.rs_paths() {
            offsets.push(selected.len() as u32);
            for i in 0..path.len() {
                let p = path.node(i);
                positions.push(p.x);
                positions.push(p.y);
                selected.push(path.segment_selected(i) as u8);
            }
        }
        offsets.push(selected.len() as u32);
        let obj = new_obj();
        set_kv(&obj, "positions", &arr_f64(&positions).into());
        set_kv(&obj, "selected", &arr_u8(&selected).into());
        set_kv(&obj, "path_offsets", &arr_u32(&offsets).into());
        obj.into()
    }
    pub fn handles(&self) -> JsValue {
        to_js(&self.inner.handles())
    }
    pub fn state(&self) -> JsValue {
        to_js(&self.inner.state())
    }
    pub fn info(&self) -> String {
        self.inner.info()
    }
    /// `[path, position]` of the grabbed curve point, or null.
    pub fn curve_position(&self) -> JsValue {
        match self.inner.curve_position() {
            Some((path, at)) => to_js(&(path, at)),
            None => JsValue::NULL,
        }
    }

    // Selection
    pub fn deselect(&mut self) {
        self.inner.deselect()
    }
    pub fn select_all_nodes(&mut self) {
        self.inner.select_all_nodes()
    }
    pub fn select_point(&mut self, x: f64, y: f64) -> bool {
        self.inner.select_point(Point::new(x, y))
    }
    pub fn select_point_res(&mut self, x: f64, y: f64) -> JsValue {
        if let Some(e) = first_non_finite(&[("x", x), ("y", y)]) {
            return e;
        }
        error::ok(JsValue::from_bool(self.select_point(x, y)))
    }
    /// `control`: 0 node, 1 first control, 2 second control.
    pub fn select_handle(&mut self, path: u32, segment: u32, control: u8, mode: u8) -> bool {
        if self.handle_error(path, segment, control, mode).is_some() {
            return false;
        }
        self.apply_select_handle(path, segment, control, mode);
        true
    }
    pub fn select_handle_res(&mut self, path: u32, segment: u32, control: u8, mode: u8) -> JsValue {
        if let Some(e) = self.handle_error(path, segment, control, mode) {
            return e;
        }
        self.apply_select_handle(path, segment, control, mode);
        error::ok(to_js(&self.inner.state()))
    }
    pub fn select_rect(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, mode: u8) -> bool {
        match select_mode(mode) {
            Some(m) => self.inner.select_rect(&Rect::new(x1, y1, x2, y2), m),
            None => false,
        }
    }
    pub fn select_rect_res(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, mode: u8) -> JsValue {
        if let Some(e) = first_non_finite(&[("x1", x1), ("y1", y1), ("x2", x2), ("y2", y2)]) {
            return e;
        }
        if select_mode(mode).is_none() {
            return error::invalid_enum("mode", MODE_NAMES, mode);
        }
        error::ok(JsValue::from_bool(self.select_rect(x1, y1, x2, y2, mode)))
    }

    // Drag protocol
    /// Returns the pointer's `[dx, dy]` offset from the grabbed item.
    pub fn button_down(&mut self, x: f64, y: f64) -> JsValue {
        let grab = self.inner.button_down(Point::new(x, y));
        to_js(&[grab.x, grab.y])
    }
    pub fn button_down_res(&mut self, x: f64, y: f64) -> JsValue {
        if let Some(e) = first_non_finite(&[("x", x), ("y", y)]) {
            return e;
        }
        error::ok(self.button_down(x, y))
    }
    pub fn mouse_move(&mut self, x: f64, y: f64, constrain: bool) {
        self.inner.mouse_move(Point::new(x, y), constrain)
    }
    /// Paths as they would be if the drag ended now, or null.
    pub fn preview(&self) -> JsValue {
        match self.inner.preview() {
            Some(paths) => to_js(&paths),
            None => JsValue::NULL,
        }
    }
    /// Commit the drag. Returns whether the object changed.
    pub fn button_up(&mut self, x: f64, y: f64, constrain: bool) -> bool {
        let inverse = self.inner.button_up(Point::new(x, y), constrain);
        self.rs_record(inverse)
    }
    pub fn button_up_res(&mut self, x: f64, y: f64, constrain: bool) -> JsValue {
        if let Some(e) = first_non_finite(&[("x", x), ("y", y)]) {
            return e;
        }
        error::ok(JsValue::from_bool(self.button_up(x, y, constrain)))
    }

    // Commands; each returns whether the object changed
    pub fn open_nodes(&mut self) -> bool {
        let inverse = self.inner.open_nodes();
        self.rs_record(inverse)
    }
    pub fn close_nodes(&mut self) -> bool {
        let inverse = self.inner.close_nodes();
        self.rs_record(inverse)
    }
    /// `continuity`: 0 angle, 1 smooth, 2 symmetrical.
    pub fn set_continuity(&mut self, continuity: u8) -> bool {
        match Continuity::from_u8(continuity) {
            Some(c) => {
                let inverse = self.inner.set_continuity(c);
                self.rs_record(inverse)
            }
            None => false,
        }
    }
    pub fn set_continuity_res(&mut self, continuity: u8) -> JsValue {
        if Continuity::from_u8(continuity).is_none() {
            return error::invalid_enum("continuity", "0:Angle, 1:Smooth, 2:Symmetrical", continuity);
        }
        error::ok(JsValue::from_bool(self.set_continuity(continuity)))
    }
    pub fn segments_to_lines(&mut self) -> bool {
        let inverse = self.inner.segments_to_lines();
        self.rs_record(inverse)
    }
    pub fn segments_to_curve(&mut self) -> bool {
        let inverse = self.inner.segments_to_curve();
        self.rs_record(inverse)
    }
    pub fn delete_nodes(&mut self) -> bool {
        let inverse = self.inner.delete_nodes();
        self.rs_record(inverse)
    }
    pub fn insert_nodes(&mut self) -> bool {
        let inverse = self.inner.insert_nodes();
        self.rs_record(inverse)
    }
    /// Revert the last change; calling it again restores the change.
    pub fn undo(&mut self) -> bool {
        let inverse = std::mem::replace(&mut self.last, Inverse::Null);
        if inverse.is_null() {
            return false;
        }
        self.last = self.inner.apply_inverse(inverse);
        true
    }
}

impl Default for Editor {
    fn default() -> Self {
        Editor::rs_new()
    }
}

impl Editor {
    fn can_extend(&self) -> bool {
        self.rs_paths().last().map_or(false, |p| !p.closed())
    }

    fn extend_last(&mut self, f: impl FnOnce(&mut Path)) -> bool {
        if !self.can_extend() {
            return false;
        }
        let mut paths = self.rs_paths().to_vec();
        if let Some(last) = paths.last_mut() {
            f(last);
        }
        self.rs_reload(paths);
        true
    }

    fn handle_error(&self, path: u32, segment: u32, code: u8, mode: u8) -> Option<JsValue> {
        if select_mode(mode).is_none() {
            return Some(error::invalid_enum("mode", MODE_NAMES, mode));
        }
        let Some(ctrl) = control(code) else {
            return Some(error::invalid_enum("control", "0:None, 1:First, 2:Second", code));
        };
        let Some(p) = self.rs_paths().get(path as usize) else {
            return Some(error::invalid_index("path", path));
        };
        if segment as usize >= p.len() {
            return Some(error::invalid_index("segment", segment));
        }
        if ctrl != Control::None && !p.segment(segment as usize).is_bezier() {
            return Some(error::not_curve(path, segment));
        }
        None
    }

    fn apply_select_handle(&mut self, path: u32, segment: u32, code: u8, mode: u8) {
        if let (Some(control), Some(mode)) = (control(code), select_mode(mode)) {
            let handle = Handle { path_index: path as usize, segment_index: segment as usize, control };
            self.inner.select_handle(handle, mode);
        }
    }
}
