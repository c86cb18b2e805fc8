use outline::{EditorOptions, Inverse, Path, PolyBezier, PolyBezierEditor, Style};
use wasm_bindgen::prelude::*;
mod api;
mod console;
mod error;
mod interop;

/// A node-editing session over one PolyBezier.
#[wasm_bindgen]
pub struct Editor {
    pub(crate) inner: PolyBezierEditor,
    pub(crate) options: EditorOptions,
    /// Inverse of the last committed edit; applying it yields the redo.
    pub(crate) last: Inverse,
}

impl Editor {
    pub fn rs_new() -> Editor {
        let options = EditorOptions::default();
        let object = PolyBezier::new(Vec::new(), Style::default());
        Editor { inner: PolyBezierEditor::with_options(object, options.clone()), options, last: Inverse::Null }
    }

    pub fn rs_paths(&self) -> &[Path] {
        self.inner.paths()
    }

    /// Restart the session on `paths`, keeping style and options. Selection and
    /// the stored inverse are dropped.
    pub(crate) fn rs_reload(&mut self, paths: Vec<Path>) {
        let style = self.inner.object().style().clone();
        self.inner = PolyBezierEditor::with_options(PolyBezier::new(paths, style), self.options.clone());
        self.last = Inverse::Null;
    }

    /// Keep `inverse` when it records a change. Returns whether it did.
    pub(crate) fn rs_record(&mut self, inverse: Inverse) -> bool {
        if inverse.is_null() {
            return false;
        }
        self.last = inverse;
        true
    }
}
