//! Inverse values returned by every mutator.
//!
//! An [`Inverse`] describes how to restore the state before an edit. Applying
//! it performs the restoration and yields the inverse of *that*, so an undo
//! manager can flip between undo and redo without knowing what the edit was.

use crate::bezier::PolyBezier;
use crate::model::Point;
use crate::path::Path;
use crate::style::Style;

#[derive(Clone, Debug, PartialEq)]
#[must_use = "dropping an inverse makes the edit irreversible"]
pub enum Inverse {
    /// Nothing to undo.
    Null,
    /// Put these paths back.
    SetPaths(Vec<Path>),
    /// Translate by this offset.
    Translate(Point),
    /// Restore this style snapshot.
    Style(Style),
    /// Several inverses, applied last to first.
    Multi(Vec<Inverse>),
}

impl Inverse {
    /// Combine inverses, dropping `Null`s and flattening the trivial cases.
    pub fn multi(parts: Vec<Inverse>) -> Inverse {
        let mut parts: Vec<Inverse> = parts.into_iter().filter(|p| !p.is_null()).collect();
        match parts.len() {
            0 => Inverse::Null,
            1 => parts.pop().unwrap_or(Inverse::Null),
            _ => Inverse::Multi(parts),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Inverse::Null)
    }

    /// Restore the recorded state on `object` and return the inverse of doing so.
    pub fn apply(self, object: &mut PolyBezier) -> Inverse {
        match self {
            Inverse::Null => Inverse::Null,
            Inverse::SetPaths(paths) => object.set_paths(paths),
            Inverse::Translate(offset) => object.translate(offset),
            Inverse::Style(style) => object.set_style(style),
            Inverse::Multi(parts) => {
                // collected in application order, so the redo replays them backwards
                let redo: Vec<Inverse> = parts.into_iter().rev().map(|p| p.apply(object)).collect();
                Inverse::multi(redo)
            }
        }
    }
}
