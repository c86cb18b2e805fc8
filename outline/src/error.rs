use crate::document::{Composite, FrameKind};
use thiserror::Error;

/// Two objects cannot be interpolated node by node.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("blend mismatch: {reason}")]
pub struct MismatchError {
    pub reason: String,
}

impl MismatchError {
    pub fn new(reason: impl Into<String>) -> Self {
        MismatchError { reason: reason.into() }
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    /// A composite was closed without children. It was not appended; the caller
    /// may hand it back through `DocumentBuilder::retain_composite`.
    #[error("{} closed with no children", .0.kind_name())]
    EmptyComposite(Box<Composite>),
    /// An `end_*` call did not match the innermost open frame.
    #[error("unbalanced end: expected {expected:?}, innermost open frame is {found:?}")]
    Structural { expected: FrameKind, found: FrameKind },
    /// `end_composite` was called while only the document itself was open.
    #[error("end_composite called with no open frame")]
    NoOpenFrame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("transformation produced non-finite coordinates")]
    NonFinite,
}
