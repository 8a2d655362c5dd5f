use thiserror::Error;

use crate::{ShapeId, ShapeKind};

/// Errors raised by in-place shape updates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    /// The replacement geometry has the wrong kind.
    #[error("cannot replace {expected} geometry with a {found}")]
    KindMismatch {
        /// Kind the target accepts.
        expected: ShapeKind,
        /// Kind that was offered.
        found: ShapeKind,
    },

    /// The replacement would make a compound contain itself.
    #[error("compound {0} cannot contain itself")]
    SelfReference(ShapeId),
}
