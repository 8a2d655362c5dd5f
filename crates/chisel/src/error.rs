//! Error type of the builder.

use chisel_math::MathError;
use chisel_select::SelectorError;
use chisel_topo::{KernelError, ShapeError};
use thiserror::Error;

/// Errors raised by builder operations.
///
/// A failed call leaves the node it was made on, every ancestor, and the
/// shared context exactly as they were before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChiselError {
    /// The stack is empty where an object is needed.
    #[error("Empty selection: the stack holds no objects")]
    EmptySelection,

    /// `end` walked past the root of the chain.
    #[error("No parent: the chain has fewer ancestors than requested")]
    NoParent,

    /// No solid could be found on the stack or its ancestors.
    #[error("No solid found on the stack or its parents")]
    NoSolidFound,

    /// The build context holds no pending edges or wires.
    #[error("Empty context: {0}")]
    EmptyContext(&'static str),

    /// An argument is out of its valid domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Stack index out of range.
    #[error("Index {index} out of range for a stack of {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Stack length.
        len: usize,
    },

    /// The stack top is neither an edge nor a point.
    #[error("No current point: cannot continue a sketch from a {0}")]
    NoCurrentPoint(String),

    /// Malformed selector string.
    #[error("Invalid selector: {0}")]
    InvalidSelector(#[from] SelectorError),

    /// The geometry kernel rejected an operation.
    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelError),

    /// Invalid plane or other math value.
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// In-place geometry update failed.
    #[error("Shape error: {0}")]
    Shape(#[from] ShapeError),

    /// Configuration could not be read or parsed.
    #[error("Config error: {0}")]
    Config(String),
}

/// Result alias for builder operations.
pub type ChiselResult<T> = Result<T, ChiselError>;
