use thiserror::Error;

/// Errors raised while building planes and other math values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MathError {
    /// A plane was requested with a zero-length normal.
    #[error("plane normal must be non-zero")]
    ZeroNormal,

    /// A plane was requested with a zero-length x direction.
    #[error("plane x direction must be non-zero")]
    ZeroXDir,

    /// The x direction is not perpendicular to the normal.
    #[error("plane x direction must be perpendicular to the normal (dot = {0})")]
    NotPerpendicular(f64),

    /// No preset plane carries this name.
    #[error("unknown plane name: {0}")]
    UnknownPlane(String),

    /// The plane transform could not be inverted.
    #[error("singular plane transform")]
    SingularTransform,
}
