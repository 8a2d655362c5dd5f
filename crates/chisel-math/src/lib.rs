#![warn(missing_docs)]

//! Math types for the chisel construction API.
//!
//! Thin wrappers around nalgebra: an immutable [`Vector`] value, 4x4
//! [`Transform`]s, the [`Plane`] coordinate system used by every sketch,
//! and axis-aligned [`BoundBox`]es.
//!
//! ```
//! use chisel_math::{Plane, Vector};
//!
//! let plane = Plane::named("XZ").unwrap();
//! let world = plane.to_world_coords((1.0, 2.0));
//! assert!((world - Vector::new(1.0, 0.0, 2.0)).length() < 1e-12);
//! ```

mod bbox;
mod error;
mod plane;
mod transform;
mod vector;

pub use bbox::BoundBox;
pub use error::MathError;
pub use plane::Plane;
pub use transform::Transform;
pub use vector::Vector;

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Linear distance tolerance.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default builder tolerances (1e-4 linear, 1e-4 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-4,
        angular: 1e-4,
    };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: Vector, b: Vector) -> bool {
        (a - b).length() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
