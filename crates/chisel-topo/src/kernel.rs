//! Geometry kernel interface.
//!
//! The builder never computes geometry itself: every edge, wire and solid
//! it produces comes from a [`Kernel`]. Introspection and transforms live on
//! [`Shape`] and need no kernel.

use chisel_math::Vector;
use thiserror::Error;

use crate::{Edge, Face, Shape, Solid, Wire};

/// Errors reported by a geometry kernel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    /// A profile wire is open, degenerate, or not planar.
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// Input geometry cannot produce the requested entity.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A boolean operation did not produce a result.
    #[error("Boolean operation failed: {0}")]
    BooleanFailed(String),

    /// The kernel does not implement this operation.
    #[error("Operation not supported by the {kernel} kernel: {operation}")]
    Unsupported {
        /// Kernel name.
        kernel: String,
        /// Operation name.
        operation: String,
    },

    /// No kernel is available.
    #[error("Kernel not available: {0}")]
    NotAvailable(String),
}

/// Result alias for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;

/// Constructors and modeling operations consumed by the builder.
///
/// Angles are in degrees. Implementations return fresh entities and never
/// mutate their inputs.
pub trait Kernel {
    /// Kernel name.
    fn name(&self) -> &str;

    /// Whether the kernel can do any work.
    fn is_available(&self) -> bool {
        true
    }

    /// Straight edge between two points.
    fn make_line(&self, start: Vector, end: Vector) -> KernelResult<Edge>;

    /// Circular arc (or full circle when the angles span 360°) about `normal`.
    fn make_circle(
        &self,
        radius: f64,
        center: Vector,
        normal: Vector,
        start_degrees: f64,
        end_degrees: f64,
    ) -> KernelResult<Edge>;

    /// Arc from `p1` through `p2` to `p3`.
    fn make_three_point_arc(&self, p1: Vector, p2: Vector, p3: Vector) -> KernelResult<Edge>;

    /// Interpolating spline through `points`.
    fn make_spline(&self, points: &[Vector]) -> KernelResult<Edge>;

    /// Chain of straight edges; closed when the last point repeats the first.
    fn make_polygon(&self, points: &[Vector]) -> KernelResult<Wire>;

    /// One wire from connected edges, merging coincident end vertices.
    fn assemble_edges(&self, edges: &[Edge]) -> KernelResult<Wire>;

    /// Axis-aligned box with its minimum corner at `corner`.
    fn make_box(&self, length: f64, width: f64, height: f64, corner: Vector) -> KernelResult<Solid>;

    /// Prism swept from a planar face (outer wire plus holes) along `direction`.
    fn extrude_linear(&self, outer: &Wire, inners: &[Wire], direction: Vector) -> KernelResult<Solid>;

    /// Like [`Kernel::extrude_linear`], twisting the profile by `angle_degrees`
    /// about the axis through `center` along `direction`.
    fn extrude_linear_with_rotation(
        &self,
        outer: &Wire,
        inners: &[Wire],
        center: Vector,
        direction: Vector,
        angle_degrees: f64,
    ) -> KernelResult<Solid>;

    /// Solid through a sequence of closed section wires.
    fn make_loft(&self, wires: &[Wire], ruled: bool) -> KernelResult<Solid>;

    /// Boolean union.
    fn fuse(&self, a: &Shape, b: &Shape) -> KernelResult<Shape>;

    /// Boolean difference `a - b`.
    fn cut(&self, a: &Shape, b: &Shape) -> KernelResult<Shape>;

    /// Boolean intersection.
    fn intersect(&self, a: &Shape, b: &Shape) -> KernelResult<Shape>;

    /// Round the given edges.
    fn fillet(&self, shape: &Shape, radius: f64, edges: &[Edge]) -> KernelResult<Shape>;

    /// Hollow the shape, opening the given faces.
    fn shell(&self, shape: &Shape, faces: &[Face], thickness: f64) -> KernelResult<Shape>;
}

/// A kernel that can do nothing; every operation reports
/// [`KernelError::NotAvailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NullKernel;

fn unavailable<T>() -> KernelResult<T> {
    Err(KernelError::NotAvailable("No geometry kernel available".into()))
}

impl Kernel for NullKernel {
    fn name(&self) -> &str {
        "null"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn make_line(&self, _start: Vector, _end: Vector) -> KernelResult<Edge> {
        unavailable()
    }

    fn make_circle(&self, _radius: f64, _center: Vector, _normal: Vector, _start: f64, _end: f64) -> KernelResult<Edge> {
        unavailable()
    }

    fn make_three_point_arc(&self, _p1: Vector, _p2: Vector, _p3: Vector) -> KernelResult<Edge> {
        unavailable()
    }

    fn make_spline(&self, _points: &[Vector]) -> KernelResult<Edge> {
        unavailable()
    }

    fn make_polygon(&self, _points: &[Vector]) -> KernelResult<Wire> {
        unavailable()
    }

    fn assemble_edges(&self, _edges: &[Edge]) -> KernelResult<Wire> {
        unavailable()
    }

    fn make_box(&self, _length: f64, _width: f64, _height: f64, _corner: Vector) -> KernelResult<Solid> {
        unavailable()
    }

    fn extrude_linear(&self, _outer: &Wire, _inners: &[Wire], _direction: Vector) -> KernelResult<Solid> {
        unavailable()
    }

    fn extrude_linear_with_rotation(
        &self,
        _outer: &Wire,
        _inners: &[Wire],
        _center: Vector,
        _direction: Vector,
        _angle_degrees: f64,
    ) -> KernelResult<Solid> {
        unavailable()
    }

    fn make_loft(&self, _wires: &[Wire], _ruled: bool) -> KernelResult<Solid> {
        unavailable()
    }

    fn fuse(&self, _a: &Shape, _b: &Shape) -> KernelResult<Shape> {
        unavailable()
    }

    fn cut(&self, _a: &Shape, _b: &Shape) -> KernelResult<Shape> {
        unavailable()
    }

    fn intersect(&self, _a: &Shape, _b: &Shape) -> KernelResult<Shape> {
        unavailable()
    }

    fn fillet(&self, _shape: &Shape, _radius: f64, _edges: &[Edge]) -> KernelResult<Shape> {
        unavailable()
    }

    fn shell(&self, _shape: &Shape, _faces: &[Face], _thickness: f64) -> KernelResult<Shape> {
        unavailable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_kernel_reports_unavailable() {
        let k = NullKernel;
        assert!(!k.is_available());
        assert_eq!(k.name(), "null");
        let err = k.make_line(Vector::zero(), Vector::x_axis()).unwrap_err();
        assert!(matches!(err, KernelError::NotAvailable(_)));
        assert!(k.make_polygon(&[]).is_err());
    }
}
