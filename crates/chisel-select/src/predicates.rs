//! Selectors that test each entity on its own, plus the two that pick a
//! single extreme entity.

use std::f64::consts::FRAC_PI_2;

use chisel_math::{BoundBox, Vector};
use chisel_topo::{Curve, Shape};

use crate::selector::{Selector, DEFAULT_TOLERANCE};

/// Direction of a planar face (its normal) or a straight edge (start to
/// end). Every other entity has none.
fn direction_of(shape: &Shape) -> Option<Vector> {
    match shape {
        Shape::Face(f) if f.is_planar() => Some(f.normal().normalized()),
        Shape::Edge(e) if matches!(e.curve(), Curve::Line { .. }) => {
            Some((e.end_point() - e.start_point()).normalized())
        }
        _ => None,
    }
}

/// Passes every entity through.
#[derive(Debug, Clone, Copy, Default)]
pub struct All;

impl Selector for All {
    fn filter(&self, objects: &[Shape]) -> Vec<Shape> {
        objects.to_vec()
    }
}

/// The single entity whose center lies closest to a point.
#[derive(Debug, Clone, Copy)]
pub struct NearestToPoint {
    point: Vector,
}

impl NearestToPoint {
    /// Select the entity nearest `point`.
    pub fn new(point: impl Into<Vector>) -> Self {
        Self { point: point.into() }
    }
}

impl Selector for NearestToPoint {
    fn filter(&self, objects: &[Shape]) -> Vec<Shape> {
        objects
            .iter()
            .map(|o| (o.center().distance(self.point), o))
            .fold(None, |best: Option<(f64, &Shape)>, (d, o)| match best {
                Some((bd, _)) if bd <= d => best,
                _ => Some((d, o)),
            })
            .map(|(_, o)| vec![o.clone()])
            .unwrap_or_default()
    }
}

/// Entities inside an axis-aligned box given by two opposite corners.
///
/// By default an entity's center must lie strictly inside; with
/// [`BoxSelector::with_bounding_box`] its whole bounding box must.
#[derive(Debug, Clone, Copy)]
pub struct BoxSelector {
    bounds: BoundBox,
    use_bounding_box: bool,
}

impl BoxSelector {
    /// Box between two corners, in either order.
    pub fn new(p0: impl Into<Vector>, p1: impl Into<Vector>) -> Self {
        Self {
            bounds: BoundBox::from_corners(p0.into(), p1.into()),
            use_bounding_box: false,
        }
    }

    /// Test whole bounding boxes instead of centers.
    pub fn with_bounding_box(mut self) -> Self {
        self.use_bounding_box = true;
        self
    }

    fn strictly_inside(&self, p: Vector) -> bool {
        let (lo, hi) = (self.bounds.min, self.bounds.max);
        lo.x() < p.x() && p.x() < hi.x() && lo.y() < p.y() && p.y() < hi.y() && lo.z() < p.z() && p.z() < hi.z()
    }
}

impl Selector for BoxSelector {
    fn filter(&self, objects: &[Shape]) -> Vec<Shape> {
        objects
            .iter()
            .filter(|o| {
                if self.use_bounding_box {
                    let bb = o.bounding_box();
                    !bb.is_empty() && self.strictly_inside(bb.min) && self.strictly_inside(bb.max)
                } else {
                    self.strictly_inside(o.center())
                }
            })
            .cloned()
            .collect()
    }
}

// =============================================================================
// Direction tests
// =============================================================================

macro_rules! direction_selector {
    ($(#[$doc:meta])* $name:ident, |$n:ident, $v:ident, $tol:ident| $test:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name {
            direction: Vector,
            tolerance: f64,
        }

        impl $name {
            /// Selector against `direction` with the default tolerance.
            pub fn new(direction: impl Into<Vector>) -> Self {
                Self::with_tolerance(direction, DEFAULT_TOLERANCE)
            }

            /// Selector against `direction` with an explicit tolerance.
            pub fn with_tolerance(direction: impl Into<Vector>, tolerance: f64) -> Self {
                Self {
                    direction: direction.into().normalized(),
                    tolerance,
                }
            }
        }

        impl Selector for $name {
            fn filter(&self, objects: &[Shape]) -> Vec<Shape> {
                let $v = self.direction;
                let $tol = self.tolerance;
                objects
                    .iter()
                    .filter(|o| direction_of(o).is_some_and(|$n| $test))
                    .cloned()
                    .collect()
            }
        }
    };
}

direction_selector!(
    /// Planar faces whose normal, or straight edges whose direction, is
    /// parallel to a vector in either sense.
    ParallelDir,
    |n, v, tol| n.cross(v).length() < tol
);

direction_selector!(
    /// Planar faces or straight edges pointing the same way as a vector.
    DirectionSelector,
    |n, v, tol| n.angle(v) < tol
);

direction_selector!(
    /// Planar faces or straight edges at right angles to a vector.
    PerpendicularDir,
    |n, v, tol| (n.angle(v) - FRAC_PI_2).abs() < tol
);

/// Entities whose geometry type matches a name, ignoring case
/// (`"plane"`, `"LINE"`, `"Circle"`).
#[derive(Debug, Clone)]
pub struct TypeSelector {
    name: String,
}

impl TypeSelector {
    /// Select entities of geometry type `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Selector for TypeSelector {
    fn filter(&self, objects: &[Shape]) -> Vec<Shape> {
        objects
            .iter()
            .filter(|o| o.geom_type().to_string().eq_ignore_ascii_case(&self.name))
            .cloned()
            .collect()
    }
}

/// The single entity whose center lies farthest along (or against) a
/// direction. Ties keep the first entity.
#[derive(Debug, Clone, Copy)]
pub struct DirectionMinMax {
    direction: Vector,
    want_max: bool,
}

impl DirectionMinMax {
    /// Extreme entity along `direction`; the maximum when `want_max`.
    pub fn new(direction: impl Into<Vector>, want_max: bool) -> Self {
        Self {
            direction: direction.into(),
            want_max,
        }
    }

    /// Entity with the largest `center · direction`.
    pub fn max(direction: impl Into<Vector>) -> Self {
        Self::new(direction, true)
    }

    /// Entity with the smallest `center · direction`.
    pub fn min(direction: impl Into<Vector>) -> Self {
        Self::new(direction, false)
    }
}

impl Selector for DirectionMinMax {
    fn filter(&self, objects: &[Shape]) -> Vec<Shape> {
        let sign = if self.want_max { 1.0 } else { -1.0 };
        objects
            .iter()
            .map(|o| (sign * o.center().dot(self.direction), o))
            .fold(None, |best: Option<(f64, &Shape)>, (d, o)| match best {
                Some((bd, _)) if bd >= d => best,
                _ => Some((d, o)),
            })
            .map(|(_, o)| vec![o.clone()])
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chisel_kernel_mesh::MeshKernel;
    use chisel_topo::Kernel;

    fn unit_cube() -> Shape {
        Shape::from(
            MeshKernel::new()
                .make_box(1.0, 1.0, 1.0, Vector::new(-0.5, -0.5, -0.5))
                .unwrap(),
        )
    }

    #[test]
    fn test_all_keeps_order() {
        let faces = unit_cube().faces();
        let out = All.filter(&faces);
        assert!(out.iter().zip(&faces).all(|(a, b)| a.same_as(b)));
    }

    #[test]
    fn test_nearest_to_point() {
        let verts = unit_cube().vertices();
        let out = NearestToPoint::new((1.0, 1.0, 1.0)).filter(&verts);
        assert_eq!(out.len(), 1);
        assert_relative_eq!(out[0].center().x(), 0.5);
        assert_relative_eq!(out[0].center().z(), 0.5);
        assert!(NearestToPoint::new((0.0, 0.0, 0.0)).filter(&[]).is_empty());
    }

    #[test]
    fn test_box_selector_corner_order() {
        let faces = unit_cube().faces();
        let a = BoxSelector::new((-1.0, -1.0, 0.2), (1.0, 1.0, 1.0)).filter(&faces);
        let b = BoxSelector::new((1.0, 1.0, 1.0), (-1.0, -1.0, 0.2)).filter(&faces);
        assert_eq!(a.len(), 1);
        assert!(a[0].same_as(&b[0]));
        assert_relative_eq!(a[0].center().z(), 0.5);
    }

    #[test]
    fn test_box_selector_bounding_box_mode() {
        let faces = unit_cube().faces();
        let sel = BoxSelector::new((-1.0, -1.0, 0.2), (1.0, 1.0, 1.0)).with_bounding_box();
        assert_eq!(sel.filter(&faces).len(), 1);
        let tight = BoxSelector::new((-0.6, -0.6, 0.2), (0.6, 0.4, 1.0)).with_bounding_box();
        assert!(tight.filter(&faces).is_empty());
    }

    #[test]
    fn test_parallel_faces_and_edges() {
        let cube = unit_cube();
        assert_eq!(ParallelDir::new(Vector::z_axis()).filter(&cube.faces()).len(), 2);
        assert_eq!(ParallelDir::new(Vector::z_axis()).filter(&cube.edges()).len(), 4);
        assert!(ParallelDir::new(Vector::z_axis()).filter(&cube.vertices()).is_empty());
    }

    #[test]
    fn test_direction_is_signed() {
        let faces = unit_cube().faces();
        let up = DirectionSelector::new(Vector::z_axis()).filter(&faces);
        let down = DirectionSelector::new(-Vector::z_axis()).filter(&faces);
        assert_eq!(up.len(), 1);
        assert_eq!(down.len(), 1);
        assert_relative_eq!(up[0].center().z(), 0.5);
        assert_relative_eq!(down[0].center().z(), -0.5);
    }

    #[test]
    fn test_perpendicular_faces() {
        let faces = unit_cube().faces();
        assert_eq!(PerpendicularDir::new(Vector::z_axis()).filter(&faces).len(), 4);
    }

    #[test]
    fn test_type_selector_ignores_case() {
        let cube = unit_cube();
        assert_eq!(TypeSelector::new("plane").filter(&cube.faces()).len(), 6);
        assert_eq!(TypeSelector::new("Line").filter(&cube.edges()).len(), 12);
        assert!(TypeSelector::new("CIRCLE").filter(&cube.edges()).is_empty());
    }

    #[test]
    fn test_direction_min_max() {
        let faces = unit_cube().faces();
        let top = DirectionMinMax::max(Vector::z_axis()).filter(&faces);
        let bottom = DirectionMinMax::min(Vector::z_axis()).filter(&faces);
        assert_eq!(top.len(), 1);
        assert_relative_eq!(top[0].center().z(), 0.5);
        assert_relative_eq!(bottom[0].center().z(), -0.5);
        assert!(DirectionMinMax::max(Vector::x_axis()).filter(&[]).is_empty());
    }

    #[test]
    fn test_min_max_ties_keep_first() {
        let verts = unit_cube().vertices();
        let top = DirectionMinMax::max(Vector::z_axis()).filter(&verts);
        let first_top = verts.iter().find(|v| v.center().z() > 0.0).unwrap();
        assert!(top[0].same_as(first_top));
    }
}
