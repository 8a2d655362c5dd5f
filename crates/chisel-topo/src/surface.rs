//! Face geometry.

use chisel_math::{Transform, Vector};

use crate::GeomType;

/// The surface a face lies on.
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    /// Infinite plane; `normal` points out of the owning solid.
    Plane {
        /// A point on the plane.
        origin: Vector,
        /// Unit normal.
        normal: Vector,
    },
    /// Circular cylinder.
    Cylinder {
        /// A point on the axis.
        origin: Vector,
        /// Unit axis direction.
        axis: Vector,
        /// Radius.
        radius: f64,
    },
    /// A curve swept along a straight direction.
    Extrusion {
        /// Unit sweep direction.
        direction: Vector,
    },
    /// Free-form surface (lofts, twisted sweeps).
    BSpline,
}

impl Surface {
    /// Geometry tag of this surface.
    pub fn geom_type(&self) -> GeomType {
        match self {
            Surface::Plane { .. } => GeomType::Plane,
            Surface::Cylinder { .. } => GeomType::Cylinder,
            Surface::Extrusion { .. } => GeomType::Extrusion,
            Surface::BSpline => GeomType::BSpline,
        }
    }

    /// The same surface with the opposite orientation.
    pub fn flipped(&self) -> Surface {
        match self {
            Surface::Plane { origin, normal } => Surface::Plane {
                origin: *origin,
                normal: -*normal,
            },
            other => other.clone(),
        }
    }

    /// Apply an affine transform.
    pub fn transformed(&self, t: &Transform) -> Surface {
        match self {
            Surface::Plane { origin, normal } => Surface::Plane {
                origin: t.apply_point(*origin),
                normal: t.apply_normal(*normal).normalized(),
            },
            Surface::Cylinder { origin, axis, radius } => {
                if !t.is_conformal() {
                    return Surface::BSpline;
                }
                let a = t.apply_vec(*axis);
                Surface::Cylinder {
                    origin: t.apply_point(*origin),
                    axis: a.normalized(),
                    radius: radius * a.length(),
                }
            }
            Surface::Extrusion { direction } => Surface::Extrusion {
                direction: t.apply_vec(*direction).normalized(),
            },
            Surface::BSpline => Surface::BSpline,
        }
    }
}
