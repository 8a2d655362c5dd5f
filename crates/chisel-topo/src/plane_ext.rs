use chisel_math::Plane;

use crate::{Shape, Wire};

/// Shape-aware operations on a [`Plane`].
pub trait PlaneExt {
    /// Express a world-space shape in plane-local coordinates.
    fn shape_to_local(&self, shape: &Shape) -> Shape;

    /// Express a plane-local shape in world coordinates.
    fn shape_to_world(&self, shape: &Shape) -> Shape;

    /// Whether `test` lies inside `base` as seen from this plane.
    ///
    /// Both wires are projected into local coordinates and their 2D bounding
    /// boxes compared; `test` must be strictly inside. This is an
    /// approximation: an L-shaped outline can report a wire as inside that
    /// actually sits in its notch.
    fn is_wire_inside(&self, base: &Wire, test: &Wire) -> bool;
}

impl PlaneExt for Plane {
    fn shape_to_local(&self, shape: &Shape) -> Shape {
        shape.transformed(self.forward())
    }

    fn shape_to_world(&self, shape: &Shape) -> Shape {
        shape.transformed(self.reverse())
    }

    fn is_wire_inside(&self, base: &Wire, test: &Wire) -> bool {
        let base_bb = self.shape_to_local(&Shape::Wire(base.clone())).bounding_box();
        let test_bb = self.shape_to_local(&Shape::Wire(test.clone())).bounding_box();
        base_bb.contains_xy(&test_bb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Curve, Edge, Vertex};
    use chisel_math::Vector;

    fn square(plane: &Plane, cx: f64, cy: f64, half: f64) -> Wire {
        let local = [
            (cx - half, cy - half),
            (cx + half, cy - half),
            (cx + half, cy + half),
            (cx - half, cy + half),
        ];
        let pts: Vec<Vector> = local.iter().map(|p| plane.to_world_coords(*p)).collect();
        let verts: Vec<Vertex> = pts.iter().map(|p| Vertex::new(*p)).collect();
        let edges = (0..4)
            .map(|i| {
                Edge::new(
                    Curve::Line {
                        start: pts[i],
                        end: pts[(i + 1) % 4],
                    },
                    verts[i].clone(),
                    verts[(i + 1) % 4].clone(),
                )
            })
            .collect();
        Wire::new(edges, true)
    }

    #[test]
    fn test_wire_inside_on_tilted_plane() {
        let plane = Plane::new(Vector::new(1.0, 2.0, 3.0), Vector::new(0.0, 1.0, 0.0), Vector::new(1.0, 0.0, 1.0)).unwrap();
        let outer = square(&plane, 0.0, 0.0, 2.0);
        let inner = square(&plane, 0.5, -0.5, 0.5);
        let outside = square(&plane, 5.0, 0.0, 0.5);
        assert!(plane.is_wire_inside(&outer, &inner));
        assert!(!plane.is_wire_inside(&inner, &outer));
        assert!(!plane.is_wire_inside(&outer, &outside));
    }

    #[test]
    fn test_touching_wire_is_not_inside() {
        let plane = Plane::xy();
        let outer = square(&plane, 0.0, 0.0, 1.0);
        let edge_touching = square(&plane, 0.5, 0.0, 0.5);
        assert!(!plane.is_wire_inside(&outer, &edge_touching));
    }

    #[test]
    fn test_local_world_round_trip_for_shapes() {
        let plane = Plane::named("XZ").unwrap();
        let w = Shape::Wire(square(&plane, 1.0, 1.0, 0.5));
        let back = plane.shape_to_world(&plane.shape_to_local(&w));
        assert!((back.center() - w.center()).length() < 1e-12);
        assert!(plane.shape_to_local(&w).bounding_box().zlen() < 1e-12);
    }
}
