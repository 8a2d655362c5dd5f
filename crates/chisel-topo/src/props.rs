//! Geometric properties: centers, bounding boxes, measures.

use chisel_math::{BoundBox, Vector};

use crate::curve::{polyline_centroid, Resolution};
use crate::{Face, Shape};

fn triangle_area(t: &[Vector; 3]) -> f64 {
    (t[1] - t[0]).cross(t[2] - t[0]).length() * 0.5
}

fn signed_tet_volume(t: &[Vector; 3]) -> f64 {
    t[0].dot(t[1].cross(t[2])) / 6.0
}

fn weighted_mean(items: impl Iterator<Item = (Vector, f64)>) -> Option<Vector> {
    let (sum, total) = items.fold((Vector::zero(), 0.0), |(acc, w), (p, wi)| (acc + p * wi, w + wi));
    if total.abs() < 1e-15 {
        None
    } else {
        Some(sum * (1.0 / total))
    }
}

impl Face {
    /// Surface area.
    pub fn area(&self) -> f64 {
        self.triangles().iter().map(triangle_area).sum()
    }

    /// Area-weighted centroid.
    pub fn center(&self) -> Vector {
        weighted_mean(self.triangles().iter().map(|t| {
            let c = (t[0] + t[1] + t[2]) * (1.0 / 3.0);
            (c, triangle_area(t))
        }))
        .unwrap_or_else(|| Shape::Wire(self.outer_wire().clone()).center())
    }
}

impl Shape {
    /// Center of mass.
    ///
    /// Vertices use their point, edges and wires are length weighted, faces
    /// and shells area weighted, solids volume weighted. Compounds use the
    /// highest-dimensional measure their content provides.
    pub fn center(&self) -> Vector {
        match self {
            Shape::Vertex(v) => v.point(),
            Shape::Edge(e) => e.curve().center(),
            Shape::Wire(w) => weighted_mean(w.edges().iter().map(|e| (e.curve().center(), e.length())))
                .unwrap_or_else(|| polyline_centroid(&w.sample(&Resolution::DEFAULT))),
            Shape::Face(f) => f.center(),
            Shape::Shell(_) | Shape::Solid(_) | Shape::Compound(_) => self.aggregate_center(),
        }
    }

    fn aggregate_center(&self) -> Vector {
        let faces: Vec<Face> = self.faces().iter().filter_map(|f| f.as_face().cloned()).collect();
        if !matches!(self, Shape::Shell(_)) {
            let tets = faces.iter().flat_map(|f| {
                f.triangles().iter().map(|t| {
                    let c = (t[0] + t[1] + t[2]) * 0.25;
                    (c, signed_tet_volume(t))
                })
            });
            if let Some(c) = weighted_mean(tets) {
                return c;
            }
        }
        if let Some(c) = weighted_mean(faces.iter().map(|f| (f.center(), f.area()))) {
            return c;
        }
        let edges = self.edges();
        if let Some(c) = weighted_mean(edges.iter().map(|e| (e.center(), e.length()))) {
            return c;
        }
        let verts = self.vertices();
        weighted_mean(verts.iter().map(|v| (v.center(), 1.0))).unwrap_or_default()
    }

    /// Axis-aligned bounding box.
    pub fn bounding_box(&self) -> BoundBox {
        let res = Resolution::DEFAULT;
        match self {
            Shape::Vertex(v) => BoundBox::from_points([v.point()]),
            Shape::Edge(e) => BoundBox::from_points(e.sample(&res)),
            Shape::Wire(w) => BoundBox::from_points(w.edges().iter().flat_map(|e| e.sample(&res))),
            Shape::Face(f) => {
                let tri = BoundBox::from_points(f.triangles().iter().flat_map(|t| t.iter().copied()));
                tri.union(&Shape::Wire(f.outer_wire().clone()).bounding_box())
            }
            _ => self
                .children()
                .iter()
                .fold(BoundBox::empty(), |bb, c| bb.union(&c.bounding_box())),
        }
    }

    /// Enclosed volume; zero for anything below a solid.
    pub fn volume(&self) -> f64 {
        match self {
            Shape::Solid(s) => s
                .faces()
                .iter()
                .flat_map(|f| f.triangles().iter().map(signed_tet_volume).collect::<Vec<_>>())
                .sum(),
            Shape::Compound(c) => c.children().iter().map(Shape::volume).sum(),
            _ => 0.0,
        }
    }

    /// Total face area.
    pub fn area(&self) -> f64 {
        match self {
            Shape::Vertex(_) | Shape::Edge(_) | Shape::Wire(_) => 0.0,
            Shape::Face(f) => f.area(),
            _ => self.faces().iter().map(Shape::area).sum(),
        }
    }

    /// Total edge length for edges and wires.
    pub fn length(&self) -> f64 {
        match self {
            Shape::Edge(e) => e.length(),
            Shape::Wire(w) => w.length(),
            _ => 0.0,
        }
    }
}
