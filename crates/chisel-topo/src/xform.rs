//! Rigid and affine transforms of whole shapes.
//!
//! Transforming rebuilds the entity graph with fresh ids while keeping
//! sharing intact: a vertex used by four edges is mapped once and the four
//! new edges share the new vertex.

use std::collections::HashMap;

use chisel_math::{Transform, Vector};

use crate::{Compound, Edge, Face, Shape, ShapeId, Shell, Solid, Vertex, Wire};

struct Mapper<'a> {
    t: &'a Transform,
    flip: bool,
    vertices: HashMap<ShapeId, Vertex>,
    edges: HashMap<ShapeId, Edge>,
    wires: HashMap<ShapeId, Wire>,
    faces: HashMap<ShapeId, Face>,
}

impl<'a> Mapper<'a> {
    fn new(t: &'a Transform) -> Self {
        Self {
            t,
            flip: t.determinant() < 0.0,
            vertices: HashMap::new(),
            edges: HashMap::new(),
            wires: HashMap::new(),
            faces: HashMap::new(),
        }
    }

    fn vertex(&mut self, v: &Vertex) -> Vertex {
        let t = self.t;
        self.vertices
            .entry(v.id())
            .or_insert_with(|| Vertex::new(t.apply_point(v.point())))
            .clone()
    }

    fn edge(&mut self, e: &Edge) -> Edge {
        if let Some(done) = self.edges.get(&e.id()) {
            return done.clone();
        }
        let start = self.vertex(e.start_vertex());
        let end = self.vertex(e.end_vertex());
        let mapped = Edge::new(e.curve().transformed(self.t), start, end);
        mapped.set_for_construction(e.for_construction());
        self.edges.insert(e.id(), mapped.clone());
        mapped
    }

    fn wire(&mut self, w: &Wire) -> Wire {
        if let Some(done) = self.wires.get(&w.id()) {
            return done.clone();
        }
        let edges = w.edges().iter().map(|e| self.edge(e)).collect();
        let mapped = Wire::new(edges, w.is_closed());
        mapped.set_for_construction(w.for_construction());
        self.wires.insert(w.id(), mapped.clone());
        mapped
    }

    fn face(&mut self, f: &Face) -> Face {
        if let Some(done) = self.faces.get(&f.id()) {
            return done.clone();
        }
        let outer = self.wire(f.outer_wire());
        let inners = f.inner_wires().iter().map(|w| self.wire(w)).collect();
        let t = self.t;
        let triangles = f
            .triangles()
            .iter()
            .map(|tri| {
                let mut m = tri.map(|p| t.apply_point(p));
                // mirroring reverses winding; restore counter-clockwise order
                if self.flip {
                    m.swap(1, 2);
                }
                m
            })
            .collect();
        let mapped = Face::new(f.surface().transformed(t), outer, inners, triangles);
        self.faces.insert(f.id(), mapped.clone());
        mapped
    }

    fn shell(&mut self, s: &Shell) -> Shell {
        Shell::new(s.faces().iter().map(|f| self.face(f)).collect())
    }

    fn shape(&mut self, shape: &Shape) -> Shape {
        match shape {
            Shape::Vertex(v) => self.vertex(v).into(),
            Shape::Edge(e) => self.edge(e).into(),
            Shape::Wire(w) => self.wire(w).into(),
            Shape::Face(f) => self.face(f).into(),
            Shape::Shell(s) => self.shell(s).into(),
            Shape::Solid(s) => Solid::new(s.shells().iter().map(|sh| self.shell(sh)).collect()).into(),
            Shape::Compound(c) => Compound::new(c.children().iter().map(|ch| self.shape(ch)).collect()).into(),
        }
    }
}

impl Shape {
    /// A transformed copy of this shape.
    pub fn transformed(&self, t: &Transform) -> Shape {
        Mapper::new(t).shape(self)
    }

    /// A copy moved by `v`.
    pub fn translated(&self, v: Vector) -> Shape {
        self.transformed(&Transform::translation(v))
    }

    /// A copy rotated by `degrees` about the axis from `axis_start` to `axis_end`.
    pub fn rotated(&self, axis_start: Vector, axis_end: Vector, degrees: f64) -> Shape {
        self.transformed(&Transform::rotation_about_axis(
            axis_start,
            axis_end - axis_start,
            degrees.to_radians(),
        ))
    }

    /// A copy scaled uniformly about the origin.
    pub fn scaled(&self, factor: f64) -> Shape {
        self.transformed(&Transform::scale(factor))
    }

    /// A copy mirrored through the plane with `normal` passing through `origin`.
    pub fn mirrored(&self, origin: Vector, normal: Vector) -> Shape {
        self.transformed(&Transform::mirror(origin, normal))
    }
}
