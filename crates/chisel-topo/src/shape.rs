//! Shape handles and the closed [`Shape`] sum type.
//!
//! Handles are reference counted. Cloning a handle aliases the same entity,
//! and [`ShapeId`] equality is identity equality. Vertices, edges, wires,
//! faces and shells are immutable once built; solids and compounds are
//! cells whose geometry can be replaced in place while their id stays fixed.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use chisel_math::Vector;

use crate::curve::{Curve, Resolution};
use crate::surface::Surface;
use crate::ShapeError;

/// Identity of a shape entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(u64);

impl ShapeId {
    /// Raw numeric value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Global atomic counter for unique shape ids.
static NEXT_SHAPE_ID: AtomicU64 = AtomicU64::new(1);

fn alloc_shape_id() -> ShapeId {
    ShapeId(NEXT_SHAPE_ID.fetch_add(1, Ordering::Relaxed))
}

/// Topological kind of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// A point.
    Vertex,
    /// A bounded curve.
    Edge,
    /// Connected sequence of edges.
    Wire,
    /// Bounded surface patch.
    Face,
    /// Connected set of faces.
    Shell,
    /// Volume bounded by shells.
    Solid,
    /// Arbitrary collection of shapes.
    Compound,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShapeKind::Vertex => "Vertex",
            ShapeKind::Edge => "Edge",
            ShapeKind::Wire => "Wire",
            ShapeKind::Face => "Face",
            ShapeKind::Shell => "Shell",
            ShapeKind::Solid => "Solid",
            ShapeKind::Compound => "Compound",
        };
        f.write_str(s)
    }
}

/// Geometry type tag, as matched by type selectors.
///
/// Edges report their curve type and faces their surface type; every other
/// kind reports its topological kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeomType {
    /// Vertex.
    Vertex,
    /// Straight edge.
    Line,
    /// Circular edge.
    Circle,
    /// Free-form edge or face.
    BSpline,
    /// Wire.
    Wire,
    /// Planar face.
    Plane,
    /// Cylindrical face.
    Cylinder,
    /// Linearly swept face.
    Extrusion,
    /// Shell.
    Shell,
    /// Solid.
    Solid,
    /// Compound.
    Compound,
}

impl fmt::Display for GeomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GeomType::Vertex => "Vertex",
            GeomType::Line => "LINE",
            GeomType::Circle => "CIRCLE",
            GeomType::BSpline => "BSPLINE",
            GeomType::Wire => "Wire",
            GeomType::Plane => "PLANE",
            GeomType::Cylinder => "CYLINDER",
            GeomType::Extrusion => "EXTRUSION",
            GeomType::Shell => "Shell",
            GeomType::Solid => "Solid",
            GeomType::Compound => "Compound",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Vertex
// =============================================================================

#[derive(Debug)]
struct VertexData {
    id: ShapeId,
    point: Vector,
}

/// A point entity.
#[derive(Debug, Clone)]
pub struct Vertex(Rc<VertexData>);

impl Vertex {
    /// New vertex at `point`.
    pub fn new(point: Vector) -> Self {
        Self(Rc::new(VertexData {
            id: alloc_shape_id(),
            point,
        }))
    }

    /// Identity.
    pub fn id(&self) -> ShapeId {
        self.0.id
    }

    /// Location.
    pub fn point(&self) -> Vector {
        self.0.point
    }
}

// =============================================================================
// Edge
// =============================================================================

#[derive(Debug)]
struct EdgeData {
    id: ShapeId,
    curve: Curve,
    start: Vertex,
    end: Vertex,
    for_construction: Cell<bool>,
}

/// A bounded curve between two vertices.
#[derive(Debug, Clone)]
pub struct Edge(Rc<EdgeData>);

impl Edge {
    /// New edge on `curve` bounded by the given vertices.
    pub fn new(curve: Curve, start: Vertex, end: Vertex) -> Self {
        Self(Rc::new(EdgeData {
            id: alloc_shape_id(),
            curve,
            start,
            end,
            for_construction: Cell::new(false),
        }))
    }

    /// New edge with fresh vertices; a closed curve gets a single shared vertex.
    pub fn from_curve(curve: Curve) -> Self {
        let start = Vertex::new(curve.start());
        let end = if curve.is_full_circle() || curve.start().distance(curve.end()) < 1e-9 {
            start.clone()
        } else {
            Vertex::new(curve.end())
        };
        Self::new(curve, start, end)
    }

    /// Identity.
    pub fn id(&self) -> ShapeId {
        self.0.id
    }

    /// Underlying curve.
    pub fn curve(&self) -> &Curve {
        &self.0.curve
    }

    /// Start vertex.
    pub fn start_vertex(&self) -> &Vertex {
        &self.0.start
    }

    /// End vertex.
    pub fn end_vertex(&self) -> &Vertex {
        &self.0.end
    }

    /// Start point.
    pub fn start_point(&self) -> Vector {
        self.0.start.point()
    }

    /// End point.
    pub fn end_point(&self) -> Vector {
        self.0.end.point()
    }

    /// Whether start and end are the same vertex.
    pub fn is_closed(&self) -> bool {
        self.0.start.id() == self.0.end.id()
    }

    /// Arc length.
    pub fn length(&self) -> f64 {
        self.0.curve.length()
    }

    /// Unit tangent at normalized parameter `t`.
    pub fn tangent_at(&self, t: f64) -> Vector {
        self.0.curve.tangent_at(t)
    }

    /// Polyline approximation from start to end.
    pub fn sample(&self, res: &Resolution) -> Vec<Vector> {
        self.0.curve.sample(res)
    }

    /// The same edge traversed backwards, sharing both vertices.
    pub fn reversed(&self) -> Edge {
        let e = Edge::new(self.0.curve.reversed(), self.0.end.clone(), self.0.start.clone());
        e.set_for_construction(self.for_construction());
        e
    }

    /// Whether this edge is construction geometry.
    pub fn for_construction(&self) -> bool {
        self.0.for_construction.get()
    }

    /// Mark or unmark as construction geometry.
    pub fn set_for_construction(&self, flag: bool) {
        self.0.for_construction.set(flag);
    }
}

// =============================================================================
// Wire
// =============================================================================

#[derive(Debug)]
struct WireData {
    id: ShapeId,
    edges: Vec<Edge>,
    closed: bool,
    for_construction: Cell<bool>,
}

/// A connected chain of edges.
#[derive(Debug, Clone)]
pub struct Wire(Rc<WireData>);

impl Wire {
    /// New wire over `edges`.
    pub fn new(edges: Vec<Edge>, closed: bool) -> Self {
        Self(Rc::new(WireData {
            id: alloc_shape_id(),
            edges,
            closed,
            for_construction: Cell::new(false),
        }))
    }

    /// Identity.
    pub fn id(&self) -> ShapeId {
        self.0.id
    }

    /// Edges in traversal order.
    pub fn edges(&self) -> &[Edge] {
        &self.0.edges
    }

    /// Whether the wire forms a loop.
    pub fn is_closed(&self) -> bool {
        self.0.closed
    }

    /// Total length.
    pub fn length(&self) -> f64 {
        self.0.edges.iter().map(Edge::length).sum()
    }

    /// Whether this wire is construction geometry.
    pub fn for_construction(&self) -> bool {
        self.0.for_construction.get()
    }

    /// Mark or unmark as construction geometry.
    pub fn set_for_construction(&self, flag: bool) {
        self.0.for_construction.set(flag);
    }

    /// Edge curves oriented along the traversal direction.
    ///
    /// Edges shared with a neighboring face may be stored backwards; those
    /// come out reversed.
    pub fn ordered_curves(&self) -> Vec<Curve> {
        let edges = &self.0.edges;
        let mut out: Vec<Curve> = Vec::with_capacity(edges.len());
        let mut cursor: Option<Vector> = None;
        for (i, edge) in edges.iter().enumerate() {
            let (head, tail) = (edge.start_point(), edge.end_point());
            let flip = match cursor {
                Some(c) => head.distance(c) > tail.distance(c),
                None => match edges.get(i + 1) {
                    Some(next) => {
                        let reach = |p: Vector| p.distance(next.start_point()).min(p.distance(next.end_point()));
                        reach(head) < reach(tail)
                    }
                    None => false,
                },
            };
            let curve = if flip {
                edge.curve().reversed()
            } else {
                edge.curve().clone()
            };
            cursor = Some(curve.end());
            out.push(curve);
        }
        out
    }

    /// Ordered polyline through the wire.
    ///
    /// A closed wire does not repeat its first point.
    pub fn sample(&self, res: &Resolution) -> Vec<Vector> {
        let mut out: Vec<Vector> = Vec::new();
        for (i, curve) in self.ordered_curves().iter().enumerate() {
            let mut pts = curve.sample(res);
            if i > 0 && !pts.is_empty() {
                pts.remove(0);
            }
            out.extend(pts);
        }
        if self.0.closed && out.len() > 1 && out[0].distance(out[out.len() - 1]) < 1e-9 {
            out.pop();
        }
        out
    }
}

// =============================================================================
// Face
// =============================================================================

#[derive(Debug)]
struct FaceData {
    id: ShapeId,
    surface: Surface,
    outer: Wire,
    inners: Vec<Wire>,
    triangles: Vec<[Vector; 3]>,
}

/// A bounded patch of a surface with its triangulation.
///
/// Triangles wind counter-clockwise about the face's outward normal.
#[derive(Debug, Clone)]
pub struct Face(Rc<FaceData>);

impl Face {
    /// New face.
    pub fn new(surface: Surface, outer: Wire, inners: Vec<Wire>, triangles: Vec<[Vector; 3]>) -> Self {
        Self(Rc::new(FaceData {
            id: alloc_shape_id(),
            surface,
            outer,
            inners,
            triangles,
        }))
    }

    /// Identity.
    pub fn id(&self) -> ShapeId {
        self.0.id
    }

    /// Underlying surface.
    pub fn surface(&self) -> &Surface {
        &self.0.surface
    }

    /// Outer boundary.
    pub fn outer_wire(&self) -> &Wire {
        &self.0.outer
    }

    /// Hole boundaries.
    pub fn inner_wires(&self) -> &[Wire] {
        &self.0.inners
    }

    /// Outer boundary followed by the holes.
    pub fn wires(&self) -> Vec<Wire> {
        std::iter::once(self.0.outer.clone())
            .chain(self.0.inners.iter().cloned())
            .collect()
    }

    /// Triangulation.
    pub fn triangles(&self) -> &[[Vector; 3]] {
        &self.0.triangles
    }

    /// Whether the face lies on a plane.
    pub fn is_planar(&self) -> bool {
        matches!(self.0.surface, Surface::Plane { .. })
    }

    /// Outward normal: exact for planes, area-weighted average otherwise.
    pub fn normal(&self) -> Vector {
        match &self.0.surface {
            Surface::Plane { normal, .. } => *normal,
            _ => self
                .0
                .triangles
                .iter()
                .fold(Vector::zero(), |acc, [a, b, c]| acc + (*b - *a).cross(*c - *a))
                .normalized(),
        }
    }
}

// =============================================================================
// Shell
// =============================================================================

#[derive(Debug)]
struct ShellData {
    id: ShapeId,
    faces: Vec<Face>,
}

/// A set of faces.
#[derive(Debug, Clone)]
pub struct Shell(Rc<ShellData>);

impl Shell {
    /// New shell.
    pub fn new(faces: Vec<Face>) -> Self {
        Self(Rc::new(ShellData {
            id: alloc_shape_id(),
            faces,
        }))
    }

    /// Identity.
    pub fn id(&self) -> ShapeId {
        self.0.id
    }

    /// Faces of the shell.
    pub fn faces(&self) -> &[Face] {
        &self.0.faces
    }
}

// =============================================================================
// Solid and Compound: in-place updatable cells
// =============================================================================

#[derive(Debug)]
struct SolidCell {
    id: ShapeId,
    shells: RefCell<Vec<Shell>>,
}

/// A volume bounded by shells.
///
/// Clones share one cell: [`Solid::replace_geometry`] is visible through
/// every handle.
#[derive(Debug, Clone)]
pub struct Solid(Rc<SolidCell>);

impl Solid {
    /// New solid.
    pub fn new(shells: Vec<Shell>) -> Self {
        Self(Rc::new(SolidCell {
            id: alloc_shape_id(),
            shells: RefCell::new(shells),
        }))
    }

    /// Identity.
    pub fn id(&self) -> ShapeId {
        self.0.id
    }

    /// Current shells.
    pub fn shells(&self) -> Vec<Shell> {
        self.0.shells.borrow().clone()
    }

    /// All faces of all shells.
    pub fn faces(&self) -> Vec<Face> {
        self.0
            .shells
            .borrow()
            .iter()
            .flat_map(|s| s.faces().iter().cloned())
            .collect()
    }

    /// Overwrite this cell's geometry with that of `from`.
    ///
    /// Accepts a solid or a compound made only of solids.
    pub fn replace_geometry(&self, from: &Shape) -> Result<(), ShapeError> {
        if from.id() == self.id() {
            return Ok(());
        }
        let shells = match from {
            Shape::Solid(s) => s.shells(),
            Shape::Compound(c) => {
                let mut shells = Vec::new();
                for child in c.children() {
                    match child {
                        Shape::Solid(s) => shells.extend(s.shells()),
                        Shape::Compound(_) => {
                            for s in child.solids() {
                                if let Shape::Solid(s) = s {
                                    shells.extend(s.shells());
                                }
                            }
                        }
                        other => {
                            return Err(ShapeError::KindMismatch {
                                expected: ShapeKind::Solid,
                                found: other.kind(),
                            })
                        }
                    }
                }
                shells
            }
            other => {
                return Err(ShapeError::KindMismatch {
                    expected: ShapeKind::Solid,
                    found: other.kind(),
                })
            }
        };
        *self.0.shells.borrow_mut() = shells;
        Ok(())
    }
}

#[derive(Debug)]
struct CompoundCell {
    id: ShapeId,
    children: RefCell<Vec<Shape>>,
}

/// A collection of shapes.
///
/// Like [`Solid`], clones share one cell.
#[derive(Debug, Clone)]
pub struct Compound(Rc<CompoundCell>);

impl Compound {
    /// New compound.
    pub fn new(children: Vec<Shape>) -> Self {
        Self(Rc::new(CompoundCell {
            id: alloc_shape_id(),
            children: RefCell::new(children),
        }))
    }

    /// Identity.
    pub fn id(&self) -> ShapeId {
        self.0.id
    }

    /// Current children.
    pub fn children(&self) -> Vec<Shape> {
        self.0.children.borrow().clone()
    }

    /// Whether every child is a solid (and there is at least one).
    pub fn is_only_solids(&self) -> bool {
        let children = self.0.children.borrow();
        !children.is_empty() && children.iter().all(|c| matches!(c, Shape::Solid(_)))
    }

    /// Overwrite this cell's children with `from` (or with `from`'s children
    /// when it is itself a compound).
    pub fn replace_geometry(&self, from: &Shape) -> Result<(), ShapeError> {
        if from.id() == self.id() {
            return Ok(());
        }
        if from.compounds().iter().any(|c| c.id() == self.id()) {
            return Err(ShapeError::SelfReference(self.id()));
        }
        let children = match from {
            Shape::Compound(c) => c.children(),
            other => vec![other.clone()],
        };
        *self.0.children.borrow_mut() = children;
        Ok(())
    }
}

// =============================================================================
// Shape
// =============================================================================

/// Any topological entity.
#[derive(Debug, Clone)]
pub enum Shape {
    /// A vertex.
    Vertex(Vertex),
    /// An edge.
    Edge(Edge),
    /// A wire.
    Wire(Wire),
    /// A face.
    Face(Face),
    /// A shell.
    Shell(Shell),
    /// A solid.
    Solid(Solid),
    /// A compound.
    Compound(Compound),
}

macro_rules! impl_from_handle {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Shape {
                fn from(h: $variant) -> Self {
                    Shape::$variant(h)
                }
            }
        )*
    };
}

impl_from_handle!(Vertex, Edge, Wire, Face, Shell, Solid, Compound);

impl Shape {
    /// Identity of the entity.
    pub fn id(&self) -> ShapeId {
        match self {
            Shape::Vertex(h) => h.id(),
            Shape::Edge(h) => h.id(),
            Shape::Wire(h) => h.id(),
            Shape::Face(h) => h.id(),
            Shape::Shell(h) => h.id(),
            Shape::Solid(h) => h.id(),
            Shape::Compound(h) => h.id(),
        }
    }

    /// Whether both handles alias the same entity.
    pub fn same_as(&self, other: &Shape) -> bool {
        self.id() == other.id()
    }

    /// Topological kind.
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Vertex(_) => ShapeKind::Vertex,
            Shape::Edge(_) => ShapeKind::Edge,
            Shape::Wire(_) => ShapeKind::Wire,
            Shape::Face(_) => ShapeKind::Face,
            Shape::Shell(_) => ShapeKind::Shell,
            Shape::Solid(_) => ShapeKind::Solid,
            Shape::Compound(_) => ShapeKind::Compound,
        }
    }

    /// Geometry type tag.
    pub fn geom_type(&self) -> GeomType {
        match self {
            Shape::Vertex(_) => GeomType::Vertex,
            Shape::Edge(e) => e.curve().geom_type(),
            Shape::Wire(_) => GeomType::Wire,
            Shape::Face(f) => f.surface().geom_type(),
            Shape::Shell(_) => GeomType::Shell,
            Shape::Solid(_) => GeomType::Solid,
            Shape::Compound(_) => GeomType::Compound,
        }
    }

    /// Direct sub-shapes.
    pub fn children(&self) -> Vec<Shape> {
        match self {
            Shape::Vertex(_) => Vec::new(),
            Shape::Edge(e) => vec![e.start_vertex().clone().into(), e.end_vertex().clone().into()],
            Shape::Wire(w) => w.edges().iter().cloned().map(Shape::Edge).collect(),
            Shape::Face(f) => f.wires().into_iter().map(Shape::Wire).collect(),
            Shape::Shell(s) => s.faces().iter().cloned().map(Shape::Face).collect(),
            Shape::Solid(s) => s.shells().into_iter().map(Shape::Shell).collect(),
            Shape::Compound(c) => c.children(),
        }
    }

    /// Every distinct entity of `kind` reachable from this shape, in
    /// first-encounter order. A shape of the requested kind yields itself.
    pub fn collect(&self, kind: ShapeKind) -> Vec<Shape> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.collect_into(kind, &mut seen, &mut out);
        out
    }

    pub(crate) fn collect_into(&self, kind: ShapeKind, seen: &mut HashSet<ShapeId>, out: &mut Vec<Shape>) {
        if self.kind() == kind {
            if seen.insert(self.id()) {
                out.push(self.clone());
            }
            if kind != ShapeKind::Compound {
                return;
            }
        }
        for child in self.children() {
            child.collect_into(kind, seen, out);
        }
    }

    /// Distinct vertices.
    pub fn vertices(&self) -> Vec<Shape> {
        self.collect(ShapeKind::Vertex)
    }

    /// Distinct edges.
    pub fn edges(&self) -> Vec<Shape> {
        self.collect(ShapeKind::Edge)
    }

    /// Distinct wires.
    pub fn wires(&self) -> Vec<Shape> {
        self.collect(ShapeKind::Wire)
    }

    /// Distinct faces.
    pub fn faces(&self) -> Vec<Shape> {
        self.collect(ShapeKind::Face)
    }

    /// Distinct shells.
    pub fn shells(&self) -> Vec<Shape> {
        self.collect(ShapeKind::Shell)
    }

    /// Distinct solids.
    pub fn solids(&self) -> Vec<Shape> {
        self.collect(ShapeKind::Solid)
    }

    /// Distinct compounds, including this one.
    pub fn compounds(&self) -> Vec<Shape> {
        self.collect(ShapeKind::Compound)
    }

    /// Borrow as an edge.
    pub fn as_edge(&self) -> Option<&Edge> {
        match self {
            Shape::Edge(e) => Some(e),
            _ => None,
        }
    }

    /// Borrow as a wire.
    pub fn as_wire(&self) -> Option<&Wire> {
        match self {
            Shape::Wire(w) => Some(w),
            _ => None,
        }
    }

    /// Borrow as a face.
    pub fn as_face(&self) -> Option<&Face> {
        match self {
            Shape::Face(f) => Some(f),
            _ => None,
        }
    }

    /// Borrow as a solid.
    pub fn as_solid(&self) -> Option<&Solid> {
        match self {
            Shape::Solid(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as a compound.
    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Shape::Compound(c) => Some(c),
            _ => None,
        }
    }

    /// Whether this shape is a solid or contains at least one.
    pub fn has_solids(&self) -> bool {
        match self {
            Shape::Solid(_) => true,
            Shape::Compound(_) => !self.solids().is_empty(),
            _ => false,
        }
    }
}
