//! Binary space partitioning of tagged polygons.
//!
//! The classic csg.js scheme: each node splits space by the plane of its
//! first polygon, clipping removes the parts of one tree inside another.
//! Polygons carry the index of the face seed they came from so that the
//! result can be regrouped into faces.

use chisel_math::Vector;

use crate::build::newell;

#[derive(Debug, Clone, Copy)]
pub(crate) struct SplitPlane {
    normal: Vector,
    w: f64,
}

impl SplitPlane {
    fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Polygon {
    pub(crate) vertices: Vec<Vector>,
    pub(crate) tag: usize,
    plane: SplitPlane,
}

impl Polygon {
    /// `None` for degenerate polygons.
    pub(crate) fn new(vertices: Vec<Vector>, tag: usize) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let n = newell(&vertices);
        if n.length() < 1e-14 {
            return None;
        }
        let normal = n.normalized();
        let w = normal.dot(vertices[0]);
        Some(Self {
            vertices,
            tag,
            plane: SplitPlane { normal, w },
        })
    }

    fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }
}

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

/// Where a polygon ended up relative to a splitting plane.
enum Split {
    CoplanarFront(Polygon),
    CoplanarBack(Polygon),
    Front(Polygon),
    Back(Polygon),
    Spanning {
        front: Option<Polygon>,
        back: Option<Polygon>,
    },
}

fn split_polygon(plane: &SplitPlane, poly: Polygon, eps: f64) -> Split {
    let types: Vec<u8> = poly
        .vertices
        .iter()
        .map(|v| {
            let t = plane.normal.dot(*v) - plane.w;
            if t < -eps {
                BACK
            } else if t > eps {
                FRONT
            } else {
                COPLANAR
            }
        })
        .collect();
    let polygon_type = types.iter().fold(0u8, |acc, t| acc | t);

    match polygon_type {
        COPLANAR => {
            if plane.normal.dot(poly.plane.normal) > 0.0 {
                Split::CoplanarFront(poly)
            } else {
                Split::CoplanarBack(poly)
            }
        }
        FRONT => Split::Front(poly),
        BACK => Split::Back(poly),
        _ => {
            let n = poly.vertices.len();
            let mut f: Vec<Vector> = Vec::with_capacity(n + 1);
            let mut b: Vec<Vector> = Vec::with_capacity(n + 1);
            for i in 0..n {
                let j = (i + 1) % n;
                let (ti, tj) = (types[i], types[j]);
                let (vi, vj) = (poly.vertices[i], poly.vertices[j]);
                if ti != BACK {
                    f.push(vi);
                }
                if ti != FRONT {
                    b.push(vi);
                }
                if (ti | tj) == SPANNING {
                    let t = (plane.w - plane.normal.dot(vi)) / plane.normal.dot(vj - vi);
                    let v = vi.lerp(vj, t);
                    f.push(v);
                    b.push(v);
                }
            }
            let keep = |vs: Vec<Vector>| {
                (vs.len() >= 3).then(|| Polygon {
                    vertices: vs,
                    tag: poly.tag,
                    plane: poly.plane,
                })
            };
            Split::Spanning {
                front: keep(f),
                back: keep(b),
            }
        }
    }
}

/// A BSP tree node.
#[derive(Debug, Default)]
pub(crate) struct Node {
    plane: Option<SplitPlane>,
    front: Option<Box<Node>>,
    back: Option<Box<Node>>,
    polygons: Vec<Polygon>,
    eps: f64,
}

impl Node {
    pub(crate) fn new(polygons: Vec<Polygon>, eps: f64) -> Self {
        let mut node = Node {
            eps,
            ..Default::default()
        };
        node.build(polygons);
        node
    }

    /// Swap solid space and empty space.
    pub(crate) fn invert(&mut self) {
        for p in &mut self.polygons {
            p.flip();
        }
        if let Some(plane) = &mut self.plane {
            plane.flip();
        }
        if let Some(front) = &mut self.front {
            front.invert();
        }
        if let Some(back) = &mut self.back {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Remove the parts of `polygons` that are inside this tree.
    pub(crate) fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let plane = match &self.plane {
            Some(p) => *p,
            None => return polygons,
        };
        let mut front = Vec::new();
        let mut back = Vec::new();
        for poly in polygons {
            match split_polygon(&plane, poly, self.eps) {
                Split::CoplanarFront(p) | Split::Front(p) => front.push(p),
                Split::CoplanarBack(p) | Split::Back(p) => back.push(p),
                Split::Spanning { front: f, back: b } => {
                    front.extend(f);
                    back.extend(b);
                }
            }
        }
        let mut out = match &self.front {
            Some(node) => node.clip_polygons(front),
            None => front,
        };
        if let Some(node) = &self.back {
            out.extend(node.clip_polygons(back));
        }
        out
    }

    /// Remove the parts of this tree's polygons that are inside `other`.
    pub(crate) fn clip_to(&mut self, other: &Node) {
        let polygons = std::mem::take(&mut self.polygons);
        self.polygons = other.clip_polygons(polygons);
        if let Some(front) = &mut self.front {
            front.clip_to(other);
        }
        if let Some(back) = &mut self.back {
            back.clip_to(other);
        }
    }

    pub(crate) fn all_polygons(&self) -> Vec<Polygon> {
        let mut out = self.polygons.clone();
        if let Some(front) = &self.front {
            out.extend(front.all_polygons());
        }
        if let Some(back) = &self.back {
            out.extend(back.all_polygons());
        }
        out
    }

    pub(crate) fn build(&mut self, polygons: Vec<Polygon>) {
        if polygons.is_empty() {
            return;
        }
        let plane = *self.plane.get_or_insert(polygons[0].plane);
        let mut front = Vec::new();
        let mut back = Vec::new();
        for poly in polygons {
            match split_polygon(&plane, poly, self.eps) {
                Split::CoplanarFront(p) | Split::CoplanarBack(p) => self.polygons.push(p),
                Split::Front(p) => front.push(p),
                Split::Back(p) => back.push(p),
                Split::Spanning { front: f, back: b } => {
                    front.extend(f);
                    back.extend(b);
                }
            }
        }
        let eps = self.eps;
        if !front.is_empty() {
            self.front
                .get_or_insert_with(|| Box::new(Node { eps, ..Default::default() }))
                .build(front);
        }
        if !back.is_empty() {
            self.back
                .get_or_insert_with(|| Box::new(Node { eps, ..Default::default() }))
                .build(back);
        }
    }
}

/// `a ∪ b`.
pub(crate) fn union(a: Vec<Polygon>, b: Vec<Polygon>, eps: f64) -> Vec<Polygon> {
    let mut a = Node::new(a, eps);
    let mut b = Node::new(b, eps);
    a.clip_to(&b);
    b.clip_to(&a);
    b.invert();
    b.clip_to(&a);
    b.invert();
    a.build(b.all_polygons());
    a.all_polygons()
}

/// `a - b`.
pub(crate) fn subtract(a: Vec<Polygon>, b: Vec<Polygon>, eps: f64) -> Vec<Polygon> {
    let mut a = Node::new(a, eps);
    let mut b = Node::new(b, eps);
    a.invert();
    a.clip_to(&b);
    b.clip_to(&a);
    b.invert();
    b.clip_to(&a);
    b.invert();
    a.build(b.all_polygons());
    a.invert();
    a.all_polygons()
}

/// `a ∩ b`.
pub(crate) fn intersect(a: Vec<Polygon>, b: Vec<Polygon>, eps: f64) -> Vec<Polygon> {
    let mut a = Node::new(a, eps);
    let mut b = Node::new(b, eps);
    a.invert();
    b.clip_to(&a);
    b.invert();
    a.clip_to(&b);
    b.clip_to(&a);
    a.build(b.all_polygons());
    a.invert();
    a.all_polygons()
}
