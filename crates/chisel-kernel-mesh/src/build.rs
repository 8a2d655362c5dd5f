//! Recovering B-rep topology from tagged polygon soups.
//!
//! Every modeling operation in this kernel ends here: it hands over a list
//! of [`FaceSeed`]s (a surface plus the polygons lying on it, wound
//! counter-clockwise about the outward normal) and gets back shells with
//! shared vertices and edges.
//!
//! The pipeline:
//!
//! 1. weld all corners through a [`VertexPool`];
//! 2. split every polygon edge at welded points lying on it, so that
//!    neighbors agree on their shared boundary;
//! 3. split each seed into edge-connected components, one face each;
//! 4. chain each face's boundary into loops and cut the loops wherever the
//!    neighboring face changes or the boundary turns sharply;
//! 5. fit a line or circle through every run, sharing edges between the
//!    two faces that meet along it;
//! 6. group faces into shells by edge connectivity.

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::TAU;

use chisel_math::Vector;
use chisel_topo::{Curve, Edge, Face, KernelError, KernelResult, Shell, Surface, Vertex, Wire};

use crate::pool::VertexPool;

/// Boundary turns sharper than this start a new edge.
const CORNER_ANGLE: f64 = 25.0 * std::f64::consts::PI / 180.0;

/// Polygons lying on one surface.
#[derive(Debug, Clone)]
pub(crate) struct FaceSeed {
    pub(crate) surface: Surface,
    pub(crate) polygons: Vec<Vec<Vector>>,
}

impl FaceSeed {
    pub(crate) fn with_polygons(surface: Surface, polygons: Vec<Vec<Vector>>) -> Self {
        Self { surface, polygons }
    }

    fn reverse(&mut self) {
        for p in &mut self.polygons {
            p.reverse();
        }
        self.surface = self.surface.flipped();
    }
}

/// Signed volume enclosed by the seeds' polygons.
pub(crate) fn signed_volume(seeds: &[FaceSeed]) -> f64 {
    seeds
        .iter()
        .flat_map(|s| s.polygons.iter())
        .map(|poly| {
            (1..poly.len().saturating_sub(1))
                .map(|i| poly[0].dot(poly[i].cross(poly[i + 1])))
                .sum::<f64>()
        })
        .sum::<f64>()
        / 6.0
}

/// Flip every seed when the soup is inside-out.
pub(crate) fn orient_outward(seeds: &mut [FaceSeed]) {
    if signed_volume(seeds) < 0.0 {
        for s in seeds.iter_mut() {
            s.reverse();
        }
    }
}

/// Newell normal (area-weighted, unnormalized) of a closed polygon.
pub(crate) fn newell(points: &[Vector]) -> Vector {
    let n = points.len();
    let mut acc = Vector::zero();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        acc = acc
            + Vector::new(
                (a.y() - b.y()) * (a.z() + b.z()),
                (a.z() - b.z()) * (a.x() + b.x()),
                (a.x() - b.x()) * (a.y() + b.y()),
            );
    }
    acc * 0.5
}

/// Options controlling topology recovery.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BuildOptions {
    /// Welding distance.
    pub(crate) weld_tolerance: f64,
    /// Allowed radial deviation, relative to the radius, for a run to be
    /// recognized as a circular arc.
    pub(crate) circle_deviation: f64,
}

struct DisjointSet(Vec<usize>);

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self((0..n).collect())
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.0[root] != root {
            root = self.0[root];
        }
        let mut cur = i;
        while self.0[cur] != root {
            let next = self.0[cur];
            self.0[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.0[rb] = ra;
        }
    }
}

fn seg_key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// A face before its wires exist: polygons as welded indices plus the
/// boundary loops.
struct ProtoFace {
    surface: Surface,
    polygons: Vec<Vec<usize>>,
    loops: Vec<Vec<usize>>,
}

/// Build shells from seeds; faces that share no edge land in separate shells.
pub(crate) fn build_shells(seeds: Vec<FaceSeed>, opts: BuildOptions) -> KernelResult<Vec<Shell>> {
    let mut pool = VertexPool::new(opts.weld_tolerance);

    // Weld.
    let mut welded: Vec<(Surface, Vec<Vec<usize>>)> = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let mut polys = Vec::with_capacity(seed.polygons.len());
        for poly in &seed.polygons {
            let mut idx: Vec<usize> = Vec::with_capacity(poly.len());
            for p in poly {
                let i = pool.insert(*p);
                if idx.last() != Some(&i) {
                    idx.push(i);
                }
            }
            while idx.len() > 1 && idx.first() == idx.last() {
                idx.pop();
            }
            if idx.len() >= 3 {
                polys.push(idx);
            }
        }
        if !polys.is_empty() {
            welded.push((seed.surface, polys));
        }
    }
    if welded.is_empty() {
        return Err(KernelError::InvalidGeometry("no faces left after welding".into()));
    }

    // T-junctions.
    let mut splitter = SegmentSplitter::new(&pool);
    for (_, polys) in &mut welded {
        for poly in polys.iter_mut() {
            *poly = splitter.split_polygon(poly);
        }
    }

    // Components per seed.
    let mut protos: Vec<ProtoFace> = Vec::new();
    for (surface, polys) in welded {
        for component in connected_components(&polys) {
            let polygons: Vec<Vec<usize>> = component.into_iter().map(|i| polys[i].clone()).collect();
            let loops = boundary_loops(&polygons);
            if loops.is_empty() {
                continue;
            }
            protos.push(ProtoFace {
                surface: surface.clone(),
                polygons,
                loops,
            });
        }
    }

    // Which faces have each boundary segment.
    let mut owners: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
    for (fi, face) in protos.iter().enumerate() {
        for lp in &face.loops {
            for k in 0..lp.len() {
                let key = seg_key(lp[k], lp[(k + 1) % lp.len()]);
                let list = owners.entry(key).or_default();
                if !list.contains(&fi) {
                    list.push(fi);
                }
            }
        }
    }

    let mut edges = EdgeFactory::new(&pool, opts.circle_deviation);
    let mut faces: Vec<Face> = Vec::with_capacity(protos.len());
    for (fi, proto) in protos.iter().enumerate() {
        let neighbor = |a: usize, b: usize| {
            owners
                .get(&seg_key(a, b))
                .and_then(|list| list.iter().copied().find(|&f| f != fi))
        };
        let mut wires: Vec<(Wire, Vec<usize>)> = Vec::with_capacity(proto.loops.len());
        for lp in &proto.loops {
            let runs = split_loop(lp, pool.points(), &neighbor);
            let loop_edges: Vec<Edge> = runs.iter().map(|run| edges.edge_for(run)).collect();
            wires.push((Wire::new(loop_edges, true), lp.clone()));
        }
        let outer_ix = pick_outer(&proto.surface, &wires, pool.points());
        let (outer, _) = wires.remove(outer_ix);
        let inners = wires.into_iter().map(|(w, _)| w).collect();
        let triangles = fan_triangles(&proto.polygons, pool.points(), pool.tolerance());
        faces.push(Face::new(proto.surface.clone(), outer, inners, triangles));
    }

    // Lumps.
    let mut lumps = DisjointSet::new(faces.len());
    for list in owners.values() {
        for w in list.windows(2) {
            lumps.union(w[0], w[1]);
        }
    }
    let mut groups: BTreeMap<usize, Vec<Face>> = BTreeMap::new();
    for (fi, face) in faces.into_iter().enumerate() {
        let root = lumps.find(fi);
        groups.entry(root).or_default().push(face);
    }
    Ok(groups.into_values().map(Shell::new).collect())
}

// =============================================================================
// T-junction removal
// =============================================================================

struct SegmentSplitter<'a> {
    points: &'a [Vector],
    tol: f64,
    cache: HashMap<(usize, usize), Vec<usize>>,
}

impl<'a> SegmentSplitter<'a> {
    fn new(pool: &'a VertexPool) -> Self {
        Self {
            points: pool.points(),
            tol: pool.tolerance(),
            cache: HashMap::new(),
        }
    }

    /// Interior points of segment `a..b`, ordered from `a` to `b`.
    fn interior(&mut self, a: usize, b: usize) -> Vec<usize> {
        let key = seg_key(a, b);
        let points = self.points;
        let tol = self.tol;
        let forward = self.cache.entry(key).or_insert_with(|| {
            let (pa, pb) = (points[key.0], points[key.1]);
            let d = pb - pa;
            let len2 = d.dot(d);
            if len2 < tol * tol {
                return Vec::new();
            }
            let lo = pa.min(pb);
            let hi = pa.max(pb);
            let mut hits: Vec<(f64, usize)> = points
                .iter()
                .enumerate()
                .filter(|(i, p)| {
                    *i != key.0
                        && *i != key.1
                        && p.x() > lo.x() - tol
                        && p.x() < hi.x() + tol
                        && p.y() > lo.y() - tol
                        && p.y() < hi.y() + tol
                        && p.z() > lo.z() - tol
                        && p.z() < hi.z() + tol
                })
                .filter_map(|(i, p)| {
                    let t = (*p - pa).dot(d) / len2;
                    if t <= 0.0 || t >= 1.0 {
                        return None;
                    }
                    let foot = pa + d * t;
                    let off_line = foot.distance(*p) <= tol;
                    let off_ends = p.distance(pa) > tol && p.distance(pb) > tol;
                    (off_line && off_ends).then_some((t, i))
                })
                .collect();
            hits.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap_or(std::cmp::Ordering::Equal));
            hits.into_iter().map(|(_, i)| i).collect()
        });
        if a == key.0 {
            forward.clone()
        } else {
            forward.iter().rev().copied().collect()
        }
    }

    fn split_polygon(&mut self, poly: &[usize]) -> Vec<usize> {
        let n = poly.len();
        let mut out = Vec::with_capacity(n);
        for k in 0..n {
            let (a, b) = (poly[k], poly[(k + 1) % n]);
            out.push(a);
            out.extend(self.interior(a, b));
        }
        out
    }
}

// =============================================================================
// Faces and boundary loops
// =============================================================================

fn connected_components(polys: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut set = DisjointSet::new(polys.len());
    let mut first_owner: HashMap<(usize, usize), usize> = HashMap::new();
    for (pi, poly) in polys.iter().enumerate() {
        for k in 0..poly.len() {
            let key = seg_key(poly[k], poly[(k + 1) % poly.len()]);
            match first_owner.get(&key) {
                Some(&other) => set.union(other, pi),
                None => {
                    first_owner.insert(key, pi);
                }
            }
        }
    }
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for pi in 0..polys.len() {
        let root = set.find(pi);
        groups.entry(root).or_default().push(pi);
    }
    groups.into_values().collect()
}

/// Directed boundary segments chained into closed loops.
///
/// A segment is on the boundary when its traversals in one direction
/// outnumber those in the other.
fn boundary_loops(polys: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut net: HashMap<(usize, usize), i32> = HashMap::new();
    for poly in polys {
        for k in 0..poly.len() {
            let (a, b) = (poly[k], poly[(k + 1) % poly.len()]);
            if a == b {
                continue;
            }
            let sign = if a < b { 1 } else { -1 };
            *net.entry(seg_key(a, b)).or_insert(0) += sign;
        }
    }

    // Outgoing boundary segments per start vertex, in deterministic order.
    let mut outgoing: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    let mut remaining = 0usize;
    let mut ordered: Vec<(&(usize, usize), &i32)> = net.iter().collect();
    ordered.sort();
    for (&(lo, hi), &count) in ordered {
        let (from, to, times) = if count > 0 {
            (lo, hi, count)
        } else {
            (hi, lo, -count)
        };
        for _ in 0..times {
            outgoing.entry(from).or_default().push(to);
            remaining += 1;
        }
    }

    let mut loops = Vec::new();
    while remaining > 0 {
        let start = match outgoing.iter().find(|(_, v)| !v.is_empty()) {
            Some((&s, _)) => s,
            None => break,
        };
        let mut lp = vec![start];
        let mut cur = start;
        loop {
            let next = match outgoing.get_mut(&cur).and_then(|v| v.pop()) {
                Some(n) => n,
                None => break,
            };
            remaining -= 1;
            if next == start {
                break;
            }
            lp.push(next);
            cur = next;
        }
        if lp.len() >= 3 {
            loops.push(lp);
        }
    }
    loops
}

/// Cut a loop into runs of constant neighbor without sharp corners.
///
/// Each run lists the welded indices from its first to its last vertex; a
/// loop with no cut becomes a single closed run that repeats its first
/// vertex at the end and starts at its smallest index.
fn split_loop(lp: &[usize], points: &[Vector], neighbor: &impl Fn(usize, usize) -> Option<usize>) -> Vec<Vec<usize>> {
    let n = lp.len();
    let seg_neighbor: Vec<Option<usize>> = (0..n).map(|k| neighbor(lp[k], lp[(k + 1) % n])).collect();
    let breaks: Vec<usize> = (0..n)
        .filter(|&k| {
            let prev = (k + n - 1) % n;
            if seg_neighbor[prev] != seg_neighbor[k] {
                return true;
            }
            let d_in = points[lp[k]] - points[lp[prev]];
            let d_out = points[lp[(k + 1) % n]] - points[lp[k]];
            d_in.angle(d_out) > CORNER_ANGLE
        })
        .collect();

    if breaks.is_empty() {
        let start = (0..n).min_by_key(|&k| lp[k]).unwrap_or(0);
        let mut run: Vec<usize> = (0..=n).map(|i| lp[(start + i) % n]).collect();
        if run.len() < 2 {
            run = lp.to_vec();
        }
        return vec![run];
    }

    let mut runs = Vec::with_capacity(breaks.len());
    for (bi, &b) in breaks.iter().enumerate() {
        let end = breaks[(bi + 1) % breaks.len()];
        let mut run = vec![lp[b]];
        let mut k = b;
        loop {
            k = (k + 1) % n;
            run.push(lp[k]);
            if k == end {
                break;
            }
        }
        runs.push(run);
    }
    runs
}

/// Index of the outer boundary among a face's loops.
fn pick_outer(surface: &Surface, wires: &[(Wire, Vec<usize>)], points: &[Vector]) -> usize {
    let score = |lp: &Vec<usize>| -> f64 {
        let pts: Vec<Vector> = lp.iter().map(|&i| points[i]).collect();
        match surface {
            Surface::Plane { normal, .. } => newell(&pts).dot(*normal),
            _ => chisel_math::BoundBox::from_points(pts).diagonal_length(),
        }
    };
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (i, (_, lp)) in wires.iter().enumerate() {
        let s = score(lp);
        if s > best_score {
            best = i;
            best_score = s;
        }
    }
    best
}

fn fan_triangles(polys: &[Vec<usize>], points: &[Vector], tol: f64) -> Vec<[Vector; 3]> {
    let mut out = Vec::new();
    for poly in polys {
        let p0 = points[poly[0]];
        for k in 1..poly.len().saturating_sub(1) {
            let (p1, p2) = (points[poly[k]], points[poly[k + 1]]);
            if (p1 - p0).cross(p2 - p0).length() > tol * tol {
                out.push([p0, p1, p2]);
            }
        }
    }
    out
}

// =============================================================================
// Edges
// =============================================================================

struct EdgeFactory<'a> {
    points: &'a [Vector],
    circle_deviation: f64,
    line_tol: f64,
    vertices: HashMap<usize, Vertex>,
    edges: HashMap<Vec<usize>, Edge>,
}

impl<'a> EdgeFactory<'a> {
    fn new(pool: &'a VertexPool, circle_deviation: f64) -> Self {
        Self {
            points: pool.points(),
            circle_deviation,
            line_tol: pool.tolerance() * 10.0,
            vertices: HashMap::new(),
            edges: HashMap::new(),
        }
    }

    fn vertex(&mut self, i: usize) -> Vertex {
        let points = self.points;
        self.vertices
            .entry(i)
            .or_insert_with(|| Vertex::new(points[i]))
            .clone()
    }

    /// The shared edge along `run`, created on first request.
    fn edge_for(&mut self, run: &[usize]) -> Edge {
        let mut key = run.to_vec();
        key.sort_unstable();
        key.dedup();
        if let Some(e) = self.edges.get(&key) {
            return e.clone();
        }
        let first = run[0];
        let last = run[run.len() - 1];
        let start = self.vertex(first);
        let end = if first == last { start.clone() } else { self.vertex(last) };
        let pts: Vec<Vector> = run.iter().map(|&i| self.points[i]).collect();
        let edge = Edge::new(self.fit_curve(&pts, first == last), start, end);
        self.edges.insert(key, edge.clone());
        edge
    }

    fn fit_curve(&self, pts: &[Vector], closed: bool) -> Curve {
        let a = pts[0];
        let b = pts[pts.len() - 1];
        if !closed {
            let d = (b - a).normalized();
            let straight = pts.iter().all(|p| {
                let v = *p - a;
                (v - d * v.dot(d)).length() <= self.line_tol
            });
            if straight {
                return Curve::Line { start: a, end: b };
            }
        }
        if pts.len() >= 4 {
            if let Some(c) = self.fit_circle(pts, closed) {
                return c;
            }
        }
        Curve::Polyline { points: pts.to_vec() }
    }

    fn fit_circle(&self, pts: &[Vector], closed: bool) -> Option<Curve> {
        let n = pts.len();
        let (p1, p2, p3) = if closed {
            (pts[0], pts[n / 3], pts[2 * n / 3])
        } else {
            (pts[0], pts[n / 2], pts[n - 1])
        };
        let ab = p2 - p1;
        let ac = p3 - p1;
        let nrm = ab.cross(ac);
        let n2 = nrm.dot(nrm);
        if n2 < 1e-18 {
            return None;
        }
        let center = p1 + (nrm.cross(ab) * ac.dot(ac) + ac.cross(nrm) * ab.dot(ab)) * (1.0 / (2.0 * n2));
        let normal = nrm.normalized();
        let radius = center.distance(p1);
        let allowed = radius * self.circle_deviation + self.line_tol;
        let fits = pts.iter().all(|p| {
            let v = *p - center;
            (v.length() - radius).abs() <= allowed && v.dot(normal).abs() <= allowed
        });
        if !fits {
            return None;
        }
        let x_ref = (p1 - center).normalized();
        let y_ref = normal.cross(x_ref);
        let mut prev = 0.0_f64;
        for p in &pts[1..] {
            let v = *p - center;
            let raw = v.dot(y_ref).atan2(v.dot(x_ref));
            let mut a = raw;
            while a < prev - std::f64::consts::PI {
                a += TAU;
            }
            while a > prev + std::f64::consts::PI {
                a -= TAU;
            }
            prev = a;
        }
        let end_angle = if closed { TAU } else { prev };
        if end_angle <= 1e-9 || end_angle > TAU + 1e-9 {
            return None;
        }
        Some(Curve::Circle {
            center,
            normal,
            x_ref,
            radius,
            start_angle: 0.0,
            end_angle,
        })
    }
}
