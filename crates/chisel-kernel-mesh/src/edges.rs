//! Edge and wire constructors.

use std::f64::consts::TAU;

use chisel_math::Vector;
use chisel_topo::{Curve, Edge, KernelError, KernelResult, Vertex, Wire};

/// Endpoints closer than this are considered connected.
pub(crate) const CONNECT_TOL: f64 = 1e-7;

pub(crate) fn make_line(start: Vector, end: Vector) -> KernelResult<Edge> {
    if start.distance(end) < CONNECT_TOL {
        return Err(KernelError::InvalidGeometry(format!(
            "line from {start} to {end} has zero length"
        )));
    }
    Ok(Edge::from_curve(Curve::Line { start, end }))
}

/// Reference direction for angle zero on a circle about `normal`.
fn circle_x_ref(normal: Vector) -> Vector {
    let x = Vector::z_axis().cross(normal);
    if x.length() < 1e-9 {
        Vector::x_axis()
    } else {
        x.normalized()
    }
}

pub(crate) fn make_circle(
    radius: f64,
    center: Vector,
    normal: Vector,
    start_degrees: f64,
    end_degrees: f64,
) -> KernelResult<Edge> {
    if radius <= 0.0 || !radius.is_finite() {
        return Err(KernelError::InvalidGeometry(format!("circle radius must be positive, got {radius}")));
    }
    if normal.length() < 1e-12 {
        return Err(KernelError::InvalidGeometry("circle normal is zero".into()));
    }
    let normal = normal.normalized();
    let span = end_degrees - start_degrees;
    let (start_angle, end_angle) = if span.abs() >= 360.0 - 1e-9 || span.abs() < 1e-12 {
        (0.0, TAU)
    } else {
        let start = start_degrees.to_radians();
        let mut end = end_degrees.to_radians();
        while end <= start {
            end += TAU;
        }
        (start, end)
    };
    Ok(Edge::from_curve(Curve::Circle {
        center,
        normal,
        x_ref: circle_x_ref(normal),
        radius,
        start_angle,
        end_angle,
    }))
}

pub(crate) fn make_three_point_arc(p1: Vector, p2: Vector, p3: Vector) -> KernelResult<Edge> {
    let ab = p2 - p1;
    let ac = p3 - p1;
    let n = ab.cross(ac);
    let n2 = n.dot(n);
    if n2 < 1e-18 {
        return Err(KernelError::InvalidGeometry(format!(
            "arc points {p1}, {p2}, {p3} are collinear"
        )));
    }
    let center = p1 + (n.cross(ab) * ac.dot(ac) + ac.cross(n) * ab.dot(ab)) * (1.0 / (2.0 * n2));
    let normal = n.normalized();
    let radius = center.distance(p1);
    let x_ref = (p1 - center).normalized();
    let y_ref = normal.cross(x_ref);
    let d = p3 - center;
    let mut end_angle = d.dot(y_ref).atan2(d.dot(x_ref));
    if end_angle <= 0.0 {
        end_angle += TAU;
    }
    Ok(Edge::new(
        Curve::Circle {
            center,
            normal,
            x_ref,
            radius,
            start_angle: 0.0,
            end_angle,
        },
        Vertex::new(p1),
        Vertex::new(p3),
    ))
}

pub(crate) fn make_spline(points: &[Vector]) -> KernelResult<Edge> {
    if points.len() < 2 {
        return Err(KernelError::InvalidGeometry(format!(
            "spline needs at least 2 points, got {}",
            points.len()
        )));
    }
    if points.windows(2).any(|w| w[0].distance(w[1]) < CONNECT_TOL) {
        return Err(KernelError::InvalidGeometry("spline has coincident consecutive points".into()));
    }
    Ok(Edge::from_curve(Curve::Spline {
        points: points.to_vec(),
    }))
}

pub(crate) fn make_polygon(points: &[Vector]) -> KernelResult<Wire> {
    let mut pts: Vec<Vector> = Vec::with_capacity(points.len());
    for p in points {
        if pts.last().map_or(true, |q: &Vector| q.distance(*p) >= CONNECT_TOL) {
            pts.push(*p);
        }
    }
    if pts.len() < 2 {
        return Err(KernelError::InvalidGeometry("polygon needs at least 2 distinct points".into()));
    }
    let closed = pts.len() > 3 && pts[0].distance(pts[pts.len() - 1]) < CONNECT_TOL;
    if closed {
        pts.pop();
    }
    let verts: Vec<Vertex> = pts.iter().map(|p| Vertex::new(*p)).collect();
    let n = verts.len();
    let count = if closed { n } else { n - 1 };
    let edges = (0..count)
        .map(|i| {
            let a = &verts[i];
            let b = &verts[(i + 1) % n];
            Edge::new(
                Curve::Line {
                    start: a.point(),
                    end: b.point(),
                },
                a.clone(),
                b.clone(),
            )
        })
        .collect();
    Ok(Wire::new(edges, closed))
}

/// Chain edges into one wire, orienting each edge to follow its
/// predecessor and sharing a vertex at every junction.
pub(crate) fn assemble_edges(edges: &[Edge]) -> KernelResult<Wire> {
    let first = edges
        .first()
        .ok_or_else(|| KernelError::InvalidGeometry("cannot assemble a wire from no edges".into()))?;

    // Orient the first edge so that it leads into the second.
    let mut curves: Vec<Curve> = Vec::with_capacity(edges.len());
    let first_curve = match edges.get(1) {
        Some(next) => {
            let reach = |p: Vector| p.distance(next.start_point()).min(p.distance(next.end_point()));
            if reach(first.start_point()) < reach(first.end_point()) {
                first.curve().reversed()
            } else {
                first.curve().clone()
            }
        }
        None => first.curve().clone(),
    };
    let mut cursor = first_curve.end();
    curves.push(first_curve);

    for edge in &edges[1..] {
        let curve = if edge.start_point().distance(cursor) < CONNECT_TOL {
            edge.curve().clone()
        } else if edge.end_point().distance(cursor) < CONNECT_TOL {
            edge.curve().reversed()
        } else {
            return Err(KernelError::InvalidGeometry(format!(
                "edges do not connect: gap at {cursor}"
            )));
        };
        cursor = curve.end();
        curves.push(curve);
    }

    let origin = curves[0].start();
    let closed = cursor.distance(origin) < CONNECT_TOL;
    let first_vertex = Vertex::new(origin);
    let mut prev = first_vertex.clone();
    let last = curves.len() - 1;
    let mut out = Vec::with_capacity(curves.len());
    for (i, (curve, src)) in curves.into_iter().zip(edges).enumerate() {
        let end = if i == last && closed {
            first_vertex.clone()
        } else {
            Vertex::new(curve.end())
        };
        let edge = Edge::new(curve, prev.clone(), end.clone());
        edge.set_for_construction(src.for_construction());
        out.push(edge);
        prev = end;
    }
    Ok(Wire::new(out, closed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chisel_topo::{GeomType, Shape};

    #[test]
    fn test_three_point_arc_half_circle() {
        let e = make_three_point_arc(
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(0.0, 1.0, 0.0),
            Vector::new(-1.0, 0.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(e.length(), std::f64::consts::PI, epsilon = 1e-9);
        assert!(e.curve().point_at(0.5).distance(Vector::new(0.0, 1.0, 0.0)) < 1e-9);
        assert!(e.end_point().distance(Vector::new(-1.0, 0.0, 0.0)) < 1e-9);
    }

    #[test]
    fn test_three_point_arc_rejects_collinear() {
        let err = make_three_point_arc(Vector::zero(), Vector::x_axis(), Vector::new(2.0, 0.0, 0.0));
        assert!(matches!(err, Err(KernelError::InvalidGeometry(_))));
    }

    #[test]
    fn test_full_circle_is_closed() {
        let e = make_circle(2.0, Vector::zero(), Vector::z_axis(), 0.0, 360.0).unwrap();
        assert!(e.is_closed());
        assert_eq!(Shape::from(e.clone()).geom_type(), GeomType::Circle);
        assert_relative_eq!(e.length(), 4.0 * std::f64::consts::PI, epsilon = 1e-9);
    }

    #[test]
    fn test_closed_polygon() {
        let w = make_polygon(&[
            Vector::new(0.0, 0.0, 0.0),
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(1.0, 1.0, 0.0),
            Vector::new(0.0, 0.0, 0.0),
        ])
        .unwrap();
        assert!(w.is_closed());
        assert_eq!(w.edges().len(), 3);
        assert_eq!(Shape::from(w).vertices().len(), 3);
    }

    #[test]
    fn test_assemble_flips_and_closes() {
        let a = make_line(Vector::new(0.0, 0.0, 0.0), Vector::new(1.0, 0.0, 0.0)).unwrap();
        let b = make_line(Vector::new(1.0, 1.0, 0.0), Vector::new(1.0, 0.0, 0.0)).unwrap();
        let c = make_line(Vector::new(1.0, 1.0, 0.0), Vector::new(0.0, 0.0, 0.0)).unwrap();
        let w = assemble_edges(&[a, b, c]).unwrap();
        assert!(w.is_closed());
        assert_eq!(Shape::from(w.clone()).vertices().len(), 3);
        assert!(w.edges()[1].end_point().distance(Vector::new(1.0, 1.0, 0.0)) < 1e-12);
    }

    #[test]
    fn test_assemble_rejects_gaps() {
        let a = make_line(Vector::new(0.0, 0.0, 0.0), Vector::new(1.0, 0.0, 0.0)).unwrap();
        let b = make_line(Vector::new(2.0, 0.0, 0.0), Vector::new(3.0, 0.0, 0.0)).unwrap();
        assert!(assemble_edges(&[a, b]).is_err());
    }
}
