//! 2D sketching on a node's plane: workplanes, points, edges, wires and
//! closed profiles.
//!
//! Coordinates passed to these calls are plane-local; everything placed on
//! a stack is in world coordinates.

use std::f64::consts::TAU;

use chisel_math::{BoundBox, Plane, Vector};
use chisel_topo::{Edge, Face, Kernel, PlaneExt, Shape};
use tracing::debug;

use crate::error::{ChiselError, ChiselResult};
use crate::item::StackItem;
use crate::Workplane;

/// Which center a workplane is placed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CenterOption {
    /// Area-weighted center of the selected faces.
    #[default]
    CenterOfMass,
    /// Center of the selection's bounding box.
    CenterOfBoundBox,
}

fn planar_face(item: &StackItem) -> Option<&Face> {
    match item.as_shape() {
        Some(Shape::Face(f)) if f.is_planar() => Some(f),
        _ => None,
    }
}

// =============================================================================
// Workplanes
// =============================================================================

impl Workplane {
    /// Workplane on the selected face (or at the selected point), `offset`
    /// along its normal; the normal is reversed when `invert` is set.
    pub fn workplane(&self, offset: f64, invert: bool) -> ChiselResult<Workplane> {
        self.workplane_centered(offset, invert, CenterOption::CenterOfMass)
    }

    /// [`Workplane::workplane`] with a choice of center.
    ///
    /// Several selected objects must all be coplanar planar faces. A single
    /// object that is not a face keeps this node's orientation and only moves
    /// the origin to its center.
    pub fn workplane_centered(&self, offset: f64, invert: bool, center: CenterOption) -> ChiselResult<Workplane> {
        let objects = self.vals();
        let plane = self.plane();
        let tol = self.read_context(|ctx| ctx.tolerance());
        let first = objects.first().ok_or(ChiselError::EmptySelection)?;

        let (origin, normal, x_dir) = if objects.len() == 1 && planar_face(first).is_none() {
            if matches!(first.as_shape(), Some(Shape::Face(_))) {
                return Err(ChiselError::InvalidArgument("workplane needs a planar face".into()));
            }
            let origin = match (center, first.as_shape()) {
                (CenterOption::CenterOfBoundBox, Some(s)) => s.bounding_box().center(),
                _ => first.center(),
            };
            (origin, plane.z_dir(), Some(plane.x_dir()))
        } else {
            let faces: Vec<&Face> = objects.iter().filter_map(planar_face).collect();
            if faces.len() != objects.len() {
                return Err(ChiselError::InvalidArgument(
                    "a workplane on several objects needs planar faces only".into(),
                ));
            }
            let planes = faces
                .iter()
                .map(|f| {
                    let n = f.normal();
                    Plane::new(f.center(), n.any_perpendicular(), n)
                })
                .collect::<Result<Vec<_>, _>>()?;
            let normal = planes[0].z_dir();
            if !planes.iter().all(|p| planes[0].is_coplanar(p, &tol)) {
                return Err(ChiselError::InvalidArgument("selected faces are not coplanar".into()));
            }
            let origin = match center {
                CenterOption::CenterOfMass => {
                    let area: f64 = faces.iter().map(|f| f.area()).sum();
                    faces
                        .iter()
                        .fold(Vector::zero(), |acc, f| acc + f.center() * (f.area() / area))
                }
                CenterOption::CenterOfBoundBox => faces
                    .iter()
                    .fold(BoundBox::empty(), |bb, f| bb.union(&Shape::Face((*f).clone()).bounding_box()))
                    .center(),
            };
            (origin, normal, None)
        };

        let normal = if invert { -normal } else { normal };
        let x_dir = x_dir.unwrap_or_else(|| {
            let x = Vector::z_axis().cross(normal);
            if tol.is_zero(x.length()) {
                Vector::x_axis()
            } else {
                x.normalized()
            }
        });
        let origin = origin + normal * offset;
        let new_plane = Plane::new(origin, x_dir, normal)?;
        debug!(%origin, %normal, "workplane");
        Ok(self.derive(vec![StackItem::Vector(origin)], new_plane))
    }

    /// Workplane rotated by `rotate` degrees (about global X, then Y, then Z)
    /// with its origin at the local point `offset`.
    pub fn transformed(&self, rotate: impl Into<Vector>, offset: impl Into<Vector>) -> ChiselResult<Workplane> {
        let plane = self.plane();
        let origin = plane.to_world_coords(offset);
        let rotated = plane.rotated(rotate)?.with_origin(origin)?;
        Ok(self.derive(vec![StackItem::Vector(origin)], rotated))
    }

    /// Move the plane origin to the local point `(x, y)`.
    pub fn center(&self, x: f64, y: f64) -> ChiselResult<Workplane> {
        self.set_origin_2d(x, y)
    }

    /// Move the plane origin to the local point `(x, y)`.
    pub fn set_origin_2d(&self, x: f64, y: f64) -> ChiselResult<Workplane> {
        let plane = self.plane().set_origin_2d(x, y)?;
        Ok(self.derive(vec![StackItem::Vector(plane.origin())], plane))
    }
}

// =============================================================================
// Points
// =============================================================================

impl Workplane {
    /// Child holding the given local points, mapped to world coordinates.
    pub fn push_points<P, I>(&self, points: I) -> Workplane
    where
        P: Into<Vector>,
        I: IntoIterator<Item = P>,
    {
        let plane = self.plane();
        let items = points
            .into_iter()
            .map(|p| StackItem::Vector(plane.to_world_coords(p)))
            .collect();
        self.new_object(items)
    }

    /// Rectangular grid of `x_count` by `y_count` points, centered on the
    /// plane origin when `center` is set.
    pub fn rarray(
        &self,
        x_spacing: f64,
        y_spacing: f64,
        x_count: usize,
        y_count: usize,
        center: bool,
    ) -> ChiselResult<Workplane> {
        if x_count < 1 || y_count < 1 {
            return Err(ChiselError::InvalidArgument("rarray needs at least one point per axis".into()));
        }
        let (dx, dy) = if center {
            (
                (x_count - 1) as f64 * x_spacing / 2.0,
                (y_count - 1) as f64 * y_spacing / 2.0,
            )
        } else {
            (0.0, 0.0)
        };
        let points = (0..x_count).flat_map(|i| {
            (0..y_count).map(move |j| (i as f64 * x_spacing - dx, j as f64 * y_spacing - dy))
        });
        Ok(self.push_points(points))
    }

    /// `count` points on a circle of `radius`, starting at `start_angle`
    /// and spread over `angle` degrees. A full turn does not repeat the
    /// first point.
    pub fn polar_array(&self, radius: f64, start_angle: f64, angle: f64, count: usize) -> ChiselResult<Workplane> {
        if count < 1 {
            return Err(ChiselError::InvalidArgument("polar_array needs at least one point".into()));
        }
        let step = if (angle.abs() - 360.0).abs() < 1e-9 {
            angle / count as f64
        } else if count > 1 {
            angle / (count - 1) as f64
        } else {
            0.0
        };
        let points = (0..count).map(|i| {
            let a = (start_angle + step * i as f64).to_radians();
            (radius * a.cos(), radius * a.sin())
        });
        Ok(self.push_points(points))
    }

    /// Child holding one point at the local position `(x, y)`.
    pub fn move_to(&self, x: f64, y: f64) -> Workplane {
        self.push_points([(x, y)])
    }

    /// Child holding one point offset from the current point.
    pub fn move_by(&self, dx: f64, dy: f64) -> ChiselResult<Workplane> {
        let p = self.find_from_point(true)?;
        Ok(self.move_to(p.x() + dx, p.y() + dy))
    }
}

// =============================================================================
// Edges and wires
// =============================================================================

impl Workplane {
    fn push_edges(&self, edges: Vec<Edge>) -> Workplane {
        self.update_context(|ctx| {
            for e in &edges {
                if !e.for_construction() {
                    ctx.add_pending_edge(e.clone());
                }
            }
        });
        self.new_object(edges.into_iter().map(StackItem::from).collect())
    }

    /// Straight edge from the current point to the local point `(x, y)`.
    pub fn line_to(&self, x: f64, y: f64) -> ChiselResult<Workplane> {
        let start = self.find_from_point(false)?;
        let end = self.plane().to_world_coords((x, y));
        let edge = self.kernel().make_line(start, end)?;
        Ok(self.push_edges(vec![edge]))
    }

    /// Straight edge by a local offset from the current point.
    pub fn line(&self, dx: f64, dy: f64) -> ChiselResult<Workplane> {
        let p = self.find_from_point(true)?;
        self.line_to(p.x() + dx, p.y() + dy)
    }

    /// Horizontal edge of length `distance`.
    pub fn h_line(&self, distance: f64) -> ChiselResult<Workplane> {
        self.line(distance, 0.0)
    }

    /// Vertical edge of length `distance`.
    pub fn v_line(&self, distance: f64) -> ChiselResult<Workplane> {
        self.line(0.0, distance)
    }

    /// Horizontal edge to local x coordinate `x`.
    pub fn h_line_to(&self, x: f64) -> ChiselResult<Workplane> {
        let p = self.find_from_point(true)?;
        self.line_to(x, p.y())
    }

    /// Vertical edge to local y coordinate `y`.
    pub fn v_line_to(&self, y: f64) -> ChiselResult<Workplane> {
        let p = self.find_from_point(true)?;
        self.line_to(p.x(), y)
    }

    /// Edge of length `distance` at `angle` degrees from the local x axis.
    pub fn polar_line(&self, distance: f64, angle: f64) -> ChiselResult<Workplane> {
        let a = angle.to_radians();
        self.line(distance * a.cos(), distance * a.sin())
    }

    /// Arc from the current point through `through` to `end` (both local).
    pub fn three_point_arc(&self, through: (f64, f64), end: (f64, f64)) -> ChiselResult<Workplane> {
        let plane = self.plane();
        let start = self.find_from_point(false)?;
        let edge = self
            .kernel()
            .make_three_point_arc(start, plane.to_world_coords(through), plane.to_world_coords(end))?;
        Ok(self.push_edges(vec![edge]))
    }

    /// Spline through the given local points, starting at the current point
    /// when `include_current` is set.
    pub fn spline(&self, points: &[(f64, f64)], include_current: bool) -> ChiselResult<Workplane> {
        let pts = self.sketch_points(points, include_current)?;
        let edge = self.kernel().make_spline(&pts)?;
        Ok(self.push_edges(vec![edge]))
    }

    /// Chain of straight edges through the given local points, starting at
    /// the current point when `include_current` is set.
    pub fn polyline(&self, points: &[(f64, f64)], include_current: bool) -> ChiselResult<Workplane> {
        let pts = self.sketch_points(points, include_current)?;
        if pts.len() < 2 {
            return Err(ChiselError::InvalidArgument("polyline needs at least two points".into()));
        }
        let edges = pts
            .windows(2)
            .map(|w| self.kernel().make_line(w[0], w[1]))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.push_edges(edges))
    }

    fn sketch_points(&self, points: &[(f64, f64)], include_current: bool) -> ChiselResult<Vec<Vector>> {
        let plane = self.plane();
        let mut pts = Vec::with_capacity(points.len() + 1);
        if include_current {
            pts.push(self.find_from_point(false)?);
        }
        pts.extend(points.iter().map(|p| plane.to_world_coords(*p)));
        Ok(pts)
    }

    /// Close the profile back to its first point, then assemble the wire.
    pub fn close(&self) -> ChiselResult<Workplane> {
        let (first, tol) = self.read_context(|ctx| (ctx.first_point(), ctx.tolerance()));
        let first = first.ok_or(ChiselError::EmptyContext("no profile to close"))?;
        let end = self.find_from_point(false)?;
        if tol.points_equal(end, first) {
            debug!("profile already closed");
            return self.wire();
        }
        let local = self.plane().to_local_coords(first);
        self.line_to(local.x(), local.y())?.wire()
    }

    /// Assemble all pending edges into one wire.
    ///
    /// The result node holds the non-edge entries of this stack followed by
    /// the wire.
    pub fn wire(&self) -> ChiselResult<Workplane> {
        let edges = self.read_context(|ctx| ctx.pending_edges().to_vec());
        if edges.is_empty() {
            return Err(ChiselError::EmptyContext("no pending edges to assemble"));
        }
        let wire = self.kernel().assemble_edges(&edges)?;
        self.update_context(|ctx| {
            ctx.clear_pending_edges();
            ctx.add_pending_wire(wire.clone());
        });
        debug!(edges = edges.len(), closed = wire.is_closed(), "assembled wire");
        let mut items: Vec<StackItem> = self
            .vals()
            .into_iter()
            .filter(|i| !matches!(i, StackItem::Shape(Shape::Edge(_))))
            .collect();
        items.push(wire.into());
        Ok(self.new_object(items))
    }

    /// Mark the edges and wires on the stack as construction geometry: they
    /// keep positioning later calls but leave the pending lists.
    pub fn for_construction(&self) -> Workplane {
        let mut ids = Vec::new();
        for item in self.vals() {
            match item {
                StackItem::Shape(Shape::Edge(e)) => {
                    e.set_for_construction(true);
                    ids.push(e.id());
                }
                StackItem::Shape(Shape::Wire(w)) => {
                    w.set_for_construction(true);
                    ids.push(w.id());
                }
                _ => {}
            }
        }
        self.update_context(|ctx| ctx.forget(&ids));
        self.new_object(self.vals())
    }
}

// =============================================================================
// Iteration
// =============================================================================

impl Workplane {
    /// Run `f` over `items`, registering resulting wires as pending once
    /// every call succeeded.
    fn apply<F>(&self, items: Vec<StackItem>, mut f: F, use_local: bool) -> ChiselResult<Vec<StackItem>>
    where
        F: FnMut(&dyn Kernel, StackItem) -> ChiselResult<Option<StackItem>>,
    {
        let plane = self.plane();
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let input = if use_local { to_local(&plane, item) } else { item };
            if let Some(result) = f(self.kernel(), input)? {
                out.push(if use_local { to_world(&plane, result) } else { result });
            }
        }
        self.update_context(|ctx| {
            for item in &out {
                if let StackItem::Shape(Shape::Wire(w)) = item {
                    if !w.for_construction() {
                        ctx.add_pending_wire(w.clone());
                    }
                }
            }
        });
        Ok(out)
    }

    /// Centers of the stack entries, or the plane origin on an empty stack.
    pub(crate) fn stack_points(&self) -> Vec<Vector> {
        let points: Vec<Vector> = self.vals().iter().map(StackItem::center).collect();
        if points.is_empty() {
            vec![self.plane().origin()]
        } else {
            points
        }
    }

    pub(crate) fn apply_points<F>(&self, mut f: F, use_local: bool) -> ChiselResult<Vec<StackItem>>
    where
        F: FnMut(&dyn Kernel, Vector) -> ChiselResult<Option<StackItem>>,
    {
        let points = self.stack_points().into_iter().map(StackItem::Vector).collect();
        self.apply(
            points,
            |kernel, item| match item {
                StackItem::Vector(p) => f(kernel, p),
                StackItem::Shape(s) => f(kernel, s.center()),
            },
            use_local,
        )
    }

    /// Apply `f` to every stack entry and keep the results it returns.
    ///
    /// With `use_local`, `f` sees entries in plane-local coordinates and its
    /// results are mapped back. Resulting wires that are not construction
    /// geometry become pending.
    pub fn each<F>(&self, f: F, use_local: bool) -> ChiselResult<Workplane>
    where
        F: FnMut(&dyn Kernel, StackItem) -> ChiselResult<Option<StackItem>>,
    {
        Ok(self.new_object(self.apply(self.vals(), f, use_local)?))
    }

    /// Like [`Workplane::each`], with every entry first reduced to its
    /// center. An empty stack yields the plane origin.
    pub fn eachpoint<F>(&self, f: F, use_local: bool) -> ChiselResult<Workplane>
    where
        F: FnMut(&dyn Kernel, Vector) -> ChiselResult<Option<StackItem>>,
    {
        Ok(self.new_object(self.apply_points(f, use_local)?))
    }

    /// Rectangle of `xlen` by `ylen` at every stack point, centered on it.
    pub fn rect(&self, xlen: f64, ylen: f64) -> ChiselResult<Workplane> {
        self.rect_with(xlen, ylen, true)
    }

    /// Rectangle at every stack point, with the point at its center or at
    /// its minimum corner.
    pub fn rect_with(&self, xlen: f64, ylen: f64, centered: bool) -> ChiselResult<Workplane> {
        if xlen <= 0.0 || ylen <= 0.0 {
            return Err(ChiselError::InvalidArgument(format!("rect size must be positive, got {xlen} x {ylen}")));
        }
        let (ox, oy) = if centered { (xlen / 2.0, ylen / 2.0) } else { (0.0, 0.0) };
        self.eachpoint(
            |kernel, p| {
                let (x0, y0) = (p.x() - ox, p.y() - oy);
                let corners = [
                    Vector::new(x0, y0, p.z()),
                    Vector::new(x0 + xlen, y0, p.z()),
                    Vector::new(x0 + xlen, y0 + ylen, p.z()),
                    Vector::new(x0, y0 + ylen, p.z()),
                    Vector::new(x0, y0, p.z()),
                ];
                Ok(Some(kernel.make_polygon(&corners)?.into()))
            },
            true,
        )
    }

    /// Circle of `radius` at every stack point.
    pub fn circle(&self, radius: f64) -> ChiselResult<Workplane> {
        if radius <= 0.0 {
            return Err(ChiselError::InvalidArgument(format!("circle radius must be positive, got {radius}")));
        }
        self.eachpoint(
            |kernel, p| {
                let edge = kernel.make_circle(radius, p, Vector::z_axis(), 0.0, 360.0)?;
                Ok(Some(kernel.assemble_edges(&[edge])?.into()))
            },
            true,
        )
    }

    /// Regular polygon with `n_sides` inscribed in a circle of `diameter`
    /// at every stack point; the first vertex lies on the local x axis.
    pub fn polygon(&self, n_sides: usize, diameter: f64) -> ChiselResult<Workplane> {
        if n_sides < 3 {
            return Err(ChiselError::InvalidArgument(format!("a polygon needs 3 sides, got {n_sides}")));
        }
        let r = diameter / 2.0;
        self.eachpoint(
            |kernel, p| {
                let pts: Vec<Vector> = (0..=n_sides)
                    .map(|i| {
                        let a = TAU * (i % n_sides) as f64 / n_sides as f64;
                        p + Vector::new(r * a.cos(), r * a.sin(), 0.0)
                    })
                    .collect();
                Ok(Some(kernel.make_polygon(&pts)?.into()))
            },
            true,
        )
    }
}

fn to_local(plane: &Plane, item: StackItem) -> StackItem {
    match item {
        StackItem::Vector(v) => StackItem::Vector(plane.to_local_coords(v)),
        StackItem::Shape(s) => StackItem::Shape(plane.shape_to_local(&s)),
    }
}

fn to_world(plane: &Plane, item: StackItem) -> StackItem {
    match item {
        StackItem::Vector(v) => StackItem::Vector(plane.to_world_coords(v)),
        StackItem::Shape(s) => StackItem::Shape(plane.shape_to_world(&s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chisel_select::All;
    use chisel_topo::Wire;

    fn as_wire(item: &StackItem) -> Option<&Wire> {
        item.as_shape().and_then(Shape::as_wire)
    }

    fn close_to(a: Vector, b: Vector) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn test_workplane_on_top_face() {
        let part = Workplane::new("XY").unwrap().box_(2.0, 2.0, 1.0).unwrap();
        let wp = part.faces(">Z").unwrap().workplane(0.0, false).unwrap();
        let plane = wp.plane();
        assert!(close_to(plane.origin(), Vector::new(0.0, 0.0, 0.5)));
        assert!(close_to(plane.z_dir(), Vector::z_axis()));
        assert!(close_to(plane.x_dir(), Vector::x_axis()));
        assert_eq!(wp.size(), 1);
        assert!(close_to(wp.val().unwrap().center(), plane.origin()));
    }

    #[test]
    fn test_workplane_offset_and_invert() {
        let part = Workplane::new("XY").unwrap().box_(2.0, 2.0, 1.0).unwrap();
        let wp = part.faces(">Z").unwrap().workplane(0.5, true).unwrap();
        assert!(close_to(wp.plane().z_dir(), -Vector::z_axis()));
        assert!(close_to(wp.plane().origin(), Vector::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_workplane_on_side_face() {
        let part = Workplane::new("XY").unwrap().box_(2.0, 2.0, 2.0).unwrap();
        let wp = part.faces(">X").unwrap().workplane(0.0, false).unwrap();
        let plane = wp.plane();
        assert!(close_to(plane.z_dir(), Vector::x_axis()));
        // Z × X = Y
        assert!(close_to(plane.x_dir(), Vector::y_axis()));
        assert!(close_to(plane.origin(), Vector::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_workplane_on_point_keeps_orientation() {
        let root = Workplane::new("XZ").unwrap();
        let wp = root.push_points([(1.0, 2.0)]).workplane(0.0, false).unwrap();
        assert_eq!(wp.plane().z_dir(), root.plane().z_dir());
        assert!(close_to(wp.plane().origin(), Vector::new(1.0, 0.0, 2.0)));
    }

    #[test]
    fn test_workplane_rejects_non_coplanar_faces() {
        let part = Workplane::new("XY").unwrap().box_(1.0, 1.0, 1.0).unwrap();
        let err = part.faces("|Z").unwrap().workplane(0.0, false).unwrap_err();
        assert!(matches!(err, ChiselError::InvalidArgument(_)));
        let empty = Workplane::new("XY").unwrap();
        assert_eq!(empty.workplane(0.0, false).unwrap_err(), ChiselError::EmptySelection);
    }

    #[test]
    fn test_workplane_rejects_parallel_faces_at_different_heights() {
        let part = Workplane::new("XY")
            .unwrap()
            .box_(1.0, 1.0, 1.0)
            .unwrap()
            .center(3.0, 0.0)
            .unwrap()
            .box_(1.0, 1.0, 2.0)
            .unwrap();
        let tops = part.faces("+Z").unwrap();
        assert_eq!(tops.size(), 2);
        let err = tops.workplane(0.0, false).unwrap_err();
        assert!(matches!(err, ChiselError::InvalidArgument(_)));
    }

    #[test]
    fn test_workplane_on_coplanar_faces() {
        let part = Workplane::new("XY")
            .unwrap()
            .push_points([(-2.0, 0.0), (2.0, 0.0)])
            .box_(1.0, 1.0, 1.0)
            .unwrap();
        let wp = part.faces(">Z or (%PLANE and +Z)").unwrap();
        assert_eq!(wp.size(), 2);
        let plane = wp.workplane(0.0, false).unwrap().plane();
        assert!(close_to(plane.origin(), Vector::new(0.0, 0.0, 0.5)));
    }

    #[test]
    fn test_transformed_and_center() {
        let root = Workplane::new("XY").unwrap();
        let wp = root.transformed((90.0, 0.0, 0.0), (1.0, 2.0, 3.0)).unwrap();
        assert!(close_to(wp.plane().origin(), Vector::new(1.0, 2.0, 3.0)));
        assert!(close_to(wp.plane().z_dir(), Vector::new(0.0, -1.0, 0.0)));
        let moved = root.center(3.0, 4.0).unwrap();
        assert!(close_to(moved.plane().origin(), Vector::new(3.0, 4.0, 0.0)));
        assert!(close_to(moved.val().unwrap().center(), Vector::new(3.0, 4.0, 0.0)));
    }

    #[test]
    fn test_push_points_on_plane() {
        let pts = Workplane::new("XZ").unwrap().push_points([(1.0, 2.0)]);
        assert!(close_to(pts.val().unwrap().center(), Vector::new(1.0, 0.0, 2.0)));
    }

    #[test]
    fn test_rarray() {
        let root = Workplane::new("XY").unwrap();
        let grid = root.rarray(2.0, 3.0, 2, 3, true).unwrap();
        assert_eq!(grid.size(), 6);
        let sum = grid.vals().iter().fold(Vector::zero(), |acc, p| acc + p.center());
        assert!(close_to(sum, Vector::zero()));
        let corner = root.rarray(1.0, 1.0, 2, 2, false).unwrap();
        assert!(close_to(corner.val().unwrap().center(), Vector::zero()));
        assert!(root.rarray(1.0, 1.0, 0, 2, true).is_err());
    }

    #[test]
    fn test_polar_array() {
        let root = Workplane::new("XY").unwrap();
        let full = root.polar_array(1.0, 0.0, 360.0, 4).unwrap();
        assert_eq!(full.size(), 4);
        assert!(close_to(full.item(1).unwrap().val().unwrap().center(), Vector::new(0.0, 1.0, 0.0)));
        let half = root.polar_array(2.0, 0.0, 180.0, 3).unwrap();
        assert!(close_to(half.last().unwrap().val().unwrap().center(), Vector::new(-2.0, 0.0, 0.0)));
        assert_eq!(root.polar_array(1.0, 0.0, 90.0, 1).unwrap().size(), 1);
    }

    #[test]
    fn test_lines_register_pending_edges() {
        let root = Workplane::new("XY").unwrap();
        let sketch = root.line_to(1.0, 0.0).unwrap().v_line(1.0).unwrap().h_line_to(0.0).unwrap();
        assert_eq!(root.context().pending_edges().len(), 3);
        assert_eq!(sketch.context().first_point(), Some(Vector::zero()));
        let edge = sketch.val().unwrap();
        assert!(close_to(edge.as_shape().unwrap().as_edge().unwrap().end_point(), Vector::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_close_builds_closed_wire() {
        let root = Workplane::new("XY").unwrap();
        let wire = root
            .move_to(1.0, 1.0)
            .line(2.0, 0.0)
            .unwrap()
            .line(0.0, 2.0)
            .unwrap()
            .close()
            .unwrap();
        let w = as_wire(&wire.vals()[0]).unwrap().clone();
        assert!(w.is_closed());
        assert_eq!(w.edges().len(), 3);
        let ctx = root.context();
        assert!(ctx.pending_edges().is_empty());
        assert!(ctx.first_point().is_none());
        assert_eq!(ctx.pending_wires().len(), 1);
    }

    #[test]
    fn test_close_skips_edge_when_already_closed() {
        let root = Workplane::new("XY").unwrap();
        let wire = root
            .polyline(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)], false)
            .unwrap()
            .close()
            .unwrap();
        let w = as_wire(&wire.val().unwrap()).unwrap().clone();
        assert_eq!(w.edges().len(), 3);
    }

    #[test]
    fn test_close_without_profile() {
        let root = Workplane::new("XY").unwrap();
        assert!(matches!(root.close(), Err(ChiselError::EmptyContext(_))));
        assert!(matches!(root.wire(), Err(ChiselError::EmptyContext(_))));
    }

    #[test]
    fn test_wire_keeps_non_edge_entries() {
        let root = Workplane::new("XY").unwrap();
        let lines = root.polyline(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)], false).unwrap();
        let mixed = lines.add(Vector::new(9.0, 9.0, 9.0));
        let wired = mixed.wire().unwrap();
        let vals = wired.vals();
        assert_eq!(vals.len(), 2);
        assert!(vals[0].as_vector().is_some());
        assert!(as_wire(&vals[1]).is_some());
    }

    #[test]
    fn test_three_point_arc_and_spline() {
        let root = Workplane::new("XY").unwrap();
        let arc = root.move_to(1.0, 0.0).three_point_arc((0.0, 1.0), (-1.0, 0.0)).unwrap();
        let edge = arc.val().unwrap();
        assert!(close_to(edge.as_shape().unwrap().as_edge().unwrap().end_point(), Vector::new(-1.0, 0.0, 0.0)));
        let spline = arc.spline(&[(0.0, -1.0), (1.0, 0.0)], true).unwrap();
        assert_eq!(root.context().pending_edges().len(), 2);
        assert!(close_to(
            spline.val().unwrap().as_shape().unwrap().as_edge().unwrap().start_point(),
            Vector::new(-1.0, 0.0, 0.0)
        ));
    }

    #[test]
    fn test_polar_line_and_move_by() {
        let root = Workplane::new("XY").unwrap();
        let line = root.move_by(1.0, 0.0).unwrap().polar_line(2.0, 90.0).unwrap();
        let edge = line.val().unwrap().as_shape().unwrap().as_edge().unwrap().clone();
        assert!(close_to(edge.end_point(), Vector::new(1.0, 2.0, 0.0)));
    }

    #[test]
    fn test_for_construction_leaves_pending_lists() {
        let root = Workplane::new("XY").unwrap();
        let guide = root.rect(4.0, 4.0).unwrap().for_construction();
        assert!(root.context().pending_wires().is_empty());
        let holes = guide.vertices(All).unwrap().circle(0.5).unwrap();
        assert_eq!(holes.size(), 4);
        assert_eq!(root.context().pending_wires().len(), 4);
    }

    #[test]
    fn test_rect_on_tilted_plane() {
        let root = Workplane::new("XZ").unwrap();
        let rect = root.rect(2.0, 4.0).unwrap();
        let w = Shape::Wire(as_wire(&rect.val().unwrap()).unwrap().clone());
        let bb = w.bounding_box();
        assert_relative_eq!(bb.xlen(), 2.0, epsilon = 1e-9);
        assert_relative_eq!(bb.ylen(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(bb.zlen(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_circle_at_each_point() {
        let root = Workplane::new("XY").unwrap();
        let circles = root.push_points([(0.0, 0.0), (3.0, 0.0)]).circle(1.0).unwrap();
        assert_eq!(circles.size(), 2);
        assert!(close_to(circles.item(1).unwrap().val().unwrap().center(), Vector::new(3.0, 0.0, 0.0)));
        assert_eq!(root.context().pending_wires().len(), 2);
        assert!(root.circle(0.0).is_err());
    }

    #[test]
    fn test_polygon() {
        let root = Workplane::new("XY").unwrap();
        let hex = root.polygon(6, 2.0).unwrap();
        let w = as_wire(&hex.val().unwrap()).unwrap().clone();
        assert!(w.is_closed());
        assert_eq!(w.edges().len(), 6);
        assert!(root.polygon(2, 1.0).is_err());
    }

    #[test]
    fn test_each_in_local_coordinates() {
        let root = Workplane::new("XZ").unwrap();
        let pts = root.push_points([(1.0, 1.0)]);
        let shifted = pts
            .each(|_, item| Ok(item.as_vector().map(|v| StackItem::Vector(v + Vector::new(1.0, 0.0, 0.0)))), true)
            .unwrap();
        assert!(close_to(shifted.val().unwrap().center(), Vector::new(2.0, 0.0, 1.0)));
        let dropped = pts.each(|_, _| Ok(None), false).unwrap();
        assert_eq!(dropped.size(), 0);
    }

    #[test]
    fn test_eachpoint_on_empty_stack_uses_origin() {
        let root = Workplane::new("XY").unwrap().center(5.0, 0.0).unwrap().new_object(Vec::new());
        let out = root.eachpoint(|_, p| Ok(Some(StackItem::Vector(p))), false).unwrap();
        assert!(close_to(out.val().unwrap().center(), Vector::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn test_failed_call_leaves_context_untouched() {
        let root = Workplane::new("XY").unwrap();
        let start = root.move_to(1.0, 1.0);
        assert!(start.line_to(1.0, 1.0).is_err());
        assert!(root.context().pending_edges().is_empty());
        assert!(root.context().first_point().is_none());
    }
}
