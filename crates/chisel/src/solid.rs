//! Solid-producing operations and the context-solid update rules.
//!
//! Operations that modify "the part" find it with
//! [`Workplane::find_solid`], compute the new geometry through the kernel,
//! and write it into the found handle in place. Every node that holds the
//! handle, on any branch of the chain, then sees the result. With
//! `combine = false` nothing is written back and the result lives only on the
//! returned node.

use chisel_math::{Transform, Vector};
use chisel_select::All;
use chisel_topo::{Compound, Edge, Face, Shape, Solid, Wire};
use tracing::debug;

use crate::error::{ChiselError, ChiselResult};
use crate::grouping::sort_wires_by_build_order;
use crate::item::{IntoShape, StackItem};
use crate::Workplane;

/// One shape from several: the shape itself, or a compound.
fn gather(mut shapes: Vec<Shape>) -> Shape {
    if shapes.len() == 1 {
        shapes.remove(0)
    } else {
        Shape::Compound(Compound::new(shapes))
    }
}

/// Write `from` into the solid or compound cell behind `target`.
fn replace_geometry(target: &Shape, from: &Shape) -> ChiselResult<()> {
    match target {
        Shape::Solid(s) => s.replace_geometry(from)?,
        Shape::Compound(c) => c.replace_geometry(from)?,
        other => {
            return Err(ChiselError::InvalidArgument(format!(
                "cannot update a {} in place",
                other.kind()
            )))
        }
    }
    debug!(solid = %target.id(), source = %from.id(), "updated context solid in place");
    Ok(())
}

fn translated_wire(wire: &Wire, v: Vector) -> ChiselResult<Wire> {
    Shape::Wire(wire.clone())
        .translated(v)
        .as_wire()
        .cloned()
        .ok_or_else(|| ChiselError::InvalidArgument("translated wire changed kind".into()))
}

// =============================================================================
// Context solid
// =============================================================================

impl Workplane {
    fn context_solid(&self) -> ChiselResult<Shape> {
        self.find_solid().ok_or(ChiselError::NoSolidFound)
    }

    /// Fuse `shape` into the context solid found on an ancestor, updating it
    /// in place. Without a context solid the result is `shape` itself.
    pub(crate) fn combine_with_base(&self, shape: Shape) -> ChiselResult<Workplane> {
        match self.find_solid_with(false, true) {
            None => Ok(self.new_object(vec![shape.into()])),
            Some(base) => {
                let fused = self.kernel().fuse(&base, &shape)?;
                replace_geometry(&base, &fused)?;
                Ok(self.new_object(vec![base.into()]))
            }
        }
    }

    fn finish(&self, shape: Shape, combine: bool) -> ChiselResult<Workplane> {
        if combine {
            self.combine_with_base(shape)
        } else {
            Ok(self.new_object(vec![shape.into()]))
        }
    }

    /// Replace the context solid with `result` and return a node holding it.
    fn commit(&self, context: Shape, result: &Shape) -> ChiselResult<Workplane> {
        replace_geometry(&context, result)?;
        Ok(self.new_object(vec![context.into()]))
    }

    fn pending_groups(&self) -> ChiselResult<Vec<Vec<Wire>>> {
        let wires = self.read_context(|ctx| ctx.pending_wires().to_vec());
        let groups = sort_wires_by_build_order(&wires, &self.plane());
        if groups.is_empty() {
            return Err(ChiselError::EmptyContext("no pending wires to build a solid from"));
        }
        Ok(groups)
    }

    fn clear_pending_wires(&self) {
        self.update_context(|ctx| ctx.clear_pending_wires());
    }

    /// Extrude every pending profile group along the plane normal.
    ///
    /// With `both`, the profiles are first moved back by `distance` so the
    /// result spans both sides of the plane.
    fn extrude_pending(&self, distance: f64, both: bool) -> ChiselResult<Shape> {
        let groups = self.pending_groups()?;
        let normal = self.plane().z_dir();
        let mut solids = Vec::with_capacity(groups.len());
        for group in &groups {
            let (outer, inners) = (&group[0], &group[1..]);
            let solid = if both {
                let back = normal * -distance;
                let outer = translated_wire(outer, back)?;
                let inners = inners
                    .iter()
                    .map(|w| translated_wire(w, back))
                    .collect::<ChiselResult<Vec<_>>>()?;
                self.kernel().extrude_linear(&outer, &inners, normal * (2.0 * distance))?
            } else {
                self.kernel().extrude_linear(outer, inners, normal * distance)?
            };
            solids.push(Shape::Solid(solid));
        }
        debug!(groups = groups.len(), distance, both, "extruded pending wires");
        Ok(gather(solids))
    }

    /// Tool reaching through the context solid from this node's plane.
    fn through_depth(&self, context: &Shape) -> f64 {
        let bb = context.bounding_box();
        let plane = self.plane();
        bb.diagonal_length() + (bb.center() - plane.origin()).dot(plane.z_dir()).abs()
    }
}

// =============================================================================
// Solids from sketches
// =============================================================================

impl Workplane {
    /// Box of the given size at every stack point, centered on it, fused into
    /// the context solid.
    pub fn box_(&self, length: f64, width: f64, height: f64) -> ChiselResult<Workplane> {
        self.box_with(length, width, height, (true, true, true), true)
    }

    /// [`Workplane::box_`] with per-axis centering and an opt-out from
    /// combining.
    pub fn box_with(
        &self,
        length: f64,
        width: f64,
        height: f64,
        centered: (bool, bool, bool),
        combine: bool,
    ) -> ChiselResult<Workplane> {
        let half = |on: bool, size: f64| if on { size / 2.0 } else { 0.0 };
        let offset = Vector::new(
            half(centered.0, length),
            half(centered.1, width),
            half(centered.2, height),
        );
        let boxes = self.apply_points(
            |kernel, p| Ok(Some(kernel.make_box(length, width, height, p - offset)?.into())),
            true,
        )?;
        let shapes = boxes.into_iter().filter_map(|i| i.as_shape().cloned()).collect();
        self.finish(gather(shapes), combine)
    }

    /// Extrude the pending wires by `distance` along the plane normal and
    /// fuse the result into the context solid.
    pub fn extrude(&self, distance: f64) -> ChiselResult<Workplane> {
        self.extrude_with(distance, true, false)
    }

    /// [`Workplane::extrude`] with control over combining and over extruding
    /// symmetrically on both sides of the plane.
    pub fn extrude_with(&self, distance: f64, combine: bool, both: bool) -> ChiselResult<Workplane> {
        let shape = self.extrude_pending(distance, both)?;
        let out = self.finish(shape, combine)?;
        self.clear_pending_wires();
        Ok(out)
    }

    /// Extrude the pending wires while rotating them by `angle` degrees
    /// about the plane normal through the plane origin.
    pub fn twist_extrude(&self, distance: f64, angle: f64) -> ChiselResult<Workplane> {
        self.twist_extrude_with(distance, angle, true)
    }

    /// [`Workplane::twist_extrude`] with an opt-out from combining.
    pub fn twist_extrude_with(&self, distance: f64, angle: f64, combine: bool) -> ChiselResult<Workplane> {
        let groups = self.pending_groups()?;
        let plane = self.plane();
        let direction = plane.z_dir() * distance;
        let solids = groups
            .iter()
            .map(|g| {
                self.kernel()
                    .extrude_linear_with_rotation(&g[0], &g[1..], plane.origin(), direction, angle)
                    .map(Shape::Solid)
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(distance, angle, "twist extruded pending wires");
        let out = self.finish(gather(solids), combine)?;
        self.clear_pending_wires();
        Ok(out)
    }

    /// Solid through the pending wires, in the order they were drawn.
    pub fn loft(&self, ruled: bool, combine: bool) -> ChiselResult<Workplane> {
        let wires = self.read_context(|ctx| ctx.pending_wires().to_vec());
        match wires.len() {
            0 => return Err(ChiselError::EmptyContext("no pending wires to loft")),
            1 => return Err(ChiselError::InvalidArgument("a loft needs at least two wires".into())),
            _ => {}
        }
        let solid = self.kernel().make_loft(&wires, ruled)?;
        debug!(sections = wires.len(), ruled, "lofted pending wires");
        let out = self.finish(Shape::Solid(solid), combine)?;
        self.clear_pending_wires();
        Ok(out)
    }
}

// =============================================================================
// Cuts
// =============================================================================

impl Workplane {
    /// Cut the pending profiles, extruded by `depth` along the plane normal,
    /// out of the context solid. Negative depths cut into the material below
    /// a face workplane.
    pub fn cut_blind(&self, depth: f64) -> ChiselResult<Workplane> {
        let context = self.context_solid()?;
        let tool = self.extrude_pending(depth, false)?;
        let result = self.kernel().cut(&context, &tool)?;
        let out = self.commit(context, &result)?;
        self.clear_pending_wires();
        Ok(out)
    }

    /// Cut the pending profiles through the whole context solid, on both
    /// sides of the plane.
    pub fn cut_thru_all(&self) -> ChiselResult<Workplane> {
        let context = self.context_solid()?;
        let tool = self.extrude_pending(self.through_depth(&context), true)?;
        let result = self.kernel().cut(&context, &tool)?;
        let out = self.commit(context, &result)?;
        self.clear_pending_wires();
        Ok(out)
    }

    fn bore(&self, center: Vector, diameter: f64, depth: f64) -> ChiselResult<Shape> {
        let kernel = self.kernel();
        let normal = self.plane().z_dir();
        let circle = kernel.make_circle(diameter / 2.0, center, normal, 0.0, 360.0)?;
        let wire = kernel.assemble_edges(&[circle])?;
        Ok(Shape::Solid(kernel.extrude_linear(&wire, &[], normal * -depth)?))
    }

    fn drill(&self, tools: Vec<Shape>) -> ChiselResult<Workplane> {
        let context = self.context_solid()?;
        let mut result = context.clone();
        for tool in &tools {
            result = self.kernel().cut(&result, tool)?;
        }
        debug!(holes = tools.len(), "drilled");
        self.commit(context, &result)
    }

    /// Hole of `diameter` at every stack point, bored against the plane
    /// normal. Without a depth it goes through the context solid.
    pub fn hole(&self, diameter: f64, depth: Option<f64>) -> ChiselResult<Workplane> {
        if diameter <= 0.0 {
            return Err(ChiselError::InvalidArgument(format!("hole diameter must be positive, got {diameter}")));
        }
        let depth = match depth {
            Some(d) => d,
            None => self.through_depth(&self.context_solid()?),
        };
        let tools = self
            .stack_points()
            .into_iter()
            .map(|p| self.bore(p, diameter, depth))
            .collect::<ChiselResult<Vec<_>>>()?;
        self.drill(tools)
    }

    /// Counterbored hole at every stack point.
    pub fn cbore_hole(
        &self,
        diameter: f64,
        cbore_diameter: f64,
        cbore_depth: f64,
        depth: Option<f64>,
    ) -> ChiselResult<Workplane> {
        if diameter <= 0.0 || cbore_diameter <= diameter || cbore_depth <= 0.0 {
            return Err(ChiselError::InvalidArgument(format!(
                "counterbore {cbore_diameter} x {cbore_depth} does not fit a {diameter} hole"
            )));
        }
        let depth = match depth {
            Some(d) => d,
            None => self.through_depth(&self.context_solid()?),
        };
        let tools = self
            .stack_points()
            .into_iter()
            .map(|p| -> ChiselResult<Shape> {
                let bore = self.bore(p, diameter, depth)?;
                let cbore = self.bore(p, cbore_diameter, cbore_depth)?;
                Ok(self.kernel().fuse(&bore, &cbore)?)
            })
            .collect::<ChiselResult<Vec<_>>>()?;
        self.drill(tools)
    }
}

// =============================================================================
// Booleans and modifiers
// =============================================================================

impl Workplane {
    /// Fuse `other` with the context solid. With `combine` the context solid
    /// is updated in place; without a context solid the result is `other`.
    pub fn union(&self, other: impl IntoShape, combine: bool) -> ChiselResult<Workplane> {
        let other = other.into_shape()?;
        let Some(context) = self.find_solid() else {
            return Ok(self.new_object(vec![other.into()]));
        };
        let fused = self.kernel().fuse(&context, &other)?;
        if combine {
            self.commit(context, &fused)
        } else {
            Ok(self.new_object(vec![fused.into()]))
        }
    }

    /// Subtract `other` from the context solid, in place.
    pub fn cut(&self, other: impl IntoShape) -> ChiselResult<Workplane> {
        let other = other.into_shape()?;
        let context = self.context_solid()?;
        let result = self.kernel().cut(&context, &other)?;
        self.commit(context, &result)
    }

    /// Intersect the context solid with `other`.
    pub fn intersect(&self, other: impl IntoShape, combine: bool) -> ChiselResult<Workplane> {
        let other = other.into_shape()?;
        let context = self.context_solid()?;
        let common = self.kernel().intersect(&context, &other)?;
        if combine {
            self.commit(context, &common)
        } else {
            Ok(self.new_object(vec![common.into()]))
        }
    }

    /// Round the edges of the stack entries by `radius`.
    pub fn fillet(&self, radius: f64) -> ChiselResult<Workplane> {
        let context = self.context_solid()?;
        let edges: Vec<Edge> = self
            .edges(All)?
            .vals()
            .iter()
            .filter_map(|i| i.as_shape().and_then(Shape::as_edge).cloned())
            .collect();
        if edges.is_empty() {
            return Err(ChiselError::EmptySelection);
        }
        let result = self.kernel().fillet(&context, radius, &edges)?;
        self.commit(context, &result)
    }

    /// Hollow the context solid to wall `thickness`, opening the faces on
    /// the stack.
    pub fn shell(&self, thickness: f64) -> ChiselResult<Workplane> {
        let context = self.context_solid()?;
        let faces: Vec<Face> = self
            .vals()
            .iter()
            .filter_map(|i| i.as_shape().and_then(Shape::as_face).cloned())
            .collect();
        let result = self.kernel().shell(&context, &faces, thickness)?;
        self.commit(context, &result)
    }

    /// Split the context solid with this node's plane, keeping the half on
    /// the normal side (`keep_top`), the other half, or both.
    pub fn split(&self, keep_top: bool, keep_bottom: bool) -> ChiselResult<Workplane> {
        if !keep_top && !keep_bottom {
            return Err(ChiselError::InvalidArgument("split must keep at least one half".into()));
        }
        let context = self.context_solid()?;
        let plane = self.plane();
        let reach = self.through_depth(&context);
        let local_center = plane.to_local_coords(context.bounding_box().center());
        let (cx, cy) = (local_center.x(), local_center.y());
        let corners: Vec<Vector> = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0)]
            .iter()
            .map(|(x, y)| plane.to_world_coords((cx + x * reach, cy + y * reach)))
            .collect();
        let kernel = self.kernel();
        let section = kernel.make_polygon(&corners)?;

        let mut kept = Vec::new();
        for (keep, sign) in [(keep_top, 1.0), (keep_bottom, -1.0)] {
            if keep {
                let half_space = kernel.extrude_linear(&section, &[], plane.z_dir() * (sign * reach))?;
                let half = kernel.intersect(&context, &Shape::Solid(half_space))?;
                kept.extend(half.solids());
            }
        }
        debug!(keep_top, keep_bottom, pieces = kept.len(), "split");
        self.commit(context, &gather(kept))
    }
}

// =============================================================================
// Transforms
// =============================================================================

impl Workplane {
    fn map_stack(&self, t: &Transform) -> Workplane {
        let items = self
            .vals()
            .into_iter()
            .map(|item| match item {
                StackItem::Shape(s) => StackItem::Shape(s.transformed(t)),
                StackItem::Vector(v) => StackItem::Vector(t.apply_point(v)),
            })
            .collect();
        self.new_object(items)
    }

    /// Copies of the stack entries moved by `v`.
    pub fn translate(&self, v: impl Into<Vector>) -> Workplane {
        self.map_stack(&Transform::translation(v.into()))
    }

    /// Copies of the stack entries rotated by `degrees` about the axis from
    /// `axis_start` to `axis_end`.
    pub fn rotate(&self, axis_start: impl Into<Vector>, axis_end: impl Into<Vector>, degrees: f64) -> Workplane {
        let start: Vector = axis_start.into();
        let end: Vector = axis_end.into();
        let t = Transform::rotation_about_axis(start, end - start, degrees.to_radians());
        self.map_stack(&t)
    }

    /// Copies of the stack entries, each rotated by `degrees` about an axis
    /// along `axis` through its own center.
    pub fn rotate_about_center(&self, axis: impl Into<Vector>, degrees: f64) -> Workplane {
        let axis: Vector = axis.into();
        let items = self
            .vals()
            .into_iter()
            .map(|item| match item {
                StackItem::Shape(s) => {
                    let c = s.center();
                    StackItem::Shape(s.rotated(c, c + axis, degrees))
                }
                point => point,
            })
            .collect();
        self.new_object(items)
    }

    /// The solids on the stack as one shape.
    pub fn to_shape(&self) -> ChiselResult<Shape> {
        self.into_shape()
    }
}

/// Solid handles of a shape, for callers that need them unwrapped.
pub fn solids_of(shape: &Shape) -> Vec<Solid> {
    shape.solids().iter().filter_map(|s| s.as_solid().cloned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chisel_topo::ShapeKind;

    fn plate() -> Workplane {
        Workplane::new("XY").unwrap().rect(2.0, 2.0).unwrap().extrude(0.5).unwrap()
    }

    fn volume(w: &Workplane) -> f64 {
        w.find_solid().unwrap().volume()
    }

    fn polygon_area(n: usize, r: f64) -> f64 {
        0.5 * n as f64 * r * r * (std::f64::consts::TAU / n as f64).sin()
    }

    #[test]
    fn test_box_centered() {
        let part = Workplane::new("XY").unwrap().box_(1.0, 2.0, 3.0).unwrap();
        let bb = part.find_solid().unwrap().bounding_box();
        assert_relative_eq!(bb.min.z(), -1.5, epsilon = 1e-9);
        assert_relative_eq!(bb.max.y(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(volume(&part), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_box_not_centered_on_offset_plane() {
        let part = Workplane::new("XY")
            .unwrap()
            .center(1.0, 1.0)
            .unwrap()
            .box_with(1.0, 1.0, 1.0, (false, false, false), true)
            .unwrap();
        let bb = part.find_solid().unwrap().bounding_box();
        assert_relative_eq!(bb.min.x(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(bb.max.z(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_extrude_consumes_pending_wires() {
        let root = Workplane::new("XY").unwrap();
        let part = root.rect(2.0, 2.0).unwrap().extrude(0.5).unwrap();
        assert!(root.context().pending_wires().is_empty());
        assert_relative_eq!(volume(&part), 2.0, epsilon = 1e-9);
        assert!(matches!(part.extrude(1.0), Err(ChiselError::EmptyContext(_))));
    }

    #[test]
    fn test_extrude_with_hole_group() {
        let root = Workplane::new("XY").unwrap();
        let part = root.rect(4.0, 4.0).unwrap().rect(2.0, 2.0).unwrap().extrude(1.0).unwrap();
        assert_relative_eq!(volume(&part), 12.0, epsilon = 1e-6);
    }

    #[test]
    fn test_extrude_both_sides() {
        let part = Workplane::new("XY")
            .unwrap()
            .rect(1.0, 1.0)
            .unwrap()
            .extrude_with(1.0, true, true)
            .unwrap();
        let bb = part.find_solid().unwrap().bounding_box();
        assert_relative_eq!(bb.min.z(), -1.0, epsilon = 1e-9);
        assert_relative_eq!(bb.max.z(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_combine_updates_context_in_place() {
        let base = Workplane::new("XY").unwrap().box_(2.0, 2.0, 1.0).unwrap();
        let boss = base
            .faces(">Z")
            .unwrap()
            .workplane(0.0, false)
            .unwrap()
            .rect(1.0, 1.0)
            .unwrap()
            .extrude(1.0)
            .unwrap();
        assert!(boss.val().unwrap().same_as(&base.val().unwrap()));
        assert_relative_eq!(volume(&base), 5.0, epsilon = 1e-6);
        assert_relative_eq!(volume(&boss), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_no_combine_leaves_context_alone() {
        let base = Workplane::new("XY").unwrap().box_(2.0, 2.0, 1.0).unwrap();
        let boss = base
            .faces(">Z")
            .unwrap()
            .workplane(0.0, false)
            .unwrap()
            .rect(1.0, 1.0)
            .unwrap()
            .extrude_with(1.0, false, false)
            .unwrap();
        assert_relative_eq!(volume(&base), 4.0, epsilon = 1e-9);
        assert_relative_eq!(boss.val().unwrap().as_shape().unwrap().volume(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_twist_extrude_keeps_volume() {
        let part = Workplane::new("XY")
            .unwrap()
            .rect(1.0, 1.0)
            .unwrap()
            .twist_extrude(2.0, 45.0)
            .unwrap();
        assert_relative_eq!(volume(&part), 2.0, epsilon = 1e-2);
    }

    #[test]
    fn test_loft_frustum() {
        let root = Workplane::new("XY").unwrap();
        let part = root
            .rect(2.0, 2.0)
            .unwrap()
            .workplane(1.0, false)
            .unwrap()
            .rect(1.0, 1.0)
            .unwrap()
            .loft(true, true)
            .unwrap();
        assert_relative_eq!(volume(&part), 7.0 / 3.0, epsilon = 1e-6);
        assert!(root.context().pending_wires().is_empty());
    }

    #[test]
    fn test_loft_needs_two_wires() {
        let root = Workplane::new("XY").unwrap();
        assert!(matches!(root.loft(true, true), Err(ChiselError::EmptyContext(_))));
        let one = root.rect(1.0, 1.0).unwrap();
        assert!(matches!(one.loft(true, true), Err(ChiselError::InvalidArgument(_))));
        assert_eq!(root.context().pending_wires().len(), 1);
    }

    #[test]
    fn test_cut_blind_partial_depth() {
        let part = Workplane::new("XY").unwrap().box_(2.0, 2.0, 2.0).unwrap();
        let pocket = part
            .faces(">Z")
            .unwrap()
            .workplane(0.0, false)
            .unwrap()
            .rect(1.0, 1.0)
            .unwrap()
            .cut_blind(-0.5)
            .unwrap();
        assert_relative_eq!(volume(&pocket), 7.5, epsilon = 1e-6);
        assert_relative_eq!(volume(&part), 7.5, epsilon = 1e-6);
    }

    #[test]
    fn test_cut_blind_without_solid() {
        let root = Workplane::new("XY").unwrap();
        let sketch = root.rect(1.0, 1.0).unwrap();
        assert_eq!(sketch.cut_blind(-1.0).unwrap_err(), ChiselError::NoSolidFound);
        assert_eq!(root.context().pending_wires().len(), 1);
    }

    #[test]
    fn test_cut_thru_all_from_mid_plane() {
        let part = plate();
        let cut = part
            .faces("<Z")
            .unwrap()
            .workplane(0.25, true)
            .unwrap()
            .rect(0.5, 0.5)
            .unwrap()
            .cut_thru_all()
            .unwrap();
        assert_relative_eq!(volume(&cut), 2.0 - 0.125, epsilon = 1e-6);
    }

    #[test]
    fn test_hole_pattern() {
        let part = plate();
        let drilled = part
            .faces(">Z")
            .unwrap()
            .workplane(0.0, false)
            .unwrap()
            .rarray(1.0, 1.0, 2, 2, true)
            .unwrap()
            .hole(0.2, None)
            .unwrap();
        let expected = 2.0 - 4.0 * polygon_area(64, 0.1) * 0.5;
        assert_relative_eq!(volume(&drilled), expected, epsilon = 1e-6);
        assert_eq!(drilled.faces("%CYLINDER").unwrap().size(), 4);
    }

    #[test]
    fn test_cbore_hole() {
        let part = plate();
        let drilled = part
            .faces(">Z")
            .unwrap()
            .workplane(0.0, false)
            .unwrap()
            .cbore_hole(0.2, 0.6, 0.1, None)
            .unwrap();
        let expected = 2.0 - polygon_area(64, 0.1) * 0.4 - polygon_area(64, 0.3) * 0.1;
        assert_relative_eq!(volume(&drilled), expected, epsilon = 1e-6);
        assert!(part.faces(">Z").unwrap().workplane(0.0, false).unwrap().cbore_hole(0.5, 0.4, 0.1, None).is_err());
    }

    #[test]
    fn test_union_and_intersect() {
        let root = Workplane::new("XY").unwrap();
        let a = root.box_(2.0, 2.0, 2.0).unwrap();
        let b = Workplane::new("XY").unwrap().center(1.0, 1.0).unwrap().box_(2.0, 2.0, 2.0).unwrap();

        let separate = a.union(&b, false).unwrap();
        assert_relative_eq!(separate.val().unwrap().as_shape().unwrap().volume(), 14.0, epsilon = 1e-6);
        assert_relative_eq!(volume(&a), 8.0, epsilon = 1e-9);

        let common = a.intersect(&b, true).unwrap();
        assert_relative_eq!(volume(&common), 2.0, epsilon = 1e-6);
        assert_relative_eq!(volume(&a), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_union_without_context_returns_operand() {
        let root = Workplane::new("XY").unwrap();
        let other = Workplane::new("XY").unwrap().box_(1.0, 1.0, 1.0).unwrap();
        let out = root.union(&other, true).unwrap();
        assert!(out.val().unwrap().same_as(&other.val().unwrap()));
    }

    #[test]
    fn test_cut_other_chain() {
        let block = plate();
        let pin = Workplane::new("XY").unwrap().circle(0.25).unwrap().extrude_with(1.0, true, true).unwrap();
        let out = block.cut(&pin).unwrap();
        assert_eq!(out.faces(All).unwrap().size(), 7);
        assert_relative_eq!(volume(&block), 2.0 - polygon_area(64, 0.25) * 0.5, epsilon = 1e-6);
        assert_eq!(Workplane::new("XY").unwrap().cut(&pin).unwrap_err(), ChiselError::NoSolidFound);
        assert_eq!(block.cut(&Workplane::new("XY").unwrap()).unwrap_err(), ChiselError::NoSolidFound);
    }

    #[test]
    fn test_fillet_and_shell_report_kernel_errors() {
        let part = Workplane::new("XY").unwrap().box_(1.0, 1.0, 1.0).unwrap();
        let err = part.edges("|Z").unwrap().fillet(0.1).unwrap_err();
        assert!(matches!(err, ChiselError::Kernel(_)));
        let err = part.faces(">Z").unwrap().shell(0.1).unwrap_err();
        assert!(matches!(err, ChiselError::Kernel(_)));
        assert_eq!(Workplane::new("XY").unwrap().fillet(0.1).unwrap_err(), ChiselError::NoSolidFound);
        assert_relative_eq!(volume(&part), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_split() {
        let part = Workplane::new("XY").unwrap().box_(2.0, 2.0, 2.0).unwrap();
        assert!(matches!(part.split(false, false), Err(ChiselError::InvalidArgument(_))));
        let top = part.faces(">Z").unwrap().workplane(-0.5, false).unwrap().split(true, false).unwrap();
        assert_relative_eq!(volume(&top), 2.0, epsilon = 1e-6);
        assert_relative_eq!(volume(&part), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_split_keep_both() {
        let part = Workplane::new("XY").unwrap().box_(2.0, 2.0, 2.0).unwrap();
        let halves = part.workplane(0.0, false).unwrap().split(true, true).unwrap();
        assert_relative_eq!(volume(&halves), 8.0, epsilon = 1e-6);
        assert_eq!(halves.find_solid().unwrap().shells().len(), 2);
    }

    #[test]
    fn test_translate_and_rotate() {
        let part = Workplane::new("XY").unwrap().box_(1.0, 1.0, 1.0).unwrap();
        let moved = part.translate((1.0, 2.0, 3.0));
        let c = moved.val().unwrap().center();
        assert_relative_eq!(c.x(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(c.z(), 3.0, epsilon = 1e-9);
        assert_relative_eq!(part.val().unwrap().center().x(), 0.0, epsilon = 1e-9);

        let turned = moved.rotate((0.0, 0.0, 0.0), (0.0, 0.0, 1.0), 90.0);
        let c = turned.val().unwrap().center();
        assert_relative_eq!(c.x(), -2.0, epsilon = 1e-9);
        assert_relative_eq!(c.y(), 1.0, epsilon = 1e-9);

        let spun = moved.rotate_about_center((0.0, 0.0, 1.0), 45.0);
        let c = spun.val().unwrap().center();
        assert_relative_eq!(c.x(), 1.0, epsilon = 1e-9);
        let bb = spun.val().unwrap().as_shape().unwrap().bounding_box();
        assert_relative_eq!(bb.xlen(), 2f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_to_shape_and_solids_of() {
        let boxes = Workplane::new("XY")
            .unwrap()
            .push_points([(0.0, 0.0), (3.0, 0.0)])
            .box_(1.0, 1.0, 1.0)
            .unwrap();
        let shape = boxes.to_shape().unwrap();
        assert_eq!(shape.kind(), ShapeKind::Compound);
        assert_eq!(solids_of(&shape).len(), 2);
    }
}
