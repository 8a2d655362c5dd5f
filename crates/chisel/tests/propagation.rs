//! How results flow back through a chain: in-place updates of the context
//! solid, branches, and failures that must leave the chain untouched.

use std::rc::Rc;

use approx::assert_relative_eq;
use chisel::{All, ChiselError, ChiselResult, Config, Kernel, KernelError, MeshKernel, Plane, Shape, Vector, Workplane};
use chisel_topo::{Edge, Face, KernelResult, Solid, Wire};

fn volume_of(w: &Workplane) -> f64 {
    w.find_solid().map(|s| s.volume()).unwrap_or(0.0)
}

/// Mesh kernel whose fillet and shell hand the solid back unchanged, so
/// the builder's write-back path can be observed.
struct PassThroughKernel(MeshKernel);

impl Kernel for PassThroughKernel {
    fn name(&self) -> &str {
        "pass-through"
    }

    fn make_line(&self, start: Vector, end: Vector) -> KernelResult<Edge> {
        self.0.make_line(start, end)
    }

    fn make_circle(&self, radius: f64, center: Vector, normal: Vector, start: f64, end: f64) -> KernelResult<Edge> {
        self.0.make_circle(radius, center, normal, start, end)
    }

    fn make_three_point_arc(&self, p1: Vector, p2: Vector, p3: Vector) -> KernelResult<Edge> {
        self.0.make_three_point_arc(p1, p2, p3)
    }

    fn make_spline(&self, points: &[Vector]) -> KernelResult<Edge> {
        self.0.make_spline(points)
    }

    fn make_polygon(&self, points: &[Vector]) -> KernelResult<Wire> {
        self.0.make_polygon(points)
    }

    fn assemble_edges(&self, edges: &[Edge]) -> KernelResult<Wire> {
        self.0.assemble_edges(edges)
    }

    fn make_box(&self, length: f64, width: f64, height: f64, corner: Vector) -> KernelResult<Solid> {
        self.0.make_box(length, width, height, corner)
    }

    fn extrude_linear(&self, outer: &Wire, inners: &[Wire], direction: Vector) -> KernelResult<Solid> {
        self.0.extrude_linear(outer, inners, direction)
    }

    fn extrude_linear_with_rotation(
        &self,
        outer: &Wire,
        inners: &[Wire],
        center: Vector,
        direction: Vector,
        angle_degrees: f64,
    ) -> KernelResult<Solid> {
        self.0.extrude_linear_with_rotation(outer, inners, center, direction, angle_degrees)
    }

    fn make_loft(&self, wires: &[Wire], ruled: bool) -> KernelResult<Solid> {
        self.0.make_loft(wires, ruled)
    }

    fn fuse(&self, a: &Shape, b: &Shape) -> KernelResult<Shape> {
        self.0.fuse(a, b)
    }

    fn cut(&self, a: &Shape, b: &Shape) -> KernelResult<Shape> {
        self.0.cut(a, b)
    }

    fn intersect(&self, a: &Shape, b: &Shape) -> KernelResult<Shape> {
        self.0.intersect(a, b)
    }

    fn fillet(&self, shape: &Shape, _radius: f64, edges: &[Edge]) -> KernelResult<Shape> {
        if edges.is_empty() {
            return Err(KernelError::InvalidGeometry("no edges".into()));
        }
        let copy = shape.translated(Vector::zero());
        Ok(copy)
    }

    fn shell(&self, shape: &Shape, _faces: &[Face], _thickness: f64) -> KernelResult<Shape> {
        Ok(shape.translated(Vector::new(0.0, 0.0, 1.0)))
    }
}

fn pass_through_root() -> Workplane {
    Workplane::with_kernel(Plane::xy(), Rc::new(PassThroughKernel(MeshKernel::new())), Config::default())
}

#[test]
fn test_boss_updates_root_solid() -> ChiselResult<()> {
    let base = Workplane::new("XY")?.box_(2.0, 2.0, 1.0)?;
    let boss = base
        .faces(">Z")?
        .workplane(0.0, false)?
        .circle(0.5)?
        .extrude(1.0)?;

    let from_boss = boss.find_solid().ok_or(ChiselError::NoSolidFound)?;
    let from_base = base.find_solid().ok_or(ChiselError::NoSolidFound)?;
    assert!(from_boss.same_as(&from_base));
    assert!(boss.root().find_solid().is_none());

    let disc = 0.5 * 64.0 * 0.25 * (std::f64::consts::TAU / 64.0).sin();
    assert_relative_eq!(from_base.volume(), 4.0 + disc, epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_sibling_branches_share_the_part() -> ChiselResult<()> {
    let base = Workplane::new("XY")?.box_(4.0, 4.0, 1.0)?;
    let top = base.faces(">Z")?.workplane(0.0, false)?;
    let left = top.center(-1.0, 0.0)?.rect(1.0, 1.0)?.cut_blind(-0.5)?;
    let right = top.center(1.0, 0.0)?.rect(1.0, 1.0)?.cut_blind(-0.5)?;

    assert_relative_eq!(volume_of(&base), 16.0 - 1.0, epsilon = 1e-6);
    assert_relative_eq!(volume_of(&left), volume_of(&right), epsilon = 1e-12);
    Ok(())
}

#[test]
fn test_no_combine_keeps_ancestors() -> ChiselResult<()> {
    let base = Workplane::new("XY")?.box_(2.0, 2.0, 1.0)?;
    let loose = base
        .faces(">Z")?
        .workplane(0.0, false)?
        .rect(1.0, 1.0)?
        .extrude_with(1.0, false, false)?;

    assert_relative_eq!(volume_of(&base), 4.0, epsilon = 1e-9);
    let item = loose.val()?;
    let shape = item.as_shape().ok_or(ChiselError::NoSolidFound)?;
    assert_relative_eq!(shape.volume(), 1.0, epsilon = 1e-9);
    assert!(!shape.same_as(&base.val()?.as_shape().cloned().ok_or(ChiselError::NoSolidFound)?));
    Ok(())
}

#[test]
fn test_nodes_keep_their_objects() -> ChiselResult<()> {
    let root = Workplane::new("XY")?;
    let points = root.push_points([(0.0, 0.0), (1.0, 0.0)]);
    let first = points.first()?;
    let more = points.add(Vector::new(2.0, 0.0, 0.0));

    assert_eq!(root.size(), 0);
    assert_eq!(first.size(), 1);
    assert_eq!(more.size(), 3);
    assert!(first.parent().is_some_and(|p| p.same_node(&points)));
    assert!(first.end(1)?.same_node(&points));
    assert_eq!(root.end(1).unwrap_err(), ChiselError::NoParent);
    Ok(())
}

#[test]
fn test_cut_without_part() -> ChiselResult<()> {
    let tool = Workplane::new("XY")?.box_(1.0, 1.0, 1.0)?;
    let sketch = Workplane::new("XY")?.rect(1.0, 1.0)?;
    assert_eq!(sketch.cut(&tool).unwrap_err(), ChiselError::NoSolidFound);
    assert_eq!(sketch.cut_thru_all().unwrap_err(), ChiselError::NoSolidFound);
    assert_eq!(sketch.context().pending_wires().len(), 1);
    Ok(())
}

#[test]
fn test_split_requires_a_half() -> ChiselResult<()> {
    let part = Workplane::new("XY")?.box_(1.0, 1.0, 1.0)?;
    assert!(matches!(part.split(false, false), Err(ChiselError::InvalidArgument(_))));
    assert_relative_eq!(volume_of(&part), 1.0, epsilon = 1e-9);
    Ok(())
}

#[test]
fn test_unsupported_fillet_leaves_part() -> ChiselResult<()> {
    let part = Workplane::new("XY")?.box_(1.0, 1.0, 1.0)?;
    let err = part.edges("|Z")?.fillet(0.1).unwrap_err();
    assert!(matches!(err, ChiselError::Kernel(KernelError::Unsupported { .. })));
    assert_eq!(part.faces(All)?.size(), 6);
    Ok(())
}

#[test]
fn test_fillet_result_written_into_part() -> ChiselResult<()> {
    let part = pass_through_root().box_(1.0, 1.0, 1.0)?;
    let before = part.find_solid().ok_or(ChiselError::NoSolidFound)?;
    let rounded = part.edges("|Z")?.fillet(0.1)?;

    let after = rounded.find_solid().ok_or(ChiselError::NoSolidFound)?;
    assert!(after.same_as(&before));
    assert_eq!(part.faces(All)?.size(), 6);
    Ok(())
}

#[test]
fn test_shell_result_written_into_part() -> ChiselResult<()> {
    let part = pass_through_root().box_(1.0, 1.0, 1.0)?;
    part.faces(">Z")?.shell(0.1)?;
    let bb = part.find_solid().ok_or(ChiselError::NoSolidFound)?.bounding_box();
    assert_relative_eq!(bb.min.z(), 0.5, epsilon = 1e-9);
    Ok(())
}

#[test]
fn test_failed_extrude_keeps_pending_wires() -> ChiselResult<()> {
    let root = Workplane::new("XY")?;
    let sketch = root.rect(1.0, 1.0)?;
    assert!(sketch.extrude(0.0).is_err());
    assert_eq!(root.context().pending_wires().len(), 1);
    let part = sketch.extrude(1.0)?;
    assert_relative_eq!(volume_of(&part), 1.0, epsilon = 1e-9);
    Ok(())
}

#[test]
fn test_bad_selector_reports_position() -> ChiselResult<()> {
    let part = Workplane::new("XY")?.box_(1.0, 1.0, 1.0)?;
    match part.faces(">Z and") {
        Err(ChiselError::InvalidSelector(e)) => assert!(e.to_string().contains('6')),
        other => panic!("expected a selector error, got {other:?}"),
    }
    Ok(())
}
