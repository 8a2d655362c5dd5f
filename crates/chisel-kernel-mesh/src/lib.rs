#![warn(missing_docs)]

//! Reference geometry kernel for the chisel construction API.
//!
//! [`MeshKernel`] implements [`chisel_topo::Kernel`] over faceted geometry:
//! curves are sampled, solids are triangulated, and booleans run on a BSP
//! tree. After every operation, boundary topology is rebuilt from the
//! triangles so that faces keep their surface type and neighboring faces
//! share edges and vertices.
//!
//! ```
//! use chisel_kernel_mesh::MeshKernel;
//! use chisel_math::Vector;
//! use chisel_topo::{Kernel, Shape};
//!
//! let kernel = MeshKernel::new();
//! let block = Shape::from(kernel.make_box(1.0, 1.0, 1.0, Vector::zero()).unwrap());
//! assert_eq!(block.faces().len(), 6);
//! assert!((block.volume() - 1.0).abs() < 1e-9);
//! ```
//!
//! Fillets and shelling are not available and report
//! [`KernelError::Unsupported`].

mod boolean;
mod bsp;
mod build;
mod edges;
mod pool;
mod sweep;
mod triangulate;

use chisel_math::Vector;
use chisel_topo::{Edge, Face, Kernel, KernelError, KernelResult, Resolution, Shape, Solid, Wire};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::boolean::BooleanOp;
use crate::build::{build_shells, BuildOptions, FaceSeed};

/// Tuning knobs of the mesh kernel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshKernelConfig {
    /// Segments used to approximate a full circle.
    pub circle_segments: u32,
    /// Segments per spline span.
    pub spline_samples: u32,
    /// Largest rotation between two slices of a twisted extrusion, in degrees.
    pub twist_step_degrees: f64,
    /// Plane thickness used when classifying points during booleans.
    pub bsp_epsilon: f64,
    /// Points closer than this are merged into one vertex.
    pub weld_tolerance: f64,
}

impl Default for MeshKernelConfig {
    fn default() -> Self {
        Self {
            circle_segments: 64,
            spline_samples: 8,
            twist_step_degrees: 5.0,
            bsp_epsilon: 1e-5,
            weld_tolerance: 1e-5,
        }
    }
}

/// Faceted B-rep kernel.
#[derive(Debug, Clone, Default)]
pub struct MeshKernel {
    config: MeshKernelConfig,
}

impl MeshKernel {
    /// Kernel with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Kernel with the given settings.
    pub fn with_config(config: MeshKernelConfig) -> Self {
        Self { config }
    }

    /// Current settings.
    pub fn config(&self) -> &MeshKernelConfig {
        &self.config
    }

    fn resolution(&self) -> Resolution {
        Resolution {
            segments_per_turn: self.config.circle_segments.max(3),
            spline_samples: self.config.spline_samples.max(1),
        }
    }

    fn build_options(&self) -> BuildOptions {
        let half_step = std::f64::consts::PI / self.config.circle_segments.max(3) as f64;
        BuildOptions {
            weld_tolerance: self.config.weld_tolerance,
            circle_deviation: 1.5 * (1.0 - half_step.cos()),
        }
    }

    fn solid_from(&self, seeds: Vec<FaceSeed>) -> KernelResult<Solid> {
        let shells = build_shells(seeds, self.build_options())?;
        trace!(shells = shells.len(), "built solid");
        Ok(Solid::new(shells))
    }

    fn boolean(&self, op: BooleanOp, a: &Shape, b: &Shape) -> KernelResult<Shape> {
        debug!(?op, left = %a.id(), right = %b.id(), "boolean");
        boolean::run(op, a, b, self.config.bsp_epsilon, self.build_options())
    }

    fn unsupported<T>(&self, operation: &str) -> KernelResult<T> {
        Err(KernelError::Unsupported {
            kernel: self.name().to_string(),
            operation: operation.to_string(),
        })
    }
}

impl Kernel for MeshKernel {
    fn name(&self) -> &str {
        "mesh"
    }

    fn make_line(&self, start: Vector, end: Vector) -> KernelResult<Edge> {
        edges::make_line(start, end)
    }

    fn make_circle(
        &self,
        radius: f64,
        center: Vector,
        normal: Vector,
        start_degrees: f64,
        end_degrees: f64,
    ) -> KernelResult<Edge> {
        edges::make_circle(radius, center, normal, start_degrees, end_degrees)
    }

    fn make_three_point_arc(&self, p1: Vector, p2: Vector, p3: Vector) -> KernelResult<Edge> {
        edges::make_three_point_arc(p1, p2, p3)
    }

    fn make_spline(&self, points: &[Vector]) -> KernelResult<Edge> {
        edges::make_spline(points)
    }

    fn make_polygon(&self, points: &[Vector]) -> KernelResult<Wire> {
        edges::make_polygon(points)
    }

    fn assemble_edges(&self, edges: &[Edge]) -> KernelResult<Wire> {
        edges::assemble_edges(edges)
    }

    fn make_box(&self, length: f64, width: f64, height: f64, corner: Vector) -> KernelResult<Solid> {
        if length <= 0.0 || width <= 0.0 || height <= 0.0 {
            return Err(KernelError::InvalidGeometry(format!(
                "box dimensions must be positive, got {length} x {width} x {height}"
            )));
        }
        let outline = edges::make_polygon(&[
            corner,
            corner + Vector::new(length, 0.0, 0.0),
            corner + Vector::new(length, width, 0.0),
            corner + Vector::new(0.0, width, 0.0),
            corner,
        ])?;
        self.extrude_linear(&outline, &[], Vector::new(0.0, 0.0, height))
    }

    fn extrude_linear(&self, outer: &Wire, inners: &[Wire], direction: Vector) -> KernelResult<Solid> {
        trace!(holes = inners.len(), %direction, "extrude");
        let seeds = sweep::extrude(outer, inners, direction, &self.resolution())?;
        self.solid_from(seeds)
    }

    fn extrude_linear_with_rotation(
        &self,
        outer: &Wire,
        inners: &[Wire],
        center: Vector,
        direction: Vector,
        angle_degrees: f64,
    ) -> KernelResult<Solid> {
        trace!(holes = inners.len(), %direction, angle_degrees, "twist extrude");
        let seeds = sweep::extrude_twisted(
            outer,
            inners,
            center,
            direction,
            angle_degrees,
            self.config.twist_step_degrees,
            &self.resolution(),
        )?;
        self.solid_from(seeds)
    }

    /// Lofts are always ruled between consecutive sections.
    fn make_loft(&self, wires: &[Wire], ruled: bool) -> KernelResult<Solid> {
        trace!(sections = wires.len(), ruled, "loft");
        let seeds = sweep::loft(wires, &self.resolution())?;
        self.solid_from(seeds)
    }

    fn fuse(&self, a: &Shape, b: &Shape) -> KernelResult<Shape> {
        self.boolean(BooleanOp::Union, a, b)
    }

    fn cut(&self, a: &Shape, b: &Shape) -> KernelResult<Shape> {
        self.boolean(BooleanOp::Difference, a, b)
    }

    fn intersect(&self, a: &Shape, b: &Shape) -> KernelResult<Shape> {
        self.boolean(BooleanOp::Intersection, a, b)
    }

    fn fillet(&self, _shape: &Shape, _radius: f64, _edges: &[Edge]) -> KernelResult<Shape> {
        self.unsupported("fillet")
    }

    fn shell(&self, _shape: &Shape, _faces: &[Face], _thickness: f64) -> KernelResult<Shape> {
        self.unsupported("shell")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chisel_topo::GeomType;
    use std::f64::consts::PI;

    fn unit_box(kernel: &MeshKernel, corner: Vector) -> Shape {
        Shape::from(kernel.make_box(1.0, 1.0, 1.0, corner).unwrap())
    }

    #[test]
    fn test_box_topology() {
        let k = MeshKernel::new();
        let b = Shape::from(k.make_box(2.0, 3.0, 4.0, Vector::new(-1.0, 0.0, 0.0)).unwrap());
        assert_eq!(b.faces().len(), 6);
        assert_eq!(b.edges().len(), 12);
        assert_eq!(b.vertices().len(), 8);
        assert_relative_eq!(b.volume(), 24.0, epsilon = 1e-9);
        assert!(b.faces().iter().all(|f| f.geom_type() == GeomType::Plane));
        let bb = b.bounding_box();
        assert_relative_eq!(bb.min.x(), -1.0, epsilon = 1e-12);
        assert_relative_eq!(bb.max.z(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_box_rejects_bad_dimensions() {
        let k = MeshKernel::new();
        assert!(matches!(
            k.make_box(0.0, 1.0, 1.0, Vector::zero()),
            Err(KernelError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_cylinder_faces() {
        let k = MeshKernel::new();
        let circle = k.make_circle(1.0, Vector::zero(), Vector::z_axis(), 0.0, 360.0).unwrap();
        let wire = k.assemble_edges(&[circle]).unwrap();
        let cyl = Shape::from(k.extrude_linear(&wire, &[], Vector::new(0.0, 0.0, 2.0)).unwrap());
        let faces = cyl.faces();
        assert_eq!(faces.len(), 3);
        assert_eq!(faces.iter().filter(|f| f.geom_type() == GeomType::Cylinder).count(), 1);
        assert_eq!(cyl.edges().len(), 2);
        assert_eq!(cyl.edges().iter().filter(|e| e.geom_type() == GeomType::Circle).count(), 2);
        let n = 64.0;
        assert_relative_eq!(cyl.volume(), 2.0 * 0.5 * n * (2.0 * PI / n).sin(), epsilon = 1e-9);
    }

    #[test]
    fn test_cut_through_hole() {
        let k = MeshKernel::new();
        let block = Shape::from(k.make_box(2.0, 2.0, 0.5, Vector::new(-1.0, -1.0, 0.0)).unwrap());
        let circle = k.make_circle(0.25, Vector::new(0.0, 0.0, 1.0), Vector::z_axis(), 0.0, 360.0).unwrap();
        let wire = k.assemble_edges(&[circle]).unwrap();
        let tool = Shape::from(k.extrude_linear(&wire, &[], Vector::new(0.0, 0.0, -2.0)).unwrap());
        let result = k.cut(&block, &tool).unwrap();
        assert_eq!(result.solids().len(), 1);
        assert_eq!(result.faces().len(), 7);
        let hole_area = 0.5 * 64.0 * 0.0625 * (2.0 * PI / 64.0).sin();
        assert_relative_eq!(result.volume(), 2.0 - hole_area * 0.5, epsilon = 1e-6);
        let cyl = result
            .faces()
            .into_iter()
            .filter(|f| f.geom_type() == GeomType::Cylinder)
            .count();
        assert_eq!(cyl, 1);
    }

    #[test]
    fn test_union_of_overlapping_boxes() {
        let k = MeshKernel::new();
        let a = unit_box(&k, Vector::zero());
        let b = unit_box(&k, Vector::new(0.5, 0.5, 0.5));
        let u = k.fuse(&a, &b).unwrap();
        assert_relative_eq!(u.volume(), 2.0 - 0.125, epsilon = 1e-6);
        assert_eq!(u.solids().len(), 1);
    }

    #[test]
    fn test_intersection_of_overlapping_boxes() {
        let k = MeshKernel::new();
        let a = unit_box(&k, Vector::zero());
        let b = unit_box(&k, Vector::new(0.5, 0.5, 0.5));
        let i = k.intersect(&a, &b).unwrap();
        assert_relative_eq!(i.volume(), 0.125, epsilon = 1e-6);
        assert_eq!(i.faces().len(), 6);
        assert_eq!(i.vertices().len(), 8);
    }

    #[test]
    fn test_disjoint_intersection_is_empty() {
        let k = MeshKernel::new();
        let a = unit_box(&k, Vector::zero());
        let b = unit_box(&k, Vector::new(5.0, 0.0, 0.0));
        let i = k.intersect(&a, &b).unwrap();
        assert!(i.solids().is_empty());
    }

    #[test]
    fn test_union_of_disjoint_boxes_is_compound() {
        let k = MeshKernel::new();
        let a = unit_box(&k, Vector::zero());
        let b = unit_box(&k, Vector::new(5.0, 0.0, 0.0));
        let u = k.fuse(&a, &b).unwrap();
        assert_eq!(u.solids().len(), 2);
        assert_relative_eq!(u.volume(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_boolean_needs_solids() {
        let k = MeshKernel::new();
        let a = unit_box(&k, Vector::zero());
        let edge = Shape::from(k.make_line(Vector::zero(), Vector::x_axis()).unwrap());
        assert!(matches!(k.cut(&a, &edge), Err(KernelError::BooleanFailed(_))));
    }

    #[test]
    fn test_loft_frustum_volume() {
        let k = MeshKernel::new();
        let square = |s: f64, z: f64| {
            let h = s / 2.0;
            k.make_polygon(&[
                Vector::new(-h, -h, z),
                Vector::new(h, -h, z),
                Vector::new(h, h, z),
                Vector::new(-h, h, z),
                Vector::new(-h, -h, z),
            ])
            .unwrap()
        };
        let solid = Shape::from(k.make_loft(&[square(2.0, 0.0), square(1.0, 1.0)], true).unwrap());
        assert_relative_eq!(solid.volume(), 7.0 / 3.0, epsilon = 1e-9);
        assert_eq!(solid.faces().len(), 6);
    }

    #[test]
    fn test_twist_extrude_volume() {
        let k = MeshKernel::new();
        let square = k
            .make_polygon(&[
                Vector::new(-0.5, -0.5, 0.0),
                Vector::new(0.5, -0.5, 0.0),
                Vector::new(0.5, 0.5, 0.0),
                Vector::new(-0.5, 0.5, 0.0),
                Vector::new(-0.5, -0.5, 0.0),
            ])
            .unwrap();
        let solid = k
            .extrude_linear_with_rotation(&square, &[], Vector::zero(), Vector::z_axis(), 30.0)
            .unwrap();
        assert_relative_eq!(Shape::from(solid).volume(), 1.0, epsilon = 5e-3);
    }

    #[test]
    fn test_fillet_unsupported() {
        let k = MeshKernel::new();
        let a = unit_box(&k, Vector::zero());
        let err = k.fillet(&a, 0.1, &[]).unwrap_err();
        assert!(matches!(err, KernelError::Unsupported { .. }));
    }
}
