#![warn(missing_docs)]

//! Shape data model for the chisel construction API.
//!
//! A closed [`Shape`] sum type over vertices, edges, wires, faces, shells,
//! solids and compounds, with identity-based ids, introspection (centers,
//! bounding boxes, geometry tags, child accessors), transforms, and the
//! [`Kernel`] trait through which all modeling operations are requested.
//!
//! ```
//! use chisel_math::Vector;
//! use chisel_topo::{Curve, Edge, GeomType, Shape};
//!
//! let edge = Edge::from_curve(Curve::Line {
//!     start: Vector::zero(),
//!     end: Vector::new(2.0, 0.0, 0.0),
//! });
//! let shape = Shape::from(edge);
//! assert_eq!(shape.geom_type(), GeomType::Line);
//! assert_eq!(shape.vertices().len(), 2);
//! ```

mod curve;
mod error;
mod kernel;
mod mesh;
mod plane_ext;
mod props;
mod shape;
mod surface;
mod xform;

pub use curve::{Curve, Resolution};
pub use error::ShapeError;
pub use kernel::{Kernel, KernelError, KernelResult, NullKernel};
pub use mesh::Mesh;
pub use plane_ext::PlaneExt;
pub use shape::{Compound, Edge, Face, GeomType, Shape, ShapeId, ShapeKind, Shell, Solid, Vertex, Wire};
pub use surface::Surface;
