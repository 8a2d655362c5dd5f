#![warn(missing_docs)]

//! chisel: fluent, chainable parametric solid modeling
//!
//! A [`Workplane`] is one node of a construction chain. Every operation
//! returns a new node linked to its parent, holding a stack of shapes or
//! points and a [`Plane`] for 2D input. Nodes of one chain share a
//! [`BuildContext`] with the pending sketch edges and wires, and operations
//! that modify the part update the solid found on an ancestor in place.
//!
//! # Example
//!
//! ```rust
//! use chisel::{All, Workplane};
//!
//! let part = Workplane::new("XY")?.box_(1.0, 1.0, 1.0)?;
//! let top = part.faces(">Z")?;
//! assert_eq!(top.size(), 1);
//! let c = top.val()?.center();
//! assert!((c.z() - 0.5).abs() < 1e-9);
//! assert_eq!(part.faces(All)?.size(), 6);
//! assert_eq!(part.vertices(All)?.size(), 8);
//! # Ok::<(), chisel::ChiselError>(())
//! ```
//!
//! Sketches become solids through the pending wires:
//!
//! ```rust
//! use chisel::Workplane;
//!
//! let plate = Workplane::new("XY")?
//!     .rect(2.0, 2.0)?
//!     .extrude(0.5)?
//!     .faces(">Z")?
//!     .workplane(0.0, false)?
//!     .circle(0.25)?
//!     .cut_blind(-1.0)?;
//! assert_eq!(plate.faces(chisel::All)?.size(), 7);
//! # Ok::<(), chisel::ChiselError>(())
//! ```

mod chain;
mod config;
mod context;
mod error;
mod grouping;
mod item;
mod sketch;
mod solid;

pub use chain::{NodeKey, Workplane};
pub use config::Config;
pub use context::BuildContext;
pub use error::{ChiselError, ChiselResult};
pub use grouping::sort_wires_by_build_order;
pub use item::{IntoShape, IntoStackItems, StackItem};
pub use sketch::CenterOption;
pub use solid::solids_of;

pub use chisel_kernel_mesh::{MeshKernel, MeshKernelConfig};
pub use chisel_math::{BoundBox, MathError, Plane, Tolerance, Vector};
pub use chisel_select::{
    All, And, BoxSelector, DirectionMinMax, DirectionSelector, IntoSelector, Inverse, NearestToPoint, ParallelDir,
    PerpendicularDir, Selector, SelectorError, SelectorExt, StringSyntax, Subtract, Sum, TypeSelector,
};
pub use chisel_topo::{Kernel, KernelError, Shape, ShapeKind};
