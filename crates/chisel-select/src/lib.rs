#![warn(missing_docs)]

//! Entity selectors for the chisel construction API.
//!
//! A [`Selector`] filters a list of shapes: by direction, by geometry type,
//! by position, or by set algebra over other selectors. Selectors can also
//! be written as strings, parsed by [`StringSyntax`].
//!
//! ```
//! use chisel_kernel_mesh::MeshKernel;
//! use chisel_math::Vector;
//! use chisel_select::{IntoSelector, Selector};
//! use chisel_topo::{Kernel, Shape};
//!
//! let cube = Shape::from(MeshKernel::new().make_box(1.0, 1.0, 1.0, Vector::zero()).unwrap());
//! let top = ">Z".into_selector().unwrap().filter(&cube.faces());
//! assert_eq!(top.len(), 1);
//! ```

mod combinators;
mod error;
mod lexer;
mod parser;
mod predicates;
mod selector;

pub use combinators::{And, Inverse, Subtract, Sum};
pub use error::SelectorError;
pub use parser::StringSyntax;
pub use predicates::{
    All, BoxSelector, DirectionMinMax, DirectionSelector, NearestToPoint, ParallelDir, PerpendicularDir,
    TypeSelector,
};
pub use selector::{IntoSelector, Selector, SelectorExt, DEFAULT_TOLERANCE};
