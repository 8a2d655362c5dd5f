//! The [`Selector`] trait and conversions into boxed selectors.

use std::fmt;

use crate::combinators::{And, Inverse, Subtract, Sum};
use crate::error::SelectorError;
use crate::parser::StringSyntax;

/// Default angular and distance tolerance for directional selectors.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Filters a list of shapes.
///
/// Implementations never mutate their input and return entities in input
/// order unless documented otherwise.
pub trait Selector: fmt::Debug {
    /// Keep the entities of `objects` this selector accepts.
    fn filter(&self, objects: &[chisel_topo::Shape]) -> Vec<chisel_topo::Shape>;
}

impl<S: Selector + ?Sized> Selector for Box<S> {
    fn filter(&self, objects: &[chisel_topo::Shape]) -> Vec<chisel_topo::Shape> {
        (**self).filter(objects)
    }
}

/// Set-algebra combinators on selectors.
pub trait SelectorExt: Selector + Sized + 'static {
    /// Entities accepted by both, in the order `self` returns them.
    fn and<B: Selector + 'static>(self, other: B) -> Box<dyn Selector> {
        Box::new(And::new(Box::new(self), Box::new(other)))
    }

    /// Entities accepted by either, without duplicates.
    fn sum<B: Selector + 'static>(self, other: B) -> Box<dyn Selector> {
        Box::new(Sum::new(Box::new(self), Box::new(other)))
    }

    /// Entities accepted by `self` but not by `other`.
    fn subtract<B: Selector + 'static>(self, other: B) -> Box<dyn Selector> {
        Box::new(Subtract::new(Box::new(self), Box::new(other)))
    }

    /// Entities `self` rejects.
    fn invert(self) -> Box<dyn Selector> {
        Box::new(Inverse::new(Box::new(self)))
    }
}

impl<S: Selector + Sized + 'static> SelectorExt for S {}

/// Anything the builder accepts where a selector is expected: selector
/// values or selector strings.
pub trait IntoSelector {
    /// Convert into a boxed selector, parsing strings with the default
    /// tolerance.
    fn into_selector(self) -> Result<Box<dyn Selector>, SelectorError>;

    /// Convert using `tolerance` for any directional selectors parsed from
    /// text. Selector values keep their own tolerance.
    fn into_selector_with_tolerance(self, tolerance: f64) -> Result<Box<dyn Selector>, SelectorError>
    where
        Self: Sized,
    {
        let _ = tolerance;
        self.into_selector()
    }
}

impl<S: Selector + 'static> IntoSelector for S {
    fn into_selector(self) -> Result<Box<dyn Selector>, SelectorError> {
        Ok(Box::new(self))
    }
}

impl IntoSelector for &str {
    fn into_selector(self) -> Result<Box<dyn Selector>, SelectorError> {
        Ok(Box::new(StringSyntax::new(self)?))
    }

    fn into_selector_with_tolerance(self, tolerance: f64) -> Result<Box<dyn Selector>, SelectorError> {
        Ok(Box::new(StringSyntax::with_tolerance(self, tolerance)?))
    }
}

impl IntoSelector for String {
    fn into_selector(self) -> Result<Box<dyn Selector>, SelectorError> {
        self.as_str().into_selector()
    }

    fn into_selector_with_tolerance(self, tolerance: f64) -> Result<Box<dyn Selector>, SelectorError> {
        self.as_str().into_selector_with_tolerance(tolerance)
    }
}
