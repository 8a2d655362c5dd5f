//! Values held on a node's stack.

use chisel_math::Vector;
use chisel_topo::{Compound, Edge, Face, Shape, Solid, Vertex, Wire};

use crate::error::{ChiselError, ChiselResult};
use crate::Workplane;

/// One stack entry: a topological entity or a bare point.
#[derive(Debug, Clone)]
pub enum StackItem {
    /// A shape.
    Shape(Shape),
    /// A point in world coordinates.
    Vector(Vector),
}

impl StackItem {
    /// The point itself, or the shape's center of mass.
    pub fn center(&self) -> Vector {
        match self {
            StackItem::Shape(s) => s.center(),
            StackItem::Vector(v) => *v,
        }
    }

    /// The shape, if this item is one.
    pub fn as_shape(&self) -> Option<&Shape> {
        match self {
            StackItem::Shape(s) => Some(s),
            StackItem::Vector(_) => None,
        }
    }

    /// The point, if this item is one.
    pub fn as_vector(&self) -> Option<Vector> {
        match self {
            StackItem::Vector(v) => Some(*v),
            StackItem::Shape(_) => None,
        }
    }

    /// Whether both items are the same entity (or equal points).
    pub fn same_as(&self, other: &StackItem) -> bool {
        match (self, other) {
            (StackItem::Shape(a), StackItem::Shape(b)) => a.same_as(b),
            (StackItem::Vector(a), StackItem::Vector(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Shape> for StackItem {
    fn from(s: Shape) -> Self {
        StackItem::Shape(s)
    }
}

impl From<Vector> for StackItem {
    fn from(v: Vector) -> Self {
        StackItem::Vector(v)
    }
}

macro_rules! impl_item_from_handle {
    ($($ty:ident),*) => {
        $(
            impl From<$ty> for StackItem {
                fn from(h: $ty) -> Self {
                    StackItem::Shape(Shape::from(h))
                }
            }
        )*
    };
}

impl_item_from_handle!(Vertex, Edge, Wire, Face, Solid, Compound);

/// Anything [`Workplane::add`] accepts.
pub trait IntoStackItems {
    /// The items to append.
    fn into_stack_items(self) -> Vec<StackItem>;
}

impl IntoStackItems for StackItem {
    fn into_stack_items(self) -> Vec<StackItem> {
        vec![self]
    }
}

impl IntoStackItems for Shape {
    fn into_stack_items(self) -> Vec<StackItem> {
        vec![self.into()]
    }
}

impl IntoStackItems for Solid {
    fn into_stack_items(self) -> Vec<StackItem> {
        vec![self.into()]
    }
}

impl IntoStackItems for Vector {
    fn into_stack_items(self) -> Vec<StackItem> {
        vec![self.into()]
    }
}

impl IntoStackItems for Vec<StackItem> {
    fn into_stack_items(self) -> Vec<StackItem> {
        self
    }
}

impl IntoStackItems for Vec<Shape> {
    fn into_stack_items(self) -> Vec<StackItem> {
        self.into_iter().map(StackItem::Shape).collect()
    }
}

impl IntoStackItems for &Workplane {
    fn into_stack_items(self) -> Vec<StackItem> {
        self.vals()
    }
}

/// The second operand of a boolean: a shape, or the solids on another
/// chain's stack.
pub trait IntoShape {
    /// Resolve to one shape.
    fn into_shape(self) -> ChiselResult<Shape>;
}

impl IntoShape for Shape {
    fn into_shape(self) -> ChiselResult<Shape> {
        Ok(self)
    }
}

impl IntoShape for &Shape {
    fn into_shape(self) -> ChiselResult<Shape> {
        Ok(self.clone())
    }
}

impl IntoShape for Solid {
    fn into_shape(self) -> ChiselResult<Shape> {
        Ok(Shape::Solid(self))
    }
}

impl IntoShape for &Workplane {
    /// The single solid on the stack, or a compound of all of them.
    fn into_shape(self) -> ChiselResult<Shape> {
        let mut solids: Vec<Shape> = self
            .vals()
            .into_iter()
            .filter_map(|item| match item {
                StackItem::Shape(s) if s.has_solids() => Some(s),
                _ => None,
            })
            .collect();
        match solids.len() {
            0 => Err(ChiselError::NoSolidFound),
            1 => Ok(solids.remove(0)),
            _ => Ok(Shape::Compound(Compound::new(solids))),
        }
    }
}
