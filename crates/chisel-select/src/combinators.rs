//! Set algebra over selector results. Membership is entity identity.

use std::collections::HashSet;

use chisel_topo::{Shape, ShapeId};

use crate::selector::Selector;

fn ids(shapes: &[Shape]) -> HashSet<ShapeId> {
    shapes.iter().map(Shape::id).collect()
}

/// Entities selected by both operands, in the left operand's order.
#[derive(Debug)]
pub struct And {
    left: Box<dyn Selector>,
    right: Box<dyn Selector>,
}

impl And {
    /// Intersection of two selectors.
    pub fn new(left: Box<dyn Selector>, right: Box<dyn Selector>) -> Self {
        Self { left, right }
    }
}

impl Selector for And {
    fn filter(&self, objects: &[Shape]) -> Vec<Shape> {
        let keep = ids(&self.right.filter(objects));
        self.left
            .filter(objects)
            .into_iter()
            .filter(|s| keep.contains(&s.id()))
            .collect()
    }
}

/// Entities selected by either operand, left first, each at most once.
#[derive(Debug)]
pub struct Sum {
    left: Box<dyn Selector>,
    right: Box<dyn Selector>,
}

impl Sum {
    /// Union of two selectors.
    pub fn new(left: Box<dyn Selector>, right: Box<dyn Selector>) -> Self {
        Self { left, right }
    }
}

impl Selector for Sum {
    fn filter(&self, objects: &[Shape]) -> Vec<Shape> {
        let mut seen = HashSet::new();
        self.left
            .filter(objects)
            .into_iter()
            .chain(self.right.filter(objects))
            .filter(|s| seen.insert(s.id()))
            .collect()
    }
}

/// Entities selected by the left operand and not by the right.
#[derive(Debug)]
pub struct Subtract {
    left: Box<dyn Selector>,
    right: Box<dyn Selector>,
}

impl Subtract {
    /// Difference of two selectors.
    pub fn new(left: Box<dyn Selector>, right: Box<dyn Selector>) -> Self {
        Self { left, right }
    }
}

impl Selector for Subtract {
    fn filter(&self, objects: &[Shape]) -> Vec<Shape> {
        let drop = ids(&self.right.filter(objects));
        self.left
            .filter(objects)
            .into_iter()
            .filter(|s| !drop.contains(&s.id()))
            .collect()
    }
}

/// Entities of the input the inner selector rejects.
#[derive(Debug)]
pub struct Inverse {
    inner: Box<dyn Selector>,
}

impl Inverse {
    /// Complement of a selector against its input.
    pub fn new(inner: Box<dyn Selector>) -> Self {
        Self { inner }
    }
}

impl Selector for Inverse {
    fn filter(&self, objects: &[Shape]) -> Vec<Shape> {
        let drop = ids(&self.inner.filter(objects));
        objects.iter().filter(|s| !drop.contains(&s.id())).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicates::{DirectionMinMax, ParallelDir, PerpendicularDir};
    use crate::selector::SelectorExt;
    use chisel_kernel_mesh::MeshKernel;
    use chisel_math::Vector;
    use chisel_topo::Kernel;

    fn cube_faces() -> Vec<Shape> {
        Shape::from(
            MeshKernel::new()
                .make_box(1.0, 1.0, 1.0, Vector::new(-0.5, -0.5, -0.5))
                .unwrap(),
        )
        .faces()
    }

    fn id_set(shapes: &[Shape]) -> HashSet<ShapeId> {
        ids(shapes)
    }

    #[test]
    fn test_and_commutes_as_sets() {
        let faces = cube_faces();
        let ab = ParallelDir::new(Vector::z_axis())
            .and(DirectionMinMax::max(Vector::z_axis()))
            .filter(&faces);
        let ba = DirectionMinMax::max(Vector::z_axis())
            .and(ParallelDir::new(Vector::z_axis()))
            .filter(&faces);
        assert_eq!(ab.len(), 1);
        assert_eq!(id_set(&ab), id_set(&ba));
    }

    #[test]
    fn test_sum_deduplicates() {
        let faces = cube_faces();
        let out = ParallelDir::new(Vector::z_axis())
            .sum(DirectionMinMax::max(Vector::z_axis()))
            .filter(&faces);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_subtract() {
        let faces = cube_faces();
        let out = PerpendicularDir::new(Vector::z_axis())
            .subtract(DirectionMinMax::max(Vector::x_axis()))
            .filter(&faces);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_double_inverse_is_identity() {
        let faces = cube_faces();
        let sel = ParallelDir::new(Vector::z_axis());
        let once = sel.invert();
        assert_eq!(once.filter(&faces).len(), 4);
        let twice = Inverse::new(once);
        let out = twice.filter(&faces);
        assert_eq!(id_set(&out), id_set(&ParallelDir::new(Vector::z_axis()).filter(&faces)));
    }
}
