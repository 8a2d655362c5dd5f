use crate::Vector;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundBox {
    /// Minimum corner.
    pub min: Vector,
    /// Maximum corner.
    pub max: Vector,
}

impl BoundBox {
    /// An empty (inverted) box; including any point makes it valid.
    pub fn empty() -> Self {
        Self {
            min: Vector::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Vector::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Box spanning two corners given in any order.
    pub fn from_corners(a: Vector, b: Vector) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest box containing all `points`.
    pub fn from_points<I: IntoIterator<Item = Vector>>(points: I) -> Self {
        points.into_iter().fold(Self::empty(), |bb, p| bb.including(p))
    }

    /// Whether no point has been included yet.
    pub fn is_empty(&self) -> bool {
        self.min.x() > self.max.x() || self.min.y() > self.max.y() || self.min.z() > self.max.z()
    }

    /// This box grown to contain `p`.
    pub fn including(&self, p: Vector) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// Union of two boxes.
    pub fn union(&self, other: &BoundBox) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Box grown by `d` on every side.
    pub fn enlarged(&self, d: f64) -> Self {
        let e = Vector::new(d, d, d);
        Self {
            min: self.min - e,
            max: self.max + e,
        }
    }

    /// Extent along X.
    pub fn xlen(&self) -> f64 {
        self.max.x() - self.min.x()
    }

    /// Extent along Y.
    pub fn ylen(&self) -> f64 {
        self.max.y() - self.min.y()
    }

    /// Extent along Z.
    pub fn zlen(&self) -> f64 {
        self.max.z() - self.min.z()
    }

    /// Center of the box.
    pub fn center(&self) -> Vector {
        self.min.lerp(self.max, 0.5)
    }

    /// Length of the main diagonal.
    pub fn diagonal_length(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        (self.max - self.min).length()
    }

    /// Whether `p` lies strictly inside the box.
    pub fn contains_point(&self, p: Vector) -> bool {
        p.x() > self.min.x()
            && p.x() < self.max.x()
            && p.y() > self.min.y()
            && p.y() < self.max.y()
            && p.z() > self.min.z()
            && p.z() < self.max.z()
    }

    /// Whether `other` lies strictly inside this box in all three axes.
    pub fn contains(&self, other: &BoundBox) -> bool {
        self.contains_xy(other) && other.min.z() > self.min.z() && other.max.z() < self.max.z()
    }

    /// Whether `other` lies strictly inside this box in X and Y, ignoring Z.
    pub fn contains_xy(&self, other: &BoundBox) -> bool {
        other.min.x() > self.min.x()
            && other.max.x() < self.max.x()
            && other.min.y() > self.min.y()
            && other.max.y() < self.max.y()
    }
}

impl Default for BoundBox {
    fn default() -> Self {
        Self::empty()
    }
}
