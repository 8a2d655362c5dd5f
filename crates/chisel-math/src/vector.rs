use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use nalgebra::Vector3;

/// An immutable 3D vector or point.
///
/// Every operation returns a new value; nothing mutates in place.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector(Vector3<f64>);

impl Vector {
    /// Build a vector from its components.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(Vector3::new(x, y, z))
    }

    /// The zero vector.
    pub fn zero() -> Self {
        Self(Vector3::zeros())
    }

    /// Unit X.
    pub fn x_axis() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Unit Y.
    pub fn y_axis() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    /// Unit Z.
    pub fn z_axis() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    /// X component.
    pub fn x(&self) -> f64 {
        self.0.x
    }

    /// Y component.
    pub fn y(&self) -> f64 {
        self.0.y
    }

    /// Z component.
    pub fn z(&self) -> f64 {
        self.0.z
    }

    /// Components as a tuple.
    pub fn to_tuple(&self) -> (f64, f64, f64) {
        (self.0.x, self.0.y, self.0.z)
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        self.0.norm()
    }

    /// Dot product.
    pub fn dot(&self, other: Vector) -> f64 {
        self.0.dot(&other.0)
    }

    /// Cross product.
    pub fn cross(&self, other: Vector) -> Vector {
        Self(self.0.cross(&other.0))
    }

    /// Scale by a scalar.
    pub fn multiply(&self, s: f64) -> Vector {
        Self(self.0 * s)
    }

    /// Unit vector in the same direction. A zero vector stays zero.
    pub fn normalized(&self) -> Vector {
        let len = self.length();
        if len < f64::EPSILON {
            *self
        } else {
            Self(self.0 / len)
        }
    }

    /// Angle to `other` in radians, in `[0, π]`.
    pub fn angle(&self, other: Vector) -> f64 {
        self.0.angle(&other.0)
    }

    /// Distance between two points.
    pub fn distance(&self, other: Vector) -> f64 {
        (self.0 - other.0).norm()
    }

    /// Linear interpolation from `self` (t = 0) to `other` (t = 1).
    pub fn lerp(&self, other: Vector, t: f64) -> Vector {
        Self(self.0 + (other.0 - self.0) * t)
    }

    /// Component-wise minimum.
    pub fn min(&self, other: Vector) -> Vector {
        Self(self.0.inf(&other.0))
    }

    /// Component-wise maximum.
    pub fn max(&self, other: Vector) -> Vector {
        Self(self.0.sup(&other.0))
    }

    /// Any unit vector perpendicular to this one.
    pub fn any_perpendicular(&self) -> Vector {
        let n = self.normalized();
        let helper = if n.x().abs() < 0.9 {
            Vector::x_axis()
        } else {
            Vector::y_axis()
        };
        n.cross(helper).normalized()
    }

    /// The underlying nalgebra vector.
    pub fn as_na(&self) -> &Vector3<f64> {
        &self.0
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0.x, self.0.y, self.0.z)
    }
}

impl From<Vector3<f64>> for Vector {
    fn from(v: Vector3<f64>) -> Self {
        Self(v)
    }
}

impl From<Vector> for Vector3<f64> {
    fn from(v: Vector) -> Self {
        v.0
    }
}

impl From<(f64, f64)> for Vector {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y, 0.0)
    }
}

impl From<(f64, f64, f64)> for Vector {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self::new(x, y, z)
    }
}

impl From<[f64; 3]> for Vector {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, rhs: Vector) -> Vector {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, rhs: Vector) -> Vector {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;
    fn mul(self, rhs: f64) -> Vector {
        Self(self.0 * rhs)
    }
}

impl Neg for Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        Self(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_operations_return_new_values() {
        let a = Vector::new(1.0, 2.0, 3.0);
        let b = a + Vector::new(1.0, 1.0, 1.0);
        assert_eq!(a, Vector::new(1.0, 2.0, 3.0));
        assert_eq!(b, Vector::new(2.0, 3.0, 4.0));
        assert_eq!(a.multiply(2.0), Vector::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn test_cross_and_angle() {
        let c = Vector::x_axis().cross(Vector::y_axis());
        assert_eq!(c, Vector::z_axis());
        assert_relative_eq!(Vector::x_axis().angle(Vector::y_axis()), FRAC_PI_2);
    }

    #[test]
    fn test_normalized_zero_stays_zero() {
        assert_eq!(Vector::zero().normalized(), Vector::zero());
        assert_relative_eq!(Vector::new(3.0, 4.0, 0.0).normalized().length(), 1.0);
    }

    #[test]
    fn test_from_pair_sets_zero_z() {
        let v: Vector = (2.0, 5.0).into();
        assert_eq!(v.z(), 0.0);
    }

    #[test]
    fn test_any_perpendicular() {
        for v in [Vector::x_axis(), Vector::new(1.0, 1.0, 1.0), Vector::z_axis()] {
            let p = v.any_perpendicular();
            assert!(p.dot(v).abs() < 1e-12);
            assert_relative_eq!(p.length(), 1.0);
        }
    }
}
