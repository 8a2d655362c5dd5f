use nalgebra::{Matrix3, Matrix4, Rotation3, Unit, Vector3, Vector4};

use crate::Vector;

/// A 4x4 affine transformation matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `v`.
    pub fn translation(v: Vector) -> Self {
        Self {
            matrix: Matrix4::new_translation(v.as_na()),
        }
    }

    /// Uniform scale about the origin.
    pub fn scale(factor: f64) -> Self {
        Self {
            matrix: Matrix4::new_scaling(factor),
        }
    }

    /// Rotation about the global X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        Self::rotation_about_axis(Vector::zero(), Vector::x_axis(), angle)
    }

    /// Rotation about the global Y axis by `angle` radians.
    pub fn rotation_y(angle: f64) -> Self {
        Self::rotation_about_axis(Vector::zero(), Vector::y_axis(), angle)
    }

    /// Rotation about the global Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        Self::rotation_about_axis(Vector::zero(), Vector::z_axis(), angle)
    }

    /// Rotation by `angle` radians about the axis through `origin` along `axis`.
    ///
    /// A zero axis yields the identity.
    pub fn rotation_about_axis(origin: Vector, axis: Vector, angle: f64) -> Self {
        if axis.length() < f64::EPSILON {
            return Self::identity();
        }
        let axis = Unit::new_normalize(*axis.as_na());
        let rot = Rotation3::from_axis_angle(&axis, angle).to_homogeneous();
        let to_origin = Matrix4::new_translation(&-*origin.as_na());
        let back = Matrix4::new_translation(origin.as_na());
        Self {
            matrix: back * rot * to_origin,
        }
    }

    /// Reflection through the plane with the given normal passing through `origin`.
    pub fn mirror(origin: Vector, normal: Vector) -> Self {
        let n = normal.normalized();
        let n = *n.as_na();
        let reflect = Matrix3::identity() - 2.0 * n * n.transpose();
        let mut m = reflect.to_homogeneous();
        let o = *origin.as_na();
        let shift = o - reflect * o;
        m[(0, 3)] = shift.x;
        m[(1, 3)] = shift.y;
        m[(2, 3)] = shift.z;
        Self { matrix: m }
    }

    /// Change of basis mapping the frame `(origin, x, y, z)` to the global frame.
    ///
    /// The axes must be orthonormal; the result maps world points into the
    /// local coordinates of the frame.
    pub fn to_frame(origin: Vector, x: Vector, y: Vector, z: Vector) -> Self {
        let r = Matrix3::from_rows(&[
            x.as_na().transpose(),
            y.as_na().transpose(),
            z.as_na().transpose(),
        ]);
        let t = -(r * origin.as_na());
        let mut m = r.to_homogeneous();
        m[(0, 3)] = t.x;
        m[(1, 3)] = t.y;
        m[(2, 3)] = t.z;
        Self { matrix: m }
    }

    /// This transform followed by `other`, i.e. the matrix `other * self`.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: other.matrix * self.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: Vector) -> Vector {
        let v = self.matrix * Vector4::new(p.x(), p.y(), p.z(), 1.0);
        Vector::new(v.x, v.y, v.z)
    }

    /// Transform a direction vector (ignores translation).
    pub fn apply_vec(&self, v: Vector) -> Vector {
        let r = self.matrix * Vector4::new(v.x(), v.y(), v.z(), 0.0);
        Vector::new(r.x, r.y, r.z)
    }

    /// Transform a normal vector (inverse transpose of the linear part).
    pub fn apply_normal(&self, n: Vector) -> Vector {
        let m3 = self.linear();
        match m3.try_inverse() {
            Some(inv) => Vector::from(inv.transpose() * n.as_na()),
            None => n,
        }
    }

    /// Determinant of the linear part; negative for mirroring transforms.
    pub fn determinant(&self) -> f64 {
        self.linear().determinant()
    }

    /// Whether the linear part scales every direction by the same factor.
    pub fn is_conformal(&self) -> bool {
        let m3 = self.linear();
        let gram = m3.transpose() * m3;
        let s = gram[(0, 0)];
        (gram - Matrix3::identity() * s).abs().max() < 1e-9 * s.max(1.0)
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }

    fn linear(&self) -> Matrix3<f64> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Vector3<f64>> for Transform {
    fn from(v: Vector3<f64>) -> Self {
        Self::translation(Vector::from(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn close(a: Vector, b: Vector) -> bool {
        (a - b).length() < 1e-10
    }

    #[test]
    fn test_translation_moves_points_not_vectors() {
        let t = Transform::translation(Vector::new(10.0, 20.0, 30.0));
        assert!(close(t.apply_point(Vector::new(1.0, 2.0, 3.0)), Vector::new(11.0, 22.0, 33.0)));
        assert!(close(t.apply_vec(Vector::new(1.0, 0.0, 0.0)), Vector::x_axis()));
    }

    #[test]
    fn test_rotation_z_quarter_turn() {
        let t = Transform::rotation_z(PI / 2.0);
        assert!(close(t.apply_point(Vector::x_axis()), Vector::y_axis()));
    }

    #[test]
    fn test_rotation_about_offset_axis() {
        let t = Transform::rotation_about_axis(Vector::new(1.0, 0.0, 0.0), Vector::z_axis(), PI);
        assert!(close(t.apply_point(Vector::zero()), Vector::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_then_applies_in_reading_order() {
        let shift = Transform::translation(Vector::new(1.0, 0.0, 0.0));
        let double = Transform::scale(2.0);
        let p = Vector::new(1.0, 1.0, 1.0);
        assert!(close(double.then(&shift).apply_point(p), Vector::new(3.0, 2.0, 2.0)));
        assert!(close(shift.then(&double).apply_point(p), Vector::new(4.0, 2.0, 2.0)));
        let step = shift.then(&double);
        assert!(close(step.apply_point(p), double.apply_point(shift.apply_point(p))));
    }

    #[test]
    fn test_inverse_round_trip() {
        let t = Transform::rotation_about_axis(Vector::new(1.0, 2.0, 3.0), Vector::new(1.0, 1.0, 0.0), 0.7);
        let inv = t.inverse().unwrap();
        let p = Vector::new(4.0, -2.0, 9.0);
        assert!(close(inv.apply_point(t.apply_point(p)), p));
    }

    #[test]
    fn test_mirror_flips_determinant() {
        let m = Transform::mirror(Vector::new(1.0, 0.0, 0.0), Vector::x_axis());
        assert_relative_eq!(m.determinant(), -1.0);
        assert!(close(m.apply_point(Vector::zero()), Vector::new(2.0, 0.0, 0.0)));
        assert!(close(m.apply_normal(Vector::x_axis()), -Vector::x_axis()));
    }

    #[test]
    fn test_to_frame_maps_origin_to_zero() {
        let t = Transform::to_frame(
            Vector::new(1.0, 2.0, 3.0),
            Vector::y_axis(),
            Vector::z_axis(),
            Vector::x_axis(),
        );
        assert!(close(t.apply_point(Vector::new(1.0, 2.0, 3.0)), Vector::zero()));
        assert!(close(t.apply_point(Vector::new(1.0, 3.0, 3.0)), Vector::x_axis()));
    }

    #[test]
    fn test_conformal() {
        assert!(Transform::scale(3.0).is_conformal());
        assert!(Transform::rotation_x(0.3).is_conformal());
        let mut skew = Transform::identity();
        skew.matrix[(0, 0)] = 2.0;
        assert!(!skew.is_conformal());
    }
}
