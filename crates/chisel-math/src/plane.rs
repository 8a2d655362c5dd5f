use crate::{MathError, Tolerance, Transform, Vector};

/// A 2D coordinate system embedded in 3D space.
///
/// Holds an origin, an orthonormal basis, and the pair of transforms that
/// move coordinates in and out of the plane. `forward` maps world
/// coordinates to local ones; `reverse` is its inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    origin: Vector,
    x_dir: Vector,
    y_dir: Vector,
    z_dir: Vector,
    forward: Transform,
    reverse: Transform,
}

impl Plane {
    /// Build a plane from an origin, an x direction and a normal.
    ///
    /// `x_dir` is normalized, `z_dir = normalize(normal)` and
    /// `y_dir = normalize(normal × x_dir)`.
    pub fn new(origin: Vector, x_dir: Vector, normal: Vector) -> Result<Self, MathError> {
        if normal.length() < f64::EPSILON {
            return Err(MathError::ZeroNormal);
        }
        if x_dir.length() < f64::EPSILON {
            return Err(MathError::ZeroXDir);
        }
        let z_dir = normal.normalized();
        let x_dir = x_dir.normalized();
        let dot = x_dir.dot(z_dir);
        if dot.abs() > 1e-6 {
            return Err(MathError::NotPerpendicular(dot));
        }
        let y_dir = z_dir.cross(x_dir).normalized();
        Self::from_basis(origin, x_dir, y_dir, z_dir)
    }

    fn from_basis(origin: Vector, x_dir: Vector, y_dir: Vector, z_dir: Vector) -> Result<Self, MathError> {
        let forward = Transform::to_frame(origin, x_dir, y_dir, z_dir);
        let reverse = forward.inverse().ok_or(MathError::SingularTransform)?;
        Ok(Self {
            origin,
            x_dir,
            y_dir,
            z_dir,
            forward,
            reverse,
        })
    }

    /// A preset plane through the global origin.
    ///
    /// Accepts `XY`, `YZ`, `ZX`, `XZ`, `YX`, `ZY`, `front`, `back`, `left`,
    /// `right`, `top` and `bottom`.
    pub fn named(name: &str) -> Result<Self, MathError> {
        Self::named_at(name, Vector::zero())
    }

    /// A preset plane through `origin`. See [`Plane::named`].
    pub fn named_at(name: &str, origin: Vector) -> Result<Self, MathError> {
        let (x_dir, normal) = match name {
            "XY" | "front" => ((1.0, 0.0, 0.0), (0.0, 0.0, 1.0)),
            "YZ" => ((0.0, 1.0, 0.0), (1.0, 0.0, 0.0)),
            "ZX" => ((0.0, 0.0, 1.0), (0.0, 1.0, 0.0)),
            "XZ" => ((1.0, 0.0, 0.0), (0.0, -1.0, 0.0)),
            "YX" => ((0.0, 1.0, 0.0), (0.0, 0.0, -1.0)),
            "ZY" => ((0.0, 0.0, 1.0), (-1.0, 0.0, 0.0)),
            "back" => ((-1.0, 0.0, 0.0), (0.0, 0.0, -1.0)),
            "left" => ((0.0, 0.0, 1.0), (-1.0, 0.0, 0.0)),
            "right" => ((0.0, 0.0, -1.0), (1.0, 0.0, 0.0)),
            "top" => ((1.0, 0.0, 0.0), (0.0, 1.0, 0.0)),
            "bottom" => ((1.0, 0.0, 0.0), (0.0, -1.0, 0.0)),
            other => return Err(MathError::UnknownPlane(other.to_string())),
        };
        Self::new(origin, Vector::from(x_dir), Vector::from(normal))
    }

    /// The global XY plane.
    pub fn xy() -> Self {
        // Axis-aligned frames always invert.
        let z = Vector::z_axis();
        let x = Vector::x_axis();
        Self {
            origin: Vector::zero(),
            x_dir: x,
            y_dir: z.cross(x),
            z_dir: z,
            forward: Transform::identity(),
            reverse: Transform::identity(),
        }
    }

    /// Plane origin in world coordinates.
    pub fn origin(&self) -> Vector {
        self.origin
    }

    /// Local x axis.
    pub fn x_dir(&self) -> Vector {
        self.x_dir
    }

    /// Local y axis.
    pub fn y_dir(&self) -> Vector {
        self.y_dir
    }

    /// Plane normal.
    pub fn z_dir(&self) -> Vector {
        self.z_dir
    }

    /// World to local transform.
    pub fn forward(&self) -> &Transform {
        &self.forward
    }

    /// Local to world transform.
    pub fn reverse(&self) -> &Transform {
        &self.reverse
    }

    /// Express a world point in plane-local coordinates.
    pub fn to_local_coords(&self, p: impl Into<Vector>) -> Vector {
        self.forward.apply_point(p.into())
    }

    /// Express a plane-local point in world coordinates.
    pub fn to_world_coords(&self, p: impl Into<Vector>) -> Vector {
        self.reverse.apply_point(p.into())
    }

    /// Same orientation, origin moved to the local point `(x, y)`.
    pub fn set_origin_2d(&self, x: f64, y: f64) -> Result<Self, MathError> {
        let origin = self.to_world_coords((x, y));
        self.with_origin(origin)
    }

    /// Same orientation, origin moved to the world point `origin`.
    pub fn with_origin(&self, origin: Vector) -> Result<Self, MathError> {
        Self::from_basis(origin, self.x_dir, self.y_dir, self.z_dir)
    }

    /// Rotate the x direction and normal about global X, then Y, then Z.
    ///
    /// Angles are in degrees; the origin is unchanged.
    pub fn rotated(&self, degrees: impl Into<Vector>) -> Result<Self, MathError> {
        let r = degrees.into().multiply(std::f64::consts::PI / 180.0);
        let m = Transform::rotation_x(r.x())
            .then(&Transform::rotation_y(r.y()))
            .then(&Transform::rotation_z(r.z()));
        Self::new(self.origin, m.apply_vec(self.x_dir), m.apply_vec(self.z_dir))
    }

    /// Whether `other` has the same normal direction and lies in the same plane.
    ///
    /// Normals are compared against the angular tolerance, the offset along
    /// the normal against the linear one.
    pub fn is_coplanar(&self, other: &Plane, tolerance: &Tolerance) -> bool {
        self.z_dir.dot(other.z_dir) > 0.0
            && self.z_dir.cross(other.z_dir).length() < tolerance.angular
            && tolerance.is_zero((other.origin - self.origin).dot(self.z_dir))
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::xy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn close(a: Vector, b: Vector) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let p = Plane::new(Vector::new(1.0, 2.0, 3.0), Vector::new(2.0, 0.0, 0.0), Vector::new(0.0, 0.0, 5.0)).unwrap();
        assert!(close(p.x_dir(), Vector::x_axis()));
        assert!(close(p.y_dir(), Vector::y_axis()));
        assert!(close(p.z_dir(), Vector::z_axis()));
    }

    #[test]
    fn test_zero_normal_rejected() {
        let err = Plane::new(Vector::zero(), Vector::x_axis(), Vector::zero()).unwrap_err();
        assert_eq!(err, MathError::ZeroNormal);
        assert!(Plane::new(Vector::zero(), Vector::zero(), Vector::z_axis()).is_err());
        assert!(matches!(
            Plane::new(Vector::zero(), Vector::new(1.0, 0.0, 1.0), Vector::z_axis()),
            Err(MathError::NotPerpendicular(_))
        ));
    }

    #[test]
    fn test_round_trip_local_world() {
        let p = Plane::new(
            Vector::new(3.0, -1.0, 2.0),
            Vector::new(0.0, 1.0, 1.0),
            Vector::new(1.0, 0.0, 0.0),
        )
        .unwrap();
        for (x, y) in [(0.0, 0.0), (1.5, -2.0), (-7.0, 0.25)] {
            let back = p.to_local_coords(p.to_world_coords((x, y)));
            assert!(close(back, Vector::new(x, y, 0.0)));
        }
    }

    #[test]
    fn test_named_planes() {
        let xz = Plane::named("XZ").unwrap();
        assert!(close(xz.z_dir(), Vector::new(0.0, -1.0, 0.0)));
        assert!(close(xz.y_dir(), Vector::z_axis()));

        let right = Plane::named("right").unwrap();
        assert!(close(right.z_dir(), Vector::x_axis()));
        assert!(close(right.x_dir(), Vector::new(0.0, 0.0, -1.0)));

        assert!(matches!(Plane::named("diagonal"), Err(MathError::UnknownPlane(_))));
    }

    #[test]
    fn test_all_named_planes_right_handed() {
        for name in ["XY", "YZ", "ZX", "XZ", "YX", "ZY", "front", "back", "left", "right", "top", "bottom"] {
            let p = Plane::named(name).unwrap();
            assert_relative_eq!(p.x_dir().cross(p.y_dir()).dot(p.z_dir()), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_set_origin_2d_uses_local_axes() {
        let p = Plane::named("YZ").unwrap();
        let moved = p.set_origin_2d(2.0, 3.0).unwrap();
        assert!(close(moved.origin(), Vector::new(0.0, 2.0, 3.0)));
        assert!(close(moved.to_world_coords((0.0, 0.0)), moved.origin()));
        assert_eq!(moved.x_dir(), p.x_dir());
    }

    #[test]
    fn test_rotated_about_x() {
        let p = Plane::xy().rotated((90.0, 0.0, 0.0)).unwrap();
        assert!(close(p.x_dir(), Vector::x_axis()));
        assert!(close(p.z_dir(), Vector::new(0.0, -1.0, 0.0)));
        assert_eq!(p.origin(), Vector::zero());
    }

    #[test]
    fn test_rotation_order_x_then_z() {
        let p = Plane::xy().rotated((90.0, 0.0, 90.0)).unwrap();
        // normal: +Z -> -Y (about X) -> +X (about Z)
        assert!(close(p.z_dir(), Vector::x_axis()));
    }

    #[test]
    fn test_coplanar() {
        let a = Plane::xy();
        let b = a.set_origin_2d(5.0, 5.0).unwrap();
        let c = Plane::named_at("XY", Vector::new(0.0, 0.0, 1.0)).unwrap();
        let tol = Tolerance::DEFAULT;
        assert!(a.is_coplanar(&b, &tol));
        assert!(!a.is_coplanar(&c, &tol));
    }

    #[test]
    fn test_flipped_plane_is_not_coplanar() {
        let up = Plane::xy();
        let down = Plane::new(Vector::new(3.0, 1.0, 0.0), Vector::x_axis(), -Vector::z_axis()).unwrap();
        let tilted = Plane::new(Vector::zero(), Vector::x_axis(), Vector::new(0.0, 1e-3, 1.0)).unwrap();
        assert!(!up.is_coplanar(&down, &Tolerance::DEFAULT));
        assert!(!up.is_coplanar(&tilted, &Tolerance::DEFAULT));
        let loose = Tolerance {
            linear: 1e-4,
            angular: 1e-2,
        };
        assert!(up.is_coplanar(&tilted, &loose));
    }
}
