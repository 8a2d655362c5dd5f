//! Edge geometry: lines, circular arcs, splines and polylines.

use std::f64::consts::TAU;

use chisel_math::{Transform, Vector};

use crate::GeomType;

/// Sampling density used to turn curves into polylines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Segments used for a full circle; arcs get a proportional share.
    pub segments_per_turn: u32,
    /// Segments per span between two spline interpolation points.
    pub spline_samples: u32,
}

impl Resolution {
    /// Default sampling density.
    pub const DEFAULT: Self = Self {
        segments_per_turn: 64,
        spline_samples: 8,
    };
}

impl Default for Resolution {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The geometry carried by an edge.
#[derive(Debug, Clone, PartialEq)]
pub enum Curve {
    /// Straight segment.
    Line {
        /// Start point.
        start: Vector,
        /// End point.
        end: Vector,
    },
    /// Circular arc, counter-clockwise about `normal` from `start_angle` to `end_angle`.
    ///
    /// Points are `center + radius * (cos θ * x_ref + sin θ * (normal × x_ref))`.
    Circle {
        /// Circle center.
        center: Vector,
        /// Unit axis of the circle.
        normal: Vector,
        /// Unit reference direction for angle zero, perpendicular to `normal`.
        x_ref: Vector,
        /// Radius.
        radius: f64,
        /// Start angle in radians.
        start_angle: f64,
        /// End angle in radians, greater than `start_angle`.
        end_angle: f64,
    },
    /// Interpolating (Catmull-Rom) spline through `points`.
    Spline {
        /// Interpolation points, at least two.
        points: Vec<Vector>,
    },
    /// Piecewise linear curve, used for recovered boundaries that fit no analytic curve.
    Polyline {
        /// Corner points, at least two.
        points: Vec<Vector>,
    },
}

impl Curve {
    /// Geometry tag of this curve.
    pub fn geom_type(&self) -> GeomType {
        match self {
            Curve::Line { .. } => GeomType::Line,
            Curve::Circle { .. } => GeomType::Circle,
            Curve::Spline { .. } | Curve::Polyline { .. } => GeomType::BSpline,
        }
    }

    /// Point at normalized parameter `t` in `[0, 1]`.
    pub fn point_at(&self, t: f64) -> Vector {
        let t = t.clamp(0.0, 1.0);
        match self {
            Curve::Line { start, end } => start.lerp(*end, t),
            Curve::Circle {
                start_angle,
                end_angle,
                ..
            } => self.circle_point(start_angle + (end_angle - start_angle) * t),
            Curve::Spline { points } => catmull_rom_at(points, t),
            Curve::Polyline { points } => polyline_at(points, t),
        }
    }

    /// First point of the curve.
    pub fn start(&self) -> Vector {
        self.point_at(0.0)
    }

    /// Last point of the curve.
    pub fn end(&self) -> Vector {
        self.point_at(1.0)
    }

    /// Whether this is a full circle.
    pub fn is_full_circle(&self) -> bool {
        matches!(self, Curve::Circle { start_angle, end_angle, .. } if end_angle - start_angle >= TAU - 1e-9)
    }

    fn circle_point(&self, angle: f64) -> Vector {
        match self {
            Curve::Circle {
                center,
                normal,
                x_ref,
                radius,
                ..
            } => {
                let y_ref = normal.cross(*x_ref);
                *center + (*x_ref * angle.cos() + y_ref * angle.sin()) * *radius
            }
            _ => Vector::zero(),
        }
    }

    /// Polyline approximation including both end points.
    ///
    /// A closed curve repeats its first point at the end.
    pub fn sample(&self, res: &Resolution) -> Vec<Vector> {
        match self {
            Curve::Line { start, end } => vec![*start, *end],
            Curve::Circle {
                start_angle,
                end_angle,
                ..
            } => {
                let sweep = end_angle - start_angle;
                let n = ((sweep / TAU) * res.segments_per_turn as f64).ceil().max(1.0) as usize;
                let mut pts: Vec<Vector> = (0..=n)
                    .map(|i| self.circle_point(start_angle + sweep * i as f64 / n as f64))
                    .collect();
                if self.is_full_circle() {
                    pts[n] = pts[0];
                }
                pts
            }
            Curve::Spline { points } => {
                if points.len() < 3 {
                    return points.clone();
                }
                let spans = points.len() - 1;
                let n = spans * res.spline_samples.max(1) as usize;
                (0..=n).map(|i| catmull_rom_at(points, i as f64 / n as f64)).collect()
            }
            Curve::Polyline { points } => points.clone(),
        }
    }

    /// Curve length; analytic for lines and arcs.
    pub fn length(&self) -> f64 {
        match self {
            Curve::Line { start, end } => start.distance(*end),
            Curve::Circle {
                radius,
                start_angle,
                end_angle,
                ..
            } => radius * (end_angle - start_angle),
            _ => polyline_length(&self.sample(&Resolution::DEFAULT)),
        }
    }

    /// Length-weighted centroid of the curve.
    pub fn center(&self) -> Vector {
        match self {
            Curve::Line { start, end } => start.lerp(*end, 0.5),
            Curve::Circle {
                center,
                radius,
                start_angle,
                end_angle,
                ..
            } => {
                let half = (end_angle - start_angle) / 2.0;
                if self.is_full_circle() || half.abs() < 1e-12 {
                    return *center;
                }
                let mid = self.circle_point(start_angle + half) - *center;
                *center + mid.normalized() * (radius * half.sin() / half)
            }
            _ => polyline_centroid(&self.sample(&Resolution::DEFAULT)),
        }
    }

    /// Unit tangent at normalized parameter `t`.
    pub fn tangent_at(&self, t: f64) -> Vector {
        match self {
            Curve::Line { start, end } => (*end - *start).normalized(),
            Curve::Circle { normal, center, .. } => {
                let p = self.point_at(t) - *center;
                normal.cross(p).normalized()
            }
            _ => {
                let h = 1e-4;
                let (a, b) = if t + h <= 1.0 { (t, t + h) } else { (t - h, t) };
                (self.point_at(b) - self.point_at(a)).normalized()
            }
        }
    }

    /// The same curve traversed in the opposite direction.
    pub fn reversed(&self) -> Curve {
        match self {
            Curve::Line { start, end } => Curve::Line {
                start: *end,
                end: *start,
            },
            Curve::Circle {
                center,
                normal,
                x_ref,
                radius,
                start_angle,
                end_angle,
            } => Curve::Circle {
                center: *center,
                normal: -*normal,
                x_ref: *x_ref,
                radius: *radius,
                start_angle: -end_angle,
                end_angle: -start_angle,
            },
            Curve::Spline { points } => Curve::Spline {
                points: points.iter().rev().copied().collect(),
            },
            Curve::Polyline { points } => Curve::Polyline {
                points: points.iter().rev().copied().collect(),
            },
        }
    }

    /// Apply an affine transform.
    ///
    /// Arcs stay arcs under conformal transforms and degrade to polylines otherwise.
    pub fn transformed(&self, t: &Transform) -> Curve {
        match self {
            Curve::Line { start, end } => Curve::Line {
                start: t.apply_point(*start),
                end: t.apply_point(*end),
            },
            Curve::Circle {
                center,
                normal,
                x_ref,
                radius,
                start_angle,
                end_angle,
            } => {
                if !t.is_conformal() {
                    let pts = self.sample(&Resolution::DEFAULT);
                    return Curve::Polyline {
                        points: pts.into_iter().map(|p| t.apply_point(p)).collect(),
                    };
                }
                let x = t.apply_vec(*x_ref);
                let y = t.apply_vec(normal.cross(*x_ref));
                Curve::Circle {
                    center: t.apply_point(*center),
                    normal: x.cross(y).normalized(),
                    x_ref: x.normalized(),
                    radius: radius * x.length(),
                    start_angle: *start_angle,
                    end_angle: *end_angle,
                }
            }
            Curve::Spline { points } => Curve::Spline {
                points: points.iter().map(|p| t.apply_point(*p)).collect(),
            },
            Curve::Polyline { points } => Curve::Polyline {
                points: points.iter().map(|p| t.apply_point(*p)).collect(),
            },
        }
    }
}

fn catmull_rom_at(points: &[Vector], t: f64) -> Vector {
    match points.len() {
        0 => Vector::zero(),
        1 => points[0],
        2 => points[0].lerp(points[1], t),
        n => {
            let spans = (n - 1) as f64;
            let u = t * spans;
            let i = (u.floor() as usize).min(n - 2);
            let s = u - i as f64;
            let p1 = points[i];
            let p2 = points[i + 1];
            let p0 = if i == 0 { p1 * 2.0 - p2 } else { points[i - 1] };
            let p3 = if i + 2 < n { points[i + 2] } else { p2 * 2.0 - p1 };
            let s2 = s * s;
            let s3 = s2 * s;
            (p1 * 2.0
                + (p2 - p0) * s
                + (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * s2
                + (p1 * 3.0 - p0 - p2 * 3.0 + p3) * s3)
                * 0.5
        }
    }
}

fn polyline_at(points: &[Vector], t: f64) -> Vector {
    if points.len() < 2 {
        return points.first().copied().unwrap_or_default();
    }
    let total = polyline_length(points);
    if total < f64::EPSILON {
        return points[0];
    }
    let mut remaining = t * total;
    for w in points.windows(2) {
        let len = w[0].distance(w[1]);
        if remaining <= len {
            return w[0].lerp(w[1], if len > 0.0 { remaining / len } else { 0.0 });
        }
        remaining -= len;
    }
    points[points.len() - 1]
}

pub(crate) fn polyline_length(points: &[Vector]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

pub(crate) fn polyline_centroid(points: &[Vector]) -> Vector {
    let mut acc = Vector::zero();
    let mut total = 0.0;
    for w in points.windows(2) {
        let len = w[0].distance(w[1]);
        acc = acc + w[0].lerp(w[1], 0.5) * len;
        total += len;
    }
    if total < f64::EPSILON {
        return points.first().copied().unwrap_or_default();
    }
    acc * (1.0 / total)
}
