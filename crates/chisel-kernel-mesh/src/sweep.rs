//! Linear extrusion, twisted extrusion and ruled lofts.

use chisel_math::{BoundBox, Transform, Vector};
use chisel_topo::{Curve, KernelError, KernelResult, Resolution, Surface, Wire};

use crate::build::{newell, orient_outward, FaceSeed};
use crate::edges::CONNECT_TOL;
use crate::triangulate::triangulate_with_holes;

/// A closed loop of oriented curves with their samples.
#[derive(Debug, Clone)]
pub(crate) struct ProfileLoop {
    curves: Vec<(Curve, Vec<Vector>)>,
}

impl ProfileLoop {
    pub(crate) fn from_wire(wire: &Wire, res: &Resolution) -> KernelResult<Self> {
        let curves: Vec<(Curve, Vec<Vector>)> = wire
            .ordered_curves()
            .into_iter()
            .map(|c| {
                let pts = c.sample(res);
                (c, pts)
            })
            .collect();
        let (first, last) = match (curves.first(), curves.last()) {
            (Some(f), Some(l)) => (f.0.start(), l.0.end()),
            _ => return Err(KernelError::InvalidProfile("profile wire has no edges".into())),
        };
        if first.distance(last) > CONNECT_TOL * 10.0 {
            return Err(KernelError::InvalidProfile(format!(
                "profile wire is open: starts at {first}, ends at {last}"
            )));
        }
        let lp = Self { curves };
        if lp.points().len() < 3 {
            return Err(KernelError::InvalidProfile("profile wire encloses no area".into()));
        }
        Ok(lp)
    }

    /// Loop corners, without repeating the first point.
    pub(crate) fn points(&self) -> Vec<Vector> {
        self.curves
            .iter()
            .flat_map(|(_, pts)| pts[..pts.len().saturating_sub(1)].iter().copied())
            .collect()
    }

    fn reverse(&mut self) {
        self.curves.reverse();
        for (curve, pts) in &mut self.curves {
            *curve = curve.reversed();
            pts.reverse();
        }
    }

    fn normal(&self) -> Vector {
        newell(&self.points())
    }
}

/// A planar face outline: outer loop counter-clockwise about `normal`,
/// holes clockwise.
#[derive(Debug, Clone)]
pub(crate) struct Profile {
    outer: ProfileLoop,
    inners: Vec<ProfileLoop>,
    normal: Vector,
}

impl Profile {
    pub(crate) fn new(outer: &Wire, inners: &[Wire], res: &Resolution) -> KernelResult<Self> {
        let outer = ProfileLoop::from_wire(outer, res)?;
        let n = outer.normal();
        if n.length() < 1e-12 {
            return Err(KernelError::InvalidProfile("profile is degenerate".into()));
        }
        let normal = n.normalized();
        let mut holes = Vec::with_capacity(inners.len());
        for w in inners {
            let mut lp = ProfileLoop::from_wire(w, res)?;
            if lp.normal().dot(normal) > 0.0 {
                lp.reverse();
            }
            holes.push(lp);
        }
        let profile = Self {
            outer,
            inners: holes,
            normal,
        };
        profile.check_planar()?;
        Ok(profile)
    }

    fn loops(&self) -> impl Iterator<Item = &ProfileLoop> {
        std::iter::once(&self.outer).chain(self.inners.iter())
    }

    fn check_planar(&self) -> KernelResult<()> {
        let pts: Vec<Vector> = self.loops().flat_map(|l| l.points()).collect();
        let origin = pts[0];
        let size = BoundBox::from_points(pts.iter().copied()).diagonal_length();
        let tol = 1e-6 * size.max(1.0);
        match pts.iter().find(|p| (**p - origin).dot(self.normal).abs() > tol) {
            Some(p) => Err(KernelError::InvalidProfile(format!("profile is not planar at {p}"))),
            None => Ok(()),
        }
    }

    /// Cap triangles, counter-clockwise about the profile normal.
    fn cap(&self) -> Vec<Vec<Vector>> {
        let u = self.normal.any_perpendicular();
        let v = self.normal.cross(u);
        let mut all: Vec<Vector> = self.outer.points();
        let project = |p: &Vector| (p.dot(u), p.dot(v));
        let outer2d: Vec<(f64, f64)> = all.iter().map(project).collect();
        let mut holes2d = Vec::with_capacity(self.inners.len());
        for lp in &self.inners {
            let pts = lp.points();
            holes2d.push(pts.iter().map(project).collect::<Vec<_>>());
            all.extend(pts);
        }
        triangulate_with_holes(&outer2d, &holes2d)
            .into_iter()
            .map(|[a, b, c]| vec![all[a], all[b], all[c]])
            .collect()
    }

    fn center(&self) -> Vector {
        let pts = self.outer.points();
        let n = pts.len().max(1) as f64;
        pts.iter().fold(Vector::zero(), |acc, p| acc + *p) * (1.0 / n)
    }
}

fn extruded_surface(curve: &Curve, dir: Vector) -> Surface {
    match curve {
        Curve::Line { start, end } => Surface::Plane {
            origin: *start,
            normal: (*end - *start).cross(dir).normalized(),
        },
        Curve::Circle {
            center, normal, radius, ..
        } if normal.cross(dir).length() < 1e-9 => Surface::Cylinder {
            origin: *center,
            axis: dir,
            radius: *radius,
        },
        _ => Surface::Extrusion { direction: dir },
    }
}

fn twisted_surface(curve: &Curve, axis_origin: Vector, axis: Vector, polygons: &[Vec<Vector>]) -> Surface {
    if let Curve::Circle {
        center, normal, radius, ..
    } = curve
    {
        let off = *center - axis_origin;
        let off_axis = (off - axis * off.dot(axis)).length();
        if normal.cross(axis).length() < 1e-9 && off_axis < 1e-9 {
            return Surface::Cylinder {
                origin: *center,
                axis,
                radius: *radius,
            };
        }
    }
    planar_or_freeform(polygons)
}

/// A plane when every polygon point lies on one, otherwise free-form.
fn planar_or_freeform(polygons: &[Vec<Vector>]) -> Surface {
    let all: Vec<Vector> = polygons.iter().flatten().copied().collect();
    let n = polygons
        .iter()
        .fold(Vector::zero(), |acc, p| acc + newell(p));
    if all.is_empty() || n.length() < 1e-12 {
        return Surface::BSpline;
    }
    let normal = n.normalized();
    let origin = all[0];
    let size = BoundBox::from_points(all.iter().copied()).diagonal_length();
    let tol = 1e-7 * size.max(1.0);
    if all.iter().all(|p| (*p - origin).dot(normal).abs() <= tol) {
        Surface::Plane { origin, normal }
    } else {
        Surface::BSpline
    }
}

/// Sweep a profile through a sequence of placements.
///
/// `frames[0]` places the bottom cap, the last frame the top cap.
fn sweep(profile: &Profile, frames: &[Transform], direction: Vector, twist_axis: Option<Vector>) -> Vec<FaceSeed> {
    let dir = direction.normalized();
    let first = &frames[0];
    let last = &frames[frames.len() - 1];
    let mut seeds = Vec::new();

    let cap = profile.cap();
    let base = profile.center();
    let bottom: Vec<Vec<Vector>> = cap
        .iter()
        .map(|t| t.iter().rev().map(|p| first.apply_point(*p)).collect())
        .collect();
    let top: Vec<Vec<Vector>> = cap
        .iter()
        .map(|t| t.iter().map(|p| last.apply_point(*p)).collect())
        .collect();
    seeds.push(FaceSeed::with_polygons(
        Surface::Plane {
            origin: first.apply_point(base),
            normal: -first.apply_vec(profile.normal).normalized(),
        },
        bottom,
    ));
    seeds.push(FaceSeed::with_polygons(
        Surface::Plane {
            origin: last.apply_point(base),
            normal: last.apply_vec(profile.normal).normalized(),
        },
        top,
    ));

    for lp in profile.loops() {
        for (curve, samples) in &lp.curves {
            let mut polys = Vec::new();
            for k in 0..frames.len() - 1 {
                let (fa, fb) = (&frames[k], &frames[k + 1]);
                for j in 0..samples.len() - 1 {
                    let a = fa.apply_point(samples[j]);
                    let b = fa.apply_point(samples[j + 1]);
                    let c = fb.apply_point(samples[j + 1]);
                    let d = fb.apply_point(samples[j]);
                    if twist_axis.is_some() {
                        // Twisted quads are not planar; fan around the
                        // bilinear center so the wall neither bulges nor sags.
                        let m = (a + b + c + d) * 0.25;
                        polys.push(vec![a, b, m]);
                        polys.push(vec![b, c, m]);
                        polys.push(vec![c, d, m]);
                        polys.push(vec![d, a, m]);
                    } else {
                        polys.push(vec![a, b, c, d]);
                    }
                }
            }
            let surface = match twist_axis {
                Some(center) => twisted_surface(curve, center, dir, &polys),
                None => extruded_surface(curve, dir),
            };
            seeds.push(FaceSeed::with_polygons(surface, polys));
        }
    }
    orient_outward(&mut seeds);
    seeds
}

fn check_direction(profile: &Profile, direction: Vector) -> KernelResult<()> {
    if direction.length() < 1e-12 {
        return Err(KernelError::InvalidGeometry("extrusion direction is zero".into()));
    }
    if direction.normalized().dot(profile.normal).abs() < 1e-9 {
        return Err(KernelError::InvalidGeometry(
            "extrusion direction lies in the profile plane".into(),
        ));
    }
    Ok(())
}

pub(crate) fn extrude(outer: &Wire, inners: &[Wire], direction: Vector, res: &Resolution) -> KernelResult<Vec<FaceSeed>> {
    let profile = Profile::new(outer, inners, res)?;
    check_direction(&profile, direction)?;
    let frames = [Transform::identity(), Transform::translation(direction)];
    Ok(sweep(&profile, &frames, direction, None))
}

pub(crate) fn extrude_twisted(
    outer: &Wire,
    inners: &[Wire],
    center: Vector,
    direction: Vector,
    angle_degrees: f64,
    step_degrees: f64,
    res: &Resolution,
) -> KernelResult<Vec<FaceSeed>> {
    let profile = Profile::new(outer, inners, res)?;
    check_direction(&profile, direction)?;
    if angle_degrees.abs() < 1e-12 {
        let frames = [Transform::identity(), Transform::translation(direction)];
        return Ok(sweep(&profile, &frames, direction, None));
    }
    let slices = (angle_degrees.abs() / step_degrees.max(1e-3)).ceil().max(1.0) as usize;
    let axis = direction.normalized();
    let frames: Vec<Transform> = (0..=slices)
        .map(|k| {
            let f = k as f64 / slices as f64;
            Transform::rotation_about_axis(center, axis, (angle_degrees * f).to_radians())
                .then(&Transform::translation(direction * f))
        })
        .collect();
    Ok(sweep(&profile, &frames, direction, Some(center)))
}

fn cap_of(lp: &ProfileLoop) -> KernelResult<Vec<Vec<Vector>>> {
    let n = lp.normal();
    if n.length() < 1e-12 {
        return Err(KernelError::InvalidProfile("loft section is degenerate".into()));
    }
    let profile = Profile {
        outer: lp.clone(),
        inners: Vec::new(),
        normal: n.normalized(),
    };
    profile.check_planar()?;
    Ok(profile.cap())
}

/// Points evenly spaced by arc length around a closed loop, starting at its
/// first point.
fn resample_closed(points: &[Vector], m: usize) -> Vec<Vector> {
    let n = points.len();
    let seg: Vec<f64> = (0..n).map(|i| points[i].distance(points[(i + 1) % n])).collect();
    let total: f64 = seg.iter().sum();
    let mut out = Vec::with_capacity(m);
    let mut i = 0;
    let mut walked = 0.0;
    for k in 0..m {
        let target = total * k as f64 / m as f64;
        while i < n - 1 && walked + seg[i] < target {
            walked += seg[i];
            i += 1;
        }
        let t = if seg[i] > 0.0 { (target - walked) / seg[i] } else { 0.0 };
        out.push(points[i].lerp(points[(i + 1) % n], t.clamp(0.0, 1.0)));
    }
    out
}

pub(crate) fn loft(wires: &[Wire], res: &Resolution) -> KernelResult<Vec<FaceSeed>> {
    if wires.len() < 2 {
        return Err(KernelError::InvalidGeometry(format!(
            "loft needs at least 2 sections, got {}",
            wires.len()
        )));
    }
    let mut loops = wires
        .iter()
        .map(|w| ProfileLoop::from_wire(w, res))
        .collect::<KernelResult<Vec<_>>>()?;
    let n0 = loops[0].normal();
    for lp in loops.iter_mut().skip(1) {
        if lp.normal().dot(n0) < 0.0 {
            lp.reverse();
        }
    }

    let mut seeds = Vec::new();
    let first_cap = cap_of(&loops[0])?;
    let last_cap = cap_of(&loops[loops.len() - 1])?;
    seeds.push(FaceSeed::with_polygons(
        Surface::Plane {
            origin: loops[0].points()[0],
            normal: -n0.normalized(),
        },
        first_cap.into_iter().map(|t| t.into_iter().rev().collect()).collect(),
    ));
    let nl = loops[loops.len() - 1].normal().normalized();
    seeds.push(FaceSeed::with_polygons(
        Surface::Plane {
            origin: loops[loops.len() - 1].points()[0],
            normal: nl,
        },
        last_cap,
    ));

    let same_layout = loops.iter().all(|l| l.curves.len() == loops[0].curves.len());
    for pair in loops.windows(2) {
        let (la, lb) = (&pair[0], &pair[1]);
        if same_layout {
            for ((ca, sa), (cb, sb)) in la.curves.iter().zip(lb.curves.iter()) {
                let m = sa.len().max(sb.len()).max(2) - 1;
                let at = |c: &Curve, s: usize| c.point_at(s as f64 / m as f64);
                let mut polys = Vec::with_capacity(2 * m);
                for s in 0..m {
                    let (a, b) = (at(ca, s), at(ca, s + 1));
                    let (c, d) = (at(cb, s + 1), at(cb, s));
                    polys.push(vec![a, b, c]);
                    polys.push(vec![a, c, d]);
                }
                seeds.push(FaceSeed::with_polygons(planar_or_freeform(&polys), polys));
            }
        } else {
            let (pa, pb) = (la.points(), lb.points());
            let m = pa.len().max(pb.len());
            let ra = resample_closed(&pa, m);
            let start = ra[0];
            let shift = (0..pb.len())
                .min_by(|&i, &j| {
                    pb[i]
                        .distance(start)
                        .partial_cmp(&pb[j].distance(start))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .unwrap_or(0);
            let rotated: Vec<Vector> = (0..pb.len()).map(|i| pb[(shift + i) % pb.len()]).collect();
            let rb = resample_closed(&rotated, m);
            let mut polys = Vec::with_capacity(2 * m);
            for s in 0..m {
                let t = (s + 1) % m;
                polys.push(vec![ra[s], ra[t], rb[t]]);
                polys.push(vec![ra[s], rb[t], rb[s]]);
            }
            seeds.push(FaceSeed::with_polygons(planar_or_freeform(&polys), polys));
        }
    }
    orient_outward(&mut seeds);
    Ok(seeds)
}
