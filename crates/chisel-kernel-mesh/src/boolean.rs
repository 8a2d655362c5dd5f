//! Boolean operations on solids.
//!
//! Operands are reduced to their face triangles, each tagged with the face
//! it came from, combined with a BSP tree, and regrouped by tag into face
//! seeds for topology recovery. Faces therefore keep their surface type
//! through a boolean: a cylinder cut into a block stays a cylinder.

use std::collections::BTreeMap;

use chisel_math::Vector;
use chisel_topo::{Compound, KernelError, KernelResult, Shape, Shell, Solid, Surface};
use tracing::trace;

use crate::bsp::{self, Polygon};
use crate::build::{build_shells, newell, BuildOptions, FaceSeed};

/// Which boolean to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BooleanOp {
    Union,
    Difference,
    Intersection,
}

fn solid_polygons(solid: &Solid, surfaces: &mut Vec<Surface>) -> Vec<Polygon> {
    let mut out = Vec::new();
    for face in solid.faces() {
        let tag = surfaces.len();
        surfaces.push(face.surface().clone());
        out.extend(
            face.triangles()
                .iter()
                .filter_map(|tri| Polygon::new(tri.to_vec(), tag)),
        );
    }
    out
}

/// All solids of `shape` merged into one polygon set.
fn operand_polygons(shape: &Shape, surfaces: &mut Vec<Surface>, eps: f64) -> KernelResult<Vec<Polygon>> {
    let mut solids = shape.solids().into_iter().filter_map(|s| s.as_solid().cloned());
    let first = solids
        .next()
        .ok_or_else(|| KernelError::BooleanFailed(format!("{} operand has no solids", shape.kind())))?;
    let mut acc = solid_polygons(&first, surfaces);
    for solid in solids {
        let next = solid_polygons(&solid, surfaces);
        acc = bsp::union(acc, next, eps);
    }
    Ok(acc)
}

fn shell_volume(shell: &Shell) -> f64 {
    shell
        .faces()
        .iter()
        .flat_map(|f| f.triangles().iter())
        .map(|[a, b, c]| a.dot(b.cross(*c)))
        .sum::<f64>()
        / 6.0
}

/// Group shells into solids: every inward-facing shell is a cavity of the
/// outward shell that encloses it.
pub(crate) fn solids_from_shells(shells: Vec<Shell>) -> Vec<Solid> {
    let (outer, voids): (Vec<Shell>, Vec<Shell>) = shells.into_iter().partition(|s| shell_volume(s) >= 0.0);
    let mut groups: Vec<Vec<Shell>> = outer.into_iter().map(|s| vec![s]).collect();
    for void in voids {
        let bb = Shape::from(void.clone()).bounding_box();
        let host = groups
            .iter()
            .position(|g| Shape::from(g[0].clone()).bounding_box().contains(&bb));
        match host {
            Some(i) => groups[i].push(void),
            None => groups.push(vec![void]),
        }
    }
    groups.into_iter().map(Solid::new).collect()
}

pub(crate) fn run(op: BooleanOp, a: &Shape, b: &Shape, eps: f64, opts: BuildOptions) -> KernelResult<Shape> {
    let mut surfaces = Vec::new();
    let pa = operand_polygons(a, &mut surfaces, eps)?;
    let pb = operand_polygons(b, &mut surfaces, eps)?;
    trace!(?op, left = pa.len(), right = pb.len(), "boolean operands");

    let result = match op {
        BooleanOp::Union => bsp::union(pa, pb, eps),
        BooleanOp::Difference => bsp::subtract(pa, pb, eps),
        BooleanOp::Intersection => bsp::intersect(pa, pb, eps),
    };
    if result.is_empty() {
        return Ok(Shape::Compound(Compound::new(Vec::new())));
    }

    let mut by_tag: BTreeMap<usize, Vec<Vec<Vector>>> = BTreeMap::new();
    for poly in result {
        by_tag.entry(poly.tag).or_default().push(poly.vertices);
    }
    let seeds: Vec<FaceSeed> = by_tag
        .into_iter()
        .map(|(tag, polygons)| {
            let mut surface = surfaces[tag].clone();
            // Faces taken from the subtracted operand come back inverted.
            if let Surface::Plane { normal, .. } = &surface {
                if newell(&polygons[0]).dot(*normal) < 0.0 {
                    surface = surface.flipped();
                }
            }
            FaceSeed::with_polygons(surface, polygons)
        })
        .collect();

    let shells = build_shells(seeds, opts).map_err(|e| KernelError::BooleanFailed(e.to_string()))?;
    let mut solids = solids_from_shells(shells);
    trace!(?op, solids = solids.len(), "boolean result");
    Ok(if solids.len() == 1 {
        Shape::Solid(solids.remove(0))
    } else {
        Shape::Compound(Compound::new(solids.into_iter().map(Shape::Solid).collect()))
    })
}
