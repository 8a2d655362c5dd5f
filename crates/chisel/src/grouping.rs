//! Grouping of closed profile wires into faces: each group is an outer wire
//! followed by the holes it contains.

use chisel_math::Plane;
use chisel_topo::{PlaneExt, Wire};
use tracing::warn;

/// Sort `wires` into `[outer, hole, hole, ...]` groups.
///
/// The first remaining wire always opens a new group and claims every later
/// wire that lies inside it. Containment is judged on plane-local bounding
/// boxes, so nested islands and some concave outlines group incorrectly.
/// Open wires cannot bound a face and are skipped.
pub fn sort_wires_by_build_order(wires: &[Wire], plane: &Plane) -> Vec<Vec<Wire>> {
    let mut remaining: Vec<Wire> = wires
        .iter()
        .filter(|w| {
            if !w.is_closed() {
                warn!(wire = %w.id(), "skipping open wire");
            }
            w.is_closed()
        })
        .cloned()
        .collect();

    let mut groups = Vec::new();
    while !remaining.is_empty() {
        let outer = remaining.remove(0);
        let (inside, rest): (Vec<Wire>, Vec<Wire>) =
            remaining.into_iter().partition(|w| plane.is_wire_inside(&outer, w));
        let mut group = Vec::with_capacity(inside.len() + 1);
        group.push(outer);
        group.extend(inside);
        groups.push(group);
        remaining = rest;
    }
    groups
}
