//! State shared by every node of one chain.

use chisel_math::{Tolerance, Vector};
use chisel_topo::{Edge, ShapeId, Wire};

/// Pending sketch geometry and the anchor of the profile being drawn.
///
/// One context exists per chain. It is never copied when a node is derived;
/// every node sees the same instance.
#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    pending_edges: Vec<Edge>,
    pending_wires: Vec<Wire>,
    first_point: Option<Vector>,
    tolerance: Tolerance,
}

impl BuildContext {
    /// Empty context with the given linear tolerance and the default
    /// angular one.
    pub fn new(linear_tolerance: f64) -> Self {
        Self {
            tolerance: Tolerance {
                linear: linear_tolerance,
                ..Tolerance::DEFAULT
            },
            ..Self::default()
        }
    }

    /// Tolerances for point and plane comparisons while sketching.
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Start point of the first edge drawn since the last wire.
    pub fn first_point(&self) -> Option<Vector> {
        self.first_point
    }

    /// Edges not yet assembled into a wire.
    pub fn pending_edges(&self) -> &[Edge] {
        &self.pending_edges
    }

    /// Wires not yet consumed by a solid operation.
    pub fn pending_wires(&self) -> &[Wire] {
        &self.pending_wires
    }

    /// Queue an edge; the first one anchors the profile.
    pub fn add_pending_edge(&mut self, edge: Edge) {
        if self.first_point.is_none() {
            self.first_point = Some(edge.start_point());
        }
        self.pending_edges.push(edge);
    }

    /// Queue a wire.
    pub fn add_pending_wire(&mut self, wire: Wire) {
        self.pending_wires.push(wire);
    }

    /// Drop the pending edges after they were assembled, and release the
    /// anchor so the next profile starts fresh.
    pub(crate) fn clear_pending_edges(&mut self) {
        self.pending_edges.clear();
        self.first_point = None;
    }

    pub(crate) fn clear_pending_wires(&mut self) {
        self.pending_wires.clear();
    }

    /// Forget pending entries whose id is in `ids`.
    pub(crate) fn forget(&mut self, ids: &[ShapeId]) {
        self.pending_edges.retain(|e| !ids.contains(&e.id()));
        self.pending_wires.retain(|w| !ids.contains(&w.id()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chisel_topo::Curve;

    fn line(a: (f64, f64), b: (f64, f64)) -> Edge {
        Edge::from_curve(Curve::Line {
            start: a.into(),
            end: b.into(),
        })
    }

    #[test]
    fn test_first_edge_sets_anchor() {
        let mut ctx = BuildContext::new(1e-4);
        assert!(ctx.first_point().is_none());
        ctx.add_pending_edge(line((1.0, 2.0), (3.0, 2.0)));
        ctx.add_pending_edge(line((3.0, 2.0), (3.0, 5.0)));
        assert_eq!(ctx.first_point(), Some(Vector::new(1.0, 2.0, 0.0)));
        assert_eq!(ctx.pending_edges().len(), 2);
    }

    #[test]
    fn test_clearing_edges_releases_anchor() {
        let mut ctx = BuildContext::new(1e-4);
        ctx.add_pending_edge(line((0.0, 0.0), (1.0, 0.0)));
        ctx.clear_pending_edges();
        assert!(ctx.pending_edges().is_empty());
        assert!(ctx.first_point().is_none());
        ctx.add_pending_edge(line((5.0, 0.0), (6.0, 0.0)));
        assert_eq!(ctx.first_point(), Some(Vector::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn test_forget_by_id() {
        let mut ctx = BuildContext::new(1e-4);
        let a = line((0.0, 0.0), (1.0, 0.0));
        let b = line((1.0, 0.0), (1.0, 1.0));
        ctx.add_pending_edge(a.clone());
        ctx.add_pending_edge(b.clone());
        ctx.forget(&[a.id()]);
        assert_eq!(ctx.pending_edges().len(), 1);
        assert_eq!(ctx.pending_edges()[0].id(), b.id());
    }
}
