//! Spatial-hash vertex welding.

use std::collections::HashMap;

use chisel_math::Vector;

/// Deduplicates points closer than a tolerance, handing out stable indices.
pub(crate) struct VertexPool {
    tol: f64,
    points: Vec<Vector>,
    grid: HashMap<(i64, i64, i64), Vec<usize>>,
}

impl VertexPool {
    pub(crate) fn new(tol: f64) -> Self {
        Self {
            tol: tol.max(1e-12),
            points: Vec::new(),
            grid: HashMap::new(),
        }
    }

    fn cell(&self, p: Vector) -> (i64, i64, i64) {
        (
            (p.x() / self.tol).floor() as i64,
            (p.y() / self.tol).floor() as i64,
            (p.z() / self.tol).floor() as i64,
        )
    }

    /// Index of an existing point within tolerance, or of `p` newly added.
    pub(crate) fn insert(&mut self, p: Vector) -> usize {
        let (cx, cy, cz) = self.cell(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(ids) = self.grid.get(&(cx + dx, cy + dy, cz + dz)) {
                        if let Some(&i) = ids.iter().find(|&&i| self.points[i].distance(p) <= self.tol) {
                            return i;
                        }
                    }
                }
            }
        }
        let i = self.points.len();
        self.points.push(p);
        self.grid.entry((cx, cy, cz)).or_default().push(i);
        i
    }

    pub(crate) fn points(&self) -> &[Vector] {
        &self.points
    }

    pub(crate) fn tolerance(&self) -> f64 {
        self.tol
    }
}
