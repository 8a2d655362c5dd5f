//! Triangulation of planar loops with holes, on top of `earcutr`.

use tracing::warn;

/// Signed area of a 2D polygon (positive when counter-clockwise).
pub(crate) fn polygon_area_2d(pts: &[(f64, f64)]) -> f64 {
    let n = pts.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += pts[i].0 * pts[j].1 - pts[j].0 * pts[i].1;
    }
    area / 2.0
}

/// Triangulate an outer loop with holes.
///
/// `outer` must be counter-clockwise and every hole clockwise. Returned
/// triangles index the concatenation `outer ++ holes[0] ++ holes[1] ...`
/// and wind counter-clockwise. Holes with fewer than three points are
/// skipped but keep their slots in the index space.
pub(crate) fn triangulate_with_holes(outer: &[(f64, f64)], holes: &[Vec<(f64, f64)>]) -> Vec<[usize; 3]> {
    if outer.len() < 3 {
        return Vec::new();
    }

    // earcutr wants one flat coordinate list plus the start of every hole.
    let mut coords: Vec<f64> = Vec::with_capacity(2 * (outer.len() + holes.iter().map(Vec::len).sum::<usize>()));
    let mut hole_starts = Vec::with_capacity(holes.len());
    let mut index_map: Vec<usize> = (0..outer.len()).collect();
    coords.extend(outer.iter().flat_map(|p| [p.0, p.1]));
    let mut offset = outer.len();
    for hole in holes {
        if hole.len() >= 3 {
            hole_starts.push(index_map.len());
            index_map.extend(offset..offset + hole.len());
            coords.extend(hole.iter().flat_map(|p| [p.0, p.1]));
        }
        offset += hole.len();
    }

    let flat = match earcutr::earcut(&coords, &hole_starts, 2) {
        Ok(flat) => flat,
        Err(_) => {
            warn!(vertices = index_map.len(), holes = hole_starts.len(), "triangulation failed");
            return Vec::new();
        }
    };

    let point = |i: usize| (coords[2 * i], coords[2 * i + 1]);
    flat.chunks_exact(3)
        .filter_map(|t| {
            let area = polygon_area_2d(&[point(t[0]), point(t[1]), point(t[2])]);
            let [a, b, c] = [index_map[t[0]], index_map[t[1]], index_map[t[2]]];
            if area > 1e-14 {
                Some([a, b, c])
            } else if area < -1e-14 {
                Some([a, c, b])
            } else {
                None
            }
        })
        .collect()
}
