use crate::{GeometryError, Result};

/// Intersections closer to the segment start than this fraction are skipped;
/// after a reflection the segment starts exactly on the surface.
const SKIN: f64 = 1e-9;

pub(crate) fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub(crate) fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub(crate) fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[derive(Clone, Copy, Debug)]
struct Triangle {
    vertices: [[f64; 3]; 3],
    /// Outward unit normal, from the counter-clockwise winding.
    normal: [f64; 3],
}

impl Triangle {
    fn new(vertices: [[f64; 3]; 3]) -> Option<Self> {
        let n = cross(
            sub(vertices[1], vertices[0]),
            sub(vertices[2], vertices[0]),
        );
        let len = dot(n, n).sqrt();
        if len == 0.0 {
            return None;
        }
        Some(Self {
            vertices,
            normal: [n[0] / len, n[1] / len, n[2] / len],
        })
    }

    /// Möller–Trumbore, restricted to the segment parameter s ∈ (SKIN, 1].
    fn intersect_segment(&self, p1: [f64; 3], dir: [f64; 3]) -> Option<f64> {
        let e1 = sub(self.vertices[1], self.vertices[0]);
        let e2 = sub(self.vertices[2], self.vertices[0]);
        let pvec = cross(dir, e2);
        let det = dot(e1, pvec);
        if det.abs() < 1e-300 {
            return None;
        }
        let inv_det = 1.0 / det;
        let tvec = sub(p1, self.vertices[0]);
        let u = dot(tvec, pvec) * inv_det;
        if !(-1e-12..=1.0 + 1e-12).contains(&u) {
            return None;
        }
        let qvec = cross(tvec, e1);
        let v = dot(dir, qvec) * inv_det;
        if v < -1e-12 || u + v > 1.0 + 1e-12 {
            return None;
        }
        let s = dot(e2, qvec) * inv_det;
        (s > SKIN && s <= 1.0).then_some(s)
    }
}

/// A triangle soup with a precomputed bounding box.
///
/// The mesh is an opaque collision oracle: the integrator only ever asks for
/// the ordered intersections of a line segment.
pub struct Mesh {
    triangles: Vec<Triangle>,
    lo: [f64; 3],
    hi: [f64; 3],
}

impl Mesh {
    /// Builds a mesh from raw triangles. Degenerate triangles are dropped; a
    /// mesh with none left is an error.
    pub fn from_triangles(triangles: &[[[f64; 3]; 3]]) -> Result<Self> {
        let triangles: Vec<Triangle> =
            triangles.iter().filter_map(|t| Triangle::new(*t)).collect();
        if triangles.is_empty() {
            return Err(GeometryError::EmptyMesh);
        }
        let mut lo = [f64::INFINITY; 3];
        let mut hi = [f64::NEG_INFINITY; 3];
        for t in &triangles {
            for v in &t.vertices {
                for a in 0..3 {
                    lo[a] = lo[a].min(v[a]);
                    hi[a] = hi[a].max(v[a]);
                }
            }
        }
        Ok(Self { triangles, lo, hi })
    }

    /// An axis-aligned box between the two corners, wound outward.
    pub fn cuboid(lo: [f64; 3], hi: [f64; 3]) -> Self {
        let v = |mask: usize| {
            [
                if mask & 1 == 0 { lo[0] } else { hi[0] },
                if mask & 2 == 0 { lo[1] } else { hi[1] },
                if mask & 4 == 0 { lo[2] } else { hi[2] },
            ]
        };
        // Two triangles per face, counter-clockwise seen from outside.
        let quads = [
            [0, 4, 6, 2], // x = lo
            [1, 3, 7, 5], // x = hi
            [0, 1, 5, 4], // y = lo
            [2, 6, 7, 3], // y = hi
            [0, 2, 3, 1], // z = lo
            [4, 5, 7, 6], // z = hi
        ];
        let mut triangles = Vec::with_capacity(12);
        for q in quads {
            triangles.push([v(q[0]), v(q[1]), v(q[2])]);
            triangles.push([v(q[0]), v(q[2]), v(q[3])]);
        }
        // A box built from two distinct corners always has 12 triangles.
        Self::from_triangles(&triangles).unwrap()
    }

    pub fn bounds(&self) -> ([f64; 3], [f64; 3]) {
        (self.lo, self.hi)
    }

    /// Appends every (s, outward normal) intersection of the segment
    /// p1 → p2, unordered.
    pub(crate) fn segment_hits(
        &self,
        p1: [f64; 3],
        p2: [f64; 3],
        hits: &mut Vec<(f64, [f64; 3])>,
    ) {
        // Cheap reject: segment box against mesh box.
        for a in 0..3 {
            if p1[a].max(p2[a]) < self.lo[a] || p1[a].min(p2[a]) > self.hi[a] {
                return;
            }
        }
        let dir = sub(p2, p1);
        for triangle in &self.triangles {
            if let Some(s) = triangle.intersect_segment(p1, dir) {
                hits.push((s, triangle.normal));
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cuboid_winding_is_outward() {
        let mesh = Mesh::cuboid([0.0; 3], [1.0; 3]);
        assert_eq!(mesh.triangles.len(), 12);
        // Every normal must point away from the center.
        for t in &mesh.triangles {
            let centroid = [
                (t.vertices[0][0] + t.vertices[1][0] + t.vertices[2][0]) / 3.0 - 0.5,
                (t.vertices[0][1] + t.vertices[1][1] + t.vertices[2][1]) / 3.0 - 0.5,
                (t.vertices[0][2] + t.vertices[1][2] + t.vertices[2][2]) / 3.0 - 0.5,
            ];
            assert!(dot(centroid, t.normal) > 0.0, "inward normal {:?}", t.normal);
        }
    }

    #[test]
    fn test_segment_hits() {
        let mesh = Mesh::cuboid([0.0; 3], [1.0; 3]);
        let mut hits = Vec::new();
        mesh.segment_hits([-0.5, 0.5, 0.5], [0.5, 0.5, 0.5], &mut hits);
        assert_eq!(hits.len(), 1);
        let (s, n) = hits[0];
        assert!((s - 0.5).abs() < 1e-12);
        assert_eq!(n, [-1.0, 0.0, 0.0]);

        // Passing through both walls.
        hits.clear();
        mesh.segment_hits([-0.5, 0.5, 0.5], [1.5, 0.5, 0.5], &mut hits);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_segment_start_on_surface_is_skipped() {
        let mesh = Mesh::cuboid([0.0; 3], [1.0; 3]);
        let mut hits = Vec::new();
        // Starts exactly on the x = 0 face, moving away from the box.
        mesh.segment_hits([0.0, 0.5, 0.5], [-1.0, 0.5, 0.5], &mut hits);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_degenerate_triangles_rejected() {
        let flat = [[[0.0; 3], [0.0; 3], [0.0; 3]]];
        assert!(Mesh::from_triangles(&flat).is_err());
    }
}
