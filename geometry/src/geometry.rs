use crate::{GeometryError, Result, Solid};

/// Axis-aligned bounding box of the whole world.
#[derive(Clone, Copy, Debug)]
pub struct Aabb {
    pub lo: [f64; 3],
    pub hi: [f64; 3],
}

impl Aabb {
    /// The unbounded box, used when the geometry holds no meshes.
    pub fn infinite() -> Self {
        Self {
            lo: [f64::NEG_INFINITY; 3],
            hi: [f64::INFINITY; 3],
        }
    }

    pub fn contains(&self, p: [f64; 3]) -> bool {
        (0..3).all(|a| p[a] >= self.lo[a] && p[a] <= self.hi[a])
    }
}

/// One candidate surface crossing on a tested segment.
#[derive(Clone, Copy, Debug)]
pub struct CollisionRecord {
    /// Parametric position on the segment, s ∈ [0, 1].
    pub s: f64,
    /// The solid whose surface was crossed.
    pub solid_id: i32,
    /// Outward unit normal of the crossed triangle.
    pub normal: [f64; 3],
    /// Set when the hit time falls in an ignore window of the solid. The
    /// collision resolver does not consult this flag; hit handlers may.
    pub ignored: bool,
}

/// The triangulated world: a default solid plus meshed solids.
pub struct Geometry {
    default_solid: Solid,
    solids: Vec<Solid>,
    world: Aabb,
}

impl Geometry {
    /// Builds the world. Solid ids must be unique and the default solid
    /// carries no mesh; violations abort the run at construction.
    pub fn new(default_solid: Solid, solids: Vec<Solid>) -> Result<Self> {
        if default_solid.mesh.is_some() {
            return Err(GeometryError::DefaultSolidHasMesh(default_solid.name));
        }
        let mut ids: Vec<i32> = solids
            .iter()
            .map(|s| s.id)
            .chain([default_solid.id])
            .collect();
        ids.sort_unstable();
        for pair in ids.windows(2) {
            if pair[0] == pair[1] {
                return Err(GeometryError::DuplicateId(pair[0]));
            }
        }

        let mut world = Aabb::infinite();
        let mut first = true;
        for solid in &solids {
            if let Some(mesh) = &solid.mesh {
                let (lo, hi) = mesh.bounds();
                if first {
                    world = Aabb { lo, hi };
                    first = false;
                } else {
                    for a in 0..3 {
                        world.lo[a] = world.lo[a].min(lo[a]);
                        world.hi[a] = world.hi[a].max(hi[a]);
                    }
                }
            }
        }

        Ok(Self {
            default_solid,
            solids,
            world,
        })
    }

    pub fn default_solid(&self) -> &Solid {
        &self.default_solid
    }

    pub fn world_box(&self) -> &Aabb {
        &self.world
    }

    /// Looks a solid up by id, the default solid included.
    pub fn solid(&self, id: i32) -> Option<&Solid> {
        if id == self.default_solid.id {
            return Some(&self.default_solid);
        }
        self.solids.iter().find(|s| s.id == id)
    }

    /// Tests the segment p₁ → p₂ travelled over [t₁, t₂] against every
    /// solid. Records come back ordered by s ascending, ties broken by
    /// solid id ascending.
    pub fn collisions(
        &self,
        t1: f64,
        p1: [f64; 3],
        t2: f64,
        p2: [f64; 3],
    ) -> Vec<CollisionRecord> {
        let mut records = Vec::new();
        let mut hits = Vec::new();
        for solid in &self.solids {
            let Some(mesh) = &solid.mesh else { continue };
            hits.clear();
            mesh.segment_hits(p1, p2, &mut hits);
            for &(s, normal) in &hits {
                let t_hit = t1 + s * (t2 - t1);
                records.push(CollisionRecord {
                    s,
                    solid_id: solid.id,
                    normal,
                    ignored: solid.is_ignored(t_hit),
                });
            }
        }
        records.sort_by(|a, b| {
            a.s.partial_cmp(&b.s)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.solid_id.cmp(&b.solid_id))
        });
        records
    }

    /// The ids of the solids containing `p` at time `t`, sorted ascending.
    ///
    /// A vertical ray from `p` to above the world box is tested against each
    /// solid; an odd crossing count means containment. Solids inside one of
    /// their ignore windows are skipped; the default solid is always
    /// included.
    pub fn solids_at(&self, p: [f64; 3], t: f64) -> Vec<i32> {
        let mut ids = vec![self.default_solid.id];
        let top = if self.world.hi[2].is_finite() {
            self.world.hi[2] + 1.0
        } else {
            p[2] + 1.0
        };
        let ray_end = [p[0], p[1], top];
        let mut hits = Vec::new();
        for solid in &self.solids {
            let Some(mesh) = &solid.mesh else { continue };
            if solid.is_ignored(t) {
                continue;
            }
            hits.clear();
            mesh.segment_hits(p, ray_end, &mut hits);
            if hits.len() % 2 == 1 {
                ids.push(solid.id);
            }
        }
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Material, Mesh, TimeWindow};

    fn box_world() -> Geometry {
        let cube = Solid::new(
            2,
            "storage cube",
            Material::default(),
            Mesh::cuboid([0.0; 3], [1.0; 3]),
        );
        Geometry::new(Solid::vacuum(), vec![cube]).unwrap()
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let a = Solid::new(1, "a", Material::default(), Mesh::cuboid([0.0; 3], [1.0; 3]));
        assert!(matches!(
            Geometry::new(Solid::vacuum(), vec![a]),
            Err(GeometryError::DuplicateId(1))
        ));
    }

    #[test]
    fn test_default_solid_mesh_rejected() {
        let mut bad = Solid::vacuum();
        bad.mesh = Some(std::sync::Arc::new(Mesh::cuboid([0.0; 3], [1.0; 3])));
        assert!(Geometry::new(bad, vec![]).is_err());
    }

    #[test]
    fn test_containment() {
        let geometry = box_world();
        assert_eq!(geometry.solids_at([0.5, 0.5, 0.5], 0.0), vec![1, 2]);
        assert_eq!(geometry.solids_at([2.0, 0.5, 0.5], 0.0), vec![1]);
    }

    #[test]
    fn test_containment_respects_ignore_windows() {
        let cube = Solid::new(
            2,
            "gated chamber",
            Material::default(),
            Mesh::cuboid([0.0; 3], [1.0; 3]),
        )
        .with_ignore_times(vec![TimeWindow::new(10.0, 20.0)]);
        let geometry = Geometry::new(Solid::vacuum(), vec![cube]).unwrap();
        assert_eq!(geometry.solids_at([0.5; 3], 0.0), vec![1, 2]);
        assert_eq!(geometry.solids_at([0.5; 3], 15.0), vec![1]);
    }

    #[test]
    fn test_collisions_ordered() {
        let geometry = box_world();
        let records = geometry.collisions(0.0, [-0.5, 0.5, 0.5], 1.0, [1.5, 0.5, 0.5]);
        assert_eq!(records.len(), 2);
        assert!(records[0].s < records[1].s);
        assert_eq!(records[0].normal, [-1.0, 0.0, 0.0]);
        assert_eq!(records[1].normal, [1.0, 0.0, 0.0]);
        assert!(!records[0].ignored);
    }

    #[test]
    fn test_collision_ignored_flag() {
        let cube = Solid::new(
            2,
            "shutter",
            Material::default(),
            Mesh::cuboid([0.0; 3], [1.0; 3]),
        )
        .with_ignore_times(vec![TimeWindow::new(0.0, 1.0)]);
        let geometry = Geometry::new(Solid::vacuum(), vec![cube]).unwrap();
        let records = geometry.collisions(0.0, [-0.5, 0.5, 0.5], 0.5, [0.5, 0.5, 0.5]);
        assert_eq!(records.len(), 1);
        assert!(records[0].ignored);
    }

    #[test]
    fn test_world_box() {
        let geometry = box_world();
        assert!(geometry.world_box().contains([0.5; 3]));
        assert!(!geometry.world_box().contains([1.5, 0.5, 0.5]));

        let empty = Geometry::new(Solid::vacuum(), vec![]).unwrap();
        assert!(empty.world_box().contains([1e12; 3]));
    }
}
