#![allow(dead_code)]

use fields::FieldManager;
use geometry::{Geometry, Material, Mesh, Solid};
use particle::*;
use rand::SeedableRng;

pub fn vacuum_world() -> Geometry {
    Geometry::new(Solid::vacuum(), vec![]).unwrap()
}

/// A single cube solid (id 2) floating in vacuum.
pub fn cube_world(lo: [f64; 3], hi: [f64; 3]) -> Geometry {
    let cube = Solid::new(2, "cube", Material::default(), Mesh::cuboid(lo, hi));
    Geometry::new(Solid::vacuum(), vec![cube]).unwrap()
}

pub fn no_fields() -> FieldManager {
    FieldManager::default()
}

pub fn rng() -> SimRng {
    SimRng::seed_from_u64(0xdecaf)
}

/// Neutral massive species with gravity switched off in its equation of
/// motion; passes through every wall.
pub struct Drifter;

impl Species for Drifter {
    fn name(&self) -> &'static str {
        "drifter"
    }

    fn charge(&self) -> f64 {
        0.0
    }

    fn mass(&self) -> f64 {
        1.675e-27
    }

    fn magnetic_moment(&self) -> f64 {
        0.0
    }

    fn rhs(
        &self,
        _t: f64,
        y: &[f64; 6],
        _polarisation: i8,
        _b: &fields::BFieldTensor,
        _e: &fields::EField,
    ) -> [f64; 6] {
        [y[3], y[4], y[5], 0.0, 0.0, 0.0]
    }

    fn potential_energy(
        &self,
        _y: &[f64; 6],
        _polarisation: i8,
        _b: &fields::BFieldTensor,
        _e: &fields::EField,
    ) -> f64 {
        0.0
    }

    fn on_hit(&self, _event: &mut HitEvent<'_>, _rng: &mut SimRng) -> HitResult {
        HitResult::Transmitted
    }
}

/// Like [`Drifter`], but every wall is a perfect specular mirror.
pub struct Mirror;

impl Species for Mirror {
    fn name(&self) -> &'static str {
        "mirror"
    }

    fn charge(&self) -> f64 {
        0.0
    }

    fn mass(&self) -> f64 {
        1.675e-27
    }

    fn magnetic_moment(&self) -> f64 {
        0.0
    }

    fn rhs(
        &self,
        _t: f64,
        y: &[f64; 6],
        _polarisation: i8,
        _b: &fields::BFieldTensor,
        _e: &fields::EField,
    ) -> [f64; 6] {
        [y[3], y[4], y[5], 0.0, 0.0, 0.0]
    }

    fn potential_energy(
        &self,
        _y: &[f64; 6],
        _polarisation: i8,
        _b: &fields::BFieldTensor,
        _e: &fields::EField,
    ) -> f64 {
        0.0
    }

    fn on_hit(&self, event: &mut HitEvent<'_>, _rng: &mut SimRng) -> HitResult {
        event.reflect_specular();
        HitResult::Reflected
    }
}

/// Like [`Drifter`], but dies at the first wall it touches.
pub struct Sticky;

impl Species for Sticky {
    fn name(&self) -> &'static str {
        "sticky"
    }

    fn charge(&self) -> f64 {
        0.0
    }

    fn mass(&self) -> f64 {
        1.675e-27
    }

    fn magnetic_moment(&self) -> f64 {
        0.0
    }

    fn rhs(
        &self,
        _t: f64,
        y: &[f64; 6],
        _polarisation: i8,
        _b: &fields::BFieldTensor,
        _e: &fields::EField,
    ) -> [f64; 6] {
        [y[3], y[4], y[5], 0.0, 0.0, 0.0]
    }

    fn on_hit(&self, _event: &mut HitEvent<'_>, _rng: &mut SimRng) -> HitResult {
        HitResult::Absorbed
    }
}

/// Like [`Drifter`], but absorbed in the bulk of solid 2.
pub struct BulkAbsorber;

impl Species for BulkAbsorber {
    fn name(&self) -> &'static str {
        "bulk absorber"
    }

    fn charge(&self) -> f64 {
        0.0
    }

    fn mass(&self) -> f64 {
        1.675e-27
    }

    fn magnetic_moment(&self) -> f64 {
        0.0
    }

    fn rhs(
        &self,
        _t: f64,
        y: &[f64; 6],
        _polarisation: i8,
        _b: &fields::BFieldTensor,
        _e: &fields::EField,
    ) -> [f64; 6] {
        [y[3], y[4], y[5], 0.0, 0.0, 0.0]
    }

    fn on_hit(&self, _event: &mut HitEvent<'_>, _rng: &mut SimRng) -> HitResult {
        HitResult::Transmitted
    }

    fn on_step(&self, event: &mut StepEvent<'_>, _rng: &mut SimRng) -> StepResult {
        if event.solid.id == 2 {
            StepResult::Absorbed
        } else {
            StepResult::Unchanged
        }
    }
}
