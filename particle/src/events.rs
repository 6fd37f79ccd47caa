use geometry::Solid;

use crate::Species;
use crate::species::specular_reflect;

/// A localised surface crossing handed to the species hit handler.
///
/// The handler may truncate the segment (reflection), flip the polarisation
/// (spin flip) and decide the particle's fate at the wall.
pub struct HitEvent<'a> {
    pub t1: f64,
    pub y1: [f64; 6],
    pub t2: &'a mut f64,
    pub y2: &'a mut [f64; 6],
    /// Outward unit normal of the crossed surface.
    pub normal: [f64; 3],
    /// The solid whose bulk the particle is leaving.
    pub leaving: &'a Solid,
    /// The solid whose bulk the particle would enter.
    pub entering: &'a Solid,
    pub polarisation: &'a mut i8,
    /// The geometry's ignore flag for this crossing. The resolver does not
    /// act on it; handlers may.
    pub ignored: bool,
}

impl HitEvent<'_> {
    /// Truncates the segment at the surface and mirrors the velocity on the
    /// surface normal.
    pub fn reflect_specular(&mut self) {
        *self.t2 = self.t1;
        *self.y2 = specular_reflect(&self.y1, self.normal);
    }
}

/// Outcome of a hit reaction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HitResult {
    /// The particle crosses the surface; the trajectory is unchanged.
    Transmitted,
    /// The handler truncated and redirected the segment.
    Reflected,
    /// The particle dies at the wall; status becomes absorbed-in-solid.
    Absorbed,
}

/// A collision-free sub-segment handed to the species bulk handler.
pub struct StepEvent<'a> {
    pub t1: f64,
    pub y1: [f64; 6],
    pub t2: &'a mut f64,
    pub y2: &'a mut [f64; 6],
    /// The solid whose bulk the particle moves through.
    pub solid: &'a Solid,
}

/// Outcome of a bulk-matter reaction over one sub-segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepResult {
    Unchanged,
    /// The handler moved the segment endpoint (elastic scattering).
    Scattered,
    /// The particle is absorbed in the active solid.
    Absorbed,
}

/// Initial conditions of a secondary particle appended by a decay.
pub struct ParticleSeed {
    pub species: Box<dyn Species>,
    pub t: f64,
    pub y: [f64; 6],
    pub polarisation: i8,
}
