use config::*;
use fields::{BFieldTensor, EField};
use rand::Rng;
use rand_distr::{Distribution, UnitSphere};

use crate::{HitEvent, HitResult, ParticleSeed, StepEvent, StepResult};

/// The random stream a particle task owns.
pub type SimRng = rand_pcg::Pcg64;

/// Lorentz factor for a squared speed.
pub fn gamma_factor(v2: f64) -> f64 {
    1.0 / (1.0 - v2 / (C_0 * C_0)).sqrt()
}

/// Relativistic kinetic energy **in \[eV\]**.
pub fn kinetic_energy(mass: f64, v: [f64; 3]) -> f64 {
    let v2 = v[0] * v[0] + v[1] * v[1] + v[2] * v[2];
    let beta2 = v2 / (C_0 * C_0);
    // The exact expression cancels catastrophically at low β.
    let joules = if beta2 < 1e-10 {
        0.5 * mass * v2
    } else {
        (gamma_factor(v2) - 1.0) * mass * C_0 * C_0
    };
    joules / ELE_E
}

/// Speed of a particle with the given kinetic energy **in \[eV\]**.
pub fn speed_from_kinetic_energy(mass: f64, energy: f64) -> f64 {
    let gamma = 1.0 + energy * ELE_E / (mass * C_0 * C_0);
    C_0 * (1.0 - 1.0 / (gamma * gamma)).sqrt()
}

/// The fully relativistic equation of motion:
///
/// ẋ = v,  v̇ = (F − v(v·F)/c²)/(γm),
/// F = −m·g·ẑ + q(E + v×B) + μ·p·∇|B|.
pub fn equation_of_motion(
    charge: f64,
    mass: f64,
    moment: f64,
    polarisation: i8,
    b: &BFieldTensor,
    e: &EField,
    y: &[f64; 6],
) -> [f64; 6] {
    let v = [y[3], y[4], y[5]];
    let mut f = [0.0, 0.0, -GRAV_CONST * mass];
    if charge != 0.0 {
        f[0] += charge * (e.e[0] + v[1] * b[2][0] - v[2] * b[1][0]);
        f[1] += charge * (e.e[1] + v[2] * b[0][0] - v[0] * b[2][0]);
        f[2] += charge * (e.e[2] + v[0] * b[1][0] - v[1] * b[0][0]);
    }
    if moment != 0.0 && polarisation != 0 {
        let p = polarisation as f64;
        f[0] += p * moment * b[3][1];
        f[1] += p * moment * b[3][2];
        f[2] += p * moment * b[3][3];
    }

    let v2 = v[0] * v[0] + v[1] * v[1] + v[2] * v[2];
    let gamma_m = gamma_factor(v2) * mass;
    let vdotf = v[0] * f[0] + v[1] * f[1] + v[2] * f[2];
    let c2 = C_0 * C_0;
    [
        v[0],
        v[1],
        v[2],
        (f[0] - v[0] * vdotf / c2) / gamma_m,
        (f[1] - v[1] * vdotf / c2) / gamma_m,
        (f[2] - v[2] * vdotf / c2) / gamma_m,
    ]
}

/// Mirrors the velocity of `y` on the surface normal, keeping the position.
pub fn specular_reflect(y: &[f64; 6], normal: [f64; 3]) -> [f64; 6] {
    let vn = y[3] * normal[0] + y[4] * normal[1] + y[5] * normal[2];
    [
        y[0],
        y[1],
        y[2],
        y[3] - 2.0 * vn * normal[0],
        y[4] - 2.0 * vn * normal[1],
        y[5] - 2.0 * vn * normal[2],
    ]
}

/// The behavior set a particle species provides to the integrator.
///
/// The integrator knows nothing else about species: it evaluates the shared
/// equation of motion with the species constants and defers every material
/// interaction to these hooks. Reflection and absorption models live behind
/// [`Species::on_hit`]; the built-in species only ship minimal surface
/// policies.
pub trait Species: Send + Sync {
    fn name(&self) -> &'static str;

    /// Charge **in \[C\]**.
    fn charge(&self) -> f64;

    /// Mass **in \[kg\]**.
    fn mass(&self) -> f64;

    /// Magnetic moment **in \[J/T\]**.
    fn magnetic_moment(&self) -> f64;

    /// Mean proper lifetime **in \[s\]**; infinite for stable species.
    fn mean_lifetime(&self) -> f64 {
        f64::INFINITY
    }

    /// Derivative of the 6-vector at (t, y) in the local field. Defaults to
    /// the shared [`equation_of_motion`].
    fn rhs(
        &self,
        _t: f64,
        y: &[f64; 6],
        polarisation: i8,
        b: &BFieldTensor,
        e: &EField,
    ) -> [f64; 6] {
        equation_of_motion(
            self.charge(),
            self.mass(),
            self.magnetic_moment(),
            polarisation,
            b,
            e,
            y,
        )
    }

    /// Reaction to a localised surface crossing.
    fn on_hit(&self, event: &mut HitEvent<'_>, rng: &mut SimRng) -> HitResult;

    /// Reaction to a collision-free sub-segment through the active solid.
    fn on_step(&self, _event: &mut StepEvent<'_>, _rng: &mut SimRng) -> StepResult {
        StepResult::Unchanged
    }

    /// Secondary particles appended when the proper lifetime is reached.
    fn decay(&self, _t: f64, _y: &[f64; 6], _rng: &mut SimRng) -> Vec<ParticleSeed> {
        Vec::new()
    }

    /// Potential energy **in \[eV\]**: m·g·z + q·V − p·μ·|B|.
    fn potential_energy(&self, y: &[f64; 6], polarisation: i8, b: &BFieldTensor, e: &EField) -> f64 {
        (self.mass() * GRAV_CONST * y[2] + self.charge() * e.v
            - polarisation as f64 * self.magnetic_moment() * b[3][0])
            / ELE_E
    }

    /// Total energy **in \[eV\]**.
    fn total_energy(&self, y: &[f64; 6], polarisation: i8, b: &BFieldTensor, e: &EField) -> f64 {
        kinetic_energy(self.mass(), [y[3], y[4], y[5]])
            + self.potential_energy(y, polarisation, b, e)
    }
}

/// Ultra-cold neutron. Walls act as perfect specular mirrors with the
/// material's spin-flip probability; beta decay appends a proton and an
/// electron.
pub struct Neutron;

impl Species for Neutron {
    fn name(&self) -> &'static str {
        "neutron"
    }

    fn charge(&self) -> f64 {
        0.0
    }

    fn mass(&self) -> f64 {
        M_NEUTRON
    }

    fn magnetic_moment(&self) -> f64 {
        MU_NEUTRON
    }

    fn mean_lifetime(&self) -> f64 {
        TAU_NEUTRON
    }

    fn on_hit(&self, event: &mut HitEvent<'_>, rng: &mut SimRng) -> HitResult {
        let wall = if event.entering.id > event.leaving.id {
            event.entering
        } else {
            event.leaving
        };
        if *event.polarisation != 0 && rng.random::<f64>() < wall.material.spin_flip_prob {
            *event.polarisation = -*event.polarisation;
        }
        event.reflect_specular();
        HitResult::Reflected
    }

    fn decay(&self, t: f64, y: &[f64; 6], rng: &mut SimRng) -> Vec<ParticleSeed> {
        // Isotropic directions with endpoint-bounded energies stand in for
        // the full three-body kinematics.
        let mut seed = |species: Box<dyn Species>, endpoint: f64| {
            let direction: [f64; 3] = UnitSphere.sample(rng);
            let speed = speed_from_kinetic_energy(species.mass(), rng.random::<f64>() * endpoint);
            ParticleSeed {
                species,
                t,
                y: [
                    y[0],
                    y[1],
                    y[2],
                    speed * direction[0],
                    speed * direction[1],
                    speed * direction[2],
                ],
                polarisation: 0,
            }
        };
        vec![
            seed(Box::new(Proton), BETA_ENDPOINT_P),
            seed(Box::new(Electron), BETA_ENDPOINT_E),
        ]
    }
}

/// Decay proton; dies at the first wall it touches.
pub struct Proton;

impl Species for Proton {
    fn name(&self) -> &'static str {
        "proton"
    }

    fn charge(&self) -> f64 {
        ELE_E
    }

    fn mass(&self) -> f64 {
        M_PROTON
    }

    fn magnetic_moment(&self) -> f64 {
        0.0
    }

    fn on_hit(&self, _event: &mut HitEvent<'_>, _rng: &mut SimRng) -> HitResult {
        HitResult::Absorbed
    }
}

/// Decay electron; dies at the first wall it touches.
pub struct Electron;

impl Species for Electron {
    fn name(&self) -> &'static str {
        "electron"
    }

    fn charge(&self) -> f64 {
        -ELE_E
    }

    fn mass(&self) -> f64 {
        M_ELECTRON
    }

    fn magnetic_moment(&self) -> f64 {
        0.0
    }

    fn on_hit(&self, _event: &mut HitEvent<'_>, _rng: &mut SimRng) -> HitResult {
        HitResult::Absorbed
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_free_fall_has_only_gravity() {
        let b: BFieldTensor = [[0.0; 4]; 4];
        let e = EField::default();
        let dydt = equation_of_motion(0.0, M_NEUTRON, 0.0, 0, &b, &e, &[0.0; 6]);
        assert_eq!(dydt[0], 0.0);
        assert!((dydt[5] + GRAV_CONST).abs() < 1e-12);
    }

    #[test]
    fn test_lorentz_force_direction() {
        // Positive charge moving along +x in Bz ẑ bends toward −y.
        let mut b: BFieldTensor = [[0.0; 4]; 4];
        b[2][0] = 1.0;
        let e = EField::default();
        let y = [0.0, 0.0, 0.0, 1e3, 0.0, 0.0];
        let dydt = equation_of_motion(ELE_E, M_PROTON, 0.0, 0, &b, &e, &y);
        assert!(dydt[4] < 0.0);
        assert!(dydt[3].abs() < 1e-9);
    }

    #[test]
    fn test_magnetic_dipole_force() {
        // μ·p·∇|B| pushes a low-field seeker out of the gradient.
        let mut b: BFieldTensor = [[0.0; 4]; 4];
        b[2][0] = 1.0;
        b[3][0] = 1.0;
        b[3][3] = 2.0; // ∂|B|/∂z
        let e = EField::default();
        let dydt = equation_of_motion(0.0, M_NEUTRON, MU_NEUTRON, 1, &b, &e, &[0.0; 6]);
        let expected = (MU_NEUTRON * 2.0 - M_NEUTRON * GRAV_CONST) / M_NEUTRON;
        assert!((dydt[5] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_kinetic_energy_low_beta() {
        // A 5 m/s UCN: classical limit.
        let e = kinetic_energy(M_NEUTRON, [5.0, 0.0, 0.0]);
        let classical = 0.5 * M_NEUTRON * 25.0 / ELE_E;
        assert!((e - classical).abs() / classical < 1e-9);
    }

    #[test]
    fn test_speed_energy_round_trip() {
        for energy in [1.0, 100.0, 782e3] {
            let v = speed_from_kinetic_energy(M_ELECTRON, energy);
            let back = kinetic_energy(M_ELECTRON, [v, 0.0, 0.0]);
            assert!((back - energy).abs() / energy < 1e-6, "{energy} eV");
        }
    }

    #[test]
    fn test_specular_reflect() {
        let y = [1.0, 2.0, 3.0, 1.0, -2.0, 0.5];
        let out = specular_reflect(&y, [1.0, 0.0, 0.0]);
        assert_eq!(out[..3], y[..3]);
        assert_eq!(out[3], -1.0);
        assert_eq!(out[4], -2.0);
        assert_eq!(out[5], 0.5);
    }
}
