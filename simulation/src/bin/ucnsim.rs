//! Storage-bottle demo: ultra-cold neutrons bouncing in a cubic chamber
//! under gravity and a ramped holding field.

use fields::{FieldEntry, FieldManager, FieldSource, RampShape, TimeEnvelope, UniformField};
use geometry::{Geometry, Material, Mesh, Solid};
use particle::{Neutron, Particle, RunSettings, SimRng, StopId};
use rand::{Rng, SeedableRng};
use simulation::{MonteCarlo, SimulationContext};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let count: usize = args.next().map_or(Ok(100), |a| a.parse())?;
    let out_dir = args.next().unwrap_or_else(|| ".".into());

    let context = SimulationContext::new(42, out_dir, 0xc0ffee);
    let settings = RunSettings {
        t_max: 20.0,
        log_end: true,
        log_hits: false,
        ..RunSettings::default()
    };

    // A 0.5 m storage cube with slightly lossy walls.
    let steel = Material {
        name: "steel".into(),
        fermi_real: 183.0,
        fermi_imag: 0.0852,
        diffuse_prob: 0.05,
        spin_flip_prob: 1e-5,
        ..Material::default()
    };
    let chamber = Solid::new(2, "chamber", steel, Mesh::cuboid([0.0; 3], [0.5; 3]));
    let geometry = Geometry::new(Solid::vacuum(), vec![chamber])?;

    // A 1 T holding field ramped up over the first second.
    let holding = FieldEntry::new(FieldSource::Uniform(UniformField {
        b: [0.0, 0.0, 1.0],
        e: [0.0; 3],
    }))
    .with_envelope(TimeEnvelope::new(0.0, 1.0, f64::INFINITY, 0.0, RampShape::SmoothStep));
    let fields = FieldManager::new(vec![holding]);

    // Uniformly filled chamber, isotropic 3 m/s sources.
    let mut rng = SimRng::seed_from_u64(context.seed);
    let particles = (0..count)
        .map(|i| {
            let pos: [f64; 3] = [
                rng.random_range(0.05..0.45),
                rng.random_range(0.05..0.45),
                rng.random_range(0.05..0.45),
            ];
            let theta = (1.0 - 2.0 * rng.random::<f64>()).acos();
            let phi = rng.random::<f64>() * std::f64::consts::TAU;
            let v = 3.0;
            let y = [
                pos[0],
                pos[1],
                pos[2],
                v * theta.sin() * phi.cos(),
                v * theta.sin() * phi.sin(),
                v * theta.cos(),
            ];
            let polarisation = if rng.random::<bool>() { 1 } else { -1 };
            Particle::new(i as u64 + 1, Box::new(Neutron), 0.0, y, polarisation, &mut rng)
        })
        .collect();

    let mut monte_carlo = MonteCarlo::new(context, settings, particles);
    monte_carlo.run(&geometry, &fields)?;

    let mut survived = 0usize;
    let mut decayed = 0usize;
    let mut failed = 0usize;
    for p in &monte_carlo.particles {
        match p.stop_id {
            StopId::NotFinished => survived += 1,
            StopId::Decayed => decayed += 1,
            _ => failed += 1,
        }
    }
    println!(
        "{count} neutrons: {survived} survived to t_max, {decayed} decayed, {failed} otherwise",
    );
    Ok(())
}
