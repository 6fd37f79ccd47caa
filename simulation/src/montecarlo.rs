use std::sync::Mutex;

use config::PBAR_STYLE;
use fields::FieldManager;
use geometry::Geometry;
use indicatif::{ParallelProgressIterator, ProgressStyle};
use particle::{Environment, Logger, MemoryLogger, Particle, RunSettings, SimRng};
use rand::SeedableRng;
use rayon::iter::{IntoParallelRefMutIterator, ParallelIterator};

use crate::{FileLogger, Result, SimulationContext};

/// Fans independent particles out across threads.
///
/// Every particle task owns its state, stepper and random stream; geometry
/// and fields are shared read-only. Output files are written under a lock,
/// so events of one particle stay contiguous and time-ordered.
pub struct MonteCarlo {
    pub context: SimulationContext,
    pub settings: RunSettings,
    pub particles: Vec<Particle>,
}

impl MonteCarlo {
    pub fn new(context: SimulationContext, settings: RunSettings, particles: Vec<Particle>) -> Self {
        let mut settings = settings;
        settings.job_number = context.job_number;
        Self {
            context,
            settings,
            particles,
        }
    }

    /// Integrates every particle and its decay tree, writing the output
    /// files into the context's directory.
    pub fn run(&mut self, geometry: &Geometry, fields: &FieldManager) -> Result<()> {
        let env = Environment { geometry, fields };
        let sink = Mutex::new(FileLogger::new(&self.context));
        let seed = self.context.seed;
        let settings = &self.settings;

        self.particles
            .par_iter_mut()
            .progress_with_style(
                ProgressStyle::with_template(PBAR_STYLE).unwrap_or(ProgressStyle::default_bar()),
            )
            .try_for_each(|p| {
                let mut rng = SimRng::seed_from_u64(seed ^ p.number.wrapping_mul(0x9e3779b9));
                integrate_tree(p, &env, settings, &mut rng, &sink)
            })?;

        sink.lock().unwrap().flush()?;
        Ok(())
    }
}

/// Integrates a particle and, recursively, the secondaries its decay
/// appended.
fn integrate_tree(
    particle: &mut Particle,
    env: &Environment<'_>,
    settings: &RunSettings,
    rng: &mut SimRng,
    sink: &Mutex<FileLogger>,
) -> Result<()> {
    let mut local = MemoryLogger::default();
    particle.integrate(env, settings, rng, &mut local)?;

    {
        let mut shared = sink.lock().unwrap();
        shared.set_species(particle.species.name());
        replay(&local, &mut shared)?;
    }

    for secondary in &mut particle.secondaries {
        integrate_tree(secondary, env, settings, rng, sink)?;
    }
    Ok(())
}

/// Replays buffered records into the shared files, preserving their order.
fn replay(local: &MemoryLogger, shared: &mut FileLogger) -> Result<()> {
    for record in &local.tracks {
        shared.track(record)?;
    }
    for record in &local.hits {
        shared.hit(record)?;
    }
    for record in &local.snapshots {
        shared.snapshot(record)?;
    }
    for record in &local.ends {
        shared.end(record)?;
    }
    Ok(())
}
