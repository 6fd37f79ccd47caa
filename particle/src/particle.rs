use std::time::{Duration, Instant};

use config::*;
use fields::FieldManager;
use geometry::{CurrentSolids, Geometry};
use rand_distr::{Distribution, Exp};
use serde::{Deserialize, Serialize};

use crate::state::{position, speed};
use crate::{
    Dop853, EndRecord, Logger, ParticleSeed, Result, SimRng, Species, State, StopId, TrackRecord,
};

/// The immutable world a particle task runs against.
#[derive(Clone, Copy)]
pub struct Environment<'a> {
    pub geometry: &'a Geometry,
    pub fields: &'a FieldManager,
}

/// Per-run integration settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSettings {
    pub job_number: u64,
    /// Absolute end time of the simulation **in \[s\]**.
    pub t_max: f64,
    /// Trajectory-length bound **in \[m\]**.
    pub max_trajectory_length: f64,
    /// Times at which a snapshot row is written, ascending.
    pub snapshot_times: Vec<f64>,
    pub log_end: bool,
    pub log_tracks: bool,
    pub log_hits: bool,
    pub log_snapshots: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            job_number: 0,
            t_max: 1000.0,
            max_trajectory_length: f64::INFINITY,
            snapshot_times: Vec::new(),
            log_end: true,
            log_tracks: false,
            log_hits: false,
            log_snapshots: false,
        }
    }
}

/// One simulated particle.
///
/// Owns its state, counters and the secondaries appended by decay; dropping
/// a particle drops its whole decay tree.
pub struct Particle {
    pub number: u64,
    pub species: Box<dyn Species>,
    /// The state the integrator advances.
    pub state: State,
    pub start: State,
    pub end: State,
    /// Proper lifetime drawn at creation **in \[s\]**.
    pub tau: f64,
    pub trajectory_length: f64,
    pub hits: u64,
    pub spin_flips: u64,
    pub steps: u64,
    /// Total energy at the start **in \[eV\]**.
    pub h_start: f64,
    /// Potential energy at the start **in \[eV\]**.
    pub e_start: f64,
    /// Highest total energy seen along the trajectory **in \[eV\]**.
    pub h_max: f64,
    pub stop_id: StopId,
    pub current_solids: CurrentSolids,
    pub secondaries: Vec<Particle>,
    pub computing_time: Duration,
}

impl Particle {
    /// Creates a particle at (t₀, y₀) and draws its proper lifetime from the
    /// species mean.
    pub fn new(
        number: u64,
        species: Box<dyn Species>,
        t0: f64,
        y0: [f64; 6],
        polarisation: i8,
        rng: &mut SimRng,
    ) -> Self {
        let mean = species.mean_lifetime();
        let tau = if mean.is_finite() {
            Exp::new(1.0 / mean).map_or(f64::INFINITY, |exp| exp.sample(rng))
        } else {
            f64::INFINITY
        };
        let state = State::new(t0, y0, polarisation);
        Self {
            number,
            species,
            state,
            start: state,
            end: State::default(),
            tau,
            trajectory_length: 0.0,
            hits: 0,
            spin_flips: 0,
            steps: 0,
            h_start: f64::NAN,
            e_start: f64::NAN,
            h_max: f64::NAN,
            stop_id: StopId::default(),
            current_solids: CurrentSolids::new(vec![1]),
            secondaries: Vec::new(),
            computing_time: Duration::default(),
        }
    }

    /// Creates a secondary particle from a decay seed.
    pub fn from_seed(parent: u64, seed: ParticleSeed, rng: &mut SimRng) -> Self {
        Self::new(parent, seed.species, seed.t, seed.y, seed.polarisation, rng)
    }

    /// Total energy at a trajectory point **in \[eV\]**.
    pub fn total_energy(&self, env: &Environment<'_>, t: f64, y: &[f64; 6], pol: i8) -> f64 {
        let b = env.fields.b(y[0], y[1], y[2], t);
        let e = env.fields.e(y[0], y[1], y[2], t);
        self.species.total_energy(y, pol, &b, &e)
    }

    /// Potential energy at a trajectory point **in \[eV\]**.
    pub fn potential_energy(&self, env: &Environment<'_>, t: f64, y: &[f64; 6], pol: i8) -> f64 {
        let b = env.fields.b(y[0], y[1], y[2], t);
        let e = env.fields.e(y[0], y[1], y[2], t);
        self.species.potential_energy(y, pol, &b, &e)
    }

    /// Integrates the trajectory until a terminal status is reached.
    ///
    /// The loop asks the stepper for one accepted step at a time, resamples
    /// it into sub-segments no longer than [`MAX_SAMPLE_DIST`], and runs the
    /// collision resolver on each. On decay the species hook appends
    /// secondaries; these are not integrated here.
    pub fn integrate(
        &mut self,
        env: &Environment<'_>,
        run: &RunSettings,
        rng: &mut SimRng,
        logger: &mut dyn Logger,
    ) -> Result<()> {
        let wall_clock = Instant::now();
        let t0 = self.state.t;
        let tau_end = t0 + self.tau;

        self.start = self.state;
        self.current_solids =
            CurrentSolids::new(env.geometry.solids_at(self.state.position(), t0));
        self.h_start = self.total_energy(env, t0, &self.state.y, self.state.polarisation);
        self.e_start = self.potential_energy(env, t0, &self.state.y, self.state.polarisation);
        self.h_max = self.h_start;

        log::debug!(
            "particle {} ({}) starting at t = {t0} s, τ = {} s",
            self.number,
            self.species.name(),
            self.tau,
        );

        if run.log_tracks {
            let y0 = self.state.y;
            self.log_track(env, run, logger, t0, &y0)?;
        }

        let mut stepper = Dop853::new(t0, self.state.y);
        let mut h = FIRST_STEP;
        let mut next_progress = 0.1;

        while !self.stop_id.is_terminal() {
            let t = stepper.t();

            // Termination by time or trajectory-length bounds.
            if t >= tau_end {
                self.stop_id = StopId::Decayed;
                break;
            }
            if t >= run.t_max || self.trajectory_length >= run.max_trajectory_length {
                self.stop_id = StopId::NotFinished;
                break;
            }
            if self.steps as usize >= MAX_STEPS {
                log::warn!("particle {} timed out after {MAX_STEPS} steps", self.number);
                self.stop_id = StopId::NotFinished;
                break;
            }

            // Never step past the lifetime or the run end.
            let h_this = h.min(tau_end - t).min(run.t_max - t);
            if t + h_this == t {
                // The nearest time bound is below time resolution.
                self.stop_id = if tau_end - t <= run.t_max - t {
                    StopId::Decayed
                } else {
                    StopId::NotFinished
                };
                break;
            }

            let pol = self.state.polarisation;
            let fields = env.fields;
            let species: &dyn Species = &*self.species;
            let mut rhs = move |t: f64, y: &[f64; 6]| {
                let b = fields.b(y[0], y[1], y[2], t);
                let e = fields.e(y[0], y[1], y[2], t);
                species.rhs(t, y, pol, &b, &e)
            };
            match stepper.step(h_this, &mut rhs) {
                Ok(outcome) => h = outcome.h_next,
                Err(err) => {
                    let p = self.state.position();
                    self.stop_id = StopId::NumericalError(
                        format!(
                            "{err} at position ({}, {}, {}) m",
                            p[0], p[1], p[2],
                        )
                        .into(),
                    );
                    break;
                }
            }
            self.steps += 1;

            // Resample the accepted step to the spatial sampling bound and
            // resolve each sub-segment.
            let t_now = stepper.t();
            let mut t1 = stepper.t_old();
            let mut y1 = self.state.y;
            let mut truncated = false;
            while t1 < t_now && !truncated && !self.stop_id.is_terminal() {
                let v = speed(&y1);
                let remaining = (t_now - t1) * v;
                let mut t2 = if remaining <= MAX_SAMPLE_DIST || v == 0.0 {
                    t_now
                } else {
                    // Keep the trailing piece at least MIN_SAMPLE_DIST long.
                    let step_dist = if remaining - MAX_SAMPLE_DIST < MIN_SAMPLE_DIST {
                        remaining - MIN_SAMPLE_DIST
                    } else {
                        MAX_SAMPLE_DIST
                    };
                    t1 + step_dist / v
                };
                let mut y2 = if t2 == t_now {
                    *stepper.y()
                } else {
                    stepper.dense_state(t2)
                };

                truncated = self.resolve_collisions(
                    env, &stepper, run, rng, logger, t1, &y1, &mut t2, &mut y2, 1,
                )?;

                let dp = [y2[0] - y1[0], y2[1] - y1[1], y2[2] - y1[2]];
                self.trajectory_length +=
                    (dp[0] * dp[0] + dp[1] * dp[1] + dp[2] * dp[2]).sqrt();

                let energy = self.total_energy(env, t2, &y2, self.state.polarisation);
                if energy > self.h_max {
                    self.h_max = energy;
                }

                if run.log_snapshots {
                    for &ts in &run.snapshot_times {
                        if ts > t1 && ts <= t2 {
                            let ys = stepper.dense_state(ts);
                            let record = self.make_record(env, run, ts, &ys);
                            logger.snapshot(&record)?;
                        }
                    }
                }

                self.state = State::new(t2, y2, self.state.polarisation);
                if run.log_tracks {
                    self.log_track(env, run, logger, t2, &y2)?;
                }

                t1 = t2;
                y1 = y2;
            }

            if truncated && !self.stop_id.is_terminal() {
                // A hit handler redirected the trajectory: restart the
                // stepper from the truncated endpoint.
                stepper.reset(self.state.t, self.state.y);
            }

            let progress = ((stepper.t() - t0) / self.tau)
                .max((stepper.t() - t0) / (run.t_max - t0))
                .max(self.trajectory_length / run.max_trajectory_length);
            while progress >= next_progress {
                log::info!(
                    "particle {}: {:.0} % done, t = {:.6} s",
                    self.number,
                    next_progress * 100.0,
                    stepper.t(),
                );
                next_progress += 0.1;
            }
        }

        if self.stop_id == StopId::Decayed {
            let seeds = self
                .species
                .decay(self.state.t, &self.state.y, rng);
            for seed in seeds {
                self.secondaries.push(Particle::from_seed(self.number, seed, rng));
            }
        }

        self.end = self.state;
        self.computing_time = wall_clock.elapsed();
        log::debug!(
            "particle {} stopped: {} after {} steps",
            self.number,
            self.stop_id,
            self.steps,
        );

        if run.log_end {
            let record = self.make_record(env, run, self.end.t, &self.end.y);
            logger.end(&record)?;
        }
        Ok(())
    }

    /// Builds an end/snapshot row for the state (t, y) with the current
    /// counters.
    fn make_record(
        &self,
        env: &Environment<'_>,
        run: &RunSettings,
        t: f64,
        y: &[f64; 6],
    ) -> EndRecord {
        let pol = self.state.polarisation;
        EndRecord {
            job_number: run.job_number,
            particle: self.number,
            t_start: self.start.t,
            y_start: self.start.y,
            pol_start: self.start.polarisation,
            h_start: self.h_start,
            e_start: self.e_start,
            t_end: t,
            y_end: *y,
            pol_end: pol,
            h_end: self.total_energy(env, t, y, pol),
            e_end: self.potential_energy(env, t, y, pol),
            stop_id: self.stop_id.code(),
            spin_flips: self.spin_flips,
            computing_time: self.computing_time.as_secs_f64(),
            hits: self.hits,
            steps: self.steps,
            trajectory_length: self.trajectory_length,
            h_max: self.h_max,
        }
    }

    fn log_track(
        &self,
        env: &Environment<'_>,
        _run: &RunSettings,
        logger: &mut dyn Logger,
        t: f64,
        y: &[f64; 6],
    ) -> Result<()> {
        let p = position(y);
        let b = env.fields.b(p[0], p[1], p[2], t);
        let e = env.fields.e(p[0], p[1], p[2], t);
        let pol = self.state.polarisation;
        logger.track(&TrackRecord {
            particle: self.number,
            polarisation: pol,
            t,
            y: *y,
            h: self.species.total_energy(y, pol, &b, &e),
            e: self.species.potential_energy(y, pol, &b, &e),
            b,
            e_field: e.e,
            v: e.v,
        })?;
        Ok(())
    }
}

impl std::fmt::Debug for Particle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Particle")
            .field("number", &self.number)
            .field("species", &self.species.name())
            .field("start", &self.start)
            .field("end", &self.end)
            .field("τ", &self.tau)
            .field("status", &self.stop_id)
            .field("Nhit", &self.hits)
            .field("Nstep", &self.steps)
            .field("trajectory length", &self.trajectory_length)
            .field("Hmax", &self.h_max)
            .field("secondaries", &self.secondaries.len())
            .finish()
    }
}
