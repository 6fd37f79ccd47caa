use config::{MAX_COLLISION_ITERATIONS, REFLECT_TOLERANCE};
use geometry::CollisionRecord;

use crate::state::position;
use crate::{
    Dop853, Environment, HitEvent, HitRecord, HitResult, Logger, Particle, Result, RunSettings,
    SimRng, StepEvent, StepResult, StopId,
};

impl Particle {
    /// Resolves the sub-segment (t₁, y₁) → (t₂, y₂) against the geometry.
    ///
    /// Returns true when the trajectory was materially changed: the segment
    /// endpoint was truncated (reflection, scattering) or the particle
    /// terminated. `t2`/`y2` then hold the truncated endpoint.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn resolve_collisions(
        &mut self,
        env: &Environment<'_>,
        stepper: &Dop853<6>,
        run: &RunSettings,
        rng: &mut SimRng,
        logger: &mut dyn Logger,
        t1: f64,
        y1: &[f64; 6],
        t2: &mut f64,
        y2: &mut [f64; 6],
        iteration: u32,
    ) -> Result<bool> {
        let p1 = position(y1);
        if !env.geometry.world_box().contains(p1) {
            self.stop_id = StopId::HitBoundaries;
            *t2 = t1;
            *y2 = *y1;
            return Ok(true);
        }

        let records = env.geometry.collisions(t1, p1, *t2, position(y2));
        let Some(first) = records.first().copied() else {
            return self.do_step(env, rng, t1, y1, t2, y2);
        };

        let delta = [y2[0] - y1[0], y2[1] - y1[1], y2[2] - y1[2]];
        let distnormal =
            delta[0] * first.normal[0] + delta[1] * first.normal[1] + delta[2] * first.normal[2];
        let dn = distnormal.abs();

        let localised = (first.s * dn < REFLECT_TOLERANCE
            && (1.0 - first.s) * dn < REFLECT_TOLERANCE)
            || iteration > MAX_COLLISION_ITERATIONS;
        if localised {
            if self.do_hit(env, run, rng, logger, &records, distnormal, t1, y1, t2, y2)? {
                return Ok(true);
            }
            if self.stop_id.is_terminal() {
                return Ok(true);
            }
            // The crossing did not alter the trajectory: the bulk of the
            // (possibly new) active solid still gets its say.
            return self.do_step(env, rng, t1, y1, t2, y2);
        }

        // Not localised: bisect around the parametric hit position. The
        // (1 ± 0.01·iter) skew keeps the cuts moving when s is an exact
        // fraction of the segment.
        let dt = *t2 - t1;
        let iter_f = iteration as f64;
        let mut cuts = Vec::with_capacity(2);
        for cut in [
            t1 + dt * first.s * (1.0 - 0.01 * iter_f),
            t1 + dt * first.s * (1.0 + 0.01 * iter_f),
        ] {
            if cut > t1 && cut < *t2 && cuts.last().is_none_or(|&c| cut > c) {
                cuts.push(cut);
            }
        }

        let mut ta = t1;
        let mut ya = *y1;
        for cut in cuts {
            let mut tb = cut;
            let mut yb = stepper.dense_state(cut);
            if self.resolve_collisions(
                env,
                stepper,
                run,
                rng,
                logger,
                ta,
                &ya,
                &mut tb,
                &mut yb,
                iteration + 1,
            )? {
                *t2 = tb;
                *y2 = yb;
                return Ok(true);
            }
            ta = tb;
            ya = yb;
        }
        let mut tb = *t2;
        let mut yb = *y2;
        if self.resolve_collisions(
            env,
            stepper,
            run,
            rng,
            logger,
            ta,
            &ya,
            &mut tb,
            &mut yb,
            iteration + 1,
        )? {
            *t2 = tb;
            *y2 = yb;
            return Ok(true);
        }
        Ok(false)
    }

    /// Handles a localised crossing: consistency checks, reaction admission
    /// by solid priority, the species hit hook and the solid-set update.
    /// Returns true when the trajectory was truncated.
    #[allow(clippy::too_many_arguments)]
    fn do_hit(
        &mut self,
        env: &Environment<'_>,
        run: &RunSettings,
        rng: &mut SimRng,
        logger: &mut dyn Logger,
        records: &[CollisionRecord],
        distnormal: f64,
        t1: f64,
        y1: &[f64; 6],
        t2: &mut f64,
        y2: &mut [f64; 6],
    ) -> Result<bool> {
        let first = records[0];

        if let Some(second) = records.get(1)
            && second.s == first.s
            && second.solid_id != first.solid_id
        {
            return Ok(self.fail(env, t1, y1, format!(
                "solids {} and {} hit at the same segment position",
                first.solid_id, second.solid_id,
            )));
        }
        if distnormal == 0.0 {
            return Ok(self.fail(env, t1, y1, format!(
                "crossing parallel to the surface of solid {}",
                first.solid_id,
            )));
        }

        let going_in = distnormal < 0.0;
        if going_in && self.current_solids.contains(first.solid_id) {
            return Ok(self.fail(env, t1, y1, format!(
                "entering solid {} a second time",
                first.solid_id,
            )));
        }
        if !going_in && !self.current_solids.contains(first.solid_id) {
            return Ok(self.fail(env, t1, y1, format!(
                "leaving solid {} the particle never entered",
                first.solid_id,
            )));
        }

        // Reaction admission follows the id priority: a crossing below the
        // active solid is recorded without a reaction.
        let active = self.current_solids.top();
        let (leaving_id, entering_id, admitted) = if going_in {
            (active, first.solid_id, first.solid_id > active)
        } else {
            let below = self.current_solids.below_top().unwrap_or(active);
            (first.solid_id, below, first.solid_id == active)
        };

        if admitted {
            let (Some(leaving), Some(entering)) =
                (env.geometry.solid(leaving_id), env.geometry.solid(entering_id))
            else {
                return Ok(self.fail(env, t1, y1, format!(
                    "crossing of unregistered solid {leaving_id}/{entering_id}",
                )));
            };

            let pol_before = self.state.polarisation;
            let v_before = [y1[3], y1[4], y1[5]];

            let species = &self.species;
            let mut event = HitEvent {
                t1,
                y1: *y1,
                t2: &mut *t2,
                y2: &mut *y2,
                normal: first.normal,
                leaving,
                entering,
                polarisation: &mut self.state.polarisation,
                ignored: first.ignored,
            };
            let outcome = species.on_hit(&mut event, rng);

            self.hits += 1;
            if self.state.polarisation != pol_before {
                self.spin_flips += 1;
            }
            if run.log_hits {
                logger.hit(&HitRecord {
                    job_number: run.job_number,
                    particle: self.number,
                    t: t1,
                    position: position(y1),
                    v_before,
                    pol_before,
                    v_after: [y2[3], y2[4], y2[5]],
                    pol_after: self.state.polarisation,
                    normal: first.normal,
                    leaving_id,
                    entering_id,
                })?;
            }

            match outcome {
                HitResult::Transmitted => {}
                HitResult::Reflected => return Ok(true),
                HitResult::Absorbed => {
                    self.stop_id = StopId::Absorbed(first.solid_id);
                    *t2 = t1;
                    *y2 = *y1;
                    return Ok(true);
                }
            }
        }

        // The particle passes the surface: keep the solid set consistent.
        let update = if going_in {
            self.current_solids.insert(first.solid_id)
        } else {
            self.current_solids.remove(first.solid_id)
        };
        if let Err(err) = update {
            return Ok(self.fail(env, t1, y1, err.to_string()));
        }
        Ok(false)
    }

    /// Runs the species bulk hook on a collision-free sub-segment.
    fn do_step(
        &mut self,
        env: &Environment<'_>,
        rng: &mut SimRng,
        t1: f64,
        y1: &[f64; 6],
        t2: &mut f64,
        y2: &mut [f64; 6],
    ) -> Result<bool> {
        let active = self.current_solids.top();
        let Some(solid) = env.geometry.solid(active) else {
            return Ok(self.fail(env, t1, y1, format!(
                "active solid {active} is not registered in the geometry",
            )));
        };
        let mut event = StepEvent {
            t1,
            y1: *y1,
            t2: &mut *t2,
            y2: &mut *y2,
            solid,
        };
        match self.species.on_step(&mut event, rng) {
            StepResult::Unchanged => Ok(false),
            StepResult::Scattered => Ok(true),
            StepResult::Absorbed => {
                self.stop_id = StopId::Absorbed(active);
                Ok(true)
            }
        }
    }

    /// Flags a numerical error with a diagnostic carrying time, position and
    /// the offending solids.
    fn fail(&mut self, env: &Environment<'_>, t: f64, y: &[f64; 6], msg: String) -> bool {
        let names: Vec<&str> = self
            .current_solids
            .ids()
            .iter()
            .filter_map(|id| env.geometry.solid(*id).map(|s| s.name.as_str()))
            .collect();
        self.stop_id = StopId::NumericalError(
            format!(
                "{msg} at t = {t} s, position ({}, {}, {}) m, inside [{}]",
                y[0],
                y[1],
                y[2],
                names.join(", "),
            )
            .into(),
        );
        true
    }
}
