/// The cubic Hermite smooth step 3u² − 2u³ on [0, 1].
///
/// S(0) = 0, S(1) = 1, S′(0) = S′(1) = 0.
pub fn smooth_step(u: f64) -> f64 {
    let u = u.clamp(0.0, 1.0);
    u * u * (3.0 - 2.0 * u)
}

/// Derivative of [`smooth_step`], zero outside [0, 1].
pub fn smooth_step_deriv(u: f64) -> f64 {
    if !(0.0..=1.0).contains(&u) {
        return 0.0;
    }
    6.0 * u * (1.0 - u)
}

/// Shape of the field ramp.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum RampShape {
    /// σ grows/decays linearly over the ramp.
    Linear,
    /// σ follows the C¹ Hermite step, so σ′ is continuous at the ramp ends.
    #[default]
    SmoothStep,
}

impl RampShape {
    fn eval(self, u: f64) -> f64 {
        match self {
            RampShape::Linear => u.clamp(0.0, 1.0),
            RampShape::SmoothStep => smooth_step(u),
        }
    }
}

/// Time-dependent scale σ(t) ∈ [0, 1] applied to a magnetic field source.
///
/// The field is off before `null_time`, ramps up over `ramp_up`, stays at
/// full strength for `full_time`, ramps down over `ramp_down` and is off
/// afterwards. σ is continuous for every shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeEnvelope {
    pub null_time: f64,
    pub ramp_up: f64,
    pub full_time: f64,
    pub ramp_down: f64,
    pub shape: RampShape,
}

impl TimeEnvelope {
    pub fn new(
        null_time: f64,
        ramp_up: f64,
        full_time: f64,
        ramp_down: f64,
        shape: RampShape,
    ) -> Self {
        Self {
            null_time,
            ramp_up,
            full_time,
            ramp_down,
            shape,
        }
    }

    /// An envelope that keeps the source at full strength for all t.
    pub fn always_on() -> Self {
        Self {
            null_time: f64::NEG_INFINITY,
            ramp_up: 0.0,
            full_time: f64::INFINITY,
            ramp_down: 0.0,
            shape: RampShape::SmoothStep,
        }
    }

    /// The scale σ(t).
    pub fn scale(&self, t: f64) -> f64 {
        let up_end = self.null_time + self.ramp_up;
        let full_end = up_end + self.full_time;
        let down_end = full_end + self.ramp_down;

        if t < self.null_time {
            0.0
        } else if t < up_end {
            self.shape.eval((t - self.null_time) / self.ramp_up)
        } else if t <= full_end {
            1.0
        } else if t < down_end {
            self.shape.eval((down_end - t) / self.ramp_down)
        } else {
            0.0
        }
    }
}

impl Default for TimeEnvelope {
    fn default() -> Self {
        Self::always_on()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck::quickcheck;

    #[test]
    fn test_phases() {
        let env = TimeEnvelope::new(1.0, 2.0, 3.0, 4.0, RampShape::Linear);
        assert_eq!(env.scale(0.5), 0.0);
        assert!((env.scale(2.0) - 0.5).abs() < 1e-12);
        assert_eq!(env.scale(4.0), 1.0);
        assert_eq!(env.scale(6.0), 1.0);
        assert!((env.scale(8.0) - 0.5).abs() < 1e-12);
        assert_eq!(env.scale(10.0), 0.0);
        assert_eq!(env.scale(1e9), 0.0);
    }

    #[test]
    fn test_always_on() {
        let env = TimeEnvelope::always_on();
        assert_eq!(env.scale(-1e6), 1.0);
        assert_eq!(env.scale(0.0), 1.0);
        assert_eq!(env.scale(1e9), 1.0);
    }

    #[test]
    fn test_smooth_ramp_is_c1() {
        let env = TimeEnvelope::new(0.0, 1.0, 1.0, 1.0, RampShape::SmoothStep);
        // σ′ vanishes at every ramp boundary; probe with a small difference
        // quotient across each one.
        let eps = 1e-6;
        for t in [0.0, 1.0, 2.0, 3.0] {
            let slope = (env.scale(t + eps) - env.scale(t - eps)) / (2.0 * eps);
            assert!(slope.abs() < 1e-5, "σ′ = {slope} at t = {t}");
        }
    }

    quickcheck! {
        fn prop_scale_bounded(t: f64) -> bool {
            let env = TimeEnvelope::new(0.5, 1.5, 2.0, 1.0, RampShape::SmoothStep);
            let s = env.scale(t);
            (0.0..=1.0).contains(&s)
        }

        fn prop_scale_continuous(t: f64) -> bool {
            if !t.is_finite() {
                return true;
            }
            let t = t % 10.0;
            let env = TimeEnvelope::new(1.0, 2.0, 3.0, 2.0, RampShape::Linear);
            let eps = 1e-9;
            (env.scale(t + eps) - env.scale(t - eps)).abs() < 1e-7
        }

        fn prop_smooth_step_bounds(u: f64) -> bool {
            let s = smooth_step(u);
            (0.0..=1.0).contains(&s)
        }
    }
}
