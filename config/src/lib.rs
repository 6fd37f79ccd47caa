// ==================== Trajectory sampling

/// The maximum spatial distance between two consecutive points handed to the
/// collision resolver and the track log. Accepted steps are resampled down to
/// this length.
pub const MAX_SAMPLE_DIST: f64 = 0.01;

/// The minimum spatial distance between two scheduler points. Sub-segments
/// shorter than this are merged into their neighbor.
pub const MIN_SAMPLE_DIST: f64 = 0.005;

/// A surface crossing counts as localised once both sides of the bisected
/// segment project onto the surface normal by less than this distance.
pub const REFLECT_TOLERANCE: f64 = 1e-8;

/// The maximum recursion depth of the collision bisector. Deeper candidates
/// are treated as localised.
pub const MAX_COLLISION_ITERATIONS: u32 = 99;

// ==================== Stepper

/// The absolute tolerance of the stepping error in every step.
pub const STEP_ABS_TOL: f64 = 1e-13;

/// The relative tolerance of the stepping error in every step.
pub const STEP_REL_TOL: f64 = 0.0;

/// The initial time step for the adaptive method. Should be small enough to
/// account for fast particles. The value is empirical.
pub const FIRST_STEP: f64 = 1e-6;

/// The maximum amount of steps a particle can make before terminating its
/// integration.
pub const MAX_STEPS: usize = 10_000_000;

// ==================== Physical constants

/// Speed of light **in \[m/s\]**.
pub const C_0: f64 = 299_792_458.0;

/// Standard acceleration of gravity **in \[m/s²\]**.
pub const GRAV_CONST: f64 = 9.80665;

/// Elementary charge **in \[C\]**.
pub const ELE_E: f64 = 1.602176634e-19;

/// Neutron mass **in \[kg\]**.
pub const M_NEUTRON: f64 = 1.67492749804e-27;

/// Proton mass **in \[kg\]**.
pub const M_PROTON: f64 = 1.67262192369e-27;

/// Electron mass **in \[kg\]**.
pub const M_ELECTRON: f64 = 9.1093837015e-31;

/// Neutron magnetic moment **in \[J/T\]**.
pub const MU_NEUTRON: f64 = -9.6623651e-27;

/// Mean neutron lifetime **in \[s\]**.
pub const TAU_NEUTRON: f64 = 879.4;

/// Endpoint of the beta-decay electron spectrum **in \[eV\]**.
pub const BETA_ENDPOINT_E: f64 = 782e3;

/// Endpoint of the beta-decay proton recoil spectrum **in \[eV\]**.
pub const BETA_ENDPOINT_P: f64 = 751.0;

// ==================== Misc

/// The starting capacity of in-memory track sample vectors.
pub const TRACK_INIT_CAPACITY: usize = 2000;

/// The style of the progress bar used by the Monte-Carlo driver.
pub const PBAR_STYLE: &str =
    "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} particles ({eta})";
