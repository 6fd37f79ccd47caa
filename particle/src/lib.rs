mod collision;
mod error;
mod events;
mod particle;
mod records;
mod species;
mod state;
mod stepper;
mod stopid;

pub use error::ParticleError;
pub use events::{HitEvent, HitResult, ParticleSeed, StepEvent, StepResult};
pub use particle::{Environment, Particle, RunSettings};
pub use records::{EndRecord, HitRecord, Logger, MemoryLogger, NullLogger, TrackRecord};
pub use species::{
    Electron, Neutron, Proton, SimRng, Species, equation_of_motion, kinetic_energy,
    specular_reflect,
};
pub use state::State;
pub use stepper::{Derivatives, Dop853, StepOutcome, StepperError};
pub use stopid::StopId;

pub type Result<T> = std::result::Result<T, ParticleError>;

/// Time **in \[s\]**.
#[doc(alias = "f64")]
pub type Time = f64;

/// Energy **in \[eV\]**.
#[doc(alias = "f64")]
pub type Energy = f64;
