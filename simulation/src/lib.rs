mod context;
mod error;
mod montecarlo;
mod output;

pub use context::SimulationContext;
pub use error::SimulationError;
pub use montecarlo::MonteCarlo;
pub use output::FileLogger;

pub type Result<T> = std::result::Result<T, SimulationError>;
