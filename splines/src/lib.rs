mod bicubic;
mod error;
mod grid;
mod tricubic;

pub use bicubic::Bicubic;
pub use error::SplineError;
pub use tricubic::Tricubic;

pub(crate) use grid::Axis;

pub type Result<T> = std::result::Result<T, SplineError>;
