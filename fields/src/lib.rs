mod analytic;
mod envelope;
mod error;
mod manager;
mod table;
mod table2d;
mod table3d;
mod types;

pub use analytic::{ExponentialFieldX, LinearFieldZ, UniformField};
pub use envelope::{RampShape, TimeEnvelope, smooth_step, smooth_step_deriv};
pub use error::FieldError;
pub use manager::{FieldEntry, FieldManager, FieldSource};
pub use table::UnitConversion;
pub use table2d::AxisymmetricTable;
pub use table3d::CuboidTable;
pub use types::{BFieldTensor, EField, complete_babs};

pub type Result<T> = std::result::Result<T, FieldError>;
