use std::path::PathBuf;

/// Immutable context of one simulation job, threaded through construction
/// sites instead of living in process globals.
#[derive(Clone, Debug)]
pub struct SimulationContext {
    /// Job number stamped into every output row.
    pub job_number: u64,
    /// Directory the output files are created in.
    pub out_dir: PathBuf,
    /// Master seed; every particle derives its own stream from it.
    pub seed: u64,
}

impl SimulationContext {
    pub fn new(job_number: u64, out_dir: impl Into<PathBuf>, seed: u64) -> Self {
        Self {
            job_number,
            out_dir: out_dir.into(),
            seed,
        }
    }
}
