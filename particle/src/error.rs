#[derive(thiserror::Error, Debug)]
pub enum ParticleError {
    /// Error from [`geometry`].
    #[error("geometry error: {0}")]
    Geometry(#[from] geometry::GeometryError),

    /// Error writing to an output sink.
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}
