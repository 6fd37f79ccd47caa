#[derive(thiserror::Error, Debug)]
pub enum SimulationError {
    /// Error from [`particle`].
    #[error("particle error: {0}")]
    Particle(#[from] particle::ParticleError),

    /// Error from [`geometry`].
    #[error("geometry error: {0}")]
    Geometry(#[from] geometry::GeometryError),

    /// Error from [`fields`].
    #[error("field error: {0}")]
    Field(#[from] fields::FieldError),

    /// Error creating or writing an output file.
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}
