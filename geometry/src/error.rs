#[derive(thiserror::Error, Debug)]
pub enum GeometryError {
    /// Solid ids must be unique within a geometry.
    #[error("duplicate solid id {0}")]
    DuplicateId(i32),

    /// The default solid fills the world and cannot carry a mesh.
    #[error("default solid '{0}' must not have a mesh")]
    DefaultSolidHasMesh(String),

    /// A mesh needs at least one non-degenerate triangle.
    #[error("mesh has no non-degenerate triangles")]
    EmptyMesh,

    /// The particle is recorded entering a solid it is already inside of.
    #[error("solid {0} is already in the current-solid set")]
    AlreadyInside(i32),

    /// The particle is recorded leaving a solid it is not inside of.
    #[error("solid {0} is not in the current-solid set")]
    NotInside(i32),
}
