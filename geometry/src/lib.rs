mod currentsolids;
mod error;
mod geometry;
mod mesh;
mod solid;

pub use currentsolids::CurrentSolids;
pub use error::GeometryError;
pub use geometry::{Aabb, CollisionRecord, Geometry};
pub use mesh::Mesh;
pub use solid::{Material, Solid, TimeWindow};

pub type Result<T> = std::result::Result<T, GeometryError>;
