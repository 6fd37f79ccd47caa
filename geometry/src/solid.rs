use std::sync::Arc;

use crate::Mesh;

/// Surface and bulk properties of a wall material.
///
/// The integrator treats this as an opaque bundle and forwards it to the
/// species hit handler, which owns the actual reflection physics.
#[derive(Clone, Debug, Default)]
pub struct Material {
    pub name: String,
    /// Real part of the Fermi pseudo-potential **in \[neV\]**.
    pub fermi_real: f64,
    /// Imaginary part of the Fermi pseudo-potential **in \[neV\]**.
    pub fermi_imag: f64,
    /// Probability of diffuse instead of specular reflection per bounce.
    pub diffuse_prob: f64,
    /// Spin-flip probability per bounce.
    pub spin_flip_prob: f64,
    /// RMS surface roughness **in \[m\]**.
    pub rms_roughness: f64,
    /// Roughness correlation length **in \[m\]**.
    pub correlation_length: f64,
    /// Loss probability per bounce.
    pub loss_per_bounce: f64,
    /// Elastic mean free path in the bulk **in \[m\]**.
    pub mean_free_path: f64,
}

/// A half-open time interval [start, end).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t < self.end
    }
}

/// A solid of the world: mesh, material and transparency windows.
///
/// The id doubles as the overlap priority; where solids overlap, the one
/// with the highest id owns the bulk.
#[derive(Clone)]
pub struct Solid {
    pub id: i32,
    pub name: String,
    pub material: Material,
    /// The default solid filling the world has no mesh.
    pub mesh: Option<Arc<Mesh>>,
    /// While t is inside any of these windows the solid is transparent.
    pub ignore_times: Vec<TimeWindow>,
}

impl Solid {
    pub fn new(id: i32, name: &str, material: Material, mesh: Mesh) -> Self {
        Self {
            id,
            name: name.into(),
            material,
            mesh: Some(Arc::new(mesh)),
            ignore_times: Vec::new(),
        }
    }

    /// The default solid: vacuum filling the world, id 1, no mesh.
    pub fn vacuum() -> Self {
        Self {
            id: 1,
            name: "default".into(),
            material: Material {
                name: "vacuum".into(),
                ..Material::default()
            },
            mesh: None,
            ignore_times: Vec::new(),
        }
    }

    pub fn with_ignore_times(mut self, windows: Vec<TimeWindow>) -> Self {
        self.ignore_times = windows;
        self
    }

    /// True while the solid is transparent.
    pub fn is_ignored(&self, t: f64) -> bool {
        self.ignore_times.iter().any(|w| w.contains(t))
    }
}

impl std::fmt::Debug for Solid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solid")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("material", &self.material.name)
            .field("has mesh", &self.mesh.is_some())
            .field("ignore windows", &self.ignore_times.len())
            .finish()
    }
}
