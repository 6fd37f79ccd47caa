use crate::{
    AxisymmetricTable, BFieldTensor, CuboidTable, EField, ExponentialFieldX, LinearFieldZ,
    TimeEnvelope, UniformField, complete_babs,
};

/// One concrete field source.
pub enum FieldSource {
    Uniform(UniformField),
    ExponentialX(ExponentialFieldX),
    LinearZ(LinearFieldZ),
    Table2D(AxisymmetricTable),
    Table3D(CuboidTable),
}

/// A source together with its time envelope and electric polarity scale.
pub struct FieldEntry {
    pub source: FieldSource,
    /// σ(t) applied to the magnetic contribution.
    pub envelope: TimeEnvelope,
    /// Constant scale applied to the electric contribution; the sign carries
    /// the polarity.
    pub e_scale: f64,
}

impl FieldEntry {
    pub fn new(source: FieldSource) -> Self {
        Self {
            source,
            envelope: TimeEnvelope::always_on(),
            e_scale: 1.0,
        }
    }

    pub fn with_envelope(mut self, envelope: TimeEnvelope) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn with_e_scale(mut self, e_scale: f64) -> Self {
        self.e_scale = e_scale;
        self
    }
}

/// Composes field sources; immutable after construction.
///
/// B and E are the linear sums of the individual contributions, including
/// all derivatives. An empty manager returns zeros.
#[derive(Default)]
pub struct FieldManager {
    entries: Vec<FieldEntry>,
}

impl FieldManager {
    pub fn new(entries: Vec<FieldEntry>) -> Self {
        Self { entries }
    }

    /// The magnetic tensor at (x, y, z, t). Row 3 carries |B| and ∇|B| of
    /// the summed field.
    pub fn b(&self, x: f64, y: f64, z: f64, t: f64) -> BFieldTensor {
        let mut b: BFieldTensor = [[0.0; 4]; 4];
        for entry in &self.entries {
            let scale = entry.envelope.scale(t);
            match &entry.source {
                FieldSource::Uniform(f) => f.add_b(scale, &mut b),
                FieldSource::ExponentialX(f) => f.add_b(x, y, z, scale, &mut b),
                FieldSource::LinearZ(f) => f.add_b(z, scale, &mut b),
                FieldSource::Table2D(f) => f.add_b(x, y, z, scale, &mut b),
                FieldSource::Table3D(f) => f.add_b(x, y, z, scale, &mut b),
            }
        }
        complete_babs(&mut b);
        b
    }

    /// The electric sample at (x, y, z, t).
    pub fn e(&self, x: f64, y: f64, z: f64, _t: f64) -> EField {
        let mut field = EField::default();
        for entry in &self.entries {
            match &entry.source {
                FieldSource::Uniform(f) => f.add_e(entry.e_scale, &mut field),
                FieldSource::ExponentialX(_) | FieldSource::LinearZ(_) => {}
                FieldSource::Table2D(f) => f.add_e(x, y, z, entry.e_scale, &mut field),
                FieldSource::Table3D(f) => f.add_e(x, y, z, entry.e_scale, &mut field),
            }
        }
        field
    }
}
