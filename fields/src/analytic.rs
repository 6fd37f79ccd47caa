use crate::{BFieldTensor, EField};

/// Homogeneous B and E field, zero derivatives.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformField {
    pub b: [f64; 3],
    pub e: [f64; 3],
}

impl UniformField {
    pub(crate) fn add_b(&self, scale: f64, b: &mut BFieldTensor) {
        for i in 0..3 {
            b[i][0] += scale * self.b[i];
        }
    }

    pub(crate) fn add_e(&self, scale: f64, field: &mut EField) {
        for i in 0..3 {
            field.e[i] += scale * self.e[i];
        }
    }
}

/// Exponentially decaying field along x:
///
/// Bx = a1·e^(−a2·x) + a3, with the divergence-free compensation
/// By = (y − c1)·(a1·a2/2)·e^(−a2·x) and Bz = (z − c2)·(a1·a2/2)·e^(−a2·x).
/// All derivatives are evaluated from the closed form.
#[derive(Clone, Copy, Debug)]
pub struct ExponentialFieldX {
    pub a1: f64,
    pub a2: f64,
    pub a3: f64,
    pub c1: f64,
    pub c2: f64,
}

impl ExponentialFieldX {
    pub(crate) fn add_b(&self, x: f64, y: f64, z: f64, scale: f64, b: &mut BFieldTensor) {
        let exp = (-self.a2 * x).exp();
        let half = self.a1 * self.a2 / 2.0 * exp;

        // Bx row
        b[0][0] += scale * (self.a1 * exp + self.a3);
        b[0][1] += scale * (-self.a1 * self.a2 * exp);
        // By row
        b[1][0] += scale * ((y - self.c1) * half);
        b[1][1] += scale * (-(y - self.c1) * self.a2 * half);
        b[1][2] += scale * half;
        // Bz row
        b[2][0] += scale * ((z - self.c2) * half);
        b[2][1] += scale * (-(z - self.c2) * self.a2 * half);
        b[2][3] += scale * half;
    }
}

/// Field with a linear gradient along z: Bz = a1·z + a2.
#[derive(Clone, Copy, Debug)]
pub struct LinearFieldZ {
    pub a1: f64,
    pub a2: f64,
}

impl LinearFieldZ {
    pub(crate) fn add_b(&self, z: f64, scale: f64, b: &mut BFieldTensor) {
        b[2][0] += scale * (self.a1 * z + self.a2);
        b[2][3] += scale * self.a1;
    }
}
