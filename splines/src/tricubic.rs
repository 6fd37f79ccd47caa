use ndarray::Array3;

use crate::grid::{hermite_coeffs, knot_derivs};
use crate::{Axis, Result, SplineError};

/// Tricubic interpolation over a regular (x, y, z) grid.
///
/// Corner data (f and its mixed difference derivatives up to fxyz) feed the
/// 1-D Hermite coefficient transform along each axis in turn, leaving 64
/// monomial coefficients per grid cell. The interpolant is C¹ across cell
/// faces.
pub struct Tricubic {
    x: Axis,
    y: Axis,
    z: Axis,
    /// Coefficients of u^p·v^q·w^r per cell, index p·16 + q·4 + r.
    coeffs: Vec<[f64; 64]>,
}

/// Knot derivatives along one index axis of a 3-D grid, in index units.
fn diff_along(f: &Array3<f64>, axis: usize) -> Array3<f64> {
    let (nx, ny, nz) = f.dim();
    let mut out = Array3::zeros((nx, ny, nz));
    match axis {
        0 => {
            for j in 0..ny {
                for k in 0..nz {
                    let line: Vec<f64> = (0..nx).map(|i| f[[i, j, k]]).collect();
                    for (i, d) in knot_derivs(&line).into_iter().enumerate() {
                        out[[i, j, k]] = d;
                    }
                }
            }
        }
        1 => {
            for i in 0..nx {
                for k in 0..nz {
                    let line: Vec<f64> = (0..ny).map(|j| f[[i, j, k]]).collect();
                    for (j, d) in knot_derivs(&line).into_iter().enumerate() {
                        out[[i, j, k]] = d;
                    }
                }
            }
        }
        _ => {
            for i in 0..nx {
                for j in 0..ny {
                    let line: Vec<f64> = (0..nz).map(|k| f[[i, j, k]]).collect();
                    for (k, d) in knot_derivs(&line).into_iter().enumerate() {
                        out[[i, j, k]] = d;
                    }
                }
            }
        }
    }
    out
}

impl Tricubic {
    /// Builds the spline from the knot vectors and a
    /// `(xa.len(), ya.len(), za.len())` value grid.
    pub fn new(xa: &[f64], ya: &[f64], za: &[f64], values: &Array3<f64>) -> Result<Self> {
        let x = Axis::new('x', xa)?;
        let y = Axis::new('y', ya)?;
        let z = Axis::new('z', za)?;

        let (nx, ny, nz) = values.dim();
        if nx != x.len() || ny != y.len() || nz != z.len() {
            return Err(SplineError::ShapeMismatch {
                got: vec![nx, ny, nz],
                expected: vec![x.len(), y.len(), z.len()],
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SplineError::NonFiniteValues);
        }

        let fx = diff_along(values, 0);
        let fy = diff_along(values, 1);
        let fz = diff_along(values, 2);
        let fxy = diff_along(&fx, 1);
        let fxz = diff_along(&fx, 2);
        let fyz = diff_along(&fy, 2);
        let fxyz = diff_along(&fxy, 2);

        let src = |dx: bool, dy: bool, dz: bool| match (dx, dy, dz) {
            (false, false, false) => values,
            (true, false, false) => &fx,
            (false, true, false) => &fy,
            (false, false, true) => &fz,
            (true, true, false) => &fxy,
            (true, false, true) => &fxz,
            (false, true, true) => &fyz,
            (true, true, true) => &fxyz,
        };

        let mut coeffs = Vec::with_capacity((nx - 1) * (ny - 1) * (nz - 1));
        for i in 0..nx - 1 {
            for j in 0..ny - 1 {
                for k in 0..nz - 1 {
                    // Hermite slots per axis: 0/1 value at near/far corner,
                    // 2/3 derivative at near/far corner.
                    let mut h = [0.0; 64];
                    for ax in 0..4 {
                        for ay in 0..4 {
                            for az in 0..4 {
                                let grid = src(ax >= 2, ay >= 2, az >= 2);
                                let idx = [i + (ax & 1), j + (ay & 1), k + (az & 1)];
                                h[ax * 16 + ay * 4 + az] = grid[idx];
                            }
                        }
                    }
                    // Transform slots to monomial coefficients axis by axis.
                    for ay in 0..4 {
                        for az in 0..4 {
                            let pick = |s: usize| h[s * 16 + ay * 4 + az];
                            let c = hermite_coeffs([pick(0), pick(1), pick(2), pick(3)]);
                            for (s, cs) in c.into_iter().enumerate() {
                                h[s * 16 + ay * 4 + az] = cs;
                            }
                        }
                    }
                    for px in 0..4 {
                        for az in 0..4 {
                            let pick = |s: usize| h[px * 16 + s * 4 + az];
                            let c = hermite_coeffs([pick(0), pick(1), pick(2), pick(3)]);
                            for (s, cs) in c.into_iter().enumerate() {
                                h[px * 16 + s * 4 + az] = cs;
                            }
                        }
                    }
                    for px in 0..4 {
                        for qy in 0..4 {
                            let pick = |s: usize| h[px * 16 + qy * 4 + s];
                            let c = hermite_coeffs([pick(0), pick(1), pick(2), pick(3)]);
                            for (s, cs) in c.into_iter().enumerate() {
                                h[px * 16 + qy * 4 + s] = cs;
                            }
                        }
                    }
                    coeffs.push(h);
                }
            }
        }

        Ok(Self { x, y, z, coeffs })
    }

    pub fn xa(&self) -> &[f64] {
        &self.x.knots
    }

    pub fn ya(&self) -> &[f64] {
        &self.y.knots
    }

    pub fn za(&self) -> &[f64] {
        &self.z.knots
    }

    fn cell(&self, x: f64, y: f64, z: f64) -> Result<(&[f64; 64], f64, f64, f64)> {
        let (i, u) = self.x.locate(x)?;
        let (j, v) = self.y.locate(y)?;
        let (k, w) = self.z.locate(z)?;
        let cell = (i * (self.y.len() - 1) + j) * (self.z.len() - 1) + k;
        Ok((&self.coeffs[cell], u, v, w))
    }

    /// Value and the three first partials in one cell lookup, with the point
    /// clamped into the grid. This is the hot path of field evaluation.
    pub fn sample_clamped(&self, x: f64, y: f64, z: f64) -> (f64, [f64; 3]) {
        let (i, u) = self.x.locate_clamped(x);
        let (j, v) = self.y.locate_clamped(y);
        let (k, w) = self.z.locate_clamped(z);
        let a = &self.coeffs[(i * (self.y.len() - 1) + j) * (self.z.len() - 1) + k];
        let up = [1.0, u, u * u, u * u * u];
        let vp = [1.0, v, v * v, v * v * v];
        let wp = [1.0, w, w * w, w * w * w];
        let dup = [0.0, 1.0, 2.0 * u, 3.0 * u * u];
        let dvp = [0.0, 1.0, 2.0 * v, 3.0 * v * v];
        let dwp = [0.0, 1.0, 2.0 * w, 3.0 * w * w];
        let mut f = 0.0;
        let mut d = [0.0; 3];
        for p in 0..4 {
            for q in 0..4 {
                for r in 0..4 {
                    let c = a[p * 16 + q * 4 + r];
                    f += c * up[p] * vp[q] * wp[r];
                    d[0] += c * dup[p] * vp[q] * wp[r];
                    d[1] += c * up[p] * dvp[q] * wp[r];
                    d[2] += c * up[p] * vp[q] * dwp[r];
                }
            }
        }
        (
            f,
            [d[0] / self.x.step, d[1] / self.y.step, d[2] / self.z.step],
        )
    }

    /// Interpolated value at (x, y, z).
    pub fn eval(&self, x: f64, y: f64, z: f64) -> Result<f64> {
        let (a, u, v, w) = self.cell(x, y, z)?;
        let up = [1.0, u, u * u, u * u * u];
        let vp = [1.0, v, v * v, v * v * v];
        let wp = [1.0, w, w * w, w * w * w];
        let mut sum = 0.0;
        for p in 0..4 {
            for q in 0..4 {
                for r in 0..4 {
                    sum += a[p * 16 + q * 4 + r] * up[p] * vp[q] * wp[r];
                }
            }
        }
        Ok(sum)
    }

    /// Interpolated ∂f/∂x at (x, y, z).
    pub fn deriv_x(&self, x: f64, y: f64, z: f64) -> Result<f64> {
        let (a, u, v, w) = self.cell(x, y, z)?;
        let dup = [1.0, 2.0 * u, 3.0 * u * u];
        let vp = [1.0, v, v * v, v * v * v];
        let wp = [1.0, w, w * w, w * w * w];
        let mut sum = 0.0;
        for p in 1..4 {
            for q in 0..4 {
                for r in 0..4 {
                    sum += a[p * 16 + q * 4 + r] * dup[p - 1] * vp[q] * wp[r];
                }
            }
        }
        Ok(sum / self.x.step)
    }

    /// Interpolated ∂f/∂y at (x, y, z).
    pub fn deriv_y(&self, x: f64, y: f64, z: f64) -> Result<f64> {
        let (a, u, v, w) = self.cell(x, y, z)?;
        let up = [1.0, u, u * u, u * u * u];
        let dvp = [1.0, 2.0 * v, 3.0 * v * v];
        let wp = [1.0, w, w * w, w * w * w];
        let mut sum = 0.0;
        for p in 0..4 {
            for q in 1..4 {
                for r in 0..4 {
                    sum += a[p * 16 + q * 4 + r] * up[p] * dvp[q - 1] * wp[r];
                }
            }
        }
        Ok(sum / self.y.step)
    }

    /// Interpolated ∂f/∂z at (x, y, z).
    pub fn deriv_z(&self, x: f64, y: f64, z: f64) -> Result<f64> {
        let (a, u, v, w) = self.cell(x, y, z)?;
        let up = [1.0, u, u * u, u * u * u];
        let vp = [1.0, v, v * v, v * v * v];
        let dwp = [1.0, 2.0 * w, 3.0 * w * w];
        let mut sum = 0.0;
        for p in 0..4 {
            for q in 0..4 {
                for r in 1..4 {
                    sum += a[p * 16 + q * 4 + r] * up[p] * vp[q] * dwp[r - 1];
                }
            }
        }
        Ok(sum / self.z.step)
    }
}
