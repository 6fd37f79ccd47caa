use ndarray::Array2;

use crate::grid::{hermite_coeffs, knot_derivs};
use crate::{Axis, Result, SplineError};

/// Bicubic interpolation over a regular (x, y) grid.
///
/// Knot derivatives are estimated with second-order finite differences and
/// the 16 polynomial coefficients of every cell are precomputed, so an
/// evaluation costs one cell lookup plus a short polynomial sum regardless of
/// the grid size.
pub struct Bicubic {
    x: Axis,
    y: Axis,
    /// Monomial coefficients aₚq of u^p·v^q per cell, row-major over cells.
    coeffs: Vec<[[f64; 4]; 4]>,
}

impl Bicubic {
    /// Builds the spline from the knot vectors and a `(xa.len(), ya.len())`
    /// value grid.
    pub fn new(xa: &[f64], ya: &[f64], za: &Array2<f64>) -> Result<Self> {
        let x = Axis::new('x', xa)?;
        let y = Axis::new('y', ya)?;

        let (nx, ny) = za.dim();
        if nx != x.len() || ny != y.len() {
            return Err(SplineError::ShapeMismatch {
                got: vec![nx, ny],
                expected: vec![x.len(), y.len()],
            });
        }
        if za.iter().any(|v| !v.is_finite()) {
            return Err(SplineError::NonFiniteValues);
        }

        // Knot derivatives in index units.
        let mut fx = Array2::zeros((nx, ny));
        for j in 0..ny {
            let col: Vec<f64> = (0..nx).map(|i| za[[i, j]]).collect();
            for (i, d) in knot_derivs(&col).into_iter().enumerate() {
                fx[[i, j]] = d;
            }
        }
        let mut fy = Array2::zeros((nx, ny));
        let mut fxy = Array2::zeros((nx, ny));
        for i in 0..nx {
            let row: Vec<f64> = (0..ny).map(|j| za[[i, j]]).collect();
            for (j, d) in knot_derivs(&row).into_iter().enumerate() {
                fy[[i, j]] = d;
            }
            let row: Vec<f64> = (0..ny).map(|j| fx[[i, j]]).collect();
            for (j, d) in knot_derivs(&row).into_iter().enumerate() {
                fxy[[i, j]] = d;
            }
        }

        let mut coeffs = Vec::with_capacity((nx - 1) * (ny - 1));
        for i in 0..nx - 1 {
            for j in 0..ny - 1 {
                // Hermite data on the cell: x-slots (f₀, f₁, fx₀, fx₁) down,
                // y-slots across.
                let mut h = [[0.0; 4]; 4];
                for (q, jj) in [(0, j), (1, j + 1)] {
                    h[0][q] = za[[i, jj]];
                    h[1][q] = za[[i + 1, jj]];
                    h[2][q] = fx[[i, jj]];
                    h[3][q] = fx[[i + 1, jj]];
                    h[0][q + 2] = fy[[i, jj]];
                    h[1][q + 2] = fy[[i + 1, jj]];
                    h[2][q + 2] = fxy[[i, jj]];
                    h[3][q + 2] = fxy[[i + 1, jj]];
                }
                // Transform to monomial coefficients along x, then along y.
                let mut a = [[0.0; 4]; 4];
                for q in 0..4 {
                    let col = hermite_coeffs([h[0][q], h[1][q], h[2][q], h[3][q]]);
                    for p in 0..4 {
                        a[p][q] = col[p];
                    }
                }
                for p in 0..4 {
                    a[p] = hermite_coeffs(a[p]);
                }
                coeffs.push(a);
            }
        }

        Ok(Self { x, y, coeffs })
    }

    pub fn xa(&self) -> &[f64] {
        &self.x.knots
    }

    pub fn ya(&self) -> &[f64] {
        &self.y.knots
    }

    fn cell(&self, x: f64, y: f64) -> Result<(&[[f64; 4]; 4], f64, f64)> {
        let (i, u) = self.x.locate(x)?;
        let (j, v) = self.y.locate(y)?;
        Ok((&self.coeffs[i * (self.y.len() - 1) + j], u, v))
    }

    /// Value, ∂f/∂x and ∂f/∂y in one cell lookup, with (x, y) clamped into
    /// the grid. This is the hot path of field evaluation.
    pub fn sample_clamped(&self, x: f64, y: f64) -> (f64, f64, f64) {
        let (i, u) = self.x.locate_clamped(x);
        let (j, v) = self.y.locate_clamped(y);
        let a = &self.coeffs[i * (self.y.len() - 1) + j];
        let up = [1.0, u, u * u, u * u * u];
        let vp = [1.0, v, v * v, v * v * v];
        let dup = [0.0, 1.0, 2.0 * u, 3.0 * u * u];
        let dvp = [0.0, 1.0, 2.0 * v, 3.0 * v * v];
        let (mut f, mut fx, mut fy) = (0.0, 0.0, 0.0);
        for p in 0..4 {
            for q in 0..4 {
                f += a[p][q] * up[p] * vp[q];
                fx += a[p][q] * dup[p] * vp[q];
                fy += a[p][q] * up[p] * dvp[q];
            }
        }
        (f, fx / self.x.step, fy / self.y.step)
    }

    /// Interpolated value at (x, y).
    pub fn eval(&self, x: f64, y: f64) -> Result<f64> {
        let (a, u, v) = self.cell(x, y)?;
        let up = [1.0, u, u * u, u * u * u];
        let vp = [1.0, v, v * v, v * v * v];
        let mut sum = 0.0;
        for p in 0..4 {
            for q in 0..4 {
                sum += a[p][q] * up[p] * vp[q];
            }
        }
        Ok(sum)
    }

    /// Interpolated ∂f/∂x at (x, y).
    pub fn deriv_x(&self, x: f64, y: f64) -> Result<f64> {
        let (a, u, v) = self.cell(x, y)?;
        let dup = [1.0, 2.0 * u, 3.0 * u * u];
        let vp = [1.0, v, v * v, v * v * v];
        let mut sum = 0.0;
        for p in 1..4 {
            for q in 0..4 {
                sum += a[p][q] * dup[p - 1] * vp[q];
            }
        }
        Ok(sum / self.x.step)
    }

    /// Interpolated ∂f/∂y at (x, y).
    pub fn deriv_y(&self, x: f64, y: f64) -> Result<f64> {
        let (a, u, v) = self.cell(x, y)?;
        let up = [1.0, u, u * u, u * u * u];
        let dvp = [1.0, 2.0 * v, 3.0 * v * v];
        let mut sum = 0.0;
        for p in 0..4 {
            for q in 1..4 {
                sum += a[p][q] * up[p] * dvp[q - 1];
            }
        }
        Ok(sum / self.y.step)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::Array2;

    fn grid(n: usize, lo: f64, step: f64) -> Vec<f64> {
        (0..n).map(|i| lo + i as f64 * step).collect()
    }

    #[test]
    fn test_rejects_bad_grids() {
        let xa = grid(4, 0.0, 1.0);
        let za = Array2::zeros((4, 4));
        assert!(Bicubic::new(&xa, &[0.0, 1.0, 2.5], &za).is_err());
        assert!(Bicubic::new(&xa, &xa, &Array2::zeros((4, 3))).is_err());

        let mut bad = Array2::zeros((4, 4));
        bad[[2, 2]] = f64::NAN;
        assert!(Bicubic::new(&xa, &xa, &bad).is_err());
    }

    #[test]
    fn test_knot_reproduction() {
        let xa = grid(5, -1.0, 0.5);
        let ya = grid(6, 2.0, 0.25);
        let za = Array2::from_shape_fn((5, 6), |(i, j)| {
            (xa[i] * 1.3).sin() + ya[j] * ya[j]
        });
        let spline = Bicubic::new(&xa, &ya, &za).unwrap();
        for (i, &x) in xa.iter().enumerate() {
            for (j, &y) in ya.iter().enumerate() {
                assert!((spline.eval(x, y).unwrap() - za[[i, j]]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_quadratic_exact() {
        // Quadratics are in the reproduction space of the cubic patches with
        // second-order difference derivatives.
        let xa = grid(6, 0.0, 0.5);
        let ya = grid(6, -1.0, 0.5);
        let f = |x: f64, y: f64| 2.0 + x + 3.0 * y + x * y + 0.5 * x * x - y * y;
        let za = Array2::from_shape_fn((6, 6), |(i, j)| f(xa[i], ya[j]));
        let spline = Bicubic::new(&xa, &ya, &za).unwrap();

        for &(x, y) in &[(0.13, -0.6), (1.01, 0.77), (2.49, 1.49), (0.0, -1.0)] {
            assert!((spline.eval(x, y).unwrap() - f(x, y)).abs() < 1e-10);
            assert!((spline.deriv_x(x, y).unwrap() - (1.0 + y + x)).abs() < 1e-9);
            assert!((spline.deriv_y(x, y).unwrap() - (3.0 + x - 2.0 * y)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_domain_error() {
        let xa = grid(3, 0.0, 1.0);
        let za = Array2::zeros((3, 3));
        let spline = Bicubic::new(&xa, &xa, &za).unwrap();
        assert!(spline.eval(-0.1, 1.0).is_err());
        assert!(spline.eval(1.0, 2.1).is_err());
    }
}
