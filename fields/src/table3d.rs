use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use splines::Tricubic;

use crate::envelope::{smooth_step, smooth_step_deriv};
use crate::table::{Column, grid3, read_table, recover_axis};
use crate::{BFieldTensor, EField, FieldError, Result, UnitConversion};

/// Field from a regular (x, y, z) cuboid table.
///
/// One tricubic interpolant per scalar column (BX/BY/BZ/V) with all cell
/// coefficients precomputed on load. E is derived from the potential by
/// differentiation. Outside the tabulated cuboid the field and all
/// derivatives are exactly zero; with a positive `boundary_width` the values
/// taper to zero through a Hermite smooth step inside each face, so the
/// cutoff is C¹.
pub struct CuboidTable {
    bx: Option<Tricubic>,
    by: Option<Tricubic>,
    bz: Option<Tricubic>,
    v: Option<Tricubic>,
    lo: [f64; 3],
    hi: [f64; 3],
    boundary_width: f64,
}

impl CuboidTable {
    /// Loads a table from a file with the given unit conversion.
    pub fn from_file(path: &Path, units: &UnitConversion, boundary_width: f64) -> Result<Self> {
        log::info!("loading 3-D field table from {}", path.display());
        Self::from_reader(BufReader::new(File::open(path)?), units, boundary_width)
    }

    /// Builds the table from any whitespace-column source.
    pub fn from_reader(
        reader: impl BufRead,
        units: &UnitConversion,
        boundary_width: f64,
    ) -> Result<Self> {
        let raw = read_table(reader, units)?;

        let x = raw.column(Column::X).ok_or(FieldError::MissingColumn("X"))?;
        let y = raw.column(Column::Y).ok_or(FieldError::MissingColumn("Y"))?;
        let z = raw.column(Column::Z).ok_or(FieldError::MissingColumn("Z"))?;
        let xa = recover_axis("X", x)?;
        let ya = recover_axis("Y", y)?;
        let za = recover_axis("Z", z)?;

        let spline = |col: Column| -> Result<Option<Tricubic>> {
            match raw.column(col) {
                Some(vals) => {
                    let grid = grid3(x, y, z, &xa, &ya, &za, vals)?;
                    Ok(Some(Tricubic::new(&xa, &ya, &za, &grid)?))
                }
                None => Ok(None),
            }
        };

        let bx = spline(Column::Bx)?;
        let by = spline(Column::By)?;
        let bz = spline(Column::Bz)?;
        let v = spline(Column::V)?;
        if bx.is_none() && by.is_none() && bz.is_none() && v.is_none() {
            return Err(FieldError::NoFieldColumns);
        }

        let lo = [xa[0], ya[0], za[0]];
        let hi = [xa[xa.len() - 1], ya[ya.len() - 1], za[za.len() - 1]];
        log::info!(
            "recovered {}×{}×{} grid on [{:?}, {:?}]",
            xa.len(),
            ya.len(),
            za.len(),
            lo,
            hi,
        );

        Ok(Self {
            bx,
            by,
            bz,
            v,
            lo,
            hi,
            boundary_width,
        })
    }

    fn inside(&self, p: [f64; 3]) -> bool {
        (0..3).all(|a| p[a] >= self.lo[a] && p[a] <= self.hi[a])
    }

    /// Smooth boundary mask and its gradient at `p`.
    ///
    /// The mask is the product over axes of S(d/w), d the distance to the
    /// nearer face of that axis, and equals 1 deeper than `boundary_width`
    /// inside the cuboid.
    fn mask(&self, p: [f64; 3]) -> (f64, [f64; 3]) {
        let w = self.boundary_width;
        if w <= 0.0 {
            return (1.0, [0.0; 3]);
        }
        let mut s = [1.0; 3];
        let mut ds = [0.0; 3];
        for a in 0..3 {
            let d_lo = p[a] - self.lo[a];
            let d_hi = self.hi[a] - p[a];
            // Gradient sign flips on the far face.
            let (d, sign) = if d_lo <= d_hi { (d_lo, 1.0) } else { (d_hi, -1.0) };
            if d < w {
                let u = d / w;
                s[a] = smooth_step(u);
                ds[a] = sign * smooth_step_deriv(u) / w;
            }
        }
        let m = s[0] * s[1] * s[2];
        let dm = [
            ds[0] * s[1] * s[2],
            s[0] * ds[1] * s[2],
            s[0] * s[1] * ds[2],
        ];
        (m, dm)
    }

    pub(crate) fn add_b(&self, x: f64, y: f64, z: f64, scale: f64, b: &mut BFieldTensor) {
        let p = [x, y, z];
        if scale == 0.0 || !self.inside(p) {
            return;
        }
        let (m, dm) = self.mask(p);
        for (i, spline) in [&self.bx, &self.by, &self.bz].into_iter().enumerate() {
            let Some(spline) = spline else { continue };
            let (f, d) = spline.sample_clamped(x, y, z);
            b[i][0] += scale * f * m;
            for j in 0..3 {
                b[i][j + 1] += scale * (d[j] * m + f * dm[j]);
            }
        }
    }

    /// Adds the electric contribution, E = −∇V. The ∂E/∂x tensor would need
    /// second derivatives of the potential and is not provided by this
    /// evaluator; the caller's entries stay untouched.
    pub(crate) fn add_e(&self, x: f64, y: f64, z: f64, scale: f64, field: &mut EField) {
        let p = [x, y, z];
        if scale == 0.0 || !self.inside(p) {
            return;
        }
        let Some(v_spline) = &self.v else { return };
        let (m, dm) = self.mask(p);
        let (v, dv) = v_spline.sample_clamped(x, y, z);
        field.v += scale * v * m;
        for j in 0..3 {
            // −∂(V·m)/∂xⱼ
            field.e[j] += scale * -(dv[j] * m + v * dm[j]);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    /// A 3-D table with Bz = 2 T on x, y, z ∈ [0, 1] m (written in cm/Gauss).
    fn table_text() -> String {
        let mut text = String::from("X Y Z BZ\n");
        for i in 0..5 {
            for j in 0..5 {
                for k in 0..5 {
                    text.push_str(&format!(
                        "{} {} {} 2e4\n",
                        i as f64 * 25.0,
                        j as f64 * 25.0,
                        k as f64 * 25.0,
                    ));
                }
            }
        }
        text
    }

    fn load(boundary_width: f64) -> CuboidTable {
        CuboidTable::from_reader(
            Cursor::new(table_text()),
            &UnitConversion::default(),
            boundary_width,
        )
        .unwrap()
    }

    #[test]
    fn test_zero_outside() {
        let table = load(0.1);
        for p in [[-0.2, 0.5, 0.5], [0.5, 1.3, 0.5], [0.5, 0.5, -1e6]] {
            let mut b: BFieldTensor = [[0.0; 4]; 4];
            table.add_b(p[0], p[1], p[2], 1.0, &mut b);
            assert_eq!(b, [[0.0; 4]; 4]);
            let mut e = EField::default();
            table.add_e(p[0], p[1], p[2], 1.0, &mut e);
            assert_eq!(e, EField::default());
        }
    }

    #[test]
    fn test_full_strength_in_the_bulk() {
        let table = load(0.1);
        let mut b: BFieldTensor = [[0.0; 4]; 4];
        table.add_b(0.5, 0.5, 0.5, 1.0, &mut b);
        assert!((b[2][0] - 2.0).abs() < 1e-9);
        assert!(b[2][1].abs() < 1e-9);
    }

    #[test]
    fn test_boundary_taper_continuous() {
        let table = load(0.2);
        // The mask reaches exactly zero on the face.
        let mut b: BFieldTensor = [[0.0; 4]; 4];
        table.add_b(0.0, 0.5, 0.5, 1.0, &mut b);
        assert!(b[2][0].abs() < 1e-12);

        // Halfway into the taper the value follows the smooth step, and the
        // analytic gradient matches a difference quotient of the mask.
        let mut b: BFieldTensor = [[0.0; 4]; 4];
        table.add_b(0.1, 0.5, 0.5, 1.0, &mut b);
        assert!((b[2][0] - 2.0 * smooth_step(0.5)).abs() < 1e-9);

        let at = |x: f64| {
            let mut b: BFieldTensor = [[0.0; 4]; 4];
            table.add_b(x, 0.5, 0.5, 1.0, &mut b);
            b[2][0]
        };
        let h = 1e-6;
        let numeric = (at(0.1 + h) - at(0.1 - h)) / (2.0 * h);
        let mut b: BFieldTensor = [[0.0; 4]; 4];
        table.add_b(0.1, 0.5, 0.5, 1.0, &mut b);
        assert!((b[2][1] - numeric).abs() < 1e-5);
    }

    #[test]
    fn test_no_boundary_width() {
        let table = load(0.0);
        let mut b: BFieldTensor = [[0.0; 4]; 4];
        table.add_b(0.0, 0.5, 0.5, 1.0, &mut b);
        assert!((b[2][0] - 2.0).abs() < 1e-9);
    }
}
