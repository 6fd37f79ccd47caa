use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use splines::Bicubic;

use crate::table::{Column, grid2, read_table, recover_axis};
use crate::{BFieldTensor, EField, FieldError, Result, UnitConversion};

/// On-axis cutoff below which the azimuthal rotation is degenerate.
const AXIS_EPS: f64 = 1e-12;

/// Axisymmetric field from a regular (r, z) table.
///
/// Field columns BX/BY/BZ are the radial, azimuthal and axial components in
/// the r-z half plane. One bicubic spline per component is precomputed on
/// load; an evaluation rotates values and first derivatives back into
/// Cartesian coordinates with φ = atan2(y, x). Points outside the table
/// clamp to the boundary spline.
pub struct AxisymmetricTable {
    br: Option<Bicubic>,
    bphi: Option<Bicubic>,
    bz: Option<Bicubic>,
    er: Option<Bicubic>,
    ez: Option<Bicubic>,
    v: Option<Bicubic>,
}

impl AxisymmetricTable {
    /// Loads a table from a file with the given unit conversion.
    pub fn from_file(path: &Path, units: &UnitConversion) -> Result<Self> {
        log::info!("loading 2-D axisymmetric field table from {}", path.display());
        Self::from_reader(BufReader::new(File::open(path)?), units)
    }

    /// Builds the table from any whitespace-column source.
    pub fn from_reader(reader: impl BufRead, units: &UnitConversion) -> Result<Self> {
        let raw = read_table(reader, units)?;

        let r = raw
            .column(Column::R)
            .or_else(|| raw.column(Column::X))
            .ok_or(FieldError::MissingColumn("R"))?;
        let z = raw.column(Column::Z).ok_or(FieldError::MissingColumn("Z"))?;
        let ra = recover_axis("R", r)?;
        let za = recover_axis("Z", z)?;

        let spline = |col: Column| -> Result<Option<Bicubic>> {
            match raw.column(col) {
                Some(vals) => {
                    let grid = grid2(r, z, &ra, &za, vals)?;
                    Ok(Some(Bicubic::new(&ra, &za, &grid)?))
                }
                None => Ok(None),
            }
        };

        let br = spline(Column::Bx)?;
        let bphi = spline(Column::By)?;
        let bz = spline(Column::Bz)?;
        let v = spline(Column::V)?;
        // A potential column wins over explicit E columns.
        let (er, ez) = if v.is_some() {
            if raw.column(Column::Ex).is_some() || raw.column(Column::Ez).is_some() {
                log::info!("table has a V column, explicit E columns are ignored");
            }
            (None, None)
        } else {
            (spline(Column::Ex)?, spline(Column::Ez)?)
        };

        if br.is_none() && bphi.is_none() && bz.is_none() && v.is_none() && er.is_none() && ez.is_none()
        {
            return Err(FieldError::NoFieldColumns);
        }

        log::info!(
            "recovered {}×{} grid, r ∈ [{}, {}], z ∈ [{}, {}]",
            ra.len(),
            za.len(),
            ra[0],
            ra[ra.len() - 1],
            za[0],
            za[za.len() - 1],
        );

        Ok(Self {
            br,
            bphi,
            bz,
            er,
            ez,
            v,
        })
    }

    pub(crate) fn add_b(&self, x: f64, y: f64, z: f64, scale: f64, b: &mut BFieldTensor) {
        if scale == 0.0 {
            return;
        }
        let r = x.hypot(y);
        let (cphi, sphi) = if r > AXIS_EPS {
            (x / r, y / r)
        } else {
            (1.0, 0.0)
        };

        let sample = |s: &Option<Bicubic>| match s {
            Some(s) => s.sample_clamped(r, z),
            None => (0.0, 0.0, 0.0),
        };
        let (br, dbr_dr, dbr_dz) = sample(&self.br);
        let (bphi, dbphi_dr, dbphi_dz) = sample(&self.bphi);
        let (bz, dbz_dr, dbz_dz) = sample(&self.bz);

        // Rotate values and first derivatives into Cartesian coordinates.
        // The 1/r terms are the azimuthal part of the chain rule and vanish
        // on the axis for any regular field.
        let bx_c = br * cphi - bphi * sphi;
        let by_c = br * sphi + bphi * cphi;

        let mut dbx = [
            (dbr_dr * cphi - dbphi_dr * sphi) * cphi,
            (dbr_dr * cphi - dbphi_dr * sphi) * sphi,
            dbr_dz * cphi - dbphi_dz * sphi,
        ];
        let mut dby = [
            (dbr_dr * sphi + dbphi_dr * cphi) * cphi,
            (dbr_dr * sphi + dbphi_dr * cphi) * sphi,
            dbr_dz * sphi + dbphi_dz * cphi,
        ];
        let dbz_c = [dbz_dr * cphi, dbz_dr * sphi, dbz_dz];
        if r > AXIS_EPS {
            dbx[0] += (br * sphi + bphi * cphi) * sphi / r;
            dbx[1] -= (br * sphi + bphi * cphi) * cphi / r;
            dby[0] -= (br * cphi - bphi * sphi) * sphi / r;
            dby[1] += (br * cphi - bphi * sphi) * cphi / r;
        }

        b[0][0] += scale * bx_c;
        b[1][0] += scale * by_c;
        b[2][0] += scale * bz;
        for j in 0..3 {
            b[0][j + 1] += scale * dbx[j];
            b[1][j + 1] += scale * dby[j];
            b[2][j + 1] += scale * dbz_c[j];
        }
    }

    /// Adds the electric contribution. When the table was built from a
    /// potential column, E = −∇V; the ∂E/∂x tensor is not provided by this
    /// evaluator and the caller's entries stay untouched.
    pub(crate) fn add_e(&self, x: f64, y: f64, z: f64, scale: f64, field: &mut EField) {
        if scale == 0.0 {
            return;
        }
        let r = x.hypot(y);
        let (cphi, sphi) = if r > AXIS_EPS {
            (x / r, y / r)
        } else {
            (1.0, 0.0)
        };

        let (er, ez, v) = match &self.v {
            Some(v_spline) => {
                let (v, dv_dr, dv_dz) = v_spline.sample_clamped(r, z);
                (-dv_dr, -dv_dz, v)
            }
            None => {
                let sample = |s: &Option<Bicubic>| s.as_ref().map_or(0.0, |s| s.sample_clamped(r, z).0);
                (sample(&self.er), sample(&self.ez), 0.0)
            }
        };

        field.v += scale * v;
        field.e[0] += scale * er * cphi;
        field.e[1] += scale * er * sphi;
        field.e[2] += scale * ez;
    }
}
