use std::io::BufRead;

use ndarray::{Array2, Array3};

use crate::{FieldError, Result};

/// Unit conversion factors applied to table columns on load.
///
/// The defaults match the common table convention: lengths in cm, B in
/// Gauss, E in V/cm, potential in V.
#[derive(Clone, Copy, Debug)]
pub struct UnitConversion {
    /// Coordinate columns → m.
    pub length: f64,
    /// B columns → T.
    pub b: f64,
    /// E columns → V/m.
    pub e: f64,
    /// V column → V.
    pub potential: f64,
}

impl Default for UnitConversion {
    fn default() -> Self {
        Self {
            length: 0.01,
            b: 1e-4,
            e: 100.0,
            potential: 1.0,
        }
    }
}

/// A recognized table column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Column {
    X,
    Y,
    Z,
    R,
    Bx,
    By,
    Bz,
    Ex,
    Ey,
    Ez,
    V,
}

impl Column {
    fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "X" => Some(Self::X),
            "Y" => Some(Self::Y),
            "Z" => Some(Self::Z),
            "R" => Some(Self::R),
            "BX" => Some(Self::Bx),
            "BY" => Some(Self::By),
            "BZ" => Some(Self::Bz),
            "EX" => Some(Self::Ex),
            "EY" => Some(Self::Ey),
            "EZ" => Some(Self::Ez),
            "V" => Some(Self::V),
            _ => None,
        }
    }

    fn factor(self, units: &UnitConversion) -> f64 {
        match self {
            Self::X | Self::Y | Self::Z | Self::R => units.length,
            Self::Bx | Self::By | Self::Bz => units.b,
            Self::Ex | Self::Ey | Self::Ez => units.e,
            Self::V => units.potential,
        }
    }
}

/// Unit-converted table columns in header order.
pub(crate) struct RawTable {
    pub(crate) columns: Vec<(Column, Vec<f64>)>,
}

impl RawTable {
    pub(crate) fn column(&self, kind: Column) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(c, _)| *c == kind)
            .map(|(_, v)| v.as_slice())
    }
}

/// Reads a whitespace-separated column table.
///
/// Empty lines and `#` comments are skipped; the first content line names
/// the columns in free order; every following line holds one grid point.
pub(crate) fn read_table(reader: impl BufRead, units: &UnitConversion) -> Result<RawTable> {
    let mut header: Option<Vec<Column>> = None;
    let mut columns: Vec<(Column, Vec<f64>)> = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();

        match &header {
            None => {
                let mut cols = Vec::with_capacity(tokens.len());
                for token in &tokens {
                    let col = Column::parse(token)
                        .ok_or_else(|| FieldError::UnknownColumn(token.to_string()))?;
                    cols.push(col);
                    columns.push((col, Vec::new()));
                }
                header = Some(cols);
            }
            Some(cols) => {
                if tokens.len() != cols.len() {
                    return Err(FieldError::RaggedRow {
                        line: lineno + 1,
                        got: tokens.len(),
                        expected: cols.len(),
                    });
                }
                for (slot, token) in columns.iter_mut().zip(&tokens) {
                    let value: f64 = token.parse().map_err(|_| FieldError::BadNumber {
                        line: lineno + 1,
                        value: token.to_string(),
                    })?;
                    if !value.is_finite() {
                        return Err(FieldError::BadNumber {
                            line: lineno + 1,
                            value: token.to_string(),
                        });
                    }
                    slot.1.push(value * slot.0.factor(units));
                }
            }
        }
    }

    if columns.is_empty() || columns[0].1.is_empty() {
        return Err(FieldError::NonRectangular("table holds no data rows".into()));
    }
    Ok(RawTable { columns })
}

/// Sorted distinct knots of a coordinate column.
pub(crate) fn recover_axis(name: &'static str, col: &[f64]) -> Result<Vec<f64>> {
    let mut knots = col.to_vec();
    knots.sort_by(|a, b| a.partial_cmp(b).unwrap());
    knots.dedup();
    if knots.len() < 2 {
        return Err(FieldError::NonRectangular(format!(
            "coordinate {name} has fewer than 2 distinct values"
        )));
    }
    Ok(knots)
}

fn knot_index(axis: &[f64], v: f64) -> Option<usize> {
    let step = axis[1] - axis[0];
    let i = ((v - axis[0]) / step).round();
    if i < 0.0 || i >= axis.len() as f64 {
        return None;
    }
    let i = i as usize;
    ((axis[i] - v).abs() <= step * 1e-6).then_some(i)
}

/// Scatters rows onto a full (x, y) grid, verifying every cell is hit once.
pub(crate) fn grid2(
    xs: &[f64],
    ys: &[f64],
    xa: &[f64],
    ya: &[f64],
    vals: &[f64],
) -> Result<Array2<f64>> {
    let mut grid = Array2::from_elem((xa.len(), ya.len()), f64::NAN);
    for ((&x, &y), &v) in xs.iter().zip(ys).zip(vals) {
        let (Some(i), Some(j)) = (knot_index(xa, x), knot_index(ya, y)) else {
            return Err(FieldError::NonRectangular(format!(
                "point ({x}, {y}) is off the recovered grid"
            )));
        };
        if !grid[[i, j]].is_nan() {
            return Err(FieldError::NonRectangular(format!(
                "grid point ({x}, {y}) appears more than once"
            )));
        }
        grid[[i, j]] = v;
    }
    if grid.iter().any(|v| v.is_nan()) {
        return Err(FieldError::NonRectangular(
            "not every grid point is present".into(),
        ));
    }
    Ok(grid)
}

/// Scatters rows onto a full (x, y, z) grid, verifying every cell is hit once.
pub(crate) fn grid3(
    xs: &[f64],
    ys: &[f64],
    zs: &[f64],
    xa: &[f64],
    ya: &[f64],
    za: &[f64],
    vals: &[f64],
) -> Result<Array3<f64>> {
    let mut grid = Array3::from_elem((xa.len(), ya.len(), za.len()), f64::NAN);
    for (((&x, &y), &z), &v) in xs.iter().zip(ys).zip(zs).zip(vals) {
        let (Some(i), Some(j), Some(k)) =
            (knot_index(xa, x), knot_index(ya, y), knot_index(za, z))
        else {
            return Err(FieldError::NonRectangular(format!(
                "point ({x}, {y}, {z}) is off the recovered grid"
            )));
        };
        if !grid[[i, j, k]].is_nan() {
            return Err(FieldError::NonRectangular(format!(
                "grid point ({x}, {y}, {z}) appears more than once"
            )));
        }
        grid[[i, j, k]] = v;
    }
    if grid.iter().any(|v| v.is_nan()) {
        return Err(FieldError::NonRectangular(
            "not every grid point is present".into(),
        ));
    }
    Ok(grid)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_table_units() {
        let text = "# comment\nR Z BZ\n0 0 1e4\n100 0 1e4\n0 100 1e4\n100 100 1e4\n";
        let table = read_table(Cursor::new(text), &UnitConversion::default()).unwrap();
        let r = table.column(Column::R).unwrap();
        assert_eq!(r[1], 1.0); // 100 cm → 1 m
        let bz = table.column(Column::Bz).unwrap();
        assert!((bz[0] - 1.0).abs() < 1e-12); // 1e4 G → 1 T
    }

    #[test]
    fn test_read_table_failures() {
        let units = UnitConversion::default();
        assert!(matches!(
            read_table(Cursor::new("R Z Q\n"), &units),
            Err(FieldError::UnknownColumn(_))
        ));
        assert!(matches!(
            read_table(Cursor::new("R Z\n1 2 3\n"), &units),
            Err(FieldError::RaggedRow { .. })
        ));
        assert!(matches!(
            read_table(Cursor::new("R Z\n1 pear\n"), &units),
            Err(FieldError::BadNumber { .. })
        ));
        assert!(matches!(
            read_table(Cursor::new("R Z\n1 nan\n"), &units),
            Err(FieldError::BadNumber { .. })
        ));
    }

    #[test]
    fn test_grid2_rectangular_check() {
        let xa = [0.0, 1.0];
        let ya = [0.0, 1.0];
        // Missing the (1, 1) corner.
        let xs = [0.0, 1.0, 0.0];
        let ys = [0.0, 0.0, 1.0];
        let vals = [1.0, 2.0, 3.0];
        assert!(grid2(&xs, &ys, &xa, &ya, &vals).is_err());

        let xs = [0.0, 1.0, 0.0, 1.0];
        let ys = [0.0, 0.0, 1.0, 1.0];
        let vals = [1.0, 2.0, 3.0, 4.0];
        let grid = grid2(&xs, &ys, &xa, &ya, &vals).unwrap();
        assert_eq!(grid[[1, 1]], 4.0);
    }
}
