use std::io::Cursor;

use fields::{AxisymmetricTable, FieldEntry, FieldManager, FieldSource, UnitConversion};

/// A 2-D table holding a uniform 1 T axial field (written in cm and Gauss).
fn uniform_bz_table() -> AxisymmetricTable {
    let mut text = String::from("R Z BZ\n");
    for i in 0..6 {
        for j in 0..6 {
            let r_cm = i as f64 * 40.0;
            let z_cm = -100.0 + j as f64 * 40.0;
            text.push_str(&format!("{r_cm} {z_cm} 1e4\n"));
        }
    }
    AxisymmetricTable::from_reader(Cursor::new(text), &UnitConversion::default()).unwrap()
}

#[test]
fn test_pure_axial_field_is_rotation_invariant() {
    let manager = FieldManager::new(vec![FieldEntry::new(FieldSource::Table2D(
        uniform_bz_table(),
    ))]);

    for k in 0..12 {
        let phi = k as f64 * std::f64::consts::TAU / 12.0;
        for radius in [0.0, 0.3, 1.1] {
            let (x, y) = (radius * phi.cos(), radius * phi.sin());
            let b = manager.b(x, y, 0.25, 0.0);
            assert!(b[0][0].abs() < 1e-9, "Bx at φ = {phi}");
            assert!(b[1][0].abs() < 1e-9, "By at φ = {phi}");
            assert!((b[2][0] - 1.0).abs() < 1e-9, "Bz at φ = {phi}");
            assert!((b[3][0] - 1.0).abs() < 1e-9, "|B| at φ = {phi}");
        }
    }
}

#[test]
fn test_gradient_of_uniform_field_vanishes() {
    let manager = FieldManager::new(vec![FieldEntry::new(FieldSource::Table2D(
        uniform_bz_table(),
    ))]);
    let b = manager.b(0.7, -0.4, 0.1, 0.0);
    for row in &b {
        for v in &row[1..] {
            assert!(v.abs() < 1e-9);
        }
    }
}
