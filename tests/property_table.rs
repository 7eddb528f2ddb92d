//! Interpolation behavior of property tables.

use nexus_persistency::core::{optical, MaterialPropertiesTable, PropertyVector};
use nexus_persistency::util::units::eV;
use nexus_persistency::Error;

fn steps() -> PropertyVector {
    PropertyVector::new(&[0.0, 1e-6 * 0.999, 1e-6, 2e-6], &[0.0, 0.0, 1e-2, 1e-2])
        .expect("valid table")
}

#[test]
fn test_interpolation_stays_within_bracket() {
    let energies = [1.0, 2.0, 3.5, 7.0, 10.0];
    let values = [0.3, 0.9, 0.1, 0.1, 5.0];
    let table = PropertyVector::new(&energies, &values).unwrap();

    for w in energies.windows(2).zip(values.windows(2)) {
        let ((e0, e1), (v0, v1)) = ((w.0[0], w.0[1]), (w.1[0], w.1[1]));
        let (lo, hi) = (v0.min(v1), v0.max(v1));
        for k in 0..=20 {
            let e = e0 + (e1 - e0) * k as f64 / 20.0;
            let v = table.value(e);
            assert!(v >= lo && v <= hi, "value({}) = {} outside [{}, {}]", e, v, lo, hi);
        }
    }
}

#[test]
fn test_exact_at_knots() {
    let energies = [0.2 * eV, 1.7 * eV, 4.3 * eV, 11.5 * eV];
    let values = [1.0, 1.33, 1.52, 1.61];
    let table = PropertyVector::new(&energies, &values).unwrap();
    for (e, v) in energies.iter().zip(values.iter()) {
        assert_eq!(table.value(*e), *v);
    }
}

#[test]
fn test_clamped_outside_range() {
    let table = PropertyVector::new(&[1.0, 2.0, 3.0], &[10.0, 20.0, 30.0]).unwrap();
    assert_eq!(table.value(-100.0), 10.0);
    assert_eq!(table.value(0.999), 10.0);
    assert_eq!(table.value(3.001), 30.0);
    assert_eq!(table.value(f64::MAX), 30.0);
}

#[test]
fn test_step_table() {
    let table = steps();
    // Below the edge the table is flat at zero.
    assert_eq!(table.value(0.5e-6), 0.0);

    let mid = table.value(0.9995e-6);
    assert!(mid > 0.0 && mid < 1e-2, "value(0.9995e-6) = {}", mid);

    assert_eq!(table.value(1.5e-6), 1e-2);
    assert_eq!(table.value(1e-6), 1e-2);
}

#[test]
fn test_rejects_malformed_tables() {
    assert!(matches!(PropertyVector::new(&[1.0], &[1.0]), Err(Error::InvalidInput(_))));
    assert!(matches!(PropertyVector::new(&[2.0, 1.0], &[1.0, 1.0]), Err(Error::InvalidInput(_))));
    assert!(matches!(PropertyVector::new(&[1.0, 1.0], &[1.0, 1.0]), Err(Error::InvalidInput(_))));
    assert!(matches!(PropertyVector::new(&[1.0, 2.0], &[1.0]), Err(Error::InvalidInput(_))));
}

#[test]
fn test_material_table_lookups() {
    let mut mpt = MaterialPropertiesTable::new();
    mpt.add_property("EFFICIENCY", &[1.0, 2.0], &[0.0, 1.0])
        .unwrap()
        .add_const_property("WORKFUNCTION", 4.3 * eV)
        .unwrap();

    assert_eq!(mpt.value("EFFICIENCY", 1.5).unwrap(), 0.5);
    assert_eq!(mpt.const_property("WORKFUNCTION").unwrap(), 4.3 * eV);
    assert!(matches!(mpt.value("RINDEX", 1.0), Err(Error::NotFound(_))));

    let err = mpt.add_property("ABSLENGTH", &[2.0, 1.0], &[1.0, 1.0]).unwrap_err();
    assert!(err.to_string().contains("ABSLENGTH"));
    assert!(!mpt.has_property("ABSLENGTH"));
}

#[test]
fn test_material_lookup_at_nan_energy() {
    let mut mpt = MaterialPropertiesTable::new();
    mpt.add_property("EFFICIENCY", &[1.0, 2.0], &[0.0, 1.0]).unwrap();
    assert!(mpt.value("EFFICIENCY", f64::NAN).unwrap().is_nan());
}

#[test]
fn test_stainless_steel_work_function() {
    let wf = 4.3 * eV;
    let table = optical::work_function_efficiency(wf, 1e-2).unwrap();

    assert_eq!(table.min_energy(), optical::OPT_PHOT_MIN_E);
    assert_eq!(table.max_energy(), optical::OPT_PHOT_MAX_E);
    assert_eq!(table.value(2.0 * eV), 0.0);
    assert_eq!(table.value(wf), 1e-2);
    assert_eq!(table.value(8.0 * eV), 1e-2);

    let below = table.value(wf - 0.05 * eV);
    assert!(below > 0.0 && below < 1e-2);
}
