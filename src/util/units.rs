//! Internal unit system of the transport toolkit.
//!
//! Energies are in MeV, lengths in mm and times in ns. Multiply a number by a
//! unit to convert into internal units, divide to convert out of them.

#![allow(non_upper_case_globals)]

pub const MeV: f64 = 1.0;
pub const eV: f64 = 1.0e-6 * MeV;
pub const keV: f64 = 1.0e-3 * MeV;
pub const GeV: f64 = 1.0e3 * MeV;

pub const mm: f64 = 1.0;
pub const um: f64 = 1.0e-3 * mm;
pub const cm: f64 = 10.0 * mm;
pub const m: f64 = 1.0e3 * mm;

pub const ns: f64 = 1.0;
pub const ps: f64 = 1.0e-3 * ns;
pub const us: f64 = 1.0e3 * ns;

/// Electron rest energy.
pub const electron_mass_c2: f64 = 0.510_998_950 * MeV;
/// Proton rest energy.
pub const proton_mass_c2: f64 = 938.272_088_16 * MeV;
/// Alpha particle rest energy.
pub const alpha_mass_c2: f64 = 3727.379_4066 * MeV;
