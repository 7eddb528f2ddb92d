//! Particle definitions as seen by the tracking hooks.

use serde::{Deserialize, Serialize};

use crate::util::units::{alpha_mass_c2, electron_mass_c2, proton_mass_c2};

/// Tracking category of a particle species.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Recorded in the particle graph.
    #[default]
    Standard,
    /// Optical photon; far too numerous to record.
    OpticalPhoton,
    /// Drifting ionization electron; bookkept by the drift model instead.
    IonizationElectron,
}

/// Static description of a particle species.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleDefinition {
    pub name: String,
    pub pdg_code: i32,
    /// Rest energy (MeV).
    pub mass: f64,
    pub category: Category,
}

impl ParticleDefinition {
    pub fn new(name: &str, pdg_code: i32, mass: f64) -> Self {
        Self {
            name: name.to_string(),
            pdg_code,
            mass,
            category: Category::Standard,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Whether tracks of this species get a record.
    #[inline]
    pub fn is_recorded(&self) -> bool {
        self.category == Category::Standard
    }

    pub fn electron() -> Self {
        Self::new("e-", 11, electron_mass_c2)
    }

    pub fn positron() -> Self {
        Self::new("e+", -11, electron_mass_c2)
    }

    pub fn gamma() -> Self {
        Self::new("gamma", 22, 0.0)
    }

    pub fn proton() -> Self {
        Self::new("proton", 2212, proton_mass_c2)
    }

    pub fn alpha() -> Self {
        Self::new("alpha", 1_000_020_040, alpha_mass_c2)
    }

    pub fn optical_photon() -> Self {
        Self::new("opticalphoton", -22, 0.0).with_category(Category::OpticalPhoton)
    }

    pub fn ionization_electron() -> Self {
        Self::new("ie-", 0, electron_mass_c2).with_category(Category::IonizationElectron)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_categories() {
        assert!(ParticleDefinition::electron().is_recorded());
        assert!(ParticleDefinition::gamma().is_recorded());
        assert!(!ParticleDefinition::optical_photon().is_recorded());
        assert!(!ParticleDefinition::ionization_electron().is_recorded());
    }
}
