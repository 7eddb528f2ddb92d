//! Vector math re-exports and relativistic kinematics helpers.

pub use glam::DVec3;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Space-time point: position (mm) and global time (ns).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: DVec3,
    pub time: f64,
}

impl Vertex {
    #[inline]
    pub const fn new(position: DVec3, time: f64) -> Self {
        Self { position, time }
    }

    /// Components as `[x, y, z, t]`.
    #[inline]
    pub fn to_array(&self) -> [f64; 4] {
        [self.position.x, self.position.y, self.position.z, self.time]
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.3}, {:.3}, {:.3}) mm @ {:.3} ns",
            self.position.x, self.position.y, self.position.z, self.time
        )
    }
}

/// Four-momentum: momentum vector and total energy (MeV).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FourMomentum {
    pub momentum: DVec3,
    pub energy: f64,
}

impl FourMomentum {
    /// Build from a momentum vector and rest mass, using `E = sqrt(|p|^2 + m^2)`.
    pub fn from_momentum(momentum: DVec3, mass: f64) -> Self {
        Self {
            momentum,
            energy: total_energy(momentum, mass),
        }
    }

    /// Invariant mass, `sqrt(E^2 - |p|^2)` (0 when numerically negative).
    pub fn mass(&self) -> f64 {
        (self.energy * self.energy - self.momentum.length_squared())
            .max(0.0)
            .sqrt()
    }
}

/// Momentum magnitude from kinetic energy and rest mass:
/// `p = sqrt((m + T)^2 - m^2)`.
#[inline]
pub fn momentum_magnitude(kinetic_energy: f64, mass: f64) -> f64 {
    let total = mass + kinetic_energy;
    (total * total - mass * mass).max(0.0).sqrt()
}

/// Total energy from momentum vector and rest mass.
#[inline]
pub fn total_energy(momentum: DVec3, mass: f64) -> f64 {
    (momentum.length_squared() + mass * mass).sqrt()
}
