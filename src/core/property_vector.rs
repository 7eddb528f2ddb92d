//! Energy-ordered property vectors.
//!
//! A property vector samples one physical quantity (refractive index,
//! absorption length, photoelectric efficiency, ...) at increasing photon
//! energies. Lookups interpolate linearly between neighbouring samples and
//! clamp outside the sampled range, so threshold behaviour lives entirely in
//! the data: place two samples close together to make a step.

use crate::util::{Error, Result};

/// Minimum number of samples a property vector must hold.
pub const MIN_SAMPLES: usize = 2;

/// Immutable table of `(energy, value)` samples, strictly increasing in energy.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyVector {
    energies: Vec<f64>,
    values: Vec<f64>,
}

impl PropertyVector {
    /// Build a vector from parallel energy and value slices.
    ///
    /// Fails with [`Error::InvalidInput`] when the slices differ in length,
    /// hold fewer than [`MIN_SAMPLES`] entries, contain non-finite numbers, or
    /// when the energies are not strictly increasing.
    pub fn new(energies: &[f64], values: &[f64]) -> Result<Self> {
        if energies.len() != values.len() {
            return Err(Error::invalid(format!(
                "energy and value counts differ ({} vs {})",
                energies.len(),
                values.len()
            )));
        }
        if energies.len() < MIN_SAMPLES {
            return Err(Error::invalid(format!(
                "property vector needs at least {} samples, got {}",
                MIN_SAMPLES,
                energies.len()
            )));
        }
        for (label, samples) in [("energy", energies), ("value", values)] {
            if let Some(i) = samples.iter().position(|x| !x.is_finite()) {
                return Err(Error::invalid(format!(
                    "{}[{}] is not finite ({})",
                    label, i, samples[i]
                )));
            }
        }
        if let Some(i) = energies.windows(2).position(|w| w[1] <= w[0]) {
            return Err(Error::invalid(format!(
                "energies must be strictly increasing: e[{}] = {} is not below e[{}] = {}",
                i,
                energies[i],
                i + 1,
                energies[i + 1]
            )));
        }

        Ok(Self {
            energies: energies.to_vec(),
            values: values.to_vec(),
        })
    }

    /// Build a vector from `(energy, value)` pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self> {
        let (energies, values): (Vec<f64>, Vec<f64>) = pairs.iter().copied().unzip();
        Self::new(&energies, &values)
    }

    /// Interpolated value at `energy`.
    ///
    /// Below the first sample the first value is returned, above the last
    /// sample the last value; in between the two bracketing samples are
    /// joined linearly. Sample energies map to their values exactly.
    /// A NaN energy yields NaN.
    pub fn value(&self, energy: f64) -> f64 {
        if energy.is_nan() {
            return f64::NAN;
        }
        let n = self.energies.len();
        if energy <= self.energies[0] {
            return self.values[0];
        }
        if energy >= self.energies[n - 1] {
            return self.values[n - 1];
        }

        // First index with e[i] > energy; 1 <= hi <= n - 1 after the clamps above.
        let hi = self.energies.partition_point(|&e| e <= energy);
        let lo = hi - 1;
        let (e0, e1) = (self.energies[lo], self.energies[hi]);
        let (v0, v1) = (self.values[lo], self.values[hi]);
        if energy == e0 {
            return v0;
        }
        v0 + (v1 - v0) * (energy - e0) / (e1 - e0)
    }

    /// Lowest sampled energy.
    #[inline]
    pub fn min_energy(&self) -> f64 {
        self.energies[0]
    }

    /// Highest sampled energy.
    #[inline]
    pub fn max_energy(&self) -> f64 {
        self.energies[self.energies.len() - 1]
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.energies.len()
    }

    /// Always false; construction rejects short vectors.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }

    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over `(energy, value)` samples in energy order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.energies.iter().copied().zip(self.values.iter().copied())
    }
}
