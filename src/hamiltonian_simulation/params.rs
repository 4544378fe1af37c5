use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::fixture::{load_json, save_json};

const EMBEDDED: &str = include_str!("../../data/precalculated_data.json");

/// Simulation parameters shared by every kernel run. The expected distributions are
/// computed from these, so changing one means regenerating the other.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrecalculatedData {
    /// Strength of disorder.
    pub w: f64,
    /// Number of Trotter steps.
    pub k: usize,
    /// Total simulation time.
    pub t: f64,
    /// Precalculated random fields in [-1, 1], one per qubit.
    pub hx: Vec<f64>,
    pub hz: Vec<f64>,
    /// `"<hamiltonian> - Qubits <n>"` to bit string probabilities.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub distributions: BTreeMap<String, BTreeMap<String, f64>>,
}

impl PrecalculatedData {
    /// The copy of `data/precalculated_data.json` compiled into the crate.
    pub fn embedded() -> Result<Self> {
        serde_json::from_str(EMBEDDED).context("embedded precalculated data is malformed")
    }

    pub fn load(path: &Path) -> Result<Self> {
        load_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_json(self, path)
    }

    /// Largest register the precalculated fields cover.
    pub fn max_qubits(&self) -> usize {
        self.hx.len().min(self.hz.len())
    }

    pub fn fields(&self, num_qubits: usize) -> Result<(&[f64], &[f64])> {
        if num_qubits > self.max_qubits() {
            anyhow::bail!(
                "precalculated data only covers {} qubits, {} requested",
                self.max_qubits(),
                num_qubits
            );
        }
        Ok((&self.hx[..num_qubits], &self.hz[..num_qubits]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    #[test]
    fn test_embedded_data() -> Result<()> {
        let data = PrecalculatedData::embedded()?;

        assert_eq!(5, data.k);
        assert_approx_eq!(0.2, data.t);
        assert_approx_eq!(10.0, data.w);
        assert_eq!(12, data.max_qubits());
        assert!(data.hx.iter().chain(&data.hz).all(|h| (-1.0..=1.0).contains(h)));
        assert!(data.distributions.is_empty());

        Ok(())
    }

    #[test]
    fn test_fields_are_truncated() -> Result<()> {
        let data = PrecalculatedData::embedded()?;
        let (hx, hz) = data.fields(3)?;

        assert_eq!(3, hx.len());
        assert_eq!(3, hz.len());
        assert_approx_eq!(data.hx[2], hx[2]);
        assert!(data.fields(13).is_err());

        Ok(())
    }

    #[test]
    fn test_save_and_load_keeps_distributions() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("precalculated_data.json");

        let mut data = PrecalculatedData::embedded()?;
        data.distributions.insert(
            "tfim - Qubits 2".to_string(),
            BTreeMap::from([("00".to_string(), 0.75), ("11".to_string(), 0.25)]),
        );
        data.save(&path)?;

        let loaded = PrecalculatedData::load(&path)?;
        assert_eq!(data.hx, loaded.hx);
        assert_approx_eq!(0.75, loaded.distributions["tfim - Qubits 2"]["00"]);

        Ok(())
    }
}
