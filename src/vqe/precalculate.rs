use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::estimator::{EstimatorPub, StatevectorEstimator};
use crate::fixture::save_json;
use crate::observable::PauliSum;

use super::energy::{vqe_energy, VqeMethod};

pub const NUM_CIRCUITS: usize = 3;

/// Qubit counts a precalculation run covers.
pub const QUBIT_COUNTS: [usize; 5] = [4, 6, 8, 10, 12];

/// Exact expectation value of an observable together with its spectrum bounds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceValue {
    pub exact: f64,
    pub max: f64,
    pub min: f64,
}

pub type ReferenceData = BTreeMap<String, ReferenceValue>;

/// Both spin blocks hold a quarter of the orbitals as electrons.
fn electrons(num_qubits: usize) -> (usize, usize) {
    (num_qubits / 4, num_qubits / 4)
}

/// One pub per circuit id, each estimating the whole Hamiltonian.
pub fn method1(num_qubits: usize) -> Result<ReferenceData> {
    let (na, nb) = electrons(num_qubits);
    let pubs = (0..NUM_CIRCUITS)
        .map(|circuit_id| {
            let (circuit, observables) =
                vqe_energy(num_qubits, na, nb, circuit_id, VqeMethod::Whole)?;
            Ok(EstimatorPub::new(circuit, observables))
        })
        .collect::<Result<Vec<_>>>()?;

    let results = StatevectorEstimator::new().run(&pubs)?;

    // Every circuit id shares the Hamiltonian of this qubit count.
    let (min, max) = pubs
        .first()
        .and_then(|pub_| pub_.observables.first())
        .map(|hamiltonian| hamiltonian.eigenvalue_bounds())
        .ok_or_else(|| anyhow!("no Hamiltonian built for {} qubits", num_qubits))?;

    let mut data = ReferenceData::new();
    for (circuit_id, result) in results.iter().enumerate() {
        data.insert(
            format!("Qubits - {} - {}", num_qubits, circuit_id),
            ReferenceValue {
                exact: result.evs[0],
                max,
                min,
            },
        );
    }
    Ok(data)
}

/// A single pub whose observables are the individual Hamiltonian terms, keyed by label.
pub fn method2(num_qubits: usize) -> Result<ReferenceData> {
    let (na, nb) = electrons(num_qubits);
    let (circuit, observables) = vqe_energy(num_qubits, na, nb, 0, VqeMethod::PerTerm)?;
    let pub_ = EstimatorPub::new(circuit, observables);

    let results = StatevectorEstimator::new().run(std::slice::from_ref(&pub_))?;

    per_term_references(&pub_.observables, &results[0].evs)
}

/// Entries keyed by the label of each single-term observable.
fn per_term_references(observables: &[PauliSum], evs: &[f64]) -> Result<ReferenceData> {
    let mut data = ReferenceData::new();
    for (observable, &exact) in observables.iter().zip(evs) {
        let label = observable
            .label()
            .ok_or_else(|| anyhow!("Hamiltonian term without a Pauli string"))?;
        let (min, max) = observable.eigenvalue_bounds();
        data.insert(label, ReferenceValue { exact, max, min });
    }
    Ok(data)
}

pub fn save_file(data: &ReferenceData, path: &Path) -> Result<()> {
    save_json(data, path)
}

pub fn output_file_name(num_qubits: usize, method: VqeMethod) -> String {
    format!(
        "precalculated_data_{}_qubit_method{}.json",
        num_qubits,
        method.number()
    )
}

/// Writes one reference fixture per qubit count into `output`, returning the paths.
pub fn run_precalculate(output: &Path, method: u8) -> Result<Vec<PathBuf>> {
    let method = VqeMethod::try_from(method)?;
    if output.as_os_str().is_empty() {
        warn!("no output directory given, nothing to precalculate");
        return Ok(Vec::new());
    }

    fs::create_dir_all(output)
        .with_context(|| format!("failed to create {}", output.display()))?;

    let mut written = Vec::new();
    for num_qubits in QUBIT_COUNTS {
        info!(qubits = num_qubits, method = method.number(), "precalculating");
        let data = match method {
            VqeMethod::Whole => method1(num_qubits)?,
            VqeMethod::PerTerm => method2(num_qubits)?,
        };

        let path = output.join(output_file_name(num_qubits, method));
        save_file(&data, &path)?;
        info!(path = %path.display(), entries = data.len(), "wrote reference values");
        written.push(path);
    }
    Ok(written)
}
