use std::collections::BTreeMap;

use anyhow::Result;
use tracing::info;

use crate::qstate::QState;

use super::kernel::{
    CircuitVariant, HamiltonianKernel, HamiltonianKind, KernelOptions, Method,
    MAX_PRECALCULATED_QUBITS,
};
use super::params::PrecalculatedData;

/// Probabilities below this are left out of stored distributions.
const PROBABILITY_CUTOFF: f64 = 1e-10;

const MIN_QUBITS: usize = 2;

/// Key of a stored distribution, e.g. `"tfim - Qubits 4"`.
pub fn distribution_key(hamiltonian: HamiltonianKind, num_qubits: usize) -> String {
    format!("{} - Qubits {}", hamiltonian, num_qubits)
}

/// The exact measurement distribution of the kernel's circuit.
pub fn expected_distribution(
    data: &PrecalculatedData,
    options: &KernelOptions,
) -> Result<BTreeMap<String, f64>> {
    let kernel = HamiltonianKernel::new(data, options, CircuitVariant::Optimized)?;
    let mut circuit = kernel.overall_circuit()?;
    circuit.remove_final_measurements();

    let state = circuit.apply(&QState::zero_state(options.num_qubits))?;
    Ok(state.distribution(PROBABILITY_CUTOFF))
}

/// Fills `data.distributions` for both Hamiltonians at every supported size,
/// replacing entries that are already there.
pub fn precalculate_distributions(data: &mut PrecalculatedData, method: Method) -> Result<()> {
    let max_qubits = MAX_PRECALCULATED_QUBITS.min(data.max_qubits());

    for hamiltonian in [HamiltonianKind::Tfim, HamiltonianKind::Heisenberg] {
        for num_qubits in MIN_QUBITS..=max_qubits {
            let options = KernelOptions::new(num_qubits, hamiltonian, method);
            let distribution = expected_distribution(data, &options)?;
            info!(
                hamiltonian = %hamiltonian,
                qubits = num_qubits,
                outcomes = distribution.len(),
                "computed distribution"
            );
            data.distributions
                .insert(distribution_key(hamiltonian, num_qubits), distribution);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    #[test]
    fn test_distribution_key() {
        assert_eq!("heisenberg - Qubits 6", distribution_key(HamiltonianKind::Heisenberg, 6));
    }

    #[test]
    fn test_distribution_is_normalized() -> Result<()> {
        let data = PrecalculatedData::embedded()?;
        let options = KernelOptions::new(4, HamiltonianKind::Heisenberg, Method::Forward);
        let distribution = expected_distribution(&data, &options)?;

        assert!(distribution.len() > 1);
        assert!(distribution.keys().all(|bits| bits.len() == 4));
        assert_approx_eq!(1.0, distribution.values().sum::<f64>(), 1e-8);

        Ok(())
    }

    #[test]
    fn test_mirror_distribution_is_the_initial_state() -> Result<()> {
        let data = PrecalculatedData::embedded()?;
        let options = KernelOptions::new(3, HamiltonianKind::Tfim, Method::Mirror);
        let distribution = expected_distribution(&data, &options)?;

        assert_eq!(2, distribution.len());
        assert_approx_eq!(0.5, distribution["000"], 1e-9);
        assert_approx_eq!(0.5, distribution["111"], 1e-9);

        Ok(())
    }

    #[test]
    fn test_precalculate_fills_every_size() -> Result<()> {
        let mut data = PrecalculatedData::embedded()?;
        // Keep the test fast.
        data.hx.truncate(4);
        data.hz.truncate(4);

        precalculate_distributions(&mut data, Method::Forward)?;

        assert_eq!(6, data.distributions.len());
        assert!(data.distributions.contains_key("tfim - Qubits 2"));
        assert!(data.distributions.contains_key("heisenberg - Qubits 4"));

        Ok(())
    }
}
