use std::fmt::Display;

use anyhow::Result;
use nalgebra::DMatrix;
use tracing::{debug, info};

use crate::circuit::Circuit;
use crate::equivalence::OperatorEquiv;
use crate::Qbit;

use super::kernel::{CircuitVariant, HamiltonianKernel, KernelOptions};
use super::params::PrecalculatedData;

/// Pairs of circuit variants checked against each other, by position in
/// [`CircuitVariant::ALL`].
const PAIRS: [(usize, usize); 3] = [(0, 1), (0, 2), (1, 2)];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairResult {
    pub first: String,
    pub second: String,
    pub equivalent: bool,
}

impl Display for PairResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.equivalent {
            write!(f, "OK: {} and {} are equivalent", self.first, self.second)
        } else {
            write!(f, "NG: {} and {} are not equivalent", self.first, self.second)
        }
    }
}

pub struct ComparisonReport {
    /// The variants as built, final measurements included.
    pub circuits: Vec<Circuit>,
    pub pairs: Vec<PairResult>,
}

impl ComparisonReport {
    pub fn all_equivalent(&self) -> bool {
        self.pairs.iter().all(|pair| pair.equivalent)
    }
}

/// Builds every circuit variant and checks each pair for equivalence up to global phase.
pub fn run_comparison(
    data: &PrecalculatedData,
    options: &KernelOptions,
) -> Result<ComparisonReport> {
    let circuits = CircuitVariant::ALL
        .iter()
        .map(|&variant| HamiltonianKernel::new(data, options, variant)?.overall_circuit())
        .collect::<Result<Vec<_>>>()?;

    let unitaries = circuits
        .iter()
        .map(|circuit| {
            let mut circuit = circuit.clone();
            circuit.remove_final_measurements();
            debug!(circuit = circuit.name(), "computing unitary");
            circuit.unitary()
        })
        .collect::<Result<Vec<DMatrix<Qbit>>>>()?;

    let checker = OperatorEquiv::default();
    let pairs = PAIRS
        .iter()
        .map(|&(i, j)| PairResult {
            first: circuits[i].name().to_string(),
            second: circuits[j].name().to_string(),
            equivalent: checker.equals(&unitaries[i], &unitaries[j]),
        })
        .collect::<Vec<_>>();

    info!(
        qubits = options.num_qubits,
        hamiltonian = %options.hamiltonian,
        equivalent = pairs.iter().filter(|pair| pair.equivalent).count(),
        "compared circuit variants"
    );

    Ok(ComparisonReport { circuits, pairs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hamiltonian_simulation::kernel::{HamiltonianKind, InitState, Method};

    fn compare(
        num_qubits: usize,
        hamiltonian: HamiltonianKind,
        method: Method,
    ) -> Result<ComparisonReport> {
        let data = PrecalculatedData::embedded()?;
        run_comparison(&data, &KernelOptions::new(num_qubits, hamiltonian, method))
    }

    #[test]
    fn test_variants_agree_for_heisenberg() -> Result<()> {
        for n in 2..=4 {
            let report = compare(n, HamiltonianKind::Heisenberg, Method::Forward)?;
            assert!(report.all_equivalent(), "{} qubits", n);
        }
        Ok(())
    }

    #[test]
    fn test_variants_agree_for_tfim() -> Result<()> {
        for n in 2..=4 {
            let report = compare(n, HamiltonianKind::Tfim, Method::Forward)?;
            assert!(report.all_equivalent(), "{} qubits", n);
        }
        Ok(())
    }

    #[test]
    fn test_variants_agree_for_mirror() -> Result<()> {
        let data = PrecalculatedData::embedded()?;
        let mut options = KernelOptions::new(3, HamiltonianKind::Heisenberg, Method::Mirror);
        options.random_pauli = true;
        options.init_state = Some(InitState::Ghz);

        assert!(run_comparison(&data, &options)?.all_equivalent());
        Ok(())
    }

    #[test]
    fn test_report_keeps_measured_circuits() -> Result<()> {
        let report = compare(2, HamiltonianKind::Tfim, Method::Forward)?;

        assert_eq!(3, report.circuits.len());
        assert!(report.circuits.iter().all(Circuit::has_measurements));
        assert_eq!(
            "OK: Naive circuit and Circuit with PauliEvolutionGate are equivalent",
            report.pairs[1].to_string()
        );
        Ok(())
    }

    #[test]
    fn test_different_circuits_are_reported() {
        let pair = PairResult {
            first: "a".to_string(),
            second: "b".to_string(),
            equivalent: false,
        };
        assert_eq!("NG: a and b are not equivalent", pair.to_string());
    }
}
