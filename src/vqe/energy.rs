use std::f64::consts::PI;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::circuit::{Circuit, ParameterizedGate};
use crate::error::BenchError;
use crate::observable::PauliSum;
use crate::pauli::Pauli;

const ANSATZ_LAYERS: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VqeMethod {
    /// The whole Hamiltonian as a single observable.
    Whole = 1,
    /// Every Hamiltonian term as its own observable.
    PerTerm = 2,
}

impl VqeMethod {
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for VqeMethod {
    type Error = BenchError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(VqeMethod::Whole),
            2 => Ok(VqeMethod::PerTerm),
            _ => Err(BenchError::InvalidMethod(value)),
        }
    }
}

/// A molecule-like electronic structure problem on `num_qubits` spin orbitals.
///
/// The first half of the register holds the alpha orbitals, the second half the beta
/// orbitals. The model Hamiltonian has a constant, on-site `Z_i` energies, `Z_i Z_j`
/// density interactions between every pair and `XX + YY` hopping between neighbouring
/// orbitals of the same spin. Its coefficients are drawn from a generator seeded by
/// the qubit count, so each size always yields the same operator.
#[derive(Clone, Debug)]
pub struct VqeProblem {
    num_qubits: usize,
    na: usize,
    nb: usize,
    hamiltonian: PauliSum,
}

impl VqeProblem {
    pub fn new(num_qubits: usize, na: usize, nb: usize) -> Result<Self> {
        let orbitals = num_qubits / 2;
        if num_qubits == 0 || num_qubits % 2 != 0 || na > orbitals || nb > orbitals {
            return Err(BenchError::InvalidElectronCount { num_qubits, na, nb }.into());
        }

        Ok(Self {
            num_qubits,
            na,
            nb,
            hamiltonian: Self::model_hamiltonian(num_qubits)?,
        })
    }

    fn model_hamiltonian(num_qubits: usize) -> Result<PauliSum> {
        let mut rng = StdRng::seed_from_u64(num_qubits as u64);
        let mut hamiltonian = PauliSum::new(num_qubits);
        let orbitals = num_qubits / 2;

        hamiltonian.add_pauli_operator(rng.random_range(-1.0..1.0), &[])?;

        for q in 0..num_qubits {
            hamiltonian.add_pauli_operator(rng.random_range(-0.5..0.5), &[(Pauli::Z, q)])?;
        }

        for a in 0..num_qubits {
            for b in a + 1..num_qubits {
                hamiltonian.add_pauli_operator(
                    rng.random_range(-0.2..0.2),
                    &[(Pauli::Z, a), (Pauli::Z, b)],
                )?;
            }
        }

        for block in [0, orbitals] {
            for q in block..block + orbitals - 1 {
                let hopping = rng.random_range(-0.3..-0.05);
                hamiltonian.add_pauli_operator(hopping, &[(Pauli::X, q), (Pauli::X, q + 1)])?;
                hamiltonian.add_pauli_operator(hopping, &[(Pauli::Y, q), (Pauli::Y, q + 1)])?;
            }
        }

        Ok(hamiltonian)
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn hamiltonian(&self) -> &PauliSum {
        &self.hamiltonian
    }

    /// Indices of the orbitals the Hartree-Fock reference occupies.
    pub fn occupied_orbitals(&self) -> impl Iterator<Item = usize> {
        let orbitals = self.num_qubits / 2;
        (0..self.na).chain(orbitals..orbitals + self.nb)
    }

    /// Hartree-Fock reference followed by layers of RY/RZ rotations and a CX ladder.
    /// Rotation angles are drawn from a generator seeded by `circuit_id`.
    pub fn ansatz(&self, circuit_id: usize) -> Result<Circuit> {
        let n = self.num_qubits;
        let mut circuit = Circuit::new(n).with_name(format!("vqe_ansatz_{}", circuit_id));

        for q in self.occupied_orbitals() {
            circuit = circuit.x(q)?;
        }

        for _ in 0..ANSATZ_LAYERS {
            for q in 0..n {
                circuit.add_parametric_gate_at(q, ParameterizedGate::RY, 0.0)?;
                circuit.add_parametric_gate_at(q, ParameterizedGate::RZ, 0.0)?;
            }
            for q in 0..n - 1 {
                circuit = circuit.cnot(q, q + 1)?;
            }
        }

        let mut rng = StdRng::seed_from_u64(circuit_id as u64);
        let values = (0..circuit.num_parameters())
            .map(|_| rng.random_range(-PI..PI))
            .collect::<Vec<_>>();
        circuit.set_parameters(&values)?;

        Ok(circuit)
    }
}

/// The energy-estimation circuit and the observables it is measured against.
pub fn vqe_energy(
    num_qubits: usize,
    na: usize,
    nb: usize,
    circuit_id: usize,
    method: VqeMethod,
) -> Result<(Circuit, Vec<PauliSum>)> {
    let problem = VqeProblem::new(num_qubits, na, nb)?;
    let circuit = problem.ansatz(circuit_id)?;

    let observables = match method {
        VqeMethod::Whole => vec![problem.hamiltonian().clone()],
        VqeMethod::PerTerm => problem.hamiltonian().split_terms(),
    };
    debug!(
        qubits = num_qubits,
        circuit_id,
        parameters = circuit.num_parameters(),
        observables = observables.len(),
        "built VQE energy pub"
    );

    Ok((circuit, observables))
}
