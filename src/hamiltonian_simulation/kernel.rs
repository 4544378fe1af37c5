use std::f64::consts::FRAC_PI_2;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::circuit::{Circuit, GateKind, PauliEvolution};
use crate::error::BenchError;
use crate::observable::PauliSum;
use crate::pauli::Pauli;

use super::params::PrecalculatedData;

/// Methods 1 and 2 read their fields from the precalculated data.
pub const MAX_PRECALCULATED_QUBITS: usize = 12;

const RANDOM_PAULI_SEED: u64 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HamiltonianKind {
    Heisenberg,
    Tfim,
}

impl HamiltonianKind {
    pub fn default_init_state(self) -> InitState {
        match self {
            HamiltonianKind::Heisenberg => InitState::Checkerboard,
            HamiltonianKind::Tfim => InitState::Ghz,
        }
    }
}

impl FromStr for HamiltonianKind {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "heisenberg" => Ok(HamiltonianKind::Heisenberg),
            "tfim" => Ok(HamiltonianKind::Tfim),
            _ => Err(BenchError::UnknownHamiltonian(s.to_string())),
        }
    }
}

impl Display for HamiltonianKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HamiltonianKind::Heisenberg => write!(f, "heisenberg"),
            HamiltonianKind::Tfim => write!(f, "tfim"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitState {
    /// |...0101>: X on every odd qubit.
    Checkerboard,
    /// (|0...0> + |1...1>)/√2
    Ghz,
}

impl FromStr for InitState {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checkerboard" | "checker" => Ok(InitState::Checkerboard),
            "ghz" => Ok(InitState::Ghz),
            _ => Err(BenchError::UnknownInitState(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// Plain forward evolution.
    Forward = 1,
    /// Forward evolution followed by its inverse, returning to the initial state.
    Mirror = 2,
}

impl TryFrom<u8> for Method {
    type Error = BenchError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Method::Forward),
            2 => Ok(Method::Mirror),
            _ => Err(BenchError::InvalidMethod(value)),
        }
    }
}

/// Three encodings of the same Trotter step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CircuitVariant {
    /// XX, YY and ZZ each from a basis change around CX-RZ-CX.
    Naive,
    /// Three-CX XX+YY+ZZ block for Heisenberg, native RZZ for TFIM.
    Optimized,
    /// One Pauli evolution gate per step.
    PauliEvolution,
}

impl CircuitVariant {
    pub const ALL: [CircuitVariant; 3] = [
        CircuitVariant::Naive,
        CircuitVariant::Optimized,
        CircuitVariant::PauliEvolution,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            CircuitVariant::Naive => "Naive circuit",
            CircuitVariant::Optimized => "Optimized circuit",
            CircuitVariant::PauliEvolution => "Circuit with PauliEvolutionGate",
        }
    }
}

#[derive(Clone, Debug)]
pub struct KernelOptions {
    pub num_qubits: usize,
    pub hamiltonian: HamiltonianKind,
    pub method: Method,
    pub init_state: Option<InitState>,
    pub random_pauli: bool,
}

impl KernelOptions {
    pub fn new(num_qubits: usize, hamiltonian: HamiltonianKind, method: Method) -> Self {
        Self {
            num_qubits,
            hamiltonian,
            method,
            init_state: None,
            random_pauli: false,
        }
    }

    pub fn init_state(&self) -> InitState {
        self.init_state
            .unwrap_or_else(|| self.hamiltonian.default_init_state())
    }
}

/// Builds the Trotterized evolution circuit of a disordered spin chain.
///
/// Each of the `k` steps of length `τ = t/k` applies `RX(2τ w hx_i)` to every qubit,
/// `RZ(2τ w hz_i)` as well for Heisenberg, and then the nearest-neighbour couplings on
/// even pairs followed by odd pairs.
pub struct HamiltonianKernel<'a> {
    num_qubits: usize,
    k: usize,
    tau: f64,
    w: f64,
    hx: &'a [f64],
    hz: &'a [f64],
    hamiltonian: HamiltonianKind,
    method: Method,
    init_state: InitState,
    random_pauli: bool,
    variant: CircuitVariant,
}

impl<'a> HamiltonianKernel<'a> {
    pub fn new(
        data: &'a PrecalculatedData,
        options: &KernelOptions,
        variant: CircuitVariant,
    ) -> Result<Self> {
        if options.num_qubits == 0 {
            anyhow::bail!("the spin chain needs at least one qubit");
        }
        if options.num_qubits > MAX_PRECALCULATED_QUBITS {
            return Err(BenchError::TooManyQubits {
                method: options.method as u8,
                max: MAX_PRECALCULATED_QUBITS,
            }
            .into());
        }
        if data.k == 0 {
            anyhow::bail!("the number of Trotter steps must be positive");
        }
        let (hx, hz) = data.fields(options.num_qubits)?;

        Ok(Self {
            num_qubits: options.num_qubits,
            k: data.k,
            tau: data.t / data.k as f64,
            w: data.w,
            hx,
            hz,
            hamiltonian: options.hamiltonian,
            method: options.method,
            init_state: options.init_state(),
            random_pauli: options.random_pauli,
            variant,
        })
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// Nearest-neighbour pairs, even bonds first.
    fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..2).flat_map(move |parity| {
            (parity..self.num_qubits.saturating_sub(1))
                .step_by(2)
                .map(|i| (i, i + 1))
        })
    }

    /// The Hamiltonian whose terms are in the order a Trotter step applies them.
    pub fn hamiltonian_operator(&self) -> Result<PauliSum> {
        let mut operator = PauliSum::new(self.num_qubits);

        for (i, h) in self.hx.iter().enumerate() {
            operator.add_pauli_operator(self.w * h, &[(Pauli::X, i)])?;
        }
        if self.hamiltonian == HamiltonianKind::Heisenberg {
            for (i, h) in self.hz.iter().enumerate() {
                operator.add_pauli_operator(self.w * h, &[(Pauli::Z, i)])?;
            }
        }

        let couplings: &[Pauli] = match self.hamiltonian {
            HamiltonianKind::Heisenberg => &[Pauli::X, Pauli::Y, Pauli::Z],
            HamiltonianKind::Tfim => &[Pauli::Z],
        };
        for (a, b) in self.pairs() {
            for &p in couplings {
                operator.add_pauli_operator(1.0, &[(p, a), (p, b)])?;
            }
        }

        Ok(operator)
    }

    pub fn initial_state_circuit(&self) -> Result<Circuit> {
        let mut circuit = Circuit::new(self.num_qubits);
        match self.init_state {
            InitState::Checkerboard => {
                for q in (1..self.num_qubits).step_by(2) {
                    circuit = circuit.x(q)?;
                }
            }
            InitState::Ghz => {
                circuit = circuit.h(0)?;
                for q in 0..self.num_qubits - 1 {
                    circuit = circuit.cnot(q, q + 1)?;
                }
            }
        }
        Ok(circuit)
    }

    /// exp(-iτ XX) by rotating both qubits into the Z basis.
    fn xx(circuit: Circuit, a: usize, b: usize, tau: f64) -> Result<Circuit> {
        circuit
            .h(a)?
            .h(b)?
            .cnot(a, b)?
            .rz(b, 2.0 * tau)?
            .cnot(a, b)?
            .h(a)?
            .h(b)
    }

    /// exp(-iτ YY); RX(π/2) maps Y onto Z.
    fn yy(circuit: Circuit, a: usize, b: usize, tau: f64) -> Result<Circuit> {
        circuit
            .rx(a, FRAC_PI_2)?
            .rx(b, FRAC_PI_2)?
            .cnot(a, b)?
            .rz(b, 2.0 * tau)?
            .cnot(a, b)?
            .rx(a, -FRAC_PI_2)?
            .rx(b, -FRAC_PI_2)
    }

    /// exp(-iτ ZZ)
    fn zz(circuit: Circuit, a: usize, b: usize, tau: f64) -> Result<Circuit> {
        circuit.cnot(a, b)?.rz(b, 2.0 * tau)?.cnot(a, b)
    }

    /// exp(-iτ (XX + YY + ZZ)) up to global phase with three CX gates.
    fn xxyyzz(circuit: Circuit, a: usize, b: usize, tau: f64) -> Result<Circuit> {
        circuit
            .rz(b, -FRAC_PI_2)?
            .cnot(b, a)?
            .rz(a, 2.0 * tau - FRAC_PI_2)?
            .ry(b, FRAC_PI_2 - 2.0 * tau)?
            .cnot(a, b)?
            .ry(b, 2.0 * tau - FRAC_PI_2)?
            .cnot(b, a)?
            .rz(a, FRAC_PI_2)
    }

    fn trotter_step(&self, mut circuit: Circuit) -> Result<Circuit> {
        let tau = self.tau;

        if self.variant == CircuitVariant::PauliEvolution {
            let evolution = PauliEvolution::new(&self.hamiltonian_operator()?, tau);
            return Ok(circuit.evolve(evolution)?.barrier());
        }

        for (q, h) in self.hx.iter().enumerate() {
            circuit = circuit.rx(q, 2.0 * tau * self.w * h)?;
        }
        if self.hamiltonian == HamiltonianKind::Heisenberg {
            for (q, h) in self.hz.iter().enumerate() {
                circuit = circuit.rz(q, 2.0 * tau * self.w * h)?;
            }
        }
        circuit = circuit.barrier();

        for (a, b) in self.pairs() {
            circuit = match (self.hamiltonian, self.variant) {
                (HamiltonianKind::Heisenberg, CircuitVariant::Naive) => {
                    let circuit = Self::xx(circuit, a, b, tau)?;
                    let circuit = Self::yy(circuit, a, b, tau)?;
                    Self::zz(circuit, a, b, tau)?
                }
                (HamiltonianKind::Heisenberg, _) => Self::xxyyzz(circuit, a, b, tau)?,
                (HamiltonianKind::Tfim, CircuitVariant::Naive) => Self::zz(circuit, a, b, tau)?,
                (HamiltonianKind::Tfim, _) => circuit.rzz(a, b, 2.0 * tau)?,
            };
        }

        Ok(circuit.barrier())
    }

    /// The `k` Trotter steps alone, without state preparation.
    pub fn evolution_circuit(&self) -> Result<Circuit> {
        let mut circuit = Circuit::new(self.num_qubits);
        for _ in 0..self.k {
            circuit = self.trotter_step(circuit)?;
        }
        Ok(circuit)
    }

    /// A seeded layer of random Paulis; applying it twice is the identity.
    fn random_pauli_layer(&self) -> Result<Circuit> {
        let mut rng = StdRng::seed_from_u64(RANDOM_PAULI_SEED);
        let mut layer = Circuit::new(self.num_qubits);
        for q in 0..self.num_qubits {
            let kind = match rng.random_range(0..4) {
                0 => continue,
                1 => GateKind::X,
                2 => GateKind::Y,
                _ => GateKind::Z,
            };
            layer = layer.gate_at(q, kind)?;
        }
        Ok(layer)
    }

    /// State preparation, evolution, the method's tail and final measurements.
    pub fn overall_circuit(&self) -> Result<Circuit> {
        let mut circuit = self
            .initial_state_circuit()?
            .barrier()
            .with_name(self.variant.display_name());
        let evolution = self.evolution_circuit()?;
        circuit.compose(&evolution)?;

        if self.method == Method::Mirror {
            if self.random_pauli {
                let layer = self.random_pauli_layer()?;
                circuit.compose(&layer)?;
                circuit.compose(&layer)?;
            }
            circuit.compose(&evolution.inverse()?)?;
        }

        circuit.measure_all();
        debug!(
            variant = self.variant.display_name(),
            hamiltonian = %self.hamiltonian,
            qubits = self.num_qubits,
            depth = circuit.depth(),
            "built Hamiltonian simulation circuit"
        );
        Ok(circuit)
    }
}
