use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Index {index} out of bounds for the number of qubits {num_of_qbits}")]
    QubitOutOfRange { index: usize, num_of_qbits: usize },

    #[error("Qubit {0} is used more than once by the same gate")]
    DuplicateQubit(usize),

    #[error("State vector length must be a non-zero power of 2, got {0}")]
    InvalidStateLength(usize),

    #[error("Circuit widths differ: {left} vs {right} qubits")]
    WidthMismatch { left: usize, right: usize },

    #[error("Instruction `{0}` is not unitary")]
    NonUnitary(&'static str),

    #[error("invalid Pauli label: {0}")]
    InvalidPauliLabel(String),

    #[error("invalid Hamiltonian name: {0}")]
    UnknownHamiltonian(String),

    #[error("invalid initial state: {0}")]
    UnknownInitState(String),

    #[error("Invalid method type ({0}). Should be 1 or 2.")]
    InvalidMethod(u8),

    #[error("cannot execute method {method} above {max} qubits")]
    TooManyQubits { method: u8, max: usize },

    #[error("invalid electron count: {na} alpha and {nb} beta for {num_qubits} qubits")]
    InvalidElectronCount {
        num_qubits: usize,
        na: usize,
        nb: usize,
    },
}
