pub mod circuit;
pub mod equivalence;
pub mod error;
pub mod estimator;
pub mod fixture;
pub mod gates;
pub mod hamiltonian_simulation;
pub mod observable;
pub mod pauli;
pub mod qstate;
pub mod vqe;

mod test_util;

use num_complex::Complex;

pub use circuit::Circuit;
pub use error::BenchError;
pub use observable::PauliSum;
pub use pauli::{Pauli, PauliString};
pub use qstate::QState;

pub type Qbit = Complex<f64>;
