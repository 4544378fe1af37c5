//! Trotterized spin-chain evolution and the tools built on it.

pub mod comparison;
pub mod distributions;
pub mod kernel;
pub mod params;

pub use comparison::{run_comparison, ComparisonReport, PairResult};
pub use distributions::{distribution_key, expected_distribution, precalculate_distributions};
pub use kernel::{
    CircuitVariant, HamiltonianKernel, HamiltonianKind, InitState, KernelOptions, Method,
};
pub use params::PrecalculatedData;
