//! Reference values for VQE energy-estimation benchmarks.

pub mod energy;
pub mod precalculate;

pub use energy::{vqe_energy, VqeMethod, VqeProblem};
pub use precalculate::{method1, method2, run_precalculate, save_file, ReferenceValue};
