//! Subcommand implementations.

pub mod compare;
pub mod distributions;
pub mod precalculate;

use std::path::Path;

use anyhow::Result;
use qsim_bench::hamiltonian_simulation::PrecalculatedData;

/// The fixture at `path`, or the embedded copy when no path is given.
pub fn load_data(path: Option<&Path>) -> Result<PrecalculatedData> {
    match path {
        Some(path) => PrecalculatedData::load(path),
        None => PrecalculatedData::embedded(),
    }
}
