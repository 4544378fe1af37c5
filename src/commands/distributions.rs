//! Distributions command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use qsim_bench::hamiltonian_simulation::{precalculate_distributions, Method};

/// Execute the distributions command.
pub fn execute(data: Option<&Path>, method: u8, output: &Path) -> Result<()> {
    let method = Method::try_from(method)?;
    let mut data = super::load_data(data)?;

    println!(
        "{} Computing expected distributions for method {}",
        style("→").cyan().bold(),
        method as u8
    );

    precalculate_distributions(&mut data, method)?;
    data.save(output)?;

    println!(
        "{} Stored {} distributions in {}",
        style("✓").green().bold(),
        data.distributions.len(),
        style(output.display()).green()
    );

    Ok(())
}
