//! Precalculate command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use qsim_bench::vqe::run_precalculate;

/// Execute the precalculate command.
pub fn execute(output: &Path, method: u8) -> Result<()> {
    println!(
        "{} Precalculating VQE reference values (method {}) into {}",
        style("→").cyan().bold(),
        method,
        style(output.display()).green()
    );

    for path in run_precalculate(output, method)? {
        println!("  Wrote {}", style(path.display()).green());
    }

    Ok(())
}
