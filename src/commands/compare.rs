//! Compare command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use qsim_bench::hamiltonian_simulation::{
    run_comparison, HamiltonianKind, InitState, KernelOptions, Method,
};

/// Execute the compare command.
pub fn execute(
    num_qubits: usize,
    hamiltonian: &str,
    method: u8,
    random_pauli: bool,
    init_state: Option<&str>,
    data: Option<&Path>,
) -> Result<()> {
    let hamiltonian: HamiltonianKind = hamiltonian.parse()?;
    let method = Method::try_from(method)?;
    let init_state = init_state.map(str::parse::<InitState>).transpose()?;

    let options = KernelOptions {
        num_qubits,
        hamiltonian,
        method,
        init_state,
        random_pauli,
    };
    let data = super::load_data(data)?;

    println!(
        "{} Comparing {} circuits on {} qubits",
        style("→").cyan().bold(),
        style(hamiltonian).green(),
        num_qubits
    );

    let report = run_comparison(&data, &options)?;

    for circuit in &report.circuits {
        println!("{}", style(circuit.name()).bold());
        println!("{}", circuit);
    }

    for pair in &report.pairs {
        if pair.equivalent {
            println!("{}", style(pair).green());
        } else {
            println!("{}", style(pair).red());
        }
    }

    Ok(())
}
