//! Benchmark tooling for quantum-circuit construction.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{compare, distributions, precalculate};

/// Hamiltonian simulation comparisons and VQE reference values
#[derive(Parser)]
#[command(name = "qsim-bench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Comparison of Hamiltonian simulation circuits
    Compare {
        /// Number of qubits
        #[arg(short = 'n', long, default_value = "3")]
        num_qubits: usize,

        /// Name of Hamiltonian (heisenberg, tfim)
        #[arg(long, alias = "ham", default_value = "heisenberg")]
        hamiltonian: String,

        /// Algorithm method (1, 2)
        #[arg(short, long, default_value = "1")]
        method: u8,

        /// Insert a random Pauli layer between the mirrored halves
        #[arg(long, alias = "ranp")]
        random_pauli_flag: bool,

        /// Initial state (checkerboard, ghz)
        #[arg(long, alias = "init")]
        init_state: Option<String>,

        /// Precalculated data file (embedded copy if omitted)
        #[arg(long, env = "QSIM_BENCH_DATA")]
        data: Option<PathBuf>,
    },

    /// Precalculate VQE expectation values and eigenvalue bounds
    Precalculate {
        /// Output directory name (empty prints usage)
        #[arg(short, long, default_value = "data")]
        output: String,

        /// Method type (1, 2)
        #[arg(short, long, default_value = "1")]
        method: u8,
    },

    /// Store expected Hamiltonian simulation distributions in the data file
    Distributions {
        /// Precalculated data file to start from (embedded copy if omitted)
        #[arg(long, env = "QSIM_BENCH_DATA")]
        data: Option<PathBuf>,

        /// Algorithm method (1, 2)
        #[arg(short, long, default_value = "1")]
        method: u8,

        /// File to write
        #[arg(short, long, default_value = "data/precalculated_data.json")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Compare {
            num_qubits,
            hamiltonian,
            method,
            random_pauli_flag,
            init_state,
            data,
        } => compare::execute(
            num_qubits,
            &hamiltonian,
            method,
            random_pauli_flag,
            init_state.as_deref(),
            data.as_deref(),
        ),

        Commands::Precalculate { output, method } => {
            if output.is_empty() {
                println!("{}", Cli::command().render_usage());
                return Ok(());
            }
            precalculate::execute(&PathBuf::from(output), method)
        }

        Commands::Distributions {
            data,
            method,
            output,
        } => distributions::execute(data.as_deref(), method, &output),
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
