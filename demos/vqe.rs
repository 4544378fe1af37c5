//! Estimates the energy of a few seeded ansatz circuits and compares them with the
//! spectrum of the model Hamiltonian.

use anyhow::Result;
use qsim_bench::{
    estimator::{EstimatorPub, StatevectorEstimator},
    vqe::VqeProblem,
};

fn main() -> Result<()> {
    let num_qubits = 6;
    let problem = VqeProblem::new(num_qubits, 1, 1)?;
    let hamiltonian = problem.hamiltonian();

    let (min, max) = hamiltonian.eigenvalue_bounds();
    println!("Hamiltonian: {} terms on {} qubits", hamiltonian.len(), num_qubits);
    println!("Spectrum: [{:.6}, {:.6}]", min, max);

    let pubs = (0..5)
        .map(|circuit_id| {
            Ok(EstimatorPub::new(
                problem.ansatz(circuit_id)?,
                vec![hamiltonian.clone()],
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    let results = StatevectorEstimator::new().run(&pubs)?;
    for (pub_, result) in pubs.iter().zip(&results) {
        let energy = result.evs[0];
        println!(
            "{}: energy {:.6} ({:.1}% above the ground state)",
            pub_.circuit.name(),
            energy,
            100.0 * (energy - min) / (max - min)
        );
    }

    Ok(())
}
