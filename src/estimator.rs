use anyhow::Result;
use tracing::debug;

use crate::circuit::Circuit;
use crate::observable::PauliSum;
use crate::qstate::QState;

/// A circuit paired with the observables to estimate on its output state.
#[derive(Clone, Debug)]
pub struct EstimatorPub {
    pub circuit: Circuit,
    pub observables: Vec<PauliSum>,
}

impl EstimatorPub {
    pub fn new(circuit: Circuit, observables: Vec<PauliSum>) -> Self {
        Self {
            circuit,
            observables,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PubResult {
    /// One expectation value per observable, in order.
    pub evs: Vec<f64>,
}

/// Exact expectation values from the simulated statevector.
#[derive(Default)]
pub struct StatevectorEstimator;

impl StatevectorEstimator {
    pub fn new() -> Self {
        Self
    }

    pub fn run(&self, pubs: &[EstimatorPub]) -> Result<Vec<PubResult>> {
        pubs.iter().map(|pub_| self.run_one(pub_)).collect()
    }

    fn run_one(&self, pub_: &EstimatorPub) -> Result<PubResult> {
        let circuit = &pub_.circuit;
        let state = circuit.apply(&QState::zero_state(circuit.num_of_qbits()))?;
        debug!(
            circuit = circuit.name(),
            observables = pub_.observables.len(),
            "estimating expectation values"
        );

        let evs = pub_
            .observables
            .iter()
            .map(|observable| observable.expectation_value(&state))
            .collect::<Result<Vec<_>>>()?;

        Ok(PubResult { evs })
    }
}
