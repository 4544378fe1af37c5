use std::collections::BTreeMap;
use std::fmt::Display;

use anyhow::Result;
use nalgebra::DVector;
use num_complex::Complex;

use crate::error::BenchError;
use crate::Qbit;

#[derive(Clone, Debug)]
pub struct QState {
    pub(crate) state: DVector<Qbit>,
}

impl QState {
    pub fn new(state: &[Qbit]) -> Result<Self> {
        let len = state.len();
        if len == 0 || (len & (len - 1)) != 0 {
            return Err(BenchError::InvalidStateLength(len).into());
        }

        let state = DVector::from_row_slice(state);
        Ok(Self { state })
    }

    pub fn zero_state(num_of_qbits: usize) -> Self {
        let size = 1_usize << num_of_qbits;
        let mut state = DVector::zeros(size);
        state[0] = Complex::new(1.0, 0.0); // |0...0> state
        Self { state }
    }

    /// Basis state from a bit string, qubit 0 is the rightmost character.
    pub fn from_str(qbits: &str) -> Result<Self> {
        let index = usize::from_str_radix(qbits, 2)?;
        let mut state = DVector::zeros(1_usize << qbits.len());
        state[index] = Complex::new(1.0, 0.0);

        Ok(Self { state })
    }

    pub fn num_of_qbits(&self) -> usize {
        self.state.len().ilog2() as usize
    }

    pub fn amplitudes(&self) -> &DVector<Qbit> {
        &self.state
    }

    pub fn probabilities(&self) -> Vec<f64> {
        self.state.iter().map(|amp| amp.norm_sqr()).collect()
    }

    /// Bit-string keyed probabilities, dropping everything at or below `threshold`.
    pub fn distribution(&self, threshold: f64) -> BTreeMap<String, f64> {
        let width = self.num_of_qbits();
        self.probabilities()
            .into_iter()
            .enumerate()
            .filter(|(_, p)| *p > threshold)
            .map(|(i, p)| (format!("{:0width$b}", i, width = width), p))
            .collect()
    }

    /// <self|other>
    pub fn inner(&self, other: &QState) -> Qbit {
        self.state.dotc(&other.state)
    }
}

impl Display for QState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bin_width = self.num_of_qbits();

        for (i, value) in self.state.iter().enumerate() {
            writeln!(f, "|{:0width$b}>: {}", i, value, width = bin_width)?;
        }

        Ok(())
    }
}

impl From<QState> for DVector<Qbit> {
    fn from(qstate: QState) -> Self {
        qstate.state
    }
}
