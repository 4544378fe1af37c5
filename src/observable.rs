use std::fmt::Display;

use anyhow::Result;
use nalgebra::DMatrix;
use nalgebra_sparse::csr::CsrMatrix;
use num_complex::Complex;

use crate::error::BenchError;
use crate::pauli::{Pauli, PauliString};
use crate::qstate::QState;
use crate::Qbit;

/// Weighted sum of Pauli strings with real coefficients.
#[derive(Clone, Debug, Default)]
pub struct PauliSum {
    num_qubits: usize,
    terms: Vec<(f64, PauliString)>,
}

impl PauliSum {
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            terms: Vec::new(),
        }
    }

    pub fn from_terms(num_qubits: usize, terms: Vec<(f64, PauliString)>) -> Result<Self> {
        let mut sum = Self::new(num_qubits);
        for (coefficient, pauli) in terms {
            sum.add_term(coefficient, pauli)?;
        }
        Ok(sum)
    }

    /// Builds an operator from big-endian labels, e.g. `[("XX", 0.5), ("IZ", -1.0)]`.
    pub fn from_labels(labels: &[(&str, f64)]) -> Result<Self> {
        let num_qubits = labels.first().map(|(label, _)| label.len()).unwrap_or(0);
        let mut sum = Self::new(num_qubits);
        for &(label, coefficient) in labels {
            sum.add_term(coefficient, label.parse()?)?;
        }
        Ok(sum)
    }

    pub fn add_term(&mut self, coefficient: f64, pauli: PauliString) -> Result<()> {
        if pauli.num_qubits() != self.num_qubits {
            return Err(BenchError::WidthMismatch {
                left: self.num_qubits,
                right: pauli.num_qubits(),
            }
            .into());
        }
        self.terms.push((coefficient, pauli));
        Ok(())
    }

    pub fn add_pauli_operator(&mut self, coefficient: f64, ops: &[(Pauli, usize)]) -> Result<()> {
        let pauli = PauliString::new(self.num_qubits, ops)?;
        self.terms.push((coefficient, pauli));
        Ok(())
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn terms(&self) -> &[(f64, PauliString)] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Merges repeated strings (keeping first-seen order) and drops near-zero terms.
    pub fn simplify(&self, tolerance: f64) -> PauliSum {
        let mut merged: Vec<(f64, PauliString)> = Vec::new();
        for (coefficient, pauli) in &self.terms {
            match merged.iter_mut().find(|(_, p)| p == pauli) {
                Some((c, _)) => *c += coefficient,
                None => merged.push((*coefficient, pauli.clone())),
            }
        }
        merged.retain(|(c, _)| c.abs() > tolerance);

        PauliSum {
            num_qubits: self.num_qubits,
            terms: merged,
        }
    }

    /// One single-term operator per term, in order.
    pub fn split_terms(&self) -> Vec<PauliSum> {
        self.terms
            .iter()
            .map(|term| PauliSum {
                num_qubits: self.num_qubits,
                terms: vec![term.clone()],
            })
            .collect()
    }

    /// The label of the first term, which names single-term operators.
    pub fn label(&self) -> Option<String> {
        self.terms.first().map(|(_, pauli)| pauli.to_string())
    }

    pub fn is_diagonal(&self) -> bool {
        self.terms.iter().all(|(_, pauli)| pauli.is_diagonal())
    }

    pub fn expectation_value(&self, qstate: &QState) -> Result<f64> {
        if qstate.num_of_qbits() != self.num_qubits {
            return Err(BenchError::WidthMismatch {
                left: self.num_qubits,
                right: qstate.num_of_qbits(),
            }
            .into());
        }

        let amplitudes = qstate.amplitudes();
        let mut expectation = 0.0;

        for (coefficient, pauli) in &self.terms {
            let mut exp = Qbit::ZERO;
            for (basis, amplitude) in amplitudes.iter().enumerate() {
                let (image, phase) = pauli.apply_to_basis(basis);
                exp += amplitudes[image].conj() * phase * amplitude;
            }
            expectation += coefficient * exp.re;
        }

        Ok(expectation)
    }

    pub fn to_sparse(&self) -> CsrMatrix<Qbit> {
        let dim = 1 << self.num_qubits;
        let mut matrix = CsrMatrix::zeros(dim, dim);
        for (coefficient, pauli) in &self.terms {
            matrix = matrix + pauli.to_sparse() * Complex::new(*coefficient, 0.0);
        }
        matrix
    }

    pub fn to_matrix(&self) -> DMatrix<Qbit> {
        let dim = 1 << self.num_qubits;
        let mut matrix = DMatrix::zeros(dim, dim);
        for (coefficient, pauli) in &self.terms {
            for col in 0..dim {
                let (row, phase) = pauli.apply_to_basis(col);
                matrix[(row, col)] += phase * *coefficient;
            }
        }
        matrix
    }

    /// Smallest and largest eigenvalue.
    pub fn eigenvalue_bounds(&self) -> (f64, f64) {
        let simplified = self.simplify(0.0);

        if simplified.is_empty() {
            return (0.0, 0.0);
        }

        if let [(coefficient, pauli)] = simplified.terms() {
            return if pauli.is_identity() {
                (*coefficient, *coefficient)
            } else {
                (-coefficient.abs(), coefficient.abs())
            };
        }

        let eigenvalues: Vec<f64> = if simplified.is_diagonal() {
            (0..1_usize << self.num_qubits)
                .map(|basis| {
                    simplified
                        .terms
                        .iter()
                        .map(|(c, pauli)| c * pauli.apply_to_basis(basis).1.re)
                        .sum::<f64>()
                })
                .collect()
        } else {
            let matrix = simplified.to_matrix();
            if matrix.iter().all(|z| z.im.abs() < 1e-14) {
                matrix.map(|z| z.re).symmetric_eigenvalues().iter().copied().collect()
            } else {
                matrix.symmetric_eigenvalues().iter().copied().collect()
            }
        };

        let min = eigenvalues.iter().copied().fold(f64::INFINITY, f64::min);
        let max = eigenvalues.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (min, max)
    }
}

impl Display for PauliSum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let terms = self
            .terms
            .iter()
            .map(|(c, pauli)| format!("{} * {}", c, pauli))
            .collect::<Vec<_>>();
        write!(f, "{}", terms.join(" + "))
    }
}

#[cfg(test)]
mod tests {
    use crate::{assert_approx_eq, Circuit};

    use super::*;

    #[test]
    fn test_1qbit_z_observable() -> Result<()> {
        let q0 = QState::from_str("0").unwrap();

        let mut observable = PauliSum::new(1);
        observable.add_pauli_operator(1.0, &[(Pauli::Z, 0)])?;

        let expectation = observable.expectation_value(&q0)?;
        assert_approx_eq!(1.0, expectation);

        let q1 = Circuit::new(1).h(0)?.apply(&q0)?;
        let expectation = observable.expectation_value(&q1)?;
        assert_approx_eq!(0.0, expectation);

        let q2 = QState::new(&[
            Complex::new((2.0f64 / 3.0).sqrt(), 0.0),
            Complex::new((1.0f64 / 3.0).sqrt(), 0.0),
        ])?;
        let expectation = observable.expectation_value(&q2)?;
        assert_approx_eq!(1.0 / 3.0, expectation);

        Ok(())
    }

    #[test]
    fn test_1qbit_x_observable() -> Result<()> {
        let q0 = QState::from_str("0").unwrap();

        let mut observable = PauliSum::new(1);
        observable.add_pauli_operator(1.0, &[(Pauli::X, 0)])?;

        let expectation = observable.expectation_value(&q0)?;
        assert_approx_eq!(0.0, expectation);

        let q1 = Circuit::new(1).h(0)?.apply(&q0)?;
        let expectation = observable.expectation_value(&q1)?;
        assert_approx_eq!(1.0, expectation);

        Ok(())
    }

    #[test]
    fn test_2qbit_xz_observable() -> Result<()> {
        let q0 = QState::from_str("00").unwrap();

        let mut observable = PauliSum::new(2);
        observable.add_pauli_operator(1.0, &[(Pauli::X, 0), (Pauli::Z, 1)])?;

        let expectation = observable.expectation_value(&q0)?;
        assert_approx_eq!(0.0, expectation);

        let q1 = Circuit::new(q0.num_of_qbits()).h(0)?.apply(&q0)?;
        let expectation = observable.expectation_value(&q1)?;
        assert_approx_eq!(1.0, expectation);

        Ok(())
    }

    #[test]
    fn test_y_observable_on_circular_state() -> Result<()> {
        // RX(-π/2)|0> = (|0> + i|1>)/√2, the +1 eigenstate of Y.
        let state = Circuit::new(1)
            .rx(0, -std::f64::consts::FRAC_PI_2)?
            .apply(&QState::zero_state(1))?;
        let observable = PauliSum::from_labels(&[("Y", 2.0)])?;

        assert_approx_eq!(2.0, observable.expectation_value(&state)?);

        Ok(())
    }

    #[test]
    fn test_expectation_matches_dense_matrix() -> Result<()> {
        let observable =
            PauliSum::from_labels(&[("XY", 0.3), ("ZZ", -0.7), ("YI", 1.1), ("II", 0.2)])?;
        let state = Circuit::new(2)
            .ry(0, 0.4)?
            .rx(1, 1.3)?
            .cnot(0, 1)?
            .rz(1, 0.9)?
            .apply(&QState::zero_state(2))?;

        let matrix = observable.to_matrix();
        let amplitudes = state.amplitudes();
        let dense = (amplitudes.adjoint() * &matrix * amplitudes)[(0, 0)].re;

        assert_approx_eq!(dense, observable.expectation_value(&state)?);

        Ok(())
    }

    #[test]
    fn test_sparse_and_dense_agree() -> Result<()> {
        let observable = PauliSum::from_labels(&[("XZ", 0.5), ("YY", -0.25)])?;
        let sparse = nalgebra_sparse::convert::serial::convert_csr_dense(&observable.to_sparse());
        let dense = observable.to_matrix();

        assert!((sparse - dense).norm() < 1e-12);

        Ok(())
    }

    #[test]
    fn test_simplify_merges_duplicates() -> Result<()> {
        let observable =
            PauliSum::from_labels(&[("ZI", 0.5), ("XX", 1.0), ("ZI", 0.25), ("XX", -1.0)])?;
        let simplified = observable.simplify(1e-12);

        assert_eq!(1, simplified.len());
        assert_eq!(Some("ZI".to_string()), simplified.label());
        assert_approx_eq!(0.75, simplified.terms()[0].0);

        Ok(())
    }

    #[test]
    fn test_width_mismatch_is_rejected() -> Result<()> {
        let mut observable = PauliSum::new(2);
        assert!(observable.add_term(1.0, "XYZ".parse()?).is_err());
        assert!(observable
            .expectation_value(&QState::zero_state(3))
            .is_err());

        assert!(PauliSum::from_terms(2, vec![(1.0, "ZZ".parse()?), (0.5, "Z".parse()?)]).is_err());
        let pair = PauliSum::from_terms(2, vec![(1.0, "ZZ".parse()?), (0.5, "XI".parse()?)])?;
        assert_eq!(2, pair.len());

        Ok(())
    }

    #[test]
    fn test_eigenvalue_bounds_single_term() -> Result<()> {
        let (min, max) = PauliSum::from_labels(&[("XIY", -0.4)])?.eigenvalue_bounds();
        assert_approx_eq!(-0.4, min);
        assert_approx_eq!(0.4, max);

        let (min, max) = PauliSum::from_labels(&[("II", 1.5)])?.eigenvalue_bounds();
        assert_approx_eq!(1.5, min);
        assert_approx_eq!(1.5, max);

        Ok(())
    }

    #[test]
    fn test_eigenvalue_bounds_diagonal() -> Result<()> {
        // ZZ + 0.5 Z0: |00> gives 1.5, |01> gives -1.5
        let observable = PauliSum::from_labels(&[("ZZ", 1.0), ("IZ", 0.5)])?;
        let (min, max) = observable.eigenvalue_bounds();

        assert_approx_eq!(-1.5, min);
        assert_approx_eq!(1.5, max);

        Ok(())
    }

    #[test]
    fn test_eigenvalue_bounds_heisenberg_pair() -> Result<()> {
        // XX + YY + ZZ has the singlet at -3 and the triplet at +1.
        let observable = PauliSum::from_labels(&[("XX", 1.0), ("YY", 1.0), ("ZZ", 1.0)])?;
        let (min, max) = observable.eigenvalue_bounds();

        assert_approx_eq!(-3.0, min, 1e-9);
        assert_approx_eq!(1.0, max, 1e-9);

        Ok(())
    }

    #[test]
    fn test_eigenvalue_bounds_complex_hermitian() -> Result<()> {
        let observable = PauliSum::from_labels(&[("XY", 1.0), ("ZI", 1.0)])?;
        let (min, max) = observable.eigenvalue_bounds();

        // XY and ZI anticommute, so the spectrum is ±sqrt(1 + 1).
        assert_approx_eq!(-(2.0_f64.sqrt()), min, 1e-9);
        assert_approx_eq!(2.0_f64.sqrt(), max, 1e-9);

        Ok(())
    }
}
