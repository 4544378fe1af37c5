use anyhow::Result;
use nalgebra::DMatrix;

use crate::circuit::Circuit;
use crate::Qbit;

/// Compares operators up to a global phase.
pub struct OperatorEquiv {
    atol: f64,
}

impl Default for OperatorEquiv {
    fn default() -> Self {
        Self::new(1e-8)
    }
}

impl OperatorEquiv {
    pub fn new(atol: f64) -> Self {
        OperatorEquiv { atol }
    }

    /// The phase φ with `a ≈ φ b`, if there is one.
    pub fn global_phase(&self, a: &DMatrix<Qbit>, b: &DMatrix<Qbit>) -> Option<Qbit> {
        if a.shape() != b.shape() {
            return None;
        }

        // Pivot on the largest entry of b so the ratio is well conditioned.
        let (pivot, reference) = b
            .iter()
            .enumerate()
            .max_by(|(_, x), (_, y)| x.norm_sqr().total_cmp(&y.norm_sqr()))?;
        if reference.norm() < self.atol {
            return a.iter().all(|z| z.norm() < self.atol).then_some(Qbit::ONE);
        }

        let phase = a.as_slice()[pivot] / reference;
        if (phase.norm() - 1.0).abs() > self.atol {
            return None;
        }

        a.iter()
            .zip(b.iter())
            .all(|(x, y)| (x - phase * y).norm() < self.atol)
            .then_some(phase)
    }

    pub fn equals(&self, a: &DMatrix<Qbit>, b: &DMatrix<Qbit>) -> bool {
        self.global_phase(a, b).is_some()
    }
}

impl Circuit {
    /// Whether both circuits implement the same unitary up to global phase.
    pub fn equiv(&self, other: &Circuit) -> Result<bool> {
        Ok(OperatorEquiv::default().equals(&self.unitary()?, &other.unitary()?))
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Matrix2;
    use num_complex::Complex;

    use crate::assert_approx_complex_eq;
    use crate::gates::{h_dense_matrix, phase_dense_matrix, rz_dense_matrix};

    use super::*;

    fn dense(m: Matrix2<Qbit>) -> DMatrix<Qbit> {
        DMatrix::from_iterator(2, 2, m.iter().copied())
    }

    #[test]
    fn test_equals_identity() {
        let equiv = OperatorEquiv::new(1e-8);
        let id = DMatrix::identity(4, 4);
        assert!(equiv.equals(&id, &id));
    }

    #[test]
    fn test_equals_h_and_h() {
        let equiv = OperatorEquiv::new(1e-8);
        let h = dense(h_dense_matrix());
        assert!(equiv.equals(&h, &h));
    }

    #[test]
    fn test_not_equals_h_and_t() {
        let equiv = OperatorEquiv::new(1e-8);
        let h = dense(h_dense_matrix());
        let t = dense(phase_dense_matrix(std::f64::consts::FRAC_PI_4));
        assert!(!equiv.equals(&h, &t));
    }

    #[test]
    fn test_equals_with_small_difference() {
        let equiv = OperatorEquiv::new(1e-6);
        let h1 = dense(h_dense_matrix());
        let mut h2 = dense(h_dense_matrix());
        h2[(0, 0)].re += 1e-8;
        assert!(equiv.equals(&h1, &h2));
    }

    #[test]
    fn test_not_equals_with_large_difference() {
        let equiv = OperatorEquiv::new(1e-8);
        let h1 = dense(h_dense_matrix());
        let mut h2 = dense(h_dense_matrix());
        h2[(0, 0)].re += 1e-2;
        assert!(!equiv.equals(&h1, &h2));
    }

    #[test]
    fn test_rz_and_phase_gate_differ_by_global_phase() {
        let equiv = OperatorEquiv::default();
        let rz = dense(rz_dense_matrix(0.6));
        let p = dense(phase_dense_matrix(0.6));

        let phase = equiv.global_phase(&rz, &p).unwrap();
        let expected = Complex::from_polar(1.0, -0.3);
        assert_approx_complex_eq!(expected.re, expected.im, phase);
    }

    #[test]
    fn test_scaled_matrix_is_not_equivalent() {
        let equiv = OperatorEquiv::default();
        let h = dense(h_dense_matrix());
        let scaled = h.map(|z| z * 2.0);
        assert!(!equiv.equals(&scaled, &h));
    }

    #[test]
    fn test_shape_mismatch() {
        let equiv = OperatorEquiv::default();
        let a: DMatrix<Qbit> = DMatrix::identity(2, 2);
        let b: DMatrix<Qbit> = DMatrix::identity(4, 4);
        assert!(!equiv.equals(&a, &b));
    }

    #[test]
    fn test_circuit_equiv() -> Result<()> {
        let a = Circuit::new(2).h(0)?.h(0)?;
        let b = Circuit::new(2);
        assert!(a.equiv(&b)?);

        let c = Circuit::new(2).x(1)?;
        assert!(!c.equiv(&b)?);

        Ok(())
    }
}
