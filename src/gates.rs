use nalgebra::Matrix2;
use nalgebra_sparse::convert::serial::convert_dense_coo;
use nalgebra_sparse::{coo::CooMatrix, csr::CsrMatrix};
use num_complex::Complex;

use crate::Qbit;

fn to_sparse(dense: &Matrix2<Qbit>) -> CsrMatrix<Qbit> {
    CsrMatrix::from(&convert_dense_coo(dense))
}

pub fn h_dense_matrix() -> Matrix2<Qbit> {
    let root2 = 2.0_f64.sqrt();
    let one = Complex::new(1.0, 0.0);
    Matrix2::from_row_slice(&[one / root2, one / root2, one / root2, -one / root2])
}

pub fn x_dense_matrix() -> Matrix2<Qbit> {
    Matrix2::from_row_slice(&[Complex::ZERO, Complex::ONE, Complex::ONE, Complex::ZERO])
}

pub fn y_dense_matrix() -> Matrix2<Qbit> {
    Matrix2::from_row_slice(&[Complex::ZERO, -Complex::I, Complex::I, Complex::ZERO])
}

pub fn z_dense_matrix() -> Matrix2<Qbit> {
    Matrix2::from_row_slice(&[Complex::ONE, Complex::ZERO, Complex::ZERO, -Complex::ONE])
}

/// Phase gate diag(1, e^{iφ}). S is φ = π/2, T is φ = π/4.
pub fn phase_dense_matrix(phi: f64) -> Matrix2<Qbit> {
    Matrix2::from_row_slice(&[
        Complex::ONE,
        Complex::ZERO,
        Complex::ZERO,
        Complex::from_polar(1.0, phi),
    ])
}

/// RX(θ) = exp(-iθX/2)
pub fn rx_dense_matrix(theta: f64) -> Matrix2<Qbit> {
    let c = Complex::new((theta / 2.0).cos(), 0.0);
    let s = Complex::new(0.0, -(theta / 2.0).sin());
    Matrix2::from_row_slice(&[c, s, s, c])
}

/// RY(θ) = exp(-iθY/2)
pub fn ry_dense_matrix(theta: f64) -> Matrix2<Qbit> {
    let c = Complex::new((theta / 2.0).cos(), 0.0);
    let s = Complex::new((theta / 2.0).sin(), 0.0);
    Matrix2::from_row_slice(&[c, -s, s, c])
}

/// RZ(θ) = exp(-iθZ/2)
pub fn rz_dense_matrix(theta: f64) -> Matrix2<Qbit> {
    Matrix2::from_row_slice(&[
        Complex::from_polar(1.0, -theta / 2.0),
        Complex::ZERO,
        Complex::ZERO,
        Complex::from_polar(1.0, theta / 2.0),
    ])
}

pub fn h_matrix() -> CsrMatrix<Qbit> {
    to_sparse(&h_dense_matrix())
}

pub fn x_matrix() -> CsrMatrix<Qbit> {
    let mut x_coo = CooMatrix::new(2, 2);
    x_coo.push(0, 1, Complex::ONE);
    x_coo.push(1, 0, Complex::ONE);
    CsrMatrix::from(&x_coo)
}

pub fn y_matrix() -> CsrMatrix<Qbit> {
    let mut y_coo = CooMatrix::new(2, 2);
    y_coo.push(0, 1, -Complex::I);
    y_coo.push(1, 0, Complex::I);
    CsrMatrix::from(&y_coo)
}

pub fn z_matrix() -> CsrMatrix<Qbit> {
    let mut z_coo = CooMatrix::new(2, 2);
    z_coo.push(0, 0, Complex::ONE);
    z_coo.push(1, 1, -Complex::ONE);
    CsrMatrix::from(&z_coo)
}

pub fn phase_matrix(phi: f64) -> CsrMatrix<Qbit> {
    let mut p_coo = CooMatrix::new(2, 2);
    p_coo.push(0, 0, Complex::ONE);
    p_coo.push(1, 1, Complex::from_polar(1.0, phi));
    CsrMatrix::from(&p_coo)
}

pub fn rx_matrix(theta: f64) -> CsrMatrix<Qbit> {
    to_sparse(&rx_dense_matrix(theta))
}

pub fn ry_matrix(theta: f64) -> CsrMatrix<Qbit> {
    to_sparse(&ry_dense_matrix(theta))
}

pub fn rz_matrix(theta: f64) -> CsrMatrix<Qbit> {
    let mut rz_coo = CooMatrix::new(2, 2);
    rz_coo.push(0, 0, Complex::from_polar(1.0, -theta / 2.0));
    rz_coo.push(1, 1, Complex::from_polar(1.0, theta / 2.0));
    CsrMatrix::from(&rz_coo)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;
    use crate::assert_approx_complex_eq;

    #[test]
    fn test_rotations_are_unitary() {
        for theta in [0.0, 0.3, PI / 2.0, -1.7] {
            for gate in [
                rx_dense_matrix(theta),
                ry_dense_matrix(theta),
                rz_dense_matrix(theta),
            ] {
                let product = gate.adjoint() * gate;
                assert_approx_complex_eq!(1.0, 0.0, product[(0, 0)]);
                assert_approx_complex_eq!(0.0, 0.0, product[(0, 1)]);
                assert_approx_complex_eq!(0.0, 0.0, product[(1, 0)]);
                assert_approx_complex_eq!(1.0, 0.0, product[(1, 1)]);
            }
        }
    }

    #[test]
    fn test_rx_pi_is_x_up_to_phase() {
        let rx = rx_dense_matrix(PI);
        assert_approx_complex_eq!(0.0, 0.0, rx[(0, 0)]);
        assert_approx_complex_eq!(0.0, -1.0, rx[(0, 1)]);
        assert_approx_complex_eq!(0.0, -1.0, rx[(1, 0)]);
    }

    #[test]
    fn test_hzh_is_x() {
        let h = h_dense_matrix();
        let hzh = h * z_dense_matrix() * h;
        let x = x_dense_matrix();
        for i in 0..2 {
            for j in 0..2 {
                assert_approx_complex_eq!(x[(i, j)].re, x[(i, j)].im, hzh[(i, j)]);
            }
        }
    }

    #[test]
    fn test_sparse_matches_dense() {
        let sparse = rz_matrix(0.7);
        let dense = rz_dense_matrix(0.7);
        for (row, col, value) in sparse.triplet_iter() {
            assert_approx_complex_eq!(dense[(row, col)].re, dense[(row, col)].im, *value);
        }
    }
}
