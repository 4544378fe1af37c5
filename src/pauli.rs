use std::fmt::Display;
use std::str::FromStr;

use anyhow::Result;
use nalgebra_sparse::{coo::CooMatrix, csr::CsrMatrix};
use num_complex::Complex;

use crate::error::BenchError;
use crate::Qbit;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pauli {
    I,
    X,
    Y,
    Z,
}

impl Pauli {
    pub fn label(self) -> char {
        match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        }
    }

    fn from_label(c: char) -> Option<Self> {
        match c {
            'I' => Some(Pauli::I),
            'X' => Some(Pauli::X),
            'Y' => Some(Pauli::Y),
            'Z' => Some(Pauli::Z),
            _ => None,
        }
    }
}

/// Tensor product of single-qubit Paulis, `ops[q]` acting on qubit `q`.
///
/// Labels are big-endian: `"XIZ"` is X on qubit 2 and Z on qubit 0.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PauliString {
    ops: Vec<Pauli>,
}

impl PauliString {
    pub fn identity(num_qubits: usize) -> Self {
        Self {
            ops: vec![Pauli::I; num_qubits],
        }
    }

    pub fn new(num_qubits: usize, ops: &[(Pauli, usize)]) -> Result<Self> {
        let mut string = Self::identity(num_qubits);
        for &(kind, index) in ops {
            if index >= num_qubits {
                return Err(BenchError::QubitOutOfRange {
                    index,
                    num_of_qbits: num_qubits,
                }
                .into());
            }
            if string.ops[index] != Pauli::I {
                return Err(BenchError::DuplicateQubit(index).into());
            }
            string.ops[index] = kind;
        }
        Ok(string)
    }

    pub fn num_qubits(&self) -> usize {
        self.ops.len()
    }

    pub fn get(&self, qubit: usize) -> Pauli {
        self.ops[qubit]
    }

    /// Qubits flipped by the string (X or Y).
    pub fn x_mask(&self) -> usize {
        self.mask(|p| matches!(p, Pauli::X | Pauli::Y))
    }

    /// Qubits picking up a sign (Z or Y).
    pub fn z_mask(&self) -> usize {
        self.mask(|p| matches!(p, Pauli::Z | Pauli::Y))
    }

    fn mask(&self, pred: impl Fn(Pauli) -> bool) -> usize {
        self.ops
            .iter()
            .enumerate()
            .filter(|(_, &p)| pred(p))
            .fold(0, |acc, (q, _)| acc | (1 << q))
    }

    pub fn weight(&self) -> usize {
        self.ops.iter().filter(|&&p| p != Pauli::I).count()
    }

    pub fn is_identity(&self) -> bool {
        self.weight() == 0
    }

    pub fn is_diagonal(&self) -> bool {
        self.x_mask() == 0
    }

    pub fn commutes_with(&self, other: &PauliString) -> bool {
        let anticommuting = self
            .ops
            .iter()
            .zip(&other.ops)
            .filter(|(&a, &b)| a != Pauli::I && b != Pauli::I && a != b)
            .count();
        anticommuting % 2 == 0
    }

    /// P|b> = phase |b'>, returns (b', phase).
    pub fn apply_to_basis(&self, basis: usize) -> (usize, Qbit) {
        // Y = iXZ, so every Y contributes a factor of i on top of the Z sign.
        let num_y = self.ops.iter().filter(|&&p| p == Pauli::Y).count();
        let mut phase = Complex::<f64>::I.powu(num_y as u32);
        if (basis & self.z_mask()).count_ones() % 2 == 1 {
            phase = -phase;
        }
        (basis ^ self.x_mask(), phase)
    }

    pub fn to_sparse(&self) -> CsrMatrix<Qbit> {
        let dim = 1 << self.num_qubits();
        let mut coo = CooMatrix::new(dim, dim);
        for col in 0..dim {
            let (row, phase) = self.apply_to_basis(col);
            coo.push(row, col, phase);
        }
        CsrMatrix::from(&coo)
    }

    /// exp(-iθP) = cos θ I - i sin θ P
    pub fn evolution_matrix(&self, theta: f64) -> CsrMatrix<Qbit> {
        let dim = 1 << self.num_qubits();
        let cos = Complex::new(theta.cos(), 0.0);
        let minus_i_sin = Complex::new(0.0, -theta.sin());

        let mut coo = CooMatrix::new(dim, dim);
        for col in 0..dim {
            let (row, phase) = self.apply_to_basis(col);
            if row == col {
                coo.push(col, col, cos + minus_i_sin * phase);
            } else {
                coo.push(col, col, cos);
                coo.push(row, col, minus_i_sin * phase);
            }
        }
        CsrMatrix::from(&coo)
    }
}

impl FromStr for PauliString {
    type Err = BenchError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let ops = label
            .chars()
            .rev()
            .map(Pauli::from_label)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| BenchError::InvalidPauliLabel(label.to_string()))?;
        if ops.is_empty() {
            return Err(BenchError::InvalidPauliLabel(label.to_string()));
        }
        Ok(Self { ops })
    }
}

impl Display for PauliString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for op in self.ops.iter().rev() {
            write!(f, "{}", op.label())?;
        }
        Ok(())
    }
}
