use std::collections::BTreeMap;
use std::fmt::Display;

use anyhow::Result;
use nalgebra::{DMatrix, Matrix2};
use nalgebra_sparse::{coo::CooMatrix, csr::CsrMatrix};
use num_complex::Complex;

use crate::error::BenchError;
use crate::gates::{
    h_dense_matrix, h_matrix, phase_dense_matrix, phase_matrix, rx_dense_matrix, rx_matrix,
    ry_dense_matrix, ry_matrix, rz_dense_matrix, rz_matrix, x_dense_matrix, x_matrix,
    y_dense_matrix, y_matrix, z_dense_matrix, z_matrix,
};
use crate::observable::PauliSum;
use crate::pauli::{Pauli, PauliString};
use crate::qstate::QState;
use crate::Qbit;

/// exp(-i t Σ c_j P_j), synthesized as the ordered product of the term exponentials
/// (first term applied first).
#[derive(Clone, Debug)]
pub struct PauliEvolution {
    terms: Vec<(f64, PauliString)>,
    time: f64,
}

impl PauliEvolution {
    pub fn new(operator: &PauliSum, time: f64) -> Self {
        Self {
            terms: operator
                .terms()
                .iter()
                .map(|(c, p)| (*c, p.clone()))
                .collect(),
            time,
        }
    }

    pub fn num_qubits(&self) -> Option<usize> {
        self.terms.first().map(|(_, p)| p.num_qubits())
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    fn inverse(&self) -> Self {
        Self {
            terms: self.terms.iter().rev().cloned().collect(),
            time: -self.time,
        }
    }

    fn matrix(&self, num_of_qbits: usize) -> CsrMatrix<Qbit> {
        let mut matrix = CsrMatrix::identity(1 << num_of_qbits);
        for (coefficient, pauli) in &self.terms {
            matrix = &pauli.evolution_matrix(coefficient * self.time) * &matrix;
        }
        matrix
    }
}

#[derive(Clone, Debug)]
pub enum GateKind {
    H,
    X,
    Y,
    Z,
    S,
    Sdg,
    T,
    Tdg,
    RX(f64),
    RY(f64),
    RZ(f64),

    CNot,
    /// exp(-iθ ZZ/2)
    RZZ(f64),

    PauliEvolution(PauliEvolution),

    Barrier,
    Measure,
}

impl GateKind {
    pub fn name(&self) -> &'static str {
        match self {
            GateKind::H => "h",
            GateKind::X => "x",
            GateKind::Y => "y",
            GateKind::Z => "z",
            GateKind::S => "s",
            GateKind::Sdg => "sdg",
            GateKind::T => "t",
            GateKind::Tdg => "tdg",
            GateKind::RX(_) => "rx",
            GateKind::RY(_) => "ry",
            GateKind::RZ(_) => "rz",
            GateKind::CNot => "cx",
            GateKind::RZZ(_) => "rzz",
            GateKind::PauliEvolution(_) => "PauliEvolution",
            GateKind::Barrier => "barrier",
            GateKind::Measure => "measure",
        }
    }

    fn inverse(&self) -> Result<GateKind> {
        let inverse = match self {
            GateKind::S => GateKind::Sdg,
            GateKind::Sdg => GateKind::S,
            GateKind::T => GateKind::Tdg,
            GateKind::Tdg => GateKind::T,
            GateKind::RX(angle) => GateKind::RX(-angle),
            GateKind::RY(angle) => GateKind::RY(-angle),
            GateKind::RZ(angle) => GateKind::RZ(-angle),
            GateKind::RZZ(angle) => GateKind::RZZ(-angle),
            GateKind::PauliEvolution(evolution) => GateKind::PauliEvolution(evolution.inverse()),
            GateKind::Measure => return Err(BenchError::NonUnitary("measure").into()),
            gate => gate.clone(),
        };
        Ok(inverse)
    }

    fn is_single_qubit(&self) -> bool {
        matches!(
            self,
            GateKind::H
                | GateKind::X
                | GateKind::Y
                | GateKind::Z
                | GateKind::S
                | GateKind::Sdg
                | GateKind::T
                | GateKind::Tdg
                | GateKind::RX(_)
                | GateKind::RY(_)
                | GateKind::RZ(_)
        )
    }

    fn single_qubit_matrix(&self) -> Option<CsrMatrix<Qbit>> {
        let matrix = match self {
            GateKind::H => h_matrix(),
            GateKind::X => x_matrix(),
            GateKind::Y => y_matrix(),
            GateKind::Z => z_matrix(),
            GateKind::S => phase_matrix(std::f64::consts::FRAC_PI_2),
            GateKind::Sdg => phase_matrix(-std::f64::consts::FRAC_PI_2),
            GateKind::T => phase_matrix(std::f64::consts::FRAC_PI_4),
            GateKind::Tdg => phase_matrix(-std::f64::consts::FRAC_PI_4),
            GateKind::RX(angle) => rx_matrix(*angle),
            GateKind::RY(angle) => ry_matrix(*angle),
            GateKind::RZ(angle) => rz_matrix(*angle),
            _ => return None,
        };
        Some(matrix)
    }

    fn single_qubit_dense_matrix(&self) -> Option<Matrix2<Qbit>> {
        let matrix = match self {
            GateKind::H => h_dense_matrix(),
            GateKind::X => x_dense_matrix(),
            GateKind::Y => y_dense_matrix(),
            GateKind::Z => z_dense_matrix(),
            GateKind::S => phase_dense_matrix(std::f64::consts::FRAC_PI_2),
            GateKind::Sdg => phase_dense_matrix(-std::f64::consts::FRAC_PI_2),
            GateKind::T => phase_dense_matrix(std::f64::consts::FRAC_PI_4),
            GateKind::Tdg => phase_dense_matrix(-std::f64::consts::FRAC_PI_4),
            GateKind::RX(angle) => rx_dense_matrix(*angle),
            GateKind::RY(angle) => ry_dense_matrix(*angle),
            GateKind::RZ(angle) => rz_dense_matrix(*angle),
            _ => return None,
        };
        Some(matrix)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateIndex {
    All,
    One(usize),
    Control { control: usize, target: usize },
    Pair(usize, usize),
}

#[derive(Clone, Debug)]
pub struct Gate {
    kind: GateKind,
    index: GateIndex,
}

impl Gate {
    pub fn kind(&self) -> &GateKind {
        &self.kind
    }

    pub fn index(&self) -> &GateIndex {
        &self.index
    }
}

#[derive(Clone, Copy, Debug)]
pub enum ParameterizedGate {
    RX,
    RY,
    RZ,
}

#[derive(Clone, Debug)]
struct Parameter {
    gate_index: usize,
    gate: ParameterizedGate,
    value: f64,
}

#[derive(Clone, Debug)]
pub struct Circuit {
    name: String,
    gates: Vec<Gate>,
    num_of_qbits: usize,

    parameters: Vec<Parameter>,
}

impl Circuit {
    pub fn new(num_of_qbits: usize) -> Self {
        Self {
            name: String::from("circuit"),
            gates: Vec::new(),
            num_of_qbits,
            parameters: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn num_of_qbits(&self) -> usize {
        self.num_of_qbits
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.num_of_qbits {
            return Err(BenchError::QubitOutOfRange {
                index,
                num_of_qbits: self.num_of_qbits,
            }
            .into());
        }
        Ok(())
    }

    fn check_and_reverse_index(&self, index: usize) -> Result<usize> {
        self.check_index(index)?;
        Ok(self.num_of_qbits - 1 - index)
    }

    fn check_pair(&self, a: usize, b: usize) -> Result<()> {
        self.check_index(a)?;
        self.check_index(b)?;
        if a == b {
            return Err(BenchError::DuplicateQubit(a).into());
        }
        Ok(())
    }

    /// Appends a gate after checking that its qubits fit the register and its kind.
    pub fn add_gate(&mut self, kind: GateKind, index: GateIndex) -> Result<()> {
        match (&kind, &index) {
            (GateKind::CNot, GateIndex::Control { control, target }) => {
                self.check_pair(*control, *target)?
            }
            (GateKind::RZZ(_), GateIndex::Pair(a, b)) => self.check_pair(*a, *b)?,
            (GateKind::PauliEvolution(evolution), GateIndex::All) => {
                if let Some(width) = evolution.num_qubits() {
                    if width != self.num_of_qbits {
                        return Err(BenchError::WidthMismatch {
                            left: self.num_of_qbits,
                            right: width,
                        }
                        .into());
                    }
                }
            }
            (GateKind::Barrier | GateKind::Measure, GateIndex::All) => {}
            (kind, GateIndex::One(q)) if kind.is_single_qubit() => {
                self.check_index(*q)?
            }
            (kind, index) => {
                return Err(anyhow::anyhow!(
                    "Gate `{}` cannot act on {:?}",
                    kind.name(),
                    index
                ))
            }
        }

        self.gates.push(Gate { kind, index });
        Ok(())
    }

    pub fn gate_at(mut self, index: usize, kind: GateKind) -> Result<Self> {
        self.add_gate(kind, GateIndex::One(index))?;
        Ok(self)
    }

    pub fn h(self, index: usize) -> Result<Self> {
        self.gate_at(index, GateKind::H)
    }

    pub fn x(self, index: usize) -> Result<Self> {
        self.gate_at(index, GateKind::X)
    }

    pub fn rx(self, index: usize, angle: f64) -> Result<Self> {
        self.gate_at(index, GateKind::RX(angle))
    }

    pub fn ry(self, index: usize, angle: f64) -> Result<Self> {
        self.gate_at(index, GateKind::RY(angle))
    }

    pub fn rz(self, index: usize, angle: f64) -> Result<Self> {
        self.gate_at(index, GateKind::RZ(angle))
    }

    pub fn cnot(mut self, control: usize, target: usize) -> Result<Self> {
        self.add_gate(GateKind::CNot, GateIndex::Control { control, target })?;
        Ok(self)
    }

    pub fn rzz(mut self, a: usize, b: usize, angle: f64) -> Result<Self> {
        self.add_gate(GateKind::RZZ(angle), GateIndex::Pair(a, b))?;
        Ok(self)
    }

    pub fn evolve(mut self, evolution: PauliEvolution) -> Result<Self> {
        self.add_gate(GateKind::PauliEvolution(evolution), GateIndex::All)?;
        Ok(self)
    }

    pub fn barrier(mut self) -> Self {
        self.gates.push(Gate {
            kind: GateKind::Barrier,
            index: GateIndex::All,
        });
        self
    }

    pub fn add_parametric_gate_at(
        &mut self,
        index: usize,
        gate: ParameterizedGate,
        value: f64,
    ) -> Result<()> {
        let param = Parameter {
            gate_index: self.gates.len(),
            gate,
            value,
        };
        self.add_gate(Self::parametric_kind(gate, value), GateIndex::One(index))?;
        self.parameters.push(param);

        Ok(())
    }

    fn parametric_kind(gate: ParameterizedGate, value: f64) -> GateKind {
        match gate {
            ParameterizedGate::RX => GateKind::RX(value),
            ParameterizedGate::RY => GateKind::RY(value),
            ParameterizedGate::RZ => GateKind::RZ(value),
        }
    }

    pub fn get_parameters(&self) -> Vec<f64> {
        self.parameters.iter().map(|param| param.value).collect()
    }

    pub fn num_parameters(&self) -> usize {
        self.parameters.len()
    }

    pub fn set_parameter(&mut self, param_index: usize, value: f64) -> Result<()> {
        let Some(param) = self.parameters.get_mut(param_index) else {
            return Err(anyhow::anyhow!("Parameter index out of bounds"));
        };
        param.value = value;
        self.gates[param.gate_index].kind = Self::parametric_kind(param.gate, value);

        Ok(())
    }

    pub fn set_parameters(&mut self, values: &[f64]) -> Result<()> {
        if values.len() != self.parameters.len() {
            return Err(anyhow::anyhow!(
                "Number of values does not match number of parameters"
            ));
        }

        for (i, &value) in values.iter().enumerate() {
            self.set_parameter(i, value)?;
        }

        Ok(())
    }

    /// Appends a barrier followed by a measurement of every qubit.
    pub fn measure_all(&mut self) {
        self.gates.push(Gate {
            kind: GateKind::Barrier,
            index: GateIndex::All,
        });
        self.gates.push(Gate {
            kind: GateKind::Measure,
            index: GateIndex::All,
        });
    }

    pub fn has_measurements(&self) -> bool {
        self.gates
            .iter()
            .any(|gate| matches!(gate.kind, GateKind::Measure))
    }

    /// Drops trailing measurements and the barriers directly in front of them.
    pub fn remove_final_measurements(&mut self) {
        let mut removed = false;
        while matches!(self.gates.last().map(|g| &g.kind), Some(GateKind::Measure)) {
            self.gates.pop();
            removed = true;
        }
        if removed {
            while matches!(self.gates.last().map(|g| &g.kind), Some(GateKind::Barrier)) {
                self.gates.pop();
            }
        }
        let len = self.gates.len();
        self.parameters.retain(|param| param.gate_index < len);
    }

    pub fn inverse(&self) -> Result<Circuit> {
        let gates = self
            .gates
            .iter()
            .rev()
            .map(|Gate { kind, index }| {
                Ok(Gate {
                    kind: kind.inverse()?,
                    index: index.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Circuit {
            name: format!("{}_dg", self.name),
            gates,
            num_of_qbits: self.num_of_qbits,
            parameters: Vec::new(),
        })
    }

    pub fn compose(&mut self, other: &Circuit) -> Result<()> {
        if other.num_of_qbits != self.num_of_qbits {
            return Err(BenchError::WidthMismatch {
                left: self.num_of_qbits,
                right: other.num_of_qbits,
            }
            .into());
        }
        self.gates.extend(other.gates.iter().cloned());
        Ok(())
    }

    fn qubits_of(&self, index: &GateIndex) -> Vec<usize> {
        match index {
            GateIndex::All => (0..self.num_of_qbits).collect(),
            GateIndex::One(q) => vec![*q],
            GateIndex::Control { control, target } => vec![*control, *target],
            GateIndex::Pair(a, b) => vec![*a, *b],
        }
    }

    pub fn depth(&self) -> usize {
        let mut levels = vec![0; self.num_of_qbits];
        for gate in &self.gates {
            let qubits = self.qubits_of(&gate.index);
            let front = qubits.iter().map(|&q| levels[q]).max().unwrap_or(0);
            let level = match gate.kind {
                GateKind::Barrier => front,
                _ => front + 1,
            };
            for q in qubits {
                levels[q] = level;
            }
        }
        levels.into_iter().max().unwrap_or(0)
    }

    pub fn count_ops(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for gate in &self.gates {
            *counts.entry(gate.kind.name()).or_insert(0) += 1;
        }
        counts
    }

    pub fn num_nonlocal_gates(&self) -> usize {
        self.gates
            .iter()
            .filter(|gate| {
                matches!(
                    gate.kind,
                    GateKind::CNot | GateKind::RZZ(_) | GateKind::PauliEvolution(_)
                )
            })
            .count()
    }

    fn create_gate_for_index(
        &self,
        index: usize,
        gate: &CsrMatrix<Qbit>,
    ) -> Result<CsrMatrix<Qbit>> {
        let index = self.check_and_reverse_index(index)?;

        let mut matrix = CsrMatrix::identity(1);
        for i in 0..self.num_of_qbits {
            if i == index {
                matrix = kronecker_product(&matrix, gate);
            } else {
                matrix = kronecker_product(&matrix, &CsrMatrix::identity(2));
            }
        }

        Ok(matrix)
    }

    fn build_control_matrix(
        &self,
        control: usize,
        target: usize,
        gate: &CsrMatrix<Qbit>,
    ) -> Result<CsrMatrix<Qbit>> {
        let control = self.check_and_reverse_index(control)?;
        let target = self.check_and_reverse_index(target)?;

        if control == target {
            return Err(anyhow::anyhow!(
                "Control and target qubits cannot be the same"
            ));
        }

        // |0><0|
        let mut zero_zero = CooMatrix::new(2, 2);
        zero_zero.push(0, 0, Complex::new(1.0, 0.0));
        let zero_zero = CsrMatrix::from(&zero_zero);

        // |1><1|
        let mut one_one = CooMatrix::new(2, 2);
        one_one.push(1, 1, Complex::new(1.0, 0.0));
        let one_one = CsrMatrix::from(&one_one);

        let id = CsrMatrix::identity(2);

        let mut zero_matrix = CsrMatrix::identity(1);
        let mut one_matrix = CsrMatrix::identity(1);
        for i in 0..self.num_of_qbits {
            if i == control {
                zero_matrix = kronecker_product(&zero_matrix, &zero_zero);
                one_matrix = kronecker_product(&one_matrix, &one_one);
            } else if i == target {
                zero_matrix = kronecker_product(&zero_matrix, &id);
                one_matrix = kronecker_product(&one_matrix, gate);
            } else {
                zero_matrix = kronecker_product(&zero_matrix, &id);
                one_matrix = kronecker_product(&one_matrix, &id);
            }
        }

        Ok(zero_matrix + one_matrix)
    }

    /// Full-register matrix of a gate, `None` for a barrier.
    fn gate_matrix(&self, gate: &Gate) -> Result<Option<CsrMatrix<Qbit>>> {
        let matrix = match (&gate.kind, &gate.index) {
            (GateKind::Barrier, _) => return Ok(None),
            (GateKind::Measure, _) => return Err(BenchError::NonUnitary("measure").into()),
            (GateKind::CNot, GateIndex::Control { control, target }) => {
                self.build_control_matrix(*control, *target, &x_matrix())?
            }
            (GateKind::RZZ(angle), GateIndex::Pair(a, b)) => {
                PauliString::new(self.num_of_qbits, &[(Pauli::Z, *a), (Pauli::Z, *b)])?
                    .evolution_matrix(angle / 2.0)
            }
            (GateKind::PauliEvolution(evolution), _) => evolution.matrix(self.num_of_qbits),
            (kind, GateIndex::One(q)) => {
                let small = kind.single_qubit_matrix().ok_or_else(|| {
                    anyhow::anyhow!("Gate `{}` is not a single-qubit gate", kind.name())
                })?;
                self.create_gate_for_index(*q, &small)?
            }
            (kind, index) => {
                return Err(anyhow::anyhow!(
                    "Gate `{}` cannot act on {:?}",
                    kind.name(),
                    index
                ))
            }
        };
        Ok(Some(matrix))
    }

    pub fn apply(&self, state: &QState) -> Result<QState> {
        if state.num_of_qbits() != self.num_of_qbits {
            return Err(BenchError::WidthMismatch {
                left: self.num_of_qbits,
                right: state.num_of_qbits(),
            }
            .into());
        }

        let mut result = state.state.clone();
        for gate in &self.gates {
            if let Some(matrix) = self.gate_matrix(gate)? {
                result = &matrix * &result;
            }
        }
        Ok(QState { state: result })
    }

    /// The dense unitary of the whole circuit, qubit 0 being the least significant bit.
    pub fn unitary(&self) -> Result<DMatrix<Qbit>> {
        let dim = 1 << self.num_of_qbits;
        let mut unitary = DMatrix::identity(dim, dim);
        for gate in &self.gates {
            Self::apply_to_rows(gate, &mut unitary)?;
        }
        Ok(unitary)
    }

    /// Multiplies `gate` into `matrix` from the left, mixing only the rows it couples.
    fn apply_to_rows(gate: &Gate, matrix: &mut DMatrix<Qbit>) -> Result<()> {
        match (&gate.kind, &gate.index) {
            (GateKind::Barrier, _) => {}
            (GateKind::Measure, _) => return Err(BenchError::NonUnitary("measure").into()),
            (GateKind::CNot, GateIndex::Control { control, target }) => {
                let (control, target) = (1_usize << control, 1_usize << target);
                for row in 0..matrix.nrows() {
                    if row & control != 0 && row & target == 0 {
                        matrix.swap_rows(row, row | target);
                    }
                }
            }
            (GateKind::RZZ(angle), GateIndex::Pair(a, b)) => {
                let mask = (1_usize << a) | (1_usize << b);
                let even = Qbit::from_polar(1.0, -angle / 2.0);
                for (index, mut row) in matrix.row_iter_mut().enumerate() {
                    row *= if (index & mask).count_ones() % 2 == 0 {
                        even
                    } else {
                        even.conj()
                    };
                }
            }
            (GateKind::PauliEvolution(evolution), _) => {
                for (coefficient, pauli) in &evolution.terms {
                    let theta = coefficient * evolution.time;
                    Self::apply_pauli_rotation(pauli, theta, matrix);
                }
            }
            (kind, GateIndex::One(q)) => {
                let small = kind.single_qubit_dense_matrix().ok_or_else(|| {
                    anyhow::anyhow!("Gate `{}` is not a single-qubit gate", kind.name())
                })?;
                let bit = 1_usize << q;
                for col in 0..matrix.ncols() {
                    for low in (0..matrix.nrows()).filter(|row| row & bit == 0) {
                        let high = low | bit;
                        let (a, b) = (matrix[(low, col)], matrix[(high, col)]);
                        matrix[(low, col)] = small[(0, 0)] * a + small[(0, 1)] * b;
                        matrix[(high, col)] = small[(1, 0)] * a + small[(1, 1)] * b;
                    }
                }
            }
            (kind, index) => {
                return Err(anyhow::anyhow!(
                    "Gate `{}` cannot act on {:?}",
                    kind.name(),
                    index
                ))
            }
        }
        Ok(())
    }

    /// exp(-iθP) = cos θ I - i sin θ P, pairing each basis row with its image under P.
    fn apply_pauli_rotation(pauli: &PauliString, theta: f64, matrix: &mut DMatrix<Qbit>) {
        let cos = Qbit::new(theta.cos(), 0.0);
        let minus_i_sin = Qbit::new(0.0, -theta.sin());

        for basis in 0..matrix.nrows() {
            let (image, phase) = pauli.apply_to_basis(basis);
            if image < basis {
                continue;
            }
            if image == basis {
                let mut row = matrix.row_mut(basis);
                row *= cos + minus_i_sin * phase;
                continue;
            }

            let (_, back) = pauli.apply_to_basis(image);
            let (to_image, to_basis) = (minus_i_sin * phase, minus_i_sin * back);
            for col in 0..matrix.ncols() {
                let (a, b) = (matrix[(basis, col)], matrix[(image, col)]);
                matrix[(image, col)] = cos * b + to_image * a;
                matrix[(basis, col)] = cos * a + to_basis * b;
            }
        }
    }
}

impl Display for Circuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{}: {} qubits, {} instructions, depth {}",
            self.name,
            self.num_of_qbits,
            self.gates.len(),
            self.depth()
        )?;

        for Gate { kind, index } in &self.gates {
            let name = match kind {
                GateKind::RX(angle)
                | GateKind::RY(angle)
                | GateKind::RZ(angle)
                | GateKind::RZZ(angle) => format!("{}({:.4})", kind.name(), angle),
                GateKind::PauliEvolution(evolution) => format!(
                    "{}(t={:.4}, {} terms)",
                    kind.name(),
                    evolution.time(),
                    evolution.num_terms()
                ),
                _ => kind.name().to_string(),
            };
            let qubits = match index {
                GateIndex::All => "q".to_string(),
                GateIndex::One(q) => format!("q[{}]", q),
                GateIndex::Control { control, target } => format!("q[{}], q[{}]", control, target),
                GateIndex::Pair(a, b) => format!("q[{}], q[{}]", a, b),
            };
            writeln!(f, "  {} {}", name, qubits)?;
        }

        Ok(())
    }
}

pub fn kronecker_product(x: &CsrMatrix<Qbit>, y: &CsrMatrix<Qbit>) -> CsrMatrix<Qbit> {
    let mut result = CooMatrix::new(x.nrows() * y.nrows(), x.ncols() * y.ncols());

    for (rx, cx, value_x) in x.triplet_iter() {
        for (ry, cy, value_y) in y.triplet_iter() {
            let new_row = rx * y.nrows() + ry;
            let new_col = cx * y.ncols() + cy;
            let new_value = value_x * value_y;
            result.push(new_row, new_col, new_value);
        }
    }

    CsrMatrix::from(&result)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;
    use crate::assert_approx_complex_eq;
    use crate::equivalence::OperatorEquiv;

    #[test]
    fn test_bell_state() -> Result<()> {
        let q00 = QState::from_str("00").unwrap();
        let result = Circuit::new(q00.num_of_qbits())
            .h(0)?
            .cnot(0, 1)?
            .apply(&q00)?;

        // Bell state |00> + |11>
        assert_approx_complex_eq!(1.0 / 2f64.sqrt(), 0.0, result.state[0]);
        assert_approx_complex_eq!(0.0, 0.0, result.state[1]);
        assert_approx_complex_eq!(0.0, 0.0, result.state[2]);
        assert_approx_complex_eq!(1.0 / 2f64.sqrt(), 0.0, result.state[3]);

        Ok(())
    }

    #[test]
    fn test_qubit_zero_is_least_significant() -> Result<()> {
        let result = Circuit::new(3).x(0)?.apply(&QState::zero_state(3))?;
        assert_approx_complex_eq!(1.0, 0.0, result.state[1]);

        let result = Circuit::new(3).x(2)?.apply(&QState::zero_state(3))?;
        assert_approx_complex_eq!(1.0, 0.0, result.state[4]);

        Ok(())
    }

    #[test]
    fn test_parameterized_gate() -> Result<()> {
        let q00 = QState::from_str("00").unwrap();
        let mut circuit = Circuit::new(q00.num_of_qbits());
        circuit.add_parametric_gate_at(0, ParameterizedGate::RX, PI)?;

        let result = circuit.apply(&q00)?;

        assert_approx_complex_eq!(0.0, 0.0, result.state[0]);
        assert_approx_complex_eq!(0.0, -1.0, result.state[1]);

        // Update the parameter to PI/2
        let mut param = circuit.get_parameters();
        assert_eq!(1, param.len());
        assert_eq!(PI, param[0]);

        param[0] = PI / 2.0;
        circuit.set_parameters(&param)?;

        let param = circuit.get_parameters();
        assert_eq!(1, param.len());
        assert_eq!(PI / 2.0, param[0]);

        let result = circuit.apply(&q00)?;

        assert_approx_complex_eq!(1.0 / 2f64.sqrt(), 0.0, result.state[0]);
        assert_approx_complex_eq!(0.0, -1.0 / 2f64.sqrt(), result.state[1]);

        assert!(circuit.set_parameters(&[1.0, 2.0]).is_err());

        Ok(())
    }

    #[test]
    fn test_invalid_indices() {
        assert!(Circuit::new(2).h(2).is_err());
        assert!(Circuit::new(2).cnot(1, 1).is_err());
        assert!(Circuit::new(2).rzz(0, 3, 0.1).is_err());
        assert!(Circuit::new(2)
            .add_gate(GateKind::CNot, GateIndex::One(0))
            .is_err());
    }

    #[test]
    fn test_rzz_matches_cx_rz_cx() -> Result<()> {
        let native = Circuit::new(3).rzz(0, 2, 0.83)?;
        let decomposed = Circuit::new(3).cnot(0, 2)?.rz(2, 0.83)?.cnot(0, 2)?;

        let equiv = OperatorEquiv::default();
        assert!(equiv.equals(&native.unitary()?, &decomposed.unitary()?));

        Ok(())
    }

    #[test]
    fn test_inverse_undoes_circuit() -> Result<()> {
        let mut circuit = Circuit::new(3)
            .h(0)?
            .gate_at(1, GateKind::T)?
            .gate_at(2, GateKind::S)?
            .cnot(0, 2)?
            .ry(1, 0.4)?
            .rzz(1, 2, -0.6)?;
        let inverse = circuit.inverse()?;
        circuit.compose(&inverse)?;

        let dim = 1 << 3;
        let equiv = OperatorEquiv::default();
        assert!(equiv.equals(&circuit.unitary()?, &DMatrix::identity(dim, dim)));

        Ok(())
    }

    #[test]
    fn test_single_term_evolution_matches_rzz() -> Result<()> {
        let mut operator = PauliSum::new(2);
        operator.add_pauli_operator(0.5, &[(Pauli::Z, 0), (Pauli::Z, 1)])?;
        let evolved = Circuit::new(2).evolve(PauliEvolution::new(&operator, 0.3))?;
        let native = Circuit::new(2).rzz(0, 1, 0.3)?;

        let equiv = OperatorEquiv::default();
        assert!(equiv.equals(&evolved.unitary()?, &native.unitary()?));

        Ok(())
    }

    #[test]
    fn test_measurements_are_not_unitary() -> Result<()> {
        let mut circuit = Circuit::new(2).h(0)?.cnot(0, 1)?;
        circuit.measure_all();

        assert!(circuit.has_measurements());
        assert!(circuit.unitary().is_err());
        assert!(circuit.inverse().is_err());

        circuit.remove_final_measurements();
        assert!(!circuit.has_measurements());
        assert_eq!(2, circuit.gates().len());
        assert!(circuit.unitary().is_ok());

        Ok(())
    }

    #[test]
    fn test_depth_and_counts() -> Result<()> {
        let circuit = Circuit::new(3)
            .h(0)?
            .h(1)?
            .cnot(0, 1)?
            .barrier()
            .rz(2, 0.1)?;

        // The barrier lines every qubit up behind the CX.
        assert_eq!(3, circuit.depth());
        assert_eq!(1, circuit.num_nonlocal_gates());

        let counts = circuit.count_ops();
        assert_eq!(Some(&2), counts.get("h"));
        assert_eq!(Some(&1), counts.get("cx"));
        assert_eq!(Some(&1), counts.get("barrier"));

        Ok(())
    }

    #[test]
    fn test_display_lists_instructions() -> Result<()> {
        let mut circuit = Circuit::new(2).with_name("draft").h(0)?.cnot(0, 1)?;
        circuit.set_name("demo");
        let text = circuit.to_string();

        assert_eq!("demo", circuit.name());
        assert!(text.starts_with("demo: 2 qubits, 2 instructions, depth 2"));
        assert!(text.contains("  h q[0]"));
        assert!(text.contains("  cx q[0], q[1]"));

        Ok(())
    }

    #[test]
    fn test_unitary_columns_match_state_evolution() -> Result<()> {
        let operator = PauliSum::from_labels(&[("XYZ", 0.7), ("IZZ", -0.4), ("YIX", 0.25)])?;
        let circuit = Circuit::new(3)
            .h(0)?
            .gate_at(1, GateKind::S)?
            .gate_at(2, GateKind::Tdg)?
            .cnot(2, 0)?
            .ry(1, 0.9)?
            .rzz(0, 2, -1.3)?
            .barrier()
            .evolve(PauliEvolution::new(&operator, 0.6))?
            .cnot(0, 1)?
            .rx(2, 0.2)?;

        let unitary = circuit.unitary()?;
        for basis in 0..8 {
            let label = format!("{:03b}", basis);
            let state = circuit.apply(&QState::from_str(&label)?)?;
            for row in 0..8 {
                let expected = state.state[row];
                assert_approx_complex_eq!(expected.re, expected.im, unitary[(row, basis)]);
            }
        }

        Ok(())
    }
}
