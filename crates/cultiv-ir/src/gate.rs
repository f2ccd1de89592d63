//! Clifford gate set used by generated programs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Clifford gates with known semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate, used to mark idle qubits inside a moment.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// Hadamard-like gate exchanging the Y and Z axes.
    HYZ,

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
}

impl StandardGate {
    /// Name of this gate in the execution engine's text format.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "I",
            StandardGate::X => "X",
            StandardGate::Y => "Y",
            StandardGate::Z => "Z",
            StandardGate::H => "H",
            StandardGate::S => "S",
            StandardGate::Sdg => "S_DAG",
            StandardGate::HYZ => "H_YZ",
            StandardGate::CX => "CX",
            StandardGate::CY => "CY",
            StandardGate::CZ => "CZ",
        }
    }

    /// Number of qubits this gate acts on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::CX | StandardGate::CY | StandardGate::CZ => 2,
            _ => 1,
        }
    }

    /// Whether this is a two-qubit gate.
    #[inline]
    pub fn is_two_qubit(&self) -> bool {
        self.num_qubits() == 2
    }

    /// Whether this is a Pauli gate, the only gates allowed as classically
    /// controlled feedback.
    pub fn is_pauli(&self) -> bool {
        matches!(
            self,
            StandardGate::X | StandardGate::Y | StandardGate::Z
        )
    }

    /// The controlled version of a Pauli gate.
    pub fn controlled(&self) -> Option<StandardGate> {
        match self {
            StandardGate::X => Some(StandardGate::CX),
            StandardGate::Y => Some(StandardGate::CY),
            StandardGate::Z => Some(StandardGate::CZ),
            _ => None,
        }
    }
}

impl fmt::Display for StandardGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single-qubit Pauli operator, used as a measurement basis and as an
/// observable target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pauli {
    /// Pauli X.
    X,
    /// Pauli Y.
    Y,
    /// Pauli Z.
    Z,
}

impl Pauli {
    /// Letter used in the text format.
    pub fn letter(&self) -> &'static str {
        match self {
            Pauli::X => "X",
            Pauli::Y => "Y",
            Pauli::Z => "Z",
        }
    }

    /// Name of the measurement instruction in this basis.
    pub fn measure_name(&self) -> &'static str {
        match self {
            Pauli::X => "MX",
            Pauli::Y => "MY",
            Pauli::Z => "M",
        }
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}
