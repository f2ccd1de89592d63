//! Program instructions combining an operation with its targets.

use serde::{Deserialize, Serialize};

use crate::gate::{Pauli, StandardGate};
use crate::noise::NoiseModel;
use crate::qubit::{Coord, MeasurementRef, QubitId};

/// A parity check over earlier measurement outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detector {
    /// Coordinate tag. The first three entries are `(x, y, t)`; a fourth
    /// entry marks postselection detectors.
    pub coords: Vec<f64>,
    /// Absolute measurement references whose parity is checked.
    pub records: Vec<MeasurementRef>,
}

impl Detector {
    /// Create a detector over the given measurements.
    pub fn new(coords: Vec<f64>, records: impl IntoIterator<Item = MeasurementRef>) -> Self {
        Self {
            coords,
            records: records.into_iter().collect(),
        }
    }
}

/// A term of a logical observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObservableTarget {
    /// A measurement outcome on the tape.
    Record(MeasurementRef),
    /// A Pauli operator on a qubit, for observables declared without
    /// measuring.
    Pauli(Pauli, QubitId),
}

/// The kind of instruction in a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// A Clifford gate broadcast over its targets.
    Gate(StandardGate),
    /// Measurement in the given basis.
    Measure(Pauli),
    /// Reset to |0⟩.
    Reset,
    /// Moment boundary.
    Tick,
    /// Coordinate metadata for one qubit.
    QubitCoords(Coord),
    /// Detector declaration.
    Detector(Detector),
    /// Logical observable declaration.
    ObservableInclude {
        /// Observable index.
        index: u32,
        /// Terms of the observable.
        targets: Vec<ObservableTarget>,
    },
    /// Shift applied to all later detector coordinates.
    ShiftCoords(Coord),
    /// Pauli gate on the target, applied when the referenced outcome is 1.
    Feedback {
        /// The Pauli applied.
        gate: StandardGate,
        /// The controlling measurement.
        record: MeasurementRef,
    },
    /// Noise channel broadcast over its targets.
    NoiseChannel(NoiseModel),
}

/// A complete instruction with operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The kind of instruction.
    pub kind: InstructionKind,
    /// Qubits this instruction operates on. Two-qubit gates and
    /// `DEPOLARIZE2` hold a flat list of pairs.
    pub qubits: Vec<QubitId>,
}

impl Instruction {
    /// Create a gate instruction.
    pub fn gate(gate: StandardGate, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Gate(gate),
            qubits: qubits.into_iter().collect(),
        }
    }

    /// Create a two-qubit gate instruction over (control, target) pairs.
    pub fn pairs(gate: StandardGate, pairs: impl IntoIterator<Item = (QubitId, QubitId)>) -> Self {
        Self::gate(gate, pairs.into_iter().flat_map(|(c, t)| [c, t]))
    }

    /// Create a measurement instruction.
    pub fn measure(basis: Pauli, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Measure(basis),
            qubits: qubits.into_iter().collect(),
        }
    }

    /// Create a reset instruction.
    pub fn reset(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Reset,
            qubits: qubits.into_iter().collect(),
        }
    }

    /// Create a moment boundary.
    pub fn tick() -> Self {
        Self {
            kind: InstructionKind::Tick,
            qubits: vec![],
        }
    }

    /// Create a noise channel instruction.
    pub fn noise(model: NoiseModel, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::NoiseChannel(model),
            qubits: qubits.into_iter().collect(),
        }
    }

    /// Check if this is a gate instruction.
    pub fn is_gate(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(_))
    }

    /// Check if this is a two-qubit gate instruction.
    pub fn is_two_qubit_gate(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(g) if g.is_two_qubit())
    }

    /// Check if this is a measurement.
    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure(_))
    }

    /// Check if this is a reset.
    pub fn is_reset(&self) -> bool {
        matches!(self.kind, InstructionKind::Reset)
    }

    /// Check if this is a moment boundary.
    pub fn is_tick(&self) -> bool {
        matches!(self.kind, InstructionKind::Tick)
    }

    /// Check if this is a detector declaration.
    pub fn is_detector(&self) -> bool {
        matches!(self.kind, InstructionKind::Detector(_))
    }

    /// Check if this is a noise channel.
    pub fn is_noise_channel(&self) -> bool {
        matches!(self.kind, InstructionKind::NoiseChannel(_))
    }

    /// Check if this instruction is metadata with no physical effect.
    pub fn is_annotation(&self) -> bool {
        matches!(
            self.kind,
            InstructionKind::QubitCoords(_)
                | InstructionKind::Detector(_)
                | InstructionKind::ObservableInclude { .. }
                | InstructionKind::ShiftCoords(_)
        )
    }

    /// Get the gate if this is a gate instruction.
    pub fn as_gate(&self) -> Option<StandardGate> {
        match self.kind {
            InstructionKind::Gate(g) => Some(g),
            _ => None,
        }
    }

    /// Number of measurement outcomes this instruction appends to the tape.
    pub fn num_measurements(&self) -> usize {
        if self.is_measure() { self.qubits.len() } else { 0 }
    }

    /// Get the name of the instruction.
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(g) => g.name(),
            InstructionKind::Measure(basis) => basis.measure_name(),
            InstructionKind::Reset => "R",
            InstructionKind::Tick => "TICK",
            InstructionKind::QubitCoords(_) => "QUBIT_COORDS",
            InstructionKind::Detector(_) => "DETECTOR",
            InstructionKind::ObservableInclude { .. } => "OBSERVABLE_INCLUDE",
            InstructionKind::ShiftCoords(_) => "SHIFT_COORDS",
            InstructionKind::Feedback { gate, .. } => gate.name(),
            InstructionKind::NoiseChannel(model) => model.name(),
        }
    }
}
