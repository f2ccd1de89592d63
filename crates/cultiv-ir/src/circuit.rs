//! Program builder API.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::{IrError, IrResult};
use crate::gate::{Pauli, StandardGate};
use crate::instruction::{Detector, Instruction, InstructionKind, ObservableTarget};
use crate::noise::NoiseModel;
use crate::qubit::{Coord, MeasurementRef, QubitId};
use crate::tape::MeasurementTape;

/// A linear program of instructions together with its measurement tape.
///
/// Every method that adds measurements records them on the tape as they
/// are appended, so detectors built later in the same program (or in a
/// fragment continuing it) can look up absolute positions.
#[derive(Debug, Clone)]
pub struct Circuit {
    /// Name of the program or fragment.
    name: String,
    /// The instruction stream, in execution order.
    instructions: Vec<Instruction>,
    /// Measurements performed so far, including any inherited from a parent.
    tape: MeasurementTape,
}

#[derive(Serialize)]
struct CircuitView<'a> {
    name: &'a str,
    num_measurements: usize,
    instructions: &'a [Instruction],
}

impl Circuit {
    /// Create a new empty program.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: vec![],
            tape: MeasurementTape::new(),
        }
    }

    /// Create a fragment whose measurements continue `parent`'s tape.
    ///
    /// The fragment can only be appended back to `parent` while the parent
    /// has not recorded any further measurements.
    pub fn continuing(name: impl Into<String>, parent: &Circuit) -> Self {
        Self {
            name: name.into(),
            instructions: vec![],
            tape: MeasurementTape::continuing(&parent.tape),
        }
    }

    /// Append a raw instruction after validating it.
    pub fn push(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.validate(&instruction)?;
        if instruction.is_measure() {
            for &q in &instruction.qubits {
                self.tape.record(q);
            }
        }
        self.instructions.push(instruction);
        Ok(self)
    }

    fn validate(&self, instruction: &Instruction) -> IrResult<()> {
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                check_arity(gate.name(), gate.num_qubits(), &instruction.qubits)?;
                check_distinct(Some(gate.name()), &instruction.qubits)
            }
            InstructionKind::NoiseChannel(model) => {
                check_arity(model.name(), model.num_qubits(), &instruction.qubits)
            }
            InstructionKind::Measure(_) | InstructionKind::Reset => {
                check_distinct(None, &instruction.qubits)
            }
            InstructionKind::Detector(det) => {
                det.records.iter().try_for_each(|&r| self.check_record(r))
            }
            InstructionKind::ObservableInclude { targets, .. } => {
                targets.iter().try_for_each(|t| match t {
                    ObservableTarget::Record(r) => self.check_record(*r),
                    ObservableTarget::Pauli(..) => Ok(()),
                })
            }
            InstructionKind::Feedback { gate, record } => {
                if !gate.is_pauli() {
                    return Err(IrError::InvalidFeedback(gate.name().to_string()));
                }
                self.check_record(*record)
            }
            InstructionKind::Tick | InstructionKind::QubitCoords(_) | InstructionKind::ShiftCoords(_) => {
                Ok(())
            }
        }
    }

    fn check_record(&self, reference: MeasurementRef) -> IrResult<()> {
        if self.tape.contains(reference) {
            Ok(())
        } else {
            Err(IrError::UnknownMeasurement {
                reference,
                tape_len: self.tape.len(),
            })
        }
    }

    // =========================================================================
    // Gates
    // =========================================================================

    /// Apply a gate broadcast over `qubits`. Empty target lists are a no-op.
    pub fn gate(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        let inst = Instruction::gate(gate, qubits);
        if inst.qubits.is_empty() {
            return Ok(self);
        }
        self.push(inst)
    }

    /// Apply a two-qubit gate over (control, target) pairs.
    pub fn pairs(
        &mut self,
        gate: StandardGate,
        pairs: impl IntoIterator<Item = (QubitId, QubitId)>,
    ) -> IrResult<&mut Self> {
        self.gate(gate, pairs.into_iter().flat_map(|(c, t)| [c, t]))
    }

    /// Apply Hadamard gates.
    pub fn h(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.gate(StandardGate::H, qubits)
    }

    /// Apply S gates.
    pub fn s(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.gate(StandardGate::S, qubits)
    }

    /// Apply H_YZ gates.
    pub fn h_yz(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.gate(StandardGate::HYZ, qubits)
    }

    /// Mark qubits as explicitly idle.
    pub fn idle(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.gate(StandardGate::I, qubits)
    }

    /// Apply CNOT gates over (control, target) pairs.
    pub fn cx(
        &mut self,
        pairs: impl IntoIterator<Item = (QubitId, QubitId)>,
    ) -> IrResult<&mut Self> {
        self.pairs(StandardGate::CX, pairs)
    }

    /// Apply controlled-Y gates over (control, target) pairs.
    pub fn cy(
        &mut self,
        pairs: impl IntoIterator<Item = (QubitId, QubitId)>,
    ) -> IrResult<&mut Self> {
        self.pairs(StandardGate::CY, pairs)
    }

    /// Apply controlled-Z gates over (control, target) pairs.
    pub fn cz(
        &mut self,
        pairs: impl IntoIterator<Item = (QubitId, QubitId)>,
    ) -> IrResult<&mut Self> {
        self.pairs(StandardGate::CZ, pairs)
    }

    // =========================================================================
    // Non-unitary operations
    // =========================================================================

    /// Reset qubits to |0⟩. Empty target lists are a no-op.
    pub fn reset(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        let inst = Instruction::reset(qubits);
        if inst.qubits.is_empty() {
            return Ok(self);
        }
        self.push(inst)
    }

    /// Measure qubits in the Z basis, in the given order.
    pub fn measure(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.measure_in(Pauli::Z, qubits)
    }

    /// Measure qubits in the given basis, in the given order.
    pub fn measure_in(
        &mut self,
        basis: Pauli,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        let inst = Instruction::measure(basis, qubits);
        if inst.qubits.is_empty() {
            return Ok(self);
        }
        self.push(inst)
    }

    /// Apply a Pauli gate to `target` conditioned on a measurement outcome.
    pub fn feedback(
        &mut self,
        gate: StandardGate,
        record: MeasurementRef,
        target: QubitId,
    ) -> IrResult<&mut Self> {
        self.push(Instruction {
            kind: InstructionKind::Feedback { gate, record },
            qubits: vec![target],
        })
    }

    /// Apply a noise channel.
    pub fn noise(
        &mut self,
        model: NoiseModel,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        let inst = Instruction::noise(model, qubits);
        if inst.qubits.is_empty() {
            return Ok(self);
        }
        self.push(inst)
    }

    /// End the current moment.
    pub fn tick(&mut self) -> IrResult<&mut Self> {
        self.push(Instruction::tick())
    }

    // =========================================================================
    // Annotations
    // =========================================================================

    /// Attach a coordinate to a qubit.
    pub fn qubit_coords(&mut self, qubit: QubitId, coord: Coord) -> IrResult<&mut Self> {
        self.push(Instruction {
            kind: InstructionKind::QubitCoords(coord),
            qubits: vec![qubit],
        })
    }

    /// Declare a detector over recorded measurements.
    pub fn detector(
        &mut self,
        coords: Vec<f64>,
        records: impl IntoIterator<Item = MeasurementRef>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction {
            kind: InstructionKind::Detector(Detector::new(coords, records)),
            qubits: vec![],
        })
    }

    /// Shift the coordinates of all later detectors.
    pub fn shift_coords(&mut self, shift: Coord) -> IrResult<&mut Self> {
        self.push(Instruction {
            kind: InstructionKind::ShiftCoords(shift),
            qubits: vec![],
        })
    }

    /// Declare terms of a logical observable.
    pub fn observable_include(
        &mut self,
        index: u32,
        targets: impl IntoIterator<Item = ObservableTarget>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction {
            kind: InstructionKind::ObservableInclude {
                index,
                targets: targets.into_iter().collect(),
            },
            qubits: vec![],
        })
    }

    // =========================================================================
    // Composition
    // =========================================================================

    /// Append a fragment built with [`Circuit::continuing`].
    ///
    /// Fails if the fragment's tape does not start exactly where this
    /// program's tape ends, which is what happens when fragments are
    /// appended in a different order than they were built.
    pub fn append(&mut self, fragment: Circuit) -> IrResult<()> {
        if fragment.tape.origin() != self.tape.len() {
            return Err(IrError::FragmentOutOfOrder {
                fragment: fragment.name,
                origin: fragment.tape.origin(),
                expected: self.tape.len(),
            });
        }
        self.tape.extend_from(&fragment.tape);
        self.instructions.extend(fragment.instructions);
        Ok(())
    }

    /// Replace the instruction stream with a rewritten one.
    ///
    /// Rewrites may add gates, noise and moments but must keep the exact
    /// sequence of measured qubits, otherwise every detector would be
    /// silently re-targeted.
    pub fn replace_instructions(&mut self, instructions: Vec<Instruction>) -> IrResult<()> {
        let before: Vec<QubitId> = measured_qubits(&self.instructions).collect();
        let after: Vec<QubitId> = measured_qubits(&instructions).collect();
        if before != after {
            return Err(IrError::MeasurementCountChanged {
                before: before.len(),
                after: after.len(),
            });
        }
        self.instructions = instructions;
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the program name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The instruction stream.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// The measurement tape.
    pub fn tape(&self) -> &MeasurementTape {
        &self.tape
    }

    /// Number of measurements performed by this program's own instructions.
    pub fn num_measurements(&self) -> usize {
        self.tape.own_len()
    }

    /// Number of detectors declared.
    pub fn num_detectors(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_detector()).count()
    }

    /// Number of moment boundaries.
    pub fn num_ticks(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_tick()).count()
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Check if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// All qubits named by any instruction, in id order.
    pub fn qubits(&self) -> Vec<QubitId> {
        let set: BTreeSet<QubitId> = self
            .instructions
            .iter()
            .flat_map(|i| i.qubits.iter().copied())
            .collect();
        set.into_iter().collect()
    }

    /// The detectors declared, in order.
    pub fn detectors(&self) -> impl Iterator<Item = &Detector> {
        self.instructions.iter().filter_map(|i| match &i.kind {
            InstructionKind::Detector(d) => Some(d),
            _ => None,
        })
    }

    /// Serialize the instruction stream to JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&CircuitView {
            name: &self.name,
            num_measurements: self.tape.len(),
            instructions: &self.instructions,
        })
    }
}

fn measured_qubits(instructions: &[Instruction]) -> impl Iterator<Item = QubitId> + '_ {
    instructions
        .iter()
        .filter(|i| i.is_measure())
        .flat_map(|i| i.qubits.iter().copied())
}

fn check_arity(name: &str, arity: u32, qubits: &[QubitId]) -> IrResult<()> {
    let got = qubits.len() as u32;
    if got == 0 || got % arity != 0 {
        return Err(IrError::QubitCountMismatch {
            gate_name: name.to_string(),
            expected: arity,
            got,
        });
    }
    Ok(())
}

fn check_distinct(gate_name: Option<&str>, qubits: &[QubitId]) -> IrResult<()> {
    let mut seen = BTreeSet::new();
    for &q in qubits {
        if !seen.insert(q) {
            return Err(IrError::DuplicateQubit {
                qubit: q,
                gate_name: gate_name.map(str::to_string),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(i: u32) -> QubitId {
        QubitId(i)
    }

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::new("test");
        assert_eq!(circuit.name(), "test");
        assert!(circuit.is_empty());
        assert_eq!(circuit.num_measurements(), 0);
    }

    #[test]
    fn test_fluent_api() {
        let mut circuit = Circuit::new("bell");
        circuit
            .reset([q(0), q(1)])
            .unwrap()
            .h([q(0)])
            .unwrap()
            .tick()
            .unwrap()
            .cx([(q(0), q(1))])
            .unwrap()
            .tick()
            .unwrap()
            .measure([q(0), q(1)])
            .unwrap();

        assert_eq!(circuit.len(), 6);
        assert_eq!(circuit.num_ticks(), 2);
        assert_eq!(circuit.num_measurements(), 2);
        assert_eq!(circuit.qubits(), vec![q(0), q(1)]);
    }

    #[test]
    fn test_empty_gate_is_noop() {
        let mut circuit = Circuit::new("test");
        let none: Vec<QubitId> = vec![];
        circuit
            .h(none.clone())
            .unwrap()
            .cx(Vec::<(QubitId, QubitId)>::new())
            .unwrap()
            .reset(none)
            .unwrap();
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_two_qubit_gate_needs_pairs() {
        let mut circuit = Circuit::new("test");
        let err = circuit.gate(StandardGate::CX, [q(0), q(1), q(2)]);
        assert!(matches!(err, Err(IrError::QubitCountMismatch { .. })));
    }

    #[test]
    fn test_duplicate_target_rejected() {
        let mut circuit = Circuit::new("test");
        let err = circuit.cx([(q(0), q(1)), (q(1), q(2))]);
        assert!(matches!(err, Err(IrError::DuplicateQubit { qubit, .. }) if qubit == q(1)));
    }

    #[test]
    fn test_detector_requires_recorded_measurement() {
        let mut circuit = Circuit::new("test");
        let err = circuit.detector(vec![0.0, 0.0, 0.0], [MeasurementRef(0)]);
        assert!(matches!(err, Err(IrError::UnknownMeasurement { .. })));

        circuit.measure([q(3)]).unwrap();
        let latest = circuit.tape().latest(q(3)).unwrap();
        circuit.detector(vec![0.0, 0.0, 0.0], [latest]).unwrap();
        assert_eq!(circuit.num_detectors(), 1);
    }

    #[test]
    fn test_feedback_must_be_pauli() {
        let mut circuit = Circuit::new("test");
        circuit.measure([q(1)]).unwrap();
        let r = circuit.tape().latest(q(1)).unwrap();
        assert!(circuit.feedback(StandardGate::H, r, q(0)).is_err());
        assert!(circuit.feedback(StandardGate::X, r, q(0)).is_ok());
    }

    #[test]
    fn test_append_in_order() {
        let mut program = Circuit::new("program");
        program.measure([q(0)]).unwrap();

        let mut fragment = Circuit::continuing("round", &program);
        fragment.measure([q(0)]).unwrap();
        let prev = fragment.tape().lookback(q(0), 1).unwrap();
        let curr = fragment.tape().latest(q(0)).unwrap();
        fragment.detector(vec![0.0], [prev, curr]).unwrap();

        program.append(fragment).unwrap();
        assert_eq!(program.num_measurements(), 2);
        assert_eq!(program.num_detectors(), 1);
    }

    #[test]
    fn test_append_out_of_order_rejected() {
        let mut program = Circuit::new("program");
        let mut first = Circuit::continuing("first", &program);
        first.measure([q(0)]).unwrap();
        let mut second = Circuit::continuing("second", &program);
        second.measure([q(1)]).unwrap();

        program.append(first).unwrap();
        let err = program.append(second);
        assert!(matches!(err, Err(IrError::FragmentOutOfOrder { .. })));
    }

    #[test]
    fn test_replace_instructions_keeps_measurements() {
        let mut circuit = Circuit::new("test");
        circuit.measure([q(0), q(1)]).unwrap();

        let mut rewritten = vec![Instruction::noise(NoiseModel::BitFlip { p: 0.1 }, [q(0), q(1)])];
        rewritten.extend(circuit.instructions().iter().cloned());
        circuit.replace_instructions(rewritten).unwrap();
        assert_eq!(circuit.len(), 2);

        let reordered = vec![Instruction::measure(Pauli::Z, [q(1), q(0)])];
        assert!(circuit.replace_instructions(reordered).is_err());
    }

    #[test]
    fn test_to_json() {
        let mut circuit = Circuit::new("json");
        circuit.h([q(0)]).unwrap();
        let json = circuit.to_json().unwrap();
        assert!(json.contains("\"name\": \"json\""));
    }
}
