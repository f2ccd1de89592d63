//! Text emitter for the execution engine's circuit format.
//!
//! Absolute measurement references are converted to relative `rec[-k]`
//! offsets here, using the number of measurements emitted before each
//! instruction.

use std::fmt::Write as _;

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::instruction::{Instruction, InstructionKind, ObservableTarget};
use crate::qubit::{Coord, MeasurementRef, QubitId};

/// Emit a program as circuit text.
pub fn emit(circuit: &Circuit) -> IrResult<String> {
    let mut emitter = Emitter::new(circuit.tape().origin());
    emitter.emit_circuit(circuit)
}

struct Emitter {
    output: String,
    /// Measurements emitted so far, counted from the start of the tape.
    measured: usize,
}

impl Emitter {
    fn new(origin: usize) -> Self {
        Self {
            output: String::new(),
            measured: origin,
        }
    }

    fn emit_circuit(&mut self, circuit: &Circuit) -> IrResult<String> {
        for instruction in circuit.instructions() {
            self.emit_instruction(instruction)?;
        }
        Ok(std::mem::take(&mut self.output))
    }

    fn emit_instruction(&mut self, instruction: &Instruction) -> IrResult<()> {
        let targets = qubit_list(&instruction.qubits);
        match &instruction.kind {
            InstructionKind::Gate(_) | InstructionKind::Measure(_) | InstructionKind::Reset => {
                self.writeln(&format!("{} {targets}", instruction.name()));
            }

            InstructionKind::Tick => self.writeln("TICK"),

            InstructionKind::QubitCoords(coord) => {
                self.writeln(&format!("QUBIT_COORDS{} {targets}", coord_args(*coord)));
            }

            InstructionKind::Detector(det) => {
                let args = det
                    .coords
                    .iter()
                    .map(f64::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                let recs = det
                    .records
                    .iter()
                    .map(|&r| self.rec(r))
                    .collect::<IrResult<Vec<_>>>()?
                    .join(" ");
                self.writeln(&format!("DETECTOR({args}) {recs}").trim_end().to_string());
            }

            InstructionKind::ObservableInclude { index, targets } => {
                let terms = targets
                    .iter()
                    .map(|t| match t {
                        ObservableTarget::Record(r) => self.rec(*r),
                        ObservableTarget::Pauli(p, q) => Ok(format!("{}{}", p.letter(), q.0)),
                    })
                    .collect::<IrResult<Vec<_>>>()?
                    .join(" ");
                self.writeln(&format!("OBSERVABLE_INCLUDE({index}) {terms}"));
            }

            InstructionKind::ShiftCoords(shift) => {
                self.writeln(&format!("SHIFT_COORDS{}", coord_args(*shift)));
            }

            InstructionKind::Feedback { gate, record } => {
                let controlled = gate
                    .controlled()
                    .ok_or_else(|| IrError::InvalidFeedback(gate.name().to_string()))?;
                let rec = self.rec(*record)?;
                self.writeln(&format!("{} {rec} {targets}", controlled.name()));
            }

            InstructionKind::NoiseChannel(model) => {
                self.writeln(&format!(
                    "{}({}) {targets}",
                    model.name(),
                    model.error_param()
                ));
            }
        }
        self.measured += instruction.num_measurements();
        Ok(())
    }

    fn rec(&self, reference: MeasurementRef) -> IrResult<String> {
        if reference.0 >= self.measured {
            return Err(IrError::UnknownMeasurement {
                reference,
                tape_len: self.measured,
            });
        }
        Ok(format!("rec[-{}]", self.measured - reference.0))
    }

    fn writeln(&mut self, line: &str) {
        // Writing to a String cannot fail.
        let _ = writeln!(self.output, "{line}");
    }
}

fn qubit_list(qubits: &[QubitId]) -> String {
    qubits
        .iter()
        .map(|q| q.0.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn coord_args(coord: Coord) -> String {
    format!("({}, {}, {})", coord.x, coord.y, coord.t)
}
