//! Noise injection pass: uniform circuit-level depolarizing noise.
//!
//! Every operation is followed (or, for measurements, preceded) by a
//! channel of strength `p`:
//!
//! | Operation | Channel |
//! |-----------|---------|
//! | 1q gate, `I` | `DEPOLARIZE1` after |
//! | 2q gate | `DEPOLARIZE2` after |
//! | `R` | `X_ERROR` after |
//! | `M`, `MY` | `X_ERROR` before |
//! | `MX` | `Z_ERROR` before |
//!
//! Qubits of the fragment that sit out an active moment pick up
//! `DEPOLARIZE1`.

use rustc_hash::FxHashSet;

use cultiv_ir::{Circuit, Instruction, InstructionKind, NoiseModel, Pauli, QubitId};

use super::moments;
use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Injects uniform noise channels into a fragment and closes it with a
/// `TICK`.
pub struct NoiseInjectionPass;

impl Default for NoiseInjectionPass {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseInjectionPass {
    /// Create a new noise injection pass.
    pub fn new() -> Self {
        Self
    }
}

/// Whether the instruction acts on its qubits, as opposed to annotating or
/// adding noise.
fn is_operation(inst: &Instruction) -> bool {
    matches!(
        inst.kind,
        InstructionKind::Gate(_)
            | InstructionKind::Measure(_)
            | InstructionKind::Reset
            | InstructionKind::Feedback { .. }
    )
}

fn noisy(inst: &Instruction, p: f64, out: &mut Vec<Instruction>) {
    let qubits = inst.qubits.iter().copied();
    match &inst.kind {
        InstructionKind::Gate(gate) if gate.is_two_qubit() => {
            out.push(inst.clone());
            out.push(Instruction::noise(NoiseModel::Depolarize2 { p }, qubits));
        }
        InstructionKind::Gate(_) => {
            out.push(inst.clone());
            out.push(Instruction::noise(NoiseModel::Depolarize1 { p }, qubits));
        }
        InstructionKind::Reset => {
            out.push(inst.clone());
            out.push(Instruction::noise(NoiseModel::BitFlip { p }, qubits));
        }
        InstructionKind::Measure(Pauli::X) => {
            out.push(Instruction::noise(NoiseModel::PhaseFlip { p }, qubits));
            out.push(inst.clone());
        }
        InstructionKind::Measure(_) => {
            out.push(Instruction::noise(NoiseModel::BitFlip { p }, qubits));
            out.push(inst.clone());
        }
        _ => out.push(inst.clone()),
    }
}

impl Pass for NoiseInjectionPass {
    fn name(&self) -> &'static str {
        "NoiseInjection"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn should_run(&self, _circuit: &Circuit, properties: &PropertySet) -> bool {
        properties.noise_enabled()
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let Some(noise) = properties.noise else {
            return Ok(());
        };
        let p = noise.p;

        let mut fragment_qubits: Vec<QubitId> = circuit
            .instructions()
            .iter()
            .filter(|i| is_operation(i))
            .flat_map(|i| i.qubits.iter().copied())
            .collect();
        fragment_qubits.sort_unstable();
        fragment_qubits.dedup();

        let mut out = Vec::with_capacity(circuit.len() * 2 + 1);
        for moment in moments(circuit.instructions()) {
            let mut busy: FxHashSet<QubitId> = FxHashSet::default();
            for inst in moment.body {
                if is_operation(inst) {
                    busy.extend(inst.qubits.iter().copied());
                }
                if p > 0.0 {
                    noisy(inst, p, &mut out);
                } else {
                    out.push(inst.clone());
                }
            }

            if p > 0.0 && !busy.is_empty() {
                let idle: Vec<QubitId> = fragment_qubits
                    .iter()
                    .copied()
                    .filter(|q| !busy.contains(q))
                    .collect();
                if !idle.is_empty() {
                    out.push(Instruction::noise(NoiseModel::Depolarize1 { p }, idle));
                }
            }
            if let Some(tick) = moment.tick {
                out.push(tick.clone());
            }
        }
        out.push(Instruction::tick());

        circuit.replace_instructions(out)?;
        Ok(())
    }
}
