//! Gate-set lowering for neutral-atom hardware.
//!
//! Neutral atoms entangle through Rydberg CZ only. Each moment holding
//! CX or CY gates becomes three moments: a basis change on the targets,
//! the CZ layer and the inverse basis change. CX targets are conjugated
//! by `H` and CY targets by `H_YZ`.

use cultiv_ir::{Circuit, Instruction, QubitId, StandardGate};

use super::moments;
use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::{HardwareModel, PropertySet};

/// Rewrites CX and CY into CZ layers.
///
/// Non-entangling instructions of a moment are placed before the CZ layer
/// if they precede its first two-qubit gate and after it otherwise.
pub struct NeutralAtomTranslation;

/// The lowered form of one moment.
#[derive(Default)]
struct Lowered {
    pre: Vec<Instruction>,
    post: Vec<Instruction>,
    cz: Vec<(QubitId, QubitId)>,
    h: Vec<QubitId>,
    h_yz: Vec<QubitId>,
}

impl Lowered {
    fn basis_change(&self) -> impl Iterator<Item = Instruction> + '_ {
        [
            Instruction::gate(StandardGate::H, self.h.iter().copied()),
            Instruction::gate(StandardGate::HYZ, self.h_yz.iter().copied()),
        ]
        .into_iter()
        .filter(|i| !i.qubits.is_empty())
    }

    fn write(self, out: &mut Vec<Instruction>) {
        out.extend(self.pre.iter().cloned());
        out.extend(self.basis_change());
        out.push(Instruction::tick());
        out.push(Instruction::pairs(StandardGate::CZ, self.cz.iter().copied()));
        out.push(Instruction::tick());
        out.extend(self.basis_change());
        out.extend(self.post);
    }
}

fn lower(body: &[Instruction]) -> Option<Lowered> {
    let needs_lowering = body.iter().any(|i| {
        matches!(
            i.as_gate(),
            Some(StandardGate::CX | StandardGate::CY)
        )
    });
    if !needs_lowering {
        return None;
    }

    let mut lowered = Lowered::default();
    let mut seen_entangler = false;
    for inst in body {
        let Some(gate) = inst.as_gate().filter(StandardGate::is_two_qubit) else {
            if seen_entangler {
                lowered.post.push(inst.clone());
            } else {
                lowered.pre.push(inst.clone());
            }
            continue;
        };
        seen_entangler = true;
        for pair in inst.qubits.chunks_exact(2) {
            let (control, target) = (pair[0], pair[1]);
            match gate {
                StandardGate::CX => lowered.h.push(target),
                StandardGate::CY => lowered.h_yz.push(target),
                _ => {}
            }
            lowered.cz.push((control, target));
        }
    }
    Some(lowered)
}

impl Pass for NeutralAtomTranslation {
    fn name(&self) -> &'static str {
        "NeutralAtomTranslation"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    /// Lowering happens together with noise: noiseless fragments keep the
    /// uniform gate set.
    fn should_run(&self, _circuit: &Circuit, properties: &PropertySet) -> bool {
        properties.hardware == HardwareModel::NeutralAtom && properties.noise_enabled()
    }

    fn run(&self, circuit: &mut Circuit, _properties: &mut PropertySet) -> CompileResult<()> {
        let mut out = Vec::with_capacity(circuit.len() * 2);
        for moment in moments(circuit.instructions()) {
            match lower(moment.body) {
                Some(lowered) => lowered.write(&mut out),
                None => out.extend(moment.body.iter().cloned()),
            }
            if let Some(tick) = moment.tick {
                out.push(tick.clone());
            }
        }
        circuit.replace_instructions(out)?;
        Ok(())
    }
}
