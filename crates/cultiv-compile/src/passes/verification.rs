//! Verification pass for moment structure.
//!
//! Within one moment every qubit may take part in at most one unitary
//! gate. Resets and measurements are exempt, as are classically
//! controlled Paulis, which the engine applies instantly.

use rustc_hash::FxHashSet;
use tracing::debug;

use cultiv_ir::Circuit;

use super::moments;
use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Result of moment verification.
#[derive(Debug, Clone, Default)]
pub struct VerificationResult {
    /// Whether the verification passed.
    pub passed: bool,
    /// Number of moments checked.
    pub moments_checked: usize,
    /// Number of gate applications found.
    pub gates_found: usize,
}

/// Analysis pass that rejects fragments where a qubit is acted on by two
/// gates in the same moment.
pub struct MomentVerification;

impl Pass for MomentVerification {
    fn name(&self) -> &'static str {
        "moment_verification"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let mut result = VerificationResult::default();

        for (index, moment) in moments(circuit.instructions()).enumerate() {
            let mut used = FxHashSet::default();
            for inst in moment.body.iter().filter(|i| i.is_gate()) {
                for &qubit in &inst.qubits {
                    if !used.insert(qubit) {
                        return Err(CompileError::ScheduleConflict {
                            qubit,
                            moment: index,
                        });
                    }
                    result.gates_found += 1;
                }
            }
            result.moments_checked += 1;
        }
        result.passed = true;

        debug!(
            "Moment verification passed: {} moments checked, {} gate targets found",
            result.moments_checked, result.gates_found
        );

        properties.insert(result);
        Ok(())
    }
}
