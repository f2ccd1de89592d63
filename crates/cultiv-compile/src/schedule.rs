//! Time-sliced CNOT schedules for one stabilizer round.

use cultiv_ir::QubitId;
use serde::Serialize;

/// Number of CNOT time steps in a stabilizer round.
pub const NUM_STEPS: usize = 4;

/// A (control, target) CNOT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GatePair {
    /// Control qubit.
    pub control: QubitId,
    /// Target qubit.
    pub target: QubitId,
}

impl GatePair {
    /// Create a pair.
    pub fn new(control: QubitId, target: QubitId) -> Self {
        Self { control, target }
    }

    /// The pair as a tuple, the form the circuit builder takes.
    pub fn as_tuple(self) -> (QubitId, QubitId) {
        (self.control, self.target)
    }

    /// Whether `qubit` is one of the two operands.
    pub fn touches(&self, qubit: QubitId) -> bool {
        self.control == qubit || self.target == qubit
    }
}

/// One time step: disjoint CNOTs plus the qubits left idle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleStep {
    /// CNOTs applied in this step, no qubit appearing twice.
    pub pairs: Vec<GatePair>,
    /// Patch qubits untouched in this step (ancillas first, then data).
    pub idle: Vec<QubitId>,
}

impl ScheduleStep {
    /// Qubits touched by a CNOT in this step.
    pub fn active(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.pairs.iter().flat_map(|p| [p.control, p.target])
    }
}

/// The four steps of a stabilizer round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleSlice {
    steps: [ScheduleStep; NUM_STEPS],
}

impl ScheduleSlice {
    /// Assemble a slice from its steps.
    pub fn from_steps(steps: [ScheduleStep; NUM_STEPS]) -> Self {
        Self { steps }
    }

    /// The steps in execution order.
    pub fn steps(&self) -> &[ScheduleStep; NUM_STEPS] {
        &self.steps
    }

    /// Total number of CNOTs across all steps.
    pub fn num_pairs(&self) -> usize {
        self.steps.iter().map(|s| s.pairs.len()).sum()
    }

    /// Number of CNOTs that touch `qubit`.
    pub fn occurrences(&self, qubit: QubitId) -> usize {
        self.steps
            .iter()
            .flat_map(|s| &s.pairs)
            .filter(|p| p.touches(qubit))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_helpers() {
        let p = GatePair::new(QubitId(3), QubitId(0));
        assert!(p.touches(QubitId(0)));
        assert!(!p.touches(QubitId(1)));
        assert_eq!(p.as_tuple(), (QubitId(3), QubitId(0)));
    }

    #[test]
    fn test_slice_counts() {
        let step = ScheduleStep {
            pairs: vec![
                GatePair::new(QubitId(1), QubitId(0)),
                GatePair::new(QubitId(2), QubitId(3)),
            ],
            idle: vec![QubitId(4)],
        };
        let slice = ScheduleSlice::from_steps([
            step.clone(),
            ScheduleStep::default(),
            step,
            ScheduleStep::default(),
        ]);
        assert_eq!(slice.num_pairs(), 4);
        assert_eq!(slice.occurrences(QubitId(0)), 2);
        assert_eq!(slice.steps()[0].active().count(), 4);
    }
}
