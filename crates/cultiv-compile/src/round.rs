//! Stabilizer measurement rounds on the full patch.

use cultiv_ir::Circuit;

use crate::error::CompileResult;
use crate::layout::PatchLayout;

/// Builder for one reset, entangle and measure cycle over every ancilla.
///
/// The round always resets, rotates and measures all ancillas of the
/// patch so that every round contributes the same block of measurements
/// to the tape. Restricting it to a sub-patch only filters the CNOTs.
#[derive(Debug, Clone, Copy)]
pub struct StabilizerRound<'a> {
    layout: &'a PatchLayout,
    restricted: Option<u32>,
}

impl<'a> StabilizerRound<'a> {
    /// A full-patch round.
    pub fn new(layout: &'a PatchLayout) -> Self {
        Self {
            layout,
            restricted: None,
        }
    }

    /// Only entangle ancillas and data of the top-left `d`×`d` sub-patch.
    #[must_use]
    pub fn restricted_to(mut self, d: u32) -> Self {
        self.restricted = Some(d);
        self
    }

    /// Append the round to `circuit`.
    pub fn append_to(&self, circuit: &mut Circuit) -> CompileResult<()> {
        let layout = self.layout;
        let schedule = layout.build_round_schedule(self.restricted)?;

        circuit.reset(layout.ancillas().iter().copied())?.tick()?;
        circuit.h(layout.x_ancillas().iter().copied())?.tick()?;

        for step in schedule.steps() {
            circuit
                .cx(step.pairs.iter().map(|p| p.as_tuple()))?
                .idle(step.idle.iter().copied())?
                .tick()?;
        }

        circuit.h(layout.x_ancillas().iter().copied())?.tick()?;
        circuit.measure(layout.ancillas().iter().copied())?.tick()?;
        Ok(())
    }
}

/// Append a full-patch stabilizer round.
pub fn stabilizer_round(layout: &PatchLayout, circuit: &mut Circuit) -> CompileResult<()> {
    StabilizerRound::new(layout).append_to(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cultiv_ir::StandardGate;

    #[test]
    fn test_round_structure() {
        let layout = PatchLayout::square(3).unwrap();
        let mut circuit = Circuit::new("round");
        stabilizer_round(&layout, &mut circuit).unwrap();

        assert_eq!(circuit.num_ticks(), 8);
        assert_eq!(circuit.num_measurements(), 8);
        let cx_count: usize = circuit
            .instructions()
            .iter()
            .filter(|i| i.as_gate() == Some(StandardGate::CX))
            .map(|i| i.qubits.len() / 2)
            .sum();
        assert_eq!(cx_count, 24);
    }

    #[test]
    fn test_every_moment_covers_patch_once() {
        let layout = PatchLayout::square(5).unwrap();
        let mut circuit = Circuit::new("round");
        stabilizer_round(&layout, &mut circuit).unwrap();

        // Moments 2..6 are the CNOT steps: gates plus idles cover every patch qubit.
        let moments: Vec<Vec<_>> = circuit
            .instructions()
            .split(|i| i.is_tick())
            .map(|m| m.iter().flat_map(|i| i.qubits.iter().copied()).collect())
            .collect();
        for moment in &moments[2..6] {
            let mut sorted = moment.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), moment.len());
            assert_eq!(moment.len(), layout.all_qubits().len());
        }
    }

    #[test]
    fn test_restricted_round_measures_everything() {
        let layout = PatchLayout::square(7).unwrap();
        let mut circuit = Circuit::new("round");
        StabilizerRound::new(&layout)
            .restricted_to(5)
            .append_to(&mut circuit)
            .unwrap();
        assert_eq!(circuit.num_measurements(), 48);

        let mut bad = Circuit::new("round");
        assert!(
            StabilizerRound::new(&layout)
                .restricted_to(6)
                .append_to(&mut bad)
                .is_err()
        );
    }
}
