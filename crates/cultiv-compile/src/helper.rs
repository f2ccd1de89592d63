//! Helper register for the transversal logical check.
//!
//! The register is a GHZ-like state grown from its middle qubit. It
//! controls a layer of CY gates onto the distance-3 main grid, then is
//! disentangled and measured; any error caught by the check flips one of
//! the helper detectors.

use cultiv_ir::{Circuit, Coord, Pauli, QubitId};

use crate::cultivation::CultivationGrid;
use crate::detectors::qubit_detector;
use crate::error::{CompileError, CompileResult};
use crate::layout::PatchLayout;

/// Helper register of length 3 or 5, plus a flag qubit for length 5.
#[derive(Debug, Clone)]
pub struct HelperNetwork<'a> {
    layout: &'a PatchLayout,
    helpers: Vec<QubitId>,
    flag: Option<QubitId>,
    layers: Vec<Vec<(QubitId, QubitId)>>,
}

impl<'a> HelperNetwork<'a> {
    /// Create a register of `len` helpers placed after the patch.
    pub fn new(layout: &'a PatchLayout, len: u32) -> CompileResult<Self> {
        let helpers: Vec<QubitId> = (0..len).map(|i| layout.helper_id(i)).collect();
        let m = (len / 2) as usize;
        let (layers, flag) = match len {
            3 => (
                vec![vec![(helpers[m], helpers[m + 1])], vec![(helpers[m], helpers[m - 1])]],
                None,
            ),
            5 => (
                vec![
                    vec![(helpers[m], helpers[m + 1])],
                    vec![(helpers[m], helpers[m - 1]), (helpers[m + 1], helpers[m + 2])],
                    vec![(helpers[m - 1], helpers[m - 2])],
                ],
                Some(layout.helper_id(len)),
            ),
            _ => {
                return Err(CompileError::UnsupportedConfiguration(format!(
                    "helper register of length {len} (supported: 3, 5)"
                )));
            }
        };
        Ok(Self {
            layout,
            helpers,
            flag,
            layers,
        })
    }

    /// Helper qubits in order.
    pub fn helpers(&self) -> &[QubitId] {
        &self.helpers
    }

    /// The flag qubit, present for length 5.
    pub fn flag(&self) -> Option<QubitId> {
        self.flag
    }

    /// Number of helper qubits.
    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    /// Always false; a register has at least three helpers.
    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }

    fn middle(&self) -> QubitId {
        self.helpers[self.helpers.len() / 2]
    }

    fn idle_except(&self, busy: &[QubitId]) -> Vec<QubitId> {
        self.helpers
            .iter()
            .copied()
            .filter(|q| !busy.contains(q))
            .collect()
    }

    fn layer(&self, circuit: &mut Circuit, pairs: &[(QubitId, QubitId)]) -> CompileResult<()> {
        let busy: Vec<QubitId> = pairs.iter().flat_map(|&(c, t)| [c, t]).collect();
        circuit
            .cx(pairs.iter().copied())?
            .idle(self.idle_except(&busy))?
            .tick()?;
        Ok(())
    }

    /// Append `QUBIT_COORDS` for the helpers and the flag.
    pub fn layout_coords(&self, circuit: &mut Circuit) -> CompileResult<()> {
        for &q in self.helpers.iter().chain(&self.flag) {
            circuit.qubit_coords(q, self.layout.coordinate(q)?)?;
        }
        Ok(())
    }

    /// Entangle the register. For length 5 the flag checks the parity of
    /// the two end qubits and is measured at once with its own detector.
    pub fn prepare(&self, circuit: &mut Circuit) -> CompileResult<()> {
        circuit
            .reset(self.helpers.iter().chain(&self.flag).copied())?
            .tick()?;
        circuit.h([self.middle()])?.tick()?;
        for layer in &self.layers {
            self.layer(circuit, layer)?;
        }

        if let Some(flag) = self.flag {
            let (first, last) = (self.helpers[0], self.helpers[self.helpers.len() - 1]);
            circuit
                .cx([(last, flag)])?
                .idle(self.idle_except(&[last]))?
                .tick()?;
            circuit
                .cx([(first, flag)])?
                .idle(self.idle_except(&[first]))?
                .measure([flag])?
                .tick()?;
            qubit_detector(self.layout, circuit, flag, false)?;
        }
        Ok(())
    }

    /// Transversal check of the logical `basis` operator: three moments of
    /// controlled-Paulis from helpers onto the main grid.
    pub fn transversal_check(
        &self,
        circuit: &mut Circuit,
        grid: &CultivationGrid<'_>,
        basis: Pauli,
    ) -> CompileResult<()> {
        if basis != Pauli::Y {
            return Err(CompileError::UnsupportedConfiguration(format!(
                "transversal check in the {} basis",
                basis.letter()
            )));
        }
        let steps: [[(usize, usize); 3]; 3] = match self.helpers.len() {
            5 => [
                [(0, 0), (2, 4), (4, 8)],
                [(1, 3), (3, 6), (4, 7)],
                [(1, 1), (3, 2), (4, 5)],
            ],
            _ => [
                [(0, 0), (1, 5), (2, 8)],
                [(0, 3), (1, 6), (2, 7)],
                [(0, 1), (1, 2), (2, 4)],
            ],
        };
        let main = grid.main();
        for step in steps {
            circuit
                .cy(step.iter().map(|&(g, m)| (self.helpers[g], main[m])))?
                .tick()?;
        }
        Ok(())
    }

    /// Undo the preparation and measure every helper, one detector each.
    pub fn measure(&self, circuit: &mut Circuit) -> CompileResult<()> {
        for layer in self.layers.iter().rev() {
            self.layer(circuit, layer)?;
        }
        circuit.h([self.middle()])?.tick()?;
        circuit.measure(self.helpers.iter().copied())?;
        for &q in self.helpers.iter().rev() {
            qubit_detector(self.layout, circuit, q, false)?;
        }
        circuit.shift_coords(Coord::round_shift())?.tick()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cultivation::Embedding;

    fn cycle(len: u32) -> Circuit {
        let layout = PatchLayout::square(5).unwrap();
        let grid = CultivationGrid::new(&layout, Embedding::Spread).unwrap();
        let helpers = HelperNetwork::new(&layout, len).unwrap();
        let mut circuit = Circuit::new("check");
        helpers.prepare(&mut circuit).unwrap();
        helpers
            .transversal_check(&mut circuit, &grid, Pauli::Y)
            .unwrap();
        helpers.measure(&mut circuit).unwrap();
        circuit
    }

    #[test]
    fn test_length_three_detectors() {
        let circuit = cycle(3);
        assert_eq!(circuit.num_detectors(), 3);
        assert_eq!(circuit.num_measurements(), 3);
    }

    #[test]
    fn test_length_five_has_flag_detector() {
        let circuit = cycle(5);
        assert_eq!(circuit.num_detectors(), 6);
        assert_eq!(circuit.num_measurements(), 6);
    }

    #[test]
    fn test_unsupported_lengths() {
        let layout = PatchLayout::square(5).unwrap();
        for len in [1, 2, 4, 7] {
            assert!(matches!(
                HelperNetwork::new(&layout, len),
                Err(CompileError::UnsupportedConfiguration(_))
            ));
        }
    }

    #[test]
    fn test_check_rejects_other_bases() {
        let layout = PatchLayout::square(5).unwrap();
        let grid = CultivationGrid::new(&layout, Embedding::Spread).unwrap();
        let helpers = HelperNetwork::new(&layout, 3).unwrap();
        let mut circuit = Circuit::new("check");
        assert!(
            helpers
                .transversal_check(&mut circuit, &grid, Pauli::X)
                .is_err()
        );
    }

    #[test]
    fn test_idles_cover_register() {
        let circuit = cycle(5);
        let layout = PatchLayout::square(5).unwrap();
        let helpers = HelperNetwork::new(&layout, 5).unwrap();
        for moment in circuit.instructions().split(|i| i.is_tick()) {
            if !moment.iter().any(|i| i.as_gate() == Some(cultiv_ir::StandardGate::CX)) {
                continue;
            }
            let mut touched: Vec<QubitId> = moment
                .iter()
                .filter(|i| i.is_gate())
                .flat_map(|i| i.qubits.iter().copied())
                .filter(|q| helpers.helpers().contains(q))
                .collect();
            touched.sort();
            assert_eq!(touched, helpers.helpers());
        }
    }

    #[test]
    fn test_coordinates_below_patch() {
        let layout = PatchLayout::square(5).unwrap();
        let helpers = HelperNetwork::new(&layout, 5).unwrap();
        let mut circuit = Circuit::new("coords");
        helpers.layout_coords(&mut circuit).unwrap();
        assert_eq!(circuit.len(), 6);
        assert_eq!(
            layout.coordinate(helpers.flag().unwrap()).unwrap(),
            Coord::new(5.0, 7.0, 0.0)
        );
    }
}
