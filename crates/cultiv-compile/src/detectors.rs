//! Detector declarations for full-patch stabilizer rounds.
//!
//! Each policy walks the patch ancillas in measurement order and declares
//! detectors on the round just measured, then advances the detector time
//! coordinate by one.

use cultiv_ir::{Circuit, Coord, MeasurementRef, QubitId};
use serde::{Deserialize, Serialize};

use crate::error::{CompileError, CompileResult};
use crate::layout::{PatchLayout, QubitRole};

/// Which detectors a round declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorPolicy {
    /// Compare each ancilla valid at `restricted` (the full patch when
    /// `None`) against its measurement one round earlier.
    Steady {
        /// Sub-patch whose ancillas get detectors.
        restricted: Option<u32>,
    },
    /// One single-measurement detector per ancilla valid at `restricted`.
    CurrentOnly {
        /// Sub-patch whose ancillas get detectors.
        restricted: u32,
    },
    /// First round after the sub-patch of distance `restricted` is merged
    /// into the full patch.
    ///
    /// Ancillas whose stabilizer is already fixed get a single-measurement
    /// detector: X-type ancillas in the |+⟩ triangle below the sub-patch,
    /// Z-type ancillas in the |0⟩ region right of it, and every ancilla of
    /// the sub-patch itself. All others are left without a detector for
    /// this round.
    Transition {
        /// Distance of the merged sub-patch.
        restricted: u32,
    },
}

impl DetectorPolicy {
    /// Steady-state detectors over the whole patch.
    pub const fn steady() -> Self {
        Self::Steady { restricted: None }
    }
}

/// Declares detectors for rounds of one patch.
#[derive(Debug, Clone, Copy)]
pub struct DetectorNetwork<'a> {
    layout: &'a PatchLayout,
}

impl<'a> DetectorNetwork<'a> {
    /// Create a network over `layout`.
    pub fn new(layout: &'a PatchLayout) -> Self {
        Self { layout }
    }

    /// Declare the detectors of the round just measured, followed by a
    /// coordinate shift. Returns the number of detectors declared.
    ///
    /// `postselect` sets the fourth detector coordinate to 1 so analysis
    /// can discard shots on these detectors.
    pub fn declare(
        &self,
        circuit: &mut Circuit,
        policy: DetectorPolicy,
        postselect: bool,
    ) -> CompileResult<usize> {
        if let DetectorPolicy::CurrentOnly { restricted } | DetectorPolicy::Transition { restricted } =
            policy
        {
            self.layout.check_restricted(restricted)?;
        }
        if let DetectorPolicy::Steady {
            restricted: Some(d),
        } = policy
        {
            self.layout.check_restricted(d)?;
        }

        let mut declared = 0;
        for &ancilla in self.layout.ancillas() {
            let records = match policy {
                DetectorPolicy::Steady { restricted } => {
                    if !self.layout.is_valid_ancilla(ancilla, restricted) {
                        continue;
                    }
                    vec![self.current(circuit, ancilla)?, self.previous(circuit, ancilla)?]
                }
                DetectorPolicy::CurrentOnly { restricted } => {
                    if !self.layout.is_valid_ancilla(ancilla, Some(restricted)) {
                        continue;
                    }
                    vec![self.current(circuit, ancilla)?]
                }
                DetectorPolicy::Transition { restricted } => {
                    if !self.fixed_after_merge(ancilla, restricted)? {
                        continue;
                    }
                    vec![self.current(circuit, ancilla)?]
                }
            };
            circuit.detector(self.detector_coords(ancilla, postselect)?, records)?;
            declared += 1;
        }

        circuit.shift_coords(Coord::round_shift())?;
        Ok(declared)
    }

    fn fixed_after_merge(&self, ancilla: QubitId, d: u32) -> CompileResult<bool> {
        Ok(match self.layout.role(ancilla)? {
            QubitRole::AncillaX(p) if p.y > d && p.y > p.x => true,
            QubitRole::AncillaZ(p) if p.x > d && p.x > p.y => true,
            _ => self.layout.is_valid_ancilla(ancilla, Some(d)),
        })
    }

    /// The measurement of `ancilla` in the latest block of ancilla
    /// measurements.
    fn current(&self, circuit: &Circuit, ancilla: QubitId) -> CompileResult<MeasurementRef> {
        let block = self.layout.ancillas().len();
        let tape = circuit.tape();
        tape.latest(ancilla)
            .filter(|r| r.0 + block >= tape.len())
            .ok_or_else(|| CompileError::MissingMeasurement {
                qubit: ancilla,
                context: "the current round".into(),
            })
    }

    /// The measurement of `ancilla` one block before the current one.
    fn previous(&self, circuit: &Circuit, ancilla: QubitId) -> CompileResult<MeasurementRef> {
        let block = self.layout.ancillas().len();
        let tape = circuit.tape();
        tape.lookback(ancilla, 1)
            .filter(|r| r.0 + 2 * block >= tape.len())
            .ok_or_else(|| CompileError::MissingMeasurement {
                qubit: ancilla,
                context: "the previous round".into(),
            })
    }

    fn detector_coords(&self, ancilla: QubitId, postselect: bool) -> CompileResult<Vec<f64>> {
        let [x, y, t] = self.layout.coordinate(ancilla)?.to_array();
        Ok(vec![x, y, t, f64::from(u8::from(postselect))])
    }
}

/// The latest measurement of `qubit`, or a `MissingMeasurement` error
/// naming `context`.
pub(crate) fn latest(circuit: &Circuit, qubit: QubitId, context: &str) -> CompileResult<MeasurementRef> {
    circuit
        .tape()
        .latest(qubit)
        .ok_or_else(|| CompileError::MissingMeasurement {
            qubit,
            context: context.to_string(),
        })
}

/// Declare a detector on the latest measurement of a single qubit, tagged
/// with the qubit's own coordinate. With `compare_previous` the detector
/// also includes the measurement before it.
///
/// Every detector of the cultivation stage is postselected on.
pub(crate) fn qubit_detector(
    layout: &PatchLayout,
    circuit: &mut Circuit,
    qubit: QubitId,
    compare_previous: bool,
) -> CompileResult<()> {
    let mut records = vec![latest(circuit, qubit, "a cultivation detector")?];
    if compare_previous {
        let previous = circuit.tape().lookback(qubit, 1).ok_or_else(|| {
            CompileError::MissingMeasurement {
                qubit,
                context: "a comparison detector".into(),
            }
        })?;
        records.push(previous);
    }
    let [x, y, t] = layout.coordinate(qubit)?.to_array();
    circuit.detector(vec![x, y, t, 1.0], records)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::GridPos;
    use crate::round::{StabilizerRound, stabilizer_round};

    fn measured_rounds(layout: &PatchLayout, rounds: usize) -> Circuit {
        let mut circuit = Circuit::new("rounds");
        for _ in 0..rounds {
            stabilizer_round(layout, &mut circuit).unwrap();
        }
        circuit
    }

    #[test]
    fn test_steady_count() {
        for d in [3, 5, 7] {
            let layout = PatchLayout::square(d).unwrap();
            let mut circuit = measured_rounds(&layout, 2);
            let n = DetectorNetwork::new(&layout)
                .declare(&mut circuit, DetectorPolicy::steady(), false)
                .unwrap();
            assert_eq!(n as u32, d * d - 1);
        }
    }

    #[test]
    fn test_steady_needs_previous_round() {
        let layout = PatchLayout::square(3).unwrap();
        let mut circuit = measured_rounds(&layout, 1);
        let err = DetectorNetwork::new(&layout).declare(&mut circuit, DetectorPolicy::steady(), false);
        assert!(matches!(err, Err(CompileError::MissingMeasurement { .. })));
    }

    #[test]
    fn test_current_only_counts_restricted_ancillas() {
        let layout = PatchLayout::square(7).unwrap();
        let mut circuit = Circuit::new("grown");
        StabilizerRound::new(&layout)
            .restricted_to(5)
            .append_to(&mut circuit)
            .unwrap();
        let n = DetectorNetwork::new(&layout)
            .declare(
                &mut circuit,
                DetectorPolicy::CurrentOnly { restricted: 5 },
                true,
            )
            .unwrap();
        assert_eq!(n, 24);
        let det = circuit.detectors().next().unwrap();
        assert_eq!(det.coords.len(), 4);
        assert_eq!(det.coords[3], 1.0);
        assert_eq!(det.records.len(), 1);
    }

    #[test]
    fn test_stale_measurement_rejected() {
        // An ancilla measured long ago must not be paired with the current round.
        let layout = PatchLayout::square(3).unwrap();
        let mut circuit = Circuit::new("stale");
        let a = layout.ancilla_id(GridPos::new(1, 1));
        circuit.measure([a]).unwrap();
        for _ in 0..20 {
            circuit.measure([QubitId(0)]).unwrap();
        }
        let err = DetectorNetwork::new(&layout).declare(
            &mut circuit,
            DetectorPolicy::CurrentOnly { restricted: 3 },
            false,
        );
        assert!(matches!(err, Err(CompileError::MissingMeasurement { .. })));
    }

    #[test]
    fn test_transition_regions() {
        let layout = PatchLayout::square(7).unwrap();
        let network = DetectorNetwork::new(&layout);

        // Inside the sub-patch.
        let inside = layout.ancilla_id(GridPos::new(2, 2));
        assert!(network.fixed_after_merge(inside, 5).unwrap());
        // X-type below the sub-patch, under the diagonal.
        let below = layout.ancilla_id(GridPos::new(2, 6));
        assert!(layout.is_x_type(below).unwrap());
        assert!(network.fixed_after_merge(below, 5).unwrap());
        // Z-type right of the sub-patch, above the diagonal.
        let right = layout.ancilla_id(GridPos::new(6, 3));
        assert!(!layout.is_x_type(right).unwrap());
        assert!(network.fixed_after_merge(right, 5).unwrap());
        // Z-type below the sub-patch is not yet fixed.
        let unfixed = layout.ancilla_id(GridPos::new(3, 6));
        assert!(!network.fixed_after_merge(unfixed, 5).unwrap());
    }

    #[test]
    fn test_transition_count_is_partial() {
        let layout = PatchLayout::square(7).unwrap();
        let mut circuit = measured_rounds(&layout, 1);
        let n = DetectorNetwork::new(&layout)
            .declare(&mut circuit, DetectorPolicy::Transition { restricted: 5 }, false)
            .unwrap();
        assert!(n >= 24);
        assert!(n < 48);
    }

    #[test]
    fn test_shift_appended() {
        let layout = PatchLayout::square(3).unwrap();
        let mut circuit = measured_rounds(&layout, 1);
        DetectorNetwork::new(&layout)
            .declare(&mut circuit, DetectorPolicy::CurrentOnly { restricted: 3 }, false)
            .unwrap();
        assert!(matches!(
            circuit.instructions().last().map(|i| &i.kind),
            Some(cultiv_ir::InstructionKind::ShiftCoords(_))
        ));
    }
}
