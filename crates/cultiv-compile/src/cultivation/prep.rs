//! Distance-3 state preparation strategies.

use serde::{Deserialize, Serialize};
use tracing::warn;

use cultiv_ir::{Circuit, Coord, QubitId, StandardGate};

use super::{CultivationGrid, Diagonal, Direction, Embedding};
use crate::detectors::{latest, qubit_detector};
use crate::error::{CompileError, CompileResult};

/// How the distance-3 logical state is prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepStrategy {
    /// Inject through a hook error, then measure the rotated code once
    /// and convert to the unrotated code.
    #[default]
    #[serde(alias = "hookinj")]
    HookInjection,
    /// Gate-optimal encoder, three verifying checks, conversion.
    #[serde(alias = "optunit")]
    OptimizedUnitary,
    /// Full encoder, one complete rotated round, conversion.
    #[serde(alias = "unitstab")]
    UnitaryStabilizer,
}

/// Options for [`rotated_meas`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotatedMeasOptions {
    /// Compare every check with its previous measurement.
    pub compare_previous: bool,
    /// Reset only the boundary qubits and run only the last two CNOT steps.
    pub only_last_two: bool,
}

const X_AUX: [usize; 2] = [0, 3];
const Z_AUX: [usize; 2] = [1, 2];

/// Diagonal visited by the (X, Z) auxiliaries in each step of injection.
const HOOK_ORDER: [(Diagonal, Diagonal); 4] = [
    (Diagonal::TopLeft, Diagonal::TopLeft),
    (Diagonal::TopRight, Diagonal::TopRight),
    (Diagonal::BottomLeft, Diagonal::BottomLeft),
    (Diagonal::BottomRight, Diagonal::BottomRight),
];

/// Diagonal visited by the (X, Z) auxiliaries in each step of a
/// measurement round. Z checks swap the middle steps to avoid hook errors
/// along the logical.
const MEAS_ORDER: [(Diagonal, Diagonal); 4] = [
    (Diagonal::TopLeft, Diagonal::TopLeft),
    (Diagonal::TopRight, Diagonal::BottomLeft),
    (Diagonal::BottomLeft, Diagonal::TopRight),
    (Diagonal::BottomRight, Diagonal::BottomRight),
];

/// One CNOT between a boundary qubit and a main-grid neighbor.
struct BoundaryLink {
    boundary: usize,
    spread: Direction,
    native: Diagonal,
    controls: bool,
}

const fn link(boundary: usize, spread: Direction, native: Diagonal, controls: bool) -> BoundaryLink {
    BoundaryLink {
        boundary,
        spread,
        native,
        controls,
    }
}

const BOUNDARY_STEPS: [[BoundaryLink; 2]; 4] = [
    [
        link(2, Direction::Above, Diagonal::TopLeft, false),
        link(3, Direction::Left, Diagonal::TopLeft, true),
    ],
    [
        link(3, Direction::Right, Diagonal::TopRight, true),
        link(2, Direction::Below, Diagonal::BottomLeft, false),
    ],
    [
        link(0, Direction::Left, Diagonal::BottomLeft, true),
        link(1, Direction::Above, Diagonal::TopRight, false),
    ],
    [
        link(0, Direction::Right, Diagonal::BottomRight, true),
        link(1, Direction::Below, Diagonal::BottomRight, false),
    ],
];

type Pairs = Vec<(QubitId, QubitId)>;

fn aux_pairs(
    grid: &CultivationGrid<'_>,
    x_aux: &[usize],
    z_aux: &[usize],
    (x_diag, z_diag): (Diagonal, Diagonal),
) -> CompileResult<Pairs> {
    let mut pairs = Vec::with_capacity(x_aux.len() + z_aux.len());
    for a in grid.auxes(x_aux) {
        pairs.push((a, grid.diagonal(a, x_diag)?));
    }
    for a in grid.auxes(z_aux) {
        pairs.push((grid.diagonal(a, z_diag)?, a));
    }
    Ok(pairs)
}

fn boundary_pairs(grid: &CultivationGrid<'_>, step: usize) -> CompileResult<Pairs> {
    BOUNDARY_STEPS[step]
        .iter()
        .map(|l| -> CompileResult<(QubitId, QubitId)> {
            let b = grid.boundary()[l.boundary];
            let neighbor = match grid.embedding() {
                Embedding::Spread => grid.orthogonal(b, l.spread)?,
                Embedding::Native => grid.diagonal(b, l.native)?,
            };
            Ok(if l.controls { (b, neighbor) } else { (neighbor, b) })
        })
        .collect()
}

/// CNOTs of one step on all auxiliaries and boundary qubits.
fn full_step(
    grid: &CultivationGrid<'_>,
    step: usize,
    order: &[(Diagonal, Diagonal); 4],
) -> CompileResult<Pairs> {
    let mut pairs = aux_pairs(grid, &X_AUX, &Z_AUX, order[step])?;
    pairs.extend(boundary_pairs(grid, step)?);
    Ok(pairs)
}

fn require_spread(grid: &CultivationGrid<'_>, what: &str) -> CompileResult<()> {
    if grid.embedding() != Embedding::Spread {
        return Err(CompileError::UnsupportedConfiguration(format!(
            "{what} requires the spread embedding"
        )));
    }
    Ok(())
}

/// Hook injection of the logical Y state on the rotated distance-3 code.
///
/// Measures the auxiliaries and boundary qubits twice: once as part of
/// the injection (four deterministic checks get detectors) and once in a
/// full [`rotated_meas`] round compared against the first. With
/// `gauge_fix` the random gauge outcomes of the injection are corrected
/// by classically controlled Paulis.
pub fn hook_injection(
    grid: &CultivationGrid<'_>,
    circuit: &mut Circuit,
    gauge_fix: bool,
) -> CompileResult<()> {
    if !gauge_fix {
        warn!("hook injection generated without gauge fixing");
    }
    let aux = grid.aux();
    let boundary = grid.boundary();

    circuit
        .reset(grid.main().iter().chain(aux).chain(boundary).copied())?
        .tick()?;
    circuit
        .h(grid
            .mains(&[1, 2, 4, 5, 6, 7, 8])
            .into_iter()
            .chain(grid.boundaries(&[0, 3]))
            .chain(grid.auxes(&X_AUX)))?
        .tick()?;

    for step in 0..4 {
        if step == 2 {
            circuit.s([aux[1]])?.tick()?;
        }
        circuit.cx(full_step(grid, step, &HOOK_ORDER)?)?.tick()?;
    }

    circuit
        .h(grid.boundaries(&[0, 3]).into_iter().chain(grid.auxes(&X_AUX)))?
        .tick()?;
    circuit.measure(aux.iter().chain(boundary).copied())?;
    for q in [boundary[3], boundary[1], boundary[0], aux[3]] {
        qubit_detector(grid.layout(), circuit, q, false)?;
    }
    circuit.tick()?;

    rotated_meas(
        grid,
        circuit,
        RotatedMeasOptions {
            compare_previous: true,
            only_last_two: false,
        },
    )?;

    if gauge_fix {
        let main = grid.main();
        let context = "gauge fixing";
        let b2 = latest(circuit, boundary[2], context)?;
        let a2 = latest(circuit, aux[2], context)?;
        let a1 = latest(circuit, aux[1], context)?;
        let a0 = latest(circuit, aux[0], context)?;
        circuit
            .feedback(StandardGate::X, b2, main[8])?
            .feedback(StandardGate::X, a2, main[6])?
            .feedback(StandardGate::X, a1, main[5])?
            .feedback(StandardGate::X, a1, main[8])?
            .feedback(StandardGate::Z, a0, main[0])?
            .tick()?;
    }
    Ok(())
}

/// One stabilizer round of the rotated distance-3 code on the
/// auxiliaries and boundary qubits.
///
/// Declares eight detectors (boundary then auxiliaries, last measured
/// first), shifts detector coordinates and ends the moment.
pub fn rotated_meas(
    grid: &CultivationGrid<'_>,
    circuit: &mut Circuit,
    options: RotatedMeasOptions,
) -> CompileResult<()> {
    let aux = grid.aux();
    let boundary = grid.boundary();

    if options.only_last_two {
        warn!("postselecting with a partial rotated distance-3 round");
        circuit.reset(boundary.iter().copied())?.tick()?;
        circuit.h(grid.boundaries(&[0, 3]))?.tick()?;
    } else {
        circuit.reset(aux.iter().chain(boundary).copied())?.tick()?;
        circuit
            .h(grid.boundaries(&[0, 3]).into_iter().chain(grid.auxes(&X_AUX)))?
            .tick()?;
        for step in 0..2 {
            circuit.cx(full_step(grid, step, &MEAS_ORDER)?)?.tick()?;
        }
    }
    for step in 2..4 {
        circuit.cx(full_step(grid, step, &MEAS_ORDER)?)?.tick()?;
    }

    circuit
        .h(grid.boundaries(&[0, 3]).into_iter().chain(grid.auxes(&X_AUX)))?
        .tick()?;
    circuit.measure(aux.iter().chain(boundary).copied())?;
    for &q in aux.iter().chain(boundary).rev() {
        qubit_detector(grid.layout(), circuit, q, options.compare_previous)?;
    }
    circuit.shift_coords(Coord::round_shift())?.tick()?;
    Ok(())
}

/// Measure only the three checks the optimized encoder leaves unverified:
/// auxiliary 0 (X-type) and auxiliaries 1 and 2 (Z-type).
pub fn reduced_meas(grid: &CultivationGrid<'_>, circuit: &mut Circuit) -> CompileResult<()> {
    require_spread(grid, "the reduced rotated round")?;
    let x_aux = [0];
    let z_aux = [1, 2];
    let used = grid.auxes(&[0, 1, 2]);

    circuit.reset(used.iter().copied())?.tick()?;
    circuit.h(grid.auxes(&x_aux))?.tick()?;
    for order in MEAS_ORDER {
        circuit.cx(aux_pairs(grid, &x_aux, &z_aux, order)?)?.tick()?;
    }
    circuit.h(grid.auxes(&x_aux))?.tick()?;

    circuit.measure(used.iter().copied())?;
    for &q in used.iter().rev() {
        qubit_detector(grid.layout(), circuit, q, false)?;
    }
    circuit.shift_coords(Coord::round_shift())?.tick()?;
    Ok(())
}

/// Gate-optimal encoder of the rotated distance-3 Y state on the main
/// grid.
pub fn optimized_unitary_prep(grid: &CultivationGrid<'_>, circuit: &mut Circuit) -> CompileResult<()> {
    require_spread(grid, "the optimized encoder")?;
    let m = grid.main();

    circuit
        .reset(m.iter().chain(grid.aux()).copied())?
        .tick()?;
    circuit
        .h_yz([m[0]])?
        .h(grid.mains(&[1, 2, 6, 8]).into_iter().chain(grid.auxes(&X_AUX)))?
        .tick()?;

    let layers: [&[(usize, usize)]; 4] = [
        &[(2, 0), (8, 5)],
        &[(0, 7), (2, 4)],
        &[(0, 3), (5, 4), (6, 7)],
        &[(1, 2), (4, 6)],
    ];
    for layer in layers {
        circuit.cx(layer.iter().map(|&(c, t)| (m[c], m[t])))?.tick()?;
    }
    Ok(())
}

/// Encoder of the distance-3 Y state on the main grid.
///
/// The last CNOT layer shares its moment with the first layers of
/// [`rot_to_unrot`] when `to_unrotated` is set.
pub fn unitary_encoding(
    grid: &CultivationGrid<'_>,
    circuit: &mut Circuit,
    to_unrotated: bool,
) -> CompileResult<()> {
    let m = grid.main();

    circuit
        .reset(m.iter().chain(grid.aux()).copied())?
        .tick()?;
    circuit
        .h_yz([m[4]])?
        .h(grid.mains(&[2, 3, 6, 8]).into_iter().chain(grid.auxes(&X_AUX)))?
        .tick()?;

    let layers: [&[(usize, usize)]; 3] = [
        &[(2, 1), (3, 0), (4, 7), (8, 5)],
        &[(3, 4), (7, 1)],
        &[(3, 1), (6, 7), (8, 4)],
    ];
    for layer in layers {
        circuit.cx(layer.iter().map(|&(c, t)| (m[c], m[t])))?.tick()?;
    }

    circuit.cx([(m[8], m[7])])?;
    if to_unrotated {
        rot_to_unrot(grid, circuit)
    } else {
        circuit.tick()?;
        Ok(())
    }
}

/// Convert the rotated distance-3 code on the main grid into the
/// unrotated code on main plus auxiliary qubits.
pub fn rot_to_unrot(grid: &CultivationGrid<'_>, circuit: &mut Circuit) -> CompileResult<()> {
    let m = grid.main();
    let a = grid.aux();

    circuit.reset(a.iter().copied())?.tick()?;
    circuit.h(grid.auxes(&X_AUX))?.tick()?;
    circuit
        .cx([(a[0], m[0]), (m[1], a[1]), (m[3], a[2]), (a[3], m[4])])?
        .tick()?;
    circuit
        .cx([(a[0], m[1]), (a[3], m[5]), (m[4], a[1]), (m[6], a[2])])?
        .tick()?;
    Ok(())
}

/// Run a full preparation strategy, ending on the unrotated code.
pub fn prepare(
    grid: &CultivationGrid<'_>,
    circuit: &mut Circuit,
    strategy: PrepStrategy,
    gauge_fix: bool,
) -> CompileResult<()> {
    match strategy {
        PrepStrategy::HookInjection => hook_injection(grid, circuit, gauge_fix)?,
        PrepStrategy::OptimizedUnitary => {
            optimized_unitary_prep(grid, circuit)?;
            reduced_meas(grid, circuit)?;
        }
        PrepStrategy::UnitaryStabilizer => {
            unitary_encoding(grid, circuit, false)?;
            rotated_meas(grid, circuit, RotatedMeasOptions::default())?;
        }
    }
    rot_to_unrot(grid, circuit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PatchLayout;
    use cultiv_ir::{InstructionKind, emit};

    fn spread(layout: &PatchLayout) -> CultivationGrid<'_> {
        CultivationGrid::new(layout, Embedding::Spread).unwrap()
    }

    #[test]
    fn test_hook_injection_detectors() {
        let layout = PatchLayout::square(5).unwrap();
        let grid = spread(&layout);
        let mut circuit = Circuit::new("hook");
        hook_injection(&grid, &mut circuit, true).unwrap();

        // Four injection detectors and eight comparison detectors.
        assert_eq!(circuit.num_detectors(), 12);
        assert_eq!(circuit.num_measurements(), 16);
        let comparisons = circuit.detectors().filter(|d| d.records.len() == 2).count();
        assert_eq!(comparisons, 8);

        let feedback = circuit
            .instructions()
            .iter()
            .filter(|i| matches!(i.kind, InstructionKind::Feedback { .. }))
            .count();
        assert_eq!(feedback, 5);
    }

    #[test]
    fn test_hook_injection_without_gauge_fix() {
        let layout = PatchLayout::square(5).unwrap();
        let grid = spread(&layout);
        let mut circuit = Circuit::new("hook");
        hook_injection(&grid, &mut circuit, false).unwrap();
        assert!(
            !circuit
                .instructions()
                .iter()
                .any(|i| matches!(i.kind, InstructionKind::Feedback { .. }))
        );
    }

    #[test]
    fn test_hook_injection_gauge_text() {
        let layout = PatchLayout::square(5).unwrap();
        let grid = spread(&layout);
        let mut circuit = Circuit::new("hook");
        hook_injection(&grid, &mut circuit, true).unwrap();
        let text = emit(&circuit).unwrap();
        // Boundary 2 is the second to last measurement.
        assert!(text.contains("CX rec[-2] 48"));
        assert!(text.contains("CZ rec[-8] 0"));
    }

    #[test]
    fn test_native_hook_injection_uses_ancillas() {
        let layout = PatchLayout::square(3).unwrap();
        let grid = CultivationGrid::new(&layout, Embedding::Native).unwrap();
        let mut circuit = Circuit::new("hook");
        hook_injection(&grid, &mut circuit, true).unwrap();
        for q in circuit
            .instructions()
            .iter()
            .filter(|i| i.is_measure())
            .flat_map(|i| i.qubits.iter())
        {
            assert!(layout.is_valid_ancilla(*q, None));
        }
    }

    #[test]
    fn test_step_pairs_are_disjoint() {
        for (d, embedding) in [(5, Embedding::Spread), (3, Embedding::Native)] {
            let layout = PatchLayout::square(d).unwrap();
            let grid = CultivationGrid::new(&layout, embedding).unwrap();
            for order in [&HOOK_ORDER, &MEAS_ORDER] {
                for step in 0..4 {
                    let pairs = full_step(&grid, step, order).unwrap();
                    let mut qubits: Vec<QubitId> = pairs.iter().flat_map(|&(c, t)| [c, t]).collect();
                    qubits.sort();
                    qubits.dedup();
                    assert_eq!(qubits.len(), 2 * pairs.len());
                }
            }
        }
    }

    #[test]
    fn test_only_last_two_skips_aux_reset() {
        let layout = PatchLayout::square(3).unwrap();
        let grid = CultivationGrid::new(&layout, Embedding::Native).unwrap();
        let mut circuit = Circuit::new("pre");
        circuit.measure(grid.aux().iter().chain(grid.boundary()).copied()).unwrap();
        let mut frag = Circuit::continuing("rot", &circuit);
        rotated_meas(
            &grid,
            &mut frag,
            RotatedMeasOptions {
                compare_previous: false,
                only_last_two: true,
            },
        )
        .unwrap();
        let first = &frag.instructions()[0];
        assert!(first.is_reset());
        assert_eq!(first.qubits, grid.boundary().to_vec());
        assert_eq!(frag.num_detectors(), 8);
    }

    #[test]
    fn test_optimized_requires_spread() {
        let layout = PatchLayout::square(5).unwrap();
        let grid = CultivationGrid::new(&layout, Embedding::Native).unwrap();
        let mut circuit = Circuit::new("opt");
        assert!(matches!(
            prepare(&grid, &mut circuit, PrepStrategy::OptimizedUnitary, true),
            Err(CompileError::UnsupportedConfiguration(_))
        ));
    }

    #[test]
    fn test_strategies_detector_counts() {
        let layout = PatchLayout::square(5).unwrap();
        let grid = spread(&layout);
        let cases = [
            (PrepStrategy::HookInjection, 12),
            (PrepStrategy::OptimizedUnitary, 3),
            (PrepStrategy::UnitaryStabilizer, 8),
        ];
        for (strategy, detectors) in cases {
            let mut circuit = Circuit::new("prep");
            prepare(&grid, &mut circuit, strategy, true).unwrap();
            assert_eq!(circuit.num_detectors(), detectors, "{strategy:?}");
        }
    }

    #[test]
    fn test_unitary_encoding_merges_conversion_moment() {
        let layout = PatchLayout::square(5).unwrap();
        let grid = spread(&layout);
        let mut merged = Circuit::new("merged");
        unitary_encoding(&grid, &mut merged, true).unwrap();
        let mut split = Circuit::new("split");
        unitary_encoding(&grid, &mut split, false).unwrap();
        rot_to_unrot(&grid, &mut split).unwrap();
        assert_eq!(merged.num_ticks() + 1, split.num_ticks());
    }

    #[test]
    fn test_strategy_aliases() {
        let s: PrepStrategy = serde_json::from_str("\"optunit\"").unwrap();
        assert_eq!(s, PrepStrategy::OptimizedUnitary);
        let s: PrepStrategy = serde_json::from_str("\"hook_injection\"").unwrap();
        assert_eq!(s, PrepStrategy::HookInjection);
    }
}
