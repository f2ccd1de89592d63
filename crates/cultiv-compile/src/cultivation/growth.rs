//! Growth from the unrotated distance-3 code to the rotated distance-5
//! code, and the merge into the full patch.

use cultiv_ir::{Circuit, Coord, QubitId};

use super::{CultivationGrid, Direction};
use crate::detectors::qubit_detector;
use crate::error::CompileResult;
use crate::layout::PatchLayout;

/// Data qubits of the 5×5 region that the unrotated distance-3 code does
/// not occupy, row by row. Returns (plus-state qubits, all new qubits).
fn new_qubits(grid: &CultivationGrid<'_>) -> CompileResult<(Vec<QubitId>, Vec<QubitId>)> {
    let layout = grid.layout();
    let mut plus = vec![];
    let mut all = vec![];
    for r in 0..3 {
        let even_row = [layout.data_at(1, 2 * r)?, layout.data_at(3, 2 * r)?];
        plus.extend(even_row);
        all.extend(even_row);
        if r != 2 {
            for x in [0, 2, 4] {
                all.push(layout.data_at(x, 2 * r + 1)?);
            }
        }
    }
    Ok((plus, all))
}

fn neighbors(
    grid: &CultivationGrid<'_>,
    qubits: &[QubitId],
    direction: Direction,
) -> CompileResult<Vec<(QubitId, QubitId)>> {
    qubits
        .iter()
        .map(|&q| -> CompileResult<(QubitId, QubitId)> {
            Ok((q, grid.orthogonal(q, direction)?))
        })
        .collect()
}

fn swapped(pairs: Vec<(QubitId, QubitId)>) -> impl Iterator<Item = (QubitId, QubitId)> {
    pairs.into_iter().map(|(a, b)| (b, a))
}

/// Unitary encoder from the unrotated distance-3 code to the rotated
/// distance-5 code.
///
/// Resets the twelve data qubits between the main and auxiliary grids,
/// prepares those on even rows in |+⟩ and spreads the code out with two
/// CNOT layers.
pub fn grow_d3_d5(grid: &CultivationGrid<'_>, circuit: &mut Circuit) -> CompileResult<()> {
    let (plus, all) = new_qubits(grid)?;
    let main = grid.main();

    circuit.reset(all)?.tick()?;
    circuit.h(plus)?.tick()?;

    circuit
        .cx(neighbors(grid, &main[..6], Direction::Below)?)?
        .cx(swapped(neighbors(grid, grid.aux(), Direction::Below)?))?
        .idle([main[6]])?
        .tick()?;
    circuit
        .cx(swapped(neighbors(
            grid,
            &grid.mains(&[1, 2, 4, 5, 7, 8]),
            Direction::Left,
        )?))?
        .cx(neighbors(grid, grid.aux(), Direction::Right)?)?
        .tick()?;
    Ok(())
}

/// One stabilizer round of the unrotated distance-3 code, measured
/// through the qubits the growth would add.
///
/// Declares twelve single-measurement detectors, last measured first.
pub fn unrotated_stab_meas(grid: &CultivationGrid<'_>, circuit: &mut Circuit) -> CompileResult<()> {
    grow_d3_d5(grid, circuit)?;
    let (plus, all) = new_qubits(grid)?;

    circuit
        .cx(swapped(neighbors(
            grid,
            &grid.mains(&[0, 3, 6, 1, 4, 7]),
            Direction::Right,
        )?))?
        .cx(neighbors(grid, grid.aux(), Direction::Left)?)?
        .tick()?;
    circuit
        .cx(neighbors(grid, &grid.main()[3..], Direction::Above)?)?
        .cx(swapped(neighbors(grid, grid.aux(), Direction::Above)?))?
        .tick()?;

    circuit.h(plus)?.tick()?;
    circuit.measure(all.iter().copied())?.tick()?;
    for &q in all.iter().rev() {
        qubit_detector(grid.layout(), circuit, q, false)?;
    }
    circuit.shift_coords(Coord::round_shift())?;
    Ok(())
}

/// Merge the sub-patch of distance `d` into the full patch: reset every
/// data qubit outside it and rotate the lower-left triangle to |+⟩.
pub fn large_patch_reset(layout: &PatchLayout, circuit: &mut Circuit, d: u32) -> CompileResult<()> {
    let (outside, plus) = layout.large_patch_reset_sets(d)?;
    circuit.reset(outside)?.tick()?;
    circuit.h(plus)?.tick()?;
    Ok(())
}
