//! Logical observables of the full patch.

use serde::{Deserialize, Serialize};

use cultiv_ir::{Circuit, MeasurementRef, ObservableTarget, Pauli};

use crate::error::CompileResult;
use crate::layout::{GridPos, PatchLayout};

/// How the logical state is read out at the end of the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservableMode {
    /// Destructive logical-Y measurement: Y on the corner, Z along the top
    /// row, X down the left column.
    #[default]
    LogicalY,
    /// Declare the logical Z and X operators directly on Pauli targets,
    /// leaving the patch unmeasured for a later stage.
    Handoff,
}

/// Measure logical Y and declare it as observable 0.
pub fn logical_y_measurement(layout: &PatchLayout, circuit: &mut Circuit) -> CompileResult<()> {
    let top = (1..layout.dx()).map(|x| layout.data_id(GridPos::new(x, 0)));
    let left = (1..layout.dy()).map(|y| layout.data_id(GridPos::new(0, y)));

    let start = circuit.tape().len();
    circuit
        .measure_in(Pauli::Y, [layout.data_id(GridPos::new(0, 0))])?
        .measure(top)?
        .measure_in(Pauli::X, left)?
        .tick()?;
    let end = circuit.tape().len();

    circuit.observable_include(
        0,
        (start..end).map(|r| ObservableTarget::Record(MeasurementRef(r))),
    )?;
    Ok(())
}

/// Declare logical Z (top row) as observable 0 and logical X (left
/// column) as observable 1.
pub fn handoff_observables(layout: &PatchLayout, circuit: &mut Circuit) -> CompileResult<()> {
    let z = (0..layout.dx())
        .map(|x| ObservableTarget::Pauli(Pauli::Z, layout.data_id(GridPos::new(x, 0))));
    let x = (0..layout.dy())
        .map(|y| ObservableTarget::Pauli(Pauli::X, layout.data_id(GridPos::new(0, y))));
    circuit.observable_include(0, z)?.observable_include(1, x)?;
    Ok(())
}

/// Append the observables for `mode`.
pub fn declare_observables(
    layout: &PatchLayout,
    circuit: &mut Circuit,
    mode: ObservableMode,
) -> CompileResult<()> {
    match mode {
        ObservableMode::LogicalY => logical_y_measurement(layout, circuit),
        ObservableMode::Handoff => handoff_observables(layout, circuit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cultiv_ir::emit;

    #[test]
    fn test_logical_y_records() {
        let layout = PatchLayout::square(5).unwrap();
        let mut circuit = Circuit::new("obs");
        logical_y_measurement(&layout, &mut circuit).unwrap();
        assert_eq!(circuit.num_measurements(), 9);

        let text = emit(&circuit).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "MY 0");
        assert_eq!(lines[1], "M 2 4 6 8");
        assert_eq!(lines[2], "MX 10 20 30 40");
        assert!(lines[4].starts_with("OBSERVABLE_INCLUDE(0) rec[-9]"));
        assert!(lines[4].ends_with("rec[-1]"));
    }

    #[test]
    fn test_handoff_targets() {
        let layout = PatchLayout::square(3).unwrap();
        let mut circuit = Circuit::new("obs");
        declare_observables(&layout, &mut circuit, ObservableMode::Handoff).unwrap();
        let text = emit(&circuit).unwrap();
        assert_eq!(
            text,
            "OBSERVABLE_INCLUDE(0) Z0 Z2 Z4\nOBSERVABLE_INCLUDE(1) X0 X6 X12\n"
        );
        assert_eq!(circuit.num_measurements(), 0);
    }
}
