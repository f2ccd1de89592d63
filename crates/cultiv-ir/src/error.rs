//! Error types for the IR crate.

use crate::qubit::{MeasurementRef, QubitId};
use thiserror::Error;

/// Errors that can occur while building an instruction stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Gate requires a different number of qubits.
    #[error("Gate '{gate_name}' requires a multiple of {expected} targets, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Target count the gate works in multiples of.
        expected: u32,
        /// Actual number of targets provided.
        got: u32,
    },

    /// The same qubit appears twice within a single instruction.
    #[error("Duplicate qubit {qubit} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// A detector, observable or feedback refers to a measurement that has
    /// not been recorded yet.
    #[error("Measurement {reference} is not on the tape (tape length {tape_len})")]
    UnknownMeasurement {
        /// The offending reference.
        reference: MeasurementRef,
        /// Number of measurements recorded so far.
        tape_len: usize,
    },

    /// A fragment was appended out of order: its tape does not start where
    /// the program's tape currently ends.
    #[error("Fragment '{fragment}' starts at measurement {origin}, but the program has {expected}")]
    FragmentOutOfOrder {
        /// Name of the fragment.
        fragment: String,
        /// Tape origin of the fragment.
        origin: usize,
        /// Current measurement count of the program.
        expected: usize,
    },

    /// A rewrite changed the number of measurements in a fragment.
    #[error("Rewrite changed measurement count from {before} to {after}")]
    MeasurementCountChanged {
        /// Measurements before the rewrite.
        before: usize,
        /// Measurements after the rewrite.
        after: usize,
    },

    /// Feedback must be a Pauli gate.
    #[error("Gate '{0}' cannot be classically controlled")]
    InvalidFeedback(String),
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
