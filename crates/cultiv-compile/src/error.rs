//! Error types for protocol generation and compilation passes.

use cultiv_ir::{IrError, QubitId};
use thiserror::Error;

/// Errors that can occur while generating or transforming a program.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// A configuration the generator does not implement (basis, helper
    /// length, preparation/embedding combination).
    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// A code distance outside the supported range.
    #[error("Invalid distance {distance}: {reason}")]
    InvalidDistance {
        /// The requested distance.
        distance: u32,
        /// Why it was rejected.
        reason: String,
    },

    /// A restricted distance that does not fit inside the patch.
    #[error("Restricted distance {restricted} is invalid for a {dx}x{dy} patch")]
    InvalidRestrictedDistance {
        /// The requested sub-patch distance.
        restricted: u32,
        /// Patch width.
        dx: u32,
        /// Patch height.
        dy: u32,
    },

    /// A qubit was used in a role it does not have in the layout.
    #[error("Qubit {qubit} is not a {expected}")]
    InvalidQubitRole {
        /// The offending qubit.
        qubit: QubitId,
        /// The role the caller expected.
        expected: &'static str,
    },

    /// A detector needed a measurement that has not been made.
    #[error("No measurement of {qubit} available for {context}")]
    MissingMeasurement {
        /// The qubit whose measurement is missing.
        qubit: QubitId,
        /// What was being built.
        context: String,
    },

    /// A qubit is used by two operations within one moment.
    #[error("Qubit {qubit} is used twice in moment {moment}")]
    ScheduleConflict {
        /// The doubly-scheduled qubit.
        qubit: QubitId,
        /// Index of the moment (counted in TICKs).
        moment: usize,
    },

    /// Error raised by the IR layer.
    #[error(transparent)]
    Ir(#[from] IrError),
}

/// Result type for generation and compilation.
pub type CompileResult<T> = Result<T, CompileError>;
