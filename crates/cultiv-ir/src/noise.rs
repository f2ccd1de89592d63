//! Noise channel types.
//!
//! Noise is represented as first-class instructions in the stream so the
//! injection passes can interleave channels with the gates they follow.
//! Only Pauli channels are modelled; they are all the execution engine
//! needs for Clifford simulation.

use serde::{Deserialize, Serialize};

/// A Pauli noise channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum NoiseModel {
    /// Single-qubit depolarizing channel.
    Depolarize1 {
        /// Error probability (0.0 to 1.0).
        p: f64,
    },

    /// Two-qubit depolarizing channel applied to pairs of targets.
    Depolarize2 {
        /// Error probability (0.0 to 1.0).
        p: f64,
    },

    /// Bit-flip channel: applies X with probability `p`.
    BitFlip {
        /// Flip probability (0.0 to 1.0).
        p: f64,
    },

    /// Phase-flip channel: applies Z with probability `p`.
    PhaseFlip {
        /// Flip probability (0.0 to 1.0).
        p: f64,
    },
}

impl NoiseModel {
    /// Name of the channel in the execution engine's text format.
    pub fn name(&self) -> &'static str {
        match self {
            NoiseModel::Depolarize1 { .. } => "DEPOLARIZE1",
            NoiseModel::Depolarize2 { .. } => "DEPOLARIZE2",
            NoiseModel::BitFlip { .. } => "X_ERROR",
            NoiseModel::PhaseFlip { .. } => "Z_ERROR",
        }
    }

    /// The error probability of this channel.
    pub fn error_param(&self) -> f64 {
        match self {
            NoiseModel::Depolarize1 { p }
            | NoiseModel::Depolarize2 { p }
            | NoiseModel::BitFlip { p }
            | NoiseModel::PhaseFlip { p } => *p,
        }
    }

    /// Number of qubits each application of the channel acts on.
    pub fn num_qubits(&self) -> u32 {
        match self {
            NoiseModel::Depolarize2 { .. } => 2,
            _ => 1,
        }
    }
}

impl std::fmt::Display for NoiseModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name(), self.error_param())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_model_names() {
        assert_eq!(NoiseModel::Depolarize1 { p: 0.01 }.name(), "DEPOLARIZE1");
        assert_eq!(NoiseModel::BitFlip { p: 0.01 }.name(), "X_ERROR");
        assert_eq!(NoiseModel::PhaseFlip { p: 0.01 }.name(), "Z_ERROR");
    }

    #[test]
    fn test_noise_model_display() {
        let m = NoiseModel::Depolarize2 { p: 0.001 };
        assert_eq!(m.to_string(), "DEPOLARIZE2(0.001)");
        assert_eq!(m.num_qubits(), 2);
        assert!((m.error_param() - 0.001).abs() < 1e-12);
    }
}
