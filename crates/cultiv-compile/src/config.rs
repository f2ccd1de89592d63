//! Protocol configuration.
//!
//! Every field has a default, so a config file only needs to name what
//! it changes:
//!
//! ```yaml
//! distance: 7
//! prep: unitary_stabilizer
//! helper_length: 5
//! noise: 0.0005
//! components:
//!   check: false
//! ```

use serde::{Deserialize, Serialize};

use cultiv_ir::Pauli;

use crate::cultivation::{Embedding, PrepStrategy};
use crate::error::{CompileError, CompileResult};
use crate::observable::ObservableMode;
use crate::property::{HardwareModel, NoiseSettings};

/// Where the cultivated state is postselected before it is grown into
/// the full patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostselectMode {
    /// After growing to distance 5, on a restricted stabilizer round.
    #[default]
    Grown,
    /// On the unrotated distance-3 code, then grow to distance 5.
    Unrotated,
    /// On the rotated distance-3 code; no growth, the full patch is
    /// merged from distance 3.
    Rotated,
}

/// Which protocol components receive noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentNoise {
    /// Distance-3 preparation.
    pub unitary_prep: bool,
    /// Helper register preparation and measurement.
    pub helper_state: bool,
    /// Transversal check.
    pub check: bool,
    /// Growth from distance 3 to 5.
    pub growth: bool,
    /// Postselection round.
    pub postselection: bool,
    /// Merge into the full patch and its noisy rounds.
    pub final_growth: bool,
}

impl Default for ComponentNoise {
    fn default() -> Self {
        Self::all()
    }
}

impl ComponentNoise {
    /// Every component noisy.
    pub fn all() -> Self {
        Self {
            unitary_prep: true,
            helper_state: true,
            check: true,
            growth: true,
            postselection: true,
            final_growth: true,
        }
    }

    /// Every component noiseless.
    pub fn none() -> Self {
        Self {
            unitary_prep: false,
            helper_state: false,
            check: false,
            growth: false,
            postselection: false,
            final_growth: false,
        }
    }
}

/// Full description of a generated program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Distance of the final patch.
    pub distance: u32,
    /// Distance-3 preparation strategy.
    pub prep: PrepStrategy,
    /// Where the distance-3 code sits on the patch.
    pub embedding: Embedding,
    /// Length of the helper register (3 or 5).
    pub helper_length: u32,
    /// Noisy stabilizer rounds on the full patch, including the
    /// transition round.
    pub latter_rounds: u32,
    /// Postselection mode.
    pub postselect: PostselectMode,
    /// Stop after the postselection round.
    pub cultivation_only: bool,
    /// Target hardware model.
    pub hardware: HardwareModel,
    /// Final readout.
    pub observable: ObservableMode,
    /// Physical error rate.
    pub noise: f64,
    /// Per-component noise toggles.
    pub components: ComponentNoise,
    /// Apply classically controlled corrections after hook injection.
    pub gauge_fix: bool,
    /// Check every fragment for qubits used twice in a moment.
    pub verify_moments: bool,
    /// Basis of the cultivated logical state.
    pub basis: Pauli,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            distance: 5,
            prep: PrepStrategy::default(),
            embedding: Embedding::default(),
            helper_length: 3,
            latter_rounds: 3,
            postselect: PostselectMode::default(),
            cultivation_only: false,
            hardware: HardwareModel::default(),
            observable: ObservableMode::default(),
            noise: 1e-3,
            components: ComponentNoise::default(),
            gauge_fix: true,
            verify_moments: false,
            basis: Pauli::Y,
        }
    }
}

impl ProtocolConfig {
    /// Reject configurations the generator does not implement.
    pub fn validate(&self) -> CompileResult<()> {
        let d = self.distance;
        if d < 3 || d % 2 == 0 {
            return Err(CompileError::InvalidDistance {
                distance: d,
                reason: "distance must be odd and at least 3".to_string(),
            });
        }
        if self.embedding == Embedding::Spread && d < 5 {
            return Err(CompileError::InvalidDistance {
                distance: d,
                reason: "the spread embedding needs a patch of distance at least 5".to_string(),
            });
        }

        if self.basis != Pauli::Y {
            return Err(CompileError::UnsupportedConfiguration(format!(
                "cultivation in the {} basis",
                self.basis.letter()
            )));
        }
        if !matches!(self.helper_length, 3 | 5) {
            return Err(CompileError::UnsupportedConfiguration(format!(
                "helper register of length {} (supported: 3, 5)",
                self.helper_length
            )));
        }
        if self.embedding == Embedding::Native {
            if self.prep == PrepStrategy::OptimizedUnitary {
                return Err(CompileError::UnsupportedConfiguration(
                    "optimized unitary preparation on the native embedding".to_string(),
                ));
            }
            if self.postselect != PostselectMode::Rotated {
                return Err(CompileError::UnsupportedConfiguration(
                    "growth to distance 5 needs the spread embedding".to_string(),
                ));
            }
        }
        if self.latter_rounds == 0 {
            return Err(CompileError::UnsupportedConfiguration(
                "at least one noisy round on the full patch".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.noise) {
            return Err(CompileError::UnsupportedConfiguration(format!(
                "error rate {} outside [0, 1]",
                self.noise
            )));
        }
        Ok(())
    }

    /// Distance of the sub-patch merged into the full patch.
    pub fn merge_distance(&self) -> u32 {
        match self.postselect {
            PostselectMode::Rotated => 3,
            PostselectMode::Grown | PostselectMode::Unrotated => 5,
        }
    }

    /// Noise for a component switched by `enabled`.
    pub fn noise_for(&self, enabled: bool) -> NoiseSettings {
        if enabled {
            NoiseSettings::uniform(self.noise)
        } else {
            NoiseSettings::disabled()
        }
    }
}
