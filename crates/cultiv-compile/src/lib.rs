//! Cultiv Protocol Generator and Compilation Passes
//!
//! This crate generates magic-state cultivation programs on a rotated
//! surface-code patch: a distance-3 logical Y state is prepared, checked
//! twice against a helper register, postselected, grown to distance 5 and
//! merged into the full patch, which is then measured for a configurable
//! number of rounds.
//!
//! # Overview
//!
//! ```text
//! ProtocolConfig
//!       │
//!       ▼
//! ┌──────────┐   fragment   ┌─────────────┐
//! │ Protocol │ ───────────► │ PassManager │ ◄── PropertySet (noise, hardware)
//! └──────────┘              └─────────────┘
//!       ▲                          │
//!       └──────── append ──────────┘
//!       │
//!       ▼
//! Circuit (cultiv-ir)
//! ```
//!
//! The generator components, leaves first:
//!
//! - [`layout`]: [`PatchLayout`], qubit ids, roles and ancilla validity
//! - [`schedule`]: the four-step CNOT schedule of a stabilizer round
//! - [`round`]: [`StabilizerRound`] over the whole or part of the patch
//! - [`detectors`]: [`DetectorNetwork`] with steady, current-only and
//!   transition policies
//! - [`cultivation`]: distance-3 preparation, growth and merge
//! - [`helper`]: [`HelperNetwork`] for the transversal check
//! - [`observable`]: logical readout
//! - [`pipeline`]: [`Protocol`], the fixed order of all of the above
//!
//! # Example
//!
//! ```rust
//! use cultiv_compile::{Protocol, ProtocolConfig};
//! use cultiv_ir::emit;
//!
//! let config = ProtocolConfig {
//!     distance: 5,
//!     latter_rounds: 2,
//!     ..Default::default()
//! };
//! let program = Protocol::new(config).unwrap().generate().unwrap();
//! let text = emit(&program).unwrap();
//! assert!(text.contains("OBSERVABLE_INCLUDE(0)"));
//! ```
//!
//! # Built-in Passes
//!
//! - [`passes::MomentVerification`]: no qubit is used by two gates in one moment
//! - [`passes::NeutralAtomTranslation`]: CX/CY to CZ with basis changes
//! - [`passes::NoiseInjectionPass`]: uniform depolarizing noise
//!
//! # Custom Passes
//!
//! ```rust
//! use cultiv_compile::{CompileResult, Pass, PassKind, PropertySet};
//! use cultiv_ir::Circuit;
//!
//! struct CountGates;
//!
//! impl Pass for CountGates {
//!     fn name(&self) -> &str { "count_gates" }
//!     fn kind(&self) -> PassKind { PassKind::Analysis }
//!
//!     fn run(&self, circuit: &mut Circuit, props: &mut PropertySet) -> CompileResult<()> {
//!         let gates = circuit.instructions().iter().filter(|i| i.is_gate()).count();
//!         props.insert(gates);
//!         Ok(())
//!     }
//! }
//! ```

pub mod config;
pub mod cultivation;
pub mod detectors;
pub mod error;
pub mod helper;
pub mod layout;
pub mod manager;
pub mod observable;
pub mod pass;
pub mod pipeline;
pub mod property;
pub mod round;
pub mod schedule;

// Built-in passes
pub mod passes;

pub use config::{ComponentNoise, PostselectMode, ProtocolConfig};
pub use cultivation::{CultivationGrid, Embedding, PrepStrategy};
pub use detectors::{DetectorNetwork, DetectorPolicy};
pub use error::{CompileError, CompileResult};
pub use helper::HelperNetwork;
pub use layout::{GridPos, PatchLayout, QubitRole, StabilizerType};
pub use manager::{PassManager, PassManagerBuilder};
pub use observable::ObservableMode;
pub use pass::{Pass, PassKind};
pub use pipeline::{Protocol, generate};
pub use property::{HardwareModel, NoiseSettings, PropertySet};
pub use round::{StabilizerRound, stabilizer_round};
pub use schedule::{GatePair, ScheduleSlice, ScheduleStep};
