//! Cultiv Program Intermediate Representation
//!
//! This crate provides the data structures for QEC circuit programs: a
//! linear stream of Clifford gates, resets, measurements, noise channels
//! and annotations (qubit coordinates, detectors, observables), together
//! with the measurement tape that detector declarations refer into.
//!
//! # Core Components
//!
//! - **Qubits**: [`QubitId`] flat identifiers and [`Coord`] spacetime tags
//! - **Gates**: [`StandardGate`] Clifford gates and [`Pauli`] bases
//! - **Instructions**: [`Instruction`] combining an operation with its targets
//! - **Tape**: [`MeasurementTape`] with absolute [`MeasurementRef`] positions
//!   and per-qubit history
//! - **Circuit**: [`Circuit`] builder, fragment composition and validation
//! - **Emitter**: [`emit`] to the execution engine's text format
//!
//! # Example: a repeated parity check
//!
//! ```rust
//! use cultiv_ir::{Circuit, Coord, QubitId, emit};
//!
//! let (d0, a, d1) = (QubitId(0), QubitId(1), QubitId(2));
//! let mut program = Circuit::new("parity");
//! program.reset([d0, a, d1]).unwrap().tick().unwrap();
//!
//! for round in 0..2 {
//!     let mut frag = Circuit::continuing(format!("round{round}"), &program);
//!     frag.cx([(d0, a)]).unwrap().tick().unwrap();
//!     frag.cx([(d1, a)]).unwrap().tick().unwrap();
//!     frag.measure([a]).unwrap();
//!     frag.reset([a]).unwrap();
//!     let mut records = vec![frag.tape().latest(a).unwrap()];
//!     records.extend(frag.tape().lookback(a, 1));
//!     frag.detector(vec![1.0, 0.0, 0.0], records).unwrap();
//!     frag.shift_coords(Coord::round_shift()).unwrap();
//!     program.append(frag).unwrap();
//! }
//!
//! let text = emit(&program).unwrap();
//! assert!(text.contains("DETECTOR(1, 0, 0) rec[-1] rec[-2]"));
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `I` | 1 | Explicit idle |
//! | `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `H` | 1 | Hadamard gate |
//! | `S`, `S_DAG` | 1 | S and S-dagger gates |
//! | `H_YZ` | 1 | Y/Z exchanging Hadamard |
//! | `CX`, `CY`, `CZ` | 2 | Controlled Paulis |

pub mod circuit;
pub mod emit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod noise;
pub mod qubit;
pub mod tape;

pub use circuit::Circuit;
pub use emit::emit;
pub use error::{IrError, IrResult};
pub use gate::{Pauli, StandardGate};
pub use instruction::{Detector, Instruction, InstructionKind, ObservableTarget};
pub use noise::NoiseModel;
pub use qubit::{Coord, MeasurementRef, QubitId};
pub use tape::MeasurementTape;
