//! Built-in fragment passes.
//!
//! - [`NoiseInjectionPass`]: uniform circuit-level noise
//! - [`NeutralAtomTranslation`]: lowering of CX/CY to CZ layers
//! - [`MomentVerification`]: moment disjointness check

pub mod neutral_atom;
pub mod noise_injection;
pub mod verification;

pub use neutral_atom::NeutralAtomTranslation;
pub use noise_injection::NoiseInjectionPass;
pub use verification::{MomentVerification, VerificationResult};

use cultiv_ir::Instruction;

/// One moment of a fragment: its instructions and the closing `TICK`, if
/// any. Only the last moment of a fragment can be open.
pub(crate) struct Moment<'a> {
    pub body: &'a [Instruction],
    pub tick: Option<&'a Instruction>,
}

/// Split an instruction stream at its `TICK`s.
pub(crate) fn moments(instructions: &[Instruction]) -> impl Iterator<Item = Moment<'_>> {
    instructions
        .split_inclusive(Instruction::is_tick)
        .map(|chunk| match chunk.split_last() {
            Some((last, body)) if last.is_tick() => Moment {
                body,
                tick: Some(last),
            },
            _ => Moment {
                body: chunk,
                tick: None,
            },
        })
}
