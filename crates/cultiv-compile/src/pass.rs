//! Pass trait and types for fragment passes.

use cultiv_ir::Circuit;

use crate::error::CompileResult;
use crate::property::PropertySet;

/// The kind of pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Analysis pass that reads but does not modify the fragment.
    Analysis,
    /// Transformation pass that rewrites the fragment.
    Transformation,
}

/// A pass that operates on one program fragment.
///
/// Fragments are built noiseless and in the uniform gate set; passes
/// lower them to the target hardware and add noise before they are
/// appended to the program.
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Get the kind of this pass.
    fn kind(&self) -> PassKind;

    /// Run the pass on the given fragment.
    ///
    /// Transformation passes must keep the sequence of measured qubits
    /// unchanged, so that detectors built against the fragment stay valid.
    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()>;

    /// Check if this pass should run based on current state.
    fn should_run(&self, _circuit: &Circuit, _properties: &PropertySet) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestPass;

    impl Pass for TestPass {
        fn name(&self) -> &'static str {
            "test"
        }

        fn kind(&self) -> PassKind {
            PassKind::Transformation
        }

        fn run(&self, _circuit: &mut Circuit, _properties: &mut PropertySet) -> CompileResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_pass_kind() {
        let pass = TestPass;
        assert_eq!(pass.kind(), PassKind::Transformation);
        assert_eq!(pass.name(), "test");
        assert!(pass.should_run(&Circuit::new("empty"), &PropertySet::new()));
    }
}
