//! Pass manager for lowering fragments.

use tracing::{debug, instrument};

use cultiv_ir::Circuit;

use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::{MomentVerification, NeutralAtomTranslation, NoiseInjectionPass};
use crate::property::{HardwareModel, NoiseSettings, PropertySet};

/// Manages and executes a sequence of passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Run all passes on the given fragment.
    #[instrument(skip(self, circuit, properties), fields(fragment = circuit.name()))]
    pub fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        debug!(
            "Running {} passes on fragment with {} instructions",
            self.passes.len(),
            circuit.len()
        );

        for pass in &self.passes {
            if pass.should_run(circuit, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(circuit, properties)?;
                debug!(
                    "Pass {} completed, instructions: {}",
                    pass.name(),
                    circuit.len()
                );
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }
        Ok(())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for the standard fragment pipeline.
pub struct PassManagerBuilder {
    /// Check moment disjointness before lowering.
    verify_moments: bool,
    /// Fragment properties.
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            verify_moments: false,
            properties: PropertySet::new(),
        }
    }

    /// Enable moment verification.
    #[must_use]
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify_moments = verify;
        self
    }

    /// Set the fragment's noise.
    #[must_use]
    pub fn with_noise(mut self, noise: NoiseSettings) -> Self {
        self.properties.noise = Some(noise);
        self
    }

    /// Set the hardware model.
    #[must_use]
    pub fn with_hardware(mut self, hardware: HardwareModel) -> Self {
        self.properties.hardware = hardware;
        self
    }

    /// Build the pass manager and return it with the properties.
    ///
    /// Verification runs first, on the fragment as built. Translation
    /// precedes noise so channels follow the gates actually executed.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();

        if self.verify_moments {
            pm.add_pass(MomentVerification);
        }
        pm.add_pass(NeutralAtomTranslation);
        pm.add_pass(NoiseInjectionPass::new());

        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cultiv_ir::QubitId;

    #[test]
    fn test_empty_pass_manager() {
        let pm = PassManager::new();
        assert!(pm.is_empty());
        assert_eq!(pm.len(), 0);
    }

    #[test]
    fn test_pass_manager_run() {
        let pm = PassManager::new();
        let mut props = PropertySet::new();

        let mut circuit = Circuit::new("test");
        circuit.h([QubitId(0)]).unwrap();
        circuit.cx([(QubitId(0), QubitId(1))]).unwrap();

        pm.run(&mut circuit, &mut props).unwrap();
        assert_eq!(circuit.len(), 2);
    }

    #[test]
    fn test_pass_manager_builder() {
        let (pm, props) = PassManagerBuilder::new()
            .with_verification(true)
            .with_noise(NoiseSettings::uniform(0.001))
            .with_hardware(HardwareModel::NeutralAtom)
            .build();

        assert_eq!(pm.len(), 3);
        assert!(props.noise_enabled());
        assert_eq!(props.hardware, HardwareModel::NeutralAtom);
    }

    #[test]
    fn test_disabled_noise_leaves_fragment() {
        let (pm, mut props) = PassManagerBuilder::new()
            .with_noise(NoiseSettings::disabled())
            .with_hardware(HardwareModel::NeutralAtom)
            .build();

        let mut circuit = Circuit::new("quiet");
        circuit.cx([(QubitId(0), QubitId(1))]).unwrap().tick().unwrap();
        let before = circuit.instructions().to_vec();

        pm.run(&mut circuit, &mut props).unwrap();
        assert_eq!(circuit.instructions(), before.as_slice());
    }
}
