//! The full cultivation protocol, from preparation to logical readout.
//!
//! The program is assembled from fragments in a fixed order. Each
//! fragment continues the program's measurement tape, is lowered by the
//! pass manager with the noise of its component and is then appended.

use tracing::{debug, info, instrument};

use cultiv_ir::Circuit;

use crate::config::{PostselectMode, ProtocolConfig};
use crate::cultivation::{
    CultivationGrid, RotatedMeasOptions, grow_d3_d5, large_patch_reset, prepare, rotated_meas,
    unrotated_stab_meas,
};
use crate::detectors::{DetectorNetwork, DetectorPolicy};
use crate::error::CompileResult;
use crate::helper::HelperNetwork;
use crate::layout::PatchLayout;
use crate::manager::PassManagerBuilder;
use crate::observable::declare_observables;
use crate::property::{HardwareModel, NoiseSettings};
use crate::round::StabilizerRound;

/// Number of transversal checks of the cultivated state.
const CHECK_CYCLES: usize = 2;

/// Distance the cultivated code is grown to before the merge.
const GROWN_DISTANCE: u32 = 5;

/// A validated protocol ready to generate its program.
#[derive(Debug, Clone)]
pub struct Protocol {
    config: ProtocolConfig,
    layout: PatchLayout,
}

/// Program under construction.
struct Assembler<'c> {
    config: &'c ProtocolConfig,
    program: Circuit,
}

impl Assembler<'_> {
    /// Build a fragment, run it through the passes and append it.
    fn stage<F>(&mut self, name: &str, noise: NoiseSettings, build: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Circuit) -> CompileResult<()>,
    {
        let mut fragment = Circuit::continuing(name, &self.program);
        build(&mut fragment)?;

        let (pm, mut properties) = PassManagerBuilder::new()
            .with_verification(self.config.verify_moments)
            .with_noise(noise)
            .with_hardware(self.config.hardware)
            .build();
        pm.run(&mut fragment, &mut properties)?;

        debug!(
            fragment = name,
            instructions = fragment.len(),
            measurements = fragment.num_measurements(),
            detectors = fragment.num_detectors(),
            "Appending fragment"
        );
        self.program.append(fragment)?;
        Ok(())
    }
}

impl Protocol {
    /// Validate `config` and lay out its patch.
    pub fn new(config: ProtocolConfig) -> CompileResult<Self> {
        config.validate()?;
        let layout = PatchLayout::square(config.distance)?;
        Ok(Self { config, layout })
    }

    /// The protocol's configuration.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// The final patch.
    pub fn layout(&self) -> &PatchLayout {
        &self.layout
    }

    /// Generate the program.
    #[instrument(skip(self), fields(distance = self.config.distance, prep = ?self.config.prep))]
    pub fn generate(&self) -> CompileResult<Circuit> {
        let config = &self.config;
        let layout = &self.layout;
        let components = config.components;
        let grid = CultivationGrid::new(layout, config.embedding)?;
        let helpers = HelperNetwork::new(layout, config.helper_length)?;
        let network = DetectorNetwork::new(layout);

        let mut asm = Assembler {
            config,
            program: Circuit::new(format!("cultivation_d{}", config.distance)),
        };

        asm.stage("coordinates", NoiseSettings::disabled(), |c| {
            layout.layout_coords(c)?;
            helpers.layout_coords(c)
        })?;

        asm.stage(
            "preparation",
            config.noise_for(components.unitary_prep),
            |c| prepare(&grid, c, config.prep, config.gauge_fix),
        )?;

        let check_noise = match config.hardware {
            HardwareModel::Uniform => config.noise_for(components.check),
            HardwareModel::NeutralAtom => config.noise_for(components.check).scaled(2.0),
        };
        for _ in 0..CHECK_CYCLES {
            asm.stage(
                "helper_prepare",
                config.noise_for(components.helper_state),
                |c| helpers.prepare(c),
            )?;
            asm.stage("check", check_noise, |c| {
                helpers.transversal_check(c, &grid, config.basis)
            })?;
            asm.stage(
                "helper_measure",
                config.noise_for(components.helper_state),
                |c| helpers.measure(c),
            )?;
        }

        let postselection = config.noise_for(components.postselection);
        match config.postselect {
            PostselectMode::Unrotated => {
                asm.stage("postselect_unrotated", postselection, |c| {
                    unrotated_stab_meas(&grid, c)
                })?;
            }
            PostselectMode::Rotated => {
                let options = RotatedMeasOptions {
                    compare_previous: false,
                    only_last_two: true,
                };
                asm.stage("postselect_rotated", postselection, |c| {
                    rotated_meas(&grid, c, options)
                })?;
            }
            PostselectMode::Grown => {}
        }

        if config.postselect != PostselectMode::Rotated {
            asm.stage("growth", config.noise_for(components.growth), |c| {
                grow_d3_d5(&grid, c)
            })?;
        }

        if config.postselect == PostselectMode::Grown {
            asm.stage("postselect_grown", postselection, |c| {
                StabilizerRound::new(layout)
                    .restricted_to(GROWN_DISTANCE)
                    .append_to(c)?;
                network.declare(
                    c,
                    DetectorPolicy::CurrentOnly {
                        restricted: GROWN_DISTANCE,
                    },
                    true,
                )?;
                Ok(())
            })?;
        }

        if config.cultivation_only {
            info!(
                measurements = asm.program.num_measurements(),
                detectors = asm.program.num_detectors(),
                "Generated cultivation-only program"
            );
            return Ok(asm.program);
        }

        let merge = config.merge_distance();
        asm.stage(
            "final_growth",
            config.noise_for(components.final_growth),
            |c| {
                large_patch_reset(layout, c, merge)?;
                StabilizerRound::new(layout).append_to(c)?;
                network.declare(c, DetectorPolicy::Transition { restricted: merge }, false)?;
                for _ in 1..config.latter_rounds {
                    StabilizerRound::new(layout).append_to(c)?;
                    network.declare(c, DetectorPolicy::steady(), false)?;
                }
                Ok(())
            },
        )?;

        asm.stage("final_round", NoiseSettings::disabled(), |c| {
            StabilizerRound::new(layout).append_to(c)?;
            network.declare(c, DetectorPolicy::steady(), false)?;
            Ok(())
        })?;

        asm.stage("observables", NoiseSettings::disabled(), |c| {
            declare_observables(layout, c, config.observable)
        })?;

        info!(
            instructions = asm.program.len(),
            measurements = asm.program.num_measurements(),
            detectors = asm.program.num_detectors(),
            "Generated program"
        );
        Ok(asm.program)
    }
}

/// Generate the program described by `config`.
pub fn generate(config: ProtocolConfig) -> CompileResult<Circuit> {
    Protocol::new(config)?.generate()
}
