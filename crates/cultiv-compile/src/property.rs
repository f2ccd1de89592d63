//! `PropertySet` and related types for pass communication.
//!
//! Every fragment of the protocol is compiled with its own property set:
//! the noise settings of the component it belongs to and the hardware
//! model. Analysis passes leave their results in the set as custom
//! properties.
//!
//! # Example
//!
//! ```
//! use cultiv_compile::{HardwareModel, NoiseSettings, PropertySet};
//!
//! let props = PropertySet::new()
//!     .with_noise(NoiseSettings::uniform(1e-3))
//!     .with_hardware(HardwareModel::NeutralAtom);
//!
//! assert!(props.noise.is_some_and(|n| n.enabled));
//! ```

use std::any::{Any, TypeId};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Gate set the program is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareModel {
    /// Native CX/CY gates with uniform depolarizing noise.
    #[default]
    Uniform,
    /// Entangling gates are CZ only; CX and CY are conjugated by basis
    /// changes on the target.
    NeutralAtom,
}

/// Noise applied to one fragment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseSettings {
    /// Physical error rate.
    pub p: f64,
    /// Whether the fragment's component is noisy at all. A disabled
    /// fragment is emitted unchanged.
    pub enabled: bool,
}

impl NoiseSettings {
    /// Enabled noise at rate `p`.
    pub fn uniform(p: f64) -> Self {
        Self { p, enabled: true }
    }

    /// Noise switched off.
    pub fn disabled() -> Self {
        Self {
            p: 0.0,
            enabled: false,
        }
    }

    /// The same settings with the error rate scaled by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            p: self.p * factor,
            ..self
        }
    }
}

/// Properties shared between passes.
#[derive(Debug, Default)]
pub struct PropertySet {
    /// Noise for the fragment being compiled.
    pub noise: Option<NoiseSettings>,

    /// Target gate set.
    pub hardware: HardwareModel,

    /// Custom properties storage (type-erased).
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fragment's noise.
    #[must_use]
    pub fn with_noise(mut self, noise: NoiseSettings) -> Self {
        self.noise = Some(noise);
        self
    }

    /// Set the hardware model.
    #[must_use]
    pub fn with_hardware(mut self, hardware: HardwareModel) -> Self {
        self.hardware = hardware;
        self
    }

    /// Whether noise is configured and enabled.
    pub fn noise_enabled(&self) -> bool {
        self.noise.is_some_and(|n| n.enabled)
    }

    /// Insert a custom property.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a custom property.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Get a mutable custom property.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Remove a custom property.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }
}
