//! Scene configuration
//!
//! Split into structural settings, which rebuild the scene when they change,
//! and live settings, which are applied to the running scene in place.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::palette::PaletteId;
use crate::sim::{ContainerKind, PopulationMode};

/// Rotation speed presets offered by the speed button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpeedLevel {
    #[default]
    X1,
    X2,
    X3,
}

impl SpeedLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedLevel::X1 => "1x",
            SpeedLevel::X2 => "2x",
            SpeedLevel::X3 => "3x",
        }
    }

    /// Rotation step in degrees per tick
    pub fn degrees_per_tick(&self) -> f32 {
        match self {
            SpeedLevel::X1 => 0.6,
            SpeedLevel::X2 => 1.2,
            SpeedLevel::X3 => 1.8,
        }
    }

    /// Cycle 1x -> 2x -> 3x -> 1x
    pub fn next(&self) -> Self {
        match self {
            SpeedLevel::X1 => SpeedLevel::X2,
            SpeedLevel::X2 => SpeedLevel::X3,
            SpeedLevel::X3 => SpeedLevel::X1,
        }
    }
}

/// Settings that require a full teardown and rebuild when changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuralConfig {
    pub container: ContainerKind,
    /// Requested shape count, clamped to [3, 10] at spawn time
    pub population: i32,
    pub mode: PopulationMode,
    /// Opaque token; bumping it forces a rebuild with the same parameters
    pub reset_token: u64,
}

impl Default for StructuralConfig {
    fn default() -> Self {
        Self {
            container: ContainerKind::Square,
            population: 6,
            mode: PopulationMode::Classic,
            reset_token: 0,
        }
    }
}

/// Settings applied to the running scene without a rebuild
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    /// Rotation step in degrees per tick
    pub rotation_speed: f32,
    pub running: bool,
    pub reversed: bool,
    pub palette: PaletteId,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            rotation_speed: SpeedLevel::default().degrees_per_tick(),
            running: true,
            reversed: false,
            palette: PaletteId::default(),
        }
    }
}

/// Partial update of [`LiveConfig`]; `None` leaves a field untouched
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LiveConfigPatch {
    pub rotation_speed: Option<f32>,
    pub running: Option<bool>,
    pub reversed: Option<bool>,
    pub palette: Option<PaletteId>,
}

impl LiveConfigPatch {
    pub fn speed(rotation_speed: f32) -> Self {
        Self {
            rotation_speed: Some(rotation_speed),
            ..Default::default()
        }
    }

    pub fn running(running: bool) -> Self {
        Self {
            running: Some(running),
            ..Default::default()
        }
    }

    pub fn reversed(reversed: bool) -> Self {
        Self {
            reversed: Some(reversed),
            ..Default::default()
        }
    }

    pub fn palette(palette: PaletteId) -> Self {
        Self {
            palette: Some(palette),
            ..Default::default()
        }
    }

    /// Merge into `config`; returns true if the palette actually changed
    pub fn apply_to(&self, config: &mut LiveConfig) -> bool {
        if let Some(speed) = self.rotation_speed {
            // Negative speeds are expressed through `reversed`
            config.rotation_speed = speed.max(0.0);
        }
        if let Some(running) = self.running {
            config.running = running;
        }
        if let Some(reversed) = self.reversed {
            config.reversed = reversed;
        }
        match self.palette {
            Some(palette) if palette != config.palette => {
                config.palette = palette;
                true
            }
            _ => false,
        }
    }
}

/// Complete scene configuration, loadable from JSON
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub structural: StructuralConfig,
    pub live: LiveConfig,
    /// Fixed spawn seed; a time-based seed is used when absent
    pub seed: Option<u64>,
}

impl SceneConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded scene config from {}", path.display());
        Ok(config)
    }
}
