//! Simulation configuration
//!
//! Persisted separately from seesaw records. Every field has a stock default,
//! so a missing or stale stored override never blocks startup.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::persistence::KeyValueStore;

/// Rejected configuration values
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("torque divisor must be positive, got {0}")]
    TorqueDivisor(f64),
    #[error("max angle must be positive, got {0}")]
    MaxAngle(f64),
    #[error("smoothing factor must be in (0, 1), got {0}")]
    Smoothing(f64),
    #[error("weight range {min}..={max} is empty")]
    WeightRange { min: u32, max: u32 },
    #[error("plank width range {min}..={max} is invalid")]
    PlankWidthRange { min: f64, max: f64 },
    #[error("default plank width {width} is outside {min}..={max}")]
    PlankWidth { width: f64, min: f64, max: f64 },
    #[error("fall speed must be positive, got {0}")]
    FallSpeed(f64),
    #[error("initial bounce velocity must not point down, got {0}")]
    BounceInitial(f64),
    #[error("bounce deceleration must be positive, got {0}")]
    BounceDeceleration(f64),
    #[error("base object size must be positive, got {0}")]
    BaseObjectSize(f64),
    #[error("size per kg must not be negative, got {0}")]
    SizePerKg(f64),
    #[error("color palette is empty")]
    EmptyPalette,
    #[error("seesaw capacity must be at least 1")]
    ZeroCapacity,
}

/// Physics and layout constants for every seesaw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeesawConfig {
    // === Scene ===
    /// Scene width; the pivot sits at the horizontal center
    pub container_width: f64,
    /// Scene height
    pub container_height: f64,

    // === Plank ===
    /// Initial plank width for new seesaws
    pub plank_width: f64,
    pub plank_height: f64,
    /// Lower bound for the plank width (objects may raise it further)
    pub min_plank_width: f64,
    /// Upper bound offered by the width slider
    pub max_plank_width: f64,
    /// Plank surface offset below the scene center
    pub pivot_offset: f64,
    /// Clearance kept between the farthest object and the plank end
    pub width_margin: f64,

    // === Balance ===
    /// Tilt limit in degrees
    pub max_angle: f64,
    /// Net torque per degree of tilt
    pub torque_divisor: f64,
    /// Fraction of the remaining angle covered each tick
    pub smoothing: f64,

    // === Objects ===
    /// Inclusive weight range in kg
    pub min_weight: u32,
    pub max_weight: u32,
    /// Object radius is `base_object_size + weight * size_per_kg`
    pub base_object_size: f64,
    pub size_per_kg: f64,
    /// Fall distance per tick
    pub fall_speed: f64,
    /// Upward impulse on landing (negative = up)
    pub bounce_initial: f64,
    /// Bounce velocity recovered per tick
    pub bounce_deceleration: f64,
    pub colors: Vec<String>,

    // === Coordinator ===
    /// Maximum number of seesaws
    pub max_instances: usize,
}

impl Default for SeesawConfig {
    fn default() -> Self {
        Self {
            container_width: 1200.0,
            container_height: 500.0,

            plank_width: 400.0,
            plank_height: 20.0,
            min_plank_width: 400.0,
            max_plank_width: 1000.0,
            pivot_offset: 10.0,
            width_margin: 20.0,

            max_angle: 30.0,
            torque_divisor: 10.0,
            smoothing: 0.1,

            min_weight: 1,
            max_weight: 10,
            base_object_size: 15.0,
            size_per_kg: 2.0,
            fall_speed: 8.0,
            bounce_initial: -3.0,
            bounce_deceleration: 0.5,
            colors: [
                "#e74c3c", "#3498db", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c", "#e67e22",
                "#34495e",
            ]
            .into_iter()
            .map(String::from)
            .collect(),

            max_instances: 10,
        }
    }
}

impl SeesawConfig {
    /// Storage key for the config override
    pub const STORAGE_KEY: &'static str = "seesawSimulation_config";

    /// Check that the physics constants are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.torque_divisor > 0.0) {
            return Err(ConfigError::TorqueDivisor(self.torque_divisor));
        }
        if !(self.max_angle > 0.0) {
            return Err(ConfigError::MaxAngle(self.max_angle));
        }
        if !(self.smoothing > 0.0 && self.smoothing < 1.0) {
            return Err(ConfigError::Smoothing(self.smoothing));
        }
        if self.min_weight == 0 || self.min_weight > self.max_weight {
            return Err(ConfigError::WeightRange {
                min: self.min_weight,
                max: self.max_weight,
            });
        }
        if !(self.min_plank_width > 0.0) || self.min_plank_width > self.max_plank_width {
            return Err(ConfigError::PlankWidthRange {
                min: self.min_plank_width,
                max: self.max_plank_width,
            });
        }
        if !(self.plank_width >= self.min_plank_width && self.plank_width <= self.max_plank_width) {
            return Err(ConfigError::PlankWidth {
                width: self.plank_width,
                min: self.min_plank_width,
                max: self.max_plank_width,
            });
        }
        // Objects must always reach the plank and come to rest
        if !(self.fall_speed > 0.0) {
            return Err(ConfigError::FallSpeed(self.fall_speed));
        }
        if !(self.bounce_initial <= 0.0) {
            return Err(ConfigError::BounceInitial(self.bounce_initial));
        }
        if !(self.bounce_deceleration > 0.0) {
            return Err(ConfigError::BounceDeceleration(self.bounce_deceleration));
        }
        if !(self.base_object_size > 0.0) {
            return Err(ConfigError::BaseObjectSize(self.base_object_size));
        }
        if !(self.size_per_kg >= 0.0) {
            return Err(ConfigError::SizePerKg(self.size_per_kg));
        }
        if self.colors.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        if self.max_instances == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }

    /// Pivot position in scene coordinates
    pub fn pivot(&self) -> DVec2 {
        DVec2::new(
            self.container_width / 2.0,
            self.container_height / 2.0 + self.pivot_offset,
        )
    }

    /// Object radius for a given weight
    pub fn object_size(&self, weight: f64) -> f64 {
        self.base_object_size + weight * self.size_per_kg
    }

    /// Load the stored override, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let json = match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => {
                log::info!("Using default config");
                return Self::default();
            }
            Err(e) => {
                log::warn!("Config read failed: {e}");
                return Self::default();
            }
        };

        let config = match serde_json::from_str::<Self>(&json) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Stored config unreadable ({e}), using defaults");
                return Self::default();
            }
        };

        match config.validate() {
            Ok(()) => {
                log::info!("Loaded config override");
                config
            }
            Err(e) => {
                log::warn!("Stored config rejected: {e}");
                Self::default()
            }
        }
    }

    /// Store this config as the override (best-effort)
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => {
                if let Err(e) = store.set(Self::STORAGE_KEY, &json) {
                    log::warn!("Config save failed: {e}");
                }
            }
            Err(e) => log::warn!("Config serialization failed: {e}"),
        }
    }
}
