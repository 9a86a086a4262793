//! Seesaw Simulation - a torque-balance playground
//!
//! Core modules:
//! - `sim`: Lever physics, object lifecycle, hit-testing (no platform dependencies)
//! - `persistence`: Key/value store port and per-seesaw records
//! - `coordinator`: Owns every seesaw and routes input/ticks to the active one
//! - `config`: Tunable physics and layout constants
//! - `audio`: Web Audio sound effects (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod config;
pub mod coordinator;
pub mod persistence;
pub mod sim;

pub use config::{ConfigError, SeesawConfig};
pub use coordinator::{ManagerError, SeesawManager};

use glam::DVec2;

/// Fixed constants that are not user-tunable
pub mod consts {
    /// Animation ticks per second (display refresh rate)
    pub const TICK_RATE: f64 = 60.0;
    /// Drops closer than this to the pivot are rejected
    pub const DEAD_ZONE_RADIUS: f64 = 10.0;
    /// Bounce velocities at or below this magnitude are treated as at rest
    pub const BOUNCE_EPSILON: f64 = 0.1;
    /// Spacing between ruler marks
    pub const RULER_INTERVAL: f64 = 50.0;
    /// Ruler marks per side never exceed this
    pub const RULER_MAX_STEPS: i64 = 100;
    /// Activity log keeps this many entries (newest first)
    pub const LOG_CAPACITY: usize = 10;
    /// Top of the preview guide line (scene y)
    pub const PREVIEW_LINE_TOP: f64 = 20.0;
    /// Extra clickable band above the plank, on top of its own height
    pub const HIT_ABOVE_TOLERANCE: f64 = 40.0;
    /// Extra clickable band below the plank
    pub const HIT_BELOW_MARGIN: f64 = 20.0;
    /// Net torque beyond which the balance indicator leans to a side
    pub const BALANCE_THRESHOLD: f64 = 50.0;
}

/// Convert degrees to radians
#[inline]
pub fn to_radians(degrees: f64) -> f64 {
    degrees.to_radians()
}

/// Map a lever-local offset along the plank to a displacement from the pivot
#[inline]
pub fn rotate(offset: f64, angle: f64) -> DVec2 {
    DVec2::from_angle(angle) * offset
}

/// Map a pivot-relative screen offset back into lever-local (unrotated) coordinates
#[inline]
pub fn inverse_rotate(rel_x: f64, rel_y: f64, angle: f64) -> DVec2 {
    DVec2::from_angle(-angle).rotate(DVec2::new(rel_x, rel_y))
}
