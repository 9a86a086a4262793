//! Dropped objects and their fall/settle lifecycle

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::balance::Side;
use crate::config::SeesawConfig;
use crate::consts::BOUNCE_EPSILON;
use crate::rotate;

/// Lifecycle of a dropped object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectPhase {
    /// Descending toward the plank surface
    Falling,
    /// Touched the plank this tick; torque not yet claimed
    Settling,
    /// Resting on the plank (may still be bouncing)
    #[default]
    Settled,
}

/// An object dropped onto the plank
///
/// `position` is the permanent physics input: a signed lever-local offset
/// from the pivot, unaffected by tilt. Screen coordinates are derived from
/// it every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedObject {
    pub id: u32,
    pub position: f64,
    pub distance: f64,
    pub side: Side,
    pub weight: f64,
    /// Radius, fixed from weight at creation
    pub size: f64,
    pub color: String,
    /// Set exactly once, when the object's torque joins the totals
    pub torque_applied: bool,
    #[serde(skip)]
    pub phase: ObjectPhase,
    /// Current top edge in scene coordinates while falling
    #[serde(skip)]
    pub fall_y: f64,
    #[serde(skip)]
    pub bounce_velocity: f64,
    /// Displacement applied this frame by the bounce
    #[serde(skip)]
    pub bounce_offset: f64,
}

impl DroppedObject {
    /// Create a freshly dropped object, just above the top of the scene
    pub fn new(id: u32, position: f64, weight: f64, color: String, config: &SeesawConfig) -> Self {
        let size = config.object_size(weight);
        Self {
            id,
            position,
            distance: position.abs(),
            side: Side::of(position),
            weight,
            size,
            color,
            torque_applied: false,
            phase: ObjectPhase::Falling,
            fall_y: -size,
            bounce_velocity: 0.0,
            bounce_offset: 0.0,
        }
    }

    /// Rebuild an object from stored fields; it comes back at rest
    pub fn restored(
        id: u32,
        position: f64,
        weight: f64,
        size: f64,
        color: String,
        torque_applied: bool,
    ) -> Self {
        Self {
            id,
            position,
            distance: position.abs(),
            side: Side::of(position),
            weight,
            size,
            color,
            torque_applied,
            phase: ObjectPhase::Settled,
            fall_y: 0.0,
            bounce_velocity: 0.0,
            bounce_offset: 0.0,
        }
    }

    pub fn is_falling(&self) -> bool {
        self.phase == ObjectPhase::Falling
    }

    /// Scene y of this object's top edge when resting on the tilted plank
    pub fn rest_y(&self, angle_rad: f64, config: &SeesawConfig) -> f64 {
        let rotated = rotate(self.position, angle_rad);
        config.pivot().y + rotated.y - self.size - config.plank_height
    }

    /// Advance the fall by one tick
    ///
    /// Returns true on the tick the object reaches the plank; it is then
    /// `Settling` with the landing bounce impulse loaded.
    pub fn fall(&mut self, angle_rad: f64, config: &SeesawConfig) -> bool {
        if self.phase != ObjectPhase::Falling {
            return false;
        }

        self.fall_y += config.fall_speed;
        let target_y = self.rest_y(angle_rad, config);
        if self.fall_y < target_y {
            return false;
        }

        self.fall_y = target_y;
        self.phase = ObjectPhase::Settling;
        self.bounce_velocity = config.bounce_initial;
        true
    }

    /// Finish a landing and claim the torque guard
    ///
    /// Returns true only the first time the object's torque should be added
    /// to the totals. Calling it again (or on a falling object) is a no-op.
    pub fn settle(&mut self) -> bool {
        match self.phase {
            ObjectPhase::Falling => false,
            ObjectPhase::Settling | ObjectPhase::Settled => {
                self.phase = ObjectPhase::Settled;
                !std::mem::replace(&mut self.torque_applied, true)
            }
        }
    }

    /// Decay the landing bounce by one tick without crossing zero
    pub fn decay_bounce(&mut self, config: &SeesawConfig) {
        if self.bounce_velocity.abs() <= BOUNCE_EPSILON {
            self.bounce_offset = 0.0;
            return;
        }

        self.bounce_offset = self.bounce_velocity;
        self.bounce_velocity = if self.bounce_velocity < 0.0 {
            (self.bounce_velocity + config.bounce_deceleration).min(0.0)
        } else {
            (self.bounce_velocity - config.bounce_deceleration).max(0.0)
        };
    }

    /// Top-left corner in scene coordinates for the given tilt
    pub fn screen_position(&self, angle_rad: f64, config: &SeesawConfig) -> DVec2 {
        let pivot = config.pivot();
        let rotated = rotate(self.position, angle_rad);
        let x = pivot.x + rotated.x - self.size;

        match self.phase {
            ObjectPhase::Falling => DVec2::new(x, self.fall_y),
            ObjectPhase::Settling | ObjectPhase::Settled => {
                // Bounce pushes along the plank normal
                let bounce = DVec2::new(angle_rad.sin(), angle_rad.cos()) * self.bounce_offset;
                DVec2::new(x, self.rest_y(angle_rad, config)) + bounce
            }
        }
    }
}
