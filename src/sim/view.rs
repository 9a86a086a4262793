//! Render-ready snapshot of a seesaw
//!
//! Everything a renderer needs to draw one frame, in scene coordinates
//! (origin at the top-left of the container). Nothing here feeds back into
//! the physics.

use serde::Serialize;

use super::balance::Side;
use super::object::ObjectPhase;
use super::plank::RulerTick;
use super::state::Seesaw;
use crate::config::SeesawConfig;
use crate::consts::{BALANCE_THRESHOLD, PREVIEW_LINE_TOP};
use crate::{rotate, to_radians};

/// One object as drawn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectView {
    pub id: u32,
    /// Top-left corner
    pub x: f64,
    pub y: f64,
    /// Diameter
    pub diameter: f64,
    pub color: String,
    pub label: String,
    pub falling: bool,
}

/// Guide line and ghost for the next drop
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewView {
    pub line_x: f64,
    pub line_top: f64,
    pub line_height: f64,
    /// Ghost top-left corner
    pub ghost_x: f64,
    pub ghost_y: f64,
    pub diameter: f64,
    pub color: String,
    pub label: String,
}

/// A full frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneView {
    pub angle_deg: f64,
    pub plank_width: f64,
    pub objects: Vec<ObjectView>,
    pub preview: Option<PreviewView>,
    pub ruler: Vec<RulerTick>,
}

/// Which way the net torque leans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Lean {
    Left,
    Level,
    Right,
}

/// Numbers for the stats and torque panels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub left_weight: f64,
    pub right_weight: f64,
    pub next_weight: f64,
    pub angle: f64,
    pub left_torque: f64,
    pub right_torque: f64,
    pub net_torque: f64,
    pub lean: Lean,
    /// e.g. `"4×120 + 2×60"`, or `"-"` when nothing has landed
    pub left_formula: String,
    pub right_formula: String,
}

/// Build the frame for a seesaw's current state
pub fn scene(state: &Seesaw, config: &SeesawConfig) -> SceneView {
    let angle = to_radians(state.balance.current_angle);

    let objects = state
        .objects
        .iter()
        .map(|obj| {
            let pos = obj.screen_position(angle, config);
            ObjectView {
                id: obj.id,
                x: pos.x,
                y: pos.y,
                diameter: obj.size * 2.0,
                color: obj.color.clone(),
                label: format!("{}kg", obj.weight),
                falling: obj.phase == ObjectPhase::Falling,
            }
        })
        .collect();

    SceneView {
        angle_deg: state.balance.current_angle,
        plank_width: state.plank_width,
        objects,
        preview: state
            .pending_offset
            .map(|offset| preview(state, offset, angle, config)),
        ruler: state.ruler.clone(),
    }
}

fn preview(state: &Seesaw, offset: f64, angle: f64, config: &SeesawConfig) -> PreviewView {
    let pivot = config.pivot();
    let size = config.object_size(state.next_weight);
    let rotated = rotate(offset, angle);
    let landing_y = pivot.y + rotated.y - size - config.plank_height;
    let x = pivot.x + rotated.x;

    PreviewView {
        line_x: x - 1.0,
        line_top: PREVIEW_LINE_TOP,
        line_height: (landing_y - PREVIEW_LINE_TOP).max(0.0),
        ghost_x: x - size,
        ghost_y: PREVIEW_LINE_TOP - size,
        diameter: size * 2.0,
        color: state.preview_color.clone(),
        label: format!("{}kg", state.next_weight),
    }
}

/// Panel numbers for a seesaw
pub fn stats(state: &Seesaw) -> Stats {
    let balance = &state.balance;
    let net_torque = balance.net_torque();
    let lean = if net_torque < -BALANCE_THRESHOLD {
        Lean::Left
    } else if net_torque > BALANCE_THRESHOLD {
        Lean::Right
    } else {
        Lean::Level
    };

    Stats {
        left_weight: balance.left_weight,
        right_weight: balance.right_weight,
        next_weight: state.next_weight,
        angle: balance.current_angle,
        left_torque: balance.left_torque,
        right_torque: balance.right_torque,
        net_torque,
        lean,
        left_formula: formula(state, Side::Left),
        right_formula: formula(state, Side::Right),
    }
}

fn formula(state: &Seesaw, side: Side) -> String {
    let terms: Vec<String> = state
        .objects
        .iter()
        .filter(|o| o.side == side && o.torque_applied)
        .map(|o| format!("{}×{:.0}", o.weight, o.distance))
        .collect();

    if terms.is_empty() {
        String::from("-")
    } else {
        terms.join(" + ")
    }
}
