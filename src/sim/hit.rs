//! Pointer hit-testing and drop placement
//!
//! Pointer coordinates arrive relative to the scene center. They are rotated
//! back into plank-local space with the current tilt, so the clickable area
//! follows the plank as it moves.

use super::object::DroppedObject;
use super::state::{Seesaw, SimEvent};
use crate::config::SeesawConfig;
use crate::consts::{DEAD_ZONE_RADIUS, HIT_ABOVE_TOLERANCE, HIT_BELOW_MARGIN};
use crate::{inverse_rotate, to_radians};

/// Input events for a single seesaw, in scene-center-relative coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Move { x: f64, y: f64 },
    Click { x: f64, y: f64 },
    Leave,
}

/// Map a pointer position to a plank-local drop offset
///
/// Returns `None` when the point is off either end of the plank, inside the
/// dead zone around the pivot, or outside the vertical band around the
/// plank surface.
pub fn classify_point(
    rel_x: f64,
    rel_y: f64,
    angle_rad: f64,
    plank_width: f64,
    config: &SeesawConfig,
) -> Option<f64> {
    let local = inverse_rotate(rel_x, rel_y, angle_rad);

    if local.x.abs() > plank_width / 2.0 || local.x.abs() < DEAD_ZONE_RADIUS {
        return None;
    }

    let top = config.pivot_offset - (config.plank_height + HIT_ABOVE_TOLERANCE);
    let bottom = config.pivot_offset + config.plank_height + HIT_BELOW_MARGIN;
    if local.y < top || local.y > bottom {
        return None;
    }

    Some(local.x)
}

/// Route one pointer event to a seesaw. Inactive seesaws ignore input.
pub fn handle_pointer(state: &mut Seesaw, input: PointerInput, config: &SeesawConfig) {
    if !state.is_active() {
        return;
    }

    match input {
        PointerInput::Move { x, y } => {
            state.pending_offset = classify_at(state, x, y, config);
        }
        PointerInput::Click { x, y } => {
            // Prefer the previewed spot over a possibly stale click position
            let offset = state
                .pending_offset
                .or_else(|| classify_at(state, x, y, config));
            if let Some(offset) = offset {
                drop_at(state, offset, config);
            }
        }
        PointerInput::Leave => state.pending_offset = None,
    }
}

fn classify_at(state: &Seesaw, x: f64, y: f64, config: &SeesawConfig) -> Option<f64> {
    let angle = to_radians(state.balance.current_angle);
    classify_point(x, y, angle, state.plank_width, config)
}

/// Drop the next object at a plank-local offset
///
/// Uses the pending weight and preview color, then rolls fresh ones for the
/// following drop and clears the preview. Returns the new object's id, or
/// `None` for an offset in the dead zone or off the plank.
pub(crate) fn drop_at(state: &mut Seesaw, offset: f64, config: &SeesawConfig) -> Option<u32> {
    let distance = offset.abs();
    if !(distance >= DEAD_ZONE_RADIUS && distance <= state.plank_width / 2.0) {
        log::debug!("Seesaw {}: no drop at {offset}", state.id);
        return None;
    }

    let id = state.next_object_id();
    let weight = state.next_weight;
    let color = std::mem::take(&mut state.preview_color);
    let obj = DroppedObject::new(id, offset, weight, color, config);
    let side = obj.side;
    state.objects.push(obj);

    state.next_weight = state.roll_weight(config);
    state.preview_color = state.roll_color(config);
    state.pending_offset = None;

    state.log.push(format!("{}kg dropping on {} side...", weight, side.as_str()));
    state.emit(SimEvent::Dropped { id, weight, side });
    log::debug!(
        "Seesaw {}: dropped object {} ({}kg) at {:.1}",
        state.id,
        id,
        weight,
        offset
    );
    Some(id)
}
