//! Per-frame simulation tick
//!
//! Advances the plank angle, then every object's fall or bounce. Landing is
//! an explicit guarded transition (`land`) so torque is applied exactly once
//! per object no matter how often it is invoked.

use super::state::{Seesaw, SimEvent};
use crate::config::SeesawConfig;
use crate::to_radians;

/// Advance one seesaw by one animation frame
///
/// Inactive seesaws do not tick.
pub fn tick(state: &mut Seesaw, config: &SeesawConfig) {
    if !state.is_active() {
        return;
    }

    state.balance.step(config);
    let angle = to_radians(state.balance.current_angle);

    // Index loop: landing needs `&mut Seesaw` while we walk the objects
    for index in 0..state.objects.len() {
        if state.objects[index].fall(angle, config) {
            land(state, index);
        }
        if !state.objects[index].is_falling() {
            state.objects[index].decay_bounce(config);
        }
    }
}

/// Complete the landing of `objects[index]`
///
/// On the object's first landing this adds its torque to the totals, logs
/// it and emits `SimEvent::Landed`. Returns whether torque was applied.
pub fn land(state: &mut Seesaw, index: usize) -> bool {
    let Some(obj) = state.objects.get_mut(index) else {
        return false;
    };
    if !obj.settle() {
        return false;
    }

    let (id, side, weight, distance) = (obj.id, obj.side, obj.weight, obj.distance);
    state.balance.add_torque(side, weight, distance);
    state.log.push(format!(
        "{}kg landed on {} side at {:.0}px",
        weight,
        side.as_str(),
        distance
    ));
    state.emit(SimEvent::Landed {
        id,
        weight,
        side,
        distance,
    });
    log::debug!(
        "Seesaw {}: object {} landed ({}kg, {} side, {:.0}px)",
        state.id,
        id,
        weight,
        side.as_str(),
        distance
    );
    true
}
