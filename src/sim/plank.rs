//! Plank width control and ruler marks

use serde::Serialize;

use super::object::DroppedObject;
use super::state::{Seesaw, SimEvent};
use crate::config::SeesawConfig;
use crate::consts::{RULER_INTERVAL, RULER_MAX_STEPS};

/// One mark on the ruler under the plank
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RulerTick {
    /// Plank-local offset
    pub position: f64,
    pub major: bool,
    pub center: bool,
    pub label: String,
}

/// Marks every `RULER_INTERVAL` plus both plank ends
///
/// At most `RULER_MAX_STEPS` interval marks are placed on each side.
pub fn ruler_ticks(plank_width: f64) -> Vec<RulerTick> {
    let half = plank_width / 2.0;
    let steps = ((half / RULER_INTERVAL).floor() as i64).clamp(0, RULER_MAX_STEPS);

    let mut positions: Vec<f64> = (-steps..=steps)
        .map(|i| i as f64 * RULER_INTERVAL)
        .collect();
    if !positions.contains(&-half) {
        positions.insert(0, -half);
    }
    if !positions.contains(&half) {
        positions.push(half);
    }

    positions
        .into_iter()
        .map(|position| {
            let center = position == 0.0;
            RulerTick {
                position,
                major: center || position.abs() == half,
                center,
                label: if center {
                    String::from("0")
                } else {
                    format!("{position}px")
                },
            }
        })
        .collect()
}

/// Narrowest plank that still supports every object
pub fn min_plank_width(objects: &[DroppedObject], config: &SeesawConfig) -> f64 {
    let farthest = objects
        .iter()
        .map(|o| o.position.abs())
        .fold(None, |max: Option<f64>, d| Some(max.map_or(d, |m| m.max(d))));

    match farthest {
        Some(distance) => config
            .min_plank_width
            .max(((distance + config.width_margin) * 2.0).ceil()),
        None => config.min_plank_width,
    }
}

/// Set the plank width, clamped to `[minimum, max_plank_width]`
///
/// The current minimum wins when objects sit beyond the configured maximum.
/// Regenerates the ruler and emits `WidthChanged`. Returns the stored width.
pub fn set_plank_width(state: &mut Seesaw, requested: f64, config: &SeesawConfig) -> f64 {
    let min_width = min_plank_width(&state.objects, config);
    let max_width = config.max_plank_width.max(min_width);
    let width = if requested.is_finite() {
        requested.clamp(min_width, max_width)
    } else {
        min_width
    };

    state.plank_width = width;
    state.ruler = ruler_ticks(width);
    state.emit(SimEvent::WidthChanged { width });
    log::debug!("Seesaw {}: plank width {}", state.id, width);
    width
}
