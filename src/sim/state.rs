//! Seesaw state and core simulation types
//!
//! One `Seesaw` is one plank plus everything dropped on it. Everything that
//! must survive a reload is mirrored in `persistence::SeesawRecord`.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::balance::{Balance, Side};
use super::object::DroppedObject;
use super::plank::{RulerTick, ruler_ticks};
use crate::config::SeesawConfig;
use crate::consts::LOG_CAPACITY;

/// Side effects produced by the simulation, drained by the host
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// An object was created and started falling
    Dropped { id: u32, weight: f64, side: Side },
    /// An object reached the plank and its torque was applied
    Landed {
        id: u32,
        weight: f64,
        side: Side,
        distance: f64,
    },
    /// The seesaw was cleared
    Reset,
    /// The plank width changed
    WidthChanged { width: f64 },
}

/// User-facing activity log (newest first, bounded)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityLog {
    entries: VecDeque<String>,
}

impl ActivityLog {
    pub fn push(&mut self, message: impl Into<String>) {
        self.entries.push_front(message.into());
        self.entries.truncate(LOG_CAPACITY);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One seesaw simulation
#[derive(Debug, Clone)]
pub struct Seesaw {
    pub id: u32,
    pub name: String,
    pub plank_width: f64,
    pub balance: Balance,
    /// Weight the next dropped object will get
    pub next_weight: f64,
    pub object_id_counter: u32,
    /// Drop order
    pub objects: Vec<DroppedObject>,
    /// Color of the preview ghost and of the next dropped object
    pub preview_color: String,
    /// Lever-local offset under the pointer, if it is a valid drop spot
    pub pending_offset: Option<f64>,
    pub ruler: Vec<RulerTick>,
    pub log: ActivityLog,
    active: bool,
    rng: Pcg32,
    events: Vec<SimEvent>,
}

impl Seesaw {
    /// Create an empty seesaw
    pub fn new(id: u32, config: &SeesawConfig, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let next_weight = roll_weight(&mut rng, config);
        let preview_color = roll_color(&mut rng, config);

        Self {
            id,
            name: Self::default_name(id),
            plank_width: config.plank_width,
            balance: Balance::default(),
            next_weight,
            object_id_counter: 0,
            objects: Vec::new(),
            preview_color,
            pending_offset: None,
            ruler: ruler_ticks(config.plank_width),
            log: ActivityLog::default(),
            active: false,
            rng,
            events: Vec::new(),
        }
    }

    /// Label used when none was given
    pub fn default_name(id: u32) -> String {
        format!("Seesaw {}", u64::from(id) + 1)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start receiving input and ticks. No-op when already active.
    pub fn activate(&mut self) {
        if self.active {
            return;
        }
        self.active = true;
        log::info!("Seesaw {} activated", self.id);
    }

    /// Stop receiving input and ticks. No-op when already inactive.
    ///
    /// Objects still in the air are landed immediately so their torque is
    /// not lost while the seesaw is paused.
    pub fn deactivate(&mut self, config: &SeesawConfig) {
        if !self.active {
            return;
        }
        self.active = false;
        self.pending_offset = None;

        let angle = crate::to_radians(self.balance.current_angle);
        for index in 0..self.objects.len() {
            let obj = &mut self.objects[index];
            if obj.is_falling() {
                obj.fall_y = obj.rest_y(angle, config);
                obj.phase = super::object::ObjectPhase::Settling;
                super::tick::land(self, index);
            }
            let obj = &mut self.objects[index];
            obj.bounce_velocity = 0.0;
            obj.bounce_offset = 0.0;
        }
        log::info!("Seesaw {} deactivated", self.id);
    }

    /// Clear every object and all accumulated torque
    ///
    /// Keeps the id, name and plank width.
    pub fn reset(&mut self, config: &SeesawConfig) {
        self.objects.clear();
        self.balance.reset();
        self.pending_offset = None;
        self.next_weight = self.roll_weight(config);
        self.log.clear();
        self.log.push("Seesaw has been reset");
        self.events.push(SimEvent::Reset);
        log::info!("Seesaw {} reset", self.id);
    }

    /// Allocate a new object id
    pub fn next_object_id(&mut self) -> u32 {
        let id = self.object_id_counter;
        self.object_id_counter = self.object_id_counter.saturating_add(1);
        id
    }

    pub fn roll_weight(&mut self, config: &SeesawConfig) -> f64 {
        roll_weight(&mut self.rng, config)
    }

    pub fn roll_color(&mut self, config: &SeesawConfig) -> String {
        roll_color(&mut self.rng, config)
    }

    pub(crate) fn emit(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    /// Take all side effects produced since the last call
    pub fn take_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Sum of `weight * distance` over landed objects on one side
    pub fn landed_torque(&self, side: Side) -> f64 {
        self.objects
            .iter()
            .filter(|o| o.side == side && o.torque_applied)
            .map(|o| o.weight * o.distance)
            .sum()
    }

    /// Sum of weights over landed objects on one side
    pub fn landed_weight(&self, side: Side) -> f64 {
        self.objects
            .iter()
            .filter(|o| o.side == side && o.torque_applied)
            .map(|o| o.weight)
            .sum()
    }
}

/// Whole-kilogram weight within the configured range
fn roll_weight(rng: &mut Pcg32, config: &SeesawConfig) -> f64 {
    let max = config.max_weight.max(config.min_weight);
    f64::from(rng.random_range(config.min_weight..=max))
}

fn roll_color(rng: &mut Pcg32, config: &SeesawConfig) -> String {
    if config.colors.is_empty() {
        return String::from("#888888");
    }
    let index = rng.random_range(0..config.colors.len());
    config.colors[index].clone()
}
