//! Seesaw simulation module
//!
//! All physics and interaction logic lives here. This module must stay pure:
//! - One explicit tick per animation frame
//! - Seeded RNG only
//! - No rendering, audio or storage dependencies (side effects leave as `SimEvent`s)

pub mod balance;
pub mod hit;
pub mod object;
pub mod plank;
pub mod state;
pub mod tick;
pub mod view;

pub use balance::{Balance, Side};
pub use hit::{PointerInput, classify_point, handle_pointer};
pub use object::{DroppedObject, ObjectPhase};
pub use plank::{RulerTick, min_plank_width, ruler_ticks, set_plank_width};
pub use state::{ActivityLog, Seesaw, SimEvent};
pub use tick::{land, tick};
pub use view::{Lean, ObjectView, PreviewView, SceneView, Stats, scene, stats};
