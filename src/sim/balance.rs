//! Torque/balance model
//!
//! Accumulates per-side torque and weight and eases the plank angle toward
//! the tilt those torques imply.

use serde::{Deserialize, Serialize};

use crate::config::SeesawConfig;

/// Which half of the plank an object rests on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Negative offsets are left of the pivot, everything else right
    pub fn of(position: f64) -> Self {
        if position < 0.0 { Side::Left } else { Side::Right }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Side::Left),
            "right" => Some(Side::Right),
            _ => None,
        }
    }
}

/// Torque and tilt state of one plank
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    /// Current tilt in degrees (positive = right side down)
    pub current_angle: f64,
    pub left_torque: f64,
    pub right_torque: f64,
    pub left_weight: f64,
    pub right_weight: f64,
}

impl Balance {
    /// Add one landed object's contribution
    pub fn add_torque(&mut self, side: Side, weight: f64, distance: f64) {
        let torque = weight * distance;
        match side {
            Side::Left => {
                self.left_torque += torque;
                self.left_weight += weight;
            }
            Side::Right => {
                self.right_torque += torque;
                self.right_weight += weight;
            }
        }
    }

    /// Right torque minus left torque
    #[inline]
    pub fn net_torque(&self) -> f64 {
        self.right_torque - self.left_torque
    }

    /// Tilt the torques call for, clamped to the configured limit
    pub fn target_angle(&self, config: &SeesawConfig) -> f64 {
        (self.net_torque() / config.torque_divisor).clamp(-config.max_angle, config.max_angle)
    }

    /// Ease the current angle toward `target` (first-order low-pass)
    ///
    /// The result is clamped to the tilt limit as well, so an out-of-range
    /// starting angle (e.g. from a hand-edited save) is pulled back in.
    pub fn advance_angle(&mut self, target: f64, config: &SeesawConfig) {
        self.current_angle += (target - self.current_angle) * config.smoothing;
        self.current_angle = self
            .current_angle
            .clamp(-config.max_angle, config.max_angle);
    }

    /// One animation step toward the torque-implied tilt
    pub fn step(&mut self, config: &SeesawConfig) {
        let target = self.target_angle(config);
        self.advance_angle(target, config);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_side_of_position() {
        assert_eq!(Side::of(-0.5), Side::Left);
        assert_eq!(Side::of(0.0), Side::Right);
        assert_eq!(Side::of(42.0), Side::Right);
        assert_eq!(Side::from_str(Side::Left.as_str()), Some(Side::Left));
        assert_eq!(Side::from_str("middle"), None);
    }

    #[test]
    fn test_five_kg_at_hundred_clamps_to_max() {
        let config = SeesawConfig::default();
        let mut balance = Balance::default();
        balance.add_torque(Side::Right, 5.0, 100.0);

        assert_eq!(balance.right_torque, 500.0);
        assert_eq!(balance.right_weight, 5.0);
        assert_eq!(balance.left_torque, 0.0);
        assert_eq!(balance.target_angle(&config), 30.0);
    }

    #[test]
    fn test_balanced_torques_target_level() {
        let config = SeesawConfig::default();
        let mut balance = Balance::default();
        balance.add_torque(Side::Left, 4.0, 50.0);
        balance.add_torque(Side::Right, 2.0, 100.0);
        assert_eq!(balance.target_angle(&config), 0.0);
        assert_eq!(balance.left_weight, 4.0);
        assert_eq!(balance.right_weight, 2.0);
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let mut balance = Balance::default();
        balance.add_torque(Side::Left, 3.0, 30.0);
        balance.current_angle = -4.0;
        balance.reset();
        assert_eq!(balance, Balance::default());
    }

    #[test]
    fn test_advance_pulls_out_of_range_angle_back() {
        let config = SeesawConfig::default();
        let mut balance = Balance {
            current_angle: 80.0,
            ..Default::default()
        };
        balance.advance_angle(0.0, &config);
        assert!(balance.current_angle <= config.max_angle);
    }

    fn arb_drop() -> impl Strategy<Value = (bool, f64, f64)> {
        (any::<bool>(), 1.0..10.0_f64, 10.0..500.0_f64)
    }

    proptest! {
        #[test]
        fn torque_sums_match_drops(drops in prop::collection::vec(arb_drop(), 0..40)) {
            let config = SeesawConfig::default();
            let mut balance = Balance::default();
            let (mut left, mut right, mut left_w, mut right_w) = (0.0, 0.0, 0.0, 0.0);

            for &(is_left, weight, distance) in &drops {
                let side = if is_left { Side::Left } else { Side::Right };
                balance.add_torque(side, weight, distance);
                if is_left {
                    left += weight * distance;
                    left_w += weight;
                } else {
                    right += weight * distance;
                    right_w += weight;
                }
            }

            prop_assert!((balance.left_torque - left).abs() < 1e-6);
            prop_assert!((balance.right_torque - right).abs() < 1e-6);
            prop_assert!((balance.left_weight - left_w).abs() < 1e-6);
            prop_assert!((balance.right_weight - right_w).abs() < 1e-6);

            let expected = ((right - left) / config.torque_divisor)
                .clamp(-config.max_angle, config.max_angle);
            prop_assert!((balance.target_angle(&config) - expected).abs() < 1e-6);
        }

        #[test]
        fn advance_converges_without_overshoot(
            start in -30.0..30.0_f64,
            target in -30.0..30.0_f64,
        ) {
            let config = SeesawConfig::default();
            let mut balance = Balance { current_angle: start, ..Default::default() };
            let mut gap = (target - start).abs();

            for _ in 0..400 {
                let before = balance.current_angle;
                balance.advance_angle(target, &config);
                let new_gap = (target - balance.current_angle).abs();
                // Never crosses the target
                prop_assert!((before - target) * (balance.current_angle - target) >= 0.0);
                if gap > 1e-9 {
                    prop_assert!(new_gap < gap);
                }
                gap = new_gap;
            }
            prop_assert!(gap < 1e-6);
        }
    }
}
