//! Path velocity and acceleration limits.

use serde::Deserialize;

use super::units::{Acceleration, Velocity};

/// Default velocity limit (units per second).
pub const DEFAULT_MAX_VELOCITY: f64 = 2.0;

/// Default acceleration limit (units per second squared).
pub const DEFAULT_MAX_ACCELERATION: f64 = 1.0;

/// Limits applied along the path, shared by every axis.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MotionLimits {
    /// Maximum path velocity (`vmax`).
    #[serde(default = "default_max_velocity")]
    pub max_velocity: Velocity,

    /// Maximum path acceleration (`amax`).
    #[serde(default = "default_max_acceleration")]
    pub max_acceleration: Acceleration,
}

fn default_max_velocity() -> Velocity {
    Velocity(DEFAULT_MAX_VELOCITY)
}

fn default_max_acceleration() -> Acceleration {
    Acceleration(DEFAULT_MAX_ACCELERATION)
}

impl MotionLimits {
    /// Create new motion limits.
    pub fn new(max_velocity: Velocity, max_acceleration: Acceleration) -> Self {
        Self {
            max_velocity,
            max_acceleration,
        }
    }
}

impl Default for MotionLimits {
    fn default() -> Self {
        Self::new(default_max_velocity(), default_max_acceleration())
    }
}
