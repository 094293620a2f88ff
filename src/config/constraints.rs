//! Planning constraints derived from the system configuration.

use libm::round;

use super::system::SystemConfig;

/// Derived parameters shared by the planner, profiler and interpolator.
///
/// These are computed once at initialization and used for all motion planning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanningConstraints {
    /// Maximum path velocity (`vmax`).
    pub max_velocity: f64,

    /// Maximum path acceleration (`amax`).
    pub max_acceleration: f64,

    /// Step size (`res`).
    pub resolution: f64,

    /// Consumer tick rate (`fupdate`).
    pub update_frequency: f64,

    /// Consumer ticks between steps at `vmax`.
    pub ticks_per_step: f64,

    /// Chord deviation below which a corner needs no slowdown (`amax·res/vmax`).
    pub straight_threshold: f64,

    /// Fraction of a step short of the endpoint at which an axis stops.
    pub completion_threshold: f64,

    /// Clamp for a single encoded delay, in ticks.
    pub max_delay_ticks: u32,
}

impl PlanningConstraints {
    /// Compute planning constraints from configuration.
    pub fn from_config(config: &SystemConfig) -> Self {
        let max_velocity = config.motion.max_velocity.0;
        let max_acceleration = config.motion.max_acceleration.0;
        let resolution = config.stepper.resolution.0;

        Self {
            max_velocity,
            max_acceleration,
            resolution,
            update_frequency: config.stepper.update_frequency.0,
            ticks_per_step: config.ticks_per_step(),
            straight_threshold: max_acceleration * resolution / max_velocity,
            completion_threshold: config.stepper.completion_threshold,
            max_delay_ticks: config.stepper.max_delay_ticks,
        }
    }

    /// Convert elapsed seconds to the nearest consumer tick.
    #[inline]
    pub fn seconds_to_ticks(&self, seconds: f64) -> i64 {
        round(seconds * self.update_frequency) as i64
    }

    /// Convert a tick count back to seconds.
    #[inline]
    pub fn ticks_to_seconds(&self, ticks: i64) -> f64 {
        ticks as f64 / self.update_frequency
    }

    /// Distance needed to stop from `velocity` at `amax`.
    #[inline]
    pub fn stopping_distance(&self, velocity: f64) -> f64 {
        velocity * velocity / (2.0 * self.max_acceleration)
    }
}

impl Default for PlanningConstraints {
    fn default() -> Self {
        Self::from_config(&SystemConfig::default())
    }
}
