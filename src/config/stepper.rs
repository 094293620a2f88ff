//! Step generation settings: resolution, consumer tick rate, microstepping.

use serde::Deserialize;

use super::units::{Hertz, Length, Microsteps};

/// Default step size in machine units.
pub const DEFAULT_RESOLUTION: f64 = 0.001;

/// Default pulse consumer interrupt rate.
pub const DEFAULT_UPDATE_FREQUENCY: f64 = 19500.0;

/// Default minimum consumer ticks between two steps at `vmax`.
pub const DEFAULT_MIN_TICKS_PER_STEP: f64 = 4.0;

/// Default fraction of a step at which an axis counts as arrived.
pub const DEFAULT_COMPLETION_THRESHOLD: f64 = 0.5;

/// Default upper bound on a single computed delay.
pub const DEFAULT_MAX_DELAY_TICKS: u32 = 5000;

/// Settings for turning a planned path into step pulses.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StepperConfig {
    /// Distance travelled by one step pulse (`res`).
    #[serde(default = "default_resolution")]
    pub resolution: Length,

    /// Fixed tick rate of the pulse consumer (`fupdate`).
    #[serde(default = "default_update_frequency")]
    pub update_frequency: Hertz,

    /// Schedulability threshold for `fupdate / (vmax / res)`.
    #[serde(default = "default_min_ticks_per_step")]
    pub min_ticks_per_step: f64,

    /// Fraction of a step short of the endpoint at which an axis stops.
    ///
    /// 0.5 rounds to the nearest step; smaller values lean toward passing
    /// the endpoint. Must lie strictly between 0 and 1.
    #[serde(default = "default_completion_threshold")]
    pub completion_threshold: f64,

    /// Clamp for a single inter-step delay, in ticks.
    #[serde(default = "default_max_delay_ticks")]
    pub max_delay_ticks: u32,

    /// Microstep mode sent to the consumer before the first segment.
    #[serde(default)]
    pub microsteps: Option<Microsteps>,
}

fn default_resolution() -> Length {
    Length(DEFAULT_RESOLUTION)
}

fn default_update_frequency() -> Hertz {
    Hertz(DEFAULT_UPDATE_FREQUENCY)
}

fn default_min_ticks_per_step() -> f64 {
    DEFAULT_MIN_TICKS_PER_STEP
}

fn default_completion_threshold() -> f64 {
    DEFAULT_COMPLETION_THRESHOLD
}

fn default_max_delay_ticks() -> u32 {
    DEFAULT_MAX_DELAY_TICKS
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            update_frequency: default_update_frequency(),
            min_ticks_per_step: default_min_ticks_per_step(),
            completion_threshold: default_completion_threshold(),
            max_delay_ticks: default_max_delay_ticks(),
            microsteps: None,
        }
    }
}
