//! System configuration - root configuration structure.

use serde::Deserialize;

use super::flow::FlowConfig;
use super::limits::MotionLimits;
use super::planner::PlannerConfig;
use super::stepper::StepperConfig;

/// Root configuration structure from TOML.
///
/// Every table is optional; missing values fall back to the defaults of
/// the reference machine.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SystemConfig {
    /// Path velocity and acceleration limits.
    #[serde(default)]
    pub motion: MotionLimits,

    /// Step resolution and consumer timing.
    #[serde(default)]
    pub stepper: StepperConfig,

    /// Lookahead depth.
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Consumer queue flow control.
    #[serde(default)]
    pub flow: FlowConfig,
}

impl SystemConfig {
    /// Consumer ticks between two steps when moving at `vmax`.
    pub fn ticks_per_step(&self) -> f64 {
        self.stepper.update_frequency.0
            / (self.motion.max_velocity.0 / self.stepper.resolution.0)
    }
}
