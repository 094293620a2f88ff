//! Builder pattern for Engine.

use embedded_hal::delay::DelayNs;

use crate::config::units::{Acceleration, Hertz, Length, Microsteps, Velocity};
use crate::config::{FlowConfig, SystemConfig};
use crate::error::{message, ConfigError, Error, Result};

use super::Engine;

/// Builder for creating Engine instances without a TOML file.
///
/// Starts from the default machine and overrides individual settings.
pub struct EngineBuilder<D: DelayNs> {
    config: SystemConfig,
    delay: Option<D>,
}

impl<D: DelayNs> Default for EngineBuilder<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DelayNs> EngineBuilder<D> {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: SystemConfig::default(),
            delay: None,
        }
    }

    /// Set the delay provider used while waiting on the consumer.
    pub fn delay(mut self, delay: D) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: SystemConfig) -> Self {
        self.config = config;
        self
    }

    /// Set maximum path velocity.
    pub fn max_velocity(mut self, velocity: f64) -> Self {
        self.config.motion.max_velocity = Velocity(velocity);
        self
    }

    /// Set maximum path acceleration.
    pub fn max_acceleration(mut self, acceleration: f64) -> Self {
        self.config.motion.max_acceleration = Acceleration(acceleration);
        self
    }

    /// Set step resolution.
    pub fn resolution(mut self, resolution: f64) -> Self {
        self.config.stepper.resolution = Length(resolution);
        self
    }

    /// Set consumer tick rate.
    pub fn update_frequency(mut self, hz: f64) -> Self {
        self.config.stepper.update_frequency = Hertz(hz);
        self
    }

    /// Set axis completion threshold.
    pub fn completion_threshold(mut self, threshold: f64) -> Self {
        self.config.stepper.completion_threshold = threshold;
        self
    }

    /// Set the clamp for a single delay.
    pub fn max_delay_ticks(mut self, ticks: u32) -> Self {
        self.config.stepper.max_delay_ticks = ticks;
        self
    }

    /// Set microstep mode sent at stream start.
    pub fn microsteps(mut self, microsteps: Microsteps) -> Self {
        self.config.stepper.microsteps = Some(microsteps);
        self
    }

    /// Set lookahead depth.
    pub fn lookahead(mut self, depth: usize) -> Self {
        self.config.planner.lookahead = depth;
        self
    }

    /// Set flow-control thresholds.
    pub fn flow(mut self, flow: FlowConfig) -> Self {
        self.config.flow = flow;
        self
    }

    /// Build the Engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the delay is missing or the configuration fails
    /// validation.
    pub fn build(self) -> Result<Engine<D>> {
        let delay = self
            .delay
            .ok_or_else(|| Error::Config(ConfigError::ParseError(message("delay is required"))))?;

        Engine::new(&self.config, delay)
    }
}
