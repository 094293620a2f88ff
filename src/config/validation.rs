//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::planner::{MAX_LOOKAHEAD, MIN_LOOKAHEAD};
use super::SystemConfig;

/// Validate a system configuration.
///
/// Checks:
/// - Velocity, acceleration, resolution and tick rate are positive
/// - Lookahead depth fits the window ring
/// - Completion threshold and delay clamp are usable
/// - Flow-control water marks are ordered
/// - The consumer can keep up with `vmax` (`fupdate / (vmax/res)`)
///
/// Nothing is emitted before this succeeds.
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    validate_motion(config)?;
    validate_stepper(config)?;

    if !config.planner.is_valid() {
        return Err(Error::Config(ConfigError::InvalidLookahead {
            depth: config.planner.lookahead,
            min: MIN_LOOKAHEAD,
            max: MAX_LOOKAHEAD,
        }));
    }

    if !config.flow.is_valid() {
        return Err(Error::Config(ConfigError::InvalidWaterMarks {
            low: config.flow.low_water,
            high: config.flow.high_water,
            capacity: config.flow.queue_capacity,
        }));
    }

    validate_schedulable(config)
}

fn validate_motion(config: &SystemConfig) -> Result<()> {
    let motion = &config.motion;

    // Max velocity must be positive
    if !(motion.max_velocity.0 > 0.0) || !motion.max_velocity.0.is_finite() {
        return Err(Error::Config(ConfigError::InvalidMaxVelocity(
            motion.max_velocity.0,
        )));
    }

    // Max acceleration must be positive
    if !(motion.max_acceleration.0 > 0.0) || !motion.max_acceleration.0.is_finite() {
        return Err(Error::Config(ConfigError::InvalidMaxAcceleration(
            motion.max_acceleration.0,
        )));
    }

    Ok(())
}

fn validate_stepper(config: &SystemConfig) -> Result<()> {
    let stepper = &config.stepper;

    if !(stepper.resolution.0 > 0.0) || !stepper.resolution.0.is_finite() {
        return Err(Error::Config(ConfigError::InvalidResolution(
            stepper.resolution.0,
        )));
    }

    if !(stepper.update_frequency.0 > 0.0) || !stepper.update_frequency.0.is_finite() {
        return Err(Error::Config(ConfigError::InvalidUpdateFrequency(
            stepper.update_frequency.0,
        )));
    }

    let threshold = stepper.completion_threshold;
    if !(threshold > 0.0 && threshold < 1.0) {
        return Err(Error::Config(ConfigError::InvalidCompletionThreshold(
            stepper.completion_threshold,
        )));
    }

    if stepper.max_delay_ticks == 0 {
        return Err(Error::Config(ConfigError::InvalidMaxDelay(
            stepper.max_delay_ticks,
        )));
    }

    Ok(())
}

fn validate_schedulable(config: &SystemConfig) -> Result<()> {
    let ticks_per_step = config.ticks_per_step();
    let minimum = config.stepper.min_ticks_per_step;

    debug!("{} min ticks per step at vmax", ticks_per_step);

    if ticks_per_step < minimum {
        return Err(Error::Config(ConfigError::Unschedulable {
            ticks_per_step,
            minimum,
        }));
    }

    Ok(())
}
