//! Unit tests for configuration validation.

use stepcode::config::{validate_config, Acceleration, Hertz, Length, SystemConfig, Velocity};
use stepcode::error::{ConfigError, Error};

fn invalid(config: &SystemConfig) -> ConfigError {
    match validate_config(config) {
        Err(Error::Config(e)) => e,
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn test_non_positive_limits() {
    let mut config = SystemConfig::default();
    config.motion.max_velocity = Velocity(0.0);
    assert_eq!(invalid(&config), ConfigError::InvalidMaxVelocity(0.0));

    let mut config = SystemConfig::default();
    config.motion.max_acceleration = Acceleration(-1.0);
    assert_eq!(invalid(&config), ConfigError::InvalidMaxAcceleration(-1.0));

    let mut config = SystemConfig::default();
    config.motion.max_acceleration = Acceleration(f64::NAN);
    assert!(matches!(invalid(&config), ConfigError::InvalidMaxAcceleration(_)));

    let mut config = SystemConfig::default();
    config.stepper.update_frequency = Hertz(0.0);
    assert_eq!(invalid(&config), ConfigError::InvalidUpdateFrequency(0.0));
}

#[test]
fn test_nan_resolution() {
    let mut config = SystemConfig::default();
    config.stepper.resolution = Length(f64::NAN);
    assert!(matches!(invalid(&config), ConfigError::InvalidResolution(_)));
}

#[test]
fn test_completion_threshold_range() {
    let mut config = SystemConfig::default();
    config.stepper.completion_threshold = 0.25;
    assert!(validate_config(&config).is_ok());

    config.stepper.completion_threshold = 0.0;
    assert_eq!(invalid(&config), ConfigError::InvalidCompletionThreshold(0.0));

    config.stepper.completion_threshold = 1.0;
    assert_eq!(invalid(&config), ConfigError::InvalidCompletionThreshold(1.0));
}

#[test]
fn test_zero_max_delay() {
    let mut config = SystemConfig::default();
    config.stepper.max_delay_ticks = 0;
    assert_eq!(invalid(&config), ConfigError::InvalidMaxDelay(0));
}

#[test]
fn test_lookahead_bounds() {
    let mut config = SystemConfig::default();
    config.planner.lookahead = 3;
    assert!(validate_config(&config).is_ok());
    config.planner.lookahead = 64;
    assert!(validate_config(&config).is_ok());

    config.planner.lookahead = 65;
    assert_eq!(
        invalid(&config),
        ConfigError::InvalidLookahead {
            depth: 65,
            min: 3,
            max: 64
        }
    );
}

#[test]
fn test_water_marks_above_capacity() {
    let mut config = SystemConfig::default();
    config.flow.high_water = 700;
    assert_eq!(
        invalid(&config),
        ConfigError::InvalidWaterMarks {
            low: 200,
            high: 700,
            capacity: 600
        }
    );
}

#[test]
fn test_unschedulable_reports_ratio() {
    let mut config = SystemConfig::default();
    config.motion.max_velocity = Velocity(39.0);

    match invalid(&config) {
        ConfigError::Unschedulable {
            ticks_per_step,
            minimum,
        } => {
            assert!((ticks_per_step - 0.5).abs() < 1e-9);
            assert_eq!(minimum, 4.0);
        }
        other => panic!("unexpected {:?}", other),
    }
}
