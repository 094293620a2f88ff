//! Unit tests for TOML configuration parsing.

use stepcode::config::{parse_config, Microsteps, SystemConfig};

/// An empty document yields the reference machine.
#[test]
fn test_parse_defaults() {
    let config: SystemConfig = toml::from_str("").expect("Failed to parse TOML");

    assert_eq!(config.motion.max_velocity.value(), 2.0);
    assert_eq!(config.motion.max_acceleration.value(), 1.0);
    assert_eq!(config.stepper.resolution.value(), 0.001);
    assert_eq!(config.stepper.update_frequency.value(), 19500.0);
    assert_eq!(config.stepper.microsteps, None);
    assert_eq!(config.planner.lookahead, 7);
    assert_eq!(config.flow.queue_capacity, 600);
}

/// Partial tables keep defaults for the missing keys.
#[test]
fn test_parse_partial_tables() {
    let toml_str = r#"
[motion]
max_velocity = 1.0

[flow]
high_water = 300
"#;

    let config = parse_config(toml_str).expect("valid config");
    assert_eq!(config.motion.max_velocity.value(), 1.0);
    assert_eq!(config.motion.max_acceleration.value(), 1.0);
    assert_eq!(config.flow.high_water, 300);
    assert_eq!(config.flow.low_water, 200);
}

/// Every supported microstep divisor parses.
#[test]
fn test_parse_microsteps() {
    for (value, code) in [(1u16, 0u8), (2, 1), (4, 2), (8, 3), (16, 7)] {
        let toml_str = format!("[stepper]\nmicrosteps = {}\n", value);
        let config = parse_config(&toml_str).expect("valid microsteps");
        let microsteps = config.stepper.microsteps.expect("microsteps set");
        assert_eq!(microsteps, Microsteps::new(value).unwrap());
        assert_eq!(microsteps.mode_code(), code);
    }
}

/// Type errors are reported as parse errors.
#[test]
fn test_parse_type_error() {
    let toml_str = r#"
[planner]
lookahead = "deep"
"#;

    let err = parse_config(toml_str).unwrap_err();
    let text = format!("{}", err);
    assert!(text.starts_with("Configuration error: Parse error"));
}
