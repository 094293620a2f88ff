//! Configuration module for stepcode.
//!
//! Provides types for loading and validating machine limits, step timing,
//! lookahead depth and flow control from TOML files (with `std` feature) or
//! pre-built values.

mod constraints;
mod flow;
mod limits;
mod planner;
mod stepper;
mod system;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use constraints::PlanningConstraints;
pub use flow::FlowConfig;
pub use limits::MotionLimits;
pub use planner::{PlannerConfig, DEFAULT_LOOKAHEAD, MAX_LOOKAHEAD, MIN_LOOKAHEAD};
pub use stepper::StepperConfig;
pub use system::SystemConfig;
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Acceleration, Hertz, Length, Microsteps, Steps, Velocity};
