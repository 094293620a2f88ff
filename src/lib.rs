//! # stepcode
//!
//! Lookahead trajectory planning and byte-coded step generation for
//! multi-axis stepper machines.
//!
//! ## Features
//!
//! - **Lookahead cornering**: junction speeds bounded by turn angle and
//!   propagated over a window of upcoming waypoints
//! - **Trapezoidal profiles**: independent entry and exit speeds per segment
//! - **Step interpolation**: up to four axes (X, Y, Z, W) with coincident
//!   steps merged into one pulse
//! - **Compact protocol**: one byte per delay, direction, step or mode
//!   command for a fixed-rate pulse consumer
//! - **Flow control**: high/low water marks with an `embedded-hal` delay
//! - **no_std compatible**: everything but file and `io` adapters
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepcode::{Engine, WriteSink};
//!
//! let config = stepcode::load_config("machine.toml")?;
//! let mut engine = Engine::new(&config, delay)?;
//!
//! let input = std::io::BufReader::new(std::fs::File::open("path.txt")?);
//! let mut port = WriteSink::new(serial);
//! let summary = engine.run(input, &mut port)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): TOML files, `BufRead` input, `io::Write` sinks, `log`
//! - `defmt`: defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[macro_use]
mod fmt;

// Core modules
pub mod bytecode;
pub mod config;
pub mod engine;
pub mod error;
pub mod motion;
pub mod planner;
pub mod stream;

// Re-exports for ergonomic API
pub use bytecode::{AxisMask, Decoder, Encoder, Event, PositionTracker};
pub use config::{validate_config, PlanningConstraints, SystemConfig};
pub use engine::{Engine, EngineBuilder, RunSummary};
pub use error::{Error, Result};
pub use motion::{Axis, Segment, StepInterpolator, VelocityProfile, Waypoint};
pub use planner::LookaheadPlanner;
pub use stream::{ByteQueue, FlowControl, PulseSink};

// Configuration loading and io adapters (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};
#[cfg(feature = "std")]
pub use stream::WriteSink;

// Unit types
pub use config::units::{Microsteps, Steps};
