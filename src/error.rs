//! Error types for stepcode.
//!
//! Provides unified error handling across configuration, waypoint input,
//! lookahead planning and the output byte stream.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepcode operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Waypoint input error
    Input(InputError),
    /// Lookahead planner error
    Planner(PlannerError),
    /// Output stream error
    Stream(StreamError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid microstep value (must be one of 1, 2, 4, 8, 16)
    InvalidMicrosteps(u16),
    /// Invalid max velocity (must be > 0)
    InvalidMaxVelocity(f64),
    /// Invalid max acceleration (must be > 0)
    InvalidMaxAcceleration(f64),
    /// Invalid step resolution (must be > 0)
    InvalidResolution(f64),
    /// Invalid consumer update frequency (must be > 0)
    InvalidUpdateFrequency(f64),
    /// Invalid axis completion threshold (must be in (0, 1))
    InvalidCompletionThreshold(f64),
    /// Invalid delay clamp (must be >= 1 tick)
    InvalidMaxDelay(u32),
    /// Lookahead depth outside the supported range
    InvalidLookahead {
        /// Requested depth
        depth: usize,
        /// Smallest supported depth
        min: usize,
        /// Largest supported depth
        max: usize,
    },
    /// Flow-control water marks are inconsistent with the queue capacity
    InvalidWaterMarks {
        /// Resume threshold
        low: usize,
        /// Pause threshold
        high: usize,
        /// Consumer queue capacity
        capacity: usize,
    },
    /// Requested motion cannot be scheduled at the consumer tick rate
    Unschedulable {
        /// Consumer ticks between steps at maximum velocity
        ticks_per_step: f64,
        /// Required minimum
        minimum: f64,
    },
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Waypoint input errors.
///
/// These are recoverable: the record is skipped and counted.
#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    /// Record could not be parsed as 2 to 4 numbers
    MalformedRecord {
        /// 1-based input line number
        line: usize,
    },
    /// Reading the input source failed (std only)
    #[cfg(feature = "std")]
    Read(heapless::String<128>),
}

/// Lookahead planner errors.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannerError {
    /// Waypoints were pushed faster than segments were planned
    WindowFull {
        /// Ring capacity
        capacity: usize,
    },
    /// Lookahead depth outside the supported range
    InvalidDepth(usize),
    /// Waypoint pushed after end of input was signalled
    Finished,
}

/// Output stream errors.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// Consumer stopped draining its queue
    Stalled {
        /// Bytes still queued when the producer gave up
        pending: usize,
    },
    /// Transport refused the byte
    Closed,
    /// Transport I/O failure (std only)
    #[cfg(feature = "std")]
    Io(heapless::String<128>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Input(e) => write!(f, "Input error: {}", e),
            Error::Planner(e) => write!(f, "Planner error: {}", e),
            Error::Stream(e) => write!(f, "Stream error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidMicrosteps(v) => {
                write!(f, "Invalid microsteps: {}. Valid values: 1, 2, 4, 8, 16", v)
            }
            ConfigError::InvalidMaxVelocity(v) => write!(f, "Invalid max velocity: {}. Must be > 0", v),
            ConfigError::InvalidMaxAcceleration(v) => {
                write!(f, "Invalid max acceleration: {}. Must be > 0", v)
            }
            ConfigError::InvalidResolution(v) => write!(f, "Invalid step resolution: {}. Must be > 0", v),
            ConfigError::InvalidUpdateFrequency(v) => {
                write!(f, "Invalid update frequency: {}. Must be > 0", v)
            }
            ConfigError::InvalidCompletionThreshold(v) => {
                write!(f, "Invalid completion threshold: {}. Must be in (0, 1)", v)
            }
            ConfigError::InvalidMaxDelay(v) => write!(f, "Invalid max delay: {} ticks. Must be >= 1", v),
            ConfigError::InvalidLookahead { depth, min, max } => {
                write!(f, "Invalid lookahead {}: must be {}..={}", depth, min, max)
            }
            ConfigError::InvalidWaterMarks { low, high, capacity } => write!(
                f,
                "Invalid water marks: need low ({}) < high ({}) <= capacity ({})",
                low, high, capacity
            ),
            ConfigError::Unschedulable { ticks_per_step, minimum } => write!(
                f,
                "Exceeded maximum allowable velocity: {} ticks per step (must be >= {})",
                ticks_per_step, minimum
            ),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::MalformedRecord { line } => write!(f, "Malformed record on line {}", line),
            #[cfg(feature = "std")]
            InputError::Read(msg) => write!(f, "Read error: {}", msg),
        }
    }
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::WindowFull { capacity } => {
                write!(f, "Lookahead window full ({} entries), plan before pushing", capacity)
            }
            PlannerError::InvalidDepth(depth) => write!(f, "Invalid lookahead depth: {}", depth),
            PlannerError::Finished => write!(f, "Waypoint pushed after end of input"),
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Stalled { pending } => {
                write!(f, "Consumer stalled with {} bytes pending", pending)
            }
            StreamError::Closed => write!(f, "Transport closed"),
            #[cfg(feature = "std")]
            StreamError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<InputError> for Error {
    fn from(e: InputError) -> Self {
        Error::Input(e)
    }
}

impl From<PlannerError> for Error {
    fn from(e: PlannerError) -> Self {
        Error::Planner(e)
    }
}

impl From<StreamError> for Error {
    fn from(e: StreamError) -> Self {
        Error::Stream(e)
    }
}

/// Truncate a message into a fixed-capacity error string.
pub(crate) fn message<const N: usize>(text: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for InputError {}

#[cfg(feature = "std")]
impl std::error::Error for PlannerError {}

#[cfg(feature = "std")]
impl std::error::Error for StreamError {}
