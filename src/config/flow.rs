//! Flow-control settings for the consumer byte queue.

use serde::Deserialize;

/// Consumer queue size of the reference firmware.
pub const DEFAULT_QUEUE_CAPACITY: usize = 600;

/// Depth at which the producer pauses.
pub const DEFAULT_HIGH_WATER: usize = 400;

/// Depth at which a paused producer resumes.
pub const DEFAULT_LOW_WATER: usize = 200;

/// Backpressure polling period.
pub const DEFAULT_POLL_INTERVAL_US: u32 = 500;

/// Consecutive polls without progress before the consumer counts as stalled.
pub const DEFAULT_MAX_STALL_POLLS: u32 = 20_000;

/// High/low water mark flow control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FlowConfig {
    /// Capacity of the consumer queue in bytes.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Pause emission once this many bytes are pending.
    #[serde(default = "default_high_water")]
    pub high_water: usize,

    /// Resume emission once pending bytes drop to this level.
    #[serde(default = "default_low_water")]
    pub low_water: usize,

    /// Sleep between two queue-depth polls while paused.
    #[serde(default = "default_poll_interval_us")]
    pub poll_interval_us: u32,

    /// Give up after this many polls without the queue draining.
    #[serde(default = "default_max_stall_polls")]
    pub max_stall_polls: u32,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_high_water() -> usize {
    DEFAULT_HIGH_WATER
}

fn default_low_water() -> usize {
    DEFAULT_LOW_WATER
}

fn default_poll_interval_us() -> u32 {
    DEFAULT_POLL_INTERVAL_US
}

fn default_max_stall_polls() -> u32 {
    DEFAULT_MAX_STALL_POLLS
}

impl FlowConfig {
    /// Check `low < high <= capacity`.
    pub fn is_valid(&self) -> bool {
        self.low_water < self.high_water && self.high_water <= self.queue_capacity
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            high_water: default_high_water(),
            low_water: default_low_water(),
            poll_interval_us: default_poll_interval_us(),
            max_stall_polls: default_max_stall_polls(),
        }
    }
}
