//! Lookahead planner settings.

use serde::Deserialize;

/// Default number of waypoints held in the lookahead window.
pub const DEFAULT_LOOKAHEAD: usize = 7;

/// Smallest usable window: previous, current and next waypoint.
pub const MIN_LOOKAHEAD: usize = 3;

/// Ring capacity of the lookahead window.
pub const MAX_LOOKAHEAD: usize = 64;

/// Lookahead planner settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PlannerConfig {
    /// Window depth (`nlook`); trades smoothness against reaction latency.
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,
}

fn default_lookahead() -> usize {
    DEFAULT_LOOKAHEAD
}

impl PlannerConfig {
    /// Check that the depth fits the window ring.
    pub fn is_valid(&self) -> bool {
        (MIN_LOOKAHEAD..=MAX_LOOKAHEAD).contains(&self.lookahead)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            lookahead: default_lookahead(),
        }
    }
}
