//! Lookahead cornering planner.
//!
//! Buffers a window of waypoints, limits the speed at each junction by the
//! turn angle, and propagates acceleration limits backward and forward so
//! every committed segment can be executed and stopped from.

mod cornering;
mod lookahead;
mod window;

pub use cornering::{chord, corner_cosine, corner_velocity};
pub use lookahead::LookaheadPlanner;
