//! Motion module for stepcode.
//!
//! Waypoints and segments, the per-segment velocity profile, and the
//! interpolator that turns a segment into step events.

mod interpolator;
mod profile;
mod segment;
mod waypoint;

pub use interpolator::StepInterpolator;
pub use profile::{Direction, MotionPhase, VelocityProfile};
pub use segment::Segment;
pub use waypoint::{parse_record, Axis, Waypoint, AXES};

pub(crate) use waypoint::{dot, norm};
