//! Planned path segments.

use libm::sqrt;

use crate::config::PlanningConstraints;

use super::waypoint::{Waypoint, AXES};

/// One straight move between two waypoints with its boundary speeds.
///
/// Produced by the lookahead planner and consumed once by the interpolator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segment {
    /// Start point.
    pub start: Waypoint,
    /// End point.
    pub end: Waypoint,
    /// Euclidean length.
    pub length: f64,
    /// Speed when leaving `start`.
    pub start_velocity: f64,
    /// Speed when arriving at `end`.
    pub end_velocity: f64,
}

impl Segment {
    /// Create a segment, computing its length from the endpoints.
    pub fn new(start: Waypoint, end: Waypoint, start_velocity: f64, end_velocity: f64) -> Self {
        Self {
            start,
            end,
            length: start.distance_to(&end),
            start_velocity,
            end_velocity,
        }
    }

    /// Decelerate at `amax` from `velocity`, heading from `from` to `to`.
    ///
    /// Comes to rest before `to` when there is room. Otherwise the segment
    /// runs all the way to `to` and its end velocity is the speed still
    /// left, to be shed on the following segment.
    pub fn braking(from: Waypoint, to: Waypoint, velocity: f64, constraints: &PlanningConstraints) -> Self {
        let toward = Self::new(from, to, velocity, 0.0);
        let stopping = constraints.stopping_distance(velocity);
        if stopping <= toward.length {
            let end = from.offset(&toward.direction(), stopping);
            return Self::new(from, end, velocity, 0.0);
        }

        let left = velocity * velocity - 2.0 * constraints.max_acceleration * toward.length;
        Self::new(from, to, velocity, sqrt(left.max(0.0)))
    }

    /// Zero-length segments produce no motion.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.length > 0.0)
    }

    /// Unit direction vector, all zeros for a degenerate segment.
    pub fn direction(&self) -> [f64; AXES] {
        let mut unit = self.start.delta_to(&self.end);
        if self.is_degenerate() {
            return [0.0; AXES];
        }
        for c in unit.iter_mut() {
            *c /= self.length;
        }
        unit
    }
}
