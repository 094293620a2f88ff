//! Segment velocity profile.
//!
//! Trapezoidal (or degenerate triangular) speed law over one segment with
//! independent entry and exit speeds, and the inverse distance→time map
//! used to place step pulses.

use libm::{fabs, sqrt};

use crate::config::PlanningConstraints;

use super::segment::Segment;

/// Direction of travel along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Coordinate increases (DIR bit set).
    Increasing,
    /// Coordinate decreases (DIR bit clear).
    Decreasing,
}

impl Direction {
    /// Get direction from a signed axis delta.
    #[inline]
    pub fn from_delta(delta: f64) -> Self {
        if delta >= 0.0 {
            Direction::Increasing
        } else {
            Direction::Decreasing
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Increasing => 1,
            Direction::Decreasing => -1,
        }
    }
}

/// Phase of the speed law at a point of the segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionPhase {
    /// Ramping up from the entry speed toward the peak.
    Accelerating,
    /// Moving at the peak speed.
    Cruising,
    /// Ramping down toward the exit speed.
    Decelerating,
    /// End of segment reached.
    Complete,
}

/// Computed velocity profile for one segment.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VelocityProfile {
    /// Segment length.
    pub length: f64,

    /// Entry speed.
    pub start_velocity: f64,

    /// Exit speed.
    pub end_velocity: f64,

    /// Peak speed reached (`vm`), never above `vmax`.
    pub peak_velocity: f64,

    /// Acceleration used on both ramps.
    pub acceleration: f64,

    /// Ramp-up distance (`s1`).
    pub accel_distance: f64,

    /// Cruise distance (`s2`).
    pub cruise_distance: f64,

    /// Ramp-down distance (`s3`).
    pub decel_distance: f64,

    /// Time to reach `s1` (`ts1`).
    pub accel_time: f64,

    /// Time to reach `s1 + s2` (`ts2`).
    pub cruise_end_time: f64,
}

impl VelocityProfile {
    /// Create a profile for a segment of length `length`.
    ///
    /// # Arguments
    ///
    /// * `length` - Segment length (>= 0)
    /// * `start_velocity` - Entry speed
    /// * `end_velocity` - Exit speed
    /// * `max_velocity` - Speed limit (`vmax`)
    /// * `acceleration` - Acceleration limit (`amax`, > 0)
    /// * `resolution` - Step size; ramps shorter than `resolution / 100` are dropped
    pub fn new(
        length: f64,
        start_velocity: f64,
        end_velocity: f64,
        max_velocity: f64,
        acceleration: f64,
        resolution: f64,
    ) -> Self {
        if !(length > 0.0) || !(acceleration > 0.0) {
            return Self::zero();
        }

        let vs = start_velocity.max(0.0);
        let ve = end_velocity.max(0.0);
        let a = acceleration;
        let tiny = resolution / 100.0;

        // Peak speed: the triangle apex, capped by vmax
        let apex = sqrt((vs * vs + ve * ve + 2.0 * a * length) / 2.0);
        let vm = apex.min(max_velocity);
        if !(vm > 0.0) {
            return Self {
                length,
                ..Self::zero()
            };
        }

        let accel_distance = suppress_tiny((vm * vm - vs * vs) / (2.0 * a), tiny);
        let decel_distance = suppress_tiny((vm * vm - ve * ve) / (2.0 * a), tiny);
        let cruise_distance = suppress_tiny(length - accel_distance - decel_distance, tiny);

        let accel_time = (sqrt(vs * vs + 2.0 * a * accel_distance) - vs) / a;
        let cruise_end_time = accel_time + cruise_distance / vm;

        Self {
            length,
            start_velocity: vs,
            end_velocity: ve,
            peak_velocity: vm,
            acceleration: a,
            accel_distance,
            cruise_distance,
            decel_distance,
            accel_time,
            cruise_end_time,
        }
    }

    /// Create the profile of a planned segment.
    pub fn for_segment(segment: &Segment, constraints: &PlanningConstraints) -> Self {
        Self::new(
            segment.length,
            segment.start_velocity,
            segment.end_velocity,
            constraints.max_velocity,
            constraints.max_acceleration,
            constraints.resolution,
        )
    }

    /// Create a zero-length profile (no motion).
    pub fn zero() -> Self {
        Self {
            length: 0.0,
            start_velocity: 0.0,
            end_velocity: 0.0,
            peak_velocity: 0.0,
            acceleration: 0.0,
            accel_distance: 0.0,
            cruise_distance: 0.0,
            decel_distance: 0.0,
            accel_time: 0.0,
            cruise_end_time: 0.0,
        }
    }

    /// Check if this profile moves nothing (zero length or zero peak speed).
    #[inline]
    pub fn is_zero(&self) -> bool {
        !(self.length > 0.0) || !(self.peak_velocity > 0.0)
    }

    /// Elapsed time when `alpha` of the segment length has been covered.
    ///
    /// `alpha` is clamped into `[0, 1]`; there is no extrapolation past the
    /// segment end.
    pub fn time_at_fraction(&self, alpha: f64) -> f64 {
        if self.is_zero() {
            return 0.0;
        }

        let d = clamp_fraction(alpha) * self.length;
        let a = self.acceleration;
        let vs = self.start_velocity;
        let vm = self.peak_velocity;

        if d < self.accel_distance {
            ((sqrt(vs * vs + 2.0 * a * d) - vs) / a).max(0.0)
        } else if d < self.accel_distance + self.cruise_distance {
            (self.accel_time + (d - self.accel_distance) / vm).min(self.cruise_end_time)
        } else {
            let into_ramp = (d - self.accel_distance - self.cruise_distance).max(0.0);
            // rounding can push the radicand just below zero at the endpoint
            let remaining = (vm * vm - 2.0 * a * into_ramp).max(0.0);
            self.cruise_end_time + (vm - sqrt(remaining)) / a
        }
    }

    /// Total duration of the segment.
    #[inline]
    pub fn total_time(&self) -> f64 {
        self.time_at_fraction(1.0)
    }

    /// Instantaneous speed after `alpha` of the segment has been covered.
    pub fn velocity_at_fraction(&self, alpha: f64) -> f64 {
        if self.is_zero() {
            return 0.0;
        }

        let d = clamp_fraction(alpha) * self.length;
        let a = self.acceleration;
        let vs = self.start_velocity;
        let vm = self.peak_velocity;

        if d < self.accel_distance {
            sqrt(vs * vs + 2.0 * a * d)
        } else if d < self.accel_distance + self.cruise_distance {
            vm
        } else {
            let into_ramp = (d - self.accel_distance - self.cruise_distance).max(0.0);
            sqrt((vm * vm - 2.0 * a * into_ramp).max(0.0))
        }
    }

    /// Get the phase at a fraction of the segment.
    pub fn phase_at(&self, alpha: f64) -> MotionPhase {
        if self.is_zero() || alpha >= 1.0 {
            return MotionPhase::Complete;
        }

        let d = clamp_fraction(alpha) * self.length;
        if d < self.accel_distance {
            MotionPhase::Accelerating
        } else if d < self.accel_distance + self.cruise_distance {
            MotionPhase::Cruising
        } else {
            MotionPhase::Decelerating
        }
    }
}

fn suppress_tiny(distance: f64, tiny: f64) -> f64 {
    if fabs(distance) < tiny {
        0.0
    } else {
        distance.max(0.0)
    }
}

fn clamp_fraction(alpha: f64) -> f64 {
    if alpha > 1.0 {
        1.0
    } else if alpha > 0.0 {
        alpha
    } else {
        0.0
    }
}
