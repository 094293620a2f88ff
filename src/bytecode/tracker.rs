//! Position tracking over a pulse stream.
//!
//! Replays DIR and STEP events the way the consumer drives its outputs and
//! keeps absolute per-axis step counts.

use crate::config::units::{Length, Steps};
use crate::motion::{Axis, Waypoint, AXES};

use super::event::{AxisMask, Event};

/// Absolute axis positions reconstructed from events.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionTracker {
    /// Position per axis, in steps from the stream origin
    steps: [Steps; AXES],
    /// Latched direction bits
    direction: AxisMask,
    /// Ticks elapsed, counting one per delay tick
    ticks: u64,
}

impl PositionTracker {
    /// Create a tracker at the origin.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker at a specific position.
    #[inline]
    pub fn at(steps: [Steps; AXES]) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    /// Apply one event.
    pub fn apply(&mut self, event: Event) {
        match event {
            Event::Dir(mask) => self.direction = mask,
            Event::Step(mask) => {
                for axis in mask.axes() {
                    let delta = if self.direction.contains(axis) { 1 } else { -1 };
                    self.move_steps(axis, delta);
                }
            }
            Event::Delay(n) => self.ticks += u64::from(n),
            Event::Mode(_) | Event::Stat(_) | Event::Spin(_) | Event::Unknown(_) => {}
        }
    }

    /// Apply every event of an iterator.
    pub fn apply_all<I: IntoIterator<Item = Event>>(&mut self, events: I) {
        for event in events {
            self.apply(event);
        }
    }

    /// Position of one axis in steps.
    #[inline]
    pub fn steps(&self, axis: Axis) -> Steps {
        self.steps[axis.index()]
    }

    /// Positions of all axes in steps.
    #[inline]
    pub fn all_steps(&self) -> [Steps; AXES] {
        self.steps
    }

    /// Position of one axis in machine units.
    #[inline]
    pub fn length(&self, axis: Axis, resolution: f64) -> Length {
        self.steps(axis).to_length(resolution)
    }

    /// Current position as a waypoint.
    pub fn waypoint(&self, resolution: f64) -> Waypoint {
        Waypoint::from_coords(self.steps.map(|s| s.to_length(resolution).value()))
    }

    /// Delay ticks seen so far.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Move an axis by a number of steps.
    #[inline]
    pub fn move_steps(&mut self, axis: Axis, delta: i64) {
        let s = &mut self.steps[axis.index()];
        *s = *s + Steps(delta);
    }

    /// Set current position as the new origin.
    #[inline]
    pub fn set_origin(&mut self) {
        self.steps = [Steps::default(); AXES];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracks_direction() {
        let mut tracker = PositionTracker::new();
        let x = AxisMask::of(Axis::X);
        let xy = x.with(Axis::Y);

        tracker.apply_all([
            Event::Dir(x),
            Event::Step(xy),
            Event::Delay(10),
            Event::Step(xy),
            Event::Dir(AxisMask::EMPTY),
            Event::Step(x),
        ]);

        assert_eq!(tracker.steps(Axis::X), Steps(1));
        assert_eq!(tracker.steps(Axis::Y), Steps(-2));
        assert_eq!(tracker.ticks(), 10);
    }

    #[test]
    fn test_waypoint_conversion() {
        let tracker = PositionTracker::at([Steps(1000), Steps(-500), Steps(0), Steps(0)]);
        let wp = tracker.waypoint(0.001);
        assert!((wp.coord(Axis::X) - 1.0).abs() < 1e-12);
        assert!((wp.coord(Axis::Y) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_set_origin() {
        let mut tracker = PositionTracker::at([Steps(3); AXES]);
        tracker.set_origin();
        assert_eq!(tracker.all_steps(), [Steps(0); AXES]);
    }
}
