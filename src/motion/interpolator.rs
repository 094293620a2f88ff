//! Multi-axis step interpolation.
//!
//! Turns one planned segment into a lazily generated sequence of
//! [`Event`]s: a direction latch followed by delays and coincident step
//! masks. Steps land on absolute multiples of the resolution, counted from
//! the step position the machine has already reached, so rounding never
//! accumulates across steps or across segments.

use libm::{ceil, fabs, floor};

use crate::bytecode::{AxisMask, Event};
use crate::config::units::Steps;
use crate::config::PlanningConstraints;

use super::profile::{Direction, VelocityProfile};
use super::segment::Segment;
use super::waypoint::{Axis, Waypoint, AXES};

/// Fraction of a step treated as floating-point noise.
const NOISE_FLOOR: f64 = 1e-9;

/// Per-axis stepping state, in units of steps.
#[derive(Debug, Clone, Copy)]
struct AxisStepper {
    /// Absolute step position when the segment starts.
    origin: i64,
    /// Segment start on this axis.
    start: f64,
    /// Signed travel of the segment along this axis.
    travel: f64,
    direction: Direction,
    /// Steps to take in this segment.
    target: u64,
    /// Steps already emitted.
    steps: u64,
    /// Tick of the next step, once computed and not yet emitted.
    pending: Option<i64>,
}

impl AxisStepper {
    fn new(origin: i64, start: f64, end: f64, threshold: f64) -> Self {
        let travel = end - start;
        let threshold = threshold.max(NOISE_FLOOR);

        // The axis stops once within `threshold` of the end, approached
        // along the direction of travel.
        let goal = if fabs(travel) <= NOISE_FLOOR {
            origin
        } else if travel > 0.0 {
            ceil(end - threshold) as i64
        } else {
            floor(end + threshold) as i64
        };
        let remaining = goal - origin;

        Self {
            origin,
            start,
            travel,
            direction: Direction::from_delta(remaining as f64),
            target: remaining.unsigned_abs(),
            steps: 0,
            pending: None,
        }
    }

    #[inline]
    fn is_active(&self) -> bool {
        self.target > 0
    }

    #[inline]
    fn is_done(&self) -> bool {
        self.steps >= self.target
    }

    /// Signed step count.
    #[inline]
    fn signed_steps(&self) -> i64 {
        self.direction.sign() * self.steps as i64
    }

    /// Fraction of the segment at which the axis sits after `steps` steps.
    ///
    /// Falls outside `[0, 1]` when the origin lies slightly off the segment.
    fn alpha(&self, steps: u64) -> f64 {
        let at = self.origin + self.direction.sign() * steps as i64;
        (at as f64 - self.start) / self.travel
    }
}

/// Iterator over the pulse events of one segment.
///
/// Finite and single pass: it yields at most one `Dir`, then `Delay`/`Step`
/// pairs. The delay is omitted when a step lands on the tick of the
/// previous one.
#[derive(Debug, Clone)]
pub struct StepInterpolator {
    segment: Segment,
    profile: VelocityProfile,
    constraints: PlanningConstraints,
    axes: [AxisStepper; AXES],
    /// Tick of the last emitted step.
    last_tick: i64,
    /// Ticks carried from the previous segment, added to the first delay.
    lead_in: i64,
    /// Segment duration in ticks.
    total_ticks: i64,
    /// Step queued behind the delay just returned.
    queued: Option<Event>,
    dir_sent: bool,
    finished: bool,
}

impl StepInterpolator {
    /// Prepare the interpolation of `segment`, starting from the step
    /// position nearest to its start point.
    ///
    /// `lead_in_ticks` is the time left over after the last step of the
    /// previous segment; it is added to the first delay of this one.
    pub fn new(segment: Segment, constraints: &PlanningConstraints, lead_in_ticks: u32) -> Self {
        let origin = segment.start.to_steps(constraints.resolution);
        Self::from_steps(segment, constraints, lead_in_ticks, origin)
    }

    /// Prepare the interpolation of `segment` from the absolute step
    /// position `origin` the previous steps have reached.
    ///
    /// Each axis heads for the step nearest to the segment end, so the
    /// rounding of one segment is made up by the next.
    pub fn from_steps(
        segment: Segment,
        constraints: &PlanningConstraints,
        lead_in_ticks: u32,
        origin: [Steps; AXES],
    ) -> Self {
        let profile = VelocityProfile::for_segment(&segment, constraints);
        let resolution = constraints.resolution;
        let start = segment.start.coords();
        let end = segment.end.coords();

        let mut axes = [AxisStepper::new(0, 0.0, 0.0, 1.0); AXES];
        if !segment.is_degenerate() {
            for axis in Axis::ALL {
                let i = axis.index();
                axes[i] = AxisStepper::new(
                    origin[i].value(),
                    start[i] / resolution,
                    end[i] / resolution,
                    constraints.completion_threshold,
                );
            }
        }

        Self {
            segment,
            profile,
            constraints: *constraints,
            axes,
            last_tick: 0,
            lead_in: i64::from(lead_in_ticks),
            total_ticks: constraints.seconds_to_ticks(profile.total_time()),
            queued: None,
            dir_sent: false,
            finished: false,
        }
    }

    /// Segment being interpolated.
    #[inline]
    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    /// Velocity profile of the segment.
    #[inline]
    pub fn profile(&self) -> &VelocityProfile {
        &self.profile
    }

    /// Direction mask latched before the first step (bit set = increasing).
    pub fn direction_mask(&self) -> AxisMask {
        let mut mask = AxisMask::EMPTY;
        for axis in Axis::ALL {
            let stepper = &self.axes[axis.index()];
            if stepper.is_active() && stepper.direction == Direction::Increasing {
                mask.insert(axis);
            }
        }
        mask
    }

    /// Mask of axes that move in this segment.
    pub fn active_mask(&self) -> AxisMask {
        let mut mask = AxisMask::EMPTY;
        for axis in Axis::ALL {
            if self.axes[axis.index()].is_active() {
                mask.insert(axis);
            }
        }
        mask
    }

    /// Signed steps emitted so far, per axis.
    pub fn steps(&self) -> [i64; AXES] {
        self.axes.map(|a| a.signed_steps())
    }

    /// Absolute step position reached so far.
    pub fn step_position(&self) -> [Steps; AXES] {
        self.axes.map(|a| Steps(a.origin + a.signed_steps()))
    }

    /// Segment duration in consumer ticks.
    #[inline]
    pub fn total_ticks(&self) -> i64 {
        self.total_ticks
    }

    /// Check if every event has been produced.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Ticks between the last emitted step and the end of the segment,
    /// plus any lead-in not yet spent.
    ///
    /// Feed this into the next segment as its `lead_in_ticks`.
    pub fn residual_ticks(&self) -> u32 {
        let residual = self.lead_in + self.total_ticks - self.last_tick;
        residual.clamp(0, i64::from(u32::MAX)) as u32
    }

    /// Lead-in ticks not yet folded into a delay.
    #[inline]
    pub fn unspent_lead_in(&self) -> u32 {
        self.lead_in.clamp(0, i64::from(u32::MAX)) as u32
    }

    /// Quantized position reached by the steps emitted so far.
    pub fn position(&self) -> Waypoint {
        let resolution = self.constraints.resolution;
        Waypoint::from_coords(self.step_position().map(|s| s.to_length(resolution).value()))
    }

    /// Fraction of the segment covered, measured on the longest axis.
    pub fn progress(&self) -> f64 {
        self.axes
            .iter()
            .filter(|a| a.is_active())
            .max_by(|a, b| fabs(a.travel).total_cmp(&fabs(b.travel)))
            .map(|a| a.alpha(a.steps).clamp(0.0, 1.0))
            .unwrap_or(1.0)
    }

    /// Path speed at the current progress.
    #[inline]
    pub fn velocity(&self) -> f64 {
        self.profile.velocity_at_fraction(self.progress())
    }

    /// Build the segment that starts bringing the machine to rest from here.
    ///
    /// Braking runs from the current quantized position toward the segment
    /// end at `amax`. When the end comes first, the returned segment ends
    /// there with the speed still left; see [`Segment::braking`].
    pub fn abort(&self) -> Segment {
        Segment::braking(self.position(), self.segment.end, self.velocity(), &self.constraints)
    }

    /// Compute the tentative next step of every axis that has none.
    fn refill(&mut self) {
        for stepper in self.axes.iter_mut() {
            if stepper.is_done() || stepper.pending.is_some() {
                continue;
            }
            let time = self.profile.time_at_fraction(stepper.alpha(stepper.steps + 1));
            stepper.pending = Some(self.constraints.seconds_to_ticks(time));
        }
    }

    /// Emit the earliest pending steps; returns their tick and mask.
    fn take_earliest(&mut self) -> Option<(i64, AxisMask)> {
        let tick = self.axes.iter().filter_map(|a| a.pending).min()?;

        let mut mask = AxisMask::EMPTY;
        for axis in Axis::ALL {
            let stepper = &mut self.axes[axis.index()];
            if stepper.pending == Some(tick) {
                stepper.pending = None;
                stepper.steps += 1;
                mask.insert(axis);
            }
        }
        Some((tick, mask))
    }
}

impl Iterator for StepInterpolator {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        if let Some(event) = self.queued.take() {
            return Some(event);
        }
        if self.finished {
            return None;
        }

        if !self.dir_sent {
            self.dir_sent = true;
            if self.active_mask().is_empty() {
                self.finished = true;
                return None;
            }
            return Some(Event::Dir(self.direction_mask()));
        }

        self.refill();
        let Some((tick, mask)) = self.take_earliest() else {
            self.finished = true;
            return None;
        };

        let delay = (tick - self.last_tick + self.lead_in).max(0);
        self.lead_in = 0;
        self.last_tick = tick;

        if delay > 0 {
            self.queued = Some(Event::Step(mask));
            Some(Event::Delay(delay.min(i64::from(u32::MAX)) as u32))
        } else {
            Some(Event::Step(mask))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraints(resolution: f64, frequency: f64) -> PlanningConstraints {
        let max_velocity = 2.0;
        let max_acceleration = 1.0;
        PlanningConstraints {
            max_velocity,
            max_acceleration,
            resolution,
            update_frequency: frequency,
            ticks_per_step: frequency / (max_velocity / resolution),
            straight_threshold: max_acceleration * resolution / max_velocity,
            completion_threshold: 0.5,
            max_delay_ticks: 5000,
        }
    }

    fn collect(segment: Segment, c: &PlanningConstraints) -> std::vec::Vec<Event> {
        StepInterpolator::new(segment, c, 0).collect()
    }

    fn step_count(events: &[Event], axis: Axis) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, Event::Step(m) if m.contains(axis)))
            .count()
    }

    #[test]
    fn test_single_axis_step_count() {
        let c = constraints(1.0, 100.0);
        let seg = Segment::new(Waypoint::xy(0.0, 0.0), Waypoint::xy(10.0, 0.0), 0.0, 0.0);
        let events = collect(seg, &c);

        assert_eq!(events[0], Event::Dir(AxisMask::of(Axis::X)));
        assert_eq!(step_count(&events, Axis::X), 10);
        assert_eq!(step_count(&events, Axis::Y), 0);
    }

    #[test]
    fn test_negative_direction() {
        let c = constraints(1.0, 100.0);
        let seg = Segment::new(Waypoint::xy(5.0, 5.0), Waypoint::xy(0.0, 8.0), 0.0, 0.0);
        let mut interp = StepInterpolator::new(seg, &c, 0);

        assert_eq!(interp.next(), Some(Event::Dir(AxisMask::of(Axis::Y))));
        interp.by_ref().for_each(drop);
        assert_eq!(interp.steps(), [-5, 3, 0, 0]);
        assert_eq!(interp.position(), Waypoint::xy(0.0, 8.0));
    }

    #[test]
    fn test_rounds_to_nearest_step() {
        let c = constraints(1.0, 100.0);
        let short = Segment::new(Waypoint::xy(0.0, 0.0), Waypoint::xy(10.4, 0.0), 0.0, 0.0);
        let long = Segment::new(Waypoint::xy(0.0, 0.0), Waypoint::xy(10.6, 0.0), 0.0, 0.0);
        assert_eq!(step_count(&collect(short, &c), Axis::X), 10);
        assert_eq!(step_count(&collect(long, &c), Axis::X), 11);
    }

    #[test]
    fn test_zero_length_segment_emits_nothing() {
        let c = constraints(0.001, 19500.0);
        let p = Waypoint::xy(1.0, 1.0);
        let mut interp = StepInterpolator::new(Segment::new(p, p, 0.0, 0.0), &c, 7);
        assert_eq!(interp.next(), None);
        assert_eq!(interp.residual_ticks(), 7);
    }

    #[test]
    fn test_sub_threshold_axis_inactive() {
        let c = constraints(1.0, 100.0);
        let seg = Segment::new(Waypoint::xy(0.0, 0.0), Waypoint::xy(0.4, 0.0), 0.0, 0.0);
        assert!(collect(seg, &c).is_empty());
    }

    #[test]
    fn test_delays_are_positive_and_sum_to_last_tick() {
        let c = constraints(0.01, 19500.0);
        let seg = Segment::new(Waypoint::xy(0.0, 0.0), Waypoint::xy(1.0, 0.5), 0.0, 0.0);
        let mut interp = StepInterpolator::new(seg, &c, 0);

        let mut sum = 0i64;
        let mut previous_was_delay = false;
        for event in interp.by_ref() {
            match event {
                Event::Delay(n) => {
                    assert!(n > 0);
                    assert!(!previous_was_delay);
                    sum += i64::from(n);
                    previous_was_delay = true;
                }
                Event::Step(mask) => {
                    assert!(!mask.is_empty());
                    previous_was_delay = false;
                }
                Event::Dir(_) => {}
                other => panic!("unexpected event {:?}", other),
            }
        }

        assert_eq!(sum + i64::from(interp.residual_ticks()), interp.total_ticks());
    }

    #[test]
    fn test_diagonal_steps_coincide() {
        let c = constraints(1.0, 100.0);
        let seg = Segment::new(Waypoint::xy(0.0, 0.0), Waypoint::xy(4.0, 4.0), 0.0, 0.0);
        let events = collect(seg, &c);
        let both = AxisMask::of(Axis::X).with(Axis::Y);
        let steps: std::vec::Vec<_> = events.iter().filter(|e| e.is_step()).collect();
        assert_eq!(steps.len(), 4);
        assert!(steps.iter().all(|e| **e == Event::Step(both)));
    }

    #[test]
    fn test_lead_in_added_to_first_delay() {
        let c = constraints(1.0, 100.0);
        let seg = Segment::new(Waypoint::xy(0.0, 0.0), Waypoint::xy(10.0, 0.0), 0.0, 0.0);
        let plain: std::vec::Vec<_> = StepInterpolator::new(seg, &c, 0).collect();
        let carried: std::vec::Vec<_> = StepInterpolator::new(seg, &c, 25).collect();

        match (plain[1], carried[1]) {
            (Event::Delay(a), Event::Delay(b)) => assert_eq!(b, a + 25),
            other => panic!("expected delays, got {:?}", other),
        }
        assert_eq!(plain[2..], carried[2..]);
    }

    #[test]
    fn test_abort_stops_within_segment() {
        let c = constraints(0.001, 19500.0);
        let seg = Segment::new(Waypoint::xy(0.0, 0.0), Waypoint::xy(10.0, 0.0), 0.0, 0.0);
        let mut interp = StepInterpolator::new(seg, &c, 0);
        interp.by_ref().take(4001).for_each(drop);

        let stop = interp.abort();
        assert_eq!(stop.start, interp.position());
        assert_eq!(stop.end_velocity, 0.0);
        assert!(stop.start_velocity > 0.0);
        assert!(stop.end.coord(Axis::X) <= 10.0 + 1e-9);
        assert!(stop.length <= c.stopping_distance(stop.start_velocity) + 1e-9);
    }

    #[test]
    fn test_steps_from_reached_position() {
        let c = constraints(1.0, 100.0);
        let seg = Segment::new(Waypoint::xy(0.6, 0.0), Waypoint::xy(1.2, 0.0), 1.0, 1.0);

        // already one step past the start: nothing left to do
        let ahead = StepInterpolator::from_steps(seg, &c, 0, [Steps(1), Steps(0), Steps(0), Steps(0)]);
        assert!(ahead.active_mask().is_empty());

        // one step behind: catch up to the nearest step of the end point
        let mut behind =
            StepInterpolator::from_steps(seg, &c, 0, [Steps(0), Steps(0), Steps(0), Steps(0)]);
        behind.by_ref().for_each(drop);
        assert_eq!(behind.steps(), [1, 0, 0, 0]);
        assert_eq!(behind.step_position()[0], Steps(1));
    }

    #[test]
    fn test_rounding_noise_never_steps() {
        let mut c = constraints(0.1, 1000.0);
        c.completion_threshold = 0.0;
        let seg = Segment::new(Waypoint::xy(1.0, 0.1 + 0.2), Waypoint::xy(2.0, 0.3), 0.0, 0.0);
        let mut interp = StepInterpolator::new(seg, &c, 0);

        assert_eq!(interp.active_mask(), AxisMask::of(Axis::X));
        interp.by_ref().for_each(drop);
        assert_eq!(interp.steps(), [10, 0, 0, 0]);
    }

    #[test]
    fn test_abort_near_end_keeps_deceleration_limit() {
        let c = constraints(0.001, 19500.0);
        let seg = Segment::new(Waypoint::xy(0.0, 0.0), Waypoint::xy(0.05, 0.0), 2.0, 2.0);
        let mut interp = StepInterpolator::new(seg, &c, 0);
        // direction latch plus twenty delay/step pairs
        interp.by_ref().take(41).for_each(drop);
        assert_eq!(interp.steps(), [20, 0, 0, 0]);

        let stop = interp.abort();
        assert_eq!(stop.start, interp.position());
        assert_eq!(stop.end, seg.end);
        assert!(stop.end_velocity > 0.0);

        let braking = (stop.start_velocity * stop.start_velocity
            - stop.end_velocity * stop.end_velocity)
            / (2.0 * stop.length);
        assert!(braking <= c.max_acceleration + 1e-9);

        let profile = VelocityProfile::for_segment(&stop, &c);
        let covered = profile.accel_distance + profile.cruise_distance + profile.decel_distance;
        assert!((covered - stop.length).abs() < 1e-9);
        assert!(profile.peak_velocity >= stop.start_velocity - 1e-9);
    }

    #[test]
    fn test_unspent_lead_in() {
        let c = constraints(1.0, 100.0);
        let seg = Segment::new(Waypoint::xy(0.0, 0.0), Waypoint::xy(3.0, 0.0), 0.0, 0.0);
        let mut interp = StepInterpolator::new(seg, &c, 40);
        assert_eq!(interp.next(), Some(Event::Dir(AxisMask::of(Axis::X))));
        assert_eq!(interp.unspent_lead_in(), 40);
        assert!(matches!(interp.next(), Some(Event::Delay(_))));
        assert_eq!(interp.unspent_lead_in(), 0);
    }
}
