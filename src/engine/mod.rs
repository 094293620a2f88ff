//! Pipeline facade.
//!
//! [`Engine`] owns the planner, encoder, flow control and position tracker
//! and drives waypoints all the way to bytes in a sink.

mod builder;

pub use builder::EngineBuilder;

use embedded_hal::delay::DelayNs;

use crate::bytecode::{Encoder, Event, PositionTracker};
use crate::config::{validate_config, PlanningConstraints, SystemConfig};
use crate::error::Result;
use crate::motion::{parse_record, Segment, StepInterpolator, Waypoint, AXES};
use crate::planner::LookaheadPlanner;
use crate::stream::{FlowControl, PulseSink};

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunSummary {
    /// Waypoints accepted by the planner.
    pub waypoints: u64,
    /// Segments executed, including a final stopping segment.
    pub segments: u64,
    /// Malformed input records skipped.
    pub skipped_records: u64,
    /// Step pulses emitted per axis.
    pub steps: [u64; AXES],
    /// Bytes delivered to the sink.
    pub bytes: u64,
    /// Delays shortened by the delay clamp.
    pub clamped_delays: u32,
    /// Planned duration in consumer ticks.
    pub total_ticks: u64,
    /// Path length travelled.
    pub length: f64,
    /// Run ended by a stop request.
    pub aborted: bool,
}

/// Waypoint-to-byte pipeline.
///
/// # Example
///
/// ```rust
/// use stepcode::{Engine, SystemConfig};
/// # struct NoDelay;
/// # impl embedded_hal::delay::DelayNs for NoDelay { fn delay_ns(&mut self, _: u32) {} }
///
/// let mut engine = Engine::new(&SystemConfig::default(), NoDelay)?;
/// let mut bytes: Vec<u8> = Vec::new();
///
/// engine.push_record("0 0", &mut bytes)?;
/// engine.push_record("0.01 0", &mut bytes)?;
/// let summary = engine.finish(&mut bytes)?;
///
/// assert_eq!(summary.steps[0], 10);
/// assert_eq!(bytes[0], 0x81);
/// # Ok::<(), stepcode::Error>(())
/// ```
pub struct Engine<D: DelayNs> {
    config: SystemConfig,
    constraints: PlanningConstraints,
    planner: LookaheadPlanner,
    encoder: Encoder,
    flow: FlowControl<D>,
    tracker: PositionTracker,
    summary: RunSummary,
    /// Ticks left over after the last step, carried into the next segment.
    carry: u32,
    /// Input lines seen, for error reporting.
    line: usize,
    started: bool,
    /// Tracker placed at the first segment's start.
    anchored: bool,
}

impl<D: DelayNs> Engine<D> {
    /// Create an engine from a configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure; nothing is emitted in that case.
    pub fn new(config: &SystemConfig, delay: D) -> Result<Self> {
        validate_config(config)?;

        let constraints = PlanningConstraints::from_config(config);
        let planner = LookaheadPlanner::new(constraints, config.planner.lookahead)?;

        debug!(
            "engine: vmax={} amax={} res={} fupdate={} lookahead={}",
            constraints.max_velocity,
            constraints.max_acceleration,
            constraints.resolution,
            constraints.update_frequency,
            config.planner.lookahead
        );

        Ok(Self {
            config: config.clone(),
            constraints,
            planner,
            encoder: Encoder::new(config.stepper.max_delay_ticks),
            flow: FlowControl::new(config.flow, delay),
            tracker: PositionTracker::new(),
            summary: RunSummary::default(),
            carry: 0,
            line: 0,
            started: false,
            anchored: false,
        })
    }

    /// Create a builder.
    pub fn builder() -> EngineBuilder<D> {
        EngineBuilder::new()
    }

    /// Configuration in use.
    #[inline]
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Derived planning constraints.
    #[inline]
    pub fn constraints(&self) -> &PlanningConstraints {
        &self.constraints
    }

    /// Counters so far.
    #[inline]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            clamped_delays: self.encoder.clamped_delays(),
            ..self.summary
        }
    }

    /// Position reached by the emitted steps.
    pub fn position(&self) -> Waypoint {
        self.tracker.waypoint(self.constraints.resolution)
    }

    /// Emit the stream preamble (the MODE byte when microsteps are set).
    ///
    /// Called implicitly by the first push; calling it again does nothing.
    pub fn start<S: PulseSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;

        if let Some(microsteps) = self.config.stepper.microsteps {
            self.emit(Event::Mode(microsteps.mode_code()), sink)?;
        }
        Ok(())
    }

    /// Feed one input line.
    ///
    /// Blank and comment lines are ignored. Malformed lines are logged,
    /// counted in [`RunSummary::skipped_records`] and skipped.
    pub fn push_record<S: PulseSink + ?Sized>(&mut self, text: &str, sink: &mut S) -> Result<()> {
        self.push_record_until(text, sink, &mut never)
    }

    /// Feed one waypoint and execute every segment it unlocks.
    pub fn push_waypoint<S: PulseSink + ?Sized>(&mut self, point: Waypoint, sink: &mut S) -> Result<()> {
        self.push_waypoint_until(point, sink, &mut never)
    }

    /// Signal end of input, execute the remaining segments and wait for
    /// the consumer to drain.
    pub fn finish<S: PulseSink + ?Sized>(&mut self, sink: &mut S) -> Result<RunSummary> {
        self.finish_until(sink, &mut never)
    }

    /// Stream every record of `reader` into `sink`.
    #[cfg(feature = "std")]
    pub fn run<R, S>(&mut self, reader: R, sink: &mut S) -> Result<RunSummary>
    where
        R: std::io::BufRead,
        S: PulseSink + ?Sized,
    {
        self.run_until(reader, sink, never)
    }

    /// Like [`run`](Self::run), but polls `should_stop` between events.
    ///
    /// Once it returns `true` the segment in progress is replaced by a
    /// stopping segment and the remaining input is ignored.
    #[cfg(feature = "std")]
    pub fn run_until<R, S, F>(&mut self, reader: R, sink: &mut S, mut should_stop: F) -> Result<RunSummary>
    where
        R: std::io::BufRead,
        S: PulseSink + ?Sized,
        F: FnMut() -> bool,
    {
        use crate::error::{message, InputError};

        self.start(sink)?;
        for line in reader.lines() {
            let line = line.map_err(|e| InputError::Read(message(&e.to_string())))?;
            self.push_record_until(&line, sink, &mut should_stop)?;
            if self.summary.aborted {
                break;
            }
            if should_stop() {
                self.stop_now(sink)?;
                break;
            }
        }
        self.finish_until(sink, &mut should_stop)
    }

    fn push_record_until<S, F>(&mut self, text: &str, sink: &mut S, should_stop: &mut F) -> Result<()>
    where
        S: PulseSink + ?Sized,
        F: FnMut() -> bool,
    {
        self.line += 1;
        match parse_record(text, self.line) {
            Ok(Some(point)) => self.push_waypoint_until(point, sink, should_stop),
            Ok(None) => Ok(()),
            Err(_) => {
                warn!("skipping malformed record on line {}", self.line);
                self.summary.skipped_records += 1;
                Ok(())
            }
        }
    }

    fn push_waypoint_until<S, F>(&mut self, point: Waypoint, sink: &mut S, should_stop: &mut F) -> Result<()>
    where
        S: PulseSink + ?Sized,
        F: FnMut() -> bool,
    {
        self.start(sink)?;
        self.planner.push(point)?;
        self.summary.waypoints += 1;
        self.drain_planner(sink, should_stop)
    }

    fn finish_until<S, F>(&mut self, sink: &mut S, should_stop: &mut F) -> Result<RunSummary>
    where
        S: PulseSink + ?Sized,
        F: FnMut() -> bool,
    {
        self.start(sink)?;
        self.planner.finish();
        self.drain_planner(sink, should_stop)?;
        self.flow.drain(sink)?;

        let summary = self.summary();
        info!(
            "run complete: {} segments, {} bytes, {} skipped, aborted={}",
            summary.segments,
            summary.bytes,
            summary.skipped_records,
            summary.aborted
        );
        Ok(summary)
    }

    /// Execute every segment the planner can commit.
    fn drain_planner<S, F>(&mut self, sink: &mut S, should_stop: &mut F) -> Result<()>
    where
        S: PulseSink + ?Sized,
        F: FnMut() -> bool,
    {
        while !self.summary.aborted {
            let Some(segment) = self.planner.plan() else {
                break;
            };
            self.drive(segment, sink, should_stop)?;
        }
        Ok(())
    }

    /// Stop between records: decelerate along the next committed segment.
    #[cfg(feature = "std")]
    fn stop_now<S: PulseSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        self.planner.finish();
        match self.planner.plan() {
            Some(segment) => self.drive(segment, sink, &mut always),
            None => {
                self.summary.aborted = true;
                Ok(())
            }
        }
    }

    /// Interpolate and emit one segment, checking `should_stop` whenever no
    /// step is due.
    fn drive<S, F>(&mut self, segment: Segment, sink: &mut S, should_stop: &mut F) -> Result<()>
    where
        S: PulseSink + ?Sized,
        F: FnMut() -> bool,
    {
        if !self.anchored {
            self.anchored = true;
            self.tracker = PositionTracker::at(segment.start.to_steps(self.constraints.resolution));
        }
        let mut interp = StepInterpolator::from_steps(
            segment,
            &self.constraints,
            self.carry,
            self.tracker.all_steps(),
        );
        // After a delay the queued step must go out before anything else.
        let mut step_due = false;

        loop {
            if !step_due && should_stop() {
                return self.abort(&interp, sink);
            }
            let Some(event) = interp.next() else {
                break;
            };
            step_due = matches!(event, Event::Delay(_));
            self.emit(event, sink)?;
        }

        self.summary.segments += 1;
        self.summary.length += segment.length;
        self.summary.total_ticks += interp.total_ticks().max(0) as u64;
        self.carry = interp.residual_ticks();
        Ok(())
    }

    /// Replace the segment in progress by braking segments.
    ///
    /// Braking follows the committed path: when the current segment ends
    /// before the machine is at rest, it continues along the segments the
    /// planner still holds, which always end in a full stop.
    fn abort<S: PulseSink + ?Sized>(&mut self, interp: &StepInterpolator, sink: &mut S) -> Result<()> {
        let mut stop = interp.abort();
        info!(
            "stop requested: decelerating from {} over {}",
            stop.start_velocity,
            self.constraints.stopping_distance(stop.start_velocity)
        );

        self.summary.aborted = true;
        self.summary.segments += 1;
        self.summary.length += interp.progress() * interp.segment().length;
        self.planner.finish();
        self.carry = interp.unspent_lead_in();

        loop {
            self.drive(stop, sink, &mut never)?;
            if stop.end_velocity <= 0.0 {
                return Ok(());
            }
            let Some(next) = self.planner.plan() else {
                warn!("path ended at speed {} while stopping", stop.end_velocity);
                return Ok(());
            };
            stop = Segment::braking(self.position(), next.end, stop.end_velocity, &self.constraints);
        }
    }

    fn emit<S: PulseSink + ?Sized>(&mut self, event: Event, sink: &mut S) -> Result<()> {
        self.tracker.apply(event);
        if let Event::Step(mask) = event {
            for axis in mask.axes() {
                self.summary.steps[axis.index()] += 1;
            }
        }

        for byte in self.encoder.encode(event) {
            self.flow.send(sink, byte)?;
            self.summary.bytes += 1;
        }
        Ok(())
    }
}

fn never() -> bool {
    false
}

#[cfg(feature = "std")]
fn always() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::Decoder;
    use crate::config::units::Microsteps;
    use crate::motion::Axis;

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn engine(lookahead: usize) -> Engine<NoDelay> {
        Engine::builder()
            .delay(NoDelay)
            .resolution(1.0)
            .update_frequency(100.0)
            .lookahead(lookahead)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_delay() {
        let result = EngineBuilder::<NoDelay>::new().build();
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Engine::builder()
            .delay(NoDelay)
            .update_frequency(1000.0)
            .build();
        // 1000 / (2 / 0.001) = 0.5 ticks per step
        assert!(result.is_err());
    }

    #[test]
    fn test_mode_byte_first() {
        let mut engine = Engine::builder()
            .delay(NoDelay)
            .microsteps(Microsteps::SIXTEENTH)
            .build()
            .unwrap();
        let mut out = std::vec::Vec::new();
        engine.finish(&mut out).unwrap();
        assert_eq!(out, [0xA7]);
    }

    #[test]
    fn test_skips_malformed_records() {
        let mut engine = engine(3);
        let mut out = std::vec::Vec::new();
        for line in ["0 0", "garbage", "", "# note", "5", "3 0"] {
            engine.push_record(line, &mut out).unwrap();
        }
        let summary = engine.finish(&mut out).unwrap();

        assert_eq!(summary.skipped_records, 2);
        assert_eq!(summary.waypoints, 2);
        assert_eq!(summary.steps, [3, 0, 0, 0]);
        assert_eq!(engine.position(), Waypoint::xy(3.0, 0.0));
    }

    #[test]
    fn test_summary_matches_stream() {
        let mut engine = engine(4);
        let mut out = std::vec::Vec::new();
        for (x, y) in [(0.0, 0.0), (4.0, 0.0), (4.0, -3.0), (0.0, 0.0)] {
            engine.push_waypoint(Waypoint::xy(x, y), &mut out).unwrap();
        }
        let summary = engine.finish(&mut out).unwrap();

        assert_eq!(summary.segments, 3);
        assert_eq!(summary.bytes, out.len() as u64);
        assert!((summary.length - 12.0).abs() < 1e-9);

        let mut tracker = PositionTracker::new();
        tracker.apply_all(Decoder::new(out.iter().copied()));
        assert_eq!(tracker.waypoint(1.0), Waypoint::xy(0.0, 0.0));
        assert_eq!(summary.steps[Axis::X.index()], 8);
        assert_eq!(summary.steps[Axis::Y.index()], 6);
    }

    #[test]
    fn test_stop_request_decelerates() {
        let mut engine = Engine::builder()
            .delay(NoDelay)
            .resolution(0.01)
            .update_frequency(10_000.0)
            .build()
            .unwrap();
        let mut out = std::vec::Vec::new();
        engine.push_waypoint(Waypoint::xy(0.0, 0.0), &mut out).unwrap();

        let mut polls = 0;
        let mut stop_after = || {
            polls += 1;
            polls > 300
        };
        let planner_segment = Segment::new(Waypoint::xy(0.0, 0.0), Waypoint::xy(20.0, 0.0), 0.0, 0.0);
        engine.drive(planner_segment, &mut out, &mut stop_after).unwrap();

        let summary = engine.summary();
        assert!(summary.aborted);
        let x = engine.position().coord(Axis::X);
        assert!(x > 0.0 && x < 20.0);
        assert!(engine.push_waypoint(Waypoint::xy(1.0, 1.0), &mut out).is_err());
    }

    #[test]
    fn test_stop_brakes_across_segments() {
        let mut engine = Engine::builder().delay(NoDelay).build().unwrap();
        for i in 0..=30 {
            engine.planner.push(Waypoint::xy(f64::from(i) * 0.1, 0.0)).unwrap();
        }
        let mut out = std::vec::Vec::new();

        // two polls for the direction latch, then one per step
        let mut polls = 0;
        let mut stop_after = || {
            polls += 1;
            polls > 401
        };
        let cruising = Segment::new(Waypoint::xy(-0.5, 0.0), Waypoint::xy(0.0, 0.0), 2.0, 2.0);
        engine.drive(cruising, &mut out, &mut stop_after).unwrap();

        assert!(engine.summary().aborted);
        // stopped 0.4 in at full speed, then v²/(2·amax) = 2 further
        let x = engine.position().coord(Axis::X);
        assert!((x - 1.9).abs() < 0.002, "stopped at {}", x);
        assert!(engine.summary().segments > 2);
    }

    #[test]
    fn test_stop_keeps_carried_ticks() {
        let first_delay = |carry: u32| {
            let mut engine = engine(3);
            engine.carry = carry;
            let mut out = std::vec::Vec::new();
            let seg = Segment::new(Waypoint::xy(0.0, 0.0), Waypoint::xy(10.0, 0.0), 2.0, 0.0);
            engine.drive(seg, &mut out, &mut || true).unwrap();
            assert!(engine.summary().aborted);
            Decoder::new(out.iter().copied()).find_map(|e| match e {
                Event::Delay(n) => Some(n),
                _ => None,
            })
        };

        let plain = first_delay(0);
        assert!(plain.is_some());
        assert_eq!(first_delay(25), plain.map(|n| n + 25));
    }

    #[test]
    fn test_colinear_rounding_does_not_accumulate() {
        let mut engine = Engine::builder().delay(NoDelay).build().unwrap();
        let mut out = std::vec::Vec::new();
        // 0.0006 is not a whole number of 0.001 steps
        for i in 0..=100 {
            engine.push_waypoint(Waypoint::xy(f64::from(i) * 0.0006, 0.0), &mut out).unwrap();
        }
        let summary = engine.finish(&mut out).unwrap();

        assert_eq!(summary.steps, [60, 0, 0, 0]);
        assert!((engine.position().coord(Axis::X) - 0.06).abs() < 1e-9);
    }
}
