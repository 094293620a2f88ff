//! Property tests for profiles, the byte protocol and the planner.

use proptest::prelude::*;

use stepcode::bytecode::{decode, Decoder, Encoder, Event, StatFlags};
use stepcode::config::PlanningConstraints;
use stepcode::motion::{Segment, StepInterpolator, VelocityProfile, Waypoint};
use stepcode::planner::LookaheadPlanner;
use stepcode::AxisMask;

fn coarse() -> PlanningConstraints {
    PlanningConstraints {
        max_velocity: 2.0,
        max_acceleration: 1.0,
        resolution: 0.01,
        update_frequency: 2000.0,
        ticks_per_step: 10.0,
        straight_threshold: 0.005,
        completion_threshold: 0.5,
        max_delay_ticks: 5000,
    }
}

fn any_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        (1u32..=5000).prop_map(Event::Delay),
        (0u8..16).prop_map(|m| Event::Dir(AxisMask::from_bits(m))),
        (0u8..16).prop_map(|m| Event::Step(AxisMask::from_bits(m))),
        (0u8..8).prop_map(Event::Mode),
        (0u8..8).prop_map(|f| Event::Stat(StatFlags::from_bits(f))),
        (0u8..64).prop_map(Event::Spin),
    ]
}

proptest! {
    #[test]
    fn profile_time_is_monotonic(
        length in 0.0f64..50.0,
        vs in 0.0f64..2.0,
        ve in 0.0f64..2.0,
        a in 0.01f64..1.0,
        b in 0.01f64..1.0,
    ) {
        let profile = VelocityProfile::new(length, vs, ve, 2.0, 1.0, 0.001);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(profile.time_at_fraction(lo) <= profile.time_at_fraction(hi));
        prop_assert!(profile.time_at_fraction(hi) <= profile.total_time());
        prop_assert_eq!(profile.time_at_fraction(0.0), 0.0);
        prop_assert!(profile.peak_velocity <= 2.0);
    }

    #[test]
    fn symmetric_profile_halfway(length in 0.01f64..50.0) {
        let profile = VelocityProfile::new(length, 0.0, 0.0, 2.0, 1.0, 0.001);
        let half = profile.time_at_fraction(0.5);
        prop_assert!((2.0 * half - profile.total_time()).abs() < 1e-6);
    }

    #[test]
    fn byte_round_trip(byte in any::<u8>()) {
        let mut encoder = Encoder::default();
        let event = decode(byte);
        let bytes: Vec<u8> = encoder.encode(event).collect();
        prop_assert_eq!(bytes, vec![byte]);
    }

    #[test]
    fn event_round_trip(events in prop::collection::vec(any_event(), 1..40)) {
        let mut encoder = Encoder::default();
        // consecutive delays merge on decode, so keep them apart
        let mut expected: Vec<Event> = Vec::new();
        let mut bytes: Vec<u8> = Vec::new();
        for event in events {
            if let (Some(Event::Delay(_)), Event::Delay(_)) = (expected.last(), event) {
                continue;
            }
            bytes.extend(encoder.encode(event));
            expected.push(event);
        }

        let decoded: Vec<Event> = Decoder::new(bytes).collect();
        prop_assert_eq!(decoded, expected);
    }

    #[test]
    fn interpolator_reaches_endpoint(
        dx in -3.0f64..3.0,
        dy in -3.0f64..3.0,
        vs in 0.0f64..0.5,
    ) {
        let c = coarse();
        let start = Waypoint::xy(0.5, -0.25);
        let end = Waypoint::xy(0.5 + dx, -0.25 + dy);
        let mut interp = StepInterpolator::new(Segment::new(start, end, vs, 0.0), &c, 0);

        let mut last_was_delay = false;
        for event in interp.by_ref() {
            if let Event::Delay(n) = event {
                prop_assert!(n > 0);
                prop_assert!(!last_was_delay);
            }
            last_was_delay = matches!(event, Event::Delay(_));
        }

        let reached = interp.position();
        for (got, want) in reached.coords().iter().zip(end.coords().iter()) {
            prop_assert!((got - want).abs() <= 0.5 * c.resolution + 1e-9);
        }
    }

    #[test]
    fn planner_stops_at_last_waypoint(
        points in prop::collection::vec((-5.0f64..5.0, -5.0f64..5.0), 2..20),
        depth in 3usize..10,
    ) {
        let c = coarse();
        let mut planner = LookaheadPlanner::new(c, depth).unwrap();
        let mut segments = Vec::new();

        for &(x, y) in &points {
            planner.push(Waypoint::xy(x, y)).unwrap();
            while let Some(seg) = planner.plan() {
                segments.push(seg);
            }
        }
        planner.finish();
        while let Some(seg) = planner.plan() {
            segments.push(seg);
        }

        prop_assert_eq!(segments.len(), points.len() - 1);
        prop_assert_eq!(segments[0].start_velocity, 0.0);
        let last = segments[segments.len() - 1];
        prop_assert_eq!(last.end_velocity, 0.0);
        let (x, y) = points[points.len() - 1];
        prop_assert_eq!(last.end, Waypoint::xy(x, y));

        for seg in &segments {
            prop_assert!(seg.start_velocity <= c.max_velocity);
            prop_assert!(seg.end_velocity <= c.max_velocity);
        }
    }
}
