//! Unit tests for mts-plan.

use mts_core::{Acceleration, DirectedPoint, Duration, Length, Point2, Polyline, Speed, Time};

use crate::{OperationalPlan, PlanError, Segments, builder};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Straight path along +x.
fn straight(length: f64) -> Polyline {
    Polyline::straight(Point2::new(0.0, 0.0), 0.0, Length(length)).unwrap()
}

/// 10 m east, then 10 m north.
fn l_shape() -> Polyline {
    Polyline::from_xy(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]).unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// ── Segment ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod segment {
    use super::*;

    #[test]
    fn queries_follow_constant_acceleration() {
        let s = Segments::off(Speed(10.0), Duration(4.0), Acceleration(1.0));
        let seg = s.first();
        assert_eq!(seg.speed(Duration(2.0)).unwrap(), Speed(12.0));
        assert_eq!(seg.distance(Duration(2.0)).unwrap(), Length(22.0));
        assert_eq!(seg.end_speed(), Speed(14.0));
        assert_eq!(seg.total_distance(), Length(48.0));
    }

    #[test]
    fn query_outside_duration_is_validity_error() {
        let s = Segments::off(Speed(10.0), Duration(4.0), Acceleration(0.0));
        let err = s.first().speed(Duration(4.5)).unwrap_err();
        assert!(matches!(err, PlanError::Validity(_)));
        assert!(err.is_recoverable());
        assert!(s.first().distance(Duration(-0.1)).is_err());
    }

    #[test]
    fn stand_still_is_zero_for_any_input() {
        let s = Segments::stand_still(Duration(3.0));
        let seg = s.first();
        assert!(seg.is_stand_still());
        assert_eq!(seg.speed(Duration(100.0)).unwrap(), Speed::ZERO);
        assert_eq!(seg.distance(Duration(-5.0)).unwrap(), Length::ZERO);
        assert_eq!(seg.duration_at_distance(Length(7.0)), Duration::ZERO);
    }

    #[test]
    fn duration_at_distance_picks_in_range_root() {
        let s = Segments::off(Speed(0.0), Duration(10.0), Acceleration(2.0));
        // ½·2·t² = 25  →  t = 5
        assert!(close(s.first().duration_at_distance(Length(25.0)).si(), 5.0));
    }

    #[test]
    fn unreachable_distance_falls_back_to_full_duration() {
        let s = Segments::off(Speed(10.0), Duration(2.0), Acceleration(0.0));
        assert_eq!(s.first().duration_at_distance(Length(50.0)), Duration(2.0));
    }
}

// ── Segments ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod segments {
    use super::*;

    #[test]
    fn add_continues_from_end_speed() {
        let s = Segments::off(Speed(5.0), Duration(2.0), Acceleration(1.0))
            .add(Duration(3.0), Acceleration(0.0));
        assert_eq!(s.len(), 2);
        assert_eq!(s.get(1).unwrap().start_speed(), Speed(7.0));
        assert_eq!(s.end_speed(), Speed(7.0));
        assert_eq!(s.total_duration(), Duration(5.0));
        assert_eq!(s.total_distance(), Length(12.0 + 21.0));
    }

    #[test]
    fn zero_crossing_is_split_into_stop_and_wait() {
        let s = Segments::off(Speed(10.0), Duration(2.0), Acceleration(-2.0))
            .add(Duration(5.0), Acceleration(-2.0));
        // 10 → 6 in 2 s, then 6 → 0 in 3 s, then 2 s at rest
        assert_eq!(s.len(), 3);
        assert!(close(s.get(1).unwrap().duration().si(), 3.0));
        let rest = s.get(2).unwrap();
        assert!(rest.is_stand_still());
        assert!(close(rest.duration().si(), 2.0));
        assert!(close(s.total_duration().si(), 7.0));
        assert!(close(s.total_distance().si(), 16.0 + 9.0));
    }

    #[test]
    fn first_segment_split_as_well() {
        let s = Segments::off(Speed(4.0), Duration(10.0), Acceleration(-1.0));
        assert_eq!(s.len(), 2);
        assert!(s.last().is_stand_still());
        assert_eq!(s.end_speed(), Speed::ZERO);
        assert!(close(s.total_duration().si(), 10.0));
    }

    #[test]
    fn drifting_speed_is_pinned_to_zero() {
        let s = Segments::off(Speed(0.0001), Duration(10.0), Acceleration(0.0));
        assert!(s.first().is_stand_still());
        assert_eq!(s.start_speed(), Speed::ZERO);
        assert_eq!(s.total_distance(), Length::ZERO);
    }

    #[test]
    fn consecutive_waits_merge_and_empty_adds_are_ignored() {
        let s = Segments::stand_still(Duration(1.0))
            .add(Duration(2.0), Acceleration(-1.0))
            .add(Duration::ZERO, Acceleration(3.0));
        assert_eq!(s.len(), 1);
        assert_eq!(s.total_duration(), Duration(3.0));
    }

    #[test]
    fn can_start_from_rest() {
        let s = Segments::stand_still(Duration(1.0)).add(Duration(2.0), Acceleration(1.5));
        assert_eq!(s.len(), 2);
        assert_eq!(s.end_speed(), Speed(3.0));
    }
}

// ── OperationalPlan ───────────────────────────────────────────────────────────

#[cfg(test)]
mod plan {
    use super::*;

    #[test]
    fn constant_speed_scenario() {
        let t0 = Time(50.0);
        let plan = builder::constant_speed(straight(100.0), t0, Speed(10.0)).unwrap();
        assert!(close(plan.total_duration().si(), 10.0));
        assert!(close(plan.speed_at(t0 + Duration(5.0)).unwrap().si(), 10.0));
        assert!(close(plan.traveled_distance_at(t0 + Duration(5.0)).unwrap().si(), 50.0));
        assert_eq!(plan.end_time(), Time(60.0));
        let mid = plan.location_at(t0 + Duration(5.0)).unwrap();
        assert!(close(mid.x, 50.0) && close(mid.y, 0.0));
    }

    #[test]
    fn stop_truncates_path_at_stopping_point() {
        let plan = builder::maximum_acceleration(
            straight(200.0),
            Time::ZERO,
            Speed(20.0),
            Speed::ZERO,
            Acceleration(1.0),
            Acceleration(-2.0),
        )
        .unwrap();
        assert!(close(plan.total_length().si(), 100.0));
        assert!(close(plan.path().length().si(), 100.0));
        assert!(close(plan.total_duration().si(), 10.0));
        assert!(close(plan.end_speed().si(), 0.0));
        assert!(close(plan.end_location().x, 100.0));
    }

    #[test]
    fn stop_helper_accepts_either_sign() {
        let a = builder::stop(straight(200.0), Time::ZERO, Speed(20.0), Acceleration(-2.0)).unwrap();
        let b = builder::stop(straight(200.0), Time::ZERO, Speed(20.0), Acceleration(2.0)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn stop_on_short_path_brakes_throughout() {
        let plan = builder::stop(straight(50.0), Time::ZERO, Speed(20.0), Acceleration(-2.0)).unwrap();
        assert!(close(plan.total_length().si(), 50.0));
        // ½·(-2)·t² + 20·t = 50  →  t = 10 - √50
        assert!(close(plan.total_duration().si(), 10.0 - 50f64.sqrt()));
        assert!(plan.end_speed().si() > 0.0);
    }

    #[test]
    fn maximum_acceleration_cruises_after_target() {
        let plan = builder::maximum_acceleration(
            straight(100.0),
            Time::ZERO,
            Speed(0.0),
            Speed(10.0),
            Acceleration(2.0),
            Acceleration(-3.0),
        )
        .unwrap();
        // 5 s to reach 10 m/s over 25 m, then 75 m at 10 m/s
        assert_eq!(plan.segments().len(), 2);
        assert!(close(plan.total_duration().si(), 12.5));
        assert!(close(plan.end_speed().si(), 10.0));
    }

    #[test]
    fn gradual_acceleration_exact_when_within_bounds() {
        let plan = builder::gradual_acceleration(
            straight(100.0),
            Time::ZERO,
            Speed(10.0),
            Speed(15.0),
            Acceleration(2.0),
            Acceleration(-3.0),
        )
        .unwrap();
        // t = 200 / 25 = 8 s, a = 5 / 8
        assert!(close(plan.total_duration().si(), 8.0));
        assert!(close(plan.acceleration_at(Time(1.0)).unwrap().si(), 0.625));
        assert!(close(plan.end_speed().si(), 15.0));
    }

    #[test]
    fn gradual_acceleration_clamped_misses_end_speed() {
        let plan = builder::gradual_acceleration(
            straight(20.0),
            Time::ZERO,
            Speed(0.0),
            Speed(20.0),
            Acceleration(1.0),
            Acceleration(-3.0),
        )
        .unwrap();
        assert!(close(plan.acceleration_at(Time::ZERO).unwrap().si(), 1.0));
        assert!(close(plan.total_length().si(), 20.0));
        assert!(plan.end_speed().si() < 20.0);
    }

    #[test]
    fn degenerate_builders_are_defects() {
        let err = builder::constant_speed(straight(10.0), Time::ZERO, Speed::ZERO).unwrap_err();
        assert!(matches!(err, PlanError::Defect(_)));
        assert!(!err.is_recoverable());
        let err = builder::maximum_acceleration(
            straight(10.0),
            Time::ZERO,
            Speed(5.0),
            Speed(10.0),
            Acceleration(-1.0),
            Acceleration(-1.0),
        )
        .unwrap_err();
        assert!(matches!(err, PlanError::Defect(_)));
        assert!(builder::stand_still(straight(10.0), Time::ZERO, Duration(-1.0)).is_err());
    }

    #[test]
    fn segments_longer_than_path_are_truncated() {
        let segments = Segments::off(Speed(10.0), Duration(20.0), Acceleration(0.0));
        let plan = OperationalPlan::new(straight(100.0), Time::ZERO, segments.clone()).unwrap();
        assert!(close(plan.total_length().si(), 100.0));
        assert!(plan.total_duration() < segments.total_duration());
        assert!(close(plan.total_duration().si(), 10.0));
    }

    #[test]
    fn drifting_plan_collapses_to_stand_still() {
        let drifting = OperationalPlan::new(
            straight(100.0),
            Time::ZERO,
            Segments::off(Speed(0.0001), Duration(10.0), Acceleration(0.0)),
        )
        .unwrap();
        let waiting = builder::stand_still(straight(100.0), Time::ZERO, Duration(10.0)).unwrap();
        assert_eq!(drifting.total_length(), Length::ZERO);
        assert!(drifting.is_stand_still());
        assert_eq!(drifting, waiting);
        assert_eq!(drifting.traveled_distance_at(Time(7.0)).unwrap(), Length::ZERO);
        let at = drifting.location_at(Time(7.0)).unwrap();
        assert!(close(at.x, 0.0) && close(at.heading, 0.0));
    }

    #[test]
    fn stand_still_keeps_heading_of_path() {
        let plan = builder::stand_still(l_shape(), Time::ZERO, Duration(2.0)).unwrap();
        assert!(close(plan.path().length().si(), 1.0));
        assert!(close(plan.end_location().heading, 0.0));
    }

    #[test]
    fn queries_outside_window_are_validity_errors() {
        let plan = builder::constant_speed(straight(100.0), Time(10.0), Speed(10.0)).unwrap();
        assert!(matches!(plan.speed_at(Time(9.0)), Err(PlanError::Validity(_))));
        assert!(matches!(plan.location_at(Time(20.5)), Err(PlanError::Validity(_))));
        assert!(matches!(plan.time_at_distance(Length(101.0)), Err(PlanError::Validity(_))));
        // boundary round-off is tolerated
        assert!(plan.speed_at(Time(20.0 + 1e-9)).is_ok());
    }

    #[test]
    fn location_follows_polyline_corner() {
        let plan = builder::constant_speed(l_shape(), Time::ZERO, Speed(1.0)).unwrap();
        let at = plan.location_at(Time(15.0)).unwrap();
        assert!(close(at.x, 10.0) && close(at.y, 5.0));
        assert!(close(at.heading, std::f64::consts::FRAC_PI_2));
    }

    #[test]
    fn time_at_distance_skips_into_first_covering_segment() {
        let segments = Segments::off(Speed(10.0), Duration(2.0), Acceleration(0.0))
            .add(Duration(2.0), Acceleration(-5.0))
            .add(Duration(3.0), Acceleration(0.0));
        let plan = OperationalPlan::new(straight(1000.0), Time::ZERO, segments).unwrap();
        assert!(close(plan.total_length().si(), 30.0));
        // 20 m is reached at the end of the first segment, not during the wait
        assert!(close(plan.time_at_distance(Length(20.0)).unwrap().si(), 2.0));
        assert!(close(plan.time_at_distance(Length(30.0)).unwrap().si(), 4.0));
        assert!(close(plan.total_duration().si(), 7.0));
    }

    #[test]
    fn time_at_point_projects_laterally() {
        let plan = builder::constant_speed(l_shape(), Time::ZERO, Speed(1.0)).unwrap();
        let east = DirectedPoint::new(4.0, 0.0, 0.0);
        assert!(close(plan.time_at_point(east, false).unwrap().si(), 4.0));
        let north = DirectedPoint::new(10.0, 5.0, std::f64::consts::FRAC_PI_2);
        assert!(close(plan.time_at_point(north, false).unwrap().si(), 15.0));
    }

    #[test]
    fn time_at_point_upstream_clamps_to_start() {
        let plan = builder::constant_speed(l_shape(), Time::ZERO, Speed(1.0)).unwrap();
        let before = DirectedPoint::new(-3.0, 0.0, 0.0);
        assert_eq!(plan.time_at_point(before, true).unwrap(), Time::ZERO);
        assert!(matches!(plan.time_at_point(before, false), Err(PlanError::Validity(_))));
    }

    #[test]
    fn time_at_point_beyond_end_is_validity_error() {
        let plan = builder::constant_speed(l_shape(), Time::ZERO, Speed(1.0)).unwrap();
        let beyond = DirectedPoint::new(10.0, 15.0, std::f64::consts::FRAC_PI_2);
        assert!(matches!(plan.time_at_point(beyond, false), Err(PlanError::Validity(_))));
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use super::*;

    fn two_phase(v0: f64, t1: f64, a1: f64, t2: f64, a2: f64) -> Segments {
        Segments::off(Speed(v0), Duration(t1), Acceleration(a1)).add(Duration(t2), Acceleration(a2))
    }

    proptest! {
        #[test]
        fn sequential_adds_are_continuous(
            v0 in 0.0..30.0f64,
            steps in prop::collection::vec((0.1..5.0f64, -4.0..3.0f64), 1..8),
        ) {
            let mut s = Segments::off(Speed(v0), Duration(1.0), Acceleration(0.0));
            for (t, a) in steps {
                s.push(Duration(t), Acceleration(a));
            }
            for pair in s.as_slice().windows(2) {
                if !pair[1].is_stand_still() {
                    prop_assert!((pair[1].start_speed().si() - pair[0].end_speed().si()).abs() < 1e-9);
                }
                prop_assert!(pair[0].end_speed().si() > -1e-9);
            }
        }

        #[test]
        fn plan_spans_zero_to_total_length(
            v0 in 0.0..30.0f64,
            t1 in 0.5..10.0f64,
            a1 in -3.0..3.0f64,
            t2 in 0.5..10.0f64,
            a2 in -3.0..3.0f64,
            length in 1.0..400.0f64,
        ) {
            let plan = OperationalPlan::new(
                straight(length),
                Time(3.0),
                two_phase(v0, t1, a1, t2, a2),
            ).unwrap();
            let start = plan.traveled_distance_at(plan.start_time()).unwrap();
            let end = plan.traveled_distance_at(plan.end_time()).unwrap();
            prop_assert!(start.si().abs() < 1e-6);
            prop_assert!((end - plan.total_length()).si().abs() < 1e-6);
            prop_assert!(plan.total_length().si() <= length + 1e-6);
        }

        #[test]
        fn distance_time_round_trip(
            v0 in 0.0..30.0f64,
            t1 in 0.5..10.0f64,
            a1 in -3.0..3.0f64,
            t2 in 0.5..10.0f64,
            a2 in -3.0..3.0f64,
            length in 1.0..400.0f64,
            fraction in 0.0..=1.0f64,
        ) {
            let plan = OperationalPlan::new(
                straight(length),
                Time::ZERO,
                two_phase(v0, t1, a1, t2, a2),
            ).unwrap();
            let d = plan.total_length() * fraction;
            let t = plan.time_at_distance(d).unwrap();
            let back = plan.traveled_distance_at(t).unwrap();
            prop_assert!((back - d).si().abs() < 1e-6, "d={d} back={back}");
        }
    }
}
