//! Unit tests for mts-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, ConflictId, StopLineId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(AgentId::INVALID.0, u32::MAX);
        assert_eq!(ConflictId::INVALID.0, u32::MAX);
        assert!(!StopLineId::default().is_valid());
        assert!(ConflictId(3).is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(ConflictId(7).to_string(), "ConflictId(7)");
    }
}

#[cfg(test)]
mod units {
    use crate::{Acceleration, Duration, Length, Speed, Time};

    #[test]
    fn cross_unit_arithmetic() {
        let v = Speed(10.0);
        let t = Duration(3.0);
        assert_eq!(v * t, Length(30.0));
        assert_eq!(Length(30.0) / v, Duration(3.0));
        assert_eq!(Acceleration(2.0) * t, Speed(6.0));
        assert_eq!(Speed(6.0) / t, Acceleration(2.0));
        assert_eq!(Length(30.0) / t, Speed(10.0));
    }

    #[test]
    fn time_and_duration() {
        let t0 = Time(100.0);
        let t1 = t0 + Duration(2.5);
        assert_eq!(t1, Time(102.5));
        assert_eq!(t1 - t0, Duration(2.5));
        assert_eq!(t1.since(t0), Duration(2.5));
    }

    #[test]
    fn min_max_and_ordering() {
        assert_eq!(Acceleration(-1.0).min(Acceleration(2.0)), Acceleration(-1.0));
        assert_eq!(Acceleration::MAX.min(Acceleration(0.3)), Acceleration(0.3));
        assert!(Length(1.0) < Length(2.0));
        assert!(!Duration::INFINITE.is_finite());
    }

    #[test]
    fn display_has_unit() {
        assert_eq!(Speed(1.5).to_string(), "1.500 m/s");
    }
}

#[cfg(test)]
mod math {
    use crate::math::solve_quadratic;

    #[test]
    fn two_roots_sorted() {
        // (x - 1)(x - 3) = x² - 4x + 3
        let r = solve_quadratic(1.0, -4.0, 3.0);
        assert_eq!(r.len(), 2);
        assert!((r[0] - 1.0).abs() < 1e-12);
        assert!((r[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn linear_fallback() {
        let r = solve_quadratic(0.0, 2.0, -10.0);
        assert_eq!(r, vec![5.0]);
    }

    #[test]
    fn no_real_root() {
        assert!(solve_quadratic(1.0, 0.0, 1.0).is_empty());
        assert!(solve_quadratic(0.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn zero_b_symmetric_roots() {
        let r = solve_quadratic(2.0, 0.0, -8.0);
        assert!((r[0] + 2.0).abs() < 1e-12);
        assert!((r[1] - 2.0).abs() < 1e-12);
    }
}

#[cfg(test)]
mod geometry {
    use crate::{CoreError, Length, Point2, Polyline};
    use crate::geometry::intersection_of_lines;

    fn l_shape() -> Polyline {
        // 10 m east, then 10 m north
        Polyline::from_xy(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]).unwrap()
    }

    #[test]
    fn length_and_segments() {
        let p = l_shape();
        assert!((p.length().si() - 20.0).abs() < 1e-12);
        assert_eq!(p.segment_count(), 2);
        assert!(p.segment(2).is_none());
    }

    #[test]
    fn rejects_degenerate() {
        let err = Polyline::from_xy(&[(1.0, 1.0), (1.0, 1.0)]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPath(_)));
        assert!(Polyline::from_xy(&[(0.0, 0.0)]).is_err());
    }

    #[test]
    fn location_on_second_section() {
        let p = l_shape();
        let loc = p.location_extended(Length(15.0));
        assert!((loc.x - 10.0).abs() < 1e-12);
        assert!((loc.y - 5.0).abs() < 1e-12);
        assert!((loc.heading - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn location_extrapolates() {
        let p = l_shape();
        let before = p.location_extended(Length(-2.0));
        assert!((before.x + 2.0).abs() < 1e-12);
        let after = p.location_extended(Length(22.0));
        assert!((after.y - 12.0).abs() < 1e-12);
    }

    #[test]
    fn fraction_tolerance() {
        let p = l_shape();
        assert!(p.location_fraction(1.005, 0.01).is_ok());
        assert!(p.location_fraction(1.05, 0.01).is_err());
        assert!(p.location_fraction(-0.005, 0.01).is_ok());
    }

    #[test]
    fn extract_keeps_interior_vertices() {
        let p = l_shape();
        let sub = p.extract(Length(5.0), Length(15.0)).unwrap();
        assert_eq!(sub.points().len(), 3);
        assert!((sub.length().si() - 10.0).abs() < 1e-12);
        assert_eq!(sub.first(), Point2::new(5.0, 0.0));
        assert_eq!(sub.last(), Point2::new(10.0, 5.0));
    }

    #[test]
    fn extract_rejects_bad_range() {
        let p = l_shape();
        assert!(p.extract(Length(5.0), Length(5.0)).is_err());
        assert!(p.extract(Length(0.0), Length(25.0)).is_err());
    }

    #[test]
    fn intersection() {
        let p = intersection_of_lines(
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(3.0, -1.0),
            Point2::new(3.0, 1.0),
        )
        .unwrap();
        assert!((p.x - 3.0).abs() < 1e-12 && p.y.abs() < 1e-12);
        assert!(
            intersection_of_lines(
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, 1.0),
                Point2::new(1.0, 1.0),
            )
            .is_none()
        );
    }
}

#[cfg(test)]
mod params {
    use crate::{CoreError, ParameterLookup, ParameterOverride, ParameterType, Parameters};

    #[test]
    fn defaults_cover_every_type() {
        let p = Parameters::with_defaults();
        for ty in ParameterType::ALL {
            assert!(p.parameter(ty).is_ok(), "{ty} missing");
        }
    }

    #[test]
    fn undefined_parameter_errors() {
        let p = Parameters::new();
        let err = p.parameter(ParameterType::TimeFactor).unwrap_err();
        assert_eq!(err, CoreError::ParameterUndefined(ParameterType::TimeFactor));
    }

    #[test]
    fn time_factor_must_be_at_least_one() {
        let mut p = Parameters::with_defaults();
        assert!(p.set(ParameterType::TimeFactor, 0.9).is_err());
        assert!(p.set(ParameterType::TimeFactor, 1.0).is_ok());
        assert!(p.set(ParameterType::ComfortDeceleration, -1.0).is_err());
    }

    #[test]
    fn override_substitutes_one_value() {
        let p = Parameters::with_defaults();
        let o = ParameterOverride::new(&p, ParameterType::StopDistance, 1.5);
        assert_eq!(o.length(ParameterType::StopDistance).unwrap().si(), 1.5);
        assert_eq!(
            o.acceleration(ParameterType::ComfortDeceleration).unwrap().si(),
            ParameterType::ComfortDeceleration.default_value()
        );
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentId, AgentRng};

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = AgentRng::new(12345, AgentId(0));
        let mut r2 = AgentRng::new(12345, AgentId(0));
        for _ in 0..100 {
            assert_eq!(r1.standard_normal(), r2.standard_normal());
        }
    }

    #[test]
    fn different_agents_differ() {
        let mut r0 = AgentRng::new(1, AgentId(0));
        let mut r1 = AgentRng::new(1, AgentId(1));
        let a: u64 = r0.gen_range(0..u64::MAX);
        let b: u64 = r1.gen_range(0..u64::MAX);
        assert_ne!(a, b, "seeds for adjacent agents should diverge");
    }

    #[test]
    fn truncated_normal_in_bounds() {
        let mut rng = AgentRng::new(0, AgentId(0));
        for _ in 0..1000 {
            let v = rng.truncated_normal(1.0, 0.5, 0.8, 1.2);
            assert!((0.8..=1.2).contains(&v));
        }
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = AgentRng::new(0, AgentId(0));
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
    }
}
