//! Unit tests for av-core primitives.

#[cfg(test)]
mod ids {
    use crate::{LightId, ObjectId, WaypointId};

    #[test]
    fn index_roundtrip() {
        let id = WaypointId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(WaypointId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(WaypointId::INVALID.0, u32::MAX);
        assert_eq!(ObjectId::default(), ObjectId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(LightId(7).to_string(), "LightId(7)");
    }
}

#[cfg(test)]
mod geo {
    use std::f64::consts::PI;

    use crate::{Point2, Pose, Segment, normalize_angle};

    #[test]
    fn normalize_wraps_into_half_open_range() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(0.5) - 0.5).abs() < 1e-12);
        assert!((normalize_angle(-2.5 * PI) + 0.5 * PI).abs() < 1e-12);
    }

    #[test]
    fn cross_sign_is_left_positive() {
        let east = Point2::new(1.0, 0.0);
        assert!(east.cross(Point2::new(0.0, 1.0)) > 0.0);
        assert!(east.cross(Point2::new(0.0, -1.0)) < 0.0);
    }

    #[test]
    fn pose_ahead() {
        let p = Pose::new(1.0, 1.0, PI / 2.0).ahead(2.0);
        assert!((p.x - 1.0).abs() < 1e-12 && (p.y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn crossing_segments_intersect() {
        let a = Segment::new(Point2::new(0.0, 0.0), Point2::new(2.0, 2.0));
        let b = Segment::new(Point2::new(0.0, 2.0), Point2::new(2.0, 0.0));
        let p = a.intersection(&b).unwrap();
        assert!((p.x - 1.0).abs() < 1e-12 && (p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn disjoint_and_parallel_segments_do_not_intersect() {
        let a = Segment::new(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0));
        let b = Segment::new(Point2::new(0.0, 1.0), Point2::new(1.0, 1.0));
        let c = Segment::new(Point2::new(2.0, -1.0), Point2::new(2.0, 1.0));
        assert!(a.intersection(&b).is_none());
        assert!(a.intersection(&c).is_none());
    }
}

#[cfg(test)]
mod polyline {
    use crate::Point2;
    use crate::polyline::{arc_lengths, curvature, length, point_at, project, slice};

    fn straight() -> Vec<Point2> {
        (0..=10).map(|i| Point2::new(i as f64, 0.0)).collect()
    }

    #[test]
    fn arc_length_of_straight_line() {
        let pts = straight();
        assert!((length(&pts) - 10.0).abs() < 1e-12);
        assert_eq!(arc_lengths(&pts)[5], 5.0);
    }

    #[test]
    fn projection_reports_signed_lateral_error() {
        let pts = straight();
        let left = project(&pts, Point2::new(3.5, 0.8)).unwrap();
        assert!((left.s - 3.5).abs() < 1e-12);
        assert!((left.lateral - 0.8).abs() < 1e-12);
        assert_eq!(left.segment, 3);

        let right = project(&pts, Point2::new(7.25, -1.5)).unwrap();
        assert!((right.lateral + 1.5).abs() < 1e-12);
        assert!(right.heading.abs() < 1e-12);
    }

    #[test]
    fn projection_of_empty_path_is_none() {
        assert!(project(&[], Point2::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn point_at_extrapolates_past_the_end() {
        let pts = straight();
        let (p, h) = point_at(&pts, 12.0).unwrap();
        assert!((p.x - 12.0).abs() < 1e-12 && p.y.abs() < 1e-12);
        assert!(h.abs() < 1e-12);
        let (start, _) = point_at(&pts, -3.0).unwrap();
        assert_eq!(start, Point2::new(0.0, 0.0));
    }

    #[test]
    fn curvature_of_circle_is_inverse_radius() {
        let r = 20.0;
        let pts: Vec<Point2> = (0..10)
            .map(|i| {
                let a = i as f64 * 0.1;
                Point2::new(r * a.cos(), r * a.sin())
            })
            .collect();
        let k = curvature(&pts, 4);
        assert!((k - 1.0 / r).abs() < 1e-3, "got {k}");
        assert_eq!(curvature(&straight(), 5), 0.0);
    }

    #[test]
    fn slice_interpolates_endpoints() {
        let part = slice(&straight(), 2.5, 5.5);
        assert_eq!(part.first().copied(), Some(Point2::new(2.5, 0.0)));
        assert_eq!(part.last().copied(), Some(Point2::new(5.5, 0.0)));
        assert_eq!(part.len(), 5); // 2.5, 3, 4, 5, 5.5
    }
}

#[cfg(test)]
mod polygon {
    use crate::{Point2, Polygon, Pose};

    #[test]
    fn rectangle_contains_centre_not_outside() {
        let r = Polygon::rectangle(Pose::new(0.0, 0.0, 0.0), 4.0, 2.0);
        assert!(r.contains(Point2::new(0.0, 0.0)));
        assert!(r.contains(Point2::new(1.9, 0.9)));
        assert!(!r.contains(Point2::new(2.1, 0.0)));
        assert!(!r.contains(Point2::new(0.0, 1.1)));
    }

    #[test]
    fn overlapping_rectangles_intersect() {
        let a = Polygon::rectangle(Pose::new(0.0, 0.0, 0.0), 4.0, 2.0);
        let b = Polygon::rectangle(Pose::new(3.0, 0.0, 0.3), 4.0, 2.0);
        let c = Polygon::rectangle(Pose::new(10.0, 0.0, 0.0), 4.0, 2.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn crossing_without_contained_vertices_intersects() {
        // A long thin bar crossing a square: no vertex of either is inside the other.
        let square = Polygon::rectangle(Pose::new(0.0, 0.0, 0.0), 2.0, 2.0);
        let bar = Polygon::rectangle(Pose::new(0.0, 0.0, std::f64::consts::FRAC_PI_2), 10.0, 0.5);
        assert!(square.intersects(&bar));
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, Tick};

    #[test]
    fn clock_advances_in_fixed_steps() {
        let mut c = SimClock::new(10.0);
        for _ in 0..25 {
            c.advance();
        }
        assert_eq!(c.current_tick, Tick(25));
        assert!((c.elapsed_secs() - 2.5).abs() < 1e-9);
        assert!((c.dt() - 0.1).abs() < 1e-12);
    }
}

#[cfg(test)]
mod config {
    use std::io::Write;

    use crate::{AvError, MapSource, Settings};

    #[test]
    fn empty_toml_yields_defaults() {
        let s = Settings::from_toml_str("").unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let s = Settings::from_toml_str(
            r#"
            [car]
            max_speed = 12.5

            [sim]
            looper = true
            map_source = { kind = "file", path = "maps/town.csv" }
            start_pose = { x = 1.0, y = 2.0, yaw = 0.0 }
            "#,
        )
        .unwrap();
        assert_eq!(s.car.max_speed, 12.5);
        assert!(s.sim.looper);
        assert_eq!(s.sim.map_source, MapSource::File("maps/town.csv".into()));
        assert_eq!(s.sim.start_pose.map(|p| p.y), Some(2.0));
        assert_eq!(s.car.wheelbase_m, 2.7); // untouched default
    }

    #[test]
    fn non_positive_tick_rate_is_fatal() {
        let err = Settings::from_toml_str("[sim]\ntick_hz = 0.0\n").unwrap_err();
        assert!(matches!(err, AvError::ConfigurationInvalid(_)), "got {err:?}");
    }

    #[test]
    fn stop_decel_above_vehicle_limit_is_fatal() {
        let err = Settings::from_toml_str("[planning]\nstop_decel = 9.0\n").unwrap_err();
        assert!(matches!(err, AvError::ConfigurationInvalid(_)));
    }

    #[test]
    fn malformed_toml_is_a_toml_error() {
        let err = Settings::from_toml_str("[car\nmax_speed = ").unwrap_err();
        assert!(matches!(err, AvError::Toml(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[controller]\nspeed_kp = 1.5").unwrap();
        let s = Settings::from_file(f.path()).unwrap();
        assert_eq!(s.controller.speed_kp, 1.5);
    }

    #[test]
    fn map_source_identifier_roundtrip() {
        for src in [
            MapSource::Preloaded,
            MapSource::Folder("maps".into()),
            MapSource::File("maps/a.csv".into()),
        ] {
            assert_eq!(MapSource::from_identifier(&src.identifier()).unwrap(), src);
        }
        assert!(MapSource::from_identifier("kml").is_err());
    }
}
