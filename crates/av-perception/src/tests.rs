//! Unit tests for av-perception.

#[cfg(test)]
mod cell {
    use std::sync::Arc;
    use std::thread;

    use crate::SnapshotCell;

    #[test]
    fn empty_cell_has_no_value() {
        let cell: SnapshotCell<u32> = SnapshotCell::new();
        assert!(cell.latest().is_none());
        assert_eq!(cell.version(), 0);
    }

    #[test]
    fn most_recent_publish_wins() {
        let cell = SnapshotCell::new();
        assert_eq!(cell.publish(vec![1], 0.1), 1);
        assert_eq!(cell.publish(vec![2, 3], 0.2), 2);
        let latest = cell.latest().unwrap();
        assert_eq!(latest.value, vec![2, 3]);
        assert_eq!(latest.stamp_secs, 0.2);
        assert_eq!(latest.version, 2);
    }

    #[test]
    fn reader_keeps_its_snapshot_across_publishes() {
        let cell = SnapshotCell::new();
        cell.publish("first", 0.0);
        let held = cell.latest().unwrap();
        cell.publish("second", 1.0);
        assert_eq!(held.value, "first");
        assert_eq!(cell.latest().unwrap().value, "second");
    }

    #[test]
    fn concurrent_writer_never_tears_values() {
        let cell = Arc::new(SnapshotCell::new());
        let writer = {
            let cell = Arc::clone(&cell);
            thread::spawn(move || {
                for i in 0..1_000u64 {
                    cell.publish(vec![i; 8], i as f64);
                }
            })
        };
        for _ in 0..1_000 {
            if let Some(s) = cell.latest() {
                let first = s.value[0];
                assert!(s.value.iter().all(|&v| v == first));
                assert_eq!(s.stamp_secs, first as f64);
            }
        }
        writer.join().unwrap();
        assert_eq!(cell.version(), 1_000);
        assert_eq!(cell.latest().unwrap().value[0], 999);
    }
}

#[cfg(test)]
mod snapshot {
    use av_core::{LightId, ObjectId, Point2, Pose, Segment};

    use crate::{
        DetectedObject, LightState, PerceptionInput, PerceptionSnapshot, SnapshotCell, TrafficLight,
    };

    fn light() -> TrafficLight {
        TrafficLight::new(
            LightId(1),
            LightState::Stop,
            Segment::new(Point2::new(20.0, -2.0), Point2::new(20.0, 2.0)),
        )
    }

    #[test]
    fn unpublished_inputs_are_unknown_but_not_stale() {
        let objects = SnapshotCell::new();
        let lights = SnapshotCell::new();
        let s = PerceptionSnapshot::capture(&objects, &lights, 5.0, 1.0);
        assert!(s.objects().is_none());
        assert!(s.lights().is_none());
        assert!(s.stale.is_empty());
    }

    #[test]
    fn fresh_inputs_are_visible() {
        let objects = SnapshotCell::new();
        let lights = SnapshotCell::new();
        objects.publish(vec![DetectedObject::new(ObjectId(3), Pose::new(10.0, 0.0, 0.0), 4.0, 2.0)], 4.5);
        lights.publish(vec![light()], 5.0);
        let s = PerceptionSnapshot::capture(&objects, &lights, 5.0, 1.0);
        assert_eq!(s.objects().unwrap()[0].id, ObjectId(3));
        assert_eq!(s.lights().unwrap()[0].state, LightState::Stop);
        assert!(s.stale.is_empty());
    }

    #[test]
    fn old_inputs_are_no_information() {
        let objects = SnapshotCell::new();
        let lights = SnapshotCell::new();
        objects.publish(Vec::new(), 1.0);
        lights.publish(vec![light()], 3.5);
        let s = PerceptionSnapshot::capture(&objects, &lights, 3.0 + 0.5, 1.0);
        // Empty-but-stale objects are unknown, not "no obstacles".
        assert!(s.objects().is_none());
        assert!(s.is_stale(PerceptionInput::Objects));
        assert!(!s.is_stale(PerceptionInput::Lights));
        assert!((s.stale[0].age_secs - 2.5).abs() < 1e-12);
    }

    #[test]
    fn clear_road_is_fresh_and_empty() {
        let s = PerceptionSnapshot::clear_road();
        assert_eq!(s.objects().map(<[_]>::len), Some(0));
        assert_eq!(s.lights().map(<[_]>::len), Some(0));
    }

    #[test]
    fn footprint_matches_box() {
        let o = DetectedObject::new(ObjectId(0), Pose::new(10.0, 0.0, 0.0), 4.0, 2.0);
        let f = o.footprint();
        assert!(f.contains(Point2::new(11.9, 0.9)));
        assert!(!f.contains(Point2::new(12.1, 0.0)));
    }

    #[test]
    fn light_state_helpers() {
        assert_eq!(light().with_state(LightState::Go).state.to_string(), "go");
    }
}

#[cfg(test)]
mod fake {
    use std::f64::consts::FRAC_PI_2;

    use av_core::{ObjectId, Pose};

    use crate::{DetectedObject, FakeObjectGenerator, FakeObjectParams, ObjectSource, PerceptionError};

    #[test]
    fn unplaced_generator_yields_nothing() {
        let mut g = FakeObjectGenerator::new(ObjectId(9), FakeObjectParams::default()).unwrap();
        assert!(g.sample(0.0).is_none());
    }

    #[test]
    fn moves_in_a_straight_line() {
        let params = FakeObjectParams { velocity: 2.0, ..FakeObjectParams::default() };
        let mut g = FakeObjectGenerator::new(ObjectId(9), params).unwrap();
        g.set_initial_pose(Pose::new(1.0, 1.0, FRAC_PI_2), 10.0);
        let o = g.sample(12.5).unwrap();
        assert!((o.pose.x - 1.0).abs() < 1e-9);
        assert!((o.pose.y - 6.0).abs() < 1e-9);
        assert_eq!(o.source, ObjectSource::Fake);
        assert_eq!(o.stamp_secs, 12.5);
        assert_eq!(o.label, "fake");
    }

    #[test]
    fn turns_on_a_circle() {
        // v = 1, w = 1 → radius 1; a quarter turn from (0,0) heading east ends at (1,1).
        let params = FakeObjectParams { velocity: 1.0, angular_velocity: 1.0, ..FakeObjectParams::default() };
        let mut g = FakeObjectGenerator::new(ObjectId(1), params).unwrap();
        g.set_initial_pose(Pose::new(0.0, 0.0, 0.0), 0.0);
        let o = g.sample(FRAC_PI_2).unwrap();
        assert!((o.pose.x - 1.0).abs() < 1e-9, "x = {}", o.pose.x);
        assert!((o.pose.y - 1.0).abs() < 1e-9, "y = {}", o.pose.y);
        assert!((o.pose.yaw - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn expires_after_lifetime() {
        let params = FakeObjectParams { lifetime_secs: 2.0, ..FakeObjectParams::default() };
        let mut g = FakeObjectGenerator::new(ObjectId(1), params).unwrap();
        g.set_initial_pose(Pose::new(0.0, 0.0, 0.0), 1.0);
        assert!(g.sample(3.0).is_some());
        assert!(g.sample(3.1).is_none());
        // Re-placing restarts the lifetime.
        g.set_initial_pose(Pose::new(0.0, 0.0, 0.0), 3.1);
        assert!(g.sample(4.0).is_some());
        g.clear();
        assert!(!g.is_alive(4.0));
    }

    #[test]
    fn noise_is_bounded_and_seeded() {
        let params = FakeObjectParams { position_noise_m: 0.2, seed: 42, ..FakeObjectParams::default() };
        let mut a = FakeObjectGenerator::new(ObjectId(1), params.clone()).unwrap();
        let mut b = FakeObjectGenerator::new(ObjectId(1), params).unwrap();
        a.set_initial_pose(Pose::new(5.0, 5.0, 0.0), 0.0);
        b.set_initial_pose(Pose::new(5.0, 5.0, 0.0), 0.0);
        for i in 0..50 {
            let t = i as f64 * 0.1;
            let (oa, ob) = (a.sample(t).unwrap(), b.sample(t).unwrap());
            assert_eq!(oa.pose, ob.pose);
            assert!((oa.pose.x - 5.0).abs() <= 0.2 && (oa.pose.y - 5.0).abs() <= 0.2);
        }
    }

    #[test]
    fn merge_appends_fake_to_real() {
        let mut g = FakeObjectGenerator::new(ObjectId(100), FakeObjectParams::default()).unwrap();
        let real = vec![DetectedObject::new(ObjectId(1), Pose::new(3.0, 0.0, 0.0), 1.0, 1.0)];
        assert_eq!(g.merge(&real, 0.0).len(), 1);
        g.set_initial_pose(Pose::new(8.0, 0.0, 0.0), 0.0);
        let merged = g.merge(&real, 0.5);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].source, ObjectSource::Real);
        assert_eq!(merged[1].id, ObjectId(100));
    }

    #[test]
    fn rejects_degenerate_size() {
        let params = FakeObjectParams { width: 0.0, ..FakeObjectParams::default() };
        assert!(matches!(
            FakeObjectGenerator::new(ObjectId(1), params),
            Err(PerceptionError::InvalidFakeObject(_))
        ));
    }
}
