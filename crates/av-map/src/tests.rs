//! Unit tests for av-map.
//!
//! Networks are hand-built so the tests need no map files, except the loader
//! tests which write CSV into temp directories.

#[cfg(test)]
mod helpers {
    use av_core::{LaneId, Point2, WaypointId};

    use crate::{LanePoint, RoadNetwork, RoadNetworkBuilder};

    /// Two parallel 100 m lanes heading east, 3.5 m apart, plus an isolated
    /// stub lane far to the north.
    ///
    /// ```text
    ///   lane 2:            (0,500) → (5,500)          (no connection)
    ///   lane 1 (left):     (0,3.5) → … → (100,3.5)
    ///   lane 0 (right):    (0,0)   → … → (100,0)
    /// ```
    ///
    /// Every lane-0 waypoint is linked to its lane-1 neighbour both ways.
    pub fn two_lanes() -> (RoadNetwork, Vec<WaypointId>, Vec<WaypointId>, Vec<WaypointId>) {
        let mut b = RoadNetworkBuilder::new();
        let lane = |y: f64| -> Vec<LanePoint> {
            (0..=20).map(|i| LanePoint::new(Point2::new(i as f64 * 5.0, y), 10.0)).collect()
        };
        let l0 = b.add_lane(LaneId(0), &lane(0.0));
        let l1 = b.add_lane(LaneId(1), &lane(3.5));
        for (&r, &l) in l0.iter().zip(&l1) {
            b.link_adjacent(r, l);
        }
        let stub = b.add_lane(
            LaneId(2),
            &[
                LanePoint::new(Point2::new(0.0, 500.0), 5.0),
                LanePoint::new(Point2::new(5.0, 500.0), 5.0),
            ],
        );
        (b.build(), l0, l1, stub)
    }
}

// ── Builder & network structure ────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use av_core::{LaneId, Point2};

    use crate::{EdgeKind, LanePoint, RoadNetworkBuilder};

    #[test]
    fn debug_output_summarises_the_network() {
        let (net, ..) = super::helpers::two_lanes();
        let shown = format!("{net:?}");
        assert!(shown.starts_with("RoadNetwork {"), "{shown}");
        assert!(shown.contains("waypoints: 44"), "{shown}");
    }

    #[test]
    fn empty_build() {
        let net = RoadNetworkBuilder::new().build();
        assert_eq!(net.waypoint_count(), 0);
        assert_eq!(net.edge_count(), 0);
        assert!(net.is_empty());
        assert!(net.snap(Point2::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn lane_headings_are_derived() {
        let mut b = RoadNetworkBuilder::new();
        let ids = b.add_lane(
            LaneId(0),
            &[
                LanePoint::new(Point2::new(0.0, 0.0), 10.0),
                LanePoint::new(Point2::new(0.0, 5.0), 10.0),
                LanePoint::new(Point2::new(0.0, 10.0), 10.0),
            ],
        );
        let net = b.build();
        for id in ids {
            let h = net.waypoint(id).heading;
            assert!((h - std::f64::consts::FRAC_PI_2).abs() < 1e-12, "heading {h}");
        }
    }

    #[test]
    fn csr_successors_and_predecessors() {
        let (net, l0, l1, _) = super::helpers::two_lanes();
        // Interior lane-0 waypoint: one follow edge + one lane change out.
        assert_eq!(net.out_edges(l0[5]).count(), 2);
        assert_eq!(net.successors(l0[5]).collect::<Vec<_>>(), vec![l0[6]]);
        assert_eq!(net.predecessors(l0[5]).collect::<Vec<_>>(), vec![l0[4]]);
        // First waypoint has no predecessor but is entered from lane 1.
        assert_eq!(net.predecessors(l0[0]).count(), 0);
        assert_eq!(net.in_edges(l0[0]).count(), 1);
        assert_eq!(net.waypoint(l0[3]).left, Some(l1[3]));
        assert_eq!(net.waypoint(l1[3]).right, Some(l0[3]));
        assert_eq!(net.waypoint(l0[3]).right, None);
    }

    #[test]
    fn edges_carry_kind_and_length() {
        let (net, l0, l1, _) = super::helpers::two_lanes();
        for e in net.out_edges(l0[2]) {
            let to = net.edge_to[e.index()];
            match net.edge_kind[e.index()] {
                EdgeKind::Follow => {
                    assert_eq!(to, l0[3]);
                    assert!((net.edge_length_m[e.index()] - 5.0).abs() < 1e-12);
                }
                EdgeKind::LaneChange => {
                    assert_eq!(to, l1[2]);
                    assert!((net.edge_length_m[e.index()] - 3.5).abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn duplicate_edges_collapse() {
        let mut b = RoadNetworkBuilder::new();
        let ids = b.add_lane(
            LaneId(0),
            &[
                LanePoint::new(Point2::new(0.0, 0.0), 10.0),
                LanePoint::new(Point2::new(5.0, 0.0), 10.0),
            ],
        );
        b.connect(ids[0], ids[1]);
        assert_eq!(b.edge_count(), 2);
        assert_eq!(b.build().edge_count(), 1);
    }
}

// ── Spatial snap ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod snap {
    use av_core::Point2;

    #[test]
    fn snaps_to_nearest_waypoint() {
        let (net, l0, l1, _) = super::helpers::two_lanes();
        let (id, d) = net.snap(Point2::new(11.0, 0.5)).unwrap();
        assert_eq!(id, l0[2]);
        assert!((d - (1.0f64 + 0.25).sqrt()).abs() < 1e-9);
        let (id, _) = net.snap(Point2::new(49.0, 3.0)).unwrap();
        assert_eq!(id, l1[10]);
    }
}

// ── Planner ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod planner {
    use av_core::{LaneId, PlanningParams, Point2, Pose, WaypointId};

    use crate::{DijkstraPlanner, GlobalPlanner, PlanningError, RoadNetworkBuilder};

    fn planner() -> DijkstraPlanner {
        DijkstraPlanner::new(&PlanningParams::default())
    }

    #[test]
    fn straight_route_along_one_lane() {
        let (net, l0, l1, _) = super::helpers::two_lanes();
        let paths = planner()
            .compute_global_paths(Pose::new(0.4, 0.2, 0.0), Pose::new(100.0, -0.3, 0.0), &net)
            .unwrap();
        let route = &paths[0];
        assert_eq!(route.first().unwrap().id, l0[0]);
        assert_eq!(route.last().unwrap().id, l0[20]);
        assert_eq!(route.waypoints.len(), 21);
        assert!((route.length_m - 100.0).abs() < 1e-9);
        assert_eq!(route.heading_change, 0.0);

        // Lane 0 only has a left neighbour: one alternate, entirely on lane 1.
        assert_eq!(paths.len(), 2);
        let alt = &paths[1];
        assert!(alt.waypoints.iter().zip(&l1).all(|(w, &id)| w.id == id));
    }

    #[test]
    fn lane_change_taken_when_goal_is_on_other_lane() {
        let (net, l0, l1, _) = super::helpers::two_lanes();
        let paths = planner()
            .compute_global_paths(Pose::new(0.0, 0.0, 0.0), Pose::new(100.0, 3.5, 0.0), &net)
            .unwrap();
        let route = &paths[0];
        assert_eq!(route.first().unwrap().id, l0[0]);
        assert_eq!(route.last().unwrap().id, l1[20]);
        let changes = route.waypoints.windows(2).filter(|w| w[0].lane != w[1].lane).count();
        assert_eq!(changes, 1);
        // Every change point costs the same; lane-0 waypoints settle before
        // the lane-1 ones, so the change is made at the last shared station.
        assert_eq!(route.waypoints.len(), 22);
        assert_eq!(route.waypoints[20].id, l0[20]);
    }

    #[test]
    fn off_road_pose_is_rejected() {
        let (net, _, _, _) = super::helpers::two_lanes();
        let err = planner()
            .compute_global_paths(Pose::new(50.0, -20.0, 0.0), Pose::new(100.0, 0.0, 0.0), &net)
            .unwrap_err();
        match err {
            PlanningError::PoseOffRoad { distance_m, radius_m } => {
                assert!((distance_m - 20.0).abs() < 1e-9);
                assert_eq!(radius_m, 5.0);
            }
            other => panic!("expected PoseOffRoad, got {other:?}"),
        }
    }

    #[test]
    fn disconnected_goal_is_no_path() {
        let (net, l0, _, stub) = super::helpers::two_lanes();
        let err = planner()
            .compute_global_paths(Pose::new(0.0, 0.0, 0.0), Pose::new(5.0, 500.0, 0.0), &net)
            .unwrap_err();
        assert_eq!(err, PlanningError::NoPathFound { from: l0[0], to: stub[1] });
    }

    #[test]
    fn driving_backwards_is_no_path() {
        let (net, _, _, _) = super::helpers::two_lanes();
        let err = planner()
            .compute_global_paths(Pose::new(50.0, 0.0, 0.0), Pose::new(10.0, 0.0, 0.0), &net)
            .unwrap_err();
        assert!(matches!(err, PlanningError::NoPathFound { .. }));
    }

    #[test]
    fn search_bound_limits_reach() {
        let (net, _, _, _) = super::helpers::two_lanes();
        let params = PlanningParams { max_search_distance_m: 20.0, ..PlanningParams::default() };
        let p = DijkstraPlanner::new(&params);
        assert!(p.compute_global_paths(Pose::new(0.0, 0.0, 0.0), Pose::new(20.0, 0.0, 0.0), &net).is_ok());
        assert!(matches!(
            p.compute_global_paths(Pose::new(0.0, 0.0, 0.0), Pose::new(25.0, 0.0, 0.0), &net),
            Err(PlanningError::NoPathFound { .. })
        ));
    }

    #[test]
    fn same_start_and_goal_is_single_waypoint() {
        let (net, l0, _, _) = super::helpers::two_lanes();
        let paths = planner()
            .compute_global_paths(Pose::new(30.0, 0.0, 0.0), Pose::new(31.0, 0.0, 0.0), &net)
            .unwrap();
        assert_eq!(paths[0].waypoints.len(), 1);
        assert_eq!(paths[0].waypoints[0].id, l0[6]);
        assert_eq!(paths[0].length_m, 0.0);
    }

    #[test]
    fn equal_length_ties_prefer_smaller_heading_change() {
        // Diamond A → {C, B} → D with identical lengths.  C is added first so
        // the id tie-break alone would pick it; B keeps a straight heading.
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_waypoint(LaneId(0), Point2::new(0.0, 0.0), 0.0, 0.0, 10.0);
        let c = b.add_waypoint(LaneId(2), Point2::new(5.0, -5.0), 0.0, 1.0, 10.0);
        let bb = b.add_waypoint(LaneId(1), Point2::new(5.0, 5.0), 0.0, 0.0, 10.0);
        let d = b.add_waypoint(LaneId(3), Point2::new(10.0, 0.0), 0.0, 0.0, 10.0);
        b.connect(a, c);
        b.connect(c, d);
        b.connect(a, bb);
        b.connect(bb, d);
        let net = b.build();
        let paths = planner()
            .compute_global_paths(Pose::new(0.0, 0.0, 0.0), Pose::new(10.0, 0.0, 0.0), &net)
            .unwrap();
        let ids: Vec<WaypointId> = paths[0].waypoints.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![a, bb, d]);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let (net, _, _, _) = super::helpers::two_lanes();
        let p = planner();
        let start = Pose::new(3.0, 0.5, 0.0);
        let goal = Pose::new(77.0, 3.0, 0.0);
        let first = p.compute_global_paths(start, goal, &net).unwrap();
        for _ in 0..5 {
            assert_eq!(p.compute_global_paths(start, goal, &net).unwrap(), first);
        }
    }
}

// ── Planner properties ────────────────────────────────────────────────────────

#[cfg(test)]
mod planner_props {
    use proptest::prelude::*;

    use av_core::{PlanningParams, Pose};

    use crate::{DijkstraPlanner, GlobalPlanner};

    proptest! {
        #[test]
        fn endpoints_lie_within_snap_radius(
            sx in 0.0f64..90.0,
            sy in -1.0f64..1.0,
            gap in 5.0f64..10.0,
            gy in -1.0f64..4.5,
        ) {
            let (net, _, _, _) = super::helpers::two_lanes();
            let params = PlanningParams::default();
            let planner = DijkstraPlanner::new(&params);
            let start = Pose::new(sx, sy, 0.0);
            let goal = Pose::new((sx + gap).min(100.0), gy, 0.0);

            let paths = planner.compute_global_paths(start, goal, &net).unwrap();
            let route = &paths[0];
            prop_assert!(!route.is_empty());
            let first = route.first().unwrap().pos;
            let last = route.last().unwrap().pos;
            prop_assert!(first.distance(start.position()) <= params.snap_radius_m);
            prop_assert!(last.distance(goal.position()) <= params.snap_radius_m);

            let again = planner.compute_global_paths(start, goal, &net).unwrap();
            prop_assert_eq!(again, paths);
        }
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use av_core::{LaneId, MapSource, Point2};

    use crate::{MapError, RoadNetwork, load_lanes_reader, load_network};

    const TWO_LANES: &str = "\
lane_id,x,y,z,heading,speed_limit,next_lane,left_lane,right_lane
0, 0.0, 0.0, 1.0,, 8.0,,1,
0, 5.0, 0.0, 1.0,, 8.0,,1,
0,10.0, 0.0, 1.0,, 8.0,2,1,
1, 0.0, 3.5,,,    8.0,,,0
1, 5.0, 3.5,,,    8.0,,,0
1,10.0, 3.5,,,    8.0,,,0
2,15.0, 0.0,, 0.0,6.0,,,
2,20.0, 0.0,, 0.0,6.0,,,
";

    #[test]
    fn parses_lanes_links_and_successors() {
        let net = load_lanes_reader(Cursor::new(TWO_LANES)).unwrap();
        assert_eq!(net.waypoint_count(), 8);

        let w0 = net.waypoint(av_core::WaypointId(0));
        assert_eq!(w0.lane, LaneId(0));
        assert_eq!(w0.z, 1.0);
        assert_eq!(w0.speed_limit, 8.0);
        assert_eq!(w0.heading, 0.0);
        assert_eq!(w0.left.map(|id| net.waypoint(id).pos), Some(Point2::new(0.0, 3.5)));

        let w4 = net.waypoint(av_core::WaypointId(4));
        assert_eq!(w4.z, 0.0);
        assert_eq!(w4.right.map(|id| net.waypoint(id).pos), Some(Point2::new(5.0, 0.0)));

        // next_lane joins lane 0's tail to lane 2's head.
        let tail = av_core::WaypointId(2);
        let head = av_core::WaypointId(6);
        assert_eq!(net.successors(tail).collect::<Vec<_>>(), vec![head]);
        assert_eq!(net.predecessors(head).collect::<Vec<_>>(), vec![tail]);
    }

    #[test]
    fn unknown_neighbour_lane_is_an_error() {
        let csv = "lane_id,x,y,z,heading,speed_limit,next_lane,left_lane,right_lane\n0,0,0,,,5,,9,\n";
        let err = load_lanes_reader(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, MapError::UnknownLane { lane: 0, target: 9 }), "got {err:?}");
    }

    #[test]
    fn malformed_row_is_a_parse_error() {
        let csv = "lane_id,x,y,z,heading,speed_limit,next_lane,left_lane,right_lane\nzero,0,0,,,5,,,\n";
        assert!(matches!(load_lanes_reader(Cursor::new(csv)), Err(MapError::Parse(_))));
    }

    #[test]
    fn file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("town.csv");
        std::fs::write(&path, TWO_LANES).unwrap();
        let net = load_network(&MapSource::File(path), None).unwrap();
        assert_eq!(net.waypoint_count(), 8);
    }

    #[test]
    fn folder_source_merges_csv_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let header = "lane_id,x,y,z,heading,speed_limit,next_lane,left_lane,right_lane\n";
        std::fs::write(dir.path().join("b.csv"), format!("{header}1,0,10,,,5,,,\n1,5,10,,,5,,,\n")).unwrap();
        std::fs::write(dir.path().join("a.csv"), format!("{header}0,0,0,,,5,1,,\n0,5,0,,,5,1,,\n")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let net = load_network(&MapSource::Folder(dir.path().to_path_buf()), None).unwrap();
        assert_eq!(net.waypoint_count(), 4);
        // a.csv first: its lane gets the low ids and links into b.csv's lane.
        assert_eq!(net.waypoint(av_core::WaypointId(0)).lane, LaneId(0));
        assert_eq!(
            net.successors(av_core::WaypointId(1)).collect::<Vec<_>>(),
            vec![av_core::WaypointId(2)]
        );
    }

    #[test]
    fn preloaded_source_requires_a_network() {
        assert!(matches!(
            load_network(&MapSource::Preloaded, None),
            Err(MapError::MissingPreloaded)
        ));
        let (net, _, _, _) = super::helpers::two_lanes();
        let n = net.waypoint_count();
        assert_eq!(load_network(&MapSource::Preloaded, Some(net)).unwrap().waypoint_count(), n);
    }

    #[test]
    fn header_only_file_is_empty_network() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "lane_id,x,y,z,heading,speed_limit,next_lane,left_lane,right_lane\n").unwrap();
        assert!(matches!(load_network(&MapSource::File(path), None), Err(MapError::EmptyNetwork)));
        assert!(matches!(
            load_network(&MapSource::Preloaded, Some(RoadNetwork::empty())),
            Err(MapError::EmptyNetwork)
        ));
    }
}
