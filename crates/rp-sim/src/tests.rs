//! Unit tests for rp-sim.
//!
//! Fixture routes run east along 52.2° N, where consecutive stops 0.01°
//! apart are about 681 m, i.e. roughly 41 s at 60 km/h.

#[cfg(test)]
mod helpers {
    use rp_core::{GeoPoint, PlannerConfig};
    use rp_network::{Route, SegmentParams, StopDraft};

    use crate::{
        ArrivalNotice, Direction, EngineBuilder, HaltReason, ReverseCause, SimObserver,
        SimulationEngine, TickHandle, TickOutcome, VehiclePose,
    };

    pub fn pt(lon: f64) -> GeoPoint {
        GeoPoint::new(lon, 52.2)
    }

    /// A ─ B ─ C ─ D, three chained segments.  With `terminals`, A and D are
    /// terminal stops.  B dwells 30 s, C 10 s.
    pub fn line_route(terminals: bool) -> Route {
        let mut route = Route::new("Test line", &PlannerConfig::default());
        {
            let mut b = route.builder();
            let end = |name: &str| {
                let d = StopDraft::named(name);
                if terminals { d.terminal() } else { d }
            };
            b.add_stop(pt(21.00), end("A")).unwrap();
            b.add_stop(pt(21.01), StopDraft::named("B").dwell(30).passengers(4, 2)).unwrap();
            b.add_stop(pt(21.02), StopDraft::named("C").dwell(10)).unwrap();
            b.add_stop(pt(21.03), end("D")).unwrap();
            for lon in [21.00, 21.01, 21.02] {
                b.add_segment(&[pt(lon), pt(lon + 0.01)], SegmentParams::default()).unwrap();
            }
        }
        route
    }

    pub fn engine(route: &Route) -> SimulationEngine {
        EngineBuilder::new(route).build().unwrap()
    }

    /// Observer that records every callback.
    pub struct Recorder {
        pub attached:   bool,
        pub poses:      Vec<VehiclePose>,
        pub arrivals:   Vec<ArrivalNotice>,
        pub departures: Vec<(rp_core::StopId, f64)>,
        pub reversals:  Vec<(Direction, ReverseCause)>,
        pub halts:      Vec<HaltReason>,
    }

    impl Default for Recorder {
        fn default() -> Self {
            Self {
                attached:   true,
                poses:      Vec::new(),
                arrivals:   Vec::new(),
                departures: Vec::new(),
                reversals:  Vec::new(),
                halts:      Vec::new(),
            }
        }
    }

    impl SimObserver for Recorder {
        fn is_attached(&self) -> bool {
            self.attached
        }
        fn on_pose(&mut self, pose: &VehiclePose) {
            self.poses.push(*pose);
        }
        fn on_arrival(&mut self, notice: &ArrivalNotice) {
            self.arrivals.push(notice.clone());
        }
        fn on_departure(&mut self, stop: rp_core::StopId, sim_secs: f64) {
            self.departures.push((stop, sim_secs));
        }
        fn on_reverse(&mut self, direction: Direction, cause: ReverseCause) {
            self.reversals.push((direction, cause));
        }
        fn on_halt(&mut self, reason: HaltReason) {
            self.halts.push(reason);
        }
    }

    /// Tick once per simulated second from `t0` for `n` frames; returns the
    /// next timestamp.
    pub fn run_secs(
        engine: &mut SimulationEngine,
        handle: TickHandle,
        t0: f64,
        n: usize,
        obs: &mut Recorder,
    ) -> f64 {
        let mut t = t0;
        for _ in 0..n {
            assert_eq!(engine.tick(handle, t, obs), TickOutcome::Continue);
            t += 1.0;
        }
        t
    }
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scheduler {
    use crate::Scheduler;

    #[test]
    fn cancel_invalidates_handle() {
        let mut s = Scheduler::new();
        assert_eq!(s.current(), None);
        let h = s.schedule();
        assert!(s.is_current(h));
        assert_eq!(s.current(), Some(h));
        s.cancel();
        assert!(!s.is_current(h));
        s.cancel();
        let h2 = s.schedule();
        assert_ne!(h, h2);
        assert!(s.is_current(h2));
        assert!(!s.is_current(h));
    }

    #[test]
    fn reschedule_supersedes() {
        let mut s = Scheduler::new();
        let h1 = s.schedule();
        let h2 = s.schedule();
        assert!(!s.is_current(h1));
        assert!(s.is_current(h2));
    }
}

// ── Frame sources ───────────────────────────────────────────────────────────

#[cfg(test)]
mod frames {
    use std::time::Duration;

    use crate::{FixedFrames, FrameSource, WallClockFrames};

    #[test]
    fn fixed_frames_step_from_zero() {
        let mut f = FixedFrames::new(0.5);
        let got: Vec<f64> = (0..4).map(|_| f.next_frame()).collect();
        assert_eq!(got, vec![0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn wall_clock_frames_are_monotonic() {
        let mut f = WallClockFrames::new(Duration::from_millis(2));
        let a = f.next_frame();
        let b = f.next_frame();
        let c = f.next_frame();
        assert!(a <= b && b <= c);
        // The third frame waits for two intervals past the origin.
        assert!(c >= 0.004);
    }
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod snapshot {
    use rp_core::PlannerConfig;
    use rp_network::{Route, RouteParams, SegmentParams, StopDraft, StopEdit};

    use super::helpers::{line_route, pt};
    use crate::RouteSnapshot;

    #[test]
    fn stops_match_by_tolerance() {
        let route = line_route(true);
        let snap = RouteSnapshot::capture(&route, &PlannerConfig::default());
        assert!(snap.is_playable());
        assert_eq!(snap.path().len(), 4);
        assert_eq!(snap.stop_at_vertex(1).map(|s| s.name.as_str()), Some("B"));
        assert!(snap.stop_at_vertex(3).unwrap().is_terminal);
        assert!(snap.stop_at_vertex(9).is_none());
    }

    #[test]
    fn intermediate_vertices_are_not_stops() {
        let mut route = Route::new("bend", &PlannerConfig::default());
        {
            let mut b = route.builder();
            b.add_stop(pt(21.00), StopDraft::default()).unwrap();
            b.add_stop(pt(21.01), StopDraft::default()).unwrap();
            b.add_segment(&[pt(21.00), pt(21.005), pt(21.01)], SegmentParams::default()).unwrap();
        }
        let snap = RouteSnapshot::capture(&route, &PlannerConfig::default());
        assert!(snap.stop_at_vertex(1).is_none());
    }

    #[test]
    fn per_leg_speed() {
        let mut route = Route::new("mixed", &PlannerConfig::default());
        {
            let mut b = route.builder();
            for lon in [21.00, 21.01, 21.02, 21.03] {
                b.add_stop(pt(lon), StopDraft::default()).unwrap();
            }
            b.add_segment(&[pt(21.00), pt(21.01)], SegmentParams { gradient_percent: 20.0, ..SegmentParams::default() })
                .unwrap();
            b.add_segment(&[pt(21.02), pt(21.03)], SegmentParams::default()).unwrap();
        }
        let snap = RouteSnapshot::capture(&route, &PlannerConfig::default());
        let kmh = |a, b| snap.leg_speed_mps(a, b) * 3.6;
        assert!((kmh(0, 1) - 36.0).abs() < 1e-9);
        assert!((kmh(1, 0) - 36.0).abs() < 1e-9);
        assert!((kmh(2, 3) - 60.0).abs() < 1e-9);
        // Bridge: equal-length legs at 20 % and 0 % average to 10 %.
        assert!((kmh(1, 2) - 48.0).abs() < 1e-6);
    }

    #[test]
    fn route_params_set_speed() {
        let mut route = line_route(false);
        route.set_params(RouteParams { max_speed_kmh: 30.0, ..RouteParams::default() }).unwrap();
        let snap = RouteSnapshot::capture(&route, &PlannerConfig::default());
        assert!((snap.leg_speed_mps(0, 1) * 3.6 - 30.0).abs() < 1e-9);
    }

    #[test]
    fn later_edits_do_not_leak_in() {
        let mut route = line_route(false);
        let snap = RouteSnapshot::capture(&route, &PlannerConfig::default());
        let b_id = route.network().stops().nth(1).unwrap().id;
        route
            .builder()
            .edit_stop(b_id, StopEdit { name: Some("Renamed".into()), ..StopEdit::default() })
            .unwrap();
        assert_eq!(snap.stop_at_vertex(1).unwrap().name, "B");
    }
}

// ── Controls ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod controls {
    use rp_core::PlannerConfig;
    use rp_network::Route;

    use super::helpers::{Recorder, engine, line_route, pt, run_secs};
    use crate::{
        Direction, EngineBuilder, HaltReason, Phase, RouteSnapshot, SimError, SimulationInputs,
        TickOutcome,
    };

    #[test]
    fn empty_route_cannot_start() {
        let route = Route::new("empty", &PlannerConfig::default());
        let mut e = engine(&route);
        assert!(matches!(e.start(), Err(SimError::EmptyPath)));
        assert!(!e.is_running());
    }

    #[test]
    fn builder_rejects_bad_multiplier() {
        let route = line_route(true);
        assert!(matches!(
            EngineBuilder::new(&route).speed_multiplier(0.0).build(),
            Err(SimError::InvalidSpeedMultiplier(_))
        ));
        let bad = PlannerConfig { frame_interval_secs: -1.0, ..PlannerConfig::default() };
        assert!(matches!(EngineBuilder::new(&route).config(bad).build(), Err(SimError::Config(_))));
    }

    #[test]
    fn first_frame_is_zero_delta() {
        let route = line_route(true);
        let mut e = engine(&route);
        let h = e.start().unwrap();
        let mut obs = Recorder::default();
        e.tick(h, 1_000.0, &mut obs);
        assert_eq!(e.state().progress, 0.0);
        assert_eq!(e.state().position, pt(21.00));
        e.tick(h, 1_001.0, &mut obs);
        assert!(e.state().progress > 0.0);
        assert_eq!(obs.poses.len(), 2);
    }

    #[test]
    fn pause_resume_is_lossless() {
        let route = line_route(true);
        let mut e = engine(&route);
        let h = e.start().unwrap();
        let mut obs = Recorder::default();
        let t = run_secs(&mut e, h, 0.0, 20, &mut obs);
        let before = e.state().clone();

        e.pause();
        assert!(e.is_paused());
        assert_eq!(e.tick(h, t + 5.0, &mut obs), TickOutcome::Stale);

        // An hour of real time passes while paused.
        let h2 = e.resume().unwrap();
        assert_ne!(h, h2);
        assert_eq!(e.tick(h2, t + 3_600.0, &mut obs), TickOutcome::Continue);
        assert_eq!(e.state().position, before.position);
        assert_eq!(e.state().progress, before.progress);
        assert_eq!(e.state().index, before.index);
        assert_eq!(e.state().moving_secs, before.moving_secs);
    }

    #[test]
    fn reset_returns_to_start() {
        let route = line_route(true);
        let mut e = engine(&route);
        let h = e.start().unwrap();
        let mut obs = Recorder::default();
        run_secs(&mut e, h, 0.0, 200, &mut obs);
        assert!(e.state().index > 0 || e.state().progress > 0.0);

        e.reset();
        assert_eq!(e.tick(h, 201.0, &mut obs), TickOutcome::Stale);
        let s = e.state();
        assert_eq!((s.index, s.progress, s.direction), (0, 0.0, Direction::Forward));
        assert_eq!((s.moving_secs, s.dwelling_secs), (0.0, 0.0));
        assert_eq!(s.position, pt(21.00));
        assert_eq!(s.heading_deg, 0.0);
        assert_eq!(s.phase, Phase::Idle);
    }

    #[test]
    fn load_switches_route() {
        let route = line_route(true);
        let mut e = engine(&route);
        let h = e.start().unwrap();
        let empty = Route::new("empty", &PlannerConfig::default());
        e.load(RouteSnapshot::capture(&empty, &PlannerConfig::default()));
        assert_eq!(e.tick(h, 1.0, &mut Recorder::default()), TickOutcome::Stale);
        assert!(e.start().is_err());
    }

    #[test]
    fn detached_target_halts_once() {
        let route = line_route(true);
        let mut e = engine(&route);
        let h = e.start().unwrap();
        let mut obs = Recorder::default();
        run_secs(&mut e, h, 0.0, 5, &mut obs);
        obs.attached = false;
        assert_eq!(e.tick(h, 5.0, &mut obs), TickOutcome::Halted(HaltReason::Detached));
        assert_eq!(e.tick(h, 6.0, &mut obs), TickOutcome::Stale);
        assert_eq!(obs.halts, vec![HaltReason::Detached]);
        assert!(!e.is_running());
    }

    #[test]
    fn speed_multiplier_validation() {
        let route = line_route(true);
        let mut e = engine(&route);
        assert!(e.set_speed_multiplier(4.0).is_ok());
        assert_eq!(e.speed_multiplier(), 4.0);
        assert!(matches!(e.set_speed_multiplier(f64::NAN), Err(SimError::InvalidSpeedMultiplier(_))));
        assert!(e.set_speed_multiplier(-1.0).is_err());
        assert_eq!(e.speed_multiplier(), 4.0);
    }

    #[test]
    fn sync_follows_flags() {
        let route = line_route(true);
        let mut e = engine(&route);
        let mut inputs = SimulationInputs::default();
        assert_eq!(e.sync(inputs), None);

        inputs.run = true;
        let h = e.sync(inputs).unwrap();
        assert_eq!(e.sync(inputs), Some(h));
        let mut obs = Recorder::default();
        run_secs(&mut e, h, 0.0, 10, &mut obs);

        inputs.paused = true;
        assert_eq!(e.sync(inputs), None);
        assert!(e.is_paused());

        inputs.paused = false;
        inputs.speed_multiplier = -3.0;
        let h2 = e.sync(inputs).unwrap();
        assert_eq!(e.speed_multiplier(), 1.0);
        assert!(e.state().progress > 0.0);

        inputs.reset_signal += 1;
        let h3 = e.sync(inputs).unwrap();
        assert_ne!(h2, h3);
        assert_eq!(e.state().progress, 0.0);
        assert_eq!(e.state().index, 0);

        inputs.run = false;
        assert_eq!(e.sync(inputs), None);
        assert!(!e.is_running());
        assert_eq!(e.tick(h3, 100.0, &mut obs), TickOutcome::Stale);
    }
}

// ── Kinematics ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod kinematics {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use rp_core::bearing;
    use rp_core::geo::normalize_deg;

    use super::helpers::{Recorder, engine, line_route, pt};
    use crate::{
        Direction, EngineBuilder, FixedFrames, Phase, ReverseCause, TickOutcome, run_frames,
    };

    #[test]
    fn progress_stays_in_unit_interval() {
        let route = line_route(true);
        let mut e = engine(&route);
        let h = e.start().unwrap();
        let mut obs = Recorder::default();
        let mut rng = SmallRng::seed_from_u64(7);
        let mut t = 0.0;
        for _ in 0..5_000 {
            t += rng.gen_range(0.0..3.0);
            assert_eq!(e.tick(h, t, &mut obs), TickOutcome::Continue);
            let p = e.state().progress;
            assert!((0.0..1.0).contains(&p), "progress {p} at t={t}");
            assert!(e.state().index < 4);
        }
    }

    #[test]
    fn arrival_notice_and_dwell() {
        let route = line_route(true);
        let mut e = engine(&route);
        let h = e.start().unwrap();
        let mut obs = Recorder::default();
        let mut t = 0.0;
        while obs.arrivals.is_empty() {
            e.tick(h, t, &mut obs);
            t += 1.0;
            assert!(t < 100.0, "never arrived");
        }
        let notice = &obs.arrivals[0];
        assert_eq!(notice.name, "B");
        assert_eq!((notice.dwell_secs, notice.passengers_in, notice.passengers_out), (30, 4, 2));
        assert_eq!(notice.path_index, 1);
        assert!(!notice.is_terminal);
        // 681 m at 60 km/h ≈ 40.9 s.
        assert!((notice.total_sim_secs - 41.0).abs() < 1e-9, "{}", notice.total_sim_secs);
        assert_eq!(notice.total_dwell_secs, 0.0);
        assert_eq!(notice.popup(), "B: dwell 30 s, passengers +4/-2");
        assert!(e.state().is_stopped());
        assert_eq!(e.state().position, pt(21.01));

        // 29 s later still dwelling; the 30th second releases the vehicle.
        for _ in 0..29 {
            e.tick(h, t, &mut obs);
            t += 1.0;
        }
        assert!(e.state().is_stopped());
        assert!(obs.departures.is_empty());
        e.tick(h, t, &mut obs);
        assert_eq!(e.state().phase, Phase::Moving);
        assert_eq!(obs.departures.len(), 1);
        assert_eq!(e.state().dwelling_secs, 30.0);
        assert_eq!(e.state().index, 1);
    }

    #[test]
    fn dwell_scales_with_multiplier() {
        let route = line_route(true);
        // 0.125 s frames at ×8: exactly one simulated second per frame.
        let mut e = EngineBuilder::new(&route).speed_multiplier(8.0).build().unwrap();
        let h = e.start().unwrap();
        let mut obs = Recorder::default();
        let mut frames = FixedFrames::new(0.125);
        run_frames(&mut e, h, &mut frames, 2_000, &mut obs);
        let first = &obs.arrivals[0];
        let departed_at = obs.departures[0].1;
        assert!((departed_at - first.total_sim_secs - 30.0).abs() < 1e-6);
    }

    #[test]
    fn terminals_flip_direction_once_each() {
        let route = line_route(true);
        let mut e = engine(&route);
        let h = e.start().unwrap();
        let mut obs = Recorder::default();
        let mut frames = FixedFrames::new(1.0);
        // Out and back: about 3 × 41 s driving + 40 s dwell each way.
        run_frames(&mut e, h, &mut frames, 400, &mut obs);

        let names: Vec<_> = obs.arrivals.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(&names[..6], ["B", "C", "D", "C", "B", "A"]);
        assert_eq!(obs.reversals[0], (Direction::Reversed, ReverseCause::Terminal(obs.arrivals[2].stop)));
        assert_eq!(obs.reversals[1], (Direction::Forward, ReverseCause::Terminal(obs.arrivals[5].stop)));
        assert!(obs.reversals.iter().all(|r| matches!(r.1, ReverseCause::Terminal(_))));
    }

    #[test]
    fn ping_pong_without_terminals() {
        let route = line_route(false);
        let mut e = engine(&route);
        let h = e.start().unwrap();
        let mut obs = Recorder::default();
        let mut frames = FixedFrames::new(1.0);
        run_frames(&mut e, h, &mut frames, 300, &mut obs);

        let names: Vec<_> = obs.arrivals.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(&names[..4], ["B", "C", "D", "C"]);
        assert_eq!(obs.reversals[0], (Direction::Reversed, ReverseCause::EndOfPath));
        assert_eq!(obs.reversals.len(), 1);
    }

    #[test]
    fn heading_flips_when_reversed() {
        let route = line_route(true);
        let mut e = engine(&route);
        let h = e.start().unwrap();
        let mut obs = Recorder::default();
        let mut frames = FixedFrames::new(1.0);
        run_frames(&mut e, h, &mut frames, 300, &mut obs);

        let forward = obs.poses.iter().find(|p| !p.dwelling && p.direction == Direction::Forward && p.progress > 0.0).unwrap();
        assert_eq!(forward.heading_deg, bearing(pt(21.00), pt(21.01)));

        let back = obs.poses.iter().find(|p| !p.dwelling && p.direction == Direction::Reversed && p.progress > 0.0).unwrap();
        let (from, to) = (pt(21.03), pt(21.02));
        assert_eq!(back.heading_deg, normalize_deg(bearing(from, to) + 180.0));
        assert_eq!(back.index, 3);
    }

    #[test]
    fn position_interpolates_linearly() {
        let route = line_route(true);
        let mut e = engine(&route);
        let h = e.start().unwrap();
        let mut obs = Recorder::default();
        e.tick(h, 0.0, &mut obs);
        e.tick(h, 10.0, &mut obs);
        let s = e.state();
        let expected = pt(21.00).lerp(pt(21.01), s.progress);
        assert_eq!(s.position, expected);
        assert!(s.position.lon > 21.00 && s.position.lon < 21.01);
    }

    #[test]
    fn run_frames_stops_on_halt() {
        let route = line_route(true);
        let mut e = engine(&route);
        let h = e.start().unwrap();
        let mut obs = Recorder { attached: false, ..Recorder::default() };
        let summary = run_frames(&mut e, h, &mut FixedFrames::new(1.0), 50, &mut obs);
        assert_eq!(summary.frames, 1);
        assert!(matches!(summary.outcome, TickOutcome::Halted(_)));
    }
}
