//! shuttle: play one vehicle back and forth along a route.
//!
//! ```text
//! shuttle [ROUTE.json] [--config PLANNER.json] [--speed MULTIPLIER] [--minutes N]
//! ```
//!
//! Without a route file a built-in sample line is used.  The trace is
//! written to `output/shuttle/` and the route itself is saved next to it.

mod sample;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rp_core::{PlannerConfig, format_duration};
use rp_network::{Route, load_route_json, save_route_json};
use rp_output::{CsvWriter, OutputWriter, TraceObserver};
use rp_sim::{
    ArrivalNotice, Direction, EngineBuilder, FixedFrames, HaltReason, ReverseCause, SimObserver,
    VehiclePose, run_frames,
};

// ── Constants ─────────────────────────────────────────────────────────────────

const OUTPUT_DIR:          &str = "output/shuttle";
const DEFAULT_MINUTES:     f64  = 30.0;
const DEFAULT_MULTIPLIER:  f64  = 1.0;
/// One trace row per simulated-second-ish at 60 fps.
const TRACE_INTERVAL:      u64  = 60;

// ── Arguments ─────────────────────────────────────────────────────────────────

struct Args {
    route:      Option<PathBuf>,
    config:     Option<PathBuf>,
    multiplier: f64,
    minutes:    f64,
}

fn parse_args() -> Result<Args> {
    let mut args = Args { route: None, config: None, multiplier: DEFAULT_MULTIPLIER, minutes: DEFAULT_MINUTES };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = Some(it.next().context("--config needs a path")?.into()),
            "--speed" => {
                args.multiplier = it.next().context("--speed needs a value")?.parse().context("--speed")?;
            }
            "--minutes" => {
                args.minutes = it.next().context("--minutes needs a value")?.parse().context("--minutes")?;
            }
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            path => args.route = Some(path.into()),
        }
    }
    Ok(args)
}

// ── Observer wrapper printing stop calls ──────────────────────────────────────

struct Announcer<W: OutputWriter> {
    inner:     TraceObserver<W>,
    arrivals:  usize,
    reversals: usize,
}

impl<W: OutputWriter> SimObserver for Announcer<W> {
    fn on_pose(&mut self, pose: &VehiclePose) {
        self.inner.on_pose(pose);
    }

    fn on_arrival(&mut self, notice: &ArrivalNotice) {
        self.arrivals += 1;
        println!(
            "  [{:>9}] {:<24} dwell {:>3} s  +{}/-{}{}",
            format_duration(notice.total_sim_secs),
            notice.name,
            notice.dwell_secs,
            notice.passengers_in,
            notice.passengers_out,
            if notice.is_terminal { "  (terminal)" } else { "" },
        );
        self.inner.on_arrival(notice);
    }

    fn on_reverse(&mut self, direction: Direction, cause: ReverseCause) {
        self.reversals += 1;
        if cause == ReverseCause::EndOfPath {
            println!("  end of path, now running {direction}");
        }
    }

    fn on_halt(&mut self, reason: HaltReason) {
        self.inner.on_halt(reason);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = parse_args()?;

    // 1. Configuration.
    let config = match &args.config {
        Some(path) => PlannerConfig::load(path).with_context(|| format!("reading {}", path.display()))?,
        None => PlannerConfig::default(),
    };
    info!(config = %serde_json::to_string(&config)?, "planner configuration");

    // 2. Route.
    let route = match &args.route {
        Some(path) => {
            let record = load_route_json(path)?;
            Route::from_record(&record, &config).with_context(|| format!("importing {}", path.display()))?
        }
        None => sample::sample_route(&config)?,
    };
    let stats = route.stats();
    println!("=== shuttle: {} ===", route.name);
    println!(
        "Network: {} stops, {} segments, {} path points",
        route.network().stop_count(),
        route.network().segment_count(),
        route.network().path().len(),
    );
    println!("Stats:   {}", stats.summary());
    println!("Round trip estimate: {}", stats.estimate.formatted());
    println!();

    // 3. Output.
    let out = Path::new(OUTPUT_DIR);
    std::fs::create_dir_all(out)?;
    save_route_json(&out.join("route.json"), &route.to_record())?;
    let writer = CsvWriter::new(out)?;
    let mut obs = Announcer { inner: TraceObserver::new(writer, TRACE_INTERVAL), arrivals: 0, reversals: 0 };

    // 4. Engine.
    let mut engine = EngineBuilder::new(&route)
        .config(config.clone())
        .speed_multiplier(args.multiplier)
        .build()?;
    let handle = engine.start()?;

    let frame_secs = config.frame_interval_secs;
    let sim_secs = args.minutes * 60.0;
    let max_frames = (sim_secs / (frame_secs * args.multiplier)).ceil() as usize;
    println!(
        "Playing {} of simulated time ({max_frames} frames at ×{})",
        format_duration(sim_secs),
        args.multiplier,
    );

    // 5. Run.
    let t0 = Instant::now();
    let summary = run_frames(&mut engine, handle, &mut FixedFrames::new(frame_secs), max_frames, &mut obs);
    let elapsed = t0.elapsed();
    obs.inner.finish().context("writing trace")?;

    // 6. Summary.
    let state = engine.state();
    println!();
    println!("Playback finished in {:.3} s ({:?})", elapsed.as_secs_f64(), summary.outcome);
    println!("  frames      : {}", summary.frames);
    println!("  stop calls  : {}", obs.arrivals);
    println!("  reversals   : {}", obs.reversals);
    println!("  moving      : {}", format_duration(state.moving_secs));
    println!("  dwelling    : {}", format_duration(state.dwelling_secs));
    println!("  direction   : {}", state.direction);
    println!("  trace       : {}", out.display());

    Ok(())
}
