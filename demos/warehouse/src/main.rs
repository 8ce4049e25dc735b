//! warehouse — run the AGV fleet against a scenario and write poses to CSV.
//!
//! ```text
//! warehouse [scenario.json] [--until SECS] [--seed N] [--ordering fifo|lifo|random]
//!           [--sample SECS] [--params params.json] [--out DIR]
//! ```
//!
//! Without a scenario file a 13 × 13 grid warehouse is generated.  Logging
//! follows `RUST_LOG` (default `warehouse=info,agv_fleet=info`).

mod layout;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agv_core::{OrderingMode, SimConfig, SimTime};
use agv_fleet::{Dispatcher, FleetParams, Scenario, build_simulation};
use agv_output::{CsvWriter, SnapshotObserver, run_sampled};

use layout::grid_scenario;

// ── Defaults ──────────────────────────────────────────────────────────────────

const GRID_SIDE:    usize = 13;
const GRID_SPACING: f64   = 1.5;
const UNTIL_SECS:   f64   = 600.0;
const SAMPLE_SECS:  f64   = 0.5;
const SEED:         u64   = 42;
const OUT_DIR:      &str  = "output/warehouse";

// ── Arguments ─────────────────────────────────────────────────────────────────

struct Args {
    scenario: Option<PathBuf>,
    params:   Option<PathBuf>,
    out:      PathBuf,
    until:    f64,
    sample:   f64,
    seed:     u64,
    ordering: OrderingMode,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        scenario: None,
        params:   None,
        out:      PathBuf::from(OUT_DIR),
        until:    UNTIL_SECS,
        sample:   SAMPLE_SECS,
        seed:     SEED,
        ordering: OrderingMode::Fifo,
    };

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = || it.next().with_context(|| format!("{arg} needs a value"));
        match arg.as_str() {
            "--until"    => args.until = value()?.parse().context("--until")?,
            "--sample"   => args.sample = value()?.parse().context("--sample")?,
            "--seed"     => args.seed = value()?.parse().context("--seed")?,
            "--ordering" => args.ordering = value()?.parse().map_err(anyhow::Error::msg)?,
            "--params"   => args.params = Some(value()?.into()),
            "--out"      => args.out = value()?.into(),
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            _ => args.scenario = Some(PathBuf::from(&arg)),
        }
    }
    Ok(args)
}

fn load_params(path: Option<&Path>) -> Result<FleetParams> {
    let Some(path) = path else {
        return Ok(FleetParams::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let params: FleetParams = serde_json::from_str(&text)?;
    params.validate().with_context(|| format!("checking {}", path.display()))?;
    Ok(params)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warehouse=info,agv_fleet=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = parse_args()?;

    // 1. Scenario and tunables.
    let scenario = match &args.scenario {
        Some(path) => Scenario::from_path(path)?,
        None => grid_scenario(GRID_SIDE, GRID_SPACING),
    };
    let params = load_params(args.params.as_deref())?;
    info!(
        points = scenario.network.points.len(),
        agvs = scenario.agvs.len(),
        shelves = scenario.shelves.len(),
        dests = scenario.dest_points.len(),
        seed = args.seed,
        ordering = %args.ordering,
        "starting"
    );

    // 2. Simulator with a running dispatcher.
    let config = SimConfig::new(args.seed, args.ordering);
    let dispatcher = Dispatcher::from_params(&params);
    let mut sim = build_simulation(&scenario, params, config)?;
    sim.with_scheduler(|_, s| dispatcher.start(s))?;

    // 3. Output.
    std::fs::create_dir_all(&args.out)?;
    let mut obs = SnapshotObserver::new(CsvWriter::new(&args.out)?);

    // 4. Run.
    let t0 = Instant::now();
    run_sampled(&mut sim, SimTime(args.until), args.sample, &mut obs)?;
    obs.finish()?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.take_error() {
        eprintln!("output error: {e}");
    }

    // 5. Summary.
    let world = sim.world();
    println!("Simulated {:.1} s in {:.3} s wall", args.until, elapsed.as_secs_f64());
    println!("  events dispatched : {}", sim.dispatched());
    println!("  deliveries        : {}", world.completed().len());
    println!("  pose samples      : {}", obs.samples());
    println!("  output            : {}", args.out.display());
    println!();

    println!("{:<10} {:<14} {:<10} {:<8}", "AGV", "State", "Point", "Jobs");
    println!("{}", "-".repeat(44));
    for id in world.agv_ids() {
        let agv = world.agv(id)?;
        let jobs = world.completed().iter().filter(|c| c.agv == id).count();
        println!(
            "{:<10} {:<14} {:<10} {:<8}",
            agv.name,
            agv.state().as_str(),
            world.graph().name(agv.node()),
            jobs,
        );
    }

    Ok(())
}
