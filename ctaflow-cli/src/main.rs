//! ctaflow CLI: replay bar files through a strategy engine.
//!
//! Commands:
//! - `run`: drive one strategy over a CSV bar file and print every instruction
//! - `compare`: replay all strategies over the same bars in parallel
//! - `synth`: write a seeded random-walk bar file
//! - `defaults`: print a strategy's default settings as TOML

mod bars;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::prelude::*;

use ctaflow_core::config::{build_setting, StrategyKind};
use ctaflow_core::engine::{BarOutcome, RunSummary};
use ctaflow_core::factory::{replay, AnyEngine};
use ctaflow_core::fingerprint::{dataset_hash, RunFingerprint};
use ctaflow_core::indicators::IndicatorSnapshot;
use ctaflow_core::policy::ExitReason;
use ctaflow_core::synthetic::random_walk;
use ctaflow_core::TradingInstruction;

#[derive(Parser)]
#[command(name = "ctaflow", about = "ctaflow CLI: bar-driven strategy engine")]
struct Cli {
    /// Log level for diagnostics on stderr.
    #[arg(long, global = true, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a bar file through one strategy.
    Run {
        /// trend_following, mean_reversion or limit_breakout (aliases accepted).
        #[arg(long)]
        strategy: StrategyKind,

        /// CSV with datetime,open,high,low,close,volume.
        #[arg(long)]
        bars: PathBuf,

        /// Settings file (.toml, otherwise JSON).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override one setting, e.g. `--param fast_window=5`. Repeatable.
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Feed this many leading bars as history without evaluating them.
        #[arg(long, default_value_t = 0)]
        warmup: usize,

        /// First date to keep (YYYY-MM-DD).
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last date to keep (YYYY-MM-DD).
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Emit one JSON object per evaluated bar instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Replay every strategy with default settings over the same bars.
    Compare {
        #[arg(long)]
        bars: PathBuf,
    },
    /// Generate a deterministic random-walk bar file.
    Synth {
        #[arg(long, default_value_t = 500)]
        count: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long, default_value_t = 100.0)]
        start_price: f64,

        #[arg(long)]
        out: PathBuf,
    },
    /// Print default settings for a strategy as TOML.
    Defaults {
        #[arg(long)]
        strategy: StrategyKind,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(tracing_subscriber::filter::Targets::new().with_default(cli.log_level));
    tracing_subscriber::registry().with(fmt_layer).init();

    match cli.command {
        Commands::Run {
            strategy,
            bars,
            config,
            params,
            warmup,
            start,
            end,
            json,
        } => run_command(RunArgs {
            strategy,
            bars: &bars,
            config: config.as_deref(),
            params: &params,
            warmup,
            start,
            end,
            json,
        }),
        Commands::Compare { bars } => compare_command(&bars),
        Commands::Synth {
            count,
            seed,
            start_price,
            out,
        } => synth_command(count, seed, start_price, &out),
        Commands::Defaults { strategy } => {
            print!("{}", strategy.default_setting().to_toml()?);
            Ok(())
        }
    }
}

struct RunArgs<'a> {
    strategy: StrategyKind,
    bars: &'a Path,
    config: Option<&'a Path>,
    params: &'a [String],
    warmup: usize,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    json: bool,
}

/// One evaluated bar as a JSON line.
#[derive(Serialize)]
struct BarRecord<'a> {
    datetime: NaiveDateTime,
    instructions: &'a [TradingInstruction],
    exit_reason: Option<ExitReason>,
    snapshot: &'a IndicatorSnapshot,
}

fn run_command(args: RunArgs<'_>) -> Result<()> {
    let setting = build_setting(args.strategy, args.config, args.params)
        .context("invalid strategy settings")?;
    let bars = bars::filter_range(bars::load_bars(args.bars)?, args.start, args.end);
    if bars.is_empty() {
        bail!("no bars in {} within the requested range", args.bars.display());
    }
    if args.warmup >= bars.len() {
        bail!(
            "--warmup {} leaves no bars to evaluate ({} loaded)",
            args.warmup,
            bars.len()
        );
    }

    let fingerprint = RunFingerprint::new(&setting, &bars)?;
    info!(
        strategy = %fingerprint.strategy,
        config = fingerprint.config_hash.short(),
        bars = fingerprint.bar_count,
        "starting replay"
    );

    let mut engine = AnyEngine::from_setting(&setting)?;
    let (history, live) = bars.split_at(args.warmup);
    engine.warm_up(history);
    if args.warmup > 0 && !engine.is_initialized() {
        warn!(
            warmup = args.warmup,
            required = engine.warmup_bars(),
            "warm-up slice is shorter than the strategy's warm-up"
        );
    }

    let mut summary = RunSummary::default();
    for bar in live {
        let outcome = engine.on_bar(bar);
        summary.record(&outcome);
        let BarOutcome::Evaluated {
            snapshot,
            instructions,
            exit_reason,
        } = &outcome
        else {
            continue;
        };
        if args.json {
            let record = BarRecord {
                datetime: bar.datetime,
                instructions,
                exit_reason: *exit_reason,
                snapshot,
            };
            println!("{}", serde_json::to_string(&record)?);
        } else {
            for instruction in instructions.iter().filter(|i| i.is_order()) {
                match exit_reason {
                    Some(reason) => println!("{}  {instruction}  ({reason})", bar.datetime),
                    None => println!("{}  {instruction}", bar.datetime),
                }
            }
        }
    }
    summary.final_position = Some(engine.position().summary());

    if args.json {
        println!(
            "{}",
            serde_json::json!({ "fingerprint": fingerprint, "summary": summary })
        );
    } else {
        println!();
        println!("Strategy:     {}", fingerprint.strategy);
        println!("Config hash:  {}", fingerprint.config_hash.short());
        println!("Dataset hash: {}", fingerprint.dataset_hash.short());
        if let (Some(first), Some(last)) = (fingerprint.first_bar, fingerprint.last_bar) {
            println!("Bars:         {} ({first} .. {last})", fingerprint.bar_count);
        }
        println!(
            "Evaluated:    {} (skipped {}, warm-up {})",
            summary.evaluated, summary.skipped, args.warmup
        );
        println!(
            "Orders:       {} (entries {}, exits {}, reversals {})",
            summary.orders, summary.entries, summary.exits, summary.reversals
        );
        let position = engine.position();
        println!(
            "Position:     {} (long stop {:?}, short stop {:?})",
            position.pos(),
            position.long_stop(),
            position.short_stop()
        );
    }
    Ok(())
}

fn compare_command(path: &Path) -> Result<()> {
    let bars = bars::load_bars(path)?;
    let dataset = dataset_hash(&bars);
    info!(bars = bars.len(), dataset = %dataset, "comparing strategies");

    let results: Vec<_> = StrategyKind::ALL
        .par_iter()
        .map(|kind| {
            let setting = kind.default_setting();
            replay(&setting, &bars).map(|(summary, _)| (*kind, summary))
        })
        .collect();

    println!(
        "{:<18} {:>9} {:>7} {:>8} {:>6} {:>10} {:>9}",
        "strategy", "evaluated", "orders", "entries", "exits", "reversals", "position"
    );
    for result in results {
        let (kind, summary) = result?;
        let position = summary.final_position.map_or(0, |p| p.pos);
        println!(
            "{:<18} {:>9} {:>7} {:>8} {:>6} {:>10} {:>9}",
            kind.name(),
            summary.evaluated,
            summary.orders,
            summary.entries,
            summary.exits,
            summary.reversals,
            position
        );
    }
    Ok(())
}

fn synth_command(count: usize, seed: u64, start_price: f64, out: &Path) -> Result<()> {
    if count == 0 {
        bail!("--count must be at least 1");
    }
    if !(start_price.is_finite() && start_price > 0.0) {
        bail!("--start-price must be positive, got {start_price}");
    }
    let bars = random_walk(count, seed, start_price);
    bars::write_bars(out, &bars)?;
    info!(count, seed, path = %out.display(), "wrote synthetic bars");
    Ok(())
}
