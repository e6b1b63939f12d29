use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use console::style;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use splitload::{Config, Driver, Layout, StatusLine, StopReason};

/// Startup line and final summary are `info`, everything else stays quiet.
const DEFAULT_LOG_FILTER: &str = "warn,splitload=info";

#[derive(Parser)]
#[command(name = "splitload")]
#[command(about = "Payload generator for Redis-Split")]
#[command(version)]
struct Args {
    /// Path to Redis-Split main dir
    #[arg(short, long, env = "SPLITLOAD_DIR")]
    dir: Option<PathBuf>,

    /// Number of keys
    #[arg(short, long, default_value_t = 5000, value_parser = clap::value_parser!(u64).range(10..=1_000_000))]
    keys: u64,

    /// Writes/reads ratio, one write per RATIO requests
    #[arg(short, long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..=100))]
    ratio: u32,

    /// Max pause between requests in milliseconds
    #[arg(short, long, default_value_t = 25, value_parser = clap::value_parser!(u64).range(1..=1000))]
    pause: u64,

    /// Seed for a reproducible payload
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many cycles
    #[arg(short = 'n', long)]
    cycles: Option<u64>,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let layout = match Layout::discover(args.dir.as_deref()) {
        Ok(layout) => layout,
        Err(e) => fatal(e),
    };
    if let Err(e) = layout.validate() {
        fatal(e);
    }

    let config = Config::new(layout.main_dir())
        .max_keys(args.keys)
        .ratio(args.ratio)
        .max_pause(Duration::from_millis(args.pause));
    config.validate()?;

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    tracing::info!(
        "Starting payload on {} (keys: {}, ratio: {}, max pause: {:?})",
        layout.main_dir().display(),
        config.max_keys,
        config.ratio,
        config.max_pause
    );

    let mut driver = Driver::new(&config, rng).with_status_line(StatusLine::stdout());
    let reason = driver.run(args.cycles, shutdown_signal()).await;
    driver.shutdown();

    let counters = driver.counters();
    match reason {
        StopReason::Interrupted => tracing::info!("Interrupted"),
        StopReason::CycleLimit => tracing::info!("Cycle limit reached"),
    }
    tracing::info!(
        "writes: {}, reads: {}, failed: {}, skipped: {}",
        counters.writes,
        counters.reads,
        counters.failed,
        counters.skipped
    );

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Can't listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

fn fatal(err: splitload::LoadError) -> ! {
    eprintln!("{}", style(err).red());
    process::exit(1);
}
