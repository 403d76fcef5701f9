//! pagewatchd — the pagewatch daemon.
//!
//! Loads a probe config, then fetches every target once per checking
//! period and logs one line per check:
//!
//! ```text
//! Checked URL='https://example.com/' response-time=84.21 ms content_requirement='Example Domain' status=Content requirement met
//! ```
//!
//! # Usage
//!
//! ```text
//! pagewatchd run --config pagewatch.toml --metrics-addr 127.0.0.1:9184
//! pagewatchd check --config legacy.json
//! ```

mod http;
mod logging;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

use pagewatch_core::ProbeConfig;
use pagewatch_metrics::MetricsCollector;
use pagewatch_probe::{CycleScheduler, HttpProber, LogSink};

use crate::logging::LogFormat;

#[derive(Parser)]
#[command(name = "pagewatchd", about = "Periodic HTTP(S) content checks", version)]
struct Cli {
    /// Log output format.
    #[arg(long, value_enum, default_value = "text", global = true)]
    log_format: LogFormat,

    /// Write logs to this file instead of stdout.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Probe all targets every checking period until interrupted.
    Run {
        #[command(flatten)]
        config: ConfigArgs,

        /// Serve Prometheus metrics on this address.
        #[arg(long)]
        metrics_addr: Option<SocketAddr>,

        /// Run a single cycle and exit.
        #[arg(long)]
        once: bool,
    },
    /// Validate a config file and print a summary.
    Check {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// Config file (TOML, or legacy JSON with a .json extension).
    #[arg(short, long)]
    config: PathBuf,

    /// Override the maximum number of probes in flight.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Override the default probe timeout, in seconds.
    #[arg(long)]
    timeout: Option<f64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.log_format, cli.log_file.as_deref())?;

    let result = match cli.command {
        Command::Run {
            config,
            metrics_addr,
            once,
        } => run(&config, metrics_addr, once).await,
        Command::Check { config } => check(&config),
    };

    if let Err(e) = &result {
        error!(error = format!("{e:#}"), "pagewatchd failed");
    }
    result
}

/// Load the config file and apply command-line overrides.
fn load_config(args: &ConfigArgs) -> anyhow::Result<ProbeConfig> {
    let mut config = ProbeConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config {}", args.config.display()))?;

    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(timeout) = args.timeout {
        config.timeout = timeout;
    }
    config
        .validate()
        .with_context(|| format!("invalid overrides for {}", args.config.display()))?;

    Ok(config)
}

async fn run(args: &ConfigArgs, metrics_addr: Option<SocketAddr>, once: bool) -> anyhow::Result<()> {
    let config = Arc::new(load_config(args)?);
    info!(
        path = %args.config.display(),
        targets = config.targets.len(),
        checking_period_secs = config.checking_period,
        "config loaded"
    );

    let prober = Arc::new(HttpProber::new().context("failed to build HTTP client")?);
    let metrics = Arc::new(MetricsCollector::new());
    let mut scheduler = CycleScheduler::new(prober, config)?
        .with_sink(LogSink)
        .with_sink(metrics.clone());

    if once {
        let report = scheduler.run_once().await;
        info!(
            targets = report.targets,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "single cycle complete"
        );
        return Ok(());
    }

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Metrics endpoint ───────────────────────────────────────

    let mut server_handle = match metrics_addr {
        Some(addr) => {
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind metrics endpoint on {addr}"))?;
            info!(%addr, "metrics endpoint listening");

            let mut server_shutdown = shutdown_rx.clone();
            let router = http::build_router(metrics);
            Some(tokio::spawn(async move {
                axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        let _ = server_shutdown.changed().await;
                    })
                    .await
            }))
        }
        None => None,
    };

    // ── Probe loop ─────────────────────────────────────────────

    let mut scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx));

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for the interrupt signal")?;
            info!("shutdown signal received");
        }
        joined = &mut scheduler_handle => {
            let _ = shutdown_tx.send(true);
            joined.context("scheduler task failed")?;
            anyhow::bail!("scheduler stopped unexpectedly");
        }
        served = wait_for(&mut server_handle) => {
            let _ = shutdown_tx.send(true);
            served
                .context("metrics endpoint task failed")?
                .context("metrics endpoint failed")?;
            anyhow::bail!("metrics endpoint stopped unexpectedly");
        }
    }
    let _ = shutdown_tx.send(true);

    scheduler_handle.await.context("scheduler task failed")?;
    if let Some(handle) = server_handle {
        handle
            .await
            .context("metrics endpoint task failed")?
            .context("metrics endpoint failed")?;
    }

    info!("pagewatchd stopped");
    Ok(())
}

/// Resolve when the optional task finishes; pend forever when there is none.
async fn wait_for<T>(handle: &mut Option<JoinHandle<T>>) -> Result<T, JoinError> {
    match handle {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

fn check(args: &ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(args)?;
    print!("{}", summary(&args.config, &config));
    Ok(())
}

fn summary(path: &Path, config: &ProbeConfig) -> String {
    let mut out = format!(
        "{}: OK\n  checking period: {}s\n  timeout: {}s\n  concurrency: {}\n",
        path.display(),
        config.checking_period,
        config.timeout,
        config.concurrency
    );
    if let Some(deadline) = config.cycle_deadline {
        out.push_str(&format!("  cycle deadline: {deadline}s\n"));
    }
    out.push_str(&format!("  targets ({}):\n", config.targets.len()));
    for target in &config.targets {
        let timeout = config.probe_timeout(target);
        out.push_str(&format!(
            "    {} requires '{}' (timeout {:.2}s)\n",
            target.url,
            target.content_requirement,
            timeout.as_secs_f64()
        ));
    }
    out
}
