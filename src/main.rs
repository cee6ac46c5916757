mod aggregator;
mod config;
mod presenter;
mod scheduler;
mod sensors;
mod state;

use aggregator::MetricAggregator;
use clap::Parser;
use config::Config;
use presenter::LogPresenter;
use sensors::system::{OsMemorySource, SysinfoSource};
use std::path::Path;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tempmond")]
#[command(version)]
struct Cli {
    #[arg(long, default_value = "./config.yaml")]
    config: String,
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    if cli.print_default_config {
        println!("{}", Config::example_yaml());
        return;
    }

    let cfg = if Path::new(&cli.config).exists() {
        match Config::load_from_file(&cli.config) {
            Ok(cfg) => cfg,
            Err(err) => {
                error!(error = %err, "failed to load configuration");
                std::process::exit(1);
            }
        }
    } else {
        info!(config = %cli.config, "config file not found, using defaults");
        Config::default()
    };

    // Backend initialization failure is the one fatal error; everything after
    // this point degrades per cycle instead of aborting.
    let source = match SysinfoSource::open() {
        Ok(source) => source,
        Err(err) => {
            error!(error = %err, "failed to initialize sensor backend");
            std::process::exit(1);
        }
    };

    info!(
        interval = %humantime::format_duration(Duration::from_millis(cfg.interval_ms)),
        alert_cooldown = %humantime::format_duration(Duration::from_secs(
            state::NOTIFY_COOLDOWN_SECS as u64
        )),
        "starting tempmond"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let monitor_task = tokio::spawn(async move {
        // The task owns the backend handle; it is released when the loop
        // exits, on shutdown and on early termination alike.
        let aggregator = MetricAggregator::new(source, OsMemorySource::new());
        scheduler::run(
            aggregator,
            LogPresenter,
            Duration::from_millis(cfg.interval_ms),
            shutdown_rx,
        )
        .await;
    });

    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to wait for Ctrl+C");
    }
    info!("received Ctrl+C, shutting down");

    let _ = shutdown_tx.send(true);
    let _ = monitor_task.await;
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
