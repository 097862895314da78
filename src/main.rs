//! Tanmatsu host — runs the bundled launcher plugins against in-memory
//! display and LED backends.
//!
//! Main entry point that wires configuration, logging, the plugin host and
//! a simulated render/input loop together.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use tanmatsu_core::config::HostConfig;
use tanmatsu_core::{HostResult, MonotonicClock};
use tanmatsu_plugin::{Host, InputEvent, MemoryLedStrip, PluginManager, RecordingCanvas};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "tanmatsu-host", version, about = "Run the Tanmatsu plugin host")]
struct Args {
    /// Directory holding `default.toml` and per-environment overrides.
    #[arg(long, default_value = "config")]
    config_dir: String,

    /// Environment overlay to apply on top of the defaults.
    #[arg(long, default_value = "development")]
    env: String,

    /// How long to run before unloading all plugins.
    #[arg(long, default_value_t = 3000)]
    run_ms: u64,

    /// Interval between simulated key presses.
    #[arg(long, default_value_t = 350)]
    key_interval_ms: u64,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match HostConfig::load(&args.config_dir, &args.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config, &args).await {
        tracing::error!("Host error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &HostConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main host run function
async fn run(config: HostConfig, args: &Args) -> HostResult<()> {
    info!(
        config_dir = %args.config_dir,
        env = %args.env,
        "Starting Tanmatsu host v{}",
        env!("CARGO_PKG_VERSION")
    );

    // ── Step 1: Host tables and hardware ─────────────────────────
    let strip = MemoryLedStrip::new(config.leds.count);
    let clock = Arc::new(MonotonicClock::new());
    let host = Arc::new(Host::new(&config, Box::new(strip.clone()), clock));

    // ── Step 2: Plugins ──────────────────────────────────────────
    let manager = PluginManager::new(host.clone(), config.plugins.clone());
    let loaded = manager.load_all(plugin_indicators::bundled()).await;
    info!(plugins = ?loaded, "Plugins started");

    // ── Step 3: Render and input loop ────────────────────────────
    let mut canvas = RecordingCanvas::new();
    let mut frames: u64 = 0;
    let mut keys = "tanmatsu".chars().cycle();
    let mut input = tokio::time::interval(Duration::from_millis(args.key_interval_ms));

    let deadline = tokio::time::sleep(Duration::from_millis(args.run_ms));
    let shutdown = shutdown_signal();
    tokio::pin!(deadline);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
            _ = host.redraw_requested() => {
                canvas.clear();
                let report = host.render_header(&mut canvas);
                frames += 1;
                debug!(
                    frame = frames,
                    widgets = report.placements.len(),
                    draw_calls = canvas.ops().len(),
                    cursor = report.cursor,
                    "Header redrawn"
                );
            }
            _ = input.tick() => {
                let Some(ascii) = keys.next() else { continue };
                let result = host.dispatch_input(&InputEvent::key(ascii));
                if result.propagate() {
                    debug!(key = %ascii, hooks = result.invoked.len(), "Key passed to launcher");
                }
            }
        }
    }

    // ── Step 4: Shutdown ─────────────────────────────────────────
    let listing = manager.list_plugins().await;
    manager.unload_all().await;

    info!(frames, leds = ?strip.shown(), "Host stopped");
    println!("{}", serde_json::to_string_pretty(&listing)?);

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
