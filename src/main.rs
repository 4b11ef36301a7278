//! # GroundLink
//!
//! Headless operator dashboard: streams vehicle telemetry from the backend,
//! projects it onto the dashboard views, and forwards operator commands
//! typed on stdin.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Load configuration (falls back to defaults if the file is missing)
//!    - Set up logging with tracing subscriber
//!    - Build the dashboard context, dispatcher, and command gateway
//!    - Center the map on the home position
//!
//! 2. **Main Loop** (single thread)
//!    - Project each transport event as it arrives
//!    - Parse operator lines; each command runs as its own task
//!    - Handle Ctrl+C for graceful shutdown
//!
//! # Examples
//!
//! ```bash
//! cargo run --release -- config/default.toml
//! ```
//!
//! ```text
//! INFO groundlink: GroundLink v0.1.0 starting...
//! INFO groundlink::stream::socketio: WebSocket open at ws://127.0.0.1:5000/socket.io/?EIO=4&transport=websocket
//! INFO groundlink::view: status: ✅ Connected to backend
//! ```

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use groundlink::command::operator::HELP_TEXT;
use groundlink::command::{CommandGateway, HttpCommandClient, OperatorConsole};
use groundlink::config::Config;
use groundlink::context::DashboardContext;
use groundlink::stream::{SocketIoTransport, StreamDispatcher, Transport};
use groundlink::telemetry::recorder::TelemetryRecorder;
use groundlink::telemetry::TrailPoint;

/// Configuration file used when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Load configuration, falling back to defaults if the file does not exist.
///
/// Returns the config and whether the fallback was taken.
fn load_config(path: &Path) -> Result<(Config, bool)> {
    if !path.exists() {
        return Ok((Config::default(), true));
    }
    let config = Config::load(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    Ok((config, false))
}

/// Stdout logging plus an optional daily rolling file.
///
/// `RUST_LOG` overrides the configured level. The returned guard must be
/// held for the file writer to flush.
fn init_logging(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let registry = tracing_subscriber::registry().with(filter).with(fmt::layer());

    if config.logging.directory.is_empty() {
        registry.init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(&config.logging.directory, "groundlink.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    registry
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();
    Some(guard)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let (config, fell_back) = load_config(Path::new(&config_path))?;

    let _log_guard = init_logging(&config);

    info!("GroundLink v{} starting...", env!("CARGO_PKG_VERSION"));
    if fell_back {
        warn!("Config file {} not found, using defaults", config_path);
    }

    let ctx = DashboardContext::headless();
    let status = Arc::clone(&ctx.status);
    let mut dispatcher = StreamDispatcher::new(ctx);

    if config.recording.enabled {
        match TelemetryRecorder::new(&config.recording) {
            Ok(recorder) => dispatcher = dispatcher.with_recorder(recorder),
            Err(e) => warn!("Telemetry recording disabled: {}", e),
        }
    }

    let client = HttpCommandClient::new(&config.commands)?;
    let gateway = CommandGateway::new(Arc::new(client), status, &config.commands);
    let console = OperatorConsole::new(gateway, config.map.goto_zoom);

    let home = TrailPoint::new(config.map.home_lat, config.map.home_lon);
    dispatcher.show_home(home, config.map.zoom);

    let mut transport = SocketIoTransport::spawn(config.transport.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    info!("{}", HELP_TEXT);
    info!("Press Ctrl+C to exit");

    loop {
        tokio::select! {
            event = transport.next_event() => {
                match event {
                    Some(event) => dispatcher.handle(event),
                    None => {
                        warn!("Transport closed");
                        break;
                    }
                }
            }

            line = lines.next_line(), if stdin_open => {
                match line {
                    // Command tasks are detached; their results land on the status line
                    Ok(Some(line)) => {
                        console.handle_line(&line, &mut dispatcher);
                    }
                    Ok(None) => {
                        debug!("stdin closed; operator console disabled");
                        stdin_open = false;
                    }
                    Err(e) => {
                        warn!("Failed to read stdin: {}", e);
                        stdin_open = false;
                    }
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    info!("Session stats: {:?}", dispatcher.stats());
    Ok(())
}
