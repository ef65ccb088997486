//! Smart meter simulator binary.
//!
//! Wires together configuration, the shared simulator, the periodic
//! updater, and the HTTP API, then serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Parse command-line flags
//! 3. Load configuration from `metersim-config.yaml` (or `--config`),
//!    apply `HOST` / `PORT`, then the `--host` / `--port` flags
//! 4. Create the simulator and API state
//! 5. Bind the listener; an address-in-use failure prints remediation
//!    guidance and exits with status 1
//! 6. Spawn the updater
//! 7. Serve until `Ctrl-C`, then abort the updater

mod broadcast_callback;
mod error;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use metersim_api::server::{self, ServerConfig, ServerError};
use metersim_api::{AppState, build_router};
use metersim_core::config::{ConfigError, DEFAULT_CONFIG_FILE, ServerSettings, SimulatorConfig};
use metersim_core::runner;
use metersim_core::simulator::Simulator;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::broadcast_callback::BroadcastCallback;
use crate::error::AppError;

/// Command-line flags. Flags win over environment and config file.
#[derive(Debug, Parser)]
#[command(
    name = "metersim-server",
    about = "Smart meter firmware simulator with an HTTP API",
    long_about = None
)]
struct Cli {
    /// Port to run the server on.
    #[arg(long)]
    port: Option<u16>,

    /// Interface to bind.
    #[arg(long)]
    host: Option<String>,

    /// Configuration file. Defaults to `metersim-config.yaml` when present.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, the listener
/// cannot bind for a reason other than the port being taken, or the
/// server fails while serving.
#[tokio::main]
async fn main() -> Result<ExitCode, AppError> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // 2-3. Flags and configuration.
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    info!(
        host = config.server.host,
        port = config.server.port,
        tick_interval_ms = config.simulation.tick_interval_ms,
        firmware_load_delay_ms = config.simulation.firmware_load_delay_ms,
        seed = config.simulation.seed,
        log_capacity = config.simulation.log_capacity,
        "Configuration loaded"
    );

    // 4. Simulator and API state.
    let simulator = Arc::new(Simulator::new(&config));
    let app_state = Arc::new(AppState::new(Arc::clone(&simulator)));

    // 5. Bind before anything runs so a busy port fails fast.
    let server_config = ServerConfig::from(&config.server);
    let listener = match server::bind(&server_config).await {
        Ok(listener) => listener,
        Err(ServerError::AddrInUse { port, .. }) => {
            print_addr_in_use_help(port);
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    // 6. Updater.
    let updater = runner::spawn_updater(
        Arc::clone(&simulator),
        Duration::from_millis(config.simulation.tick_interval_ms),
        BroadcastCallback::new(Arc::clone(&app_state)),
    );

    info!(
        "Access the simulator at: http://{}:{}",
        server_config.host, server_config.port
    );

    // 7. Serve until Ctrl-C.
    let router = build_router(app_state, server_config.static_dir.as_deref());
    let served = server::serve(listener, router, shutdown_signal()).await;

    updater.abort();
    info!("metersim-server stopped");

    served?;
    Ok(ExitCode::SUCCESS)
}

/// Resolve configuration: explicit `--config` file (must exist), else
/// `metersim-config.yaml` if present, else defaults. Then `HOST` / `PORT`
/// and the flags.
fn load_config(cli: &Cli) -> Result<SimulatorConfig, AppError> {
    let mut config = match &cli.config {
        Some(path) => SimulatorConfig::from_file(path)?,
        None => SimulatorConfig::load_or_default(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    apply_listener_overrides(cli, &mut config.server, |key| std::env::var(key).ok())?;
    Ok(config)
}

/// Apply `HOST` / `PORT` from `env`, then `--host` / `--port`. A variable
/// shadowed by its flag is never read.
fn apply_listener_overrides<F>(
    cli: &Cli,
    server: &mut ServerSettings,
    env: F,
) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    server.apply_overrides(|key| match key {
        "HOST" if cli.host.is_some() => None,
        "PORT" if cli.port.is_some() => None,
        _ => env(key),
    })?;

    if let Some(host) = &cli.host {
        server.host.clone_from(host);
    }
    if let Some(port) = cli.port {
        server.port = port;
    }
    Ok(())
}

fn print_addr_in_use_help(port: u16) {
    let alternative = port.checked_add(1).unwrap_or(5001);
    eprintln!("Error: Port {port} is already in use.");
    eprintln!("Options:");
    eprintln!("  - Run on a different port: metersim-server --port {alternative}");
    eprintln!("  - Or find and stop the process using the port:");
    eprintln!("      lsof -nP -iTCP:{port} -sTCP:LISTEN");
    eprintln!("      kill <PID>");
    eprintln!(
        "  - On macOS, port 5000 is often held by AirPlay Receiver \
         (System Settings -> General -> AirDrop & Handoff)."
    );
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from(["metersim-server", "--port", "5050", "--host", "127.0.0.1"]);
        assert_eq!(cli.port, Some(5050));
        assert_eq!(cli.host.as_deref(), Some("127.0.0.1"));
        assert!(cli.config.is_none());
    }

    #[test]
    fn missing_explicit_config_file_is_an_error() {
        let cli = Cli::parse_from([
            "metersim-server",
            "--config",
            "/nonexistent/metersim-config.yaml",
        ]);
        assert!(matches!(
            load_config(&cli),
            Err(AppError::Config { .. })
        ));
    }

    #[test]
    fn port_flag_shadows_garbage_port_env() {
        let cli = Cli::parse_from(["metersim-server", "--port", "5050"]);
        let mut server = ServerSettings::default();
        apply_listener_overrides(&cli, &mut server, |key| match key {
            "PORT" => Some(String::from("abc")),
            "HOST" => Some(String::from("127.0.0.1")),
            _ => None,
        })
        .unwrap();
        assert_eq!(server.port, 5050);
        assert_eq!(server.host, "127.0.0.1");
    }

    #[test]
    fn garbage_port_env_without_flag_is_an_error() {
        let cli = Cli::parse_from(["metersim-server"]);
        let mut server = ServerSettings::default();
        let result = apply_listener_overrides(&cli, &mut server, |key| {
            (key == "PORT").then(|| String::from("abc"))
        });
        assert!(matches!(result, Err(ConfigError::InvalidPort { .. })));
    }

    #[test]
    fn env_fills_in_where_flags_are_absent() {
        let cli = Cli::parse_from(["metersim-server", "--host", "10.0.0.2"]);
        let mut server = ServerSettings::default();
        apply_listener_overrides(&cli, &mut server, |key| match key {
            "PORT" => Some(String::from("5002")),
            "HOST" => Some(String::from("127.0.0.1")),
            _ => None,
        })
        .unwrap();
        assert_eq!(server.port, 5002);
        assert_eq!(server.host, "10.0.0.2");
    }

    #[test]
    fn rejects_non_numeric_port_flag() {
        assert!(Cli::try_parse_from(["metersim-server", "--port", "http"]).is_err());
    }
}
