//! HTTP server lifecycle management.
//!
//! Binding and serving are split so the binary can react to an
//! address-in-use failure before anything is served: [`bind`] reports it
//! as [`ServerError::AddrInUse`], and [`serve`] runs the router until the
//! shutdown future resolves.

use std::future::Future;
use std::io;
use std::path::PathBuf;

use axum::Router;
use metersim_core::config::ServerSettings;
use tokio::net::TcpListener;
use tracing::info;

/// Configuration for the API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// The TCP port to listen on.
    pub port: u16,
    /// Directory served under `/static`, if any.
    pub static_dir: Option<PathBuf>,
}

impl From<&ServerSettings> for ServerConfig {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            static_dir: settings.static_dir.clone(),
        }
    }
}

/// Errors that can occur when starting or running the API server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Another process already listens on the requested port.
    #[error("address {host}:{port} is already in use")]
    AddrInUse {
        /// Requested host.
        host: String,
        /// Requested port.
        port: u16,
    },

    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}

/// Bind a TCP listener for `config`.
///
/// The host may be an IP literal or a resolvable name.
///
/// # Errors
///
/// Returns [`ServerError::AddrInUse`] if the port is taken and
/// [`ServerError::Bind`] for any other failure.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|e| {
            if e.kind() == io::ErrorKind::AddrInUse {
                ServerError::AddrInUse {
                    host: config.host.clone(),
                    port: config.port,
                }
            } else {
                ServerError::Bind(format!(
                    "bind failed on {}:{}: {e}",
                    config.host, config.port
                ))
            }
        })
}

/// Serve `router` on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] on a fatal I/O error.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "API server listening");
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))
}
