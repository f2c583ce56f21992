//! Daemon mode: owns the session flag and serves IPC commands.

pub mod handler;

use crate::config::Config;
use crate::error::{Result, VoxlateError};
use crate::ipc::server::IpcServer;
use crate::pipeline::orchestrator::PipelineHandle;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

/// Shared daemon state: the config and the current pipeline, if any.
pub struct DaemonState {
    pub config: Arc<Mutex<Config>>,
    /// Some = translating, None = idle.
    pub pipeline: Arc<Mutex<Option<PipelineHandle>>>,
}

impl DaemonState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(Mutex::new(config)),
            pipeline: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn is_translating(&self) -> bool {
        self.pipeline.lock().await.is_some()
    }

    /// Resolved (source, target) codes from the current config.
    pub async fn language_pair(&self) -> (String, String) {
        self.config.lock().await.language_pair()
    }
}

/// Run the daemon until SIGINT, SIGTERM, or a `shutdown` command.
pub async fn run_daemon(
    config: Config,
    socket_path: Option<PathBuf>,
    quiet: bool,
    verbose: u8,
) -> Result<()> {
    #[cfg(feature = "cpal-audio")]
    crate::audio::capture::suppress_audio_warnings();

    let state = DaemonState::new(config);
    let socket_path = socket_path.unwrap_or_else(IpcServer::default_socket_path);
    let server = Arc::new(IpcServer::new(socket_path)?);

    if !quiet {
        eprintln!("voxlate: listening at {}", server.socket_path().display());
        eprintln!("voxlate: daemon ready");
    }

    let shutdown = Arc::new(Notify::new());
    let handler = handler::DaemonCommandHandler::new(state, quiet, verbose)
        .with_shutdown(shutdown.clone());
    let state_ref = handler.state();

    let server_clone = Arc::clone(&server);
    let server_handle = tokio::spawn(async move { server_clone.start(handler).await });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            if !quiet {
                eprintln!("\nvoxlate: received SIGINT, shutting down");
            }
        }
        res = wait_for_sigterm() => {
            if let Err(e) = res {
                eprintln!("voxlate: signal handler setup failed: {}", e);
            }
            if !quiet {
                eprintln!("\nvoxlate: received SIGTERM, shutting down");
            }
        }
        _ = shutdown.notified() => {
            if !quiet {
                eprintln!("voxlate: shutdown requested, stopping");
            }
        }
    }

    // Stop any in-flight session before the socket goes away.
    if let Some(handle) = state_ref.pipeline.lock().await.take() {
        let _ = handle.stop();
    }

    server.stop().await?;
    if let Err(e) = server_handle.await {
        eprintln!("voxlate: daemon server task failed: {e}");
    }

    if !quiet {
        eprintln!("voxlate: daemon stopped");
    }
    Ok(())
}

#[cfg(unix)]
async fn wait_for_sigterm() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| VoxlateError::Other(format!("failed to register SIGTERM handler: {}", e)))?;
    sigterm.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_sigterm() -> Result<()> {
    std::future::pending::<()>().await
}
