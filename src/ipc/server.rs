//! Async Unix-socket IPC server for daemon control.

use crate::defaults;
use crate::error::{Result, VoxlateError};
use crate::ipc::protocol::{Command, Response};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;

/// Handler for incoming daemon commands.
#[async_trait::async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, command: Command) -> Response;
}

#[derive(Debug, Clone)]
struct ServerState {
    shutdown: Arc<Mutex<bool>>,
}

impl ServerState {
    fn new() -> Self {
        Self {
            shutdown: Arc::new(Mutex::new(false)),
        }
    }

    async fn is_shutdown(&self) -> bool {
        *self.shutdown.lock().await
    }

    async fn set_shutdown(&self) {
        *self.shutdown.lock().await = true;
    }
}

/// One-command-per-connection server: the client sends one JSON line,
/// gets one JSON line back.
pub struct IpcServer {
    socket_path: PathBuf,
    state: ServerState,
}

impl IpcServer {
    pub fn new(socket_path: PathBuf) -> Result<Self> {
        Ok(Self {
            socket_path,
            state: ServerState::new(),
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Default socket location: `$XDG_RUNTIME_DIR/voxlate.sock`, with a
    /// per-uid /tmp fallback.
    pub fn default_socket_path() -> PathBuf {
        if let Ok(xdg_runtime) = std::env::var("XDG_RUNTIME_DIR") {
            PathBuf::from(xdg_runtime).join(defaults::SOCKET_NAME)
        } else {
            let uid = unsafe { libc::getuid() };
            PathBuf::from(format!("/tmp/voxlate-{}.sock", uid))
        }
    }

    /// Bind the socket and serve connections until shutdown.
    pub async fn start<H>(&self, handler: H) -> Result<()>
    where
        H: CommandHandler + 'static,
    {
        // A stale socket from a crashed daemon blocks bind.
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path).map_err(|e| VoxlateError::IpcSocket {
                message: format!("failed to remove existing socket: {}", e),
            })?;
        }

        let listener =
            UnixListener::bind(&self.socket_path).map_err(|e| VoxlateError::IpcSocket {
                message: format!("failed to bind socket: {}", e),
            })?;

        let handler = Arc::new(handler);

        loop {
            if self.state.is_shutdown().await {
                break;
            }

            // Accept with a timeout so the shutdown flag gets rechecked.
            let accept_result =
                tokio::time::timeout(tokio::time::Duration::from_millis(100), listener.accept())
                    .await;

            match accept_result {
                Ok(Ok((stream, _))) => {
                    let handler = Arc::clone(&handler);
                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, handler).await {
                            eprintln!("voxlate: ipc client error: {}", e);
                        }
                    });
                }
                Ok(Err(e)) => {
                    return Err(VoxlateError::IpcConnection {
                        message: format!("failed to accept connection: {}", e),
                    });
                }
                Err(_) => continue,
            }
        }

        Ok(())
    }

    /// Stop serving and remove the socket file.
    pub async fn stop(&self) -> Result<()> {
        self.state.set_shutdown().await;

        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path).map_err(|e| VoxlateError::IpcSocket {
                message: format!("failed to remove socket file: {}", e),
            })?;
        }

        Ok(())
    }
}

async fn handle_client<H>(stream: UnixStream, handler: Arc<H>) -> Result<()>
where
    H: CommandHandler,
{
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    reader
        .read_line(&mut line)
        .await
        .map_err(|e| VoxlateError::IpcConnection {
            message: format!("failed to read from client: {}", e),
        })?;

    let command = Command::from_json(line.trim()).map_err(|e| VoxlateError::IpcProtocol {
        message: format!("failed to parse command: {}", e),
    })?;

    let response = handler.handle(command).await;

    let response_json = response.to_json().map_err(|e| VoxlateError::IpcProtocol {
        message: format!("failed to serialize response: {}", e),
    })?;

    writer
        .write_all(response_json.as_bytes())
        .await
        .map_err(|e| VoxlateError::IpcConnection {
            message: format!("failed to write to client: {}", e),
        })?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| VoxlateError::IpcConnection {
            message: format!("failed to write to client: {}", e),
        })?;
    writer
        .flush()
        .await
        .map_err(|e| VoxlateError::IpcConnection {
            message: format!("failed to flush writer: {}", e),
        })?;

    Ok(())
}
