//! IPC client: one command in, one response out.

use crate::error::{Result, VoxlateError};
use crate::ipc::protocol::{Command, Response};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

/// Send `command` to the daemon listening on `socket_path`.
///
/// # Errors
/// `IpcConnection` when the daemon is unreachable, `IpcProtocol` when
/// either side sends malformed JSON.
pub async fn send_command(socket_path: &Path, command: Command) -> Result<Response> {
    let stream =
        UnixStream::connect(socket_path)
            .await
            .map_err(|e| VoxlateError::IpcConnection {
                message: format!("failed to connect to daemon: {}", e),
            })?;

    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let command_json = command.to_json().map_err(|e| VoxlateError::IpcProtocol {
        message: format!("failed to serialize command: {}", e),
    })?;

    writer
        .write_all(command_json.as_bytes())
        .await
        .map_err(|e| VoxlateError::IpcConnection {
            message: format!("failed to write command: {}", e),
        })?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| VoxlateError::IpcConnection {
            message: format!("failed to write command: {}", e),
        })?;
    writer
        .flush()
        .await
        .map_err(|e| VoxlateError::IpcConnection {
            message: format!("failed to flush writer: {}", e),
        })?;

    let mut response_line = String::new();
    reader
        .read_line(&mut response_line)
        .await
        .map_err(|e| VoxlateError::IpcConnection {
            message: format!("failed to read response: {}", e),
        })?;

    Response::from_json(response_line.trim()).map_err(|e| VoxlateError::IpcProtocol {
        message: format!("failed to deserialize response: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::server::{CommandHandler, IpcServer};
    use tempfile::TempDir;

    struct MockHandler;

    #[async_trait::async_trait]
    impl CommandHandler for MockHandler {
        async fn handle(&self, command: Command) -> Response {
            match command {
                Command::Status => Response::Status {
                    translating: true,
                    source_language: "en".to_string(),
                    target_language: "fr".to_string(),
                },
                Command::SetLanguages { source, target } => Response::Message {
                    text: format!("languages set to {} -> {}", source, target),
                },
                _ => Response::Ok,
            }
        }
    }

    async fn spawn_server(socket_path: std::path::PathBuf) {
        tokio::spawn(async move {
            let server = IpcServer::new(socket_path).unwrap();
            server.start(MockHandler).await
        });
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn status_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("test.sock");
        spawn_server(socket_path.clone()).await;

        let response = send_command(&socket_path, Command::Status).await.unwrap();
        match response {
            Response::Status {
                translating,
                source_language,
                target_language,
            } => {
                assert!(translating);
                assert_eq!(source_language, "en");
                assert_eq!(target_language, "fr");
            }
            other => panic!("expected Status, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn set_languages_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("test.sock");
        spawn_server(socket_path.clone()).await;

        let response = send_command(
            &socket_path,
            Command::SetLanguages {
                source: "de".to_string(),
                target: "ja".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(
            response,
            Response::Message {
                text: "languages set to de -> ja".to_string()
            }
        );
    }

    #[tokio::test]
    async fn sequential_commands_reuse_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("test.sock");
        spawn_server(socket_path.clone()).await;

        for command in [Command::Toggle, Command::Start, Command::Stop] {
            let response = send_command(&socket_path, command).await.unwrap();
            assert_eq!(response, Response::Ok);
        }
    }

    #[tokio::test]
    async fn missing_daemon_is_a_connection_error() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("nonexistent.sock");

        let result = send_command(&socket_path, Command::Status).await;
        match result {
            Err(VoxlateError::IpcConnection { message }) => {
                assert!(message.contains("failed to connect"));
            }
            other => panic!("expected IpcConnection error, got ok={}", other.is_ok()),
        }
    }
}
