//! IPC command handling for the daemon.

use crate::daemon::DaemonState;
use crate::ipc::protocol::{Command, Response};
use crate::ipc::server::CommandHandler;
use crate::languages::language_code;
use std::sync::Arc;
use tokio::sync::Notify;

pub struct DaemonCommandHandler {
    state: Arc<DaemonState>,
    #[cfg_attr(not(feature = "cpal-audio"), allow(dead_code))]
    quiet: bool,
    #[cfg_attr(not(feature = "cpal-audio"), allow(dead_code))]
    verbose: u8,
    shutdown: Option<Arc<Notify>>,
}

impl DaemonCommandHandler {
    pub fn new(state: DaemonState, quiet: bool, verbose: u8) -> Self {
        Self {
            state: Arc::new(state),
            quiet,
            verbose,
            shutdown: None,
        }
    }

    /// Wire the notifier that ends the daemon on a `shutdown` command.
    pub fn with_shutdown(mut self, shutdown: Arc<Notify>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn state(&self) -> Arc<DaemonState> {
        self.state.clone()
    }

    /// Start a translation session. Idempotent: starting twice is a no-op
    /// with a message, not an error.
    ///
    /// The pipeline lock is held from the check through the insert so two
    /// concurrent starts cannot both build a session.
    async fn start_session(&self) -> Response {
        let mut pipeline_guard = self.state.pipeline.lock().await;
        if pipeline_guard.is_some() {
            return Response::Message {
                text: "already translating".to_string(),
            };
        }

        #[cfg(feature = "cpal-audio")]
        {
            let config = self.state.config.lock().await.clone();
            match crate::app::start_session(&config, self.quiet, self.verbose) {
                Ok(handle) => {
                    *pipeline_guard = Some(handle);
                    Response::Ok
                }
                Err(e) => Response::Error {
                    message: format!("failed to start session: {}", e),
                },
            }
        }

        #[cfg(not(feature = "cpal-audio"))]
        {
            drop(pipeline_guard);
            Response::Error {
                message: "built without microphone capture support".to_string(),
            }
        }
    }

    /// Stop the current session. Idempotent like start.
    async fn stop_session(&self) -> Response {
        let mut pipeline_guard = self.state.pipeline.lock().await;
        match pipeline_guard.take() {
            Some(handle) => {
                let _ = handle.stop();
                Response::Ok
            }
            None => Response::Message {
                text: "not translating".to_string(),
            },
        }
    }

    async fn toggle_session(&self) -> Response {
        if self.state.is_translating().await {
            self.stop_session().await
        } else {
            self.start_session().await
        }
    }

    async fn get_status(&self) -> Response {
        let (source_language, target_language) = self.state.language_pair().await;
        Response::Status {
            translating: self.state.is_translating().await,
            source_language,
            target_language,
        }
    }

    /// Update the language pair. Applies to the next session start; a
    /// running session keeps its languages until restarted.
    async fn set_languages(&self, source: String, target: String) -> Response {
        let translating = self.state.is_translating().await;
        {
            let mut config = self.state.config.lock().await;
            config.languages.source = source.clone();
            config.languages.target = target.clone();
        }

        let note = if translating {
            format!(
                "languages set to {} -> {} (takes effect on next start)",
                language_code(&source),
                language_code(&target)
            )
        } else {
            format!(
                "languages set to {} -> {}",
                language_code(&source),
                language_code(&target)
            )
        };
        Response::Message { text: note }
    }
}

#[async_trait::async_trait]
impl CommandHandler for DaemonCommandHandler {
    async fn handle(&self, command: Command) -> Response {
        match command {
            Command::Start => self.start_session().await,
            Command::Stop => self.stop_session().await,
            Command::Toggle => self.toggle_session().await,
            Command::Status => self.get_status().await,
            Command::SetLanguages { source, target } => self.set_languages(source, target).await,
            Command::Shutdown => {
                if let Some(shutdown) = &self.shutdown {
                    shutdown.notify_one();
                }
                Response::Ok
            }
        }
    }
}
