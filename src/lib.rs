//! voxlate - Live voice translation for the terminal
//!
//! Captures speech from the microphone, recognizes it, translates it,
//! and speaks the translation back.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod daemon;
pub mod defaults;
pub mod error;
pub mod ipc;
pub mod languages;
pub mod output;
pub mod pipeline;
#[cfg(feature = "playback")]
pub mod playback;
pub mod services;

// Core traits (source → recognize → translate → synthesize → sink)
pub use audio::recorder::AudioSource;
pub use pipeline::sink::{CollectorSink, SpeechSink, StdoutSink};
pub use services::recognizer::Recognizer;
pub use services::synthesizer::Synthesizer;
pub use services::translator::Translator;

// Pipeline
pub use pipeline::orchestrator::{CaptureMode, Pipeline, PipelineConfig, PipelineHandle};

// Error handling
pub use error::{Result, VoxlateError};

// Config
pub use config::{Config, TranslationFailurePolicy};

// Station framework (for advanced users)
pub use pipeline::error::{ErrorReporter, StationError};
pub use pipeline::station::Station;

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.1+abc1234"` when git hash is available, `"0.3.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_contains_plus_when_git_hash_present() {
        let ver = version_string();
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            assert!(
                ver.contains('+'),
                "With GIT_HASH set, version should contain '+', got: {}",
                ver
            );
            let hash_part = ver.split('+').nth(1).unwrap_or("");
            assert_eq!(
                hash_part.len(),
                7,
                "Git hash should be 7 chars, got: {}",
                hash_part
            );
        } else {
            assert_eq!(ver, env!("CARGO_PKG_VERSION"));
        }
    }
}
