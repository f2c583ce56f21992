//! Error types for voxlate.
//!
//! Each pipeline step gets its own error kind so callers can tell
//! "nobody spoke" apart from "the network is down", even though the
//! control loop treats both as "discard this pass and keep going".

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoxlateError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio capture errors
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    /// No speech was detected within the listen timeout. Ends the pass
    /// quietly; never terminates the session.
    #[error("No speech detected")]
    NoSpeech,

    // External collaborator errors, one per pipeline step
    #[error("Speech recognition failed: {message}")]
    Recognition { message: String },

    #[error("Translation failed: {message}")]
    Translation { message: String },

    #[error("Speech synthesis failed: {message}")]
    Synthesis { message: String },

    // Push transport errors
    #[error("Audio transport error: {message}")]
    Transport { message: String },

    // Playback errors
    #[error("Audio playback failed: {message}")]
    Playback { message: String },

    // IPC errors
    #[error("IPC socket error: {message}")]
    IpcSocket { message: String },

    #[error("IPC protocol error: {message}")]
    IpcProtocol { message: String },

    #[error("IPC connection failed: {message}")]
    IpcConnection { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl VoxlateError {
    /// True for the one error kind that is expected during normal
    /// operation: the microphone heard nothing. Suppressed at default
    /// verbosity; every other kind is always reported.
    pub fn is_no_speech(&self) -> bool {
        matches!(self, VoxlateError::NoSpeech)
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, VoxlateError>;
