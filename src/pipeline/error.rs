//! Error types and reporting for pipeline stations.

use std::fmt;

/// Errors raised while a station processes one pass.
#[derive(Debug, Clone)]
pub enum StationError {
    /// The pass is lost but the station keeps running.
    Recoverable(String),
    /// The station must shut down.
    Fatal(String),
}

impl StationError {
    pub fn recoverable(message: impl Into<String>) -> Self {
        StationError::Recoverable(message.into())
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        StationError::Fatal(message.into())
    }
}

impl fmt::Display for StationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationError::Recoverable(msg) => write!(f, "recoverable: {}", msg),
            StationError::Fatal(msg) => write!(f, "fatal: {}", msg),
        }
    }
}

impl std::error::Error for StationError {}

/// Destination for station errors.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, station: &str, error: &StationError);
}

/// Default reporter: one line on stderr per error.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, station: &str, error: &StationError) {
        eprintln!("voxlate: [{}] {}", station, error);
    }
}
