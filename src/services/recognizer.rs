//! Speech-to-text collaborator interface.

use crate::error::{Result, VoxlateError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Trait for speech recognition.
///
/// This trait allows swapping implementations (cloud service vs mock).
pub trait Recognizer: Send + Sync {
    /// Recognize speech in the given audio.
    ///
    /// # Arguments
    /// * `audio` - 16-bit PCM mono samples at 16 kHz
    /// * `language` - source language code (e.g. "en")
    ///
    /// # Returns
    /// Best-effort transcript, `NoSpeech` when the service heard nothing,
    /// or a `Recognition` error.
    fn recognize(&self, audio: &[i16], language: &str) -> Result<String>;

    /// Name for logging.
    fn name(&self) -> &'static str;
}

/// Mock recognizer for testing.
#[derive(Debug, Clone)]
pub struct MockRecognizer {
    response: String,
    should_fail: bool,
    no_speech: bool,
    failures_remaining: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl MockRecognizer {
    pub fn new() -> Self {
        Self {
            response: "mock transcript".to_string(),
            should_fail: false,
            no_speech: false,
            failures_remaining: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Fail every call with a `Recognition` error.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Report `NoSpeech` on every call.
    pub fn with_no_speech(mut self) -> Self {
        self.no_speech = true;
        self
    }

    /// Fail the first `n` calls with a `Recognition` error, then succeed.
    pub fn with_failures_then_success(self, n: usize) -> Self {
        self.failures_remaining.store(n, Ordering::SeqCst);
        self
    }

    /// Number of recognize calls made, shared across clones.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Recognizer for MockRecognizer {
    fn recognize(&self, _audio: &[i16], _language: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.no_speech {
            return Err(VoxlateError::NoSpeech);
        }
        if self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(VoxlateError::Recognition {
                message: "mock recognition failure".to_string(),
            });
        }
        if self.should_fail {
            return Err(VoxlateError::Recognition {
                message: "mock recognition failure".to_string(),
            });
        }
        Ok(self.response.clone())
    }

    fn name(&self) -> &'static str {
        "mock-recognizer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_returns_configured_response_and_counts() {
        let recognizer = MockRecognizer::new().with_response("hello there");
        assert_eq!(
            recognizer.recognize(&[0i16; 160], "en").unwrap(),
            "hello there"
        );
        assert_eq!(recognizer.recognize(&[0i16; 160], "en").unwrap().len(), 11);
        assert_eq!(recognizer.call_count(), 2);
    }

    #[test]
    fn mock_failure_is_recognition_error() {
        let recognizer = MockRecognizer::new().with_failure();
        match recognizer.recognize(&[0i16; 160], "en") {
            Err(VoxlateError::Recognition { message }) => {
                assert_eq!(message, "mock recognition failure");
            }
            other => panic!("Expected Recognition error, got ok={}", other.is_ok()),
        }
    }

    #[test]
    fn mock_no_speech_is_distinct_from_failure() {
        let recognizer = MockRecognizer::new().with_no_speech();
        assert!(matches!(
            recognizer.recognize(&[0i16; 160], "en"),
            Err(VoxlateError::NoSpeech)
        ));
    }

    #[test]
    fn mock_recovers_after_configured_failures() {
        let recognizer = MockRecognizer::new()
            .with_response("back online")
            .with_failures_then_success(2);
        assert!(recognizer.recognize(&[0i16; 160], "en").is_err());
        assert!(recognizer.recognize(&[0i16; 160], "en").is_err());
        assert_eq!(
            recognizer.recognize(&[0i16; 160], "en").unwrap(),
            "back online"
        );
    }

    #[test]
    fn call_count_shared_across_clones() {
        let recognizer = MockRecognizer::new();
        let clone = recognizer.clone();
        let _ = clone.recognize(&[0i16; 160], "en");
        assert_eq!(recognizer.call_count(), 1);
    }
}
