//! Text-to-speech collaborator interface.

use crate::error::{Result, VoxlateError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Trait for speech synthesis.
pub trait Synthesizer: Send + Sync {
    /// Synthesize `text` in the given language.
    ///
    /// Returns encoded MP3 bytes. Every call synthesizes from scratch;
    /// implementations must not cache (two passes with identical text are
    /// two independent calls by contract).
    fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>>;

    /// Name for logging.
    fn name(&self) -> &'static str;
}

/// Mock synthesizer for testing.
#[derive(Debug, Clone)]
pub struct MockSynthesizer {
    audio: Vec<u8>,
    should_fail: bool,
    calls: Arc<AtomicUsize>,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self {
            audio: vec![0xFF, 0xFB, 0x90, 0x00], // an MP3 frame header
            should_fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_audio(mut self, audio: Vec<u8>) -> Self {
        self.audio = audio;
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synthesizer for MockSynthesizer {
    fn synthesize(&self, _text: &str, _language: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(VoxlateError::Synthesis {
                message: "mock synthesis failure".to_string(),
            });
        }
        Ok(self.audio.clone())
    }

    fn name(&self) -> &'static str {
        "mock-synthesizer"
    }
}
