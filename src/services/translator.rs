//! Translation collaborator interface.

use crate::error::{Result, VoxlateError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Trait for text translation.
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` to `target` (language codes).
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;

    /// Name for logging.
    fn name(&self) -> &'static str;
}

/// Mock translator for testing. By default echoes the input wrapped in
/// brackets with the target code, so tests can assert flow-through.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    response: Option<String>,
    should_fail: bool,
    calls: Arc<AtomicUsize>,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self {
            response: None,
            should_fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_response(mut self, response: &str) -> Self {
        self.response = Some(response.to_string());
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

impl Default for MockTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator for MockTranslator {
    fn translate(&self, text: &str, _source: &str, target: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(VoxlateError::Translation {
                message: "mock translation failure".to_string(),
            });
        }
        Ok(self
            .response
            .clone()
            .unwrap_or_else(|| format!("[{}] {}", target, text)))
    }

    fn name(&self) -> &'static str {
        "mock-translator"
    }
}
