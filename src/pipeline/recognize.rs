//! Recognition station: captured audio in, source-language transcript out.

use crate::error::VoxlateError;
use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::pipeline::types::{CapturedUtterance, RecognizedUtterance};
use crate::services::recognizer::Recognizer;
use std::sync::Arc;

pub struct RecognizeStation {
    recognizer: Arc<dyn Recognizer>,
    /// Source language code, e.g. "en".
    language: String,
}

impl RecognizeStation {
    pub fn new(recognizer: Arc<dyn Recognizer>, language: impl Into<String>) -> Self {
        Self {
            recognizer,
            language: language.into(),
        }
    }
}

impl Station for RecognizeStation {
    type Input = CapturedUtterance;
    type Output = RecognizedUtterance;

    fn process(
        &mut self,
        utterance: CapturedUtterance,
    ) -> Result<Option<RecognizedUtterance>, StationError> {
        match self.recognizer.recognize(&utterance.samples, &self.language) {
            Ok(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Ok(None);
                }
                Ok(Some(RecognizedUtterance {
                    text,
                    sequence: utterance.sequence,
                    captured_at: utterance.captured_at,
                }))
            }
            // Silence is not an error: the pass ends, the session continues.
            Err(VoxlateError::NoSpeech) => Ok(None),
            Err(e) => Err(StationError::recoverable(format!(
                "{}: {}",
                self.recognizer.name(),
                e
            ))),
        }
    }

    fn name(&self) -> &'static str {
        "recognize"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::recognizer::MockRecognizer;

    fn utterance() -> CapturedUtterance {
        CapturedUtterance::new(vec![1000i16; 160], 0)
    }

    #[test]
    fn transcript_flows_downstream() {
        let recognizer = MockRecognizer::new().with_response("buenos dias");
        let mut station = RecognizeStation::new(Arc::new(recognizer), "es");
        let out = station.process(utterance()).unwrap().unwrap();
        assert_eq!(out.text, "buenos dias");
    }

    #[test]
    fn no_speech_drops_the_pass_without_error() {
        let recognizer = MockRecognizer::new().with_no_speech();
        let mut station = RecognizeStation::new(Arc::new(recognizer), "en");
        assert!(station.process(utterance()).unwrap().is_none());
    }

    #[test]
    fn service_failure_is_recoverable() {
        let recognizer = MockRecognizer::new().with_failure();
        let mut station = RecognizeStation::new(Arc::new(recognizer), "en");
        assert!(matches!(
            station.process(utterance()),
            Err(StationError::Recoverable(_))
        ));
    }

    #[test]
    fn blank_transcript_is_dropped() {
        let recognizer = MockRecognizer::new().with_response("   ");
        let mut station = RecognizeStation::new(Arc::new(recognizer), "en");
        assert!(station.process(utterance()).unwrap().is_none());
    }
}
