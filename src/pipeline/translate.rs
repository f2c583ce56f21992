//! Translation station with a configurable failure policy.

use crate::config::TranslationFailurePolicy;
use crate::defaults;
use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::pipeline::types::{RecognizedUtterance, TranslatedUtterance};
use crate::services::translator::Translator;
use std::sync::Arc;

pub struct TranslateStation {
    translator: Arc<dyn Translator>,
    source: String,
    target: String,
    on_failure: TranslationFailurePolicy,
}

impl TranslateStation {
    pub fn new(
        translator: Arc<dyn Translator>,
        source: impl Into<String>,
        target: impl Into<String>,
        on_failure: TranslationFailurePolicy,
    ) -> Self {
        Self {
            translator,
            source: source.into(),
            target: target.into(),
            on_failure,
        }
    }
}

impl Station for TranslateStation {
    type Input = RecognizedUtterance;
    type Output = TranslatedUtterance;

    fn process(
        &mut self,
        recognized: RecognizedUtterance,
    ) -> Result<Option<TranslatedUtterance>, StationError> {
        match self
            .translator
            .translate(&recognized.text, &self.source, &self.target)
        {
            Ok(translated) => Ok(Some(TranslatedUtterance {
                original: recognized.text,
                translated,
                sequence: recognized.sequence,
                captured_at: recognized.captured_at,
            })),
            Err(e) => match self.on_failure {
                TranslationFailurePolicy::Skip => Err(StationError::recoverable(format!(
                    "{}: {}",
                    self.translator.name(),
                    e
                ))),
                // Keep the pass alive with the placeholder so the speaker
                // hears that translation broke.
                TranslationFailurePolicy::Placeholder => Ok(Some(TranslatedUtterance {
                    original: recognized.text,
                    translated: defaults::TRANSLATION_ERROR_PLACEHOLDER.to_string(),
                    sequence: recognized.sequence,
                    captured_at: recognized.captured_at,
                })),
            },
        }
    }

    fn name(&self) -> &'static str {
        "translate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::translator::MockTranslator;
    use std::time::Instant;

    fn recognized(text: &str) -> RecognizedUtterance {
        RecognizedUtterance {
            text: text.to_string(),
            sequence: 3,
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn translation_carries_both_texts() {
        let translator = MockTranslator::new().with_response("hola");
        let mut station = TranslateStation::new(
            Arc::new(translator),
            "en",
            "es",
            TranslationFailurePolicy::Skip,
        );
        let out = station.process(recognized("hello")).unwrap().unwrap();
        assert_eq!(out.original, "hello");
        assert_eq!(out.translated, "hola");
        assert_eq!(out.sequence, 3);
    }

    #[test]
    fn skip_policy_drops_the_pass_with_a_recoverable_error() {
        let translator = MockTranslator::new().with_failure();
        let mut station = TranslateStation::new(
            Arc::new(translator),
            "en",
            "es",
            TranslationFailurePolicy::Skip,
        );
        assert!(matches!(
            station.process(recognized("hello")),
            Err(StationError::Recoverable(_))
        ));
    }

    #[test]
    fn placeholder_policy_substitutes_and_continues() {
        let translator = MockTranslator::new().with_failure();
        let mut station = TranslateStation::new(
            Arc::new(translator),
            "en",
            "es",
            TranslationFailurePolicy::Placeholder,
        );
        let out = station.process(recognized("hello")).unwrap().unwrap();
        assert_eq!(out.original, "hello");
        assert_eq!(out.translated, defaults::TRANSLATION_ERROR_PLACEHOLDER);
    }
}
