//! Synthesis station: attaches spoken audio to a translated pass.

use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::pipeline::types::{SpokenUtterance, TranslatedUtterance};
use crate::services::synthesizer::Synthesizer;
use std::sync::Arc;

pub struct SynthesizeStation {
    synthesizer: Arc<dyn Synthesizer>,
    /// Target language code for the synthesized voice.
    language: String,
    quiet: bool,
}

impl SynthesizeStation {
    pub fn new(synthesizer: Arc<dyn Synthesizer>, language: impl Into<String>) -> Self {
        Self {
            synthesizer,
            language: language.into(),
            quiet: false,
        }
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

impl Station for SynthesizeStation {
    type Input = TranslatedUtterance;
    type Output = SpokenUtterance;

    fn process(
        &mut self,
        translated: TranslatedUtterance,
    ) -> Result<Option<SpokenUtterance>, StationError> {
        // A synthesis failure must not eat the pass: forward the texts with
        // no audio so the sink still shows them.
        let audio = match self
            .synthesizer
            .synthesize(&translated.translated, &self.language)
        {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                if !self.quiet {
                    eprintln!("voxlate: [synthesize] {}: {}", self.synthesizer.name(), e);
                }
                None
            }
        };

        Ok(Some(SpokenUtterance {
            original: translated.original,
            translated: translated.translated,
            audio,
            sequence: translated.sequence,
        }))
    }

    fn name(&self) -> &'static str {
        "synthesize"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::synthesizer::MockSynthesizer;
    use std::time::Instant;

    fn translated() -> TranslatedUtterance {
        TranslatedUtterance {
            original: "hello".to_string(),
            translated: "hola".to_string(),
            sequence: 1,
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn audio_is_attached_on_success() {
        let synthesizer = MockSynthesizer::new().with_audio(vec![9, 9, 9]);
        let mut station = SynthesizeStation::new(Arc::new(synthesizer), "es");
        let out = station.process(translated()).unwrap().unwrap();
        assert_eq!(out.audio, Some(vec![9, 9, 9]));
        assert_eq!(out.translated, "hola");
    }

    #[test]
    fn failure_forwards_texts_without_audio() {
        let synthesizer = MockSynthesizer::new().with_failure();
        let mut station = SynthesizeStation::new(Arc::new(synthesizer), "es").with_quiet(true);
        let out = station.process(translated()).unwrap().unwrap();
        assert!(out.audio.is_none());
        assert_eq!(out.original, "hello");
        assert_eq!(out.translated, "hola");
    }

    #[test]
    fn every_pass_synthesizes_fresh() {
        let synthesizer = MockSynthesizer::new();
        let counter = synthesizer.clone();
        let mut station = SynthesizeStation::new(Arc::new(synthesizer), "es");
        station.process(translated()).unwrap();
        station.process(translated()).unwrap();
        assert_eq!(counter.call_count(), 2);
    }
}
