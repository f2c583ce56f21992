//! Session assembly: turn a [`Config`] into a running pipeline.

use crate::audio::listener::ListenerConfig;
use crate::audio::recorder::AudioSource;
use crate::config::Config;
use crate::error::Result;
use crate::pipeline::orchestrator::{CaptureMode, Pipeline, PipelineConfig, PipelineHandle};
use crate::pipeline::sink::{SpeechSink, StdoutSink};
use crate::services::google::{GoogleRecognizer, GoogleSynthesizer, GoogleTranslator};
use crate::services::recognizer::Recognizer;
use crate::services::synthesizer::Synthesizer;
use crate::services::translator::Translator;
use std::sync::Arc;
use std::time::Duration;

/// Listener tuning from the audio config section.
pub fn listener_config(config: &Config) -> ListenerConfig {
    ListenerConfig {
        sample_rate: config.audio.sample_rate,
        listen_timeout: Duration::from_secs(config.audio.listen_timeout_secs),
        phrase_limit: Duration::from_secs(config.audio.phrase_limit_secs),
        speech_threshold: config.audio.speech_threshold,
        silence_duration_ms: config.audio.silence_duration_ms,
    }
}

/// Pipeline configuration with the language pair resolved to codes.
pub fn pipeline_config(config: &Config, quiet: bool, verbose: u8) -> PipelineConfig {
    let (source, target) = config.language_pair();
    PipelineConfig {
        source_language: source,
        target_language: target,
        capture: CaptureMode::Utterance(listener_config(config)),
        on_translation_error: config.output.on_translation_error,
        quiet,
        verbose,
        ..PipelineConfig::default()
    }
}

/// The three cloud collaborators, wired to the configured endpoints.
pub fn build_services(
    config: &Config,
) -> (
    Arc<dyn Recognizer>,
    Arc<dyn Translator>,
    Arc<dyn Synthesizer>,
) {
    let recognizer = GoogleRecognizer::new(
        &config.services.speech_api_url,
        &config.services.speech_api_key,
        config.audio.sample_rate,
    );
    let translator = GoogleTranslator::new(&config.services.translate_api_url);
    let synthesizer = GoogleSynthesizer::new(&config.services.tts_api_url);
    (
        Arc::new(recognizer),
        Arc::new(translator),
        Arc::new(synthesizer),
    )
}

/// Sink selection: speak translations when playback is on, otherwise
/// print them to stdout.
pub fn build_sink(config: &Config) -> Box<dyn SpeechSink> {
    #[cfg(feature = "playback")]
    if config.output.playback {
        return Box::new(crate::playback::PlaybackSink::new());
    }
    Box::new(StdoutSink::new())
}

/// Open the configured microphone.
#[cfg(feature = "cpal-audio")]
pub fn open_microphone(config: &Config) -> Result<Box<dyn AudioSource>> {
    let source = crate::audio::capture::CpalAudioSource::new(config.audio.device.as_deref())?;
    Ok(Box::new(source))
}

/// Start a translation session on the configured microphone.
#[cfg(feature = "cpal-audio")]
pub fn start_session(config: &Config, quiet: bool, verbose: u8) -> Result<PipelineHandle> {
    let audio_source = open_microphone(config)?;
    start_session_with_source(config, quiet, verbose, audio_source)
}

/// Start a session on an arbitrary audio source (tests, file input).
pub fn start_session_with_source(
    config: &Config,
    quiet: bool,
    verbose: u8,
    audio_source: Box<dyn AudioSource>,
) -> Result<PipelineHandle> {
    let (recognizer, translator, synthesizer) = build_services(config);
    let pipeline = Pipeline::new(pipeline_config(config, quiet, verbose));
    pipeline.start(
        audio_source,
        recognizer,
        translator,
        synthesizer,
        build_sink(config),
    )
}

/// Run exactly one pass: capture one utterance, recognize, translate,
/// synthesize, and hand it to the sink. Used by `--once`.
pub fn run_single_pass(
    config: &Config,
    quiet: bool,
    audio_source: &mut dyn AudioSource,
) -> Result<()> {
    use crate::audio::listener::UtteranceListener;
    use crate::pipeline::types::SpokenUtterance;
    use std::sync::atomic::AtomicBool;

    let (source, target) = config.language_pair();
    let (recognizer, translator, synthesizer) = build_services(config);

    if !quiet {
        crate::output::render_status("Listening...");
    }

    let listener = UtteranceListener::new(listener_config(config));
    audio_source.start()?;
    let listen_result = listener.listen(audio_source, &AtomicBool::new(true));
    audio_source.stop()?;
    let samples = listen_result?;

    let original = recognizer.recognize(&samples, &source)?;
    let translated = match translator.translate(&original, &source, &target) {
        Ok(text) => text,
        Err(e) => match config.output.on_translation_error {
            crate::config::TranslationFailurePolicy::Skip => return Err(e),
            crate::config::TranslationFailurePolicy::Placeholder => {
                crate::defaults::TRANSLATION_ERROR_PLACEHOLDER.to_string()
            }
        },
    };

    if !quiet {
        crate::output::clear_line();
        crate::output::render_pass(&original, &translated);
    }

    let audio = match synthesizer.synthesize(&translated, &target) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            eprintln!("voxlate: synthesis failed: {}", e);
            None
        }
    };

    let mut sink = build_sink(config);
    sink.handle(&SpokenUtterance {
        original,
        translated,
        audio,
        sequence: 0,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LanguagesConfig;

    #[test]
    fn listener_config_reflects_audio_section() {
        let mut config = Config::default();
        config.audio.listen_timeout_secs = 3;
        config.audio.phrase_limit_secs = 7;

        let listener = listener_config(&config);
        assert_eq!(listener.listen_timeout, Duration::from_secs(3));
        assert_eq!(listener.phrase_limit, Duration::from_secs(7));
        assert_eq!(listener.sample_rate, 16000);
    }

    #[test]
    fn pipeline_config_resolves_language_names() {
        let config = Config {
            languages: LanguagesConfig {
                source: "German".to_string(),
                target: "japanese".to_string(),
            },
            ..Config::default()
        };

        let pipeline = pipeline_config(&config, true, 0);
        assert_eq!(pipeline.source_language, "de");
        assert_eq!(pipeline.target_language, "ja");
        assert!(pipeline.quiet);
        assert_eq!(pipeline.verbose, 0);
        assert!(matches!(pipeline.capture, CaptureMode::Utterance(_)));
    }

    #[test]
    fn services_are_built_from_endpoints() {
        let (recognizer, translator, synthesizer) = build_services(&Config::default());
        assert_eq!(recognizer.name(), "google-speech");
        assert_eq!(translator.name(), "google-translate");
        assert_eq!(synthesizer.name(), "google-tts");
    }
}
