//! End-to-end pipeline behavior with stub collaborators.
//!
//! Exercises whole sessions: capture through sink, failure handling per
//! station, and the session flag's stop semantics.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use voxlate::audio::listener::ListenerConfig;
use voxlate::audio::recorder::{FramePhase, MockAudioSource};
use voxlate::config::TranslationFailurePolicy;
use voxlate::pipeline::sink::CollectorSink;
use voxlate::services::recognizer::MockRecognizer;
use voxlate::services::synthesizer::MockSynthesizer;
use voxlate::services::translator::MockTranslator;
use voxlate::{CaptureMode, Pipeline, PipelineConfig};

fn utterance_config() -> PipelineConfig {
    PipelineConfig {
        quiet: true,
        capture: CaptureMode::Utterance(ListenerConfig {
            listen_timeout: Duration::from_millis(200),
            silence_duration_ms: 100,
            ..ListenerConfig::default()
        }),
        ..PipelineConfig::default()
    }
}

fn frames_config() -> PipelineConfig {
    PipelineConfig {
        quiet: true,
        capture: CaptureMode::Frames,
        ..PipelineConfig::default()
    }
}

/// One second-long burst of speech followed by enough silence to cut the
/// utterance, then source exhaustion.
fn one_utterance_source() -> Box<MockAudioSource> {
    Box::new(MockAudioSource::new().with_frame_sequence(vec![
        FramePhase {
            samples: vec![10000i16; 3200],
            count: 1,
        },
        FramePhase {
            samples: vec![0i16; 3200],
            count: 1,
        },
    ]))
}

fn frames_source(count: u32) -> Box<MockAudioSource> {
    Box::new(MockAudioSource::new().with_frame_sequence(vec![FramePhase {
        samples: vec![5000i16; 1600],
        count,
    }]))
}

#[test]
fn each_pass_runs_every_step_exactly_once() {
    let recognizer = MockRecognizer::new().with_response("good morning");
    let translator = MockTranslator::new().with_response("buenos dias");
    let synthesizer = MockSynthesizer::new();
    let (recognizer_c, translator_c, synthesizer_c) = (
        recognizer.clone(),
        translator.clone(),
        synthesizer.clone(),
    );

    let handle = Pipeline::new(utterance_config())
        .start(
            one_utterance_source(),
            Arc::new(recognizer),
            Arc::new(translator),
            Arc::new(synthesizer),
            Box::new(CollectorSink::new()),
        )
        .unwrap();

    thread::sleep(Duration::from_millis(300));
    let result = handle.stop();

    assert_eq!(result, Some("buenos dias".to_string()));
    assert_eq!(recognizer_c.call_count(), 1);
    assert_eq!(translator_c.call_count(), 1);
    assert_eq!(synthesizer_c.call_count(), 1);
}

#[test]
fn no_speech_skips_translation_and_synthesis() {
    let translator = MockTranslator::new();
    let synthesizer = MockSynthesizer::new();
    let (translator_c, synthesizer_c) = (translator.clone(), synthesizer.clone());

    let handle = Pipeline::new(utterance_config())
        .start(
            one_utterance_source(),
            Arc::new(MockRecognizer::new().with_no_speech()),
            Arc::new(translator),
            Arc::new(synthesizer),
            Box::new(CollectorSink::new()),
        )
        .unwrap();

    thread::sleep(Duration::from_millis(300));
    assert!(handle.stop().is_none());
    assert_eq!(translator_c.call_count(), 0);
    assert_eq!(synthesizer_c.call_count(), 0);
}

#[test]
fn recognition_failure_drops_the_pass_but_not_the_session() {
    // Two frames in frame mode: the first recognition fails, the second
    // succeeds, so the session survives a failed pass.
    let recognizer = MockRecognizer::new()
        .with_response("hello")
        .with_failures_then_success(1);
    let recognizer_c = recognizer.clone();

    let handle = Pipeline::new(frames_config())
        .start(
            frames_source(2),
            Arc::new(recognizer),
            Arc::new(MockTranslator::new().with_response("hola")),
            Arc::new(MockSynthesizer::new()),
            Box::new(CollectorSink::new()),
        )
        .unwrap();

    thread::sleep(Duration::from_millis(300));
    let result = handle.stop();

    assert_eq!(recognizer_c.call_count(), 2);
    assert_eq!(result, Some("hola".to_string()));
}

#[test]
fn translation_failure_with_skip_policy_drops_the_pass() {
    let synthesizer = MockSynthesizer::new();
    let synthesizer_c = synthesizer.clone();

    let handle = Pipeline::new(utterance_config())
        .start(
            one_utterance_source(),
            Arc::new(MockRecognizer::new().with_response("hello")),
            Arc::new(MockTranslator::new().with_failure()),
            Arc::new(synthesizer),
            Box::new(CollectorSink::new()),
        )
        .unwrap();

    thread::sleep(Duration::from_millis(300));
    assert!(handle.stop().is_none());
    assert_eq!(synthesizer_c.call_count(), 0);
}

#[test]
fn translation_failure_with_placeholder_policy_keeps_the_pass() {
    let config = PipelineConfig {
        on_translation_error: TranslationFailurePolicy::Placeholder,
        ..utterance_config()
    };

    let handle = Pipeline::new(config)
        .start(
            one_utterance_source(),
            Arc::new(MockRecognizer::new().with_response("hello")),
            Arc::new(MockTranslator::new().with_failure()),
            Arc::new(MockSynthesizer::new()),
            Box::new(CollectorSink::new()),
        )
        .unwrap();

    thread::sleep(Duration::from_millis(300));
    assert_eq!(handle.stop(), Some("Translation Error".to_string()));
}

#[test]
fn synthesis_failure_still_delivers_the_text() {
    let handle = Pipeline::new(utterance_config())
        .start(
            one_utterance_source(),
            Arc::new(MockRecognizer::new().with_response("hello")),
            Arc::new(MockTranslator::new().with_response("hola")),
            Arc::new(MockSynthesizer::new().with_failure()),
            Box::new(CollectorSink::new()),
        )
        .unwrap();

    thread::sleep(Duration::from_millis(300));
    assert_eq!(handle.stop(), Some("hola".to_string()));
}

#[test]
fn every_pass_synthesizes_fresh_audio() {
    // Identical text both passes; no caching, so two synthesis calls.
    let synthesizer = MockSynthesizer::new();
    let synthesizer_c = synthesizer.clone();

    let handle = Pipeline::new(frames_config())
        .start(
            frames_source(2),
            Arc::new(MockRecognizer::new().with_response("hi")),
            Arc::new(MockTranslator::new().with_response("hola")),
            Arc::new(synthesizer),
            Box::new(CollectorSink::new()),
        )
        .unwrap();

    thread::sleep(Duration::from_millis(300));
    let result = handle.stop();

    assert_eq!(synthesizer_c.call_count(), 2);
    assert_eq!(result, Some("hola\nhola".to_string()));
}

#[test]
fn clearing_the_session_flag_stops_new_passes() {
    let recognizer = MockRecognizer::new().with_response("hi");
    let recognizer_c = recognizer.clone();

    // Live source: frames keep coming until the flag is cleared.
    let source = Box::new(
        MockAudioSource::new()
            .with_frame_sequence(vec![FramePhase {
                samples: vec![5000i16; 1600],
                count: 1000,
            }])
            .as_live_source(),
    );

    let handle = Pipeline::new(frames_config())
        .start(
            source,
            Arc::new(recognizer),
            Arc::new(MockTranslator::new().with_response("hola")),
            Arc::new(MockSynthesizer::new()),
            Box::new(CollectorSink::new()),
        )
        .unwrap();

    thread::sleep(Duration::from_millis(200));
    assert!(handle.is_running());
    handle.stop();

    let count_after_stop = recognizer_c.call_count();
    assert!(count_after_stop > 0, "expected at least one pass");

    // No new passes once the flag is down.
    thread::sleep(Duration::from_millis(200));
    assert_eq!(recognizer_c.call_count(), count_after_stop);
}

#[test]
fn push_transport_frames_flow_through_the_pipeline() {
    let (source, frames) = voxlate::audio::push::PushAudioSource::new();
    let recognizer = MockRecognizer::new().with_response("hey");
    let recognizer_c = recognizer.clone();

    let handle = Pipeline::new(frames_config())
        .start(
            Box::new(source),
            Arc::new(recognizer),
            Arc::new(MockTranslator::new().with_response("oye")),
            Arc::new(MockSynthesizer::new()),
            Box::new(CollectorSink::new()),
        )
        .unwrap();

    frames.send(vec![4000i16; 1600]).unwrap();
    frames.send(vec![4000i16; 1600]).unwrap();
    drop(frames);

    thread::sleep(Duration::from_millis(300));
    let result = handle.stop();

    assert_eq!(recognizer_c.call_count(), 2);
    assert_eq!(result, Some("oye\noye".to_string()));
}

#[test]
fn session_assembly_from_config_reaches_the_collector() {
    // Wires a session the way the application does, stubbing only the
    // audio source and the collaborators it would build from config.
    let config = voxlate::Config::default();
    let mut pipeline_config = voxlate::app::pipeline_config(&config, true, 0);
    pipeline_config.capture = CaptureMode::Utterance(ListenerConfig {
        listen_timeout: Duration::from_millis(200),
        silence_duration_ms: 100,
        ..ListenerConfig::default()
    });
    assert_eq!(pipeline_config.source_language, "en");
    assert_eq!(pipeline_config.target_language, "es");

    let handle = Pipeline::new(pipeline_config)
        .start(
            one_utterance_source(),
            Arc::new(MockRecognizer::new().with_response("good night")),
            Arc::new(MockTranslator::new()),
            Arc::new(MockSynthesizer::new()),
            Box::new(CollectorSink::new()),
        )
        .unwrap();

    thread::sleep(Duration::from_millis(300));
    // The default stub translator tags text with the target language.
    assert_eq!(handle.stop(), Some("[es] good night".to_string()));
}

#[test]
fn unrecognized_language_names_reach_the_pipeline_verbatim() {
    // The vocabulary lookup is forgiving: an unknown name is used directly
    // as the code, exactly as typed.
    let mut config = voxlate::Config::default();
    config.languages.source = "KLINGON".to_string();
    config.languages.target = "xx-Whatever".to_string();

    let pipeline_config = voxlate::app::pipeline_config(&config, true, 0);
    assert_eq!(pipeline_config.source_language, "KLINGON");
    assert_eq!(pipeline_config.target_language, "xx-Whatever");
}
