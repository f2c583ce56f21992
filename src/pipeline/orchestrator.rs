//! Translation pipeline that runs while the session flag is set.

use crate::audio::listener::{ListenerConfig, UtteranceListener};
use crate::audio::recorder::AudioSource;
use crate::config::TranslationFailurePolicy;
use crate::error::Result;
use crate::pipeline::error::{ErrorReporter, LogReporter};
use crate::pipeline::recognize::RecognizeStation;
use crate::pipeline::sink::{SinkStation, SpeechSink};
use crate::pipeline::station::StationRunner;
use crate::pipeline::synthesize::SynthesizeStation;
use crate::pipeline::translate::TranslateStation;
use crate::pipeline::types::CapturedUtterance;
use crate::services::recognizer::Recognizer;
use crate::services::synthesizer::Synthesizer;
use crate::services::translator::Translator;
use crossbeam_channel::bounded;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How the capture thread turns raw audio into passes.
#[derive(Debug, Clone)]
pub enum CaptureMode {
    /// Blocking pull: wait for speech, cut the utterance on trailing
    /// silence or the phrase limit.
    Utterance(ListenerConfig),
    /// Push transport: every frame read from the source becomes its own
    /// pass, recognized independently.
    Frames,
}

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Source language code, e.g. "en".
    pub source_language: String,
    /// Target language code, e.g. "es".
    pub target_language: String,
    pub capture: CaptureMode,
    pub on_translation_error: TranslationFailurePolicy,
    /// Suppress pass rendering on stderr.
    pub quiet: bool,
    /// Extra status lines on stderr (0 = passes only).
    pub verbose: u8,
    /// Channel buffer sizes between stations.
    pub capture_buffer: usize,
    pub recognize_buffer: usize,
    pub translate_buffer: usize,
    pub speak_buffer: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_language: "en".to_string(),
            target_language: "es".to_string(),
            capture: CaptureMode::Utterance(ListenerConfig::default()),
            on_translation_error: TranslationFailurePolicy::default(),
            quiet: false,
            verbose: 0,
            capture_buffer: 16,
            recognize_buffer: 16,
            translate_buffer: 16,
            speak_buffer: 16,
        }
    }
}

/// Handle to a running pipeline. The wrapped flag is the session flag:
/// clearing it stops capture, and in-flight passes drain to the sink.
pub struct PipelineHandle {
    running: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
    result_rx: Option<crossbeam_channel::Receiver<Option<String>>>,
}

impl PipelineHandle {
    /// Stops the pipeline and returns the sink's accumulated result.
    ///
    /// Clears the session flag, waits up to 5s for in-flight passes to
    /// reach the sink, then up to 1s for threads to finish. Threads still
    /// running after the deadline are detached; they die with the process.
    pub fn stop(mut self) -> Option<String> {
        self.running.store(false, Ordering::SeqCst);

        let result = self
            .result_rx
            .as_ref()
            .and_then(|rx| rx.recv_timeout(Duration::from_secs(5)).ok().flatten());

        let deadline = Instant::now() + Duration::from_secs(1);
        let poll_interval = Duration::from_millis(50);

        loop {
            let mut remaining = Vec::new();
            for handle in self.threads.drain(..) {
                if handle.is_finished() {
                    if let Err(panic_info) = handle.join() {
                        let msg = panic_info
                            .downcast_ref::<&str>()
                            .copied()
                            .or_else(|| panic_info.downcast_ref::<String>().map(|s| s.as_str()))
                            .unwrap_or("unknown panic");
                        eprintln!("voxlate: pipeline thread panicked: {msg}");
                    }
                } else {
                    remaining.push(handle);
                }
            }
            self.threads = remaining;

            if self.threads.is_empty() {
                break;
            }

            if Instant::now() >= deadline {
                eprintln!(
                    "voxlate: shutdown timeout, {} thread(s) still running, detaching",
                    self.threads.len()
                );
                break;
            }

            thread::sleep(poll_interval);
        }

        result
    }

    /// Whether the session flag is still set.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Shared session flag, for observers that outlive the handle.
    pub fn session_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}

/// Translation pipeline: capture → recognize → translate → synthesize → sink.
pub struct Pipeline {
    config: PipelineConfig,
    error_reporter: Arc<dyn ErrorReporter>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            error_reporter: Arc::new(LogReporter),
        }
    }

    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = reporter;
        self
    }

    /// Starts the pipeline.
    ///
    /// Spawns one thread per station plus the capture thread, all gated on
    /// the shared session flag. Fails fast if the audio source cannot start.
    pub fn start(
        self,
        mut audio_source: Box<dyn AudioSource>,
        recognizer: Arc<dyn Recognizer>,
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn Synthesizer>,
        sink: Box<dyn SpeechSink>,
    ) -> Result<PipelineHandle> {
        let running = Arc::new(AtomicBool::new(true));
        let sequence = Arc::new(AtomicU64::new(0));

        let (utterance_tx, utterance_rx) = bounded(self.config.capture_buffer);
        let (recognized_tx, recognized_rx) = bounded(self.config.recognize_buffer);
        let (translated_tx, translated_rx) = bounded(self.config.translate_buffer);
        let (spoken_tx, spoken_rx) = bounded(self.config.speak_buffer);
        let (result_tx, result_rx) = bounded(1);

        let recognize_station =
            RecognizeStation::new(recognizer, self.config.source_language.clone());
        let translate_station = TranslateStation::new(
            translator,
            self.config.source_language.clone(),
            self.config.target_language.clone(),
            self.config.on_translation_error,
        );
        let synthesize_station =
            SynthesizeStation::new(synthesizer, self.config.target_language.clone())
                .with_quiet(self.config.quiet);
        let sink_station = SinkStation::new(sink, self.config.quiet, result_tx);

        let recognize_runner = StationRunner::spawn(
            recognize_station,
            utterance_rx,
            recognized_tx,
            self.error_reporter.clone(),
        );
        let translate_runner = StationRunner::spawn(
            translate_station,
            recognized_rx,
            translated_tx,
            self.error_reporter.clone(),
        );
        let synthesize_runner = StationRunner::spawn(
            synthesize_station,
            translated_rx,
            spoken_tx,
            self.error_reporter.clone(),
        );

        // Terminal station still needs an output channel; a drain thread
        // consumes the unit outputs.
        let (sink_out_tx, sink_out_rx) = bounded::<()>(self.config.speak_buffer);
        let sink_runner = StationRunner::spawn(
            sink_station,
            spoken_rx,
            sink_out_tx,
            self.error_reporter.clone(),
        );

        let drain_running = running.clone();
        let drain_handle = thread::spawn(move || {
            while drain_running.load(Ordering::SeqCst) {
                if sink_out_rx.recv_timeout(Duration::from_millis(100)).is_err()
                    && !drain_running.load(Ordering::SeqCst)
                {
                    break;
                }
            }
        });

        audio_source.start()?;

        let verbose = self.config.verbose;
        let capture_running = running.clone();
        let capture_mode = self.config.capture.clone();
        let capture_handle = thread::spawn(move || {
            match capture_mode {
                CaptureMode::Utterance(listener_config) => {
                    let listener = UtteranceListener::new(listener_config);
                    while capture_running.load(Ordering::SeqCst) {
                        match listener.listen(audio_source.as_mut(), &capture_running) {
                            Ok(samples) if !samples.is_empty() => {
                                let utterance = CapturedUtterance::new(
                                    samples,
                                    sequence.fetch_add(1, Ordering::Relaxed),
                                );
                                if utterance_tx.send(utterance).is_err() {
                                    break;
                                }
                            }
                            Ok(_) => {}
                            Err(e) if e.is_no_speech() => {
                                // Finite sources are exhausted once they go
                                // quiet; live ones just start another wait.
                                if audio_source.is_finite() {
                                    break;
                                }
                                if verbose > 0 {
                                    eprintln!("voxlate: no speech, still listening");
                                }
                            }
                            Err(e) => {
                                eprintln!("voxlate: audio capture failed: {e}");
                                eprintln!("voxlate: check your microphone and try again");
                                break;
                            }
                        }
                    }
                }
                CaptureMode::Frames => {
                    let poll_interval = Duration::from_millis(16);
                    let mut consecutive_errors: u32 = 0;
                    const MAX_CONSECUTIVE_ERRORS: u32 = 10;

                    while capture_running.load(Ordering::SeqCst) {
                        let samples = match audio_source.read_samples() {
                            Ok(s) => {
                                consecutive_errors = 0;
                                s
                            }
                            Err(e) => {
                                consecutive_errors += 1;
                                if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                                    eprintln!(
                                        "voxlate: audio capture failed {consecutive_errors} times in a row: {e}"
                                    );
                                    break;
                                }
                                thread::sleep(poll_interval);
                                continue;
                            }
                        };

                        if samples.is_empty() {
                            if audio_source.is_finite() {
                                break;
                            }
                            thread::sleep(poll_interval);
                            continue;
                        }

                        let utterance = CapturedUtterance::new(
                            samples,
                            sequence.fetch_add(1, Ordering::Relaxed),
                        );
                        // Frame mode favors freshness: drop when full.
                        if utterance_tx.try_send(utterance).is_err()
                            && !capture_running.load(Ordering::SeqCst)
                        {
                            break;
                        }

                        thread::sleep(poll_interval);
                    }
                }
            }

            if let Err(e) = audio_source.stop() {
                eprintln!("voxlate: failed to stop audio capture: {e}");
            }
        });

        let mut threads = vec![capture_handle, drain_handle];
        for runner in [
            recognize_runner,
            translate_runner,
            synthesize_runner,
            sink_runner,
        ] {
            threads.push(thread::spawn(move || {
                if let Err(msg) = runner.join() {
                    eprintln!("voxlate: {msg}");
                }
            }));
        }

        Ok(PipelineHandle {
            running,
            threads,
            result_rx: Some(result_rx),
        })
    }
}
