//! Utterance assembly from a raw audio source.
//!
//! Implements the blocking-pull capture contract: wait up to a fixed
//! timeout for speech to start, then collect samples until trailing
//! silence or the phrase limit ends the utterance. Yields `NoSpeech`
//! when nothing is heard in time, which quietly ends the pass.

use crate::audio::recorder::AudioSource;
use crate::defaults;
use crate::error::{Result, VoxlateError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Frame size used for energy measurement (10 ms at 16 kHz).
const ENERGY_FRAME: usize = 160;

/// Poll interval while a live source has no new samples.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Listener tuning knobs.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    pub sample_rate: u32,
    /// How long to wait for speech to start.
    pub listen_timeout: Duration,
    /// Maximum utterance length once speech has started.
    pub phrase_limit: Duration,
    /// RMS level above which a frame counts as speech.
    pub speech_threshold: f32,
    /// Trailing silence that ends the utterance.
    pub silence_duration_ms: u32,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            listen_timeout: defaults::LISTEN_TIMEOUT,
            phrase_limit: defaults::PHRASE_LIMIT,
            speech_threshold: defaults::SPEECH_THRESHOLD,
            silence_duration_ms: defaults::SILENCE_DURATION_MS,
        }
    }
}

/// Assembles bounded utterances from an [`AudioSource`].
pub struct UtteranceListener {
    config: ListenerConfig,
}

impl UtteranceListener {
    pub fn new(config: ListenerConfig) -> Self {
        Self { config }
    }

    /// Capture one utterance.
    ///
    /// Blocks until speech followed by silence has been collected, the
    /// phrase limit is hit, the listen timeout expires (`NoSpeech`), or
    /// `running` is cleared (`NoSpeech`, so the caller's pass just ends).
    ///
    /// The wait timeout is wall-clock; the phrase limit and silence tail
    /// are measured in audio time (sample counts), which keeps behavior
    /// deterministic for finite sources. A wall-clock backstop of the
    /// phrase limit plus the silence window also starts once speech is
    /// detected, so a live source that stalls mid-utterance cannot hold
    /// the pass open forever.
    pub fn listen(
        &self,
        source: &mut dyn AudioSource,
        running: &AtomicBool,
    ) -> Result<Vec<i16>> {
        let rate = self.config.sample_rate as usize;
        let phrase_limit_samples = self.config.phrase_limit.as_millis() as usize * rate / 1000;
        let silence_limit_samples = self.config.silence_duration_ms as usize * rate / 1000;
        let backstop =
            self.config.phrase_limit + Duration::from_millis(self.config.silence_duration_ms as u64);

        let mut utterance: Vec<i16> = Vec::new();
        let mut in_speech = false;
        let mut trailing_silence: usize = 0;
        let mut speech_deadline: Option<Instant> = None;
        let wait_deadline = Instant::now() + self.config.listen_timeout;

        loop {
            if !running.load(Ordering::SeqCst) {
                return Err(VoxlateError::NoSpeech);
            }

            let samples = source.read_samples()?;

            if samples.is_empty() {
                if source.is_finite() {
                    // Source exhausted: return what we have, if anything.
                    return if in_speech {
                        Ok(utterance)
                    } else {
                        Err(VoxlateError::NoSpeech)
                    };
                }
                match speech_deadline {
                    Some(deadline) if Instant::now() >= deadline => return Ok(utterance),
                    Some(_) => {}
                    None => {
                        if Instant::now() >= wait_deadline {
                            return Err(VoxlateError::NoSpeech);
                        }
                    }
                }
                std::thread::sleep(POLL_INTERVAL);
                continue;
            }

            for frame in samples.chunks(ENERGY_FRAME) {
                let level = rms_level(frame);

                if level >= self.config.speech_threshold {
                    if !in_speech {
                        speech_deadline = Some(Instant::now() + backstop);
                    }
                    in_speech = true;
                    trailing_silence = 0;
                    utterance.extend_from_slice(frame);
                } else if in_speech {
                    utterance.extend_from_slice(frame);
                    trailing_silence += frame.len();
                    if trailing_silence >= silence_limit_samples {
                        return Ok(utterance);
                    }
                }
                // Pre-speech silence is discarded.

                if in_speech && utterance.len() >= phrase_limit_samples {
                    utterance.truncate(phrase_limit_samples);
                    return Ok(utterance);
                }
            }

            if !in_speech && Instant::now() >= wait_deadline {
                return Err(VoxlateError::NoSpeech);
            }
        }
    }
}

/// RMS level of a frame, normalized so i16 full scale is 1.0.
fn rms_level(frame: &[i16]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = frame.iter().map(|&s| (s as f64) * (s as f64)).sum();
    ((sum_sq / frame.len() as f64).sqrt() / i16::MAX as f64) as f32
}
