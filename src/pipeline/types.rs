//! Pass artifacts flowing between pipeline stations.

use std::time::Instant;

/// One utterance captured from the microphone, ready for recognition.
#[derive(Debug, Clone)]
pub struct CapturedUtterance {
    /// 16-bit PCM mono samples.
    pub samples: Vec<i16>,
    /// Sequence number for ordering.
    pub sequence: u64,
    /// When capture of this utterance finished.
    pub captured_at: Instant,
}

impl CapturedUtterance {
    pub fn new(samples: Vec<i16>, sequence: u64) -> Self {
        Self {
            samples,
            sequence,
            captured_at: Instant::now(),
        }
    }
}

/// Transcript of one utterance in the source language.
#[derive(Debug, Clone)]
pub struct RecognizedUtterance {
    pub text: String,
    pub sequence: u64,
    pub captured_at: Instant,
}

/// An utterance with its translation attached.
#[derive(Debug, Clone)]
pub struct TranslatedUtterance {
    /// Transcript in the source language.
    pub original: String,
    /// Text in the target language.
    pub translated: String,
    pub sequence: u64,
    pub captured_at: Instant,
}

/// Final pass artifact: texts plus synthesized speech.
///
/// `audio` is `None` when synthesis failed; the texts still reach the sink
/// so the pass is shown even without playback.
#[derive(Debug, Clone)]
pub struct SpokenUtterance {
    pub original: String,
    pub translated: String,
    /// MP3 bytes, absent when synthesis failed.
    pub audio: Option<Vec<u8>>,
    pub sequence: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captured_utterance_records_time_and_sequence() {
        let utterance = CapturedUtterance::new(vec![1, 2, 3], 7);
        assert_eq!(utterance.samples, vec![1, 2, 3]);
        assert_eq!(utterance.sequence, 7);
        assert!(utterance.captured_at <= Instant::now());
    }
}
