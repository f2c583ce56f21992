//! Audio source abstraction.

use crate::error::{Result, VoxlateError};

/// Trait for audio input devices.
///
/// This trait allows swapping implementations (real microphone, push
/// transport, mock).
pub trait AudioSource: Send {
    /// Start capturing audio from the source.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing audio from the source.
    fn stop(&mut self) -> Result<()>;

    /// Read whatever samples the source has buffered since the last read.
    ///
    /// Returns 16-bit PCM mono samples. An empty vector means no new audio
    /// is available right now; for finite sources it means exhaustion.
    fn read_samples(&mut self) -> Result<Vec<i16>>;

    /// True when an empty read means the source is exhausted (file, test
    /// sequence) rather than momentarily idle (live microphone).
    fn is_finite(&self) -> bool {
        false
    }
}

/// A phase in a mock frame sequence: `count` reads each returning `samples`.
#[derive(Debug, Clone)]
pub struct FramePhase {
    pub samples: Vec<i16>,
    pub count: u32,
}

/// Mock audio source for testing.
#[derive(Debug, Clone)]
pub struct MockAudioSource {
    is_started: bool,
    phases: Vec<FramePhase>,
    phase_index: usize,
    reads_in_phase: u32,
    finite: bool,
    should_fail_start: bool,
    should_fail_read: bool,
    error_message: String,
}

impl MockAudioSource {
    pub fn new() -> Self {
        Self {
            is_started: false,
            phases: vec![FramePhase {
                samples: vec![0i16; 160],
                count: u32::MAX,
            }],
            phase_index: 0,
            reads_in_phase: 0,
            finite: true,
            should_fail_start: false,
            should_fail_read: false,
            error_message: "mock audio error".to_string(),
        }
    }

    /// Replace the default endless silence with an explicit frame sequence.
    /// The source is exhausted once all phases have been read.
    pub fn with_frame_sequence(mut self, phases: Vec<FramePhase>) -> Self {
        self.phases = phases;
        self.phase_index = 0;
        self.reads_in_phase = 0;
        self
    }

    /// Treat empty reads as "not yet", like a live microphone.
    pub fn as_live_source(mut self) -> Self {
        self.finite = false;
        self
    }

    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    pub fn is_started(&self) -> bool {
        self.is_started
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            return Err(VoxlateError::AudioCapture {
                message: self.error_message.clone(),
            });
        }
        self.is_started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.is_started = false;
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.should_fail_read {
            return Err(VoxlateError::AudioCapture {
                message: self.error_message.clone(),
            });
        }
        loop {
            let Some(phase) = self.phases.get(self.phase_index) else {
                return Ok(Vec::new());
            };
            if self.reads_in_phase >= phase.count {
                self.phase_index += 1;
                self.reads_in_phase = 0;
                continue;
            }
            self.reads_in_phase += 1;
            return Ok(phase.samples.clone());
        }
    }

    fn is_finite(&self) -> bool {
        self.finite
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_walks_frame_sequence_then_exhausts() {
        let mut source = MockAudioSource::new().with_frame_sequence(vec![
            FramePhase {
                samples: vec![1i16; 4],
                count: 2,
            },
            FramePhase {
                samples: vec![2i16; 4],
                count: 1,
            },
        ]);

        assert_eq!(source.read_samples().unwrap(), vec![1i16; 4]);
        assert_eq!(source.read_samples().unwrap(), vec![1i16; 4]);
        assert_eq!(source.read_samples().unwrap(), vec![2i16; 4]);
        assert!(source.read_samples().unwrap().is_empty());
        assert!(source.is_finite());
    }

    #[test]
    fn mock_start_stop_tracks_state() {
        let mut source = MockAudioSource::new();
        assert!(!source.is_started());
        source.start().unwrap();
        assert!(source.is_started());
        source.stop().unwrap();
        assert!(!source.is_started());
    }

    #[test]
    fn mock_failures_are_capture_errors() {
        let mut source = MockAudioSource::new()
            .with_start_failure()
            .with_error_message("device unplugged");
        match source.start() {
            Err(VoxlateError::AudioCapture { message }) => {
                assert_eq!(message, "device unplugged");
            }
            other => panic!("Expected AudioCapture error, got {:?}", other.is_ok()),
        }

        let mut source = MockAudioSource::new().with_read_failure();
        assert!(source.read_samples().is_err());
    }

    #[test]
    fn live_mock_is_not_finite() {
        let source = MockAudioSource::new().as_live_source();
        assert!(!source.is_finite());
    }
}
