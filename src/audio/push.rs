//! Push-style audio source fed by an external real-time transport.
//!
//! The transport (browser bridge, RTP relay, whatever) owns the capture
//! and delivers fixed-size frames through a [`FrameSender`]. Frames are
//! handed off first-in-first-out through a bounded channel; segmentation
//! is whatever the transport delivered: one frame in, one recognition
//! attempt out.

use crate::audio::recorder::AudioSource;
use crate::error::{Result, VoxlateError};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};

/// Default frame buffer depth. Frames beyond this are dropped by the
/// transport side rather than queued without bound.
const DEFAULT_CAPACITY: usize = 64;

/// Handle given to the transport for delivering frames.
///
/// Clone freely; all clones feed the same source.
#[derive(Clone)]
pub struct FrameSender {
    tx: Sender<Vec<i16>>,
}

impl FrameSender {
    /// Deliver one frame of 16-bit PCM mono samples.
    ///
    /// Returns `Transport` errors when the source side is gone or the
    /// buffer is full (the frame is dropped, matching the no-backpressure
    /// contract of the transport).
    pub fn send(&self, frame: Vec<i16>) -> Result<()> {
        self.tx
            .try_send(frame)
            .map_err(|e| VoxlateError::Transport {
                message: match e {
                    crossbeam_channel::TrySendError::Full(_) => "frame buffer full".to_string(),
                    crossbeam_channel::TrySendError::Disconnected(_) => {
                        "source closed".to_string()
                    }
                },
            })
    }
}

/// [`AudioSource`] backed by transport-delivered frames.
pub struct PushAudioSource {
    rx: Receiver<Vec<i16>>,
    started: bool,
    disconnected: bool,
}

impl PushAudioSource {
    /// Create the source and its transport-facing sender.
    pub fn new() -> (Self, FrameSender) {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> (Self, FrameSender) {
        let (tx, rx) = bounded(capacity);
        (
            Self {
                rx,
                started: false,
                disconnected: false,
            },
            FrameSender { tx },
        )
    }
}

impl AudioSource for PushAudioSource {
    fn start(&mut self) -> Result<()> {
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.started = false;
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if !self.started {
            return Ok(Vec::new());
        }
        match self.rx.try_recv() {
            Ok(frame) => Ok(frame),
            Err(TryRecvError::Empty) => Ok(Vec::new()),
            Err(TryRecvError::Disconnected) => {
                self.disconnected = true;
                Ok(Vec::new())
            }
        }
    }

    fn is_finite(&self) -> bool {
        // Exhausted only once every sender is dropped.
        self.disconnected
    }
}
