//! Spoken-translation playback through the default output device.

use crate::audio::with_suppressed_stderr;
use crate::error::{Result, VoxlateError};
use crate::pipeline::sink::SpeechSink;
use crate::pipeline::types::SpokenUtterance;
use rodio::{Decoder, OutputStream, Sink};
use std::io::Cursor;

/// Plays each pass's MP3 audio on the default output device, blocking
/// until playback finishes so passes never talk over each other.
#[derive(Default)]
pub struct PlaybackSink;

impl PlaybackSink {
    pub fn new() -> Self {
        Self
    }
}

/// Decode and play one MP3 buffer to completion.
///
/// The output stream is opened per call because rodio's stream handle is
/// not `Send` and the sink lives on a pipeline thread.
pub fn play_mp3(audio: Vec<u8>) -> Result<()> {
    // ALSA chatter on stream open, same as capture.
    let (_stream, handle) =
        with_suppressed_stderr(OutputStream::try_default).map_err(|e| VoxlateError::Playback {
            message: format!("no output device: {}", e),
        })?;

    let sink = Sink::try_new(&handle).map_err(|e| VoxlateError::Playback {
        message: e.to_string(),
    })?;

    let source = Decoder::new(Cursor::new(audio)).map_err(|e| VoxlateError::Playback {
        message: format!("decode failed: {}", e),
    })?;

    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}

impl SpeechSink for PlaybackSink {
    fn handle(&mut self, utterance: &SpokenUtterance) -> Result<()> {
        match &utterance.audio {
            Some(audio) => play_mp3(audio.clone()),
            // Synthesis failed upstream; the texts were already rendered.
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "playback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_audio_is_not_an_error() {
        let mut sink = PlaybackSink::new();
        let utterance = SpokenUtterance {
            original: "hi".to_string(),
            translated: "hola".to_string(),
            audio: None,
            sequence: 0,
        };
        assert!(sink.handle(&utterance).is_ok());
    }

    #[test]
    fn garbage_audio_is_a_playback_error() {
        // Requires an output device; skip silently where none exists (CI).
        if OutputStream::try_default().is_err() {
            return;
        }
        let result = play_mp3(vec![0, 1, 2, 3]);
        assert!(matches!(result, Err(VoxlateError::Playback { .. })));
    }
}
