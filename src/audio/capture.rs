//! Microphone capture using CPAL.

use crate::audio::recorder::AudioSource;
use crate::audio::with_suppressed_stderr;
use crate::defaults;
use crate::error::{Result, VoxlateError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

/// Quiet down JACK/ALSA/PipeWire during backend probing.
///
/// Call at startup before spawning threads.
pub fn suppress_audio_warnings() {
    std::env::set_var("JACK_NO_START_SERVER", "1");
    std::env::set_var("ALSA_DEBUG", "0");
    std::env::set_var("PW_LOG", "0");
}

/// Preferred device names for desktop audio servers.
const PREFERRED_DEVICES: &[&str] = &["pipewire", "pulse"];

/// Device name patterns that are never useful for voice input.
const FILTERED_PATTERNS: &[&str] = &["surround", "front:", "rear:", "HDMI", "S/PDIF"];

fn should_filter_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    FILTERED_PATTERNS
        .iter()
        .any(|p| lower.contains(&p.to_lowercase()))
}

fn is_preferred_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREFERRED_DEVICES.iter().any(|p| lower.contains(p))
}

/// List usable input devices, preferred ones marked `[recommended]`.
pub fn list_devices() -> Result<Vec<String>> {
    let devices = with_suppressed_stderr(|| cpal::default_host().input_devices());
    let devices = devices.map_err(|e| VoxlateError::AudioCapture {
        message: format!("Failed to enumerate input devices: {}", e),
    })?;

    let mut names = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            if should_filter_device(&name) {
                continue;
            }
            if is_preferred_device(&name) {
                names.push(format!("{} [recommended]", name));
            } else {
                names.push(name);
            }
        }
    }
    Ok(names)
}

/// Best default input device: PipeWire/PulseAudio first, then system default.
fn get_best_default_device() -> Result<cpal::Device> {
    with_suppressed_stderr(|| {
        let host = cpal::default_host();

        if let Ok(devices) = host.input_devices() {
            for device in devices {
                if let Ok(name) = device.name() {
                    if is_preferred_device(&name) {
                        return Ok(device);
                    }
                }
            }
        }

        host.default_input_device()
            .ok_or_else(|| VoxlateError::AudioDeviceNotFound {
                device: "default".to_string(),
            })
    })
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: the stream is only touched through the Mutex in CpalAudioSource,
/// one thread at a time.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Microphone capture at 16 kHz mono i16, the format the speech API expects.
///
/// Tries i16/16kHz/mono first, then f32/16kHz/mono, then the device's native
/// config with software channel mixing and resampling.
pub struct CpalAudioSource {
    device: cpal::Device,
    stream: Arc<Mutex<Option<SendableStream>>>,
    buffer: Arc<Mutex<Vec<i16>>>,
    sample_rate: u32,
}

impl CpalAudioSource {
    /// Open a source on the named device, or the best default when `None`.
    pub fn new(device_name: Option<&str>) -> Result<Self> {
        let device = with_suppressed_stderr(|| match device_name {
            Some(name) => {
                let devices =
                    cpal::default_host()
                        .input_devices()
                        .map_err(|e| VoxlateError::AudioCapture {
                            message: format!("Failed to enumerate devices: {}", e),
                        })?;
                for dev in devices {
                    if dev.name().as_deref() == Ok(name) {
                        return Ok(dev);
                    }
                }
                Err(VoxlateError::AudioDeviceNotFound {
                    device: name.to_string(),
                })
            }
            None => get_best_default_device(),
        })?;

        Ok(Self {
            device,
            stream: Arc::new(Mutex::new(None)),
            buffer: Arc::new(Mutex::new(Vec::new())),
            sample_rate: defaults::SAMPLE_RATE,
        })
    }

    fn build_stream(&self) -> Result<cpal::Stream> {
        let preferred = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_callback = |err| {
            eprintln!("voxlate: audio stream error: {}", err);
        };

        // i16/16kHz/mono, PipeWire/PulseAudio convert transparently
        let buffer = Arc::clone(&self.buffer);
        if let Ok(stream) = self.device.build_input_stream(
            &preferred,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend_from_slice(data);
                }
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        // f32/16kHz/mono, for devices that only expose float formats
        let buffer = Arc::clone(&self.buffer);
        if let Ok(stream) = self.device.build_input_stream(
            &preferred,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend(data.iter().map(|&s| f32_to_i16(s)));
                }
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        self.build_stream_native()
    }

    /// Capture at the device's native config, converting in software. Some
    /// PipeWire-ALSA setups accept non-native configs but never deliver data.
    fn build_stream_native(&self) -> Result<cpal::Stream> {
        use cpal::SampleFormat;

        let default_config =
            self.device
                .default_input_config()
                .map_err(|e| VoxlateError::AudioCapture {
                    message: format!("Failed to query default input config: {}", e),
                })?;

        let native_rate = default_config.sample_rate().0;
        let native_channels = default_config.channels() as usize;
        let target_rate = self.sample_rate;
        let stream_config: cpal::StreamConfig = default_config.clone().into();

        let err_callback = |err| {
            eprintln!("voxlate: audio stream error: {}", err);
        };

        let buffer = Arc::clone(&self.buffer);
        match default_config.sample_format() {
            SampleFormat::I16 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        let converted =
                            to_mono_resampled(data, native_channels, native_rate, target_rate);
                        if let Ok(mut buf) = buffer.lock() {
                            buf.extend_from_slice(&converted);
                        }
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| VoxlateError::AudioCapture {
                    message: format!("Failed to build native i16 stream: {}", e),
                }),
            SampleFormat::F32 => self
                .device
                .build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        let i16_data: Vec<i16> = data.iter().map(|&s| f32_to_i16(s)).collect();
                        let converted =
                            to_mono_resampled(&i16_data, native_channels, native_rate, target_rate);
                        if let Ok(mut buf) = buffer.lock() {
                            buf.extend_from_slice(&converted);
                        }
                    },
                    err_callback,
                    None,
                )
                .map_err(|e| VoxlateError::AudioCapture {
                    message: format!("Failed to build native f32 stream: {}", e),
                }),
            fmt => Err(VoxlateError::AudioCapture {
                message: format!("Unsupported native sample format: {:?}", fmt),
            }),
        }
    }
}

fn f32_to_i16(s: f32) -> i16 {
    (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Mix interleaved channels to mono and resample with nearest-neighbor
/// selection. Good enough for speech; the recognizer is tolerant.
fn to_mono_resampled(data: &[i16], channels: usize, from_rate: u32, to_rate: u32) -> Vec<i16> {
    let mono: Vec<i16> = if channels <= 1 {
        data.to_vec()
    } else {
        data.chunks_exact(channels)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect()
    };

    if from_rate == to_rate || mono.is_empty() {
        return mono;
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = (mono.len() as f64 / ratio) as usize;
    (0..out_len)
        .map(|i| {
            let src = ((i as f64 * ratio) as usize).min(mono.len() - 1);
            mono[src]
        })
        .collect()
}

impl AudioSource for CpalAudioSource {
    fn start(&mut self) -> Result<()> {
        let stream = self.build_stream()?;
        stream.play().map_err(|e| VoxlateError::AudioCapture {
            message: format!("Failed to start audio stream: {}", e),
        })?;
        if let Ok(mut guard) = self.stream.lock() {
            *guard = Some(SendableStream(stream));
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Ok(mut guard) = self.stream.lock() {
            *guard = None; // dropping the stream stops capture
        }
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        let mut buf = self.buffer.lock().map_err(|_| VoxlateError::AudioCapture {
            message: "audio buffer lock poisoned".to_string(),
        })?;
        Ok(std::mem::take(&mut *buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_mixes_to_mono() {
        let data = vec![100i16, 300, -100, -300];
        let mono = to_mono_resampled(&data, 2, 16000, 16000);
        assert_eq!(mono, vec![200, -200]);
    }

    #[test]
    fn downsample_halves_length() {
        let data: Vec<i16> = (0..100).collect();
        let out = to_mono_resampled(&data, 1, 32000, 16000);
        assert_eq!(out.len(), 50);
        assert_eq!(out[0], 0);
        assert_eq!(out[1], 2);
    }

    #[test]
    fn same_rate_is_passthrough() {
        let data = vec![1i16, 2, 3];
        assert_eq!(to_mono_resampled(&data, 1, 16000, 16000), data);
    }

    #[test]
    fn f32_conversion_clamps() {
        assert_eq!(f32_to_i16(2.0), i16::MAX);
        assert_eq!(f32_to_i16(-2.0), -i16::MAX);
        assert_eq!(f32_to_i16(0.0), 0);
    }

    #[test]
    fn filter_rejects_hdmi_and_surround() {
        assert!(should_filter_device("HDMI Output"));
        assert!(should_filter_device("surround51:CARD=1"));
        assert!(!should_filter_device("pipewire"));
    }

    #[test]
    fn preferred_matches_pipewire_and_pulse() {
        assert!(is_preferred_device("pipewire"));
        assert!(is_preferred_device("PulseAudio Sound Server"));
        assert!(!is_preferred_device("hw:CARD=Generic"));
    }
}
