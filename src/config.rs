//! Configuration loading: TOML file + environment overrides.

use crate::defaults;
use crate::error::{Result, VoxlateError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub languages: LanguagesConfig,
    pub audio: AudioConfig,
    pub services: ServicesConfig,
    pub output: OutputConfig,
}

/// Language pair selection. Values may be display names from the vocabulary
/// ("english") or raw codes ("en"); unknown values pass through as codes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LanguagesConfig {
    pub source: String,
    pub target: String,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    /// Seconds to wait for speech before abandoning a pass.
    pub listen_timeout_secs: u64,
    /// Maximum utterance length in seconds.
    pub phrase_limit_secs: u64,
    pub speech_threshold: f32,
    pub silence_duration_ms: u32,
}

/// External collaborator endpoints. All defaulted; override for proxies or
/// self-hosted gateways.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServicesConfig {
    pub speech_api_url: String,
    pub speech_api_key: String,
    pub translate_api_url: String,
    pub tts_api_url: String,
}

/// Output behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Play synthesized speech on the local audio device.
    pub playback: bool,
    /// What to do when translation fails mid-pass.
    pub on_translation_error: TranslationFailurePolicy,
}

/// Policy for a failed translation step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TranslationFailurePolicy {
    /// Discard the pass (nothing is shown or spoken).
    #[default]
    Skip,
    /// Substitute a fixed placeholder string and continue the pass.
    Placeholder,
}

impl Default for LanguagesConfig {
    fn default() -> Self {
        Self {
            source: defaults::SOURCE_LANGUAGE.to_string(),
            target: defaults::TARGET_LANGUAGE.to_string(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            listen_timeout_secs: defaults::LISTEN_TIMEOUT.as_secs(),
            phrase_limit_secs: defaults::PHRASE_LIMIT.as_secs(),
            speech_threshold: defaults::SPEECH_THRESHOLD,
            silence_duration_ms: defaults::SILENCE_DURATION_MS,
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            speech_api_url: defaults::SPEECH_API_URL.to_string(),
            speech_api_key: defaults::SPEECH_API_KEY.to_string(),
            translate_api_url: defaults::TRANSLATE_API_URL.to_string(),
            tts_api_url: defaults::TTS_API_URL.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            playback: true,
            on_translation_error: TranslationFailurePolicy::Skip,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Missing fields use defaults; invalid TOML is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VoxlateError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                VoxlateError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load from a file, falling back to defaults only when the file is
    /// missing. Invalid TOML still fails.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(VoxlateError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Default config file location: `$XDG_CONFIG_HOME/voxlate/config.toml`.
    #[cfg(feature = "cli")]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("voxlate").join("config.toml"))
    }

    #[cfg(not(feature = "cli"))]
    pub fn default_path() -> Option<PathBuf> {
        None
    }

    /// Apply environment variable overrides.
    ///
    /// Supported:
    /// - VOXLATE_SOURCE_LANGUAGE → languages.source
    /// - VOXLATE_TARGET_LANGUAGE → languages.target
    /// - VOXLATE_AUDIO_DEVICE → audio.device
    /// - VOXLATE_API_KEY → services.speech_api_key
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("VOXLATE_SOURCE_LANGUAGE") {
            if !v.is_empty() {
                self.languages.source = v;
            }
        }
        if let Ok(v) = std::env::var("VOXLATE_TARGET_LANGUAGE") {
            if !v.is_empty() {
                self.languages.target = v;
            }
        }
        if let Ok(v) = std::env::var("VOXLATE_AUDIO_DEVICE") {
            if !v.is_empty() {
                self.audio.device = Some(v);
            }
        }
        if let Ok(v) = std::env::var("VOXLATE_API_KEY") {
            if !v.is_empty() {
                self.services.speech_api_key = v;
            }
        }
        self
    }

    /// Resolved (source, target) language codes.
    pub fn language_pair(&self) -> (String, String) {
        (
            crate::languages::language_code(&self.languages.source),
            crate::languages::language_code(&self.languages.target),
        )
    }
}
