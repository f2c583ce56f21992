//! HTTP implementations of the three collaborators, talking to the same
//! public Google endpoints the reference clients use: Speech API v2 for
//! recognition, the `gtx` translate surface, and `translate_tts` for
//! synthesis.
//!
//! All calls are blocking with a fixed timeout, which matches the pipeline
//! contract: a pass occupies its station until the collaborator answers or
//! the HTTP timeout fires.

use crate::defaults;
use crate::error::{Result, VoxlateError};
use crate::services::recognizer::Recognizer;
use crate::services::synthesizer::Synthesizer;
use crate::services::translator::Translator;
use std::io::Read;

/// Cap on response bodies (transcripts, translations, MP3 audio).
const MAX_RESPONSE_BYTES: u64 = 8 * 1024 * 1024;

fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(defaults::HTTP_TIMEOUT)
        .build()
}

// ── Recognition ──────────────────────────────────────────────────────────

/// Speech recognition via the Speech API v2 endpoint.
pub struct GoogleRecognizer {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
    sample_rate: u32,
}

impl GoogleRecognizer {
    pub fn new(base_url: &str, api_key: &str, sample_rate: u32) -> Self {
        Self {
            agent: agent(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            sample_rate,
        }
    }
}

impl Recognizer for GoogleRecognizer {
    fn recognize(&self, audio: &[i16], language: &str) -> Result<String> {
        if audio.is_empty() {
            return Err(VoxlateError::NoSpeech);
        }

        let url = format!(
            "{}?client=chromium&lang={}&key={}",
            self.base_url,
            urlencoding::encode(language),
            urlencoding::encode(&self.api_key)
        );

        // Raw little-endian PCM; the endpoint takes L16 directly, no
        // container needed.
        let body: Vec<u8> = audio.iter().flat_map(|s| s.to_le_bytes()).collect();

        let response = self
            .agent
            .post(&url)
            .set(
                "Content-Type",
                &format!("audio/l16; rate={}", self.sample_rate),
            )
            .send_bytes(&body)
            .map_err(|e| VoxlateError::Recognition {
                message: e.to_string(),
            })?;

        let text = response
            .into_string()
            .map_err(|e| VoxlateError::Recognition {
                message: format!("reading response failed: {}", e),
            })?;

        parse_speech_response(&text)
    }

    fn name(&self) -> &'static str {
        "google-speech"
    }
}

/// Parse the Speech API v2 response: one JSON object per line, the first
/// line usually an empty `{"result":[]}` preamble.
fn parse_speech_response(body: &str) -> Result<String> {
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: serde_json::Value =
            serde_json::from_str(line).map_err(|e| VoxlateError::Recognition {
                message: format!("malformed response: {}", e),
            })?;
        let Some(results) = value.get("result").and_then(|r| r.as_array()) else {
            continue;
        };
        if results.is_empty() {
            continue;
        }
        if let Some(transcript) = results[0]
            .get("alternative")
            .and_then(|a| a.as_array())
            .and_then(|a| a.first())
            .and_then(|alt| alt.get("transcript"))
            .and_then(|t| t.as_str())
        {
            let transcript = transcript.trim();
            if !transcript.is_empty() {
                return Ok(transcript.to_string());
            }
        }
    }
    // The service answered but heard nothing.
    Err(VoxlateError::NoSpeech)
}

// ── Translation ──────────────────────────────────────────────────────────

/// Translation via the free `translate_a/single` endpoint.
pub struct GoogleTranslator {
    agent: ureq::Agent,
    base_url: String,
}

impl GoogleTranslator {
    pub fn new(base_url: &str) -> Self {
        Self {
            agent: agent(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Translator for GoogleTranslator {
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let url = format!(
            "{}?client=gtx&sl={}&tl={}&dt=t&q={}",
            self.base_url,
            urlencoding::encode(source),
            urlencoding::encode(target),
            urlencoding::encode(text)
        );

        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| VoxlateError::Translation {
                message: e.to_string(),
            })?;

        let body = response
            .into_string()
            .map_err(|e| VoxlateError::Translation {
                message: format!("reading response failed: {}", e),
            })?;

        parse_translate_response(&body)
    }

    fn name(&self) -> &'static str {
        "google-translate"
    }
}

/// Parse the `gtx` response shape: `[[["Hola","Hello",..], ...], ...]`.
/// The translation is the concatenation of element 0 of each segment in
/// the first array.
fn parse_translate_response(body: &str) -> Result<String> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| VoxlateError::Translation {
            message: format!("malformed response: {}", e),
        })?;

    let segments = value
        .get(0)
        .and_then(|s| s.as_array())
        .ok_or_else(|| VoxlateError::Translation {
            message: "unexpected response shape".to_string(),
        })?;

    let mut translated = String::new();
    for segment in segments {
        if let Some(piece) = segment.get(0).and_then(|p| p.as_str()) {
            translated.push_str(piece);
        }
    }

    if translated.is_empty() {
        return Err(VoxlateError::Translation {
            message: "empty translation".to_string(),
        });
    }
    Ok(translated)
}

// ── Synthesis ────────────────────────────────────────────────────────────

/// Text-to-speech via the `translate_tts` endpoint. Long text is chunked
/// at the endpoint's length cap and the MP3 segments are concatenated.
/// No caching; every call synthesizes from scratch.
pub struct GoogleSynthesizer {
    agent: ureq::Agent,
    base_url: String,
}

impl GoogleSynthesizer {
    pub fn new(base_url: &str) -> Self {
        Self {
            agent: agent(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn fetch_chunk(&self, chunk: &str, language: &str) -> Result<Vec<u8>> {
        let url = format!(
            "{}?ie=UTF-8&client=tw-ob&tl={}&q={}",
            self.base_url,
            urlencoding::encode(language),
            urlencoding::encode(chunk)
        );

        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| VoxlateError::Synthesis {
                message: e.to_string(),
            })?;

        let mut audio = Vec::new();
        response
            .into_reader()
            .take(MAX_RESPONSE_BYTES)
            .read_to_end(&mut audio)
            .map_err(|e| VoxlateError::Synthesis {
                message: format!("reading audio failed: {}", e),
            })?;
        Ok(audio)
    }
}

impl Synthesizer for GoogleSynthesizer {
    fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(VoxlateError::Synthesis {
                message: "nothing to synthesize".to_string(),
            });
        }

        let mut audio = Vec::new();
        for chunk in chunk_text(text, defaults::TTS_MAX_CHARS) {
            // MP3 frames are self-delimiting, so segment concatenation
            // plays back as one stream.
            audio.extend(self.fetch_chunk(&chunk, language)?);
        }
        Ok(audio)
    }

    fn name(&self) -> &'static str {
        "google-tts"
    }
}

/// Split text into whitespace-respecting chunks of at most `max_chars`
/// characters. Words longer than the cap are split mid-word.
fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if word.chars().count() > max_chars {
            // Flush, then hard-split the oversized word.
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
