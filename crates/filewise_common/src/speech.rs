//! Speech collaborators
//!
//! Transcription (WAV bytes in, transcript out) and synthesis (text plus a
//! voice model in, WAV bytes out). [`DeepgramClient`] implements both over
//! the Deepgram REST API; [`FakeSpeech`] scripts them for tests.

use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::SpeechSettings;

#[derive(Error, Debug, Clone)]
pub enum SpeechError {
    #[error("speech services are disabled in configuration")]
    Disabled,

    #[error("no API key in ${0}")]
    MissingApiKey(String),

    #[error("unknown voice model '{0}'")]
    UnknownVoice(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    #[error("no audio to process")]
    EmptyAudio,

    #[error("nothing to synthesize")]
    EmptyText,
}

/// One selectable synthesis voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceModel {
    pub id: &'static str,
    pub label: &'static str,
}

pub const DEFAULT_VOICE: &str = "aura-asteria-en";

/// Voices offered for spoken replies
pub const VOICES: &[VoiceModel] = &[
    VoiceModel {
        id: "aura-asteria-en",
        label: "Asteria (Female, American)",
    },
    VoiceModel {
        id: "aura-luna-en",
        label: "Luna (Female, American)",
    },
    VoiceModel {
        id: "aura-stella-en",
        label: "Stella (Female, American)",
    },
    VoiceModel {
        id: "aura-athena-en",
        label: "Athena (Female, British)",
    },
    VoiceModel {
        id: "aura-hera-en",
        label: "Hera (Female, American)",
    },
    VoiceModel {
        id: "aura-orion-en",
        label: "Orion (Male, American)",
    },
    VoiceModel {
        id: "aura-arcas-en",
        label: "Arcas (Male, American)",
    },
    VoiceModel {
        id: "aura-perseus-en",
        label: "Perseus (Male, American)",
    },
    VoiceModel {
        id: "aura-angus-en",
        label: "Angus (Male, Irish)",
    },
    VoiceModel {
        id: "aura-orpheus-en",
        label: "Orpheus (Male, American)",
    },
    VoiceModel {
        id: "aura-helios-en",
        label: "Helios (Male, British)",
    },
    VoiceModel {
        id: "aura-zeus-en",
        label: "Zeus (Male, American)",
    },
];

/// Look a voice up by id, ignoring case
pub fn find_voice(selector: &str) -> Option<&'static VoiceModel> {
    let selector = selector.trim();
    VOICES.iter().find(|v| v.id.eq_ignore_ascii_case(selector))
}

/// Speech-to-text collaborator
pub trait Transcriber: Send + Sync {
    /// Transcribe a mono 16 kHz 16-bit PCM WAV recording
    fn transcribe(&self, wav: &[u8]) -> Result<String, SpeechError>;
}

/// Text-to-speech collaborator
pub trait Synthesizer: Send + Sync {
    /// Synthesize already-sanitized text with a voice from [`VOICES`]
    fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SpeechError>;
}

impl<T: Transcriber + ?Sized> Transcriber for std::sync::Arc<T> {
    fn transcribe(&self, wav: &[u8]) -> Result<String, SpeechError> {
        (**self).transcribe(wav)
    }
}

impl<S: Synthesizer + ?Sized> Synthesizer for std::sync::Arc<S> {
    fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SpeechError> {
        (**self).synthesize(text, voice)
    }
}

// =============================================================================
// Deepgram REST client
// =============================================================================

pub struct DeepgramClient {
    settings: SpeechSettings,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

impl DeepgramClient {
    pub fn new(settings: SpeechSettings) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            api_key: settings.api_key(),
            settings,
            client,
        })
    }

    fn endpoint(&self) -> &str {
        self.settings.endpoint.trim_end_matches('/')
    }

    fn key(&self) -> Result<&str, SpeechError> {
        if !self.settings.enabled {
            return Err(SpeechError::Disabled);
        }
        self.api_key
            .as_deref()
            .ok_or_else(|| SpeechError::MissingApiKey(self.settings.api_key_env.clone()))
    }

    fn send_error(&self, e: reqwest::Error) -> SpeechError {
        if e.is_timeout() {
            SpeechError::Timeout(self.settings.timeout_secs)
        } else {
            SpeechError::Http(format!("Request failed: {}", e))
        }
    }
}

impl Transcriber for DeepgramClient {
    fn transcribe(&self, wav: &[u8]) -> Result<String, SpeechError> {
        let key = self.key()?;
        if wav.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }

        let url = format!("{}/v1/listen", self.endpoint());
        debug!(bytes = wav.len(), model = %self.settings.stt_model, "transcribing audio");

        let response = self
            .client
            .post(&url)
            .query(&[
                ("model", self.settings.stt_model.as_str()),
                ("smart_format", "true"),
                ("punctuate", "true"),
                ("language", self.settings.language.as_str()),
            ])
            .header("Authorization", format!("Token {}", key))
            .header("Content-Type", "audio/wav")
            .body(wav.to_vec())
            .send()
            .map_err(|e| self.send_error(e))?;

        if !response.status().is_success() {
            return Err(SpeechError::Http(format!(
                "HTTP {} from transcription service",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .map_err(|e| SpeechError::InvalidResponse(e.to_string()))?;

        extract_transcript(&body)
    }
}

impl Synthesizer for DeepgramClient {
    fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SpeechError> {
        let voice = find_voice(voice).ok_or_else(|| SpeechError::UnknownVoice(voice.to_string()))?;
        let key = self.key()?;

        let url = format!("{}/v1/speak", self.endpoint());
        debug!(chars = text.chars().count(), voice = voice.id, "synthesizing speech");

        let response = self
            .client
            .post(&url)
            .query(&[
                ("model", voice.id),
                ("encoding", "linear16"),
                ("container", "wav"),
            ])
            .header("Authorization", format!("Token {}", key))
            .json(&serde_json::json!({ "text": text }))
            .send()
            .map_err(|e| self.send_error(e))?;

        if !response.status().is_success() {
            return Err(SpeechError::Http(format!(
                "HTTP {} from synthesis service",
                response.status()
            )));
        }

        let audio = response
            .bytes()
            .map_err(|e| SpeechError::InvalidResponse(e.to_string()))?;
        if audio.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }
        Ok(audio.to_vec())
    }
}

/// `results.channels[0].alternatives[0].transcript`, trimmed
///
/// A response without a transcript is an empty transcript, not an error.
fn extract_transcript(body: &serde_json::Value) -> Result<String, SpeechError> {
    let results = body
        .get("results")
        .ok_or_else(|| SpeechError::InvalidResponse("missing results".to_string()))?;

    Ok(results
        .get("channels")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("alternatives"))
        .and_then(|a| a.get(0))
        .and_then(|a| a.get("transcript"))
        .and_then(|t| t.as_str())
        .unwrap_or("")
        .trim()
        .to_string())
}

// =============================================================================
// Scripted speech for tests
// =============================================================================

/// Scripted transcriber and synthesizer that records what it was given
pub struct FakeSpeech {
    transcript: Result<String, SpeechError>,
    synthesized: Mutex<Vec<(String, String)>>,
    fail_synthesis: bool,
}

impl FakeSpeech {
    pub fn hearing(transcript: &str) -> Self {
        Self {
            transcript: Ok(transcript.to_string()),
            synthesized: Mutex::new(Vec::new()),
            fail_synthesis: false,
        }
    }

    pub fn deaf(error: SpeechError) -> Self {
        Self {
            transcript: Err(error),
            synthesized: Mutex::new(Vec::new()),
            fail_synthesis: false,
        }
    }

    pub fn mute(mut self) -> Self {
        self.fail_synthesis = true;
        self
    }

    /// `(text, voice)` pairs passed to [`Synthesizer::synthesize`]
    pub fn synthesized(&self) -> Vec<(String, String)> {
        self.synthesized.lock().unwrap().clone()
    }
}

impl Transcriber for FakeSpeech {
    fn transcribe(&self, _wav: &[u8]) -> Result<String, SpeechError> {
        self.transcript.clone()
    }
}

impl Synthesizer for FakeSpeech {
    fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, SpeechError> {
        self.synthesized
            .lock()
            .unwrap()
            .push((text.to_string(), voice.to_string()));
        if self.fail_synthesis {
            return Err(SpeechError::Http("HTTP 503 from synthesis service".to_string()));
        }
        Ok(b"RIFF".to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_catalog() {
        assert_eq!(VOICES.len(), 12);
        assert_eq!(VOICES[0].id, DEFAULT_VOICE);
        assert_eq!(find_voice("AURA-ZEUS-EN").map(|v| v.label), Some("Zeus (Male, American)"));
        assert!(find_voice("aura-nobody-en").is_none());
    }

    #[test]
    fn test_extract_transcript() {
        let body = serde_json::json!({
            "metadata": {},
            "results": {"channels": [{"alternatives": [
                {"transcript": " Delete old_file.txt ", "confidence": 0.98}
            ]}]}
        });
        assert_eq!(extract_transcript(&body).unwrap(), "Delete old_file.txt");

        let silent = serde_json::json!({"results": {"channels": [{"alternatives": []}]}});
        assert_eq!(extract_transcript(&silent).unwrap(), "");

        assert!(extract_transcript(&serde_json::json!({"err_code": "x"})).is_err());
    }

    #[test]
    fn test_unknown_voice_rejected_before_request() {
        let settings = SpeechSettings {
            api_key_env: "FILEWISE_TEST_SPEECH_KEY_UNSET".to_string(),
            ..Default::default()
        };
        let client = DeepgramClient::new(settings).unwrap();
        assert!(matches!(
            client.synthesize("hello", "robot"),
            Err(SpeechError::UnknownVoice(_))
        ));
        assert!(matches!(
            client.synthesize("hello", DEFAULT_VOICE),
            Err(SpeechError::MissingApiKey(_))
        ));
    }

    #[test]
    fn test_disabled_speech() {
        let settings = SpeechSettings {
            enabled: false,
            ..Default::default()
        };
        let client = DeepgramClient::new(settings).unwrap();
        assert!(matches!(client.transcribe(b"RIFF"), Err(SpeechError::Disabled)));
    }
}
