//! Voice pipeline
//!
//! audio → transcript → router → response → sanitized text → audio
//!
//! The voice is chosen per call. A failed or empty transcription ends the
//! turn before the router sees anything. A synthesis failure still returns
//! the text response.

use filewise_shared::speech_text::prepare_for_speech;
use tracing::{debug, warn};

use crate::prompts::ConversationTurn;
use crate::router::{IntentRouter, Outcome};
use crate::speech::{find_voice, SpeechError, Synthesizer, Transcriber};

/// Response when nothing usable was heard
pub const NO_UTTERANCE: &str = "No actionable utterance was heard. Please try again.";

/// Everything produced by one spoken exchange
#[derive(Debug)]
pub struct VoiceTurn {
    /// Empty when transcription failed or heard nothing
    pub transcript: String,
    /// Routed outcome; `None` when there was no actionable utterance
    pub outcome: Option<Outcome>,
    /// Text shown to the user
    pub response: String,
    /// Synthesized reply, when synthesis succeeded
    pub audio: Option<Vec<u8>>,
    /// Why transcription or synthesis failed, if either did
    pub speech_error: Option<SpeechError>,
}

impl VoiceTurn {
    pub fn is_actionable(&self) -> bool {
        self.outcome.is_some()
    }
}

pub struct VoicePipeline {
    transcriber: Box<dyn Transcriber>,
    synthesizer: Box<dyn Synthesizer>,
}

impl VoicePipeline {
    pub fn new(transcriber: Box<dyn Transcriber>, synthesizer: Box<dyn Synthesizer>) -> Self {
        Self {
            transcriber,
            synthesizer,
        }
    }

    /// Sanitize, truncate and synthesize `text`
    pub fn speak(&self, text: &str, voice: &str) -> Result<Vec<u8>, SpeechError> {
        let voice = find_voice(voice).ok_or_else(|| SpeechError::UnknownVoice(voice.to_string()))?;
        let prepared = prepare_for_speech(text);
        if prepared.is_empty() {
            return Err(SpeechError::EmptyText);
        }
        self.synthesizer.synthesize(&prepared, voice.id)
    }

    /// Run one spoken exchange
    ///
    /// Only an unknown voice is an error; it is rejected before any
    /// service is called.
    pub fn run_turn(
        &self,
        router: &mut IntentRouter,
        wav: &[u8],
        voice: &str,
        history: &[ConversationTurn],
    ) -> Result<VoiceTurn, SpeechError> {
        if find_voice(voice).is_none() {
            return Err(SpeechError::UnknownVoice(voice.to_string()));
        }

        let transcript = match self.transcriber.transcribe(wav) {
            Ok(t) => t.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "transcription failed");
                return Ok(Self::no_utterance(String::new(), Some(e)));
            }
        };

        if transcript.is_empty() {
            debug!("empty transcript");
            return Ok(Self::no_utterance(transcript, None));
        }

        let outcome = router.handle(&transcript, history);
        let (audio, speech_error) = match self.speak(&outcome.message, voice) {
            Ok(audio) => (Some(audio), None),
            Err(e) => {
                warn!(error = %e, "speech synthesis failed, returning text only");
                (None, Some(e))
            }
        };

        Ok(VoiceTurn {
            transcript,
            response: outcome.message.clone(),
            outcome: Some(outcome),
            audio,
            speech_error,
        })
    }

    fn no_utterance(transcript: String, error: Option<SpeechError>) -> VoiceTurn {
        VoiceTurn {
            transcript,
            outcome: None,
            response: NO_UTTERANCE.to_string(),
            audio: None,
            speech_error: error,
        }
    }
}
