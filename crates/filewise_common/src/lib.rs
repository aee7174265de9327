//! Filewise Common - the file-state core
//!
//! Owns the cached directory snapshot, executes file mutations, routes
//! utterances, and wraps the external collaborators (directory lister,
//! language model, speech services) behind traits with typed errors.

pub mod atomic;
pub mod config;
pub mod enumerator;
pub mod llm_client;
pub mod mutation_executor;
pub mod prompts;
pub mod router;
pub mod snapshot_store;
pub mod speech;
pub mod voice;

pub use config::Config;
pub use enumerator::{CommandEnumerator, Enumerator, NativeEnumerator};
pub use llm_client::{HttpLlmClient, LlmClient, LlmError};
pub use prompts::ConversationTurn;
pub use mutation_executor::MutationExecutor;
pub use router::{IntentRouter, Outcome, OutcomeKind};
pub use snapshot_store::{SnapshotRead, SnapshotStore};
pub use speech::{DeepgramClient, SpeechError, Synthesizer, Transcriber};
pub use voice::{VoicePipeline, VoiceTurn};
