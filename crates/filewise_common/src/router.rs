//! Intent Router - utterance to outcome
//!
//! Classifies each utterance, runs create/delete through the mutation
//! executor and hands everything else to the language model together with
//! the current snapshot. Mutation, lookup and enumeration failures stop
//! here: every path ends in an [`Outcome`] with a message for the user.

use filewise_shared::{classify, resolve, CreateError, DeleteError, EnumerationError, Intent, Snapshot};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::llm_client::LlmClient;
use crate::mutation_executor::MutationExecutor;
use crate::prompts::{fallback_answer, free_form_prompt, ConversationTurn};
use crate::snapshot_store::{SnapshotRead, SnapshotStore};

/// What happened to an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Created,
    CreateFailed,
    Deleted,
    /// Create or delete refused by the protected-name guard
    Protected,
    /// Nothing in the directory matched the requested name
    NotFound,
    DeleteFailed,
    /// Language model answer
    Answer,
    /// Language model unavailable; templated answer
    Fallback,
}

impl OutcomeKind {
    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeKind::Created | OutcomeKind::Deleted | OutcomeKind::Answer)
    }

    /// The request was refused rather than failing
    pub fn is_refusal(&self) -> bool {
        matches!(self, OutcomeKind::Protected | OutcomeKind::NotFound)
    }
}

/// Structured result of one routed utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub kind: OutcomeKind,
    /// Human-readable response
    pub message: String,
    /// File the command acted on, when there was one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl Outcome {
    fn new(kind: OutcomeKind, message: String, target: Option<String>) -> Self {
        Self {
            kind,
            message,
            target,
        }
    }

    pub fn created(name: &str) -> Self {
        Self::new(
            OutcomeKind::Created,
            format!(
                "✅ Successfully created file '{}'! The file has been added to your directory. \
                 You can now query its properties or list all files to see it.",
                name
            ),
            Some(name.to_string()),
        )
    }

    pub fn create_failed(error: &CreateError) -> Self {
        let (kind, target) = match error {
            CreateError::Protected(name) => (OutcomeKind::Protected, Some(name.clone())),
            CreateError::InvalidName(_) | CreateError::Io { .. } => {
                (OutcomeKind::CreateFailed, None)
            }
        };
        Self::new(kind, format!("❌ Failed to create file: {}", error), target)
    }

    pub fn deleted(name: &str) -> Self {
        Self::new(
            OutcomeKind::Deleted,
            format!(
                "✅ Successfully deleted '{}'. The file has been removed from your directory. \
                 This is permanent and cannot be undone.",
                name
            ),
            Some(name.to_string()),
        )
    }

    pub fn delete_failed(error: &DeleteError) -> Self {
        let kind = match error {
            DeleteError::Protected(_) => OutcomeKind::Protected,
            DeleteError::NotFound(_) => OutcomeKind::NotFound,
            DeleteError::NotAFile(_) | DeleteError::Io { .. } => OutcomeKind::DeleteFailed,
        };
        let target = match error {
            DeleteError::Protected(n) | DeleteError::NotFound(n) | DeleteError::NotAFile(n) => n,
            DeleteError::Io { name, .. } => name,
        };
        Self::new(
            kind,
            format!("❌ Failed to delete file: {}", error),
            Some(target.clone()),
        )
    }

    /// No snapshot entry matched the fragment
    pub fn lookup_failed(fragment: &str) -> Self {
        Self::new(
            OutcomeKind::NotFound,
            format!("❌ File '{}' not found in the directory.", fragment),
            None,
        )
    }

    pub fn answer(text: String) -> Self {
        Self::new(OutcomeKind::Answer, text, None)
    }

    pub fn fallback(total_count: usize) -> Self {
        Self::new(OutcomeKind::Fallback, fallback_answer(total_count), None)
    }
}

/// Owns the snapshot store, the executor and the language model client
pub struct IntentRouter {
    store: SnapshotStore,
    executor: MutationExecutor,
    llm: Box<dyn LlmClient>,
}

impl IntentRouter {
    pub fn new(store: SnapshotStore, executor: MutationExecutor, llm: Box<dyn LlmClient>) -> Self {
        Self {
            store,
            executor,
            llm,
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn executor(&self) -> &MutationExecutor {
        &self.executor
    }

    /// Current snapshot, cached; empty with an error attached on failure
    pub fn snapshot(&mut self) -> SnapshotRead {
        self.store.read(false)
    }

    pub fn refresh(&mut self) -> Result<Arc<Snapshot>, EnumerationError> {
        self.store.refresh()
    }

    /// Route one utterance
    ///
    /// `history` holds earlier turns of this session, oldest first; it only
    /// feeds the free-form prompt.
    pub fn handle(&mut self, utterance: &str, history: &[ConversationTurn]) -> Outcome {
        let intent = classify(utterance);
        debug!(kind = intent.kind(), "classified utterance");

        match intent {
            Intent::CreateFile { filename, content } => self.create(&filename, &content),
            Intent::DeleteFile { filename } => self.delete_matching(&filename),
            Intent::FreeFormQuery { utterance } => self.answer(&utterance, history),
        }
    }

    /// Create a file by name
    pub fn create(&mut self, filename: &str, content: &str) -> Outcome {
        match self.executor.create(filename, content, &mut self.store) {
            Ok(name) => Outcome::created(&name),
            Err(e) => {
                warn!(name = %filename, error = %e, code = e.code(), "create failed");
                Outcome::create_failed(&e)
            }
        }
    }

    /// Delete the entry a spoken or typed fragment refers to
    pub fn delete_matching(&mut self, fragment: &str) -> Outcome {
        let read = self.store.read(false);
        let Some(entry) = resolve(fragment, &read.snapshot) else {
            info!(fragment = %fragment, "no entry matches delete request");
            return Outcome::lookup_failed(fragment);
        };
        let name = entry.name.clone();
        if !name.eq_ignore_ascii_case(fragment.trim()) {
            debug!(fragment = %fragment, resolved = %name, "fuzzy match for delete");
        }
        self.delete_exact(&name)
    }

    /// Delete a file by its exact name, without fuzzy lookup
    pub fn delete_exact(&mut self, name: &str) -> Outcome {
        match self.executor.delete(name, &mut self.store) {
            Ok(deleted) => Outcome::deleted(&deleted),
            Err(e) => {
                warn!(name = %name, error = %e, code = e.code(), "delete failed");
                Outcome::delete_failed(&e)
            }
        }
    }

    /// Answer a free-form question from the snapshot
    pub fn answer(&mut self, utterance: &str, history: &[ConversationTurn]) -> Outcome {
        let read = self.store.read(false);
        let prompt = free_form_prompt(utterance, &read.snapshot, history);

        match self.llm.generate(&prompt) {
            Ok(text) => Outcome::answer(text),
            Err(e) => {
                warn!(error = %e, "language model failed, using fallback answer");
                Outcome::fallback(read.snapshot.total_count())
            }
        }
    }
}
