//! Shared types and pure logic for filewise components.
//!
//! Everything here is free of collaborator I/O: directory entries and
//! snapshots, utterance classification, fuzzy name resolution, the speech
//! text sanitizer, the protected-name list and the quick file templates.

pub mod entry;
pub mod error;
pub mod intent;
pub mod protected;
pub mod resolver;
pub mod speech_text;
pub mod templates;

pub use entry::{Attributes, DirectoryEntry, EntryKind, Snapshot, SnapshotSummary};
pub use error::{CreateError, DeleteError, EnumerationError};
pub use intent::{classify, Intent};
pub use resolver::resolve;
