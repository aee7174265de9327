//! Directory entries and snapshots.
//!
//! The field names follow the enumerator's JSON contract
//! (`{"files": [...], "total_files": N}`) so a payload parses straight into
//! these types and serializes back out unchanged for the language model.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::EnumerationError;

/// Kind of filesystem object reported by the enumerator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntryKind {
    File,
    Directory,
    /// Anything else the enumerator reports, kept verbatim
    Other(String),
}

impl EntryKind {
    pub fn as_str(&self) -> &str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
            EntryKind::Other(kind) => kind,
        }
    }
}

impl From<String> for EntryKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "file" => EntryKind::File,
            "directory" => EntryKind::Directory,
            _ => EntryKind::Other(value),
        }
    }
}

impl From<EntryKind> for String {
    fn from(kind: EntryKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute flags for an entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub hidden: bool,
    #[serde(default)]
    pub system: bool,
    pub readonly: bool,
}

/// One filesystem object in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Size in bytes, only meaningful for files
    #[serde(default)]
    pub size: u64,
    /// Coarse size unit ("bytes", "KB", "MB", "N/A")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_readable: Option<String>,
    /// Owner as reported, possibly `DOMAIN\user`
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub modified: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessed: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
}

impl DirectoryEntry {
    /// Minimal file entry, mostly for fixtures and fakes
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            size,
            size_readable: Some(size_unit(size).to_string()),
            owner: String::new(),
            created: String::new(),
            modified: String::new(),
            accessed: None,
            attributes: Attributes::default(),
        }
    }

    /// Minimal directory entry
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            size: 0,
            size_readable: Some("N/A".to_string()),
            owner: String::new(),
            created: String::new(),
            modified: String::new(),
            accessed: None,
            attributes: Attributes::default(),
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Account part of the owner, without any `DOMAIN\` prefix
    pub fn owner_short(&self) -> &str {
        self.owner.rsplit('\\').next().unwrap_or(&self.owner)
    }
}

/// Unit label the Windows lister attaches to sizes
pub fn size_unit(size: u64) -> &'static str {
    if size < 1024 {
        "bytes"
    } else if size < 1024 * 1024 {
        "KB"
    } else {
        "MB"
    }
}

/// Wire shape of an enumerator listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingPayload {
    pub files: Vec<DirectoryEntry>,
    pub total_files: usize,
}

impl ListingPayload {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Whether `total_files` agrees with the number of entries
    pub fn is_consistent(&self) -> bool {
        self.total_files == self.files.len()
    }

    /// Reject listings a snapshot cannot be built from
    ///
    /// The declared count must match the entries, and names must be unique
    /// ignoring case.
    pub fn validate(&self) -> Result<(), EnumerationError> {
        if !self.is_consistent() {
            return Err(EnumerationError::Inconsistent {
                declared: self.total_files,
                actual: self.files.len(),
            });
        }

        let mut seen = HashSet::with_capacity(self.files.len());
        for entry in &self.files {
            if !seen.insert(entry.name.to_lowercase()) {
                return Err(EnumerationError::DuplicateName(entry.name.clone()));
            }
        }
        Ok(())
    }
}

/// Immutable capture of a directory listing
///
/// `total_count()` is always `entries().len()`; the fields are private so
/// the two cannot drift.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    entries: Vec<DirectoryEntry>,
    captured_at: DateTime<Local>,
}

impl Snapshot {
    pub fn new(entries: Vec<DirectoryEntry>, captured_at: DateTime<Local>) -> Self {
        Self {
            entries,
            captured_at,
        }
    }

    /// Snapshot with no entries, handed out when enumeration fails
    pub fn empty() -> Self {
        Self::new(Vec::new(), Local::now())
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn total_count(&self) -> usize {
        self.entries.len()
    }

    pub fn captured_at(&self) -> DateTime<Local> {
        self.captured_at
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive membership test by exact name
    pub fn contains_name(&self, name: &str) -> bool {
        let wanted = name.to_lowercase();
        self.entries.iter().any(|e| e.name.to_lowercase() == wanted)
    }

    /// The snapshot in enumerator wire shape, as handed to the language model
    pub fn to_payload(&self) -> ListingPayload {
        ListingPayload {
            files: self.entries.clone(),
            total_files: self.total_count(),
        }
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.to_payload())
            .unwrap_or_else(|_| format!("{{\"files\": [], \"total_files\": {}}}", self.total_count()))
    }

    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary::from_entries(&self.entries)
    }
}

/// Headline counts shown above the file table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotSummary {
    pub total: usize,
    pub directories: usize,
    pub files: usize,
    pub hidden: usize,
}

impl SnapshotSummary {
    pub fn from_entries(entries: &[DirectoryEntry]) -> Self {
        Self {
            total: entries.len(),
            directories: entries.iter().filter(|e| e.is_dir()).count(),
            files: entries.iter().filter(|e| e.is_file()).count(),
            hidden: entries.iter().filter(|e| e.attributes.hidden).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTER_OUTPUT: &str = r#"{
"files": [
  {
    "name": "hello_world.txt",
    "type": "file",
    "size": 2048,
    "size_readable": "KB",
    "owner": "DESKTOP-1\\alice",
    "created": "05/14/2025 09:30:00",
    "modified": "05/14/2025 09:31:12",
    "accessed": "05/14/2025 09:31:12",
    "attributes": {
      "hidden": false,
      "system": false,
      "readonly": true
    }
  },
  {
    "name": "src",
    "type": "directory",
    "size": 0,
    "size_readable": "N/A",
    "owner": "DESKTOP-1\\alice",
    "created": "05/14/2025 09:30:00",
    "modified": "05/14/2025 09:30:00",
    "accessed": "05/14/2025 09:30:00",
    "attributes": {
      "hidden": true,
      "system": false,
      "readonly": false
    }
  }
],
"total_files": 2
}"#;

    #[test]
    fn test_parse_lister_output() {
        let payload = ListingPayload::from_json(LISTER_OUTPUT).unwrap();
        assert!(payload.is_consistent());
        assert_eq!(payload.files.len(), 2);

        let file = &payload.files[0];
        assert_eq!(file.kind, EntryKind::File);
        assert_eq!(file.size, 2048);
        assert!(file.attributes.readonly);
        assert_eq!(file.owner_short(), "alice");

        let dir = &payload.files[1];
        assert!(dir.is_dir());
        assert!(dir.attributes.hidden);
    }

    #[test]
    fn test_unknown_kind_is_kept() {
        let json = r#"{"files":[{"name":"pipe","type":"fifo","size":0,"owner":"","created":"","modified":"","attributes":{"hidden":false,"readonly":false}}],"total_files":1}"#;
        let payload = ListingPayload::from_json(json).unwrap();
        assert_eq!(payload.files[0].kind, EntryKind::Other("fifo".to_string()));

        let back = serde_json::to_value(&payload.files[0]).unwrap();
        assert_eq!(back["type"], "fifo");
    }

    #[test]
    fn test_inconsistent_total_detected() {
        let json = r#"{"files":[],"total_files":3}"#;
        let payload = ListingPayload::from_json(json).unwrap();
        assert!(!payload.is_consistent());
    }

    #[test]
    fn test_validate_rejects_case_duplicates() {
        let payload = ListingPayload {
            files: vec![
                DirectoryEntry::file("Notes.txt", 1),
                DirectoryEntry::file("notes.TXT", 2),
            ],
            total_files: 2,
        };
        match payload.validate() {
            Err(EnumerationError::DuplicateName(name)) => assert_eq!(name, "notes.TXT"),
            other => panic!("expected duplicate name, got {:?}", other),
        }

        let payload = ListingPayload {
            files: vec![DirectoryEntry::file("a", 1)],
            total_files: 4,
        };
        assert!(matches!(
            payload.validate(),
            Err(EnumerationError::Inconsistent { declared: 4, actual: 1 })
        ));
    }

    #[test]
    fn test_snapshot_count_and_summary() {
        let mut hidden = DirectoryEntry::file(".env", 10);
        hidden.attributes.hidden = true;
        let snapshot = Snapshot::new(
            vec![
                DirectoryEntry::file("a.txt", 1),
                DirectoryEntry::directory("docs"),
                hidden,
            ],
            Local::now(),
        );

        assert_eq!(snapshot.total_count(), 3);
        assert!(snapshot.contains_name("A.TXT"));
        assert_eq!(
            snapshot.summary(),
            SnapshotSummary {
                total: 3,
                directories: 1,
                files: 2,
                hidden: 1,
            }
        );
    }

    #[test]
    fn test_payload_round_trip_for_prompt() {
        let snapshot = Snapshot::new(vec![DirectoryEntry::file("notes.md", 5)], Local::now());
        let json = snapshot.to_pretty_json();
        let payload = ListingPayload::from_json(&json).unwrap();
        assert_eq!(payload.total_files, 1);
        assert_eq!(payload.files[0].name, "notes.md");
    }

    #[test]
    fn test_size_unit_thresholds() {
        assert_eq!(size_unit(0), "bytes");
        assert_eq!(size_unit(1023), "bytes");
        assert_eq!(size_unit(1024), "KB");
        assert_eq!(size_unit(1024 * 1024), "MB");
    }

    #[test]
    fn test_owner_without_domain() {
        let mut entry = DirectoryEntry::file("x", 0);
        entry.owner = "bob".to_string();
        assert_eq!(entry.owner_short(), "bob");
    }
}
