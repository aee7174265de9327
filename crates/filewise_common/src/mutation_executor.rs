//! Mutation Executor
//!
//! Creates and deletes files in the workspace root. Every successful
//! mutation force-refreshes the snapshot store so the next read reflects it.
//!
//! Create:
//! - strips `< > : " | ? *` from the requested name
//! - appends `.txt` when the name has no extension
//! - writes the given content, or a placeholder body when there is none
//! - refuses protected names and read-only targets
//! - writes via temp file + rename
//!
//! Delete:
//! - refuses protected names, whatever their case
//! - refuses missing targets and directories
//! - removal is permanent; there is no trash or undo

use chrono::Local;
use filewise_shared::protected::is_protected;
use filewise_shared::{CreateError, DeleteError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::atomic::atomic_write_str;
use crate::snapshot_store::SnapshotStore;

/// Characters Windows forbids in file names
const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Extension given to names that have none
pub const DEFAULT_EXTENSION: &str = ".txt";

/// Remove forbidden characters and surrounding whitespace
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !FORBIDDEN_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Sanitized name with the default extension applied
///
/// Fails for names that are empty after sanitizing, that name the directory
/// itself, or that would escape the workspace root.
pub fn canonical_filename(name: &str) -> Result<String, CreateError> {
    let clean = sanitize_filename(name);
    if clean.is_empty() || clean == "." || clean == ".." || clean.contains(['/', '\\']) {
        return Err(CreateError::InvalidName(name.to_string()));
    }
    if clean.contains('.') {
        Ok(clean)
    } else {
        Ok(format!("{}{}", clean, DEFAULT_EXTENSION))
    }
}

/// Body written when a file is created without content
pub fn placeholder_body(filename: &str) -> String {
    format!(
        "File created by AI Assistant\n\
         Filename: {}\n\
         Created: {}\n\
         This file was created through the AI File System Assistant.\n",
        filename,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}

/// Applies create and delete requests inside one directory
#[derive(Debug, Clone)]
pub struct MutationExecutor {
    root: PathBuf,
}

impl MutationExecutor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create (or overwrite) a file; returns the canonical name
    pub fn create(
        &self,
        filename: &str,
        content: &str,
        store: &mut SnapshotStore,
    ) -> Result<String, CreateError> {
        let name = canonical_filename(filename)?;
        if is_protected(&name) {
            warn!(name = %name, "refused to overwrite protected file");
            return Err(CreateError::Protected(name));
        }

        let path = self.root.join(&name);
        // Read-only targets are never replaced
        if let Ok(existing) = fs::symlink_metadata(&path) {
            if existing.permissions().readonly() {
                return Err(CreateError::Io {
                    name,
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "file is read-only"),
                });
            }
        }

        let body = if content.is_empty() {
            placeholder_body(&name)
        } else {
            content.to_string()
        };

        atomic_write_str(&path, &body).map_err(|source| CreateError::Io {
            name: name.clone(),
            source,
        })?;

        info!(name = %name, bytes = body.len(), "file created");
        refresh_after_mutation(store);
        Ok(name)
    }

    /// Permanently delete a file; returns the deleted name
    pub fn delete(&self, filename: &str, store: &mut SnapshotStore) -> Result<String, DeleteError> {
        let name = filename.trim();

        if is_protected(name) {
            warn!(name = %name, "refused to delete protected file");
            return Err(DeleteError::Protected(name.to_string()));
        }

        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(DeleteError::NotFound(name.to_string()));
        }

        let path = self.root.join(name);
        let metadata = match fs::symlink_metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(DeleteError::NotFound(name.to_string()));
            }
            Err(source) => {
                return Err(DeleteError::Io {
                    name: name.to_string(),
                    source,
                })
            }
        };

        if metadata.is_dir() {
            return Err(DeleteError::NotAFile(name.to_string()));
        }

        fs::remove_file(&path).map_err(|source| DeleteError::Io {
            name: name.to_string(),
            source,
        })?;

        info!(name = %name, "file deleted");
        refresh_after_mutation(store);
        Ok(name.to_string())
    }
}

/// The mutation already happened, so a failed refresh is only logged
fn refresh_after_mutation(store: &mut SnapshotStore) {
    if let Err(e) = store.refresh() {
        warn!(error = %e, "snapshot refresh after mutation failed");
        store.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enumerator::{FakeEnumerator, NativeEnumerator};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn native_setup() -> (TempDir, MutationExecutor, SnapshotStore) {
        let temp = TempDir::new().unwrap();
        let executor = MutationExecutor::new(temp.path());
        let store = SnapshotStore::new(Box::new(NativeEnumerator::new(temp.path())));
        (temp, executor, store)
    }

    #[test]
    fn test_sanitize_strips_forbidden_chars() {
        assert_eq!(sanitize_filename("a<b>c:d\"e|f?g*h.txt"), "abcdefgh.txt");
        assert_eq!(sanitize_filename("  spaced.md "), "spaced.md");
    }

    #[test]
    fn test_canonical_name_defaults_extension() {
        assert_eq!(canonical_filename("notes").unwrap(), "notes.txt");
        assert_eq!(canonical_filename("notes.md").unwrap(), "notes.md");
        assert_eq!(canonical_filename("what?").unwrap(), "what.txt");
    }

    #[test]
    fn test_canonical_name_rejects_unusable() {
        for bad in ["", "???", "..", "../escape.txt", "dir/file.txt", "a\\b.txt"] {
            assert!(
                matches!(canonical_filename(bad), Err(CreateError::InvalidName(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_create_without_content_writes_placeholder() {
        let (temp, executor, mut store) = native_setup();
        let name = executor.create("notes", "", &mut store).unwrap();
        assert_eq!(name, "notes.txt");

        let body = fs::read_to_string(temp.path().join("notes.txt")).unwrap();
        assert!(!body.is_empty());
        assert!(body.contains("Filename: notes.txt"));
        assert!(body.contains("Created: "));
    }

    #[test]
    fn test_create_writes_content_verbatim() {
        let (temp, executor, mut store) = native_setup();
        let name = executor.create("notes.md", "hi", &mut store).unwrap();
        assert_eq!(name, "notes.md");
        assert_eq!(fs::read_to_string(temp.path().join("notes.md")).unwrap(), "hi");
    }

    #[test]
    fn test_create_refreshes_snapshot() {
        let (_temp, executor, mut store) = native_setup();
        assert_eq!(store.get(false).unwrap().total_count(), 0);

        executor.create("a.txt", "x", &mut store).unwrap();
        let snapshot = store.get(false).unwrap();
        assert_eq!(snapshot.total_count(), 1);
        assert!(snapshot.contains_name("a.txt"));
    }

    #[test]
    fn test_create_into_missing_root_fails_with_cause() {
        let temp = TempDir::new().unwrap();
        let executor = MutationExecutor::new(temp.path().join("gone"));
        let fake = Arc::new(FakeEnumerator::with_files(&[]));
        let mut store = SnapshotStore::new(Box::new(Arc::clone(&fake)));

        let err = executor.create("a.txt", "x", &mut store).unwrap_err();
        assert!(matches!(err, CreateError::Io { .. }));
        assert_eq!(fake.call_count(), 0);
    }

    #[test]
    fn test_create_refuses_protected_names() {
        let (temp, executor, mut store) = native_setup();
        fs::write(temp.path().join(".env"), "SECRET=1").unwrap();

        for name in [".env", ".ENV", "App_Config.toml"] {
            let err = executor.create(name, "gone", &mut store).unwrap_err();
            assert!(matches!(err, CreateError::Protected(_)), "{}", name);
            assert_eq!(err.code(), "protected");
        }
        assert_eq!(fs::read_to_string(temp.path().join(".env")).unwrap(), "SECRET=1");
        assert!(!temp.path().join("app_config.toml").exists());
    }

    #[test]
    fn test_create_refuses_readonly_target() {
        let (temp, executor, mut store) = native_setup();
        let path = temp.path().join("locked.txt");
        fs::write(&path, "keep").unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&path, perms).unwrap();

        match executor.create("locked.txt", "new", &mut store) {
            Err(CreateError::Io { name, source }) => {
                assert_eq!(name, "locked.txt");
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected permission error, got {:?}", other),
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep");

        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(false);
        fs::set_permissions(&path, perms).unwrap();
        executor.create("locked.txt", "new", &mut store).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_delete_protected_any_case() {
        let (temp, executor, mut store) = native_setup();
        fs::write(temp.path().join("app_config"), "k=v").unwrap();

        for name in ["app_config", "APP_CONFIG"] {
            let err = executor.delete(name, &mut store).unwrap_err();
            assert!(matches!(err, DeleteError::Protected(_)));
        }
        assert!(temp.path().join("app_config").exists());
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let (_temp, executor, mut store) = native_setup();
        let err = executor.delete("ghost.txt", &mut store).unwrap_err();
        assert!(matches!(err, DeleteError::NotFound(_)));
        assert!(matches!(
            executor.delete("../outside.txt", &mut store),
            Err(DeleteError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_refuses_directories() {
        let (temp, executor, mut store) = native_setup();
        fs::create_dir(temp.path().join("docs")).unwrap();
        let err = executor.delete("docs", &mut store).unwrap_err();
        assert!(matches!(err, DeleteError::NotAFile(_)));
        assert!(temp.path().join("docs").is_dir());
    }

    #[test]
    fn test_delete_removes_and_refreshes() {
        let (temp, executor, mut store) = native_setup();
        fs::write(temp.path().join("old.txt"), "bye").unwrap();
        assert_eq!(store.get(false).unwrap().total_count(), 1);

        assert_eq!(executor.delete("old.txt", &mut store).unwrap(), "old.txt");
        assert!(!temp.path().join("old.txt").exists());
        assert_eq!(store.get(false).unwrap().total_count(), 0);
    }

    #[test]
    fn test_failed_refresh_does_not_fail_mutation() {
        let temp = TempDir::new().unwrap();
        let executor = MutationExecutor::new(temp.path());
        let fake = Arc::new(FakeEnumerator::always_failing("lister gone"));
        let mut store = SnapshotStore::new(Box::new(Arc::clone(&fake)));

        assert_eq!(executor.create("a", "", &mut store).unwrap(), "a.txt");
        assert_eq!(fake.call_count(), 1);
        assert!(store.current().is_none());
    }
}
