//! Directory enumerator collaborators
//!
//! The core only depends on the [`Enumerator`] contract: produce one listing
//! payload (`{files, total_files}`) or fail with [`EnumerationError`].
//!
//! - [`CommandEnumerator`] runs an external lister program and parses its
//!   JSON stdout (the original Windows `file_lister.exe` contract).
//! - [`NativeEnumerator`] lists a directory one level deep and fills in the
//!   same fields itself.
//! - [`FakeEnumerator`] replays scripted listings for tests.

use chrono::{DateTime, Local};
use filewise_shared::entry::{size_unit, Attributes, DirectoryEntry, EntryKind, ListingPayload};
use filewise_shared::EnumerationError;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Timestamp layout used by the lister contract
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Something that can list the managed directory
pub trait Enumerator: Send {
    /// Produce a complete, consistent listing
    fn enumerate(&self) -> Result<ListingPayload, EnumerationError>;

    /// Human-readable description for logs
    fn describe(&self) -> String;
}

impl<E: Enumerator + Sync + ?Sized> Enumerator for Arc<E> {
    fn enumerate(&self) -> Result<ListingPayload, EnumerationError> {
        (**self).enumerate()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Parse lister stdout, rejecting inconsistent listings
pub fn parse_listing(stdout: &str) -> Result<ListingPayload, EnumerationError> {
    let payload = ListingPayload::from_json(stdout)?;
    payload.validate()?;
    Ok(payload)
}

/// Program path to spawn
///
/// Relative paths with a directory part (`./file_lister.exe`,
/// `bin/lister`) are taken from `workdir`; bare names are left to `PATH`.
pub fn resolve_program(program: &str, workdir: &Path) -> PathBuf {
    let path = Path::new(program);
    if path.is_relative() && path.components().count() > 1 {
        workdir.join(path)
    } else {
        path.to_path_buf()
    }
}

// =============================================================================
// External lister process
// =============================================================================

/// Runs an external lister, invoked with no arguments beyond the configured ones
pub struct CommandEnumerator {
    program: String,
    args: Vec<String>,
    workdir: PathBuf,
}

impl CommandEnumerator {
    pub fn new(program: impl Into<String>, args: Vec<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            workdir: workdir.into(),
        }
    }
}

impl Enumerator for CommandEnumerator {
    fn enumerate(&self) -> Result<ListingPayload, EnumerationError> {
        let program = resolve_program(&self.program, &self.workdir);
        debug!(program = %program.display(), workdir = %self.workdir.display(), "running lister");

        let output = Command::new(&program)
            .args(&self.args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|source| EnumerationError::Spawn {
                command: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(EnumerationError::ExitStatus {
                command: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_listing(&String::from_utf8_lossy(&output.stdout))
    }

    fn describe(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

// =============================================================================
// Built-in lister
// =============================================================================

/// Lists the immediate children of a directory
pub struct NativeEnumerator {
    root: PathBuf,
}

impl NativeEnumerator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Enumerator for NativeEnumerator {
    fn enumerate(&self) -> Result<ListingPayload, EnumerationError> {
        // Read the root up front so a missing directory is an error rather
        // than an empty listing
        fs::read_dir(&self.root)?;

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for item in walker {
            let item = match item {
                Ok(item) => item,
                Err(e) => {
                    // Entries can vanish between readdir and stat
                    warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let metadata = match item.metadata() {
                Ok(m) => m,
                Err(e) => {
                    warn!(path = %item.path().display(), error = %e, "skipping entry without metadata");
                    continue;
                }
            };
            let name = item.file_name().to_string_lossy().into_owned();
            files.push(entry_from_metadata(name, &metadata));
        }

        Ok(ListingPayload {
            total_files: files.len(),
            files,
        })
    }

    fn describe(&self) -> String {
        format!("native:{}", self.root.display())
    }
}

fn entry_from_metadata(name: String, metadata: &fs::Metadata) -> DirectoryEntry {
    let file_type = metadata.file_type();
    let kind = if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_file() {
        EntryKind::File
    } else if file_type.is_symlink() {
        EntryKind::Other("symlink".to_string())
    } else {
        EntryKind::Other("special".to_string())
    };

    let size = if kind == EntryKind::File { metadata.len() } else { 0 };
    let size_readable = if kind == EntryKind::Directory {
        "N/A".to_string()
    } else {
        size_unit(size).to_string()
    };

    let modified = metadata.modified().ok();
    let created = metadata.created().ok().or(modified);

    DirectoryEntry {
        attributes: Attributes {
            hidden: name.starts_with('.'),
            system: false,
            readonly: metadata.permissions().readonly(),
        },
        name,
        kind,
        size,
        size_readable: Some(size_readable),
        owner: owner_name(metadata),
        created: format_time(created),
        modified: format_time(modified),
        accessed: Some(format_time(metadata.accessed().ok())),
    }
}

fn format_time(time: Option<SystemTime>) -> String {
    match time {
        Some(t) => DateTime::<Local>::from(t).format(TIMESTAMP_FORMAT).to_string(),
        None => String::new(),
    }
}

#[cfg(unix)]
fn owner_name(metadata: &fs::Metadata) -> String {
    use nix::unistd::{Uid, User};
    use std::os::unix::fs::MetadataExt;

    let uid = metadata.uid();
    match User::from_uid(Uid::from_raw(uid)) {
        Ok(Some(user)) => user.name,
        _ => uid.to_string(),
    }
}

#[cfg(not(unix))]
fn owner_name(_metadata: &fs::Metadata) -> String {
    "Unknown".to_string()
}

// =============================================================================
// Scripted lister for tests
// =============================================================================

/// One scripted response
#[derive(Debug, Clone)]
pub enum FakeListing {
    Entries(Vec<DirectoryEntry>),
    Fail(String),
}

/// Enumerator that replays scripted listings and counts calls
///
/// Responses are consumed in order; the last one repeats.
pub struct FakeEnumerator {
    responses: Mutex<VecDeque<FakeListing>>,
    call_count: Mutex<usize>,
}

impl FakeEnumerator {
    pub fn new(responses: Vec<FakeListing>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            call_count: Mutex::new(0),
        }
    }

    /// Always list these names as files
    pub fn with_files(names: &[&str]) -> Self {
        Self::new(vec![FakeListing::Entries(
            names.iter().map(|n| DirectoryEntry::file(*n, 0)).collect(),
        )])
    }

    pub fn always_failing(message: &str) -> Self {
        Self::new(vec![FakeListing::Fail(message.to_string())])
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Enumerator for FakeEnumerator {
    fn enumerate(&self) -> Result<ListingPayload, EnumerationError> {
        *self.call_count.lock().unwrap() += 1;

        let mut responses = self.responses.lock().unwrap();
        let next = if responses.len() > 1 {
            responses.pop_front()
        } else {
            responses.front().cloned()
        };

        match next {
            Some(FakeListing::Entries(files)) => Ok(ListingPayload {
                total_files: files.len(),
                files,
            }),
            Some(FakeListing::Fail(message)) => Err(EnumerationError::ExitStatus {
                command: "fake".to_string(),
                status: "exit status: 1".to_string(),
                stderr: message,
            }),
            None => Ok(ListingPayload {
                files: Vec::new(),
                total_files: 0,
            }),
        }
    }

    fn describe(&self) -> String {
        "fake".to_string()
    }
}
