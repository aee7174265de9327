//! Names the assistant refuses to delete.
//!
//! The list covers the application's own binaries, build manifests, lister
//! and configuration. It is compiled in and cannot be changed at runtime.

/// Protected file names, compared case-insensitively
pub const PROTECTED_NAMES: &[&str] = &[
    "filewisectl",
    "filewisectl.exe",
    "file_lister",
    "file_lister.c",
    "file_lister.exe",
    "app_config",
    "app_config.toml",
    ".env",
    "Cargo.toml",
    "Cargo.lock",
];

/// Whether `name` is on the deny-list
pub fn is_protected(name: &str) -> bool {
    let name = name.trim();
    PROTECTED_NAMES.iter().any(|p| p.eq_ignore_ascii_case(name))
}
