//! Utterance classification
//!
//! Maps a natural-language utterance to one of three intents using an
//! ordered table of phrasing templates. Creation templates come first, then
//! deletion templates; the first template that matches wins. Anything that
//! matches nothing is a free-form query for the language model.

use regex::Regex;
use std::sync::LazyLock;

/// Structured reading of one utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Create a file; `content` is empty when none was dictated
    CreateFile { filename: String, content: String },
    /// Delete a file; `filename` is the raw fragment, not yet resolved
    DeleteFile { filename: String },
    /// Anything else, answered from the snapshot by the language model
    FreeFormQuery { utterance: String },
}

impl Intent {
    pub fn kind(&self) -> &'static str {
        match self {
            Intent::CreateFile { .. } => "create_file",
            Intent::DeleteFile { .. } => "delete_file",
            Intent::FreeFormQuery { .. } => "free_form_query",
        }
    }
}

type Constructor = fn(String, &str) -> Intent;

/// One phrasing the router understands
struct CommandTemplate {
    phrase: &'static str,
    pattern: Regex,
    build: Constructor,
}

fn create_file(filename: String, utterance: &str) -> Intent {
    Intent::CreateFile {
        filename,
        content: dictated_content(utterance).unwrap_or_default(),
    }
}

fn delete_file(filename: String, _utterance: &str) -> Intent {
    Intent::DeleteFile { filename }
}

/// Ordered templates; position in this list is precedence
static COMMAND_TEMPLATES: LazyLock<Vec<CommandTemplate>> = LazyLock::new(|| {
    vec![
        CommandTemplate {
            phrase: "create X",
            pattern: Regex::new(
                r"(?i)\bcreate\s+(?:an?\s+)?(?:new\s+)?(?:file\s+)?(?:(?:named|called)\s+)?(\S+)",
            )
            .unwrap(),
            build: create_file,
        },
        CommandTemplate {
            phrase: "make X",
            pattern: Regex::new(
                r"(?i)\bmake\s+(?:an?\s+)?(?:new\s+)?(?:file\s+)?(?:(?:named|called)\s+)?(\S+)",
            )
            .unwrap(),
            build: create_file,
        },
        CommandTemplate {
            phrase: "new file X",
            pattern: Regex::new(r"(?i)\bnew\s+file\s+(?:(?:named|called)\s+)?(\S+)").unwrap(),
            build: create_file,
        },
        CommandTemplate {
            phrase: "create X file",
            pattern: Regex::new(r"(?i)\bcreate\s+(\S+)\s+file\b").unwrap(),
            build: create_file,
        },
        CommandTemplate {
            phrase: "delete X",
            pattern: Regex::new(r"(?i)\bdelete\s+(?:the\s+)?(?:file\s+)?(\S+)").unwrap(),
            build: delete_file,
        },
        CommandTemplate {
            phrase: "remove X",
            pattern: Regex::new(r"(?i)\bremove\s+(?:the\s+)?(?:file\s+)?(\S+)").unwrap(),
            build: delete_file,
        },
        CommandTemplate {
            phrase: "delete X file",
            pattern: Regex::new(r"(?i)\bdelete\s+(?:the\s+)?(\S+)\s+file\b").unwrap(),
            build: delete_file,
        },
        CommandTemplate {
            phrase: "remove X file",
            pattern: Regex::new(r"(?i)\bremove\s+(?:the\s+)?(\S+)\s+file\b").unwrap(),
            build: delete_file,
        },
    ]
});

static CONTENT_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\bwith\s+content\s*:\s*(.*)$").unwrap());

/// Classify an utterance
pub fn classify(utterance: &str) -> Intent {
    for template in COMMAND_TEMPLATES.iter() {
        let Some(caps) = template.pattern.captures(utterance) else {
            continue;
        };
        let Some(raw) = caps.get(1) else {
            continue;
        };
        let name = clean_capture(raw.as_str());
        if name.is_empty() {
            continue;
        }
        return (template.build)(name, utterance);
    }

    Intent::FreeFormQuery {
        utterance: utterance.to_string(),
    }
}

/// Phrasings in precedence order, for help output
pub fn command_phrases() -> Vec<&'static str> {
    COMMAND_TEMPLATES.iter().map(|t| t.phrase).collect()
}

/// Text after `with content:` up to the end of the utterance
pub fn dictated_content(utterance: &str) -> Option<String> {
    CONTENT_CLAUSE
        .captures(utterance)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Drop quoting and sentence punctuation around a captured name
fn clean_capture(raw: &str) -> String {
    raw.trim_matches(|c| matches!(c, '\'' | '"' | '`'))
        .trim_end_matches(|c| matches!(c, '.' | ',' | ';' | '!' | '?'))
        .trim_matches(|c| matches!(c, '\'' | '"' | '`'))
        .to_string()
}
