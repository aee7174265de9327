//! Prompt construction for free-form questions

use filewise_shared::Snapshot;
use serde::{Deserialize, Serialize};

/// Turns kept in the prompt when history is supplied
pub const MAX_HISTORY_TURNS: usize = 6;

/// One exchange from the current session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user: String,
    pub assistant: String,
}

impl ConversationTurn {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }
}

const GUIDELINES: &str = "Guidelines:
- If they ask about a specific file, provide detailed information
- If they ask for the owner of a file, just mention the owner
- If they ask when a file was created, just mention the creation time
- If they ask to list files, provide a brief summary
- If they ask about file types, categorize them
- Be concise but helpful
- Do not use markdown formatting like ** or * in your response
- Speak naturally as if you're having a conversation

Important: Always use the actual data provided above. Don't make up information.";

/// Prompt for a free-form question about the directory
///
/// Only the most recent [`MAX_HISTORY_TURNS`] turns are included.
pub fn free_form_prompt(utterance: &str, snapshot: &Snapshot, history: &[ConversationTurn]) -> String {
    let mut prompt = String::from("You are a file system assistant.");

    let recent = &history[history.len().saturating_sub(MAX_HISTORY_TURNS)..];
    if !recent.is_empty() {
        prompt.push_str("\n\nEarlier in this conversation:\n");
        for turn in recent {
            prompt.push_str(&format!("User: {}\nAssistant: {}\n", turn.user, turn.assistant));
        }
    }

    prompt.push_str(&format!(
        "\n\nThe user asked: \"{}\"\n\nHere's the current directory information:\n{}\n\n\
         Please provide a natural, conversational response to their question.\n\n{}",
        utterance,
        snapshot.to_pretty_json(),
        GUIDELINES
    ));
    prompt
}

/// Answer used when the language model is unavailable
pub fn fallback_answer(total_count: usize) -> String {
    format!("Error processing query. File count: {}", total_count)
}
