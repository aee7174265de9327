//! REPL - Conversational interface for Filewise
//!
//! Interactive Read-Eval-Print Loop over the intent router. Conversation
//! history lives only as long as the session.

use anyhow::Result;
use filewise_common::ConversationTurn;
use filewise_shared::intent::command_phrases;
use owo_colors::OwoColorize;
use std::io::{self, BufRead, Write};

use crate::commands::App;
use crate::output;

/// Example questions shown by `help`
pub const EXAMPLE_QUERIES: &[&str] = &[
    "Who owns hello_world.txt?",
    "When was hello_world.txt created?",
    "List all files",
    "Create test.py with content: print('Hello')",
    "Delete old_file.txt",
    "What are the largest files?",
];

/// Turns kept in memory for follow-up questions
const HISTORY_LIMIT: usize = 20;

/// What a line of input asks the REPL to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Exit,
    Help,
    Refresh,
    List,
    Utterance(String),
    Empty,
}

pub fn parse_line(line: &str) -> ReplCommand {
    let trimmed = line.trim();
    match trimmed.to_lowercase().as_str() {
        "" => ReplCommand::Empty,
        "exit" | "quit" | "bye" | "/exit" | "/quit" => ReplCommand::Exit,
        "help" | "/help" | "?" => ReplCommand::Help,
        "/refresh" => ReplCommand::Refresh,
        "/list" | "/files" => ReplCommand::List,
        _ => ReplCommand::Utterance(trimmed.to_string()),
    }
}

pub fn help_text() -> String {
    let mut text = String::from("Ask anything about your files. For example:\n");
    for example in EXAMPLE_QUERIES {
        text.push_str(&format!("  {}\n", example));
    }
    text.push_str("\nCommands are recognized in these forms:\n");
    for phrase in command_phrases() {
        text.push_str(&format!("  {}\n", phrase));
    }
    text.push_str("\n/refresh re-reads the directory, /list shows it, exit leaves.");
    text
}

fn print_welcome(app: &App) {
    println!("{}", "Filewise".cyan().bold());
    println!(
        "{}",
        format!("Managing {} - type 'help' for examples", app.root.display()).dimmed()
    );
    println!();
}

fn print_prompt() {
    print!("{} ", "filewise>".cyan());
    let _ = io::stdout().flush();
}

/// Start the conversational REPL
pub fn start_repl(app: &mut App) -> Result<()> {
    print_welcome(app);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut history: Vec<ConversationTurn> = Vec::new();

    loop {
        print_prompt();

        let input = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                output::print_warning(&format!("Error reading input: {}", e));
                continue;
            }
            None => break, // EOF
        };

        match parse_line(&input) {
            ReplCommand::Empty => continue,
            ReplCommand::Exit => {
                println!("Goodbye!");
                break;
            }
            ReplCommand::Help => println!("{}", help_text()),
            ReplCommand::Refresh => {
                crate::commands::refresh(app)?;
            }
            ReplCommand::List => {
                crate::commands::list(app, false)?;
            }
            ReplCommand::Utterance(utterance) => {
                let outcome = app.router.handle(&utterance, &history);
                output::print_outcome(&outcome);
                remember(&mut history, ConversationTurn::new(utterance, outcome.message));
            }
        }
        println!();
    }

    Ok(())
}

/// Append a turn, dropping the oldest past the limit
fn remember(history: &mut Vec<ConversationTurn>, turn: ConversationTurn) {
    history.push(turn);
    if history.len() > HISTORY_LIMIT {
        let excess = history.len() - HISTORY_LIMIT;
        history.drain(..excess);
    }
}
