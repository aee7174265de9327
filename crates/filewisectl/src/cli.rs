//! CLI - Command-line argument parsing
//!
//! Keeps argument parsing separate from execution logic.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Filewise CLI
#[derive(Parser, Debug)]
#[command(name = "filewisectl")]
#[command(about = "Filewise - ask questions about your files, create and delete them", long_about = None)]
#[command(version = env!("FILEWISE_VERSION"))]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Directory to manage (overrides [workspace] root)
    #[arg(long, short = 'd', global = true)]
    pub dir: Option<PathBuf>,

    /// Config file (default: ./app_config.toml, then the XDG config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More logging on stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand (if not provided, starts the interactive chat)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a question or give a create/delete command in plain language
    Ask {
        /// The utterance, e.g. "who owns hello_world.txt?"
        #[arg(required = true, num_args = 1..)]
        utterance: Vec<String>,

        /// Also synthesize the reply into this WAV file
        #[arg(long, value_name = "WAV")]
        speak: Option<PathBuf>,

        /// Voice model for --speak
        #[arg(long)]
        voice: Option<String>,

        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Transcribe a WAV recording, act on it, and speak the reply
    Voice {
        /// Mono 16 kHz 16-bit PCM WAV file
        input: PathBuf,

        /// Where to write the spoken reply
        #[arg(long, short, value_name = "WAV")]
        out: Option<PathBuf>,

        /// Voice model for the reply
        #[arg(long)]
        voice: Option<String>,
    },

    /// Show the directory: summary metrics and a file table
    List {
        /// Output the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a file
    Create {
        /// File name; `.txt` is added when it has no extension
        name: String,

        /// File content
        #[arg(long, conflicts_with = "template")]
        content: Option<String>,

        /// Start from a quick template (see `templates`)
        #[arg(long)]
        template: Option<String>,

        /// Extension to append, e.g. `md`
        #[arg(long)]
        ext: Option<String>,
    },

    /// Permanently delete a file
    Delete {
        /// Exact file name
        name: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Re-read the directory
    Refresh,

    /// List quick file templates
    Templates,

    /// List voice models for spoken replies
    Voices,
}
