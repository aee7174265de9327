//! Filewise Control - natural-language file assistant
//!
//! Without a subcommand it starts an interactive chat over the managed
//! directory.

use anyhow::{Context, Result};
use clap::Parser;
use filewise_common::Config;
use owo_colors::OwoColorize;

use filewisectl::cli::{Cli, Commands};
use filewisectl::commands::{self, App};
use filewisectl::errors::{EXIT_GENERAL_ERROR, EXIT_SUCCESS};
use filewisectl::{logging, repl};

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            std::process::exit(EXIT_GENERAL_ERROR);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let (config, source) =
        Config::discover(cli.config.as_deref()).context("Failed to load configuration")?;
    logging::init(cli.verbose, &config.log.level);
    match &source {
        Some(path) => tracing::debug!(path = %path.display(), "loaded config"),
        None => tracing::debug!("no config file found, using defaults"),
    }

    // Commands that never touch the directory
    match &cli.command {
        Some(Commands::Templates) => return commands::templates(),
        Some(Commands::Voices) => return commands::voices(&config),
        _ => {}
    }

    let mut app = App::build(config, cli.dir.as_deref())?;

    match cli.command {
        None => {
            repl::start_repl(&mut app)?;
            Ok(EXIT_SUCCESS)
        }
        Some(Commands::Ask {
            utterance,
            speak,
            voice,
            json,
        }) => commands::ask(
            &mut app,
            &utterance.join(" "),
            speak.as_deref(),
            voice.as_deref(),
            json,
        ),
        Some(Commands::Voice { input, out, voice }) => {
            commands::voice(&mut app, &input, out.as_deref(), voice.as_deref())
        }
        Some(Commands::List { json }) => commands::list(&mut app, json),
        Some(Commands::Create {
            name,
            content,
            template,
            ext,
        }) => commands::create(
            &mut app,
            &name,
            content.as_deref(),
            template.as_deref(),
            ext.as_deref(),
        ),
        Some(Commands::Delete { name, yes }) => commands::delete(&mut app, &name, yes),
        Some(Commands::Refresh) => commands::refresh(&mut app),
        Some(Commands::Templates) => commands::templates(),
        Some(Commands::Voices) => commands::voices(&app.config),
    }
}
