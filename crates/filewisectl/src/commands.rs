//! Command implementations
//!
//! Every command returns the process exit code; errors that reach `main`
//! are reported there and exit with [`EXIT_GENERAL_ERROR`].

use anyhow::{bail, Context, Result};
use chrono::Local;
use filewise_common::enumerator::Enumerator;
use filewise_common::speech::find_voice;
use filewise_common::{
    CommandEnumerator, Config, DeepgramClient, HttpLlmClient, IntentRouter, MutationExecutor,
    NativeEnumerator, SnapshotStore, VoicePipeline,
};
use filewise_shared::templates::{with_extension, Template};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::{exit_code_for, EXIT_GENERAL_ERROR, EXIT_REFUSED, EXIT_SUCCESS};
use crate::output;

/// Loaded configuration plus the wired-up router
pub struct App {
    pub config: Config,
    pub root: PathBuf,
    pub router: IntentRouter,
}

impl App {
    /// Wire the router and take the first snapshot
    pub fn build(config: Config, dir_override: Option<&Path>) -> Result<Self> {
        let root = dir_override
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.workspace.root.clone());
        if !root.is_dir() {
            bail!("{} is not a directory", root.display());
        }

        let enumerator = build_enumerator(&config, &root);
        let llm = HttpLlmClient::new(config.llm.clone()).context("Failed to set up language model client")?;
        let router = IntentRouter::new(
            SnapshotStore::new(enumerator),
            MutationExecutor::new(&root),
            Box::new(llm),
        );

        let mut app = Self {
            config,
            root,
            router,
        };

        let first = app.router.snapshot();
        if let Some(e) = &first.error {
            output::print_warning(&format!("could not list directory, continuing with no files: {}", e));
        }
        info!(root = %app.root.display(), count = first.snapshot.total_count(), "ready");
        Ok(app)
    }

    /// Speech pipeline from the `[speech]` settings
    pub fn voice_pipeline(&self) -> Result<VoicePipeline> {
        let transcriber = DeepgramClient::new(self.config.speech.clone())
            .context("Failed to set up speech client")?;
        let synthesizer = DeepgramClient::new(self.config.speech.clone())
            .context("Failed to set up speech client")?;
        Ok(VoicePipeline::new(Box::new(transcriber), Box::new(synthesizer)))
    }

    /// Requested voice, or the configured default; unknown voices are an error
    pub fn pick_voice(&self, requested: Option<&str>) -> Result<String> {
        let selector = requested.unwrap_or(&self.config.speech.default_voice);
        match find_voice(selector) {
            Some(v) => Ok(v.id.to_string()),
            None => bail!(
                "unknown voice '{}' (run `filewisectl voices` to see the choices)",
                selector
            ),
        }
    }
}

/// External lister when configured, otherwise the built-in one
pub fn build_enumerator(config: &Config, root: &Path) -> Box<dyn Enumerator> {
    match &config.enumerator.command {
        Some(command) => {
            debug!(command = %command, "using external lister");
            Box::new(CommandEnumerator::new(
                command.clone(),
                config.enumerator.args.clone(),
                root,
            ))
        }
        None => Box::new(NativeEnumerator::new(root)),
    }
}

pub fn ask(
    app: &mut App,
    utterance: &str,
    speak: Option<&Path>,
    voice: Option<&str>,
    json: bool,
) -> Result<i32> {
    // Validate the voice before doing anything irreversible
    let voice = match speak {
        Some(_) => Some(app.pick_voice(voice)?),
        None => None,
    };

    let outcome = app.router.handle(utterance, &[]);
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        output::print_outcome(&outcome);
    }

    if let (Some(path), Some(voice)) = (speak, voice) {
        let audio = app
            .voice_pipeline()?
            .speak(&outcome.message, &voice)
            .context("Speech synthesis failed")?;
        fs::write(path, audio).with_context(|| format!("Failed to write {}", path.display()))?;
        if !json {
            println!("Spoken reply saved to {}", path.display());
        }
    }

    Ok(exit_code_for(outcome.kind))
}

pub fn voice(app: &mut App, input: &Path, out: Option<&Path>, voice: Option<&str>) -> Result<i32> {
    let voice = app.pick_voice(voice)?;
    let wav = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;

    let pipeline = app.voice_pipeline()?;
    let turn = pipeline.run_turn(&mut app.router, &wav, &voice, &[])?;

    let Some(outcome) = &turn.outcome else {
        if let Some(e) = &turn.speech_error {
            output::print_warning(&format!("transcription failed: {}", e));
        }
        println!("{}", turn.response);
        return Ok(EXIT_GENERAL_ERROR);
    };

    println!("You said: {}", turn.transcript);
    output::print_outcome(outcome);

    match (&turn.audio, out) {
        (Some(audio), Some(path)) => {
            fs::write(path, audio).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Spoken reply saved to {}", path.display());
        }
        (None, _) => {
            if let Some(e) = &turn.speech_error {
                output::print_warning(&format!("no spoken reply: {}", e));
            }
        }
        (Some(_), None) => {}
    }

    Ok(exit_code_for(outcome.kind))
}

pub fn list(app: &mut App, json: bool) -> Result<i32> {
    let read = app.router.snapshot();
    if json {
        println!("{}", read.snapshot.to_pretty_json());
    } else {
        output::print_listing(&read.snapshot, &app.router.store().source());
    }
    Ok(if read.is_degraded() {
        EXIT_GENERAL_ERROR
    } else {
        EXIT_SUCCESS
    })
}

/// Content for `create`: explicit text, a rendered template, or nothing
pub fn create_content(content: Option<&str>, template: Option<&str>) -> Result<String> {
    match (content, template) {
        (Some(text), _) => Ok(text.to_string()),
        (None, Some(key)) => match Template::parse(key) {
            Some(t) => Ok(t.render(Local::now())),
            None => bail!(
                "unknown template '{}' (run `filewisectl templates` to see the choices)",
                key
            ),
        },
        (None, None) => Ok(String::new()),
    }
}

pub fn create(
    app: &mut App,
    name: &str,
    content: Option<&str>,
    template: Option<&str>,
    ext: Option<&str>,
) -> Result<i32> {
    let body = create_content(content, template)?;
    let name = match ext {
        Some(ext) => with_extension(name, ext),
        None => name.to_string(),
    };

    let outcome = app.router.create(&name, &body);
    output::print_outcome(&outcome);
    Ok(exit_code_for(outcome.kind))
}

pub fn delete(app: &mut App, name: &str, yes: bool) -> Result<i32> {
    if !yes && !confirm_delete(name, &mut io::stdin().lock(), &mut io::stderr())? {
        println!("Cancelled, nothing was deleted.");
        return Ok(EXIT_REFUSED);
    }

    let outcome = app.router.delete_exact(name);
    output::print_outcome(&outcome);
    Ok(exit_code_for(outcome.kind))
}

/// Ask before a permanent delete; anything but y/yes declines
pub fn confirm_delete(name: &str, input: &mut impl BufRead, prompt: &mut impl Write) -> Result<bool> {
    write!(
        prompt,
        "Permanently delete '{}'? This cannot be undone. [y/N] ",
        name
    )?;
    prompt.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub fn refresh(app: &mut App) -> Result<i32> {
    match app.router.refresh() {
        Ok(snapshot) => {
            println!(
                "Refreshed: {} entries at {}",
                snapshot.total_count(),
                snapshot.captured_at().format("%H:%M:%S")
            );
            Ok(EXIT_SUCCESS)
        }
        Err(e) => {
            output::print_warning(&format!("refresh failed, keeping the previous listing: {}", e));
            Ok(EXIT_GENERAL_ERROR)
        }
    }
}

pub fn templates() -> Result<i32> {
    println!("{}", output::format_templates());
    Ok(EXIT_SUCCESS)
}

pub fn voices(config: &Config) -> Result<i32> {
    println!("{}", output::format_voices(&config.speech.default_voice));
    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_create_content_sources() {
        assert_eq!(create_content(Some("hi"), None).unwrap(), "hi");
        assert_eq!(create_content(None, None).unwrap(), "");
        assert!(create_content(None, Some("hello"))
            .unwrap()
            .starts_with("Hello World!"));
        assert!(create_content(None, Some("yaml")).is_err());
    }

    #[test]
    fn test_confirm_delete_answers() {
        let mut prompt = Vec::new();
        assert!(confirm_delete("a.txt", &mut Cursor::new("y\n"), &mut prompt).unwrap());
        assert!(confirm_delete("a.txt", &mut Cursor::new("YES\n"), &mut prompt).unwrap());
        assert!(!confirm_delete("a.txt", &mut Cursor::new("\n"), &mut prompt).unwrap());
        assert!(!confirm_delete("a.txt", &mut Cursor::new(""), &mut prompt).unwrap());

        let shown = String::from_utf8(prompt).unwrap();
        assert!(shown.contains("cannot be undone"));
    }

    #[test]
    fn test_build_rejects_missing_dir() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        assert!(App::build(Config::default(), Some(&missing)).is_err());
    }

    #[test]
    fn test_pick_voice() {
        let temp = TempDir::new().unwrap();
        let app = App::build(Config::default(), Some(temp.path())).unwrap();
        assert_eq!(app.pick_voice(None).unwrap(), "aura-asteria-en");
        assert_eq!(app.pick_voice(Some("AURA-ZEUS-EN")).unwrap(), "aura-zeus-en");
        assert!(app.pick_voice(Some("robot")).is_err());
    }

    #[test]
    fn test_create_with_extension_and_template() {
        let temp = TempDir::new().unwrap();
        let mut app = App::build(Config::default(), Some(temp.path())).unwrap();

        let code = create(&mut app, "script", None, Some("python"), Some("py")).unwrap();
        assert_eq!(code, EXIT_SUCCESS);
        let body = fs::read_to_string(temp.path().join("script.py")).unwrap();
        assert!(body.starts_with("#!/usr/bin/env python3"));
    }

    #[test]
    fn test_delete_protected_exit_code() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".env"), "x").unwrap();
        let mut app = App::build(Config::default(), Some(temp.path())).unwrap();
        assert_eq!(delete(&mut app, ".env", true).unwrap(), EXIT_REFUSED);
        assert!(temp.path().join(".env").exists());
    }
}
