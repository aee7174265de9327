//! Filewise configuration
//!
//! TOML file, looked up in this order:
//! 1. an explicit `--config` path
//! 2. `./app_config.toml` in the working directory
//! 3. `$XDG_CONFIG_HOME/filewise/config.toml`
//! 4. built-in defaults
//!
//! API keys are never stored here; each service section names the
//! environment variable that holds its key.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked for in the working directory
pub const LOCAL_CONFIG_FILE: &str = "app_config.toml";

const CONFIG_DIR: &str = "filewise";
const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file {path} not found")]
    Missing { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Directory the assistant manages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

/// External directory lister; unset means the built-in lister
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnumeratorConfig {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Language model wire protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    #[default]
    Ollama,
    /// Any OpenAI-compatible `/chat/completions` endpoint
    OpenAi,
}

impl LlmBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmBackend::Ollama => "ollama",
            LlmBackend::OpenAi => "openai",
        }
    }
}

/// Language model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub backend: LlmBackend,
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Environment variable holding the API key, if the backend needs one
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_llm_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_llm_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_llm_timeout() -> u64 {
    60
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            backend: LlmBackend::default(),
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key_env: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl LlmSettings {
    /// API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        read_key(self.api_key_env.as_deref())
    }
}

/// Speech transcription and synthesis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_speech_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_speech_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_stt_model")]
    pub stt_model: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_voice")]
    pub default_voice: String,
    #[serde(default = "default_speech_timeout")]
    pub timeout_secs: u64,
}

fn default_speech_endpoint() -> String {
    "https://api.deepgram.com".to_string()
}

fn default_speech_key_env() -> String {
    "DEEPGRAM_API_KEY".to_string()
}

fn default_stt_model() -> String {
    "nova-2".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_voice() -> String {
    "aura-asteria-en".to_string()
}

fn default_speech_timeout() -> u64 {
    30
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            endpoint: default_speech_endpoint(),
            api_key_env: default_speech_key_env(),
            stt_model: default_stt_model(),
            language: default_language(),
            default_voice: default_voice(),
            timeout_secs: default_speech_timeout(),
        }
    }
}

impl SpeechSettings {
    pub fn api_key(&self) -> Option<String> {
        read_key(Some(&self.api_key_env))
    }
}

fn read_key(var: Option<&str>) -> Option<String> {
    let var = var?;
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Complete filewise configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub enumerator: EnumeratorConfig,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub speech: SpeechSettings,
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Parse a config file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::Missing {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Resolve and load the config, returning where it came from
    ///
    /// An explicit path must exist. Files found by discovery must parse;
    /// when none exists the defaults are used.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::load_from(path)?, Some(path.to_path_buf())));
        }

        for candidate in search_paths() {
            if candidate.is_file() {
                let config = Self::load_from(&candidate)?;
                return Ok((config, Some(candidate)));
            }
        }

        Ok((Self::default(), None))
    }

    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

/// Config locations probed by [`Config::discover`], in order
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join(CONFIG_DIR).join(CONFIG_FILE));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.workspace.root, PathBuf::from("."));
        assert!(config.enumerator.command.is_none());
        assert_eq!(config.llm.backend, LlmBackend::Ollama);
        assert_eq!(config.llm.endpoint, "http://localhost:11434");
        assert_eq!(config.speech.default_voice, "aura-asteria-en");
        assert_eq!(config.speech.api_key_env, "DEEPGRAM_API_KEY");
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config = Config::from_toml(
            r#"
[workspace]
root = "/srv/share"

[llm]
backend = "openai"
endpoint = "https://generativelanguage.googleapis.com/v1beta/openai"
model = "gemini-2.0-flash-001"
api_key_env = "GEMINI_API_KEY"

[enumerator]
command = "./file_lister.exe"
"#,
        )
        .unwrap();

        assert_eq!(config.workspace.root, PathBuf::from("/srv/share"));
        assert_eq!(config.llm.backend, LlmBackend::OpenAi);
        assert_eq!(config.llm.model, "gemini-2.0-flash-001");
        assert_eq!(config.llm.timeout_secs, 60);
        assert!(config.llm.enabled);
        assert_eq!(config.enumerator.command.as_deref(), Some("./file_lister.exe"));
        assert!(config.enumerator.args.is_empty());
        assert_eq!(config.speech.stt_model, "nova-2");
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = Config::default();
        config.log.level = "debug".to_string();
        let text = config.to_toml();
        let back = Config::from_toml(&text).unwrap();
        assert_eq!(back.log.level, "debug");
    }

    #[test]
    fn test_explicit_path_missing() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        let err = Config::discover(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }));
    }

    #[test]
    fn test_explicit_path_invalid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.toml");
        fs::write(&path, "[llm\nmodel = ").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_explicit_path_loaded() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("filewise.toml");
        fs::write(&path, "[speech]\ndefault_voice = \"aura-orion-en\"\n").unwrap();
        let (config, source) = Config::discover(Some(&path)).unwrap();
        assert_eq!(config.speech.default_voice, "aura-orion-en");
        assert_eq!(source, Some(path));
    }

    #[test]
    fn test_missing_key_env_is_none() {
        let settings = LlmSettings {
            api_key_env: Some("FILEWISE_TEST_KEY_THAT_IS_NOT_SET".to_string()),
            ..Default::default()
        };
        assert!(settings.api_key().is_none());
        assert!(LlmSettings::default().api_key().is_none());
    }
}
