//! LLM Client Abstraction
//!
//! One prompt in, free text out. Supports an Ollama backend and any
//! OpenAI-compatible chat endpoint, plus a fake client for tests.

use anyhow::Result;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

use crate::config::{LlmBackend, LlmSettings};

/// LLM errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("LLM is disabled in configuration")]
    Disabled,

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("LLM returned empty response")]
    EmptyResponse,
}

/// Generic LLM client trait
pub trait LlmClient: Send + Sync {
    /// Send one prompt and return the model's answer text
    fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Real LLM client implementation using HTTP
pub struct HttpLlmClient {
    settings: LlmSettings,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpLlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            api_key: settings.api_key(),
            settings,
            client,
        })
    }

    fn endpoint(&self) -> &str {
        self.settings.endpoint.trim_end_matches('/')
    }

    fn send_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.settings.timeout_secs)
        } else {
            LlmError::HttpError(format!("Request failed: {}", e))
        }
    }

    /// Ollama `/api/generate`, non-streaming
    fn call_ollama(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint());

        let request_body = serde_json::json!({
            "model": self.settings.model,
            "prompt": prompt,
            "stream": false,
        });

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .map_err(|e| self.send_error(e))?;

        if !response.status().is_success() {
            return Err(LlmError::HttpError(format!(
                "HTTP {} from Ollama",
                response.status()
            )));
        }

        let response_json: serde_json::Value = response
            .json()
            .map_err(|e| LlmError::InvalidJson(format!("Failed to parse response: {}", e)))?;

        extract_ollama_text(&response_json)
    }

    /// OpenAI-compatible `/chat/completions`
    fn call_openai_compatible(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.endpoint());

        let request_body = serde_json::json!({
            "model": self.settings.model,
            "messages": [
                {"role": "user", "content": prompt},
            ],
        });

        let mut request = self.client.post(&url).json(&request_body);

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().map_err(|e| self.send_error(e))?;

        if !response.status().is_success() {
            return Err(LlmError::HttpError(format!(
                "HTTP {} from OpenAI-compatible API",
                response.status()
            )));
        }

        let response_json: serde_json::Value = response
            .json()
            .map_err(|e| LlmError::InvalidJson(format!("Failed to parse response: {}", e)))?;

        extract_openai_text(&response_json)
    }
}

impl LlmClient for HttpLlmClient {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        if !self.settings.enabled {
            return Err(LlmError::Disabled);
        }

        debug!(
            backend = self.settings.backend.as_str(),
            model = %self.settings.model,
            prompt_len = prompt.len(),
            "calling language model"
        );

        match self.settings.backend {
            LlmBackend::Ollama => self.call_ollama(prompt),
            LlmBackend::OpenAi => self.call_openai_compatible(prompt),
        }
    }
}

fn non_empty(text: Option<&str>) -> Result<String, LlmError> {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => Ok(t.to_string()),
        _ => Err(LlmError::EmptyResponse),
    }
}

fn extract_ollama_text(body: &serde_json::Value) -> Result<String, LlmError> {
    non_empty(body.get("response").and_then(|v| v.as_str()))
}

fn extract_openai_text(body: &serde_json::Value) -> Result<String, LlmError> {
    non_empty(
        body.get("choices")
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("message"))
            .and_then(|v| v.get("content"))
            .and_then(|v| v.as_str()),
    )
}

/// Fake LLM client for testing
pub struct FakeLlmClient {
    responses: Mutex<Vec<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeLlmClient {
    /// Create a fake client with pre-defined responses
    pub fn new(responses: Vec<Result<String, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always_answer(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn always_error(error: LlmError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Get the number of calls made
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Most recent prompt received
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

impl LlmClient for FakeLlmClient {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        if responses.len() == 1 {
            // Keep returning the same response
            responses[0].clone()
        } else {
            responses.remove(0)
        }
    }
}

impl<C: LlmClient + ?Sized> LlmClient for std::sync::Arc<C> {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).generate(prompt)
    }
}
