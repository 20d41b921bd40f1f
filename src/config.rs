//! YAML configuration for the backend, retry policy, fetcher, pipeline and feeds.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! usable configuration apart from the API key. The configuration is loaded
//! and validated once in `main` and then passed explicitly to the components
//! that need it.
//!
//! ```yaml
//! backend:
//!   api_base: https://generativelanguage.googleapis.com/v1beta/openai
//!   model: gemini-2.5-flash-lite
//! retry:
//!   attempts: 5
//!   initial_delay_secs: 1.0
//!   exp_base: 7.0
//! pipeline:
//!   category_concurrency: 4
//! ```

use crate::error::ConfigError;
use crate::feeds::{FeedSource, default_feeds};
use crate::prompts::{SELECTOR_INSTRUCTION, SUMMARIZER_INSTRUCTION};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub retry: RetryConfig,
    pub fetch: FetchConfig,
    pub pipeline: PipelineConfig,
    pub instructions: InstructionConfig,
    pub email: EmailConfig,
    pub feeds: Vec<FeedSource>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            retry: RetryConfig::default(),
            fetch: FetchConfig::default(),
            pipeline: PipelineConfig::default(),
            instructions: InstructionConfig::default(),
            email: EmailConfig::default(),
            feeds: default_feeds(),
        }
    }
}

/// OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL; `/chat/completions` is appended.
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            api_key: None,
            model: "gemini-2.5-flash-lite".to_string(),
            max_tokens: None,
            temperature: None,
            request_timeout_secs: 60,
        }
    }
}

/// Retry policy for transient backend failures.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub attempts: usize,
    pub initial_delay_secs: f64,
    pub exp_base: f64,
    pub max_delay_secs: f64,
    pub jitter_ms: u64,
    /// HTTP statuses treated as transient.
    pub status_codes: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 5,
            initial_delay_secs: 1.0,
            exp_base: 7.0,
            max_delay_secs: 60.0,
            jitter_ms: 250,
            status_codes: vec![429, 500, 503, 504],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Maximum characters of extracted body text kept per page.
    pub max_chars: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: "Mozilla/5.0".to_string(),
            max_chars: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Titles shown to the selector, counted from the start of the pool.
    pub max_candidates: usize,
    /// Characters of article content included in a summary prompt.
    pub prompt_content_chars: usize,
    pub category_concurrency: usize,
    pub summary_concurrency: usize,
    pub category_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_candidates: 20,
            prompt_content_chars: 3000,
            category_concurrency: 4,
            summary_concurrency: 1,
            category_timeout_secs: 300,
        }
    }
}

/// System instructions bound to each judgment profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InstructionConfig {
    pub selection: String,
    pub summarization: String,
}

impl Default for InstructionConfig {
    fn default() -> Self {
        Self {
            selection: SELECTOR_INSTRUCTION.to_string(),
            summarization: SUMMARIZER_INSTRUCTION.to_string(),
        }
    }
}

/// SMTP delivery of the finished newsletter. Only read when sending.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmailConfig {
    pub smtp_server: String,
    /// STARTTLS submission port.
    pub smtp_port: u16,
    pub sender_email: Option<String>,
    pub sender_password: Option<String>,
    pub recipients: Vec<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            sender_email: None,
            sender_password: None,
            recipients: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or return the defaults when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&raw)?;
        info!(path = %path.display(), feeds = config.feeds.len(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Check every setting the run depends on. Called once at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend.validate()?;
        self.retry.validate()?;

        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::invalid("fetch.timeout_secs", "must be positive"));
        }
        let p = &self.pipeline;
        if p.max_candidates < 2 {
            return Err(ConfigError::invalid(
                "pipeline.max_candidates",
                "must be at least 2",
            ));
        }
        if p.category_concurrency == 0 || p.summary_concurrency == 0 {
            return Err(ConfigError::invalid(
                "pipeline.*_concurrency",
                "must be at least 1",
            ));
        }
        if p.category_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "pipeline.category_timeout_secs",
                "must be positive",
            ));
        }
        Ok(())
    }
}

impl BackendConfig {
    /// The validated API key.
    pub fn credential(&self) -> Result<&str, ConfigError> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ConfigError::MissingCredential),
        }
    }

    /// Full URL of the chat completion endpoint.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        self.url_for("chat/completions")
    }

    /// Full URL of the model listing, used to check the credential.
    pub fn models_endpoint(&self) -> Result<Url, ConfigError> {
        self.url_for("models")
    }

    fn url_for(&self, route: &str) -> Result<Url, ConfigError> {
        let raw = format!("{}/{route}", self.api_base.trim_end_matches('/'));
        let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidEndpoint {
            url: self.api_base.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint {
                url: self.api_base.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.credential()?;
        self.endpoint()?;
        if self.model.trim().is_empty() {
            return Err(ConfigError::invalid("backend.model", "must not be empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "backend.request_timeout_secs",
                "must be positive",
            ));
        }
        Ok(())
    }
}

/// Longest configurable wait between two attempts.
pub const MAX_RETRY_DELAY_SECS: f64 = 3600.0;

fn delay_in_range(secs: f64) -> bool {
    secs.is_finite() && (0.0..=MAX_RETRY_DELAY_SECS).contains(&secs)
}

impl RetryConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.attempts == 0 {
            return Err(ConfigError::invalid("retry.attempts", "must be at least 1"));
        }
        if !delay_in_range(self.initial_delay_secs) {
            return Err(ConfigError::invalid(
                "retry.initial_delay_secs",
                format!("must be between 0 and {MAX_RETRY_DELAY_SECS} seconds"),
            ));
        }
        if !(self.exp_base.is_finite() && self.exp_base >= 1.0) {
            return Err(ConfigError::invalid("retry.exp_base", "must be at least 1"));
        }
        if !delay_in_range(self.max_delay_secs) {
            return Err(ConfigError::invalid(
                "retry.max_delay_secs",
                format!("must be between 0 and {MAX_RETRY_DELAY_SECS} seconds"),
            ));
        }
        Ok(())
    }
}
