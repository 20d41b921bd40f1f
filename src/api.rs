//! Judgment client: one stateless round trip to a text-generation backend.
//!
//! The module is layered the same way at every level:
//! - [`AskAsync`]: send a system instruction plus a user prompt, get a response
//! - [`ChatBackend`]: [`AskAsync`] over an OpenAI-compatible `/chat/completions` endpoint
//! - [`RetryAsk`]: decorator adding bounded exponential backoff for transient failures
//! - [`JudgmentClient`]: binds an instruction to each [`Profile`] and implements [`Judge`]
//!
//! Callers only ever see [`Judge::judge`], which has no session state and
//! cannot fail: every failure degrades to an empty string.
//!
//! # Retry Strategy
//!
//! ```text
//! delay(n) = min(initial_delay * exp_base^(n-1), max_delay) + random_jitter
//! ```
//!
//! With the defaults (5 attempts, 1 s, base 7, 60 s cap) the waits are
//! 1 s, 7 s, 49 s and 60 s. Only statuses in the configured list (429, 500,
//! 503 and 504) and transport failures are retried.

use crate::config::{BackendConfig, Config, InstructionConfig, MAX_RETRY_DELAY_SECS, RetryConfig};
use crate::error::{BackendError, ConfigError};
use crate::utils::truncate_for_log;
use rand::{Rng, rng};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Which system instruction a judgment call runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    /// Pick the two most newsworthy titles from a list.
    Selection,
    /// Summarize one article in three lines.
    Summarization,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Selection => "selection",
            Self::Summarization => "summarization",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single judgment call. Implementations return an empty string instead of failing.
pub trait Judge {
    async fn judge(&self, profile: Profile, prompt: &str) -> String;
}

/// Trait for async LLM interaction.
///
/// This abstraction allows for different backends or decorators (like retry logic).
pub trait AskAsync {
    /// The type of response returned by the backend.
    type Response;

    /// Send `text` under the `system` instruction and wait for the response.
    async fn ask(&self, system: &str, text: &str) -> Result<Self::Response, BackendError>;
}

/// Bounded exponential backoff applied by [`RetryAsk`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: usize,
    pub initial_delay: Duration,
    pub exp_base: f64,
    pub max_delay: Duration,
    /// Upper bound of the random delay added to every wait.
    pub jitter: Duration,
    pub status_codes: Vec<u16>,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            attempts: config.attempts.max(1),
            initial_delay: bounded_delay(config.initial_delay_secs),
            exp_base: config.exp_base,
            max_delay: bounded_delay(config.max_delay_secs),
            jitter: Duration::from_millis(config.jitter_ms),
            status_codes: config.status_codes.clone(),
        }
    }

    /// Wait before the next attempt after `failed` attempts have failed (`failed >= 1`).
    pub fn delay_for(&self, failed: usize) -> Duration {
        let exponent = failed.saturating_sub(1).min(i32::MAX as usize) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.exp_base.powi(exponent);
        let capped = secs.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped.max(0.0))
    }

    /// Whether `err` belongs to a transient failure class.
    pub fn is_retryable(&self, err: &BackendError) -> bool {
        match err {
            BackendError::Status { status, .. } => self.status_codes.contains(status),
            BackendError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            BackendError::Decode(_) => false,
        }
    }

    fn jitter(&self) -> Duration {
        let max_ms = self.jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        let jitter_ms: u64 = rng().random_range(0..=max_ms);
        Duration::from_millis(jitter_ms)
    }
}

/// `secs` as a [`Duration`], clamped to `0..=MAX_RETRY_DELAY_SECS`.
fn bounded_delay(secs: f64) -> Duration {
    let max = Duration::from_secs_f64(MAX_RETRY_DELAY_SECS);
    Duration::try_from_secs_f64(secs.max(0.0)).map_or(max, |d| d.min(max))
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`AskAsync`] implementation.
///
/// Permanent failures are returned immediately; transient ones are retried
/// until the attempt budget of the [`RetryPolicy`] is spent.
pub struct RetryAsk<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    /// Wrap an [`AskAsync`] backend with retry logic.
    ///
    /// # Arguments
    ///
    /// * `inner` - The backend that performs a single attempt
    /// * `policy` - Attempt budget, backoff curve and retryable statuses
    ///
    /// # Returns
    ///
    /// A new `RetryAsk` that retries only the failures `policy` classifies as
    /// transient.
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("policy", &self.policy)
            .finish()
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync,
{
    type Response = T::Response;

    #[instrument(level = "debug", skip_all)]
    async fn ask(&self, system: &str, text: &str) -> Result<Self::Response, BackendError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            attempt += 1;
            let attempt_t0 = Instant::now();
            match self.inner.ask(system, text).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if !self.policy.is_retryable(&e) {
                        error!(
                            attempt,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                            error = %e,
                            "ask() failed permanently; not retrying"
                        );
                        return Err(e);
                    }

                    if attempt >= self.policy.attempts {
                        error!(
                            attempt,
                            max = self.policy.attempts,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "ask() exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.policy.delay_for(attempt) + self.policy.jitter();
                    warn!(
                        attempt,
                        max = self.policy.attempts,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "ask() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// [`AskAsync`] over an OpenAI-compatible chat completion endpoint.
///
/// Each request carries exactly one system and one user message, so no
/// conversation state survives between calls.
#[derive(Debug, Clone)]
pub struct ChatBackend {
    client: Client,
    endpoint: Url,
    models_endpoint: Url,
    api_key: String,
    model: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl ChatBackend {
    pub fn from_config(backend: &BackendConfig) -> Result<Self, ConfigError> {
        let api_key = backend.credential()?.to_string();
        let endpoint = backend.endpoint()?;
        let models_endpoint = backend.models_endpoint()?;
        let client = Client::builder()
            .timeout(backend.request_timeout())
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            client,
            endpoint,
            models_endpoint,
            api_key,
            model: backend.model.clone(),
            max_tokens: backend.max_tokens,
            temperature: backend.temperature,
        })
    }
}

impl ChatBackend {
    /// Check the API key once with a `GET {api_base}/models`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RejectedCredential`] on 401 or 403. Any other
    /// failure (unreachable host, backend without a model listing) is only
    /// logged, since the retrying judgment calls handle transient trouble.
    #[instrument(level = "info", skip_all, fields(url = %self.models_endpoint))]
    pub async fn verify_credential(&self) -> Result<(), ConfigError> {
        let response = match self
            .client
            .get(self.models_endpoint.clone())
            .bearer_auth(&self.api_key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Could not reach backend to check credential; continuing");
                return Ok(());
            }
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            error!(status = status.as_u16(), "Backend rejected the API key");
            return Err(ConfigError::RejectedCredential {
                status: status.as_u16(),
            });
        }
        if status.is_success() {
            info!("Backend accepted the API key");
        } else {
            warn!(status = status.as_u16(), "Credential check inconclusive; continuing");
        }
        Ok(())
    }
}

impl AskAsync for ChatBackend {
    /// Concatenated text of every choice, `None` when the backend sent no text.
    type Response = Option<String>;

    #[instrument(level = "debug", skip_all, fields(model = %self.model))]
    async fn ask(&self, system: &str, text: &str) -> Result<Self::Response, BackendError> {
        let t0 = Instant::now();
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "API call failed"
            );
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&body, 300),
            });
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        let text: String = completion
            .choices
            .into_iter()
            .filter_map(|choice| choice.message.and_then(|m| m.content))
            .collect();

        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            bytes = text.len(),
            "Chat completion received"
        );
        Ok(if text.is_empty() { None } else { Some(text) })
    }
}

/// The [`Judge`] used by the pipeline: one instruction per [`Profile`] over any
/// [`AskAsync`] transport.
pub struct JudgmentClient<T = RetryAsk<ChatBackend>> {
    asker: T,
    instructions: InstructionConfig,
}

impl JudgmentClient<RetryAsk<ChatBackend>> {
    /// Validate `config` and build the production client.
    ///
    /// Once it returns `Ok` and [`Self::verify_credential`] has passed,
    /// judgment calls never fail.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let backend = ChatBackend::from_config(&config.backend)?;
        let policy = RetryPolicy::from_config(&config.retry);
        info!(
            model = %config.backend.model,
            endpoint = %backend.endpoint,
            attempts = policy.attempts,
            "Judgment client ready"
        );
        Ok(Self::new(
            RetryAsk::new(backend, policy),
            config.instructions.clone(),
        ))
    }
}

impl JudgmentClient<RetryAsk<ChatBackend>> {
    /// Make sure the backend accepts the configured key before any work starts.
    pub async fn verify_credential(&self) -> Result<(), ConfigError> {
        self.asker.inner.verify_credential().await
    }
}

impl<T> JudgmentClient<T> {
    pub fn new(asker: T, instructions: InstructionConfig) -> Self {
        Self {
            asker,
            instructions,
        }
    }

    fn instruction(&self, profile: Profile) -> &str {
        match profile {
            Profile::Selection => &self.instructions.selection,
            Profile::Summarization => &self.instructions.summarization,
        }
    }
}

impl<T> fmt::Debug for JudgmentClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JudgmentClient").finish_non_exhaustive()
    }
}

impl<T> Judge for JudgmentClient<T>
where
    T: AskAsync<Response = Option<String>>,
{
    #[instrument(level = "info", skip_all, fields(%profile))]
    async fn judge(&self, profile: Profile, prompt: &str) -> String {
        let t0 = Instant::now();
        match self.asker.ask(self.instruction(profile), prompt).await {
            Ok(Some(text)) => {
                info!(
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    response_preview = %truncate_for_log(&text, 120),
                    "Judgment succeeded"
                );
                text
            }
            Ok(None) => {
                warn!("Judgment returned no text");
                String::new()
            }
            Err(e) => {
                error!(elapsed_ms = t0.elapsed().as_millis() as u64, error = %e, "Judgment failed");
                String::new()
            }
        }
    }
}
