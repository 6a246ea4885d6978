use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::GeminiSettings;

const API_KEY_HEADER: &str = "x-goog-api-key";
const MAX_ERROR_BODY: usize = 500;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI endpoint returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("AI request timed out after {0:?}")]
    Timeout(Duration),
    #[error("AI request failed: {0}")]
    Transport(String),
    #[error("AI response could not be decoded: {0}")]
    Decode(String),
}

impl AiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            AiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Client errors (4xx) and undecodable 2xx bodies will fail the same way
    /// again; everything else may be transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            AiError::Decode(_) => false,
            _ => !matches!(self.status(), Some(400..=499)),
        }
    }
}

/// One HTTP round trip to the generation endpoint.
#[async_trait]
pub trait AiTransport: Send + Sync {
    async fn post_prompt(
        &self,
        endpoint: &str,
        prompt: &str,
        timeout: Duration,
    ) -> Result<Value, AiError>;
}

/// Waits between retry attempts.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_prompt(prompt: &'a str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        }
    }
}

/// Gemini `generateContent` over HTTPS, authenticated with an API key header.
pub struct HttpTransport {
    client: Client,
    api_key: String,
}

impl HttpTransport {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl AiTransport for HttpTransport {
    async fn post_prompt(
        &self,
        endpoint: &str,
        prompt: &str,
        timeout: Duration,
    ) -> Result<Value, AiError> {
        let response = self
            .client
            .post(endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .timeout(timeout)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout(timeout)
                } else {
                    AiError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let mut message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            if message.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| message.is_char_boundary(*i))
                    .unwrap_or(0);
                message.truncate(cut);
            }
            return Err(AiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AiError::Decode(e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    /// Delay after the failed attempt with 0-based index `attempt`:
    /// initial, 2x initial, 4x initial, ...
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl From<&GeminiSettings> for RetryPolicy {
    fn from(settings: &GeminiSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            attempt_timeout: settings.attempt_timeout,
            initial_backoff: settings.initial_backoff,
        }
    }
}

/// Calls the generation endpoint, retrying transient failures with
/// exponential backoff. Attempts run strictly one after another.
pub struct GeminiClient {
    transport: Arc<dyn AiTransport>,
    delay: Arc<dyn Delay>,
    policy: RetryPolicy,
}

impl GeminiClient {
    pub fn new(transport: Arc<dyn AiTransport>, delay: Arc<dyn Delay>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            delay,
            policy,
        }
    }

    /// Returns the first successful response body, or the last error once a
    /// non-retryable failure occurs or attempts run out.
    pub async fn generate(&self, endpoint: &str, prompt: &str) -> Result<Value, AiError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            let err = match self
                .transport
                .post_prompt(endpoint, prompt, self.policy.attempt_timeout)
                .await
            {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            log::warn!(
                "Gemini attempt {} failed, status={}, msg={}",
                attempt + 1,
                err.status()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "none".to_string()),
                err
            );

            if !err.is_retryable() || attempt + 1 >= attempts {
                return Err(err);
            }

            self.delay.wait(self.policy.backoff(attempt)).await;
            attempt += 1;
        }
    }
}
