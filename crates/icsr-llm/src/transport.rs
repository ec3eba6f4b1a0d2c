//! Provider transport abstraction.
//!
//! A transport turns one [`GenerateRequest`] into the raw text the model
//! produced. It knows nothing about schemas or result types.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use thiserror::Error;

/// One schema-constrained generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// Model identifier
    pub model: String,
    pub system_instruction: &'static str,
    pub prompt: String,
    /// Output schema in the provider's dialect
    pub response_schema: Value,
    /// Always `application/json` for structured tasks
    pub response_mime_type: &'static str,
    pub temperature: f32,
}

/// Transport failures.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("provider response contained no text{}", finish_reason_suffix(.reason))]
    EmptyResponse { reason: Option<String> },

    #[error("{0}")]
    Unclassified(Box<dyn std::error::Error + Send + Sync>),
}

pub type TransportResult<T> = Result<T, TransportError>;

fn finish_reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" (finish reason: {})", r))
        .unwrap_or_default()
}

/// Sends generation requests to an LLM provider.
#[async_trait]
pub trait LlmTransport: Send + Sync {
    /// Issue the request once and return the model's raw text.
    async fn generate(&self, request: &GenerateRequest) -> TransportResult<String>;

    /// Provider name for logging.
    fn provider_name(&self) -> &str;
}

/// In-process transport replaying scripted replies (for testing).
///
/// Every request is recorded so callers can assert what was sent and how
/// many calls were made.
#[derive(Default)]
pub struct StubTransport {
    replies: Mutex<VecDeque<StubReply>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

/// A scripted reply for [`StubTransport`].
#[derive(Debug, Clone)]
pub enum StubReply {
    Text(String),
    Status { status: u16, message: String },
    Empty,
    Unclassified(String),
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply; replies are consumed in order.
    pub fn push(&self, reply: StubReply) -> &Self {
        lock(&self.replies).push_back(reply);
        self
    }

    /// Queue a successful text reply.
    pub fn push_text(&self, text: impl Into<String>) -> &Self {
        self.push(StubReply::Text(text.into()))
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        lock(&self.requests).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait]
impl LlmTransport for StubTransport {
    async fn generate(&self, request: &GenerateRequest) -> TransportResult<String> {
        lock(&self.requests).push(request.clone());
        let reply = lock(&self.replies).pop_front();

        match reply {
            Some(StubReply::Text(text)) => Ok(text),
            Some(StubReply::Status { status, message }) => {
                Err(TransportError::Status { status, message })
            }
            Some(StubReply::Empty) => Err(TransportError::EmptyResponse { reason: None }),
            Some(StubReply::Unclassified(message)) => Err(TransportError::Unclassified(message.into())),
            None => Err(TransportError::Unclassified(
                "stub transport has no scripted reply".into(),
            )),
        }
    }

    fn provider_name(&self) -> &str {
        "stub"
    }
}

// A panicking test thread must not hide later assertions behind a poisoned lock
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
