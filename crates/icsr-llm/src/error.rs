//! Gateway error taxonomy.
//!
//! Display output is the message shown to the end user, verbatim.

use crate::config::ConfigError;
use crate::response::ResponseError;
use crate::transport::TransportError;
use std::fmt;
use thiserror::Error;

/// Which structured task a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Causality,
    Interaction,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Causality => "causality",
            TaskKind::Interaction => "interaction",
        }
    }

    /// Lead-in for user-facing failure messages.
    pub fn failure_prefix(&self) -> &'static str {
        match self {
            TaskKind::Causality => "Failed to get assessment from AI",
            TaskKind::Interaction => "Failed to get interaction data from AI",
        }
    }

    pub fn unknown_failure_message(&self) -> &'static str {
        match self {
            TaskKind::Causality => "An unknown error occurred during AI assessment.",
            TaskKind::Interaction => "An unknown error occurred during AI interaction check.",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hint appended whenever the model output could not be used.
pub const INVALID_FORMAT_HINT: &str = ". The AI may have returned an invalid format.";

/// Everything that can go wrong between the caller and the provider.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{0}")]
    Configuration(#[from] ConfigError),

    #[error("{}: {}{}", .task.failure_prefix(), .message, json_hint(.message))]
    Transport { task: TaskKind, message: String },

    #[error("{}: {}{}", .task.failure_prefix(), .message, INVALID_FORMAT_HINT)]
    MalformedOutput { task: TaskKind, message: String },

    #[error("{}", .task.unknown_failure_message())]
    Unknown { task: TaskKind },
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    pub fn from_transport(task: TaskKind, err: TransportError) -> Self {
        match err {
            TransportError::Unclassified(_) => GatewayError::Unknown { task },
            other => GatewayError::Transport {
                task,
                message: other.to_string(),
            },
        }
    }

    pub fn from_response(task: TaskKind, err: ResponseError) -> Self {
        GatewayError::MalformedOutput {
            task,
            message: err.to_string(),
        }
    }

    /// Whether the user can simply try again. Only configuration errors are final.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, GatewayError::Configuration(_))
    }

    /// Whether the message tells the user the model output was unusable.
    pub fn indicates_invalid_format(&self) -> bool {
        self.to_string().ends_with(INVALID_FORMAT_HINT)
    }
}

/// Provider messages that mention JSON usually mean the output was unusable.
fn json_hint(message: &str) -> &'static str {
    if message.to_lowercase().contains("json") {
        INVALID_FORMAT_HINT
    } else {
        ""
    }
}
