//! Prompt contract and LLM gateway for ICSR causality assessment.
//!
//! This crate turns a [`icsr_core::CaseData`] into a schema-constrained
//! request to Google Gemini and validates the JSON that comes back.
//!
//! # Modules
//!
//! - [`prompts`]: system instructions and prompt formatting
//! - [`schema`]: declarative output schemas
//! - [`response`]: validate-then-convert of model output
//! - [`gateway`]: the structured-task runner and its two tasks
//! - [`transport`] / [`gemini`]: provider access
//! - [`config`]: startup configuration
//! - [`error`]: failure classification
//! - [`form`]: case form checks and report rendering for `icsr-assess`

pub mod config;
pub mod error;
pub mod form;
pub mod gateway;
pub mod gemini;
pub mod prompts;
pub mod response;
pub mod schema;
pub mod transport;

pub use config::{ApiKey, ConfigError, GatewayConfig, Settings};
pub use error::{GatewayError, GatewayResult, TaskKind};
pub use gateway::{LlmGateway, StructuredTask, CAUSALITY_TASK, INTERACTION_TASK};
pub use prompts::{make_causality_prompt, make_interaction_prompt};
pub use response::{parse_assessment_response, parse_interaction_response, ResponseError};
pub use transport::{GenerateRequest, LlmTransport, StubReply, StubTransport, TransportError};
