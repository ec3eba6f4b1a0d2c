//! ICSR Causality Core Library
//!
//! Plain data contracts for Individual Case Safety Report (ICSR) assessment.
//!
//! # Architecture
//!
//! ```text
//! Case form → CaseData ──► Prompt Formatter ──► LLM Gateway ──► provider
//!                                                    │
//!                                       validate-then-convert
//!                                                    │
//!                          AssessmentResult / InteractionResult
//! ```
//!
//! This crate holds only the values flowing through that pipeline. Prompt
//! construction, schemas and network access live in `icsr-llm`.
//!
//! # Modules
//!
//! - [`models`]: case input, causality assessments, drug interactions

pub mod models;

// Re-export commonly used types
pub use models::{
    collect_interaction_drugs, AdverseEvent, AssessmentResult, CaseData, CausalityCategory,
    DechallengeOutcome, DrugList, DrugListError, IndividualAssessment, InteractionPair,
    InteractionResult, RechallengeOutcome, Severity, SuspectDrug, Tone,
};
