//! LLM gateway: the only component that talks to the provider.
//!
//! Both operations run through one structured-task pipeline:
//!
//! ```text
//! prompt ─► GenerateRequest ─► transport ─► raw text ─► validate ─► Vec<T>
//! ```
//!
//! Each call sends exactly one request. There are no retries and no caching.

use crate::config::{ConfigError, GatewayConfig};
use crate::error::{GatewayError, GatewayResult, TaskKind};
use crate::gemini::GeminiTransport;
use crate::prompts::{
    make_causality_prompt, make_interaction_prompt, CAUSALITY_SYSTEM_PROMPT,
    INTERACTION_SYSTEM_PROMPT,
};
use crate::response::parse_validated;
use crate::schema::{ArraySchema, CAUSALITY_ASSESSMENT_SCHEMA, DRUG_INTERACTION_SCHEMA};
use crate::transport::{GenerateRequest, LlmTransport, TransportError};
use icsr_core::{AssessmentResult, CaseData, DrugList, InteractionResult};
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};

pub const JSON_MIME_TYPE: &str = "application/json";

/// Fixed configuration of one schema-constrained LLM task.
#[derive(Debug, Clone, Copy)]
pub struct StructuredTask {
    pub kind: TaskKind,
    pub system_instruction: &'static str,
    pub schema: &'static ArraySchema,
    pub temperature: f32,
}

/// Causality assessment: conservative sampling for clinical output.
pub const CAUSALITY_TASK: StructuredTask = StructuredTask {
    kind: TaskKind::Causality,
    system_instruction: CAUSALITY_SYSTEM_PROMPT,
    schema: &CAUSALITY_ASSESSMENT_SCHEMA,
    temperature: 0.2,
};

pub const INTERACTION_TASK: StructuredTask = StructuredTask {
    kind: TaskKind::Interaction,
    system_instruction: INTERACTION_SYSTEM_PROMPT,
    schema: &DRUG_INTERACTION_SCHEMA,
    temperature: 0.3,
};

impl StructuredTask {
    pub fn request(&self, model: &str, prompt: String) -> GenerateRequest {
        GenerateRequest {
            model: model.to_string(),
            system_instruction: self.system_instruction,
            prompt,
            response_schema: self.schema.to_provider_schema(),
            response_mime_type: JSON_MIME_TYPE,
            temperature: self.temperature,
        }
    }
}

/// Gateway to the LLM provider.
///
/// Cheap to clone; clones share the transport. Holds no per-call state, so
/// concurrent calls are independent.
#[derive(Clone)]
pub struct LlmGateway {
    transport: Arc<dyn LlmTransport>,
    model: String,
}

impl LlmGateway {
    /// Create a gateway backed by the Gemini API.
    pub fn new(config: &GatewayConfig) -> GatewayResult<Self> {
        let transport = GeminiTransport::new(config).map_err(client_init_error)?;
        Ok(Self::with_transport(config.model.clone(), Arc::new(transport)))
    }

    /// Create a gateway over any transport (stubs, other providers).
    pub fn with_transport(model: impl Into<String>, transport: Arc<dyn LlmTransport>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }

    /// Assess causality for every drug-event pair the model identifies.
    ///
    /// No preconditions are checked here; an empty case is sent as an
    /// all-"Not provided" prompt.
    pub async fn assess_causality(&self, case: &CaseData) -> GatewayResult<AssessmentResult> {
        let prompt = make_causality_prompt(case);
        self.run_task(&CAUSALITY_TASK, prompt).await
    }

    /// Check a drug list for interactions.
    ///
    /// Fewer than two distinct names (after trimming) returns an empty result
    /// without contacting the provider.
    pub async fn check_interactions<S: AsRef<str>>(
        &self,
        drugs: &[S],
    ) -> GatewayResult<InteractionResult> {
        let drugs = match DrugList::new(drugs) {
            Ok(list) => list,
            Err(e) => {
                info!(reason = %e, "skipping interaction check");
                return Ok(Vec::new());
            }
        };
        let prompt = make_interaction_prompt(&drugs);
        self.run_task(&INTERACTION_TASK, prompt).await
    }

    /// Send one structured task and validate the answer against its schema.
    pub async fn run_task<T: DeserializeOwned>(
        &self,
        task: &StructuredTask,
        prompt: String,
    ) -> GatewayResult<Vec<T>> {
        let span = info_span!(
            "llm_task",
            task = %task.kind,
            request_id = %uuid::Uuid::new_v4(),
            prompt = %prompt_fingerprint(&prompt),
            provider = self.transport.provider_name(),
        );

        self.execute(task, prompt).instrument(span).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        task: &StructuredTask,
        prompt: String,
    ) -> GatewayResult<Vec<T>> {
        let request = task.request(&self.model, prompt);
        info!(model = %self.model, temperature = task.temperature, "calling provider");

        let text = self.transport.generate(&request).await.map_err(|e| {
            error!(error = %e, "provider call failed");
            GatewayError::from_transport(task.kind, e)
        })?;

        let items = parse_validated::<T>(&text, task.schema).map_err(|e| {
            error!(error = %e, response_len = text.len(), "model output failed validation");
            GatewayError::from_response(task.kind, e)
        })?;

        info!(items = items.len(), "task completed");
        Ok(items)
    }
}

/// Client construction happens before any task runs, so it carries no task prefix.
fn client_init_error(err: TransportError) -> GatewayError {
    GatewayError::Configuration(ConfigError::HttpClient(err.to_string()))
}

/// Short stable digest for correlating log lines without logging case content.
pub fn prompt_fingerprint(prompt: &str) -> String {
    let digest = Sha256::digest(prompt.as_bytes());
    hex::encode(&digest[..6])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{StubReply, StubTransport};
    use icsr_core::{AdverseEvent, CausalityCategory, SuspectDrug};

    fn gateway(stub: &Arc<StubTransport>) -> LlmGateway {
        LlmGateway::with_transport("test-model", stub.clone())
    }

    #[tokio::test]
    async fn test_causality_request_contract() {
        let stub = Arc::new(StubTransport::new());
        stub.push_text(
            r#"[{"drugName":"Atorvastatin","adverseEvent":"Myalgia","causalityCategory":"Possible","rationale":"r"}]"#,
        );

        let case = CaseData {
            suspect_drugs: vec![SuspectDrug::new("Atorvastatin")],
            adverse_events: vec![AdverseEvent::new("Myalgia")],
            ..Default::default()
        };
        let result = gateway(&stub).assess_causality(&case).await.unwrap();
        assert_eq!(result[0].causality_category, CausalityCategory::Possible);

        let requests = stub.requests();
        let sent = &requests[0];
        assert_eq!(sent.model, "test-model");
        assert_eq!(sent.system_instruction, CAUSALITY_SYSTEM_PROMPT);
        assert_eq!(sent.prompt, make_causality_prompt(&case));
        assert_eq!(sent.response_schema, CAUSALITY_ASSESSMENT_SCHEMA.to_provider_schema());
        assert_eq!(sent.response_mime_type, "application/json");
        assert_eq!(sent.temperature, 0.2);
    }

    #[tokio::test]
    async fn test_interaction_request_contract() {
        let stub = Arc::new(StubTransport::new());
        stub.push_text("[]");

        let result = gateway(&stub)
            .check_interactions(&["Warfarin", "Warfarin", "Aspirin"])
            .await
            .unwrap();
        assert!(result.is_empty());

        let requests = stub.requests();
        let sent = &requests[0];
        assert_eq!(sent.system_instruction, INTERACTION_SYSTEM_PROMPT);
        assert!(sent.prompt.ends_with(": Warfarin, Aspirin"));
        assert_eq!(sent.temperature, 0.3);
    }

    #[tokio::test]
    async fn test_single_drug_short_circuits() {
        let stub = Arc::new(StubTransport::new());
        let result = gateway(&stub)
            .check_interactions(&["Warfarin", " Warfarin "])
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_case_variants_reach_provider() {
        let stub = Arc::new(StubTransport::new());
        stub.push_text("[]");
        gateway(&stub)
            .check_interactions(&["Warfarin", "WARFARIN"])
            .await
            .unwrap();
        assert_eq!(stub.call_count(), 1);
        assert!(stub.requests()[0].prompt.ends_with(": Warfarin, WARFARIN"));
    }

    #[tokio::test]
    async fn test_unknown_error() {
        let stub = Arc::new(StubTransport::new());
        stub.push(StubReply::Unclassified("socket closed".into()));
        let err = gateway(&stub)
            .assess_causality(&CaseData::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "An unknown error occurred during AI assessment.");
    }

    #[test]
    fn test_client_init_error_has_no_task() {
        let err = client_init_error(TransportError::Unclassified("no TLS backend".into()));
        assert!(matches!(
            err,
            GatewayError::Configuration(ConfigError::HttpClient(_))
        ));
        assert_eq!(
            err.to_string(),
            "Could not initialise the HTTP client: no TLS backend"
        );
        assert!(!err.to_string().starts_with("Failed to get assessment"));
    }

    #[test]
    fn test_prompt_fingerprint() {
        let a = prompt_fingerprint("Please assess");
        assert_eq!(a.len(), 12);
        assert_eq!(a, prompt_fingerprint("Please assess"));
        assert_ne!(a, prompt_fingerprint("Please assess."));
    }
}
