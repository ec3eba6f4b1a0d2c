//! Gateway integration tests against a scripted transport.

use icsr_core::{CaseData, CausalityCategory, Severity, SuspectDrug};
use icsr_llm::{GatewayError, LlmGateway, StubReply, StubTransport, TaskKind};
use std::sync::Arc;

fn setup() -> (Arc<StubTransport>, LlmGateway) {
    let stub = Arc::new(StubTransport::new());
    let gateway = LlmGateway::with_transport("gemini-2.5-flash", stub.clone());
    (stub, gateway)
}

fn narrative_case() -> CaseData {
    CaseData {
        narrative: "A 70-year-old woman on warfarin started clarithromycin and developed an INR of 9.".into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_assessment_preserves_order_and_length() {
    let (stub, gateway) = setup();
    stub.push_text(
        r#"[
          {"drugName":"Clarithromycin","adverseEvent":"INR increased","causalityCategory":"Probable","rationale":"CYP3A4 inhibition."},
          {"drugName":"Warfarin","adverseEvent":"INR increased","causalityCategory":"Possible","rationale":"Direct effect."},
          {"drugName":"Paracetamol","adverseEvent":"INR increased","causalityCategory":"Unlikely","rationale":"Low dose."}
        ]"#,
    );

    let result = gateway.assess_causality(&narrative_case()).await.unwrap();
    let drugs: Vec<&str> = result.iter().map(|a| a.drug_name.as_str()).collect();
    assert_eq!(drugs, ["Clarithromycin", "Warfarin", "Paracetamol"]);
    assert_eq!(result[2].causality_category, CausalityCategory::Unlikely);
    assert_eq!(stub.call_count(), 1);
}

#[tokio::test]
async fn test_empty_assessment_is_not_an_error() {
    let (stub, gateway) = setup();
    stub.push_text("[]");
    let result = gateway.assess_causality(&narrative_case()).await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_empty_case_still_sent() {
    let (stub, gateway) = setup();
    stub.push_text("[]");
    gateway.assess_causality(&CaseData::default()).await.unwrap();

    let requests = stub.requests();
    assert!(requests[0].prompt.contains("- Dechallenge Outcome: Not provided"));
}

#[tokio::test]
async fn test_non_json_output_is_malformed() {
    let (stub, gateway) = setup();
    stub.push_text("The causality is probable.");

    let err = gateway.assess_causality(&narrative_case()).await.unwrap_err();
    assert!(matches!(
        err,
        GatewayError::MalformedOutput { task: TaskKind::Causality, .. }
    ));
    assert!(err.indicates_invalid_format());
    assert!(err.to_string().contains("The AI may have returned an invalid format."));
}

#[tokio::test]
async fn test_schema_violation_is_malformed() {
    let (stub, gateway) = setup();
    stub.push_text(r#"[{"drugA":"Warfarin","drugB":"Aspirin","severity":"Major"}]"#);

    let err = gateway
        .check_interactions(&["Warfarin", "Aspirin"])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GatewayError::MalformedOutput { task: TaskKind::Interaction, .. }
    ));
    assert!(err.to_string().contains("'description'"));
}

#[tokio::test]
async fn test_transport_failure_distinct_from_format_failure() {
    let (stub, gateway) = setup();
    stub.push(StubReply::Status {
        status: 500,
        message: "Internal error encountered.".into(),
    });

    let err = gateway.assess_causality(&narrative_case()).await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport { .. }));
    assert!(!err.indicates_invalid_format());
    assert_eq!(
        err.to_string(),
        "Failed to get assessment from AI: provider returned HTTP 500: Internal error encountered."
    );
}

#[tokio::test]
async fn test_no_retry_after_failure() {
    let (stub, gateway) = setup();
    stub.push(StubReply::Empty).push_text("[]");

    assert!(gateway.assess_causality(&narrative_case()).await.is_err());
    assert_eq!(stub.call_count(), 1);

    // The next call is a fresh request, not a replay
    assert!(gateway.assess_causality(&narrative_case()).await.unwrap().is_empty());
    assert_eq!(stub.call_count(), 2);
}

#[tokio::test]
async fn test_identical_requests_are_not_cached() {
    let (stub, gateway) = setup();
    stub.push_text("[]").push_text("[]");
    gateway.check_interactions(&["Warfarin", "Aspirin"]).await.unwrap();
    gateway.check_interactions(&["Warfarin", "Aspirin"]).await.unwrap();
    assert_eq!(stub.call_count(), 2);
}

#[tokio::test]
async fn test_interaction_dedup_proceeds() {
    let (stub, gateway) = setup();
    stub.push_text(
        r#"[{"drugA":"Warfarin","drugB":"Aspirin","severity":"Major","description":"Increased bleeding risk; avoid or monitor closely."}]"#,
    );

    let result = gateway
        .check_interactions(&["Warfarin", "Warfarin", "Aspirin"])
        .await
        .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].severity, Severity::Major);
    assert_eq!(stub.call_count(), 1);
}

#[tokio::test]
async fn test_too_few_drugs_never_calls_provider() {
    let (stub, gateway) = setup();
    let empty: [&str; 0] = [];
    assert!(gateway.check_interactions(&empty).await.unwrap().is_empty());
    assert!(gateway.check_interactions(&["Aspirin"]).await.unwrap().is_empty());
    assert!(gateway
        .check_interactions(&["Aspirin", " Aspirin ", "  "])
        .await
        .unwrap()
        .is_empty());
    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn test_spelling_variants_are_checked() {
    let (stub, gateway) = setup();
    stub.push_text("[]");
    let result = gateway
        .check_interactions(&["Aspirin", "ASPIRIN "])
        .await
        .unwrap();
    assert!(result.is_empty());
    assert_eq!(stub.call_count(), 1);
}

#[tokio::test]
async fn test_concurrent_calls_are_independent() {
    let (stub, gateway) = setup();
    // Both replies are valid for either task, so scheduling order does not matter
    stub.push_text("[]").push_text("[]");

    let case = CaseData {
        suspect_drugs: vec![SuspectDrug::new("Warfarin")],
        ..narrative_case()
    };
    let (assessment, interactions) = tokio::join!(
        gateway.assess_causality(&case),
        gateway.check_interactions(&["Warfarin", "Clarithromycin"]),
    );
    assert!(assessment.unwrap().is_empty());
    assert!(interactions.unwrap().is_empty());

    let mut temperatures: Vec<f32> = stub.requests().iter().map(|r| r.temperature).collect();
    temperatures.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(temperatures, [0.2, 0.3]);
}
