//! Prompts for causality assessment and interaction checking.
//!
//! Prompt text is a pure function of its input, so the same case always
//! produces the same prompt.

use icsr_core::{AdverseEvent, CaseData, DrugList, SuspectDrug};

/// System prompt for the causality assessment task.
pub const CAUSALITY_SYSTEM_PROMPT: &str = r#"You are a world-class drug safety physician and pharmacovigilance expert. Your task is to assess the causality of an adverse drug reaction based on the provided Individual Case Safety Report (ICSR) details.

You will be given case information in one of two formats:
1.  A free-text "Case Narrative".
2.  A set of structured data fields.

**IMPORTANT: If a "Case Narrative" is provided, you MUST prioritize it as the single source of truth.** You are expected to intelligently extract all relevant information (suspected drugs, adverse events, timelines, patient history, etc.) directly from the narrative to perform your assessment.

If no narrative is provided, you will use the structured data fields.

You must analyze **each combination** of suspected drug and adverse event that you identify **individually**.

Your response must be a JSON array. Each object in the array represents a causality assessment for one drug-event pair and must contain the following fields: 'drugName', 'adverseEvent', 'causalityCategory', and 'rationale'.

Use the following causality categories for the 'causalityCategory' field:
- Probable
- Possible
- Unlikely
- Not Related
- Unassessable/Unclassifiable

For each assessment, provide a detailed, structured rationale for your conclusion in the 'rationale' field. In your rationale, reference the specific case details you have extracted or been given. Consider the following points:
1.  **Temporal Relationship:** The timing between each drug's specific administration start date and the event onset/resolution. Pay close attention to the individual timelines provided for each drug.
2.  **Dechallenge:** The outcome when the drug was stopped or the dose was reduced.
3.  **Rechallenge:** The outcome if the drug was reintroduced.
4.  **Alternative Etiologies:** Plausibility of other causes for the event.
5.  **Pharmacological Plausibility:** Known information about the drug's mechanism and side effect profile.
6.  **Patient-Specific Factors:** Relevant medical history, concomitant medications, and laboratory data."#;

/// System prompt for the drug-drug interaction task.
pub const INTERACTION_SYSTEM_PROMPT: &str = r#"You are an expert clinical pharmacologist. Your task is to identify and describe potential drug-drug interactions (DDIs) from a given list of medications.

Your response must be a JSON array. Each object in the array represents a single interaction between two drugs and must contain the following fields: 'drugA', 'drugB', 'severity', and 'description'.

- 'drugA', 'drugB': The names of the two interacting drugs.
- 'severity': The clinical severity of the interaction. Use one of three categories: 'Major', 'Moderate', or 'Minor'.
- 'description': A concise explanation of the interaction's mechanism, potential clinical effect, and a brief management recommendation.

If no clinically significant interactions are found among the provided drugs, return an empty JSON array: []."#;

/// Lead-in used when the case is a free-text narrative.
pub const NARRATIVE_PREAMBLE: &str = "Please perform a causality assessment for each drug-event pair based on the following case narrative:\n\n---\n\n";

/// Lead-in used when the case is built from structured fields.
pub const STRUCTURED_PREAMBLE: &str =
    "Please perform a causality assessment for each drug-event pair in the following case:\n";

/// Lead-in for the interaction prompt.
pub const INTERACTION_PREAMBLE: &str =
    "Analyze the following list of drugs for potential drug-drug interactions: ";

/// Placeholder for a missing drug or event detail, or a missing outcome.
pub const NOT_PROVIDED: &str = "Not provided";

/// Placeholder for a missing free-text field or an empty list.
pub const NONE_PROVIDED: &str = "None provided";

/// Build the causality prompt for a case.
///
/// A non-blank narrative wins: the prompt is [`NARRATIVE_PREAMBLE`] plus the
/// trimmed narrative and every structured field is ignored. Otherwise each
/// structured field becomes a labeled line.
pub fn make_causality_prompt(case: &CaseData) -> String {
    match case.narrative_text() {
        Some(narrative) => format!("{}{}", NARRATIVE_PREAMBLE, narrative),
        None => format!("{}{}", STRUCTURED_PREAMBLE, format_structured_case(case)),
    }
}

/// Build the interaction prompt, listing drugs in the given order.
pub fn make_interaction_prompt(drugs: &DrugList) -> String {
    format!("{}{}", INTERACTION_PREAMBLE, drugs.names().join(", "))
}

/// Render the structured fields of a case as labeled lines.
pub fn format_structured_case(case: &CaseData) -> String {
    let mut out = String::new();

    out.push_str("- Suspected Drug(s) Details:\n");
    if case.suspect_drugs.is_empty() {
        out.push_str(&format!("  - {}\n", NONE_PROVIDED));
    }
    for drug in &case.suspect_drugs {
        out.push_str(&format_suspect_drug(drug));
    }

    out.push_str("- Adverse Event(s) Details:\n");
    if case.adverse_events.is_empty() {
        out.push_str(&format!("  - {}\n", NONE_PROVIDED));
    }
    for event in &case.adverse_events {
        out.push_str(&format_adverse_event(event));
    }

    let scalars = [
        ("Patient History", case.patient_history.as_str()),
        ("Concomitant Medications", case.concomitant_meds.as_str()),
        ("Alternative Causes for Event", case.alternative_causes.as_str()),
        ("Laboratory Data", case.lab_data.as_str()),
    ];
    for (label, value) in scalars {
        out.push_str(&format!("- {}: {}\n", label, or_default(value, NONE_PROVIDED)));
    }

    out.push_str(&format!(
        "- Dechallenge Outcome: {}\n",
        case.dechallenge_outcome.label().unwrap_or(NOT_PROVIDED)
    ));
    out.push_str(&format!(
        "- Rechallenge Outcome: {}\n",
        case.rechallenge_outcome.label().unwrap_or(NOT_PROVIDED)
    ));

    out
}

fn format_suspect_drug(drug: &SuspectDrug) -> String {
    format!(
        "- Drug: {}\n  - Start Date: {}\n  - Stop Date: {}\n",
        or_default(&drug.name, NOT_PROVIDED),
        or_default(&drug.start_date, NOT_PROVIDED),
        or_default(&drug.stop_date, NOT_PROVIDED),
    )
}

fn format_adverse_event(event: &AdverseEvent) -> String {
    format!(
        "- Event: {}\n  - Onset: {}\n  - Resolution: {}\n",
        or_default(&event.name, NOT_PROVIDED),
        or_default(&event.onset_date, NOT_PROVIDED),
        or_default(&event.resolution_date, NOT_PROVIDED),
    )
}

/// Trimmed value, or the placeholder when blank.
fn or_default<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder
    } else {
        trimmed
    }
}
