//! Case form controller behind the `icsr-assess` binary.
//!
//! Checks form input, runs the gateway tasks and renders their results as
//! text or JSON. Output is collected into a [`Report`] so the binary only has
//! to print it.

use crate::config::Settings;
use crate::error::{GatewayError, GatewayResult, TaskKind};
use crate::gateway::LlmGateway;
use colored::{ColoredString, Colorize};
use icsr_core::models::distinct_drug_names;
use icsr_core::{
    collect_interaction_drugs, AssessmentResult, CaseData, InteractionResult, Tone,
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Process exit code when the provider API key is not configured.
pub const CONFIGURATION_ERROR_EXIT: u8 = 2;

/// Input problems caught before any request is sent.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    #[error("Please provide a case narrative, or at least one suspect drug and one adverse event.")]
    IncompleteCase,

    #[error("Please provide at least two drugs to check for interactions.")]
    TooFewDrugs,
}

/// Exit code to stop with before building a gateway, if any.
pub fn startup_exit_code(settings: &Settings) -> Option<u8> {
    (!settings.is_api_key_configured()).then_some(CONFIGURATION_ERROR_EXIT)
}

/// Fixed display shown when the API key is missing.
pub fn configuration_error_display() -> String {
    format!(
        "{}\n\n\
         The Google Gemini API key has not been configured for this application.\n\n\
         How to fix:\n  \
         1. Create a file named .env in the working directory.\n  \
         2. Add the line: GEMINI_API_KEY=\"YOUR_GEMINI_API_KEY_HERE\"\n  \
         3. Run the command again.\n",
        "Configuration Error".red().bold()
    )
}

pub fn check_submittable(case: &CaseData) -> Result<(), FormError> {
    if case.is_submittable() {
        Ok(())
    } else {
        Err(FormError::IncompleteCase)
    }
}

/// Drugs for an interaction check: the case's drugs followed by extra names.
pub fn interaction_drugs(
    case: Option<&CaseData>,
    extra: &[String],
) -> Result<Vec<String>, FormError> {
    let mut names = case.map(collect_interaction_drugs).unwrap_or_default();
    names.extend(extra.iter().cloned());
    let names = distinct_drug_names(&names);
    if names.len() < 2 {
        return Err(FormError::TooFewDrugs);
    }
    Ok(names)
}

/// Rendered output of one command.
#[derive(Debug, Default)]
pub struct Report {
    pub stdout: String,
    pub stderr: String,
    /// Set when any task failed
    pub failed: bool,
}

impl Report {
    fn out(&mut self, line: impl fmt::Display) {
        self.stdout.push_str(&line.to_string());
        self.stdout.push('\n');
    }

    fn err(&mut self, line: impl fmt::Display) {
        self.stderr.push_str(&line.to_string());
        self.stderr.push('\n');
    }
}

/// Assess a case, optionally checking its drugs for interactions at the same time.
///
/// Both tasks run concurrently and each result is reported on its own. A
/// case with fewer than two drugs skips the interaction check.
pub async fn assess(
    gateway: &LlmGateway,
    case: &CaseData,
    with_interactions: bool,
    json: bool,
) -> Result<Report, FormError> {
    check_submittable(case)?;
    let mut report = Report::default();

    if !with_interactions {
        let result = gateway.assess_causality(case).await;
        render_assessment(&mut report, result, json);
        return Ok(report);
    }

    let drugs = collect_interaction_drugs(case);
    let check_drugs = drugs.len() >= 2;

    let assessment = tokio::spawn({
        let gateway = gateway.clone();
        let case = case.clone();
        async move { gateway.assess_causality(&case).await }
    });
    let interactions = tokio::spawn({
        let gateway = gateway.clone();
        async move {
            if check_drugs {
                Some(gateway.check_interactions(&drugs).await)
            } else {
                None
            }
        }
    });

    let (assessment, interactions) = tokio::join!(assessment, interactions);
    let assessment = assessment.unwrap_or(Err(GatewayError::Unknown {
        task: TaskKind::Causality,
    }));
    let interactions = interactions.unwrap_or(Some(Err(GatewayError::Unknown {
        task: TaskKind::Interaction,
    })));

    render_assessment(&mut report, assessment, json);
    match interactions {
        Some(result) => render_interactions(&mut report, result, json),
        None => render_skipped_interactions(&mut report, json),
    }
    Ok(report)
}

/// Check the drugs of an optional case plus extra names for interactions.
pub async fn interactions(
    gateway: &LlmGateway,
    case: Option<&CaseData>,
    extra: &[String],
    json: bool,
) -> Result<Report, FormError> {
    let drugs = interaction_drugs(case, extra)?;
    let mut report = Report::default();
    let result = gateway.check_interactions(&drugs).await;
    render_interactions(&mut report, result, json);
    Ok(report)
}

fn render_assessment(report: &mut Report, result: GatewayResult<AssessmentResult>, json: bool) {
    let assessments = match result {
        Ok(assessments) => assessments,
        Err(e) => return render_failure(report, &e),
    };

    if json {
        report.out(json!({ "assessments": assessments }));
        return;
    }

    report.out("Causality Assessment".bold());
    report.out("====================");
    if assessments.is_empty() {
        report.out("No assessable drug-event pairs were identified.");
    }
    for (i, a) in assessments.iter().enumerate() {
        report.out("");
        report.out(format!("{}. {} -> {}", i + 1, a.drug_name, a.adverse_event));
        let note = if a.causality_category.is_recognized() {
            ""
        } else {
            " (non-standard category)"
        };
        report.out(format!(
            "   Category: {}{}",
            paint(a.causality_category.tone(), a.causality_category.as_str()),
            note
        ));
        report.out(format!("   {}", a.rationale));
    }
}

fn render_interactions(report: &mut Report, result: GatewayResult<InteractionResult>, json: bool) {
    let interactions = match result {
        Ok(interactions) => interactions,
        Err(e) => return render_failure(report, &e),
    };

    if json {
        report.out(json!({ "interactions": interactions }));
        return;
    }

    report.out("");
    report.out("Drug Interaction Report".bold());
    report.out("=======================");
    if interactions.is_empty() {
        report.out("No significant drug-drug interactions found.");
    }
    for pair in &interactions {
        report.out("");
        report.out(format!(
            "{} + {} [{}]",
            pair.drug_a,
            pair.drug_b,
            paint(pair.severity.tone(), pair.severity.as_str())
        ));
        report.out(format!("   {}", pair.description));
    }
}

fn render_skipped_interactions(report: &mut Report, json: bool) {
    let reason = FormError::TooFewDrugs.to_string();
    if json {
        report.out(json!({ "interactions": null, "skipped": reason }));
    } else {
        report.out("");
        report.out(format!("Interaction check skipped: {}", reason));
    }
}

fn render_failure(report: &mut Report, err: &GatewayError) {
    report.failed = true;
    report.err(format!("{} {}", "An Error Occurred:".red().bold(), err));
    if err.is_retryable() {
        report.err("Submit the case again to retry.");
    }
}

/// Colour a label by tone. `colored` leaves it plain when stdout is not a terminal.
fn paint(tone: Tone, label: &str) -> ColoredString {
    match tone {
        Tone::Strong => label.green(),
        Tone::Moderate => label.cyan(),
        Tone::Caution => label.yellow(),
        Tone::Negative => label.red(),
        Tone::Neutral => label.normal(),
    }
}
