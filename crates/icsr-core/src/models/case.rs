//! Case input models.

use serde::{Deserialize, Serialize};

/// A suspected drug with its administration window.
///
/// Dates are free-form text and are never parsed; they only end up in prompt text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SuspectDrug {
    /// Drug name as entered
    #[serde(rename = "drugName")]
    pub name: String,
    /// Administration start date
    pub start_date: String,
    /// Administration stop date
    pub stop_date: String,
}

impl SuspectDrug {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_dates(mut self, start_date: impl Into<String>, stop_date: impl Into<String>) -> Self {
        self.start_date = start_date.into();
        self.stop_date = stop_date.into();
        self
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// An observed adverse event with onset and resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AdverseEvent {
    /// Event name as entered
    #[serde(rename = "eventName")]
    pub name: String,
    pub onset_date: String,
    pub resolution_date: String,
}

impl AdverseEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_dates(
        mut self,
        onset_date: impl Into<String>,
        resolution_date: impl Into<String>,
    ) -> Self {
        self.onset_date = onset_date.into();
        self.resolution_date = resolution_date.into();
        self
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Outcome after the suspect drug was stopped or reduced.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DechallengeOutcome {
    Resolved,
    Improved,
    Unchanged,
    Worsened,
    Unknown,
    #[default]
    #[serde(rename = "")]
    NotProvided,
}

impl DechallengeOutcome {
    /// Form label, or `None` when nothing was selected.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            DechallengeOutcome::Resolved => Some("Resolved"),
            DechallengeOutcome::Improved => Some("Improved"),
            DechallengeOutcome::Unchanged => Some("Unchanged"),
            DechallengeOutcome::Worsened => Some("Worsened"),
            DechallengeOutcome::Unknown => Some("Unknown"),
            DechallengeOutcome::NotProvided => None,
        }
    }
}

/// Outcome after the suspect drug was reintroduced.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RechallengeOutcome {
    Reappeared,
    #[serde(rename = "Did not reappear")]
    DidNotReappear,
    #[serde(rename = "Not applicable")]
    NotApplicable,
    #[default]
    #[serde(rename = "")]
    NotProvided,
}

impl RechallengeOutcome {
    pub fn label(&self) -> Option<&'static str> {
        match self {
            RechallengeOutcome::Reappeared => Some("Reappeared"),
            RechallengeOutcome::DidNotReappear => Some("Did not reappear"),
            RechallengeOutcome::NotApplicable => Some("Not applicable"),
            RechallengeOutcome::NotProvided => None,
        }
    }
}

/// Everything a reviewer entered for one Individual Case Safety Report.
///
/// A non-empty narrative takes precedence over the structured fields when the
/// case is turned into a prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CaseData {
    /// Free-text case narrative
    pub narrative: String,
    pub suspect_drugs: Vec<SuspectDrug>,
    pub adverse_events: Vec<AdverseEvent>,
    /// Relevant medical history
    pub patient_history: String,
    pub dechallenge_outcome: DechallengeOutcome,
    pub rechallenge_outcome: RechallengeOutcome,
    /// Other plausible causes for the event
    pub alternative_causes: String,
    /// Concomitant medications, separated by commas, semicolons or newlines
    pub concomitant_meds: String,
    pub lab_data: String,
}

impl CaseData {
    /// Trimmed narrative, or `None` if it is blank.
    pub fn narrative_text(&self) -> Option<&str> {
        let trimmed = self.narrative.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Check whether the case carries enough information to be assessed.
    ///
    /// Requires a narrative, or at least one named suspect drug together with
    /// at least one named adverse event.
    pub fn is_submittable(&self) -> bool {
        self.narrative_text().is_some()
            || (self.suspect_drugs.iter().any(SuspectDrug::has_name)
                && self.adverse_events.iter().any(AdverseEvent::has_name))
    }

    /// Copy of the case as the form submits it: narrative and names trimmed,
    /// drugs and events without a name dropped.
    pub fn cleaned(&self) -> Self {
        let suspect_drugs = self
            .suspect_drugs
            .iter()
            .filter(|d| d.has_name())
            .map(|d| SuspectDrug {
                name: d.name.trim().to_string(),
                ..d.clone()
            })
            .collect();

        let adverse_events = self
            .adverse_events
            .iter()
            .filter(|e| e.has_name())
            .map(|e| AdverseEvent {
                name: e.name.trim().to_string(),
                ..e.clone()
            })
            .collect();

        Self {
            narrative: self.narrative.trim().to_string(),
            suspect_drugs,
            adverse_events,
            ..self.clone()
        }
    }

    /// Split the concomitant medication field into individual names.
    pub fn concomitant_med_names(&self) -> Vec<String> {
        self.concomitant_meds
            .split([',', ';', '\n'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}
