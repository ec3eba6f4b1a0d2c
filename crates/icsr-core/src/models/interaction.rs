//! Drug-drug interaction models.

use super::{CaseData, Tone};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Clinical severity of an interaction, with a fallback for free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Major,
    Moderate,
    Minor,
    Other(String),
}

impl Severity {
    pub fn from_label(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "major" => Severity::Major,
            "moderate" => Severity::Moderate,
            "minor" => Severity::Minor,
            _ => Severity::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Severity::Major => "Major",
            Severity::Moderate => "Moderate",
            Severity::Minor => "Minor",
            Severity::Other(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Severity::Other(_))
    }

    pub fn tone(&self) -> Tone {
        match self {
            Severity::Major => Tone::Negative,
            Severity::Moderate => Tone::Caution,
            Severity::Minor => Tone::Moderate,
            Severity::Other(_) => Tone::Neutral,
        }
    }
}

impl From<String> for Severity {
    fn from(raw: String) -> Self {
        Severity::from_label(&raw)
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One interaction between two drugs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InteractionPair {
    pub drug_a: String,
    pub drug_b: String,
    pub severity: Severity,
    /// Mechanism, clinical effect and management note
    pub description: String,
}

/// Interactions found for a drug list. Empty when none are significant.
pub type InteractionResult = Vec<InteractionPair>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrugListError {
    #[error("At least two distinct drugs are required, got {0}")]
    TooFewDrugs(usize),
}

/// Distinct drug names for an interaction check.
///
/// Names are trimmed, blanks dropped, and exact duplicates removed. Spelling
/// variants such as `Warfarin` and `WARFARIN` are kept as separate entries.
/// Input order is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrugList(Vec<String>);

impl DrugList {
    /// Build a list that can be checked for interactions (two or more drugs).
    pub fn new<I, S>(names: I) -> Result<Self, DrugListError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct = distinct_drug_names(names);
        if distinct.len() < 2 {
            return Err(DrugListError::TooFewDrugs(distinct.len()));
        }
        Ok(Self(distinct))
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

}

/// Trim, drop blanks, and drop exact duplicates, keeping first-seen order.
pub fn distinct_drug_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter_map(|name| {
            let trimmed = name.as_ref().trim();
            if trimmed.is_empty() || !seen.insert(trimmed.to_string()) {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

/// Every drug in a case that should be screened for interactions:
/// suspect drugs first, then concomitant medications.
pub fn collect_interaction_drugs(case: &CaseData) -> Vec<String> {
    let suspects = case.suspect_drugs.iter().map(|d| d.name.clone());
    distinct_drug_names(suspects.chain(case.concomitant_med_names()))
}
