//! Causality assessment result models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Causality category assigned to one drug-event pair.
///
/// Models do not always stick to the five standard labels, so anything
/// unrecognised is kept verbatim in [`CausalityCategory::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CausalityCategory {
    Probable,
    Possible,
    Unlikely,
    NotRelated,
    Unassessable,
    Other(String),
}

impl CausalityCategory {
    /// The standard categories, strongest association first.
    pub const STANDARD: [CausalityCategory; 5] = [
        CausalityCategory::Probable,
        CausalityCategory::Possible,
        CausalityCategory::Unlikely,
        CausalityCategory::NotRelated,
        CausalityCategory::Unassessable,
    ];

    /// Map a label emitted by the model to a category.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    pub fn from_label(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "probable" => CausalityCategory::Probable,
            "possible" => CausalityCategory::Possible,
            "unlikely" => CausalityCategory::Unlikely,
            "not related" | "unrelated" => CausalityCategory::NotRelated,
            "unassessable/unclassifiable" | "unassessable" | "unclassifiable" => {
                CausalityCategory::Unassessable
            }
            _ => CausalityCategory::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CausalityCategory::Probable => "Probable",
            CausalityCategory::Possible => "Possible",
            CausalityCategory::Unlikely => "Unlikely",
            CausalityCategory::NotRelated => "Not Related",
            CausalityCategory::Unassessable => "Unassessable/Unclassifiable",
            CausalityCategory::Other(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, CausalityCategory::Other(_))
    }

    /// Display tone for renderers.
    ///
    /// Unrecognised labels are matched loosely on keywords and fall back to
    /// [`Tone::Neutral`].
    pub fn tone(&self) -> Tone {
        let label = self.as_str().to_lowercase();
        if label.contains("unlikely") {
            Tone::Caution
        } else if label.contains("probable") || label.contains("likely") {
            Tone::Strong
        } else if label.contains("possible") {
            Tone::Moderate
        } else if label.contains("unrelated") || label.contains("not related") {
            Tone::Negative
        } else {
            Tone::Neutral
        }
    }
}

impl From<String> for CausalityCategory {
    fn from(raw: String) -> Self {
        CausalityCategory::from_label(&raw)
    }
}

impl From<CausalityCategory> for String {
    fn from(category: CausalityCategory) -> Self {
        match category {
            CausalityCategory::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for CausalityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering tone shared by causality categories and interaction severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Strong,
    Moderate,
    Caution,
    Negative,
    Neutral,
}

/// Assessment of one suspect drug against one adverse event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IndividualAssessment {
    pub drug_name: String,
    pub adverse_event: String,
    pub causality_category: CausalityCategory,
    /// Free-text reasoning from the model
    pub rationale: String,
}

/// All assessments returned for one case, in the order the model produced them.
///
/// An empty result means the model found nothing assessable.
pub type AssessmentResult = Vec<IndividualAssessment>;
