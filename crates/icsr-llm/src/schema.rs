//! Output schemas for schema-constrained generation.
//!
//! Each task expects a JSON array of flat objects with string fields. The
//! same declaration is sent to the provider and used to validate what comes
//! back, so the two can never drift apart.

use serde_json::{json, Map, Value};

/// A required string field of a response item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Wire name of the field
    pub name: &'static str,
    /// Meaning of the field, sent to the model with the schema
    pub description: &'static str,
}

/// Schema for an array of objects whose fields are all required strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArraySchema {
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
}

impl ArraySchema {
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Render in the provider's schema dialect (OpenAPI subset, upper-case types).
    pub fn to_provider_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| {
                (
                    f.name.to_string(),
                    json!({ "type": "STRING", "description": f.description }),
                )
            })
            .collect();

        json!({
            "type": "ARRAY",
            "items": {
                "type": "OBJECT",
                "properties": properties,
                "required": self.field_names().collect::<Vec<_>>(),
            }
        })
    }
}

/// Expected output of the causality assessment task.
pub const CAUSALITY_ASSESSMENT_SCHEMA: ArraySchema = ArraySchema {
    title: "CausalityAssessment",
    fields: &[
        FieldSpec {
            name: "drugName",
            description: "The name of the suspected drug for this specific assessment.",
        },
        FieldSpec {
            name: "adverseEvent",
            description: "The name of the adverse event for this specific assessment.",
        },
        FieldSpec {
            name: "causalityCategory",
            description: "The assessed causality category (e.g., Probable, Possible) for this drug-event pair.",
        },
        FieldSpec {
            name: "rationale",
            description: "A detailed explanation for the assessment of this specific drug-event pair.",
        },
    ],
};

/// Expected output of the drug-drug interaction task.
pub const DRUG_INTERACTION_SCHEMA: ArraySchema = ArraySchema {
    title: "DrugInteraction",
    fields: &[
        FieldSpec {
            name: "drugA",
            description: "The name of the first interacting drug.",
        },
        FieldSpec {
            name: "drugB",
            description: "The name of the second interacting drug.",
        },
        FieldSpec {
            name: "severity",
            description: "The clinical severity of the interaction: Major, Moderate, or Minor.",
        },
        FieldSpec {
            name: "description",
            description: "The interaction's mechanism, potential clinical effect, and a brief management recommendation.",
        },
    ],
};
