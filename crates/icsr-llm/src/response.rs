//! Validation of model output against the task schemas.
//!
//! Raw text is parsed into an untyped JSON value, checked against an
//! [`ArraySchema`], and only then converted into typed results.

use crate::schema::{ArraySchema, CAUSALITY_ASSESSMENT_SCHEMA, DRUG_INTERACTION_SCHEMA};
use icsr_core::{AssessmentResult, InteractionResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Ways a model response can fail to match its schema.
#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: expected a JSON array, got {0}")]
    NotAnArray(&'static str),

    #[error("Invalid response format: item {index} is {found}, expected a JSON object")]
    ItemNotObject { index: usize, found: &'static str },

    #[error("Invalid response format: item {index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("Invalid response format: field '{field}' of item {index} is {found}, expected a string")]
    WrongFieldType {
        index: usize,
        field: &'static str,
        found: &'static str,
    },
}

pub type ResponseResult<T> = Result<T, ResponseError>;

/// Parse and validate a causality assessment response.
pub fn parse_assessment_response(text: &str) -> ResponseResult<AssessmentResult> {
    parse_validated(text, &CAUSALITY_ASSESSMENT_SCHEMA)
}

/// Parse and validate an interaction check response.
pub fn parse_interaction_response(text: &str) -> ResponseResult<InteractionResult> {
    parse_validated(text, &DRUG_INTERACTION_SCHEMA)
}

/// Validate `text` against `schema`, then convert each item to `T`.
pub fn parse_validated<T: DeserializeOwned>(
    text: &str,
    schema: &ArraySchema,
) -> ResponseResult<Vec<T>> {
    let items = validate_array(text, schema)?;
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(ResponseError::from))
        .collect()
}

/// Check that `text` is a JSON array of objects carrying every schema field
/// as a string. Extra fields are allowed.
pub fn validate_array(text: &str, schema: &ArraySchema) -> ResponseResult<Vec<Value>> {
    let value: Value = serde_json::from_str(strip_code_fence(text))?;

    let items = match value {
        Value::Array(items) => items,
        other => return Err(ResponseError::NotAnArray(kind_of(&other))),
    };

    for (index, item) in items.iter().enumerate() {
        let object = item.as_object().ok_or(ResponseError::ItemNotObject {
            index,
            found: kind_of(item),
        })?;

        for field in schema.field_names() {
            match object.get(field) {
                None => return Err(ResponseError::MissingField { index, field }),
                Some(Value::String(_)) => {}
                Some(other) => {
                    return Err(ResponseError::WrongFieldType {
                        index,
                        field,
                        found: kind_of(other),
                    })
                }
            }
        }
    }

    Ok(items)
}

/// Trim the text and drop a surrounding markdown code fence if present.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Skip a language tag such as `json` on the opening line
    match body.find('\n') {
        Some(newline) if !body[..newline].trim_start().starts_with(['[', '{']) => {
            body[newline + 1..].trim()
        }
        _ => body.trim(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icsr_core::{CausalityCategory, Severity};

    #[test]
    fn test_parse_assessment_response() {
        let text = r#"
            [
              {"drugName":"Atorvastatin","adverseEvent":"Myalgia","causalityCategory":"Probable","rationale":"Onset 14 days after start; resolved on dechallenge."},
              {"drugName":"Amlodipine","adverseEvent":"Myalgia","causalityCategory":"Unlikely","rationale":"Long-standing therapy without prior symptoms."}
            ]
        "#;
        let result = parse_assessment_response(text).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].drug_name, "Atorvastatin");
        assert_eq!(result[0].causality_category, CausalityCategory::Probable);
        assert_eq!(result[1].drug_name, "Amlodipine");
    }

    #[test]
    fn test_empty_array_is_valid() {
        assert!(parse_interaction_response("[]").unwrap().is_empty());
        assert!(parse_assessment_response("  []\n").unwrap().is_empty());
    }

    #[test]
    fn test_code_fence_is_stripped() {
        let text = "```json\n[{\"drugA\":\"Warfarin\",\"drugB\":\"Aspirin\",\"severity\":\"Major\",\"description\":\"Bleeding risk.\"}]\n```";
        let result = parse_interaction_response(text).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].severity, Severity::Major);

        assert_eq!(strip_code_fence("```\n[]\n```"), "[]");
        assert_eq!(strip_code_fence("```[]```"), "[]");
    }

    #[test]
    fn test_not_json() {
        let err = parse_assessment_response("I'm sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(err, ResponseError::JsonParse(_)));
        assert!(err.to_string().contains("JSON"));
    }

    #[test]
    fn test_not_an_array() {
        let err = parse_assessment_response(r#"{"assessments": []}"#).unwrap_err();
        assert!(matches!(err, ResponseError::NotAnArray("an object")));
    }

    #[test]
    fn test_item_not_object() {
        let err = parse_interaction_response(r#"["Warfarin + Aspirin"]"#).unwrap_err();
        assert!(matches!(
            err,
            ResponseError::ItemNotObject { index: 0, found: "a string" }
        ));
    }

    #[test]
    fn test_missing_field() {
        let text = r#"[
            {"drugName":"A","adverseEvent":"B","causalityCategory":"Possible","rationale":"r"},
            {"drugName":"A","adverseEvent":"C","causalityCategory":"Possible"}
        ]"#;
        let err = parse_assessment_response(text).unwrap_err();
        assert!(matches!(
            err,
            ResponseError::MissingField { index: 1, field: "rationale" }
        ));
    }

    #[test]
    fn test_wrong_field_type() {
        let text = r#"[{"drugA":"A","drugB":"B","severity":3,"description":"d"}]"#;
        let err = parse_interaction_response(text).unwrap_err();
        assert!(matches!(
            err,
            ResponseError::WrongFieldType { index: 0, field: "severity", found: "a number" }
        ));
    }

    #[test]
    fn test_extra_fields_and_free_text_category_tolerated() {
        let text = r#"[{"drugName":"A","adverseEvent":"B","causalityCategory":"Certain","rationale":"r","confidence":"high"}]"#;
        let result = parse_assessment_response(text).unwrap();
        assert_eq!(
            result[0].causality_category,
            CausalityCategory::Other("Certain".into())
        );
    }
}
