//! Google Gemini `generateContent` transport.

use crate::config::{ApiKey, GatewayConfig};
use crate::transport::{GenerateRequest, LlmTransport, TransportError, TransportResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Transport for the Gemini REST API.
pub struct GeminiTransport {
    client: reqwest::Client,
    api_base: String,
    api_key: ApiKey,
}

impl GeminiTransport {
    pub fn new(config: &GatewayConfig) -> TransportResult<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.api_base, model)
    }
}

#[async_trait]
impl LlmTransport for GeminiTransport {
    async fn generate(&self, request: &GenerateRequest) -> TransportResult<String> {
        let body = GenerateContentBody::from_request(request);
        debug!(model = %request.model, "sending generateContent request");

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", self.api_key.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "provider returned an error status");
            return Err(TransportError::Status {
                status: status.as_u16(),
                message: provider_error_message(&raw),
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        parsed.into_text()
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
    temperature: f32,
}

impl<'a> GenerateContentBody<'a> {
    fn from_request(request: &'a GenerateRequest) -> Self {
        Self {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: request.system_instruction,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: request.response_mime_type,
                response_schema: &request.response_schema,
                temperature: request.temperature,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenate the text parts of the first candidate.
    fn into_text(self) -> TransportResult<String> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(TransportError::EmptyResponse {
                reason: block_reason,
            });
        };

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if text.trim().is_empty() {
            return Err(TransportError::EmptyResponse {
                reason: candidate.finish_reason.or(block_reason),
            });
        }
        Ok(text)
    }
}

/// Pull `error.message` out of a provider error body, else return the body.
fn provider_error_message(raw: &str) -> String {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| raw.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body() {
        let request = GenerateRequest {
            model: "gemini-2.5-flash".into(),
            system_instruction: "You are a pharmacologist.",
            prompt: "Analyze: Warfarin, Aspirin".into(),
            response_schema: json!({"type": "ARRAY"}),
            response_mime_type: "application/json",
            temperature: 0.3,
        };

        let body = serde_json::to_value(GenerateContentBody::from_request(&request)).unwrap();
        assert_eq!(
            body["systemInstruction"],
            json!({"parts": [{"text": "You are a pharmacologist."}]})
        );
        assert_eq!(
            body["contents"],
            json!([{"role": "user", "parts": [{"text": "Analyze: Warfarin, Aspirin"}]}])
        );
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"], json!({"type": "ARRAY"}));
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_response_text_joined() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "[{\"drugA\""}, {"text": ":\"x\"}]"}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "[{\"drugA\":\"x\"}]");
    }

    #[test]
    fn test_blocked_prompt() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
        assert!(matches!(
            response.into_text(),
            Err(TransportError::EmptyResponse { reason: Some(r) }) if r == "SAFETY"
        ));
    }

    #[test]
    fn test_candidate_without_text() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "MAX_TOKENS"}]
        }))
        .unwrap();
        assert!(matches!(
            response.into_text(),
            Err(TransportError::EmptyResponse { reason: Some(r) }) if r == "MAX_TOKENS"
        ));
    }

    #[test]
    fn test_provider_error_message() {
        let raw = r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(
            provider_error_message(raw),
            "API key not valid. Please pass a valid API key."
        );
        assert_eq!(provider_error_message(" upstream timeout \n"), "upstream timeout");
    }

    #[test]
    fn test_endpoint() {
        let config = GatewayConfig::new(ApiKey::new("k").unwrap());
        let transport = GeminiTransport::new(&config).unwrap();
        assert_eq!(
            transport.endpoint("gemini-2.5-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
