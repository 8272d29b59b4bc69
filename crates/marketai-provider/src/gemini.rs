//! Google Gemini generateContent client
//!
//! https://ai.google.dev/api/generate-content

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::schema::ResponseSchema;
use crate::{InferenceError, InferenceProvider, InferenceRequest, InferenceResponse};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, GEMINI_API_BASE)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: build_client(DEFAULT_TIMEOUT),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    fn build_request(&self, request: &InferenceRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: request.response_schema.map(|schema| GeminiGenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            }),
        }
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

#[async_trait]
impl InferenceProvider for GeminiProvider {
    async fn generate(
        &self,
        request: &InferenceRequest,
    ) -> Result<InferenceResponse, InferenceError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, request.model, self.api_key
        );
        let payload = self.build_request(request);

        let resp = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InferenceError::permanent("request timed out")
                } else {
                    // The URL carries the API key.
                    InferenceError::permanent(format!("transport failure: {}", e.without_url()))
                }
            })?;

        let status = resp.status();
        if status != StatusCode::OK {
            let text = resp.text().await.unwrap_or_default();
            let err = parse_api_error(status, &text);
            tracing::warn!(
                status = status.as_u16(),
                kind = err.kind.as_str(),
                "gemini request failed: {}",
                err.message
            );
            return Err(err);
        }

        let body: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| {
                InferenceError::permanent(format!("invalid response body: {}", e.without_url()))
            })?;
        Ok(to_inference_response(body))
    }
}

fn parse_api_error(status: StatusCode, text: &str) -> InferenceError {
    match serde_json::from_str::<GeminiErrorEnvelope>(text) {
        Ok(envelope) => InferenceError::from_status(
            status.as_u16(),
            envelope.error.status,
            envelope.error.message.unwrap_or_else(|| text.to_string()),
        ),
        Err(_) => InferenceError::from_status(status.as_u16(), None, text),
    }
}

fn to_inference_response(body: GeminiResponse) -> InferenceResponse {
    let Some(candidate) = body.candidates.into_iter().next() else {
        return InferenceResponse::default();
    };

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    let text = if parts.is_empty() {
        None
    } else {
        Some(parts.into_iter().map(|p| p.text).collect::<String>())
    };

    InferenceResponse {
        text,
        finish_reason: candidate.finish_reason,
        input_tokens: body.usage_metadata.as_ref().map(|u| u.prompt_token_count),
        output_tokens: body.usage_metadata.as_ref().map(|u| u.candidates_token_count),
    }
}

// ============================================================
// Gemini API Types
// ============================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_mime_type: &'static str,
    response_schema: &'static ResponseSchema,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}
