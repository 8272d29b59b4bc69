pub mod error;
pub mod gemini;
pub mod schema;
pub mod types;

use async_trait::async_trait;

pub use error::{classify, ErrorKind, InferenceError};
pub use gemini::GeminiProvider;
pub use schema::{ResponseSchema, CAMPAIGN_SCHEMA, LEAD_SCHEMA, PITCH_SCHEMA};
pub use types::*;

/// One round trip to a hosted model.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    async fn generate(&self, request: &InferenceRequest)
        -> Result<InferenceResponse, InferenceError>;
}

pub const DEMO_RESPONSE_TEXT: &str = "Demo AI response (mock mode)";

/// Canned responses used when no API credential is configured. Structured
/// requests get a placeholder object of the requested shape.
pub struct DemoProvider;

#[async_trait]
impl InferenceProvider for DemoProvider {
    async fn generate(
        &self,
        request: &InferenceRequest,
    ) -> Result<InferenceResponse, InferenceError> {
        let text = match request.response_schema {
            Some(schema) => schema.placeholder(DEMO_RESPONSE_TEXT).to_string(),
            None => DEMO_RESPONSE_TEXT.to_string(),
        };
        tracing::debug!(model = %request.model, "demo provider answered without network call");
        Ok(InferenceResponse::with_text(text))
    }
}
