use crate::schema::ResponseSchema;

/// Outbound payload for a single model call. Every call is one user turn;
/// prior chat turns are never sent.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRequest {
    pub model: String,
    pub prompt: String,
    /// When set, the provider is asked for a JSON object of this shape.
    pub response_schema: Option<&'static ResponseSchema>,
}

impl InferenceRequest {
    pub fn text(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            response_schema: None,
        }
    }

    pub fn structured(
        model: impl Into<String>,
        prompt: impl Into<String>,
        schema: &'static ResponseSchema,
    ) -> Self {
        Self {
            response_schema: Some(schema),
            ..Self::text(model, prompt)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InferenceResponse {
    /// Concatenated text parts of the first candidate; `None` when the
    /// provider returned no text at all.
    pub text: Option<String>,
    pub finish_reason: Option<String>,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

impl InferenceResponse {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}
