use std::sync::Arc;

use marketai_provider::{
    DemoProvider, GeminiProvider, InferenceProvider, InferenceRequest, InferenceResponse,
    CAMPAIGN_SCHEMA, LEAD_SCHEMA, PITCH_SCHEMA,
};
use marketai_schema::{CampaignResult, ChatTurn, LeadResult, PitchResult, Tool};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{AssistantConfig, DEFAULT_MODEL};
use crate::decode::{decode_chat, decode_structured};
use crate::error::AssistantError;
use crate::knowledge::KnowledgeBase;
use crate::prompt::{
    build_campaign_request, build_chat_request, build_lead_request, build_pitch_request,
};
use crate::retry::RetryPolicy;

/// Entry point for the four marketing tools. Holds no per-call state, so one
/// value can serve any number of concurrent calls.
#[derive(Clone)]
pub struct MarketAssistant {
    provider: Arc<dyn InferenceProvider>,
    knowledge: Arc<KnowledgeBase>,
    retry: RetryPolicy,
    model: String,
}

impl MarketAssistant {
    pub fn new(provider: Arc<dyn InferenceProvider>) -> Self {
        Self {
            provider,
            knowledge: Arc::new(KnowledgeBase::builtin()),
            retry: RetryPolicy::default(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Builds a Gemini-backed assistant, or a demo one when no credential is
    /// configured.
    pub fn from_config(config: &AssistantConfig) -> Self {
        let provider: Arc<dyn InferenceProvider> = match config.api_key() {
            Some(key) => Arc::new(
                GeminiProvider::with_base_url(key, config.provider.base_url.clone())
                    .timeout(config.timeout()),
            ),
            None => {
                tracing::warn!("no API key configured, using demo responses");
                Arc::new(DemoProvider)
            }
        };
        Self::new(provider)
            .with_model(config.provider.model.clone())
            .with_retry_policy(config.retry_policy())
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_knowledge(mut self, knowledge: KnowledgeBase) -> Self {
        if knowledge.is_empty() {
            tracing::warn!("knowledge base is empty, chat answers will carry no context");
        }
        self.knowledge = Arc::new(knowledge);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub async fn generate_campaign(
        &self,
        product: &str,
        audience: &str,
        platform: &str,
    ) -> Result<CampaignResult, AssistantError> {
        let request = build_campaign_request(&self.model, product, audience, platform);
        let response = self.invoke(Tool::Campaign, &request).await?;
        Ok(decode_structured(response.text.as_deref(), &CAMPAIGN_SCHEMA)?)
    }

    pub async fn generate_pitch(
        &self,
        product: &str,
        persona: &str,
        industry: &str,
    ) -> Result<PitchResult, AssistantError> {
        let request = build_pitch_request(&self.model, product, persona, industry);
        let response = self.invoke(Tool::Pitch, &request).await?;
        Ok(decode_structured(response.text.as_deref(), &PITCH_SCHEMA)?)
    }

    pub async fn score_lead(
        &self,
        name: &str,
        budget: &str,
        need: &str,
        urgency: &str,
    ) -> Result<LeadResult, AssistantError> {
        let request = build_lead_request(&self.model, name, budget, need, urgency);
        let response = self.invoke(Tool::Lead, &request).await?;
        Ok(decode_structured(response.text.as_deref(), &LEAD_SCHEMA)?)
    }

    /// Answer a question from the knowledge base. `history` is accepted for
    /// the caller's bookkeeping but each question is answered on its own.
    pub async fn ask_chatbot(
        &self,
        query: &str,
        history: &[ChatTurn],
    ) -> Result<String, AssistantError> {
        let context = self.knowledge.select(query);
        let request = build_chat_request(&self.model, query, history, &context);
        let response = self.invoke(Tool::Chat, &request).await?;
        Ok(decode_chat(response.text))
    }

    async fn invoke(
        &self,
        tool: Tool,
        request: &InferenceRequest,
    ) -> Result<InferenceResponse, AssistantError> {
        let span = tracing::info_span!(
            "inference",
            tool = %tool,
            trace_id = %Uuid::new_v4(),
            model = %request.model
        );
        async {
            let response = self
                .retry
                .run(|| self.provider.generate(request))
                .await?;
            tracing::info!(
                input_tokens = ?response.input_tokens,
                output_tokens = ?response.output_tokens,
                finish_reason = ?response.finish_reason,
                "inference succeeded"
            );
            Ok::<_, AssistantError>(response)
        }
        .instrument(span)
        .await
    }
}
