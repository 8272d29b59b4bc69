use marketai_provider::{InferenceRequest, CAMPAIGN_SCHEMA, LEAD_SCHEMA, PITCH_SCHEMA};
use marketai_schema::ChatTurn;

use crate::context::SelectedContext;

const CHAT_FORMATTING_RULES: &str = "IMPORTANT FORMATTING RULES:
- Use clear line breaks between sections (add blank lines)
- Use bullet points (* or -) for lists, with each point on a NEW LINE
- Use numbered lists (1., 2., 3.) when showing steps or priorities
- Use ## for main headings and ### for subheadings
- Use **bold** for emphasis on key terms
- Keep paragraphs short and separated by blank lines
- Each bullet point should be on its own line with proper spacing";

pub fn build_campaign_request(
    model: &str,
    product: &str,
    audience: &str,
    platform: &str,
) -> InferenceRequest {
    let prompt = format!(
        "Generate a marketing campaign for:\n\
         Product: {product}\n\
         Target Audience: {audience}\n\
         Platform: {platform}"
    );
    InferenceRequest::structured(model, prompt, &CAMPAIGN_SCHEMA)
}

pub fn build_pitch_request(
    model: &str,
    product: &str,
    persona: &str,
    industry: &str,
) -> InferenceRequest {
    let prompt = format!(
        "Generate a sales pitch for:\n\
         Product: {product}\n\
         Customer Persona: {persona}\n\
         Industry: {industry}"
    );
    InferenceRequest::structured(model, prompt, &PITCH_SCHEMA)
}

/// `urgency` may be empty; the line is still sent.
pub fn build_lead_request(
    model: &str,
    name: &str,
    budget: &str,
    need: &str,
    urgency: &str,
) -> InferenceRequest {
    let prompt = format!(
        "Score this sales lead:\n\
         Lead Name: {name}\n\
         Budget Info: {budget}\n\
         Business Need: {need}\n\
         Urgency Level: {urgency}"
    );
    InferenceRequest::structured(model, prompt, &LEAD_SCHEMA)
}

/// Single-shot chat prompt: instructions, selected context, then the question.
///
/// Prior turns are not forwarded; each question is answered from the
/// knowledge context alone.
pub fn build_chat_request(
    model: &str,
    query: &str,
    history: &[ChatTurn],
    context: &SelectedContext<'_>,
) -> InferenceRequest {
    tracing::debug!(
        history_turns = history.len(),
        context_snippets = context.snippets.len(),
        fallback = context.fallback,
        "building chat prompt"
    );

    let prompt = format!(
        "You are the MarketAI Expert Assistant. You provide high-level advice on sales and marketing.\n\n\
         Your knowledge base contains the following specific information:\n\
         {context}\n\n\
         {CHAT_FORMATTING_RULES}\n\n\
         Answer the user's question using the formatting rules above. If the information is from the context, mention it professionally. If not, provide your expert general opinion while stating it's not from internal documentation.\n\n\
         USER QUESTION: {query}",
        context = context.render(),
    );
    InferenceRequest::text(model, prompt)
}
