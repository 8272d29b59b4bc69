use marketai_schema::KnowledgeSnippet;

use crate::context::{select_context, SelectedContext};

const BUILTIN_SNIPPETS: &[(&str, &str)] = &[
    (
        "Sales Pitch Best Practices",
        "An effective elevator pitch should be under 30 seconds. Focus on the problem first, then your unique solution. Always end with a specific call to action (CTA).",
    ),
    (
        "Lead Scoring (BANT)",
        "Traditional lead scoring often follows BANT: Budget, Authority, Need, and Timeline. High-quality leads usually satisfy at least 3 of these criteria.",
    ),
    (
        "Marketing Platforms",
        "LinkedIn is best for B2B professional networking. TikTok and Instagram are dominant for B2C visual storytelling. Email remains the highest ROI channel for retention.",
    ),
    (
        "MarketAI Platform Info",
        "MarketAI Suite provides three main tools: Campaign Generator for strategy, Sales Pitch Creator for outreach, and Lead Qualifier for scoring prospects using Gemini 3.0 AI.",
    ),
    (
        "Modern SEO",
        "SEO in 2025 is about 'Search Generative Experience' (SGE). Content must be high-authority and directly answer user intent to be picked up by AI overviews.",
    ),
];

/// Read-only snippet store shared by every chat call.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    snippets: Vec<KnowledgeSnippet>,
}

impl KnowledgeBase {
    pub fn new(snippets: Vec<KnowledgeSnippet>) -> Self {
        Self { snippets }
    }

    /// The marketing knowledge shipped with the assistant.
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_SNIPPETS
                .iter()
                .map(|(topic, content)| KnowledgeSnippet::new(*topic, *content))
                .collect(),
        )
    }

    pub fn snippets(&self) -> &[KnowledgeSnippet] {
        &self.snippets
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    pub fn select(&self, query: &str) -> SelectedContext<'_> {
        select_context(query, &self.snippets)
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}
