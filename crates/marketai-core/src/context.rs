//! Keyword context selection for the chat assistant.
//!
//! This is a crude first-word substring heuristic, not semantic retrieval:
//! a snippet is picked when the query mentions the first word of its topic,
//! or when its content mentions the first word of the query. When nothing
//! matches, the whole store is offered so the model always gets context.

use marketai_schema::KnowledgeSnippet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedContext<'a> {
    pub snippets: Vec<&'a KnowledgeSnippet>,
    /// True when no snippet matched and the full store was returned.
    pub fallback: bool,
}

impl SelectedContext<'_> {
    /// Matched snippets are tagged with their source; fallback snippets are
    /// listed as plain `topic: content` lines.
    pub fn render(&self) -> String {
        self.snippets
            .iter()
            .map(|s| {
                if self.fallback {
                    format!("{}: {}", s.topic, s.content)
                } else {
                    format!("[SOURCE: {}] {}", s.topic, s.content)
                }
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

pub fn select_context<'a>(query: &str, store: &'a [KnowledgeSnippet]) -> SelectedContext<'a> {
    let query = query.to_lowercase();
    let query_token = first_token(&query);

    let matched: Vec<&KnowledgeSnippet> = store
        .iter()
        .filter(|snippet| {
            let topic = snippet.topic.to_lowercase();
            query.contains(first_token(&topic)) || snippet.content.to_lowercase().contains(query_token)
        })
        .collect();

    if matched.is_empty() {
        SelectedContext {
            snippets: store.iter().collect(),
            fallback: true,
        }
    } else {
        SelectedContext {
            snippets: matched,
            fallback: false,
        }
    }
}

/// Text before the first space. A leading space yields `""`, which every
/// snippet contains.
fn first_token(text: &str) -> &str {
    text.split(' ').next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBase;

    fn topics<'a>(selected: &SelectedContext<'a>) -> Vec<&'a str> {
        selected.snippets.iter().map(|s| s.topic.as_str()).collect()
    }

    #[test]
    fn topic_first_word_in_query_matches() {
        let kb = KnowledgeBase::builtin();
        let selected = select_context("Any marketing tips for spring?", kb.snippets());
        assert!(!selected.fallback);
        assert_eq!(topics(&selected), vec!["Marketing Platforms"]);
    }

    #[test]
    fn query_first_word_in_content_matches() {
        let kb = KnowledgeBase::builtin();
        // "lead" hits the BANT topic and the "Lead Qualifier" mention.
        let selected = select_context("Lead scoring help", kb.snippets());
        assert_eq!(
            topics(&selected),
            vec!["Lead Scoring (BANT)", "MarketAI Platform Info"]
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        let kb = KnowledgeBase::builtin();
        let lower = select_context("seo", kb.snippets());
        let upper = select_context("SEO", kb.snippets());
        assert_eq!(lower, upper);
        assert_eq!(topics(&lower), vec!["Modern SEO"]);
    }

    #[test]
    fn no_match_falls_back_to_full_store() {
        let kb = KnowledgeBase::builtin();
        let selected = select_context("What platform is best for B2B?", kb.snippets());
        assert!(selected.fallback);
        assert_eq!(selected.snippets.len(), kb.len());
    }

    #[test]
    fn fallback_is_never_empty_for_unrelated_queries() {
        let kb = KnowledgeBase::builtin();
        for query in ["zzz", "quantum chromodynamics", "?", "ünïcödé"] {
            let selected = select_context(query, kb.snippets());
            assert!(!selected.snippets.is_empty(), "empty selection for {query:?}");
        }
    }

    #[test]
    fn empty_query_matches_every_snippet() {
        let kb = KnowledgeBase::builtin();
        let selected = select_context("", kb.snippets());
        assert!(!selected.fallback);
        assert_eq!(selected.snippets.len(), kb.len());
    }

    #[test]
    fn leading_space_makes_query_token_match_everything() {
        let kb = KnowledgeBase::builtin();
        let selected = select_context(" seo", kb.snippets());
        assert!(!selected.fallback);
        assert_eq!(selected.snippets.len(), kb.len());
    }

    #[test]
    fn only_spaces_separate_tokens() {
        let kb = KnowledgeBase::builtin();
        // "seo\ttips" is one token, found in no content and no topic prefix.
        let selected = select_context("seo\ttips", kb.snippets());
        assert!(selected.fallback);
        assert_eq!(first_token("seo\ttips now"), "seo\ttips");
    }

    #[test]
    fn render_tags_sources_only_when_matched() {
        let kb = KnowledgeBase::builtin();
        let matched = select_context("seo", kb.snippets()).render();
        assert!(matched.starts_with("[SOURCE: Modern SEO] SEO in 2025"));

        let fallback = select_context("zzz", kb.snippets()).render();
        assert!(fallback.contains("Marketing Platforms: LinkedIn is best for B2B"));
        assert!(!fallback.contains("[SOURCE:"));
        assert_eq!(fallback.matches("\n\n").count(), kb.len() - 1);
    }

    #[test]
    fn empty_store_selects_nothing() {
        let selected = select_context("anything", &[]);
        assert!(selected.fallback);
        assert!(selected.snippets.is_empty());
    }
}
