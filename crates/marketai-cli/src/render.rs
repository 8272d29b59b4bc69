use marketai_core::AssistantError;
use marketai_schema::{CampaignResult, LeadResult, PitchResult, Tool};

pub const CHAT_GREETING: &str = "Hello! I'm your MarketAI Assistant, powered by RAG technology. I have access to our internal sales and marketing knowledge base. How can I help you today?";

const HIGH_DEMAND: &str = "The AI service is experiencing high demand. We tried multiple times but couldn't connect. Please wait a moment and try again.";
const CHAT_HIGH_DEMAND: &str =
    "The AI service is experiencing high demand right now. Please try again in a moment.";

/// Message shown to the user when a tool call fails.
pub fn failure_message(tool: Tool, err: &AssistantError) -> String {
    if err.is_capacity_problem() {
        return match tool {
            Tool::Chat => CHAT_HIGH_DEMAND.to_string(),
            _ => HIGH_DEMAND.to_string(),
        };
    }
    match tool {
        Tool::Campaign | Tool::Pitch => {
            "Generation failed. Please check your API key and try again.".to_string()
        }
        Tool::Lead => "Scoring failed. Please check your API key and try again.".to_string(),
        Tool::Chat => format!("I encountered an error: {err}. Please try again."),
    }
}

pub fn campaign(result: &CampaignResult) -> String {
    let mut out = String::new();
    section(&mut out, "Objectives");
    out.push_str(&result.objectives);
    out.push('\n');
    section(&mut out, "Content ideas");
    bullets(&mut out, &result.content_ideas);
    section(&mut out, "Ad copy");
    for copy in &result.ad_copies {
        out.push_str(&format!("[{}] {}\n", copy.variation, copy.text));
    }
    section(&mut out, "Calls to action");
    bullets(&mut out, &result.ctas);
    out
}

pub fn pitch(result: &PitchResult) -> String {
    let mut out = String::new();
    section(&mut out, "Elevator pitch");
    out.push_str(&result.elevator_pitch);
    out.push('\n');
    section(&mut out, "Value proposition");
    out.push_str(&result.value_proposition);
    out.push('\n');
    section(&mut out, "Differentiators");
    bullets(&mut out, &result.differentiators);
    section(&mut out, "Call to action");
    out.push_str(&result.call_to_action);
    out.push('\n');
    out
}

pub fn lead(result: &LeadResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Score: {}/100 ({})\nConversion probability: {}%\n",
        result.score,
        grade(result.score),
        result.probability_of_conversion
    ));
    section(&mut out, "Reasoning");
    out.push_str(&result.reasoning);
    out.push('\n');
    section(&mut out, "Recommended actions");
    bullets(&mut out, &result.recommended_actions);
    out
}

// Values outside 0..=100 are shown as returned.
fn grade(score: f64) -> &'static str {
    if score >= 80.0 {
        "hot"
    } else if score >= 50.0 {
        "warm"
    } else {
        "cold"
    }
}

fn section(out: &mut String, title: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(&format!("{title}\n{}\n", "-".repeat(title.len())));
}

fn bullets(out: &mut String, items: &[String]) {
    if items.is_empty() {
        out.push_str("(none)\n");
    }
    for item in items {
        out.push_str(&format!("* {item}\n"));
    }
}
