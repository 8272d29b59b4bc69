use marketai_provider::ResponseSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

pub const CHAT_FALLBACK_REPLY: &str = "I'm sorry, I couldn't process that request.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Also produced for empty or non-JSON responses, which decode as `{}`.
    #[error("model response is missing required field `{field}`")]
    MissingField { field: String },
    #[error("model response has a malformed field: {message}")]
    InvalidField { message: String },
}

/// Decode structured model output. Empty, unparseable, or non-object text is
/// treated as an empty object, so it fails the required-field check rather
/// than surfacing as a syntax error.
pub fn decode_structured<T: DeserializeOwned>(
    raw: Option<&str>,
    schema: &ResponseSchema,
) -> Result<T, DecodeError> {
    let trimmed = raw.unwrap_or_default().trim();
    let value = if trimmed.is_empty() {
        Value::Object(Map::new())
    } else {
        match serde_json::from_str::<Value>(trimmed) {
            Ok(value @ Value::Object(_)) => value,
            Ok(other) => {
                tracing::debug!(kind = json_kind(&other), "model returned non-object JSON");
                Value::Object(Map::new())
            }
            Err(e) => {
                tracing::debug!(error = %e, "model returned unparseable JSON");
                Value::Object(Map::new())
            }
        }
    };

    check_required(&value, schema, "")?;
    serde_json::from_value(value).map_err(|e| DecodeError::InvalidField {
        message: e.to_string(),
    })
}

/// Chat replies are free text; an absent or empty reply becomes the fallback.
pub fn decode_chat(raw: Option<String>) -> String {
    match raw {
        Some(text) if !text.is_empty() => text,
        _ => CHAT_FALLBACK_REPLY.to_string(),
    }
}

fn check_required(value: &Value, schema: &ResponseSchema, path: &str) -> Result<(), DecodeError> {
    match (schema, value) {
        (ResponseSchema::Object { properties, .. }, Value::Object(map)) => {
            for field in schema.required() {
                if map.get(*field).map_or(true, Value::is_null) {
                    return Err(DecodeError::MissingField {
                        field: join_path(path, field),
                    });
                }
            }
            for (name, child) in properties.iter() {
                if let Some(child_value) = map.get(*name) {
                    check_required(child_value, child, &join_path(path, name))?;
                }
            }
            Ok(())
        }
        (ResponseSchema::Array(items), Value::Array(values)) => {
            for (i, item) in values.iter().enumerate() {
                check_required(item, items, &format!("{path}[{i}]"))?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn join_path(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{path}.{field}")
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use marketai_provider::{CAMPAIGN_SCHEMA, LEAD_SCHEMA, PITCH_SCHEMA};
    use marketai_schema::{CampaignResult, LeadResult, PitchResult};

    use super::*;

    const CAMPAIGN_JSON: &str = r#"{
        "objectives": "Launch awareness",
        "contentIdeas": ["Trail video", "UGC contest"],
        "adCopies": [
            {"variation": "A", "text": "Stay hydrated"},
            {"variation": "B", "text": "Refill anywhere"}
        ],
        "ctas": ["Shop now"]
    }"#;

    #[test]
    fn decodes_complete_campaign() {
        let result: CampaignResult = decode_structured(Some(CAMPAIGN_JSON), &CAMPAIGN_SCHEMA).unwrap();
        assert_eq!(result.objectives, "Launch awareness");
        assert_eq!(result.content_ideas, vec!["Trail video", "UGC contest"]);
        assert_eq!(result.ad_copies[1].variation, "B");
        assert_eq!(result.ctas, vec!["Shop now"]);
    }

    #[test]
    fn missing_field_is_reported_by_name() {
        let raw = r#"{"objectives":"x","contentIdeas":[],"adCopies":[]}"#;
        let err = decode_structured::<CampaignResult>(Some(raw), &CAMPAIGN_SCHEMA).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MissingField {
                field: "ctas".into()
            }
        );
    }

    #[test]
    fn nested_missing_field_includes_path() {
        let raw = r#"{"objectives":"x","contentIdeas":[],"ctas":[],
            "adCopies":[{"variation":"A","text":"t"},{"variation":"B"}]}"#;
        let err = decode_structured::<CampaignResult>(Some(raw), &CAMPAIGN_SCHEMA).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MissingField {
                field: "adCopies[1].text".into()
            }
        );
    }

    #[test]
    fn null_counts_as_missing() {
        let raw = r#"{"elevatorPitch":null,"valueProposition":"v","differentiators":[],"callToAction":"c"}"#;
        let err = decode_structured::<PitchResult>(Some(raw), &PITCH_SCHEMA).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { ref field } if field == "elevatorPitch"));
    }

    #[test]
    fn malformed_or_empty_text_surfaces_as_missing_field() {
        for raw in [None, Some(""), Some("   "), Some("not json {"), Some("[1, 2]"), Some("42")] {
            let err = decode_structured::<LeadResult>(raw, &LEAD_SCHEMA).unwrap_err();
            assert_eq!(
                err,
                DecodeError::MissingField {
                    field: "score".into()
                },
                "raw = {raw:?}"
            );
        }
    }

    #[test]
    fn wrong_field_type_is_invalid_field() {
        let raw = r#"{"score":"high","reasoning":"r","probabilityOfConversion":5,"recommendedActions":[]}"#;
        let err = decode_structured::<LeadResult>(Some(raw), &LEAD_SCHEMA).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidField { .. }));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let raw = "\n  {\"score\": 101, \"reasoning\": \"r\", \"probabilityOfConversion\": -3, \"recommendedActions\": [\"call\"]}  \n";
        let lead: LeadResult = decode_structured(Some(raw), &LEAD_SCHEMA).unwrap();
        assert_eq!(lead.score, 101.0);
        assert_eq!(lead.probability_of_conversion, -3.0);
    }

    #[test]
    fn decoding_is_idempotent() {
        let first: CampaignResult = decode_structured(Some(CAMPAIGN_JSON), &CAMPAIGN_SCHEMA).unwrap();
        let second: CampaignResult = decode_structured(Some(CAMPAIGN_JSON), &CAMPAIGN_SCHEMA).unwrap();
        assert_eq!(first, second);

        let bad = Some(r#"{"objectives":"x"}"#);
        assert_eq!(
            decode_structured::<CampaignResult>(bad, &CAMPAIGN_SCHEMA).unwrap_err(),
            decode_structured::<CampaignResult>(bad, &CAMPAIGN_SCHEMA).unwrap_err()
        );
    }

    #[test]
    fn chat_passes_text_through_verbatim() {
        let text = "## Heading\n\n* point one\n* point two\n".to_string();
        assert_eq!(decode_chat(Some(text.clone())), text);
    }

    #[test]
    fn chat_without_text_uses_fallback() {
        assert_eq!(decode_chat(None), CHAT_FALLBACK_REPLY);
        assert_eq!(decode_chat(Some(String::new())), CHAT_FALLBACK_REPLY);
    }
}
