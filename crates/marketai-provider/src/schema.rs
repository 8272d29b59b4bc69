//! Static response-shape descriptors in the Gemini schema dialect.
//!
//! Each structured tool gets one `static` descriptor; requests borrow it
//! instead of building a schema object per call.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSchema {
    String,
    Number,
    Array(&'static ResponseSchema),
    Object {
        properties: &'static [(&'static str, ResponseSchema)],
        required: &'static [&'static str],
    },
}

const AD_COPY: ResponseSchema = ResponseSchema::Object {
    properties: &[
        ("variation", ResponseSchema::String),
        ("text", ResponseSchema::String),
    ],
    required: &["variation", "text"],
};

const STRING_LIST: ResponseSchema = ResponseSchema::Array(&ResponseSchema::String);

pub static CAMPAIGN_SCHEMA: ResponseSchema = ResponseSchema::Object {
    properties: &[
        ("objectives", ResponseSchema::String),
        ("contentIdeas", STRING_LIST),
        ("adCopies", ResponseSchema::Array(&AD_COPY)),
        ("ctas", STRING_LIST),
    ],
    required: &["objectives", "contentIdeas", "adCopies", "ctas"],
};

pub static PITCH_SCHEMA: ResponseSchema = ResponseSchema::Object {
    properties: &[
        ("elevatorPitch", ResponseSchema::String),
        ("valueProposition", ResponseSchema::String),
        ("differentiators", STRING_LIST),
        ("callToAction", ResponseSchema::String),
    ],
    required: &[
        "elevatorPitch",
        "valueProposition",
        "differentiators",
        "callToAction",
    ],
};

pub static LEAD_SCHEMA: ResponseSchema = ResponseSchema::Object {
    properties: &[
        ("score", ResponseSchema::Number),
        ("reasoning", ResponseSchema::String),
        ("probabilityOfConversion", ResponseSchema::Number),
        ("recommendedActions", STRING_LIST),
    ],
    required: &[
        "score",
        "reasoning",
        "probabilityOfConversion",
        "recommendedActions",
    ],
};

impl ResponseSchema {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Number => "NUMBER",
            Self::Array(_) => "ARRAY",
            Self::Object { .. } => "OBJECT",
        }
    }

    pub fn required(&self) -> &'static [&'static str] {
        match *self {
            Self::Object { required, .. } => required,
            _ => &[],
        }
    }

    /// A value of this shape filled with `text` and zeroes, one item per array.
    pub fn placeholder(&self, text: &str) -> Value {
        match *self {
            Self::String => Value::String(text.to_string()),
            Self::Number => Value::from(0),
            Self::Array(items) => Value::Array(vec![items.placeholder(text)]),
            Self::Object { properties, .. } => {
                let map: Map<String, Value> = properties
                    .iter()
                    .map(|(key, schema)| (key.to_string(), schema.placeholder(text)))
                    .collect();
                Value::Object(map)
            }
        }
    }
}

struct Properties(&'static [(&'static str, ResponseSchema)]);

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, schema) in self.0 {
            map.serialize_entry(key, schema)?;
        }
        map.end()
    }
}

impl Serialize for ResponseSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::String | Self::Number => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("type", self.type_name())?;
                map.end()
            }
            Self::Array(items) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", self.type_name())?;
                map.serialize_entry("items", items)?;
                map.end()
            }
            Self::Object {
                properties,
                required,
            } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", self.type_name())?;
                map.serialize_entry("properties", &Properties(*properties))?;
                map.serialize_entry("required", required)?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn campaign_schema_serializes_to_gemini_dialect() {
        let value = serde_json::to_value(&CAMPAIGN_SCHEMA).unwrap();
        assert_eq!(value["type"], "OBJECT");
        assert_eq!(value["properties"]["contentIdeas"]["type"], "ARRAY");
        assert_eq!(value["properties"]["contentIdeas"]["items"]["type"], "STRING");
        assert_eq!(
            value["properties"]["adCopies"]["items"]["required"],
            serde_json::json!(["variation", "text"])
        );
        assert_eq!(
            value["required"],
            serde_json::json!(["objectives", "contentIdeas", "adCopies", "ctas"])
        );
    }

    #[test]
    fn lead_schema_uses_number_scores() {
        let value = serde_json::to_value(&LEAD_SCHEMA).unwrap();
        assert_eq!(value["properties"]["score"]["type"], "NUMBER");
        assert_eq!(value["properties"]["probabilityOfConversion"]["type"], "NUMBER");
    }

    #[test]
    fn required_lists_only_object_fields() {
        assert_eq!(PITCH_SCHEMA.required().len(), 4);
        assert!(ResponseSchema::String.required().is_empty());

        let campaign = CAMPAIGN_SCHEMA.placeholder("demo");
        assert_eq!(campaign["adCopies"][0]["variation"], "demo");
        assert_eq!(campaign["adCopies"][0]["text"], "demo");
    }

    #[test]
    fn placeholder_fills_every_property() {
        let value = PITCH_SCHEMA.placeholder("demo");
        assert_eq!(value["elevatorPitch"], "demo");
        assert_eq!(value["differentiators"], serde_json::json!(["demo"]));

        let lead = LEAD_SCHEMA.placeholder("demo");
        assert_eq!(lead["score"], 0);
    }
}
