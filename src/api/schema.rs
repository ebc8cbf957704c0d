//! Response schemas for structured generation.
//!
//! Gemini takes an OpenAPI-flavoured schema with upper-case type names. The
//! same schema is lowered to standard JSON Schema to validate what comes back.

use serde_json::{json, Map, Value};

pub fn devotional_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "reading": {
                "type": "OBJECT",
                "properties": {
                    "reference": { "type": "STRING" },
                    "text": { "type": "STRING" }
                },
                "required": ["reference", "text"]
            },
            "reflection": { "type": "STRING" },
            "prayer": { "type": "STRING" }
        },
        "required": ["reading", "reflection", "prayer"]
    })
}

pub fn enrichment_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "keywords": { "type": "ARRAY", "items": { "type": "STRING" } },
            "aiReflection": { "type": "STRING" },
            "crossReferences": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "reference": { "type": "STRING" },
                        "text": { "type": "STRING" }
                    },
                    "required": ["reference", "text"]
                }
            }
        },
        "required": ["keywords", "aiReflection", "crossReferences"]
    })
}

/// Lower-case every `type` keyword so the schema reads as JSON Schema.
pub fn to_json_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut lowered = Map::with_capacity(map.len());
            for (key, value) in map {
                let converted = match (key.as_str(), value) {
                    ("type", Value::String(kind)) => Value::String(kind.to_ascii_lowercase()),
                    // Property names are user keys, not schema keywords.
                    ("properties", Value::Object(props)) => Value::Object(
                        props
                            .iter()
                            .map(|(name, prop)| (name.clone(), to_json_schema(prop)))
                            .collect(),
                    ),
                    _ => to_json_schema(value),
                };
                lowered.insert(key.clone(), converted);
            }
            Value::Object(lowered)
        }
        Value::Array(items) => Value::Array(items.iter().map(to_json_schema).collect()),
        other => other.clone(),
    }
}

/// Validate `instance` against a Gemini schema. Returns every violation.
pub fn validate(gemini_schema: &Value, instance: &Value) -> Result<(), String> {
    let schema = to_json_schema(gemini_schema);
    let validator = jsonschema::validator_for(&schema).map_err(|err| err.to_string())?;
    let errors: Vec<String> = validator
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}
