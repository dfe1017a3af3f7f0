//! Type-safe schema generation for OpenAI structured outputs.
//!
//! `schemars` produces draft-07 schemas with `$ref`s into a `definitions`
//! table. OpenAI strict mode wants a single inlined tree where every object
//! has `additionalProperties: false` and lists all of its properties in
//! `required` (nullable ones included).

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Trait for types that can be used as OpenAI structured output.
///
/// Blanket-implemented for any `JsonSchema + DeserializeOwned` type.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// OpenAI strict-mode schema for this type.
    fn openai_schema() -> Value {
        let mut root = serde_json::to_value(schema_for!(Self)).unwrap_or_default();

        let definitions = match &mut root {
            Value::Object(map) => {
                map.remove("$schema");
                map.remove("definitions")
            }
            _ => None,
        };

        strictify(&mut root, definitions.as_ref());
        root
    }

    /// Schema name for this type (used as the `json_schema.name`).
    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

fn strictify(value: &mut Value, definitions: Option<&Value>) {
    match value {
        Value::Object(map) => {
            if let Some(inlined) = resolve_ref(map, definitions) {
                *value = inlined;
                strictify(value, definitions);
                return;
            }

            if map.get("type").and_then(Value::as_str) == Some("object") {
                close_object(map);
            }

            for child in map.values_mut() {
                strictify(child, definitions);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                strictify(item, definitions);
            }
        }
        _ => {}
    }
}

fn resolve_ref(map: &Map<String, Value>, definitions: Option<&Value>) -> Option<Value> {
    let name = map
        .get("$ref")?
        .as_str()?
        .strip_prefix("#/definitions/")?;
    definitions?.get(name).cloned()
}

fn close_object(map: &mut Map<String, Value>) {
    map.insert("additionalProperties".to_string(), Value::Bool(false));

    let required: Vec<Value> = match map.get("properties") {
        Some(Value::Object(props)) => props.keys().cloned().map(Value::String).collect(),
        _ => return,
    };
    map.insert("required".to_string(), Value::Array(required));
}
