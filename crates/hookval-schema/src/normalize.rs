//! Value conversion and the checks JSON Schema cannot express.
//!
//! Schemas may carry two string extensions:
//! - `x-trim: true` trims surrounding whitespace.
//! - `x-case: "upper" | "lower"` folds case when converting and is checked
//!   when not converting.

use serde_json::{Map, Number, Value};

use crate::detail::Detail;
use crate::messages::{child_segments, Describer};
use crate::options::{EngineOptions, Presence};
use crate::transform::is_object_schema;

const TRIM_KEYWORD: &str = "x-trim";
const CASE_KEYWORD: &str = "x-case";

/// Drop object keys the schema does not declare.
pub(crate) fn strip_unknown(value: &mut Value, schema: &Value) {
    match value {
        Value::Object(map) => {
            let Some(properties) = declared_properties(schema) else {
                return;
            };
            if accepts_additional(schema) {
                for (key, child) in map.iter_mut() {
                    if let Some(child_schema) = properties.get(key) {
                        strip_unknown(child, child_schema);
                    }
                }
                return;
            }

            map.retain(|key, _| properties.contains_key(key));
            for (key, child) in map.iter_mut() {
                if let Some(child_schema) = properties.get(key) {
                    strip_unknown(child, child_schema);
                }
            }
        }
        Value::Array(items) => {
            if let Some(item_schema) = schema.get("items").filter(|s| s.is_object()) {
                for item in items {
                    strip_unknown(item, item_schema);
                }
            }
        }
        _ => {}
    }
}

/// Apply defaults, string extensions and string coercion in place.
pub(crate) fn convert(value: &mut Value, schema: &Value, insert_defaults: bool) {
    match value {
        Value::Object(map) => {
            let Some(properties) = declared_properties(schema) else {
                return;
            };
            for (key, child_schema) in properties {
                match map.get_mut(key) {
                    Some(child) => convert(child, child_schema, insert_defaults),
                    None if insert_defaults => {
                        if let Some(default) = child_schema.get("default") {
                            map.insert(key.clone(), default.clone());
                        }
                    }
                    None => {}
                }
            }
        }
        Value::Array(items) => {
            if let Some(item_schema) = schema.get("items").filter(|s| s.is_object()) {
                for item in items {
                    convert(item, item_schema, insert_defaults);
                }
            }
        }
        Value::String(text) => {
            if let Some(coerced) = coerce_string(text, schema) {
                *value = coerced;
                return;
            }
            if schema.get(TRIM_KEYWORD).and_then(Value::as_bool) == Some(true) {
                *text = text.trim().to_string();
            }
            match schema.get(CASE_KEYWORD).and_then(Value::as_str) {
                Some("upper") => *text = text.to_uppercase(),
                Some("lower") => *text = text.to_lowercase(),
                _ => {}
            }
        }
        _ => {}
    }
}

fn coerce_string(text: &str, schema: &Value) -> Option<Value> {
    let trimmed = text.trim();
    match schema.get("type").and_then(Value::as_str)? {
        "integer" => trimmed.parse::<i64>().ok().map(Value::from),
        "number" => trimmed
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        "boolean" => match trimmed.to_ascii_lowercase().as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

/// Collect failures for rules outside JSON Schema: case checks when not
/// converting, and declared keys under `presence: forbidden`.
pub(crate) fn extension_checks(
    value: &Value,
    schema: &Value,
    segments: &[String],
    options: &EngineOptions,
    describer: &Describer<'_>,
    out: &mut Vec<Detail>,
) {
    match value {
        Value::Object(map) => {
            let Some(properties) = declared_properties(schema) else {
                return;
            };
            for (key, child_schema) in properties {
                let Some(child) = map.get(key) else {
                    continue;
                };
                let child_path = child_segments(segments, key);
                if options.presence == Presence::Forbidden {
                    let label = describer.label(&child_path, Some(child_schema));
                    out.push(describer.base_detail(
                        "any.unknown",
                        &child_path,
                        &label,
                        Some(child),
                        format!("\"{label}\" is not allowed"),
                    ));
                    continue;
                }
                extension_checks(child, child_schema, &child_path, options, describer, out);
            }
        }
        Value::Array(items) => {
            if let Some(item_schema) = schema.get("items").filter(|s| s.is_object()) {
                for (index, item) in items.iter().enumerate() {
                    let item_path = child_segments(segments, &index.to_string());
                    extension_checks(item, item_schema, &item_path, options, describer, out);
                }
            }
        }
        Value::String(text) if !options.convert => {
            let (code, expected, folded) = match schema.get(CASE_KEYWORD).and_then(Value::as_str) {
                Some("upper") => ("string.uppercase", "uppercase", text.to_uppercase()),
                Some("lower") => ("string.lowercase", "lowercase", text.to_lowercase()),
                _ => return,
            };
            if folded != *text {
                let label = describer.label(segments, Some(schema));
                out.push(describer.base_detail(
                    code,
                    segments,
                    &label,
                    Some(value),
                    format!("\"{label}\" must only contain {expected} characters"),
                ));
            }
        }
        _ => {}
    }
}

fn declared_properties(schema: &Value) -> Option<&Map<String, Value>> {
    let map = schema.as_object()?;
    if !is_object_schema(map) {
        return None;
    }
    map.get("properties").and_then(Value::as_object)
}

fn accepts_additional(schema: &Value) -> bool {
    matches!(
        schema.get("additionalProperties"),
        Some(Value::Bool(true)) | Some(Value::Object(_))
    )
}
