//! Mapping of JSON Schema keyword failures to coded detail records.

use serde_json::{Map, Value};

use crate::detail::{path_to_string, Detail};
use crate::transform::composed_properties;

const MAX_REF_HOPS: usize = 16;

/// Where a failure happened, resolved against the compiled schema and the
/// checked value.
pub(crate) struct Failure<'a> {
    pub instance_path: &'a str,
    pub schema_path: &'a str,
    pub raw_message: String,
}

/// Lookup state shared by every failure of one validation call.
pub(crate) struct Describer<'a> {
    pub schema: &'a Value,
    pub instance: &'a Value,
    pub titles_as_labels: bool,
}

impl<'a> Describer<'a> {
    /// Turn one keyword failure into zero or more details.
    ///
    /// `required`, `additionalProperties` and `unevaluatedProperties` failures
    /// expand to one detail per offending key.
    pub fn describe(&self, failure: &Failure<'_>) -> Vec<Detail> {
        let schema_segments = pointer_segments(failure.schema_path);
        let Some((keyword, parent)) = schema_segments.split_last() else {
            return vec![self.fallback(failure)];
        };

        let keyword_schema = self
            .schema_at(parent)
            .map(|schema| self.owner_of(schema, keyword));
        let keyword_value = keyword_schema.and_then(|s| s.get(keyword.as_str()));
        let segments = pointer_segments(failure.instance_path);
        let value = self.instance.pointer(failure.instance_path);

        match keyword.as_str() {
            "required" => self.missing_keys(&segments, keyword_schema, keyword_value, value),
            "additionalProperties" => {
                let declared: Vec<&str> = keyword_schema
                    .and_then(|s| s.get("properties"))
                    .and_then(Value::as_object)
                    .map(|props| props.keys().map(String::as_str).collect())
                    .unwrap_or_default();
                self.unknown_keys(&segments, &declared, value)
            }
            "unevaluatedProperties" => {
                let declared: Vec<&str> =
                    keyword_schema.map(composed_properties).unwrap_or_default();
                self.unknown_keys(&segments, &declared, value)
            }
            _ => {
                let detail = self.keyword_detail(
                    keyword,
                    keyword_value,
                    &segments,
                    keyword_schema,
                    value,
                );
                vec![detail.unwrap_or_else(|| self.fallback(failure))]
            }
        }
    }

    fn keyword_detail(
        &self,
        keyword: &str,
        limit: Option<&Value>,
        segments: &[String],
        field_schema: Option<&Value>,
        value: Option<&Value>,
    ) -> Option<Detail> {
        let label = self.label(segments, field_schema);
        let limit_text = limit.map(display_value).unwrap_or_default();

        let (code, message) = match keyword {
            "type" => return Some(self.type_detail(segments, &label, limit?, value)),
            "minLength" => (
                "string.min",
                format!("\"{label}\" length must be at least {limit_text} characters long"),
            ),
            "maxLength" => (
                "string.max",
                format!(
                    "\"{label}\" length must be less than or equal to {limit_text} characters long"
                ),
            ),
            "pattern" => {
                let shown = value.map(display_value).unwrap_or_default();
                let detail = self
                    .base_detail(
                        "string.pattern.base",
                        segments,
                        &label,
                        value,
                        format!(
                            "\"{label}\" with value \"{shown}\" fails to match the required pattern: /{limit_text}/"
                        ),
                    )
                    .with_context("pattern", limit_text.clone())
                    .with_context("regex", limit_text);
                return Some(detail);
            }
            "minimum" => (
                "number.min",
                format!("\"{label}\" must be greater than or equal to {limit_text}"),
            ),
            "maximum" => (
                "number.max",
                format!("\"{label}\" must be less than or equal to {limit_text}"),
            ),
            "exclusiveMinimum" => (
                "number.greater",
                format!("\"{label}\" must be greater than {limit_text}"),
            ),
            "exclusiveMaximum" => (
                "number.less",
                format!("\"{label}\" must be less than {limit_text}"),
            ),
            "multipleOf" => (
                "number.multiple",
                format!("\"{label}\" must be a multiple of {limit_text}"),
            ),
            "minItems" => (
                "array.min",
                format!("\"{label}\" must contain at least {limit_text} items"),
            ),
            "maxItems" => (
                "array.max",
                format!("\"{label}\" must contain less than or equal to {limit_text} items"),
            ),
            "uniqueItems" => (
                "array.unique",
                format!("\"{label}\" contains a duplicate value"),
            ),
            "minProperties" => (
                "object.min",
                format!("\"{label}\" must have at least {limit_text} keys"),
            ),
            "maxProperties" => (
                "object.max",
                format!("\"{label}\" must have less than or equal to {limit_text} keys"),
            ),
            "format" => (
                "string.format",
                format!("\"{label}\" must be a valid {limit_text}"),
            ),
            "enum" | "const" => {
                let valids = match (keyword, limit) {
                    ("enum", Some(Value::Array(items))) => items.clone(),
                    (_, Some(single)) => vec![single.clone()],
                    _ => Vec::new(),
                };
                let listed = valids
                    .iter()
                    .map(display_value)
                    .collect::<Vec<_>>()
                    .join(", ");
                let detail = self
                    .base_detail(
                        "any.only",
                        segments,
                        &label,
                        value,
                        format!("\"{label}\" must be one of [{listed}]"),
                    )
                    .with_context("valids", Value::Array(valids));
                return Some(detail);
            }
            _ => return None,
        };

        let mut detail = self.base_detail(code, segments, &label, value, message);
        if let Some(limit) = limit {
            detail = detail.with_context("limit", limit.clone());
        }
        Some(detail)
    }

    fn type_detail(
        &self,
        segments: &[String],
        label: &str,
        expected: &Value,
        value: Option<&Value>,
    ) -> Detail {
        let expected = match expected {
            Value::Array(kinds) => kinds.first().and_then(Value::as_str).unwrap_or("any"),
            other => other.as_str().unwrap_or("any"),
        };

        let (code, message) = match expected {
            "integer" if value.is_some_and(Value::is_number) => {
                ("number.integer", format!("\"{label}\" must be an integer"))
            }
            "integer" | "number" => ("number.base", format!("\"{label}\" must be a number")),
            "string" => ("string.base", format!("\"{label}\" must be a string")),
            "boolean" => ("boolean.base", format!("\"{label}\" must be a boolean")),
            "object" => ("object.base", format!("\"{label}\" must be of type object")),
            "array" => ("array.base", format!("\"{label}\" must be an array")),
            other => ("any.invalid", format!("\"{label}\" must be of type {other}")),
        };

        self.base_detail(code, segments, label, value, message)
            .with_context("type", expected)
    }

    fn missing_keys(
        &self,
        parent: &[String],
        object_schema: Option<&Value>,
        required: Option<&Value>,
        value: Option<&Value>,
    ) -> Vec<Detail> {
        let present = value.and_then(Value::as_object);
        let Some(Value::Array(required)) = required else {
            return Vec::new();
        };

        required
            .iter()
            .filter_map(Value::as_str)
            .filter(|key| !present.is_some_and(|map| map.contains_key(*key)))
            .map(|key| {
                let segments = child_segments(parent, key);
                let label = self.label(&segments, property_schema(object_schema, key));
                self.base_detail(
                    "any.required",
                    &segments,
                    &label,
                    None,
                    format!("\"{label}\" is required"),
                )
            })
            .collect()
    }

    /// Schema node at `segments` of a schema path. Local `$ref` segments are
    /// followed into the referenced schema.
    fn schema_at(&self, segments: &[String]) -> Option<&'a Value> {
        let mut node = self.schema;
        for segment in segments {
            node = match node {
                Value::Object(map) => map.get(segment.as_str())?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
            if segment == "$ref" {
                if let Value::String(reference) = node {
                    node = self.resolve_ref(reference)?;
                }
            }
        }
        Some(node)
    }

    /// Follow `$ref` from `schema` until a node carrying `keyword` is found.
    fn owner_of(&self, schema: &'a Value, keyword: &str) -> &'a Value {
        let mut node = schema;
        for _ in 0..MAX_REF_HOPS {
            if node.get(keyword).is_some() {
                break;
            }
            match node.get("$ref").and_then(Value::as_str).and_then(|r| self.resolve_ref(r)) {
                Some(target) => node = target,
                None => break,
            }
        }
        node
    }

    fn resolve_ref(&self, reference: &str) -> Option<&'a Value> {
        let pointer = reference.strip_prefix('#')?;
        if pointer.is_empty() {
            Some(self.schema)
        } else {
            self.schema.pointer(pointer)
        }
    }

    fn unknown_keys(
        &self,
        parent: &[String],
        declared: &[&str],
        value: Option<&Value>,
    ) -> Vec<Detail> {
        let Some(present) = value.and_then(Value::as_object) else {
            return Vec::new();
        };

        present
            .iter()
            .filter(|(key, _)| !declared.contains(&key.as_str()))
            .map(|(key, child)| {
                let segments = child_segments(parent, key);
                self.base_detail(
                    "object.unknown",
                    &segments,
                    key,
                    Some(child),
                    format!("\"{key}\" is not allowed"),
                )
            })
            .collect()
    }

    fn fallback(&self, failure: &Failure<'_>) -> Detail {
        let segments = pointer_segments(failure.instance_path);
        let label = self.label(&segments, None);
        self.base_detail(
            "any.invalid",
            &segments,
            &label,
            self.instance.pointer(failure.instance_path),
            failure.raw_message.clone(),
        )
    }

    pub fn base_detail(
        &self,
        code: &str,
        segments: &[String],
        label: &str,
        value: Option<&Value>,
        message: String,
    ) -> Detail {
        let mut context = Map::new();
        context.insert("key".into(), Value::String(key_of(segments).to_string()));
        context.insert("label".into(), Value::String(label.to_string()));
        if let Some(value) = value {
            context.insert("value".into(), value.clone());
        }

        Detail {
            message,
            path: path_to_string(segments),
            code: code.to_string(),
            context,
        }
    }

    /// Label for the field at `segments`, from its schema `title` when enabled.
    pub fn label(&self, segments: &[String], field_schema: Option<&Value>) -> String {
        if self.titles_as_labels {
            if let Some(title) = field_schema
                .and_then(|s| s.get("title"))
                .and_then(Value::as_str)
            {
                return title.to_string();
            }
        }
        key_of(segments).to_string()
    }
}

pub(crate) fn property_schema<'v>(object_schema: Option<&'v Value>, key: &str) -> Option<&'v Value> {
    object_schema
        .and_then(|s| s.get("properties"))
        .and_then(|props| props.get(key))
}

pub(crate) fn key_of(segments: &[String]) -> &str {
    segments.last().map(String::as_str).unwrap_or("value")
}

pub(crate) fn child_segments(parent: &[String], key: &str) -> Vec<String> {
    let mut segments = parent.to_vec();
    segments.push(key.to_string());
    segments
}

/// Split a JSON pointer into unescaped segments.
pub(crate) fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Render a value the way messages show it: strings bare, everything else as JSON.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
