//! Translation of engine details into consumer-facing messages.
//!
//! The table shape is fixed when the hook is built. Every shape falls back to
//! the engine's own message when it has nothing to say about a detail.
//!
//! Templates may use `${key}` for the field label and `${name}` for any entry
//! of the detail context, such as `${limit}` or `${pattern}`. Unknown
//! placeholders are left as written.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use hookval_schema::Detail;
use regex::Regex;
use serde_json::Value;
use tracing::trace;

use crate::error::{HookError, Result};

type CodeFn = dyn Fn(&Detail) -> Option<String> + Send + Sync;

/// How failing fields are turned into messages.
#[derive(Clone, Default)]
pub enum Translation {
    /// Pass engine messages through unchanged.
    #[default]
    None,
    /// Per error-code message functions.
    ByCode(TranslationTable),
    /// One template for every failing field.
    Generic(String),
    /// Ordered matchers against the engine message; first match wins.
    Matchers(Vec<Matcher>),
}

impl Translation {
    pub fn generic(template: impl Into<String>) -> Self {
        Translation::Generic(template.into())
    }

    /// Parse a table from JSON.
    ///
    /// - a string is a generic template
    /// - an array of `{"substring" | "regex": ..., "message": ...}` is a matcher list
    /// - an object maps error codes to templates; `null` entries defer to the
    ///   engine message
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Translation::None),
            Value::String(template) => Ok(Translation::Generic(template.clone())),
            Value::Array(items) => items
                .iter()
                .map(Matcher::from_value)
                .collect::<Result<Vec<_>>>()
                .map(Translation::Matchers),
            Value::Object(map) => {
                let mut table = TranslationTable::new();
                for (code, template) in map {
                    match template {
                        Value::String(template) => {
                            let template = template.clone();
                            table = table.on(code.clone(), move |_| Some(template.clone()));
                        }
                        Value::Null => table = table.on(code.clone(), |_| None),
                        other => {
                            return Err(HookError::configuration(format!(
                                "translation for {code} must be a string or null, got {other}"
                            )))
                        }
                    }
                }
                Ok(Translation::ByCode(table))
            }
            other => Err(HookError::configuration(format!(
                "translations must be a string, array or object, got {other}"
            ))),
        }
    }

    /// Translate one detail, or `None` when this table has nothing for it.
    pub fn translate(&self, detail: &Detail) -> Option<String> {
        let template = match self {
            Translation::None => return None,
            Translation::ByCode(table) => table.lookup(detail)?,
            Translation::Generic(template) => template.clone(),
            Translation::Matchers(matchers) => matchers
                .iter()
                .find(|matcher| matcher.rule.matches(&detail.message))?
                .message
                .clone(),
        };
        trace!(path = %detail.path, code = %detail.code, "translated detail");
        Some(interpolate(&template, detail))
    }

    /// Translated message, falling back to the engine message.
    pub fn message_for(&self, detail: &Detail) -> String {
        self.translate(detail)
            .unwrap_or_else(|| detail.message.clone())
    }
}

impl fmt::Debug for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Translation::None => f.write_str("None"),
            Translation::ByCode(table) => f.debug_tuple("ByCode").field(table).finish(),
            Translation::Generic(template) => f.debug_tuple("Generic").field(template).finish(),
            Translation::Matchers(matchers) => f.debug_tuple("Matchers").field(matchers).finish(),
        }
    }
}

/// Error code to message function.
#[derive(Clone, Default)]
pub struct TranslationTable {
    entries: HashMap<String, Arc<CodeFn>>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the message function for `code`.
    ///
    /// Returning `None` defers to the engine message for that detail.
    pub fn on<F>(mut self, code: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Detail) -> Option<String> + Send + Sync + 'static,
    {
        self.entries.insert(code.into(), Arc::new(f));
        self
    }

    fn lookup(&self, detail: &Detail) -> Option<String> {
        let entry = self.entries.get(&detail.code)?;
        entry(detail)
    }
}

impl fmt::Debug for TranslationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut codes: Vec<&String> = self.entries.keys().collect();
        codes.sort();
        f.debug_struct("TranslationTable")
            .field("codes", &codes)
            .finish()
    }
}

/// Test applied to an engine message.
#[derive(Debug, Clone)]
pub enum MatchRule {
    Substring(String),
    Regex(Regex),
}

impl MatchRule {
    pub fn matches(&self, message: &str) -> bool {
        match self {
            MatchRule::Substring(needle) => message.contains(needle.as_str()),
            MatchRule::Regex(regex) => regex.is_match(message),
        }
    }
}

/// One entry of a matcher list.
#[derive(Debug, Clone)]
pub struct Matcher {
    pub rule: MatchRule,
    pub message: String,
}

impl Matcher {
    pub fn substring(needle: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: MatchRule::Substring(needle.into()),
            message: message.into(),
        }
    }

    /// Fails with a configuration error when `pattern` does not compile.
    pub fn regex(pattern: &str, message: impl Into<String>) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|err| HookError::configuration(format!("invalid matcher regex: {err}")))?;
        Ok(Self {
            rule: MatchRule::Regex(regex),
            message: message.into(),
        })
    }

    fn from_value(value: &Value) -> Result<Self> {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .ok_or_else(|| HookError::configuration("matcher is missing a string `message`"))?;

        match (
            value.get("substring").and_then(Value::as_str),
            value.get("regex").and_then(Value::as_str),
        ) {
            (Some(needle), None) => Ok(Self::substring(needle, message)),
            (None, Some(pattern)) => Self::regex(pattern, message),
            _ => Err(HookError::configuration(
                "matcher needs exactly one of `substring` or `regex`",
            )),
        }
    }
}

/// Substitute `${...}` placeholders from `detail`.
pub fn interpolate(template: &str, detail: &Detail) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = &after[..end];
        match placeholder(name, detail) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

fn placeholder(name: &str, detail: &Detail) -> Option<String> {
    if name == "key" {
        return Some(detail.label().to_string());
    }
    match detail.context.get(name)? {
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn too_short(path: &str, label: &str) -> Detail {
        Detail::new(
            "string.min",
            path,
            format!("\"{label}\" length must be at least 2 characters long"),
        )
        .with_context("key", path)
        .with_context("label", label)
        .with_context("limit", 2)
    }

    fn bad_pattern() -> Detail {
        Detail::new(
            "string.pattern.base",
            "name",
            "\"name\" with value \"J\" fails to match the required pattern: /^[a-z]+$/",
        )
        .with_context("key", "name")
        .with_context("label", "name")
        .with_context("pattern", "^[a-z]+$")
    }

    #[test]
    fn absent_table_passes_engine_message() {
        let detail = too_short("password", "password");
        assert_eq!(Translation::None.translate(&detail), None);
        assert_eq!(Translation::None.message_for(&detail), detail.message);
    }

    #[test]
    fn by_code_interpolates_context() {
        let table = TranslationTable::new()
            .on("string.min", |_| Some("\"${key}\" must be ${limit} or more chars.".into()))
            .on("string.pattern.base", |detail| {
                match detail.context.get("pattern").and_then(Value::as_str) {
                    Some("^[a-z]+$") => Some("\"${key}\" must be lowercase letters.".into()),
                    _ => None,
                }
            });
        let translation = Translation::ByCode(table);

        assert_eq!(
            translation.message_for(&too_short("confirmPassword", "Confirm password")),
            "\"Confirm password\" must be 2 or more chars."
        );
        assert_eq!(
            translation.message_for(&bad_pattern()),
            "\"name\" must be lowercase letters."
        );

        let unknown_code = Detail::new("any.required", "email", "\"email\" is required");
        assert_eq!(translation.message_for(&unknown_code), "\"email\" is required");
    }

    #[test]
    fn by_code_none_falls_back_per_field() {
        let table = TranslationTable::new().on("string.min", |_| None);
        let detail = too_short("password", "password");
        assert_eq!(
            Translation::ByCode(table).message_for(&detail),
            detail.message
        );
    }

    #[test]
    fn generic_template_uses_label() {
        let translation = Translation::generic("\"${key}\" is badly formed.");
        assert_eq!(
            translation.message_for(&too_short("password", "password")),
            "\"password\" is badly formed."
        );
    }

    #[test]
    fn matchers_pick_first_match_per_message() {
        let translation = Translation::Matchers(vec![
            Matcher::substring("at least 2 characters long", "\"${key}\" must be 2 or more chars."),
            Matcher::regex("required pattern", "\"${key}\" is badly formed.").unwrap(),
        ]);

        assert_eq!(
            translation.message_for(&bad_pattern()),
            "\"name\" is badly formed."
        );
        assert_eq!(
            translation.message_for(&too_short("password", "password")),
            "\"password\" must be 2 or more chars."
        );

        let other = Detail::new("any.required", "email", "\"email\" is required");
        assert_eq!(translation.message_for(&other), "\"email\" is required");
    }

    #[test]
    fn translation_is_deterministic() {
        let translation = Translation::Matchers(vec![
            Matcher::regex("characters", "first").unwrap(),
            Matcher::substring("at least", "second"),
        ]);
        let detail = too_short("password", "password");

        let first = translation.message_for(&detail);
        for _ in 0..10 {
            assert_eq!(translation.message_for(&detail), first);
        }
        assert_eq!(first, "first");
    }

    #[test]
    fn interpolation_keeps_unknown_placeholders() {
        let detail = too_short("password", "password");
        assert_eq!(
            interpolate("${key} ${limit} ${missing} ${unterminated", &detail),
            "password 2 ${missing} ${unterminated"
        );
    }

    #[test]
    fn parses_tables_from_json() {
        assert!(matches!(
            Translation::from_value(&json!("\"${key}\" is bad")).unwrap(),
            Translation::Generic(_)
        ));

        let matchers = Translation::from_value(&json!([
            {"substring": "at least", "message": "short"},
            {"regex": "pattern$", "message": "shape"}
        ]))
        .unwrap();
        assert_eq!(matchers.message_for(&too_short("password", "password")), "short");

        let by_code = Translation::from_value(&json!({
            "string.min": "\"${key}\" needs ${limit}",
            "any.required": null
        }))
        .unwrap();
        assert_eq!(
            by_code.message_for(&too_short("password", "password")),
            "\"password\" needs 2"
        );
    }

    #[test]
    fn rejects_malformed_tables() {
        assert!(Translation::from_value(&json!(3)).is_err());
        assert!(Translation::from_value(&json!([{"message": "no rule"}])).is_err());
        assert!(Translation::from_value(&json!([{"regex": "(", "message": "m"}])).is_err());
        assert!(Translation::from_value(&json!({"string.min": 5})).is_err());
    }
}
