use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One field-level validation failure reported by an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    /// Engine message, already mentioning the field label.
    pub message: String,
    /// Dot-joined path of the failing field. Empty for the root value.
    pub path: String,
    /// Error code, e.g. `string.min`.
    #[serde(rename = "type")]
    pub code: String,
    /// Interpolation data: `key`, `label`, `value` and code-specific entries.
    #[serde(default)]
    pub context: Map<String, Value>,
}

impl Detail {
    pub fn new(code: impl Into<String>, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: path.into(),
            code: code.into(),
            context: Map::new(),
        }
    }

    pub fn with_context(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }

    /// Last path segment, or `value` for the root.
    pub fn key(&self) -> &str {
        if let Some(Value::String(key)) = self.context.get("key") {
            return key;
        }
        match self.path.rsplit('.').next() {
            Some(last) if !last.is_empty() => last,
            _ => "value",
        }
    }

    /// Display label for the field, falling back to its key.
    pub fn label(&self) -> &str {
        match self.context.get("label") {
            Some(Value::String(label)) => label,
            _ => self.key(),
        }
    }
}

/// Join path segments with dots, the way error maps key their entries.
pub fn path_to_string<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn key_and_label_fallbacks() {
        let bare = Detail::new("string.base", "address.city", "\"city\" must be a string");
        assert_eq!(bare.key(), "city");
        assert_eq!(bare.label(), "city");

        let labelled = bare.clone().with_context("label", "City");
        assert_eq!(labelled.label(), "City");

        let root = Detail::new("object.base", "", "\"value\" must be of type object");
        assert_eq!(root.key(), "value");
    }

    #[test]
    fn serializes_code_as_type() {
        let detail = Detail::new("string.min", "password", "too short").with_context("limit", 2);
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["type"], json!("string.min"));
        assert_eq!(value["context"]["limit"], json!(2));
    }

    #[test]
    fn joins_segments() {
        assert_eq!(path_to_string(&["tags", "0"]), "tags.0");
        assert_eq!(path_to_string::<&str>(&[]), "");
    }
}
