use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default presence of declared keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    /// Every declared key must be present.
    Required,
    /// Keys are required only where the schema says so.
    #[default]
    Optional,
    /// Declared keys must not be present.
    Forbidden,
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Presence::Required => "required",
            Presence::Optional => "optional",
            Presence::Forbidden => "forbidden",
        })
    }
}

/// Options handed to a [`ValidationEngine`](crate::ValidationEngine) on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Stop at the first failure.
    pub abort_early: bool,
    /// Accept object keys the schema does not declare.
    pub allow_unknown: bool,
    /// Normalise the value (defaults, trimming, case, coercion) before checking.
    pub convert: bool,
    /// Drop undeclared object keys before checking.
    pub strip_unknown: bool,
    pub presence: Presence,
    /// Options the core does not interpret, passed through untouched.
    pub extra: Map<String, Value>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            abort_early: true,
            allow_unknown: false,
            convert: true,
            strip_unknown: false,
            presence: Presence::Optional,
            extra: Map::new(),
        }
    }
}

impl EngineOptions {
    /// Boolean pass-through option, `false` when absent or not a bool.
    pub fn extra_flag(&self, key: &str) -> bool {
        self.extra.get(key).and_then(Value::as_bool).unwrap_or(false)
    }
}
