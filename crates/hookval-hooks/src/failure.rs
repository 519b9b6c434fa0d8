use std::collections::BTreeMap;

use hookval_schema::Detail;
use serde::{Deserialize, Serialize};

/// Message used when the error map is not serialised into the failure message.
pub const GENERIC_MESSAGE: &str = "Invalid data";

/// Name carried by persistence-style entries.
pub const PERSISTENCE_ERROR_NAME: &str = "ValidatorError";

/// Field path to translated error.
pub type ErrorMap = BTreeMap<String, FieldError>;

/// Shape of the entries a hook puts into its [`ErrorMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStyle {
    /// Plain display messages, for form consumers.
    Form,
    /// Structured records with path and error type, for persistence consumers.
    Persistence,
}

/// One entry of an [`ErrorMap`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldError {
    Message(String),
    Record(PersistenceError),
}

impl FieldError {
    /// Build the entry for `detail` in `style`, carrying `message`.
    ///
    /// `path` is the key the entry is stored under in the [`ErrorMap`].
    pub fn new(style: ErrorStyle, path: &str, detail: &Detail, message: String) -> Self {
        match style {
            ErrorStyle::Form => FieldError::Message(message),
            ErrorStyle::Persistence => FieldError::Record(PersistenceError {
                message,
                name: PERSISTENCE_ERROR_NAME.to_string(),
                path: path.to_string(),
                kind: detail.code.clone(),
            }),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            FieldError::Message(message) => message,
            FieldError::Record(record) => &record.message,
        }
    }
}

/// Persistence-style error entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceError {
    pub message: String,
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A payload failed validation.
///
/// Maps to a `BadRequest` in the pipeline's error layer.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ValidationFailure {
    pub name: &'static str,
    pub message: String,
    pub code: u16,
    pub errors: ErrorMap,
}

impl ValidationFailure {
    /// Wrap `errors`. In debug mode the message is the serialised map.
    pub fn new(errors: ErrorMap, debug: bool) -> Self {
        let message = if debug {
            serde_json::to_string(&errors).unwrap_or_else(|_| GENERIC_MESSAGE.to_string())
        } else {
            GENERIC_MESSAGE.to_string()
        };

        Self {
            name: "BadRequest",
            message,
            code: 400,
            errors,
        }
    }

    /// Message recorded for `path`, if any.
    pub fn message_for(&self, path: &str) -> Option<&str> {
        self.errors.get(path).map(FieldError::message)
    }
}
