use hookval_context::ContextError;
use hookval_schema::EngineError;

use crate::failure::ValidationFailure;

/// Errors raised while building or running a validation hook.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// Malformed options, unpaired accessor overrides, a bad translation table
    /// or a schema the engine cannot compile. Raised while building the hook.
    #[error("invalid hook configuration: {0}")]
    Configuration(String),

    /// The hook was invoked against a context it does not support.
    #[error(transparent)]
    Usage(#[from] ContextError),

    /// The field accessor could not read the value or store the converted
    /// one. Errors from `getContext`/`setContext` overrides land here.
    #[error("field accessor failed: {0}")]
    Accessor(ContextError),

    /// A required construction argument was missing or empty.
    #[error("the `{0}` argument is required")]
    MissingArgument(&'static str),

    /// The payload failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// The engine failed for a reason other than invalid data.
    #[error("validation engine error: {0}")]
    Engine(EngineError),
}

impl HookError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        HookError::Configuration(message.into())
    }

    /// True for errors caused by how the hook was used rather than by the data.
    pub fn is_usage(&self) -> bool {
        matches!(self, HookError::Usage(_) | HookError::MissingArgument(_))
    }

    /// The validation failure, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationFailure> {
        match self {
            HookError::Validation(failure) => Some(failure),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HookError>;
