use crate::detail::Detail;

/// Errors returned by a validation engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The value failed validation. Details are in engine order.
    #[error("validation failed with {} error(s)", .0.len())]
    Invalid(Vec<Detail>),

    /// The schema could not be compiled.
    #[error("failed to compile schema: {0}")]
    CompileFailed(String),

    /// Any other engine-internal failure.
    #[error("engine fault: {0}")]
    Fault(String),
}

impl EngineError {
    /// The failure details, when this is a validation failure.
    pub fn details(&self) -> Option<&[Detail]> {
        match self {
            EngineError::Invalid(details) => Some(details),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
