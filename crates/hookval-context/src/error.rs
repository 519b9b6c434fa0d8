use crate::phase::{HookPhase, Method};

/// Errors raised when a hook is used against the wrong kind of context.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// The hook was registered in a phase it does not support.
    #[error("{hook} can only be a {expected} hook (got {actual})")]
    WrongPhase {
        hook: String,
        expected: HookPhase,
        actual: HookPhase,
    },

    /// The hook was registered on a method it does not support.
    #[error("{hook} cannot be used on method {method}")]
    WrongMethod { hook: String, method: Method },

    /// The payload slot the accessor reads from is empty.
    #[error("context has no {0} to read")]
    MissingPayload(&'static str),
}

pub type Result<T> = std::result::Result<T, ContextError>;
