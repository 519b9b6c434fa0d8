use std::fmt;
use std::io;
use std::path::Path;

use hookval_hooks::HookError;

// Exit codes follow the rsfulmen/DDR-0002 table.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(path: &Path, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => USAGE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{}: {err}", path.display()))
}

pub fn json_error(path: &Path, err: serde_json::Error) -> CliError {
    CliError::new(USAGE, format!("{}: invalid JSON: {err}", path.display()))
}

/// Map hook errors that are not validation failures. A validation failure
/// is reported on stdout by the caller, so it never reaches here.
pub fn hook_error(context: &str, err: HookError) -> CliError {
    let code = match &err {
        HookError::Configuration(_) | HookError::Usage(_) | HookError::MissingArgument(_) => USAGE,
        HookError::Accessor(_) => FAILURE,
        HookError::Validation(_) => DATA_INVALID,
        HookError::Engine(_) => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}
