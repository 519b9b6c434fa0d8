use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod check;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one validation hook against a context file.
    Check(CheckArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Check(args) => check::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Which hook builder `check` uses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum HookKind {
    /// Full schema, one message per field.
    Form,
    /// Full schema, one structured record per field.
    Persistence,
    /// Field schemas, checked only where present.
    Fieldset,
    /// Field schemas with structured records.
    PersistenceFieldset,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema file. For fieldset kinds, a map of field name to schema or an
    /// object schema whose properties are used.
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,
    /// Request context file (`{"type", "method", "data", ...}`).
    #[arg(long, value_name = "FILE")]
    pub context: PathBuf,
    /// Hook flavour to build.
    #[arg(long, value_enum, default_value = "form")]
    pub kind: HookKind,
    /// Hook options file (`abortEarly`, `convert`, ...).
    #[arg(long, value_name = "FILE")]
    pub options: Option<PathBuf>,
    /// Translation table file: a template string, a matcher array or a code map.
    #[arg(long, value_name = "FILE")]
    pub translations: Option<PathBuf>,
    /// Put the serialised error map in the failure message.
    #[arg(long)]
    pub debug: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
