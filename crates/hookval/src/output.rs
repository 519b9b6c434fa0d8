use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use hookval_context::RequestContext;
use hookval_hooks::{FieldError, ValidationFailure};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct CheckOutput<'a> {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a RequestContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<&'a ValidationFailure>,
}

pub fn print_context(ctx: &RequestContext, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&CheckOutput {
            valid: true,
            context: Some(ctx),
            failure: None,
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            match payload(ctx) {
                Some(Value::Object(map)) => {
                    for (key, value) in map {
                        table.add_row(vec![key.clone(), value.to_string()]);
                    }
                }
                Some(other) => {
                    table.add_row(vec!["value".to_string(), other.to_string()]);
                }
                None => {}
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("valid: {} {}", ctx.phase, ctx.method);
            if let Some(value) = payload(ctx) {
                println!(
                    "{}",
                    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
                );
            }
        }
    }
}

pub fn print_failure(failure: &ValidationFailure, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&CheckOutput {
            valid: false,
            context: None,
            failure: Some(failure),
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "TYPE", "MESSAGE"]);
            for (path, entry) in &failure.errors {
                let kind = match entry {
                    FieldError::Record(record) => record.kind.as_str(),
                    FieldError::Message(_) => "",
                };
                table.add_row(vec![path.as_str(), kind, entry.message()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("invalid: {}", failure.message);
            for (path, entry) in &failure.errors {
                println!("  {path}: {}", entry.message());
            }
        }
    }
}

fn payload(ctx: &RequestContext) -> Option<&Value> {
    ctx.data.as_ref().or(ctx.result.as_ref())
}

fn print_json<T: Serialize>(out: &T) {
    println!(
        "{}",
        serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
    );
}
