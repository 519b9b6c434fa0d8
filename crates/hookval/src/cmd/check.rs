use std::path::Path;

use hookval_context::RequestContext;
use hookval_hooks::{Hook, HookConfig, HookError, HookFactory, Translation};
use serde_json::{Map, Value};
use tracing::debug;

use crate::cmd::{CheckArgs, HookKind};
use crate::exit::{
    hook_error, io_error, json_error, CliError, CliResult, DATA_INVALID, INTERNAL, SUCCESS, USAGE,
};
use crate::output::{print_context, print_failure, OutputFormat};

pub fn run(args: CheckArgs, format: OutputFormat) -> CliResult<i32> {
    let hook = build_hook(&args)?;
    let ctx: RequestContext =
        serde_json::from_value(read_json(&args.context)?).map_err(|err| {
            CliError::new(
                USAGE,
                format!("{}: invalid context: {err}", args.context.display()),
            )
        })?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| CliError::new(INTERNAL, format!("failed to start runtime: {err}")))?;

    debug!(hook = hook.name(), kind = ?args.kind, "running check");
    match runtime.block_on(hook.call(ctx)) {
        Ok(ctx) => {
            print_context(&ctx, format);
            Ok(SUCCESS)
        }
        Err(HookError::Validation(failure)) => {
            print_failure(&failure, format);
            Ok(DATA_INVALID)
        }
        Err(err) => Err(hook_error("check failed", err)),
    }
}

fn build_hook(args: &CheckArgs) -> CliResult<Hook> {
    let options = args.options.as_deref().map(read_json).transpose()?;
    let config = HookConfig::from_value(options.as_ref())
        .map_err(|err| hook_error("options", err))?;
    let translation = match args.translations.as_deref() {
        Some(path) => Translation::from_value(&read_json(path)?)
            .map_err(|err| hook_error("translations", err))?,
        None => Translation::None,
    };

    let factory = HookFactory::default().debug(args.debug);
    let schema = read_json(&args.schema)?;

    let built = match args.kind {
        HookKind::Form => factory.form(schema, config, translation),
        HookKind::Persistence => factory.persistence(schema, config, translation),
        HookKind::Fieldset | HookKind::PersistenceFieldset => {
            if args.translations.is_some() {
                return Err(CliError::new(
                    USAGE,
                    "--translations is not supported for fieldset hooks",
                ));
            }
            let fields = field_map(schema, &args.schema)?;
            if args.kind == HookKind::Fieldset {
                factory.fieldset(fields, config)
            } else {
                factory.persistence_fieldset(fields, config)
            }
        }
    };
    built.map_err(|err| hook_error("schema", err))
}

/// Field schemas from either a bare map or an object schema's `properties`.
fn field_map(schema: Value, path: &Path) -> CliResult<Map<String, Value>> {
    match schema {
        Value::Object(mut map) => {
            let is_object_schema = map.get("type").and_then(Value::as_str) == Some("object");
            match map.remove("properties") {
                Some(Value::Object(properties)) if is_object_schema => Ok(properties),
                Some(properties) => {
                    map.insert("properties".to_string(), properties);
                    Ok(map)
                }
                None => Ok(map),
            }
        }
        _ => Err(CliError::new(
            USAGE,
            format!("{}: fieldset schema must be an object", path.display()),
        )),
    }
}

fn read_json(path: &Path) -> CliResult<Value> {
    let text = std::fs::read_to_string(path).map_err(|err| io_error(path, err))?;
    serde_json::from_str(&text).map_err(|err| json_error(path, err))
}
