use hookval_context::RequestContext;
use hookval_schema::{Detail, EngineError};
use serde_json::Value;
use tracing::debug;

use crate::error::{HookError, Result};
use crate::failure::{ErrorMap, ErrorStyle, FieldError, ValidationFailure};
use crate::hook::HookSpec;
use crate::translate::Translation;

/// Validate `value` once and apply the outcome to `ctx`.
///
/// On success the converted value is written back only when conversion is
/// enabled. On failure every detail the engine produced is translated.
pub(crate) async fn run_validation(
    spec: &HookSpec,
    schema: &Value,
    value: Value,
    mut ctx: RequestContext,
) -> Result<RequestContext> {
    let options = spec.config.engine();

    match spec.engine.validate(value, schema, options).await {
        Ok(converted) => {
            if options.convert {
                spec.config
                    .accessor()
                    .write(&mut ctx, converted)
                    .map_err(HookError::Accessor)?;
            }
            debug!(hook = spec.name, method = %ctx.method, "payload valid");
            Ok(ctx)
        }
        Err(EngineError::Invalid(details)) => {
            debug!(
                hook = spec.name,
                method = %ctx.method,
                failures = details.len(),
                "payload invalid"
            );
            let errors = translate_details(&details, &spec.translation, spec.style);
            Err(ValidationFailure::new(errors, spec.debug).into())
        }
        Err(other) => Err(HookError::Engine(other)),
    }
}

/// Build the error map for `details`.
///
/// When two details share a path, the first one is kept.
pub fn translate_details(
    details: &[Detail],
    translation: &Translation,
    style: ErrorStyle,
) -> ErrorMap {
    let mut errors = ErrorMap::new();
    for detail in details {
        let path = if detail.path.is_empty() {
            detail.key().to_string()
        } else {
            detail.path.clone()
        };
        if errors.contains_key(&path) {
            continue;
        }
        let message = translation.message_for(detail);
        let entry = FieldError::new(style, &path, detail, message);
        errors.insert(path, entry);
    }
    errors
}
