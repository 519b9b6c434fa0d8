use std::fmt;
use std::sync::Arc;

use hookval_context::{check_context, HookPhase, RequestContext, MUTATING_METHODS};
use hookval_schema::ValidationEngine;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{HookError, Result};
use crate::executor::run_validation;
use crate::failure::ErrorStyle;
use crate::options::HookConfig;
use crate::translate::Translation;

/// What a hook validates against.
pub(crate) enum Target {
    /// A complete schema for the whole payload.
    Schema(Value),
    /// Field schemas; only those present in the payload are checked.
    Fieldset(Map<String, Value>),
}

/// Everything a built hook closes over.
pub(crate) struct HookSpec {
    pub name: &'static str,
    pub target: Target,
    pub engine: Arc<dyn ValidationEngine>,
    pub config: HookConfig,
    pub translation: Translation,
    pub style: ErrorStyle,
    pub debug: bool,
}

/// A reusable validation hook.
///
/// Cloning is cheap and clones share nothing mutable, so one hook may serve
/// any number of concurrent requests.
#[derive(Clone)]
pub struct Hook {
    spec: Arc<HookSpec>,
}

impl Hook {
    pub(crate) fn new(spec: HookSpec) -> Self {
        Self {
            spec: Arc::new(spec),
        }
    }

    /// Name used in usage errors and logs.
    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn style(&self) -> ErrorStyle {
        self.spec.style
    }

    pub fn config(&self) -> &HookConfig {
        &self.spec.config
    }

    /// Run the hook, resolving to the (possibly converted) context.
    pub async fn call(&self, ctx: RequestContext) -> Result<RequestContext> {
        let spec = self.spec.as_ref();
        debug!(hook = spec.name, phase = %ctx.phase, method = %ctx.method, "running hook");

        match &spec.target {
            Target::Schema(schema) => {
                check_context(&ctx, HookPhase::Before, &MUTATING_METHODS, spec.name)?;
                let value = spec.config.accessor().read(&ctx).map_err(HookError::Accessor)?;
                run_validation(spec, schema, value, ctx).await
            }
            Target::Fieldset(fields) => {
                check_context(&ctx, HookPhase::Before, &[], spec.name)?;
                let value = spec.config.accessor().read(&ctx).map_err(HookError::Accessor)?;
                let schema = restrict_fields(fields, &value);
                run_validation(spec, &schema, value, ctx).await
            }
        }
    }

    /// Callback form of [`Hook::call`].
    ///
    /// `done` runs with the resulting context on success only; failures are
    /// returned. Both forms share one code path.
    pub async fn call_with<F>(&self, ctx: RequestContext, done: F) -> Result<RequestContext>
    where
        F: FnOnce(&RequestContext),
    {
        let ctx = self.call(ctx).await?;
        done(&ctx);
        Ok(ctx)
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("name", &self.spec.name)
            .field("style", &self.spec.style)
            .field("config", &self.spec.config)
            .field("translation", &self.spec.translation)
            .field("debug", &self.spec.debug)
            .finish()
    }
}

/// Object schema over the fields whose keys appear in `value`.
pub(crate) fn restrict_fields(fields: &Map<String, Value>, value: &Value) -> Value {
    let present = value.as_object();
    let mut properties = Map::new();
    for (key, schema) in fields {
        if present.is_some_and(|map| map.contains_key(key)) {
            properties.insert(key.clone(), schema.clone());
        }
    }
    let required: Vec<Value> = properties.keys().cloned().map(Value::String).collect();

    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
