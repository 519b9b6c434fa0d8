//! Hook configuration: options merged over engine defaults, plus the field
//! accessor the hook reads and writes through.

use std::fmt;
use std::sync::Arc;

use hookval_context::{DefaultAccessor, FieldAccessor, FnAccessor, RequestContext};
use hookval_schema::{EngineOptions, Presence};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{HookError, Result};

/// Option key for the read override.
pub const GET_CONTEXT: &str = "getContext";
/// Option key for the write override.
pub const SET_CONTEXT: &str = "setContext";

type ReadFn = dyn Fn(&RequestContext) -> hookval_context::Result<Value> + Send + Sync;
type WriteFn = dyn Fn(&mut RequestContext, Value) -> hookval_context::Result<()> + Send + Sync;

/// Immutable configuration closed over by a hook.
#[derive(Clone)]
pub struct HookConfig {
    engine: EngineOptions,
    accessor: Arc<dyn FieldAccessor>,
}

impl HookConfig {
    /// Merge a raw options value over the defaults.
    ///
    /// `raw` must be absent or a JSON object.
    pub fn from_value(raw: Option<&Value>) -> Result<Self> {
        let mut builder = OptionsBuilder::new();
        if let Some(raw) = raw {
            builder = builder.raw(raw.clone());
        }
        builder.build()
    }

    /// Options the engine receives. Accessor overrides are never among them.
    pub fn engine(&self) -> &EngineOptions {
        &self.engine
    }

    pub fn accessor(&self) -> &dyn FieldAccessor {
        self.accessor.as_ref()
    }

    pub fn converts(&self) -> bool {
        self.engine.convert
    }
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            engine: EngineOptions::default(),
            accessor: Arc::new(DefaultAccessor),
        }
    }
}

impl fmt::Debug for HookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookConfig")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

/// Builds a [`HookConfig`], failing fast on malformed input.
#[derive(Default)]
pub struct OptionsBuilder {
    raw: Option<Value>,
    get_context: Option<Arc<ReadFn>>,
    set_context: Option<Arc<WriteFn>>,
    accessor: Option<Arc<dyn FieldAccessor>>,
}

impl OptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw options, merged over the defaults.
    pub fn raw(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Override how the value to validate is read. Requires `set_context`.
    pub fn get_context<F>(mut self, read: F) -> Self
    where
        F: Fn(&RequestContext) -> hookval_context::Result<Value> + Send + Sync + 'static,
    {
        self.get_context = Some(Arc::new(read));
        self
    }

    /// Override how the converted value is written. Requires `get_context`.
    pub fn set_context<F>(mut self, write: F) -> Self
    where
        F: Fn(&mut RequestContext, Value) -> hookval_context::Result<()> + Send + Sync + 'static,
    {
        self.set_context = Some(Arc::new(write));
        self
    }

    /// Use a complete accessor strategy instead of closures.
    pub fn accessor(mut self, accessor: impl FieldAccessor + 'static) -> Self {
        self.accessor = Some(Arc::new(accessor));
        self
    }

    pub fn build(self) -> Result<HookConfig> {
        let engine = match self.raw {
            None | Some(Value::Null) => EngineOptions::default(),
            Some(Value::Object(map)) => merge_options(map)?,
            Some(other) => {
                return Err(HookError::configuration(format!(
                    "options must be an object, got {}",
                    json_type_name(&other)
                )))
            }
        };

        let accessor: Arc<dyn FieldAccessor> =
            match (self.get_context, self.set_context, self.accessor) {
                (None, None, None) => Arc::new(DefaultAccessor),
                (None, None, Some(accessor)) => accessor,
                (Some(read), Some(write), None) => Arc::new(FnAccessor::from_shared(read, write)),
                (Some(_), Some(_), Some(_)) => {
                    return Err(HookError::configuration(
                        "accessor overrides and an accessor strategy are mutually exclusive",
                    ))
                }
                _ => {
                    return Err(HookError::configuration(format!(
                        "{GET_CONTEXT} and {SET_CONTEXT} must be supplied together"
                    )))
                }
            };

        Ok(HookConfig { engine, accessor })
    }
}

fn merge_options(map: Map<String, Value>) -> Result<EngineOptions> {
    let mut options = EngineOptions::default();

    for (key, value) in map {
        match key.as_str() {
            "abortEarly" => options.abort_early = expect_bool(&key, &value)?,
            "allowUnknown" => options.allow_unknown = expect_bool(&key, &value)?,
            "convert" => options.convert = expect_bool(&key, &value)?,
            "stripUnknown" => options.strip_unknown = expect_bool(&key, &value)?,
            "presence" => {
                options.presence = serde_json::from_value::<Presence>(value).map_err(|err| {
                    HookError::configuration(format!("presence: {err}"))
                })?
            }
            GET_CONTEXT | SET_CONTEXT => {
                return Err(HookError::configuration(format!(
                    "{key} must be supplied as a function through OptionsBuilder"
                )))
            }
            _ => {
                warn!(option = %key, "passing unrecognised option to engine");
                options.extra.insert(key, value);
            }
        }
    }

    Ok(options)
}

fn expect_bool(key: &str, value: &Value) -> Result<bool> {
    value.as_bool().ok_or_else(|| {
        HookError::configuration(format!(
            "{key} must be a boolean, got {}",
            json_type_name(value)
        ))
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
