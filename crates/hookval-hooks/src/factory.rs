use std::sync::Arc;

use hookval_schema::{EngineError, JsonSchemaEngine, ValidationEngine};
use serde_json::{Map, Value};

use crate::error::{HookError, Result};
use crate::failure::ErrorStyle;
use crate::hook::{restrict_fields, Hook, HookSpec, Target};
use crate::options::HookConfig;
use crate::translate::Translation;

const FORM_HOOK: &str = "validate";
const FIELDSET_HOOK: &str = "validateProvidedData";

/// Builds validation hooks over one engine.
///
/// Every builder checks its schema with the engine up front, so a broken
/// schema fails here rather than on the first request.
#[derive(Clone)]
pub struct HookFactory {
    engine: Arc<dyn ValidationEngine>,
    debug: bool,
}

impl HookFactory {
    pub fn new(engine: impl ValidationEngine + 'static) -> Self {
        Self::with_engine(Arc::new(engine))
    }

    pub fn with_engine(engine: Arc<dyn ValidationEngine>) -> Self {
        Self {
            engine,
            debug: false,
        }
    }

    /// Serialise the whole error map into failure messages.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Hook validating the full payload, with plain messages per field.
    pub fn form(&self, schema: Value, config: HookConfig, translation: Translation) -> Result<Hook> {
        self.full(schema, config, translation, ErrorStyle::Form)
    }

    /// Like [`HookFactory::form`], with structured entries per field.
    pub fn persistence(
        &self,
        schema: Value,
        config: HookConfig,
        translation: Translation,
    ) -> Result<Hook> {
        self.full(schema, config, translation, ErrorStyle::Persistence)
    }

    /// Hook validating only the fields present in the payload.
    pub fn fieldset(&self, fields: Map<String, Value>, config: HookConfig) -> Result<Hook> {
        self.partial(fields, config, ErrorStyle::Form)
    }

    /// Like [`HookFactory::fieldset`], with structured entries per field.
    pub fn persistence_fieldset(
        &self,
        fields: Map<String, Value>,
        config: HookConfig,
    ) -> Result<Hook> {
        self.partial(fields, config, ErrorStyle::Persistence)
    }

    fn full(
        &self,
        schema: Value,
        config: HookConfig,
        translation: Translation,
        style: ErrorStyle,
    ) -> Result<Hook> {
        self.check_schema(&schema, &config)?;
        Ok(self.hook(FORM_HOOK, Target::Schema(schema), config, translation, style))
    }

    fn partial(
        &self,
        fields: Map<String, Value>,
        config: HookConfig,
        style: ErrorStyle,
    ) -> Result<Hook> {
        if fields.is_empty() {
            return Err(HookError::MissingArgument("fields"));
        }
        let every_field: Map<String, Value> = fields
            .keys()
            .map(|key| (key.clone(), Value::Null))
            .collect();
        self.check_schema(&restrict_fields(&fields, &Value::Object(every_field)), &config)?;

        Ok(self.hook(
            FIELDSET_HOOK,
            Target::Fieldset(fields),
            config,
            Translation::None,
            style,
        ))
    }

    fn hook(
        &self,
        name: &'static str,
        target: Target,
        config: HookConfig,
        translation: Translation,
        style: ErrorStyle,
    ) -> Hook {
        Hook::new(HookSpec {
            name,
            target,
            engine: Arc::clone(&self.engine),
            config,
            translation,
            style,
            debug: self.debug,
        })
    }

    fn check_schema(&self, schema: &Value, config: &HookConfig) -> Result<()> {
        self.engine
            .check_schema(schema, config.engine())
            .map_err(|err| match err {
                EngineError::CompileFailed(reason) => {
                    HookError::configuration(format!("schema rejected: {reason}"))
                }
                other => HookError::Engine(other),
            })
    }
}

impl Default for HookFactory {
    fn default() -> Self {
        Self::new(JsonSchemaEngine::new())
    }
}

/// Form hook over the default JSON Schema engine.
pub fn build_form_hook(schema: Value, config: HookConfig, translation: Translation) -> Result<Hook> {
    HookFactory::default().form(schema, config, translation)
}

/// Persistence hook over the default JSON Schema engine.
pub fn build_persistence_hook(
    schema: Value,
    config: HookConfig,
    translation: Translation,
) -> Result<Hook> {
    HookFactory::default().persistence(schema, config, translation)
}

/// Fieldset hook over the default JSON Schema engine.
pub fn build_fieldset_hook(fields: Map<String, Value>, config: HookConfig) -> Result<Hook> {
    HookFactory::default().fieldset(fields, config)
}

/// Persistence-style fieldset hook over the default JSON Schema engine.
pub fn build_persistence_fieldset_hook(
    fields: Map<String, Value>,
    config: HookConfig,
) -> Result<Hook> {
    HookFactory::default().persistence_fieldset(fields, config)
}
