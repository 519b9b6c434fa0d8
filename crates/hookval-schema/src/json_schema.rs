use std::collections::HashSet;

use async_trait::async_trait;
use jsonschema::Validator;
use serde_json::Value;
use tracing::debug;

use crate::config::EngineConfig;
use crate::detail::Detail;
use crate::engine::ValidationEngine;
use crate::error::{EngineError, Result};
use crate::messages::{Describer, Failure};
use crate::normalize::{convert, extension_checks, strip_unknown};
use crate::options::EngineOptions;
use crate::transform::prepare_schema;

/// [`ValidationEngine`] backed by JSON Schema.
///
/// Each call rewrites the schema for the given options (closing objects when
/// unknown keys are not allowed, requiring every declared key under
/// `presence: required`), normalises the value when converting, and maps
/// every keyword failure to a coded [`Detail`].
#[derive(Debug, Clone, Default)]
pub struct JsonSchemaEngine {
    config: EngineConfig,
}

impl JsonSchemaEngine {
    /// Create an engine with default config.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with explicit config.
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Get engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Synchronous form of [`ValidationEngine::validate`].
    pub fn validate_value(
        &self,
        value: Value,
        schema: &Value,
        options: &EngineOptions,
    ) -> Result<Value> {
        let prepared = prepare_schema(schema, options);
        let validator = self.compile(&prepared)?;

        let mut candidate = value;
        if options.strip_unknown {
            strip_unknown(&mut candidate, &prepared);
        }
        if options.convert {
            convert(&mut candidate, &prepared, !options.extra_flag("noDefaults"));
        }

        let details = self.collect_details(&validator, &prepared, &candidate, options);
        if details.is_empty() {
            Ok(candidate)
        } else {
            debug!(count = details.len(), "value failed schema validation");
            Err(EngineError::Invalid(details))
        }
    }

    fn compile(&self, schema: &Value) -> Result<Validator> {
        jsonschema::options()
            .with_draft(self.config.draft)
            .build(schema)
            .map_err(|err| EngineError::CompileFailed(err.to_string()))
    }

    fn collect_details(
        &self,
        validator: &Validator,
        schema: &Value,
        candidate: &Value,
        options: &EngineOptions,
    ) -> Vec<Detail> {
        let describer = Describer {
            schema,
            instance: candidate,
            titles_as_labels: self.config.titles_as_labels,
        };

        let mut details = Vec::new();
        let mut seen = HashSet::new();
        for err in validator.iter_errors(candidate) {
            let instance_path = err.instance_path.to_string();
            let schema_path = err.schema_path.to_string();
            if !seen.insert((instance_path.clone(), schema_path.clone())) {
                continue;
            }

            details.extend(describer.describe(&Failure {
                instance_path: &instance_path,
                schema_path: &schema_path,
                raw_message: err.to_string(),
            }));
            if options.abort_early && !details.is_empty() {
                break;
            }
        }

        if !(options.abort_early && !details.is_empty()) {
            extension_checks(candidate, schema, &[], options, &describer, &mut details);
        }

        if options.abort_early {
            details.truncate(1);
        }
        details
    }
}

#[async_trait]
impl ValidationEngine for JsonSchemaEngine {
    fn check_schema(&self, schema: &Value, options: &EngineOptions) -> Result<()> {
        self.compile(&prepare_schema(schema, options)).map(|_| ())
    }

    async fn validate(
        &self,
        value: Value,
        schema: &Value,
        options: &EngineOptions,
    ) -> Result<Value> {
        self.validate_value(value, schema, options)
    }
}
