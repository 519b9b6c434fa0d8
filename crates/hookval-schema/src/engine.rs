use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::options::EngineOptions;

/// Schema validation capability used by hooks.
///
/// `validate` is called at most once per hook invocation. It must not retain
/// the value or the schema beyond the call.
#[async_trait]
pub trait ValidationEngine: Send + Sync {
    /// Check that `schema` is usable with `options`.
    ///
    /// Hook builders call this once so a broken schema fails at setup instead
    /// of on the first request.
    fn check_schema(&self, schema: &Value, options: &EngineOptions) -> Result<()>;

    /// Validate `value` and return it converted according to `options`.
    ///
    /// Fails with [`EngineError::Invalid`](crate::EngineError::Invalid) when
    /// the value does not satisfy the schema.
    async fn validate(&self, value: Value, schema: &Value, options: &EngineOptions)
        -> Result<Value>;
}
