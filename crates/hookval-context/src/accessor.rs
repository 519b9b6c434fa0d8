use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::trace;

use crate::context::RequestContext;
use crate::error::Result;

/// Update operator persistence-style `update`/`patch` payloads wrap their fields in.
pub const UPDATE_OPERATOR: &str = "$set";

/// Strategy for reading the value to validate out of a context and writing the
/// converted value back.
pub trait FieldAccessor: Send + Sync {
    /// Extract the value to validate.
    fn read(&self, ctx: &RequestContext) -> Result<Value>;

    /// Store the converted value.
    fn write(&self, ctx: &mut RequestContext, value: Value) -> Result<()>;
}

/// Reads and writes the phase payload (`data` before, `result` after).
///
/// For `update`/`patch` payloads shaped `{"$set": {...}}`, the operator's inner
/// object is validated and the converted value is written back under the same
/// operator.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAccessor;

impl FieldAccessor for DefaultAccessor {
    fn read(&self, ctx: &RequestContext) -> Result<Value> {
        let items = ctx.get_items()?;
        if ctx.method.is_modification() {
            if let Some(inner) = operator_fields(&items) {
                trace!(method = %ctx.method, "reading fields under {UPDATE_OPERATOR}");
                return Ok(inner.clone());
            }
        }
        Ok(items)
    }

    fn write(&self, ctx: &mut RequestContext, value: Value) -> Result<()> {
        let wrapped = ctx.method.is_modification()
            && ctx.items().and_then(operator_fields).is_some();

        if wrapped {
            let mut operator = Map::new();
            operator.insert(UPDATE_OPERATOR.to_string(), value);
            ctx.replace_items(Value::Object(operator));
        } else {
            ctx.replace_items(value);
        }
        Ok(())
    }
}

fn operator_fields(items: &Value) -> Option<&Value> {
    match items {
        Value::Object(map) if map.len() == 1 => map.get(UPDATE_OPERATOR).filter(|v| v.is_object()),
        _ => None,
    }
}

type ReadFn = dyn Fn(&RequestContext) -> Result<Value> + Send + Sync;
type WriteFn = dyn Fn(&mut RequestContext, Value) -> Result<()> + Send + Sync;

/// Accessor built from a pair of closures.
#[derive(Clone)]
pub struct FnAccessor {
    read: Arc<ReadFn>,
    write: Arc<WriteFn>,
}

impl FnAccessor {
    pub fn new<R, W>(read: R, write: W) -> Self
    where
        R: Fn(&RequestContext) -> Result<Value> + Send + Sync + 'static,
        W: Fn(&mut RequestContext, Value) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            read: Arc::new(read),
            write: Arc::new(write),
        }
    }

    /// Build from already shared closures.
    pub fn from_shared(read: Arc<ReadFn>, write: Arc<WriteFn>) -> Self {
        Self { read, write }
    }
}

impl FieldAccessor for FnAccessor {
    fn read(&self, ctx: &RequestContext) -> Result<Value> {
        (self.read)(ctx)
    }

    fn write(&self, ctx: &mut RequestContext, value: Value) -> Result<()> {
        (self.write)(ctx, value)
    }
}

impl fmt::Debug for FnAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAccessor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ContextError;
    use crate::phase::Method;

    #[test]
    fn default_accessor_reads_and_writes_data() {
        let mut ctx = RequestContext::before(Method::Create, json!({"name": "a"}));
        let accessor = DefaultAccessor;

        assert_eq!(accessor.read(&ctx).unwrap(), json!({"name": "a"}));
        accessor.write(&mut ctx, json!({"name": "A"})).unwrap();
        assert_eq!(ctx.data, Some(json!({"name": "A"})));
    }

    #[test]
    fn default_accessor_unwraps_update_operator() {
        let mut ctx = RequestContext::before(Method::Patch, json!({"$set": {"name": "a"}}));
        let accessor = DefaultAccessor;

        assert_eq!(accessor.read(&ctx).unwrap(), json!({"name": "a"}));
        accessor.write(&mut ctx, json!({"name": "A"})).unwrap();
        assert_eq!(ctx.data, Some(json!({"$set": {"name": "A"}})));
    }

    #[test]
    fn update_operator_ignored_on_create() {
        let ctx = RequestContext::before(Method::Create, json!({"$set": {"name": "a"}}));
        assert_eq!(
            DefaultAccessor.read(&ctx).unwrap(),
            json!({"$set": {"name": "a"}})
        );
    }

    #[test]
    fn fn_accessor_routes_through_closures() {
        let accessor = FnAccessor::new(
            |ctx: &RequestContext| {
                ctx.params
                    .get("payload")
                    .cloned()
                    .ok_or(ContextError::MissingPayload("params.payload"))
            },
            |ctx: &mut RequestContext, value: Value| {
                ctx.params.insert("payload".to_string(), value);
                Ok(())
            },
        );

        let mut ctx = RequestContext::before(Method::Create, json!({"ignored": true}));
        assert!(accessor.read(&ctx).is_err());

        accessor.write(&mut ctx, json!({"x": 1})).unwrap();
        assert_eq!(accessor.read(&ctx).unwrap(), json!({"x": 1}));
        assert_eq!(ctx.data, Some(json!({"ignored": true})));
    }
}
