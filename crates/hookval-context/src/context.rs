use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ContextError, Result};
use crate::phase::{HookPhase, Method};

/// Per-request carrier passed through the hook pipeline.
///
/// The pipeline owns the context; hooks take it by value and hand it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(rename = "type")]
    pub phase: HookPhase,
    pub method: Method,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

impl RequestContext {
    /// Create an empty context for the given phase and method.
    pub fn new(phase: HookPhase, method: Method) -> Self {
        Self {
            phase,
            method,
            data: None,
            result: None,
            id: None,
            params: Map::new(),
        }
    }

    /// Create a `before` context carrying `data`.
    pub fn before(method: Method, data: Value) -> Self {
        Self::new(HookPhase::Before, method).with_data(data)
    }

    /// Create an `after` context carrying `result`.
    pub fn after(method: Method, result: Value) -> Self {
        let mut ctx = Self::new(HookPhase::After, method);
        ctx.result = Some(result);
        ctx
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The payload slot for the current phase: `data` before, `result` after.
    pub fn items(&self) -> Option<&Value> {
        match self.phase {
            HookPhase::Before => self.data.as_ref(),
            HookPhase::After => self.result.as_ref(),
        }
    }

    /// Clone the payload for the current phase.
    pub fn get_items(&self) -> Result<Value> {
        self.items()
            .cloned()
            .ok_or(ContextError::MissingPayload(self.items_slot()))
    }

    /// Replace the payload for the current phase.
    pub fn replace_items(&mut self, items: Value) {
        match self.phase {
            HookPhase::Before => self.data = Some(items),
            HookPhase::After => self.result = Some(items),
        }
    }

    /// Keys of the current payload, when it is an object.
    pub fn item_keys(&self) -> Vec<String> {
        match self.items() {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn items_slot(&self) -> &'static str {
        match self.phase {
            HookPhase::Before => "data",
            HookPhase::After => "result",
        }
    }
}

/// Guard that a hook named `hook` only runs in `phase` and on one of `methods`.
pub fn check_context(
    ctx: &RequestContext,
    phase: HookPhase,
    methods: &[Method],
    hook: &str,
) -> Result<()> {
    if ctx.phase != phase {
        return Err(ContextError::WrongPhase {
            hook: hook.to_string(),
            expected: phase,
            actual: ctx.phase,
        });
    }

    if !methods.is_empty() && !methods.contains(&ctx.method) {
        return Err(ContextError::WrongMethod {
            hook: hook.to_string(),
            method: ctx.method,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::phase::MUTATING_METHODS;

    #[test]
    fn items_follow_phase() {
        let mut ctx = RequestContext::before(Method::Create, json!({"a": 1}));
        assert_eq!(ctx.get_items().unwrap(), json!({"a": 1}));
        ctx.replace_items(json!({"a": 2}));
        assert_eq!(ctx.data, Some(json!({"a": 2})));

        let mut after = RequestContext::after(Method::Get, json!({"b": 1}));
        assert_eq!(after.get_items().unwrap(), json!({"b": 1}));
        after.replace_items(json!({"b": 2}));
        assert_eq!(after.result, Some(json!({"b": 2})));
        assert_eq!(after.data, None);
    }

    #[test]
    fn missing_payload_names_the_slot() {
        let ctx = RequestContext::new(HookPhase::Before, Method::Create);
        assert!(matches!(
            ctx.get_items(),
            Err(ContextError::MissingPayload("data"))
        ));
    }

    #[test]
    fn deserializes_pipeline_shape() {
        let ctx: RequestContext = serde_json::from_value(json!({
            "type": "before",
            "method": "patch",
            "id": 7,
            "data": {"name": "Marshall"}
        }))
        .unwrap();

        assert_eq!(ctx.phase, HookPhase::Before);
        assert_eq!(ctx.method, Method::Patch);
        assert_eq!(ctx.id, Some(json!(7)));
        assert_eq!(ctx.item_keys(), vec!["name".to_string()]);
    }

    #[test]
    fn check_context_rejects_wrong_phase_and_method() {
        let after = RequestContext::after(Method::Create, json!({}));
        let err = check_context(&after, HookPhase::Before, &MUTATING_METHODS, "validate")
            .unwrap_err();
        assert_eq!(err.to_string(), "validate can only be a before hook (got after)");

        let remove = RequestContext::new(HookPhase::Before, Method::Remove);
        assert!(matches!(
            check_context(&remove, HookPhase::Before, &MUTATING_METHODS, "validate"),
            Err(ContextError::WrongMethod {
                method: Method::Remove,
                ..
            })
        ));

        let create = RequestContext::before(Method::Create, json!({}));
        assert!(check_context(&create, HookPhase::Before, &MUTATING_METHODS, "validate").is_ok());
    }

    #[test]
    fn empty_method_list_accepts_any_method() {
        let ctx = RequestContext::new(HookPhase::Before, Method::Find);
        assert!(check_context(&ctx, HookPhase::Before, &[], "any").is_ok());
    }
}
