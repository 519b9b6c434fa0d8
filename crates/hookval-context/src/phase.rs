//! Hook phases and service methods.

use std::fmt;

use serde::{Deserialize, Serialize};

/// When a hook runs relative to the service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookPhase {
    /// Before the service method; the payload is the incoming data.
    Before,
    /// After the service method; the payload is the result.
    After,
}

impl HookPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            HookPhase::Before => "before",
            HookPhase::After => "after",
        }
    }
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service method a context was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Find,
    Get,
    Create,
    Update,
    Patch,
    Remove,
}

/// Methods that carry a payload worth validating.
pub const MUTATING_METHODS: [Method; 3] = [Method::Create, Method::Update, Method::Patch];

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Find => "find",
            Method::Get => "get",
            Method::Create => "create",
            Method::Update => "update",
            Method::Patch => "patch",
            Method::Remove => "remove",
        }
    }

    /// Returns true for `update` and `patch`, whose payload may be wrapped in
    /// an update operator.
    pub fn is_modification(self) -> bool {
        matches!(self, Method::Update | Method::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_uses_lowercase_names() {
        let phase: HookPhase = serde_json::from_str("\"after\"").unwrap();
        assert_eq!(phase, HookPhase::After);
        assert_eq!(serde_json::to_string(&Method::Patch).unwrap(), "\"patch\"");
    }

    #[test]
    fn modification_methods() {
        assert!(Method::Update.is_modification());
        assert!(Method::Patch.is_modification());
        assert!(!Method::Create.is_modification());
    }
}
