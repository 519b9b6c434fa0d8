use jsonschema::Draft;

/// Controls how [`JsonSchemaEngine`](crate::JsonSchemaEngine) compiles schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// JSON Schema draft used to compile every schema.
    pub draft: Draft,
    /// When true, a property's `title` is used as its label in messages.
    pub titles_as_labels: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            draft: Draft::Draft202012,
            titles_as_labels: true,
        }
    }
}
