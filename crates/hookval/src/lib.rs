//! Schema validation hooks for request pipelines.
//!
//! hookval builds reusable hooks that validate the payload of a request
//! context against a schema, write back the converted value, and report
//! failures as a field-keyed error map with translatable messages.
//!
//! # Crate Structure
//!
//! - [`context`]: request context, phases, methods and field accessors
//! - [`schema`]: the validation engine seam and the JSON Schema engine
//! - [`hooks`]: hook builders, options and translation (behind `hooks` feature)

/// Re-export context types.
pub mod context {
    pub use hookval_context::*;
}

/// Re-export engine types.
pub mod schema {
    pub use hookval_schema::*;
}

/// Re-export hook types (requires `hooks` feature).
#[cfg(feature = "hooks")]
pub mod hooks {
    pub use hookval_hooks::*;
}
