//! Validation hooks for request pipelines.
//!
//! A hook is built once from a schema, options and an optional translation
//! table, then invoked for every request with a [`RequestContext`]. It reads
//! the payload, validates it through a [`ValidationEngine`], writes the
//! converted value back when conversion is enabled, and otherwise fails with a
//! [`ValidationFailure`] whose error map is keyed by field path.
//!
//! Three flavours are provided by [`HookFactory`]:
//! - [`HookFactory::form`] maps each field to a display message.
//! - [`HookFactory::persistence`] maps each field to a structured record.
//! - [`HookFactory::fieldset`] validates only the fields present in the payload.
//!
//! [`RequestContext`]: hookval_context::RequestContext
//! [`ValidationEngine`]: hookval_schema::ValidationEngine

pub mod error;
pub mod executor;
pub mod factory;
pub mod failure;
pub mod hook;
pub mod options;
pub mod translate;

pub use error::{HookError, Result};
pub use factory::{
    build_fieldset_hook, build_form_hook, build_persistence_fieldset_hook, build_persistence_hook,
    HookFactory,
};
pub use failure::{ErrorMap, ErrorStyle, FieldError, PersistenceError, ValidationFailure};
pub use hook::Hook;
pub use options::{HookConfig, OptionsBuilder};
pub use translate::{Matcher, MatchRule, Translation, TranslationTable};
