//! Request context model for pipeline hooks.
//!
//! A [`RequestContext`] is the per-request carrier a pipeline hands to each
//! hook: the phase it runs in, the service method, and the payload slots a
//! hook may read and overwrite.
//!
//! Hooks never assume where the payload lives. They go through a
//! [`FieldAccessor`], which defaults to [`DefaultAccessor`].

pub mod accessor;
pub mod context;
pub mod error;
pub mod phase;

pub use accessor::{DefaultAccessor, FieldAccessor, FnAccessor, UPDATE_OPERATOR};
pub use context::{check_context, RequestContext};
pub use error::{ContextError, Result};
pub use phase::{HookPhase, Method, MUTATING_METHODS};
