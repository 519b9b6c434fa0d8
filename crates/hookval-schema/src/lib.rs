//! Validation engine capability for hookval.
//!
//! [`ValidationEngine`] is the seam hooks validate through: given a value, a
//! schema and [`EngineOptions`], it returns the converted value or a list of
//! per-field [`Detail`] records.
//!
//! [`JsonSchemaEngine`] is the bundled implementation. It checks values
//! against JSON Schema and layers conversion (defaults, trimming, case
//! folding, string coercion) on top, reporting failures with stable error
//! codes such as `string.min` or `any.required`.

pub mod config;
pub mod detail;
pub mod engine;
pub mod error;
pub mod json_schema;
pub mod options;

mod messages;
mod normalize;
mod transform;

pub use config::EngineConfig;
pub use detail::{path_to_string, Detail};
pub use engine::ValidationEngine;
pub use error::{EngineError, Result};
pub use json_schema::JsonSchemaEngine;
pub use options::{EngineOptions, Presence};
