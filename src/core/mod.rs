//! Condition rendering: substitution engine, resolvers and dispatch.

pub mod data;
pub mod dispatch;
pub mod errors;
pub mod flex_field;
pub mod operator;
pub mod resolvers;
pub mod structured;
pub mod substitution;
pub mod templates;

pub use dispatch::{ConditionRenderer, ConditionRendererBuilder};
pub use errors::{ErrorCollector, ErrorEntry, ExportErrorKind, RenderError};
