//! Narrative Export — condition rendering for game design exports.
//!
//! Turns designer-authored condition trees (quest states, NPC values,
//! inventory checks, game time, ...) into target-language source text by
//! filling per-project export templates.

pub mod core;
pub mod schema;
