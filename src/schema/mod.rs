//! Data model shared by the renderer and its collaborators.

pub mod condition;
pub mod entity;
pub mod settings;
pub mod template;
