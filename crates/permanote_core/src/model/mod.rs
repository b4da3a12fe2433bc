//! Domain model for title-keyed notes.
//!
//! # Responsibility
//! - Define the canonical note shapes used by store and session logic.
//!
//! # Invariants
//! - A note is identified by its title alone; there is no separate id.
//! - Titles are validated once, when they enter the model.

pub mod note;
