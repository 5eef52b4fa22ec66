//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod entity;

pub use entity::EntityRow;
