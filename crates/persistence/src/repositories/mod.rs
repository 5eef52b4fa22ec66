//! Repository implementations for database operations.

pub mod entity;

pub use entity::EntityRepository;
