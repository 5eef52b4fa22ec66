//! Domain models for Geoprowler.

pub mod entity;

pub use entity::{Entity, GeoLocation};
