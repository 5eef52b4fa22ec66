//! Domain layer for the Geoprowler backend.
//!
//! This crate contains:
//! - Domain models (Entity, GeoLocation) and HTTP payloads
//! - The entity store abstraction and its error kinds

pub mod models;
pub mod services;
