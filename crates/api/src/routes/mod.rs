//! HTTP route handlers.

pub mod entities;
pub mod health;
pub mod locations;
