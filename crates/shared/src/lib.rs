//! Shared utilities for the Geoprowler backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Coordinate validation logic

pub mod validation;
