//! # Ergo-Core
//!
//! Core types and utilities for the ergonomic risk assessment workspace:
//! the canonical joint enumeration, pose frames with explicit absence,
//! landmark geometry, and the shared error type.

pub mod error;
pub mod geometry;
pub mod types;

pub use error::{Error, Result};
pub use geometry::*;
pub use types::*;
