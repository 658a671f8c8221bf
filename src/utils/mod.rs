//! Shared utilities.

pub mod error;
