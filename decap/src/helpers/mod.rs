//! # Helpers
//!
//! Provides both helpers for the main crate and tools.

pub(crate) mod logger;
