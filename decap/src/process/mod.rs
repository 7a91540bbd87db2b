//! # Process
//!
//! Output side: formatting and printing decoded events.

pub(crate) mod display;
