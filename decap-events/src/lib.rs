//! # Decap events
//!
//! This crate contains the definitions of the types that conform the decap
//! event as well as some ancillary structs and helpers to facilitate parsing
//! and displaying events.

pub mod events;
pub use events::*;

pub mod display;
pub use display::*;

pub mod common;
pub use common::*;
pub mod diag;
pub use diag::*;
pub mod esp;
pub use esp::*;
pub mod net;
pub use net::*;
pub mod payload;
pub use payload::*;
pub mod time;
pub use time::*;
