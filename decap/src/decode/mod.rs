//! # Decode
//!
//! Walks the protocol layers of captured frames and builds one event per
//! frame. Codecs for the individual protocols are registered in a group and
//! looked up by protocol identifier while walking.

pub(crate) mod capture;
pub(crate) mod cli;
pub(crate) mod codec;
pub(crate) mod dispatch;
pub(crate) mod esp;
pub(crate) mod ethernet;
pub(crate) mod ip;
pub(crate) mod l4;
pub(crate) mod stats;
