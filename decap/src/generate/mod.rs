//! # Generate
//!
//! Runtime generation of auxiliary files (shell completions).

pub(crate) mod completion;
pub(crate) use completion::Complete;
