//! Shared collaborator handles.

pub mod aliases;

pub use aliases::*;
