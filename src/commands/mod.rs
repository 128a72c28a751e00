//! CLI Command handlers
//!
//! Handlers for the commands that are not part of the build engine itself.

pub mod print;
pub mod status;
