//! # ccdrive - Incremental C/C++ Build Driver
//!
//! ccdrive (`ccd`) recompiles only the sources that changed since the last
//! run, or that include (directly or through other headers) a header that
//! changed. It then links every object in the object directory into one
//! program.
//!
//! ## Quick Start
//!
//! ```bash
//! # Build changed sources and link
//! ccd compile
//!
//! # Force a full rebuild
//! ccd c -a
//!
//! # Run the linked program
//! ccd run -- --some-flag
//! ```
//!
//! ## Module Organization
//!
//! - [`build`] - Discovery, invalidation, state persistence and compilation
//! - [`config`] - Configuration parsing (`ccd.toml`)
//! - [`commands`] - CLI command handlers
//! - [`error`] - Error type shared by the build components

/// Incremental build engine.
pub mod build;

/// CLI command handlers that sit outside the build engine.
pub mod commands;

/// Configuration file parsing (`ccd.toml`).
pub mod config;

/// Build error taxonomy.
pub mod error;
