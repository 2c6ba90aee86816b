//! stylegraft library crate: configuration and document I/O around the
//! merge engine.
//!
//! The primary interface is the `stylegraft` binary. The engine itself lives
//! in `stylegraft-core` and is re-exported here as [`engine`] so that
//! integration tests and embedders need a single dependency.

pub mod config;
pub mod document;

pub use stylegraft_core as engine;
