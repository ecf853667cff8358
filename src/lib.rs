//! confdiff: dump an application's runtime configuration and diff two dumps
//! (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod config;
pub mod constants;
pub mod diff;
pub mod dump;
pub mod env;
pub mod materialize;
pub mod models;
pub mod output;
pub mod scanner;
pub mod source;
