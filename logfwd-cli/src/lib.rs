//! logfwd CLI library
//!
//! The `logfwd` binary is a thin wrapper over these modules so that
//! command handlers can be exercised from integration tests.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod settings;
pub mod sink;
