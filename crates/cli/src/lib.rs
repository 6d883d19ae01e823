//! Command-line front end for clipstudio.
//!
//! The binary in `main.rs` only parses arguments, installs tracing and
//! hands off to [`commands::dispatch`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod state;
