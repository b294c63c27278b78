//! # datachat-cli
//!
//! Argument parsing, config loading and the command implementations behind the `datachat`
//! binary.

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Cli, Commands};
pub use config::AppConfig;
