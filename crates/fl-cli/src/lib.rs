//! Flow log CLI library.
//!
//! This crate provides the CLI interface for the flow log.

mod cli;
pub mod commands;
mod config;
pub mod host;

pub use cli::{Cli, Commands};
pub use config::Config;
