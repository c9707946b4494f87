//! CLI subcommand implementations.

pub mod day;
pub mod flow;
pub mod session;
pub mod status;
pub mod summary;
