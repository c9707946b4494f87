//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::summary::SummaryArgs;

/// Flow log.
///
/// Tracks the day as a sequence of named focus intervals ("flows") and prints
/// a proportional timeline of them when the day ends.
#[derive(Debug, Parser)]
#[command(name = "fl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Resume a stored session without asking.
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Begin the work day.
    Begin,

    /// Start a flow for a task.
    Start {
        /// Task name. Uses the drafted name when omitted.
        name: Vec<String>,
    },

    /// Save the next task's name without starting it.
    Draft {
        /// Task name.
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// End the current flow.
    Pause,

    /// End the day and print the summary.
    End(SummaryArgs),

    /// Print the summary of the day so far.
    Summary(SummaryArgs),

    /// Show the current session.
    Status {
        /// Output the raw session snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run an interactive session.
    Session,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn start_joins_words() {
        let cli = Cli::parse_from(["fl", "start", "write", "the", "report"]);
        match cli.command {
            Some(Commands::Start { name }) => assert_eq!(name.join(" "), "write the report"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn summary_flags_parse() {
        let cli = Cli::parse_from(["fl", "-y", "end", "--min-minutes", "15", "--json"]);
        assert!(cli.yes);
        match cli.command {
            Some(Commands::End(args)) => {
                assert_eq!(args.min_minutes, Some(15));
                assert!(args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
