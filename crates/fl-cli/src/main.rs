use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fl_cli::commands::{day, flow, session, status, summary};
use fl_cli::host::{self, TerminalConfirm};
use fl_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so command output stays parseable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut machine = host::open_machine(&config, &mut TerminalConfirm::new(cli.yes));
    let mut stdout = io::stdout().lock();

    match command {
        Commands::Begin => day::begin(&mut stdout, &mut machine, &Local)?,
        Commands::Start { name } => flow::start(&mut stdout, &mut machine, &name.join(" "), &Local)?,
        Commands::Draft { text } => flow::draft(&mut stdout, &mut machine, &text.join(" "))?,
        Commands::Pause => flow::pause(&mut stdout, &mut machine)?,
        Commands::End(args) => day::end(&mut stdout, &mut machine, args, &config, &Local)?,
        Commands::Summary(args) => summary::run(&mut stdout, &mut machine, args, &config, &Local)?,
        Commands::Status { json } => status::run(&mut stdout, &machine, json, &Local)?,
        Commands::Session => {
            let stdin = io::stdin();
            let show_prompt = stdin.is_terminal();
            session::run(stdin.lock(), &mut stdout, &mut machine, &config, &Local, show_prompt)?;
        }
    }

    Ok(())
}
