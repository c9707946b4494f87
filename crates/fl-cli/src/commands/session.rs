//! Interactive session.
//!
//! Reads one command per line and drives the whole day, including the
//! Summary -> Start reset that separate `fl` invocations cannot reach.

use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::{Result, anyhow, bail};
use chrono::TimeZone;

use fl_core::{Clock, Phase, SessionMachine, SnapshotStore};

use crate::Config;
use crate::commands::summary::SummaryArgs;
use crate::commands::{day, flow, status, summary};
use crate::host::settle;

const HELP: &str = "\
Commands:
  begin            begin the work day
  start [NAME]     start a flow (uses the drafted name when NAME is omitted)
  draft TEXT       save the next task's name
  pause            end the current flow
  end              end the day and show the summary
  summary          show the summary
  filter MINUTES   hide flows shorter than MINUTES
  reset            discard the finished day
  status           show the current session
  help             show this message
  quit             leave the session";

/// A line typed into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Begin,
    Start(String),
    Draft(String),
    Pause,
    End,
    Summary,
    Filter(u32),
    Reset,
    Status,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match word.to_ascii_lowercase().as_str() {
            "begin" => Self::Begin,
            "start" => Self::Start(rest.to_string()),
            "draft" => Self::Draft(rest.to_string()),
            "pause" => Self::Pause,
            "end" => Self::End,
            "summary" => Self::Summary,
            "filter" => {
                let minutes = rest
                    .parse()
                    .map_err(|_| anyhow!("filter needs a whole number of minutes"))?;
                Self::Filter(minutes)
            }
            "reset" => Self::Reset,
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => bail!("Unknown command '{word}'. Type 'help' for commands."),
        };
        Ok(command)
    }
}

/// Whether the session keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Runs the session until `quit` or end of input.
///
/// Command failures are reported on `writer` and do not end the session.
pub fn run<R: BufRead, W: Write, C: Clock, S: SnapshotStore, Tz: TimeZone>(
    input: R,
    writer: &mut W,
    machine: &mut SessionMachine<C, S>,
    config: &Config,
    tz: &Tz,
    show_prompt: bool,
) -> Result<()> {
    if let Some(minutes) = config.min_duration_minutes {
        machine.set_min_duration_filter(minutes);
    }

    let mut lines = input.lines();
    loop {
        if show_prompt {
            write!(writer, "{}> ", machine.effective_phase())?;
            writer.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let outcome = line
            .parse::<SessionCommand>()
            .and_then(|command| execute(command, writer, machine, config, tz));
        match outcome {
            Ok(Control::Quit) => break,
            Ok(Control::Continue) => {}
            Err(e) => writeln!(writer, "{e}")?,
        }
    }
    Ok(())
}

/// Executes a single command.
pub fn execute<W: Write, C: Clock, S: SnapshotStore, Tz: TimeZone>(
    command: SessionCommand,
    writer: &mut W,
    machine: &mut SessionMachine<C, S>,
    config: &Config,
    tz: &Tz,
) -> Result<Control> {
    tracing::debug!(?command, phase = %machine.effective_phase(), "session command");

    // Keep the filter chosen in this session rather than the config's.
    let args = SummaryArgs {
        min_minutes: Some(machine.snapshot().min_duration_filter_minutes),
        json: false,
    };

    match command {
        SessionCommand::Begin => day::begin(writer, machine, tz)?,
        SessionCommand::Start(name) => flow::start(writer, machine, &name, tz)?,
        SessionCommand::Draft(text) => flow::draft(writer, machine, &text)?,
        SessionCommand::Pause => flow::pause(writer, machine)?,
        SessionCommand::End => day::end(writer, machine, args, config, tz)?,
        SessionCommand::Summary => summary::run(writer, machine, args, config, tz)?,
        SessionCommand::Filter(minutes) => {
            machine.set_min_duration_filter(minutes);
            if machine.effective_phase() == Phase::Summary {
                let args = SummaryArgs {
                    min_minutes: Some(minutes),
                    json: false,
                };
                summary::run(writer, machine, args, config, tz)?;
            } else {
                writeln!(writer, "Hiding flows shorter than {minutes} minutes.")?;
            }
        }
        SessionCommand::Reset => {
            let Some(ticket) = machine.start_over() else {
                bail!("Only a finished day can be reset. Run 'end' first.");
            };
            settle(machine, ticket);
            writeln!(writer, "Day discarded.")?;
        }
        SessionCommand::Status => status::run(writer, machine, false, tz)?,
        SessionCommand::Help => writeln!(writer, "{HELP}")?,
        SessionCommand::Quit => return Ok(Control::Quit),
    }
    Ok(Control::Continue)
}
