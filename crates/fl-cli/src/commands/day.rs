//! Commands that open and close the work day.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::TimeZone;

use fl_core::{Clock, SessionMachine, SnapshotStore, format_clock_time_in};

use crate::Config;
use crate::commands::summary::{self, SummaryArgs};
use crate::host::settle;

/// Begins the day.
pub fn begin<W: Write, C: Clock, S: SnapshotStore, Tz: TimeZone>(
    writer: &mut W,
    machine: &mut SessionMachine<C, S>,
    tz: &Tz,
) -> Result<()> {
    let Some(ticket) = machine.begin_day() else {
        bail!(
            "The day is already underway ({}). Run 'fl status' to see it.",
            machine.effective_phase()
        );
    };
    settle(machine, ticket);

    let start = machine
        .snapshot()
        .day_start_time
        .context("day start was not recorded")?;
    writeln!(writer, "Day started at {}.", format_clock_time_in(start, tz))?;
    writeln!(writer, "What are you working on?")?;
    Ok(())
}

/// Ends the day and prints its summary.
pub fn end<W: Write, C: Clock, S: SnapshotStore, Tz: TimeZone>(
    writer: &mut W,
    machine: &mut SessionMachine<C, S>,
    args: SummaryArgs,
    config: &Config,
    tz: &Tz,
) -> Result<()> {
    let Some(ticket) = machine.end_day() else {
        bail!("No day in progress. Run 'fl begin' first.");
    };
    settle(machine, ticket);

    summary::apply_filter(machine, args, config);
    let summary = machine.summary().context("day bounds were not recorded")?;
    summary::write_summary(writer, &summary, true, args.json, tz)
}
