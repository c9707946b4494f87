//! Status command for showing the current session.

use std::io::Write;

use anyhow::Result;
use chrono::TimeZone;

use fl_core::{Clock, Phase, SessionMachine, SnapshotStore, format_clock_time_in};

pub fn run<W: Write, C: Clock, S: SnapshotStore, Tz: TimeZone>(
    writer: &mut W,
    machine: &SessionMachine<C, S>,
    json: bool,
    tz: &Tz,
) -> Result<()> {
    let snapshot = machine.snapshot();

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(snapshot)?)?;
        return Ok(());
    }

    let phase = machine.effective_phase();
    writeln!(writer, "Phase: {phase}")?;

    if phase == Phase::Start {
        writeln!(writer, "No day in progress. Run 'fl begin' to start.")?;
        return Ok(());
    }

    if let Some(start) = snapshot.day_start_time {
        writeln!(writer, "Day started: {}", format_clock_time_in(start, tz))?;
    }
    if let Some(end) = snapshot.day_end_time {
        writeln!(writer, "Day ended: {}", format_clock_time_in(end, tz))?;
    }
    match snapshot.flows.current() {
        Some(flow) => writeln!(
            writer,
            "Current flow: {} (since {})",
            flow.name,
            format_clock_time_in(flow.start_time, tz)
        )?,
        None => writeln!(writer, "Current flow: none")?,
    }
    if !snapshot.pending_task_name.is_empty() {
        writeln!(writer, "Next task: {}", snapshot.pending_task_name)?;
    }
    writeln!(writer, "Completed flows: {}", snapshot.flows.completed().len())?;

    Ok(())
}
