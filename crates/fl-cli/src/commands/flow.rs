//! Commands that start, buffer and pause flows.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::TimeZone;

use fl_core::{
    Clock, Phase, SessionMachine, SnapshotStore, format_clock_time_in, format_duration,
    round_minutes,
};

use crate::host::settle;

/// Starts a flow named `name`, or the drafted name when `name` is empty.
pub fn start<W: Write, C: Clock, S: SnapshotStore, Tz: TimeZone>(
    writer: &mut W,
    machine: &mut SessionMachine<C, S>,
    name: &str,
    tz: &Tz,
) -> Result<()> {
    let ticket = if name.trim().is_empty() {
        machine.submit_pending_task()
    } else {
        machine.submit_task(name)
    };
    let Some(ticket) = ticket else {
        bail!(rejected_start_reason(machine));
    };
    settle(machine, ticket);

    if let Some(flow) = machine.snapshot().flows.current() {
        writeln!(
            writer,
            "Started '{}' at {}.",
            flow.name,
            format_clock_time_in(flow.start_time, tz)
        )?;
    }
    Ok(())
}

fn rejected_start_reason<C: Clock, S: SnapshotStore>(machine: &SessionMachine<C, S>) -> String {
    match machine.effective_phase() {
        Phase::Start => "The day has not started. Run 'fl begin' first.".to_string(),
        Phase::InFlow => {
            let current = machine
                .snapshot()
                .flows
                .current()
                .map_or_else(String::new, |flow| format!(" ({})", flow.name));
            format!("Already in a flow{current}. Run 'fl pause' first.")
        }
        Phase::Summary => "The day is over.".to_string(),
        Phase::Prompt => "Task name cannot be empty.".to_string(),
    }
}

/// Buffers the next task's name.
pub fn draft<W: Write, C: Clock, S: SnapshotStore>(
    writer: &mut W,
    machine: &mut SessionMachine<C, S>,
    text: &str,
) -> Result<()> {
    machine.set_pending_task_name(text);
    writeln!(writer, "Next task: {text}")?;
    if !matches!(machine.effective_phase(), Phase::Prompt | Phase::InFlow) {
        writeln!(writer, "(not saved: no day in progress)")?;
    }
    Ok(())
}

/// Pauses the running flow.
pub fn pause<W: Write, C: Clock, S: SnapshotStore>(
    writer: &mut W,
    machine: &mut SessionMachine<C, S>,
) -> Result<()> {
    let Some(ticket) = machine.pause() else {
        bail!("No flow in progress.");
    };
    settle(machine, ticket);

    if let Some(flow) = machine.snapshot().flows.completed().last() {
        let minutes = flow.duration_seconds().map_or(0, round_minutes);
        writeln!(
            writer,
            "Paused '{}' after {}.",
            flow.name,
            format_duration(minutes)
        )?;
    }
    Ok(())
}
