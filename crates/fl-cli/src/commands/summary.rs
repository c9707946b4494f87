//! Summary command and summary rendering.
//!
//! Shared by `fl end`, `fl summary` and the interactive session.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Result, bail};
use chrono::TimeZone;
use clap::Args;

use fl_core::{
    Clock, DaySummary, Phase, SessionMachine, SnapshotStore, format_clock_time_in,
    format_duration,
};

use crate::Config;

/// Width of the rendered timeline, in cells.
const TIMELINE_WIDTH: usize = 40;

/// Options shared by the commands that print a summary.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct SummaryArgs {
    /// Hide flows shorter than this many minutes.
    #[arg(long, value_name = "MINUTES")]
    pub min_minutes: Option<u32>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Prints the final summary once the day has ended, or a preview of the day
/// so far.
pub fn run<W: Write, C: Clock, S: SnapshotStore, Tz: TimeZone>(
    writer: &mut W,
    machine: &mut SessionMachine<C, S>,
    args: SummaryArgs,
    config: &Config,
    tz: &Tz,
) -> Result<()> {
    apply_filter(machine, args, config);

    let (summary, is_final) = if machine.effective_phase() == Phase::Summary {
        (machine.summary(), true)
    } else {
        (machine.preview_summary(), false)
    };
    let Some(summary) = summary else {
        bail!("No day in progress. Run 'fl begin' first.");
    };

    write_summary(writer, &summary, is_final, args.json, tz)
}

/// Applies the filter from the command line, falling back to the config.
pub fn apply_filter<C: Clock, S: SnapshotStore>(
    machine: &mut SessionMachine<C, S>,
    args: SummaryArgs,
    config: &Config,
) {
    if let Some(minutes) = args.min_minutes.or(config.min_duration_minutes) {
        machine.set_min_duration_filter(minutes);
    }
}

pub fn write_summary<W: Write, Tz: TimeZone>(
    writer: &mut W,
    summary: &DaySummary,
    is_final: bool,
    json: bool,
    tz: &Tz,
) -> Result<()> {
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(summary)?)?;
    } else {
        write!(writer, "{}", format_summary(summary, is_final, tz))?;
    }
    Ok(())
}

/// Formats the human-readable summary.
pub fn format_summary<Tz: TimeZone>(summary: &DaySummary, is_final: bool, tz: &Tz) -> String {
    let mut output = String::new();

    let title = if is_final { "Summary" } else { "Day so far" };
    writeln!(
        output,
        "{title}: {} - {}",
        format_clock_time_in(summary.day_start_time, tz),
        format_clock_time_in(summary.day_end_time, tz)
    )
    .unwrap();

    let rows: Vec<(&str, String, String)> = summary
        .entries
        .iter()
        .map(|entry| {
            (
                entry.name.as_str(),
                format_duration(entry.duration_minutes),
                timeline_bar(entry.left_offset_pct, entry.right_offset_pct, TIMELINE_WIDTH),
            )
        })
        .collect();
    let name_width = rows.iter().map(|(n, _, _)| n.chars().count()).max().unwrap_or(0);
    let duration_width = rows.iter().map(|(_, d, _)| d.len()).max().unwrap_or(0);

    for (name, duration, bar) in &rows {
        writeln!(output, "{name:<name_width$}  {duration:<duration_width$}  {bar}").unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "Focused: {}", format_duration(summary.kept_minutes)).unwrap();
    if summary.hidden_count > 0 {
        writeln!(
            output,
            "Hidden by the {} minute filter: {}",
            summary.min_duration_filter_minutes, summary.hidden_count
        )
        .unwrap();
    }

    output
}

/// Draws a segment on a fixed-width timeline using percentage margins.
///
/// Negative or non-finite margins render as no margin.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "cell counts are clamped to the bar width"
)]
pub fn timeline_bar(left_pct: f64, right_pct: f64, width: usize) -> String {
    let cells = |pct: f64| {
        if pct.is_finite() && pct > 0.0 {
            ((pct / 100.0) * width as f64).round().min(width as f64) as usize
        } else {
            0
        }
    };

    let left = cells(left_pct);
    let right = cells(right_pct).min(width - left);
    let filled = width - left - right;
    format!("{}{}{}", "░".repeat(left), "█".repeat(filled), "░".repeat(right))
}
