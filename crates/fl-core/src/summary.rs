//! End-of-day aggregation.
//!
//! Turns the day's bounds and completed flows into a list of entries ready
//! for display on a single proportional timeline.
//!
//! # Algorithm Summary
//!
//! 1. `total = day_end - day_start` seconds; a zero total disables the
//!    proportional layout (all offsets are 0).
//! 2. A synthetic "Total Time" entry always comes first with zero offsets.
//! 3. Each completed flow shorter than the minimum-duration filter is
//!    dropped (strictly shorter: a flow exactly at the threshold is kept).
//! 4. Kept flows get left/right margins as percentages of the day, in
//!    completion order.
//!
//! Negative durations (clock skew, stale restored data) are not clamped and
//! show up as negative minutes or offsets.

use serde::Serialize;

use crate::flow::FlowInterval;

/// Default minimum-duration filter for summary display, in minutes.
pub const DEFAULT_MIN_DURATION_MINUTES: u32 = 60;

/// Label of the synthetic whole-day entry.
pub const TOTAL_ENTRY_NAME: &str = "Total Time";

/// One row of the summary timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryEntry {
    pub name: String,
    pub duration_minutes: i64,
    /// Margin before the segment, as a percentage of the day.
    pub left_offset_pct: f64,
    /// Margin after the segment, as a percentage of the day.
    pub right_offset_pct: f64,
    pub is_total: bool,
}

/// Aggregated view of one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub day_start_time: f64,
    pub day_end_time: f64,
    pub min_duration_filter_minutes: u32,
    /// Rounded length of the whole day.
    pub total_minutes: i64,
    /// Sum of the rounded minutes of every kept flow.
    pub kept_minutes: i64,
    /// Number of flows removed by the minimum-duration filter.
    pub hidden_count: usize,
    /// The "Total Time" entry followed by kept flows in completion order.
    pub entries: Vec<SummaryEntry>,
}

impl DaySummary {
    /// Entries for individual flows, without the leading total.
    pub fn flow_entries(&self) -> &[SummaryEntry] {
        self.entries.get(1..).unwrap_or_default()
    }
}

/// Builds the summary for a day.
///
/// Flows that are still in progress are skipped; they have no end to place
/// on the timeline.
pub fn summarize(
    day_start: f64,
    day_end: f64,
    flows: &[FlowInterval],
    min_duration_minutes: u32,
) -> DaySummary {
    let total_seconds = day_end - day_start;
    let threshold_seconds = f64::from(min_duration_minutes) * 60.0;

    let percent_of_day = |seconds: f64| {
        if total_seconds == 0.0 {
            0.0
        } else {
            seconds / total_seconds * 100.0
        }
    };

    let mut entries = vec![SummaryEntry {
        name: TOTAL_ENTRY_NAME.to_string(),
        duration_minutes: round_minutes(total_seconds),
        left_offset_pct: 0.0,
        right_offset_pct: 0.0,
        is_total: true,
    }];
    let mut kept_minutes = 0;
    let mut hidden_count = 0;

    for flow in flows {
        let Some(end_time) = flow.end_time else {
            tracing::debug!(name = %flow.name, "skipping in-progress flow in summary");
            continue;
        };
        let duration_seconds = end_time - flow.start_time;
        if duration_seconds < threshold_seconds {
            hidden_count += 1;
            continue;
        }

        let duration_minutes = round_minutes(duration_seconds);
        kept_minutes += duration_minutes;
        entries.push(SummaryEntry {
            name: flow.name.to_string(),
            duration_minutes,
            left_offset_pct: percent_of_day(flow.start_time - day_start),
            right_offset_pct: percent_of_day(day_end - end_time),
            is_total: false,
        });
    }

    DaySummary {
        day_start_time: day_start,
        day_end_time: day_end,
        min_duration_filter_minutes: min_duration_minutes,
        total_minutes: round_minutes(total_seconds),
        kept_minutes,
        hidden_count,
        entries,
    }
}

/// Converts seconds to whole minutes, rounding halves up (89s -> 1, 90s -> 2).
#[expect(
    clippy::cast_possible_truncation,
    reason = "minute counts of a single day are far below i64::MAX"
)]
pub fn round_minutes(seconds: f64) -> i64 {
    (seconds / 60.0 + 0.5).floor() as i64
}
