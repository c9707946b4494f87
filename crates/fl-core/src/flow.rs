//! Flow intervals and the record store that owns them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::Clock;
use crate::types::{TaskName, ValidationError};

/// Errors from starting a flow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// Another flow is still in progress.
    #[error("a flow is already in progress: {0}")]
    AlreadyActive(TaskName),

    /// The task name failed validation.
    #[error(transparent)]
    InvalidName(#[from] ValidationError),
}

/// A single named interval of focused work.
///
/// An interval is in progress while `end_time` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowInterval {
    pub name: TaskName,
    pub start_time: f64,
    #[serde(default)]
    pub end_time: Option<f64>,
}

impl FlowInterval {
    pub const fn is_in_progress(&self) -> bool {
        self.end_time.is_none()
    }

    /// Elapsed seconds, or `None` while the interval is still in progress.
    pub fn duration_seconds(&self) -> Option<f64> {
        self.end_time.map(|end| end - self.start_time)
    }
}

/// Completed flows in completion order plus the in-progress flow, if any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRecordStore {
    #[serde(default)]
    current_flow: Option<FlowInterval>,
    #[serde(default)]
    completed_flows: Vec<FlowInterval>,
}

impl FlowRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn current(&self) -> Option<&FlowInterval> {
        self.current_flow.as_ref()
    }

    /// Completed flows, oldest completion first.
    pub fn completed(&self) -> &[FlowInterval] {
        &self.completed_flows
    }

    pub const fn is_active(&self) -> bool {
        self.current_flow.is_some()
    }

    /// Starts a new flow stamped with the clock's current time.
    ///
    /// Fails without touching the store if a flow is already active or the
    /// name is empty.
    pub fn start_flow(
        &mut self,
        name: &str,
        clock: &impl Clock,
    ) -> Result<&FlowInterval, FlowError> {
        if let Some(active) = &self.current_flow {
            return Err(FlowError::AlreadyActive(active.name.clone()));
        }
        let name = TaskName::new(name)?;
        let flow = self.current_flow.insert(FlowInterval {
            name,
            start_time: clock.now(),
            end_time: None,
        });
        tracing::debug!(name = %flow.name, start = flow.start_time, "flow started");
        Ok(flow)
    }

    /// Ends the active flow and appends it to the completed list.
    ///
    /// Returns the completed interval, or `None` (leaving the store untouched)
    /// when no flow is active.
    pub fn end_flow(&mut self, clock: &impl Clock) -> Option<&FlowInterval> {
        let Some(mut flow) = self.current_flow.take() else {
            tracing::debug!("end_flow with no active flow ignored");
            return None;
        };
        flow.end_time = Some(clock.now());
        tracing::debug!(
            name = %flow.name,
            start = flow.start_time,
            end = flow.end_time,
            "flow ended"
        );
        self.completed_flows.push(flow);
        self.completed_flows.last()
    }

    /// Drops the active flow and every completed flow.
    pub fn reset(&mut self) {
        self.current_flow = None;
        self.completed_flows.clear();
    }
}
