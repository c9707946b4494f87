//! The session state machine.
//!
//! ```text
//! Start -> Prompt -> InFlow -> Prompt -> ... -> Summary -> Start
//!            \_______________________________/
//!                         end day
//! ```
//!
//! Triggers apply their data effects (timestamps, flows) immediately and
//! return a [`TransitionTicket`]. The phase itself only changes when the host
//! commits that ticket, typically after a display transition. Each request
//! supersedes any earlier pending one; committing a superseded ticket does
//! nothing.
//!
//! Triggers that do not apply in the current phase are silent no-ops and
//! return `None`.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::flow::FlowRecordStore;
use crate::persist::{Confirm, Persistence, SnapshotStore};
use crate::summary::{DEFAULT_MIN_DURATION_MINUTES, DaySummary, summarize};

/// Prompt shown to the host before a stored session replaces the fresh one.
pub const RESUME_PROMPT: &str = "Load previous session?";

/// Lifecycle phase of a work session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for the user to begin the day.
    #[default]
    Start,
    /// Day started, asking for the next task.
    Prompt,
    /// A flow is running.
    InFlow,
    /// Day ended; showing the summary.
    Summary,
}

impl Phase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Prompt => "prompt",
            Self::InFlow => "in_flow",
            Self::Summary => "summary",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const fn default_min_duration() -> u32 {
    DEFAULT_MIN_DURATION_MINUTES
}

/// The full persisted state of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(default)]
    pub day_start_time: Option<f64>,
    #[serde(default)]
    pub day_end_time: Option<f64>,
    #[serde(flatten)]
    pub flows: FlowRecordStore,
    #[serde(default)]
    pub pending_task_name: String,
    #[serde(default)]
    pub phase: Phase,
    #[serde(default = "default_min_duration")]
    pub min_duration_filter_minutes: u32,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            day_start_time: None,
            day_end_time: None,
            flows: FlowRecordStore::default(),
            pending_task_name: String::new(),
            phase: Phase::Start,
            min_duration_filter_minutes: DEFAULT_MIN_DURATION_MINUTES,
        }
    }
}

impl SessionSnapshot {
    /// The end-of-day summary, once both day bounds are known.
    pub fn summary(&self) -> Option<DaySummary> {
        let end = self.day_end_time?;
        self.summary_until(end)
    }

    /// A summary of completed flows with the day cut off at `end`.
    ///
    /// Useful for previewing a day that is still in progress.
    pub fn summary_until(&self, end: f64) -> Option<DaySummary> {
        let start = self.day_start_time?;
        Some(summarize(
            start,
            end,
            self.flows.completed(),
            self.min_duration_filter_minutes,
        ))
    }
}

/// A requested phase change waiting to be committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionTicket {
    /// Monotonically increasing request id.
    pub token: u64,
    pub target: Phase,
    /// How long the host should wait before committing.
    pub delay: Duration,
}

/// Owns a [`SessionSnapshot`] and mediates every change to it.
pub struct SessionMachine<C, S> {
    snapshot: SessionSnapshot,
    clock: C,
    persistence: Persistence<S>,
    transition_delay: Duration,
    last_token: u64,
    pending: Option<TransitionTicket>,
}

impl<C: Clock, S: SnapshotStore> SessionMachine<C, S> {
    /// Creates a machine holding the default snapshot.
    pub fn new(clock: C, persistence: Persistence<S>) -> Self {
        Self {
            snapshot: SessionSnapshot::default(),
            clock,
            persistence,
            transition_delay: Duration::ZERO,
            last_token: 0,
            pending: None,
        }
    }

    /// Sets the display delay carried by every issued ticket.
    #[must_use]
    pub fn with_transition_delay(mut self, delay: Duration) -> Self {
        self.transition_delay = delay;
        self
    }

    pub const fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    pub const fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    /// The committed (rendered) phase.
    pub const fn phase(&self) -> Phase {
        self.snapshot.phase
    }

    /// The phase the session is heading to: the pending target if a
    /// transition is in flight, otherwise the committed phase.
    pub fn effective_phase(&self) -> Phase {
        self.pending.map_or(self.snapshot.phase, |t| t.target)
    }

    pub const fn pending_transition(&self) -> Option<TransitionTicket> {
        self.pending
    }

    /// Offers the stored session to the host and adopts it on confirmation.
    ///
    /// Declining keeps the current snapshot and leaves the stored value
    /// untouched. Returns whether a stored session was adopted.
    pub fn resume(&mut self, host: &mut dyn Confirm) -> bool {
        let Some(stored) = self.persistence.load() else {
            return false;
        };
        if !host.confirm(RESUME_PROMPT) {
            tracing::debug!("stored session declined");
            return false;
        }
        tracing::info!(phase = %stored.phase, flows = stored.flows.completed().len(), "resumed stored session");
        self.snapshot = stored;
        self.pending = None;
        true
    }

    /// Start -> Prompt: records the day's start time.
    pub fn begin_day(&mut self) -> Option<TransitionTicket> {
        if !self.expect_phase(&[Phase::Start], "begin_day") {
            return None;
        }
        self.snapshot.day_start_time = Some(self.clock.now());
        let ticket = self.request_transition(Phase::Prompt);
        self.persist();
        Some(ticket)
    }

    /// Replaces the buffered, not-yet-submitted task name.
    ///
    /// The buffer is persisted while a day is in progress.
    pub fn set_pending_task_name(&mut self, text: impl Into<String>) {
        self.snapshot.pending_task_name = text.into();
        if matches!(self.effective_phase(), Phase::Prompt | Phase::InFlow) {
            self.persist();
        }
    }

    /// Prompt -> InFlow: starts a flow named `name`.
    ///
    /// An empty name is ignored and the phase stays Prompt.
    pub fn submit_task(&mut self, name: &str) -> Option<TransitionTicket> {
        if !self.expect_phase(&[Phase::Prompt], "submit_task") {
            return None;
        }
        if let Err(e) = self.snapshot.flows.start_flow(name, &self.clock) {
            tracing::debug!(error = %e, "task submission ignored");
            return None;
        }
        self.snapshot.pending_task_name.clear();
        let ticket = self.request_transition(Phase::InFlow);
        self.persist();
        Some(ticket)
    }

    /// Submits the buffered task name.
    pub fn submit_pending_task(&mut self) -> Option<TransitionTicket> {
        let name = self.snapshot.pending_task_name.clone();
        self.submit_task(&name)
    }

    /// InFlow -> Prompt: ends the running flow.
    pub fn pause(&mut self) -> Option<TransitionTicket> {
        if !self.expect_phase(&[Phase::InFlow], "pause") {
            return None;
        }
        self.snapshot.flows.end_flow(&self.clock);
        let ticket = self.request_transition(Phase::Prompt);
        self.persist();
        Some(ticket)
    }

    /// Prompt/InFlow -> Summary: ends any running flow, records the day's
    /// end time and clears durable storage.
    pub fn end_day(&mut self) -> Option<TransitionTicket> {
        if !self.expect_phase(&[Phase::Prompt, Phase::InFlow], "end_day") {
            return None;
        }
        self.snapshot.flows.end_flow(&self.clock);
        self.snapshot.day_end_time = Some(self.clock.now());
        let ticket = self.request_transition(Phase::Summary);
        self.persistence.clear();
        Some(ticket)
    }

    /// Summary -> Start: discards the day.
    ///
    /// Data fields return to their defaults immediately; the phase follows
    /// when the ticket is committed.
    pub fn start_over(&mut self) -> Option<TransitionTicket> {
        if !self.expect_phase(&[Phase::Summary], "start_over") {
            return None;
        }
        let committed = self.snapshot.phase;
        self.snapshot = SessionSnapshot {
            phase: committed,
            ..SessionSnapshot::default()
        };
        Some(self.request_transition(Phase::Start))
    }

    /// Sets the summary's minimum-duration filter. Display-only; not persisted.
    pub const fn set_min_duration_filter(&mut self, minutes: u32) {
        self.snapshot.min_duration_filter_minutes = minutes;
    }

    /// The end-of-day summary, available once the day has ended.
    pub fn summary(&self) -> Option<DaySummary> {
        self.snapshot.summary()
    }

    /// A summary of the day so far, cut off at the current time.
    pub fn preview_summary(&self) -> Option<DaySummary> {
        self.snapshot.summary_until(self.clock.now())
    }

    /// Flips the phase to the ticket's target if `token` is still the most
    /// recent request. Returns whether the phase changed.
    pub fn commit_transition(&mut self, token: u64) -> bool {
        match self.pending {
            Some(ticket) if ticket.token == token => {
                tracing::debug!(from = %self.snapshot.phase, to = %ticket.target, token, "transition committed");
                self.snapshot.phase = ticket.target;
                self.pending = None;
                true
            }
            _ => {
                tracing::debug!(token, "superseded transition ignored");
                false
            }
        }
    }

    /// Commits whatever transition is pending, ignoring its delay.
    pub fn commit_pending(&mut self) -> bool {
        match self.pending {
            Some(ticket) => self.commit_transition(ticket.token),
            None => false,
        }
    }

    fn request_transition(&mut self, target: Phase) -> TransitionTicket {
        self.last_token += 1;
        let ticket = TransitionTicket {
            token: self.last_token,
            target,
            delay: self.transition_delay,
        };
        if let Some(previous) = self.pending.replace(ticket) {
            tracing::debug!(superseded = previous.token, token = ticket.token, "transition superseded");
        }
        ticket
    }

    fn expect_phase(&self, allowed: &[Phase], action: &str) -> bool {
        let phase = self.effective_phase();
        let ok = allowed.contains(&phase);
        if !ok {
            tracing::debug!(%phase, action, "trigger ignored in this phase");
        }
        ok
    }

    /// Saves the snapshot as it will look once pending transitions commit.
    fn persist(&mut self) {
        let mut snapshot = self.snapshot.clone();
        snapshot.phase = self.effective_phase();
        self.persistence.save(&snapshot);
    }
}

#[cfg(test)]
#[expect(clippy::float_cmp, reason = "manual clock values are exact")]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::persist::{MemoryStore, UnavailableStore};

    type TestMachine<'a> = SessionMachine<&'a ManualClock, MemoryStore>;

    fn machine(clock: &ManualClock) -> TestMachine<'_> {
        SessionMachine::new(clock, Persistence::with_default_key(MemoryStore::new()))
    }

    fn settle(machine: &mut TestMachine<'_>, ticket: Option<TransitionTicket>) {
        let ticket = ticket.expect("trigger should be accepted");
        assert!(machine.commit_transition(ticket.token));
    }

    fn stored(machine: &TestMachine<'_>) -> Option<SessionSnapshot> {
        machine.persistence().load()
    }

    #[test]
    fn full_day_walks_through_every_phase() {
        let clock = ManualClock::new(0.0);
        let mut m = machine(&clock);
        assert_eq!(m.phase(), Phase::Start);

        let ticket = m.begin_day();
        settle(&mut m, ticket);
        assert_eq!(m.phase(), Phase::Prompt);

        clock.set(1_800.0);
        let ticket = m.submit_task("deep work");
        settle(&mut m, ticket);
        assert_eq!(m.phase(), Phase::InFlow);

        clock.set(3_600.0);
        let ticket = m.pause();
        settle(&mut m, ticket);
        assert_eq!(m.phase(), Phase::Prompt);

        clock.set(7_200.0);
        let ticket = m.end_day();
        settle(&mut m, ticket);
        assert_eq!(m.phase(), Phase::Summary);

        let summary = m.summary().unwrap();
        let entry = &summary.flow_entries()[0];
        assert_eq!(entry.left_offset_pct, 25.0);
        assert_eq!(entry.right_offset_pct, 50.0);

        let ticket = m.start_over();
        settle(&mut m, ticket);
        assert_eq!(m.phase(), Phase::Start);
    }

    #[test]
    fn triggers_outside_their_phase_are_noops() {
        let clock = ManualClock::new(0.0);
        let mut m = machine(&clock);

        assert!(m.submit_task("x").is_none());
        assert!(m.pause().is_none());
        assert!(m.end_day().is_none());
        assert!(m.start_over().is_none());
        assert_eq!(m.snapshot(), &SessionSnapshot::default());

        let ticket = m.begin_day();
        settle(&mut m, ticket);
        assert!(m.begin_day().is_none());
        assert!(m.pause().is_none());
        assert!(m.start_over().is_none());
    }

    #[test]
    fn empty_task_name_keeps_prompt() {
        let clock = ManualClock::new(0.0);
        let mut m = machine(&clock);
        let ticket = m.begin_day();
        settle(&mut m, ticket);

        assert!(m.submit_task("").is_none());
        assert!(m.submit_task("   ").is_none());
        assert_eq!(m.phase(), Phase::Prompt);
        assert!(m.pending_transition().is_none());
        assert!(m.snapshot().flows.current().is_none());
    }

    #[test]
    fn second_submit_does_not_replace_active_flow() {
        let clock = ManualClock::new(100.0);
        let mut m = machine(&clock);
        let ticket = m.begin_day();
        settle(&mut m, ticket);
        let ticket = m.submit_task("first");
        settle(&mut m, ticket);

        clock.advance(60.0);
        assert!(m.submit_task("second").is_none());

        let current = m.snapshot().flows.current().unwrap();
        assert_eq!(current.name.as_str(), "first");
        assert_eq!(current.start_time, 100.0);
    }

    #[test]
    fn data_changes_immediately_phase_changes_on_commit() {
        let clock = ManualClock::new(50.0);
        let mut m = machine(&clock).with_transition_delay(Duration::from_millis(400));

        let ticket = m.begin_day().unwrap();
        assert_eq!(ticket.delay, Duration::from_millis(400));
        assert_eq!(ticket.target, Phase::Prompt);
        assert_eq!(m.snapshot().day_start_time, Some(50.0));
        assert_eq!(m.phase(), Phase::Start);
        assert_eq!(m.effective_phase(), Phase::Prompt);

        assert!(m.commit_transition(ticket.token));
        assert_eq!(m.phase(), Phase::Prompt);
        assert!(m.pending_transition().is_none());
    }

    #[test]
    fn superseded_transition_does_not_commit() {
        let clock = ManualClock::new(0.0);
        let mut m = machine(&clock);
        let ticket = m.begin_day();
        settle(&mut m, ticket);

        // Submit then end the day before the first transition lands.
        let to_flow = m.submit_task("quick").unwrap();
        clock.advance(30.0);
        let to_summary = m.end_day().unwrap();
        assert!(to_summary.token > to_flow.token);

        assert!(!m.commit_transition(to_flow.token));
        assert_eq!(m.phase(), Phase::Prompt);
        assert!(m.commit_transition(to_summary.token));
        assert_eq!(m.phase(), Phase::Summary);

        // A stale commit after the fact changes nothing.
        assert!(!m.commit_transition(to_flow.token));
        assert_eq!(m.phase(), Phase::Summary);
        assert_eq!(m.snapshot().flows.completed().len(), 1);
    }

    #[test]
    fn commit_pending_flushes_latest_request() {
        let clock = ManualClock::new(0.0);
        let mut m = machine(&clock);
        assert!(!m.commit_pending());

        m.begin_day();
        assert!(m.commit_pending());
        assert_eq!(m.phase(), Phase::Prompt);
    }

    #[test]
    fn end_day_finishes_active_flow() {
        let clock = ManualClock::new(0.0);
        let mut m = machine(&clock);
        m.begin_day();
        m.commit_pending();
        m.submit_task("writing");
        m.commit_pending();

        clock.set(600.0);
        m.end_day();
        m.commit_pending();

        let snapshot = m.snapshot();
        assert!(snapshot.flows.current().is_none());
        assert_eq!(snapshot.day_end_time, Some(600.0));
        let completed = snapshot.flows.completed();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].end_time, Some(600.0));
    }

    #[test]
    fn end_day_from_prompt_appends_nothing() {
        let clock = ManualClock::new(0.0);
        let mut m = machine(&clock);
        m.begin_day();
        m.commit_pending();

        clock.set(60.0);
        m.end_day();
        m.commit_pending();
        assert!(m.snapshot().flows.completed().is_empty());
        assert_eq!(m.phase(), Phase::Summary);
    }

    #[test]
    fn state_changes_are_persisted_with_target_phase() {
        let clock = ManualClock::new(10.0);
        let mut m = machine(&clock);

        m.begin_day();
        let saved = stored(&m).unwrap();
        assert_eq!(saved.phase, Phase::Prompt);
        assert_eq!(saved.day_start_time, Some(10.0));
        m.commit_pending();

        clock.set(20.0);
        m.submit_task("reading");
        let saved = stored(&m).unwrap();
        assert_eq!(saved.phase, Phase::InFlow);
        assert_eq!(saved.flows.current().unwrap().start_time, 20.0);
        m.commit_pending();

        clock.set(30.0);
        m.pause();
        let saved = stored(&m).unwrap();
        assert_eq!(saved.phase, Phase::Prompt);
        assert_eq!(saved.flows.completed().len(), 1);
    }

    #[test]
    fn end_day_clears_durable_storage() {
        let clock = ManualClock::new(0.0);
        let mut m = machine(&clock);
        m.begin_day();
        m.commit_pending();
        assert!(stored(&m).is_some());

        m.end_day();
        assert!(stored(&m).is_none());
        m.commit_pending();
        assert!(stored(&m).is_none());
    }

    #[test]
    fn pending_name_is_buffered_and_submitted() {
        let clock = ManualClock::new(0.0);
        let mut m = machine(&clock);

        // Before the day starts nothing is written.
        m.set_pending_task_name("early");
        assert!(stored(&m).is_none());

        m.begin_day();
        m.commit_pending();
        m.set_pending_task_name("plan sprint");
        assert_eq!(stored(&m).unwrap().pending_task_name, "plan sprint");

        m.submit_pending_task();
        m.commit_pending();
        assert_eq!(m.phase(), Phase::InFlow);
        assert_eq!(
            m.snapshot().flows.current().unwrap().name.as_str(),
            "plan sprint"
        );
        assert!(m.snapshot().pending_task_name.is_empty());
    }

    #[test]
    fn start_over_restores_default_snapshot() {
        let clock = ManualClock::new(0.0);
        let mut m = machine(&clock);
        m.begin_day();
        m.commit_pending();
        m.submit_task("a");
        m.commit_pending();
        clock.set(4_000.0);
        m.end_day();
        m.commit_pending();
        m.set_min_duration_filter(5);

        let ticket = m.start_over().unwrap();
        // Data resets at once; phase waits for the commit.
        assert!(m.snapshot().flows.completed().is_empty());
        assert_eq!(m.phase(), Phase::Summary);

        assert!(m.commit_transition(ticket.token));
        assert_eq!(m.snapshot(), &SessionSnapshot::default());
        assert!(stored(&m).is_none());
    }

    #[test]
    fn resume_adopts_stored_session_on_confirm() {
        let clock = ManualClock::new(0.0);
        let mut store = MemoryStore::new();
        {
            let mut first = SessionMachine::new(&clock, Persistence::with_default_key(store));
            first.begin_day();
            first.commit_pending();
            first.submit_task("carry over");
            store = first.persistence.into_store();
        }

        let mut second = SessionMachine::new(&clock, Persistence::with_default_key(store));
        let mut asked = Vec::new();
        let resumed = second.resume(&mut |prompt: &str| {
            asked.push(prompt.to_string());
            true
        });

        assert!(resumed);
        assert_eq!(asked, [RESUME_PROMPT]);
        assert_eq!(second.phase(), Phase::InFlow);
        assert_eq!(
            second.snapshot().flows.current().unwrap().name.as_str(),
            "carry over"
        );

        // Resumed sessions keep working.
        let ticket = second.pause();
        settle(&mut second, ticket);
        assert_eq!(second.snapshot().flows.completed().len(), 1);
    }

    #[test]
    fn declined_resume_keeps_default_and_stored_data() {
        let clock = ManualClock::new(0.0);
        let mut m = machine(&clock);
        m.begin_day();
        m.commit_pending();
        let store = m.persistence.into_store();

        let mut fresh = SessionMachine::new(&clock, Persistence::with_default_key(store));
        assert!(!fresh.resume(&mut |_: &str| false));
        assert_eq!(fresh.snapshot(), &SessionSnapshot::default());
        assert!(fresh.persistence().load().is_some());
    }

    #[test]
    fn resumed_snapshot_is_adopted_as_stored() {
        // Phase says Prompt but a flow is still open: kept as-is, not repaired.
        let raw = r#"{"version":1,"snapshot":{"phase":"prompt","dayStartTime":0.0,
            "currentFlow":{"name":"stale","startTime":10.0,"endTime":null}}}"#;
        let mut store = MemoryStore::new();
        store.write(crate::persist::DEFAULT_STORAGE_KEY, raw).unwrap();

        let clock = ManualClock::new(100.0);
        let mut m = SessionMachine::new(&clock, Persistence::with_default_key(store));
        assert!(m.resume(&mut |_: &str| true));
        assert_eq!(m.phase(), Phase::Prompt);

        // The open flow blocks new submissions until the day ends.
        assert!(m.submit_task("fresh").is_none());
        assert_eq!(m.snapshot().flows.current().unwrap().name.as_str(), "stale");

        let ticket = m.end_day();
        settle(&mut m, ticket);
        let completed = m.snapshot().flows.completed();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].end_time, Some(100.0));
    }

    #[test]
    fn resume_without_stored_session_does_not_ask() {
        let clock = ManualClock::new(0.0);
        let mut m = machine(&clock);
        let mut asked = false;
        assert!(!m.resume(&mut |_: &str| {
            asked = true;
            true
        }));
        assert!(!asked);
    }

    #[test]
    fn unavailable_storage_does_not_block_transitions() {
        let clock = ManualClock::new(0.0);
        let mut m = SessionMachine::new(&clock, Persistence::with_default_key(UnavailableStore));

        assert!(!m.resume(&mut |_: &str| true));
        m.begin_day();
        m.commit_pending();
        m.submit_task("offline");
        m.commit_pending();
        clock.set(120.0);
        m.end_day();
        m.commit_pending();

        assert_eq!(m.phase(), Phase::Summary);
        assert_eq!(m.snapshot().flows.completed().len(), 1);
    }

    #[test]
    fn preview_summary_uses_current_time() {
        let clock = ManualClock::new(0.0);
        let mut m = machine(&clock);
        assert!(m.preview_summary().is_none());

        m.begin_day();
        m.commit_pending();
        clock.set(3_600.0);
        let preview = m.preview_summary().unwrap();
        assert_eq!(preview.total_minutes, 60);
        assert!(m.summary().is_none());
    }

    #[test]
    fn phase_serializes_snake_case() {
        let json = serde_json::to_string(&Phase::InFlow).unwrap();
        assert_eq!(json, "\"in_flow\"");
        assert_eq!(Phase::InFlow.to_string(), "in_flow");
    }
}
