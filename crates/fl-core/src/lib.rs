//! Core domain logic for the flow log.
//!
//! This crate contains the fundamental types and logic for:
//! - Session: the Start/Prompt/InFlow/Summary state machine
//! - Flows: named intervals of focused work and their record store
//! - Summary: aggregating a day into proportional timeline entries
//! - Persistence: saving and restoring the session through a string store

pub mod clock;
pub mod flow;
pub mod format;
pub mod persist;
pub mod session;
mod summary;
mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use flow::{FlowError, FlowInterval, FlowRecordStore};
pub use format::{format_clock_time_in, format_duration};
pub use persist::{
    Confirm, DEFAULT_STORAGE_KEY, MemoryStore, PersistError, Persistence, SnapshotStore,
    StoreError, UnavailableStore,
};
pub use session::{Phase, SessionMachine, SessionSnapshot, TransitionTicket};
pub use summary::{
    DEFAULT_MIN_DURATION_MINUTES, DaySummary, SummaryEntry, TOTAL_ENTRY_NAME, round_minutes,
    summarize,
};
pub use types::{TaskName, ValidationError};
