//! Wiring between the CLI and the session core.
//!
//! Opens the durable store, asks the user about resuming, and drives
//! transition tickets to completion.

use std::io::{self, BufRead, IsTerminal, Write};
use std::time::Duration;

use fl_core::{
    Clock, Confirm, Persistence, SessionMachine, SnapshotStore, SystemClock, TransitionTicket,
    UnavailableStore,
};
use fl_db::Database;

use crate::Config;

/// The session machine as the CLI runs it.
pub type Machine = SessionMachine<SystemClock, Box<dyn SnapshotStore>>;

/// Opens the configured database, falling back to no persistence.
///
/// A missing or unopenable database is logged and the session continues
/// without resume support.
pub fn open_store(config: &Config) -> Box<dyn SnapshotStore> {
    if let Some(parent) = config.database_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!(path = %parent.display(), error = %e, "cannot create data directory; progress will not be saved");
            return Box::new(UnavailableStore);
        }
    }

    match Database::open(&config.database_path) {
        Ok(db) => Box::new(db),
        Err(e) => {
            tracing::warn!(path = %config.database_path.display(), error = %e, "cannot open database; progress will not be saved");
            Box::new(UnavailableStore)
        }
    }
}

/// Builds the session machine and offers to resume a stored session.
pub fn open_machine(config: &Config, confirm: &mut dyn Confirm) -> Machine {
    let persistence = Persistence::new(open_store(config), config.storage_key.clone());
    let mut machine = SessionMachine::new(SystemClock, persistence)
        .with_transition_delay(Duration::from_millis(config.transition_ms));
    machine.resume(confirm);
    machine
}

/// Waits out a ticket's display delay, then commits it.
pub fn settle<C: Clock, S: SnapshotStore>(
    machine: &mut SessionMachine<C, S>,
    ticket: TransitionTicket,
) -> bool {
    if !ticket.delay.is_zero() {
        std::thread::sleep(ticket.delay);
    }
    machine.commit_transition(ticket.token)
}

/// Answers the resume question for the CLI.
///
/// `--yes` accepts without asking. Otherwise the user is asked on stderr
/// when stdin is a terminal; non-interactive runs decline.
#[derive(Debug, Clone, Copy)]
pub struct TerminalConfirm {
    assume_yes: bool,
}

impl TerminalConfirm {
    pub const fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            tracing::debug!("stdin is not a terminal; not resuming stored session");
            return false;
        }

        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        match stdin.lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read answer");
                false
            }
        }
    }
}

/// Whether a typed answer means "yes".
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
