use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::debounce::Debouncer;
use crate::error::MatchError;
use crate::identity::Identity;
use crate::model::{Athlete, TacticalAction};
use crate::session::{ARCHIVE_SLOTS, MatchSession, MatchSnapshot};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Loading,
    Report(String),
    SavedGames { selected: Option<usize> },
    ConfirmReset,
    Rename { athlete: Athlete, buffer: String },
    Help,
}

/// Messages from the sync worker to the UI thread.
#[derive(Debug, Clone)]
pub enum Delta {
    IdentityReady(Identity),
    StoreReady(String),
    SessionLoaded(Option<MatchSnapshot>),
    Saved { at: String },
    Log(String),
}

/// Requests from the UI thread to the sync worker.
#[derive(Debug, Clone)]
pub enum SyncCommand {
    Save(MatchSnapshot),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub session: MatchSession,
    pub modal: Option<Modal>,
    pub logs: VecDeque<String>,
    pub identity: Option<Identity>,
    pub store_label: Option<String>,
    pub last_saved_at: Option<String>,
    session_loaded: bool,
    saver: Debouncer<MatchSnapshot>,
    scheduled_revision: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl AppState {
    pub fn new(save_debounce: Duration) -> Self {
        Self {
            session: MatchSession::new(),
            modal: Some(Modal::Loading),
            logs: VecDeque::with_capacity(MAX_LOGS),
            identity: None,
            store_label: None,
            last_saved_at: None,
            session_loaded: false,
            saver: Debouncer::new(save_debounce),
            scheduled_revision: 0,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Saves are suppressed until we know who we are and what was stored before.
    pub fn persistence_ready(&self) -> bool {
        self.identity.is_some() && self.session_loaded
    }

    pub fn save_pending(&self) -> bool {
        self.saver.is_pending()
    }

    /// Schedules a save when the session changed since the last schedule and returns the
    /// snapshot once the quiet period has elapsed. The snapshot is taken at schedule time.
    pub fn poll_save(&mut self, now: Instant) -> Option<MatchSnapshot> {
        if !self.persistence_ready() {
            return None;
        }
        let revision = self.session.revision();
        if revision != self.scheduled_revision {
            self.saver.schedule(now, self.session.snapshot());
            self.scheduled_revision = revision;
        }
        self.saver.take_due(now)
    }

    /// Hands over the latest unsaved state right away, skipping the quiet period. Used on exit.
    pub fn flush_save(&mut self) -> Option<MatchSnapshot> {
        if !self.persistence_ready() {
            return None;
        }
        let pending = self.saver.cancel();
        let revision = self.session.revision();
        if revision != self.scheduled_revision {
            self.scheduled_revision = revision;
            return Some(self.session.snapshot());
        }
        pending
    }

    pub fn record_tactical(&mut self, action: TacticalAction) {
        self.session.record_tactical(action);
    }

    pub fn record_point(&mut self, athlete: Athlete) {
        let entry = self.session.record_point(athlete);
        log::debug!("point for {} logged as #{}", athlete.letter(), entry.id);
    }

    pub fn select_zone_at(&mut self, position: usize) {
        if let Err(err) = self.session.select_zone_at(position) {
            self.push_log(format!("[WARN] {err}"));
        }
    }

    pub fn open_report(&mut self) {
        self.modal = Some(Modal::Report(self.session.report()));
    }

    pub fn finalize_and_advance(&mut self) -> Result<usize, MatchError> {
        match self.session.finalize_and_advance() {
            Ok(slot) => {
                self.push_log(format!(
                    "[INFO] Bout saved to slot {}/{}",
                    slot + 1,
                    ARCHIVE_SLOTS
                ));
                Ok(slot)
            }
            Err(err) => {
                self.push_log(format!("[WARN] {err}"));
                Err(err)
            }
        }
    }

    pub fn confirm_reset(&mut self) {
        self.session.full_reset();
        self.modal = None;
        self.push_log("[INFO] New scouting session started");
    }

    pub fn begin_rename(&mut self, athlete: Athlete) {
        let buffer = self.session.athlete_name(athlete).to_string();
        self.modal = Some(Modal::Rename { athlete, buffer });
    }

    /// Applies the name being edited. Blank input keeps the old name.
    pub fn commit_rename(&mut self) {
        let Some(Modal::Rename { athlete, buffer }) = self.modal.take() else {
            return;
        };
        let name = buffer.trim();
        if !name.is_empty() && name != self.session.athlete_name(athlete) {
            self.session.rename(athlete, name);
        }
    }

    pub fn select_saved_game(&mut self, forward: bool) {
        let count = self.session.archived_reports().len();
        let Some(Modal::SavedGames { selected }) = &mut self.modal else {
            return;
        };
        if count == 0 {
            *selected = None;
            return;
        }
        *selected = Some(match (*selected, forward) {
            (None, _) => 0,
            (Some(idx), true) => (idx + 1) % count,
            (Some(idx), false) => (idx + count - 1) % count,
        });
    }

    pub fn selected_saved_report(&self) -> Option<&str> {
        let Some(Modal::SavedGames {
            selected: Some(idx),
        }) = &self.modal
        else {
            return None;
        };
        self.session.archived_reports().get(*idx).map(String::as_str)
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::IdentityReady(identity) => {
            state.push_log(format!(
                "[INFO] Signed in as {} ({})",
                identity.user_id, identity.app_id
            ));
            state.identity = Some(identity);
        }
        Delta::StoreReady(label) => {
            state.store_label = Some(label);
        }
        Delta::SessionLoaded(snapshot) => {
            match snapshot {
                Some(snapshot) => {
                    state.session.restore(snapshot);
                    // The store already holds exactly this.
                    state.scheduled_revision = state.session.revision();
                    state.push_log("[INFO] Previous session restored");
                }
                // Anything edited while loading still differs from revision 0 and gets saved.
                None => state.push_log("[INFO] No saved session, starting fresh"),
            }
            state.session_loaded = true;
            if state.modal == Some(Modal::Loading) {
                state.modal = None;
            }
        }
        Delta::Saved { at } => {
            state.session.set_updated_at(at.clone());
            state.last_saved_at = Some(at);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
