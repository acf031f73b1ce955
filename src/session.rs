use std::time::Instant;

use serde::{Deserialize, Deserializer, Serialize};

use crate::action_log::{ActionLog, LogEntry};
use crate::analysis::{self, AnalysisResult};
use crate::clock::Clock;
use crate::error::MatchError;
use crate::model::{Action, Athlete, DEFAULT_ATHLETE_A, DEFAULT_ATHLETE_B, TacticalAction, Zone};
use crate::report;
use crate::score::ScoreTracker;
use crate::zones::{DEFAULT_ZONE_ORDER, ZoneSelector};

pub const ARCHIVE_SLOTS: usize = 3;

/// Persisted form of a [`MatchSession`]. Field names are the stored document's keys; every
/// field has a default so older documents still load. Unreadable zones and log entries are
/// dropped on load instead of failing the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSnapshot {
    #[serde(default)]
    pub score_a: u32,
    #[serde(default)]
    pub score_b: u32,
    #[serde(default = "default_name_a")]
    pub athlete_a_name: String,
    #[serde(default = "default_name_b")]
    pub athlete_b_name: String,
    #[serde(default, deserialize_with = "lenient_zone")]
    pub active_zone: Option<Zone>,
    #[serde(default = "default_zone_order", deserialize_with = "lenient_zone_order")]
    pub zone_order: Vec<Zone>,
    #[serde(default, deserialize_with = "lenient_log")]
    pub log: Vec<LogEntry>,
    #[serde(default)]
    pub archived_reports: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Default for MatchSnapshot {
    fn default() -> Self {
        MatchSession::new().snapshot()
    }
}

fn default_name_a() -> String {
    DEFAULT_ATHLETE_A.to_string()
}

fn default_name_b() -> String {
    DEFAULT_ATHLETE_B.to_string()
}

fn default_zone_order() -> Vec<Zone> {
    DEFAULT_ZONE_ORDER.to_vec()
}

fn lenient_zone<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Zone>, D::Error> {
    let Some(label) = Option::<String>::deserialize(de)? else {
        return Ok(None);
    };
    match label.parse() {
        Ok(zone) => Ok(Some(zone)),
        Err(err) => {
            log::warn!("ignoring stored active zone: {err}");
            Ok(None)
        }
    }
}

fn lenient_zone_order<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<Zone>, D::Error> {
    let labels = Vec::<String>::deserialize(de)?;
    match labels.iter().map(|label| label.parse()).collect::<Result<Vec<Zone>, _>>() {
        Ok(order) => Ok(order),
        Err(err) => {
            log::warn!("ignoring stored zone order: {err}");
            Ok(default_zone_order())
        }
    }
}

fn lenient_log<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<LogEntry>, D::Error> {
    let raw = Vec::<serde_json::Value>::deserialize(de)?;
    let mut entries = Vec::with_capacity(raw.len());
    for value in raw {
        match serde_json::from_value::<LogEntry>(value) {
            Ok(entry) => entries.push(entry),
            Err(err) => log::warn!("dropping unreadable log entry: {err}"),
        }
    }
    Ok(entries)
}

/// Everything about the bout being scouted. The clock lives here too but is not persisted.
///
/// Every mutation of a persisted field bumps [`MatchSession::revision`], which is how the UI
/// knows a save needs scheduling.
#[derive(Debug, Clone)]
pub struct MatchSession {
    score: ScoreTracker,
    names: [String; 2],
    zones: ZoneSelector,
    log: ActionLog,
    archived_reports: Vec<String>,
    updated_at: Option<String>,
    clock: Clock,
    revision: u64,
}

impl Default for MatchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchSession {
    pub fn new() -> Self {
        Self {
            score: ScoreTracker::new(),
            names: [default_name_a(), default_name_b()],
            zones: ZoneSelector::new(),
            log: ActionLog::new(),
            archived_reports: Vec::new(),
            updated_at: None,
            clock: Clock::new(),
            revision: 0,
        }
    }

    pub fn from_snapshot(snapshot: MatchSnapshot) -> Self {
        let mut archived_reports = snapshot.archived_reports;
        archived_reports.truncate(ARCHIVE_SLOTS);
        Self {
            score: ScoreTracker::with_scores(snapshot.score_a, snapshot.score_b),
            names: [
                name_or_default(snapshot.athlete_a_name, Athlete::A),
                name_or_default(snapshot.athlete_b_name, Athlete::B),
            ],
            zones: ZoneSelector::restore(&snapshot.zone_order, snapshot.active_zone),
            log: ActionLog::from_entries(snapshot.log),
            archived_reports,
            updated_at: snapshot.updated_at,
            clock: Clock::new(),
            revision: 0,
        }
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        let (score_a, score_b) = self.score.pair();
        MatchSnapshot {
            score_a,
            score_b,
            athlete_a_name: self.names[0].clone(),
            athlete_b_name: self.names[1].clone(),
            active_zone: Some(self.zones.active()),
            zone_order: self.zones.order().to_vec(),
            log: self.log.all().to_vec(),
            archived_reports: self.archived_reports.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn score(&self, athlete: Athlete) -> u32 {
        self.score.get(athlete)
    }

    pub fn score_pair(&self) -> (u32, u32) {
        self.score.pair()
    }

    pub fn adjust_score(&mut self, athlete: Athlete, delta: i64) {
        self.score.adjust(athlete, delta);
        self.touch();
    }

    pub fn athlete_name(&self, athlete: Athlete) -> &str {
        &self.names[athlete.index()]
    }

    pub fn rename(&mut self, athlete: Athlete, name: impl Into<String>) {
        self.names[athlete.index()] = name.into();
        self.touch();
    }

    pub fn active_zone(&self) -> Zone {
        self.zones.active()
    }

    pub fn zone_order(&self) -> [Zone; 3] {
        self.zones.order()
    }

    pub fn set_active_zone(&mut self, zone: Zone) -> Result<(), MatchError> {
        self.zones.set_active(zone)?;
        self.touch();
        Ok(())
    }

    /// Selects the zone shown at `position` in the current order.
    pub fn select_zone_at(&mut self, position: usize) -> Result<Zone, MatchError> {
        let zone = self
            .zones
            .at(position)
            .ok_or_else(|| MatchError::InvalidZone {
                label: format!("position {position}"),
            })?;
        self.set_active_zone(zone)?;
        Ok(zone)
    }

    pub fn invert_zones(&mut self) {
        self.zones.invert();
        self.touch();
    }

    pub fn log(&self) -> &[LogEntry] {
        self.log.all()
    }

    pub fn archived_reports(&self) -> &[String] {
        &self.archived_reports
    }

    pub fn updated_at(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }

    pub fn set_updated_at(&mut self, at: impl Into<String>) {
        self.updated_at = Some(at.into());
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Logs `action` in the active zone against the current score.
    pub fn record_action(&mut self, action: impl Into<Action>) -> LogEntry {
        let (score_a, score_b) = self.score.pair();
        let entry = self
            .log
            .append(action.into(), self.zones.active(), score_a, score_b)
            .clone();
        self.touch();
        entry
    }

    pub fn record_tactical(&mut self, action: TacticalAction) -> LogEntry {
        self.record_action(action)
    }

    /// Stops the clock, logs the point with the score as it stood before the touch, then
    /// awards it.
    pub fn record_point(&mut self, athlete: Athlete) -> LogEntry {
        if self.clock.is_running() {
            self.clock.pause();
        }
        let entry = self.record_action(Action::PointFor(athlete));
        self.adjust_score(athlete, 1);
        entry
    }

    pub fn report(&self) -> String {
        report::render_report(&self.names[0], &self.names[1], self.log.all())
    }

    pub fn analysis(&self) -> AnalysisResult {
        analysis::analyze(self.log.all())
    }

    /// Archives the current report and starts the next bout with the same athletes and zone
    /// order. Returns the archive slot used.
    pub fn finalize_and_advance(&mut self) -> Result<usize, MatchError> {
        if self.log.is_empty() {
            return Err(MatchError::EmptyLog);
        }
        if self.archived_reports.len() >= ARCHIVE_SLOTS {
            return Err(MatchError::ArchiveFull {
                capacity: ARCHIVE_SLOTS,
            });
        }
        let text = self.report();
        self.archived_reports.push(text);
        self.score.reset();
        self.log.clear();
        self.zones.reset_active();
        self.clock.reset();
        self.touch();
        Ok(self.archived_reports.len() - 1)
    }

    /// Wipes everything including archives, names and zone order.
    pub fn full_reset(&mut self) {
        self.score.reset();
        self.names = [default_name_a(), default_name_b()];
        self.log.clear();
        self.zones.reset();
        self.archived_reports.clear();
        self.clock.reset();
        self.touch();
    }

    /// Replaces the whole session with a stored one while keeping the revision moving forward.
    pub fn restore(&mut self, snapshot: MatchSnapshot) {
        let revision = self.revision;
        *self = Self::from_snapshot(snapshot);
        self.revision = revision.wrapping_add(1);
    }

    pub fn tick(&mut self, now: Instant) -> u32 {
        self.clock.advance(now)
    }
}

fn name_or_default(name: String, athlete: Athlete) -> String {
    if name.trim().is_empty() {
        athlete.default_name().to_string()
    } else {
        name
    }
}
