use serde::{Deserialize, Serialize};

use crate::model::{Action, Zone};

/// One recorded event together with the score pair at the time it was logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: u32,
    pub action: Action,
    pub zone: Zone,
    pub score_a: u32,
    pub score_b: u32,
}

/// Append-only, chronological log of the current bout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionLog {
    entries: Vec<LogEntry>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a stored log; new ids continue after the last stored one. Ids that are not
    /// strictly increasing, or that leave no room for another entry, are renumbered from 1.
    pub fn from_entries(mut entries: Vec<LogEntry>) -> Self {
        let increasing = entries.windows(2).all(|pair| pair[0].id < pair[1].id);
        let room_left = entries.last().is_none_or(|e| e.id < u32::MAX);
        if !increasing || !room_left {
            log::warn!("renumbering {} stored log entries", entries.len());
            for (id, entry) in (1u32..).zip(entries.iter_mut()) {
                entry.id = id;
            }
        }
        Self { entries }
    }

    /// Ids are strictly increasing, so the last one is the largest.
    pub fn append(&mut self, action: Action, zone: Zone, score_a: u32, score_b: u32) -> &LogEntry {
        let id = self
            .entries
            .last()
            .map_or(1, |e| e.id.saturating_add(1));
        self.entries.push(LogEntry {
            id,
            action,
            zone,
            score_a,
            score_b,
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn all(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Athlete, TacticalAction};

    #[test]
    fn ids_are_sequential_from_one() {
        let mut log = ActionLog::new();
        for _ in 0..5 {
            log.append(TacticalAction::Attack.into(), Zone::Home, 0, 0);
        }
        let ids: Vec<u32> = log.all().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn ids_restart_after_clear() {
        let mut log = ActionLog::new();
        log.append(Action::PointFor(Athlete::B), Zone::House, 3, 2);
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.append(TacticalAction::Retreat.into(), Zone::Square, 0, 0).id, 1);
    }

    #[test]
    fn restored_log_continues_after_last_id() {
        let mut log = ActionLog::from_entries(vec![LogEntry {
            id: 7,
            action: TacticalAction::Defense.into(),
            zone: Zone::Square,
            score_a: 1,
            score_b: 1,
        }]);
        assert_eq!(log.append(TacticalAction::Attack.into(), Zone::Home, 1, 1).id, 8);
    }

    fn entry(id: u32) -> LogEntry {
        LogEntry {
            id,
            action: TacticalAction::Attack.into(),
            zone: Zone::Home,
            score_a: 0,
            score_b: 0,
        }
    }

    #[test]
    fn out_of_order_ids_are_renumbered() {
        let mut log = ActionLog::from_entries(vec![entry(5), entry(2)]);
        let next = log.append(TacticalAction::Defense.into(), Zone::House, 0, 0).id;
        let ids: Vec<u32> = log.all().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(next, 3);
    }

    #[test]
    fn exhausted_id_space_is_renumbered() {
        let mut log = ActionLog::from_entries(vec![entry(4), entry(u32::MAX)]);
        assert_eq!(log.append(TacticalAction::Retreat.into(), Zone::Square, 0, 0).id, 3);
        assert!(log.all().windows(2).all(|pair| pair[0].id < pair[1].id));
    }
}
