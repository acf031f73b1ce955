use crate::action_log::LogEntry;
use crate::model::{Action, CATEGORY_COUNT, Zone};

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneBreakdown {
    pub zone: Zone,
    pub total: usize,
    pub count_by_action: [usize; CATEGORY_COUNT],
    // Share of all events, in percent with one decimal.
    pub percentage: f64,
}

impl ZoneBreakdown {
    fn empty(zone: Zone) -> Self {
        Self {
            zone,
            total: 0,
            count_by_action: [0; CATEGORY_COUNT],
            percentage: 0.0,
        }
    }

    pub fn count(&self, action: &Action) -> usize {
        action
            .category_index()
            .map(|idx| self.count_by_action[idx])
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub total_events: usize,
    pub count_by_action: [usize; CATEGORY_COUNT],
    pub per_zone: [ZoneBreakdown; 3],
}

impl AnalysisResult {
    pub fn count(&self, action: &Action) -> usize {
        action
            .category_index()
            .map(|idx| self.count_by_action[idx])
            .unwrap_or(0)
    }

    pub fn zone(&self, zone: Zone) -> &ZoneBreakdown {
        &self.per_zone[zone.index()]
    }
}

/// Aggregates the log in a single pass. Entries with free-form actions only count towards
/// `total_events`.
pub fn analyze(entries: &[LogEntry]) -> AnalysisResult {
    let mut count_by_action = [0usize; CATEGORY_COUNT];
    let mut per_zone = Zone::ALL.map(ZoneBreakdown::empty);

    for entry in entries {
        let Some(idx) = entry.action.category_index() else {
            continue;
        };
        count_by_action[idx] += 1;
        let zone = &mut per_zone[entry.zone.index()];
        zone.total += 1;
        zone.count_by_action[idx] += 1;
    }

    let total_events = entries.len();
    for zone in &mut per_zone {
        zone.percentage = percentage(zone.total, total_events);
    }

    AnalysisResult {
        total_events,
        count_by_action,
        per_zone,
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Athlete, TacticalAction};

    fn entry(id: u32, action: Action, zone: Zone) -> LogEntry {
        LogEntry {
            id,
            action,
            zone,
            score_a: 0,
            score_b: 0,
        }
    }

    #[test]
    fn empty_log_has_zero_percentages() {
        let result = analyze(&[]);
        assert_eq!(result.total_events, 0);
        assert!(result.per_zone.iter().all(|z| z.percentage == 0.0));
    }

    #[test]
    fn percentages_round_to_one_decimal() {
        let log = vec![
            entry(1, TacticalAction::Attack.into(), Zone::Home),
            entry(2, TacticalAction::Attack.into(), Zone::Square),
            entry(3, Action::PointFor(Athlete::A), Zone::House),
        ];
        let result = analyze(&log);
        assert_eq!(result.zone(Zone::Home).percentage, 33.3);
        assert_eq!(result.count(&TacticalAction::Attack.into()), 2);
        assert_eq!(result.zone(Zone::House).count(&Action::PointFor(Athlete::A)), 1);
    }

    #[test]
    fn free_form_actions_only_count_in_total() {
        let log = vec![
            entry(1, Action::Other("Feint".to_string()), Zone::Home),
            entry(2, TacticalAction::Retreat.into(), Zone::Home),
        ];
        let result = analyze(&log);
        assert_eq!(result.total_events, 2);
        assert_eq!(result.zone(Zone::Home).total, 1);
        assert_eq!(result.zone(Zone::Home).percentage, 50.0);
        assert_eq!(result.count(&Action::Other("Feint".to_string())), 0);
    }
}
