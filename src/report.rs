use crate::action_log::LogEntry;
use crate::model::Athlete;

pub const REPORT_FOOTER: &str = "--- End of Report ---";

pub fn report_header(name_a: &str, name_b: &str) -> String {
    format!("--- Match Scouting Report ({name_a} vs {name_b}) ---")
}

/// Point entries use the athletes' current display names, so a rename after the fact shows
/// up in every later report.
pub fn report_line(entry: &LogEntry, name_a: &str, name_b: &str) -> String {
    match entry.action.point_for() {
        Some(Athlete::A) => format!("Point for {name_a}"),
        Some(Athlete::B) => format!("Point for {name_b}"),
        None => format!(
            "{}:{} - {} - {}",
            entry.score_a, entry.score_b, entry.zone, entry.action
        ),
    }
}

pub fn render_report(name_a: &str, name_b: &str, entries: &[LogEntry]) -> String {
    let body = entries
        .iter()
        .map(|entry| report_line(entry, name_a, name_b))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\n{}\n{}", report_header(name_a, name_b), body, REPORT_FOOTER)
}
