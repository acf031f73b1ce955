use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::model::{Action, Athlete, Zone};
use crate::session::MatchSession;

pub struct ExportReport {
    pub text_path: PathBuf,
    pub workbook_path: PathBuf,
    pub log_rows: usize,
    pub archived: usize,
}

/// Writes the current report (plus archived ones) as text and the log with its analysis as
/// a workbook into `dir`.
pub fn export_session(dir: &Path, session: &MatchSession) -> Result<ExportReport> {
    fs::create_dir_all(dir).with_context(|| format!("create export dir {}", dir.display()))?;
    let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let text_path = dir.join(format!("{stamp}_report.txt"));
    let workbook_path = dir.join(format!("{stamp}_analysis.xlsx"));

    fs::write(&text_path, export_text(session))
        .with_context(|| format!("failed writing report to {}", text_path.display()))?;

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Log")?;
        write_rows(sheet, &log_rows(session))?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Actions")?;
        write_rows(sheet, &action_rows(session))?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Zones")?;
        write_rows(sheet, &zone_rows(session))?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Archives")?;
        write_rows(sheet, &archive_rows(session))?;
    }
    workbook
        .save(&workbook_path)
        .with_context(|| format!("failed writing workbook to {}", workbook_path.display()))?;

    Ok(ExportReport {
        text_path,
        workbook_path,
        log_rows: session.log().len(),
        archived: session.archived_reports().len(),
    })
}

pub fn export_text(session: &MatchSession) -> String {
    let mut parts = vec![session.report()];
    for (idx, report) in session.archived_reports().iter().enumerate() {
        parts.push(format!("=== Saved bout {} ===\n{report}", idx + 1));
    }
    parts.join("\n\n")
}

fn log_rows(session: &MatchSession) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "ID".to_string(),
        "Action".to_string(),
        "Zone".to_string(),
        format!("Score {}", session.athlete_name(Athlete::A)),
        format!("Score {}", session.athlete_name(Athlete::B)),
    ]];
    for entry in session.log() {
        rows.push(vec![
            entry.id.to_string(),
            entry.action.label(),
            entry.zone.to_string(),
            entry.score_a.to_string(),
            entry.score_b.to_string(),
        ]);
    }
    rows
}

fn action_rows(session: &MatchSession) -> Vec<Vec<String>> {
    let analysis = session.analysis();
    let mut rows = vec![vec!["Action".to_string(), "Count".to_string()]];
    for action in Action::categories() {
        rows.push(vec![action.label(), analysis.count(&action).to_string()]);
    }
    rows.push(vec![
        "Total events".to_string(),
        analysis.total_events.to_string(),
    ]);
    rows
}

fn zone_rows(session: &MatchSession) -> Vec<Vec<String>> {
    let analysis = session.analysis();
    let categories = Action::categories();
    let mut header = vec!["Zone".to_string(), "Total".to_string(), "Share %".to_string()];
    header.extend(categories.iter().map(Action::label));
    let mut rows = vec![header];
    for zone in Zone::ALL {
        let breakdown = analysis.zone(zone);
        let mut row = vec![
            zone.to_string(),
            breakdown.total.to_string(),
            format!("{:.1}", breakdown.percentage),
        ];
        row.extend(categories.iter().map(|a| breakdown.count(a).to_string()));
        rows.push(row);
    }
    rows
}

fn archive_rows(session: &MatchSession) -> Vec<Vec<String>> {
    let mut rows = vec![vec!["Slot".to_string(), "Report".to_string()]];
    for (idx, report) in session.archived_reports().iter().enumerate() {
        rows.push(vec![(idx + 1).to_string(), report.clone()]);
    }
    rows
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TacticalAction;

    #[test]
    fn export_writes_both_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = MatchSession::new();
        session.record_tactical(TacticalAction::Defense);
        session.record_point(Athlete::B);

        let report = export_session(dir.path(), &session).expect("export");
        assert_eq!(report.log_rows, 2);
        assert!(report.text_path.exists());
        assert!(report.workbook_path.exists());
        let text = fs::read_to_string(&report.text_path).expect("text");
        assert!(text.ends_with("--- End of Report ---"));
    }

    #[test]
    fn export_text_appends_archives() {
        let mut session = MatchSession::new();
        session.record_tactical(TacticalAction::Attack);
        session.finalize_and_advance().expect("archive");
        let text = export_text(&session);
        assert!(text.contains("=== Saved bout 1 ===\n--- Match Scouting Report"));
    }
}
