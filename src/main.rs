use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use piste_scout::config::AppConfig;
use piste_scout::export::export_session;
use piste_scout::model::{Action, Athlete, TacticalAction, Zone};
use piste_scout::session::{ARCHIVE_SLOTS, MatchSnapshot};
use piste_scout::state::{AppState, Delta, Modal, SyncCommand, apply_delta};
use piste_scout::sync::{open_store, spawn_sync_worker};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<SyncCommand>>,
    export_dir: PathBuf,
}

impl App {
    fn new(config: &AppConfig, cmd_tx: Option<mpsc::Sender<SyncCommand>>) -> Self {
        Self {
            state: AppState::new(config.save_debounce),
            should_quit: false,
            cmd_tx,
            export_dir: config.export_dir.clone(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match self.state.modal.clone() {
            Some(Modal::Rename { .. }) => return self.on_rename_key(key),
            Some(Modal::ConfirmReset) => {
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => self.state.confirm_reset(),
                    KeyCode::Char('n') | KeyCode::Esc => self.state.modal = None,
                    _ => {}
                }
                return;
            }
            Some(Modal::SavedGames { .. }) => {
                match key.code {
                    KeyCode::Left | KeyCode::Char('h') => self.state.select_saved_game(false),
                    KeyCode::Right | KeyCode::Char('l') => self.state.select_saved_game(true),
                    KeyCode::Esc | KeyCode::Char('s') | KeyCode::Enter => self.state.modal = None,
                    _ => {}
                }
                return;
            }
            Some(Modal::Report(_)) | Some(Modal::Help) => {
                if matches!(
                    key.code,
                    KeyCode::Esc | KeyCode::Enter | KeyCode::Char('g') | KeyCode::Char('?')
                ) {
                    self.state.modal = None;
                }
                return;
            }
            // Scouting goes on while the stored session is still loading.
            Some(Modal::Loading) | None => {}
        }

        let now = Instant::now();
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.modal = Some(Modal::Help),
            KeyCode::Char(' ') => self.state.session.clock_mut().toggle(now),
            KeyCode::Char('t') => self.state.session.clock_mut().reset(),
            KeyCode::Char(c @ '1'..='5') => {
                let idx = (c as usize) - ('1' as usize);
                self.state.record_tactical(TacticalAction::ALL[idx]);
            }
            KeyCode::Char('z') => self.state.select_zone_at(0),
            KeyCode::Char('x') => self.state.select_zone_at(1),
            KeyCode::Char('c') => self.state.select_zone_at(2),
            KeyCode::Char('v') => self.state.session.invert_zones(),
            KeyCode::Char('[') => self.state.record_point(Athlete::A),
            KeyCode::Char(']') => self.state.record_point(Athlete::B),
            KeyCode::Char('a') => self.state.session.adjust_score(Athlete::A, 1),
            KeyCode::Char('A') => self.state.session.adjust_score(Athlete::A, -1),
            KeyCode::Char('b') => self.state.session.adjust_score(Athlete::B, 1),
            KeyCode::Char('B') => self.state.session.adjust_score(Athlete::B, -1),
            KeyCode::Char('n') => self.state.begin_rename(Athlete::A),
            KeyCode::Char('N') => self.state.begin_rename(Athlete::B),
            KeyCode::Char('g') => self.state.open_report(),
            KeyCode::Char('s') => {
                self.state.modal = Some(Modal::SavedGames { selected: None });
                self.state.select_saved_game(true);
            }
            KeyCode::Char('f') => {
                // Rejections are already reported to the console.
                let _ = self.state.finalize_and_advance();
            }
            KeyCode::Char('R') => self.state.modal = Some(Modal::ConfirmReset),
            KeyCode::Char('e') => self.export(),
            _ => {}
        }
    }

    fn on_rename_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.state.commit_rename(),
            KeyCode::Esc => self.state.modal = None,
            KeyCode::Backspace => {
                if let Some(Modal::Rename { buffer, .. }) = &mut self.state.modal {
                    buffer.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(Modal::Rename { buffer, .. }) = &mut self.state.modal {
                    buffer.push(c);
                }
            }
            _ => {}
        }
    }

    fn export(&mut self) {
        match export_session(&self.export_dir, &self.state.session) {
            Ok(report) => self.state.push_log(format!(
                "[INFO] Exported {} events to {}",
                report.log_rows,
                report.workbook_path.display()
            )),
            Err(err) => {
                log::warn!("export failed: {err:#}");
                self.state.push_log(format!("[WARN] Export failed: {err}"));
            }
        }
    }

    fn send_save(&mut self, snapshot: MatchSnapshot) {
        let Some(tx) = &self.cmd_tx else {
            return;
        };
        if tx.send(SyncCommand::Save(snapshot)).is_err() {
            // Worker is gone; keep playing on the in-memory state.
            self.cmd_tx = None;
            self.state.push_log("[WARN] Sync worker stopped, changes stay local");
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = AppConfig::from_env();
    init_logging(&config);
    log::info!("starting piste_scout for app {}", config.app_id);

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let store = open_store(&config);
    let worker = spawn_sync_worker(config.clone(), store, tx, cmd_rx);

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(&config, Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Flush whatever is still waiting out its quiet period, then let the worker drain.
    if let Some(snapshot) = app.state.flush_save() {
        app.send_save(snapshot);
    }
    drop(app);
    if worker.join().is_err() {
        log::warn!("sync worker panicked");
    }

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn init_logging(config: &AppConfig) {
    let Some(path) = config.log_file.as_ref() else {
        return;
    };
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    // The terminal owns stdout/stderr, so log lines go to a file.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        let now = Instant::now();
        app.state.session.tick(now);
        if let Some(snapshot) = app.state.poll_save(now) {
            app.send_save(snapshot);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_scoreboard(frame, chunks[1], &app.state);
    render_zones(frame, chunks[2], &app.state);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[3]);

    let dashboard = Paragraph::new(dashboard_text(&app.state))
        .block(Block::default().title("Analysis").borders(Borders::ALL));
    frame.render_widget(dashboard, body[0]);

    let log_title = format!("Match Log ({} events)", app.state.session.log().len());
    let log = Paragraph::new(log_table_text(&app.state))
        .block(Block::default().title(log_title).borders(Borders::ALL));
    frame.render_widget(log, body[1]);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[4]);

    let footer = Paragraph::new(footer_text(&app.state));
    frame.render_widget(footer, chunks[5]);

    if let Some(modal) = &app.state.modal {
        render_modal(frame, frame.size(), &app.state, modal);
    }
}

fn header_text(state: &AppState) -> String {
    let clock = state.session.clock();
    let clock_label = if clock.is_running() { "RUN" } else { "PAUSE" };
    let who = match &state.identity {
        Some(identity) => format!("{} @ {}", identity.user_id, identity.app_id),
        None => "signing in...".to_string(),
    };
    let line1 = format!(
        "PISTE SCOUT | {} {} | Saved bouts {}/{}",
        clock.display(),
        clock_label,
        state.session.archived_reports().len(),
        ARCHIVE_SLOTS
    );
    let line2 = format!("{who} | {}", sync_label(state));
    format!("{line1}\n{line2}")
}

fn sync_label(state: &AppState) -> String {
    if !state.persistence_ready() {
        return "loading session...".to_string();
    }
    let store = state.store_label.as_deref().unwrap_or("store");
    if state.save_pending() {
        return format!("{store}: saving...");
    }
    match &state.last_saved_at {
        Some(at) => format!("{store}: saved {at}"),
        None => format!("{store}: up to date"),
    }
}

fn render_scoreboard(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (athlete, col, color) in [
        (Athlete::A, cols[0], Color::Blue),
        (Athlete::B, cols[1], Color::Red),
    ] {
        let text = format!(
            "{}\n\n{}",
            state.session.athlete_name(athlete),
            state.session.score(athlete)
        );
        let panel = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .block(
                Block::default()
                    .title(format!("Athlete {}", athlete.letter()))
                    .borders(Borders::ALL),
            );
        frame.render_widget(panel, col);
    }
}

fn render_zones(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Active Zone").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(inner);

    let active = state.session.active_zone();
    for ((zone, col), key) in state
        .session
        .zone_order()
        .into_iter()
        .zip(cols.iter())
        .zip(["z", "x", "c"])
    {
        let style = if zone == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let cell = Paragraph::new(format!("[{key}] {zone}"))
            .alignment(Alignment::Center)
            .style(style);
        frame.render_widget(cell, *col);
    }
}

fn dashboard_label(action: &Action) -> String {
    match action.point_for() {
        Some(athlete) => format!("Point {}", athlete.letter()),
        None => action.label(),
    }
}

fn dashboard_text(state: &AppState) -> String {
    let analysis = state.session.analysis();
    let mut lines = vec![format!("Events: {}", analysis.total_events), String::new()];

    for action in Action::categories() {
        lines.push(format!(
            "{:<16}{:>4}",
            dashboard_label(&action),
            analysis.count(&action)
        ));
    }
    lines.push(String::new());

    for zone in Zone::ALL {
        let breakdown = analysis.zone(zone);
        lines.push(format!(
            "{zone}: {} actions ({:.1}%)",
            breakdown.total, breakdown.percentage
        ));
        if breakdown.total > 0 {
            let detail = Action::categories()
                .iter()
                .filter_map(|action| {
                    let count = breakdown.count(action);
                    (count > 0).then(|| format!("{} ({count})", dashboard_label(action)))
                })
                .collect::<Vec<_>>()
                .join("  ");
            lines.push(format!("  {detail}"));
        }
    }
    lines.join("\n")
}

fn log_table_text(state: &AppState) -> String {
    let log = state.session.log();
    if log.is_empty() {
        return "No actions recorded yet".to_string();
    }
    let mut lines = vec![format!("{:<5}{:<16}{:<8}{}", "ID", "Action", "A:B", "Zone")];
    for entry in log.iter().rev() {
        lines.push(format!(
            "{:<5}{:<16}{:<8}{}",
            entry.id,
            dashboard_label(&entry.action),
            format!("{}:{}", entry.score_a, entry.score_b),
            entry.zone
        ));
    }
    lines.join("\n")
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn footer_text(state: &AppState) -> String {
    match state.modal {
        Some(Modal::Rename { .. }) => "Type name | Enter Save | Esc Cancel".to_string(),
        Some(Modal::ConfirmReset) => "y Confirm reset | n/Esc Cancel".to_string(),
        Some(Modal::SavedGames { .. }) => "←/→ Slot | Esc Close".to_string(),
        _ => "Space Clock | 1-5 Actions | z/x/c Zone | v Invert | [ ] Point | g Report | f Next bout | ? Help | q Quit".to_string(),
    }
}

fn render_modal(frame: &mut Frame, area: Rect, state: &AppState, modal: &Modal) {
    let (title, text) = match modal {
        Modal::Loading => ("Loading", "Loading saved session...".to_string()),
        Modal::Report(text) => ("Match Report", text.clone()),
        Modal::SavedGames { selected } => ("Saved Bouts", saved_games_text(state, *selected)),
        Modal::ConfirmReset => (
            "Confirm Reset",
            "Clear every score, name, log entry and saved bout and start a new scouting \
             session? This cannot be undone.\n\n[y] Confirm   [n] Cancel"
                .to_string(),
        ),
        Modal::Rename { athlete, buffer } => (
            "Rename Athlete",
            format!("Athlete {}:\n\n{buffer}_", athlete.letter()),
        ),
        Modal::Help => ("Help", help_text()),
    };

    let popup_area = if matches!(modal, Modal::Loading | Modal::Rename { .. }) {
        centered_rect(40, 20, area)
    } else {
        centered_rect(70, 70, area)
    };
    frame.render_widget(Clear, popup_area);
    let popup = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(popup, popup_area);
}

fn saved_games_text(state: &AppState, selected: Option<usize>) -> String {
    let reports = state.session.archived_reports();
    if reports.is_empty() {
        return "No saved bouts yet.".to_string();
    }
    let tabs = (0..reports.len())
        .map(|idx| {
            if Some(idx) == selected {
                format!("[Bout {}]", idx + 1)
            } else {
                format!(" Bout {} ", idx + 1)
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    match state.selected_saved_report() {
        Some(report) => format!("{tabs}\n\n{report}"),
        None => tabs,
    }
}

fn help_text() -> String {
    [
        "Piste Scout - Help",
        "",
        "Clock:",
        "  Space        Start / pause",
        "  t            Reset to 01:00",
        "",
        "Scoring:",
        "  [ / ]        Point for A / B (pauses clock)",
        "  a / A        Score A +1 / -1",
        "  b / B        Score B +1 / -1",
        "  n / N        Rename A / B",
        "",
        "Actions (logged in the active zone):",
        "  1 Offensive  2 Attack  3 Defense  4 Retreat  5 Counter-Attack",
        "",
        "Zones:",
        "  z / x / c    Select left / middle / right",
        "  v            Invert zone order",
        "",
        "Session:",
        "  g            Current report",
        "  s            Saved bouts",
        "  f            Save bout and start next",
        "  e            Export report and workbook",
        "  R            New scouting (clears everything)",
        "  q            Quit",
    ]
    .join("\n")
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
