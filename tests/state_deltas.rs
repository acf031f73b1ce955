use std::time::{Duration, Instant};

use piste_scout::identity::Identity;
use piste_scout::model::{Athlete, TacticalAction, Zone};
use piste_scout::session::{MatchSession, MatchSnapshot};
use piste_scout::state::{AppState, Delta, Modal, apply_delta};

const QUIET: Duration = Duration::from_millis(1000);

fn identity() -> Identity {
    Identity {
        app_id: "piste-scout".to_string(),
        user_id: "u1".to_string(),
    }
}

fn ready_state(stored: Option<MatchSnapshot>) -> AppState {
    let mut state = AppState::new(QUIET);
    apply_delta(&mut state, Delta::IdentityReady(identity()));
    apply_delta(&mut state, Delta::StoreReady("in-memory".to_string()));
    apply_delta(&mut state, Delta::SessionLoaded(stored));
    state
}

#[test]
fn starts_loading_and_closes_modal_on_load() {
    let mut state = AppState::new(QUIET);
    assert_eq!(state.modal, Some(Modal::Loading));
    assert!(!state.persistence_ready());

    apply_delta(&mut state, Delta::IdentityReady(identity()));
    assert!(!state.persistence_ready());
    apply_delta(&mut state, Delta::SessionLoaded(None));
    assert!(state.persistence_ready());
    assert_eq!(state.modal, None);
}

#[test]
fn no_saves_before_persistence_is_ready() {
    let mut state = AppState::new(QUIET);
    let now = Instant::now();
    state.record_tactical(TacticalAction::Attack);
    assert!(state.poll_save(now).is_none());
    assert!(state.poll_save(now + QUIET * 5).is_none());
    assert!(!state.save_pending());
}

#[test]
fn edits_made_while_loading_are_saved_once_ready() {
    let mut state = AppState::new(QUIET);
    state.record_tactical(TacticalAction::Attack);
    apply_delta(&mut state, Delta::IdentityReady(identity()));
    apply_delta(&mut state, Delta::SessionLoaded(None));

    let now = Instant::now();
    assert!(state.poll_save(now).is_none());
    let snapshot = state.poll_save(now + QUIET).expect("due save");
    assert_eq!(snapshot.log.len(), 1);
}

#[test]
fn burst_of_mutations_yields_one_save_of_the_last_state() {
    let mut state = ready_state(None);
    let start = Instant::now();
    assert!(state.poll_save(start).is_none());

    let mut saves = Vec::new();
    for step in 0..5u32 {
        state.session.adjust_score(Athlete::A, 1);
        let now = start + Duration::from_millis(200) * step;
        saves.extend(state.poll_save(now));
    }
    assert!(saves.is_empty());
    assert!(state.save_pending());

    let last = start + Duration::from_millis(800);
    saves.extend(state.poll_save(last + QUIET));
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].score_a, 5);
    assert!(!state.save_pending());

    // Nothing changed since, nothing more to save.
    assert!(state.poll_save(last + QUIET * 3).is_none());
}

#[test]
fn restored_session_is_not_written_back() {
    let mut stored = MatchSession::new();
    stored.rename(Athlete::A, "Alice");
    stored.select_zone_at(1).expect("zone");
    stored.record_tactical(TacticalAction::Defense);

    let mut state = ready_state(Some(stored.snapshot()));
    assert_eq!(state.session.athlete_name(Athlete::A), "Alice");
    assert_eq!(state.session.active_zone(), Zone::Square);
    assert_eq!(state.session.log().len(), 1);

    let now = Instant::now();
    assert!(state.poll_save(now).is_none());
    assert!(state.poll_save(now + QUIET * 2).is_none());

    state.record_tactical(TacticalAction::Retreat);
    assert!(state.poll_save(now).is_none());
    let saved = state.poll_save(now + QUIET).expect("save after edit");
    assert_eq!(saved.log.last().map(|e| e.id), Some(2));
}

#[test]
fn flush_skips_the_quiet_period() {
    let mut state = ready_state(None);
    state.session.invert_zones();
    let snapshot = state.flush_save().expect("flushed");
    assert_eq!(snapshot.zone_order, vec![Zone::House, Zone::Square, Zone::Home]);
    assert!(state.flush_save().is_none());
}

#[test]
fn saved_delta_stamps_session() {
    let mut state = ready_state(None);
    apply_delta(
        &mut state,
        Delta::Saved {
            at: "2026-01-02T03:04:05.000Z".to_string(),
        },
    );
    assert_eq!(state.session.updated_at(), Some("2026-01-02T03:04:05.000Z"));
    assert_eq!(
        state.last_saved_at.as_deref(),
        Some("2026-01-02T03:04:05.000Z")
    );
}

#[test]
fn finalize_errors_surface_in_console() {
    let mut state = ready_state(None);
    assert!(state.finalize_and_advance().is_err());
    assert!(state.logs.back().is_some_and(|l| l.starts_with("[WARN]")));

    state.record_point(Athlete::B);
    assert_eq!(state.finalize_and_advance(), Ok(0));
    assert!(state.logs.back().is_some_and(|l| l.contains("slot 1/3")));
}

#[test]
fn rename_modal_commits_trimmed_names_and_ignores_blank() {
    let mut state = ready_state(None);
    state.begin_rename(Athlete::B);
    if let Some(Modal::Rename { buffer, .. }) = &mut state.modal {
        buffer.clear();
        buffer.push_str("  Bob  ");
    }
    state.commit_rename();
    assert_eq!(state.session.athlete_name(Athlete::B), "Bob");
    assert_eq!(state.modal, None);

    state.begin_rename(Athlete::B);
    if let Some(Modal::Rename { buffer, .. }) = &mut state.modal {
        buffer.clear();
    }
    state.commit_rename();
    assert_eq!(state.session.athlete_name(Athlete::B), "Bob");
}

#[test]
fn saved_games_cycle_through_archives() {
    let mut state = ready_state(None);
    for action in [TacticalAction::Attack, TacticalAction::Defense] {
        state.record_tactical(action);
        state.finalize_and_advance().expect("archive");
    }
    state.modal = Some(Modal::SavedGames { selected: None });
    state.select_saved_game(true);
    assert!(state.selected_saved_report().is_some_and(|r| r.contains("Attack")));
    state.select_saved_game(true);
    assert!(state.selected_saved_report().is_some_and(|r| r.contains("Defense")));
    state.select_saved_game(true);
    assert!(state.selected_saved_report().is_some_and(|r| r.contains("Attack")));
    state.select_saved_game(false);
    assert!(state.selected_saved_report().is_some_and(|r| r.contains("Defense")));
}

#[test]
fn confirm_reset_wipes_and_closes_modal() {
    let mut state = ready_state(None);
    state.record_point(Athlete::A);
    state.finalize_and_advance().expect("archive");
    state.modal = Some(Modal::ConfirmReset);
    state.confirm_reset();
    assert_eq!(state.modal, None);
    assert!(state.session.archived_reports().is_empty());
    assert_eq!(state.session.score_pair(), (0, 0));
}

#[test]
fn console_is_bounded() {
    let mut state = AppState::default();
    for i in 0..500 {
        state.push_log(format!("[INFO] line {i}"));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.back().map(String::as_str), Some("[INFO] line 499"));
}
