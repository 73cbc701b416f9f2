use std::time::SystemTime;

use leaderboard_terminal::dataset::{VisualizationKind, ZERO_VISIBILITY_EPSILON};
use leaderboard_terminal::state::{AppState, Delta, apply_delta};
use leaderboard_terminal::stats::{PlayerStats, Stats};

fn player(username: &str, kills: f64) -> PlayerStats {
    PlayerStats {
        username: username.to_string(),
        stats: Stats {
            kills,
            ..Stats::default()
        },
    }
}

fn stats_delta(seq: u64, usernames: &[&str], stats: Vec<PlayerStats>) -> Delta {
    Delta::SetPlayerStats {
        seq,
        usernames: usernames.iter().map(|name| name.to_string()).collect(),
        stats,
        fetched_at: SystemTime::now(),
    }
}

#[test]
fn roster_delta_seeds_default_selection_and_queues_fetch() {
    let mut state = AppState::new();

    apply_delta(
        &mut state,
        Delta::SetValidPlayers(vec!["alice".to_string(), "bob".to_string()]),
    );

    assert_eq!(state.valid_usernames, vec!["alice", "bob"]);
    assert_eq!(state.selected_usernames, vec!["alice", "bob"]);

    let req = state.take_stats_request().expect("fetch should be queued");
    assert_eq!(req.usernames, vec!["alice", "bob"]);
    assert!(!req.force_refresh);
    assert!(state.take_stats_request().is_none());
}

#[test]
fn resolver_failure_surfaces_empty_roster_without_fetch() {
    let mut state = AppState::new();
    state.player_stats = vec![player("alice", 5.0)];
    state.rebuild_dataset();
    let dataset_before = state.dataset.clone();

    apply_delta(
        &mut state,
        Delta::ValidPlayersUnavailable {
            message: "player list unavailable: connect refused".to_string(),
        },
    );

    assert!(state.valid_usernames.is_empty());
    assert!(state.selected_usernames.is_empty());
    assert!(state.last_error.is_some());
    assert!(state.take_stats_request().is_none());
    // Displayed data is left alone; only the roster went away.
    assert_eq!(state.dataset, dataset_before);
}

#[test]
fn slower_stale_fetch_never_overwrites_newer_selection() {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::SetValidPlayers(vec!["alice".to_string(), "bob".to_string()]),
    );
    let req1 = state.take_stats_request().expect("first fetch queued");

    // User deselects bob; a second fetch goes out for just alice.
    state.cursor = 1;
    state.toggle_selected();
    let req2 = state.take_stats_request().expect("second fetch queued");
    assert_eq!(req2.usernames, vec!["alice"]);

    // The newer fetch completes first...
    apply_delta(
        &mut state,
        stats_delta(req2.seq, &["alice"], vec![player("alice", 7.0)]),
    );
    // ...and the slower, superseded one completes afterwards.
    apply_delta(
        &mut state,
        stats_delta(
            req1.seq,
            &["alice", "bob"],
            vec![player("alice", 1.0), player("bob", 2.0)],
        ),
    );

    assert_eq!(state.player_stats, vec![player("alice", 7.0)]);
}

#[test]
fn stale_result_arriving_before_replacement_is_also_discarded() {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::SetValidPlayers(vec!["alice".to_string(), "bob".to_string()]),
    );
    let req1 = state.take_stats_request().expect("first fetch queued");

    state.cursor = 0;
    state.toggle_selected();
    let req2 = state.take_stats_request().expect("second fetch queued");
    assert_eq!(req2.usernames, vec!["bob"]);

    apply_delta(
        &mut state,
        stats_delta(
            req1.seq,
            &["alice", "bob"],
            vec![player("alice", 1.0), player("bob", 2.0)],
        ),
    );
    assert!(state.player_stats.is_empty(), "stale result must be dropped");

    apply_delta(
        &mut state,
        stats_delta(req2.seq, &["bob"], vec![player("bob", 9.0)]),
    );
    assert_eq!(state.player_stats, vec![player("bob", 9.0)]);
}

#[test]
fn selection_change_cancels_interest_in_undispatched_window() {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::SetValidPlayers(vec!["alice".to_string(), "bob".to_string()]),
    );
    let req1 = state.take_stats_request().expect("fetch queued");

    // Selection changes but the follow-up fetch has not been dispatched yet;
    // the in-flight result's originating selection no longer matches.
    state.cursor = 1;
    state.toggle_selected();

    apply_delta(
        &mut state,
        stats_delta(
            req1.seq,
            &["alice", "bob"],
            vec![player("alice", 1.0), player("bob", 2.0)],
        ),
    );

    assert!(state.player_stats.is_empty());
}

#[test]
fn fetch_failure_keeps_displayed_dataset_and_surfaces_error() {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::SetValidPlayers(vec!["alice".to_string()]),
    );
    let req = state.take_stats_request().expect("fetch queued");
    apply_delta(
        &mut state,
        stats_delta(req.seq, &["alice"], vec![player("alice", 4.0)]),
    );
    let dataset_before = state.dataset.clone();

    state.refresh();
    let retry = state.take_stats_request().expect("refresh queued");
    assert!(retry.force_refresh);
    apply_delta(
        &mut state,
        Delta::StatsFetchFailed {
            seq: retry.seq,
            message: "stats fetch failed: http 500".to_string(),
        },
    );

    assert_eq!(state.dataset, dataset_before);
    assert_eq!(state.player_stats, vec![player("alice", 4.0)]);
    assert!(state.last_error.as_deref().is_some_and(|e| e.contains("500")));
    assert!(state.logs.iter().any(|line| line.starts_with("[WARN]")));
}

#[test]
fn visualization_change_recomputes_dataset_without_fetch() {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::SetValidPlayers(vec!["alice".to_string()]),
    );
    let req = state.take_stats_request().expect("fetch queued");
    apply_delta(
        &mut state,
        stats_delta(req.seq, &["alice"], vec![player("alice", 4.0)]),
    );

    assert_eq!(state.visualization, VisualizationKind::Table);
    let table_series = state.dataset.series.len();

    state.cycle_visualization();
    assert_eq!(state.visualization, VisualizationKind::Pie);
    assert_eq!(state.dataset.series.len(), 1);
    assert_ne!(state.dataset.series.len(), table_series);
    assert!(state.take_stats_request().is_none(), "no refetch on viz change");

    state.cycle_stat();
    assert!(state.take_stats_request().is_none(), "no refetch on stat change");
}

#[test]
fn empty_roster_yields_empty_dataset() {
    let mut state = AppState::new();
    state.cycle_visualization(); // chart mode, mirroring the empty-chart case

    apply_delta(&mut state, Delta::SetValidPlayers(Vec::new()));
    let req = state.take_stats_request().expect("fetch queued");
    assert!(req.usernames.is_empty());

    apply_delta(&mut state, stats_delta(req.seq, &[], Vec::new()));

    assert!(state.dataset.labels.is_empty());
    assert!(state.dataset.series.iter().all(|s| s.values.is_empty()));
}

#[test]
fn doughnut_dataset_for_two_players_applies_epsilon() {
    let mut state = AppState::new();
    state.cycle_visualization();

    apply_delta(
        &mut state,
        Delta::SetValidPlayers(vec!["alice".to_string(), "bob".to_string()]),
    );
    let req = state.take_stats_request().expect("fetch queued");
    apply_delta(
        &mut state,
        stats_delta(
            req.seq,
            &["alice", "bob"],
            vec![player("alice", 3.0), player("bob", 0.0)],
        ),
    );

    assert_eq!(state.dataset.labels, vec!["alice", "bob"]);
    let series = &state.dataset.series[0];
    assert_eq!(series.values[0], 3.0 + ZERO_VISIBILITY_EPSILON);
    assert_eq!(series.values[1], ZERO_VISIBILITY_EPSILON);
    assert!(series.values[1] > 0.0);
}

#[test]
fn forced_and_plain_requests_merge_to_forced() {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::SetValidPlayers(vec!["alice".to_string()]),
    );
    // Roster arrival queued a plain fetch; an explicit refresh in the same
    // tick must stay forced.
    state.refresh();

    let req = state.take_stats_request().expect("fetch queued");
    assert!(req.force_refresh);
}
