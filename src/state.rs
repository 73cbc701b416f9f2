use std::collections::VecDeque;
use std::env;
use std::time::SystemTime;

use crate::dataset::{self, ChartDataset, PieType, VisualizationKind};
use crate::stats::{PlayerStats, STAT_FIELDS, StatField};

/// One issued stats fetch, handed to the provider thread. `seq` and
/// `usernames` come back on the matching delta so stale completions can be
/// recognized and dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsRequest {
    pub seq: u64,
    pub usernames: Vec<String>,
    pub force_refresh: bool,
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetValidPlayers(Vec<String>),
    ValidPlayersUnavailable {
        message: String,
    },
    SetPlayerStats {
        seq: u64,
        usernames: Vec<String>,
        stats: Vec<PlayerStats>,
        fetched_at: SystemTime,
    },
    StatsFetchFailed {
        seq: u64,
        message: String,
    },
    ExportFinished {
        path: String,
        players: usize,
    },
    ExportFailed {
        message: String,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchValidPlayers,
    FetchStats {
        seq: u64,
        usernames: Vec<String>,
        force_refresh: bool,
    },
    ExportStats {
        path: String,
        stats: Vec<PlayerStats>,
    },
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub visualization: VisualizationKind,
    pub pie_type: PieType,
    pub selected_stat: StatField,
    pub valid_usernames: Vec<String>,
    pub selected_usernames: Vec<String>,
    pub player_stats: Vec<PlayerStats>,
    pub dataset: ChartDataset,
    pub cursor: usize,
    pub fetch_seq: u64,
    pub pending_fetch: Option<bool>,
    pub last_fetched_at: Option<SystemTime>,
    pub last_error: Option<String>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        // Unknown keys fold to the first registry field rather than failing.
        let selected_stat = env::var("LEADERBOARD_DEFAULT_STAT")
            .map(|raw| StatField::from_key(&raw))
            .unwrap_or(STAT_FIELDS[0]);
        Self {
            visualization: VisualizationKind::Table,
            pie_type: PieType::Doughnut,
            selected_stat,
            valid_usernames: Vec::new(),
            selected_usernames: Vec::new(),
            player_stats: Vec::new(),
            dataset: ChartDataset::default(),
            cursor: 0,
            fetch_seq: 0,
            pending_fetch: None,
            last_fetched_at: None,
            last_error: None,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Queue a stats fetch for the current selection. Merging keeps a forced
    /// refresh forced even if a selection change lands in the same tick.
    pub fn request_stats_fetch(&mut self, force_refresh: bool) {
        let force = self.pending_fetch.unwrap_or(false) || force_refresh;
        self.pending_fetch = Some(force);
    }

    /// Drain the queued fetch into a dispatchable request, bumping the
    /// sequence so earlier in-flight fetches become stale.
    pub fn take_stats_request(&mut self) -> Option<StatsRequest> {
        let force_refresh = self.pending_fetch.take()?;
        self.fetch_seq += 1;
        Some(StatsRequest {
            seq: self.fetch_seq,
            usernames: self.selected_usernames.clone(),
            force_refresh,
        })
    }

    pub fn is_selected(&self, username: &str) -> bool {
        self.selected_usernames.iter().any(|name| name == username)
    }

    /// Flip membership of the player under the cursor. Selection order always
    /// follows the valid-roster order.
    pub fn toggle_selected(&mut self) {
        let Some(name) = self.valid_usernames.get(self.cursor).cloned() else {
            return;
        };
        if self.is_selected(&name) {
            self.selected_usernames.retain(|n| *n != name);
        } else {
            let next: Vec<String> = self
                .valid_usernames
                .iter()
                .filter(|n| self.is_selected(n.as_str()) || **n == name)
                .cloned()
                .collect();
            self.selected_usernames = next;
        }
        self.request_stats_fetch(false);
    }

    pub fn select_all(&mut self) {
        self.selected_usernames = self.valid_usernames.clone();
        self.request_stats_fetch(false);
    }

    pub fn select_none(&mut self) {
        self.selected_usernames.clear();
        self.request_stats_fetch(false);
    }

    pub fn refresh(&mut self) {
        self.request_stats_fetch(true);
    }

    pub fn cycle_visualization(&mut self) {
        self.visualization = match self.visualization {
            VisualizationKind::Table => VisualizationKind::Pie,
            VisualizationKind::Pie => VisualizationKind::Table,
        };
        self.rebuild_dataset();
    }

    pub fn cycle_pie_type(&mut self) {
        self.pie_type = match self.pie_type {
            PieType::Pie => PieType::Doughnut,
            PieType::Doughnut => PieType::Pie,
        };
        self.rebuild_dataset();
    }

    pub fn cycle_stat(&mut self) {
        self.selected_stat = self.selected_stat.next();
        self.rebuild_dataset();
    }

    pub fn select_next(&mut self) {
        let total = self.valid_usernames.len();
        if total == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.valid_usernames.len();
        if total == 0 {
            self.cursor = 0;
            return;
        }
        if self.cursor == 0 {
            self.cursor = total - 1;
        } else {
            self.cursor -= 1;
        }
    }

    pub fn clamp_cursor(&mut self) {
        let total = self.valid_usernames.len();
        if total == 0 {
            self.cursor = 0;
        } else if self.cursor >= total {
            self.cursor = total - 1;
        }
    }

    /// Derived state is recomputed from scratch; the dataset is never patched
    /// in place.
    pub fn rebuild_dataset(&mut self) {
        self.dataset =
            dataset::build_dataset(&self.player_stats, self.visualization, self.selected_stat);
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetValidPlayers(usernames) => {
            state.valid_usernames = usernames;
            // The freshly resolved roster is the default selection.
            state.selected_usernames = state.valid_usernames.clone();
            state.clamp_cursor();
            state.last_error = None;
            state.push_log(format!(
                "[INFO] Roster resolved: {} players",
                state.valid_usernames.len()
            ));
            state.request_stats_fetch(false);
        }
        Delta::ValidPlayersUnavailable { message } => {
            state.valid_usernames.clear();
            state.selected_usernames.clear();
            state.clamp_cursor();
            state.last_error = Some(message.clone());
            state.push_log(format!("[WARN] {message}"));
        }
        Delta::SetPlayerStats {
            seq,
            usernames,
            stats,
            fetched_at,
        } => {
            // A superseded fetch must never clobber the display: drop results
            // that are not the newest issued fetch or whose originating
            // selection no longer matches.
            if seq != state.fetch_seq || usernames != state.selected_usernames {
                return;
            }
            state.player_stats = stats;
            state.last_fetched_at = Some(fetched_at);
            state.last_error = None;
            state.rebuild_dataset();
        }
        Delta::StatsFetchFailed { seq, message } => {
            if seq != state.fetch_seq {
                return;
            }
            state.last_error = Some(message.clone());
            state.push_log(format!("[WARN] {message}"));
        }
        Delta::ExportFinished { path, players } => {
            state.push_log(format!("[INFO] Exported {players} players to {path}"));
        }
        Delta::ExportFailed { message } => {
            state.push_log(format!("[WARN] Export failed: {message}"));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
