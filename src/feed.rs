use std::path::Path;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::SystemTime;

use crate::leaderboard_fetch;
use crate::state::{Delta, ProviderCommand};
use crate::stats_cache::StatsCache;
use crate::stats_export;

/// Provider thread backed by the HTTP leaderboard API. Resolves the roster
/// once at startup, then serves commands until the UI hangs up. All blocking
/// I/O and the stats cache live here; the UI thread never blocks.
pub fn spawn_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let mut cache = StatsCache::new();

        let _ = tx.send(Delta::Log(format!(
            "[INFO] Leaderboard source: {}",
            leaderboard_fetch::base_url()
        )));
        resolve_players(&tx);

        loop {
            let Ok(cmd) = cmd_rx.recv() else {
                return;
            };
            handle_command(cmd, &mut cache, &tx);
        }
    });
}

fn resolve_players(tx: &Sender<Delta>) {
    match leaderboard_fetch::fetch_valid_players() {
        Ok(players) => {
            let _ = tx.send(Delta::SetValidPlayers(players));
        }
        Err(err) => {
            let _ = tx.send(Delta::ValidPlayersUnavailable {
                message: err.to_string(),
            });
        }
    }
}

fn handle_command(cmd: ProviderCommand, cache: &mut StatsCache, tx: &Sender<Delta>) {
    match cmd {
        ProviderCommand::FetchValidPlayers => resolve_players(tx),
        ProviderCommand::FetchStats {
            seq,
            usernames,
            force_refresh,
        } => {
            let result = cache.fetch(&usernames, force_refresh, |users| {
                leaderboard_fetch::fetch_player_stats(users)
            });
            match result {
                Ok(stats) => {
                    let fetched_at = cache
                        .fetched_at(&usernames)
                        .unwrap_or_else(SystemTime::now);
                    let _ = tx.send(Delta::SetPlayerStats {
                        seq,
                        usernames,
                        stats,
                        fetched_at,
                    });
                }
                Err(err) => {
                    let _ = tx.send(Delta::StatsFetchFailed {
                        seq,
                        message: err.to_string(),
                    });
                }
            }
        }
        ProviderCommand::ExportStats { path, stats } => {
            match stats_export::export_player_stats(Path::new(&path), &stats) {
                Ok(players) => {
                    let _ = tx.send(Delta::ExportFinished { path, players });
                }
                Err(err) => {
                    let _ = tx.send(Delta::ExportFailed {
                        message: err.to_string(),
                    });
                }
            }
        }
    }
}
