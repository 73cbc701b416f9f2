use std::path::Path;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::SystemTime;

use rand::Rng;

use crate::state::{Delta, ProviderCommand};
use crate::stats::{PlayerStats, Stats};
use crate::stats_cache::StatsCache;
use crate::stats_export;

const DEMO_PLAYERS: [&str; 6] = [
    "ShadowFox",
    "Nebula",
    "CrimsonAce",
    "Vortex",
    "LunaRay",
    "IronWolf",
];

/// Offline provider with a fixed roster and randomized stats. Goes through
/// the same cache and command protocol as the real provider, so cache hits
/// return identical numbers until a forced refresh rerolls them.
pub fn spawn_fake_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let mut rng = rand::thread_rng();
        let mut cache = StatsCache::new();

        let _ = tx.send(Delta::Log(
            "[INFO] Demo roster active (set LEADERBOARD_BASE_URL for live data)".to_string(),
        ));
        let _ = tx.send(Delta::SetValidPlayers(demo_roster()));

        loop {
            let Ok(cmd) = cmd_rx.recv() else {
                return;
            };
            match cmd {
                ProviderCommand::FetchValidPlayers => {
                    let _ = tx.send(Delta::SetValidPlayers(demo_roster()));
                }
                ProviderCommand::FetchStats {
                    seq,
                    usernames,
                    force_refresh,
                } => {
                    let result = cache.fetch(&usernames, force_refresh, |users| {
                        Ok(demo_stats(users, &mut rng))
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
    });
}

fn demo_roster() -> Vec<String> {
    DEMO_PLAYERS.iter().map(|name| name.to_string()).collect()
}

pub fn demo_stats(usernames: &[String], rng: &mut impl Rng) -> Vec<PlayerStats> {
    usernames
        .iter()
        .map(|name| {
            let kills = rng.gen_range(0..120) as f64;
            let deaths = rng.gen_range(0..90) as f64;
            let assists = rng.gen_range(0..60) as f64;
            let wins = rng.gen_range(0..25) as f64;
            let score = kills * 100.0 + assists * 50.0 + wins * 250.0 - deaths * 25.0;
            PlayerStats {
                username: name.clone(),
                stats: Stats {
                    kills,
                    deaths,
                    assists,
                    wins,
                    score: score.max(0.0),
                },
            }
        })
        .collect()
}
