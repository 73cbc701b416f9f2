use std::collections::HashMap;
use std::time::SystemTime;

use crate::leaderboard_fetch::FetchError;
use crate::stats::{PlayerStats, Stats};

#[derive(Debug, Clone)]
struct CacheEntry {
    stats: Vec<PlayerStats>,
    fetched_at: SystemTime,
    version: u64,
}

/// In-memory cache of aggregated statistics, keyed by the requested identity
/// set (order-insensitive). Entries are replaced wholesale on refresh; sets
/// that merely overlap never share an entry.
#[derive(Debug, Default)]
pub struct StatsCache {
    entries: HashMap<String, CacheEntry>,
    version: u64,
}

impl StatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns one record per requested username, in request order. A cache
    /// hit never calls `source`; a miss or forced refresh queries `source`
    /// with exactly the requested usernames and replaces the entry. On source
    /// failure the previous entry is left untouched and NOT returned.
    pub fn fetch<F>(
        &mut self,
        usernames: &[String],
        force_refresh: bool,
        source: F,
    ) -> Result<Vec<PlayerStats>, FetchError>
    where
        F: FnOnce(&[String]) -> Result<Vec<PlayerStats>, FetchError>,
    {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }

        let key = cache_key(usernames);
        if !force_refresh
            && let Some(entry) = self.entries.get(&key)
        {
            return Ok(reorder_by_username(entry.stats.clone(), usernames));
        }

        let fetched = source(usernames)?;
        let stats = reorder_by_username(fetched, usernames);
        self.version += 1;
        self.entries.insert(
            key,
            CacheEntry {
                stats: stats.clone(),
                fetched_at: SystemTime::now(),
                version: self.version,
            },
        );
        Ok(stats)
    }

    pub fn fetched_at(&self, usernames: &[String]) -> Option<SystemTime> {
        self.entries
            .get(&cache_key(usernames))
            .map(|entry| entry.fetched_at)
    }

    pub fn entry_version(&self, usernames: &[String]) -> Option<u64> {
        self.entries
            .get(&cache_key(usernames))
            .map(|entry| entry.version)
    }
}

/// Canonical key: the same set of players shares one entry regardless of
/// request order.
fn cache_key(usernames: &[String]) -> String {
    let mut names: Vec<&str> = usernames.iter().map(String::as_str).collect();
    names.sort_unstable();
    names.dedup();
    names.join("\n")
}

/// Reconcile a source response (arbitrary order, possibly missing entries) to
/// one record per requested username, in request order.
fn reorder_by_username(fetched: Vec<PlayerStats>, usernames: &[String]) -> Vec<PlayerStats> {
    let mut by_name: HashMap<String, PlayerStats> = fetched
        .into_iter()
        .map(|player| (player.username.clone(), player))
        .collect();
    usernames
        .iter()
        .map(|name| {
            by_name.remove(name).unwrap_or_else(|| PlayerStats {
                username: name.clone(),
                stats: Stats::default(),
            })
        })
        .collect()
}
