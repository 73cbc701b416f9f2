use std::env;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::http_client::http_client;
use crate::stats::PlayerStats;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

/// Boundary failures as the pipeline sees them. Everything underneath is
/// anyhow context chained from the HTTP/parse layers.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("player list unavailable: {0}")]
    DataUnavailable(anyhow::Error),
    #[error("stats fetch failed: {0}")]
    FetchFailed(anyhow::Error),
}

pub fn base_url() -> String {
    match env::var("LEADERBOARD_BASE_URL") {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().trim_end_matches('/').to_string(),
        _ => DEFAULT_BASE_URL.to_string(),
    }
}

/// True when a real stats backend is configured; otherwise the demo provider
/// runs instead.
pub fn http_source_configured() -> bool {
    env::var("LEADERBOARD_BASE_URL").is_ok_and(|raw| !raw.trim().is_empty())
}

pub fn fetch_valid_players() -> Result<Vec<String>, FetchError> {
    let url = format!("{}/api/leaderboard/players", base_url());
    get_json(&url)
        .and_then(|body| parse_valid_players_json(&body))
        .map_err(FetchError::DataUnavailable)
}

pub fn fetch_player_stats(usernames: &[String]) -> Result<Vec<PlayerStats>, FetchError> {
    let url = format!(
        "{}/api/leaderboard/stats?players={}",
        base_url(),
        usernames.join(",")
    );
    get_json(&url)
        .and_then(|body| parse_player_stats_json(&body))
        .map_err(FetchError::FetchFailed)
}

fn get_json(url: &str) -> Result<String> {
    let client = http_client()?;
    let resp = client.get(url).send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {}: {}", status, body));
    }
    Ok(body)
}

pub fn parse_valid_players_json(raw: &str) -> Result<Vec<String>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let names: Vec<String> =
        serde_json::from_str(trimmed).context("invalid player list json")?;
    Ok(names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

pub fn parse_player_stats_json(raw: &str) -> Result<Vec<PlayerStats>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).context("invalid player stats json")
}
