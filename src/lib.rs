pub mod dataset;
pub mod fake_feed;
pub mod feed;
pub mod http_client;
pub mod leaderboard_fetch;
pub mod state;
pub mod stats;
pub mod stats_cache;
pub mod stats_export;
