pub mod bracket;
pub mod config;
pub mod export;
pub mod fake_tournament;
pub mod group_scoring;
pub mod http_client;
pub mod knockout_scoring;
pub mod leaderboard;
pub mod model;
pub mod report;
pub mod snapshot;
pub mod standings;
pub mod store;
pub mod validation;

use tracing_subscriber::EnvFilter;

/// Log to stderr, filtered by `RUST_LOG` (default `info`). Safe to call twice.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
