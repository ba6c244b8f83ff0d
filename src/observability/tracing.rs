//! Tracing subscriber bootstrap.
//!
//! # Responsibilities
//! - Install the process-wide `tracing` subscriber once at startup
//! - Honour `RUST_LOG` when set, otherwise use the given default directives
//!
//! # Design Decisions
//! - Severity gating for application log lines happens in `LeveledLogger`;
//!   the subscriber filter only bounds what reaches stdout

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directives when `RUST_LOG` is not set.
pub const DEFAULT_DIRECTIVES: &str = "app=trace,github_stats_metrics=debug,tower_http=info";

/// Install the fmt subscriber. Returns false if one was already installed.
pub fn init_subscriber(default_directives: &str) -> bool {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
