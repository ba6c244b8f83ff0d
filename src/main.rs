use std::path::PathBuf;

use clap::Parser;

use github_stats_metrics::http::HttpServer;
use github_stats_metrics::lifecycle::{signals, startup, Shutdown};
use github_stats_metrics::observability::logging::{Fields, LogLevel};
use github_stats_metrics::observability::tracing::{init_subscriber, DEFAULT_DIRECTIVES};

#[derive(Parser)]
#[command(name = "github-stats-metrics")]
#[command(about = "GitHub statistics API server", version)]
struct Cli {
    /// TOML config file. Environment variables are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured log level (DEBUG, INFO, WARN, ERROR).
    #[arg(long)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_subscriber(DEFAULT_DIRECTIVES);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "github-stats-metrics starting");

    let config = startup::load(cli.config.as_deref(), cli.log_level)?;

    tracing::info!(
        bind_address = %config.server.bind_address,
        repositories = config.github.repositories.len(),
        log_level = %config.logging.level,
        request_timeout_secs = config.server.request_timeout_secs,
        admin_enabled = config.admin.enabled,
        "Configuration loaded"
    );

    startup::start_metrics(&config.observability);

    let state = startup::build_state(config);
    state.logger.info(
        "Web server starting",
        Fields::new()
            .with("listen_address", &state.config.server.bind_address)
            .with("debug", state.config.is_debug_mode()),
    );

    let server = HttpServer::new(state);
    let listener = server.bind().await?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    server.run(listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let cli = Cli::parse_from(["github-stats-metrics", "--config", "app.toml", "--log-level", "warn"]);
        assert_eq!(cli.config, Some(PathBuf::from("app.toml")));
        assert_eq!(cli.log_level, Some(LogLevel::Warn));
    }

    #[test]
    fn rejects_unknown_level() {
        assert!(Cli::try_parse_from(["github-stats-metrics", "--log-level", "loud"]).is_err());
    }
}
