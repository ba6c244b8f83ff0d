use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "health-cli")]
#[command(about = "Operator CLI for the GitHub statistics API server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Admin API key, required by the log level commands.
    #[arg(short, long, default_value = "")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the aggregated health report
    Health,
    /// Show server version and uptime
    Status,
    /// Show the current log level
    Level,
    /// Change the log level at runtime
    SetLevel {
        /// DEBUG, INFO, WARN or ERROR
        level: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if !cli.key.is_empty() {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
        );
    }

    let res = match cli.command {
        Commands::Health => client.get(format!("{}/health", cli.url)).send().await?,
        Commands::Status => {
            client
                .get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Level => {
            client
                .get(format!("{}/admin/log-level", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::SetLevel { level } => {
            client
                .put(format!("{}/admin/log-level", cli.url))
                .headers(headers)
                .json(&json!({ "level": level }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

/// Pretty-print the JSON body. The health report is printed for 503 too,
/// since it names the failing probes.
async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => {
            let rendered = serde_json::to_string_pretty(&json)?;
            if status.is_success() {
                println!("{}", rendered);
            } else {
                eprintln!("Server returned status {}", status);
                eprintln!("{}", rendered);
                std::process::exit(1);
            }
        }
        Err(_) => {
            eprintln!("Server returned status {}", status);
            eprintln!("Response: {}", text);
            std::process::exit(1);
        }
    }
    Ok(())
}
