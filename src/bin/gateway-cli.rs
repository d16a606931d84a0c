use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Operator CLI for league-gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Admin API key; omit when the gateway runs without auth.
    #[arg(short, long, default_value = "")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway liveness
    Status,
    /// Show circuit breaker state for every configured service
    Breakers,
    /// Show circuit breaker state for one service
    Breaker { service: String },
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

    let path = match &cli.command {
        Commands::Status => "/admin/status".to_string(),
        Commands::Breakers => "/admin/breakers".to_string(),
        Commands::Breaker { service } => format!("/admin/breakers/{service}"),
    };

    let res = client
        .get(format!("{}{}", cli.url, path))
        .headers(headers)
        .send()
        .await?;

    let status = res.status();
    let body: Value = res.json().await.unwrap_or(Value::Null);
    println!("{}", serde_json::to_string_pretty(&body)?);

    if !status.is_success() {
        eprintln!("request failed: {status}");
        std::process::exit(1);
    }
    Ok(())
}
