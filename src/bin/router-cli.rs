use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "router-cli")]
#[command(about = "Operator CLI for the interview router", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000", env = "ROUTER_URL")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show health of every backend and the monitor status
    Health,
    /// Probe every backend now
    Probe,
    /// Probe a single backend now
    ProbeOne {
        /// Backend key, e.g. openai:gpt-4o
        key: String,
    },
    /// Resolve a primary model to a healthy backend
    Resolve {
        #[arg(long)]
        primary: String,
        /// Explicit fallback keys, in order
        #[arg(long, value_delimiter = ',')]
        fallbacks: Vec<String>,
        /// Generated when omitted
        #[arg(long)]
        simulation_id: Option<String>,
    },
    /// Start an interview on a healthy backend
    Start {
        #[arg(long)]
        primary: String,
        #[arg(long, value_delimiter = ',')]
        fallbacks: Vec<String>,
        #[arg(long)]
        simulation_id: Option<String>,
    },
    /// List recorded fallback events
    Fallbacks,
    /// Clear recorded fallback events
    ClearFallbacks,
    /// Register a new backend
    Register {
        #[arg(long)]
        provider: String,
        #[arg(long)]
        model: String,
    },
}

fn routing_body(primary: String, fallbacks: Vec<String>, simulation_id: Option<String>) -> Value {
    let simulation_id = simulation_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let mut body = json!({ "simulationId": simulation_id, "primary": primary });
    if !fallbacks.is_empty() {
        body["fallbacks"] = json!(fallbacks);
    }
    body
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
        Commands::Probe => client.post(format!("{}/health/probe", base)).send().await?,
        Commands::ProbeOne { key } => {
            client
                .post(format!("{}/health/{}/probe", base, key))
                .send()
                .await?
        }
        Commands::Resolve {
            primary,
            fallbacks,
            simulation_id,
        } => {
            client
                .post(format!("{}/resolve", base))
                .json(&routing_body(primary, fallbacks, simulation_id))
                .send()
                .await?
        }
        Commands::Start {
            primary,
            fallbacks,
            simulation_id,
        } => {
            client
                .post(format!("{}/interviews/start", base))
                .json(&routing_body(primary, fallbacks, simulation_id))
                .send()
                .await?
        }
        Commands::Fallbacks => client.get(format!("{}/fallbacks", base)).send().await?,
        Commands::ClearFallbacks => client.delete(format!("{}/fallbacks", base)).send().await?,
        Commands::Register { provider, model } => {
            client
                .post(format!("{}/backends", base))
                .json(&json!({ "provider": provider, "model": model }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: router returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }

    if !status.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
