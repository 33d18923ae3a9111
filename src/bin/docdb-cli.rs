use std::time::Duration;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

use docdb_frontdoor::cluster::NodeInfoClient;

#[derive(Parser)]
#[command(name = "docdb-cli")]
#[command(about = "Management CLI for the docdb front door", long_about = None)]
struct Cli {
    /// Admin listener url.
    #[arg(long, default_value = "http://localhost:8081")]
    admin_url: String,

    /// Admin API key.
    #[arg(short, long, default_value = "")]
    key: String,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the node info of a server
    NodeInfo {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
    /// Fetch the server id (answered even in unsafe mode)
    ServerId {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
    /// Show admin status
    Status,
    /// List traffic watch listeners
    Listeners,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.timeout_secs);

    match cli.command {
        Commands::NodeInfo { url } => {
            let client = NodeInfoClient::new(timeout)?;
            match client.get_node_info(&url).await? {
                Some(info) => println!("{}", serde_json::to_string_pretty(&info)?),
                None => eprintln!("Server at {url} returned no node info"),
            }
        }
        Commands::ServerId { url } => {
            let client = reqwest::Client::builder().timeout(timeout).build()?;
            let res = client
                .get(format!("{}/debug/server-id", url.trim_end_matches('/')))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Status => {
            admin_get(&cli.admin_url, &cli.key, timeout, "/admin/status").await?;
        }
        Commands::Listeners => {
            admin_get(&cli.admin_url, &cli.key, timeout, "/admin/traffic-watch/listeners").await?;
        }
    }

    Ok(())
}

async fn admin_get(
    admin_url: &str,
    key: &str,
    timeout: Duration,
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);

    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let res = client
        .get(format!("{}{}", admin_url.trim_end_matches('/'), path))
        .headers(headers)
        .send()
        .await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
