use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

use collections_gateway::config::load_config;
use collections_gateway::registry::ServiceRegistry;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the collections gateway", long_about = None)]
struct Cli {
    /// Base URL of a running gateway (for online commands).
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Bearer credential, required when the gateway has auth enabled.
    #[arg(short, long)]
    key: Option<String>,

    /// API base path the gateway is configured with.
    #[arg(long, default_value = "/api")]
    base_path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config file and its services file
    Validate {
        #[arg(default_value = "config/gateway.toml")]
        config: PathBuf,
    },
    /// List the service descriptors a config resolves to
    Services {
        #[arg(default_value = "config/gateway.toml")]
        config: PathBuf,
    },
    /// Send a GET through a running gateway to a named service
    Probe {
        service: String,
        #[arg(default_value = "/")]
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => {
            let loaded = match load_config(&config) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Config invalid: {}", e);
                    std::process::exit(1);
                }
            };
            let registry = match ServiceRegistry::from_file(Path::new(&loaded.api.services_file)) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Services file invalid: {}", e);
                    std::process::exit(1);
                }
            };
            println!(
                "OK: {} ({} services, base path {})",
                config.display(),
                registry.len(),
                loaded.api.base_path
            );
        }
        Commands::Services { config } => {
            let loaded = load_config(&config)?;
            let registry = ServiceRegistry::from_file(Path::new(&loaded.api.services_file))?;
            for descriptor in registry.descriptors() {
                println!("{:<20} {}", descriptor.name, descriptor.base_url());
            }
        }
        Commands::Probe { service, path } => {
            let client = reqwest::Client::new();
            let mut headers = HeaderMap::new();
            if let Some(key) = &cli.key {
                headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
            }

            let target = format!("{}{}/{}{}", cli.url, cli.base_path, service, path);
            let res = client.get(&target).headers(headers).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
