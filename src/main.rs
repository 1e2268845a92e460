// src/main.rs
use std::fs::OpenOptions;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use job_relay::app_log;
use job_relay::config::RelayConfig;
use job_relay::oauth::{OAuthClient, TokenManager};
use job_relay::start_web_server;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "job-relay")]
#[command(about = "Relay job postings and candidate updates to a recruiting platform")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Print the consent-page URL to authorize the relay
    AuthUrl,
    /// Exchange a one-time grant code and print the refresh token
    ExchangeToken {
        /// Authorization code from the consent redirect
        #[arg(short, long)]
        code: String,
    },
    /// List job postings mirrored in the local database
    Jobs,
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("job_relay=info,rocket::server=off"));

    let file_layer = match std::env::var("LOG_FILE") {
        Ok(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(file)
                    .with_current_span(false)
                    .with_span_list(false),
            )
        }
        Err(_) => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();
    Ok(())
}

fn token_manager(config: &RelayConfig) -> Result<TokenManager> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.service.timeout_seconds))
        .build()
        .context("Failed to build HTTP client")?;
    Ok(TokenManager::new(OAuthClient::new(
        http,
        config.credentials(),
        config.endpoints(),
    )))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let env_file = RelayConfig::load_env_file();
    init_tracing()?;
    if let Some(path) = env_file {
        app_log!(info, "Loaded environment file {}", path.display());
    }

    let config = RelayConfig::load()?;
    app_log!(info, "Environment: {}", config.environment);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => start_web_server(config).await,
        Commands::AuthUrl => {
            if config.zoho.client_id.is_empty() {
                anyhow::bail!("ZOHO_CLIENT_ID is not set");
            }
            let url = token_manager(&config)?.authorization_url()?;
            println!("{}", url);
            Ok(())
        }
        Commands::ExchangeToken { code } => {
            config.require_credentials()?;
            let tokens = token_manager(&config)?;
            let issued = tokens
                .exchange_code(&code)
                .await
                .context("Authorization code exchange failed")?;

            match issued.refresh_token {
                Some(refresh_token) => {
                    println!("Store this in your environment:");
                    println!("ZOHO_REFRESH_TOKEN={}", refresh_token);
                }
                None => {
                    app_log!(
                        warn,
                        "Provider issued no refresh token; revoke the grant and request consent again"
                    );
                }
            }
            Ok(())
        }
        Commands::Jobs => {
            let database = config.open_database().await?;
            let jobs = database.jobs().list().await?;
            if jobs.is_empty() {
                println!("No mirrored job postings");
            }
            for job in jobs {
                println!(
                    "{}  {}  {}  {}  target {}",
                    job.external_id, job.title, job.location, job.job_type, job.target_date
                );
            }
            Ok(())
        }
    }
}
