// src/config.rs
//! Layered configuration: built-in defaults, then the `config.yaml` section
//! for the current environment, then `.env`, then the process environment.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::database::Database;
use crate::oauth::{Credentials, ProviderEndpoints};

pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8000/auth/zoho/callback";
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.zoho.com/oauth/v2";
pub const DEFAULT_API_BASE: &str = "https://recruit.zoho.com/recruit/v2";
pub const DEFAULT_SCOPES: &str = "ZohoRecruit.modules.ALL,ZohoRecruit.settings.ALL";
pub const DEFAULT_CAREERS_URL: &str = "https://jobs.zoho.com/recruit/careers";
pub const DEFAULT_UI_URL: &str = "http://localhost:5173";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DATABASE_PATH: &str = "job_relay.db";

/// One environment section of `config.yaml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileSection {
    pub database_path: Option<PathBuf>,
    pub accounts_url: Option<String>,
    pub api_base: Option<String>,
    pub careers_url: Option<String>,
    pub redirect_uri: Option<String>,
    pub scopes: Option<Vec<String>>,
    pub ui_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: FileSection,
    #[serde(default)]
    production: FileSection,
}

#[derive(Debug, Clone)]
pub struct ZohoConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub refresh_token: Option<String>,
    pub accounts_url: String,
    pub api_base: String,
    pub scopes: Vec<String>,
    pub careers_url: String,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub timeout_seconds: u64,
    pub ui_url: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub enum DatabaseTarget {
    Url(String),
    Path(PathBuf),
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub environment: String,
    pub zoho: ZohoConfig,
    pub service: ServiceConfig,
    pub database: DatabaseTarget,
}

impl RelayConfig {
    /// Load `.env` into the process environment. Existing variables win.
    /// Runs before logging is installed so `RUST_LOG` and `LOG_FILE` apply.
    pub fn load_env_file() -> Option<PathBuf> {
        Self::load_env_file_from(Path::new(".env"))
    }

    pub fn load_env_file_from(path: &Path) -> Option<PathBuf> {
        dotenvy::from_path(path).ok().map(|_| path.to_path_buf())
    }

    /// Resolve configuration from `config.yaml` and the process environment.
    /// Call [`RelayConfig::load_env_file`] first for `.env` values.
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let file = Self::load_file(Path::new("config.yaml"), &environment)?;
        Self::from_sources(environment, file, |key| std::env::var(key).ok())
    }

    fn get_environment() -> String {
        std::env::var("ENVIRONMENT")
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    /// Section of `config.yaml` for `environment`; empty when the file is absent.
    pub fn load_file(path: &Path, environment: &str) -> Result<FileSection> {
        if !path.exists() {
            return Ok(FileSection::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse_file(&content, environment)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse_file(content: &str, environment: &str) -> Result<FileSection> {
        let file: ConfigFile = serde_yaml::from_str(content)?;
        Ok(match environment {
            "production" => file.production,
            _ => file.local,
        })
    }

    /// Resolve every key. `lookup` reads the environment, which wins over `file`.
    pub fn from_sources<F>(environment: String, file: FileSection, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let scopes = match get("ZOHO_SCOPES") {
            Some(raw) => split_scopes(&raw),
            None => file
                .scopes
                .unwrap_or_else(|| split_scopes(DEFAULT_SCOPES)),
        };

        let zoho = ZohoConfig {
            client_id: get("ZOHO_CLIENT_ID").unwrap_or_default(),
            client_secret: get("ZOHO_CLIENT_SECRET").unwrap_or_default(),
            redirect_uri: get("ZOHO_REDIRECT_URI")
                .or(file.redirect_uri)
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
            refresh_token: get("ZOHO_REFRESH_TOKEN"),
            accounts_url: get("ZOHO_ACCOUNTS_URL")
                .or(file.accounts_url)
                .unwrap_or_else(|| DEFAULT_ACCOUNTS_URL.to_string()),
            api_base: get("ZOHO_API_BASE")
                .or(file.api_base)
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            scopes,
            careers_url: get("ZOHO_CAREERS_URL")
                .or(file.careers_url)
                .unwrap_or_else(|| DEFAULT_CAREERS_URL.to_string()),
        };

        let timeout_seconds = match get("HTTP_TIMEOUT_SECONDS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("HTTP_TIMEOUT_SECONDS is not a number: {}", raw))?,
            None => file.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        };
        if timeout_seconds == 0 {
            bail!("HTTP_TIMEOUT_SECONDS must be greater than zero");
        }

        let port = match get("ROCKET_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("ROCKET_PORT must be a valid port number"))?,
            None => file.port.unwrap_or(DEFAULT_PORT),
        };

        let service = ServiceConfig {
            timeout_seconds,
            ui_url: get("UI_URL")
                .or(file.ui_url)
                .unwrap_or_else(|| DEFAULT_UI_URL.to_string()),
            port,
        };

        let database = match get("DATABASE_URL") {
            Some(url) if url.starts_with("sqlite:") => DatabaseTarget::Url(url),
            Some(url) => bail!(
                "DATABASE_URL must be a sqlite connection string, got scheme '{}'",
                url.split(':').next().unwrap_or_default()
            ),
            None => DatabaseTarget::Path(
                file.database_path
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            ),
        };

        Ok(Self {
            environment,
            zoho,
            service,
            database,
        })
    }

    /// Client credentials are needed for anything that talks to the provider.
    pub fn require_credentials(&self) -> Result<()> {
        if self.zoho.client_id.is_empty() {
            bail!("ZOHO_CLIENT_ID is not set");
        }
        if self.zoho.client_secret.is_empty() {
            bail!("ZOHO_CLIENT_SECRET is not set");
        }
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            client_id: self.zoho.client_id.clone(),
            client_secret: self.zoho.client_secret.clone(),
            redirect_uri: self.zoho.redirect_uri.clone(),
            bootstrap_refresh_token: self.zoho.refresh_token.clone(),
        }
    }

    pub fn endpoints(&self) -> ProviderEndpoints {
        ProviderEndpoints {
            accounts_url: self.zoho.accounts_url.clone(),
            scopes: self.zoho.scopes.clone(),
        }
    }

    pub async fn open_database(&self) -> Result<Database> {
        let database = match &self.database {
            DatabaseTarget::Url(url) => Database::connect(url).await,
            DatabaseTarget::Path(path) => Database::open(path).await,
        };
        database.context("Failed to open job database")
    }
}

fn split_scopes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
