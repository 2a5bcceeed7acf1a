use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod validator;

use crate::cli::Cli;

/// File read when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "leadform.toml";

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub embed: EmbedSettings,
    #[serde(default)]
    pub webhook: WebhookSettings,
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Directory of the file backend
    #[serde(default = "default_store_path")]
    pub path: String,
    /// Write the built-in default form at startup if it is missing
    #[serde(default = "default_true")]
    pub seed_default: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            path: default_store_path(),
            seed_default: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmbedSettings {
    /// Base URL written into generated embed code
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

impl Default for EmbedSettings {
    fn default() -> Self {
        Self {
            public_url: default_public_url(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebhookSettings {
    #[serde(default = "default_webhook_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_webhook_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests_per_second: u32,
    pub burst_size: u32,
}

fn default_store_path() -> String {
    "data/forms".to_string()
}

fn default_true() -> bool {
    true
}

fn default_public_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_webhook_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("leadform/{}", env!("CARGO_PKG_VERSION"))
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Create settings from CLI arguments (includes config file and CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::load(&cli.config)?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);

        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate a settings file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let settings = Self::load(path)?;
        settings.validate()?;
        Ok(settings)
    }

    fn load(path: &Path) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .add_source(File::from(path).required(false))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("store.backend", "memory")?
            .set_default("store.path", default_store_path())?
            .set_default("store.seed_default", true)?
            .set_default("embed.public_url", default_public_url())?
            .set_default("webhook.timeout_seconds", default_webhook_timeout() as i64)?
            .set_default("webhook.user_agent", default_user_agent())?
            .build()?;

        Ok(s.try_deserialize()?)
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }

    /// Apply CLI argument overrides to settings
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(backend) = cli.store_backend {
            self.store.backend = backend;
        }
        if let Some(path) = &cli.store_path {
            self.store.path = path.clone();
        }
        if let Some(public_url) = &cli.public_url {
            self.embed.public_url = public_url.clone();
        }
    }
}
