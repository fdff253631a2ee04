// config.rs
use crate::errors::ConfigError;
use crate::sync::StalePolicy;
use clap::Parser;
use std::time::Duration;
use url::Url;

#[derive(Debug, Parser)]
#[command(
    name = "property_map_sync",
    disable_help_subcommand = true,
    about = "Keep a clustered property map in sync with polygon searches against a backend"
)]
pub struct Cli {
    #[arg(
        long = "backend-url",
        env = "PROPERTY_MAP_BACKEND_URL",
        value_name = "URL",
        help = "Base URL of the property backend (serves /api/properties)"
    )]
    pub backend_url: Option<String>,

    #[arg(
        long = "stale-policy",
        value_enum,
        default_value_t = StalePolicy::LatestIssued,
        help = "How racing fetch results are applied"
    )]
    pub stale_policy: StalePolicy,

    #[arg(
        long = "request-timeout-secs",
        default_value_t = 30,
        help = "Per-request HTTP timeout"
    )]
    pub request_timeout_secs: u64,

    #[arg(long, default_value_t = 3.0, help = "Initial map zoom level")]
    pub zoom: f64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: Url,
    pub stale_policy: StalePolicy,
    pub request_timeout: Duration,
    pub initial_zoom: f64,
}

impl Config {
    /// Validates parsed arguments. A missing or unusable backend URL is fatal here,
    /// at startup, rather than showing up later as a failed fetch.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let raw = cli
            .backend_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingBackendUrl)?;

        let backend_url = Url::parse(raw).map_err(|e| ConfigError::InvalidBackendUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(backend_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBackendUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme '{}'", backend_url.scheme()),
            });
        }

        Ok(Self {
            backend_url,
            stale_policy: cli.stale_policy,
            request_timeout: Duration::from_secs(cli.request_timeout_secs.max(1)),
            initial_zoom: cli.zoom,
        })
    }
}
