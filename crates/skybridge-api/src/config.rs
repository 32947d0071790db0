//! Configuration management for the Skybridge relay service.

use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use skybridge_relay::{is_placeholder, ClientConfig, RelayConfig, FORWARD_USER_AGENT};

const CONFIG_FILE: &str = "config.toml";

/// Complete service configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// The service starts out-of-the-box, but the shipped destination URL is a
/// placeholder: until `N8N_WEBHOOK_URL` points at a real n8n webhook every
/// relay attempt is answered with a configuration error.
///
/// # Example
///
/// ```no_run
/// use skybridge_api::Config;
///
/// let config = Config::load().expect("Failed to load configuration");
///
/// println!("Server will bind to {}:{}", config.host, config.port);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,
    /// HTTP request timeout in seconds. Must be greater than
    /// `forward_timeout_seconds` so the forwarding attempt always resolves
    /// inside the inbound window.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout", alias = "REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    // Forwarding
    /// Destination n8n webhook URL.
    ///
    /// Environment variable: `N8N_WEBHOOK_URL`
    #[serde(default = "default_n8n_webhook_url", alias = "N8N_WEBHOOK_URL")]
    pub n8n_webhook_url: String,
    /// HTTP request timeout for the forwarding attempt in seconds.
    ///
    /// Environment variable: `FORWARD_TIMEOUT_SECONDS`
    #[serde(default = "default_forward_timeout", alias = "FORWARD_TIMEOUT_SECONDS")]
    pub forward_timeout_seconds: u64,
    /// Whether to verify the destination's TLS certificate.
    ///
    /// Environment variable: `VERIFY_TLS`
    #[serde(default = "default_verify_tls", alias = "VERIFY_TLS")]
    pub verify_tls: bool,

    // Audit
    /// Path of the JSON-lines audit log. Empty disables audit logging.
    ///
    /// Environment variable: `AUDIT_LOG_PATH`
    #[serde(default = "default_audit_log_path", alias = "AUDIT_LOG_PATH")]
    pub audit_log_path: String,

    // Logging
    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

impl Config {
    /// Load configuration from defaults, config file, and environment variable
    /// overrides.
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables (e.g., `N8N_WEBHOOK_URL`, `PORT`)
    /// 2. Configuration file (`config.toml`)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Convert to the relay crate's configuration type.
    ///
    /// The destination is passed through as configured; the pipeline itself
    /// decides whether it is a usable URL or a placeholder.
    pub fn to_relay_config(&self) -> RelayConfig {
        RelayConfig {
            webhook_url: Some(self.n8n_webhook_url.clone()),
            client: self.to_client_config(),
        }
    }

    /// Convert to forwarding client configuration.
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.forward_timeout_seconds),
            user_agent: FORWARD_USER_AGENT.to_string(),
            verify_tls: self.verify_tls,
        }
    }

    /// The destination URL, or `None` while it is empty or still the
    /// shipped placeholder.
    pub fn configured_webhook_url(&self) -> Option<&str> {
        if is_placeholder(&self.n8n_webhook_url) {
            None
        } else {
            Some(self.n8n_webhook_url.as_str())
        }
    }

    /// The audit log path, or `None` when audit logging is disabled.
    pub fn audit_log(&self) -> Option<PathBuf> {
        let path = self.audit_log_path.trim();
        if path.is_empty() {
            None
        } else {
            Some(PathBuf::from(path))
        }
    }

    /// Parse server socket address from host and port configuration.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.request_timeout == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.forward_timeout_seconds == 0 {
            anyhow::bail!("forward_timeout_seconds must be greater than 0");
        }

        if self.request_timeout <= self.forward_timeout_seconds {
            anyhow::bail!("request_timeout must be greater than forward_timeout_seconds");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            n8n_webhook_url: default_n8n_webhook_url(),
            forward_timeout_seconds: default_forward_timeout(),
            verify_tls: default_verify_tls(),
            audit_log_path: default_audit_log_path(),
            rust_log: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    60
}

fn default_n8n_webhook_url() -> String {
    "https://your-n8n-domain.com/webhook/telegram-flight-date".to_string()
}

fn default_forward_timeout() -> u64 {
    30
}

fn default_verify_tls() -> bool {
    true
}

fn default_audit_log_path() -> String {
    "webhook_date_log.jsonl".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
