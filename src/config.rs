use crate::search::SearchConfig;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Search index configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Listing request limits
    #[serde(default)]
    pub listing: ListingConfig,

    /// Notification configuration
    pub notifications: NotificationConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/local.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: HELPDESK__)
            .add_source(
                config::Environment::with_prefix("HELPDESK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            search: SearchConfig::default(),
            listing: ListingConfig::default(),
            notifications: NotificationConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Page size used when the caller does not supply one
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,

    /// Upper bound on the page size
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u32,

    /// Longest accepted free-text query
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
            max_query_length: default_max_query_length(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Enable outbound email
    #[serde(default)]
    pub email_enabled: bool,

    /// SMTP server
    pub smtp_server: Option<String>,

    /// SMTP port
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Use STARTTLS for SMTP
    #[serde(default = "default_true")]
    pub smtp_use_tls: bool,

    /// SMTP username (from env var)
    pub smtp_username_env: Option<String>,

    /// SMTP password (from env var)
    pub smtp_password_env: Option<String>,

    /// Display name used with the tenant sender address
    pub email_from_name: Option<String>,

    /// Local part of the tenant sender address
    #[serde(default = "default_support_mailbox")]
    pub support_mailbox: String,

    /// Dispatch queue size
    #[serde(default = "default_notification_queue_size")]
    pub queue_size: usize,

    /// Realtime broadcast channel capacity
    #[serde(default = "default_realtime_capacity")]
    pub realtime_channel_capacity: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            email_enabled: false,
            smtp_server: None,
            smtp_port: default_smtp_port(),
            smtp_use_tls: true,
            smtp_username_env: Some("SMTP_USERNAME".to_string()),
            smtp_password_env: Some("SMTP_PASSWORD".to_string()),
            email_from_name: None,
            support_mailbox: default_support_mailbox(),
            queue_size: default_notification_queue_size(),
            realtime_channel_capacity: default_realtime_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            service_name: default_service_name(),
            prometheus_enabled: true,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_per_page() -> u32 {
    100
}

fn default_max_per_page() -> u32 {
    500
}

fn default_max_query_length() -> usize {
    256
}

fn default_smtp_port() -> u16 {
    587
}

fn default_support_mailbox() -> String {
    "support".to_string()
}

fn default_notification_queue_size() -> usize {
    10000
}

fn default_realtime_capacity() -> usize {
    1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "helpdesk-directory".to_string()
}

fn default_true() -> bool {
    true
}
