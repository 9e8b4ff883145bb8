use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Application configuration module
/// This module handles the client configuration including loading,
/// validating and saving configuration settings.
/// Represents the client configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Root URL of the livestock health web application
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Default deadline for requests, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Connection monitor settings
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Page translator settings
    #[serde(default)]
    pub translator: TranslatorConfig,

    /// Disease alert settings
    #[serde(default)]
    pub alerts: AlertsConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Connection monitor configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Selector of the status display element
    #[serde(default = "default_status_element")]
    pub status_element: String,

    /// Class applied while offline
    #[serde(default = "default_offline_class")]
    pub offline_class: String,

    /// Class applied while online
    #[serde(default = "default_online_class")]
    pub online_class: String,

    /// Class applied while slow
    #[serde(default = "default_slow_class")]
    pub slow_class: String,

    /// Interval between probes in milliseconds
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,

    /// Probe deadline in milliseconds
    #[serde(default = "default_offline_timeout_ms")]
    pub offline_timeout_ms: u64,

    /// Round trip above which a successful probe counts as slow
    #[serde(default = "default_slow_threshold_ms")]
    pub slow_threshold_ms: u64,

    /// Delay before the online indicator hides itself
    #[serde(default = "default_auto_hide_ms")]
    pub auto_hide_ms: u64,

    /// Liveness endpoint
    #[serde(default = "default_ping_url")]
    pub ping_url: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            status_element: default_status_element(),
            offline_class: default_offline_class(),
            online_class: default_online_class(),
            slow_class: default_slow_class(),
            check_interval_ms: default_check_interval_ms(),
            offline_timeout_ms: default_offline_timeout_ms(),
            slow_threshold_ms: default_slow_threshold_ms(),
            auto_hide_ms: default_auto_hide_ms(),
            ping_url: default_ping_url(),
        }
    }
}

impl MonitorConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    pub fn offline_timeout(&self) -> Duration {
        Duration::from_millis(self.offline_timeout_ms)
    }

    pub fn slow_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_threshold_ms)
    }

    pub fn auto_hide(&self) -> Duration {
        Duration::from_millis(self.auto_hide_ms)
    }
}

/// Page translator configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslatorConfig {
    /// Translation endpoint
    #[serde(default = "default_translate_endpoint")]
    pub endpoint: String,

    /// Endpoint persisting a permanent language choice
    #[serde(default = "default_language_set_endpoint")]
    pub language_set_endpoint: String,

    /// Language used when no override or page hint is present
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Language `data-translate` keys and navigation labels are written in
    #[serde(default = "default_language")]
    pub source_language: String,

    /// Text nodes translated concurrently per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Lifetime of the completion banner in milliseconds
    #[serde(default = "default_banner_ms")]
    pub banner_ms: u64,

    /// Delay before the navigation pass on page load
    #[serde(default = "default_force_translation_delay_ms")]
    pub force_translation_delay_ms: u64,

    /// Whether translations are cached in memory
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Cache entry lifetime in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_translate_endpoint(),
            language_set_endpoint: default_language_set_endpoint(),
            default_language: default_language(),
            source_language: default_language(),
            batch_size: default_batch_size(),
            banner_ms: default_banner_ms(),
            force_translation_delay_ms: default_force_translation_delay_ms(),
            cache_enabled: true,
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Disease alert configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AlertsConfig {
    /// Interval between silent refreshes in seconds
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Delay between an update toast and the reload, in milliseconds
    #[serde(default = "default_reload_delay_ms")]
    pub reload_delay_ms: u64,

    /// Delay between a manual refresh succeeding and the reload, in milliseconds
    #[serde(default = "default_manual_reload_delay_ms")]
    pub manual_reload_delay_ms: u64,

    /// Lifetime of the prevention guide notice in the modal footer
    #[serde(default = "default_notice_ms")]
    pub notice_ms: u64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            reload_delay_ms: default_reload_delay_ms(),
            manual_reload_delay_ms: default_manual_reload_delay_ms(),
            notice_ms: default_notice_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_status_element() -> String {
    "#connection-status".to_string()
}

fn default_offline_class() -> String {
    "connection-offline".to_string()
}

fn default_online_class() -> String {
    "connection-online".to_string()
}

fn default_slow_class() -> String {
    "connection-slow".to_string()
}

fn default_check_interval_ms() -> u64 {
    30_000
}

fn default_offline_timeout_ms() -> u64 {
    5_000
}

fn default_slow_threshold_ms() -> u64 {
    3_000
}

fn default_auto_hide_ms() -> u64 {
    3_000
}

fn default_ping_url() -> String {
    "/ping".to_string()
}

fn default_translate_endpoint() -> String {
    "/api/translate".to_string()
}

fn default_language_set_endpoint() -> String {
    "/language/set".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_batch_size() -> usize {
    20
}

fn default_banner_ms() -> u64 {
    3_000
}

fn default_force_translation_delay_ms() -> u64 {
    500
}

fn default_cache_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_refresh_interval_secs() -> u64 {
    30 * 60
}

fn default_reload_delay_ms() -> u64 {
    3_000
}

fn default_manual_reload_delay_ms() -> u64 {
    1_500
}

fn default_notice_ms() -> u64 {
    5_000
}

fn default_true() -> bool {
    true
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            monitor: MonitorConfig::default(),
            translator: TranslatorConfig::default(),
            alerts: AlertsConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)
            .map_err(|e| anyhow!("Invalid base URL '{}': {}", self.base_url, e))?;

        if self.monitor.check_interval_ms == 0 {
            return Err(anyhow!("Monitor check interval must be greater than zero"));
        }
        if self.monitor.offline_timeout_ms == 0 {
            return Err(anyhow!("Monitor offline timeout must be greater than zero"));
        }
        if !self.monitor.ping_url.starts_with('/') {
            return Err(anyhow!("Ping URL must be an absolute path: {}", self.monitor.ping_url));
        }

        if self.translator.batch_size == 0 {
            return Err(anyhow!("Translation batch size must be greater than zero"));
        }
        crate::language_utils::validate_language_code(&self.translator.default_language)?;
        crate::language_utils::validate_language_code(&self.translator.source_language)?;

        if self.alerts.refresh_interval_secs == 0 {
            return Err(anyhow!("Alert refresh interval must be greater than zero"));
        }

        Ok(())
    }

    /// Load configuration from a JSON file, writing a default one if the
    /// file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let file = File::open(path)
                .context(format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .context(format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .context(format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }
}
