use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub directory: DirectorySettings,
    #[serde(default)]
    pub nlp: NlpSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

/// Attorney directory collaborator
#[derive(Debug, Clone, Deserialize)]
pub struct DirectorySettings {
    #[serde(default = "default_directory_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_directory_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            endpoint: default_directory_endpoint(),
            api_key: String::new(),
            timeout_secs: default_directory_timeout_secs(),
        }
    }
}

fn default_directory_endpoint() -> String {
    "http://localhost:8090".to_string()
}
fn default_directory_timeout_secs() -> u64 {
    10
}

/// Feature-extraction collaborator
#[derive(Debug, Clone, Deserialize)]
pub struct NlpSettings {
    #[serde(default = "default_nlp_endpoint")]
    pub endpoint: String,
    /// Sub-timeout after which analysis proceeds with an empty feature set
    #[serde(default = "default_nlp_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for NlpSettings {
    fn default() -> Self {
        Self {
            endpoint: default_nlp_endpoint(),
            timeout_ms: default_nlp_timeout_ms(),
        }
    }
}

fn default_nlp_endpoint() -> String {
    "http://localhost:8091".to_string()
}
fn default_nlp_timeout_ms() -> u64 {
    1500
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    #[serde(default = "default_batch_deadline_secs")]
    pub batch_deadline_secs: u64,
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            pool_size: default_pool_size(),
            batch_deadline_secs: default_batch_deadline_secs(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

fn default_top_n() -> usize {
    5
}
fn default_pool_size() -> usize {
    8
}
fn default_batch_deadline_secs() -> u64 {
    30
}
fn default_session_ttl_secs() -> u64 {
    1800
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
    #[serde(default)]
    pub bands: BandsConfig,
    #[serde(default = "default_reason_threshold")]
    pub reason_threshold: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            weights: WeightsConfig::default(),
            bands: BandsConfig::default(),
            reason_threshold: default_reason_threshold(),
        }
    }
}

fn default_reason_threshold() -> f64 {
    0.05
}

/// Per-dimension scoring weights; must sum to 1.0
#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_specialization_weight")]
    pub specialization: f64,
    #[serde(default = "default_experience_weight")]
    pub experience: f64,
    #[serde(default = "default_track_record_weight")]
    pub track_record: f64,
    #[serde(default = "default_language_weight")]
    pub language: f64,
    #[serde(default = "default_availability_weight")]
    pub availability: f64,
    #[serde(default = "default_budget_fit_weight")]
    pub budget_fit: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            specialization: default_specialization_weight(),
            experience: default_experience_weight(),
            track_record: default_track_record_weight(),
            language: default_language_weight(),
            availability: default_availability_weight(),
            budget_fit: default_budget_fit_weight(),
        }
    }
}

fn default_specialization_weight() -> f64 { 0.35 }
fn default_experience_weight() -> f64 { 0.20 }
fn default_track_record_weight() -> f64 { 0.20 }
fn default_language_weight() -> f64 { 0.10 }
fn default_availability_weight() -> f64 { 0.10 }
fn default_budget_fit_weight() -> f64 { 0.05 }

/// Hourly-rate band per budget tier, as `[min, max]` pairs
#[derive(Debug, Clone, Deserialize)]
pub struct BandsConfig {
    #[serde(default = "default_economy_band")]
    pub economy: [f64; 2],
    #[serde(default = "default_standard_band")]
    pub standard: [f64; 2],
    #[serde(default = "default_premium_band")]
    pub premium: [f64; 2],
    #[serde(default = "default_elite_band")]
    pub elite: [f64; 2],
}

impl Default for BandsConfig {
    fn default() -> Self {
        Self {
            economy: default_economy_band(),
            standard: default_standard_band(),
            premium: default_premium_band(),
            elite: default_elite_band(),
        }
    }
}

fn default_economy_band() -> [f64; 2] { [0.0, 150.0] }
fn default_standard_band() -> [f64; 2] { [100.0, 300.0] }
fn default_premium_band() -> [f64; 2] { [250.0, 600.0] }
fn default_elite_band() -> [f64; 2] { [500.0, 1200.0] }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with LEXORA_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with LEXORA_)
            // e.g., LEXORA_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("LEXORA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("LEXORA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
