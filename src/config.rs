use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::domain::{OutputShape, RankingWeights};
use crate::services::gemini::DEFAULT_ENDPOINT;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub gemini: GeminiSettings,
    #[serde(default)]
    pub supabase: SupabaseSettings,
    #[serde(default)]
    pub classifier: ClassifierSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
    /// Attach underlying error text to error responses. Leave off in
    /// production; raw provider errors can mention key material.
    #[serde(default)]
    pub expose_error_details: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
            expose_error_details: false,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    #[serde(default = "default_gemini_endpoint")]
    pub endpoint: String,
    /// Empty means unconfigured; requests then fail with a
    /// configuration error instead of blocking startup.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            endpoint: default_gemini_endpoint(),
            api_key: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_gemini_endpoint() -> String { DEFAULT_ENDPOINT.to_string() }
fn default_request_timeout_secs() -> u64 { 20 }
fn default_max_attempts() -> usize { 6 }

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SupabaseSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub service_key: String,
    #[serde(default)]
    pub activation_redirect: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ClassifierSettings {
    #[serde(default)]
    pub shape: OutputShape,
    /// Category labels; empty falls back to the canonical set
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_match_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
    #[serde(default)]
    pub weights: WeightsConfig,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_limit: default_match_limit(),
            max_limit: default_max_limit(),
            weights: WeightsConfig::default(),
        }
    }
}

fn default_match_limit() -> u16 { 20 }
fn default_max_limit() -> u16 { 50 }

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_categories_weight")]
    pub categories: f64,
    #[serde(default = "default_affiliation_weight")]
    pub affiliation: f64,
    #[serde(default = "default_keywords_weight")]
    pub keywords: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            categories: default_categories_weight(),
            affiliation: default_affiliation_weight(),
            keywords: default_keywords_weight(),
        }
    }
}

impl From<WeightsConfig> for RankingWeights {
    fn from(config: WeightsConfig) -> Self {
        Self {
            categories: config.categories,
            affiliation: config.affiliation,
            keywords: config.keywords,
        }
    }
}

fn default_categories_weight() -> f64 { 0.60 }
fn default_affiliation_weight() -> f64 { 0.20 }
fn default_keywords_weight() -> f64 { 0.20 }

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

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with TUP_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with TUP_)
            // e.g., TUP_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("TUP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Apply the platform-conventional variable names on top
        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("TUP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply the bare environment variable names hosting platforms use
/// (GEMINI_API_KEY, SUPABASE_URL, SUPABASE_SERVICE_ROLE_KEY) on top of
/// whatever the prefixed sources produced
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let gemini_api_key = env::var("GEMINI_API_KEY").ok();
    let supabase_url = env::var("SUPABASE_URL").ok();
    let supabase_service_key = env::var("SUPABASE_SERVICE_ROLE_KEY")
        .or_else(|_| env::var("SUPABASE_SERVICE_KEY"))
        .ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(api_key) = gemini_api_key {
        builder = builder.set_override("gemini.api_key", api_key)?;
    }
    if let Some(url) = supabase_url {
        builder = builder.set_override("supabase.url", url)?;
    }
    if let Some(service_key) = supabase_service_key {
        builder = builder.set_override("supabase.service_key", service_key)?;
    }

    builder.build()
}
