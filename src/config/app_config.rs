use serde::Deserialize;

use crate::domain::artifact::CacheOptions;
use crate::domain::semantic_cache::SemanticCacheConfig;
use crate::infrastructure::cache::ExactCacheConfig;
use crate::infrastructure::registry::RegistryConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Exact tier backend
    #[serde(default)]
    pub cache: ExactCacheConfig,
    /// Semantic tier
    #[serde(default)]
    pub semantic: SemanticCacheConfig,
    /// Lookup options applied when a call passes none
    #[serde(default)]
    pub options: CacheOptions,
    /// Intent allow-list and slot policy
    #[serde(default)]
    pub registry: RegistryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Loads `config/default`, then `config/local`, then `APP__*` variables
    ///
    /// A `.env` file, if present, is read into the environment first.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Parses configuration from a single source string
    pub fn from_source(source: &str, format: config::FileFormat) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, format))
            .build()?
            .try_deserialize()
    }
}
