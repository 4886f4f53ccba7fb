use serde::Deserialize;

use crate::domain::DomainError;
use crate::infrastructure::cache::CacheConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
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

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Loads `config/default`, `config/local` and `APP__*` variables, in that order
    ///
    /// A bare `REDIS_URL` overrides everything else so deployments that only
    /// export the conventional variable keep working.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::builder(std::env::var("REDIS_URL").ok())?
            .build()?
            .try_deserialize()
    }

    /// Like [`AppConfig::load`], but falls back to [`CacheConfig::from_env`] on failure
    ///
    /// The load error is handed back so it can be logged once logging is up.
    pub fn load_or_env() -> Result<(Self, Option<config::ConfigError>), DomainError> {
        Self::or_from_vars(Self::load(), |name| std::env::var(name).ok())
    }

    fn or_from_vars<F>(
        loaded: Result<Self, config::ConfigError>,
        lookup: F,
    ) -> Result<(Self, Option<config::ConfigError>), DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match loaded {
            Ok(config) => Ok((config, None)),
            Err(e) => {
                let config = Self {
                    cache: CacheConfig::from_vars(lookup)?,
                    logging: LoggingConfig::default(),
                };
                Ok((config, Some(e)))
            }
        }
    }

    fn builder(
        redis_url: Option<String>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("cache.redis_url", redis_url)
    }
}
