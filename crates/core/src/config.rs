use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub catalog: CatalogSettings,
    pub logging: LoggingConfig,
}

/// Settings every resolver receives explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    pub allow_to_select_warehouse: bool,
    pub display_tier_prices_with_discounts: bool,
    pub ignore_discounts: bool,
    pub ignore_tier_prices: bool,
    pub display_stock_quantity: bool,
    pub overview_concurrency: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub allow_to_select_warehouse: Option<bool>,
    pub ignore_discounts: Option<bool>,
    pub overview_concurrency: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            allow_to_select_warehouse: false,
            display_tier_prices_with_discounts: true,
            ignore_discounts: false,
            ignore_tier_prices: false,
            display_stock_quantity: true,
            overview_concurrency: 8,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogSettings::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("storefront.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(catalog) = patch.catalog {
            if let Some(value) = catalog.allow_to_select_warehouse {
                self.catalog.allow_to_select_warehouse = value;
            }
            if let Some(value) = catalog.display_tier_prices_with_discounts {
                self.catalog.display_tier_prices_with_discounts = value;
            }
            if let Some(value) = catalog.ignore_discounts {
                self.catalog.ignore_discounts = value;
            }
            if let Some(value) = catalog.ignore_tier_prices {
                self.catalog.ignore_tier_prices = value;
            }
            if let Some(value) = catalog.display_stock_quantity {
                self.catalog.display_stock_quantity = value;
            }
            if let Some(value) = catalog.overview_concurrency {
                self.catalog.overview_concurrency = value;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("STOREFRONT_CATALOG_ALLOW_TO_SELECT_WAREHOUSE") {
            self.catalog.allow_to_select_warehouse =
                parse_bool("STOREFRONT_CATALOG_ALLOW_TO_SELECT_WAREHOUSE", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_CATALOG_DISPLAY_TIER_PRICES_WITH_DISCOUNTS") {
            self.catalog.display_tier_prices_with_discounts =
                parse_bool("STOREFRONT_CATALOG_DISPLAY_TIER_PRICES_WITH_DISCOUNTS", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_CATALOG_IGNORE_DISCOUNTS") {
            self.catalog.ignore_discounts =
                parse_bool("STOREFRONT_CATALOG_IGNORE_DISCOUNTS", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_CATALOG_IGNORE_TIER_PRICES") {
            self.catalog.ignore_tier_prices =
                parse_bool("STOREFRONT_CATALOG_IGNORE_TIER_PRICES", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_CATALOG_DISPLAY_STOCK_QUANTITY") {
            self.catalog.display_stock_quantity =
                parse_bool("STOREFRONT_CATALOG_DISPLAY_STOCK_QUANTITY", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_CATALOG_OVERVIEW_CONCURRENCY") {
            self.catalog.overview_concurrency =
                parse_usize("STOREFRONT_CATALOG_OVERVIEW_CONCURRENCY", &value)?;
        }

        let log_level =
            read_env("STOREFRONT_LOGGING_LEVEL").or_else(|| read_env("STOREFRONT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("STOREFRONT_LOGGING_FORMAT").or_else(|| read_env("STOREFRONT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(value) = overrides.allow_to_select_warehouse {
            self.catalog.allow_to_select_warehouse = value;
        }
        if let Some(value) = overrides.ignore_discounts {
            self.catalog.ignore_discounts = value;
        }
        if let Some(value) = overrides.overview_concurrency {
            self.catalog.overview_concurrency = value;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_catalog(&self.catalog)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("storefront.toml"), PathBuf::from("config/storefront.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_catalog(catalog: &CatalogSettings) -> Result<(), ConfigError> {
    if catalog.overview_concurrency == 0 || catalog.overview_concurrency > 64 {
        return Err(ConfigError::Validation(
            "catalog.overview_concurrency must be in range 1..=64".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    catalog: Option<CatalogPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    allow_to_select_warehouse: Option<bool>,
    display_tier_prices_with_discounts: Option<bool>,
    ignore_discounts: Option<bool>,
    ignore_tier_prices: Option<bool>,
    display_stock_quantity: Option<bool>,
    overview_concurrency: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
