use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use storefront_core::config::AppConfig;
use toml::Value;

pub fn run(config: &AppConfig, explicit_path: Option<&Path>) -> String {
    let config_file_path = detect_config_path(explicit_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let catalog = &config.catalog;
    let entries = [
        (
            "catalog.allow_to_select_warehouse",
            catalog.allow_to_select_warehouse.to_string(),
            &["STOREFRONT_CATALOG_ALLOW_TO_SELECT_WAREHOUSE"][..],
        ),
        (
            "catalog.display_tier_prices_with_discounts",
            catalog.display_tier_prices_with_discounts.to_string(),
            &["STOREFRONT_CATALOG_DISPLAY_TIER_PRICES_WITH_DISCOUNTS"][..],
        ),
        (
            "catalog.ignore_discounts",
            catalog.ignore_discounts.to_string(),
            &["STOREFRONT_CATALOG_IGNORE_DISCOUNTS"][..],
        ),
        (
            "catalog.ignore_tier_prices",
            catalog.ignore_tier_prices.to_string(),
            &["STOREFRONT_CATALOG_IGNORE_TIER_PRICES"][..],
        ),
        (
            "catalog.display_stock_quantity",
            catalog.display_stock_quantity.to_string(),
            &["STOREFRONT_CATALOG_DISPLAY_STOCK_QUANTITY"][..],
        ),
        (
            "catalog.overview_concurrency",
            catalog.overview_concurrency.to_string(),
            &["STOREFRONT_CATALOG_OVERVIEW_CONCURRENCY"][..],
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            &["STOREFRONT_LOGGING_LEVEL", "STOREFRONT_LOG_LEVEL"][..],
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            &["STOREFRONT_LOGGING_FORMAT", "STOREFRONT_LOG_FORMAT"][..],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(entries.iter().map(|(key, value, env_keys)| render_line(key, value, source(*key, *env_keys))));
    lines.join("\n")
}

fn detect_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then(|| path.to_path_buf());
    }

    [PathBuf::from("storefront.toml"), PathBuf::from("config/storefront.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
