use storefront_core::config::{LogFormat, LoggingConfig};
use tracing::Level;

/// Logs go to stderr; stdout carries the JSON command output.
pub fn init_logging(config: &LoggingConfig) {
    let log_level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder =
        tracing_subscriber::fmt().with_target(false).with_max_level(log_level).with_writer(std::io::stderr);

    // a second init (tests, embedding) keeps the first subscriber
    let _ = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
