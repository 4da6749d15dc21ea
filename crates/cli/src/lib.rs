pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use storefront_core::config::{AppConfig, LoadOptions};
use tracing::info;

use crate::commands::{CatalogArgs, CommandResult, ContextArgs};

#[derive(Debug, Parser)]
#[command(
    name = "storefront",
    about = "Storefront catalog CLI",
    long_about = "Resolve product variants, stock and display prices against a catalog and print JSON.",
    after_help = "Examples:\n  storefront detail classic-tee --attr color=blue --attr size=l\n  storefront overview --currency EUR\n  storefront config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to storefront.toml (defaults to ./storefront.toml)")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Build the product detail model for one product")]
    Detail {
        product_id: String,
        #[command(flatten)]
        catalog: CatalogArgs,
        #[command(flatten)]
        context: ContextArgs,
    },
    #[command(about = "Recompute identifiers, price and stock after an attribute change")]
    AttributeChange {
        product_id: String,
        #[command(flatten)]
        catalog: CatalogArgs,
        #[command(flatten)]
        context: ContextArgs,
    },
    #[command(about = "Build overview models for a listing, in the given order")]
    Overview {
        #[arg(help = "Product ids; every catalog product when omitted")]
        product_ids: Vec<String>,
        #[command(flatten)]
        catalog: CatalogArgs,
        #[command(flatten)]
        context: ContextArgs,
    },
    #[command(about = "Load the deterministic demo catalog and list its products")]
    Seed,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let options = LoadOptions { config_path: cli.config.clone(), ..LoadOptions::default() };
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            let result = CommandResult::failure(
                "startup",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };
    logging::init_logging(&config.logging);
    info!(event_name = "cli.command.started", command = cli.command.name(), "command started");

    let result = match cli.command {
        Command::Detail { product_id, catalog, context } => {
            commands::detail::run(&config, &catalog, &context, &product_id)
        }
        Command::AttributeChange { product_id, catalog, context } => {
            commands::attribute_change::run(&config, &catalog, &context, &product_id)
        }
        Command::Overview { product_ids, catalog, context } => {
            commands::overview::run(&config, &catalog, &context, &product_ids)
        }
        Command::Seed => commands::seed::run(),
        Command::Config => CommandResult {
            exit_code: 0,
            output: commands::config::run(&config, cli.config.as_deref()),
        },
    };

    info!(event_name = "cli.command.finished", exit_code = result.exit_code, "command finished");
    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Detail { .. } => "detail",
            Self::AttributeChange { .. } => "attribute-change",
            Self::Overview { .. } => "overview",
            Self::Seed => "seed",
            Self::Config => "config",
        }
    }
}
