mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing::warn;

use jobfill_core::config::AppConfig;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    // fields are filled one at a time, a single thread is enough
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_str = std::fs::read_to_string(&cli.config).unwrap_or_else(|_| {
        warn!(path = %cli.config, "config file not found, using defaults");
        include_str!("../config/default.toml").to_string()
    });
    let mut config = AppConfig::from_toml_str(&config_str)?;
    config.apply_env_overrides();

    match cli.command {
        Commands::Fill {
            target,
            required_only,
            use_form_container,
            pacing_ms,
            json,
        } => {
            commands::fill::run(
                config,
                target,
                commands::fill::Flags {
                    required_only,
                    use_form_container,
                    pacing_ms,
                    json,
                },
            )
            .await?;
        }
        Commands::Preview {
            target,
            use_form_container,
            json,
        } => {
            commands::preview::run(config, target, use_form_container, json).await?;
        }
        Commands::Fields { platform } => {
            commands::fields::run(config, platform.as_deref())?;
        }
    }

    Ok(())
}
