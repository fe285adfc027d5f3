use std::time::Duration;

use anyhow::Result;
use jobfill_autofill::{FillError, FillOptions};
use jobfill_core::config::AppConfig;

use crate::cli::Target;
use crate::commands::{build_engine, load_profile, open_page};

pub struct Flags {
    pub required_only: bool,
    pub use_form_container: bool,
    pub pacing_ms: Option<u64>,
    pub json: bool,
}

pub async fn run(config: AppConfig, target: Target, flags: Flags) -> Result<()> {
    let engine = build_engine(&config)?;
    let profile = load_profile(&target.profile)?;
    let mut page = open_page(&config, &target.source).await?;

    let options = FillOptions {
        required_only: flags.required_only,
        use_form_container: flags.use_form_container || config.engine.use_form_container,
        pacing_delay: flags.pacing_ms.map(Duration::from_millis),
    };

    let run = engine
        .fill_all_fields(page.document.as_mut(), &target.platform, &profile, &options)
        .await;

    if flags.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
        return Ok(());
    }

    println!("\n╔══════════════════════════════════════════════╗");
    println!("║           Autofill Summary                   ║");
    println!("╠══════════════════════════════════════════════╣");
    println!("║ Platform:             {:>20}    ║", run.platform);
    println!("║ Started:              {:>20}    ║", run.started_at.format("%Y-%m-%d %H:%M:%S").to_string());
    println!("║ Fields:               {:>20}    ║", run.total);
    println!("║ Filled:               {:>20}    ║", run.filled);
    println!("║ Skipped (no value):   {:>20}    ║", run.skipped);
    println!("║ Failed:               {:>20}    ║", run.failed);
    println!("║ Elapsed:              {:>18}ms    ║", run.elapsed_ms);
    println!("╚══════════════════════════════════════════════╝\n");

    for result in &run.results {
        let marker = match &result.error {
            None => "✓",
            Some(FillError::NoValueInProfile) => "-",
            Some(_) => "✗",
        };
        match (&result.new_value, &result.error) {
            (Some(value), _) => println!("  {} {:<40} {}", marker, result.path, value),
            (None, Some(e)) => println!("  {} {:<40} {}", marker, result.path, e),
            (None, None) => println!("  {} {}", marker, result.path),
        }
    }

    Ok(())
}
