use anyhow::Result;
use jobfill_core::config::AppConfig;

use crate::cli::Target;
use crate::commands::{build_engine, load_profile, open_page};

pub async fn run(config: AppConfig, target: Target, use_form_container: bool, json: bool) -> Result<()> {
    let engine = build_engine(&config)?;
    let profile = load_profile(&target.profile)?;
    let page = open_page(&config, &target.source).await?;
    let document = page.document.as_ref();

    let scope = match engine.get_platform_config(&target.platform) {
        Some(platform) if use_form_container || config.engine.use_form_container => {
            engine.form_scope(document, &platform)
        }
        _ => None,
    };

    let entries = engine.preview_fill(document, &target.platform, &profile, scope);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Preview for {} ({} mappings):\n", target.platform, entries.len());
    for entry in &entries {
        println!(
            "  [{:<6}] {:<40} {:<9} {}",
            entry.confidence,
            entry.path,
            if entry.found { "found" } else { "missing" },
            entry.value.as_deref().unwrap_or("(no value)")
        );
    }

    Ok(())
}
