use anyhow::{Context, Result};
use jobfill_core::config::AppConfig;
use jobfill_mappings::PlatformMappingConfig;

use crate::commands::load_registry;

pub fn run(config: AppConfig, platform: Option<&str>) -> Result<()> {
    let registry = load_registry(&config)?;

    let selected = match platform {
        Some(id) => Some(registry.get(id).with_context(|| format!("unknown platform {}", id))?),
        None => None,
    };
    let platforms: Vec<&PlatformMappingConfig> = match &selected {
        Some(found) => vec![found.as_ref()],
        None => registry.platforms().collect(),
    };

    for platform in platforms {
        println!(
            "{} v{} ({} mappings)",
            platform.platform,
            platform.version,
            platform.mappings.len()
        );
        for mapping in &platform.mappings {
            println!(
                "  {:<40} {:<9} priority {:>4}{}",
                mapping.path,
                mapping.field_type,
                mapping.priority,
                if mapping.required { "  required" } else { "" }
            );
        }
        println!();
    }

    Ok(())
}
