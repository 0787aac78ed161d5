// src/pipeline/validate.rs

use std::path::Path;

use crate::error::Result;
use crate::models::Config;
use crate::services::StaticDirectory;

/// Validate configuration and, when given, a static directory file.
pub fn run_validate(config: &Config, directory_file: Option<&Path>) -> Result<()> {
    log::info!("Validating configuration...");

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }
    log::info!("✓ Config OK");
    log::info!("  Directory: {}", config.directory.base_url);
    log::info!("  User agent: {}", config.directory.user_agent);
    log::info!("  Timeout: {}s", config.directory.timeout_secs);
    log::info!("  Max concurrent: {}", config.directory.max_concurrent);
    log::info!("  City alias groups: {}", config.matching.city_aliases.len());
    log::info!(
        "  Academic year pivot month: {}",
        config.dates.academic_year_pivot_month
    );

    if let Some(path) = directory_file {
        match StaticDirectory::load(path) {
            Ok(directory) => {
                let entries = directory.entries();
                let intakes: usize = entries.iter().map(|e| e.intakes.len()).sum();
                log::info!("✓ Directory file OK");
                log::info!("  Universities: {}", entries.len());
                log::info!("  Intakes: {}", intakes);
            }
            Err(e) => {
                log::error!("Directory file {} is invalid: {}", path.display(), e);
                return Err(e);
            }
        }
    }

    log::info!("All validations passed!");
    Ok(())
}
