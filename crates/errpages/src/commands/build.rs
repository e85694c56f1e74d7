//! Static build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use errpages_static::StaticBuilder;

use crate::config::ProjectConfig;

/// Run the build command.
pub async fn run(config_path: &Path, output: Option<PathBuf>, minify: Option<bool>) -> Result<()> {
    tracing::info!("Building error pages...");

    let mut config = ProjectConfig::load(config_path)?.build_config();
    if let Some(output) = output {
        config.output_dir = output;
    }
    if let Some(minify) = minify {
        config.minify = minify;
    }

    let result = StaticBuilder::new(config).build().await?;

    tracing::info!(
        "Built {} pages ({} skipped, {} with warnings) in {}ms",
        result.pages,
        result.skipped,
        result.warnings,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
