//! Development server command.

use std::path::Path;

use anyhow::Result;
use errpages_server::{DevServer, DevServerConfig};

use crate::config::ProjectConfig;

/// Run the dev server.
pub async fn run(config_path: &Path, port: u16, open: bool, rebuild: bool) -> Result<()> {
    tracing::info!("Starting development server on port {}", port);

    let config = DevServerConfig {
        build: ProjectConfig::load(config_path)?.build_config(),
        port,
        open,
        rebuild_on_start: rebuild,
        ..Default::default()
    };

    DevServer::new(config).start().await?;

    Ok(())
}
