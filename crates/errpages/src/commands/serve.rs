//! Preview server command.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::ProjectConfig;

/// Page served for unknown paths, when it was built.
const NOT_FOUND_PAGE: &str = "404.html";

/// Run the serve command.
pub async fn run(config_path: &Path, port: u16, dir: Option<PathBuf>, open: bool) -> Result<()> {
    let dir = match dir {
        Some(dir) => dir,
        None => ProjectConfig::load(config_path)?.build_config().output_dir,
    };

    if !dir.is_dir() {
        anyhow::bail!(
            "Output directory not found: {}. Run 'errpages build' first.",
            dir.display()
        );
    }

    let addr: SocketAddr = format!("127.0.0.1:{}", port)
        .parse()
        .context("Invalid address")?;

    // Unknown paths get the generated 404 page, the way a host would serve it
    let not_found = dir.join(NOT_FOUND_PAGE);
    if !not_found.is_file() {
        tracing::warn!("{} was not built; unknown paths return empty 404s", NOT_FOUND_PAGE);
    }
    let app = Router::new()
        .fallback_service(ServeDir::new(&dir).not_found_service(ServeFile::new(not_found)));

    tracing::info!("Previewing {} at http://{}", dir.display(), addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    if open {
        let _ = open::that(format!("http://{}", addr));
    }

    axum::serve(listener, app).await?;

    Ok(())
}

