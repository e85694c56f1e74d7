//! Scaffold an error page project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(yes: bool) -> Result<()> {
    tracing::info!("Initializing errpages...");
    scaffold(Path::new("."), yes)?;

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'errpages dev' to start the development server.");

    Ok(())
}

/// Write the starter files under `root`. Existing files are kept unless `overwrite`.
fn scaffold(root: &Path, overwrite: bool) -> Result<()> {
    let configs_dir = root.join("configs");
    if !configs_dir.exists() {
        fs::create_dir_all(&configs_dir).context("Failed to create configs directory")?;
    }

    let files = [
        ("errpages.toml", DEFAULT_CONFIG),
        ("template.html", DEFAULT_TEMPLATE),
        ("configs/404.json", DEFAULT_404),
        ("configs/500.json", DEFAULT_500),
    ];

    for (name, content) in files {
        let path = root.join(name);
        if path.exists() && !overwrite {
            tracing::warn!("{} already exists. Use --yes to overwrite.", name);
            continue;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", name))?;
        tracing::info!("Created {}", name);
    }

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# errpages configuration

[paths]
# Optional page config at the project root, built as config.html
root_config = "config.json"

# Directory of page configs; without it, *.json next to this file is scanned
configs_dir = "configs"

# Shared page template (Jinja syntax)
template = "template.html"

# Output directory
output = "dist"

[build]
# Minify HTML, inline CSS and inline JS
minify = true

# JSON files in the project root that are never pages
exclude = []
"#;

const DEFAULT_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ config.error_code }}: {{ config.title }}</title>
  <style>
    body { font-family: system-ui, -apple-system, sans-serif; margin: 0; color: #1f2937; background: #f9fafb; }
    main { max-width: 960px; margin: 0 auto; padding: 3rem 1.5rem; }
    h1 { font-size: 2.5rem; margin: 0 0 0.5rem; }
    .code { color: #6b7280; margin: 0 0 2rem; }
    .statuses { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1rem; list-style: none; padding: 0; }
    .statuses li { background: #fff; border: 1px solid #e5e7eb; border-radius: 0.5rem; padding: 1rem; text-align: center; }
    .status-ok { border-top: 4px solid #16a34a; }
    .status-error { border-top: 4px solid #dc2626; }
  </style>
</head>
<body>
  <main>
    <h1>{{ config.title }}</h1>
    <p class="code">Error code {{ config.error_code }}</p>

    <ul class="statuses">
      <li class="status-{{ config.browser_status.status }}">
        <strong>You</strong><br>{{ config.browser_status.location }}
      </li>
      <li class="status-{{ config.cloudflare_status.status }}">
        <strong>Cloudflare</strong><br>{{ config.cloudflare_status.location }}
      </li>
      <li class="status-{{ config.host_status.status }}">
        <strong>Host</strong><br>{{ config.host_status.location }}
      </li>
    </ul>

    {% if config.what_happened %}<h2>What happened?</h2><p>{{ config.what_happened }}</p>{% endif %}
    {% if config.what_can_i_do %}<h2>What can I do?</h2><p>{{ config.what_can_i_do }}</p>{% endif %}
  </main>

  <script>
    {{ configScript | safe }}
  </script>
</body>
</html>
"##;

const DEFAULT_404: &str = r#"{
  "title": "Not Found",
  "error_code": 404,
  "browser_status": { "status": "ok", "location": "Your browser" },
  "cloudflare_status": { "status": "ok", "location": "Edge" },
  "host_status": { "status": "error", "location": "Origin" },
  "what_happened": "The page you requested could not be found on this server.",
  "what_can_i_do": "Check the address for typos or head back to the home page."
}
"#;

const DEFAULT_500: &str = r#"{
  "title": "Internal Server Error",
  "error_code": 500,
  "browser_status": { "status": "ok", "location": "Your browser" },
  "cloudflare_status": { "status": "ok", "location": "Edge" },
  "host_status": { "status": "error", "location": "Origin" },
  "what_happened": "The origin server hit an unexpected condition.",
  "what_can_i_do": "Try again in a few minutes."
}
"#;
