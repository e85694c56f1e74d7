//! End-to-end builds against a temporary project directory.

use std::fs;
use std::path::Path;

use errpages_static::{BuildConfig, BuildError, RenderError, StaticBuilder};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <!-- shared error page template -->
  <title>{{ config.error_code }}: {{ config.title }}</title>
  <style>
    body {
      font-family: system-ui, sans-serif;
      margin: 0;
    }
    .status-error { color: #b91c1c; }
  </style>
</head>
<body>
  <main>
    <h1>{{ config.title }}</h1>
    <p class="code">Error {{ config.error_code }}</p>
    <ul>
      <li class="status-{{ config.browser_status.status }}">Browser</li>
      <li class="status-{{ config.cloudflare_status.status }}">Cloudflare</li>
      <li class="status-{{ config.host_status.status }}">Host</li>
    </ul>
  </main>
  <script>
    {{ configScript | safe }}
    // expose the code for client-side tweaks
    document.body.dataset.code = String(window.config.error_code);
  </script>
</body>
</html>
"#;

const NOT_FOUND: &str =
    r#"{"title": "Not Found", "error_code": 404, "host_status": {"status": "error"}}"#;

fn project(root: &Path) -> BuildConfig {
    fs::write(root.join("template.html"), TEMPLATE).unwrap();
    BuildConfig::for_project(root)
}

fn write_config(root: &Path, name: &str, json: &str) {
    let dir = root.join("configs");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), json).unwrap();
}

#[tokio::test]
async fn builds_not_found_page() {
    let temp = tempdir().unwrap();
    let config = project(temp.path());
    write_config(temp.path(), "404.json", NOT_FOUND);

    let result = StaticBuilder::new(config).build().await.unwrap();

    assert_eq!(result.pages, 1);
    assert_eq!(result.warnings, 0);

    let html = fs::read_to_string(temp.path().join("dist/404.html")).unwrap();
    assert!(html.contains("Not Found"));
    assert!(html.contains("<title>404: Not Found</title>"));
    assert!(html.contains("window.config"));
    assert!(!html.contains('\n'));
    assert!(!html.contains("<!--"));
    assert!(!html.contains("expose the code"));

    assert_eq!(result.records[0].source, "configs/404.json");
    let index = fs::read_to_string(temp.path().join("dist/index.html")).unwrap();
    assert!(index.contains(r#"<span class="page-path">configs/404.json</span>"#));
}

#[tokio::test]
async fn irrelevant_configs_are_left_out() {
    let temp = tempdir().unwrap();
    let config = project(temp.path());
    write_config(temp.path(), "404.json", NOT_FOUND);
    write_config(temp.path(), "settings.json", r#"{"theme": "dark"}"#);

    let result = StaticBuilder::new(config).build().await.unwrap();

    assert_eq!(result.pages, 1);
    assert_eq!(result.skipped, 1);
    assert!(!temp.path().join("dist/settings.html").exists());

    let index = fs::read_to_string(temp.path().join("dist/index.html")).unwrap();
    assert!(index.contains("404.html"));
    assert!(!index.contains("settings"));
}

#[tokio::test]
async fn missing_error_status_warns_once_and_still_builds() {
    let temp = tempdir().unwrap();
    let config = project(temp.path());
    write_config(
        temp.path(),
        "503.json",
        r#"{"title": "Service Unavailable", "error_code": 503, "host_status": {"status": "ok"}}"#,
    );

    let result = StaticBuilder::new(config).build().await.unwrap();

    assert_eq!(result.warnings, 1);
    assert_eq!(result.pages, 1);
    assert!(temp.path().join("dist/503.html").exists());
}

#[tokio::test]
async fn empty_project_still_gets_an_index() {
    let temp = tempdir().unwrap();
    let config = project(temp.path());

    let result = StaticBuilder::new(config).build().await.unwrap();

    assert_eq!(result.pages, 0);
    let index = fs::read_to_string(temp.path().join("dist/index.html")).unwrap();
    assert!(index.starts_with("<!DOCTYPE html>"));
    assert!(index.contains("No pages were generated."));
}

#[tokio::test]
async fn rebuilding_is_byte_identical() {
    let temp = tempdir().unwrap();
    let config = project(temp.path());
    write_config(temp.path(), "404.json", NOT_FOUND);
    write_config(
        temp.path(),
        "500.json",
        r#"{"title": "Internal Server Error", "error_code": 500, "cloudflare_status": {"status": "error"}}"#,
    );

    let builder = StaticBuilder::new(config);
    builder.build().await.unwrap();
    let first_page = fs::read(temp.path().join("dist/500.html")).unwrap();
    let first_index = fs::read(temp.path().join("dist/index.html")).unwrap();

    builder.build().await.unwrap();
    assert_eq!(fs::read(temp.path().join("dist/500.html")).unwrap(), first_page);
    assert_eq!(fs::read(temp.path().join("dist/index.html")).unwrap(), first_index);
}

#[tokio::test]
async fn sibling_scan_skips_manifests() {
    let temp = tempdir().unwrap();
    let mut config = project(temp.path());
    config.exclude = vec!["renovate.json".to_string()];

    fs::write(temp.path().join("404.json"), NOT_FOUND).unwrap();
    fs::write(
        temp.path().join("package.json"),
        r#"{"name": "site", "title": "Package"}"#,
    )
    .unwrap();
    fs::write(temp.path().join("tsconfig.json"), r#"{"title": "ts"}"#).unwrap();
    fs::write(temp.path().join("renovate.json"), r#"{"title": "bot"}"#).unwrap();

    let result = StaticBuilder::new(config).build().await.unwrap();

    let names: Vec<&str> = result.records.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, vec!["404.html"]);
    assert!(!temp.path().join("dist/package.html").exists());
    assert!(!temp.path().join("dist/tsconfig.html").exists());
}

#[tokio::test]
async fn malformed_json_is_skipped() {
    let temp = tempdir().unwrap();
    let config = project(temp.path());
    write_config(temp.path(), "404.json", NOT_FOUND);
    write_config(temp.path(), "broken.json", "{ \"title\": ");

    let result = StaticBuilder::new(config).build().await.unwrap();

    assert_eq!(result.pages, 1);
    assert_eq!(result.skipped, 1);
}

#[tokio::test]
async fn missing_template_is_fatal() {
    let temp = tempdir().unwrap();
    write_config(temp.path(), "404.json", NOT_FOUND);

    let result = StaticBuilder::new(BuildConfig::for_project(temp.path()))
        .build()
        .await;

    assert!(matches!(
        result,
        Err(BuildError::Render(RenderError::TemplateNotFound(_)))
    ));
}

#[tokio::test]
async fn root_config_does_not_collide_with_listing() {
    let temp = tempdir().unwrap();
    let config = project(temp.path());
    fs::write(
        temp.path().join("config.json"),
        r#"{"title": "Bad Gateway", "error_code": 502, "cloudflare_status": {"status": "error"}}"#,
    )
    .unwrap();
    write_config(temp.path(), "404.json", NOT_FOUND);

    let result = StaticBuilder::new(config).build().await.unwrap();

    let names: Vec<&str> = result.records.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, vec!["config.html", "404.html"]);

    let root_page = fs::read_to_string(temp.path().join("dist/config.html")).unwrap();
    assert!(root_page.contains("Bad Gateway"));

    let index = fs::read_to_string(temp.path().join("dist/index.html")).unwrap();
    assert!(index.contains(r#"href="config.html""#));
    assert!(index.contains(r#"href="404.html""#));
}

#[tokio::test]
async fn duplicate_output_names_keep_first_page() {
    let temp = tempdir().unwrap();
    let config = project(temp.path());
    fs::write(
        temp.path().join("config.json"),
        r#"{"title": "Bad Gateway", "error_code": 502, "cloudflare_status": {"status": "error"}}"#,
    )
    .unwrap();
    write_config(temp.path(), "config.json", r#"{"title": "Gateway Timeout", "error_code": 504}"#);
    write_config(temp.path(), "404.json", NOT_FOUND);

    let result = StaticBuilder::new(config).build().await.unwrap();

    let names: Vec<&str> = result.records.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, vec!["config.html", "404.html"]);
    assert_eq!(result.skipped, 1);

    let page = fs::read_to_string(temp.path().join("dist/config.html")).unwrap();
    assert!(page.contains("Bad Gateway"));
    assert!(!page.contains("Gateway Timeout"));

    let index = fs::read_to_string(temp.path().join("dist/index.html")).unwrap();
    assert_eq!(index.matches(r#"href="config.html""#).count(), 1);
    assert!(index.contains("config.json"));
}

#[tokio::test]
async fn index_json_is_reserved() {
    let temp = tempdir().unwrap();
    let config = project(temp.path());
    write_config(temp.path(), "index.json", NOT_FOUND);

    let result = StaticBuilder::new(config).build().await.unwrap();

    assert_eq!(result.pages, 0);
    assert_eq!(result.skipped, 1);
    let index = fs::read_to_string(temp.path().join("dist/index.html")).unwrap();
    assert!(index.contains("No pages were generated."));
}

#[tokio::test]
async fn dev_script_is_injected() {
    let temp = tempdir().unwrap();
    let mut config = project(temp.path());
    config.dev_script = Some(r#"<script src="/__reload.js"></script>"#.to_string());
    write_config(temp.path(), "404.json", NOT_FOUND);

    StaticBuilder::new(config).build().await.unwrap();

    let html = fs::read_to_string(temp.path().join("dist/404.html")).unwrap();
    assert!(html.contains(r#"<script src="/__reload.js"></script></body>"#));
}

#[tokio::test]
async fn minification_can_be_disabled() {
    let temp = tempdir().unwrap();
    let mut config = project(temp.path());
    config.minify = false;
    write_config(temp.path(), "404.json", NOT_FOUND);

    StaticBuilder::new(config).build().await.unwrap();

    let html = fs::read_to_string(temp.path().join("dist/404.html")).unwrap();
    assert!(html.contains("<!-- shared error page template -->"));
    assert!(html.contains('\n'));
}
