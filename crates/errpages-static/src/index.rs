//! Listing page linking every built page.

use minijinja::{context, Environment};

use crate::renderer::RenderError;

/// A page produced during the current build.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PageRecord {
    /// Output file name, relative to the output directory
    pub filename: String,
    /// Display title
    pub title: String,
    /// Config the page was built from, relative to the project root
    pub source: String,
}

/// Render the index listing for `records`, in the order given.
pub fn render_index(records: &[PageRecord]) -> Result<String, RenderError> {
    let mut env = Environment::new();
    env.add_template("index.html", INDEX_TEMPLATE)
        .map_err(|e| RenderError::TemplateSyntax(e.to_string()))?;

    let tmpl = env
        .get_template("index.html")
        .map_err(|e| RenderError::Render(e.to_string()))?;

    tmpl.render(context! { pages => records })
        .map_err(|e| RenderError::Render(e.to_string()))
}

const INDEX_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Error Pages</title>
  <style>
    body { font-family: system-ui, -apple-system, sans-serif; max-width: 720px; margin: 2rem auto; padding: 0 1rem; color: #1f2937; }
    h1 { font-size: 1.75rem; margin-bottom: 1.5rem; }
    ul { list-style: none; padding: 0; }
    li { border: 1px solid #e5e7eb; border-radius: 0.5rem; margin-bottom: 0.75rem; }
    li a { display: block; padding: 0.75rem 1rem; color: inherit; text-decoration: none; }
    li a:hover { background: #f9fafb; }
    .page-title { font-weight: 600; }
    .page-path { display: block; font-size: 0.875rem; color: #6b7280; font-family: ui-monospace, monospace; }
    .empty { color: #6b7280; }
  </style>
</head>
<body>
  <h1>Error Pages</h1>
  {% if pages %}
  <ul>
  {% for page in pages %}
    <li>
      <a href="{{ page.filename }}">
        <span class="page-title">{{ page.title }}</span>
        <span class="page-path">{{ page.source }}</span>
      </a>
    </li>
  {% endfor %}
  </ul>
  {% else %}
  <p class="empty">No pages were generated.</p>
  {% endif %}
</body>
</html>"##;
