//! Binds page configs into the shared page template.

use std::fs;
use std::path::Path;

use minijinja::{context, AutoEscape, Environment, UndefinedBehavior, Value};

use crate::loader::Config;

/// Name the page template is registered under.
const PAGE_TEMPLATE: &str = "page";

/// Errors that can occur while rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Failed to read template {path}: {message}")]
    TemplateRead { path: String, message: String },

    #[error("Invalid template: {0}")]
    TemplateSyntax(String),

    #[error("Failed to render template: {0}")]
    Render(String),

    #[error("Failed to serialize config: {0}")]
    Serialize(String),
}

/// Build the `window.config = ...;` assignment embedded in the page script.
///
/// `</` is escaped so the JSON can never terminate the surrounding script tag.
pub fn config_script(config: &Config) -> Result<String, RenderError> {
    let json =
        serde_json::to_string(config).map_err(|e| RenderError::Serialize(e.to_string()))?;
    Ok(format!("window.config = {};", json.replace("</", "<\\/")))
}

/// Renders configs through a single compiled template.
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    /// Load and compile the template at `path`.
    pub fn from_file(path: &Path) -> Result<Self, RenderError> {
        if !path.is_file() {
            return Err(RenderError::TemplateNotFound(path.display().to_string()));
        }

        let source = fs::read_to_string(path).map_err(|e| RenderError::TemplateRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Self::from_source(&source)
    }

    /// Compile template source text.
    pub fn from_source(source: &str) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.set_undefined_behavior(UndefinedBehavior::Chainable);
        env.add_template_owned(PAGE_TEMPLATE, source.to_string())
            .map_err(|e| RenderError::TemplateSyntax(e.to_string()))?;

        Ok(Self { env })
    }

    /// Render one page.
    ///
    /// The template sees `config` (the raw JSON object) and `configScript`.
    pub fn render(&self, config: &Config) -> Result<String, RenderError> {
        let script = config_script(config)?;
        let tmpl = self
            .env
            .get_template(PAGE_TEMPLATE)
            .map_err(|e| RenderError::Render(e.to_string()))?;

        tmpl.render(context! {
            config => Value::from_serialize(config),
            configScript => script,
        })
        .map_err(|e| RenderError::Render(e.to_string()))
    }
}
