//! Static site builder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use walkdir::WalkDir;

use crate::index::{render_index, PageRecord};
use crate::loader::{load_config, Config};
use crate::minify::{minify_html, MinifyError};
use crate::renderer::{PageRenderer, RenderError};
use crate::validator::{has_error_status, page_title, validate, Validation};

/// File name of the listing page. Page configs may not claim it.
pub const INDEX_PAGE: &str = "index.html";

/// Project manifests that live next to page configs but are never pages.
pub const EXCLUDED_MANIFESTS: [&str; 3] = ["package.json", "package-lock.json", "tsconfig.json"];

/// Configuration for building the error pages.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Project root, scanned for sibling configs when there is no configs directory
    pub root_dir: PathBuf,

    /// Optional root config, built alongside the discovered pages
    pub root_config: PathBuf,

    /// Directory of page configs
    pub configs_dir: PathBuf,

    /// Shared page template
    pub template: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Minify HTML/CSS/JS output
    pub minify: bool,

    /// Extra file names to skip during the sibling scan
    pub exclude: Vec<String>,

    /// Markup inserted before `</body>` on every page (dev server reload client)
    pub dev_script: Option<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            root_config: PathBuf::from("config.json"),
            configs_dir: PathBuf::from("configs"),
            template: PathBuf::from("template.html"),
            output_dir: PathBuf::from("dist"),
            minify: true,
            exclude: vec![],
            dev_script: None,
        }
    }
}

impl BuildConfig {
    /// Resolve the default layout against a project directory.
    pub fn for_project(root: &Path) -> Self {
        let defaults = Self::default();
        Self {
            root_dir: root.to_path_buf(),
            root_config: root.join(defaults.root_config),
            configs_dir: root.join(defaults.configs_dir),
            template: root.join(defaults.template),
            output_dir: root.join(defaults.output_dir),
            ..defaults
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages generated, excluding the index listing
    pub pages: usize,

    /// Candidate files left out (unreadable, malformed, irrelevant, reserved or duplicate)
    pub skipped: usize,

    /// Pages built despite a lint warning
    pub warnings: usize,

    /// Built pages in discovery order
    pub records: Vec<PageRecord>,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that abort a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Failed to minify {path}: {source}")]
    Minify { path: String, source: MinifyError },

    #[error("Failed to read configs: {0}")]
    ReadError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// Static error page builder.
pub struct StaticBuilder {
    config: BuildConfig,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// The configuration this builder runs with.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build every page and the index listing.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let renderer = PageRenderer::from_file(&self.config.template)?;

        let mut records = Vec::new();
        let mut skipped = 0;
        let mut warnings = 0;

        // Root config: built whenever it exists, linted but never filtered
        if self.config.root_config.is_file() {
            let source = self.config.root_config.as_path();
            match load_config(source) {
                Ok(config) => {
                    if !has_error_status(&config) {
                        tracing::warn!(
                            "{}: no status object reports \"error\"",
                            source.display()
                        );
                        warnings += 1;
                    }
                    records.push(self.build_page(&renderer, source, &config)?);
                }
                Err(e) => {
                    tracing::warn!("Skipping {}", e);
                    skipped += 1;
                }
            }
        }

        for path in self.discover_candidates()? {
            let label = path.display().to_string();

            let config = match load_config(&path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Skipping {}", e);
                    skipped += 1;
                    continue;
                }
            };

            match validate(&config, &label) {
                Validation::Irrelevant => {
                    skipped += 1;
                    continue;
                }
                Validation::MissingErrorStatus => warnings += 1,
                Validation::Valid => {}
            }

            let filename = output_name(&path);
            if filename == INDEX_PAGE {
                tracing::warn!(
                    "Skipping {}: {} is reserved for the page listing",
                    label,
                    INDEX_PAGE
                );
                skipped += 1;
                continue;
            }

            if let Some(earlier) = records.iter().find(|r| r.filename == filename) {
                tracing::warn!(
                    "Skipping {}: {} was already built from {}",
                    label,
                    filename,
                    earlier.source
                );
                skipped += 1;
                continue;
            }

            records.push(self.build_page(&renderer, &path, &config)?);
        }

        self.write_index(&records)?;

        let duration = start.elapsed();

        Ok(BuildResult {
            pages: records.len(),
            skipped,
            warnings,
            records,
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Find candidate page configs, sorted by file name.
    ///
    /// Uses the configs directory when present, otherwise the project root's
    /// JSON files minus tooling manifests and the root config.
    fn discover_candidates(&self) -> Result<Vec<PathBuf>, BuildError> {
        if self.config.configs_dir.is_dir() {
            return json_files(&self.config.configs_dir);
        }

        tracing::debug!(
            "{} not found, scanning {} for configs",
            self.config.configs_dir.display(),
            self.config.root_dir.display()
        );

        let root_name = self.config.root_config.file_name();
        let candidates = json_files(&self.config.root_dir)?
            .into_iter()
            .filter(|path| {
                let Some(name) = path.file_name() else {
                    return false;
                };
                if Some(name) == root_name {
                    return false;
                }
                let name = name.to_string_lossy().into_owned();
                !EXCLUDED_MANIFESTS.contains(&name.as_str())
                    && !self.config.exclude.iter().any(|e| *e == name)
            })
            .collect();

        Ok(candidates)
    }

    /// Render, finish and write a single page.
    fn build_page(
        &self,
        renderer: &PageRenderer,
        source: &Path,
        config: &Config,
    ) -> Result<PageRecord, BuildError> {
        let filename = output_name(source);
        let fallback = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled");

        let html = renderer.render(config)?;
        let html = self.finish(html, &filename)?;
        self.write_output(&filename, &html)?;

        tracing::info!("Built {} -> {}", source.display(), filename);

        Ok(PageRecord {
            filename,
            title: page_title(config, fallback),
            source: source
                .strip_prefix(&self.config.root_dir)
                .unwrap_or(source)
                .display()
                .to_string(),
        })
    }

    /// Render the listing page and write it last.
    fn write_index(&self, records: &[PageRecord]) -> Result<(), BuildError> {
        let html = render_index(records)?;
        let html = self.finish(html, INDEX_PAGE)?;
        self.write_output(INDEX_PAGE, &html)?;

        tracing::info!("Indexed {} pages in {}", records.len(), INDEX_PAGE);
        Ok(())
    }

    /// Apply dev script injection and minification.
    fn finish(&self, html: String, filename: &str) -> Result<String, BuildError> {
        let html = match &self.config.dev_script {
            Some(snippet) => inject_before_body_end(&html, snippet),
            None => html,
        };

        if !self.config.minify {
            return Ok(html);
        }

        minify_html(&html).map_err(|source| BuildError::Minify {
            path: filename.to_string(),
            source,
        })
    }

    fn write_output(&self, filename: &str, html: &str) -> Result<(), BuildError> {
        let path = self.config.output_dir.join(filename);
        fs::write(&path, html)
            .map_err(|e| BuildError::WriteError(format!("{}: {}", path.display(), e)))
    }
}

/// `404.json` -> `404.html`.
pub fn output_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("page");
    format!("{}.html", stem)
}

/// JSON files directly inside `dir`, sorted by file name.
fn json_files(dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| BuildError::ReadError(e.to_string()))?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Insert `snippet` before the last `</body>`, or append it if there is none.
fn inject_before_body_end(html: &str, snippet: &str) -> String {
    match html.to_ascii_lowercase().rfind("</body>") {
        Some(i) => format!("{}{}{}", &html[..i], snippet, &html[i..]),
        None => format!("{}{}", html, snippet),
    }
}
