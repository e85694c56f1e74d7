//! Project configuration file (errpages.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use errpages_static::BuildConfig;
use serde::Deserialize;

/// Configuration file structure (errpages.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ProjectConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub build: BuildSettings,
}

#[derive(Debug, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_root_config")]
    pub root_config: String,
    #[serde(default = "default_configs_dir")]
    pub configs_dir: String,
    #[serde(default = "default_template")]
    pub template: String,
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root_config: default_root_config(),
            configs_dir: default_configs_dir(),
            template: default_template(),
            output: default_output(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_minify")]
    pub minify: bool,
    /// Extra JSON file names that are never page configs
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            minify: default_minify(),
            exclude: vec![],
        }
    }
}

fn default_root_config() -> String {
    "config.json".to_string()
}
fn default_configs_dir() -> String {
    "configs".to_string()
}
fn default_template() -> String {
    "template.html".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_minify() -> bool {
    true
}

impl ProjectConfig {
    /// Load configuration from `path` if it exists.
    /// Returns an error if the file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Turn the file settings into builder settings.
    pub fn build_config(&self) -> BuildConfig {
        BuildConfig {
            root_dir: PathBuf::from("."),
            root_config: PathBuf::from(&self.paths.root_config),
            configs_dir: PathBuf::from(&self.paths.configs_dir),
            template: PathBuf::from(&self.paths.template),
            output_dir: PathBuf::from(&self.paths.output),
            minify: self.build.minify,
            exclude: self.build.exclude.clone(),
            dev_script: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let temp = tempdir().unwrap();
        let config = ProjectConfig::load(&temp.path().join("errpages.toml")).unwrap();
        let build = config.build_config();

        assert_eq!(build.configs_dir, PathBuf::from("configs"));
        assert_eq!(build.template, PathBuf::from("template.html"));
        assert_eq!(build.output_dir, PathBuf::from("dist"));
        assert!(build.minify);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("errpages.toml");
        fs::write(
            &path,
            "[paths]\noutput = \"public\"\n\n[build]\nminify = false\nexclude = [\"renovate.json\"]\n",
        )
        .unwrap();

        let build = ProjectConfig::load(&path).unwrap().build_config();

        assert_eq!(build.output_dir, PathBuf::from("public"));
        assert_eq!(build.root_config, PathBuf::from("config.json"));
        assert!(!build.minify);
        assert_eq!(build.exclude, vec!["renovate.json".to_string()]);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("errpages.toml");
        fs::write(&path, "[paths\noutput = ").unwrap();

        assert!(ProjectConfig::load(&path).is_err());
    }
}
