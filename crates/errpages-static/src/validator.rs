//! Soft checks on page configs.
//!
//! Nothing here rejects a page. Configs without a `title` or `error_code` are
//! treated as unrelated JSON and filtered out; relevant configs are linted for
//! an `error` status indicator.

use serde_json::Value;

use crate::loader::Config;

/// Status objects checked for an `"error"` state.
pub const STATUS_KEYS: [&str; 3] = ["browser_status", "cloudflare_status", "host_status"];

/// Outcome of validating a config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Not a page config; leave it out of the build.
    Irrelevant,
    /// A page config with at least one status in the error state.
    Valid,
    /// A page config that reports no error anywhere. Still built.
    MissingErrorStatus,
}

impl Validation {
    /// Whether the config should produce a page.
    pub fn should_build(self) -> bool {
        !matches!(self, Validation::Irrelevant)
    }
}

/// A config is a page config if it carries a `title` or an `error_code`.
pub fn is_relevant(config: &Config) -> bool {
    config.contains_key("title") || config.contains_key("error_code")
}

/// Whether any recognized status object has `status == "error"`.
pub fn has_error_status(config: &Config) -> bool {
    STATUS_KEYS.iter().any(|key| {
        config
            .get(*key)
            .and_then(|status| status.get("status"))
            .and_then(Value::as_str)
            == Some("error")
    })
}

/// Validate a config loaded from `source`, logging the lint warning if any.
pub fn validate(config: &Config, source: &str) -> Validation {
    if !is_relevant(config) {
        tracing::debug!("{} has no title or error_code, ignoring", source);
        return Validation::Irrelevant;
    }

    if has_error_status(config) {
        Validation::Valid
    } else {
        tracing::warn!(
            "{}: no status object reports \"error\" (checked {})",
            source,
            STATUS_KEYS.join(", ")
        );
        Validation::MissingErrorStatus
    }
}

/// Display title for a config: `title`, then `error_code`, then `fallback`.
pub fn page_title(config: &Config, fallback: &str) -> String {
    match config.get("title") {
        Some(Value::String(title)) => return title.clone(),
        Some(Value::Null) | None => {}
        Some(other) => return other.to_string(),
    }

    match config.get("error_code") {
        Some(Value::String(code)) => code.clone(),
        Some(Value::Null) | None => fallback.to_string(),
        Some(other) => other.to_string(),
    }
}
