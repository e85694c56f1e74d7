//! Static builder for error pages.
//!
//! Loads JSON page configs, binds each into a shared template, minifies the
//! result and writes one HTML file per config plus an index listing.

pub mod builder;
pub mod index;
pub mod loader;
pub mod minify;
pub mod renderer;
pub mod validator;

pub use builder::{BuildConfig, BuildError, BuildResult, StaticBuilder};
pub use index::PageRecord;
pub use loader::{load_config, Config, LoadError};
pub use minify::{minify_html, MinifyError};
pub use renderer::{PageRenderer, RenderError};
pub use validator::Validation;
