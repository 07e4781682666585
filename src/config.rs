//! Run configuration.
//!
//! Handles loading, validating, and merging `makecatalog.toml`. Configuration
//! is layered: stock defaults are overridden by the config file, which is in
//! turn overridden by command-line flags.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! html_output = "output/catalog.html"
//! pdf_output = "output/catalog.pdf"   # "" skips PDF export
//! template_dir = ""                   # "" uses the built-in templates
//! engine = "chromium"                 # or "printpdf"
//! include_cover = true                # cover and back cover pages
//! images_dir = "images"               # relative to the HTML output directory
//!
//! [export]
//! timeout_secs = 30
//! paged_polyfill = ""                 # path or URL of a paged-media polyfill
//!
//! [export.margins_mm]
//! top = 14.0
//! right = 14.0
//! bottom = 16.0
//! left = 14.0
//!
//! [labels]
//! contents = "Contents"
//! models = "Models"
//! sku = "SKU"
//! price = "Price"
//! specifications = "Specifications"
//! construction = "Construction"
//! features = "Features"
//! contacts = "Contacts"
//! ```
//!
//! Config files are sparse; override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::export::Engine;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "makecatalog.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Settings for one run, after all layers are merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Where the composed HTML document is written.
    pub html_output: String,
    /// Where the PDF is written. Empty disables export.
    pub pdf_output: String,
    /// Directory of Tera templates. Empty selects the built-in set.
    pub template_dir: String,
    pub engine: Engine,
    /// Emit the cover and back cover pages.
    pub include_cover: bool,
    /// Images root, relative to the HTML output directory unless absolute.
    pub images_dir: String,
    pub export: ExportConfig,
    pub labels: Labels,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            html_output: "output/catalog.html".to_string(),
            pdf_output: "output/catalog.pdf".to_string(),
            template_dir: String::new(),
            engine: Engine::default(),
            include_cover: true,
            images_dir: "images".to_string(),
            export: ExportConfig::default(),
            labels: Labels::default(),
        }
    }
}

impl CatalogConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.html_output.trim().is_empty() {
            return Err(ConfigError::Validation(
                "html_output must not be empty".into(),
            ));
        }
        if self.export.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "export.timeout_secs must be greater than 0".into(),
            ));
        }
        let m = &self.export.margins_mm;
        for (side, value) in [
            ("top", m.top),
            ("right", m.right),
            ("bottom", m.bottom),
            ("left", m.left),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "export.margins_mm.{side} must be a non-negative number"
                )));
            }
        }
        Ok(())
    }

    pub fn html_path(&self) -> PathBuf {
        PathBuf::from(&self.html_output)
    }

    /// `None` when PDF export is disabled.
    pub fn pdf_path(&self) -> Option<PathBuf> {
        let trimmed = self.pdf_output.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }

    pub fn template_path(&self) -> Option<PathBuf> {
        let trimmed = self.template_dir.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }
}

/// PDF export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Upper bound on waiting for the browser to finish layout and print.
    pub timeout_secs: u64,
    /// Paged-media polyfill script (path or URL). Empty disables it.
    pub paged_polyfill: String,
    pub margins_mm: Margins,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            paged_polyfill: String::new(),
            margins_mm: Margins::default(),
        }
    }
}

/// Page margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 14.0,
            right: 14.0,
            bottom: 16.0,
            left: 14.0,
        }
    }
}

impl Margins {
    /// Render as a CSS `margin` shorthand for `@page`.
    pub fn to_css(&self) -> String {
        format!(
            "{}mm {}mm {}mm {}mm",
            self.top, self.right, self.bottom, self.left
        )
    }
}

/// Fixed interface strings. Catalog text is never translated; these are the
/// only words the renderer adds on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Labels {
    pub contents: String,
    pub models: String,
    pub sku: String,
    pub price: String,
    pub specifications: String,
    pub construction: String,
    pub features: String,
    pub contacts: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            contents: "Contents".to_string(),
            models: "Models".to_string(),
            sku: "SKU".to_string(),
            price: "Price".to_string(),
            specifications: "Specifications".to_string(),
            construction: "Construction".to_string(),
            features: "Features".to_string(),
            contacts: "Contacts".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer that the config file and CLI flags are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(CatalogConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge overlays onto a base value in order, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<CatalogConfig, ConfigError> {
    let merged = overlays.into_iter().fold(base, merge_toml);
    let config: CatalogConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective configuration.
///
/// `path` is the config file; when `required` is false a missing file just
/// means stock defaults. `overrides` (from CLI flags) wins over the file.
pub fn load_config(
    path: &Path,
    required: bool,
    overrides: Option<toml::Value>,
) -> Result<CatalogConfig, ConfigError> {
    let file = load_raw_config(path)?;
    if file.is_none() && required {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    if file.is_some() {
        tracing::debug!(path = %path.display(), "loaded config file");
    }
    resolve_config(stock_defaults_value()?, file.into_iter().chain(overrides))
}

/// Returns a fully-commented stock `makecatalog.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# MakeCatalog Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags override the values in this file.
# Unknown keys will cause an error.

# Where the composed HTML document is written.
html_output = "output/catalog.html"

# Where the PDF is written. Set to "" to produce HTML only.
pdf_output = "output/catalog.pdf"

# Directory of Tera templates (base.html, cover.html, toc.html, section.html,
# series.html, products.html, model.html, backcover.html).
# Leave empty to use the built-in templates.
template_dir = ""

# PDF engine: "chromium" (headless browser, full CSS) or
# "printpdf" (no browser needed, simpler layout, no images).
engine = "chromium"

# Emit the cover and back cover pages.
include_cover = true

# Images root. Relative paths are resolved against the HTML output directory.
images_dir = "images"

# ---------------------------------------------------------------------------
# PDF export
# ---------------------------------------------------------------------------
[export]
# Seconds to wait for the browser to lay out and print the document.
timeout_secs = 30

# Paged-media polyfill script (path or URL). When set, the browser waits for
# the polyfill to finish and the table of contents shows real page numbers.
paged_polyfill = ""

# Page margins in millimetres.
[export.margins_mm]
top = 14.0
right = 14.0
bottom = 16.0
left = 14.0

# ---------------------------------------------------------------------------
# Interface labels
# ---------------------------------------------------------------------------
[labels]
contents = "Contents"
models = "Models"
sku = "SKU"
price = "Price"
specifications = "Specifications"
construction = "Construction"
features = "Features"
contacts = "Contacts"
"##
}
