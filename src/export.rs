//! PDF export.
//!
//! The composed HTML document is turned into PDF bytes by a [`PdfBackend`].
//! Two engines are available, selected by [`Engine`]:
//!
//! | Engine | Backend | Notes |
//! |---|---|---|
//! | `chromium` | [`ChromiumBackend`] | Headless Chrome print-to-PDF. Full CSS, images, paged-media polyfill. |
//! | `printpdf` | [`PrintpdfBackend`] | Pure Rust HTML layout. No browser needed; narrower CSS, images are not embedded. |
//!
//! Whichever engine runs, the output is written atomically: the bytes go to a
//! temporary file next to the target and are renamed into place only once
//! complete, so a failed export never leaves a partial PDF behind.

use crate::config::Margins;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::util::Timeout;
use headless_chrome::{Browser, LaunchOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Attribute the layout script sets on `<html>` once the document is ready.
pub const LAYOUT_READY_SELECTOR: &str = "html[data-layout-ready]";

const MM_PER_INCH: f64 = 25.4;
const A4_WIDTH_IN: f64 = 210.0 / MM_PER_INCH;
const A4_HEIGHT_IN: f64 = 297.0 / MM_PER_INCH;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{engine} engine unavailable: {message}")]
    Unavailable {
        engine: &'static str,
        message: String,
    },
    #[error("{engine} engine timed out after {secs}s waiting for the document layout")]
    Timeout { engine: &'static str, secs: u64 },
    #[error("{engine} engine failed: {message}")]
    Engine {
        engine: &'static str,
        message: String,
    },
    #[error("{engine} engine returned no PDF data")]
    InvalidOutput { engine: &'static str },
}

/// Available PDF engines.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Chromium,
    Printpdf,
}

impl Engine {
    pub fn as_str(self) -> &'static str {
        match self {
            Engine::Chromium => "chromium",
            Engine::Printpdf => "printpdf",
        }
    }

    pub fn backend(self) -> Box<dyn PdfBackend> {
        match self {
            Engine::Chromium => Box::new(ChromiumBackend),
            Engine::Printpdf => Box::new(PrintpdfBackend),
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Engine::Chromium),
            "printpdf" => Ok(Engine::Printpdf),
            other => Err(format!(
                "unknown engine \"{other}\" (expected chromium or printpdf)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    /// Upper bound on waiting for layout and printing.
    pub timeout: Duration,
    pub margins: Margins,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            margins: Margins::default(),
        }
    }
}

/// Trait for PDF engines.
///
/// `html` is the complete document and `html_path` is where the same document
/// has been written; engines that load by URL use the file so relative image
/// references resolve.
pub trait PdfBackend {
    fn name(&self) -> &'static str;

    fn render(
        &self,
        html: &str,
        html_path: &Path,
        options: &ExportOptions,
    ) -> Result<Vec<u8>, ExportError>;
}

/// Render `html` with `backend` and write the PDF atomically to `output`.
///
/// Returns the size of the written file in bytes.
pub fn export(
    html: &str,
    html_path: &Path,
    backend: &dyn PdfBackend,
    output: &Path,
    options: &ExportOptions,
) -> Result<u64, ExportError> {
    let engine = backend.name();
    let started = Instant::now();
    let bytes = backend.render(html, html_path, options)?;
    if !bytes.starts_with(b"%PDF") {
        return Err(ExportError::InvalidOutput { engine });
    }
    write_atomic(output, &bytes)?;
    tracing::info!(
        engine,
        output = %output.display(),
        bytes = bytes.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "pdf exported"
    );
    Ok(bytes.len() as u64)
}

/// Write `bytes` to `path` through a temporary file in the same directory.
///
/// Creates the parent directory if needed. On any error the target is left as
/// it was.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ============================================================================
// Chromium
// ============================================================================

/// Prints through a headless Chrome launched for this call only.
///
/// The browser process is owned by the [`Browser`] value and killed when it
/// drops, on success and on every error path.
pub struct ChromiumBackend;

impl ChromiumBackend {
    const NAME: &'static str = "chromium";

    fn error(message: impl fmt::Display) -> ExportError {
        ExportError::Engine {
            engine: Self::NAME,
            message: message.to_string(),
        }
    }

    /// Only the wait running out is a timeout; a closed tab or a protocol
    /// error while polling is an engine failure.
    fn wait_error(err: anyhow::Error, timeout: Duration) -> ExportError {
        if err.downcast_ref::<Timeout>().is_some() {
            ExportError::Timeout {
                engine: Self::NAME,
                secs: timeout.as_secs(),
            }
        } else {
            Self::error(format!("waiting for {LAYOUT_READY_SELECTOR}: {err:#}"))
        }
    }
}

impl PdfBackend for ChromiumBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn render(
        &self,
        _html: &str,
        html_path: &Path,
        options: &ExportOptions,
    ) -> Result<Vec<u8>, ExportError> {
        let url = file_url(html_path)?;

        let browser = Browser::new(LaunchOptions {
            headless: true,
            idle_browser_timeout: options.timeout + Duration::from_secs(30),
            ..Default::default()
        })
        .map_err(|e| ExportError::Unavailable {
            engine: Self::NAME,
            message: format!("{e:#}"),
        })?;

        let tab = browser.new_tab().map_err(|e| Self::error(format!("{e:#}")))?;
        tab.set_default_timeout(options.timeout);
        tab.navigate_to(&url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| Self::error(format!("cannot open {url}: {e:#}")))?;

        tab.wait_for_element_with_custom_timeout(LAYOUT_READY_SELECTOR, options.timeout)
            .map_err(|e| Self::wait_error(e, options.timeout))?;
        tracing::debug!(%url, "layout ready, printing");

        let m = options.margins;
        tab.print_to_pdf(Some(PrintToPdfOptions {
            print_background: Some(true),
            prefer_css_page_size: Some(true),
            paper_width: Some(A4_WIDTH_IN),
            paper_height: Some(A4_HEIGHT_IN),
            margin_top: Some(m.top / MM_PER_INCH),
            margin_right: Some(m.right / MM_PER_INCH),
            margin_bottom: Some(m.bottom / MM_PER_INCH),
            margin_left: Some(m.left / MM_PER_INCH),
            ..Default::default()
        }))
        .map_err(|e| Self::error(format!("{e:#}")))
    }
}

fn file_url(path: &Path) -> Result<String, ExportError> {
    let absolute = fs::canonicalize(path)?;
    let display = absolute.to_string_lossy().replace('\\', "/").replace(' ', "%20");
    if display.starts_with('/') {
        Ok(format!("file://{display}"))
    } else {
        Ok(format!("file:///{display}"))
    }
}

// ============================================================================
// printpdf
// ============================================================================

/// Lays out the HTML string in-process with `printpdf`.
pub struct PrintpdfBackend;

impl PdfBackend for PrintpdfBackend {
    fn name(&self) -> &'static str {
        "printpdf"
    }

    fn render(
        &self,
        html: &str,
        _html_path: &Path,
        _options: &ExportOptions,
    ) -> Result<Vec<u8>, ExportError> {
        let mut warnings = Vec::new();
        // No images or fonts are embedded: references stay unresolved.
        let doc = printpdf::PdfDocument::from_html(
            html,
            &BTreeMap::new(),
            &BTreeMap::new(),
            &printpdf::GeneratePdfOptions::default(),
            &mut warnings,
        )
        .map_err(|message| ExportError::Engine {
            engine: "printpdf",
            message,
        })?;
        let bytes = doc.save(&printpdf::PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            tracing::debug!(count = warnings.len(), "printpdf reported layout warnings");
        }
        Ok(bytes)
    }
}
