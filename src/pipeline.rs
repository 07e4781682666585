//! End-to-end run: catalog JSON → HTML file → PDF file.
//!
//! ```text
//! load ──▶ compose ──▶ write HTML ──▶ export (only when pdf_output is set)
//! ```
//!
//! Nothing is written until composition has succeeded, so a bad catalog or a
//! broken template directory leaves the output paths untouched. A failed
//! export happens after the HTML is on disk and leaves it there.

use crate::assets::{AssetResolver, AssetWarning};
use crate::catalog::{self, Catalog, ParseError};
use crate::compose::{self, ComposeError, ComposeOptions, ComposedDocument, PageIndex};
use crate::config::CatalogConfig;
use crate::export::{self, ExportError, ExportOptions, PdfBackend};
use crate::template::{TemplateError, TemplateSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("PDF export failed (HTML was written): {0}")]
    Export(#[from] ExportError),
}

/// What a composed catalog contains.
#[derive(Debug, Clone)]
pub struct Summary {
    pub title: String,
    pub sections: usize,
    pub series: usize,
    pub models: usize,
    /// Page fragments in the document, TOC included.
    pub pages: usize,
    pub templates: String,
    pub index: PageIndex,
    pub warnings: Vec<AssetWarning>,
}

#[derive(Debug, Clone)]
pub struct PdfOutput {
    pub path: PathBuf,
    pub bytes: u64,
    pub engine: &'static str,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: Summary,
    pub html_path: PathBuf,
    pub html_bytes: u64,
    /// `None` when export is disabled.
    pub pdf: Option<PdfOutput>,
}

/// Full run with the engine selected in `config`.
pub fn run(json_path: &Path, config: &CatalogConfig) -> Result<RunReport, PipelineError> {
    let backend = config.engine.backend();
    run_with_backend(json_path, config, backend.as_ref())
}

/// Full run with an explicit PDF backend.
pub fn run_with_backend(
    json_path: &Path,
    config: &CatalogConfig,
    backend: &dyn PdfBackend,
) -> Result<RunReport, PipelineError> {
    let catalog = catalog::load(json_path)?;
    let (document, summary) = compose_catalog(&catalog, config)?;

    let html_path = config.html_path();
    export::write_atomic(&html_path, document.html.as_bytes()).map_err(|source| {
        PipelineError::Io {
            path: html_path.clone(),
            source,
        }
    })?;
    tracing::info!(path = %html_path.display(), bytes = document.html.len(), "html written");

    let pdf = match config.pdf_path() {
        Some(pdf_path) => {
            let options = ExportOptions {
                timeout: Duration::from_secs(config.export.timeout_secs),
                margins: config.export.margins_mm,
            };
            let bytes = export::export(&document.html, &html_path, backend, &pdf_path, &options)?;
            Some(PdfOutput {
                path: pdf_path,
                bytes,
                engine: backend.name(),
            })
        }
        None => {
            tracing::debug!("pdf_output is empty, skipping export");
            None
        }
    };

    Ok(RunReport {
        summary,
        html_bytes: document.html.len() as u64,
        html_path,
        pdf,
    })
}

/// Load and compose without writing anything.
pub fn check(json_path: &Path, config: &CatalogConfig) -> Result<Summary, PipelineError> {
    let catalog = catalog::load(json_path)?;
    let (_, summary) = compose_catalog(&catalog, config)?;
    Ok(summary)
}

fn compose_catalog(
    catalog: &Catalog,
    config: &CatalogConfig,
) -> Result<(ComposedDocument, Summary), PipelineError> {
    let templates = match config.template_path() {
        Some(dir) => TemplateSet::from_dir(&dir)?,
        None => TemplateSet::Builtin,
    };
    let assets = AssetResolver::for_output(&config.html_path(), Path::new(&config.images_dir));
    let polyfill = config.export.paged_polyfill.trim();
    let options = ComposeOptions {
        include_cover: config.include_cover,
        labels: &config.labels,
        templates: &templates,
        assets: &assets,
        margins: config.export.margins_mm,
        paged_polyfill: (!polyfill.is_empty()).then(|| polyfill.to_string()),
    };
    let document = compose::compose(catalog, &options)?;

    let summary = Summary {
        title: catalog.settings.title.clone(),
        sections: catalog.sections.len(),
        series: catalog.series_count(),
        models: catalog.model_count(),
        pages: document.fragments.len(),
        templates: templates.describe(),
        index: document.index.clone(),
        warnings: document.warnings.clone(),
    };
    Ok((document, summary))
}
