//! Template sets.
//!
//! Stage views become HTML through one of two template sets:
//!
//! - [`TemplateSet::Builtin`]: compiled-in [maud](https://maud.lambda.xyz/)
//!   templates. Type-checked at build time, automatic escaping.
//! - [`TemplateSet::from_dir`]: a directory of [Tera](https://keats.github.io/tera/)
//!   templates for catalogs that need their own layout.
//!
//! ## Template Directory
//!
//! ```text
//! templates/
//! ├── base.html        # document shell; receives `document`, `theme`, `labels`
//! ├── cover.html       # each stage template receives `page`, `theme`, `labels`
//! ├── toc.html
//! ├── section.html
//! ├── series.html
//! ├── products.html
//! ├── model.html
//! ├── backcover.html
//! └── _macros.html     # any other *.html is loaded too, for include/import
//! ```
//!
//! Files ending in `.html` are autoescaped. Fields named `*_html` already
//! hold sanitized markup and must be output with `| safe`.

use crate::stages::{StageKind, View};
use crate::theme::Theme;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use thiserror::Error;

/// Document shell template in a template directory.
pub const BASE_TEMPLATE: &str = "base.html";

/// Must run before the paged-media polyfill loads; the layout script hooks
/// its `after` callback.
pub const PAGED_CONFIG: &str = "window.PagedConfig = { auto: true };";

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("cannot read template directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("template {template} is malformed: {message}")]
    Malformed { template: String, message: String },
    #[error("missing template {template} for stage {stage}")]
    Missing {
        stage: &'static str,
        template: &'static str,
    },
    #[error("rendering stage {stage} with {template} failed: {message}")]
    Render {
        stage: &'static str,
        template: &'static str,
        message: String,
    },
}

/// Context of the document shell, exposed to `base.html` as `document`.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    pub lang: String,
    pub title: String,
    /// Complete stylesheet (theme variables, base styles, page margins).
    pub css: String,
    /// Script marking the document ready for printing.
    pub script: String,
    /// Paged-media polyfill `src`, when enabled.
    pub polyfill: Option<String>,
    /// All page fragments, already wrapped.
    pub body: String,
}

pub enum TemplateSet {
    Builtin,
    Directory { dir: PathBuf, tera: Box<Tera> },
}

impl TemplateSet {
    /// Load every `*.html` in `dir`. The shell and all stage templates must
    /// be present.
    pub fn from_dir(dir: &Path) -> Result<Self, TemplateError> {
        let dir_error = |source| TemplateError::Directory {
            path: dir.to_path_buf(),
            source,
        };
        let mut names = Vec::new();
        for entry in fs::read_dir(dir).map_err(dir_error)? {
            let path = entry.map_err(dir_error)?.path();
            if path.is_file() && path.extension().is_some_and(|e| e == "html") {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();

        let required = std::iter::once(("document", BASE_TEMPLATE))
            .chain(StageKind::ALL.iter().map(|k| (k.as_str(), k.template_name())));
        for (stage, template) in required {
            if !names.iter().any(|n| n == template) {
                return Err(TemplateError::Missing { stage, template });
            }
        }

        let mut sources = Vec::with_capacity(names.len());
        for name in &names {
            let path = dir.join(name);
            let content = fs::read_to_string(&path)
                .map_err(|source| TemplateError::Directory { path, source })?;
            sources.push((name.clone(), content));
        }

        let mut tera = Tera::default();
        tera.add_raw_templates(sources).map_err(|e| {
            let message = error_chain(&e);
            TemplateError::Malformed {
                template: blame(&names, &message).unwrap_or_else(|| dir.display().to_string()),
                message,
            }
        })?;

        tracing::debug!(dir = %dir.display(), templates = names.len(), "loaded template directory");
        Ok(TemplateSet::Directory {
            dir: dir.to_path_buf(),
            tera: Box::new(tera),
        })
    }

    pub fn describe(&self) -> String {
        match self {
            TemplateSet::Builtin => "built-in".to_string(),
            TemplateSet::Directory { dir, .. } => dir.display().to_string(),
        }
    }

    /// Render one stage view.
    pub fn render(&self, kind: StageKind, view: &View, theme: &Theme) -> Result<String, TemplateError> {
        match self {
            TemplateSet::Builtin => Ok(view.builtin_markup(theme).into_string()),
            TemplateSet::Directory { tera, .. } => {
                let mut context = Context::new();
                context.insert("page", view);
                context.insert("theme", theme);
                context.insert("labels", &theme.labels);
                render_tera(tera, kind.as_str(), kind.template_name(), &context)
            }
        }
    }

    /// Render the complete document around the wrapped fragments.
    pub fn render_document(&self, document: &DocumentView, theme: &Theme) -> Result<String, TemplateError> {
        match self {
            TemplateSet::Builtin => Ok(builtin_document(document).into_string()),
            TemplateSet::Directory { tera, .. } => {
                let mut context = Context::new();
                context.insert("document", document);
                context.insert("theme", theme);
                context.insert("labels", &theme.labels);
                render_tera(tera, "document", BASE_TEMPLATE, &context)
            }
        }
    }
}

fn render_tera(
    tera: &Tera,
    stage: &'static str,
    template: &'static str,
    context: &Context,
) -> Result<String, TemplateError> {
    tera.render(template, context)
        .map_err(|e| TemplateError::Render {
            stage,
            template,
            message: error_chain(&e),
        })
}

/// Tera keeps the useful part of a failure in the source chain.
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn blame(names: &[String], message: &str) -> Option<String> {
    names
        .iter()
        .find(|name| message.contains(&format!("'{name}'")) || message.contains(&format!("\"{name}\"")))
        .cloned()
}

fn builtin_document(document: &DocumentView) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(document.lang) {
            head {
                meta charset="UTF-8";
                title { (document.title) }
                style { (PreEscaped(&document.css)) }
                @if let Some(src) = &document.polyfill {
                    script { (PreEscaped(PAGED_CONFIG)) }
                    script src=(src) {}
                }
            }
            body {
                (PreEscaped(&document.body))
                script { (PreEscaped(&document.script)) }
            }
        }
    }
}
