//! Document composition.
//!
//! Turns a [`Catalog`] into one complete HTML document:
//!
//! 1. **Plan**: decide the page sequence:
//!    cover → contents → per section: divider, then per series: series page,
//!    product grid (series with models), model pages (if enabled) → back cover.
//! 2. **Pass one**: render every stage except the table of contents, whose
//!    slot is reserved. Record section and series anchors with their final
//!    ordinal positions in a [`PageIndex`].
//! 3. **Pass two**: render the table of contents from the index and splice it
//!    into the reserved slot.
//! 4. **Shell**: wrap each fragment in `<section class="page page-{kind}" id="{anchor}">`
//!    and embed them in the document shell with the theme stylesheet and the
//!    layout-ready script.
//!
//! Composition is deterministic: the same catalog and options give
//! byte-identical HTML.

use crate::assets::{AssetResolver, AssetWarning};
use crate::catalog::Catalog;
use crate::config::{Labels, Margins};
use crate::stages::{Fragment, RenderContext, Stage, StageKind, card_anchor};
use crate::template::{DocumentView, TemplateError, TemplateSet};
use crate::theme::{self, Theme};
use maud::{PreEscaped, html};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

const CSS_STATIC: &str = include_str!("../static/catalog.css");
const LAYOUT_JS: &str = include_str!("../static/layout.js");

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
    #[error("anchor \"{anchor}\" produced twice ({first} and {second}); duplicate codes")]
    DuplicateAnchor {
        anchor: String,
        first: &'static str,
        second: &'static str,
    },
}

/// Whether an index entry points at a section divider or a series page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryLevel {
    Section,
    Series,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub level: EntryLevel,
    pub anchor: String,
    pub title: String,
    /// 1-based position of the target fragment in the final document.
    pub ordinal: usize,
}

/// Section and series anchors in document order, as recorded by pass one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageIndex {
    pub entries: Vec<IndexEntry>,
}

pub struct ComposeOptions<'a> {
    pub include_cover: bool,
    pub labels: &'a Labels,
    pub templates: &'a TemplateSet,
    pub assets: &'a AssetResolver,
    pub margins: Margins,
    /// `src` of the paged-media polyfill, if one should be loaded.
    pub paged_polyfill: Option<String>,
}

#[derive(Debug)]
pub struct ComposedDocument {
    pub html: String,
    pub index: PageIndex,
    /// Fragments in document order, before wrapping.
    pub fragments: Vec<Fragment>,
    pub warnings: Vec<AssetWarning>,
}

impl ComposedDocument {
    pub fn count(&self, kind: StageKind) -> usize {
        self.fragments.iter().filter(|f| f.kind == kind).count()
    }
}

pub fn compose(catalog: &Catalog, options: &ComposeOptions<'_>) -> Result<ComposedDocument, ComposeError> {
    let theme = Theme::new(&catalog.settings, options.labels);
    let ctx = RenderContext {
        settings: &catalog.settings,
        theme: &theme,
        assets: options.assets,
        templates: options.templates,
    };

    let (plan, toc_slot) = plan_stages(catalog, options.include_cover);
    check_anchors(catalog, &plan)?;
    let index = build_index(&plan, toc_slot);

    // Pass one: everything but the table of contents.
    let mut fragments = plan
        .iter()
        .map(|stage| stage.render(&ctx))
        .collect::<Result<Vec<_>, _>>()?;

    // Pass two: contents from the index, into the reserved slot.
    let toc = Stage::Toc(&index).render(&ctx)?;
    fragments.insert(toc_slot, toc);

    let body: String = fragments.iter().map(wrap).collect();
    let document = DocumentView {
        lang: theme.lang.clone(),
        title: document_title(&theme),
        css: stylesheet(&theme, &options.margins),
        script: LAYOUT_JS.to_string(),
        polyfill: options.paged_polyfill.clone(),
        body,
    };
    let html = options.templates.render_document(&document, &theme)?;

    let warnings = options.assets.take_warnings();
    tracing::debug!(
        fragments = fragments.len(),
        bytes = html.len(),
        warnings = warnings.len(),
        "document composed"
    );
    Ok(ComposedDocument {
        html,
        index,
        fragments,
        warnings,
    })
}

/// Page sequence without the table of contents, and the position it goes to.
fn plan_stages(catalog: &Catalog, include_cover: bool) -> (Vec<Stage<'_>>, usize) {
    let mut stages = Vec::new();
    if include_cover {
        stages.push(Stage::Cover);
    }
    let toc_slot = stages.len();
    let model_pages = catalog.settings.generate_model_pages;
    for section in &catalog.sections {
        stages.push(Stage::SectionDivider(section));
        for series in &section.series {
            stages.push(Stage::SeriesPage(section, series));
            if !series.models.is_empty() {
                stages.push(Stage::ProductGrid(section, series));
            }
            if model_pages {
                stages.extend(series.models.iter().map(|m| Stage::ModelSpec(section, series, m)));
            }
        }
    }
    if include_cover {
        stages.push(Stage::BackCover);
    }
    (stages, toc_slot)
}

fn build_index(plan: &[Stage<'_>], toc_slot: usize) -> PageIndex {
    let ordinal = |i: usize| if i >= toc_slot { i + 2 } else { i + 1 };
    let entries = plan
        .iter()
        .enumerate()
        .filter_map(|(i, stage)| match stage {
            Stage::SectionDivider(section) => Some(IndexEntry {
                level: EntryLevel::Section,
                anchor: stage.anchor(),
                title: section.title.clone(),
                ordinal: ordinal(i),
            }),
            Stage::SeriesPage(_, series) => Some(IndexEntry {
                level: EntryLevel::Series,
                anchor: stage.anchor(),
                title: series.name.clone(),
                ordinal: ordinal(i),
            }),
            _ => None,
        })
        .collect();
    PageIndex { entries }
}

/// Every `id` the document will carry must be unique, including model cards.
fn check_anchors(catalog: &Catalog, plan: &[Stage<'_>]) -> Result<(), ComposeError> {
    let mut seen: HashMap<String, &'static str> = HashMap::new();
    seen.insert("toc".to_string(), StageKind::Toc.as_str());

    let cards = catalog.sections.iter().flat_map(|section| {
        section.series.iter().flat_map(move |series| {
            series
                .models
                .iter()
                .map(move |model| (card_anchor(section, series, model), "card"))
        })
    });
    let pages = plan.iter().map(|stage| (stage.anchor(), stage.kind().as_str()));

    for (anchor, kind) in pages.chain(cards) {
        if let Some(&first) = seen.get(&anchor) {
            return Err(ComposeError::DuplicateAnchor {
                anchor,
                first,
                second: kind,
            });
        }
        seen.insert(anchor, kind);
    }
    Ok(())
}

fn wrap(fragment: &Fragment) -> String {
    html! {
        section class={ "page page-" (fragment.kind.as_str()) } id=(fragment.anchor) {
            (PreEscaped(&fragment.html))
        }
    }
    .into_string()
}

fn document_title(theme: &Theme) -> String {
    match (theme.title.is_empty(), theme.year.is_empty()) {
        (false, false) if !theme.title.contains(&theme.year) => {
            format!("{} {}", theme.title, theme.year)
        }
        (true, _) => theme.company.name.clone(),
        _ => theme.title.clone(),
    }
}

fn stylesheet(theme: &Theme, margins: &Margins) -> String {
    format!(
        "{}\n\n@page {{\n    size: A4;\n    margin: {};\n}}\n\n{}",
        theme::generate_theme_css(theme),
        margins.to_css(),
        CSS_STATIC
    )
}
