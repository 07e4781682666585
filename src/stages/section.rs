//! Section divider: title, lead line, intro text and the list of series.

use super::{RenderContext, image, series_anchor};
use crate::assets::AssetRef;
use crate::catalog::Section;
use crate::markdown;
use crate::theme::Theme;
use maud::{Markup, PreEscaped, html};
use serde::Serialize;

const LEAD_MAX_CHARS: usize = 160;

#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub code: String,
    pub title: String,
    /// First line of the intro as plain text.
    pub lead: String,
    pub intro_html: String,
    pub cover: Option<AssetRef>,
    pub series: Vec<SeriesLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesLink {
    pub href: String,
    pub name: String,
}

pub fn build_view(section: &Section, ctx: &RenderContext<'_>) -> SectionView {
    let cover = ctx
        .settings
        .section_cover_pattern
        .as_deref()
        .map(|pattern| ctx.assets.resolve(&pattern.replace("{code}", &section.code)));

    SectionView {
        code: section.code.clone(),
        title: section.title.clone(),
        lead: markdown::first_line_plain(&section.intro_md, LEAD_MAX_CHARS),
        intro_html: markdown::render(&section.intro_md),
        cover,
        series: section
            .series
            .iter()
            .map(|series| SeriesLink {
                href: format!("#{}", series_anchor(section, series)),
                name: series.name.clone(),
            })
            .collect(),
    }
}

pub fn markup(view: &SectionView, _theme: &Theme) -> Markup {
    html! {
        @if let Some(cover) = &view.cover {
            (image(cover, &view.title, "section-cover"))
        }
        header.section-header {
            h1.section-title { (view.title) }
            @if !view.lead.is_empty() {
                p.section-lead { (view.lead) }
            }
        }
        @if !view.intro_html.is_empty() {
            div.section-intro { (PreEscaped(&view.intro_html)) }
        }
        @if !view.series.is_empty() {
            ul.section-series {
                @for link in &view.series {
                    li { a href=(link.href) { (link.name) } }
                }
            }
        }
    }
}
