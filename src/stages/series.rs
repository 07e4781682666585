//! Series page.
//!
//! The descriptive page of a product line: hero photo and banner, summary,
//! construction notes, feature list, media gallery, every data table, and an
//! index of the series models linking to their product cards. Prices are not
//! shown here; each model's price appears once, on its product card.
//!
//! Table cells are laid out by the declared columns: for each row, one cell
//! per column in declaration order. Missing keys give empty cells and keys not
//! declared as columns are dropped.

use super::{RenderContext, card_anchor, image};
use crate::assets::AssetRef;
use crate::catalog::{Media, Section, Series, Table, display_value};
use crate::markdown;
use crate::theme::Theme;
use maud::{Markup, PreEscaped, html};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SeriesView {
    pub code: String,
    pub name: String,
    pub section_title: String,
    pub tags: Vec<String>,
    pub hero: Option<AssetRef>,
    pub banner_html: String,
    pub summary_html: String,
    pub construction_html: String,
    pub features: Vec<String>,
    pub media: Vec<MediaView>,
    pub tables: Vec<TableView>,
    pub models: Vec<ModelLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaView {
    pub kind: &'static str,
    /// Shown inline as a figure (photo, drawing, curve) rather than linked.
    pub visual: bool,
    pub file: AssetRef,
    pub caption: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub kind: &'static str,
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub notes_html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelLink {
    pub sku: String,
    pub name: String,
    pub href: String,
}

pub fn build_view(section: &Section, series: &Series, ctx: &RenderContext<'_>) -> SeriesView {
    let hero = series.hero.as_ref();
    SeriesView {
        code: series.code.clone(),
        name: series.name.clone(),
        section_title: section.title.clone(),
        tags: series.tags.clone(),
        hero: ctx
            .assets
            .resolve_opt(hero.and_then(|h| h.photo.as_deref())),
        banner_html: markdown::render(hero.map(|h| h.banner_md.as_str()).unwrap_or_default()),
        summary_html: markdown::render(&series.summary_md),
        construction_html: markdown::render(&series.construction_md),
        features: series.features.clone(),
        media: series
            .media
            .iter()
            .filter_map(|m| media_view(m, ctx))
            .collect(),
        tables: series.tables.iter().map(table_view).collect(),
        models: series
            .models
            .iter()
            .map(|model| ModelLink {
                sku: model.sku.clone(),
                name: model.name.clone(),
                href: format!("#{}", card_anchor(section, series, model)),
            })
            .collect(),
    }
}

/// Media entries without a file have nothing to show and are skipped.
fn media_view(media: &Media, ctx: &RenderContext<'_>) -> Option<MediaView> {
    let file = ctx.assets.resolve(media.file.as_deref()?);
    Some(MediaView {
        kind: media.kind.as_str(),
        visual: media.kind.is_visual(),
        file,
        caption: media.caption.clone(),
    })
}

pub fn table_view(table: &Table) -> TableView {
    TableView {
        kind: table.kind.as_str(),
        title: table.title.clone(),
        headers: table.columns.iter().map(|c| c.label().to_string()).collect(),
        rows: table
            .rows
            .iter()
            .map(|row| {
                table
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(i, column)| row.cell(i, column))
                    .collect()
            })
            .collect(),
        notes_html: markdown::render(&table.notes_md),
    }
}

pub fn markup(view: &SeriesView, theme: &Theme) -> Markup {
    let labels = &theme.labels;
    html! {
        header.series-header {
            p.series-section { (view.section_title) }
            h1.series-name { (view.name) }
            @if !view.tags.is_empty() {
                ul.series-tags {
                    @for tag in &view.tags {
                        li { (tag) }
                    }
                }
            }
        }
        @if let Some(hero) = &view.hero {
            figure.series-hero { (image(hero, &view.name, "hero")) }
        }
        @if !view.banner_html.is_empty() {
            div.series-banner { (PreEscaped(&view.banner_html)) }
        }
        @if !view.summary_html.is_empty() {
            div.series-summary { (PreEscaped(&view.summary_html)) }
        }
        @if !view.construction_html.is_empty() {
            section.series-construction {
                h2 { (labels.construction) }
                (PreEscaped(&view.construction_html))
            }
        }
        @if !view.features.is_empty() {
            section.series-features {
                h2 { (labels.features) }
                ul {
                    @for feature in &view.features {
                        li { (feature) }
                    }
                }
            }
        }
        @if !view.media.is_empty() {
            div.series-media {
                @for media in &view.media {
                    (media_markup(media))
                }
            }
        }
        @for table in &view.tables {
            (table_markup(table))
        }
        @if !view.models.is_empty() {
            section.series-models {
                h2 { (labels.models) }
                ul.model-index {
                    @for model in &view.models {
                        li {
                            a href=(model.href) {
                                span.sku { (model.sku) }
                                " "
                                span.model-name { (model.name) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn media_markup(media: &MediaView) -> Markup {
    html! {
        @if media.visual {
            figure class={ "media media-" (media.kind) } {
                (image(&media.file, &media.caption, "media-file"))
                @if !media.caption.is_empty() {
                    figcaption { (media.caption) }
                }
            }
        } @else {
            p class={ "media media-" (media.kind) } {
                a href=(media.file.url) class=[media.file.missing.then_some("asset-missing")] {
                    @if media.caption.is_empty() { (media.file.url) } @else { (media.caption) }
                }
            }
        }
    }
}

pub(crate) fn table_markup(table: &TableView) -> Markup {
    html! {
        figure class={ "data-table table-" (table.kind) } {
            @if !table.title.is_empty() {
                figcaption { (table.title) }
            }
            table {
                thead {
                    tr {
                        @for header in &table.headers {
                            th { (header) }
                        }
                    }
                }
                tbody {
                    @for row in &table.rows {
                        tr {
                            @for cell in row {
                                td { (cell) }
                            }
                        }
                    }
                }
            }
            @if !table.notes_html.is_empty() {
                div.table-notes { (PreEscaped(&table.notes_html)) }
            }
        }
    }
}

/// Plain display text for an attribute or cell value.
pub(crate) fn value_text(value: &serde_json::Value, unit: Option<&str>) -> String {
    let text = display_value(value);
    match unit {
        Some(unit) if !text.is_empty() => format!("{text} {unit}"),
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, Row, TableKind};
    use crate::test_helpers::*;
    use std::collections::BTreeMap;

    fn keyed(pairs: &[(&str, serde_json::Value)]) -> Row {
        Row::Keyed(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    fn table(rows: Vec<Row>) -> Table {
        Table {
            kind: TableKind::Technical,
            title: "Performance".into(),
            columns: vec![
                Column { key: "model".into(), title: "Model".into() },
                Column { key: "flow".into(), title: "Flow, m³/h".into() },
                Column { key: "noise".into(), title: "Noise".into() },
            ],
            rows,
            notes_md: String::new(),
        }
    }

    #[test]
    fn table_rows_follow_declared_columns() {
        let view = table_view(&table(vec![
            keyed(&[("model", "100".into()), ("flow", 1200.into()), ("noise", "42".into())]),
            keyed(&[("model", "200".into()), ("extra", "dropped".into())]),
        ]));
        assert_eq!(view.headers, vec!["Model", "Flow, m³/h", "Noise"]);
        assert_eq!(view.rows[0], vec!["100", "1200", "42"]);
        assert_eq!(view.rows[1], vec!["200", "", ""]);
    }

    #[test]
    fn missing_keys_render_empty_cells() {
        let view = table_view(&table(vec![keyed(&[("flow", 900.into())])]));
        let html = table_markup(&view).into_string();
        assert_eq!(html.matches("<td>").count(), 3);
        assert!(html.contains("<td></td><td>900</td><td></td>"));
        assert!(!html.contains("dropped"));
    }

    #[test]
    fn table_kind_becomes_class() {
        let html = table_markup(&table_view(&table(vec![]))).into_string();
        assert!(html.contains("table-technical"));
        assert!(html.contains("<figcaption>Performance</figcaption>"));
    }

    #[test]
    fn series_page_has_model_index_without_prices() {
        let catalog = minimal_catalog();
        let env = TestEnv::new(&catalog);
        let section = &catalog.sections[0];
        let view = build_view(section, &section.series[0], &env.ctx());
        let html = markup(&view, &env.theme).into_string();

        assert!(html.contains(r##"href="#mdl-fans-sdcxl-SDCXL.2D100""##));
        assert!(html.contains("SDCXL-100"));
        assert!(!html.contains("15 000"));
    }

    #[test]
    fn media_split_into_figures_and_links() {
        let catalog = rich_catalog();
        let env = TestEnv::new(&catalog);
        let section = &catalog.sections[0];
        let view = build_view(section, &section.series[0], &env.ctx());
        let html = markup(&view, &env.theme).into_string();

        // doc without file is skipped
        assert_eq!(view.media.len(), 3);
        assert!(html.contains(r#"<figure class="media media-drawing">"#));
        assert!(html.contains(r#"<p class="media media-doc">"#));
        assert!(html.contains(r#"href="images/docs/sdcxl.pdf""#));
    }

    #[test]
    fn features_and_construction_use_labels() {
        let catalog = rich_catalog();
        let env = TestEnv::new(&catalog);
        let section = &catalog.sections[0];
        let view = build_view(section, &section.series[0], &env.ctx());
        let html = markup(&view, &env.theme).into_string();
        assert!(html.contains("<h2>Features</h2>"));
        assert!(html.contains("<li>EC motor</li>"));
        assert!(html.contains("<h2>Construction</h2>"));
    }

    #[test]
    fn hero_banner_markdown() {
        let catalog = rich_catalog();
        let env = TestEnv::new(&catalog);
        let section = &catalog.sections[0];
        let view = build_view(section, &section.series[0], &env.ctx());
        assert_eq!(view.hero.as_ref().unwrap().url, "images/sdcxl/hero.jpg");
        assert!(view.banner_html.contains("<em>quiet</em>"));
    }

    #[test]
    fn value_text_appends_unit() {
        assert_eq!(value_text(&serde_json::json!(230), Some("V")), "230 V");
        assert_eq!(value_text(&serde_json::Value::Null, Some("V")), "");
        assert_eq!(value_text(&serde_json::json!("IP54"), None), "IP54");
    }
}
