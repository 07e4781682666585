//! Model specification page (optional, one per model).
//!
//! Lists the model's attribute groups as name/value tables. Prices stay on the
//! product card; this page links back to it.

use super::series::value_text;
use super::{RenderContext, card_anchor, image};
use crate::assets::AssetRef;
use crate::catalog::{AttributeGroup, Model, Section, Series};
use crate::markdown;
use crate::theme::Theme;
use maud::{Markup, PreEscaped, html};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ModelView {
    pub sku: String,
    pub name: String,
    pub series_name: String,
    pub image: Option<AssetRef>,
    pub description_html: String,
    pub groups: Vec<GroupView>,
    pub card_href: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupView {
    pub title: String,
    pub items: Vec<AttributeView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttributeView {
    pub name: String,
    pub value: String,
}

pub fn build_view(
    section: &Section,
    series: &Series,
    model: &Model,
    ctx: &RenderContext<'_>,
) -> ModelView {
    ModelView {
        sku: model.sku.clone(),
        name: model.name.clone(),
        series_name: series.name.clone(),
        image: ctx.assets.resolve_opt(model.image.as_deref()),
        description_html: markdown::render(&model.description_md),
        groups: model
            .attributes
            .iter()
            .filter(|g| !g.items.is_empty())
            .map(group_view)
            .collect(),
        card_href: format!("#{}", card_anchor(section, series, model)),
    }
}

fn group_view(group: &AttributeGroup) -> GroupView {
    GroupView {
        title: group.group.clone(),
        items: group
            .items
            .iter()
            .map(|item| AttributeView {
                name: item.name.clone(),
                value: value_text(&item.value, item.unit.as_deref()),
            })
            .collect(),
    }
}

pub fn markup(view: &ModelView, theme: &Theme) -> Markup {
    html! {
        header.model-header {
            p.series-section { (view.series_name) }
            h2.model-name { (view.name) }
            p.sku { a href=(view.card_href) { (theme.labels.sku) ": " (view.sku) } }
        }
        @if let Some(img) = &view.image {
            figure.model-figure { (image(img, &view.name, "model-image")) }
        }
        @if !view.description_html.is_empty() {
            div.model-description { (PreEscaped(&view.description_html)) }
        }
        @if !view.groups.is_empty() {
            section.model-specs {
                h3 { (theme.labels.specifications) }
                @for group in &view.groups {
                    table.spec-group {
                        @if !group.title.is_empty() {
                            caption { (group.title) }
                        }
                        tbody {
                            @for item in &group.items {
                                tr {
                                    th scope="row" { (item.name) }
                                    td { (item.value) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn attributes_grouped_with_units() {
        let catalog = rich_catalog();
        let env = TestEnv::new(&catalog);
        let section = &catalog.sections[0];
        let series = &section.series[0];
        let view = build_view(section, series, &series.models[0], &env.ctx());

        // the empty "Misc" group is dropped
        assert_eq!(view.groups.len(), 1);
        assert_eq!(view.groups[0].title, "Electrical");
        assert_eq!(view.groups[0].items[0].value, "230 V");
    }

    #[test]
    fn spec_page_links_back_without_price() {
        let catalog = rich_catalog();
        let env = TestEnv::new(&catalog);
        let section = &catalog.sections[0];
        let series = &section.series[0];
        let html = markup(
            &build_view(section, series, &series.models[0], &env.ctx()),
            &env.theme,
        )
        .into_string();
        assert!(html.contains(r##"href="#mdl-fans-sdcxl-SDCXL.2D100""##));
        assert!(html.contains("<th scope=\"row\">Voltage</th>"));
        assert!(!html.contains("15 000"));
    }
}
