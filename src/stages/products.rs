//! Product grid: one card per model of a series, with image, description
//! and the formatted price.

use super::{RenderContext, card_anchor, image, spec_anchor};
use crate::assets::AssetRef;
use crate::catalog::{Model, Section, Series};
use crate::markdown;
use crate::theme::Theme;
use maud::{Markup, PreEscaped, html};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ProductsView {
    pub series_name: String,
    pub section_title: String,
    pub cards: Vec<ModelCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelCard {
    pub anchor: String,
    pub sku: String,
    pub name: String,
    /// Formatted price with currency; empty when the model has no price.
    pub price: String,
    pub unit: String,
    pub image: Option<AssetRef>,
    pub description_html: String,
    /// Link to the model's specification page, when those are generated.
    pub spec_href: Option<String>,
}

pub fn build_view(section: &Section, series: &Series, ctx: &RenderContext<'_>) -> ProductsView {
    ProductsView {
        series_name: series.name.clone(),
        section_title: section.title.clone(),
        cards: series
            .models
            .iter()
            .map(|model| card(section, series, model, ctx))
            .collect(),
    }
}

fn card(section: &Section, series: &Series, model: &Model, ctx: &RenderContext<'_>) -> ModelCard {
    ModelCard {
        anchor: card_anchor(section, series, model),
        sku: model.sku.clone(),
        name: model.name.clone(),
        price: ctx.theme.price(model.price, model.currency.as_deref()),
        unit: model.unit.clone().unwrap_or_default(),
        image: ctx.assets.resolve_opt(model.image.as_deref()),
        description_html: markdown::render(&model.description_md),
        spec_href: ctx
            .settings
            .generate_model_pages
            .then(|| format!("#{}", spec_anchor(section, series, model))),
    }
}

pub fn markup(view: &ProductsView, theme: &Theme) -> Markup {
    html! {
        header.products-header {
            p.series-section { (view.section_title) }
            h2 { (view.series_name) " · " (theme.labels.models) }
        }
        div.product-grid {
            @for card in &view.cards {
                article.model-card id=(card.anchor) {
                    @if let Some(img) = &card.image {
                        (image(img, &card.name, "model-image"))
                    }
                    p.sku { (theme.labels.sku) ": " (card.sku) }
                    h3.model-name { (card.name) }
                    @if !card.description_html.is_empty() {
                        div.model-description { (PreEscaped(&card.description_html)) }
                    }
                    @if !card.price.is_empty() {
                        p.price {
                            span.price-label { (theme.labels.price) ": " }
                            span.price-value { (card.price) }
                            @if !card.unit.is_empty() {
                                span.price-unit { " / " (card.unit) }
                            }
                        }
                    }
                    @if let Some(href) = &card.spec_href {
                        a.spec-link href=(href) { (theme.labels.specifications) }
                    }
                }
            }
        }
    }
}
