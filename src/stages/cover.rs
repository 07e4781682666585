//! Cover page: background image, logo, title block.

use super::{RenderContext, image};
use crate::assets::AssetRef;
use crate::theme::Theme;
use maud::{Markup, html};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CoverView {
    pub background: Option<AssetRef>,
    pub logo: Option<AssetRef>,
}

pub fn build_view(ctx: &RenderContext<'_>) -> CoverView {
    CoverView {
        background: ctx.assets.resolve_opt(ctx.settings.cover_bg.as_deref()),
        logo: ctx.assets.resolve_opt(ctx.settings.cover_logo.as_deref()),
    }
}

pub fn markup(view: &CoverView, theme: &Theme) -> Markup {
    html! {
        @if let Some(bg) = &view.background {
            (image(bg, "", "cover-bg"))
        }
        div.cover-inner {
            @if let Some(logo) = &view.logo {
                (image(logo, &theme.company.name, "cover-logo"))
            }
            h1.cover-title { (theme.title) }
            @if !theme.subtitle.is_empty() {
                p.cover-subtitle { (theme.subtitle) }
            }
            @if !theme.year.is_empty() {
                p.cover-year { (theme.year) }
            }
        }
    }
}
