//! Back cover: closing text and company contacts.

use super::RenderContext;
use crate::markdown;
use crate::theme::Theme;
use maud::{Markup, PreEscaped, html};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct BackCoverView {
    pub text_html: String,
    /// Contact lines, one per line of `company.contacts`.
    pub contacts: Vec<String>,
}

pub fn build_view(ctx: &RenderContext<'_>) -> BackCoverView {
    BackCoverView {
        text_html: markdown::render(&ctx.settings.backcover_text),
        contacts: ctx
            .settings
            .company
            .contacts
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

pub fn markup(view: &BackCoverView, theme: &Theme) -> Markup {
    let company = &theme.company;
    html! {
        @if !view.text_html.is_empty() {
            div.backcover-text { (PreEscaped(&view.text_html)) }
        }
        address.company {
            @if !company.name.is_empty() {
                p.company-name { (company.name) }
            }
            @if !company.address.is_empty() {
                p.company-address { (company.address) }
            }
            @if !view.contacts.is_empty() {
                h3 { (theme.labels.contacts) }
                ul.company-contacts {
                    @for line in &view.contacts {
                        li { (line) }
                    }
                }
            }
            @if !company.site.is_empty() {
                p.company-site { (company.site) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn contacts_split_into_lines() {
        let catalog = minimal_catalog();
        let env = TestEnv::new(&catalog);
        let view = build_view(&env.ctx());
        assert_eq!(view.contacts, vec!["+7 727 000 00 00", "sales@example.kz"]);

        let html = markup(&view, &env.theme).into_string();
        assert!(html.contains("<h3>Contacts</h3>"));
        assert!(html.contains("Example Air LLP"));
    }

    #[test]
    fn backcover_text_is_markdown() {
        let mut catalog = minimal_catalog();
        catalog.settings.backcover_text = "Prices **include** VAT".into();
        let env = TestEnv::new(&catalog);
        let view = build_view(&env.ctx());
        assert!(view.text_html.contains("<strong>include</strong>"));
    }
}
