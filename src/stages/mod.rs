//! Stage renderers.
//!
//! A catalog document is a sequence of page-level fragments, each produced by
//! one stage:
//!
//! | Stage | Source | Anchor |
//! |---|---|---|
//! | Cover | settings | `cover` |
//! | Toc | [`PageIndex`] | `toc` |
//! | SectionDivider | section | `sec-{section}` |
//! | SeriesPage | series | `ser-{section}-{series}` |
//! | ProductGrid | series models | `grid-{section}-{series}` |
//! | ModelSpec | one model | `spec-{section}-{series}-{sku}` |
//! | BackCover | settings | `backcover` |
//!
//! Each stage builds a serializable view from its slice of the catalog and
//! hands it to the [`TemplateSet`], which turns it into HTML. Stages never
//! see each other's output; the composer decides order and wraps fragments.
//!
//! Code segments in anchors go through [`escape_code`], so anchors are stable
//! for a given input, safe in `id`/`href` attributes, and distinct whenever
//! the codes are.

pub mod backcover;
pub mod cover;
pub mod model_spec;
pub mod products;
pub mod section;
pub mod series;
pub mod toc;

use crate::assets::{AssetRef, AssetResolver};
use crate::catalog::{Model, Section, Series, Settings};
use crate::compose::PageIndex;
use crate::template::{TemplateError, TemplateSet};
use crate::theme::Theme;
use maud::{Markup, html};
use serde::Serialize;

/// The closed set of page kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Cover,
    Toc,
    SectionDivider,
    SeriesPage,
    ProductGrid,
    ModelSpec,
    BackCover,
}

impl StageKind {
    pub const ALL: [StageKind; 7] = [
        StageKind::Cover,
        StageKind::Toc,
        StageKind::SectionDivider,
        StageKind::SeriesPage,
        StageKind::ProductGrid,
        StageKind::ModelSpec,
        StageKind::BackCover,
    ];

    /// Short name, used in CSS classes (`page-{name}`) and log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::Cover => "cover",
            StageKind::Toc => "toc",
            StageKind::SectionDivider => "section",
            StageKind::SeriesPage => "series",
            StageKind::ProductGrid => "products",
            StageKind::ModelSpec => "model",
            StageKind::BackCover => "backcover",
        }
    }

    /// Template file rendering this stage in a template directory.
    pub fn template_name(self) -> &'static str {
        match self {
            StageKind::Cover => "cover.html",
            StageKind::Toc => "toc.html",
            StageKind::SectionDivider => "section.html",
            StageKind::SeriesPage => "series.html",
            StageKind::ProductGrid => "products.html",
            StageKind::ModelSpec => "model.html",
            StageKind::BackCover => "backcover.html",
        }
    }
}

/// A rendered page: the unit the composer orders and wraps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub kind: StageKind,
    pub anchor: String,
    pub html: String,
}

/// Everything a stage may read besides its own slice of the catalog.
pub struct RenderContext<'a> {
    pub settings: &'a Settings,
    pub theme: &'a Theme,
    pub assets: &'a AssetResolver,
    pub templates: &'a TemplateSet,
}

/// One stage invocation with the model slice it renders.
#[derive(Debug, Clone, Copy)]
pub enum Stage<'a> {
    Cover,
    Toc(&'a PageIndex),
    SectionDivider(&'a Section),
    SeriesPage(&'a Section, &'a Series),
    ProductGrid(&'a Section, &'a Series),
    ModelSpec(&'a Section, &'a Series, &'a Model),
    BackCover,
}

impl Stage<'_> {
    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Cover => StageKind::Cover,
            Stage::Toc(_) => StageKind::Toc,
            Stage::SectionDivider(_) => StageKind::SectionDivider,
            Stage::SeriesPage(..) => StageKind::SeriesPage,
            Stage::ProductGrid(..) => StageKind::ProductGrid,
            Stage::ModelSpec(..) => StageKind::ModelSpec,
            Stage::BackCover => StageKind::BackCover,
        }
    }

    pub fn anchor(&self) -> String {
        match self {
            Stage::Cover => "cover".to_string(),
            Stage::Toc(_) => "toc".to_string(),
            Stage::SectionDivider(section) => section_anchor(section),
            Stage::SeriesPage(section, series) => series_anchor(section, series),
            Stage::ProductGrid(section, series) => grid_anchor(section, series),
            Stage::ModelSpec(section, series, model) => spec_anchor(section, series, model),
            Stage::BackCover => "backcover".to_string(),
        }
    }

    /// Build this stage's view and render it with the context's templates.
    pub fn render(&self, ctx: &RenderContext<'_>) -> Result<Fragment, TemplateError> {
        let kind = self.kind();
        let anchor = self.anchor();
        let view = match *self {
            Stage::Cover => View::Cover(cover::build_view(ctx)),
            Stage::Toc(index) => View::Toc(toc::build_view(index)),
            Stage::SectionDivider(section) => View::Section(section::build_view(section, ctx)),
            Stage::SeriesPage(section, series) => {
                View::Series(series::build_view(section, series, ctx))
            }
            Stage::ProductGrid(section, series) => {
                View::Products(products::build_view(section, series, ctx))
            }
            Stage::ModelSpec(section, series, model) => {
                View::Model(model_spec::build_view(section, series, model, ctx))
            }
            Stage::BackCover => View::BackCover(backcover::build_view(ctx)),
        };
        let html = ctx.templates.render(kind, &view, ctx.theme)?;
        tracing::debug!(stage = kind.as_str(), %anchor, bytes = html.len(), "stage rendered");
        Ok(Fragment { kind, anchor, html })
    }
}

/// Per-stage template context, exposed to templates as `page`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum View {
    Cover(cover::CoverView),
    Toc(toc::TocView),
    Section(section::SectionView),
    Series(series::SeriesView),
    Products(products::ProductsView),
    Model(model_spec::ModelView),
    BackCover(backcover::BackCoverView),
}

impl View {
    /// Built-in (maud) rendering of this view.
    pub fn builtin_markup(&self, theme: &Theme) -> Markup {
        match self {
            View::Cover(v) => cover::markup(v, theme),
            View::Toc(v) => toc::markup(v, theme),
            View::Section(v) => section::markup(v, theme),
            View::Series(v) => series::markup(v, theme),
            View::Products(v) => products::markup(v, theme),
            View::Model(v) => model_spec::markup(v, theme),
            View::BackCover(v) => backcover::markup(v, theme),
        }
    }
}

// ============================================================================
// Anchors
// ============================================================================

/// Encode a code as an anchor segment.
///
/// Letters and digits of any script and `_` are kept; every other character
/// (including `-`, `.` and spaces) becomes `.XX` per UTF-8 byte. Distinct
/// codes always give distinct segments, and a segment never contains `-`,
/// so segments joined with `-` cannot run into each other.
pub fn escape_code(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    for c in code.chars() {
        if c.is_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!(".{byte:02X}"));
            }
        }
    }
    out
}

pub fn section_anchor(section: &Section) -> String {
    format!("sec-{}", escape_code(&section.code))
}

pub fn series_anchor(section: &Section, series: &Series) -> String {
    format!("ser-{}-{}", escape_code(&section.code), escape_code(&series.code))
}

pub fn grid_anchor(section: &Section, series: &Series) -> String {
    format!("grid-{}-{}", escape_code(&section.code), escape_code(&series.code))
}

pub fn spec_anchor(section: &Section, series: &Series, model: &Model) -> String {
    format!(
        "spec-{}-{}-{}",
        escape_code(&section.code),
        escape_code(&series.code),
        escape_code(&model.sku)
    )
}

/// Id of a model's card inside its series product grid.
pub fn card_anchor(section: &Section, series: &Series, model: &Model) -> String {
    format!(
        "mdl-{}-{}-{}",
        escape_code(&section.code),
        escape_code(&series.code),
        escape_code(&model.sku)
    )
}

// ============================================================================
// Shared markup
// ============================================================================

/// `<img>` for a resolved asset; missing files keep their reference and get
/// the `asset-missing` class.
pub(crate) fn image(asset: &AssetRef, alt: &str, class: &str) -> Markup {
    let class = if asset.missing {
        format!("{class} asset-missing")
    } else {
        class.to_string()
    };
    html! {
        img class=(class) src=(asset.url) alt=(alt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn escape_keeps_letters_digits_and_underscore() {
        assert_eq!(escape_code("SDCXL_100b"), "SDCXL_100b");
        assert_eq!(escape_code("вентилятор1"), "вентилятор1");
    }

    #[test]
    fn escape_encodes_everything_else() {
        assert_eq!(escape_code("SDCXL-100"), "SDCXL.2D100");
        assert_eq!(escape_code("Roof fans / EC"), "Roof.20fans.20.2F.20EC");
        assert_eq!(escape_code("a.b"), "a.2Eb");
        assert_eq!(escape_code(" a "), ".20a.20");
        assert_eq!(escape_code("€"), ".E2.82.AC");
        assert_eq!(escape_code(""), "");
    }

    #[test]
    fn codes_differing_only_in_punctuation_stay_distinct() {
        let codes = ["fans", "fans!", "fans?", "fans-", "fans.", "fans.21", " fans", "fans "];
        let mut escaped: Vec<_> = codes.iter().map(|c| escape_code(c)).collect();
        escaped.sort();
        escaped.dedup();
        assert_eq!(escaped.len(), codes.len(), "{escaped:?}");
    }

    #[test]
    fn hyphens_in_codes_do_not_shift_segment_boundaries() {
        let mut catalog = minimal_catalog();
        catalog.sections[0].code = "a-b".into();
        catalog.sections[0].series[0].code = "c".into();
        let mut other = catalog.sections[0].clone();
        other.code = "a".into();
        other.series[0].code = "b-c".into();

        let left = series_anchor(&catalog.sections[0], &catalog.sections[0].series[0]);
        let right = series_anchor(&other, &other.series[0]);
        assert_eq!(left, "ser-a.2Db-c");
        assert_eq!(right, "ser-a-b.2Dc");
        assert_ne!(left, right);
    }

    #[test]
    fn non_latin_section_codes_get_distinct_anchors() {
        let mut catalog = minimal_catalog();
        catalog.sections[0].code = "вентиляторы".into();
        let mut other = catalog.sections[0].clone();
        other.code = "решётки".into();
        assert_eq!(section_anchor(&catalog.sections[0]), "sec-вентиляторы");
        assert_eq!(section_anchor(&other), "sec-решётки");
    }

    #[test]
    fn anchors_follow_codes() {
        let catalog = minimal_catalog();
        let section = &catalog.sections[0];
        let series = &section.series[0];
        let model = &series.models[0];

        assert_eq!(Stage::Cover.anchor(), "cover");
        assert_eq!(Stage::SectionDivider(section).anchor(), "sec-fans");
        assert_eq!(Stage::SeriesPage(section, series).anchor(), "ser-fans-sdcxl");
        assert_eq!(Stage::ProductGrid(section, series).anchor(), "grid-fans-sdcxl");
        assert_eq!(
            Stage::ModelSpec(section, series, model).anchor(),
            "spec-fans-sdcxl-SDCXL.2D100"
        );
        assert_eq!(card_anchor(section, series, model), "mdl-fans-sdcxl-SDCXL.2D100");
        assert_eq!(Stage::BackCover.anchor(), "backcover");
    }

    #[test]
    fn every_kind_has_a_distinct_template() {
        let mut names: Vec<_> = StageKind::ALL.iter().map(|k| k.template_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), StageKind::ALL.len());
    }

    #[test]
    fn missing_image_gets_placeholder_class() {
        let asset = AssetRef {
            url: "images/x.jpg".into(),
            missing: true,
        };
        let html = image(&asset, "X", "hero").into_string();
        assert!(html.contains(r#"class="hero asset-missing""#));
        assert!(html.contains(r#"src="images/x.jpg""#));
    }

    #[test]
    fn render_produces_fragment_with_anchor() {
        let catalog = minimal_catalog();
        let env = TestEnv::new(&catalog);
        let section = &catalog.sections[0];
        let fragment = Stage::SectionDivider(section).render(&env.ctx()).unwrap();
        assert_eq!(fragment.kind, StageKind::SectionDivider);
        assert_eq!(fragment.anchor, "sec-fans");
        assert!(fragment.html.contains("Fans"));
    }
}
