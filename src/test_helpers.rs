//! Shared test utilities for the makecatalog test suite.
//!
//! Provides fixture catalogs, a render environment with a scratch images
//! directory, and lookup helpers over composed documents.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let catalog = two_section_catalog();
//! let env = TestEnv::new(&catalog);
//! env.add_image("sdcxl/hero.jpg");
//!
//! let doc = compose(&catalog, &env.compose_options(true)).unwrap();
//! let grid = find_fragment(&doc, "grid-fans-sdcxl").unwrap();
//! assert!(grid.html.contains("15 000 ₸"));
//! ```

use std::fs;
use tempfile::TempDir;

use crate::assets::AssetResolver;
use crate::catalog::Catalog;
use crate::compose::{ComposeOptions, ComposedDocument};
use crate::config::{Labels, Margins};
use crate::stages::{Fragment, RenderContext};
use crate::template::TemplateSet;
use crate::theme::Theme;

// =========================================================================
// Fixture catalogs
// =========================================================================

const SETTINGS: &str = r#"{
    "title": "Ventilation 2025",
    "year": 2025,
    "currency": "₸",
    "company": {
        "name": "Example Air LLP",
        "address": "Almaty, Abay ave. 1",
        "contacts": "+7 727 000 00 00\nsales@example.kz",
        "site": "example.kz"
    }
}"#;

fn catalog_with(sections: &str) -> Catalog {
    let json = format!(r#"{{ "settings": {SETTINGS}, "sections": {sections} }}"#);
    Catalog::parse(&json).unwrap()
}

/// One section, one series, one priced model.
pub fn minimal_catalog() -> Catalog {
    catalog_with(
        r#"[
        { "code": "fans", "title": "Fans",
          "series": [
            { "code": "sdcxl", "name": "SDCXL",
              "models": [ { "sku": "SDCXL-100", "name": "SDCXL 100", "price": 15000 } ] }
          ] }
    ]"#,
    )
}

/// Two sections; the second holds a series without models.
pub fn two_section_catalog() -> Catalog {
    catalog_with(
        r#"[
        { "code": "fans", "title": "Fans", "intro_md": "Duct and roof fans.",
          "series": [
            { "code": "sdcxl", "name": "SDCXL",
              "models": [
                { "sku": "SDCXL-100", "name": "SDCXL 100", "price": 15000 },
                { "sku": "SDCXL-200", "name": "SDCXL 200", "price": 21500 } ] },
            { "code": "kvr", "name": "KVR",
              "models": [ { "sku": "KVR-160", "name": "KVR 160", "price": "9 800" } ] }
          ] },
        { "code": "grilles", "title": "Grilles",
          "series": [ { "code": "ag", "name": "AG", "summary_md": "Aluminium grilles." } ] }
    ]"#,
    )
}

/// One fully populated series: hero, tables, media, attributes, images.
///
/// Referenced files: `cover.jpg`, `logo.svg`, `sdcxl/hero.jpg`,
/// `sdcxl/photo.jpg`, `sdcxl/drawing.png`, `docs/sdcxl.pdf`, `sdcxl/100.jpg`.
pub fn rich_catalog() -> Catalog {
    let json = r##"{
        "settings": {
            "title": "Ventilation 2025", "year": 2025, "theme_color": "#1565C0",
            "cover_bg": "cover.jpg", "cover_logo": "logo.svg",
            "backcover_text": "Prices include **VAT**.",
            "company": { "name": "Example Air LLP", "contacts": "sales@example.kz" }
        },
        "sections": [
            { "code": "fans", "title": "Fans", "intro_md": "**Duct** fans for every job.",
              "series": [
                { "code": "sdcxl", "name": "SDCXL", "tags": ["EC", "duct"],
                  "summary_md": "Compact duct fans.",
                  "construction_md": "Galvanized steel housing.",
                  "features": ["EC motor", "Speed control"],
                  "hero": { "photo": "sdcxl/hero.jpg", "banner_md": "Very *quiet*" },
                  "media": [
                    { "id": "m1", "type": "photo", "file": "sdcxl/photo.jpg", "caption": "Installed" },
                    { "id": "m2", "type": "drawing", "file": "sdcxl/drawing.png", "caption": "Dimensions" },
                    { "id": "m3", "type": "doc", "file": "docs/sdcxl.pdf", "caption": "Datasheet" },
                    { "id": "m4", "type": "doc", "caption": "Coming soon" }
                  ],
                  "tables": [
                    { "type": "technical", "title": "Performance",
                      "columns": [ { "key": "model", "title": "Model" }, { "key": "flow", "title": "Flow" } ],
                      "rows": [ { "model": "100", "flow": 1200 }, { "model": "200" } ],
                      "notes_md": "At *20 °C*." },
                    { "type": "acoustic", "title": "Noise",
                      "columns": [ { "key": "db", "title": "dB(A)" } ],
                      "rows": [ ["42"] ] }
                  ],
                  "models": [
                    { "sku": "SDCXL-100", "name": "SDCXL 100", "price": 15000,
                      "image": "sdcxl/100.jpg", "description_md": "Small and *quiet*.",
                      "attributes": [
                        { "group": "Electrical", "items": [ { "name": "Voltage", "value": 230, "unit": "V" } ] },
                        { "group": "Misc", "items": [] }
                      ] },
                    { "sku": "SDCXL-200", "name": "SDCXL 200", "price": 21500 }
                  ] }
              ] }
        ]
    }"##;
    Catalog::parse(json).unwrap()
}

// =========================================================================
// Render environment
// =========================================================================

/// Everything stages and the composer need, with an empty scratch images
/// directory served under the `images/` prefix.
pub struct TestEnv<'a> {
    pub catalog: &'a Catalog,
    pub labels: Labels,
    pub theme: Theme,
    pub assets: AssetResolver,
    pub templates: TemplateSet,
    images: TempDir,
}

impl<'a> TestEnv<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self::with_templates(catalog, TemplateSet::Builtin)
    }

    pub fn with_templates(catalog: &'a Catalog, templates: TemplateSet) -> Self {
        let images = TempDir::new().unwrap();
        let labels = Labels::default();
        Self {
            catalog,
            theme: Theme::new(&catalog.settings, &labels),
            labels,
            assets: AssetResolver::new(images.path(), "images"),
            templates,
            images,
        }
    }

    pub fn ctx(&self) -> RenderContext<'_> {
        RenderContext {
            settings: &self.catalog.settings,
            theme: &self.theme,
            assets: &self.assets,
            templates: &self.templates,
        }
    }

    pub fn compose_options(&self, include_cover: bool) -> ComposeOptions<'_> {
        ComposeOptions {
            include_cover,
            labels: &self.labels,
            templates: &self.templates,
            assets: &self.assets,
            margins: Margins::default(),
            paged_polyfill: None,
        }
    }

    /// Create an (empty) image file under the images root.
    pub fn add_image(&self, relative: &str) {
        let path = self.images.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"img").unwrap();
    }
}

// =========================================================================
// Document lookups
// =========================================================================

/// Find a fragment by anchor.
pub fn find_fragment<'a>(doc: &'a ComposedDocument, anchor: &str) -> Option<&'a Fragment> {
    doc.fragments.iter().find(|f| f.anchor == anchor)
}

/// Find a fragment by anchor. Panics if not found.
pub fn fragment<'a>(doc: &'a ComposedDocument, anchor: &str) -> &'a Fragment {
    find_fragment(doc, anchor).unwrap_or_else(|| {
        let anchors = fragment_anchors(doc);
        panic!("fragment '{anchor}' not found. Available: {anchors:?}")
    })
}

/// All fragment anchors in document order.
pub fn fragment_anchors(doc: &ComposedDocument) -> Vec<&str> {
    doc.fragments.iter().map(|f| f.anchor.as_str()).collect()
}
