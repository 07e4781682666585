//! # MakeCatalog
//!
//! Turns a product catalog described in JSON (sections, series, models,
//! tables, media) into one styled HTML document and, optionally, an A4 PDF.
//!
//! # Architecture: Load, Compose, Export
//!
//! ```text
//! 1. Load     catalog.json  →  Catalog          (shape + identity validation)
//! 2. Compose  Catalog       →  catalog.html     (stages → fragments → document)
//! 3. Export   catalog.html  →  catalog.pdf      (headless Chrome or printpdf)
//! ```
//!
//! The HTML is always produced and is a complete, self-contained artifact:
//! open it in a browser to preview, print it by hand, or hand it to the
//! exporter. Export is the only stage that talks to the outside world, and
//! it runs last so its failure never costs the HTML.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Catalog document model: serde types, lenient field parsing, code uniqueness |
//! | [`markdown`] | Markdown → sanitized HTML for all `*_md` fields |
//! | [`theme`] | Shared theme context: brand colour, price formatting, labels |
//! | [`assets`] | Image reference resolution and missing-file warnings |
//! | [`stages`] | One renderer per page kind; each builds a serializable view |
//! | [`template`] | Built-in maud templates or a Tera template directory |
//! | [`compose`] | Page ordering, two-pass table of contents, document shell |
//! | [`export`] | PDF engines behind the [`export::PdfBackend`] trait, atomic writes |
//! | [`pipeline`] | Load → compose → write → export, with a run report |
//! | [`config`] | Layered `makecatalog.toml` loading and validation |
//! | [`output`] | CLI output formatting of check and build results |
//!
//! # Design Decisions
//!
//! ## Views Between Data and Markup
//!
//! Stages never emit markup from catalog types directly. Each stage first
//! builds a view (plain `Serialize` structs with resolved URLs, formatted
//! prices and pre-rendered markdown), and a [`template::TemplateSet`] turns
//! the view into HTML. The built-in set is [Maud](https://maud.lambda.xyz/):
//! compile-time checked and escaped by default. A Tera directory receives
//! the very same views, so custom templates cannot drift from what the
//! built-ins can see.
//!
//! ## Deterministic Anchors
//!
//! Every page carries an `id` derived from entity codes (`sec-fans`,
//! `ser-fans-sdcxl`, `mdl-fans-sdcxl-SDCXL.2D100`; characters other than
//! letters, digits and `_` are hex-escaped, so distinct codes never share an
//! anchor). Links in the table of
//! contents and the series model index rely on nothing else, and two runs
//! over the same input give byte-identical HTML.
//!
//! ## Page Numbers Without a Layout Engine
//!
//! The composer knows fragment order, not pagination. Contents entries carry
//! their fragment ordinal; when the paged-media polyfill is enabled, CSS
//! `target-counter()` replaces it with real page numbers after layout.

pub mod assets;
pub mod catalog;
pub mod compose;
pub mod config;
pub mod export;
pub mod markdown;
pub mod output;
pub mod pipeline;
pub mod stages;
pub mod template;
pub mod theme;

#[cfg(test)]
pub(crate) mod test_helpers;
