//! PDF export through the real engines.
//!
//! Needs Chrome or Chromium on the machine for the `chromium` tests.
//! Run with: `cargo test --test pdf_export -- --ignored`

use headless_chrome::{Browser, LaunchOptions};
use makecatalog::config::CatalogConfig;
use makecatalog::export::Engine;
use makecatalog::pipeline;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Setup helpers
// ---------------------------------------------------------------------------

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/catalog.json")
}

fn config(out: &Path, engine: Engine) -> CatalogConfig {
    let mut config = CatalogConfig {
        html_output: out.join("catalog.html").to_string_lossy().into(),
        pdf_output: out.join("catalog.pdf").to_string_lossy().into(),
        engine,
        ..CatalogConfig::default()
    };
    config.export.timeout_secs = 60;
    config
}

fn assert_pdf(path: &Path) {
    let bytes = fs::read(path).unwrap_or_else(|e| panic!("missing {}: {e}", path.display()));
    assert!(bytes.starts_with(b"%PDF-"), "not a PDF: {}", path.display());
    assert!(bytes.len() > 1024, "suspiciously small PDF ({} bytes)", bytes.len());
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
#[ignore]
fn chromium_exports_fixture() {
    let tmp = TempDir::new().unwrap();
    let report = pipeline::run(&fixture(), &config(tmp.path(), Engine::Chromium)).unwrap();

    let pdf = report.pdf.expect("export was enabled");
    assert_eq!(pdf.engine, "chromium");
    assert_pdf(&pdf.path);
    assert_eq!(pdf.bytes, fs::metadata(&pdf.path).unwrap().len());
}

#[test]
#[ignore]
fn chromium_export_leaves_no_temp_files() {
    let tmp = TempDir::new().unwrap();
    pipeline::run(&fixture(), &config(tmp.path(), Engine::Chromium)).unwrap();

    let mut names: Vec<_> = fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    assert_eq!(names, ["catalog.html", "catalog.pdf"]);
}

#[test]
#[ignore]
fn layout_script_marks_document_ready() {
    let tmp = TempDir::new().unwrap();
    let mut config = config(tmp.path(), Engine::Chromium);
    config.pdf_output = String::new();
    let report = pipeline::run(&fixture(), &config).unwrap();

    let browser = Browser::new(LaunchOptions {
        window_size: Some((1280, 800)),
        ..Default::default()
    })
    .expect("failed to launch Chrome");
    let tab = browser.new_tab().unwrap();
    let path = fs::canonicalize(&report.html_path).unwrap();
    tab.navigate_to(&format!("file://{}", path.display()))
        .unwrap()
        .wait_until_navigated()
        .unwrap();

    tab.wait_for_element(makecatalog::export::LAYOUT_READY_SELECTOR)
        .expect("layout-ready flag never set");
    let pages = tab
        .evaluate("document.querySelectorAll('section.page').length", false)
        .unwrap()
        .value
        .unwrap();
    assert_eq!(pages.as_u64(), Some(15));
}

#[test]
#[ignore]
fn printpdf_exports_fixture() {
    let tmp = TempDir::new().unwrap();
    let report = pipeline::run(&fixture(), &config(tmp.path(), Engine::Printpdf)).unwrap();

    let pdf = report.pdf.expect("export was enabled");
    assert_eq!(pdf.engine, "printpdf");
    assert_pdf(&pdf.path);
}
