//! CLI output formatting for pipeline results.
//!
//! # Information-First Display
//!
//! Output is **content-centric, not file-centric**. The primary display for
//! every entity (section, series) is its positional index and title, with the
//! anchor it received shown alongside so a reader can find it in the HTML.
//! Files appear once, at the end, as the products of the run.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Ventilation 2025 (2 sections, 3 series, 3 models, 10 pages)
//!     Templates: built-in
//! Contents
//! 001 Fans → #sec-fans
//!     001 SDCXL → #ser-fans-sdcxl
//!     002 KVR → #ser-fans-kvr
//! 002 Grilles → #sec-grilles
//!     001 AG → #ser-grilles-ag
//! Warnings
//!     Missing image: sdcxl/hero.jpg
//!         Expected at: output/images/sdcxl/hero.jpg
//! ```
//!
//! ## Build
//!
//! The check output, then:
//!
//! ```text
//! HTML → output/catalog.html (48.2 KB)
//! PDF → output/catalog.pdf (1.3 MB, chromium)
//! ```
//!
//! # Architecture
//!
//! Each result has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure.

use crate::assets::AssetWarning;
use crate::compose::EntryLevel;
use crate::pipeline::{RunReport, Summary};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 section`, `3 sections`.
fn counted(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

/// Human-readable byte size.
fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

fn file_line(kind: &str, path: &Path, detail: &str) -> String {
    format!("{kind} → {} ({detail})", path.display())
}

// ============================================================================
// Check
// ============================================================================

/// Format a composed catalog: totals, table of contents, warnings.
pub fn format_summary(summary: &Summary) -> Vec<String> {
    let mut lines = Vec::new();

    let title = if summary.title.trim().is_empty() {
        "(untitled catalog)"
    } else {
        summary.title.as_str()
    };
    lines.push(format!(
        "{} ({}, {}, {}, {})",
        title,
        counted(summary.sections, "section", "sections"),
        counted(summary.series, "series", "series"),
        counted(summary.models, "model", "models"),
        counted(summary.pages, "page", "pages"),
    ));
    lines.push(format!("{}Templates: {}", indent(1), summary.templates));

    if !summary.index.entries.is_empty() {
        lines.push("Contents".to_string());
        let mut section_pos = 0;
        let mut series_pos = 0;
        for entry in &summary.index.entries {
            let (depth, pos) = match entry.level {
                EntryLevel::Section => {
                    section_pos += 1;
                    series_pos = 0;
                    (0, section_pos)
                }
                EntryLevel::Series => {
                    series_pos += 1;
                    (1, series_pos)
                }
            };
            lines.push(format!(
                "{}{} {} → #{}",
                indent(depth),
                format_index(pos),
                entry.title,
                entry.anchor
            ));
        }
    }

    lines.extend(format_warnings(&summary.warnings));
    lines
}

/// Format missing-asset warnings. Empty when there are none.
pub fn format_warnings(warnings: &[AssetWarning]) -> Vec<String> {
    if warnings.is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["Warnings".to_string()];
    for warning in warnings {
        lines.push(format!("{}Missing image: {}", indent(1), warning.reference));
        lines.push(format!(
            "{}Expected at: {}",
            indent(2),
            warning.expected_at.display()
        ));
    }
    lines
}

/// Print check output to stdout.
pub fn print_summary(summary: &Summary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format a completed run: the summary followed by the written files.
pub fn format_run_report(report: &RunReport) -> Vec<String> {
    let mut lines = format_summary(&report.summary);
    lines.push(String::new());
    lines.push(file_line(
        "HTML",
        &report.html_path,
        &format_size(report.html_bytes),
    ));
    match &report.pdf {
        Some(pdf) => lines.push(file_line(
            "PDF",
            &pdf.path,
            &format!("{}, {}", format_size(pdf.bytes), pdf.engine),
        )),
        None => lines.push("PDF skipped (pdf_output is empty)".to_string()),
    }
    lines
}

/// Print build output to stdout.
pub fn print_run_report(report: &RunReport) {
    for line in format_run_report(report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{IndexEntry, PageIndex};
    use crate::pipeline::PdfOutput;
    use std::path::PathBuf;

    fn entry(level: EntryLevel, anchor: &str, title: &str, ordinal: usize) -> IndexEntry {
        IndexEntry {
            level,
            anchor: anchor.into(),
            title: title.into(),
            ordinal,
        }
    }

    fn summary() -> Summary {
        Summary {
            title: "Ventilation 2025".into(),
            sections: 2,
            series: 3,
            models: 1,
            pages: 10,
            templates: "built-in".into(),
            index: PageIndex {
                entries: vec![
                    entry(EntryLevel::Section, "sec-fans", "Fans", 3),
                    entry(EntryLevel::Series, "ser-fans-sdcxl", "SDCXL", 4),
                    entry(EntryLevel::Series, "ser-fans-kvr", "KVR", 6),
                    entry(EntryLevel::Section, "sec-grilles", "Grilles", 8),
                    entry(EntryLevel::Series, "ser-grilles-ag", "AG", 9),
                ],
            },
            warnings: Vec::new(),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn counted_pluralizes() {
        assert_eq!(counted(1, "model", "models"), "1 model");
        assert_eq!(counted(0, "model", "models"), "0 models");
        assert_eq!(counted(2, "series", "series"), "2 series");
    }

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024 + 300 * 1024), "3.3 MB");
    }

    // =========================================================================
    // Check
    // =========================================================================

    #[test]
    fn summary_header_line() {
        let lines = format_summary(&summary());
        assert_eq!(
            lines[0],
            "Ventilation 2025 (2 sections, 3 series, 1 model, 10 pages)"
        );
        assert_eq!(lines[1], "    Templates: built-in");
    }

    #[test]
    fn summary_contents_restart_series_index_per_section() {
        let lines = format_summary(&summary());
        assert_eq!(
            &lines[2..],
            &[
                "Contents",
                "001 Fans → #sec-fans",
                "    001 SDCXL → #ser-fans-sdcxl",
                "    002 KVR → #ser-fans-kvr",
                "002 Grilles → #sec-grilles",
                "    001 AG → #ser-grilles-ag",
            ]
        );
    }

    #[test]
    fn summary_untitled() {
        let mut s = summary();
        s.title = "  ".into();
        assert!(format_summary(&s)[0].starts_with("(untitled catalog)"));
    }

    #[test]
    fn empty_catalog_has_no_contents_block() {
        let mut s = summary();
        s.index = PageIndex::default();
        let lines = format_summary(&s);
        assert!(!lines.iter().any(|l| l == "Contents"));
    }

    #[test]
    fn warnings_listed_with_location() {
        let lines = format_warnings(&[AssetWarning {
            reference: "sdcxl/hero.jpg".into(),
            expected_at: PathBuf::from("output/images/sdcxl/hero.jpg"),
        }]);
        assert_eq!(
            lines,
            vec![
                "Warnings",
                "    Missing image: sdcxl/hero.jpg",
                "        Expected at: output/images/sdcxl/hero.jpg",
            ]
        );
    }

    #[test]
    fn no_warnings_no_block() {
        assert!(format_warnings(&[]).is_empty());
    }

    // =========================================================================
    // Build
    // =========================================================================

    #[test]
    fn run_report_lists_files() {
        let report = RunReport {
            summary: summary(),
            html_path: PathBuf::from("output/catalog.html"),
            html_bytes: 2048,
            pdf: Some(PdfOutput {
                path: PathBuf::from("output/catalog.pdf"),
                bytes: 100,
                engine: "chromium",
            }),
        };
        let lines = format_run_report(&report);
        let tail = &lines[lines.len() - 2..];
        assert_eq!(tail[0], "HTML → output/catalog.html (2.0 KB)");
        assert_eq!(tail[1], "PDF → output/catalog.pdf (100 B, chromium)");
    }

    #[test]
    fn run_report_without_pdf() {
        let report = RunReport {
            summary: summary(),
            html_path: PathBuf::from("catalog.html"),
            html_bytes: 10,
            pdf: None,
        };
        let lines = format_run_report(&report);
        assert_eq!(lines.last().unwrap(), "PDF skipped (pdf_output is empty)");
    }
}
