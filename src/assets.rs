//! Image reference resolution.
//!
//! Catalog paths (`cover_bg`, `hero.photo`, `model.image`, ...) are relative
//! to the images directory. They are rewritten here, at render time, into
//! URLs the HTML document can load:
//!
//! ```text
//! "sdcxl\\hero.jpg"        →  "images/sdcxl/hero.jpg"
//! "https://cdn/x.png"      →  "https://cdn/x.png"          (passed through)
//! "/srv/shared/logo.svg"   →  "file:///srv/shared/logo.svg"
//! ```
//!
//! A referenced file that does not exist is not an error: the reference is
//! kept (flagged `missing`, so templates can add a placeholder class) and an
//! [`AssetWarning`] is recorded for the run report.

use serde::Serialize;
use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};

/// A resolved image reference as templates see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRef {
    pub url: String,
    pub missing: bool,
}

/// A referenced file that was not found under the images root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetWarning {
    pub reference: String,
    pub expected_at: PathBuf,
}

impl fmt::Display for AssetWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "missing asset \"{}\" (expected at {})",
            self.reference,
            self.expected_at.display()
        )
    }
}

pub struct AssetResolver {
    root: PathBuf,
    url_prefix: String,
    warnings: RefCell<Vec<AssetWarning>>,
}

impl AssetResolver {
    /// `root` is where files are looked up on disk; `url_prefix` is what the
    /// document uses to reach that same directory.
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str) -> Self {
        let mut url_prefix = url_prefix.replace('\\', "/");
        if !url_prefix.is_empty() && !url_prefix.ends_with('/') {
            url_prefix.push('/');
        }
        Self {
            root: root.into(),
            url_prefix,
            warnings: RefCell::new(Vec::new()),
        }
    }

    /// Resolver for a document written to `html_output`, with images in
    /// `images_dir` (relative to the document's directory, or absolute).
    pub fn for_output(html_output: &Path, images_dir: &Path) -> Self {
        let html_dir = html_output.parent().unwrap_or(Path::new(""));
        if images_dir.is_absolute() {
            let prefix = format!("file://{}", images_dir.display());
            Self::new(images_dir, &prefix)
        } else {
            let prefix = images_dir.to_string_lossy().replace('\\', "/");
            Self::new(html_dir.join(images_dir), &prefix)
        }
    }

    pub fn resolve(&self, reference: &str) -> AssetRef {
        let normalized = reference.trim().replace('\\', "/");
        if is_url(&normalized) {
            return AssetRef {
                url: normalized,
                missing: false,
            };
        }

        let (url, on_disk) = if Path::new(&normalized).is_absolute() {
            (format!("file://{normalized}"), PathBuf::from(&normalized))
        } else {
            let relative = normalized.trim_start_matches("./");
            (
                format!("{}{}", self.url_prefix, relative),
                self.root.join(relative),
            )
        };

        let missing = !on_disk.is_file();
        if missing {
            self.record(reference, on_disk);
        }
        AssetRef {
            url: url.replace(' ', "%20"),
            missing,
        }
    }

    pub fn resolve_opt(&self, reference: Option<&str>) -> Option<AssetRef> {
        reference.map(|r| self.resolve(r))
    }

    /// Warnings recorded so far, in first-seen order, without duplicates.
    pub fn take_warnings(&self) -> Vec<AssetWarning> {
        self.warnings.take()
    }

    fn record(&self, reference: &str, expected_at: PathBuf) {
        let mut warnings = self.warnings.borrow_mut();
        if warnings.iter().any(|w| w.reference == reference) {
            return;
        }
        tracing::warn!(
            reference,
            expected_at = %expected_at.display(),
            "referenced asset not found"
        );
        warnings.push(AssetWarning {
            reference: reference.to_string(),
            expected_at,
        });
    }
}

fn is_url(reference: &str) -> bool {
    let lower = reference.to_ascii_lowercase();
    ["http://", "https://", "data:", "file:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}
