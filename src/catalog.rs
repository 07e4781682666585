//! Catalog document model.
//!
//! The typed, read-only representation of a catalog JSON file. Everything
//! downstream (stages, composer, export) consumes these types and never
//! mutates them.
//!
//! ## Input Shape
//!
//! ```json
//! {
//!   "settings": { "title": "...", "year": 2025, "currency": "₸", "company": { ... } },
//!   "sections": [
//!     { "code": "fans", "title": "Fans", "intro_md": "...",
//!       "series": [
//!         { "code": "sdcxl", "name": "SDCXL", "summary_md": "...",
//!           "hero": { "photo": "sdcxl/hero.jpg" },
//!           "tables": [ { "type": "technical", "title": "...",
//!                         "columns": [ { "key": "flow", "title": "Flow" } ],
//!                         "rows": [ { "flow": "1200 m³/h" } ] } ],
//!           "models": [ { "sku": "SDCXL-100", "name": "...", "price": 15000 } ] }
//!       ] }
//!   ]
//! }
//! ```
//!
//! ## Parsing Rules
//!
//! - Only the structural shape is checked: required keys must be present and
//!   lists must be lists. Values are not validated (a negative price or a
//!   missing image file is fine here).
//! - Unknown keys are ignored so newer data files keep loading.
//! - Optional text fields accept `null`, strings, numbers and booleans.
//!   Optional lists accept `null` as empty.
//! - Codes must be unique where they become anchors: section codes within the
//!   catalog, series codes within a section, SKUs within a series.
//!
//! Path-valued fields are kept exactly as written; they are resolved against
//! the images root at render time by [`crate::assets`].

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("cannot read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate {kind} code \"{code}\" at {location}")]
    DuplicateCode {
        kind: &'static str,
        code: String,
        location: String,
    },
}

/// Root of a catalog document.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub settings: Settings,
    #[serde(deserialize_with = "list")]
    pub sections: Vec<Section>,
}

/// Catalog-wide settings: branding, currency, company details.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(deserialize_with = "text")]
    pub year: String,
    #[serde(deserialize_with = "text")]
    pub title: String,
    #[serde(deserialize_with = "text")]
    pub subtitle: String,
    #[serde(deserialize_with = "text")]
    pub theme_color: String,
    #[serde(deserialize_with = "text")]
    pub currency: String,
    /// Digit-group separator for prices. `""` disables grouping.
    #[serde(deserialize_with = "text")]
    pub thousands_separator: String,
    #[serde(deserialize_with = "text")]
    pub lang: String,
    #[serde(deserialize_with = "path")]
    pub cover_bg: Option<String>,
    #[serde(deserialize_with = "path")]
    pub cover_logo: Option<String>,
    #[serde(deserialize_with = "text")]
    pub backcover_text: String,
    /// Image used behind each section divider; `{code}` is replaced with the
    /// section code, e.g. `"sections/{code}.jpg"`.
    #[serde(deserialize_with = "path")]
    pub section_cover_pattern: Option<String>,
    /// Emit one specification page per model after the series product grid.
    pub generate_model_pages: bool,
    pub company: Company,
}

pub const DEFAULT_THEME_COLOR: &str = "#E53935";
pub const DEFAULT_CURRENCY: &str = "₸";

impl Default for Settings {
    fn default() -> Self {
        Self {
            year: String::new(),
            title: String::new(),
            subtitle: String::new(),
            theme_color: DEFAULT_THEME_COLOR.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            thousands_separator: " ".to_string(),
            lang: "en".to_string(),
            cover_bg: None,
            cover_logo: None,
            backcover_text: String::new(),
            section_cover_pattern: None,
            generate_model_pages: false,
            company: Company::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Company {
    #[serde(deserialize_with = "text")]
    pub name: String,
    #[serde(deserialize_with = "text")]
    pub address: String,
    #[serde(deserialize_with = "text")]
    pub contacts: String,
    #[serde(deserialize_with = "text")]
    pub site: String,
}

/// Top-level grouping of series (an equipment type).
#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    #[serde(deserialize_with = "text")]
    pub code: String,
    #[serde(deserialize_with = "text")]
    pub title: String,
    #[serde(default, deserialize_with = "text")]
    pub intro_md: String,
    #[serde(default, deserialize_with = "list")]
    pub series: Vec<Series>,
}

/// A product line: descriptive pages, tables, and the models it contains.
#[derive(Debug, Clone, Deserialize)]
pub struct Series {
    #[serde(deserialize_with = "text")]
    pub code: String,
    #[serde(deserialize_with = "text")]
    pub name: String,
    #[serde(default, deserialize_with = "list")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "text")]
    pub summary_md: String,
    #[serde(default, deserialize_with = "text")]
    pub construction_md: String,
    /// Either a list of strings or a newline-separated string.
    #[serde(default, deserialize_with = "lines")]
    pub features: Vec<String>,
    #[serde(default)]
    pub hero: Option<Hero>,
    #[serde(default, deserialize_with = "list")]
    pub tables: Vec<Table>,
    #[serde(default, deserialize_with = "list")]
    pub media: Vec<Media>,
    #[serde(default, deserialize_with = "list")]
    pub models: Vec<Model>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Hero {
    #[serde(deserialize_with = "path")]
    pub photo: Option<String>,
    #[serde(deserialize_with = "text")]
    pub banner_md: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Technical,
    Acoustic,
    Dimensions,
    Pricing,
    #[default]
    #[serde(other)]
    Custom,
}

impl TableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TableKind::Technical => "technical",
            TableKind::Acoustic => "acoustic",
            TableKind::Dimensions => "dimensions",
            TableKind::Pricing => "pricing",
            TableKind::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Table {
    #[serde(default, rename = "type")]
    pub kind: TableKind,
    #[serde(default, deserialize_with = "text")]
    pub title: String,
    pub columns: Vec<Column>,
    #[serde(default, deserialize_with = "list")]
    pub rows: Vec<Row>,
    #[serde(default, deserialize_with = "text")]
    pub notes_md: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Column {
    #[serde(deserialize_with = "text")]
    pub key: String,
    #[serde(default, deserialize_with = "text")]
    pub title: String,
}

impl Column {
    /// Header label; falls back to the key when no title is given.
    pub fn label(&self) -> &str {
        if self.title.is_empty() {
            &self.key
        } else {
            &self.title
        }
    }
}

/// A table row, keyed by column (current format) or positional (legacy).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Row {
    Keyed(BTreeMap<String, Value>),
    Positional(Vec<Value>),
}

impl Row {
    /// Display text for the cell of `column` at position `index`.
    ///
    /// Missing cells are empty; keys not declared as columns are never read.
    pub fn cell(&self, index: usize, column: &Column) -> String {
        match self {
            Row::Keyed(map) => map.get(&column.key).map(display_value).unwrap_or_default(),
            Row::Positional(values) => values.get(index).map(display_value).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Drawing,
    Curve,
    Video,
    Doc,
    #[default]
    #[serde(other)]
    Photo,
}

impl MediaKind {
    /// Whether the file can be shown inline as an image.
    pub fn is_visual(self) -> bool {
        matches!(self, MediaKind::Photo | MediaKind::Drawing | MediaKind::Curve)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Drawing => "drawing",
            MediaKind::Curve => "curve",
            MediaKind::Video => "video",
            MediaKind::Doc => "doc",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Media {
    #[serde(default, deserialize_with = "text")]
    pub id: String,
    #[serde(default, rename = "type")]
    pub kind: MediaKind,
    #[serde(default, deserialize_with = "path")]
    pub file: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub caption: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Model {
    #[serde(deserialize_with = "text")]
    pub sku: String,
    #[serde(deserialize_with = "text")]
    pub name: String,
    #[serde(default, deserialize_with = "price")]
    pub price: Option<f64>,
    /// Overrides [`Settings::currency`] for this model.
    #[serde(default, deserialize_with = "path")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "path")]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "path")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub description_md: String,
    #[serde(default, deserialize_with = "list")]
    pub attributes: Vec<AttributeGroup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttributeGroup {
    #[serde(default, deserialize_with = "text")]
    pub group: String,
    #[serde(default, deserialize_with = "list")]
    pub items: Vec<Attribute>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Attribute {
    #[serde(default, deserialize_with = "text")]
    pub name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default, deserialize_with = "path")]
    pub unit: Option<String>,
}

impl Catalog {
    /// Parse a catalog from JSON text.
    pub fn parse(json: &str) -> Result<Catalog, ParseError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.check_codes()?;
        Ok(catalog)
    }

    pub fn series_count(&self) -> usize {
        self.sections.iter().map(|s| s.series.len()).sum()
    }

    pub fn model_count(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|s| &s.series)
            .map(|s| s.models.len())
            .sum()
    }

    fn check_codes(&self) -> Result<(), ParseError> {
        let mut sections = HashSet::new();
        for (si, section) in self.sections.iter().enumerate() {
            if !sections.insert(section.code.as_str()) {
                return Err(ParseError::DuplicateCode {
                    kind: "section",
                    code: section.code.clone(),
                    location: format!("sections[{si}]"),
                });
            }
            let mut series_codes = HashSet::new();
            for (ri, series) in section.series.iter().enumerate() {
                if !series_codes.insert(series.code.as_str()) {
                    return Err(ParseError::DuplicateCode {
                        kind: "series",
                        code: series.code.clone(),
                        location: format!("sections[{si}].series[{ri}]"),
                    });
                }
                let mut skus = HashSet::new();
                for (mi, model) in series.models.iter().enumerate() {
                    if !skus.insert(model.sku.as_str()) {
                        return Err(ParseError::DuplicateCode {
                            kind: "model sku",
                            code: model.sku.clone(),
                            location: format!("sections[{si}].series[{ri}].models[{mi}]"),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Load and parse a catalog JSON file.
pub fn load(path: &Path) -> Result<Catalog, ParseError> {
    let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Catalog::parse(&content)
}

/// Render a loose JSON value as display text.
///
/// Strings are kept verbatim, numbers use their JSON spelling, `null` is
/// empty and lists are joined with `", "`.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

// =============================================================================
// Lenient field deserializers
// =============================================================================

fn scalar_text<E: de::Error>(value: Option<Value>) -> Result<String, E> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(Value::Array(_)) => Err(E::invalid_type(Unexpected::Seq, &"a string or number")),
        Some(Value::Object(_)) => Err(E::invalid_type(Unexpected::Map, &"a string or number")),
    }
}

fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    scalar_text(Option::<Value>::deserialize(d)?)
}

/// Optional text where blank means absent (paths, units, overrides).
fn path<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let s = scalar_text::<D::Error>(Option::<Value>::deserialize(d)?)?;
    let trimmed = s.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
}

fn lines<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    match Option::<Value>::deserialize(d)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| scalar_text::<D::Error>(Some(item)))
            .filter(|item| !matches!(item, Ok(s) if s.trim().is_empty()))
            .collect(),
        other => Ok(scalar_text::<D::Error>(other)?
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()),
    }
}

fn price<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(value) if value.is_finite() => Ok(Some(value)),
            _ => Err(de::Error::invalid_value(
                Unexpected::Other(&n.to_string()),
                &"a finite price",
            )),
        },
        Some(Value::String(s)) => {
            let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
            if compact.is_empty() {
                return Ok(None);
            }
            match compact.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(Some(value)),
                _ => Err(de::Error::invalid_value(Unexpected::Str(&s), &"a numeric price")),
            }
        }
        Some(Value::Bool(b)) => Err(de::Error::invalid_type(Unexpected::Bool(b), &"a number")),
        Some(Value::Array(_)) => Err(de::Error::invalid_type(Unexpected::Seq, &"a number")),
        Some(Value::Object(_)) => Err(de::Error::invalid_type(Unexpected::Map, &"a number")),
    }
}
