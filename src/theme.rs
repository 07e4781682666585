//! Shared template context: branding, currency, company, labels.
//!
//! Every stage receives the same [`Theme`] instead of copying settings into
//! each stage's own context. The brand colour reaches the stylesheet as the
//! `--brand` custom property (see [`generate_theme_css`]).

use crate::catalog::{Company, DEFAULT_THEME_COLOR, Settings};
use crate::config::Labels;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Theme {
    pub title: String,
    pub subtitle: String,
    pub year: String,
    pub color: String,
    pub currency: String,
    pub thousands_separator: String,
    pub lang: String,
    pub company: Company,
    pub labels: Labels,
}

impl Theme {
    pub fn new(settings: &Settings, labels: &Labels) -> Self {
        let color = match sanitize_color(&settings.theme_color) {
            Some(color) => color.to_string(),
            None => {
                tracing::warn!(
                    value = %settings.theme_color,
                    fallback = DEFAULT_THEME_COLOR,
                    "theme_color is not a plain CSS colour, using the default"
                );
                DEFAULT_THEME_COLOR.to_string()
            }
        };
        Self {
            title: settings.title.clone(),
            subtitle: settings.subtitle.clone(),
            year: settings.year.clone(),
            color,
            currency: settings.currency.clone(),
            thousands_separator: settings.thousands_separator.clone(),
            lang: settings.lang.clone(),
            company: settings.company.clone(),
            labels: labels.clone(),
        }
    }

    /// Format a model price with the catalog currency (or a per-model one).
    /// Models without a price get an empty string.
    pub fn price(&self, value: Option<f64>, currency: Option<&str>) -> String {
        match value {
            Some(v) => format_price(
                v,
                currency.unwrap_or(&self.currency),
                &self.thousands_separator,
            ),
            None => String::new(),
        }
    }
}

/// `15000, "₸", " "` → `"15 000 ₸"`. The amount is rounded to cents first;
/// whole amounts then drop the decimals, others keep two.
pub fn format_price(value: f64, currency: &str, separator: &str) -> String {
    let cents = (value.abs() * 100.0).round();
    let sign = if value < 0.0 && cents > 0.0 { "-" } else { "" };
    let amount = cents / 100.0;
    let fixed = if cents % 100.0 == 0.0 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    };
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(fixed.len() + separator.len() * 4);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(*digit);
    }

    let mut out = format!("{sign}{grouped}");
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    if !currency.is_empty() {
        out.push(' ');
        out.push_str(currency);
    }
    out
}

/// Accept hex colours, `rgb()/rgba()/hsl()/hsla()` and named colours;
/// anything else could break out of the stylesheet.
pub fn sanitize_color(raw: &str) -> Option<&str> {
    let color = raw.trim();
    if let Some(hex) = color.strip_prefix('#') {
        let ok = matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
        return ok.then_some(color);
    }
    for func in ["rgb(", "rgba(", "hsl(", "hsla("] {
        if let Some(args) = color.to_ascii_lowercase().strip_prefix(func) {
            let ok = args.strip_suffix(')').is_some_and(|inner| {
                inner
                    .chars()
                    .all(|c| c.is_ascii_digit() || " .,%/deg".contains(c))
            });
            return ok.then_some(color);
        }
    }
    let named = !color.is_empty() && color.chars().all(|c| c.is_ascii_alphabetic());
    named.then_some(color)
}

/// CSS custom properties derived from the theme.
pub fn generate_theme_css(theme: &Theme) -> String {
    format!(
        r#":root {{
    --brand: {color};
}}"#,
        color = theme.color,
    )
}
