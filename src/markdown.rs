//! Markdown to HTML for catalog text fields.
//!
//! Catalog text (`intro_md`, `summary_md`, `description_md`, ...) comes from a
//! data-entry workflow and is less trusted than the templates, so the
//! conversion is restricted:
//!
//! | Markdown | Output |
//! |---|---|
//! | paragraphs, `**bold**`, `*italic*`, `~~strike~~` | normal HTML |
//! | bullet and numbered lists, pipe tables | normal HTML |
//! | `[text](url)` with http, https, mailto, tel, relative or `#` targets | link |
//! | links/images with any other scheme (`javascript:`, `data:`, ...) | `href="#"` |
//! | raw HTML, block or inline | escaped text |
//!
//! Conversion is a pure function: empty input gives an empty fragment.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Convert markdown to an HTML fragment safe to embed in the document.
pub fn render(markdown: &str) -> String {
    if markdown.trim().is_empty() {
        return String::new();
    }

    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    // Browsers drop tabs/newlines inside a scheme, so check the compacted form.
    let compact: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect();
    let scheme_end = compact.find(':');
    let path_start = compact.find(['/', '?', '#']);
    let scheme = match (scheme_end, path_start) {
        (Some(colon), Some(path)) if colon > path => None,
        (Some(colon), _) => Some(&compact[..colon]),
        (None, _) => None,
    };
    match scheme {
        Some(s) if !SAFE_SCHEMES.contains(&s.to_ascii_lowercase().as_str()) => {
            CowStr::Borrowed("#")
        }
        _ => url,
    }
}

/// First non-empty line of `text` with inline markers removed, truncated to
/// `max_chars` characters (an ellipsis marks the cut).
pub fn first_line_plain(text: &str, max_chars: usize) -> String {
    let Some(line) = text.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return String::new();
    };
    let plain = line
        .trim_start_matches('#')
        .replace("**", "")
        .replace("__", "")
        .replace('`', "");
    let plain = plain.trim();
    if plain.chars().count() <= max_chars {
        return plain.to_string();
    }
    let cut: String = plain.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}
