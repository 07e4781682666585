//! Table of contents, rendered from the composer's [`PageIndex`].
//!
//! Each entry links to its section or series anchor and carries the ordinal
//! position of the target fragment in `data-ordinal`. When the paged-media
//! polyfill runs, the stylesheet replaces that with the real page number via
//! `target-counter()`.

use crate::compose::{EntryLevel, PageIndex};
use crate::theme::Theme;
use maud::{Markup, html};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TocView {
    pub sections: Vec<TocSection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TocSection {
    pub anchor: String,
    pub title: String,
    pub ordinal: usize,
    pub series: Vec<TocItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TocItem {
    pub anchor: String,
    pub title: String,
    pub ordinal: usize,
}

pub fn build_view(index: &PageIndex) -> TocView {
    let mut sections: Vec<TocSection> = Vec::new();
    for entry in &index.entries {
        match entry.level {
            EntryLevel::Section => sections.push(TocSection {
                anchor: entry.anchor.clone(),
                title: entry.title.clone(),
                ordinal: entry.ordinal,
                series: Vec::new(),
            }),
            EntryLevel::Series => {
                // The index always lists a section before its series.
                if let Some(section) = sections.last_mut() {
                    section.series.push(TocItem {
                        anchor: entry.anchor.clone(),
                        title: entry.title.clone(),
                        ordinal: entry.ordinal,
                    });
                }
            }
        }
    }
    TocView { sections }
}

pub fn markup(view: &TocView, theme: &Theme) -> Markup {
    html! {
        h2.toc-title { (theme.labels.contents) }
        ol.toc {
            @for section in &view.sections {
                li.toc-section {
                    (entry_link(&section.anchor, &section.title, section.ordinal))
                    @if !section.series.is_empty() {
                        ol.toc-series {
                            @for item in &section.series {
                                li { (entry_link(&item.anchor, &item.title, item.ordinal)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn entry_link(anchor: &str, title: &str, ordinal: usize) -> Markup {
    html! {
        a.toc-link href={ "#" (anchor) } {
            span.toc-label { (title) }
            span.toc-page data-ordinal=(ordinal) {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::IndexEntry;
    use crate::test_helpers::*;

    fn entry(level: EntryLevel, anchor: &str, title: &str, ordinal: usize) -> IndexEntry {
        IndexEntry {
            level,
            anchor: anchor.into(),
            title: title.into(),
            ordinal,
        }
    }

    fn sample_index() -> PageIndex {
        PageIndex {
            entries: vec![
                entry(EntryLevel::Section, "sec-fans", "Fans", 3),
                entry(EntryLevel::Series, "ser-fans-a", "Series A", 4),
                entry(EntryLevel::Series, "ser-fans-b", "Series B", 6),
                entry(EntryLevel::Section, "sec-grilles", "Grilles", 8),
            ],
        }
    }

    #[test]
    fn series_nest_under_their_section() {
        let view = build_view(&sample_index());
        assert_eq!(view.sections.len(), 2);
        assert_eq!(view.sections[0].series.len(), 2);
        assert_eq!(view.sections[0].series[1].title, "Series B");
        assert!(view.sections[1].series.is_empty());
    }

    #[test]
    fn markup_links_and_ordinals() {
        let catalog = minimal_catalog();
        let env = TestEnv::new(&catalog);
        let html = markup(&build_view(&sample_index()), &env.theme).into_string();
        assert!(html.contains(r##"href="#ser-fans-b""##));
        assert!(html.contains(r#"data-ordinal="6""#));
        assert!(html.contains("Contents"));
        assert_eq!(html.matches("toc-link").count(), 4);
    }

    #[test]
    fn empty_index_renders_empty_list() {
        let catalog = minimal_catalog();
        let env = TestEnv::new(&catalog);
        let html = markup(&build_view(&PageIndex::default()), &env.theme).into_string();
        assert!(html.contains(r#"<ol class="toc"></ol>"#));
    }
}
