//! Heuristic chapter segmentation of decoded MOBI markup.
//!
//! Headings are located with a fixed table of rules evaluated directly
//! against the markup. Each match becomes a marker; markers from all rules
//! are merged by position, near-duplicates are dropped, and the markup is cut
//! at the surviving markers.

use memchr::memchr_iter;
use tracing::debug;

use crate::model::Chapter;
use crate::options::ParseOptions;
use crate::util::{attribute_value, find_close_tag, is_tag_named, plain_text};

/// One family of heading markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingRule {
    /// Element name, matched case-insensitively.
    pub tag: &'static str,
    /// When set, the element's `class` attribute must contain this substring
    /// (case-insensitively).
    pub class_contains: Option<&'static str>,
}

/// Heading rules, in priority order for markers at the same position.
pub static HEADING_RULES: &[HeadingRule] = &[
    HeadingRule {
        tag: "h1",
        class_contains: None,
    },
    HeadingRule {
        tag: "h2",
        class_contains: None,
    },
    HeadingRule {
        tag: "p",
        class_contains: Some("chapter"),
    },
];

/// A candidate chapter start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Byte offset of the heading's opening `<`.
    pub position: usize,
    pub title: String,
}

impl HeadingRule {
    /// All non-overlapping matches of this rule, in document order.
    pub fn find_markers(&self, markup: &str, max_title_chars: usize) -> Vec<Marker> {
        let bytes = markup.as_bytes();
        let mut markers = Vec::new();
        let mut resume = 0;

        for lt in memchr_iter(b'<', bytes) {
            if lt < resume || !is_tag_named(markup, lt + 1, self.tag) {
                continue;
            }
            let Some(gt) = memchr::memchr(b'>', &bytes[lt..]).map(|p| lt + p) else {
                break;
            };
            let attrs = &markup[lt + 1 + self.tag.len()..gt];
            if !self.accepts_attributes(attrs) {
                continue;
            }
            // No closing tag past here means none for any later opening either.
            let Some((close, after)) = find_close_tag(markup, self.tag, gt + 1) else {
                break;
            };

            resume = after;
            let title = plain_text(&markup[gt + 1..close]);
            let len = title.chars().count();
            if len == 0 || len >= max_title_chars {
                continue;
            }
            markers.push(Marker {
                position: lt,
                title,
            });
        }

        markers
    }

    fn accepts_attributes(&self, attrs: &str) -> bool {
        let Some(needle) = self.class_contains else {
            return true;
        };
        attribute_value(attrs, "class").is_some_and(|class| {
            class
                .to_ascii_lowercase()
                .contains(&needle.to_ascii_lowercase())
        })
    }
}

/// Collect markers from every rule, sorted by position, with near-duplicates
/// removed.
///
/// A marker is dropped when it lies fewer than `duplicate_window` characters
/// after the last marker that was kept.
pub fn find_markers(markup: &str, options: &ParseOptions) -> Vec<Marker> {
    let mut all: Vec<Marker> = HEADING_RULES
        .iter()
        .flat_map(|rule| rule.find_markers(markup, options.max_title_chars))
        .collect();
    // Stable: ties keep rule order.
    all.sort_by_key(|m| m.position);

    let mut kept: Vec<Marker> = Vec::with_capacity(all.len());
    for marker in all {
        if let Some(last) = kept.last() {
            let distance = markup[last.position..marker.position].chars().count();
            if distance < options.duplicate_window {
                continue;
            }
        }
        kept.push(marker);
    }
    kept
}

/// Split `markup` into chapters.
///
/// With at least one marker, chapter `i` runs from marker `i` to marker
/// `i + 1` (the first chapter also takes any text before its marker, the last
/// runs to the end). Without markers the whole markup is one chapter titled
/// `container_name`, or the configured fallback title if that is empty.
pub fn segment(markup: &str, container_name: &str, options: &ParseOptions) -> Vec<Chapter> {
    let markers = find_markers(markup, options);

    if markers.is_empty() {
        let title = if container_name.trim().is_empty() {
            options.fallback_title.clone()
        } else {
            container_name.to_string()
        };
        debug!("no chapter headings found; using a single chapter");
        return vec![make_chapter(1, title, markup, 0)];
    }

    let mut chapters = Vec::with_capacity(markers.len());
    for (i, marker) in markers.iter().enumerate() {
        let start = if i == 0 { 0 } else { marker.position };
        let end = markers
            .get(i + 1)
            .map(|next| next.position)
            .unwrap_or(markup.len());
        chapters.push(make_chapter(
            i + 1,
            marker.title.clone(),
            &markup[start..end],
            start,
        ));
    }

    debug!(chapters = chapters.len(), "segmented markup");
    chapters
}

fn make_chapter(number: usize, title: String, slice: &str, offset: usize) -> Chapter {
    Chapter {
        id: format!("chapter-{number}"),
        title,
        plain_text: plain_text(slice),
        raw_markup: slice.to_string(),
        offset,
    }
}
