//! Inline stylesheet extraction.

use crate::util::{find_ascii_ci, find_close_tag, is_tag_named};

/// Concatenate the contents of every `<style>` element, in document order.
///
/// Each block is trimmed and blocks are joined with a newline. Unterminated
/// `<style>` elements are ignored.
pub fn extract_css(markup: &str) -> String {
    let mut blocks = Vec::new();
    let mut pos = 0;

    while let Some(lt) = find_ascii_ci(markup, "<style", pos) {
        pos = lt + 1;
        if !is_tag_named(markup, lt + 1, "style") {
            continue;
        }
        let Some(gt) = markup[lt..].find('>').map(|p| lt + p) else {
            break;
        };
        let Some((close, after)) = find_close_tag(markup, "style", gt + 1) else {
            break;
        };

        let css = markup[gt + 1..close].trim();
        if !css.is_empty() {
            blocks.push(css);
        }
        pos = after;
    }

    blocks.join("\n")
}
