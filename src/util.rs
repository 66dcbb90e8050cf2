//! Markup helpers shared by the chapter segmenter and stylesheet extraction.
//!
//! All searches here are ASCII case-insensitive and operate on byte offsets
//! that are guaranteed to fall on `char` boundaries (they always point at an
//! ASCII byte).

use memchr::memchr;

/// Entities decoded in plain text. Anything else is left verbatim.
const ENTITIES: [(&str, char); 5] = [
    ("&nbsp;", ' '),
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
];

/// Convert a markup fragment to plain text.
///
/// Every tag (`<` followed by at least one non-`>` byte and a closing `>`) is
/// replaced by a space, the fixed entity set is decoded, and whitespace runs
/// collapse to a single space. The result is trimmed.
pub fn plain_text(markup: &str) -> String {
    let stripped = strip_tags(markup);
    let decoded = decode_entities(&stripped);
    collapse_whitespace(&decoded)
}

/// Replace each `<...>` tag with a single space.
pub fn strip_tags(markup: &str) -> String {
    let bytes = markup.as_bytes();
    let mut out = String::with_capacity(markup.len());
    let mut copied = 0;
    let mut pos = 0;

    while let Some(rel) = memchr(b'<', &bytes[pos..]) {
        let lt = pos + rel;
        let Some(gt_rel) = memchr(b'>', &bytes[lt + 1..]) else {
            break;
        };
        let gt = lt + 1 + gt_rel;
        if gt == lt + 1 {
            // "<>" is not a tag
            pos = gt + 1;
            continue;
        }
        out.push_str(&markup[copied..lt]);
        out.push(' ');
        copied = gt + 1;
        pos = copied;
    }

    out.push_str(&markup[copied..]);
    out
}

/// Decode `&nbsp; &amp; &lt; &gt; &quot;` in a single pass.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match ENTITIES.iter().find(|(name, _)| tail.starts_with(name)) {
            Some((name, ch)) => {
                out.push(*ch);
                rest = &tail[name.len()..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Collapse runs of whitespace to one space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Find `needle` (ASCII, any case) in `haystack` at or after `from`.
pub fn find_ascii_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let hay = haystack.as_bytes().get(from..)?;
    let needle = needle.as_bytes();
    if needle.is_empty() {
        return Some(from);
    }
    hay.windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
        .map(|p| from + p)
}

/// Whether `haystack[at..]` starts with `prefix`, ignoring ASCII case.
pub fn starts_with_ascii_ci(haystack: &str, at: usize, prefix: &str) -> bool {
    haystack
        .as_bytes()
        .get(at..at + prefix.len())
        .is_some_and(|b| b.eq_ignore_ascii_case(prefix.as_bytes()))
}

/// Whether the tag whose name starts at `name_start` is exactly `name`:
/// the name must be followed by whitespace, `>` or `/`.
pub fn is_tag_named(markup: &str, name_start: usize, name: &str) -> bool {
    if !starts_with_ascii_ci(markup, name_start, name) {
        return false;
    }
    matches!(
        markup.as_bytes().get(name_start + name.len()),
        Some(b'>' | b'/') | Some(b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')
    )
}

/// Find the closing `</name>` tag at or after `from`. Returns the offset of
/// its `<` and the offset just past its `>`.
pub fn find_close_tag(markup: &str, name: &str, from: usize) -> Option<(usize, usize)> {
    let mut pos = from;
    loop {
        let lt = find_ascii_ci(markup, "</", pos)?;
        if starts_with_ascii_ci(markup, lt + 2, name) {
            let after = lt + 2 + name.len();
            let bytes = markup.as_bytes();
            let mut end = after;
            while bytes.get(end).is_some_and(u8::is_ascii_whitespace) {
                end += 1;
            }
            if bytes.get(end) == Some(&b'>') {
                return Some((lt, end + 1));
            }
        }
        pos = lt + 2;
    }
}

/// Value of attribute `name` inside an opening tag's attribute text.
///
/// Handles double-quoted, single-quoted and bare values.
pub fn attribute_value<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    let bytes = attrs.as_bytes();
    let mut from = 0;

    while let Some(at) = find_ascii_ci(attrs, name, from) {
        from = at + name.len();

        // Must be a whole attribute name
        let boundary_before = at == 0 || bytes[at - 1].is_ascii_whitespace();
        if !boundary_before {
            continue;
        }

        let mut pos = from;
        while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
            pos += 1;
        }
        if bytes.get(pos) != Some(&b'=') {
            continue;
        }
        pos += 1;
        while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
            pos += 1;
        }

        return match bytes.get(pos) {
            Some(&quote @ (b'"' | b'\'')) => {
                let start = pos + 1;
                let len = memchr(quote, &bytes[start..]).unwrap_or(bytes.len() - start);
                Some(&attrs[start..start + len])
            }
            Some(_) => {
                let len = bytes[pos..]
                    .iter()
                    .position(|b| b.is_ascii_whitespace() || *b == b'/' || *b == b'>')
                    .unwrap_or(bytes.len() - pos);
                Some(&attrs[pos..pos + len])
            }
            None => Some(""),
        };
    }

    None
}
