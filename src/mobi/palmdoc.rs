//! PalmDOC LZ77 compression codec
//!
//! The compression scheme is simple:
//! - Byte 0x00 and bytes 0x09-0x7F: Literal character
//! - Bytes 0x01-0x08: Copy next 'n' bytes literally
//! - Bytes 0x80-0xBF: Back-reference (LZ77)
//!   - Combined with next byte: distance = (val & 0x3FFF) >> 3, length = (val & 7) + 3
//! - Bytes 0xC0-0xFF: Space + (byte ^ 0x80)
//!
//! Malformed input never panics. A literal run or back-reference cut off by
//! the end of the record ends decoding of that record; a back-reference
//! pointing before the start of the output copies nothing.

use tracing::warn;

/// Largest distance a back-reference can encode (11 bits).
pub const MAX_DISTANCE: usize = 0x7FF;

const MIN_MATCH: usize = 3;
const MAX_MATCH: usize = 10;

pub fn decompress(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len() * 2);
    let mut bad_refs = 0usize;
    let mut i = 0;

    while i < input.len() {
        let c = input[i];
        i += 1;

        match c {
            0x01..=0x08 => {
                // Literal run of 1..=8 raw bytes
                let count = c as usize;
                let Some(run) = input.get(i..i + count) else {
                    output.extend_from_slice(&input[i..]);
                    warn!(wanted = count, left = input.len() - i, "literal run truncated");
                    break;
                };
                output.extend_from_slice(run);
                i += count;
            }
            0x00 | 0x09..=0x7F => output.push(c),
            0x80..=0xBF => {
                let Some(&next) = input.get(i) else {
                    warn!("back-reference truncated at end of record");
                    break;
                };
                i += 1;

                let combined = (((c as u16) << 8) | next as u16) & 0x3FFF;
                let distance = (combined >> 3) as usize;
                let length = (combined & 7) as usize + MIN_MATCH;

                if !copy_back(&mut output, distance, length) {
                    bad_refs += 1;
                }
            }
            0xC0..=0xFF => {
                // Packed space pair
                output.push(b' ');
                output.push(c ^ 0x80);
            }
        }
    }

    if bad_refs > 0 {
        warn!(count = bad_refs, "back-references outside decoded output were skipped");
    }

    output
}

/// Copy `length` bytes starting `distance` bytes before the end of `output`,
/// one at a time so overlapping copies repeat the pattern. Returns false if
/// the copy had to stop because the source fell outside the output.
fn copy_back(output: &mut Vec<u8>, distance: usize, length: usize) -> bool {
    for _ in 0..length {
        let Some(src) = output.len().checked_sub(distance) else {
            return false;
        };
        let Some(&byte) = output.get(src) else {
            return false;
        };
        output.push(byte);
    }
    true
}

/// Encode `input` as a PalmDOC stream.
///
/// Produces a stream [`decompress`] inverts exactly. Records in real books are
/// at most 4096 bytes; the encoder itself has no such limit.
pub fn compress(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        if let Some((distance, length)) = find_match(input, i) {
            let compound = (distance << 3) | (length - MIN_MATCH);
            output.push(0x80 | (compound >> 8) as u8);
            output.push((compound & 0xFF) as u8);
            i += length;
            continue;
        }

        let c = input[i];
        i += 1;

        // Space followed by 0x40..=0x7F packs into one byte
        if c == b' '
            && let Some(&next) = input.get(i)
            && (0x40..=0x7F).contains(&next)
        {
            output.push(next ^ 0x80);
            i += 1;
            continue;
        }

        if c == 0 || (0x09..0x80).contains(&c) {
            output.push(c);
            continue;
        }

        // Binary data (bytes 1-8 or >= 0x80) goes out as a literal run
        let start = i - 1;
        while i < input.len() && i - start < 8 && needs_escape(input[i]) {
            i += 1;
        }
        output.push((i - start) as u8);
        output.extend_from_slice(&input[start..i]);
    }

    output
}

fn needs_escape(b: u8) -> bool {
    (0x01..=0x08).contains(&b) || b >= 0x80
}

/// Longest earlier occurrence (3..=10 bytes, within `MAX_DISTANCE`) of the
/// bytes at `pos`. Matches may overlap `pos`; the decoder copies byte by byte.
fn find_match(data: &[u8], pos: usize) -> Option<(usize, usize)> {
    let max_len = MAX_MATCH.min(data.len() - pos);
    if max_len < MIN_MATCH {
        return None;
    }

    let mut best: Option<(usize, usize)> = None;
    for distance in 1..=pos.min(MAX_DISTANCE) {
        let src = pos - distance;
        let len = (0..max_len)
            .take_while(|&k| data[src + k] == data[pos + k])
            .count();
        if len >= MIN_MATCH && best.is_none_or(|(_, l)| len > l) {
            best = Some((distance, len));
            if len == max_len {
                break;
            }
        }
    }
    best
}
