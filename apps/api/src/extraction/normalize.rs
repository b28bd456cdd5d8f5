//! Width and whitespace canonicalization applied before every extractor.

const FULL_WIDTH_START: char = '\u{FF01}';
const FULL_WIDTH_END: char = '\u{FF5E}';
const FULL_WIDTH_OFFSET: u32 = 0xFEE0;
const IDEOGRAPHIC_SPACE: char = '\u{3000}';

/// Maps one full-width form (！ to ～) to its ASCII counterpart and the
/// ideographic space to an ordinary space. Other characters pass through.
pub fn to_half_width(c: char) -> char {
    if (FULL_WIDTH_START..=FULL_WIDTH_END).contains(&c) {
        char::from_u32(c as u32 - FULL_WIDTH_OFFSET).unwrap_or(c)
    } else if c == IDEOGRAPHIC_SPACE {
        ' '
    } else {
        c
    }
}

fn collapse_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut pending_space = false;
    for c in line.chars().map(to_half_width) {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }
    out
}

/// Canonicalizes raw posting text.
///
/// - full-width ASCII forms become half-width, U+3000 becomes a space
/// - tabs, NBSP and whitespace runs collapse to one space; lines are trimmed
/// - CRLF / CR become LF and runs of blank lines collapse to one
///
/// Line structure is kept because section slicing works line by line.
/// The function is total and idempotent.
pub fn normalize(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<String> = Vec::new();
    for line in unified.split('\n') {
        let collapsed = collapse_line(line);
        if collapsed.is_empty() && lines.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        lines.push(collapsed);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// Like [`normalize`] but folds line breaks too, for single-line values.
pub fn normalize_inline(text: &str) -> String {
    collapse_line(text)
}
