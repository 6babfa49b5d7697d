//! Input normalisation and line-level helpers.

/// Prepare raw input for the block passes.
///
/// Drops a leading byte order mark and every U+001A, turns `\r\n` and lone
/// `\r` into `\n`, appends two newlines and expands tabs.
pub fn normalize(text: &str, tab_width: usize) -> String {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let mut out = String::with_capacity(text.len() + 2);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\u{1A}' => {}
            '\r' => {
                chars.next_if_eq(&'\n');
                out.push('\n');
            }
            _ => out.push(c),
        }
    }
    out.push_str("\n\n");
    detab(&out, tab_width)
}

/// Expand tabs to the next multiple of `tab_width`, counting columns in
/// characters.
pub fn detab(text: &str, tab_width: usize) -> String {
    if !text.contains('\t') {
        return text.to_owned();
    }
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let mut column = 0;
        for (j, block) in line.split('\t').enumerate() {
            if j > 0 {
                let pad = tab_width - column % tab_width;
                out.extend(std::iter::repeat_n(' ', pad));
                column += pad;
            }
            out.push_str(block);
            column += block.chars().count();
        }
    }
    out
}

/// Empty every line that holds only spaces.
pub fn blank_space_lines(text: &str) -> String {
    map_lines(text, |line| {
        if !line.is_empty() && line.bytes().all(|b| b == b' ') { "" } else { line }
    })
}

/// Remove one tab or up to `tab_width` leading spaces from every line.
pub fn outdent(text: &str, tab_width: usize) -> String {
    map_lines(text, |line| {
        if let Some(rest) = line.strip_prefix('\t') {
            return rest;
        }
        let spaces = line.bytes().take(tab_width).take_while(|&b| b == b' ').count();
        &line[spaces..]
    })
}

/// Apply `f` to every line, keeping the newlines.
pub fn map_lines<'a, F>(text: &'a str, mut f: F) -> String
where
    F: FnMut(&'a str) -> &'a str,
{
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(f(line));
    }
    out
}

/// Whitespace trimmed by [`trim_ascii_ws`]: space, tab, newline, carriage
/// return, NUL and vertical tab.
#[inline]
pub fn is_trim_ws(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0 | 0x0B)
}

/// Trim [`is_trim_ws`] bytes from both ends.
pub fn trim_ascii_ws(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_ascii() && is_trim_ws(c as u8))
}

/// Trim `\n` from both ends.
#[inline]
pub fn trim_newlines(text: &str) -> &str {
    text.trim_matches('\n')
}
