//! Raw HTML block recognition.
//!
//! Blocks start at the top of the text or after a blank line, may be
//! indented by less than one tab stop and are protected whole, so they are
//! never wrapped in paragraphs and come out byte for byte.

use memchr::memmem;

use crate::context::Context;
use crate::cursor::is_space;

/// Tags that always open a block.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "table", "dl", "ol", "ul",
    "address", "script", "noscript", "form", "fieldset", "iframe", "math",
];

/// Tags that open a block only when the opening tag ends its line.
const LINE_TAGS: &[&str] = &["ins", "del"];

/// Replace every raw HTML block by a blank-line-delimited block token.
pub fn hash_html_blocks(ctx: &mut Context, text: &str) -> String {
    if !ctx.options.allow_raw_markup {
        return text.to_owned();
    }
    let bytes = text.as_bytes();
    let finder = memmem::Finder::new(b"\n\n");
    let mut out = String::new();
    let mut copied = 0;
    let mut pos = 0;

    loop {
        let Some(start) = next_candidate(bytes, pos, &finder) else {
            break;
        };
        let tag_start = if start == 0 && bytes.first() == Some(&b'\n') { 1 } else { start };
        match match_block(ctx, bytes, tag_start) {
            Some(end) => {
                let block = &text[tag_start..end];
                tracing::trace!(len = block.len(), "raw html block");
                out.push_str(&text[copied..start]);
                let token = ctx.protect_block(block);
                out.push_str("\n\n");
                out.push_str(&token);
                out.push_str("\n\n");
                copied = end;
                pos = end;
            }
            None => pos = start + 1,
        }
    }

    if copied == 0 {
        return text.to_owned();
    }
    out.push_str(&text[copied..]);
    out
}

/// First position at or after `pos` that is the start of the text or
/// directly follows two newlines.
fn next_candidate(bytes: &[u8], pos: usize, finder: &memmem::Finder) -> Option<usize> {
    if pos == 0 {
        return Some(0);
    }
    let from = pos.max(2) - 2;
    if from >= bytes.len() {
        return None;
    }
    finder.find(&bytes[from..]).map(|i| from + i + 2)
}

fn match_block(ctx: &Context, bytes: &[u8], start: usize) -> Option<usize> {
    let max_indent = ctx.tab_width() - 1;
    let indent = bytes[start..].iter().take(max_indent).take_while(|&&b| b == b' ').count();
    let lt = start + indent;
    if bytes.get(lt) != Some(&b'<') {
        return None;
    }
    let nesting = ctx.options.limits.html_block_nesting;
    let name_len = bytes[lt + 1..].iter().take_while(|b| b.is_ascii_alphanumeric()).count();
    let name = &bytes[lt + 1..lt + 1 + name_len];

    if is_one_of(name, BLOCK_TAGS) {
        if let Some(end) = match_element(bytes, lt, name, false, nesting) {
            return Some(end);
        }
    }
    if is_one_of(name, LINE_TAGS) {
        if let Some(end) = match_element(bytes, lt, name, true, nesting) {
            return Some(end);
        }
    }
    if name.eq_ignore_ascii_case(b"hr") {
        if let Some(end) = match_rule(bytes, lt + 3) {
            return Some(end);
        }
    }
    if bytes[lt..].starts_with(b"<!--") {
        return match_until_closer(bytes, lt + 4, b"-->");
    }
    match bytes.get(lt + 1) {
        Some(b'?') => match_until_closer(bytes, lt + 2, b"?>"),
        Some(b'%') => match_until_closer(bytes, lt + 2, b"%>"),
        _ => None,
    }
}

fn is_one_of(name: &[u8], tags: &[&str]) -> bool {
    !name.is_empty() && tags.iter().any(|t| name.eq_ignore_ascii_case(t.as_bytes()))
}

/// `<name attrs>` content `</name>` then spaces up to a newline or the end.
fn match_element(bytes: &[u8], lt: usize, name: &[u8], own_line: bool, nesting: usize) -> Option<usize> {
    let mut pos = scan_attributes(bytes, lt + 1 + name.len());
    if bytes.get(pos) != Some(&b'>') {
        return None;
    }
    pos += 1;
    if own_line {
        pos += count_spaces(bytes, pos);
        if bytes.get(pos) != Some(&b'\n') {
            return None;
        }
        pos += 1;
    }
    pos = scan_content(bytes, pos, name, 1, nesting);

    // The outermost closing tag allows no whitespace before `>`.
    let close = bytes.get(pos..pos + name.len() + 3)?;
    if !(close.starts_with(b"</") && close[2..2 + name.len()].eq_ignore_ascii_case(name) && close.ends_with(b">")) {
        return None;
    }
    pos += name.len() + 3;
    pos += count_spaces(bytes, pos);
    matches!(bytes.get(pos), None | Some(b'\n')).then_some(pos)
}

/// `<hr attrs/>` followed by a blank line or the end.
fn match_rule(bytes: &[u8], after_name: usize) -> Option<usize> {
    let mut pos = scan_attributes(bytes, after_name);
    if bytes.get(pos) == Some(&b'/') {
        pos += 1;
    }
    if bytes.get(pos) != Some(&b'>') {
        return None;
    }
    pos += 1;
    pos += count_spaces(bytes, pos);
    followed_by_blank_line(bytes, pos).then_some(pos)
}

/// `opener ... closer` where some closer is followed by spaces and then a
/// blank line or the end. Each closer is tried in turn.
fn match_until_closer(bytes: &[u8], body: usize, closer: &[u8]) -> Option<usize> {
    let mut from = body;
    while let Some(i) = memmem::find(&bytes[from..], closer) {
        let mut pos = from + i + closer.len();
        pos += count_spaces(bytes, pos);
        if followed_by_blank_line(bytes, pos) {
            return Some(pos);
        }
        from += i + 1;
    }
    None
}

/// At least two newlines, or the end of text (optionally after one newline).
fn followed_by_blank_line(bytes: &[u8], pos: usize) -> bool {
    let rest = &bytes[pos..];
    rest.is_empty() || rest == b"\n" || rest.starts_with(b"\n\n")
}

fn count_spaces(bytes: &[u8], pos: usize) -> usize {
    bytes[pos..].iter().take_while(|&&b| b == b' ').count()
}

/// Optional attributes: whitespace, then any run of text outside quotes,
/// slashes not directly before `>` and double-quoted strings.
/// Returns the position after the attributes (unchanged if there are none).
pub(crate) fn scan_attributes(bytes: &[u8], start: usize) -> usize {
    match bytes.get(start) {
        Some(&b) if is_space(b) => {}
        _ => return start,
    }
    let mut pos = start + 1;
    while let Some(&b) = bytes.get(pos) {
        match b {
            b'>' => break,
            b'/' => {
                let run = bytes[pos..].iter().take_while(|&&c| c == b'/').count();
                let take = if bytes.get(pos + run) == Some(&b'>') { run - 1 } else { run };
                if take == 0 {
                    break;
                }
                pos += take;
            }
            b'"' => match memchr::memchr(b'"', &bytes[pos + 1..]) {
                Some(i) => pos += i + 2,
                None => break,
            },
            _ => {
                pos += bytes[pos..]
                    .iter()
                    .take_while(|&&c| !matches!(c, b'>' | b'"' | b'/'))
                    .count();
            }
        }
    }
    pos
}

/// Content of an element at nesting `level`: text, nested same-name
/// elements and stray `<`. Stops at the first unbalanced `</name>`.
fn scan_content(bytes: &[u8], mut pos: usize, name: &[u8], level: usize, nesting: usize) -> usize {
    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            pos += memchr::memchr(b'<', &bytes[pos..]).unwrap_or(bytes.len() - pos);
            continue;
        }
        if let Some(end) = match_nested(bytes, pos, name, level, nesting) {
            pos = end;
            continue;
        }
        if closing_tag(bytes, pos, name).is_some() {
            break;
        }
        pos += 1;
    }
    pos
}

/// A nested `<name ...>` inside content at `level`. At the deepest level
/// the element has to close on its own line.
fn match_nested(bytes: &[u8], lt: usize, name: &[u8], level: usize, nesting: usize) -> Option<usize> {
    let name_end = lt + 1 + name.len();
    if !bytes.get(lt + 1..name_end)?.eq_ignore_ascii_case(name) {
        return None;
    }
    let pos = scan_attributes(bytes, name_end);
    if bytes[pos..].starts_with(b"/>") {
        return Some(pos + 2);
    }
    if bytes.get(pos) != Some(&b'>') {
        return None;
    }
    let body = pos + 1;
    if level < nesting {
        let inner = scan_content(bytes, body, name, level + 1, nesting);
        return closing_tag(bytes, inner, name);
    }
    let line_end = crate::cursor::line_end(bytes, body);
    (body..line_end)
        .filter(|&i| bytes[i] == b'<')
        .find_map(|i| closing_tag(bytes, i, name))
}

/// `</name\s*>` at `pos`; returns the position after it.
fn closing_tag(bytes: &[u8], pos: usize, name: &[u8]) -> Option<usize> {
    let name_start = pos + 2;
    let name_end = name_start + name.len();
    if !bytes[pos..].starts_with(b"</") || !bytes.get(name_start..name_end)?.eq_ignore_ascii_case(name) {
        return None;
    }
    let gt = name_end + bytes[name_end..].iter().take_while(|&&b| is_space(b)).count();
    (bytes.get(gt) == Some(&b'>')).then_some(gt + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;

    fn hash(text: &str) -> (String, Vec<String>) {
        hash_with(&Options::default(), text)
    }

    fn hash_with(options: &Options, text: &str) -> (String, Vec<String>) {
        let mut ctx = Context::new(options);
        let out = hash_html_blocks(&mut ctx, text);
        let blocks = (1..=ctx.vault.len())
            .map(|id| ctx.vault.resolve(&format!("B\u{1A}{id}B")))
            .collect();
        (out, blocks)
    }

    #[test]
    fn test_div_block() {
        let (out, blocks) = hash("<div>\nhello *there*\n</div>\n\n");
        assert_eq!(out, "\n\nB\u{1A}1B\n\n\n\n");
        assert_eq!(blocks, vec!["<div>\nhello *there*\n</div>"]);
    }

    #[test]
    fn test_block_needs_blank_line_before() {
        let (out, blocks) = hash("text\n<div>x</div>\n\n");
        assert_eq!(out, "text\n<div>x</div>\n\n");
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_nested_same_name() {
        let text = "<div>\n<div>\ninner\n</div>\nouter\n</div>\n";
        let (_, blocks) = hash(text);
        assert_eq!(blocks, vec![text.trim_end()]);
    }

    #[test]
    fn test_innermost_nesting_closes_on_its_line() {
        // Six levels; the fifth closes on its own line at the sixth's
        // closing tag, so the block ends one `</div>` early.
        let text = "<div>\n<div>\n<div>\n<div>\n<div><div>x</div>\n</div>\n</div>\n</div>\n</div>\n</div>\n";
        let (out, blocks) = hash(text);
        let block = "<div>\n<div>\n<div>\n<div>\n<div><div>x</div>\n</div>\n</div>\n</div>\n</div>";
        assert_eq!(blocks, vec![block]);
        assert_eq!(out, "\n\nB\u{1A}1B\n\n\n</div>\n");
    }

    #[test]
    fn test_nesting_bound_is_configurable() {
        let text = "<div>\n<div>\nx\n</div>\n</div>\n";
        let (_, blocks) = hash(text);
        assert_eq!(blocks, vec![text.trim_end()]);

        let mut options = Options::default();
        options.limits.html_block_nesting = 1;
        let (out, blocks) = hash_with(&options, text);
        assert_eq!(blocks, vec!["<div>\n<div>\nx\n</div>"]);
        assert_eq!(out, "\n\nB\u{1A}1B\n\n\n</div>\n");
    }

    #[test]
    fn test_trailing_text_after_close_rejects() {
        let (out, _) = hash("<div>x</div> tail\n\n");
        assert_eq!(out, "<div>x</div> tail\n\n");
    }

    #[test]
    fn test_case_insensitive_tags() {
        let (_, blocks) = hash("<DIV class=\"a>b\">x</div>\n");
        assert_eq!(blocks, vec!["<DIV class=\"a>b\">x</div>"]);
    }

    #[test]
    fn test_ins_needs_own_line() {
        let (_, blocks) = hash("<ins>x</ins>\n\n");
        assert!(blocks.is_empty());
        let (_, blocks) = hash("<ins>\nx\n</ins>\n\n");
        assert_eq!(blocks, vec!["<ins>\nx\n</ins>"]);
    }

    #[test]
    fn test_hr_and_comment() {
        let (_, blocks) = hash("<hr/>\n\n<!-- note -->\n\n");
        assert_eq!(blocks, vec!["<hr/>", "<!-- note -->"]);
    }

    #[test]
    fn test_comment_tries_later_closers() {
        let (_, blocks) = hash("<!-- a --> b -->\n\n");
        assert_eq!(blocks, vec!["<!-- a --> b -->"]);
    }

    #[test]
    fn test_processing_instruction() {
        let (_, blocks) = hash("<?php echo 1; ?>\n\n");
        assert_eq!(blocks, vec!["<?php echo 1; ?>"]);
    }

    #[test]
    fn test_indent_limit() {
        let (_, blocks) = hash("   <div>x</div>\n");
        assert_eq!(blocks, vec!["   <div>x</div>"]);
        let (_, blocks) = hash("    <div>x</div>\n");
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_disabled_markup() {
        let options = Options {
            allow_raw_markup: false,
            ..Options::default()
        };
        let mut ctx = Context::new(&options);
        assert_eq!(hash_html_blocks(&mut ctx, "<div>x</div>\n"), "<div>x</div>\n");
    }

    #[test]
    fn test_scan_attributes() {
        assert_eq!(scan_attributes(b" a=\"/>\" b>", 0), 9);
        assert_eq!(scan_attributes(b" />", 0), 1);
        assert_eq!(scan_attributes(b"x>", 0), 0);
    }
}
