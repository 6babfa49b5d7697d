//! Blockquotes: runs of lines opened by `>`.
//!
//! A quote is one or more paragraphs, each starting with a `>` line and
//! continuing lazily over the following non-blank lines. The stripped
//! content goes through the full block gamut again, so quotes nest.

use memchr::memmem;

use super::{Splicer, next_line_start, run_block_gamut};
use crate::context::Context;
use crate::cursor::{is_space, line_end};
use crate::normalize::map_lines;

pub fn do_block_quotes(ctx: &mut Context, text: &str) -> String {
    let bytes = text.as_bytes();
    let mut splicer = Splicer::new(text);
    let mut pos = 0;

    while let Some(start) = next_line_start(bytes, pos) {
        let Some(end) = match_quote(bytes, start) else {
            pos = start + 1;
            continue;
        };
        let block = render_quote(ctx, &text[start..end]);
        let token = ctx.protect_block(&block);
        splicer.replace(start, end, &format!("\n{token}\n\n"));
        pos = end;
    }

    splicer.finish()
}

/// End of the quote opening at `start`, if any.
fn match_quote(bytes: &[u8], start: usize) -> Option<usize> {
    let mut pos = start;
    while let Some(after_first) = quote_line(bytes, pos) {
        pos = after_first;
        while pos < bytes.len() && bytes[pos] != b'\n' {
            let eol = line_end(bytes, pos);
            if eol == bytes.len() {
                break;
            }
            pos = eol + 1;
        }
        pos += bytes[pos..].iter().take_while(|&&b| b == b'\n').count();
    }
    (pos > start).then_some(pos)
}

/// A `>` line (with up to three spaces of indent and some content after
/// the marker) ending in a newline. Returns the start of the next line.
fn quote_line(bytes: &[u8], pos: usize) -> Option<usize> {
    let indent = bytes[pos..].iter().take(4).take_while(|&&b| b == b' ').count();
    if indent > 3 || bytes.get(pos + indent) != Some(&b'>') {
        return None;
    }
    let content = pos + indent + 1;
    let eol = line_end(bytes, content);
    (eol > content && eol < bytes.len()).then_some(eol + 1)
}

fn render_quote(ctx: &mut Context, quote: &str) -> String {
    let stripped = map_lines(quote, strip_quote_marker);
    let inner = run_block_gamut(ctx, &stripped);
    let indented = unindent_preformatted(&indent_lines(&inner));
    tracing::trace!(len = quote.len(), "blockquote");
    format!("<blockquote>\n{indented}\n</blockquote>")
}

/// Drop one level of `>` and empty all-space lines.
fn strip_quote_marker(line: &str) -> &str {
    let trimmed = line.trim_start_matches(' ');
    if let Some(rest) = trimmed.strip_prefix('>') {
        return rest.strip_prefix(' ').unwrap_or(rest);
    }
    if trimmed.is_empty() { "" } else { line }
}

/// Prefix every line with two spaces. A final newline opens no new line.
fn indent_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let body = text.strip_suffix('\n');
    for (i, line) in body.unwrap_or(text).split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str("  ");
        out.push_str(line);
    }
    if body.is_some() {
        out.push('\n');
    }
    out
}

/// Take back the indent inside `<pre>` elements, along with the whitespace
/// leading up to them.
fn unindent_preformatted(text: &str) -> String {
    let bytes = text.as_bytes();
    let open = memmem::Finder::new(b"<pre>");
    let close = memmem::Finder::new(b"</pre>");
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut pos = 0;

    while let Some(i) = open.find(&bytes[pos..]) {
        let pre = pos + i;
        let Some(j) = bytes.get(pre + 6..).and_then(|rest| close.find(rest)) else {
            break;
        };
        let end = pre + 6 + j + 6;
        let mut start = pre;
        while start > copied && is_space(bytes[start - 1]) {
            start -= 1;
        }
        out.push_str(&text[copied..start]);
        out.push_str(&remove_line_indent(&text[start..end]));
        copied = end;
        pos = end;
    }

    if copied == 0 {
        return text.to_owned();
    }
    out.push_str(&text[copied..]);
    out
}

/// Remove two leading spaces from every line of `text`, treating its start
/// as a line start.
fn remove_line_indent(text: &str) -> String {
    map_lines(text, |line| line.strip_prefix("  ").unwrap_or(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;

    fn quotes(text: &str) -> String {
        let options = Options::default();
        let mut ctx = Context::new(&options);
        let out = do_block_quotes(&mut ctx, text);
        ctx.vault.resolve(&out)
    }

    #[test]
    fn test_simple_quote() {
        assert_eq!(
            quotes("> hello\n> world\n\n"),
            "\n<blockquote>\n  <p>hello\n  world</p>\n</blockquote>\n\n"
        );
    }

    #[test]
    fn test_lazy_continuation() {
        assert_eq!(
            quotes("> one\ntwo\n\nafter\n"),
            "\n<blockquote>\n  <p>one\n  two</p>\n</blockquote>\n\nafter\n"
        );
    }

    #[test]
    fn test_paragraphs_in_one_quote() {
        assert_eq!(
            quotes("> a\n\n> b\n"),
            "\n<blockquote>\n  <p>a</p>\n  \n  <p>b</p>\n</blockquote>\n\n"
        );
    }

    #[test]
    fn test_bare_marker_does_not_open() {
        assert_eq!(quotes(">\n"), ">\n");
        assert_eq!(quotes("    > code\n"), "    > code\n");
    }

    #[test]
    fn test_nested_quote() {
        let out = quotes("> > inner\n");
        assert!(out.contains("<blockquote>\n  <blockquote>\n    <p>inner</p>\n  </blockquote>\n</blockquote>"), "{out}");
    }

    #[test]
    fn test_code_in_quote_keeps_its_indent() {
        let out = quotes(">     code\n>     more\n");
        assert_eq!(out, "\n<blockquote>\n<pre><code>code\nmore\n</code></pre>\n</blockquote>\n\n");
    }

    #[test]
    fn test_indent_lines() {
        assert_eq!(indent_lines("a\nb"), "  a\n  b");
        assert_eq!(indent_lines("a\n"), "  a\n");
    }
}
