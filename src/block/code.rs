//! Indented code blocks.

use memchr::memmem;

use super::Splicer;
use crate::context::Context;
use crate::cursor::{is_space, line_end};
use crate::escape::escape_code;
use crate::normalize::{outdent, trim_newlines};

/// Protect every run of lines indented by a full tab stop that follows a
/// blank line (or opens the text).
pub fn do_code_blocks(ctx: &mut Context, text: &str) -> String {
    let bytes = text.as_bytes();
    let tab_width = ctx.tab_width();
    let finder = memmem::Finder::new(b"\n\n");
    let mut splicer = Splicer::new(text);

    let mut pos = 0;
    if let Some(end) = match_at_start(bytes, tab_width) {
        emit(ctx, &mut splicer, text, 0, end);
        pos = end.1;
    }
    while let Some(i) = bytes.get(pos..).and_then(|rest| finder.find(rest)) {
        let start = pos + i;
        match match_lines(bytes, start + 2, tab_width) {
            Some(end) => {
                emit(ctx, &mut splicer, text, start, (start + 2, end));
                pos = end;
            }
            None => pos = start + 1,
        }
    }

    splicer.finish()
}

/// A block at the very top, after up to two newlines. Returns the code
/// range.
fn match_at_start(bytes: &[u8], tab_width: usize) -> Option<(usize, usize)> {
    let code_start = if bytes.starts_with(b"\n\n") {
        2
    } else {
        usize::from(bytes.first() == Some(&b'\n'))
    };
    match_lines(bytes, code_start, tab_width).map(|end| (code_start, end))
}

fn emit(ctx: &mut Context, splicer: &mut Splicer, text: &str, start: usize, code: (usize, usize)) {
    let (from, to) = code;
    let outdented = outdent(&text[from..to], ctx.tab_width());
    let escaped = escape_code(&outdented);
    let mut w = ctx.writer();
    w.code_block(trim_newlines(&escaped));
    let token = ctx.protect_block(&w.into_string());
    tracing::trace!(len = to - from, "code block");
    splicer.replace(start, to, &format!("\n\n{token}\n\n"));
}

/// Indented lines (each followed by its newlines) from `start`. The block
/// must end at the end of the text or before a line indented by at most
/// one tab stop with visible content; shorter runs are tried otherwise.
fn match_lines(bytes: &[u8], start: usize, tab_width: usize) -> Option<usize> {
    let mut ends = Vec::new();
    let mut pos = start;
    while bytes.len() - pos > tab_width && bytes[pos..pos + tab_width].iter().all(|&b| b == b' ') {
        let eol = line_end(bytes, pos);
        let newlines = bytes[eol..].iter().take_while(|&&b| b == b'\n').count();
        if newlines == 0 {
            break;
        }
        pos = eol + newlines;
        ends.push(pos);
    }
    ends.into_iter().rev().find(|&end| followed_by_outdented_line(bytes, end, tab_width))
}

fn followed_by_outdented_line(bytes: &[u8], pos: usize, tab_width: usize) -> bool {
    if pos == bytes.len() {
        return true;
    }
    let spaces = bytes[pos..].iter().take(tab_width).take_while(|&&b| b == b' ').count();
    bytes.get(pos + spaces).is_some_and(|&b| !is_space(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;

    fn code(text: &str) -> String {
        let options = Options::default();
        let mut ctx = Context::new(&options);
        let out = do_code_blocks(&mut ctx, text);
        ctx.vault.resolve(&out)
    }

    #[test]
    fn test_block_after_blank_line() {
        assert_eq!(
            code("para\n\n    fn x() {}\n\nafter\n"),
            "para\n\n<pre><code>fn x() {}\n</code></pre>\n\nafter\n"
        );
    }

    #[test]
    fn test_block_at_start_and_end() {
        assert_eq!(code("    a < b\n"), "\n\n<pre><code>a &lt; b\n</code></pre>\n\n");
    }

    #[test]
    fn test_blank_lines_inside_block() {
        assert_eq!(
            code("\n\n    one\n\n      two\n\n\n"),
            "\n\n<pre><code>one\n\n  two\n</code></pre>\n\n"
        );
    }

    #[test]
    fn test_needs_blank_line_before() {
        assert_eq!(code("para\n    not code\n"), "para\n    not code\n");
    }

    #[test]
    fn test_short_indent_is_not_code() {
        assert_eq!(code("\n\n   three\n"), "\n\n   three\n");
    }
}
