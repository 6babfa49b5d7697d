//! Setext (underlined) and ATX (`#`-prefixed) headers.

use super::{Splicer, next_line_start};
use crate::context::Context;
use crate::cursor::line_end;
use crate::inline::run_span_gamut;

/// Convert setext headers, then ATX headers.
pub fn do_headers(ctx: &mut Context, text: &str) -> String {
    let text = replace_headers(ctx, text, match_setext);
    replace_headers(ctx, &text, match_atx)
}

/// A recognised header: level, content range and match end.
struct Header {
    level: u8,
    content: (usize, usize),
    end: usize,
}

enum Scan {
    Header(Header),
    /// Looks like a header but must stay text; scanning resumes after it.
    Verbatim(usize),
}

fn replace_headers(ctx: &mut Context, text: &str, matcher: fn(&[u8], usize) -> Option<Scan>) -> String {
    let bytes = text.as_bytes();
    let mut splicer = Splicer::new(text);
    let mut pos = 0;

    while let Some(start) = next_line_start(bytes, pos) {
        match matcher(bytes, start) {
            Some(Scan::Header(header)) => {
                let (from, to) = header.content;
                let block = render_header(ctx, header.level, &text[from..to]);
                let token = ctx.protect_block(&block);
                splicer.replace(start, header.end, &format!("\n{token}\n\n"));
                pos = header.end;
            }
            Some(Scan::Verbatim(end)) => pos = end,
            None => pos = start + 1,
        }
    }

    splicer.finish()
}

fn render_header(ctx: &mut Context, level: u8, content: &str) -> String {
    let span = run_span_gamut(ctx, content);
    let mut w = ctx.writer();
    w.heading_start(level);
    w.write_str(&span);
    w.heading_end(level);
    w.into_string()
}

/// A text line followed by a line of `=` or `-`.
fn match_setext(bytes: &[u8], start: usize) -> Option<Scan> {
    let eol = line_end(bytes, start);
    if eol == start || eol >= bytes.len() {
        return None;
    }
    let underline = eol + 1;
    let marker = *bytes.get(underline).filter(|&&b| b == b'=' || b == b'-')?;
    let run = bytes[underline..].iter().take_while(|&&b| b == marker).count();
    let mut pos = underline + run;
    pos += bytes[pos..].iter().take_while(|&&b| b == b' ').count();
    let newlines = bytes[pos..].iter().take_while(|&&b| b == b'\n').count();
    if newlines == 0 {
        return None;
    }
    let end = pos + newlines;

    let content_end = first_char_or_trimmed(bytes, start, eol);
    let content = &bytes[start..content_end];
    // A lone `-` under a list-like line is a list item, not a header.
    if marker == b'-' && run == 1 && (content == b"-" || content.starts_with(b"- ")) {
        return Some(Scan::Verbatim(end));
    }
    let level = if marker == b'=' { 1 } else { 2 };
    Some(Scan::Header(Header {
        level,
        content: (start, content_end),
        end,
    }))
}

/// `#` to `######`, the text, optional closing hashes.
fn match_atx(bytes: &[u8], start: usize) -> Option<Scan> {
    let run = bytes[start..].iter().take_while(|&&b| b == b'#').count();
    if run == 0 {
        return None;
    }
    let eol = line_end(bytes, start);
    if eol >= bytes.len() {
        return None;
    }
    let mut level = run.min(6);
    let rest_start = start + level;
    let text_start = rest_start + bytes[rest_start..eol].iter().take_while(|&&b| b == b' ').count();

    let content = if text_start < eol {
        let mut text_end = eol;
        while text_end > text_start && bytes[text_end - 1] == b'#' {
            text_end -= 1;
        }
        while text_end > text_start && bytes[text_end - 1] == b' ' {
            text_end -= 1;
        }
        if text_end == text_start {
            (text_start, first_char_end(bytes, text_start))
        } else {
            (text_start, text_end)
        }
    } else if rest_start < eol {
        (rest_start, rest_start + 1)
    } else if level > 1 {
        // Only hashes: the last one becomes the text.
        level -= 1;
        (start + level, start + level + 1)
    } else {
        return None;
    };

    let newlines = bytes[eol..].iter().take_while(|&&b| b == b'\n').count();
    // `level` is at most 6.
    Some(Scan::Header(Header {
        level: level as u8,
        content,
        end: eol + newlines,
    }))
}

/// End of `bytes[start..eol]` without trailing spaces, keeping at least one
/// character.
fn first_char_or_trimmed(bytes: &[u8], start: usize, eol: usize) -> usize {
    let mut end = eol;
    while end > start && bytes[end - 1] == b' ' {
        end -= 1;
    }
    if end == start { first_char_end(bytes, start) } else { end }
}

/// End of the UTF-8 character starting at `pos`.
fn first_char_end(bytes: &[u8], pos: usize) -> usize {
    let mut end = pos + 1;
    while end < bytes.len() && (bytes[end] & 0xC0) == 0x80 {
        end += 1;
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;

    fn headers(text: &str) -> String {
        let options = Options::default();
        let mut ctx = Context::new(&options);
        let out = do_headers(&mut ctx, text);
        ctx.vault.resolve(&out)
    }

    #[test]
    fn test_setext() {
        assert_eq!(headers("Title\n=====\n\n"), "\n<h1>Title</h1>\n\n");
        assert_eq!(headers("Sub  \n--\n"), "\n<h2>Sub</h2>\n\n");
    }

    #[test]
    fn test_setext_needs_uniform_underline() {
        assert_eq!(headers("Title\n==-\n"), "Title\n==-\n");
        assert_eq!(headers("Title\n= =\n"), "Title\n= =\n");
    }

    #[test]
    fn test_setext_list_item_guard() {
        assert_eq!(headers("- item\n-\n"), "- item\n-\n");
        assert_eq!(headers("-\n-\n"), "-\n-\n");
        assert_eq!(headers("- item\n--\n"), "\n<h2>- item</h2>\n\n");
    }

    #[test]
    fn test_atx() {
        assert_eq!(headers("# One\n"), "\n<h1>One</h1>\n\n");
        assert_eq!(headers("## Two ##\n\n"), "\n<h2>Two</h2>\n\n");
        assert_eq!(headers("###Three\n"), "\n<h3>Three</h3>\n\n");
    }

    #[test]
    fn test_atx_deep_and_degenerate() {
        assert_eq!(headers("######## x\n"), "\n<h6>## x</h6>\n\n");
        assert_eq!(headers("## # #\n"), "\n<h2>#</h2>\n\n");
        assert_eq!(headers("# ###\n"), "\n<h1>#</h1>\n\n");
        assert_eq!(headers("###\n"), "\n<h2>#</h2>\n\n");
        assert_eq!(headers("#\n"), "#\n");
    }

    #[test]
    fn test_atx_needs_newline() {
        assert_eq!(headers("# end"), "# end");
    }

    #[test]
    fn test_header_content_is_span_processed() {
        assert_eq!(headers("# *hi*\n"), "\n<h1><em>hi</em></h1>\n\n");
    }
}
