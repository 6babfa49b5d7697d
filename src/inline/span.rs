//! Backslash escapes, code spans and raw inline markup, in one scan.

use memchr::{memchr3, memmem};

use super::code_span;
use crate::context::Context;
use crate::cursor::is_space;
use crate::escape::{char_entity, is_escapable};

/// Protect escapes, code spans and inline tags so no later pass touches
/// their content.
///
/// The scan works on the unprocessed remainder only: a backtick run is
/// not an opener when the byte before it (within the remainder) is a
/// backtick or a backslash.
pub fn parse_span(ctx: &mut Context, text: &str) -> String {
    let bytes = text.as_bytes();
    let allow_markup = ctx.options.allow_raw_markup;
    let mut out = String::with_capacity(text.len());
    let mut rest = 0;
    let mut pos = 0;

    while let Some(i) = memchr3(b'\\', b'`', b'<', &bytes[pos..]).map(|i| pos + i) {
        match bytes[i] {
            b'\\' => match bytes.get(i + 1) {
                Some(&b) if is_escapable(b) => {
                    out.push_str(&text[rest..i]);
                    out.push_str(&ctx.protect(&char_entity(b)));
                    rest = i + 2;
                    pos = rest;
                }
                _ => pos = i + 1,
            },
            b'`' => {
                let run = bytes[i..].iter().take_while(|&&b| b == b'`').count();
                if i > rest && matches!(bytes[i - 1], b'`' | b'\\') {
                    pos = i + run;
                    continue;
                }
                out.push_str(&text[rest..i]);
                let body = i + run;
                match code_span::find_closer(bytes, body, run) {
                    Some(closer) => {
                        let span = code_span::render(ctx, &text[body..closer]);
                        out.push_str(&ctx.protect(&span));
                        rest = closer + run;
                    }
                    // No closer: the run stays text.
                    None => {
                        out.push_str(&text[i..body]);
                        rest = body;
                    }
                }
                pos = rest;
            }
            _ => match allow_markup.then(|| match_markup(bytes, i)).flatten() {
                Some(end) => {
                    out.push_str(&text[rest..i]);
                    out.push_str(&ctx.protect(&text[i..end]));
                    rest = end;
                    pos = end;
                }
                None => pos = i + 1,
            },
        }
    }

    out.push_str(&text[rest..]);
    out
}

/// A comment, processing instruction or tag at `lt`. Returns its end.
fn match_markup(bytes: &[u8], lt: usize) -> Option<usize> {
    let rest = &bytes[lt..];
    if rest.starts_with(b"<!--") {
        if let Some(i) = memmem::find(&rest[4..], b"-->") {
            return Some(lt + 4 + i + 3);
        }
    }
    for (open, close) in [(b"<?", b"?>"), (b"<%", b"%>")] {
        if rest.starts_with(open) {
            if let Some(i) = memmem::find(&rest[2..], close) {
                return Some(lt + 2 + i + 2);
            }
        }
    }
    match_tag(bytes, lt)
}

/// `<name attributes>`, optionally `</name>`, `<!name` or `<$name`.
/// Attribute text may hold `>` only inside quotes; an unclosed quote
/// rejects the tag.
fn match_tag(bytes: &[u8], lt: usize) -> Option<usize> {
    let mut pos = lt + 1;
    if matches!(bytes.get(pos), Some(b'/' | b'!' | b'$')) {
        pos += 1;
    }
    let name = bytes[pos..]
        .iter()
        .take_while(|&&b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b':' | b'_'))
        .count();
    if name == 0 {
        return None;
    }
    pos += name;

    if bytes.get(pos).is_some_and(|&b| is_space(b)) {
        pos += 1;
        while let Some(&b) = bytes.get(pos) {
            match b {
                b'>' => break,
                b'"' | b'\'' => match memchr::memchr(b, &bytes[pos + 1..]) {
                    Some(i) => pos += i + 2,
                    None => return None,
                },
                _ => {
                    pos += bytes[pos..]
                        .iter()
                        .take_while(|&&c| !matches!(c, b'"' | b'\'' | b'>'))
                        .count();
                }
            }
        }
    }
    (bytes.get(pos) == Some(&b'>')).then_some(pos + 1)
}
