//! Link definition lines: `[id]: url "optional title"`.
//!
//! Definitions are removed from the text and stored in the context before
//! any block pass runs.

use std::ops::Range;

use super::{Splicer, next_line_start};
use crate::context::Context;
use crate::cursor::line_end;
use crate::link_ref::{LinkDef, normalize_label};

struct Definition {
    label: Range<usize>,
    url: Range<usize>,
    title: Option<Range<usize>>,
    end: usize,
}

/// Remove every link definition from `text` and record it in `ctx.links`.
pub fn strip_link_definitions(ctx: &mut Context, text: &str) -> String {
    let bytes = text.as_bytes();
    let max_indent = ctx.tab_width() - 1;
    let mut splicer = Splicer::new(text);
    let mut pos = 0;

    while let Some(start) = next_line_start(bytes, pos) {
        let Some(def) = match_definition(bytes, start, max_indent) else {
            pos = start + 1;
            continue;
        };
        let label = normalize_label(&text[def.label]);
        let url = text[def.url].to_owned();
        let title = def.title.map(|range| text[range].to_owned());
        tracing::trace!(%label, %url, has_title = title.is_some(), "link definition");
        ctx.links.insert(label, LinkDef { url, title });
        splicer.replace(start, def.end, "");
        pos = def.end;
    }

    splicer.finish()
}

fn match_definition(bytes: &[u8], start: usize, max_indent: usize) -> Option<Definition> {
    let indent = count_spaces(bytes, start).min(max_indent);
    let open = start + indent;
    if bytes.get(open) != Some(&b'[') {
        return None;
    }
    let eol = line_end(bytes, open);

    // The label may itself hold `]`, so the rightmost closer is tried first.
    for close in (open + 2..eol).rev() {
        if bytes[close] != b']' {
            continue;
        }
        let mut colon = close + 1;
        if bytes.get(colon) == Some(&b' ') && bytes.get(colon + 1) == Some(&b':') {
            colon += 1;
        }
        if bytes.get(colon) != Some(&b':') {
            continue;
        }
        if let Some((url, title, end)) = match_target(bytes, colon + 1) {
            return Some(Definition {
                label: open + 1..close,
                url,
                title,
                end,
            });
        }
    }
    None
}

/// URL and optional title after the colon: spaces, at most one newline,
/// spaces, then the URL.
fn match_target(bytes: &[u8], pos: usize) -> Option<(Range<usize>, Option<Range<usize>>, usize)> {
    let mut url_start = pos + count_spaces(bytes, pos);
    if bytes.get(url_start) == Some(&b'\n') {
        url_start += 1;
        url_start += count_spaces(bytes, url_start);
    }

    if bytes.get(url_start) == Some(&b'<') {
        let eol = line_end(bytes, url_start);
        for gt in url_start + 2..eol {
            if bytes[gt] != b'>' {
                continue;
            }
            if let Some((title, end)) = match_tail(bytes, gt + 1) {
                return Some((url_start + 1..gt, title, end));
            }
        }
    }

    let run = bytes[url_start..]
        .iter()
        .take_while(|b| !b.is_ascii_whitespace())
        .count();
    if run == 0 {
        return None;
    }
    let url_end = url_start + run;
    let (title, end) = match_tail(bytes, url_end)?;
    Some((url_start..url_end, title, end))
}

/// Everything after the URL: an optional title, then the end of the line.
fn match_tail(bytes: &[u8], pos: usize) -> Option<(Option<Range<usize>>, usize)> {
    let after_spaces = pos + count_spaces(bytes, pos);
    let title_start = if bytes.get(after_spaces) == Some(&b'\n') {
        let next = after_spaces + 1;
        next + count_spaces(bytes, next)
    } else {
        after_spaces
    };

    // A title must be separated from the URL by whitespace.
    if title_start > pos && matches!(bytes.get(title_start), Some(b'"' | b'\'' | b'(')) {
        if let Some((closer, end)) = match_title_end(bytes, title_start + 1) {
            return Some((Some(title_start + 1..closer), end));
        }
    }
    if let Some(end) = line_break_or_end(bytes, title_start) {
        return Some((None, end));
    }
    if title_start != after_spaces {
        return line_break_or_end(bytes, after_spaces).map(|end| (None, end));
    }
    None
}

fn match_title_end(bytes: &[u8], from: usize) -> Option<(usize, usize)> {
    let eol = line_end(bytes, from);
    (from..eol)
        .filter(|&i| matches!(bytes[i], b'"' | b'\'' | b')'))
        .find_map(|closer| {
            let after = closer + 1 + count_spaces(bytes, closer + 1);
            line_break_or_end(bytes, after).map(|end| (closer, end))
        })
}

/// One or more newlines, or the end of the text. Returns the end of the run.
fn line_break_or_end(bytes: &[u8], pos: usize) -> Option<usize> {
    if pos >= bytes.len() {
        return Some(bytes.len());
    }
    let run = bytes[pos..].iter().take_while(|&&b| b == b'\n').count();
    (run > 0).then_some(pos + run)
}

fn count_spaces(bytes: &[u8], pos: usize) -> usize {
    bytes.get(pos..).map_or(0, |rest| rest.iter().take_while(|&&b| b == b' ').count())
}
