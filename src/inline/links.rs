//! Links and images: reference (`[text][id]`), inline (`[text](url "title")`)
//! and shortcut (`[text]`) forms.
//!
//! Bracketed text may nest brackets up to `limits.bracket_depth` levels;
//! inline URLs may nest parentheses up to `limits.url_paren_depth` levels.
//! Deeper nesting simply does not match.

use std::ops::Range;

use memchr::{memchr, memchr_iter, memchr2};
use smallvec::SmallVec;

use super::run_span_gamut;
use crate::block::Splicer;
use crate::context::Context;
use crate::cursor::{Cursor, is_space};
use crate::link_ref::{LinkDef, normalize_label};

/// A recognised construct: where it ends and, when it resolved, the HTML
/// replacing it. Unresolved references stay as text.
struct Found {
    end: usize,
    html: Option<String>,
}

type Matcher = fn(&mut Context, &str, usize) -> Option<Found>;

/// Convert images, reference form first.
pub fn do_images(ctx: &mut Context, text: &str) -> String {
    let text = rewrite(ctx, text, b'!', reference_image);
    rewrite(ctx, &text, b'!', inline_image)
}

/// Convert links: reference, inline, then shortcut form.
///
/// Link text is span processed, but never turns into another link.
pub fn do_anchors(ctx: &mut Context, text: &str) -> String {
    if ctx.in_anchor {
        return text.to_owned();
    }
    ctx.in_anchor = true;
    let text = rewrite(ctx, text, b'[', reference_link);
    let text = rewrite(ctx, &text, b'[', inline_link);
    let text = rewrite(ctx, &text, b'[', shortcut_link);
    ctx.in_anchor = false;
    text
}

fn rewrite(ctx: &mut Context, text: &str, lead: u8, matcher: Matcher) -> String {
    let bytes = text.as_bytes();
    let mut splicer = Splicer::new(text);
    let mut pos = 0;

    while let Some(start) = bytes.get(pos..).and_then(|rest| memchr(lead, rest)).map(|i| pos + i) {
        match matcher(ctx, text, start) {
            Some(Found { end, html: Some(html) }) => {
                let token = ctx.protect(&html);
                splicer.replace(start, end, &token);
                pos = end;
            }
            Some(Found { end, html: None }) => pos = end,
            None => pos = start + 1,
        }
    }

    splicer.finish()
}

fn reference_link(ctx: &mut Context, text: &str, open: usize) -> Option<Found> {
    let bytes = text.as_bytes();
    let close = bracketed(bytes, open, ctx.options.limits.bracket_depth)?;
    let (id, end) = reference_id(text, close + 1)?;
    let link_text = &text[open + 1..close];
    let id = &text[id];
    let label = normalize_label(if id.is_empty() { link_text } else { id });
    let html = lookup(ctx, &label).map(|def| render_link(ctx, &def.url, def.title.as_deref(), link_text));
    Some(Found { end, html })
}

fn inline_link(ctx: &mut Context, text: &str, open: usize) -> Option<Found> {
    let bytes = text.as_bytes();
    let close = bracketed(bytes, open, ctx.options.limits.bracket_depth)?;
    if bytes.get(close + 1) != Some(&b'(') {
        return None;
    }
    let target = inline_target(bytes, close + 2, UrlForm::Link, ctx.options.limits.url_paren_depth)?;
    let title = target.title.map(|range| &text[range]);
    let html = render_link(ctx, &text[target.url], title, &text[open + 1..close]);
    Some(Found {
        end: target.end,
        html: Some(html),
    })
}

/// `[text]` alone, resolved by its text.
fn shortcut_link(ctx: &mut Context, text: &str, open: usize) -> Option<Found> {
    let bytes = text.as_bytes();
    let close = open + 1 + memchr2(b'[', b']', &bytes[open + 1..])?;
    if bytes[close] != b']' || close == open + 1 {
        return None;
    }
    let link_text = &text[open + 1..close];
    let html = lookup(ctx, &normalize_label(link_text))
        .map(|def| render_link(ctx, &def.url, def.title.as_deref(), link_text));
    Some(Found { end: close + 1, html })
}

fn reference_image(ctx: &mut Context, text: &str, bang: usize) -> Option<Found> {
    let bytes = text.as_bytes();
    let open = bang + 1;
    if bytes.get(open) != Some(&b'[') {
        return None;
    }
    let close = bracketed(bytes, open, ctx.options.limits.bracket_depth)?;
    let (id, end) = reference_id(text, close + 1)?;
    let alt = &text[open + 1..close];
    let id = &text[id];
    let label = normalize_label(if id.is_empty() { alt } else { id });
    let html = lookup(ctx, &label).map(|def| render_image(ctx, &def.url, def.title.as_deref(), alt));
    Some(Found { end, html })
}

fn inline_image(ctx: &mut Context, text: &str, bang: usize) -> Option<Found> {
    let bytes = text.as_bytes();
    let open = bang + 1;
    if bytes.get(open) != Some(&b'[') {
        return None;
    }
    let close = bracketed(bytes, open, ctx.options.limits.bracket_depth)?;
    let mut paren = close + 1;
    if bytes.get(paren).is_some_and(|&b| is_space(b)) {
        paren += 1;
    }
    if bytes.get(paren) != Some(&b'(') {
        return None;
    }
    let target = inline_target(bytes, paren + 1, UrlForm::Image, ctx.options.limits.url_paren_depth)?;
    let title = target.title.map(|range| &text[range]);
    let html = render_image(ctx, &text[target.url], title, &text[open + 1..close]);
    Some(Found {
        end: target.end,
        html: Some(html),
    })
}

fn lookup(ctx: &Context, label: &str) -> Option<LinkDef> {
    ctx.links.get(label).cloned()
}

fn render_link(ctx: &mut Context, url: &str, title: Option<&str>, link_text: &str) -> String {
    let url = ctx.encode_attribute(url);
    let title = title.map(|title| ctx.encode_attribute(title));
    let span = run_span_gamut(ctx, link_text);
    let mut w = ctx.writer();
    w.link_start(&url, title.as_deref());
    w.write_str(&span);
    w.link_end();
    w.into_string()
}

/// Alt text is attribute-encoded only, never span processed.
fn render_image(ctx: &Context, url: &str, title: Option<&str>, alt: &str) -> String {
    let url = ctx.encode_attribute(url);
    let alt = ctx.encode_attribute(alt);
    let title = title.map(|title| ctx.encode_attribute(title));
    let mut w = ctx.writer();
    w.image(&url, &alt, title.as_deref());
    w.into_string()
}

/// Position of the `]` closing the bracket at `open`.
fn bracketed(bytes: &[u8], open: usize, depth: usize) -> Option<usize> {
    let end = scan_bracketed(bytes, open + 1, 1, depth);
    (bytes.get(end) == Some(&b']')).then_some(end)
}

/// Text with balanced brackets. At the deepest level only `[]` is allowed.
/// Stops at the first `]` or `[` that cannot be balanced.
fn scan_bracketed(bytes: &[u8], mut pos: usize, level: usize, depth: usize) -> usize {
    loop {
        match bytes.get(pos) {
            None | Some(b']') => return pos,
            Some(b'[') if level < depth => {
                let inner = scan_bracketed(bytes, pos + 1, level + 1, depth);
                if bytes.get(inner) != Some(&b']') {
                    return pos;
                }
                pos = inner + 1;
            }
            Some(b'[') => {
                if bytes.get(pos + 1) != Some(&b']') {
                    return pos;
                }
                pos += 2;
            }
            Some(_) => {
                pos += memchr2(b'[', b']', &bytes[pos..]).unwrap_or(bytes.len() - pos);
            }
        }
    }
}

/// `[id]` after a bracketed text, with one optional space and one optional
/// line break in between. Returns the id range and the match end.
fn reference_id(text: &str, pos: usize) -> Option<(Range<usize>, usize)> {
    let mut cursor = Cursor::new_at(text, pos);
    cursor.eat(b' ');
    if cursor.eat(b'\n') {
        cursor.skip_while(|b| b == b' ');
    }
    if !cursor.eat(b'[') {
        return None;
    }
    let id_start = cursor.offset();
    let id_end = id_start + memchr(b']', &text.as_bytes()[id_start..])?;
    Some((id_start..id_end, id_end + 1))
}

#[derive(Clone, Copy)]
enum UrlForm {
    /// `<url>` may hold anything, spaces and line breaks included.
    Link,
    /// `<url>` holds no whitespace and may be empty.
    Image,
}

struct Target {
    url: Range<usize>,
    title: Option<Range<usize>>,
    end: usize,
}

/// Everything after `(`: the URL, an optional quoted title and `)`.
fn inline_target(bytes: &[u8], pos: usize, form: UrlForm, paren_depth: usize) -> Option<Target> {
    let start = pos + skip_blanks(bytes, pos);

    if bytes.get(start) == Some(&b'<') {
        let body = start + 1;
        let found = match form {
            UrlForm::Link => bytes
                .get(body + 1..)
                .into_iter()
                .flat_map(|rest| memchr_iter(b'>', rest))
                .map(|i| body + 1 + i)
                .find_map(|gt| target_after_url(bytes, body..gt, gt + 1)),
            UrlForm::Image => {
                let run = bytes[body..].iter().take_while(|&&b| !is_space(b)).count();
                (body..body + run)
                    .rev()
                    .filter(|&i| bytes[i] == b'>')
                    .find_map(|gt| target_after_url(bytes, body..gt, gt + 1))
            }
        };
        if found.is_some() {
            return found;
        }
    }

    url_boundaries(bytes, start, paren_depth)
        .into_iter()
        .rev()
        .find_map(|end| target_after_url(bytes, start..end, end))
}

/// Optional title and the closing paren, starting right after the URL.
fn target_after_url(bytes: &[u8], url: Range<usize>, pos: usize) -> Option<Target> {
    let at = pos + skip_blanks(bytes, pos);
    if let Some(&quote) = bytes.get(at).filter(|&&b| b == b'"' || b == b'\'') {
        let title_start = at + 1;
        let closed = bytes
            .get(title_start..)
            .into_iter()
            .flat_map(|rest| memchr_iter(quote, rest))
            .map(|i| title_start + i)
            .find_map(|q| {
                let paren = q + 1 + skip_blanks(bytes, q + 1);
                (bytes.get(paren) == Some(&b')')).then_some((q, paren))
            });
        if let Some((q, paren)) = closed {
            return Some(Target {
                url,
                title: Some(title_start..q),
                end: paren + 1,
            });
        }
    }
    (bytes.get(at) == Some(&b')')).then(|| Target {
        url,
        title: None,
        end: at + 1,
    })
}

/// Ends of every complete prefix of a URL: runs of text without
/// whitespace or parens, and balanced paren groups. The first entry is the
/// empty URL.
fn url_boundaries(bytes: &[u8], start: usize, depth: usize) -> SmallVec<[usize; 8]> {
    let mut ends = SmallVec::new();
    ends.push(start);
    let mut pos = start;
    loop {
        let next = match bytes.get(pos) {
            Some(b'(') => paren_group(bytes, pos, 1, depth),
            Some(&b) if b != b')' && !is_space(b) => Some(pos + url_run(bytes, pos)),
            _ => None,
        };
        let Some(end) = next else { break };
        pos = end;
        ends.push(end);
    }
    ends
}

/// The paren group opening at `open`, nested at `level`. At the deepest
/// level the group must be empty.
fn paren_group(bytes: &[u8], open: usize, level: usize, depth: usize) -> Option<usize> {
    let mut pos = open + 1;
    if level >= depth {
        return (bytes.get(pos) == Some(&b')')).then_some(pos + 1);
    }
    loop {
        match bytes.get(pos) {
            Some(b')') => return Some(pos + 1),
            Some(b'(') => pos = paren_group(bytes, pos, level + 1, depth)?,
            Some(&b) if !is_space(b) => pos += url_run(bytes, pos),
            _ => return None,
        }
    }
}

fn url_run(bytes: &[u8], pos: usize) -> usize {
    bytes[pos..]
        .iter()
        .take_while(|&&b| !matches!(b, b'(' | b')') && !is_space(b))
        .count()
}

/// Spaces and newlines.
fn skip_blanks(bytes: &[u8], pos: usize) -> usize {
    bytes
        .get(pos..)
        .map_or(0, |rest| rest.iter().take_while(|&&b| b == b' ' || b == b'\n').count())
}
