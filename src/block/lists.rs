//! Bulleted and numbered lists.
//!
//! A list is found whole first, then split into items. An item is loose
//! (its content becomes paragraphs) when a blank line precedes it, follows
//! it, or sits inside it; a tight item gets span processing only. Item
//! content is outdented and processed again, which is how lists nest.

use memchr::{memchr_iter, memmem};

use super::{Splicer, next_line_start, run_block_gamut};
use crate::context::Context;
use crate::cursor::is_space;
use crate::inline::run_span_gamut;
use crate::normalize::outdent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    /// `*`, `+` or `-`
    Unordered,
    /// Digits and a period
    Ordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        }
    }

    fn other(self) -> Self {
        match self {
            ListKind::Unordered => ListKind::Ordered,
            ListKind::Ordered => ListKind::Unordered,
        }
    }

    /// Length of the marker at `pos`, if one is there.
    fn marker_len(self, bytes: &[u8], pos: usize) -> Option<usize> {
        let rest = bytes.get(pos..)?;
        match self {
            ListKind::Unordered => matches!(rest.first(), Some(b'*' | b'+' | b'-')).then_some(1),
            ListKind::Ordered => {
                let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
                (digits > 0 && rest.get(digits) == Some(&b'.')).then_some(digits + 1)
            }
        }
    }

    /// A marker at `pos` followed by at least one space.
    fn marker_and_space(self, bytes: &[u8], pos: usize) -> bool {
        self.marker_len(bytes, pos)
            .is_some_and(|len| bytes.get(pos + len) == Some(&b' '))
    }
}

/// Convert bulleted lists, then numbered ones.
pub fn do_lists(ctx: &mut Context, text: &str) -> String {
    let text = replace_lists(ctx, text, ListKind::Unordered);
    replace_lists(ctx, &text, ListKind::Ordered)
}

fn replace_lists(ctx: &mut Context, text: &str, kind: ListKind) -> String {
    let bytes = text.as_bytes();
    let nested = ctx.list_level > 0;
    let max_indent = ctx.tab_width() - 1;
    let mut splicer = Splicer::new(text);
    let mut pos = 0;

    while let Some((start, list_start)) = next_candidate(bytes, pos, nested) {
        let Some(end) = match_list(bytes, list_start, kind, max_indent) else {
            pos = start + 1;
            continue;
        };
        let mut list = String::with_capacity(end - list_start + 1);
        list.push_str(&text[list_start..end]);
        list.push('\n');
        let items = process_list_items(ctx, &list, kind);

        let mut w = ctx.writer();
        w.open_tag(kind.tag());
        w.newline();
        w.write_str(&items);
        w.close_tag(kind.tag());
        let token = ctx.protect_block(&w.into_string());
        tracing::trace!(depth = ctx.list_level, tag = kind.tag(), "list");
        splicer.replace(start, end, &format!("\n{token}\n\n"));
        pos = end;
    }

    splicer.finish()
}

/// Next place a list may open: `(match start, list start)`. At the top
/// level a list opens the text or follows a blank line, and the newline
/// before it is part of the match; nested lists open on any line.
fn next_candidate(bytes: &[u8], pos: usize, nested: bool) -> Option<(usize, usize)> {
    if nested {
        return next_line_start(bytes, pos).map(|start| (start, start));
    }
    if pos == 0 {
        return Some((0, usize::from(bytes.first() == Some(&b'\n'))));
    }
    let from = pos - 1;
    let i = memmem::find(bytes.get(from..)?, b"\n\n")?;
    let start = from + i + 1;
    Some((start, start + 1))
}

/// End of the whole list opening at `start`.
fn match_list(bytes: &[u8], start: usize, kind: ListKind, max_indent: usize) -> Option<usize> {
    let indent = count_spaces(bytes, start);
    if indent > max_indent {
        return None;
    }
    let marker = start + indent;
    let after_marker = marker + kind.marker_len(bytes, marker)?;
    let spaces = count_spaces(bytes, after_marker);
    if spaces == 0 {
        return None;
    }
    let mut content = after_marker + spaces;
    if content == bytes.len() {
        // The list needs at least one character after the marker spaces.
        if spaces < 2 {
            return None;
        }
        content -= 1;
    }

    let from = content + 1;
    let newlines = bytes.get(from..).into_iter().flat_map(|rest| memchr_iter(b'\n', rest)).map(|i| from + i);
    for e in newlines {
        let run = bytes[e..].iter().take_while(|&&b| b == b'\n').count();
        let next = e + run;
        // A blank line and something that is not another item ends it.
        if run >= 2 && next < bytes.len() && !is_space(bytes[next]) && !kind.marker_and_space(bytes, next) {
            return Some(next);
        }
        // So does a list of the other kind at the same indent.
        let other_at = e + 1 + indent;
        if bytes.get(e + 1..other_at).is_some_and(|pad| pad.iter().all(|&b| b == b' '))
            && kind.other().marker_and_space(bytes, other_at)
        {
            return Some(e);
        }
    }
    Some(bytes.len())
}

struct Item {
    /// Whether a blank line before the item is part of the match.
    leading_line: bool,
    leading_space: usize,
    /// Marker plus the spaces after it.
    marker_width: usize,
    content: (usize, usize),
    trailing_blank: bool,
    end: usize,
}

fn process_list_items(ctx: &mut Context, list: &str, kind: ListKind) -> String {
    ctx.list_level += 1;

    let trimmed = list.trim_end_matches('\n');
    let list = if list.len() - trimmed.len() >= 2 {
        let mut collapsed = trimmed.to_owned();
        collapsed.push('\n');
        collapsed
    } else {
        list.to_owned()
    };

    let bytes = list.as_bytes();
    let mut splicer = Splicer::new(&list);
    let mut pos = 0;
    while let Some(start) = next_item_candidate(bytes, pos) {
        let Some(item) = match_item(bytes, start, kind) else {
            pos = start + 1;
            continue;
        };
        let html = render_item(ctx, &list, &item);
        splicer.replace(start, item.end, &format!("<li>{html}</li>\n"));
        pos = item.end;
    }
    let items = splicer.finish();

    ctx.list_level -= 1;
    items
}

fn render_item(ctx: &mut Context, list: &str, item: &Item) -> String {
    let tab_width = ctx.tab_width();
    let (from, to) = item.content;
    let content = &list[from..to];
    if item.leading_line || item.trailing_blank || content.contains("\n\n") {
        // The marker is replaced by spaces so the content outdents evenly.
        let mut indented = String::with_capacity(item.leading_space + item.marker_width + content.len());
        indented.extend(std::iter::repeat_n(' ', item.leading_space + item.marker_width));
        indented.push_str(content);
        let mut block = outdent(&indented, tab_width);
        block.push('\n');
        run_block_gamut(ctx, &block)
    } else {
        let sublists = do_lists(ctx, &outdent(content, tab_width));
        run_span_gamut(ctx, sublists.trim_end_matches('\n'))
    }
}

/// Next position an item match may start at: a line start, or a newline
/// that precedes one.
fn next_item_candidate(bytes: &[u8], pos: usize) -> Option<usize> {
    if pos > bytes.len() {
        return None;
    }
    if pos == 0 || bytes[pos - 1] == b'\n' || bytes.get(pos) == Some(&b'\n') {
        return Some(pos);
    }
    memchr::memchr(b'\n', &bytes[pos..]).map(|i| pos + i)
}

fn match_item(bytes: &[u8], start: usize, kind: ListKind) -> Option<Item> {
    if bytes.get(start) == Some(&b'\n') {
        if let Some(item) = match_item_line(bytes, start + 1, kind, true) {
            return Some(item);
        }
    }
    if start == 0 || bytes[start - 1] == b'\n' {
        return match_item_line(bytes, start, kind, false);
    }
    None
}

fn match_item_line(bytes: &[u8], line: usize, kind: ListKind, leading_line: bool) -> Option<Item> {
    let leading_space = count_spaces(bytes, line);
    let marker = line + leading_space;
    let after_marker = marker + kind.marker_len(bytes, marker)?;
    let spaces = count_spaces(bytes, after_marker);
    if spaces == 0 && bytes.get(after_marker) != Some(&b'\n') {
        return None;
    }
    let content_start = after_marker + spaces;

    // The content runs to the first newline after which the list ends or
    // a sibling marker follows.
    let is_sibling = |pos: usize| {
        bytes.get(pos..pos + leading_space).is_some_and(|pad| pad.iter().all(|&b| b == b' '))
            && kind
                .marker_len(bytes, pos + leading_space)
                .is_some_and(|len| matches!(bytes.get(pos + leading_space + len), Some(b' ' | b'\n')))
    };
    let newlines = memchr_iter(b'\n', &bytes[content_start..]).map(|i| content_start + i);
    for e in newlines {
        let run = bytes[e..].iter().take_while(|&&b| b == b'\n').count();
        let next = e + run;
        if next != bytes.len() && !is_sibling(next) {
            continue;
        }
        let trailing_blank = run >= 2;
        let consumed = if trailing_blank { run - 1 } else { 1 };
        return Some(Item {
            leading_line,
            leading_space,
            marker_width: content_start - marker,
            content: (content_start, e),
            trailing_blank,
            end: e + consumed,
        });
    }
    None
}

fn count_spaces(bytes: &[u8], pos: usize) -> usize {
    bytes.get(pos..).map_or(0, |rest| rest.iter().take_while(|&&b| b == b' ').count())
}
