//! Emphasis: `*em*`, `**strong**`, `***both***`, and the same with `_`.
//!
//! A left-to-right scan over delimiter runs of exactly one, two or three
//! `*` or `_`. What counts as a delimiter depends on which spans are open:
//! with nothing open only openers match; with em or strong open only its
//! closer (or an opener of the other kind) does. Unclosed delimiters are
//! written back as literal text.

use memchr::memchr2;
use smallvec::SmallVec;

use super::run_span_gamut;
use crate::context::Context;
use crate::cursor::is_space;

/// A delimiter run. `len == 0` is the stack bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Delim {
    ch: u8,
    len: usize,
}

impl Delim {
    const BOTTOM: Delim = Delim { ch: b'*', len: 0 };

    fn write_to(self, out: &mut String) {
        for _ in 0..self.len {
            out.push(char::from(self.ch));
        }
    }
}

/// Open spans, by delimiter character.
#[derive(Debug, Default)]
struct Open {
    em: Option<u8>,
    strong: Option<u8>,
    /// A `***` opener is waiting for its first closer.
    triple: bool,
}

/// Delimiters and the text collected since each one, top last.
struct Stacks {
    delims: SmallVec<[Delim; 8]>,
    texts: SmallVec<[String; 8]>,
}

impl Stacks {
    fn new() -> Self {
        let mut delims = SmallVec::new();
        delims.push(Delim::BOTTOM);
        let mut texts = SmallVec::new();
        texts.push(String::new());
        Self { delims, texts }
    }

    fn push(&mut self, delim: Delim) {
        self.delims.push(delim);
        self.texts.push(String::new());
    }

    fn top_len(&self) -> usize {
        self.delims.last().map_or(0, |d| d.len)
    }

    fn pop_delim(&mut self) -> Delim {
        self.delims.pop().unwrap_or(Delim::BOTTOM)
    }

    fn pop_text(&mut self) -> String {
        self.texts.pop().unwrap_or_default()
    }

    fn top_text(&mut self) -> &mut String {
        if self.texts.is_empty() {
            self.texts.push(String::new());
        }
        let last = self.texts.len() - 1;
        &mut self.texts[last]
    }

    /// Give up on the top delimiter: it and its text join the text below.
    fn unwind(&mut self) {
        let delim = self.pop_delim();
        let inner = self.pop_text();
        let top = self.top_text();
        delim.write_to(top);
        top.push_str(&inner);
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Tag {
    Em,
    Strong,
}

impl Tag {
    fn for_len(len: usize) -> Self {
        if len == 2 { Tag::Strong } else { Tag::Em }
    }

    fn name(self) -> &'static str {
        match self {
            Tag::Em => "em",
            Tag::Strong => "strong",
        }
    }
}

pub fn do_italics_and_bold(ctx: &mut Context, text: &str) -> String {
    let bytes = text.as_bytes();
    if memchr2(b'*', b'_', bytes).is_none() {
        return text.to_owned();
    }

    let mut stacks = Stacks::new();
    let mut open = Open::default();
    let mut from = 0;

    loop {
        let Some((start, delim)) = next_delim(bytes, from, &open) else {
            stacks.top_text().push_str(&text[from..]);
            while stacks.top_len() > 0 {
                stacks.unwind();
            }
            return stacks.pop_text();
        };
        stacks.top_text().push_str(&text[from..start]);
        from = start + delim.len;

        if open.triple {
            if delim.len == 3 {
                stacks.pop_delim();
                let span = stacks.pop_text();
                let html = wrap(ctx, &[Tag::Strong, Tag::Em], &span);
                stacks.top_text().push_str(&html);
                open.em = None;
                open.strong = None;
            } else {
                // One of the two closes; the top delimiter now stands for
                // the other.
                if let Some(top) = stacks.delims.last_mut() {
                    top.len = 3 - delim.len;
                }
                let tag = Tag::for_len(delim.len);
                let span = std::mem::take(stacks.top_text());
                *stacks.top_text() = wrap(ctx, &[tag], &span);
                open.close(tag);
            }
            open.triple = false;
        } else if delim.len == 3 {
            if open.em.is_some() {
                for _ in 0..2 {
                    let tag = Tag::for_len(stacks.pop_delim().len);
                    let span = stacks.pop_text();
                    let html = wrap(ctx, &[tag], &span);
                    stacks.top_text().push_str(&html);
                    open.close(tag);
                }
            } else {
                open.em = Some(delim.ch);
                open.strong = Some(delim.ch);
                open.triple = true;
                stacks.push(delim);
            }
        } else if delim.len == 2 {
            if open.strong.is_some() {
                // A dangling em inside the strong span is written back as text.
                if stacks.top_len() == 1 {
                    stacks.unwind();
                }
                stacks.pop_delim();
                let span = stacks.pop_text();
                let html = wrap(ctx, &[Tag::Strong], &span);
                stacks.top_text().push_str(&html);
                open.strong = None;
            } else {
                open.strong = Some(delim.ch);
                stacks.push(delim);
            }
        } else if open.em.is_some() {
            if stacks.top_len() == 1 {
                stacks.pop_delim();
                let span = stacks.pop_text();
                let html = wrap(ctx, &[Tag::Em], &span);
                stacks.top_text().push_str(&html);
                open.em = None;
            } else {
                delim.write_to(stacks.top_text());
            }
        } else {
            open.em = Some(delim.ch);
            stacks.push(delim);
        }
    }
}

impl Open {
    fn close(&mut self, tag: Tag) {
        match tag {
            Tag::Em => self.em = None,
            Tag::Strong => self.strong = None,
        }
    }
}

/// Span process `span`, wrap it in `tags` (outermost first) and protect it.
fn wrap(ctx: &mut Context, tags: &[Tag], span: &str) -> String {
    let inner = run_span_gamut(ctx, span);
    let mut w = ctx.writer();
    for tag in tags {
        w.open_tag(tag.name());
    }
    w.write_str(&inner);
    for tag in tags.iter().rev() {
        w.close_tag(tag.name());
    }
    let html = w.into_string();
    ctx.protect(&html)
}

/// The next delimiter run at or after `from` that is valid for the spans
/// currently open. Runs longer than three never match.
fn next_delim(bytes: &[u8], from: usize, open: &Open) -> Option<(usize, Delim)> {
    let mut pos = from;
    while let Some(start) = bytes.get(pos..).and_then(|rest| memchr2(b'*', b'_', rest)).map(|i| pos + i) {
        let ch = bytes[start];
        let len = bytes[start..].iter().take_while(|&&b| b == ch).count();
        pos = start + len;
        if len > 3 {
            continue;
        }
        let valid = match len {
            3 if open.em.is_none() && open.strong.is_none() => is_opener(bytes, start + len),
            3 => open.em == Some(ch) && open.strong == Some(ch) && is_closer(bytes, from, start),
            1 => match open.em {
                Some(em) => em == ch && is_closer(bytes, from, start),
                None => is_opener(bytes, start + len),
            },
            _ => match open.strong {
                Some(strong) => strong == ch && is_closer(bytes, from, start),
                None => is_opener(bytes, start + len),
            },
        };
        if valid {
            return Some((start, Delim { ch, len }));
        }
    }
    None
}

/// Followed by non-space (or the end, allowing one final newline), and not
/// by punctuation that ends a clause.
fn is_opener(bytes: &[u8], after: usize) -> bool {
    let followed = match bytes.get(after) {
        None => true,
        Some(b'\n') => after + 1 == bytes.len(),
        Some(&b) => !is_space(b),
    };
    let clause_end = bytes.get(after).is_some_and(|b| b".,:;".contains(b))
        && bytes.get(after + 1).is_some_and(|&b| is_space(b));
    followed && !clause_end
}

/// Preceded by non-space, or at the start of the unscanned text.
fn is_closer(bytes: &[u8], from: usize, start: usize) -> bool {
    start == from || !is_space(bytes[start - 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;

    fn emphasis(text: &str) -> String {
        let options = Options::default();
        let mut ctx = Context::new(&options);
        let out = do_italics_and_bold(&mut ctx, text);
        ctx.vault.resolve(&out)
    }

    #[test]
    fn test_em_and_strong() {
        assert_eq!(emphasis("*a* and _b_"), "<em>a</em> and <em>b</em>");
        assert_eq!(emphasis("**a** and __b__"), "<strong>a</strong> and <strong>b</strong>");
    }

    #[test]
    fn test_nested() {
        assert_eq!(emphasis("*a **b** c*"), "<em>a <strong>b</strong> c</em>");
        assert_eq!(emphasis("**a *b***"), "<strong>a <em>b</em></strong>");
    }

    #[test]
    fn test_triple() {
        assert_eq!(emphasis("***x***"), "<strong><em>x</em></strong>");
        assert_eq!(emphasis("***a** b*"), "<em><strong>a</strong> b</em>");
        assert_eq!(emphasis("***a* b**"), "<strong><em>a</em> b</strong>");
    }

    #[test]
    fn test_unclosed_is_literal() {
        assert_eq!(emphasis("*a"), "*a");
        assert_eq!(emphasis("**a *b"), "**a *b");
    }

    #[test]
    fn test_needs_flanking() {
        assert_eq!(emphasis("a * b * c"), "a * b * c");
        assert_eq!(emphasis("*. x*"), "*. x*");
        assert_eq!(emphasis("**** x"), "**** x");
    }

    #[test]
    fn test_mixed_characters_do_not_close() {
        assert_eq!(emphasis("*a_"), "*a_");
    }
}
