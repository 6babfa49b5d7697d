//! Span-level passes.
//!
//! Runs over the text of one block (a paragraph, header, list item or
//! link text) in a fixed order:
//! 1. Escapes, code spans and raw inline markup (`parse_span`)
//! 2. Images, then links (`![a][b]` also looks like a link)
//! 3. Autolinks, after links since `[this](<url>)` uses angle brackets too
//! 4. `&` and `<` encoding
//! 5. Emphasis
//! 6. Hard line breaks
//!
//! Every finished element is protected in the vault, so later passes
//! only ever see plain text and tokens.

mod autolink;
mod code_span;
mod emphasis;
mod links;
mod span;

use memchr::memchr;

use crate::context::Context;

/// A span pass: text in, text out.
pub type SpanPass = fn(&mut Context, &str) -> String;

/// Span passes in the order they run.
pub const SPAN_GAMUT: &[SpanPass] = &[
    span::parse_span,
    links::do_images,
    links::do_anchors,
    autolink::do_autolinks,
    encode_amps_and_angles,
    emphasis::do_italics_and_bold,
    do_hard_breaks,
];

/// Run every span pass over `text`.
pub fn run_span_gamut(ctx: &mut Context, text: &str) -> String {
    let mut text = text.to_owned();
    for pass in SPAN_GAMUT {
        text = pass(ctx, &text);
    }
    text
}

fn encode_amps_and_angles(ctx: &mut Context, text: &str) -> String {
    ctx.encode_amps_and_angles(text)
}

/// Two or more spaces before a newline become a line break.
fn do_hard_breaks(ctx: &mut Context, text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out: Option<String> = None;
    let mut copied = 0;
    let mut pos = 0;

    while let Some(nl) = memchr(b'\n', &bytes[pos..]).map(|i| pos + i) {
        pos = nl + 1;
        let spaces = bytes[copied..nl].iter().rev().take_while(|&&b| b == b' ').count();
        if spaces < 2 {
            continue;
        }
        let mut w = ctx.writer();
        w.line_break();
        let token = ctx.protect_separator(&w.into_string());
        let out = out.get_or_insert_with(|| String::with_capacity(text.len()));
        out.push_str(&text[copied..nl - spaces]);
        out.push_str(&token);
        copied = nl + 1;
    }

    match out {
        Some(mut out) => {
            out.push_str(&text[copied..]);
            out
        }
        None => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;

    fn span(text: &str) -> String {
        let options = Options::default();
        let mut ctx = Context::new(&options);
        let out = run_span_gamut(&mut ctx, text);
        ctx.vault.resolve(&out)
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(span("just words"), "just words");
    }

    #[test]
    fn test_hard_break() {
        assert_eq!(span("one  \ntwo"), "one<br />\ntwo");
        assert_eq!(span("one \ntwo"), "one \ntwo");
        assert_eq!(span("a   \n  \nb"), "a<br />\n<br />\nb");
    }

    #[test]
    fn test_passes_compose() {
        assert_eq!(
            span("*see* [the `docs`](/d \"D\") & <b>more</b>"),
            "<em>see</em> <a href=\"/d\" title=\"D\">the <code>docs</code></a> &amp; <b>more</b>"
        );
    }

    #[test]
    fn test_escapes_become_references() {
        assert_eq!(span("\\*not em\\*"), "&#42;not em&#42;");
    }

    #[test]
    fn test_raw_markup_disallowed() {
        let options = Options {
            allow_raw_markup: false,
            ..Options::default()
        };
        let mut ctx = Context::new(&options);
        let out = run_span_gamut(&mut ctx, "<b>x</b>");
        assert_eq!(ctx.vault.resolve(&out), "&lt;b>x&lt;/b>");
    }
}
