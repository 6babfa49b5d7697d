//! Block-level passes.
//!
//! Each pass rewrites the whole text, replacing every construct it
//! recognises with a protected token. The passes run in a fixed order:
//! - Headers (setext, then ATX)
//! - Horizontal rules
//! - Lists
//! - Code blocks
//! - Blockquotes
//!
//! and the remaining text is split into paragraphs.

pub mod blockquote;
pub mod code;
pub mod headers;
pub mod html;
pub mod link_defs;
pub mod lists;
pub mod paragraphs;
pub mod rules;

use crate::context::Context;

/// A block pass: text in, text out.
pub type BlockPass = fn(&mut Context, &str) -> String;

/// Block passes in the order they run.
pub const BLOCK_GAMUT: &[BlockPass] = &[
    headers::do_headers,
    rules::do_horizontal_rules,
    lists::do_lists,
    code::do_code_blocks,
    blockquote::do_block_quotes,
];

/// Protect raw HTML blocks, then run the block passes.
///
/// Used for nested block content (list items, blockquotes), where HTML
/// blocks may only become visible once the nesting is stripped.
pub fn run_block_gamut(ctx: &mut Context, text: &str) -> String {
    let text = html::hash_html_blocks(ctx, text);
    run_basic_block_gamut(ctx, &text)
}

/// Run the block passes and form paragraphs.
pub fn run_basic_block_gamut(ctx: &mut Context, text: &str) -> String {
    let mut text = text.to_owned();
    for pass in BLOCK_GAMUT {
        text = pass(ctx, &text);
    }
    paragraphs::form_paragraphs(ctx, &text)
}

/// The first line start at or after `pos`.
pub(crate) fn next_line_start(bytes: &[u8], pos: usize) -> Option<usize> {
    if pos > bytes.len() {
        return None;
    }
    if pos == 0 || bytes[pos - 1] == b'\n' {
        return Some(pos);
    }
    memchr::memchr(b'\n', &bytes[pos..]).map(|i| pos + i + 1)
}

/// A rewrite of `text` that copies unmatched stretches and splices in
/// replacements. Stays unallocated until the first replacement.
pub(crate) struct Splicer<'t> {
    text: &'t str,
    out: Option<String>,
    copied: usize,
}

impl<'t> Splicer<'t> {
    pub fn new(text: &'t str) -> Self {
        Self {
            text,
            out: None,
            copied: 0,
        }
    }

    /// Replace `text[start..end]` with `replacement`.
    pub fn replace(&mut self, start: usize, end: usize, replacement: &str) {
        debug_assert!(self.copied <= start && start <= end);
        let text = self.text;
        let out = self.out.get_or_insert_with(|| String::with_capacity(text.len() + 32));
        out.push_str(&text[self.copied..start]);
        out.push_str(replacement);
        self.copied = end;
    }

    pub fn finish(self) -> String {
        match self.out {
            Some(mut out) => {
                out.push_str(&self.text[self.copied..]);
                out
            }
            None => self.text.to_owned(),
        }
    }
}
