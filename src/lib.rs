//! hashmark: classic Markdown to HTML converter
//!
//! Converts the classic Markdown dialect (setext and ATX headers, tight and
//! loose lists, indented code, reference links, raw HTML pass-through) into
//! HTML, quirks included.
//!
//! # Design Principles
//! - Whole-text passes: every block and span construct is one rewrite over
//!   the document, run in a fixed order
//! - Protected fragments: finished HTML is locked in a [`Vault`] and stands
//!   in the text as a token, so no later pass re-reads it
//! - No regex: byte-level scanners with bounded nesting
//! - Total: malformed markup degrades to text, never to an error
//!
//! # Example
//! ```
//! let html = hashmark::to_html("Title\n=====\n\nSome *text*.");
//! assert_eq!(html, "<h1>Title</h1>\n\n<p>Some <em>text</em>.</p>\n");
//! ```

mod block;
mod context;
pub mod cursor;
pub mod error;
pub mod escape;
mod inline;
pub mod limits;
pub mod link_ref;
mod normalize;
pub mod options;
pub mod render;
pub mod vault;

pub use error::Error;
pub use limits::NestingLimits;
pub use link_ref::{LinkDef, LinkRefStore};
pub use options::{Options, Overrides};
pub use render::HtmlWriter;
pub use vault::{FragmentKind, Vault};

use context::Context;

/// A configured converter.
///
/// Holds validated options only. Each [`Markdown::transform`] call builds
/// its own pass state, so one engine can be shared freely, across threads
/// included. Options only reach the passes through [`Markdown::new`], which
/// rejects a zero tab width or nesting bound.
#[derive(Debug, Clone)]
pub struct Markdown {
    options: Options,
}

impl Markdown {
    /// Build an engine, rejecting options no transformation can run with.
    pub fn new(options: Options) -> Result<Self, Error> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Convert Markdown text to HTML.
    ///
    /// The output always ends with exactly one newline.
    pub fn transform(&self, text: &str) -> String {
        tracing::debug!(input_len = text.len(), "transform start");
        let mut ctx = Context::new(&self.options);

        let text = normalize::normalize(text, ctx.tab_width());
        let text = block::html::hash_html_blocks(&mut ctx, &text);
        let text = normalize::blank_space_lines(&text);
        let text = block::link_defs::strip_link_definitions(&mut ctx, &text);
        let text = block::run_basic_block_gamut(&mut ctx, &text);

        let resolved = if ctx.vault.is_empty() { text } else { ctx.vault.resolve(&text) };
        let mut html = String::with_capacity(resolved.len() + 1);
        html.push_str(resolved.trim_end_matches('\n'));
        html.push('\n');

        tracing::debug!(
            output_len = html.len(),
            fragments = ctx.vault.len(),
            links = ctx.links.len(),
            "transform done"
        );
        html
    }

    /// Convert UTF-8 encoded Markdown to HTML.
    pub fn transform_bytes(&self, bytes: &[u8]) -> Result<String, Error> {
        let text = std::str::from_utf8(bytes)?;
        Ok(self.transform(text))
    }
}

impl Default for Markdown {
    fn default() -> Self {
        Self {
            options: Options::default(),
        }
    }
}

/// Convert Markdown to HTML with default options (XHTML void elements,
/// raw HTML and entities allowed).
///
/// # Example
/// ```
/// let html = hashmark::to_html("# Hello\n\nWorld");
/// assert!(html.contains("<h1>Hello</h1>"));
/// assert!(html.contains("<p>World</p>"));
/// ```
pub fn to_html(input: &str) -> String {
    Markdown::default().transform(input)
}

/// Convert Markdown to HTML with options.
pub fn to_html_with_options(input: &str, options: &Options) -> Result<String, Error> {
    let engine = Markdown::new(options.clone())?;
    Ok(engine.transform(input))
}
