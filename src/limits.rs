//! DoS prevention constants.
//!
//! These bounds replace true recursive balancing in the matchers that
//! would otherwise backtrack without limit on pathological input. They are
//! practical limits of the dialect, not grammar rules: deeper nesting simply
//! stops being recognised.

use serde::Deserialize;

/// Maximum bracket nesting inside link and image text `[a [b [c]]]`.
///
/// Brackets at this depth must be empty (`[]`).
pub const MAX_BRACKET_DEPTH: usize = 6;

/// Maximum parentheses nesting inside an inline link destination.
///
/// Parentheses at this depth must be empty (`()`).
pub const MAX_URL_PAREN_DEPTH: usize = 4;

/// Maximum same-name tag nesting inside a raw HTML block.
///
/// At the innermost level the nested element has to close on the line
/// it opened on.
pub const MAX_HTML_BLOCK_NESTING: usize = 4;

/// Nesting bounds used by one engine.
///
/// Every bound must be at least 1; [`crate::Options::validate`] rejects zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NestingLimits {
    pub bracket_depth: usize,
    pub url_paren_depth: usize,
    pub html_block_nesting: usize,
}

impl Default for NestingLimits {
    fn default() -> Self {
        Self {
            bracket_depth: MAX_BRACKET_DEPTH,
            url_paren_depth: MAX_URL_PAREN_DEPTH,
            html_block_nesting: MAX_HTML_BLOCK_NESTING,
        }
    }
}

impl NestingLimits {
    /// Name of the first bound that is zero, if any.
    pub fn first_zero(&self) -> Option<&'static str> {
        if self.bracket_depth == 0 {
            Some("bracket_depth")
        } else if self.url_paren_depth == 0 {
            Some("url_paren_depth")
        } else if self.html_block_nesting == 0 {
            Some("html_block_nesting")
        } else {
            None
        }
    }
}
