//! Code spans.
//!
//! A run of backticks opens a span that closes at the next run of exactly
//! the same length. Content is trimmed and escaped, never processed.

use crate::context::Context;
use crate::escape::escape_code;
use crate::normalize::trim_ascii_ws;

/// Start of the first backtick run after `body` that is exactly `len`
/// long. The span content must not be empty.
pub fn find_closer(bytes: &[u8], body: usize, len: usize) -> Option<usize> {
    let mut pos = body + 1;
    while let Some(i) = bytes.get(pos..).and_then(|rest| memchr::memchr(b'`', rest)) {
        let start = pos + i;
        let run = bytes[start..].iter().take_while(|&&b| b == b'`').count();
        if run == len {
            return Some(start);
        }
        pos = start + run;
    }
    None
}

/// `<code>` element for the raw span content.
pub fn render(ctx: &Context, content: &str) -> String {
    let mut w = ctx.writer();
    w.inline_code(&escape_code(trim_ascii_ws(content)));
    w.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;

    #[test]
    fn test_find_closer() {
        assert_eq!(find_closer(b"`a`", 1, 1), Some(2));
        assert_eq!(find_closer(b"``a`b``", 2, 2), Some(5));
        assert_eq!(find_closer(b"``", 1, 1), None);
        assert_eq!(find_closer(b"`a", 1, 1), None);
    }

    #[test]
    fn test_render_trims_and_escapes() {
        let options = Options::default();
        let ctx = Context::new(&options);
        assert_eq!(render(&ctx, "  a & b  "), "<code>a &amp; b</code>");
    }
}
