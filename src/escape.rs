//! HTML escaping utilities.
//!
//! Fast-path optimized: scans for the first escapable byte with memchr,
//! then bulk-copies segments between escapes.

use memchr::{memchr, memchr2};
use std::borrow::Cow;

use crate::cursor::is_word;

/// Bytes a backslash may escape in span text.
pub const ESCAPABLE: &[u8] = b"\\`*_{}[]()>#+-.!";

/// Whether `b` may follow a backslash escape.
#[inline]
pub fn is_escapable(b: u8) -> bool {
    ESCAPABLE.contains(&b)
}

/// Decimal character reference for an ASCII byte, e.g. `&#42;` for `*`.
#[inline]
pub fn char_entity(b: u8) -> String {
    format!("&#{b};")
}

/// Encode `&` and `<` for text that is not code.
///
/// With `allow_entities`, an `&` that starts something shaped like a
/// character reference (`&name;`, `&#123;`, `&#x1F;`) is kept as is.
/// Every `<` becomes `&lt;`; this runs after raw markup was protected.
///
/// # Example
/// ```
/// use hashmark::escape::encode_amps_and_angles;
///
/// assert_eq!(encode_amps_and_angles("AT&T &copy; 1<2", true), "AT&amp;T &copy; 1&lt;2");
/// assert_eq!(encode_amps_and_angles("&copy;", false), "&amp;copy;");
/// ```
pub fn encode_amps_and_angles(text: &str, allow_entities: bool) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    encode_into(&mut out, text, allow_entities, false);
    out
}

/// Encode a value for use inside a double-quoted attribute.
///
/// Same rules as [`encode_amps_and_angles`], plus `"` becomes `&quot;`.
pub fn encode_attribute(text: &str, allow_entities: bool) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    encode_into(&mut out, text, allow_entities, true);
    out
}

/// Escape `&`, `<` and `>` inside code.
#[inline]
pub fn escape_code(text: &str) -> Cow<'_, str> {
    html_escape::encode_text(text)
}

fn encode_into(out: &mut String, text: &str, allow_entities: bool, quotes: bool) {
    let bytes = text.as_bytes();
    let mut copied = 0;
    let mut pos = 0;

    while let Some(i) = next_special(&bytes[pos..], quotes).map(|i| pos + i) {
        out.push_str(&text[copied..i]);
        match bytes[i] {
            b'&' if allow_entities && is_entity_like(&bytes[i + 1..]) => out.push('&'),
            b'&' => out.push_str("&amp;"),
            b'<' => out.push_str("&lt;"),
            _ => out.push_str("&quot;"),
        }
        copied = i + 1;
        pos = i + 1;
    }
    out.push_str(&text[copied..]);
}

#[inline]
fn next_special(bytes: &[u8], quotes: bool) -> Option<usize> {
    let amp_or_lt = memchr2(b'&', b'<', bytes);
    if !quotes {
        return amp_or_lt;
    }
    let quote = memchr(b'"', bytes);
    match (amp_or_lt, quote) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// `#?` followed by word bytes and `;`. Hex references are covered because
/// `x` and the hex digits are word bytes.
#[inline]
fn is_entity_like(after_amp: &[u8]) -> bool {
    let rest = after_amp.strip_prefix(b"#").unwrap_or(after_amp);
    let word = rest.iter().take_while(|&&b| is_word(b)).count();
    word > 0 && rest.get(word) == Some(&b';')
}
