//! Automatic links: `<http://example.com>` and `<user@example.com>`.

use memchr::{memchr, memchr_iter};
use smallvec::SmallVec;

use crate::block::Splicer;
use crate::context::Context;
use crate::cursor::{Cursor, is_space};

const SCHEMES: [&str; 4] = ["https:", "http:", "ftp:", "dict:"];

/// Convert URL autolinks, then email autolinks.
pub fn do_autolinks(ctx: &mut Context, text: &str) -> String {
    let text = rewrite(ctx, text, url_autolink);
    rewrite(ctx, &text, email_autolink)
}

fn rewrite(ctx: &mut Context, text: &str, matcher: fn(&Context, &str, usize) -> Option<(usize, String)>) -> String {
    let bytes = text.as_bytes();
    let mut splicer = Splicer::new(text);
    let mut pos = 0;

    while let Some(lt) = bytes.get(pos..).and_then(|rest| memchr(b'<', rest)).map(|i| pos + i) {
        match matcher(ctx, text, lt) {
            Some((end, html)) => {
                let token = ctx.protect(&html);
                splicer.replace(lt, end, &token);
                pos = end;
            }
            None => pos = lt + 1,
        }
    }

    splicer.finish()
}

fn url_autolink(ctx: &Context, text: &str, lt: usize) -> Option<(usize, String)> {
    let mut cursor = Cursor::new_at(text, lt + 1);
    if !SCHEMES.iter().any(|scheme| cursor.eat_str_ignore_case(scheme)) {
        return None;
    }
    let body = cursor.skip_while(|b| !matches!(b, b'\'' | b'"' | b'>') && !is_space(b));
    if body == 0 || !cursor.at(b'>') {
        return None;
    }

    let url = ctx.encode_attribute(&text[lt + 1..cursor.offset()]);
    let mut w = ctx.writer();
    w.link_start(&url, None);
    w.write_str(&url);
    w.link_end();
    Some((cursor.offset() + 1, w.into_string()))
}

fn email_autolink(ctx: &Context, text: &str, lt: usize) -> Option<(usize, String)> {
    let mut cursor = Cursor::new_at(text, lt + 1);
    let mut starts: SmallVec<[usize; 2]> = SmallVec::new();
    if cursor.eat_str_ignore_case("mailto:") {
        starts.push(cursor.offset());
    }
    starts.push(lt + 1);

    starts.into_iter().find_map(|start| {
        let gt = email_at(text, start)?;
        Some((gt + 1, encode_email(ctx, &text[start..gt])))
    })
}

/// `local@domain` at `start`, followed by `>`. Returns the position of `>`.
fn email_at(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut cursor = Cursor::new_at(text, start);
    if cursor.eat(b'"') {
        // Quoted local part, on one line, closing at any later quote.
        let body = cursor.offset();
        return memchr_iter(b'"', &bytes[body..cursor.line_end()])
            .map(|i| body + i)
            .find_map(|quote| (bytes.get(quote + 1) == Some(&b'@')).then_some(quote + 2))
            .and_then(|domain| email_domain(bytes, domain));
    }
    if cursor.skip_while(is_local_byte) == 0 || !cursor.eat(b'@') {
        return None;
    }
    email_domain(bytes, cursor.offset())
}

fn email_domain(bytes: &[u8], pos: usize) -> Option<usize> {
    let gt = pos + memchr(b'>', bytes.get(pos..)?)?;
    let domain = &bytes[pos..gt];

    if let [b'[', inner @ .., b']'] = domain {
        let literal = !inner.is_empty() && inner.iter().all(|&b| b.is_ascii_hexdigit() || b == b'.' || b == b':');
        return literal.then_some(gt);
    }

    let labels: SmallVec<[&[u8]; 4]> = domain.split(|&b| b == b'.').collect();
    let [.., last] = labels.as_slice() else {
        return None;
    };
    let valid = labels.len() >= 2
        && labels.iter().all(|label| !label.is_empty() && label.iter().all(|&b| is_domain_byte(b)))
        && last.iter().all(u8::is_ascii_alphabetic);
    valid.then_some(gt)
}

fn is_local_byte(b: u8) -> bool {
    b >= 0x80 || b.is_ascii_alphanumeric() || b"-!#$%&'*+/=?^_`.{|}~".contains(&b)
}

fn is_domain_byte(b: u8) -> bool {
    b >= 0x80 || b.is_ascii_alphanumeric() || b == b'-'
}

/// A `mailto:` link with every ASCII character of the address written as
/// a decimal or hex character reference, a few left raw. The choice is
/// seeded from the CRC-32 of the address so output is deterministic.
/// `@` is always encoded.
fn encode_email(ctx: &Context, address: &str) -> String {
    let addr = format!("mailto:{address}");
    let seed = u64::from(crc32fast::hash(addr.as_bytes())) / addr.len() as u64;

    let mut href = String::with_capacity(addr.len() * 6);
    let mut label_start = 0;
    for (i, ch) in addr.char_indices() {
        if i == 7 {
            label_start = href.len();
        }
        if !ch.is_ascii() {
            href.push(ch);
            continue;
        }
        let r = seed * (i as u64 + 1) % 100;
        if r > 90 && ch != '@' {
            href.push(ch);
        } else if r < 45 {
            href.push_str(&format!("&#x{:x};", ch as u32));
        } else {
            href.push_str(&format!("&#{};", ch as u32));
        }
    }

    let mut w = ctx.writer();
    w.link_start(&href, None);
    w.write_str(&href[label_start..]);
    w.link_end();
    w.into_string()
}
