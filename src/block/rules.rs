//! Horizontal rules: three or more `-`, `*` or `_` on a line of their own.

use super::{Splicer, next_line_start};
use crate::context::Context;
use crate::cursor::line_end;

pub fn do_horizontal_rules(ctx: &mut Context, text: &str) -> String {
    let bytes = text.as_bytes();
    let mut splicer = Splicer::new(text);
    let mut pos = 0;

    while let Some(start) = next_line_start(bytes, pos) {
        let eol = line_end(bytes, start);
        if is_rule(&bytes[start..eol]) {
            let mut w = ctx.writer();
            w.void_tag("hr");
            let token = ctx.protect_block(&w.into_string());
            splicer.replace(start, eol, &format!("\n{token}\n"));
        }
        pos = eol + 1;
    }

    splicer.finish()
}

/// Up to three spaces, then at least three of one marker, each separated
/// from the previous by at most two spaces, then trailing spaces.
fn is_rule(line: &[u8]) -> bool {
    let indent = line.iter().take(4).take_while(|&&b| b == b' ').count();
    if indent > 3 {
        return false;
    }
    let Some(&marker) = line.get(indent).filter(|&&b| matches!(b, b'-' | b'*' | b'_')) else {
        return false;
    };
    let mut pos = indent + 1;
    let mut repeats = 0;
    loop {
        let spaces = line[pos..].iter().take(2).take_while(|&&b| b == b' ').count();
        if line.get(pos + spaces) != Some(&marker) {
            break;
        }
        pos += spaces + 1;
        repeats += 1;
    }
    repeats >= 2 && line[pos..].iter().all(|&b| b == b' ')
}
