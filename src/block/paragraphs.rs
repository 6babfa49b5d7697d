//! Paragraph formation, the last block step.

use crate::context::Context;
use crate::inline::run_span_gamut;
use crate::normalize::trim_newlines;
use crate::vault::Vault;

/// Split on blank lines and wrap every chunk that is not a protected block
/// in `<p>`. Protected blocks are emitted as their stored markup.
pub fn form_paragraphs(ctx: &mut Context, text: &str) -> String {
    let mut grafs = Vec::new();
    for chunk in split_blank_lines(trim_newlines(text)) {
        if Vault::is_block_token(chunk) {
            if let Some(fragment) = ctx.vault.get(chunk) {
                grafs.push(fragment.to_owned());
                continue;
            }
        }
        let span = run_span_gamut(ctx, chunk);
        let body = span.trim_start_matches(' ');
        let mut graf = String::with_capacity(body.len() + 7);
        graf.push_str("<p>");
        graf.push_str(body);
        graf.push_str("</p>");
        grafs.push(ctx.vault.resolve(&graf));
    }
    grafs.join("\n\n")
}

/// Non-empty chunks between runs of two or more newlines.
fn split_blank_lines(text: &str) -> impl Iterator<Item = &str> {
    let bytes = text.as_bytes();
    let mut pos = 0;
    std::iter::from_fn(move || {
        while pos < bytes.len() {
            let start = pos;
            let mut end = start;
            loop {
                let Some(i) = memchr::memchr(b'\n', &bytes[end..]) else {
                    end = bytes.len();
                    pos = end;
                    break;
                };
                let nl = end + i;
                let run = bytes[nl..].iter().take_while(|&&b| b == b'\n').count();
                if run >= 2 {
                    end = nl;
                    pos = nl + run;
                    break;
                }
                end = nl + 1;
            }
            if end > start {
                return Some(&text[start..end]);
            }
        }
        None
    })
}
