//! Protected-substring vault.
//!
//! Every pass that produces finished HTML locks it away here and leaves a
//! token in the document instead, so later passes never re-parse it. A token
//! is `K` U+001A id `K`, where `K` is the kind boundary byte and `id` is a
//! per-transformation counter. U+001A is stripped from the input before any
//! pass runs, so tokens cannot collide with document text.

use memchr::memchr;

/// The token delimiter byte.
pub const MARKER: u8 = 0x1A;

/// Kind of a protected fragment; selects the token boundary byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// Block-level HTML that must never be wrapped in a paragraph.
    Block,
    /// Inline output that acts as a word separator.
    Inline,
    /// Everything else.
    Generic,
}

impl FragmentKind {
    #[inline]
    pub const fn boundary(self) -> u8 {
        match self {
            FragmentKind::Block => b'B',
            FragmentKind::Inline => b':',
            FragmentKind::Generic => b'X',
        }
    }
}

/// Mapping from synthetic tokens to resolved output fragments.
///
/// # Example
/// ```
/// use hashmark::vault::{FragmentKind, Vault};
///
/// let mut vault = Vault::new();
/// let token = vault.protect("<em>a</em>", FragmentKind::Generic);
/// assert_eq!(vault.resolve(&format!("x {token} y")), "x <em>a</em> y");
/// ```
#[derive(Debug, Default)]
pub struct Vault {
    fragments: Vec<(FragmentKind, String)>,
}

impl Vault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fragments protected so far.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Store `fragment` and return the token standing in for it.
    ///
    /// Tokens already inside `fragment` are resolved first, so a stored
    /// fragment never contains another token.
    pub fn protect(&mut self, fragment: &str, kind: FragmentKind) -> String {
        let flat = self.resolve(fragment);
        self.fragments.push((kind, flat));
        let id = self.fragments.len();
        let boundary = kind.boundary() as char;
        format!("{boundary}\u{1A}{id}{boundary}")
    }

    /// Shortcut for [`Vault::protect`] with [`FragmentKind::Block`].
    pub fn protect_block(&mut self, fragment: &str) -> String {
        self.protect(fragment, FragmentKind::Block)
    }

    /// Shortcut for [`Vault::protect`] with [`FragmentKind::Generic`].
    pub fn protect_generic(&mut self, fragment: &str) -> String {
        self.protect(fragment, FragmentKind::Generic)
    }

    /// Replace every well-formed token in `text` with its fragment.
    ///
    /// Unknown or malformed tokens are left as literal text.
    pub fn resolve(&self, text: &str) -> String {
        let mut current = self.resolve_once(text);
        while let Some(next) = current.as_ref().and_then(|t| self.resolve_once(t)) {
            current = Some(next);
        }
        match current {
            Some(resolved) => resolved,
            None => text.to_owned(),
        }
    }

    /// Fragment stored for `token`, when `token` is exactly one token.
    pub fn get(&self, token: &str) -> Option<&str> {
        let (kind, id, end) = parse_token(token.as_bytes(), 1)?;
        if end != token.len() {
            return None;
        }
        self.lookup(kind, id)
    }

    /// Whether `text` is exactly one block-kind token.
    pub fn is_block_token(text: &str) -> bool {
        matches!(
            parse_token(text.as_bytes(), 1),
            Some((b'B', _, end)) if end == text.len()
        )
    }

    fn lookup(&self, boundary: u8, id: usize) -> Option<&str> {
        let (kind, fragment) = self.fragments.get(id.checked_sub(1)?)?;
        (kind.boundary() == boundary).then_some(fragment.as_str())
    }

    /// One substitution pass. `None` when nothing was replaced.
    fn resolve_once(&self, text: &str) -> Option<String> {
        let bytes = text.as_bytes();
        let mut out: Option<String> = None;
        let mut copied = 0;
        let mut pos = 0;

        while let Some(i) = memchr(MARKER, &bytes[pos..]).map(|i| pos + i) {
            pos = i + 1;
            if i == 0 {
                continue;
            }
            let Some((boundary, id, end)) = parse_token(bytes, i) else {
                continue;
            };
            let Some(fragment) = self.lookup(boundary, id) else {
                continue;
            };
            let buf = out.get_or_insert_with(|| String::with_capacity(text.len() + 64));
            buf.push_str(&text[copied..i - 1]);
            buf.push_str(fragment);
            copied = end;
            pos = end;
        }

        out.map(|mut buf| {
            buf.push_str(&text[copied..]);
            buf
        })
    }
}

/// Parse a token whose marker byte sits at `marker`.
/// Returns `(boundary, id, end)` where `end` is one past the closing boundary.
fn parse_token(bytes: &[u8], marker: usize) -> Option<(u8, usize, usize)> {
    if marker == 0 || bytes.get(marker) != Some(&MARKER) {
        return None;
    }
    let boundary = bytes[marker - 1];
    if !boundary.is_ascii() || boundary == b'\n' {
        return None;
    }
    let digits_start = marker + 1;
    let digits = bytes[digits_start..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let close = digits_start + digits;
    if bytes.get(close) != Some(&boundary) {
        return None;
    }
    let id = std::str::from_utf8(&bytes[digits_start..close]).ok()?.parse().ok()?;
    Some((boundary, id, close + 1))
}
