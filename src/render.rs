//! HTML fragment writer.
//!
//! Every output fragment of a pass is built here before it is protected,
//! so the markup shapes live in one place. Attribute values are expected
//! to be encoded by the caller.

/// HTML output writer over a growable string.
///
/// # Example
/// ```
/// use hashmark::render::HtmlWriter;
///
/// let mut writer = HtmlWriter::new(" />");
/// writer.heading_start(2);
/// writer.write_str("Hello");
/// writer.heading_end(2);
/// writer.void_tag("hr");
/// assert_eq!(writer.into_string(), "<h2>Hello</h2><hr />");
/// ```
pub struct HtmlWriter<'s> {
    out: String,
    suffix: &'s str,
}

impl<'s> HtmlWriter<'s> {
    /// Create a writer closing void elements with `suffix`.
    #[inline]
    pub fn new(suffix: &'s str) -> Self {
        Self {
            out: String::with_capacity(64),
            suffix,
        }
    }

    /// Write text without escaping.
    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.out.push_str(s);
    }

    #[inline]
    pub fn newline(&mut self) {
        self.out.push('\n');
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.out
    }

    // --- HTML Tag Helpers ---

    /// Write opening tag: `<tagname>`
    #[inline]
    pub fn open_tag(&mut self, tag: &str) {
        self.out.push('<');
        self.out.push_str(tag);
        self.out.push('>');
    }

    /// Write closing tag: `</tagname>`
    #[inline]
    pub fn close_tag(&mut self, tag: &str) {
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }

    /// Write a void element with the configured suffix: `<hr />`
    #[inline]
    pub fn void_tag(&mut self, tag: &str) {
        self.out.push('<');
        self.out.push_str(tag);
        self.out.push_str(self.suffix);
    }

    /// Write a ` name="value"` attribute.
    #[inline]
    pub fn attr(&mut self, name: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        self.out.push_str(value);
        self.out.push('"');
    }

    // --- Common HTML Elements ---

    /// Write heading start: `<hN>`
    #[inline]
    pub fn heading_start(&mut self, level: u8) {
        debug_assert!((1..=6).contains(&level));
        self.out.push_str("<h");
        self.out.push((b'0' + level) as char);
        self.out.push('>');
    }

    /// Write heading end: `</hN>`
    #[inline]
    pub fn heading_end(&mut self, level: u8) {
        debug_assert!((1..=6).contains(&level));
        self.out.push_str("</h");
        self.out.push((b'0' + level) as char);
        self.out.push('>');
    }

    /// Write a code block around already escaped content.
    #[inline]
    pub fn code_block(&mut self, escaped: &str) {
        self.out.push_str("<pre><code>");
        self.out.push_str(escaped);
        self.out.push_str("\n</code></pre>");
    }

    /// Write inline code around already escaped content.
    #[inline]
    pub fn inline_code(&mut self, escaped: &str) {
        self.out.push_str("<code>");
        self.out.push_str(escaped);
        self.out.push_str("</code>");
    }

    /// Write line break: `<br />` followed by a newline.
    #[inline]
    pub fn line_break(&mut self) {
        self.void_tag("br");
        self.newline();
    }

    /// Write link start: `<a href="url" title="title">`
    #[inline]
    pub fn link_start(&mut self, url: &str, title: Option<&str>) {
        self.out.push_str("<a");
        self.attr("href", url);
        if let Some(title) = title {
            self.attr("title", title);
        }
        self.out.push('>');
    }

    /// Write link end: `</a>`
    #[inline]
    pub fn link_end(&mut self) {
        self.out.push_str("</a>");
    }

    /// Write an image element.
    #[inline]
    pub fn image(&mut self, src: &str, alt: &str, title: Option<&str>) {
        self.out.push_str("<img");
        self.attr("src", src);
        self.attr("alt", alt);
        if let Some(title) = title {
            self.attr("title", title);
        }
        self.out.push_str(self.suffix);
    }
}
