use hashmark::{Options, to_html, to_html_with_options};
use pretty_assertions::assert_eq;

fn html_with(input: &str, options: &Options) -> String {
    to_html_with_options(input, options).expect("valid options")
}

#[test]
fn test_header_content_is_span_processed() {
    assert_eq!(to_html("# *hi*\n"), "<h1><em>hi</em></h1>\n");
    assert_eq!(to_html("Big `code`\n==="), "<h1>Big <code>code</code></h1>\n");
}

#[test]
fn test_header_without_blank_line_before() {
    assert_eq!(to_html("para\n# Head\n"), "<p>para</p>\n\n<h1>Head</h1>\n");
}

#[test]
fn test_code_block_escapes_everything() {
    assert_eq!(
        to_html("    <b>&amp;</b>\n"),
        "<pre><code>&lt;b&gt;&amp;amp;&lt;/b&gt;\n</code></pre>\n"
    );
}

#[test]
fn test_code_block_keeps_inner_blank_lines() {
    assert_eq!(
        to_html("    one\n\n      two\n"),
        "<pre><code>one\n\n  two\n</code></pre>\n"
    );
}

#[test]
fn test_code_block_tab_width() {
    let options = Options {
        tab_width: 8,
        ..Options::default()
    };
    assert_eq!(html_with("\tx\n", &options), "<pre><code>x\n</code></pre>\n");
    assert_eq!(html_with("    x\n", &options), "<p>x</p>\n");
}

#[test]
fn test_blockquote_lazy_continuation() {
    assert_eq!(
        to_html("> one\ntwo\n\nafter\n"),
        "<blockquote>\n  <p>one\n  two</p>\n</blockquote>\n\n<p>after</p>\n"
    );
}

#[test]
fn test_nested_blockquote() {
    let html = to_html("> > inner\n");
    assert!(
        html.contains("<blockquote>\n  <blockquote>\n    <p>inner</p>\n  </blockquote>\n</blockquote>"),
        "Got: {html}"
    );
}

#[test]
fn test_list_then_paragraph() {
    assert_eq!(to_html("* a\n\nafter\n"), "<ul>\n<li>a</li>\n</ul>\n\n<p>after</p>\n");
}

#[test]
fn test_list_kinds_split() {
    assert_eq!(
        to_html("* a\n1. b\n"),
        "<ul>\n<li>a</li>\n</ul>\n\n<ol>\n<li>b</li>\n</ol>\n"
    );
}

#[test]
fn test_list_needs_blank_line_before() {
    assert_eq!(to_html("para\n* not\n"), "<p>para\n* not</p>\n");
}

#[test]
fn test_list_item_emphasis() {
    assert_eq!(to_html("+ *a*\n+ b\n"), "<ul>\n<li><em>a</em></li>\n<li>b</li>\n</ul>\n");
}

#[test]
fn test_rules() {
    assert_eq!(to_html("- - -\n"), "<hr />\n");
    assert_eq!(to_html("___\n"), "<hr />\n");
    assert_eq!(to_html("a\n\n***\n\nb"), "<p>a</p>\n\n<hr />\n\n<p>b</p>\n");
}

#[test]
fn test_html_output_suffix() {
    let options = Options::html();
    assert_eq!(html_with("***\n", &options), "<hr>\n");
    assert_eq!(html_with("a  \nb\n", &options), "<p>a<br>\nb</p>\n");
}

#[test]
fn test_raw_html_blocks() {
    assert_eq!(to_html("<ins>\nx\n</ins>\n"), "<ins>\nx\n</ins>\n");
    assert_eq!(to_html("<!-- note -->\n"), "<!-- note -->\n");
    assert_eq!(to_html("<div>\n*x*\n</div>\n\n*y*\n"), "<div>\n*x*\n</div>\n\n<p><em>y</em></p>\n");
}

#[test]
fn test_inline_html_is_not_a_block() {
    assert_eq!(to_html("text <span>x</span>\n"), "<p>text <span>x</span></p>\n");
}

#[test]
fn test_no_markup_escapes_blocks() {
    let options = Options {
        allow_raw_markup: false,
        ..Options::default()
    };
    assert_eq!(html_with("<div>\nx\n</div>\n", &options), "<p>&lt;div>\nx\n&lt;/div></p>\n");
}

#[test]
fn test_link_definitions_are_removed() {
    assert_eq!(to_html("[a]: /a\n[b]: /b 'B'\n\ntext\n"), "<p>text</p>\n");
}

#[test]
fn test_crlf_input() {
    assert_eq!(to_html("Title\r\n=====\r\n\r\nbody\r\n"), "<h1>Title</h1>\n\n<p>body</p>\n");
}

#[test]
fn test_html_block_nesting_bound() {
    let input = "<div>\n<div>\n<div>\n<div>\n<div><div>x</div>\n</div>\n</div>\n</div>\n</div>\n</div>\n";
    assert_eq!(
        to_html(input),
        "<div>\n<div>\n<div>\n<div>\n<div><div>x</div>\n</div>\n</div>\n</div>\n</div>\n\n<p></div></p>\n"
    );
}

#[test]
fn test_html_block_nesting_from_options() {
    let input = "<div>\n<div>\nx\n</div>\n</div>\n";
    assert_eq!(to_html(input), "<div>\n<div>\nx\n</div>\n</div>\n");

    let options = Options::from_toml_str("[limits]\nhtml_block_nesting = 1").expect("valid config");
    assert_eq!(html_with(input, &options), "<div>\n<div>\nx\n</div>\n\n<p></div></p>\n");
}
