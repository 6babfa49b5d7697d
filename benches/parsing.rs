//! Throughput of the hashmark engine
//!
//! cargo bench --bench parsing

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use hashmark::Markdown;

mod docs {
    pub const ONE_LINE: &str = "Plain words with one *em* and one `span`.";

    pub const NOTE: &str = r#"Release notes
=============

Version 2 drops the legacy flag. See [upgrading][up] first.

* Faster list parsing
* Hard breaks
  now survive nesting

[up]: /upgrading.html "Upgrading"
"#;

    pub const MANUAL: &str = r#"Installing
----------

Fetch the archive from <https://downloads.example.org/> and unpack it:

    tar xzf pkg.tar.gz
    cd pkg && make

Questions go to <help@example.org>.

<table>
<tr><td>*kept raw*</td></tr>
</table>

> **Note:** the build needs a C compiler.
>
>     cc --version

1.  Configure

    Run `./configure --prefix=/usr` and check the summary.

2.  Build and install

***

Written by the packaging team. ![badge](/b.svg "Build")
"#;

    /// The manual plus its reference table, many times over.
    pub fn book() -> String {
        let chapter = r#"
Chapter
=======

Text with _underscores_, __bold__, a [ref link][ch] and an
inline [link](http://example.com/a_(b) "Title") on one line.

+ tight
+ items
    - nested
    - again

"#;
        let mut book = chapter.repeat(60);
        book.push_str(MANUAL);
        book.push_str("\n[ch]: /chapter\n");
        book
    }

    pub fn open_emphasis() -> String {
        "_x *y ".repeat(800)
    }

    pub fn deep_brackets() -> String {
        format!("{}x{}({})", "[".repeat(400), "]".repeat(400), "(".repeat(300))
    }

    pub fn deep_quotes() -> String {
        let mut text = String::new();
        for level in 1..=60 {
            text.push_str(&"> ".repeat(level));
            text.push_str("line\n");
        }
        text
    }

    pub fn html_soup() -> String {
        "<div>\n".repeat(200) + &"</div>\n".repeat(200)
    }
}

fn bench_documents(c: &mut Criterion) {
    let mut group = c.benchmark_group("documents");
    let md = Markdown::default();

    for (name, input) in [
        ("one_line", docs::ONE_LINE.to_owned()),
        ("note", docs::NOTE.to_owned()),
        ("manual", docs::MANUAL.to_owned()),
        ("book", docs::book()),
    ] {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_function(name, |b| b.iter(|| md.transform(black_box(&input))));
    }

    group.finish();
}

fn bench_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoding");

    let words = "nothing to encode in this sentence at all ".repeat(120);
    let markup = "a < b && c > d &copy; <em>tag</em> ".repeat(120);
    for (name, input) in [("words", &words), ("markup", &markup)] {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_function(format!("amps_and_angles/{name}"), |b| {
            b.iter(|| hashmark::escape::encode_amps_and_angles(black_box(input), true))
        });
        group.bench_function(format!("attribute/{name}"), |b| {
            b.iter(|| hashmark::escape::encode_attribute(black_box(input), true))
        });
    }

    group.finish();
}

fn bench_adversarial(c: &mut Criterion) {
    let mut group = c.benchmark_group("adversarial");
    group.sample_size(20);
    let md = Markdown::default();

    for (name, input) in [
        ("open_emphasis", docs::open_emphasis()),
        ("deep_brackets", docs::deep_brackets()),
        ("deep_quotes", docs::deep_quotes()),
        ("html_soup", docs::html_soup()),
    ] {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_function(name, |b| b.iter(|| md.transform(black_box(&input))));
    }

    group.finish();
}

criterion_group!(benches, bench_documents, bench_encoding, bench_adversarial);
criterion_main!(benches);
