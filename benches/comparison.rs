//! hashmark next to pulldown-cmark and comrak
//!
//! cargo bench --bench comparison
//!
//! Both competitors implement CommonMark, so their HTML differs from the
//! classic dialect in corner cases. The inputs stick to constructs all
//! three read the same way; the numbers compare work done, not output.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use hashmark::Markdown;

mod inputs {
    pub const PROSE: &str = "A sentence with *stress*, **weight** and a `literal`.";

    pub const README: &str = r#"Usage
=====

Run the tool with a file name, or pipe text in.

* `--html` writes HTML 4 void elements
* `--no-markup` escapes raw HTML
* `--tab-width` changes code indentation

See [the manual](https://example.com/manual "Manual").
"#;

    pub const REFERENCES: &str = r#"The [parser][p] feeds the [renderer][r]; [p] is also
described in ![the diagram][d].

[p]: https://example.com/parser "Parser"
[r]: https://example.com/renderer
[d]: /diagram.png
"#;

    pub fn long() -> String {
        let part = r#"
Part
----

Paragraph one has *em*, **strong** and [a link](https://example.com/).

1. first
2. second

> quoted
> twice

    indented code
    block

"#;
        part.repeat(100)
    }
}

fn hashmark_html(md: &Markdown, input: &str) -> String {
    md.transform(input)
}

fn pulldown_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut out, pulldown_cmark::Parser::new(input));
    out
}

fn comrak_html(input: &str) -> String {
    comrak::markdown_to_html(input, &comrak::Options::default())
}

fn bench_engines(c: &mut Criterion) {
    let md = Markdown::default();
    let long = inputs::long();
    let cases = [
        ("prose", inputs::PROSE),
        ("readme", inputs::README),
        ("references", inputs::REFERENCES),
        ("long", long.as_str()),
    ];

    let mut group = c.benchmark_group("engines");
    for (case, input) in cases {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::new("hashmark", case), input, |b, s| {
            b.iter(|| hashmark_html(&md, black_box(s)))
        });
        group.bench_with_input(BenchmarkId::new("pulldown-cmark", case), input, |b, s| {
            b.iter(|| pulldown_html(black_box(s)))
        });
        group.bench_with_input(BenchmarkId::new("comrak", case), input, |b, s| {
            b.iter(|| comrak_html(black_box(s)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_engines);
criterion_main!(benches);
