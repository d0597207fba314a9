use criterion::{Criterion, black_box, criterion_group, criterion_main};
use trusted_html::{Interpolation, TrustedHtml, from_template_literal};

const ROWS: usize = 2_000;

fn bench_escape_large(c: &mut Criterion) {
    let input = "<a href=\"x\">'tom' & 'jerry'</a>".repeat(ROWS);
    c.bench_function("bench_escape_large", |b| {
        b.iter(|| black_box(TrustedHtml::escape(black_box(&input))));
    });
}

fn bench_template_row(c: &mut Criterion) {
    let cell = TrustedHtml::escape("<cell & value>");
    c.bench_function("bench_template_row", |b| {
        b.iter(|| {
            let out = from_template_literal(
                &["<tr class=\"", "\"><td title=", ">", "</td></tr>"],
                &[
                    Interpolation::from("row odd"),
                    Interpolation::from(42),
                    Interpolation::from(&cell),
                ],
            );
            black_box(out)
        });
    });
}

fn bench_template_large_trusted_body(c: &mut Criterion) {
    let rows = "<tr><td>cell</td><td><b>bold</b> &amp; more</td></tr>".repeat(ROWS);
    let body = TrustedHtml::escape(&rows);
    c.bench_function("bench_template_large_trusted_body", |b| {
        b.iter(|| {
            let out = from_template_literal(
                &["<table id=", "><tbody>", "</tbody></table>"],
                &[Interpolation::from("t"), Interpolation::from(&body)],
            );
            black_box(out)
        });
    });
}

criterion_group!(
    benches,
    bench_escape_large,
    bench_template_row,
    bench_template_large_trusted_body
);
criterion_main!(benches);
