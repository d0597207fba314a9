use criterion::{Criterion, black_box, criterion_group, criterion_main};
use html::{build_fragment, parse_fragment, serialize_children, tokenize};

const SMALL_BLOCKS: usize = 64;
const LARGE_BLOCKS: usize = 20_000;

const BLOCK_TEMPLATE: &str = "<div class=box><span>hello &amp; bye</span><img src=x></div>";

fn make_blocks(blocks: usize) -> String {
    BLOCK_TEMPLATE.repeat(blocks)
}

fn make_rawtext_adversarial(bytes: usize) -> String {
    let mut body = String::with_capacity(bytes + 32);
    body.push_str("<script>");
    while body.len() < bytes {
        body.push_str("</scri");
        body.push('<');
        body.push_str("pt");
    }
    body.push_str("</script>");
    body
}

fn bench_tokenize_small(c: &mut Criterion) {
    let input = make_blocks(SMALL_BLOCKS);
    c.bench_function("bench_tokenize_small", |b| {
        b.iter(|| {
            let stream = tokenize(black_box(&input));
            black_box(stream.tokens().len());
        });
    });
}

fn bench_tokenize_large(c: &mut Criterion) {
    let input = make_blocks(LARGE_BLOCKS);
    c.bench_function("bench_tokenize_large", |b| {
        b.iter(|| {
            let stream = tokenize(black_box(&input));
            black_box(stream.tokens().len());
        });
    });
}

fn bench_tree_build_large(c: &mut Criterion) {
    let input = make_blocks(LARGE_BLOCKS);
    let stream = tokenize(&input);
    c.bench_function("bench_tree_build_large", |b| {
        b.iter(|| {
            let root = build_fragment(black_box(&stream));
            black_box(root);
        });
    });
}

fn bench_round_trip_large(c: &mut Criterion) {
    let input = make_blocks(LARGE_BLOCKS);
    c.bench_function("bench_round_trip_large", |b| {
        b.iter(|| {
            let root = parse_fragment(black_box(&input));
            black_box(serialize_children(&root));
        });
    });
}

fn bench_tokenize_rawtext_adversarial(c: &mut Criterion) {
    let input = make_rawtext_adversarial(512 * 1024);
    c.bench_function("bench_tokenize_rawtext_adversarial", |b| {
        b.iter(|| {
            let stream = tokenize(black_box(&input));
            black_box(stream.tokens().len());
        });
    });
}

criterion_group!(
    benches,
    bench_tokenize_small,
    bench_tokenize_large,
    bench_tree_build_large,
    bench_round_trip_large,
    bench_tokenize_rawtext_adversarial
);
criterion_main!(benches);
