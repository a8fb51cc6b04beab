use criterion::{black_box, criterion_group, criterion_main, Criterion};
use itree_query::parse_str;

fn parse_fixture_benchmark(c: &mut Criterion) {
    let fixture = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/bench/fixture.tree"))
        .expect("could not read fixture.tree");

    c.bench_function("parse_fixture", |b| {
        b.iter(|| {
            let tree = parse_str(black_box(&fixture)).unwrap();
            black_box(tree);
        });
    });
}

criterion_group!(benches, parse_fixture_benchmark);
criterion_main!(benches);
