use criterion::{black_box, criterion_group, criterion_main, Criterion};
use itree_query::{parse_str, Expression};

fn eval_fixture_benchmark(c: &mut Criterion) {
    let fixture = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/bench/fixture.tree"))
        .expect("could not read fixture.tree");
    let tree = parse_str(&fixture).unwrap();
    let root = tree.root();

    let expressions = [
        Expression::parse("*/name").unwrap(),
        Expression::parse("**/dependency").unwrap(),
        Expression::parse("*/dependencies/*/version").unwrap(),
        Expression::parse("../0/**").unwrap(),
    ];

    c.bench_function("evaluate_fixture_expressions", |b| {
        b.iter(|| {
            for expr in &expressions {
                let out = expr.evaluate(&tree, root).unwrap();
                black_box(out);
            }
        });
    });
}

criterion_group!(benches, eval_fixture_benchmark);
criterion_main!(benches);
