fn main() {
    use itree_query::expr::registry::register_static;
    use itree_query::{parse_str, Expression};
    use std::sync::Arc;

    // A static custom iterator: keep only nodes whose value compares equal
    // to "stable".
    register_static(
        "is-stable",
        Arc::new(|tree, _identity, input| {
            input
                .iter()
                .filter(|&&id| {
                    tree.node(id)
                        .value()
                        .and_then(|v| v.comparison_text())
                        .as_deref()
                        == Some("stable")
                })
                .copied()
                .collect()
        }),
    );

    let input = "channel\n   release:stable\n   release:nightly\n   release:beta\n";
    let tree = parse_str(input).unwrap();
    let channel = tree.root().children().next().unwrap();

    let expr = Expression::parse("*/is-stable").unwrap();
    let out = expr.evaluate(&tree, channel).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].value().unwrap().to_string(), "stable");
}
