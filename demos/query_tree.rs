fn main() {
    use itree_query::{parse_str, Expression};

    let input = r#"package
   name:itree-query
   authors
      author:"Jelmer Vernooĳ"
      author:"A. Contributor"
   dependencies
      dependency:regex
         version:"1"
"#;

    let tree = parse_str(input).unwrap();
    let package = tree.root().children().next().unwrap();

    let authors = Expression::parse("authors/*").unwrap();
    let out = authors.evaluate(&tree, package).unwrap();
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|n| n.name() == "author"));

    let versions = Expression::parse("dependencies/*/version").unwrap();
    let out = versions.evaluate(&tree, package).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].value().unwrap().to_string(), "1");
}
