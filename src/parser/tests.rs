use super::*;
use crate::ast::{Fragment, RawNode};
use crate::value::Value;

fn parse(input: &str) -> RawDocument {
    let mut parser = Parser::new(input).expect("Failed to create parser");
    parser.parse_document().expect("Failed to parse document")
}

fn parse_err(input: &str) -> IvoryError {
    let mut parser = match Parser::new(input) {
        Ok(p) => p,
        Err(e) => return e,
    };
    parser.parse_document().expect_err("expected a parse error")
}

#[test]
fn test_three_dialects_produce_identical_ast() {
    let ini = r#"
[server]
host: "localhost"
port: 8080
"#;

    let braces = r#"
server {
    host: "localhost"
    port: 8080
}
"#;

    let angles = r#"
server >
    host: "localhost"
    port: 8080
<
"#;

    let a = parse(ini);
    let b = parse(braces);
    let c = parse(angles);

    assert_eq!(a, b);
    assert_eq!(b, c);

    let server = a.root.get("server").and_then(|n| n.as_object()).unwrap();
    assert_eq!(
        server.get("host"),
        Some(&RawNode::Literal(Value::String("localhost".into())))
    );
    assert_eq!(
        server.get("port"),
        Some(&RawNode::Literal(Value::Integer(8080)))
    );
}

#[test]
fn test_mixed_block_styles_nest() {
    let input = r#"
app {
    cache >
        backend: "redis"
        limits {
            ttl: 60
        }
    <
}
"#;

    let doc = parse(input);
    let app = doc.root.get("app").and_then(|n| n.as_object()).unwrap();
    let cache = app.get("cache").and_then(|n| n.as_object()).unwrap();
    let limits = cache.get("limits").and_then(|n| n.as_object()).unwrap();

    assert_eq!(
        cache.get("backend"),
        Some(&RawNode::Literal(Value::String("redis".into())))
    );
    assert_eq!(limits.get("ttl"), Some(&RawNode::Literal(Value::Integer(60))));
}

#[test]
fn test_section_stays_open_until_next_header() {
    let input = r#"
[database]
host: "db.local"

[cache]
host: "cache.local"
"#;

    let doc = parse(input);
    assert_eq!(doc.root.len(), 2);

    let database = doc.root.get("database").and_then(|n| n.as_object()).unwrap();
    assert_eq!(
        database.get("host"),
        Some(&RawNode::Literal(Value::String("db.local".into())))
    );
}

#[test]
fn test_globals_and_references() {
    let input = r#"
$app_name: "demo"
$retries = 3

[app]
name: $app_name
fallback: database.host
"#;

    let doc = parse(input);
    assert_eq!(doc.globals.len(), 2);
    assert_eq!(
        doc.globals.get("app_name"),
        Some(&RawNode::Literal(Value::String("demo".into())))
    );

    let app = doc.root.get("app").and_then(|n| n.as_object()).unwrap();
    assert_eq!(
        app.get("name"),
        Some(&RawNode::VarRef {
            path: vec!["app_name".into()],
            global: true
        })
    );
    assert_eq!(
        app.get("fallback"),
        Some(&RawNode::VarRef {
            path: vec!["database".into(), "host".into()],
            global: false
        })
    );
}

#[test]
fn test_global_inside_block_is_rejected() {
    let err = parse_err("server {\n$nope: 1\n}\n");
    assert!(matches!(err, IvoryError::SyntaxError { .. }));
}

#[test]
fn test_global_after_section_header_is_rejected() {
    let err = parse_err("[app]\n$nope: 1\n");
    assert!(matches!(err, IvoryError::SyntaxError { .. }));
}

#[test]
fn test_duplicate_keys_last_write_wins() {
    let doc = parse("a: 1\na: 2\n");
    assert_eq!(doc.root.get("a"), Some(&RawNode::Literal(Value::Integer(2))));
}

#[test]
fn test_reopened_section_merges() {
    let input = r#"
[server]
host: "a"

[other]
x: 1

[server]
port: 80
"#;

    let doc = parse(input);
    let server = doc.root.get("server").and_then(|n| n.as_object()).unwrap();
    assert!(server.contains_key("host"));
    assert!(server.contains_key("port"));
}

#[test]
fn test_array_with_mixed_elements() {
    let input = r#"
endpoints: [
    "a"
    2
    [true, false]
    {name: "x", port: 1}
]
"#;

    let doc = parse(input);
    let items = match doc.root.get("endpoints") {
        Some(RawNode::Array(items)) => items,
        other => panic!("Expected array, got {:?}", other),
    };

    assert_eq!(items.len(), 4);
    assert_eq!(items[0], RawNode::Literal(Value::String("a".into())));
    assert_eq!(items[1], RawNode::Literal(Value::Integer(2)));
    assert!(matches!(items[2], RawNode::Array(_)));
    assert!(matches!(items[3], RawNode::Object(_)));
}

#[test]
fn test_empty_array() {
    let doc = parse("plugins: []\n");
    assert_eq!(doc.root.get("plugins"), Some(&RawNode::Array(vec![])));
}

#[test]
fn test_operator_call_with_nested_args() {
    let doc = parse("total: @math.add(@math.mul(2, 3), 4)\n");

    let call = doc.root.get("total").unwrap();
    match call {
        RawNode::OperatorCall { name, args } => {
            assert_eq!(name, "math.add");
            assert_eq!(args.len(), 2);
            assert!(matches!(
                &args[0],
                RawNode::OperatorCall { name, .. } if name == "math.mul"
            ));
            assert_eq!(args[1], RawNode::Literal(Value::Integer(4)));
        }
        other => panic!("Expected operator call, got {:?}", other),
    }
}

#[test]
fn test_operator_call_no_args() {
    let doc = parse("stamp: @date.now()\n");
    assert_eq!(
        doc.root.get("stamp"),
        Some(&RawNode::OperatorCall {
            name: "date.now".into(),
            args: vec![]
        })
    );
}

#[test]
fn test_interpolation_fragments_preserve_order() {
    let doc = parse(r#"url: "http://${server.host}:${server.port}/api""#);

    let frags = match doc.root.get("url") {
        Some(RawNode::Interp(frags)) => frags,
        other => panic!("Expected interpolation, got {:?}", other),
    };

    assert_eq!(
        frags,
        &vec![
            Fragment::Text("http://".into()),
            Fragment::Ref(vec!["server".into(), "host".into()]),
            Fragment::Text(":".into()),
            Fragment::Ref(vec!["server".into(), "port".into()]),
            Fragment::Text("/api".into()),
        ]
    );
}

#[test]
fn test_escaped_dollar_is_plain_text() {
    let doc = parse(r#"price: "cost: \${amount}""#);
    assert_eq!(
        doc.root.get("price"),
        Some(&RawNode::Literal(Value::String("cost: ${amount}".into())))
    );
}

#[test]
fn test_multiline_string_value() {
    let input = "motd: \"\"\"\nwelcome\nto ivory\n\"\"\"\n";
    let doc = parse(input);
    assert_eq!(
        doc.root.get("motd"),
        Some(&RawNode::Literal(Value::String("welcome\nto ivory".into())))
    );
}

#[test]
fn test_unclosed_block_error() {
    let err = parse_err("server {\nhost: \"a\"\n");
    assert!(matches!(err, IvoryError::UnexpectedEof { .. }));
}

#[test]
fn test_bad_interp_path_error() {
    let err = parse_err(r#"x: "${bad path}""#);
    assert!(matches!(err, IvoryError::SyntaxError { .. }));
}

#[test]
fn test_inline_object_requires_separator() {
    let err = parse_err("x: {a 1}\n");
    assert!(matches!(err, IvoryError::SyntaxError { .. }));
}
