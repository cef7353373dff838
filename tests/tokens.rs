use pretty_assertions::assert_eq;
use yaml_token_reader::{CoreTag, Result, ScalarValue, TagType, Token, ValueType, YamlReader};

fn tokens(input: &str) -> Vec<Token> {
    YamlReader::from_str(input)
        .collect::<Result<Vec<_>>>()
        .unwrap()
}

fn string(value: &str) -> Token {
    Token::Value(ScalarValue::String(value.into()), ValueType::String)
}

fn int(value: i64) -> Token {
    Token::Value(ScalarValue::Int(value), ValueType::Int)
}

fn null() -> Token {
    Token::Value(ScalarValue::Null, ValueType::Null)
}

fn key(name: &str) -> Token {
    Token::FieldName(Some(name.into()))
}

/// Wrap the tokens of one document.
fn document(body: Vec<Token>) -> Vec<Token> {
    let mut out = vec![Token::StartDocument];
    out.extend(body);
    out.push(Token::EndDocument);
    out
}

#[test]
fn test_block_mapping_with_sequence() {
    let input = "\
name: demo
ports:
  - 80
  - 443
enabled: true
";
    assert_eq!(
        tokens(input),
        document(vec![
            Token::SimpleStartObject,
            key("name"),
            string("demo"),
            key("ports"),
            Token::SimpleStartArray,
            int(80),
            int(443),
            Token::EndArray,
            key("enabled"),
            Token::Value(ScalarValue::Bool(true), ValueType::Bool),
            Token::EndObject,
        ])
    );
}

#[test]
fn test_flow_collections_inside_block() {
    let input = "items:\n  - [1, 2]\n  - {k: v}\n";
    assert_eq!(
        tokens(input),
        document(vec![
            Token::SimpleStartObject,
            key("items"),
            Token::SimpleStartArray,
            Token::SimpleStartArray,
            int(1),
            int(2),
            Token::EndArray,
            Token::SimpleStartObject,
            key("k"),
            string("v"),
            Token::EndObject,
            Token::EndArray,
            Token::EndObject,
        ])
    );
}

#[test]
fn test_sequence_of_mappings() {
    let input = "\
- name: x
  age: 3
- name: y
";
    assert_eq!(
        tokens(input),
        document(vec![
            Token::SimpleStartArray,
            Token::SimpleStartObject,
            key("name"),
            string("x"),
            key("age"),
            int(3),
            Token::EndObject,
            Token::SimpleStartObject,
            key("name"),
            string("y"),
            Token::EndObject,
            Token::EndArray,
        ])
    );
}

#[test]
fn test_indentation_width_does_not_matter() {
    let narrow = "root:\n  list:\n  - a\n  - b\n  map:\n    k: v\nafter: 1\n";
    let wide = "root:\n    list:\n    - a\n    - b\n    map:\n        k: v\nafter: 1\n";
    let expected = document(vec![
        Token::SimpleStartObject,
        key("root"),
        Token::SimpleStartObject,
        key("list"),
        Token::SimpleStartArray,
        string("a"),
        string("b"),
        Token::EndArray,
        key("map"),
        Token::SimpleStartObject,
        key("k"),
        string("v"),
        Token::EndObject,
        Token::EndObject,
        key("after"),
        int(1),
        Token::EndObject,
    ]);
    assert_eq!(tokens(narrow), expected);
    assert_eq!(tokens(wide), expected);
}

#[test]
fn test_anchor_and_alias() {
    let input = "a: &x {b: 1}\nc: *x\n";
    let shared = [
        Token::SimpleStartObject,
        key("b"),
        int(1),
        Token::EndObject,
    ];
    let mut body = vec![Token::SimpleStartObject, key("a")];
    body.extend(shared.iter().cloned());
    body.push(key("c"));
    body.extend(shared.iter().cloned());
    body.push(Token::EndObject);
    assert_eq!(tokens(input), document(body));
}

#[test]
fn test_merge_key() {
    let input = "base: &b {x: 1}\nderived:\n  <<: *b\n  y: 2\n";
    assert_eq!(
        tokens(input),
        document(vec![
            Token::SimpleStartObject,
            key("base"),
            Token::SimpleStartObject,
            key("x"),
            int(1),
            Token::EndObject,
            key("derived"),
            Token::SimpleStartObject,
            Token::MergeFieldName,
            Token::SimpleStartObject,
            key("x"),
            int(1),
            Token::EndObject,
            key("y"),
            int(2),
            Token::EndObject,
            Token::EndObject,
        ])
    );
}

#[test]
fn test_alias_as_key() {
    let input = "- &k key\n- *k : v\n";
    assert_eq!(
        tokens(input),
        document(vec![
            Token::SimpleStartArray,
            string("key"),
            Token::SimpleStartObject,
            key("key"),
            string("v"),
            Token::EndObject,
            Token::EndArray,
        ])
    );
}

#[test]
fn test_block_scalars() {
    let input = "\
literal: |
  line one
  line two
folded: >
  joined
  words

  new para
strip: |-
  x

keep: |+
  y

";
    assert_eq!(
        tokens(input),
        document(vec![
            Token::SimpleStartObject,
            key("literal"),
            string("line one\nline two\n"),
            key("folded"),
            string("joined words\nnew para\n"),
            key("strip"),
            string("x"),
            key("keep"),
            string("y\n\n"),
            Token::EndObject,
        ])
    );
}

#[test]
fn test_quoted_scalars() {
    let input = "a: \"one\n  two\"\nb: 'it''s'\nc: \"42\"\n";
    assert_eq!(
        tokens(input),
        document(vec![
            Token::SimpleStartObject,
            key("a"),
            string("one two"),
            key("b"),
            string("it's"),
            key("c"),
            string("42"),
            Token::EndObject,
        ])
    );
}

#[test]
fn test_implicit_typing_in_flow() {
    let input = "[1, 1.5, true, ~, text, \"1\", 0x10]";
    assert_eq!(
        tokens(input),
        document(vec![
            Token::SimpleStartArray,
            int(1),
            Token::Value(ScalarValue::Float(1.5), ValueType::Float),
            Token::Value(ScalarValue::Bool(true), ValueType::Bool),
            null(),
            string("text"),
            string("1"),
            int(16),
            Token::EndArray,
        ])
    );
}

#[test]
fn test_single_pair_in_flow_sequence() {
    assert_eq!(
        tokens("[a: b, c]"),
        document(vec![
            Token::SimpleStartArray,
            Token::SimpleStartObject,
            key("a"),
            string("b"),
            Token::EndObject,
            string("c"),
            Token::EndArray,
        ])
    );
}

#[test]
fn test_flow_collection_as_block_key() {
    assert_eq!(
        tokens("[a, b]: c\n"),
        document(vec![
            Token::SimpleStartObject,
            Token::StartComplexFieldName,
            Token::SimpleStartArray,
            string("a"),
            string("b"),
            Token::EndArray,
            Token::EndComplexFieldName,
            string("c"),
            Token::EndObject,
        ])
    );
}

#[test]
fn test_explicit_keys() {
    let input = "? a\n: 1\n? [b, c]\n: 2\n?\n: 3\n";
    assert_eq!(
        tokens(input),
        document(vec![
            Token::SimpleStartObject,
            key("a"),
            int(1),
            Token::StartComplexFieldName,
            Token::SimpleStartArray,
            string("b"),
            string("c"),
            Token::EndArray,
            Token::EndComplexFieldName,
            int(2),
            Token::FieldName(None),
            int(3),
            Token::EndObject,
        ])
    );
}

#[test]
fn test_explicit_keys_keep_their_text() {
    let input = "? 1.0\n: a\n? 0x10\n: b\n? null\n: c\n? ~\n: d\n1: e\n";
    assert_eq!(
        tokens(input),
        document(vec![
            Token::SimpleStartObject,
            key("1.0"),
            string("a"),
            key("0x10"),
            string("b"),
            key("null"),
            string("c"),
            key("~"),
            string("d"),
            key("1"),
            string("e"),
            Token::EndObject,
        ])
    );
}

#[test]
fn test_aliased_keys_keep_their_text() {
    let input = "- &f 1.0\n- &h 0x10\n- &n null\n- {*f : x, *h : y}\n- *n : z\n";
    assert_eq!(
        tokens(input),
        document(vec![
            Token::SimpleStartArray,
            Token::Value(ScalarValue::Float(1.0), ValueType::Float),
            int(16),
            null(),
            Token::SimpleStartObject,
            key("1.0"),
            string("x"),
            key("0x10"),
            string("y"),
            Token::EndObject,
            Token::SimpleStartObject,
            key("null"),
            string("z"),
            Token::EndObject,
            Token::EndArray,
        ])
    );
}

#[test]
fn test_empty_values() {
    assert_eq!(
        tokens("a:\nb:\n"),
        document(vec![
            Token::SimpleStartObject,
            key("a"),
            null(),
            key("b"),
            null(),
            Token::EndObject,
        ])
    );
    assert_eq!(tokens("---\n...\n"), document(vec![null()]));
}

#[test]
fn test_multiple_documents() {
    let mut expected = document(vec![int(1)]);
    expected.extend(document(vec![int(2)]));
    assert_eq!(tokens("--- 1\n--- 2\n...\n"), expected);

    let mut expected = document(vec![Token::SimpleStartObject, key("a"), int(1), Token::EndObject]);
    expected.extend(document(vec![
        Token::SimpleStartArray,
        string("b"),
        Token::EndArray,
    ]));
    assert_eq!(tokens("a: 1\n---\n- b\n"), expected);
}

#[test]
fn test_directives_and_tags() {
    let input = "\
%YAML 1.2
%TAG !e! tag:example.com,2000:
---
shape: !e!circle
  radius: 7
label: !!str 42
count: !!float 3
plain: ! 12
";
    assert_eq!(
        tokens(input),
        document(vec![
            Token::SimpleStartObject,
            key("shape"),
            Token::StartObject(TagType::Generic {
                prefix: "tag:example.com,2000:".into(),
                name: "circle".into(),
            }),
            key("radius"),
            int(7),
            Token::EndObject,
            key("label"),
            string("42"),
            key("count"),
            Token::Value(ScalarValue::Float(3.0), ValueType::Float),
            key("plain"),
            string("12"),
            Token::EndObject,
        ])
    );
}

#[test]
fn test_tag_handles_are_scoped_to_one_document() {
    let input = "%TAG !e! tag:example.com,2000:\n--- !e!a 1\n...\n--- !e!a 2\n";
    let err = YamlReader::from_str(input)
        .collect::<Result<Vec<_>>>()
        .unwrap_err();
    assert_eq!(err.problem(), Some("found undefined tag handle '!e!'"));
}

#[test]
fn test_tag_resolver() {
    let input = "- !point 1,2\n- !!binary aGVsbG8=\n";
    let tokens = YamlReader::from_str(input)
        .with_tag_resolver(|prefix: &str, name: &str| {
            (prefix == "!" && name == "point").then(|| String::from("Point"))
        })
        .collect::<Result<Vec<_>>>()
        .unwrap();
    assert_eq!(
        tokens,
        document(vec![
            Token::SimpleStartArray,
            Token::Value(
                ScalarValue::String("1,2".into()),
                ValueType::Tagged(TagType::Resolved("Point".into()))
            ),
            Token::Value(
                ScalarValue::String("aGVsbG8=".into()),
                ValueType::Tagged(TagType::Core(CoreTag::Binary))
            ),
            Token::EndArray,
        ])
    );
}

#[test]
fn test_comments_are_skipped() {
    let input = "# head\na: 1 # trailing\n# between\nb: [1, # inside\n  2]\n";
    assert_eq!(
        tokens(input),
        document(vec![
            Token::SimpleStartObject,
            key("a"),
            int(1),
            key("b"),
            Token::SimpleStartArray,
            int(1),
            int(2),
            Token::EndArray,
            Token::EndObject,
        ])
    );
}

#[test]
fn test_start_and_end_tokens_balance() {
    let input = "\
a: &anchor
  - [x, {y: [1, 2]}]
  - ? {k: v}
    : z
b: *anchor
";
    let mut depth = 0i32;
    for token in tokens(input) {
        if token.is_start() {
            depth += 1;
        } else if token.is_end() {
            depth -= 1;
        }
        assert!(depth >= 0);
    }
    assert_eq!(depth, 0);
}
