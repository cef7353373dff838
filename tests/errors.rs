use pretty_assertions::assert_eq;
use yaml_token_reader::{Error, ReaderOptions, Result, YamlReader};

fn error(input: &str) -> Error {
    YamlReader::from_str(input)
        .collect::<Result<Vec<_>>>()
        .unwrap_err()
}

/// The problem and 1-based line of the error `input` produces.
fn problem(input: &str) -> (String, u64) {
    let err = error(input);
    let line = err.mark().map_or(0, |mark| mark.line + 1);
    (err.problem().unwrap_or_default().to_owned(), line)
}

#[test]
fn test_duplicate_key() {
    assert_eq!(problem("a: 1\nb: 2\na: 3\n"), ("found duplicate key 'a'".to_owned(), 3));
    assert_eq!(problem("{x: 1, x: 2}"), ("found duplicate key 'x'".to_owned(), 1));
}

#[test]
fn test_merge_keys_may_repeat() {
    let input = "a: &a {x: 1}\nb: &b {y: 2}\nc:\n  <<: *a\n  <<: *b\n";
    assert!(YamlReader::from_str(input).all(|token| token.is_ok()));
}

#[test]
fn test_consecutive_explicit_keys() {
    assert_eq!(
        problem("? ? x\n"),
        ("found two consecutive explicit keys".to_owned(), 1)
    );
}

#[test]
fn test_duplicate_version_directive() {
    assert_eq!(
        problem("%YAML 1.2\n%YAML 1.2\n---\na\n"),
        ("found duplicate %YAML directive".to_owned(), 2)
    );
    assert_eq!(
        problem("%YAML 2.0\n---\na\n"),
        ("found incompatible YAML document".to_owned(), 1)
    );
}

#[test]
fn test_directive_without_document_start() {
    assert_eq!(
        problem("%YAML 1.2\na: 1\n"),
        ("did not find expected <document start>".to_owned(), 2)
    );
}

#[test]
fn test_directive_after_content() {
    assert_eq!(
        problem("a: 1\n%YAML 1.2\n---\nb\n"),
        ("found character '%' that cannot start any token".to_owned(), 2)
    );
}

#[test]
fn test_duplicate_tag_handle() {
    let err = error("%TAG !e! a:\n%TAG !e! b:\n---\nx\n");
    assert_eq!(err.to_string(), "2:1: found duplicate %TAG directive for handle '!e!'");
}

#[test]
fn test_indentation_below_document_start() {
    assert_eq!(
        problem("  a: 1\n b: 2\n"),
        ("indentation dropped below document start".to_owned(), 2)
    );
}

#[test]
fn test_explicit_key_text_decides_duplicates() {
    assert!(YamlReader::from_str("? 1.0\n: a\n1: b\n").all(|token| token.is_ok()));
    assert!(YamlReader::from_str("? null\n: a\n? ~\n: b\n").all(|token| token.is_ok()));
    assert_eq!(
        problem("? 0x10\n: a\n0x10: b\n"),
        ("found duplicate key '0x10'".to_owned(), 3)
    );
}

#[test]
fn test_reserved_indicator() {
    assert_eq!(
        problem("a: @x\n"),
        ("found character '@' that cannot start any token".to_owned(), 1)
    );
}

#[test]
fn test_undefined_alias() {
    assert_eq!(problem("a: *nope\n"), ("found undefined alias 'nope'".to_owned(), 1));
}

#[test]
fn test_unterminated_flow_collection() {
    assert_eq!(
        problem("a: [1, 2\n"),
        ("found unexpected end of stream inside a flow collection".to_owned(), 2)
    );
}

#[test]
fn test_bad_indentation() {
    assert_eq!(
        problem("a:\n  b: 1\n c: 2\n"),
        ("bad indentation of a mapping entry".to_owned(), 3)
    );
    assert_eq!(
        problem("a: 1\n- b\n"),
        ("found a sequence item where a map was established".to_owned(), 2)
    );
}

#[test]
fn test_tab_indentation() {
    assert_eq!(
        problem("a:\n\tb: 1\n"),
        ("found a tab character that violates indentation".to_owned(), 2)
    );
}

#[test]
fn test_mapping_value_in_scalar_context() {
    assert_eq!(
        problem("a: b: c\n"),
        ("mapping values are not allowed in this context".to_owned(), 1)
    );
    assert_eq!(
        problem("\"a\n b\": c\n"),
        ("implicit keys must be on a single line".to_owned(), 1)
    );
}

#[test]
fn test_invalid_tagged_value() {
    assert_eq!(problem("n: !!int twelve\n"), ("invalid !!int value 'twelve'".to_owned(), 1));
}

#[test]
fn test_content_after_root() {
    assert_eq!(
        problem("\"a\"\n\"b\"\n"),
        ("found content after the document root node".to_owned(), 2)
    );
}

#[test]
fn test_alias_expansion_limit() {
    let options = ReaderOptions {
        max_alias_tokens: 10,
        ..ReaderOptions::default()
    };
    let err = YamlReader::from_str("a: &a [1, 2]\nb: [*a, *a, *a]\n")
        .with_options(options)
        .collect::<Result<Vec<_>>>()
        .unwrap_err();
    assert_eq!(err.problem(), Some("alias expansion exceeds the configured limit"));
}

#[test]
fn test_invalid_utf8_is_a_source_error() {
    let input: &[u8] = b"a: \xff\n";
    let err = YamlReader::from_read(input)
        .collect::<Result<Vec<_>>>()
        .unwrap_err();
    assert!(matches!(err, Error::Source(_)));
    assert_eq!(err.problem(), None);
}
