use crate::{Error, JsonSink, JsonValue, LexError, Parser, SyntaxError, Token};

/// Flat event recorder; nested composites record into the same log, so a
/// document's full event order is visible in one vector.
#[derive(Default)]
struct RecordingSink {
    events: Vec<String>,
}

impl JsonSink for RecordingSink {
    fn set_simple_property(&mut self, name: &str, value: JsonValue) -> Result<(), Error> {
        self.events.push(format!("simple({name},{value})"));
        Ok(())
    }

    fn create_object(&mut self, name: &str) -> Result<&mut dyn JsonSink, Error> {
        self.events.push(format!("object({name})"));
        Ok(self)
    }

    fn create_array(&mut self, name: &str) -> Result<&mut dyn JsonSink, Error> {
        self.events.push(format!("array({name})"));
        Ok(self)
    }
}

fn parse(input: &str) -> Result<Vec<String>, Error> {
    let mut sink = RecordingSink::default();
    Parser::new(input.chars()).parse(&mut sink)?;
    Ok(sink.events)
}

#[test]
fn routes_scalar_properties() {
    assert_eq!(
        parse(r#"{"a":1,"b":"x","c":true,"d":null,"e":2.5}"#).unwrap(),
        vec![
            "simple(a,1)",
            "simple(b,\"x\")",
            "simple(c,true)",
            "simple(d,null)",
            "simple(e,2.5)",
        ]
    );
}

#[test]
fn empty_object_produces_no_events() {
    assert_eq!(parse("{}").unwrap(), Vec::<String>::new());
}

#[test]
fn routes_composites_through_child_sinks() {
    assert_eq!(
        parse(r#"{"a":1,"b":{"c":true},"d":[1,2]}"#).unwrap(),
        vec![
            "simple(a,1)",
            "object(b)",
            "simple(c,true)",
            "array(d)",
            "simple(d,1)",
            "simple(d,2)",
        ]
    );
}

#[test]
fn array_elements_share_the_enclosing_property_name() {
    assert_eq!(
        parse(r#"{"xs":[{"y":1},{"y":2}]}"#).unwrap(),
        vec![
            "array(xs)",
            "object(xs)",
            "simple(y,1)",
            "object(xs)",
            "simple(y,2)",
        ]
    );
}

#[test]
fn rejects_trailing_comma_in_object() {
    let err = parse(r#"{"a":1,"b":2,}"#).unwrap_err();
    assert!(matches!(
        err,
        Error::Syntax(SyntaxError::TrailingComma {
            stop: Token::RBrace
        })
    ));
}

#[test]
fn rejects_trailing_comma_in_array() {
    let err = parse(r#"{"a":[1,]}"#).unwrap_err();
    assert!(matches!(
        err,
        Error::Syntax(SyntaxError::TrailingComma {
            stop: Token::RBracket
        })
    ));
}

#[test]
fn rejects_missing_comma() {
    let err = parse(r#"{"a":1 "b":2}"#).unwrap_err();
    assert!(matches!(err, Error::Syntax(SyntaxError::MissingComma { .. })));
}

#[test]
fn rejects_missing_colon() {
    let err = parse(r#"{"a" 1}"#).unwrap_err();
    assert!(matches!(
        err,
        Error::Syntax(SyntaxError::UnexpectedToken { expected: "':'", .. })
    ));
}

#[test]
fn rejects_non_string_property_name() {
    let err = parse("{1:2}").unwrap_err();
    assert!(matches!(
        err,
        Error::Syntax(SyntaxError::UnexpectedToken {
            expected: "a property name",
            ..
        })
    ));
}

#[test]
fn rejects_missing_property_value() {
    let err = parse(r#"{"a":}"#).unwrap_err();
    assert!(matches!(
        err,
        Error::Syntax(SyntaxError::UnexpectedToken {
            expected: "a value",
            ..
        })
    ));
}

#[test]
fn rejects_non_object_root() {
    let err = parse("[1]").unwrap_err();
    assert!(matches!(
        err,
        Error::Syntax(SyntaxError::UnexpectedToken { expected: "'{'", .. })
    ));
}

#[test]
fn rejects_trailing_content() {
    let err = parse(r#"{"a":1} 2"#).unwrap_err();
    assert!(matches!(
        err,
        Error::Syntax(SyntaxError::TrailingContent {
            found: Token::Long(2)
        })
    ));

    let err = parse(r#"{"a":1}{}"#).unwrap_err();
    assert!(matches!(
        err,
        Error::Syntax(SyntaxError::TrailingContent {
            found: Token::LBrace
        })
    ));
}

#[test]
fn rejects_truncated_document() {
    let err = parse(r#"{"a":1"#).unwrap_err();
    assert!(matches!(
        err,
        Error::Syntax(SyntaxError::UnexpectedEndOfInput)
    ));
}

#[test]
fn propagates_lex_errors() {
    let err = parse(r#"{"a":tru}"#).unwrap_err();
    assert!(matches!(
        err,
        Error::Lex(LexError::MalformedLiteral { expected: "true", .. })
    ));
}
