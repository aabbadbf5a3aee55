//! The recursive-descent JSON parser.
//!
//! The parser consumes the lexer's token sequence and drives an externally
//! supplied [`JsonSink`] with property events. It never inspects target
//! types: everything type-directed lives behind the sink it drives.
//!
//! Productions: Value, Object, Array, and a comma-separated list shared by
//! the Object and Array productions. The root value must be an object, and
//! any token after its closing brace is fatal.

use tracing::trace;

use crate::{
    error::{Error, SyntaxError},
    lexer::{Lexer, Token},
    value::JsonValue,
};

/// Receiver of parser events.
///
/// `create_object` and `create_array` return the sink that receives the
/// events of the nested composite value; the parser recurses into it and
/// resumes on the parent when the composite closes. Array elements are
/// reported under the enclosing property's name.
pub trait JsonSink {
    /// Records a scalar property.
    ///
    /// # Errors
    ///
    /// Implementations reject values their target shape cannot accept.
    fn set_simple_property(&mut self, name: &str, value: JsonValue) -> Result<(), Error>;

    /// Opens a nested object under `name`, returning its sink.
    ///
    /// # Errors
    ///
    /// Implementations reject objects where their shape requires otherwise.
    fn create_object(&mut self, name: &str) -> Result<&mut dyn JsonSink, Error>;

    /// Opens a nested array under `name`, returning its sink.
    ///
    /// # Errors
    ///
    /// Implementations reject arrays where their shape requires otherwise.
    fn create_array(&mut self, name: &str) -> Result<&mut dyn JsonSink, Error>;
}

/// The recursive-descent parser over a character stream.
pub struct Parser<I: Iterator<Item = char>> {
    lexer: Lexer<I>,
}

impl<I: Iterator<Item = char>> Parser<I> {
    /// Creates a parser over a character stream.
    pub fn new(input: I) -> Self {
        Self {
            lexer: Lexer::new(input),
        }
    }

    /// Parses one JSON object document into `sink`.
    ///
    /// # Errors
    ///
    /// Lexical, structural, and sink errors, all fatal at first detection.
    pub fn parse(&mut self, sink: &mut dyn JsonSink) -> Result<(), Error> {
        trace!("parsing document");
        self.expect(Token::LBrace)?;
        self.parse_object(sink)?;
        if let Some(found) = self.lexer.next_token()? {
            return Err(SyntaxError::TrailingContent { found }.into());
        }
        Ok(())
    }

    fn parse_object(&mut self, sink: &mut dyn JsonSink) -> Result<(), Error> {
        self.parse_comma_separated(&Token::RBrace, |parser, token| {
            let name = match token {
                Token::String(name) => name,
                found => {
                    return Err(SyntaxError::UnexpectedToken {
                        expected: "a property name",
                        found,
                    }
                    .into());
                }
            };
            parser.expect(Token::Colon)?;
            let value = parser.require_token()?;
            parser.parse_property_value(sink, &name, value)
        })
    }

    fn parse_array(&mut self, sink: &mut dyn JsonSink, name: &str) -> Result<(), Error> {
        self.parse_comma_separated(&Token::RBracket, |parser, token| {
            parser.parse_property_value(sink, name, token)
        })
    }

    /// Routes one value to the sink: scalars directly, composites through
    /// the sink's child factories.
    fn parse_property_value(
        &mut self,
        sink: &mut dyn JsonSink,
        name: &str,
        token: Token,
    ) -> Result<(), Error> {
        match token {
            Token::LBrace => {
                let child = sink.create_object(name)?;
                self.parse_object(child)
            }
            Token::LBracket => {
                let child = sink.create_array(name)?;
                self.parse_array(child, name)
            }
            Token::Null => sink.set_simple_property(name, JsonValue::Null),
            Token::Boolean(v) => sink.set_simple_property(name, JsonValue::Boolean(v)),
            Token::String(v) => sink.set_simple_property(name, JsonValue::String(v)),
            Token::Long(v) => sink.set_simple_property(name, JsonValue::Long(v)),
            Token::Double(v) => sink.set_simple_property(name, JsonValue::Double(v)),
            found @ (Token::Comma | Token::Colon | Token::RBrace | Token::RBracket) => {
                Err(SyntaxError::UnexpectedToken {
                    expected: "a value",
                    found,
                }
                .into())
            }
        }
    }

    /// Comma discipline shared by the Object and Array productions: no
    /// comma before the first element, exactly one between elements, and
    /// the stop token may not follow a comma.
    fn parse_comma_separated(
        &mut self,
        stop: &Token,
        mut body: impl FnMut(&mut Self, Token) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let mut expect_comma = false;
        loop {
            let mut token = self.require_token()?;
            if token == *stop {
                break;
            }
            if expect_comma {
                if token != Token::Comma {
                    return Err(SyntaxError::MissingComma { found: token }.into());
                }
                token = self.require_token()?;
                if token == *stop {
                    return Err(SyntaxError::TrailingComma { stop: stop.clone() }.into());
                }
            }
            body(self, token)?;
            expect_comma = true;
        }
        Ok(())
    }

    fn expect(&mut self, expected: Token) -> Result<(), Error> {
        let found = self.require_token()?;
        if found != expected {
            return Err(SyntaxError::UnexpectedToken {
                expected: expected.describe(),
                found,
            }
            .into());
        }
        Ok(())
    }

    fn require_token(&mut self) -> Result<Token, Error> {
        self.lexer
            .next_token()?
            .ok_or(Error::Syntax(SyntaxError::UnexpectedEndOfInput))
    }
}
