//! Error taxonomy for the lex/parse/build pipeline.
//!
//! Every error is fatal: the first failure aborts the single pass and
//! propagates uncaught through the parser and seed call frames. There is no
//! local recovery and no default-value substitution. Each error names the
//! offending character, token, property, or type where feasible; lexical
//! errors additionally carry the 1-based line and column.

use thiserror::Error;

use crate::lexer::Token;

/// Umbrella error returned by every fallible operation in this crate.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// Character-level failure while producing tokens.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// Wrong token where a specific token was expected.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// JSON composite kind disagrees with the target field's declared kind.
    #[error(transparent)]
    Shape(#[from] ShapeError),
    /// A type descriptor is unusable for deserialization.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// A raw value cannot be coerced or an instantiation is incomplete.
    #[error(transparent)]
    Value(#[from] ValueError),
}

/// Errors raised while turning characters into tokens.
#[derive(Debug, Error, PartialEq)]
pub enum LexError {
    /// A character that cannot begin any token.
    #[error("unexpected character '{found}' at {line}:{column}")]
    UnexpectedCharacter {
        /// The offending character.
        found: char,
        /// 1-based line.
        line: usize,
        /// 1-based column.
        column: usize,
    },
    /// The reader was exhausted before the closing quote of a string.
    #[error("unterminated string literal at {line}:{column}")]
    UnterminatedString {
        /// 1-based line of the string's first content character.
        line: usize,
        /// 1-based column of the string's first content character.
        column: usize,
    },
    /// A backslash escape outside the recognized set.
    #[error("unsupported escape sequence '\\{escape}' at {line}:{column}")]
    UnsupportedEscape {
        /// The character following the backslash.
        escape: char,
        /// 1-based line.
        line: usize,
        /// 1-based column.
        column: usize,
    },
    /// A `\u` escape whose four digits are not hex or name no scalar value.
    #[error("invalid unicode escape '\\u{digits}' at {line}:{column}")]
    InvalidUnicodeEscape {
        /// The four characters following `\u`.
        digits: String,
        /// 1-based line.
        line: usize,
        /// 1-based column.
        column: usize,
    },
    /// A `true`/`false`/`null` keyword that does not complete, or is not
    /// followed by a terminator character.
    #[error("malformed literal, expected '{expected}' at {line}:{column}")]
    MalformedLiteral {
        /// The keyword that was being matched.
        expected: &'static str,
        /// 1-based line.
        line: usize,
        /// 1-based column.
        column: usize,
    },
    /// Accumulated number text that parses as neither integer nor double.
    #[error("malformed number '{text}' at {line}:{column}")]
    MalformedNumber {
        /// The accumulated number text.
        text: String,
        /// 1-based line.
        line: usize,
        /// 1-based column.
        column: usize,
    },
    /// The reader ran out mid-token.
    #[error("unexpected end of input at {line}:{column}")]
    UnexpectedEndOfInput {
        /// 1-based line.
        line: usize,
        /// 1-based column.
        column: usize,
    },
}

/// Structural errors raised by the recursive-descent parser.
#[derive(Debug, Error, PartialEq)]
pub enum SyntaxError {
    /// A token other than the one the grammar requires here.
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        /// Description of the expectation.
        expected: &'static str,
        /// The token actually read.
        found: Token,
    },
    /// Two list elements without a separating comma.
    #[error("expected ',' before {found}")]
    MissingComma {
        /// The token found where the comma was due.
        found: Token,
    },
    /// A comma immediately followed by the list's stop token.
    #[error("trailing comma before {stop}")]
    TrailingComma {
        /// The stop token that followed the comma.
        stop: Token,
    },
    /// Non-whitespace input after the root value closed.
    #[error("trailing content after the root value: {found}")]
    TrailingContent {
        /// The first trailing token.
        found: Token,
    },
    /// The token stream ended inside a production.
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
}

/// Disagreements between the JSON composite kind and the declared shape.
#[derive(Debug, Error, PartialEq)]
pub enum ShapeError {
    /// A JSON object arrived for a list-typed field.
    #[error("an array was expected for property '{property}', not an object")]
    ExpectedArray {
        /// The property being deserialized.
        property: String,
    },
    /// A JSON array arrived for an object-typed field.
    #[error("an object of type {type_name} was expected for property '{property}', not an array")]
    ExpectedObject {
        /// The property being deserialized.
        property: String,
        /// The declared target type.
        type_name: &'static str,
    },
    /// A simple value appeared inside a list of objects.
    #[error("property '{property}': a simple value cannot appear in a list of objects")]
    PrimitiveElement {
        /// The enclosing property name.
        property: String,
    },
    /// A composite value appeared inside a list of simple values.
    #[error("property '{property}': an object or array cannot appear in a list of simple values")]
    CompositeElement {
        /// The enclosing property name.
        property: String,
    },
}

/// Fatal configuration errors detected while compiling a type descriptor.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    /// The descriptor registers no constructor function.
    #[error("type {type_name} does not define a constructor")]
    MissingConstructor {
        /// The descriptor's type.
        type_name: &'static str,
    },
    /// A constructor parameter with an empty name.
    #[error("type {type_name} has a constructor parameter without a name")]
    UnnamedParameter {
        /// The descriptor's type.
        type_name: &'static str,
    },
    /// Two constructor parameters map to the same JSON key.
    #[error("type {type_name} maps two parameters to JSON name '{json_name}'")]
    DuplicateJsonName {
        /// The descriptor's type.
        type_name: &'static str,
        /// The contested JSON key.
        json_name: String,
    },
    /// An excluded parameter that instantiation could never satisfy.
    #[error("excluded parameter '{parameter}' of type {type_name} must be optional or nullable")]
    ExcludedNotDefaulted {
        /// The descriptor's type.
        type_name: &'static str,
        /// The excluded parameter.
        parameter: &'static str,
    },
    /// A descriptor's accessor or constructor met a value of another type.
    #[error("descriptor for {type_name} applied to a value of a different type")]
    DescriptorMismatch {
        /// The type the descriptor describes.
        type_name: &'static str,
    },
}

/// Coercion and instantiation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ValueError {
    /// A JSON key with no matching constructor parameter.
    #[error("unknown property '{property}' for type {type_name}")]
    UnknownProperty {
        /// The unmatched JSON key.
        property: String,
        /// The target type.
        type_name: &'static str,
    },
    /// JSON `null` for a parameter that does not accept it.
    #[error("received null for non-nullable parameter '{parameter}'")]
    NullForNonNullable {
        /// The parameter that rejected the null.
        parameter: String,
    },
    /// A raw value whose type disagrees with the parameter's declared type.
    #[error("type mismatch for parameter '{parameter}': expected {expected}, found {found}")]
    TypeMismatch {
        /// The parameter being coerced.
        parameter: String,
        /// The declared type.
        expected: String,
        /// The type actually supplied.
        found: String,
    },
    /// A required, non-optional, non-nullable parameter left unset.
    #[error("missing value for parameter '{parameter}' of type {type_name}")]
    MissingParameter {
        /// The unset parameter.
        parameter: &'static str,
        /// The target type.
        type_name: &'static str,
    },
    /// A custom codec rejected a value.
    #[error("codec failure: {0}")]
    Codec(String),
}
