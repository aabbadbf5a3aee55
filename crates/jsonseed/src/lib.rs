//! A minimal reflection-driven JSON codec.
//!
//! Three layers make up the decode pipeline: a character-level [`Lexer`]
//! over a pull [`CharReader`], a recursive-descent [`Parser`] that drives a
//! push-style [`JsonSink`], and seed-based object building directed by
//! cached per-type metadata ([`ClassInfoCache`]). Serialization runs the
//! inverse direction as a plain reflective field walk — JSON text is
//! written directly, with no token stream on the encode side.
//!
//! Rust has no runtime reflection, so target types register an explicit
//! [`TypeDescriptor`] through the [`Reflect`] trait: ordered constructor
//! parameters with per-field policies (exclusion, renaming, custom codecs,
//! deserialize-as targets), one accessor per field, and a constructor
//! function.
//!
//! # Examples
//!
//! ```
//! use std::any::{Any, TypeId};
//!
//! use jsonseed::{
//!     Arguments, Error, FieldDescriptor, FieldValue, Reflect, TypeDescriptor, TypeTag,
//!     deserialize, downcast_instance, serialize,
//! };
//!
//! #[derive(Debug, PartialEq)]
//! struct Point {
//!     x: i64,
//!     y: i64,
//! }
//!
//! impl Reflect for Point {
//!     fn descriptor() -> TypeDescriptor {
//!         fn x(value: &dyn Any) -> Result<FieldValue<'_>, Error> {
//!             Ok(FieldValue::Long(downcast_instance::<Point>(value)?.x))
//!         }
//!         fn y(value: &dyn Any) -> Result<FieldValue<'_>, Error> {
//!             Ok(FieldValue::Long(downcast_instance::<Point>(value)?.y))
//!         }
//!         fn construct(mut args: Arguments) -> Result<Box<dyn Any>, Error> {
//!             Ok(Box::new(Point {
//!                 x: args.take("x")?,
//!                 y: args.take("y")?,
//!             }))
//!         }
//!         TypeDescriptor {
//!             type_name: "Point",
//!             type_id: TypeId::of::<Point>(),
//!             fields: vec![
//!                 FieldDescriptor::new("x", TypeTag::Long, x),
//!                 FieldDescriptor::new("y", TypeTag::Long, y),
//!             ],
//!             construct: Some(construct),
//!         }
//!     }
//! }
//!
//! let json = serialize(&Point { x: 1, y: 2 })?;
//! assert_eq!(json, r#"{"x":1,"y":2}"#);
//!
//! let point: Point = deserialize(&json)?;
//! assert_eq!(point, Point { x: 1, y: 2 });
//! # Ok::<(), jsonseed::Error>(())
//! ```

#![allow(missing_docs)]

mod class_info;
mod descriptor;
mod error;
mod lexer;
mod parser;
mod reader;
mod seed;
mod serializer;
mod value;

#[cfg(test)]
mod tests;

pub use class_info::{ClassInfo, ClassInfoCache};
pub use descriptor::{
    AnyReflect, Arguments, ConstructFn, FieldAccessor, FieldDescriptor, FieldPolicy, FieldValue,
    Reflect, TypeDescriptor, TypeRef, TypeTag, ValueCodec, downcast_instance,
};
pub use error::{Error, LexError, SchemaError, ShapeError, SyntaxError, ValueError};
pub use lexer::{Lexer, Token};
pub use parser::{JsonSink, Parser};
pub use reader::CharReader;
pub use seed::{ObjectListSeed, ObjectSeed, Seed, ValueListSeed, deserialize, deserialize_with};
pub use serializer::serialize;
pub use value::JsonValue;
