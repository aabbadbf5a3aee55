//! Seeds: type-aware accumulators behind the sink interface.
//!
//! A seed buffers the contents of one JSON composite value (object or
//! array) against a known target shape. The parser feeds it through
//! [`JsonSink`]; when the document closes, [`Seed::materialize`] consumes
//! the seed tree depth-first, post-order, instantiating the object graph
//! bottom-up.

use std::{any::Any, sync::Arc};

use tracing::trace;

use crate::{
    class_info::{ClassInfo, ClassInfoCache},
    descriptor::{Reflect, Slot, TypeRef, TypeTag},
    error::{Error, ShapeError, ValueError},
    parser::{JsonSink, Parser},
    value::JsonValue,
};

/// Deserializes a JSON object document into `T` using the process-wide
/// shared cache.
///
/// # Errors
///
/// Any [`Error`] raised by lexing, parsing, coercion, or instantiation.
pub fn deserialize<T: Reflect>(json: &str) -> Result<T, Error> {
    deserialize_with(json, &ClassInfoCache::shared())
}

/// Deserializes a JSON object document into `T` using a caller-owned
/// cache.
///
/// # Errors
///
/// Any [`Error`] raised by lexing, parsing, coercion, or instantiation.
pub fn deserialize_with<T: Reflect>(json: &str, cache: &Arc<ClassInfoCache>) -> Result<T, Error> {
    trace!(type_name = std::any::type_name::<T>(), "deserializing document");
    let mut seed = Seed::object(TypeRef::of::<T>(), Arc::clone(cache))?;
    let mut parser = Parser::new(json.chars());
    parser.parse(&mut seed)?;
    match seed.materialize()?.downcast::<T>() {
        Ok(value) => Ok(*value),
        Err(_) => Err(ValueError::TypeMismatch {
            parameter: "<root>".to_string(),
            expected: std::any::type_name::<T>().to_string(),
            found: "a value of a different type".to_string(),
        }
        .into()),
    }
}

/// A write-once-per-field accumulator for one composite value being built
/// against a known target shape.
pub enum Seed {
    /// Builds one object of a known target type.
    Object(ObjectSeed),
    /// Builds a list whose elements are objects or nested lists.
    ObjectList(ObjectListSeed),
    /// Builds a list of primitive-or-string elements.
    ValueList(ValueListSeed),
}

impl Seed {
    /// Creates the root seed for one object of type `target`.
    ///
    /// # Errors
    ///
    /// [`crate::SchemaError`] variants if the target's descriptor fails to
    /// compile.
    pub fn object(target: TypeRef, cache: Arc<ClassInfoCache>) -> Result<Self, Error> {
        Ok(Seed::Object(ObjectSeed::new(target, cache)?))
    }

    /// Creates the seed matching `tag` in object or array context.
    ///
    /// The shape rule: a list-tagged target requires array context and a
    /// primitive-or-string element tag selects a value-list seed; an
    /// object-tagged target requires object context; a primitive tag can
    /// never open a composite.
    fn for_tag(
        tag: TypeTag,
        in_array: bool,
        property: &str,
        cache: &Arc<ClassInfoCache>,
    ) -> Result<Self, Error> {
        match tag {
            TypeTag::List(element) => {
                if !in_array {
                    return Err(ShapeError::ExpectedArray {
                        property: property.to_string(),
                    }
                    .into());
                }
                Ok(match *element {
                    TypeTag::Boolean => Seed::ValueList(ValueListSeed::new(ListBuffer::Boolean(Vec::new()))),
                    TypeTag::Long => Seed::ValueList(ValueListSeed::new(ListBuffer::Long(Vec::new()))),
                    TypeTag::Double => Seed::ValueList(ValueListSeed::new(ListBuffer::Double(Vec::new()))),
                    TypeTag::String => Seed::ValueList(ValueListSeed::new(ListBuffer::String(Vec::new()))),
                    element => {
                        Seed::ObjectList(ObjectListSeed::new(element, Arc::clone(cache)))
                    }
                })
            }
            TypeTag::Object(target) => {
                if in_array {
                    return Err(ShapeError::ExpectedObject {
                        property: property.to_string(),
                        type_name: target.type_name(),
                    }
                    .into());
                }
                Ok(Seed::Object(ObjectSeed::new(target, Arc::clone(cache))?))
            }
            tag => {
                let found = if in_array { "array" } else { "object" };
                Err(ValueError::TypeMismatch {
                    parameter: property.to_string(),
                    expected: tag.type_name().to_string(),
                    found: found.to_string(),
                }
                .into())
            }
        }
    }

    /// Consumes the seed tree and builds the final value, materializing
    /// children first.
    ///
    /// # Errors
    ///
    /// [`ValueError`] variants raised by validation or construction.
    pub fn materialize(self) -> Result<Box<dyn Any>, Error> {
        match self {
            Seed::Object(seed) => seed.materialize(),
            Seed::ObjectList(seed) => seed.materialize(),
            Seed::ValueList(seed) => seed.materialize(),
        }
    }
}

impl JsonSink for Seed {
    fn set_simple_property(&mut self, name: &str, value: JsonValue) -> Result<(), Error> {
        match self {
            Seed::Object(seed) => seed.set_simple_property(name, value),
            Seed::ObjectList(_) => Err(ShapeError::PrimitiveElement {
                property: name.to_string(),
            }
            .into()),
            Seed::ValueList(seed) => seed.push_value(name, value),
        }
    }

    fn create_object(&mut self, name: &str) -> Result<&mut dyn JsonSink, Error> {
        match self {
            Seed::Object(seed) => seed.create_composite(name, false),
            Seed::ObjectList(seed) => seed.create_element(name, false),
            Seed::ValueList(_) => Err(ShapeError::CompositeElement {
                property: name.to_string(),
            }
            .into()),
        }
    }

    fn create_array(&mut self, name: &str) -> Result<&mut dyn JsonSink, Error> {
        match self {
            Seed::Object(seed) => seed.create_composite(name, true),
            Seed::ObjectList(seed) => seed.create_element(name, true),
            Seed::ValueList(_) => Err(ShapeError::CompositeElement {
                property: name.to_string(),
            }
            .into()),
        }
    }
}

/// Accumulates constructor arguments for one object.
pub struct ObjectSeed {
    class_info: Arc<ClassInfo>,
    cache: Arc<ClassInfoCache>,
    slots: Vec<Slot>,
    children: Vec<(usize, Seed)>,
}

impl ObjectSeed {
    fn new(target: TypeRef, cache: Arc<ClassInfoCache>) -> Result<Self, Error> {
        let class_info = cache.get(target)?;
        let slots = (0..class_info.field_count()).map(|_| Slot::Missing).collect();
        Ok(Self {
            class_info,
            cache,
            slots,
            children: Vec::new(),
        })
    }

    fn set_simple_property(&mut self, name: &str, value: JsonValue) -> Result<(), Error> {
        let (ix, field) = self.class_info.parameter(name)?;
        let slot = self.class_info.coerce(field, value)?;
        self.slots[ix] = slot;
        Ok(())
    }

    /// Resolves the effective target for a composite property and records
    /// the child seed the parser will fill next.
    fn create_composite(&mut self, name: &str, in_array: bool) -> Result<&mut dyn JsonSink, Error> {
        let (ix, field) = self.class_info.parameter(name)?;
        let tag = match self.class_info.deserialize_target(name) {
            Some(target) => TypeTag::Object(target),
            None => field.tag.clone(),
        };
        let child = Seed::for_tag(tag, in_array, name, &self.cache)?;
        let child_ix = self.children.len();
        self.children.push((ix, child));
        Ok(&mut self.children[child_ix].1 as &mut dyn JsonSink)
    }

    fn materialize(self) -> Result<Box<dyn Any>, Error> {
        let Self {
            class_info,
            cache: _,
            mut slots,
            children,
        } = self;
        for (ix, child) in children {
            slots[ix] = Slot::Value(child.materialize()?);
        }
        class_info.instantiate(slots)
    }
}

/// Accumulates the elements of a list of objects or nested lists.
pub struct ObjectListSeed {
    element: TypeTag,
    cache: Arc<ClassInfoCache>,
    children: Vec<Seed>,
}

impl ObjectListSeed {
    fn new(element: TypeTag, cache: Arc<ClassInfoCache>) -> Self {
        Self {
            element,
            cache,
            children: Vec::new(),
        }
    }

    fn create_element(&mut self, property: &str, in_array: bool) -> Result<&mut dyn JsonSink, Error> {
        let child = Seed::for_tag(self.element.clone(), in_array, property, &self.cache)?;
        let child_ix = self.children.len();
        self.children.push(child);
        Ok(&mut self.children[child_ix] as &mut dyn JsonSink)
    }

    /// Materializes every element in order; the caller recovers the typed
    /// vector through [`crate::Arguments::take_seq`].
    fn materialize(self) -> Result<Box<dyn Any>, Error> {
        let elements = self
            .children
            .into_iter()
            .map(Seed::materialize)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Box::new(elements))
    }
}

/// Element storage for a value list, chosen from the declared element tag.
enum ListBuffer {
    Boolean(Vec<bool>),
    Long(Vec<i64>),
    Double(Vec<f64>),
    String(Vec<String>),
}

impl ListBuffer {
    fn type_name(&self) -> &'static str {
        match self {
            ListBuffer::Boolean(_) => "boolean",
            ListBuffer::Long(_) => "integer",
            ListBuffer::Double(_) => "double",
            ListBuffer::String(_) => "string",
        }
    }
}

/// Accumulates the coerced elements of a list of primitives or strings.
pub struct ValueListSeed {
    elements: ListBuffer,
}

impl ValueListSeed {
    fn new(elements: ListBuffer) -> Self {
        Self { elements }
    }

    fn push_value(&mut self, property: &str, value: JsonValue) -> Result<(), Error> {
        let expected = self.elements.type_name();
        match (&mut self.elements, value) {
            (ListBuffer::Boolean(items), JsonValue::Boolean(v)) => items.push(v),
            (ListBuffer::Long(items), JsonValue::Long(v)) => items.push(v),
            (ListBuffer::Double(items), JsonValue::Double(v)) => items.push(v),
            (ListBuffer::String(items), JsonValue::String(v)) => items.push(v),
            (_, JsonValue::Null) => {
                return Err(ValueError::NullForNonNullable {
                    parameter: property.to_string(),
                }
                .into());
            }
            (_, value) => {
                return Err(ValueError::TypeMismatch {
                    parameter: property.to_string(),
                    expected: expected.to_string(),
                    found: value.type_name().to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Materializes the typed element vector.
    fn materialize(self) -> Result<Box<dyn Any>, Error> {
        let value: Box<dyn Any> = match self.elements {
            ListBuffer::Boolean(items) => Box::new(items),
            ListBuffer::Long(items) => Box::new(items),
            ListBuffer::Double(items) => Box::new(items),
            ListBuffer::String(items) => Box::new(items),
        };
        Ok(value)
    }
}
