//! Type descriptors: the reflection capability behind the object mapper.
//!
//! Rust has no runtime reflection, so "given a type, obtain its
//! constructor's ordered parameter list" is an explicit data structure. A
//! [`Reflect`] implementation hands the library a [`TypeDescriptor`]: the
//! ordered constructor parameters with their wire policies, one accessor
//! per field for the serializer, and a constructor function for the
//! deserializer. Descriptors here are registered by hand; a derive macro
//! could produce the same tables, and the core is agnostic to which.

use std::{
    any::{self, Any, TypeId},
    fmt, mem,
    sync::Arc,
};

use crate::{
    error::{Error, SchemaError, ValueError},
    value::JsonValue,
};

/// Reference to a reflectable type: its id, diagnostic name, and
/// descriptor source.
#[derive(Debug, Clone, Copy)]
pub struct TypeRef {
    type_id: TypeId,
    type_name: &'static str,
    describe: fn() -> TypeDescriptor,
}

impl TypeRef {
    /// Creates the reference for `T`.
    #[must_use]
    pub fn of<T: Reflect>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: any::type_name::<T>(),
            describe: T::descriptor,
        }
    }

    pub(crate) fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Diagnostic name of the referenced type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Evaluates the referenced type's descriptor.
    #[must_use]
    pub fn descriptor(&self) -> TypeDescriptor {
        (self.describe)()
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeRef {}

/// Classification of a constructor parameter's declared type.
///
/// Resolved once per field at registration time; the seeds dispatch on the
/// tag instead of inspecting runtime type information.
#[derive(Debug, Clone)]
pub enum TypeTag {
    /// `bool`.
    Boolean,
    /// `i64`.
    Long,
    /// `f64`.
    Double,
    /// `String`.
    String,
    /// A nested reflectable object. For a trait-object field the payload
    /// names the default concrete target; the field's
    /// [`FieldPolicy::deserialize_as`] overrides it.
    Object(TypeRef),
    /// A list; the payload classifies the element type.
    List(Box<TypeTag>),
}

impl TypeTag {
    /// True for tags whose values travel through `set_simple_property`.
    #[must_use]
    pub fn is_primitive_or_string(&self) -> bool {
        !matches!(self, TypeTag::Object(_) | TypeTag::List(_))
    }

    /// Diagnostic name, aligned with [`JsonValue::type_name`].
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            TypeTag::Boolean => "boolean",
            TypeTag::Long => "integer",
            TypeTag::Double => "double",
            TypeTag::String => "string",
            TypeTag::Object(target) => target.type_name(),
            TypeTag::List(_) => "list",
        }
    }
}

/// Per-field conversion between a domain value and its JSON scalar form.
///
/// A codec replaces the default pass-through-with-type-check behavior for
/// the field it is attached to, on both directions of the pipeline.
pub trait ValueCodec: Send + Sync {
    /// Converts the field's domain value, as produced by its accessor (see
    /// [`FieldValue::Opaque`]), into a JSON scalar.
    ///
    /// # Errors
    ///
    /// [`ValueError::Codec`] when the value cannot be represented.
    fn to_json_value(&self, value: &dyn Any) -> Result<JsonValue, Error>;

    /// Converts a raw JSON scalar into the field's domain value.
    ///
    /// # Errors
    ///
    /// [`ValueError::Codec`] when the scalar cannot be interpreted.
    fn from_json_value(&self, value: JsonValue) -> Result<Box<dyn Any>, Error>;
}

/// Per-field wire policy supplied by the registering code.
#[derive(Clone, Default)]
pub struct FieldPolicy {
    /// Skip the field when serializing; its key is unknown on the wire
    /// when deserializing. Excluded parameters must be optional or
    /// nullable so instantiation can complete without them.
    pub excluded: bool,
    /// JSON object key override; the field name applies when `None`.
    pub json_name: Option<String>,
    /// Custom scalar conversion for this field.
    pub codec: Option<Arc<dyn ValueCodec>>,
    /// Concrete type to build when the declared field type cannot be
    /// instantiated directly, e.g. a boxed trait object.
    pub deserialize_as: Option<TypeRef>,
}

impl fmt::Debug for FieldPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldPolicy")
            .field("excluded", &self.excluded)
            .field("json_name", &self.json_name)
            .field("codec", &self.codec.is_some())
            .field("deserialize_as", &self.deserialize_as)
            .finish()
    }
}

/// Borrowed view of one field's value, produced by a field accessor for
/// the serializer.
pub enum FieldValue<'a> {
    /// JSON `null` (a `None` in the domain).
    Null,
    /// A boolean field.
    Boolean(bool),
    /// An integer field.
    Long(i64),
    /// A double field.
    Double(f64),
    /// A string field.
    Str(&'a str),
    /// The elements of a list field, in order.
    List(Vec<FieldValue<'a>>),
    /// A nested reflectable object.
    Object(&'a dyn AnyReflect),
    /// A value only the field's codec knows how to render.
    Opaque(&'a dyn Any),
}

/// Field accessor: borrows one field out of an instance of the
/// descriptor's type.
pub type FieldAccessor = for<'a> fn(&'a dyn Any) -> Result<FieldValue<'a>, Error>;

/// Constructor function: consumes the accumulated arguments and returns
/// the built instance, boxed.
pub type ConstructFn = fn(Arguments) -> Result<Box<dyn Any>, Error>;

/// Borrows a descriptor-matched instance back as its concrete type.
///
/// # Errors
///
/// [`SchemaError::DescriptorMismatch`] when `value` is not a `T`: the
/// descriptor was applied to a value it does not describe.
pub fn downcast_instance<T: Any>(value: &dyn Any) -> Result<&T, Error> {
    value.downcast_ref::<T>().ok_or_else(|| {
        SchemaError::DescriptorMismatch {
            type_name: any::type_name::<T>(),
        }
        .into()
    })
}

/// One constructor parameter of a reflectable type, with its declared
/// field metadata and policy.
pub struct FieldDescriptor {
    /// Constructor parameter (and field) name.
    pub name: &'static str,
    /// Declared type classification.
    pub tag: TypeTag,
    /// Whether the field accepts JSON `null` (an `Option` in the domain).
    pub nullable: bool,
    /// Whether the constructor supplies a default when the key is absent.
    pub optional: bool,
    /// Wire policy: exclusion, renaming, codec, deserialize-as.
    pub policy: FieldPolicy,
    /// Accessor used by the serializer.
    pub get: FieldAccessor,
}

impl FieldDescriptor {
    /// Creates a required, non-nullable field with the default policy.
    #[must_use]
    pub fn new(name: &'static str, tag: TypeTag, get: FieldAccessor) -> Self {
        Self {
            name,
            tag,
            nullable: false,
            optional: false,
            policy: FieldPolicy::default(),
            get,
        }
    }

    /// The key this field uses on the wire.
    #[must_use]
    pub fn json_name(&self) -> &str {
        self.policy.json_name.as_deref().unwrap_or(self.name)
    }
}

/// Everything the library knows about one reflectable type.
pub struct TypeDescriptor {
    /// Display name used in diagnostics.
    pub type_name: &'static str,
    /// `TypeId` of the described type.
    pub type_id: TypeId,
    /// Ordered constructor parameters.
    pub fields: Vec<FieldDescriptor>,
    /// Builds an instance from accumulated arguments. `None` marks a
    /// serialize-only registration.
    pub construct: Option<ConstructFn>,
}

/// A type the library can (de)serialize through its descriptor.
pub trait Reflect: Any + Sized {
    /// Produces the type's descriptor.
    ///
    /// For deserialization the result is compiled into a cached
    /// [`crate::ClassInfo`] at most once per cache; the serializer
    /// evaluates it per walk.
    fn descriptor() -> TypeDescriptor;
}

/// Object-safe access to a value's descriptor.
///
/// Lets trait-object fields participate in serialization: a domain trait
/// with `AnyReflect` as a supertrait exposes each concrete
/// implementation's descriptor without the caller naming the concrete
/// type.
pub trait AnyReflect: Any {
    /// Descriptor of the concrete type of `self`.
    fn reflect_descriptor(&self) -> TypeDescriptor;

    /// `self` as `Any`, for field access.
    fn as_any(&self) -> &dyn Any;

    /// `self` as `AnyReflect`; bridges `&dyn DomainTrait` to this trait.
    fn as_reflect(&self) -> &dyn AnyReflect;
}

impl<T: Reflect> AnyReflect for T {
    fn reflect_descriptor(&self) -> TypeDescriptor {
        T::descriptor()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_reflect(&self) -> &dyn AnyReflect {
        self
    }
}

/// One accumulated constructor argument.
pub(crate) enum Slot {
    /// No value arrived for the parameter.
    Missing,
    /// JSON `null` arrived and the parameter is nullable.
    Null,
    /// A coerced or materialized value.
    Value(Box<dyn Any>),
}

/// The accumulated constructor arguments for one object, consumed by a
/// descriptor's constructor function.
///
/// Arguments are taken out by parameter name, each at most once; taking an
/// argument again behaves as if it were missing.
pub struct Arguments {
    type_name: &'static str,
    names: Vec<&'static str>,
    slots: Vec<Slot>,
}

impl Arguments {
    pub(crate) fn new(
        type_name: &'static str,
        names: Vec<&'static str>,
        slots: Vec<Slot>,
    ) -> Self {
        Self {
            type_name,
            names,
            slots,
        }
    }

    fn slot(&mut self, name: &str) -> Result<(&'static str, &mut Slot), Error> {
        match self.names.iter().position(|n| *n == name) {
            Some(ix) => Ok((self.names[ix], &mut self.slots[ix])),
            None => Err(ValueError::UnknownProperty {
                property: name.to_string(),
                type_name: self.type_name,
            }
            .into()),
        }
    }

    /// Takes a required, non-nullable argument.
    ///
    /// # Errors
    ///
    /// [`ValueError::MissingParameter`] when unset,
    /// [`ValueError::NullForNonNullable`] on an explicit null,
    /// [`ValueError::TypeMismatch`] when the value is not a `T`.
    pub fn take<T: Any>(&mut self, name: &str) -> Result<T, Error> {
        let type_name = self.type_name;
        let (parameter, slot) = self.slot(name)?;
        match mem::replace(slot, Slot::Missing) {
            Slot::Value(value) => downcast_argument::<T>(parameter, value),
            Slot::Null => Err(ValueError::NullForNonNullable {
                parameter: parameter.to_string(),
            }
            .into()),
            Slot::Missing => Err(ValueError::MissingParameter {
                parameter,
                type_name,
            }
            .into()),
        }
    }

    /// Takes a nullable argument; an explicit null or an absent key
    /// becomes `None`.
    ///
    /// # Errors
    ///
    /// [`ValueError::TypeMismatch`] when the value is not a `T`.
    pub fn take_nullable<T: Any>(&mut self, name: &str) -> Result<Option<T>, Error> {
        let (parameter, slot) = self.slot(name)?;
        match mem::replace(slot, Slot::Missing) {
            Slot::Value(value) => downcast_argument::<T>(parameter, value).map(Some),
            Slot::Null | Slot::Missing => Ok(None),
        }
    }

    /// Takes an optional argument, substituting the declared default when
    /// the key was absent.
    ///
    /// # Errors
    ///
    /// [`ValueError::NullForNonNullable`] on an explicit null,
    /// [`ValueError::TypeMismatch`] when the value is not a `T`.
    pub fn take_or<T: Any>(
        &mut self,
        name: &str,
        default: impl FnOnce() -> T,
    ) -> Result<T, Error> {
        let (parameter, slot) = self.slot(name)?;
        match mem::replace(slot, Slot::Missing) {
            Slot::Value(value) => downcast_argument::<T>(parameter, value),
            Slot::Null => Err(ValueError::NullForNonNullable {
                parameter: parameter.to_string(),
            }
            .into()),
            Slot::Missing => Ok(default()),
        }
    }

    /// Takes an object-list argument, downcasting each materialized
    /// element.
    ///
    /// # Errors
    ///
    /// As [`Arguments::take`], applied to the list and to each element.
    pub fn take_seq<T: Any>(&mut self, name: &str) -> Result<Vec<T>, Error> {
        let elements: Vec<Box<dyn Any>> = self.take(name)?;
        let parameter = match self.names.iter().find(|n| **n == name) {
            Some(parameter) => *parameter,
            None => return Err(ValueError::UnknownProperty {
                property: name.to_string(),
                type_name: self.type_name,
            }
            .into()),
        };
        elements
            .into_iter()
            .map(|element| downcast_argument::<T>(parameter, element))
            .collect()
    }
}

fn downcast_argument<T: Any>(parameter: &'static str, value: Box<dyn Any>) -> Result<T, Error> {
    match value.downcast::<T>() {
        Ok(value) => Ok(*value),
        Err(_) => Err(ValueError::TypeMismatch {
            parameter: parameter.to_string(),
            expected: any::type_name::<T>().to_string(),
            found: "an argument of a different type".to_string(),
        }
        .into()),
    }
}
