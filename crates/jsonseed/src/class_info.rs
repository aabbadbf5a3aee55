//! Cached per-type deserialization metadata.
//!
//! A [`ClassInfo`] is the compiled form of a [`TypeDescriptor`]: JSON keys
//! resolved to constructor parameters, deserialize-as overrides collected,
//! and the registration validated once, up front. The [`ClassInfoCache`]
//! guarantees the compilation runs at most once per type and that every
//! caller observes the same entry.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

use dashmap::{DashMap, mapref::entry::Entry};
use once_cell::sync::Lazy;
use tracing::debug;

use crate::{
    descriptor::{Arguments, ConstructFn, FieldDescriptor, Slot, TypeDescriptor, TypeRef, TypeTag},
    error::{Error, SchemaError, ValueError},
    value::JsonValue,
};

/// Compiled metadata for one target type.
pub struct ClassInfo {
    type_name: &'static str,
    fields: Vec<FieldDescriptor>,
    json_to_param: HashMap<String, usize>,
    deserialize_as: HashMap<String, TypeRef>,
    construct: ConstructFn,
}

impl ClassInfo {
    /// Compiles and validates a descriptor. Fails fast on registrations
    /// that could never deserialize successfully.
    fn new(descriptor: TypeDescriptor) -> Result<Self, Error> {
        let TypeDescriptor {
            type_name,
            fields,
            construct,
            ..
        } = descriptor;
        let construct = construct.ok_or(SchemaError::MissingConstructor { type_name })?;
        let mut json_to_param = HashMap::new();
        let mut deserialize_as = HashMap::new();
        for (ix, field) in fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(SchemaError::UnnamedParameter { type_name }.into());
            }
            if field.policy.excluded {
                if !field.optional && !field.nullable {
                    return Err(SchemaError::ExcludedNotDefaulted {
                        type_name,
                        parameter: field.name,
                    }
                    .into());
                }
                continue;
            }
            let json_name = field.json_name().to_string();
            if let Some(target) = field.policy.deserialize_as {
                deserialize_as.insert(json_name.clone(), target);
            }
            if json_to_param.insert(json_name, ix).is_some() {
                return Err(SchemaError::DuplicateJsonName {
                    type_name,
                    json_name: field.json_name().to_string(),
                }
                .into());
            }
        }
        debug!(type_name, parameters = fields.len(), "compiled class info");
        Ok(Self {
            type_name,
            fields,
            json_to_param,
            deserialize_as,
            construct,
        })
    }

    /// Display name of the target type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Resolves the constructor parameter for a JSON key.
    ///
    /// # Errors
    ///
    /// [`ValueError::UnknownProperty`] when no parameter matches.
    pub fn parameter(&self, json_name: &str) -> Result<(usize, &FieldDescriptor), Error> {
        match self.json_to_param.get(json_name) {
            Some(&ix) => Ok((ix, &self.fields[ix])),
            None => Err(ValueError::UnknownProperty {
                property: json_name.to_string(),
                type_name: self.type_name,
            }
            .into()),
        }
    }

    /// Concrete target override for an interface-typed field, if declared.
    #[must_use]
    pub fn deserialize_target(&self, json_name: &str) -> Option<TypeRef> {
        self.deserialize_as.get(json_name).copied()
    }

    /// Applies the field's codec, or validates the raw scalar against the
    /// declared tag and nullability and passes it through.
    pub(crate) fn coerce(&self, field: &FieldDescriptor, value: JsonValue) -> Result<Slot, Error> {
        if let Some(codec) = &field.policy.codec {
            return codec.from_json_value(value).map(Slot::Value);
        }
        let found = value.type_name();
        match (&field.tag, value) {
            (_, JsonValue::Null) => {
                if field.nullable {
                    Ok(Slot::Null)
                } else {
                    Err(ValueError::NullForNonNullable {
                        parameter: field.name.to_string(),
                    }
                    .into())
                }
            }
            (TypeTag::Boolean, JsonValue::Boolean(v)) => Ok(Slot::Value(Box::new(v))),
            (TypeTag::Long, JsonValue::Long(v)) => Ok(Slot::Value(Box::new(v))),
            (TypeTag::Double, JsonValue::Double(v)) => Ok(Slot::Value(Box::new(v))),
            (TypeTag::String, JsonValue::String(v)) => Ok(Slot::Value(Box::new(v))),
            (tag, _) => Err(ValueError::TypeMismatch {
                parameter: field.name.to_string(),
                expected: tag.type_name().to_string(),
                found: found.to_string(),
            }
            .into()),
        }
    }

    /// Validates required parameters and invokes the constructor.
    pub(crate) fn instantiate(&self, slots: Vec<Slot>) -> Result<Box<dyn Any>, Error> {
        for (field, slot) in self.fields.iter().zip(&slots) {
            if matches!(slot, Slot::Missing) && !field.optional && !field.nullable {
                return Err(ValueError::MissingParameter {
                    parameter: field.name,
                    type_name: self.type_name,
                }
                .into());
            }
        }
        let names = self.fields.iter().map(|f| f.name).collect();
        (self.construct)(Arguments::new(self.type_name, names, slots))
    }
}

/// Shared, read-mostly cache of [`ClassInfo`] entries, keyed by type.
///
/// The entry API is the get-or-create critical section: at most one
/// compilation runs per type even under concurrent callers, and every
/// caller observes the same `Arc`.
pub struct ClassInfoCache {
    entries: DashMap<TypeId, Arc<ClassInfo>>,
}

impl ClassInfoCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// The process-wide cache used by [`crate::deserialize`].
    #[must_use]
    pub fn shared() -> Arc<Self> {
        static SHARED: Lazy<Arc<ClassInfoCache>> = Lazy::new(|| Arc::new(ClassInfoCache::new()));
        Arc::clone(&SHARED)
    }

    /// Looks up or compiles the metadata for `target`.
    ///
    /// # Errors
    ///
    /// [`SchemaError`] variants raised while compiling the descriptor.
    pub fn get(&self, target: TypeRef) -> Result<Arc<ClassInfo>, Error> {
        match self.entries.entry(target.type_id()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let info = Arc::new(ClassInfo::new(target.descriptor())?);
                entry.insert(Arc::clone(&info));
                Ok(info)
            }
        }
    }
}

impl Default for ClassInfoCache {
    fn default() -> Self {
        Self::new()
    }
}
