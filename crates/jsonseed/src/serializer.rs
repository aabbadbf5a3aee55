//! Reflective JSON serialization.
//!
//! The encode side is deliberately simpler than the decode side: a
//! depth-first walk over descriptor fields that writes JSON text straight
//! into a buffer. No token stream or value tree exists on this path.

use std::any::Any;

use tracing::trace;

use crate::{
    descriptor::{AnyReflect, FieldValue, Reflect, TypeDescriptor},
    error::{Error, ValueError},
    value::{escape_string, format_double},
};

/// Serializes `value` as a compact JSON object string.
///
/// Fields are written in declaration order; excluded fields are skipped;
/// keys honor the `json_name` policy; field codecs apply where configured.
/// No pretty-printing and no trailing newline.
///
/// # Errors
///
/// [`Error`] from a field accessor or codec.
pub fn serialize<T: Reflect>(value: &T) -> Result<String, Error> {
    trace!(type_name = std::any::type_name::<T>(), "serializing document");
    let mut out = String::new();
    write_object(&mut out, &T::descriptor(), value)?;
    Ok(out)
}

fn write_object(out: &mut String, descriptor: &TypeDescriptor, value: &dyn Any) -> Result<(), Error> {
    out.push('{');
    let mut first = true;
    for field in &descriptor.fields {
        if field.policy.excluded {
            continue;
        }
        if !first {
            out.push(',');
        }
        first = false;
        out.push('"');
        out.push_str(&escape_string(field.json_name()));
        out.push_str("\":");
        let field_value = (field.get)(value)?;
        match (&field.policy.codec, field_value) {
            (Some(codec), FieldValue::Opaque(raw)) => {
                out.push_str(&codec.to_json_value(raw)?.to_string());
            }
            (None, FieldValue::Opaque(_)) => {
                return Err(ValueError::Codec(format!(
                    "field '{}' of {} produced an opaque value but has no codec",
                    field.name, descriptor.type_name
                ))
                .into());
            }
            (_, field_value) => write_field_value(out, field_value)?,
        }
    }
    out.push('}');
    Ok(())
}

fn write_field_value(out: &mut String, value: FieldValue<'_>) -> Result<(), Error> {
    match value {
        FieldValue::Null => out.push_str("null"),
        FieldValue::Boolean(v) => out.push_str(if v { "true" } else { "false" }),
        FieldValue::Long(v) => {
            out.push_str(&v.to_string());
        }
        FieldValue::Double(v) => out.push_str(&format_double(v)),
        FieldValue::Str(v) => {
            out.push('"');
            out.push_str(&escape_string(v));
            out.push('"');
        }
        FieldValue::List(items) => {
            out.push('[');
            let mut first = true;
            for item in items {
                if !first {
                    out.push(',');
                }
                first = false;
                write_field_value(out, item)?;
            }
            out.push(']');
        }
        FieldValue::Object(object) => {
            write_object(out, &object.reflect_descriptor(), object.as_any())?;
        }
        FieldValue::Opaque(_) => {
            return Err(ValueError::Codec(
                "opaque value outside a codec-bearing field".to_string(),
            )
            .into());
        }
    }
    Ok(())
}
