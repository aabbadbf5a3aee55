use std::any::{Any, TypeId};
use std::sync::{Arc, atomic::Ordering};

use crate::{
    Arguments, ClassInfoCache, Error, FieldDescriptor, FieldPolicy, FieldValue, Reflect,
    SchemaError, ShapeError, TypeDescriptor, TypeRef, TypeTag, ValueError, deserialize,
    deserialize_with, downcast_instance,
};

use super::fixtures::{
    Alarm, Book, Drawing, Grid, Level, Listing, Person, Profile, WIDGET_DESCRIPTOR_CALLS, Widget,
    sample_book,
};

#[test]
fn builds_a_simple_object() {
    let person: Person = deserialize(r#"{"name":"Ada","age":36}"#).unwrap();
    assert_eq!(
        person,
        Person {
            name: "Ada".to_string(),
            age: 36
        }
    );
}

#[test]
fn key_order_does_not_matter() {
    let person: Person = deserialize(r#"{"age":36,"name":"Ada"}"#).unwrap();
    assert_eq!(person.name, "Ada");
    assert_eq!(person.age, 36);
}

#[test]
fn builds_a_nested_object_graph() {
    let json = concat!(
        r#"{"title":"The Mill on the Floss","pages":544,"in_print":true,"#,
        r#""author":{"name":"George Eliot","age":61},"#,
        r#""tags":["classic","novel"],"#,
        r#""reviews":[{"stars":5,"text":"a keeper"},{"stars":3,"text":"slow start"}]}"#
    );
    let book: Book = deserialize(json).unwrap();
    assert_eq!(book, sample_book());
}

#[test]
fn builds_nested_lists() {
    let grid: Grid = deserialize(r#"{"rows":[[1,2],[3],[]]}"#).unwrap();
    assert_eq!(
        grid,
        Grid {
            rows: vec![vec![1, 2], vec![3], vec![]]
        }
    );
}

#[test]
fn honors_renamed_fields() {
    let listing: Listing = deserialize(r#"{"name":"lamp","somePrice":10000}"#).unwrap();
    assert_eq!(listing.price, 10_000);
    // The declared field name is not accepted once renamed.
    let err = deserialize::<Listing>(r#"{"name":"lamp","price":1}"#).unwrap_err();
    assert!(matches!(
        err,
        Error::Value(ValueError::UnknownProperty { .. })
    ));
}

#[test]
fn excluded_fields_are_unknown_on_the_wire() {
    let err =
        deserialize::<Listing>(r#"{"name":"lamp","somePrice":1,"internal_note":"x"}"#).unwrap_err();
    assert!(matches!(
        err,
        Error::Value(ValueError::UnknownProperty { .. })
    ));
}

#[test]
fn rejects_unknown_properties() {
    let err = deserialize::<Person>(r#"{"name":"Ada","age":36,"extra":1}"#).unwrap_err();
    match err {
        Error::Value(ValueError::UnknownProperty { property, type_name }) => {
            assert_eq!(property, "extra");
            assert_eq!(type_name, "Person");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_null_for_non_nullable_parameter() {
    let err = deserialize::<Person>(r#"{"name":null,"age":36}"#).unwrap_err();
    match err {
        Error::Value(ValueError::NullForNonNullable { parameter }) => {
            assert_eq!(parameter, "name");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_missing_required_parameter() {
    let err = deserialize::<Person>(r#"{"name":"Ada"}"#).unwrap_err();
    match err {
        Error::Value(ValueError::MissingParameter { parameter, type_name }) => {
            assert_eq!(parameter, "age");
            assert_eq!(type_name, "Person");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_mistyped_scalars() {
    let err = deserialize::<Person>(r#"{"name":"Ada","age":"old"}"#).unwrap_err();
    match err {
        Error::Value(ValueError::TypeMismatch {
            parameter,
            expected,
            found,
        }) => {
            assert_eq!(parameter, "age");
            assert_eq!(expected, "integer");
            assert_eq!(found, "string");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn missing_nullable_parameter_becomes_none() {
    let profile: Profile = deserialize(r#"{"username":"ada","score":7}"#).unwrap();
    assert_eq!(profile.bio, None);
    assert_eq!(profile.score, 7);
}

#[test]
fn explicit_null_for_nullable_parameter_becomes_none() {
    let profile: Profile = deserialize(r#"{"username":"ada","bio":null}"#).unwrap();
    assert_eq!(profile.bio, None);
}

#[test]
fn optional_parameter_defaults_when_absent() {
    let profile: Profile = deserialize(r#"{"username":"ada"}"#).unwrap();
    assert_eq!(profile.score, 0);
    let profile: Profile = deserialize(r#"{"username":"ada","bio":"hi","score":9}"#).unwrap();
    assert_eq!(profile.bio.as_deref(), Some("hi"));
    assert_eq!(profile.score, 9);
}

#[test]
fn shape_mismatch_object_for_list_field() {
    let err = deserialize::<Book>(r#"{"tags":{"x":1}}"#).unwrap_err();
    match err {
        Error::Shape(ShapeError::ExpectedArray { property }) => {
            assert_eq!(property, "tags");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn shape_mismatch_array_for_object_field() {
    let err = deserialize::<Book>(r#"{"author":[1,2]}"#).unwrap_err();
    match err {
        Error::Shape(ShapeError::ExpectedObject { property, .. }) => {
            assert_eq!(property, "author");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_primitive_in_object_list() {
    let err = deserialize::<Book>(r#"{"reviews":[1]}"#).unwrap_err();
    assert!(matches!(
        err,
        Error::Shape(ShapeError::PrimitiveElement { .. })
    ));
}

#[test]
fn rejects_composite_in_value_list() {
    let err = deserialize::<Book>(r#"{"tags":[{"x":1}]}"#).unwrap_err();
    assert!(matches!(
        err,
        Error::Shape(ShapeError::CompositeElement { .. })
    ));
}

#[test]
fn rejects_null_in_value_list() {
    let err = deserialize::<Book>(r#"{"tags":[null]}"#).unwrap_err();
    assert!(matches!(
        err,
        Error::Value(ValueError::NullForNonNullable { .. })
    ));
}

#[test]
fn rejects_mistyped_value_list_element() {
    let err = deserialize::<Book>(r#"{"tags":[1]}"#).unwrap_err();
    match err {
        Error::Value(ValueError::TypeMismatch { expected, found, .. }) => {
            assert_eq!(expected, "string");
            assert_eq!(found, "integer");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_composite_for_primitive_field() {
    let err = deserialize::<Person>(r#"{"age":{"x":1}}"#).unwrap_err();
    match err {
        Error::Value(ValueError::TypeMismatch { expected, found, .. }) => {
            assert_eq!(expected, "integer");
            assert_eq!(found, "object");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn applies_field_codecs() {
    let alarm: Alarm = deserialize(r#"{"name":"boiler","level":"high"}"#).unwrap();
    assert_eq!(alarm.level, Level::High);

    let err = deserialize::<Alarm>(r#"{"name":"boiler","level":"severe"}"#).unwrap_err();
    assert!(matches!(err, Error::Value(ValueError::Codec(_))));
}

#[test]
fn deserialize_as_overrides_the_declared_target() {
    // The declared target (Rect) has no "radius" parameter; only the
    // policy override (Circle) can accept this document.
    let drawing: Drawing = deserialize(r#"{"name":"dot","figure":{"radius":2.0}}"#).unwrap();
    assert!((drawing.figure.area() - std::f64::consts::PI * 4.0).abs() < 1e-9);
}

#[test]
fn class_info_cache_is_idempotent() {
    let cache = Arc::new(ClassInfoCache::new());
    let first = cache.get(TypeRef::of::<Widget>()).unwrap();
    let second = cache.get(TypeRef::of::<Widget>()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(WIDGET_DESCRIPTOR_CALLS.load(Ordering::SeqCst), 1);

    let widget: Widget = deserialize_with(r#"{"id":5}"#, &cache).unwrap();
    assert_eq!(widget, Widget { id: 5 });
    assert_eq!(WIDGET_DESCRIPTOR_CALLS.load(Ordering::SeqCst), 1);
}

/// Registered without a constructor: usable for serialization only.
#[derive(Debug)]
struct ViewOnly {
    n: i64,
}

impl Reflect for ViewOnly {
    fn descriptor() -> TypeDescriptor {
        fn n(value: &dyn Any) -> Result<FieldValue<'_>, Error> {
            Ok(FieldValue::Long(downcast_instance::<ViewOnly>(value)?.n))
        }
        TypeDescriptor {
            type_name: "ViewOnly",
            type_id: TypeId::of::<ViewOnly>(),
            fields: vec![FieldDescriptor::new("n", TypeTag::Long, n)],
            construct: None,
        }
    }
}

#[derive(Debug)]
struct Clashing {
    a: i64,
    b: i64,
}

impl Reflect for Clashing {
    fn descriptor() -> TypeDescriptor {
        fn a(value: &dyn Any) -> Result<FieldValue<'_>, Error> {
            Ok(FieldValue::Long(downcast_instance::<Clashing>(value)?.a))
        }
        fn b(value: &dyn Any) -> Result<FieldValue<'_>, Error> {
            Ok(FieldValue::Long(downcast_instance::<Clashing>(value)?.b))
        }
        fn construct(mut args: Arguments) -> Result<Box<dyn Any>, Error> {
            Ok(Box::new(Clashing {
                a: args.take("a")?,
                b: args.take("b")?,
            }))
        }
        TypeDescriptor {
            type_name: "Clashing",
            type_id: TypeId::of::<Clashing>(),
            fields: vec![
                FieldDescriptor::new("a", TypeTag::Long, a),
                FieldDescriptor {
                    policy: FieldPolicy {
                        json_name: Some("a".to_string()),
                        ..FieldPolicy::default()
                    },
                    ..FieldDescriptor::new("b", TypeTag::Long, b)
                },
            ],
            construct: Some(construct),
        }
    }
}

#[derive(Debug)]
struct BadExclude {
    x: i64,
}

impl Reflect for BadExclude {
    fn descriptor() -> TypeDescriptor {
        fn x(value: &dyn Any) -> Result<FieldValue<'_>, Error> {
            Ok(FieldValue::Long(downcast_instance::<BadExclude>(value)?.x))
        }
        fn construct(mut args: Arguments) -> Result<Box<dyn Any>, Error> {
            Ok(Box::new(BadExclude { x: args.take("x")? }))
        }
        TypeDescriptor {
            type_name: "BadExclude",
            type_id: TypeId::of::<BadExclude>(),
            fields: vec![FieldDescriptor {
                policy: FieldPolicy {
                    excluded: true,
                    ..FieldPolicy::default()
                },
                ..FieldDescriptor::new("x", TypeTag::Long, x)
            }],
            construct: Some(construct),
        }
    }
}

#[test]
fn rejects_descriptor_without_constructor() {
    let err = deserialize::<ViewOnly>(r#"{"n":1}"#).unwrap_err();
    assert!(matches!(
        err,
        Error::Schema(SchemaError::MissingConstructor {
            type_name: "ViewOnly"
        })
    ));
}

#[test]
fn rejects_duplicate_json_names() {
    let err = deserialize::<Clashing>(r#"{"a":1}"#).unwrap_err();
    assert!(matches!(
        err,
        Error::Schema(SchemaError::DuplicateJsonName { .. })
    ));
}

#[test]
fn rejects_excluded_parameter_without_default() {
    let err = deserialize::<BadExclude>(r#"{}"#).unwrap_err();
    assert!(matches!(
        err,
        Error::Schema(SchemaError::ExcludedNotDefaulted { parameter: "x", .. })
    ));
}

#[test]
fn malformed_documents_fail_synchronously() {
    assert!(deserialize::<Person>(r#"{"name":"Ada","age":36,}"#).is_err());
    assert!(deserialize::<Person>(r#"{"name":"Ada" "age":36}"#).is_err());
    assert!(deserialize::<Person>("").is_err());
}
