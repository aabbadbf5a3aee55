//! Registers a small device type and round-trips it through JSON text.
//!
//! Run with `cargo run --example device_registry`.
#![allow(missing_docs)]

use std::any::{Any, TypeId};

use jsonseed::{
    Arguments, Error, FieldDescriptor, FieldValue, Reflect, TypeDescriptor, TypeTag, deserialize,
    downcast_instance, serialize,
};

#[derive(Debug, PartialEq)]
struct Device {
    hostname: String,
    port: i64,
    active: bool,
    labels: Vec<String>,
}

impl Reflect for Device {
    fn descriptor() -> TypeDescriptor {
        fn hostname(value: &dyn Any) -> Result<FieldValue<'_>, Error> {
            Ok(FieldValue::Str(
                &downcast_instance::<Device>(value)?.hostname,
            ))
        }
        fn port(value: &dyn Any) -> Result<FieldValue<'_>, Error> {
            Ok(FieldValue::Long(downcast_instance::<Device>(value)?.port))
        }
        fn active(value: &dyn Any) -> Result<FieldValue<'_>, Error> {
            Ok(FieldValue::Boolean(
                downcast_instance::<Device>(value)?.active,
            ))
        }
        fn labels(value: &dyn Any) -> Result<FieldValue<'_>, Error> {
            let device = downcast_instance::<Device>(value)?;
            Ok(FieldValue::List(
                device.labels.iter().map(|l| FieldValue::Str(l)).collect(),
            ))
        }
        fn construct(mut args: Arguments) -> Result<Box<dyn Any>, Error> {
            Ok(Box::new(Device {
                hostname: args.take("hostname")?,
                port: args.take("port")?,
                active: args.take("active")?,
                labels: args.take("labels")?,
            }))
        }
        TypeDescriptor {
            type_name: "Device",
            type_id: TypeId::of::<Device>(),
            fields: vec![
                FieldDescriptor::new("hostname", TypeTag::String, hostname),
                FieldDescriptor::new("port", TypeTag::Long, port),
                FieldDescriptor::new("active", TypeTag::Boolean, active),
                FieldDescriptor::new("labels", TypeTag::List(Box::new(TypeTag::String)), labels),
            ],
            construct: Some(construct),
        }
    }
}

fn main() -> Result<(), Error> {
    let device = Device {
        hostname: "sensor-7".to_string(),
        port: 9100,
        active: true,
        labels: vec!["lab".to_string(), "rooftop".to_string()],
    };

    let text = serialize(&device)?;
    println!("serialized: {text}");

    let restored: Device = deserialize(&text)?;
    println!("restored:   {restored:?}");
    assert_eq!(restored, device);

    Ok(())
}
