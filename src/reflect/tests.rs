use super::*;
use crate::case::CaseConvention;
use crate::error::{ConversionError, Error, ReflectionError};
use crate::value::{FieldValue, Value};
use chrono::NaiveDateTime;
use std::sync::Arc;

crate::entity! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Quark: QuarkFields {
        pub id: i64,
        pub name: String,
        pub read_write_property: i32,
        pub charm: Option<i32>,
        pub stable: bool,
        pub spin: Option<f64>,
        #[read_only]
        pub flavor: String,
        pub discovered_at: Option<NaiveDateTime>,
        pub extra: serde_json::Value,
    }
}

crate::entity! {
    #[derive(Debug, Default)]
    struct Batch: BatchFields {
        size: i16,
    }
}

crate::entity! {
    #[derive(Debug, Default)]
    #[allow(non_snake_case)]
    struct Clash: ClashFields {
        a_b: i32,
        aB: i32,
    }
}

fn snake() -> Outline<Quark> {
    Outline::build(CaseConvention::Snake).unwrap()
}

fn camel() -> Outline<Quark> {
    Outline::build(CaseConvention::Camel).unwrap()
}

#[test]
fn member_and_property_agree() {
    let outline = snake();
    let member = outline.member(|q| q.read_write_property);
    let property = outline.property(|q| q.read_write_property).unwrap();
    assert_eq!(member.name(), property.name());
    assert_eq!(member, *property.member());
}

#[test]
fn case_convention_applies_to_members() {
    assert_eq!(snake().member(|q| q.read_write_property).name(), "read_write_property");
    assert_eq!(camel().member(|q| q.read_write_property).name(), "readWriteProperty");
    let m = camel().member(|q| q.read_write_property);
    assert_eq!(m.snake_cased_name(), "read_write_property");
    assert_eq!(m.camel_cased_name(), "readWriteProperty");
    assert_eq!(m.field_name(), "read_write_property");
}

#[test]
fn entity_naming() {
    let outline = snake();
    assert_eq!(outline.name(), "quark");
    assert_eq!(outline.plural_name(), "quarks");
    assert_eq!(outline.camel_cased_name(), "Quark");
    assert_eq!(outline.plural_camel_cased_name(), "Quarks");
    assert_eq!(outline.plural_snake_cased_name(), "quarks");
    assert_eq!(camel().plural_name(), "Quarks");

    let batches = Outline::<Batch>::build(CaseConvention::Snake).unwrap();
    assert_eq!(batches.plural_name(), "batches");
}

#[test]
fn member_is_qualified_by_table() {
    let m = snake().member(|q| q.name);
    assert_eq!(m.table(), "quarks");
    assert_eq!(m.qualified_name(), "quarks.name");
}

#[test]
fn properties_keep_declaration_order() {
    let outline = camel();
    let keys: Vec<&str> = outline.keys().collect();
    assert_eq!(
        keys,
        ["id", "name", "readWriteProperty", "charm", "stable", "spin", "flavor", "discoveredAt", "extra"]
    );
}

#[test]
fn property_metadata() {
    let outline = snake();
    let charm = outline.property(|q| q.charm).unwrap();
    assert_eq!(charm.kind(), FieldKind::Int);
    assert!(charm.is_nullable());
    assert!(charm.is_simple());
    assert!(!charm.is_read_only());

    let flavor = outline.property(|q| q.flavor).unwrap();
    assert!(flavor.is_read_only());

    let extra = outline.property(|q| q.extra).unwrap();
    assert!(!extra.is_simple());
}

#[test]
fn lookup_by_accessor_style_names() {
    let outline = camel();
    assert_eq!(outline.property_named("readWriteProperty").unwrap().name(), "readWriteProperty");
    assert_eq!(outline.property_named("getReadWriteProperty").unwrap().name(), "readWriteProperty");
    assert_eq!(outline.property_named("set_read_write_property").unwrap().name(), "readWriteProperty");
    assert_eq!(outline.property_named("isStable").unwrap().name(), "stable");
    assert_eq!(
        outline.property_named("mass").unwrap_err(),
        ReflectionError::PropertyNotFound {
            entity: "Quark",
            name: "mass".into()
        }
    );
}

#[test]
fn duplicate_keys_fail_to_outline() {
    assert!(Outline::<Clash>::build(CaseConvention::Snake).is_ok());
    assert_eq!(
        Outline::<Clash>::build(CaseConvention::Camel).unwrap_err(),
        ReflectionError::DuplicateProperty {
            entity: "Clash",
            key: "aB".into()
        }
    );
}

#[test]
fn untyped_values_round_trip_through_bean() {
    let outline = snake();
    let mut bean = outline.create();
    bean.set_value(|q| q.read_write_property, &Value::from("12")).unwrap();
    bean.set_value(|q| q.stable, &Value::from("true")).unwrap();
    bean.set_value(|q| q.charm, &Value::Null).unwrap();
    bean.set_value(|q| q.spin, &Value::from("0.5")).unwrap();
    bean.set_value(|q| q.discovered_at, &Value::from("2024-01-02 03:04:05")).unwrap();

    assert_eq!(*bean.get(|q| q.read_write_property).unwrap(), 12);
    assert!(*bean.get(|q| q.stable).unwrap());
    assert_eq!(*bean.get(|q| q.charm).unwrap(), None);
    assert_eq!(*bean.get(|q| q.spin).unwrap(), Some(0.5));
    assert!(bean.get(|q| q.discovered_at).unwrap().is_some());
}

#[test]
fn null_into_primitive_stores_default() {
    let outline = snake();
    let mut bean = outline.wrap(Quark {
        read_write_property: 9,
        ..Quark::default()
    });
    bean.set_value(|q| q.read_write_property, &Value::Null).unwrap();
    assert_eq!(bean.into_inner().read_write_property, 0);
}

#[test]
fn typed_set_and_get() {
    let outline = snake();
    let mut bean = outline.create();
    bean.set(|q| q.name, "up".to_string()).unwrap();
    bean.set(|q| q.charm, Some(2)).unwrap();
    assert_eq!(bean.get(|q| q.name).unwrap(), "up");
    assert_eq!(bean.get_by_name("charm").unwrap(), FieldValue::Int(2));
}

#[test]
fn read_only_write_is_an_error() {
    let outline = snake();
    let mut bean = outline.create();
    assert_eq!(
        bean.set(|q| q.flavor, "strange".into()).unwrap_err(),
        ReflectionError::ReadOnly {
            entity: "Quark",
            name: "flavor".into()
        }
    );
    assert!(matches!(
        bean.set_value(|q| q.flavor, &Value::from("strange")),
        Err(Error::Reflection(ReflectionError::ReadOnly { .. }))
    ));
}

#[test]
fn conversion_errors_surface() {
    let outline = snake();
    let mut bean = outline.create();
    let err = bean.set_value(|q| q.read_write_property, &Value::from("twelve")).unwrap_err();
    assert!(matches!(err, Error::Conversion(ConversionError::Malformed { .. })));
}

#[test]
fn json_round_trip() {
    let outline = camel();
    let body = serde_json::json!({
        "id": 4,
        "name": "charm",
        "readWriteProperty": "7",
        "stable": false,
        "flavor": "ignored",
        "extra": {"tags": ["a"]}
    });
    let quark = outline.from_json(body.as_object().unwrap()).unwrap();
    assert_eq!(quark.id, 4);
    assert_eq!(quark.read_write_property, 7);
    assert_eq!(quark.flavor, "");
    assert_eq!(quark.extra, serde_json::json!({"tags": ["a"]}));

    let json = outline.to_json(&quark);
    assert_eq!(json["readWriteProperty"], serde_json::json!(7));
    assert_eq!(json["charm"], serde_json::Value::Null);

    let unknown = serde_json::json!({"mass": 1});
    assert!(outline.from_json(unknown.as_object().unwrap()).is_err());
}

#[test]
fn registry_reuses_outlines() {
    let registry = OutlineRegistry::new();
    let a = registry.get::<Quark>(CaseConvention::Snake).unwrap();
    let b = registry.get::<Quark>(CaseConvention::Snake).unwrap();
    let c = registry.get::<Quark>(CaseConvention::Camel).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(registry.len(), 2);
}

#[test]
fn concurrent_first_use_converges() {
    let registry = Arc::new(OutlineRegistry::new());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                let outline = registry.get::<Quark>(CaseConvention::Snake).unwrap();
                let name = if i % 2 == 0 {
                    outline.member(|q| q.name).name().to_string()
                } else {
                    outline.member(|q| q.read_write_property).name().to_string()
                };
                (i, name, outline)
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for (i, name, outline) in &results {
        let expected = if i % 2 == 0 { "name" } else { "read_write_property" };
        assert_eq!(name, expected);
        assert!(Arc::ptr_eq(outline, &results[0].2));
    }
}
