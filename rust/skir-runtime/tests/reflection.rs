//! Tests for static reflection (descriptor tables, field projections,
//! visitors) and dynamic reflection (type descriptors and descriptor-driven
//! conversion).

mod common;

use common::*;
use serde_json::{json, Value};
use skir_runtime::reflection::visit::StringCollector;
use skir_runtime::reflection::{
    for_each_field, for_each_variant, get_type_descriptor, EnumType, RecordDescriptor,
    StructType, TypeDescriptor, Variant, VisitorMut,
};
use skir_runtime::{to_dense_json, to_readable_json, SkirType, Timestamp};

struct Capitalize;

impl VisitorMut for Capitalize {
    fn visit_string(&mut self, value: &mut String) {
        *value = value.to_uppercase();
    }
}

// ===========================================================================
// Static reflection
// ===========================================================================

#[test]
fn reflection_struct_fields_in_number_order() {
    let mut names = Vec::new();
    for_each_field::<User>(|f| names.push((f.name(), f.number())));
    assert_eq!(
        names,
        vec![
            ("user_id", 0),
            ("name", 1),
            ("quote", 2),
            ("pets", 3),
            ("subscription_status", 4)
        ]
    );
    let descriptor = User::descriptor();
    assert_eq!(descriptor.id(), "user.skir:User");
    assert_eq!(Pet::descriptor().name(), "Pet");
    assert_eq!(Pet::descriptor().qualified_name(), "User.Pet");
    assert_eq!(descriptor.field_by_name("quote").map(|f| f.number()), Some(2));
    assert!(descriptor.field_by_number(9).is_none());
}

#[test]
fn reflection_enum_variants() {
    let mut variants = Vec::new();
    for_each_variant::<SubscriptionStatus>(|v| {
        variants.push((v.name(), v.number(), matches!(v, Variant::Wrapper(_))))
    });
    assert_eq!(
        variants,
        vec![
            ("FREE", 1, false),
            ("PREMIUM", 2, false),
            ("trial_start_time", 3, true)
        ]
    );
    match SubscriptionStatus::descriptor().variant_by_name("PREMIUM") {
        Some(Variant::Constant(c)) => assert_eq!(c.value(), SubscriptionStatus::Premium),
        other => panic!("expected a constant, got {:?}", other.map(|v| v.name())),
    }
}

#[test]
fn reflection_field_projection() {
    let mut user = john();
    let name = User::descriptor().field_by_name("name").unwrap();
    assert_eq!(name.get(&user).downcast_ref::<String>().unwrap(), "John Doe");
    *name.get_mut(&mut user).downcast_mut::<String>().unwrap() = "Johnny".into();
    assert_eq!(user.name, "Johnny");
    assert_eq!(format!("{:?}", name.debug(&user)), "\"Johnny\"");
}

#[test]
fn reflection_wrapper_payload_projection() {
    let status = tarzan().subscription_status;
    let Some(Variant::Wrapper(trial)) = SubscriptionStatus::descriptor().variant_by_number(3) else {
        panic!("variant 3 should be a wrapper");
    };
    assert!(trial.is_active(&status));
    assert_eq!(
        trial.payload(&status).and_then(|p| p.downcast_ref::<Timestamp>()),
        Some(&Timestamp::from_unix_millis(1_743_592_409_000))
    );
    assert!(!trial.is_active(&SubscriptionStatus::Free));
    assert_eq!(
        trial.wrap_default(),
        SubscriptionStatus::TrialStartTime(Timestamp::EPOCH)
    );
}

#[test]
fn reflection_visitor_capitalizes_every_string() {
    let mut user = tarzan();
    user.accept_mut(&mut Capitalize);
    assert_eq!(user.name, "TARZAN");
    assert_eq!(user.quote, "AAAAAAAAAAYAAAAAAAAAAYAAAAAAAAAA");
    assert_eq!(user.pets[0].name, "CHEETA");
    assert_eq!(user.pets[0].picture, "🐒");
    assert_eq!(user.subscription_status, tarzan().subscription_status);
}

#[test]
fn reflection_visitor_reaches_keyed_items() {
    let mut registry = UserRegistry::default();
    registry.users.push_back(john());
    registry.users.push_back(jane());
    let mut collector = StringCollector::default();
    registry.accept(&mut collector);
    assert_eq!(
        collector.strings,
        vec!["John Doe", "", "Jane Doe", "", "Fluffy", "cat", "Rex", "dog"]
    );
}

// ===========================================================================
// Type descriptors
// ===========================================================================

#[test]
fn reflection_type_descriptor_lists_reachable_records() {
    let descriptor = get_type_descriptor::<User>();
    let ids: Vec<&str> = descriptor.records.iter().map(|r| r.id()).collect();
    assert_eq!(
        ids,
        vec!["user.skir:User", "user.skir:User.Pet", "user.skir:SubscriptionStatus"]
    );
    assert_eq!(descriptor.root.to_string(), "User");
    descriptor.validate().unwrap();
}

#[test]
fn reflection_enum_descriptor_json() {
    let descriptor = TypeDescriptor::of::<SubscriptionStatus>();
    assert_eq!(
        descriptor.as_json_value(),
        json!({
            "type": {"kind": "record", "value": "user.skir:SubscriptionStatus"},
            "records": [{
                "kind": "enum",
                "id": "user.skir:SubscriptionStatus",
                "variants": [
                    {"name": "FREE", "number": 1},
                    {"name": "PREMIUM", "number": 2},
                    {
                        "name": "trial_start_time",
                        "number": 3,
                        "type": {"kind": "primitive", "value": "timestamp"}
                    }
                ]
            }]
        })
    );
}

#[test]
fn reflection_type_descriptor_json_round_trip() {
    let descriptor = get_type_descriptor::<User>();
    let back = TypeDescriptor::from_json(&descriptor.as_json()).unwrap();
    assert_eq!(back, descriptor);
}

#[test]
fn reflection_keyed_array_signature() {
    let descriptor = get_type_descriptor::<UserRegistry>();
    let Some(RecordDescriptor::Struct(registry)) = descriptor.record("user.skir:UserRegistry") else {
        panic!("UserRegistry should be a struct");
    };
    assert_eq!(registry.fields[0].ty.to_string(), "[User|user_id]");
    assert_eq!(descriptor.records.len(), 4);
}

#[test]
fn reflection_recursive_type_listed_once() {
    let descriptor = get_type_descriptor::<Tree>();
    assert_eq!(descriptor.records.len(), 1);
    assert_eq!(
        descriptor.as_json_value()["records"][0]["fields"][1]["type"],
        json!({"kind": "array", "value": {"item": {"kind": "record", "value": "user.skir:Tree"}}})
    );
}

#[test]
fn reflection_recursive_descriptor_json_round_trip() {
    let descriptor = get_type_descriptor::<Tree>();
    let reparsed = TypeDescriptor::from_json(&descriptor.as_json()).unwrap();
    assert_eq!(reparsed, descriptor);
    assert!(reparsed.record("user.skir:Tree").is_some());
}

#[test]
fn reflection_removed_numbers_in_descriptor() {
    let descriptor = get_type_descriptor::<common::v2::Shape>();
    let json = descriptor.as_json_value();
    assert_eq!(json["records"][0]["removed_numbers"], json!([1]));
    assert_eq!(json["records"][1]["removed_numbers"], json!([2]));
}

// ===========================================================================
// Descriptor-driven conversion
// ===========================================================================

#[test]
fn reflection_dense_to_readable_matches_compiled_codec() {
    let descriptor = TypeDescriptor::from_json(&get_type_descriptor::<User>().as_json()).unwrap();
    for user in [john(), jane(), lyla(), tarzan()] {
        let dense: Value = serde_json::from_str(&to_dense_json(&user)).unwrap();
        let expected: Value = serde_json::from_str(&to_readable_json(&user)).unwrap();
        assert_eq!(descriptor.dense_to_readable(&dense).unwrap(), expected);
    }
}

#[test]
fn reflection_dense_to_readable_drops_unknown_enum_fields() {
    let descriptor = get_type_descriptor::<common::v1::Shape>();
    for newer in [
        common::v2::Shape {
            title: "square".to_string(),
            color: common::v2::Color::Blue,
            ..Default::default()
        },
        common::v2::Shape {
            title: "dot".to_string(),
            color: common::v2::Color::Rgb(0xff00ff),
            ..Default::default()
        },
    ] {
        let dense: Value = serde_json::from_str(&to_dense_json(&newer)).unwrap();
        let older: common::v1::Shape = skir_runtime::from_json(&to_dense_json(&newer)).unwrap();
        let expected: Value = serde_json::from_str(&to_readable_json(&older)).unwrap();
        assert_eq!(descriptor.dense_to_readable(&dense).unwrap(), expected);
        assert!(expected.get("color").is_none());
    }
}
