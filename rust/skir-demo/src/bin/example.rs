//! Walkthrough of skir-generated records.
//!
//! ```text
//! cargo run -p skir-demo --bin example
//! ```

use skir_demo::capitalize::capitalize_struct;
use skir_demo::user::{tarzan, Pet, SubscriptionStatus, User, UserRegistry};
use skir_runtime::reflection::{for_each_field, get_type_descriptor, TypeDescriptor};
use skir_runtime::{parse, to_bytes, to_dense_json, to_readable_json, Timestamp};
use std::collections::HashSet;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Structs

    // Fields left out take their default value.
    let john = User {
        user_id: 42,
        name: "John Doe".to_string(),
        ..User::default()
    };

    let jane = User {
        user_id: 43,
        name: "Jane Doe".to_string(),
        pets: vec![
            Pet {
                name: "Fluffy".to_string(),
                picture: "cat".to_string(),
                ..Pet::default()
            },
            Pet {
                name: "Rex".to_string(),
                picture: "dog".to_string(),
                ..Pet::default()
            },
        ],
        subscription_status: SubscriptionStatus::Premium,
        ..User::default()
    };

    // Without `..Default::default()` every field must be given.
    let lyla = User {
        user_id: 44,
        name: "Lyla Doe".to_string(),
        quote: "This is Lyla's world, you just live in it".to_string(),
        pets: vec![Pet {
            name: "Tiny".to_string(),
            height_in_meters: 0.05,
            picture: "🐁".to_string(),
        }],
        subscription_status: SubscriptionStatus::Free,
    };

    // Enums

    let john_status = SubscriptionStatus::Free;
    let jade_status =
        SubscriptionStatus::TrialStartTime(Timestamp::from_unix_millis(1_743_682_787_000));

    if john_status == SubscriptionStatus::Free {
        println!("John, would you like to upgrade to premium?");
    }
    if let SubscriptionStatus::TrialStartTime(start) = &jade_status {
        println!("Jade's trial started on {start}");
    }

    // UNKNOWN is the default.
    let lara_status = SubscriptionStatus::default();
    match lara_status {
        SubscriptionStatus::Unknown => println!("Lara's subscription status is UNKNOWN"),
        SubscriptionStatus::Free => println!("Lara's subscription status is FREE"),
        SubscriptionStatus::Premium => println!("Lara's subscription status is PREMIUM"),
        SubscriptionStatus::TrialStartTime(start) => println!("Lara's trial started on {start}"),
    }

    // Serialization

    println!("{}", to_dense_json(&john));
    // [42,"John Doe"]

    println!("{}", to_readable_json(&john));
    // {
    //   "user_id": 42,
    //   "name": "John Doe"
    // }

    // Dense JSON carries no field names, so it survives field renames. Keep
    // the readable flavor for debugging.

    let bytes = to_bytes(&jane);
    println!("{} bytes in binary, {} in dense JSON", bytes.len(), to_dense_json(&jane).len());

    // Deserialization

    // `parse` accepts any of the three formats.
    let parsed: User = parse(to_dense_json(&john).as_bytes())?;
    assert_eq!(parsed, john);
    let parsed: User = parse(&bytes)?;
    assert_eq!(parsed, jane);

    // Keyed arrays

    let mut registry = UserRegistry::default();
    registry.users.push_back(john.clone());
    registry.users.push_back(jane.clone());
    registry.users.push_back(lyla.clone());

    assert_eq!(registry.users.len(), 3);
    assert_eq!(registry.users[0], john);
    assert_eq!(registry.users.find_or_null(&43), Some(&jane));
    assert_eq!(registry.users.find_or_default(&44).name, "Lyla Doe");
    assert_eq!(registry.users.find_or_default(&45).name, "");

    // The last item with a given key wins.
    let evil_lyla = User {
        name: "Evil Lyla".to_string(),
        ..lyla.clone()
    };
    registry.users.push_back(evil_lyla);
    assert_eq!(registry.users.find_or_default(&44).name, "Evil Lyla");

    // Equality and hashing

    let user_set: HashSet<User> = [john, jane.clone(), jane, lyla].into_iter().collect();
    assert_eq!(user_set.len(), 3);

    // Constants

    assert_eq!(tarzan().name, "Tarzan");

    // Dynamic reflection

    let descriptor = get_type_descriptor::<User>();
    let reparsed = TypeDescriptor::from_json(&descriptor.as_json())?;
    assert_eq!(reparsed, descriptor);

    // A descriptor is enough to turn dense JSON into readable JSON.
    let dense: serde_json::Value = serde_json::from_str(&to_dense_json(tarzan()))?;
    println!("{}", serde_json::to_string_pretty(&descriptor.dense_to_readable(&dense)?)?);

    // Static reflection

    for_each_field::<User>(|field| println!("User field #{}: {}", field.number(), field.name()));

    let mut tarzan_copy = tarzan().clone();
    capitalize_struct(&mut tarzan_copy);
    println!("{}", to_readable_json(&tarzan_copy));
    // {
    //   "user_id": 123,
    //   "name": "TARZAN",
    //   "quote": "AAAAAAAAAAYAAAAAAAAAAYAAAAAAAAAA",
    //   ...

    Ok(())
}
