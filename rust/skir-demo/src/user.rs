//! Generated from `user.skir`.
//!
//! ```text
//! struct User {
//!   user_id: int64;
//!   name: string;
//!   quote: string;
//!   pets: [Pet];
//!   subscription_status: SubscriptionStatus;
//!
//!   struct Pet {
//!     name: string;
//!     height_in_meters: float32;
//!     picture: string;
//!   }
//! }
//!
//! enum SubscriptionStatus {
//!   FREE;
//!   PREMIUM;
//!   trial_start_time: timestamp;
//! }
//!
//! struct UserRegistry {
//!   users: [User|user_id];
//! }
//!
//! const TARZAN: User = {...};
//! ```

use skir_runtime::__private::Lazy;
use skir_runtime::reflection::{EnumDescriptor, EnumType, StructDescriptor, StructType};
use skir_runtime::{impl_enum, impl_struct, KeyExtractor, KeyedItems, Timestamp};

#[derive(Clone, Debug, Default)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub quote: String,
    pub pets: Vec<Pet>,
    pub subscription_status: SubscriptionStatus,
}

impl StructType for User {
    fn descriptor() -> &'static StructDescriptor<Self> {
        static DESCRIPTOR: Lazy<StructDescriptor<User>> = Lazy::new(|| {
            StructDescriptor::<User>::new("user.skir", "User")
                .field("user_id", 0, |r| &r.user_id, |r| &mut r.user_id)
                .field("name", 1, |r| &r.name, |r| &mut r.name)
                .field("quote", 2, |r| &r.quote, |r| &mut r.quote)
                .field("pets", 3, |r| &r.pets, |r| &mut r.pets)
                .field(
                    "subscription_status",
                    4,
                    |r| &r.subscription_status,
                    |r| &mut r.subscription_status,
                )
        });
        &DESCRIPTOR
    }
}

impl_struct!(User);

#[derive(Clone, Debug, Default)]
pub struct Pet {
    pub name: String,
    pub height_in_meters: f32,
    pub picture: String,
}

impl StructType for Pet {
    fn descriptor() -> &'static StructDescriptor<Self> {
        static DESCRIPTOR: Lazy<StructDescriptor<Pet>> = Lazy::new(|| {
            StructDescriptor::<Pet>::new("user.skir", "User.Pet")
                .field("name", 0, |r| &r.name, |r| &mut r.name)
                .field(
                    "height_in_meters",
                    1,
                    |r| &r.height_in_meters,
                    |r| &mut r.height_in_meters,
                )
                .field("picture", 2, |r| &r.picture, |r| &mut r.picture)
        });
        &DESCRIPTOR
    }
}

impl_struct!(Pet);

#[derive(Clone, Debug, Default)]
pub enum SubscriptionStatus {
    #[default]
    Unknown,
    Free,
    Premium,
    TrialStartTime(Timestamp),
}

impl EnumType for SubscriptionStatus {
    fn descriptor() -> &'static EnumDescriptor<Self> {
        static DESCRIPTOR: Lazy<EnumDescriptor<SubscriptionStatus>> = Lazy::new(|| {
            EnumDescriptor::<SubscriptionStatus>::new("user.skir", "SubscriptionStatus")
                .constant("FREE", 1, || SubscriptionStatus::Free)
                .constant("PREMIUM", 2, || SubscriptionStatus::Premium)
                .wrapper(
                    "trial_start_time",
                    3,
                    SubscriptionStatus::TrialStartTime,
                    |e| match e {
                        SubscriptionStatus::TrialStartTime(v) => Some(v),
                        _ => None,
                    },
                    |e| match e {
                        SubscriptionStatus::TrialStartTime(v) => Some(v),
                        _ => None,
                    },
                )
        });
        &DESCRIPTOR
    }

    fn variant_number(&self) -> u32 {
        match self {
            SubscriptionStatus::Unknown => 0,
            SubscriptionStatus::Free => 1,
            SubscriptionStatus::Premium => 2,
            SubscriptionStatus::TrialStartTime(_) => 3,
        }
    }
}

impl_enum!(SubscriptionStatus);

/// Key of `[User|user_id]`.
pub struct UserById;

impl KeyExtractor<User> for UserById {
    type Key = i64;
    const KEY_PATH: &'static str = "user_id";

    fn key(item: &User) -> i64 {
        item.user_id
    }
}

#[derive(Clone, Debug, Default)]
pub struct UserRegistry {
    pub users: KeyedItems<User, UserById>,
}

impl StructType for UserRegistry {
    fn descriptor() -> &'static StructDescriptor<Self> {
        static DESCRIPTOR: Lazy<StructDescriptor<UserRegistry>> = Lazy::new(|| {
            StructDescriptor::<UserRegistry>::new("user.skir", "UserRegistry")
                .field("users", 0, |r| &r.users, |r| &mut r.users)
        });
        &DESCRIPTOR
    }
}

impl_struct!(UserRegistry);

pub fn tarzan() -> &'static User {
    static TARZAN: Lazy<User> = Lazy::new(|| User {
        user_id: 123,
        name: "Tarzan".to_string(),
        quote: "AAAAAAAAAAYAAAAAAAAAAYAAAAAAAAAA".to_string(),
        pets: vec![Pet {
            name: "Cheeta".to_string(),
            height_in_meters: 1.67,
            picture: "🐒".to_string(),
        }],
        subscription_status: SubscriptionStatus::TrialStartTime(Timestamp::from_unix_millis(
            1_743_592_409_000,
        )),
    });
    &TARZAN
}
