//! Records shaped like generated code, shared by the integration tests.
//!
//! `user.skir`:
//!
//! ```text
//! struct User {
//!   user_id: int64;
//!   name: string;
//!   quote: string;
//!   pets: [Pet];
//!   subscription_status: SubscriptionStatus;
//!   struct Pet { name: string; height_in_meters: float32; picture: string; }
//! }
//! enum SubscriptionStatus { FREE; PREMIUM; trial_start_time: timestamp; }
//! struct UserRegistry { users: [User|user_id]; }
//! struct Tree { value: int32; children: [Tree]; }
//! ```

#![allow(dead_code)]

use skir_runtime::__private::Lazy;
use skir_runtime::reflection::{EnumDescriptor, EnumType, StructDescriptor, StructType};
use skir_runtime::{impl_enum, impl_struct, ByteString, KeyExtractor, KeyedItems, Timestamp};

// ===========================================================================
// user.skir
// ===========================================================================

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

#[derive(Clone, Debug, Default)]
pub struct Tree {
    pub value: i32,
    pub children: Vec<Tree>,
}

impl StructType for Tree {
    fn descriptor() -> &'static StructDescriptor<Self> {
        static DESCRIPTOR: Lazy<StructDescriptor<Tree>> = Lazy::new(|| {
            StructDescriptor::<Tree>::new("user.skir", "Tree")
                .field("value", 0, |r| &r.value, |r| &mut r.value)
                .field("children", 1, |r| &r.children, |r| &mut r.children)
        });
        &DESCRIPTOR
    }
}

impl_struct!(Tree);

pub fn john() -> User {
    User {
        user_id: 42,
        name: "John Doe".into(),
        ..User::default()
    }
}

pub fn jane() -> User {
    User {
        user_id: 43,
        name: "Jane Doe".into(),
        pets: vec![
            Pet {
                name: "Fluffy".into(),
                picture: "cat".into(),
                ..Pet::default()
            },
            Pet {
                name: "Rex".into(),
                picture: "dog".into(),
                ..Pet::default()
            },
        ],
        subscription_status: SubscriptionStatus::Premium,
        ..User::default()
    }
}

pub fn lyla() -> User {
    User {
        user_id: 44,
        name: "Lyla Doe".into(),
        quote: "This is Lyla's world, you just live in it".into(),
        pets: vec![Pet {
            name: "Tiny".into(),
            height_in_meters: 0.05,
            picture: "🐁".into(),
        }],
        subscription_status: SubscriptionStatus::Free,
    }
}

pub fn tarzan() -> User {
    User {
        user_id: 123,
        name: "Tarzan".into(),
        quote: "AAAAaAaAaAyAAAAaAaAaAyAAAAaAaAaA".into(),
        pets: vec![Pet {
            name: "Cheeta".into(),
            height_in_meters: 1.67,
            picture: "🐒".into(),
        }],
        subscription_status: SubscriptionStatus::TrialStartTime(Timestamp::from_unix_millis(
            1_743_592_409_000,
        )),
    }
}

// ===========================================================================
// shapes.skir, two generations of the same schema
// ===========================================================================

pub mod v1 {
    use super::*;

    /// `struct Shape { name: string; sides: int32; color: Color; }`
    #[derive(Clone, Debug, Default)]
    pub struct Shape {
        pub name: String,
        pub sides: i32,
        pub color: Color,
    }

    impl StructType for Shape {
        fn descriptor() -> &'static StructDescriptor<Self> {
            static DESCRIPTOR: Lazy<StructDescriptor<Shape>> = Lazy::new(|| {
                StructDescriptor::<Shape>::new("shapes.skir", "Shape")
                    .field("name", 0, |r| &r.name, |r| &mut r.name)
                    .field("sides", 1, |r| &r.sides, |r| &mut r.sides)
                    .field("color", 2, |r| &r.color, |r| &mut r.color)
            });
            &DESCRIPTOR
        }
    }

    impl_struct!(Shape);

    /// `enum Color { RED; GREEN; custom: string; }`
    #[derive(Clone, Debug, Default)]
    pub enum Color {
        #[default]
        Unknown,
        Red,
        Green,
        Custom(String),
    }

    impl EnumType for Color {
        fn descriptor() -> &'static EnumDescriptor<Self> {
            static DESCRIPTOR: Lazy<EnumDescriptor<Color>> = Lazy::new(|| {
                EnumDescriptor::<Color>::new("shapes.skir", "Color")
                    .constant("RED", 1, || Color::Red)
                    .constant("GREEN", 2, || Color::Green)
                    .wrapper(
                        "custom",
                        3,
                        Color::Custom,
                        |e| match e {
                            Color::Custom(v) => Some(v),
                            _ => None,
                        },
                        |e| match e {
                            Color::Custom(v) => Some(v),
                            _ => None,
                        },
                    )
            });
            &DESCRIPTOR
        }

        fn variant_number(&self) -> u32 {
            match self {
                Color::Unknown => 0,
                Color::Red => 1,
                Color::Green => 2,
                Color::Custom(_) => 3,
            }
        }
    }

    impl_enum!(Color);
}

pub mod v2 {
    use super::*;

    /// `name` renamed to `title`, `sides` removed, `area` and `thumbnail`
    /// added.
    #[derive(Clone, Debug, Default)]
    pub struct Shape {
        pub title: String,
        pub color: Color,
        pub area: f64,
        pub thumbnail: ByteString,
    }

    impl StructType for Shape {
        fn descriptor() -> &'static StructDescriptor<Self> {
            static DESCRIPTOR: Lazy<StructDescriptor<Shape>> = Lazy::new(|| {
                StructDescriptor::<Shape>::new("shapes.skir", "Shape")
                    .field("title", 0, |r| &r.title, |r| &mut r.title)
                    .removed(1)
                    .field("color", 2, |r| &r.color, |r| &mut r.color)
                    .field("area", 3, |r| &r.area, |r| &mut r.area)
                    .field("thumbnail", 4, |r| &r.thumbnail, |r| &mut r.thumbnail)
            });
            &DESCRIPTOR
        }
    }

    impl_struct!(Shape);

    /// `GREEN` removed, `BLUE` and `rgb` added.
    #[derive(Clone, Debug, Default)]
    pub enum Color {
        #[default]
        Unknown,
        Red,
        Custom(String),
        Blue,
        Rgb(i32),
    }

    impl EnumType for Color {
        fn descriptor() -> &'static EnumDescriptor<Self> {
            static DESCRIPTOR: Lazy<EnumDescriptor<Color>> = Lazy::new(|| {
                EnumDescriptor::<Color>::new("shapes.skir", "Color")
                    .constant("RED", 1, || Color::Red)
                    .removed(2)
                    .wrapper(
                        "custom",
                        3,
                        Color::Custom,
                        |e| match e {
                            Color::Custom(v) => Some(v),
                            _ => None,
                        },
                        |e| match e {
                            Color::Custom(v) => Some(v),
                            _ => None,
                        },
                    )
                    .constant("BLUE", 4, || Color::Blue)
                    .wrapper(
                        "rgb",
                        5,
                        Color::Rgb,
                        |e| match e {
                            Color::Rgb(v) => Some(v),
                            _ => None,
                        },
                        |e| match e {
                            Color::Rgb(v) => Some(v),
                            _ => None,
                        },
                    )
            });
            &DESCRIPTOR
        }

        fn variant_number(&self) -> u32 {
            match self {
                Color::Unknown => 0,
                Color::Red => 1,
                Color::Custom(_) => 3,
                Color::Blue => 4,
                Color::Rgb(_) => 5,
            }
        }
    }

    impl_enum!(Color);
}
