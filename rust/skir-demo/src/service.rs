//! Generated from `service.skir`.
//!
//! ```text
//! struct GetUserRequest { user_id: int64; }
//! struct GetUserResponse { user: User?; }
//! method GetUser(GetUserRequest): GetUserResponse;
//!
//! struct AddUserRequest { user: User; }
//! struct AddUserResponse {}
//! method AddUser(AddUserRequest): AddUserResponse;
//! ```

use crate::user::User;
use skir_runtime::__private::Lazy;
use skir_runtime::impl_struct;
use skir_runtime::reflection::{StructDescriptor, StructType};
use skir_runtime::service::Method;

#[derive(Clone, Debug, Default)]
pub struct GetUserRequest {
    pub user_id: i64,
}

impl StructType for GetUserRequest {
    fn descriptor() -> &'static StructDescriptor<Self> {
        static DESCRIPTOR: Lazy<StructDescriptor<GetUserRequest>> = Lazy::new(|| {
            StructDescriptor::<GetUserRequest>::new("service.skir", "GetUserRequest")
                .field("user_id", 0, |r| &r.user_id, |r| &mut r.user_id)
        });
        &DESCRIPTOR
    }
}

impl_struct!(GetUserRequest);

#[derive(Clone, Debug, Default)]
pub struct GetUserResponse {
    pub user: Option<User>,
}

impl StructType for GetUserResponse {
    fn descriptor() -> &'static StructDescriptor<Self> {
        static DESCRIPTOR: Lazy<StructDescriptor<GetUserResponse>> = Lazy::new(|| {
            StructDescriptor::<GetUserResponse>::new("service.skir", "GetUserResponse")
                .field("user", 0, |r| &r.user, |r| &mut r.user)
        });
        &DESCRIPTOR
    }
}

impl_struct!(GetUserResponse);

#[derive(Clone, Debug, Default)]
pub struct AddUserRequest {
    pub user: User,
}

impl StructType for AddUserRequest {
    fn descriptor() -> &'static StructDescriptor<Self> {
        static DESCRIPTOR: Lazy<StructDescriptor<AddUserRequest>> = Lazy::new(|| {
            StructDescriptor::<AddUserRequest>::new("service.skir", "AddUserRequest")
                .field("user", 0, |r| &r.user, |r| &mut r.user)
        });
        &DESCRIPTOR
    }
}

impl_struct!(AddUserRequest);

#[derive(Clone, Debug, Default)]
pub struct AddUserResponse {}

impl StructType for AddUserResponse {
    fn descriptor() -> &'static StructDescriptor<Self> {
        static DESCRIPTOR: Lazy<StructDescriptor<AddUserResponse>> =
            Lazy::new(|| StructDescriptor::<AddUserResponse>::new("service.skir", "AddUserResponse"));
        &DESCRIPTOR
    }
}

impl_struct!(AddUserResponse);

pub const GET_USER: Method<GetUserRequest, GetUserResponse> = Method::new("GetUser", 2_903_424_817);
pub const ADD_USER: Method<AddUserRequest, AddUserResponse> = Method::new("AddUser", 4_124_120_412);
