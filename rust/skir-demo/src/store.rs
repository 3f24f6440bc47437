//! In-memory implementation of the user service.

use crate::service::{
    AddUserRequest, AddUserResponse, GetUserRequest, GetUserResponse, ADD_USER, GET_USER,
};
use crate::user::User;
use parking_lot::Mutex;
use skir_runtime::service::{RegistryError, RequestContext, Service, Status};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default)]
pub struct UserStore {
    users: Mutex<HashMap<i64, User>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_user(&self, request: GetUserRequest) -> Result<GetUserResponse, Status> {
        if request.user_id == 0 {
            return Err(Status::unknown("invalid user id: 0"));
        }
        Ok(GetUserResponse {
            user: self.users.lock().get(&request.user_id).cloned(),
        })
    }

    pub fn add_user(&self, request: AddUserRequest) -> Result<AddUserResponse, Status> {
        let user = request.user;
        info!(user_id = user.user_id, name = %user.name, "adding user");
        self.users.lock().insert(user.user_id, user);
        Ok(AddUserResponse {})
    }

    pub fn len(&self) -> usize {
        self.users.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Registers `GetUser` and `AddUser` against `store`.
pub fn user_service(store: Arc<UserStore>) -> Result<Service, RegistryError> {
    let get_store = store.clone();
    Service::builder()
        .method(&GET_USER, move |request: GetUserRequest, _ctx: RequestContext| {
            let store = get_store.clone();
            async move { store.get_user(request) }
        })
        .method(&ADD_USER, move |request: AddUserRequest, _ctx: RequestContext| {
            let store = store.clone();
            async move { store.add_user(request) }
        })
        .build()
}
