//! Sends requests to the user service.
//!
//! ```text
//! cargo run -p skir-demo --bin service_client
//! ```
//!
//! Expects `service_start` to be running, at `SKIR_SERVER_URL` if set.

use skir_demo::service::{AddUserRequest, GetUserRequest, ADD_USER, GET_USER};
use skir_demo::user::User;
use skir_http::{ClientConfig, HttpTransport};
use skir_runtime::service::{invoke_remote, HttpHeaders};
use skir_runtime::to_readable_json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    skir_demo::init_tracing();

    let transport = HttpTransport::from_config(&ClientConfig::from_env());

    let users = [(41, "Jane"), (42, "John"), (43, "Dora")].map(|(user_id, name)| User {
        user_id,
        name: name.to_string(),
        ..User::default()
    });

    for user in users {
        println!("About to add user {}", user.name);
        let result = invoke_remote(
            &transport,
            &ADD_USER,
            &AddUserRequest { user },
            HttpHeaders::new(),
        )
        .await;
        match result {
            Ok(_) => println!("  status: OK"),
            Err(status) => println!("  status: {status}"),
        }
    }

    let request = GetUserRequest { user_id: 43 };
    println!("About to get user with id {}", request.user_id);
    let response = invoke_remote(&transport, &GET_USER, &request, HttpHeaders::new()).await?;
    match response.user {
        Some(user) => println!("Found user: {}", to_readable_json(&user)),
        None => println!("Not found"),
    }

    Ok(())
}
