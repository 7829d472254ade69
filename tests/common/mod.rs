#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    reason = "Do not need additional syntax for setting up tests, and https://github.com/rust-lang/rust-clippy/issues/13981"
)]
#![allow(
    unused,
    reason = "Deeply nested uses in sub-modules are falsely flagged as being unused"
)]

use httpmock::Method::POST;
use httpmock::MockServer;
use playbasis_client_sdk::auth::Credentials;
use playbasis_client_sdk::{Client, Config};
use reqwest::StatusCode;
use serde_json::json;

pub const API_KEY: &str = "abc123key";
pub const API_SECRET: &str = "s3cr&t=value";
pub const TOKEN: &str = "tok_0123456789";

/// Body the client sends to `Auth` for [`credentials`].
pub const AUTH_BODY: &str = "api_key=abc123key&api_secret=s3cr%26t%3Dvalue";

#[must_use]
pub fn credentials() -> Credentials {
    Credentials::new(API_KEY.to_owned(), API_SECRET.to_owned())
}

pub fn create_client(server: &MockServer) -> anyhow::Result<Client> {
    Ok(Client::new(&server.base_url(), Config::default())?)
}

/// A client whose session already holds [`TOKEN`] and [`API_KEY`].
pub async fn create_authenticated(server: &MockServer) -> anyhow::Result<Client> {
    let client = create_client(server)?;

    let mut mock = server.mock(|when, then| {
        when.method(POST).path("/Auth").body(AUTH_BODY);
        then.status(StatusCode::OK).json_body(json!({
            "success": true,
            "error_code": "0000",
            "message": "Success",
            "response": {
                "token": TOKEN,
                "date_expire": "2030-01-01 00:00:00"
            }
        }));
    });

    client.authenticate(&credentials()).await?;
    mock.assert();
    mock.delete();

    Ok(client)
}

/// The standard success envelope around `response`.
#[must_use]
pub fn envelope(response: serde_json::Value) -> serde_json::Value {
    json!({
        "success": true,
        "error_code": "0000",
        "message": "Success",
        "response": response,
        "timestamp": 1_700_000_000,
        "time": "2023-11-14 22:13:20 Asia/Bangkok"
    })
}
