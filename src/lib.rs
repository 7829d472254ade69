#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod auth;
pub mod client;
pub mod error;
pub mod reader;
pub mod transport;
pub mod types;

pub use client::{Client, Config};

use serde::Serialize;

use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Production API host.
pub const DEFAULT_HOST: &str = "https://api.pbapp.net/";

/// Environment variable read by [`auth::Credentials::from_env`] for the API key.
pub const API_KEY_VAR: &str = "PLAYBASIS_API_KEY";

/// Environment variable read by [`auth::Credentials::from_env`] for the API secret.
pub const API_SECRET_VAR: &str = "PLAYBASIS_API_SECRET";

/// Trait for converting request types to `application/x-www-form-urlencoded` text.
///
/// This trait is automatically implemented for all types that implement [`Serialize`].
/// It uses [`serde_html_form`] so every value is percent-encoded on its own before the pairs
/// are joined, and keeps the field order of the struct. Sequences are serialized as repeated
/// keys (`key=val1&key=val2`).
pub trait ToForm: Serialize {
    /// Returns the encoded pairs without a leading `?`, or an empty string when no field is
    /// set. Fails with [`error::Kind::Encoding`] when a value cannot be encoded.
    fn to_form(&self) -> Result<String> {
        serde_html_form::to_string(self).map_err(|e| {
            #[cfg(feature = "tracing")]
            tracing::error!("Unable to convert to URL-encoded string {e:?}");
            Error::from(e)
        })
    }
}

impl<T: Serialize + ?Sized> ToForm for T {}

/// Joins already-encoded form fragments with `&`, skipping empty ones.
pub(crate) fn join_form(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("&")
}
