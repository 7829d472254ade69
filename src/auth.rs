use std::sync::{PoisonError, RwLock};

/// Secret string types that redact values in debug output for security.
pub use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use strum_macros::Display;

use crate::error::Error;
use crate::{API_KEY_VAR, API_SECRET_VAR, Result};

/// The API key and secret issued to a Playbasis application. They are exchanged for a bearer
/// token by [`crate::Client::authenticate`] and [`crate::Client::renew`].
#[derive(Clone, Debug)]
pub struct Credentials {
    pub(crate) api_key: String,
    pub(crate) api_secret: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret: SecretString::from(api_secret),
        }
    }

    /// Reads the credentials from `PLAYBASIS_API_KEY` and `PLAYBASIS_API_SECRET`.
    pub fn from_env() -> Result<Self> {
        let read = |name: &str| {
            std::env::var(name).map_err(|e| Error::validation(format!("{name} is not usable: {e}")))
        };

        Ok(Self::new(read(API_KEY_VAR)?, read(API_SECRET_VAR)?))
    }

    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the API secret.
    #[must_use]
    pub fn api_secret(&self) -> &SecretString {
        &self.api_secret
    }

    pub(crate) fn form(&self) -> AuthForm<'_> {
        AuthForm {
            api_key: &self.api_key,
            api_secret: self.api_secret.expose_secret(),
        }
    }
}

/// Body sent to `Auth` and `Auth/renew`.
#[derive(Serialize)]
pub(crate) struct AuthForm<'creds> {
    api_key: &'creds str,
    api_secret: &'creds str,
}

/// Whether the session currently holds a bearer token.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum State {
    Unauthenticated,
    Authenticated,
}

#[derive(Debug, Default)]
struct Inner {
    token: Option<SecretString>,
    api_key: Option<String>,
}

/// The token and API key shared by a client and its clones.
///
/// Every read copies the value out under the lock, so a concurrent `authenticate` is seen
/// either fully or not at all.
#[derive(Debug, Default)]
pub(crate) struct Session {
    inner: RwLock<Inner>,
}

impl Session {
    pub(crate) fn new(api_key: Option<String>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                token: None,
                api_key,
            }),
        }
    }

    pub(crate) fn state(&self) -> State {
        if self.read(|inner| inner.token.is_some()) {
            State::Authenticated
        } else {
            State::Unauthenticated
        }
    }

    pub(crate) fn token(&self) -> Option<SecretString> {
        self.read(|inner| inner.token.clone())
    }

    pub(crate) fn api_key(&self) -> Option<String> {
        self.read(|inner| inner.api_key.clone())
    }

    pub(crate) fn set_api_key(&self, api_key: &str) {
        self.write(|inner| inner.api_key = Some(api_key.to_owned()));
    }

    pub(crate) fn grant(&self, token: SecretString) {
        self.write(|inner| inner.token = Some(token));
    }

    pub(crate) fn clear(&self) {
        self.write(|inner| inner.token = None);
    }

    // A panic while holding the lock cannot leave a half-written token, the fields are
    // replaced whole, so poisoning is ignored.
    fn read<T, F: FnOnce(&Inner) -> T>(&self, f: F) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write<F: FnOnce(&mut Inner)>(&self, f: F) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }
}
