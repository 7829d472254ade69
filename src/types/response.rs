//! The raw response of every call and typed views over it.
//!
//! Field presence varies per endpoint, so there is no single response schema. A call returns
//! a [`Response`]; the caller either walks it with [`Response::reader`] or reads one of the
//! small views below with [`Response::view`].
//!
//! Most endpoints answer with an envelope of this shape:
//!
//! ```json
//! {
//!   "success": true,
//!   "error_code": "0000",
//!   "message": "Success",
//!   "response": { "...": "..." },
//!   "timestamp": 1700000000,
//!   "time": "2023-11-14 22:13:20 Asia/Bangkok"
//! }
//! ```

#![allow(
    clippy::module_name_repetitions,
    reason = "Response types intentionally mirror the module name"
)]

use bon::Builder;
use secrecy::SecretString;

use crate::Result;
use crate::error::Error;
use crate::reader::{JsonReader, TokenKind};
use crate::types::StatusCode;

/// The body of a successful exchange, held in memory and read on demand.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    body: String,
}

impl Response {
    #[must_use]
    pub fn new(status: StatusCode, body: String) -> Self {
        Self { status, body }
    }

    /// HTTP status of the exchange. Always a success code; other codes surface as
    /// [`crate::error::Kind::Status`] errors.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The raw body text, for diagnostics.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// A reader positioned at the start of the body. Each call starts a fresh pass.
    #[must_use]
    pub fn reader(&self) -> JsonReader<'_> {
        JsonReader::new(&self.body)
    }

    /// Reads a typed view from a fresh pass over the body.
    pub fn view<T: FromReader>(&self) -> Result<T> {
        T::from_reader(&mut self.reader())
    }

    /// Shorthand for `view::<Envelope>()`.
    pub fn envelope(&self) -> Result<Envelope> {
        self.view()
    }
}

/// A typed view read from a [`JsonReader`].
pub trait FromReader: Sized {
    fn from_reader(reader: &mut JsonReader<'_>) -> Result<Self>;
}

/// The status fields of the standard envelope. The payload under `response` is skipped.
#[non_exhaustive]
#[derive(Clone, Debug, Default, PartialEq, Eq, Builder)]
pub struct Envelope {
    #[builder(default)]
    pub success: bool,
    #[builder(into)]
    pub error_code: Option<String>,
    #[builder(into)]
    pub message: Option<String>,
    /// Server time in seconds since the epoch.
    pub timestamp: Option<i64>,
}

impl FromReader for Envelope {
    fn from_reader(reader: &mut JsonReader<'_>) -> Result<Self> {
        let mut envelope = Envelope::default();

        reader.begin_object()?;
        while reader.has_next()? {
            let name = reader.next_name()?;
            if reader.peek()? == TokenKind::Null {
                reader.next_null()?;
                continue;
            }
            match name.as_str() {
                "success" => {
                    envelope.success = match reader.peek()? {
                        TokenKind::Bool => reader.next_bool()?,
                        _ => matches!(reader.next_string()?.as_str(), "true" | "1"),
                    };
                }
                "error_code" => envelope.error_code = Some(reader.next_string()?),
                "message" => envelope.message = Some(reader.next_string()?),
                "timestamp" => envelope.timestamp = Some(reader.next_i64()?),
                _ => reader.skip_value()?,
            }
        }
        reader.end_object()?;

        Ok(envelope)
    }
}

/// The token issued by `Auth` and `Auth/renew`.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct TokenGrant {
    pub token: SecretString,
    /// Expiry as sent by the server, e.g. `2024-01-31 10:00:00`.
    pub date_expire: Option<String>,
}

impl FromReader for TokenGrant {
    /// Scans the whole stream for the first `token` field; any nesting is accepted. A
    /// `date_expire` met before it, or among its following siblings, is kept as well.
    fn from_reader(reader: &mut JsonReader<'_>) -> Result<Self> {
        let mut date_expire = None;
        let token = loop {
            match reader
                .seek_name(|name| name == "token" || name == "date_expire")?
                .as_deref()
            {
                Some("token") => break SecretString::from(reader.next_string()?),
                Some(_) => date_expire = read_expiry(reader)?,
                None => return Err(Error::missing_field("token")),
            }
        };

        while reader.peek()? == TokenKind::Name {
            if reader.next_name()? == "date_expire" {
                date_expire = read_expiry(reader)?;
            } else {
                reader.skip_value()?;
            }
        }

        Ok(Self { token, date_expire })
    }
}

fn read_expiry(reader: &mut JsonReader<'_>) -> Result<Option<String>> {
    if reader.peek()? == TokenKind::String {
        Ok(Some(reader.next_string()?))
    } else {
        reader.skip_value()?;
        Ok(None)
    }
}

/// A single point balance, e.g. `{"reward_id":"1","reward_name":"exp","value":120}`.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq, Builder)]
pub struct PointBalance {
    #[builder(into)]
    pub reward_id: Option<String>,
    #[builder(into)]
    pub reward_name: String,
    pub value: i64,
}

/// Point balances returned by `Player/{id}/points` (under `points`) and
/// `Player/{id}/point/{name}` (under `point`).
#[non_exhaustive]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerPoints {
    pub points: Vec<PointBalance>,
}

impl FromReader for PlayerPoints {
    fn from_reader(reader: &mut JsonReader<'_>) -> Result<Self> {
        let found = reader.seek_name(|name| name == "points" || name == "point")?;
        if found.is_none() {
            return Err(Error::missing_field("points"));
        }

        let mut points = Vec::new();
        reader.begin_array()?;
        while reader.has_next()? {
            points.push(read_balance(reader)?);
        }
        reader.end_array()?;

        Ok(Self { points })
    }
}

impl PlayerPoints {
    /// Balance of the named point type, if present.
    #[must_use]
    pub fn value_of(&self, reward_name: &str) -> Option<i64> {
        self.points
            .iter()
            .find(|p| p.reward_name == reward_name)
            .map(|p| p.value)
    }
}

fn read_balance(reader: &mut JsonReader<'_>) -> Result<PointBalance> {
    let mut reward_id = None;
    let mut reward_name = None;
    let mut value = None;

    reader.begin_object()?;
    while reader.has_next()? {
        match reader.next_name()?.as_str() {
            "reward_id" if reader.peek()? != TokenKind::Null => {
                reward_id = Some(reader.next_string()?);
            }
            "reward_name" => reward_name = Some(reader.next_string()?),
            "value" => value = Some(reader.next_i64()?),
            _ => reader.skip_value()?,
        }
    }
    reader.end_object()?;

    Ok(PointBalance {
        reward_id,
        reward_name: reward_name.ok_or_else(|| Error::missing_field("reward_name"))?,
        value: value.ok_or_else(|| Error::missing_field("value"))?,
    })
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret as _;

    use super::*;
    use crate::error::{Kind, MissingField};

    fn response(body: &str) -> Response {
        Response::new(StatusCode::OK, body.to_owned())
    }

    #[test]
    fn envelope_should_skip_payload() {
        let response = response(
            r#"{"success":true,"error_code":"0000","message":"Success",
                "response":{"player":{"username":"jdoe","badges":[{"id":1}]}},
                "timestamp":1700000000,"time":"2023-11-14 22:13:20 Asia/Bangkok"}"#,
        );

        let envelope = response.envelope().unwrap();

        assert_eq!(
            envelope,
            Envelope::builder()
                .success(true)
                .error_code("0000")
                .message("Success")
                .timestamp(1_700_000_000)
                .build()
        );
    }

    #[test]
    fn envelope_should_tolerate_failure_shape() {
        let envelope = response(r#"{"success":false,"error_code":"0200","message":null,"response":null}"#)
            .envelope()
            .unwrap();

        assert!(!envelope.success);
        assert_eq!(envelope.error_code.as_deref(), Some("0200"));
        assert_eq!(envelope.message, None);
    }

    #[test]
    fn token_grant_should_read_expiry() {
        let grant: TokenGrant = response(
            r#"{"success":true,"response":{"token":"abc123","date_expire":"2030-01-01 00:00:00"}}"#,
        )
        .view()
        .unwrap();

        assert_eq!(grant.token.expose_secret(), "abc123");
        assert_eq!(grant.date_expire.as_deref(), Some("2030-01-01 00:00:00"));
    }

    #[test]
    fn token_grant_should_read_expiry_before_token() {
        let grant: TokenGrant =
            response(r#"{"response":{"date_expire":"2030-01-01 00:00:00","token":"abc123"}}"#)
                .view()
                .unwrap();

        assert_eq!(grant.token.expose_secret(), "abc123");
        assert_eq!(grant.date_expire.as_deref(), Some("2030-01-01 00:00:00"));
    }

    #[test]
    fn token_grant_missing_should_be_protocol_error() {
        let error = response(r#"{"error":"bad creds"}"#)
            .view::<TokenGrant>()
            .unwrap_err();

        assert_eq!(error.kind(), Kind::Protocol);
        assert_eq!(error.downcast_ref::<MissingField>().unwrap().field, "token");
    }

    #[test]
    fn player_points_should_read_balances() {
        let points: PlayerPoints = response(
            r#"{"success":true,"response":{"points":[
                {"reward_id":"1","reward_name":"exp","value":120},
                {"reward_id":null,"reward_name":"coin","value":"35"}]}}"#,
        )
        .view()
        .unwrap();

        assert_eq!(points.points.len(), 2);
        assert_eq!(points.value_of("exp"), Some(120));
        assert_eq!(points.value_of("coin"), Some(35));
        assert_eq!(points.points[1].reward_id, None);
    }

    #[test]
    fn reader_should_restart_per_call() {
        let response = response(r#"{"a":1}"#);

        let mut first = response.reader();
        first.skip_value().unwrap();

        let mut second = response.reader();
        assert_eq!(second.peek().unwrap(), TokenKind::BeginObject);
    }
}
