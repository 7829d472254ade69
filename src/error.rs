use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;

/// HTTP method type, re-exported for use with error inspection.
pub use reqwest::Method;
/// HTTP status code type, re-exported for use with error inspection.
pub use reqwest::StatusCode;
use reqwest::header;

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// A request parameter could not be percent-encoded
    Encoding,
    /// DNS, connect, timeout, read or malformed-URL failure. No partial body is ever returned.
    Transport,
    /// The response was not valid JSON, or ended without the expected field
    Protocol,
    /// The server answered with a non-successful HTTP status
    Status,
    /// The call needs a token or API key that the session does not hold
    NotAuthenticated,
    /// Error related to invalid caller input
    Validation,
}

#[derive(Debug)]
pub struct Error {
    kind: Kind,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    backtrace: Backtrace,
}

impl Error {
    pub fn with_source<S: StdError + Send + Sync + 'static>(kind: Kind, source: S) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
            backtrace: Backtrace::capture(),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    pub fn inner(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        let e = self.source.as_deref()?;
        e.downcast_ref::<E>()
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Validation {
            reason: message.into(),
        }
        .into()
    }

    pub fn status<S: Into<String>>(
        status_code: StatusCode,
        method: Method,
        path: String,
        message: S,
    ) -> Self {
        Status {
            status_code,
            method,
            path,
            message: message.into(),
        }
        .into()
    }

    pub fn syntax<S: Into<String>>(offset: usize, reason: S) -> Self {
        Syntax {
            offset,
            reason: reason.into(),
        }
        .into()
    }

    #[must_use]
    pub fn missing_field(field: &'static str) -> Self {
        MissingField { field }.into()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(src) => write!(f, "{:?}: {}", self.kind, src),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

#[non_exhaustive]
#[derive(Debug)]
pub struct Status {
    pub status_code: StatusCode,
    pub method: Method,
    pub path: String,
    /// Raw response body, kept for diagnostics
    pub message: String,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error({}) making {} call to {} with {}",
            self.status_code, self.method, self.path, self.message
        )
    }
}

impl StdError for Status {}

#[non_exhaustive]
#[derive(Debug)]
pub struct Validation {
    pub reason: String,
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid: {}", self.reason)
    }
}

impl StdError for Validation {}

/// Malformed JSON, or a reader call that does not match the next token.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct Syntax {
    /// Byte offset into the response text
    pub offset: usize,
    pub reason: String,
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed JSON at offset {}: {}", self.offset, self.reason)
    }
}

impl StdError for Syntax {}

/// The response stream ended before the named field was found.
///
/// An application-level error returned by the server in place of the expected payload
/// surfaces the same way.
#[non_exhaustive]
#[derive(Debug, Clone, Copy)]
pub struct MissingField {
    pub field: &'static str,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "response does not contain field `{}`", self.field)
    }
}

impl StdError for MissingField {}

/// What the session was missing when a call was attempted.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Requirement {
    /// Mutating calls carry the bearer token obtained from `authenticate` or `renew`
    #[strum(serialize = "token")]
    Token,
    /// Read-only calls carry the API key remembered by `authenticate`/`renew` or set in `Config`
    #[strum(serialize = "API key")]
    ApiKey,
}

#[non_exhaustive]
#[derive(Debug, Clone, Copy)]
pub struct NotAuthenticated {
    pub requirement: Requirement,
}

impl fmt::Display for NotAuthenticated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "session has no {}, call authenticate first",
            self.requirement
        )
    }
}

impl StdError for NotAuthenticated {}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::with_source(Kind::Transport, e)
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::with_source(Kind::Transport, e)
    }
}

impl From<header::InvalidHeaderValue> for Error {
    fn from(e: header::InvalidHeaderValue) -> Self {
        Error::with_source(Kind::Validation, e)
    }
}

impl From<serde_html_form::ser::Error> for Error {
    fn from(e: serde_html_form::ser::Error) -> Self {
        Error::with_source(Kind::Encoding, e)
    }
}

impl From<Validation> for Error {
    fn from(err: Validation) -> Self {
        Error::with_source(Kind::Validation, err)
    }
}

impl From<Status> for Error {
    fn from(err: Status) -> Self {
        Error::with_source(Kind::Status, err)
    }
}

impl From<Syntax> for Error {
    fn from(err: Syntax) -> Self {
        Error::with_source(Kind::Protocol, err)
    }
}

impl From<MissingField> for Error {
    fn from(err: MissingField) -> Self {
        Error::with_source(Kind::Protocol, err)
    }
}

impl From<NotAuthenticated> for Error {
    fn from(err: NotAuthenticated) -> Self {
        Error::with_source(Kind::NotAuthenticated, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display_should_include_body() {
        let status = Status {
            status_code: StatusCode::BAD_GATEWAY,
            method: Method::POST,
            path: "/Auth".to_owned(),
            message: "upstream down".to_owned(),
        };

        assert_eq!(
            status.to_string(),
            "error(502 Bad Gateway) making POST call to /Auth with upstream down"
        );
    }

    #[test]
    fn missing_field_should_be_protocol_error() {
        let error = Error::missing_field("token");

        assert_eq!(error.kind(), Kind::Protocol);
        assert_eq!(
            error.downcast_ref::<MissingField>().map(|e| e.field),
            Some("token")
        );
        assert!(error.to_string().contains("`token`"));
    }

    #[test]
    fn syntax_should_carry_offset() {
        let error = Error::syntax(7, "unexpected character 'x'");

        assert_eq!(error.kind(), Kind::Protocol);
        let syntax = error.downcast_ref::<Syntax>().unwrap();
        assert_eq!(syntax.offset, 7);
        assert_eq!(
            syntax.to_string(),
            "malformed JSON at offset 7: unexpected character 'x'"
        );
    }

    #[test]
    fn not_authenticated_display_should_name_requirement() {
        let error: Error = NotAuthenticated {
            requirement: Requirement::ApiKey,
        }
        .into();

        assert_eq!(error.kind(), Kind::NotAuthenticated);
        assert_eq!(
            error.to_string(),
            "NotAuthenticated: session has no API key, call authenticate first"
        );
    }
}
