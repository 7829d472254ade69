//! One HTTP(S) exchange per call: GET when there is no body, form-encoded POST otherwise.
//!
//! [`Transport`] is the seam the [`crate::Client`] talks through. [`HttpTransport`] is the
//! `reqwest` implementation used by default; tests and embedders can supply their own.

#![expect(
    clippy::module_name_repetitions,
    reason = "HttpTransport reads better than Http at call sites"
)]

use std::fmt;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client as ReqwestClient, Method, StatusCode};
use url::Url;

use crate::Result;
use crate::client::Config;
use crate::error::Error;

pub(crate) const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// How server certificates are checked on `https` hosts.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrustPolicy {
    /// Validate the certificate chain against the system roots and check the hostname.
    #[default]
    Verify,
    /// Accept any certificate chain and any hostname.
    ///
    /// Only meant for development servers with self-signed certificates. Anyone on the
    /// network path can read and alter traffic, including the API secret and token.
    AcceptInvalidCertificates,
}

/// The full result of a successful round trip.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exchange {
    pub status: StatusCode,
    pub body: String,
}

impl Exchange {
    #[must_use]
    pub fn new(status: StatusCode, body: String) -> Self {
        Self { status, body }
    }
}

/// Performs a single request and reads the whole response body.
///
/// Implementations must not retry and must never return a partially read body: any failure
/// is reported as an error of [`crate::error::Kind::Transport`] (or [`crate::error::Kind::Status`]
/// for non-successful responses).
#[async_trait]
pub trait Transport: fmt::Debug + Send + Sync {
    /// Sends `body` as a form-encoded POST when present, otherwise issues a GET.
    async fn send(&self, url: Url, body: Option<String>) -> Result<Exchange>;
}

/// [`Transport`] backed by a [`reqwest::Client`].
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: ReqwestClient,
}

impl HttpTransport {
    /// Builds the underlying HTTP client from the timeout, trust policy and user agent in
    /// `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(USER_AGENT, HeaderValue::from_str(config.user_agent())?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, */*"));

        let mut builder = ReqwestClient::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout());

        if config.trust_policy() == TrustPolicy::AcceptInvalidCertificates {
            #[cfg(feature = "tracing")]
            tracing::warn!("certificate validation is disabled for this client");
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            level = "debug",
            skip(self, body),
            fields(
                method = tracing::field::Empty,
                path = url.path(),
                status_code
            )
        )
    )]
    async fn send(&self, url: Url, body: Option<String>) -> Result<Exchange> {
        let path = url.path().to_owned();
        let request = match body {
            Some(body) => self
                .client
                .request(Method::POST, url)
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(body),
            None => self.client.request(Method::GET, url),
        }
        .build()?;
        let method = request.method().clone();

        #[cfg(feature = "tracing")]
        tracing::Span::current().record("method", method.as_str());

        let response = self.client.execute(request).await.inspect_err(|e| {
            #[cfg(feature = "tracing")]
            tracing::warn!(method = %method, path = %path, error = %e, "request failed");
            #[cfg(not(feature = "tracing"))]
            let _: &reqwest::Error = e;
        })?;
        let status_code = response.status();

        #[cfg(feature = "tracing")]
        tracing::Span::current().record("status_code", status_code.as_u16());

        if !status_code.is_success() {
            let message = response.text().await.unwrap_or_default();

            #[cfg(feature = "tracing")]
            tracing::warn!(
                status = %status_code,
                method = %method,
                path = %path,
                message = %message,
                "API request failed"
            );

            return Err(Error::status(status_code, method, path, message));
        }

        let body = response.text().await?;
        Ok(Exchange::new(status_code, body))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn trust_policy_should_default_to_verify() {
        assert_eq!(TrustPolicy::default(), TrustPolicy::Verify);
        assert_eq!(Config::default().trust_policy(), TrustPolicy::Verify);
    }

    #[test]
    fn transport_should_build_for_each_policy() {
        for policy in [TrustPolicy::Verify, TrustPolicy::AcceptInvalidCertificates] {
            let config = Config::builder()
                .trust_policy(policy)
                .timeout(Duration::from_secs(1))
                .build();
            HttpTransport::new(&config).unwrap();
        }
    }

    #[test]
    fn invalid_user_agent_should_fail() {
        let config = Config::builder().user_agent("bad\nagent").build();

        let error = HttpTransport::new(&config).unwrap_err();

        assert_eq!(error.kind(), crate::error::Kind::Validation);
    }
}
