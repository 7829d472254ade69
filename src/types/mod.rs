//! Request and response types for the Playbasis API, plus re-exported external types.
//!
//! - **Request types** ([`request`]): builder-pattern structs for the operations that take
//!   optional fields, e.g. [`request::RegisterRequest`] or [`request::RuleRequest`].
//! - **Response types** ([`response`]): the [`response::Response`] returned by every call and
//!   typed views that read common shapes out of it.
//!
//! ```
//! use playbasis_client_sdk::types::{Gender, NaiveDate};
//! use playbasis_client_sdk::types::request::RegisterRequest;
//!
//! let request = RegisterRequest::builder()
//!     .username("jdoe")
//!     .email("jdoe@example.com")
//!     .image("https://example.com/jdoe.png")
//!     .gender(Gender::Female)
//!     .birth_date(NaiveDate::from_ymd_opt(1990, 1, 31).expect("valid date"))
//!     .build();
//! ```

use serde_repr::Serialize_repr;
use strum_macros::Display;

pub mod request;
pub mod response;

/// Calendar date type used for `birth_date`, sent as `YYYY-MM-DD`.
pub use chrono::NaiveDate;
/// HTTP status code carried by every [`response::Response`].
pub use reqwest::StatusCode;

/// Player gender as encoded by the service.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Serialize_repr)]
#[repr(u8)]
pub enum Gender {
    Male = 1,
    Female = 2,
}
