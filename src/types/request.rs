//! Request types for the operations that take optional fields.
//!
//! All request types use the [`bon`](https://docs.rs/bon) crate for the builder pattern.
//! Unset optional fields are left out of the encoded form entirely. Every value is encoded on
//! its own, so callers pass plain text and never pre-escape anything.

#![allow(
    clippy::module_name_repetitions,
    reason = "Request suffix is intentional for clarity"
)]

use bon::Builder;
use serde::Serialize;
use serde_with::skip_serializing_none;

use super::{Gender, NaiveDate};

/// Fields for `Player/{id}/register`.
///
/// # Example
///
/// ```
/// use playbasis_client_sdk::types::request::RegisterRequest;
///
/// let request = RegisterRequest::builder()
///     .username("jdoe")
///     .email("jdoe@example.com")
///     .image("https://example.com/jdoe.png")
///     .first_name("Jane")
///     .build();
/// ```
#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct RegisterRequest {
    #[builder(into)]
    pub username: String,
    #[builder(into)]
    pub email: String,
    /// URL of the player's profile image.
    #[builder(into)]
    pub image: String,
    #[builder(into)]
    pub facebook_id: Option<String>,
    #[builder(into)]
    pub twitter_id: Option<String>,
    /// Expected to be hashed already; it is sent as given.
    #[builder(into)]
    pub password: Option<String>,
    #[builder(into)]
    pub first_name: Option<String>,
    #[builder(into)]
    pub last_name: Option<String>,
    #[builder(into)]
    pub nickname: Option<String>,
    pub gender: Option<Gender>,
    /// Sent as `YYYY-MM-DD`.
    pub birth_date: Option<NaiveDate>,
}

/// Fields for `Player/{id}/update`. Only the fields that are set are changed.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Builder, Serialize)]
#[non_exhaustive]
pub struct UpdatePlayerRequest {
    #[builder(into)]
    pub username: Option<String>,
    #[builder(into)]
    pub email: Option<String>,
    #[builder(into)]
    pub image: Option<String>,
    pub exp: Option<u64>,
    pub level: Option<u32>,
    #[builder(into)]
    pub facebook_id: Option<String>,
    #[builder(into)]
    pub twitter_id: Option<String>,
    /// Expected to be hashed already; it is sent as given.
    #[builder(into)]
    pub password: Option<String>,
    #[builder(into)]
    pub first_name: Option<String>,
    #[builder(into)]
    pub last_name: Option<String>,
    #[builder(into)]
    pub nickname: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
}

/// Triggers the rule engine for an action performed by a player (`Engine/rule`).
///
/// # Example
///
/// ```
/// use playbasis_client_sdk::types::request::RuleRequest;
///
/// // Custom-point reward rule
/// let request = RuleRequest::builder()
///     .player_id("player-1")
///     .action("like")
///     .url("https://example.com/post/42")
///     .reward("coin")
///     .quantity(5)
///     .build();
/// ```
#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct RuleRequest {
    #[builder(into)]
    pub player_id: String,
    #[builder(into)]
    pub action: String,
    /// URL or filter string, for actions that are not global.
    #[builder(into)]
    pub url: Option<String>,
    /// Name of the custom-point reward to give.
    #[builder(into)]
    pub reward: Option<String>,
    /// Amount of the custom-point reward to give.
    pub quantity: Option<u64>,
}

/// Redeems goods for a player (`Redeem/goods`).
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct RedeemGoodsRequest {
    #[builder(into)]
    pub goods_id: String,
    #[builder(into)]
    pub player_id: String,
    #[builder(default = 1)]
    pub amount: u32,
}

/// Paging for `Player/{id}/point_history`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Builder, Serialize)]
#[non_exhaustive]
pub struct PointHistoryRequest {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    /// Restrict the history to one point type.
    #[builder(into)]
    pub point_name: Option<String>,
}

/// Paging for `Service/recent_point`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Builder, Serialize)]
#[non_exhaustive]
pub struct RecentPointRequest {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    /// Restrict the feed to one point type.
    #[builder(into)]
    pub point_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PlayerIdParam<'id> {
    pub(crate) player_id: &'id str,
}

#[derive(Debug, Serialize)]
pub(crate) struct PlayerListParam {
    /// Comma separated player ids.
    pub(crate) list_player_id: String,
}
