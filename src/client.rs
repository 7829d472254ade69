//! The Playbasis REST client.
//!
//! # Example
//!
//! ```no_run
//! use playbasis_client_sdk::Client;
//! use playbasis_client_sdk::auth::Credentials;
//! use playbasis_client_sdk::types::request::RuleRequest;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::default();
//! client.authenticate(&Credentials::from_env()?).await?;
//!
//! let rule = RuleRequest::builder().player_id("player-1").action("like").build();
//! let response = client.rule(&rule).await?;
//! println!("{:?}", response.envelope()?);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use bon::Builder;
use serde::Serialize;
use url::Url;

use crate::auth::{Credentials, ExposeSecret as _, SecretString, Session, State};
use crate::error::{Error, NotAuthenticated, Requirement};
use crate::transport::{HttpTransport, Transport, TrustPolicy};
use crate::types::request::{
    PlayerIdParam, PlayerListParam, PointHistoryRequest, RecentPointRequest, RedeemGoodsRequest,
    RegisterRequest, RuleRequest, UpdatePlayerRequest,
};
use crate::types::response::{Response, TokenGrant};
use crate::{DEFAULT_HOST, Result, ToForm as _, join_form};

const DEFAULT_USER_AGENT: &str = concat!("playbasis-client-sdk/", env!("CARGO_PKG_VERSION"));

/// Configuration for [`Client`]
#[non_exhaustive]
#[derive(Clone, Debug, Builder)]
pub struct Config {
    /// Upper bound on a whole request, connect included. Defaults to thirty (30) seconds.
    #[builder(default = Duration::from_secs(30))]
    timeout: Duration,
    /// Upper bound on establishing the connection. Defaults to ten (10) seconds.
    #[builder(default = Duration::from_secs(10))]
    connect_timeout: Duration,
    #[builder(default)]
    trust_policy: TrustPolicy,
    #[builder(into, default = DEFAULT_USER_AGENT.to_owned())]
    user_agent: String,
    /// API key for read-only calls made before (or without) [`Client::authenticate`].
    #[builder(into)]
    api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config::builder().build()
    }
}

impl Config {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    #[must_use]
    pub fn trust_policy(&self) -> TrustPolicy {
        self.trust_policy
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}

/// Client for the Playbasis REST API.
///
/// Cloning is cheap; clones share the connection pool and the session, so a token obtained
/// through one clone is used by all of them.
///
/// Mutating operations (POST) carry the session token and fail with
/// [`crate::error::Kind::NotAuthenticated`] until [`Client::authenticate`] or
/// [`Client::renew`] succeeds. Read-only operations (GET) carry the API key instead.
///
/// Every operation returns the raw [`Response`]; see [`crate::types::response`] for the
/// views available over it.
#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    config: Config,
    /// Base [`Url`] every path is appended to.
    host: Url,
    transport: Arc<dyn Transport>,
    session: Session,
}

impl Default for Client {
    fn default() -> Self {
        Client::new(DEFAULT_HOST, Config::default())
            .expect("Client with default endpoint should succeed")
    }
}

impl Client {
    /// Creates a client for `host` that talks HTTP(S) through `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns an error if `host` is not a base URL or the HTTP client cannot be created.
    pub fn new(host: &str, config: Config) -> Result<Client> {
        let transport = HttpTransport::new(&config)?;
        Self::with_transport(host, config, Arc::new(transport))
    }

    /// Creates a client that sends every request through `transport`.
    pub fn with_transport(
        host: &str,
        config: Config,
        transport: Arc<dyn Transport>,
    ) -> Result<Client> {
        let host = Url::parse(host)?;
        if host.cannot_be_a_base() {
            return Err(Error::validation(format!("{host} cannot be used as a base URL")));
        }

        let session = Session::new(config.api_key.clone());

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                host,
                transport,
                session,
            }),
        })
    }

    #[must_use]
    pub fn host(&self) -> &Url {
        &self.inner.host
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.inner.session.state()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state() == State::Authenticated
    }

    /// The current session token, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.inner.session.token()
    }

    /// The API key sent with read-only calls, if any.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        self.inner.session.api_key()
    }

    /// Exchanges `credentials` for a session token at `Auth`.
    ///
    /// The API key is remembered for read-only calls even if the exchange fails. On failure
    /// the previous token, if any, stays in place.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Kind::Protocol`] when the response carries no `token`, and
    /// [`crate::error::Kind::Transport`] or [`crate::error::Kind::Status`] when the exchange
    /// itself fails.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip_all, fields(host = %self.inner.host))
    )]
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<TokenGrant> {
        self.exchange_token(&["Auth"], credentials).await
    }

    /// Requests a fresh token at `Auth/renew`. Works whether or not the client is currently
    /// authenticated.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip_all, fields(host = %self.inner.host))
    )]
    pub async fn renew(&self, credentials: &Credentials) -> Result<TokenGrant> {
        self.exchange_token(&["Auth", "renew"], credentials).await
    }

    /// Drops the session token. The API key is kept, so read-only calls still work.
    pub fn deauthenticate(&self) {
        self.inner.session.clear();

        #[cfg(feature = "tracing")]
        tracing::debug!("session token cleared");
    }

    async fn exchange_token(
        &self,
        segments: &[&str],
        credentials: &Credentials,
    ) -> Result<TokenGrant> {
        self.inner.session.set_api_key(credentials.api_key());

        let body = credentials.form().to_form()?;
        let response = self.send(self.url(segments, None)?, Some(body)).await?;
        let grant: TokenGrant = response.view().inspect_err(|e| {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %e, "authentication response did not carry a token");
            #[cfg(not(feature = "tracing"))]
            let _: &Error = e;
        })?;

        self.inner.session.grant(grant.token.clone());

        #[cfg(feature = "tracing")]
        tracing::debug!(date_expire = ?grant.date_expire, "session authenticated");

        Ok(grant)
    }

    // Player

    /// Public information of a player.
    pub async fn player(&self, player_id: &str) -> Result<Response> {
        self.post(&["Player", player_id], &()).await
    }

    /// Public and private information of a player.
    pub async fn player_detail(&self, player_id: &str) -> Result<Response> {
        self.post(&["Player", player_id, "data", "all"], &()).await
    }

    /// Basic information of several players at once.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Kind::Validation`] when `player_ids` is empty.
    pub async fn player_list<S: AsRef<str>>(&self, player_ids: &[S]) -> Result<Response> {
        if player_ids.is_empty() {
            return Err(Error::validation("player list must not be empty"));
        }

        let ids: Vec<&str> = player_ids.iter().map(AsRef::as_ref).collect();
        let param = PlayerListParam {
            list_player_id: ids.join(","),
        };
        self.post(&["Player", "list"], &param).await
    }

    pub async fn register(&self, player_id: &str, request: &RegisterRequest) -> Result<Response> {
        self.post(&["Player", player_id, "register"], request).await
    }

    /// Changes the fields set in `request`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Kind::Validation`] when no field is set.
    pub async fn update(&self, player_id: &str, request: &UpdatePlayerRequest) -> Result<Response> {
        if request.to_form()?.is_empty() {
            return Err(Error::validation("update must set at least one field"));
        }

        self.post(&["Player", player_id, "update"], request).await
    }

    pub async fn delete(&self, player_id: &str) -> Result<Response> {
        self.post(&["Player", player_id, "delete"], &()).await
    }

    /// Records a login event for the player.
    pub async fn login(&self, player_id: &str) -> Result<Response> {
        self.post(&["Player", player_id, "login"], &()).await
    }

    /// Records a logout event for the player.
    pub async fn logout(&self, player_id: &str) -> Result<Response> {
        self.post(&["Player", player_id, "logout"], &()).await
    }

    /// Point balances of the player. Readable with [`crate::types::response::PlayerPoints`].
    pub async fn points(&self, player_id: &str) -> Result<Response> {
        self.get(&["Player", player_id, "points"], &()).await
    }

    /// Balance of a single point type. Readable with
    /// [`crate::types::response::PlayerPoints`].
    pub async fn point(&self, player_id: &str, point_name: &str) -> Result<Response> {
        self.get(&["Player", player_id, "point", point_name], &())
            .await
    }

    /// Point history of the player, paged by `offset` and `limit`.
    ///
    /// Sent to `Player/{id}/point_history` with the paging fields and the optional
    /// `point_name` filter in the query. The point name never goes into the path:
    /// `Player/{id}/point/{name}` is the current balance, read by [`Client::point`].
    pub async fn point_history(
        &self,
        player_id: &str,
        request: &PointHistoryRequest,
    ) -> Result<Response> {
        self.get(&["Player", player_id, "point_history"], request)
            .await
    }

    /// Time of the player's most recent action of any kind.
    pub async fn action_last_performed(&self, player_id: &str) -> Result<Response> {
        self.get(&["Player", player_id, "action", "time"], &())
            .await
    }

    pub async fn action_last_performed_time(
        &self,
        player_id: &str,
        action: &str,
    ) -> Result<Response> {
        self.get(&["Player", player_id, "action", action, "time"], &())
            .await
    }

    pub async fn action_performed_count(&self, player_id: &str, action: &str) -> Result<Response> {
        self.get(&["Player", player_id, "action", action, "count"], &())
            .await
    }

    pub async fn badge_owned(&self, player_id: &str) -> Result<Response> {
        self.get(&["Player", player_id, "badge"], &()).await
    }

    /// Leaderboard of `limit` players ranked by the point type `ranked_by`.
    pub async fn rank(&self, ranked_by: &str, limit: u32) -> Result<Response> {
        let limit = limit.to_string();
        self.get(&["Player", "rank", ranked_by, &limit], &()).await
    }

    /// Leaderboards of `limit` players for every point type.
    pub async fn ranks(&self, limit: u32) -> Result<Response> {
        let limit = limit.to_string();
        self.get(&["Player", "ranks", &limit], &()).await
    }

    pub async fn level(&self, level: u32) -> Result<Response> {
        let level = level.to_string();
        self.get(&["Player", "level", &level], &()).await
    }

    pub async fn levels(&self) -> Result<Response> {
        self.get(&["Player", "levels"], &()).await
    }

    pub async fn player_goods(&self, player_id: &str) -> Result<Response> {
        self.get(&["Player", player_id, "goods"], &()).await
    }

    /// Progress of the player in one quest.
    pub async fn quest_of_player(&self, player_id: &str, quest_id: &str) -> Result<Response> {
        self.get(&["Player", "quest", quest_id], &PlayerIdParam { player_id })
            .await
    }

    /// Every quest the player has joined.
    pub async fn quest_list_of_player(&self, player_id: &str) -> Result<Response> {
        self.get(&["Player", "quest"], &PlayerIdParam { player_id })
            .await
    }

    // Badge

    pub async fn badges(&self) -> Result<Response> {
        self.get(&["Badge"], &()).await
    }

    pub async fn badge(&self, badge_id: &str) -> Result<Response> {
        self.get(&["Badge", badge_id], &()).await
    }

    pub async fn claim_badge(&self, player_id: &str, badge_id: &str) -> Result<Response> {
        self.post(&["Player", player_id, "badge", badge_id, "claim"], &())
            .await
    }

    pub async fn redeem_badge(&self, player_id: &str, badge_id: &str) -> Result<Response> {
        self.post(&["Player", player_id, "badge", badge_id, "redeem"], &())
            .await
    }

    // Goods

    pub async fn goods_list(&self) -> Result<Response> {
        self.get(&["Goods"], &()).await
    }

    pub async fn goods_info(&self, goods_id: &str) -> Result<Response> {
        self.get(&["Goods", goods_id], &()).await
    }

    /// Exchanges the player's points or badges for goods.
    pub async fn redeem_goods(&self, request: &RedeemGoodsRequest) -> Result<Response> {
        self.post(&["Redeem", "goods"], request).await
    }

    // Engine

    /// Actions configured for the site and the rules attached to them.
    pub async fn action_config(&self) -> Result<Response> {
        self.get(&["Engine", "actionConfig"], &()).await
    }

    /// Runs the rule engine for an action the player performed; the response lists the
    /// rewards and events it produced.
    pub async fn rule(&self, request: &RuleRequest) -> Result<Response> {
        self.post(&["Engine", "rule"], request).await
    }

    // Quest

    pub async fn quests(&self) -> Result<Response> {
        self.get(&["Quest"], &()).await
    }

    pub async fn quest(&self, quest_id: &str) -> Result<Response> {
        self.get(&["Quest", quest_id], &()).await
    }

    pub async fn mission(&self, quest_id: &str, mission_id: &str) -> Result<Response> {
        self.get(&["Quest", quest_id, "mission", mission_id], &())
            .await
    }

    /// Quests the player may still join.
    pub async fn quests_available(&self, player_id: &str) -> Result<Response> {
        self.get(&["Quest", "available"], &PlayerIdParam { player_id })
            .await
    }

    /// Whether the player may join one quest.
    pub async fn quest_available(&self, quest_id: &str, player_id: &str) -> Result<Response> {
        self.get(&["Quest", quest_id, "available"], &PlayerIdParam { player_id })
            .await
    }

    pub async fn join_quest(&self, quest_id: &str, player_id: &str) -> Result<Response> {
        self.post(&["Quest", quest_id, "join"], &PlayerIdParam { player_id })
            .await
    }

    pub async fn cancel_quest(&self, quest_id: &str, player_id: &str) -> Result<Response> {
        self.post(&["Quest", quest_id, "cancel"], &PlayerIdParam { player_id })
            .await
    }

    // Service

    /// Recent point events across all players of the site.
    pub async fn recent_point(&self, request: &RecentPointRequest) -> Result<Response> {
        self.get(&["Service", "recent_point"], request).await
    }

    /// Token-bearing POST; the body is `token=…` followed by the fields of `params`.
    async fn post<P: Serialize + ?Sized>(&self, segments: &[&str], params: &P) -> Result<Response> {
        let token = self.inner.session.token().ok_or(NotAuthenticated {
            requirement: Requirement::Token,
        })?;

        let token = [("token", token.expose_secret())].to_form()?;
        let params = params.to_form()?;
        let body = join_form(&[&token, &params]);

        self.send(self.url(segments, None)?, Some(body)).await
    }

    /// Read-only GET; the query is `api_key=…` followed by the fields of `params`.
    async fn get<P: Serialize + ?Sized>(&self, segments: &[&str], params: &P) -> Result<Response> {
        let api_key = self.inner.session.api_key().ok_or(NotAuthenticated {
            requirement: Requirement::ApiKey,
        })?;

        let api_key = [("api_key", api_key.as_str())].to_form()?;
        let params = params.to_form()?;
        let query = join_form(&[&api_key, &params]);

        self.send(self.url(segments, Some(&query))?, None).await
    }

    async fn send(&self, url: Url, body: Option<String>) -> Result<Response> {
        let exchange = self.inner.transport.send(url, body).await?;
        Ok(Response::new(exchange.status, exchange.body))
    }

    /// Appends `segments` to the host path, percent-encoding each one on its own.
    ///
    /// Empty, `.` and `..` segments are rejected; URL normalization would otherwise drop or
    /// collapse them and address a different resource.
    fn url(&self, segments: &[&str], query: Option<&str>) -> Result<Url> {
        if let Some(segment) = segments
            .iter()
            .find(|segment| matches!(**segment, "" | "." | ".."))
        {
            return Err(Error::validation(format!(
                "{segment:?} is not a valid path parameter"
            )));
        }

        let mut url = self.inner.host.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::validation(format!("{} cannot be used as a base URL", self.inner.host))
            })?
            .pop_if_empty()
            .extend(segments);
        url.set_query(query.filter(|q| !q.is_empty()));

        Ok(url)
    }
}
