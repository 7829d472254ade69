//! Authenticates, triggers a rule for a player and prints the resulting point balances.
//!
//! Run with tracing enabled:
//! ```sh
//! PLAYBASIS_API_KEY=... PLAYBASIS_API_SECRET=... \
//! RUST_LOG=debug,hyper_util=off,hyper=off,reqwest=off,h2=off,rustls=off \
//! cargo run --example authenticated --features tracing -- player-1 like
//! ```
//!
//! Optionally log to a file:
//! ```sh
//! LOG_FILE=playbasis.log RUST_LOG=debug cargo run --example authenticated --features tracing
//! ```

use std::fs::File;

use playbasis_client_sdk::Client;
use playbasis_client_sdk::auth::Credentials;
use playbasis_client_sdk::types::request::RuleRequest;
use playbasis_client_sdk::types::response::PlayerPoints;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(path) = std::env::var("LOG_FILE") {
        let file = File::create(path)?;
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::fmt::init();
    }

    let mut args = std::env::args().skip(1);
    let player_id = args.next().unwrap_or_else(|| "player-1".to_owned());
    let action = args.next().unwrap_or_else(|| "like".to_owned());

    let client = Client::default();
    let grant = client.authenticate(&Credentials::from_env()?).await?;
    info!(date_expire = ?grant.date_expire, "authenticated");

    let rule = RuleRequest::builder()
        .player_id(player_id.as_str())
        .action(action)
        .build();
    match client.rule(&rule).await {
        Ok(response) => {
            let envelope = response.envelope()?;
            info!(
                endpoint = "rule",
                success = envelope.success,
                message = ?envelope.message
            );
            let mut reader = response.reader();
            while reader.find_name("event_type")? {
                info!(endpoint = "rule", event = %reader.next_string()?);
            }
        }
        Err(e) => debug!(endpoint = "rule", error = %e),
    }

    match client.points(&player_id).await?.view::<PlayerPoints>() {
        Ok(points) => {
            for point in &points.points {
                info!(endpoint = "points", name = %point.reward_name, value = point.value);
            }
        }
        Err(e) => debug!(endpoint = "points", error = %e),
    }

    let renewed = client.renew(&Credentials::from_env()?).await?;
    info!(date_expire = ?renewed.date_expire, "renewed");

    client.deauthenticate();
    info!(state = %client.state(), "done");

    Ok(())
}
