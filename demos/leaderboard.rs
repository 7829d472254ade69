//! Prints the top players by a point type using a read-only API key.
//!
//! ```sh
//! PLAYBASIS_API_KEY=... cargo run --example leaderboard -- exp 10
//! ```

use playbasis_client_sdk::reader::TokenKind;
use playbasis_client_sdk::{API_KEY_VAR, Client, Config, DEFAULT_HOST};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let ranked_by = args.next().unwrap_or_else(|| "exp".to_owned());
    let limit = args.next().map(|l| l.parse()).transpose()?.unwrap_or(10);

    let config = Config::builder().api_key(std::env::var(API_KEY_VAR)?).build();
    let client = Client::new(DEFAULT_HOST, config)?;

    let response = client.rank(&ranked_by, limit).await?;
    let mut reader = response.reader();

    if !reader.find_name("response")? || reader.peek()? != TokenKind::BeginArray {
        anyhow::bail!("unexpected leaderboard shape: {}", response.body());
    }

    reader.begin_array()?;
    let mut position = 1;
    while reader.has_next()? {
        let mut player_id = String::new();
        let mut score = String::new();

        reader.begin_object()?;
        while reader.has_next()? {
            let name = reader.next_name()?;
            if name == "player_id" {
                player_id = reader.next_string()?;
            } else if name == ranked_by {
                score = reader.next_scalar()?.to_string();
            } else {
                reader.skip_value()?;
            }
        }
        reader.end_object()?;

        println!("{position:>3}. {player_id:<24} {score}");
        position += 1;
    }
    reader.end_array()?;

    Ok(())
}
