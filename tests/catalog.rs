mod common;

use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use playbasis_client_sdk::{Client, Config};
use reqwest::StatusCode;
use serde_json::json;

use crate::common::{API_KEY, TOKEN, create_authenticated, envelope};

mod badge {
    use super::*;

    #[tokio::test]
    async fn badges_should_use_preset_api_key() -> anyhow::Result<()> {
        let server = MockServer::start();
        let config = Config::builder().api_key("read-only").build();
        let client = Client::new(&server.base_url(), config)?;

        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/Badge")
                .query_param("api_key", "read-only");
            then.status(StatusCode::OK).json_body(envelope(json!({
                "badges": [
                    { "badge_id": "b1", "name": "Early Bird", "hint": "Log in before 7am" },
                    { "badge_id": "b2", "name": "Night Owl", "hint": null }
                ]
            })));
        });

        let response = client.badges().await?;

        mock.assert();
        let mut reader = response.reader();
        let mut names = Vec::new();
        while reader.find_name("name")? {
            names.push(reader.next_string()?);
        }
        assert_eq!(names, ["Early Bird", "Night Owl"]);
        assert!(!client.is_authenticated());

        Ok(())
    }

    #[tokio::test]
    async fn badge_should_hit_id_path() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = create_authenticated(&server).await?;

        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/Badge/b1")
                .query_param("api_key", API_KEY);
            then.status(StatusCode::OK).json_body(envelope(json!({})));
        });

        client.badge("b1").await?;

        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn claim_and_redeem_should_post_token_only() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = create_authenticated(&server).await?;

        let claim = server.mock(|when, then| {
            when.method(POST)
                .path("/Player/p-1/badge/b1/claim")
                .query_param_missing("api_key")
                .body(format!("token={TOKEN}"));
            then.status(StatusCode::OK).json_body(envelope(json!(null)));
        });
        let redeem = server.mock(|when, then| {
            when.method(POST)
                .path("/Player/p-1/badge/b1/redeem")
                .body(format!("token={TOKEN}"));
            then.status(StatusCode::OK).json_body(envelope(json!(null)));
        });

        client.claim_badge("p-1", "b1").await?;
        client.redeem_badge("p-1", "b1").await?;

        claim.assert();
        redeem.assert();

        Ok(())
    }
}

mod goods {
    use playbasis_client_sdk::types::request::RedeemGoodsRequest;

    use super::*;

    #[tokio::test]
    async fn goods_should_hit_their_paths() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = create_authenticated(&server).await?;

        let list = server.mock(|when, then| {
            when.method(GET).path("/Goods").query_param("api_key", API_KEY);
            then.status(StatusCode::OK)
                .json_body(envelope(json!({ "goods_list": [] })));
        });
        let info = server.mock(|when, then| {
            when.method(GET).path("/Goods/g-7").query_param("api_key", API_KEY);
            then.status(StatusCode::OK)
                .json_body(envelope(json!({ "goods": { "goods_id": "g-7" } })));
        });

        client.goods_list().await?;
        client.goods_info("g-7").await?;

        list.assert();
        info.assert();

        Ok(())
    }

    #[tokio::test]
    async fn redeem_goods_should_send_each_field() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = create_authenticated(&server).await?;

        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/Redeem/goods")
                .body(format!("token={TOKEN}&goods_id=g-7&player_id=p-1&amount=2"));
            then.status(StatusCode::OK).json_body(envelope(json!({
                "events": [{ "event_type": "GOODS_RECEIVED", "value": 2 }]
            })));
        });

        let request = RedeemGoodsRequest::builder()
            .goods_id("g-7")
            .player_id("p-1")
            .amount(2)
            .build();
        let response = client.redeem_goods(&request).await?;

        mock.assert();
        let mut reader = response.reader();
        assert!(reader.find_name("event_type")?);
        assert_eq!(reader.next_string()?, "GOODS_RECEIVED");

        Ok(())
    }
}

mod engine {
    use playbasis_client_sdk::types::request::RuleRequest;

    use super::*;

    #[tokio::test]
    async fn action_config_should_get() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = create_authenticated(&server).await?;

        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/Engine/actionConfig")
                .query_param("api_key", API_KEY);
            then.status(StatusCode::OK).json_body(envelope(json!([])));
        });

        client.action_config().await?;

        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn rule_should_encode_url_value() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = create_authenticated(&server).await?;

        let mock = server.mock(|when, then| {
            when.method(POST).path("/Engine/rule").body(format!(
                "token={TOKEN}&player_id=p-1&action=read\
                 &url=https%3A%2F%2Fexample.com%2Fa%3Fb%3Dc%26d%3De&reward=coin&quantity=3"
            ));
            then.status(StatusCode::OK).json_body(envelope(json!({
                "events": [
                    { "event_type": "REWARD_RECEIVED", "reward_type": "coin", "value": 3 },
                    { "event_type": "LEVEL_UP", "value": 2 }
                ]
            })));
        });

        let request = RuleRequest::builder()
            .player_id("p-1")
            .action("read")
            .url("https://example.com/a?b=c&d=e")
            .reward("coin")
            .quantity(3)
            .build();
        let response = client.rule(&request).await?;

        mock.assert();
        let mut reader = response.reader();
        let mut events = Vec::new();
        while reader.find_name("event_type")? {
            events.push(reader.next_string()?);
        }
        assert_eq!(events, ["REWARD_RECEIVED", "LEVEL_UP"]);

        Ok(())
    }
}

mod quest {
    use super::*;

    #[tokio::test]
    async fn quest_catalog_should_hit_their_paths() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = create_authenticated(&server).await?;

        let paths = ["/Quest", "/Quest/q-1", "/Quest/q-1/mission/m-2"];
        let mocks = paths.map(|path| {
            server.mock(|when, then| {
                when.method(GET).path(path).query_param("api_key", API_KEY);
                then.status(StatusCode::OK).json_body(envelope(json!({})));
            })
        });

        client.quests().await?;
        client.quest("q-1").await?;
        client.mission("q-1", "m-2").await?;

        for mock in mocks {
            mock.assert();
        }

        Ok(())
    }

    #[tokio::test]
    async fn availability_should_send_player_id() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = create_authenticated(&server).await?;

        let all = server.mock(|when, then| {
            when.method(GET)
                .path("/Quest/available")
                .query_param("api_key", API_KEY)
                .query_param("player_id", "p-1");
            then.status(StatusCode::OK).json_body(envelope(json!({})));
        });
        let one = server.mock(|when, then| {
            when.method(GET)
                .path("/Quest/q-1/available")
                .query_param("player_id", "p-1");
            then.status(StatusCode::OK)
                .json_body(envelope(json!({ "events_missions": [] })));
        });

        client.quests_available("p-1").await?;
        client.quest_available("q-1", "p-1").await?;

        all.assert();
        one.assert();

        Ok(())
    }

    #[tokio::test]
    async fn join_and_cancel_should_post_player_id() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = create_authenticated(&server).await?;

        let join = server.mock(|when, then| {
            when.method(POST)
                .path("/Quest/q-1/join")
                .body(format!("token={TOKEN}&player_id=p-1"));
            then.status(StatusCode::OK).json_body(envelope(json!(null)));
        });
        let cancel = server.mock(|when, then| {
            when.method(POST)
                .path("/Quest/q-1/cancel")
                .body(format!("token={TOKEN}&player_id=p-1"));
            then.status(StatusCode::OK).json_body(envelope(json!(null)));
        });

        client.join_quest("q-1", "p-1").await?;
        client.cancel_quest("q-1", "p-1").await?;

        join.assert();
        cancel.assert();

        Ok(())
    }
}

mod service {
    use playbasis_client_sdk::types::request::RecentPointRequest;

    use super::*;

    #[tokio::test]
    async fn recent_point_should_send_paging() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = create_authenticated(&server).await?;

        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/Service/recent_point")
                .query_param("api_key", API_KEY)
                .query_param("offset", "0")
                .query_param("limit", "50")
                .query_param_missing("point_name");
            then.status(StatusCode::OK)
                .json_body(envelope(json!({ "points": [] })));
        });

        let request = RecentPointRequest::builder().offset(0).limit(50).build();
        client.recent_point(&request).await?;

        mock.assert();

        Ok(())
    }
}
