use std::net::SocketAddr;
use std::sync::Arc;

use postflop_advisor::board::BoardType;
use postflop_advisor::game::{Action, ActionDecision};
use postflop_advisor::preflop::RangeChart;
use postflop_advisor::rules::RulesDocument;
use postflop_advisor::session::{HandState, HandStatus};
use postflop_advisor::snapshot::{HandSnapshot, HandTier};
use postflop_advisor::web::{self, ClassifyResponse};
use reqwest::{Client, StatusCode};
use serde_json::json;
use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep};

async fn spawn_server() -> anyhow::Result<(String, JoinHandle<()>)> {
    let rules = Arc::new(RulesDocument::embedded()?);
    let chart = Arc::new(RangeChart::embedded()?);
    let app = web::router(rules, chart);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    sleep(Duration::from_millis(25)).await;
    Ok((format!("http://{}", addr), server))
}

#[tokio::test]
async fn stateless_endpoints_answer() -> anyhow::Result<()> {
    let (base_url, server) = spawn_server().await?;
    let client = Client::builder().build()?;

    let health = client.get(format!("{}/healthz", base_url)).send().await?;
    assert_eq!(health.text().await?, "ok");

    let decision: ActionDecision = client
        .post(format!("{}/api/decide", base_url))
        .json(&json!({
            "pos": "OOP",
            "street": "FLOP",
            "boardType": "NEUTRO_SECO",
            "handTier": "MUY_FUERTE"
        }))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(decision.action, Action::CheckRaise);
    assert_eq!(decision.rule_id.as_deref(), Some("OOP_F_MONSTER_XR"));

    let snapshot: HandSnapshot = client
        .post(format!("{}/api/snapshot", base_url))
        .json(&json!({"hero": ["Qs", "Jh"], "board": ["9d", "7d", "8d", "5d", "Jc"]}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(snapshot.hand_tier, HandTier::Fuerte);
    assert_eq!(snapshot.outs, 0);

    let classified: ClassifyResponse = client
        .post(format!("{}/api/classify", base_url))
        .json(&json!({"flop": ["As", "Kd", "Qc"]}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(classified.board_type, BoardType::OfensivoCoord);

    let short = client
        .post(format!("{}/api/classify", base_url))
        .json(&json!({"flop": ["As", "Kd"]}))
        .send()
        .await?;
    assert_eq!(short.status(), StatusCode::BAD_REQUEST);

    server.abort();
    let _ = server.await;
    Ok(())
}

#[tokio::test]
async fn snapshot_is_total_over_short_boards() -> anyhow::Result<()> {
    let (base_url, server) = spawn_server().await?;
    let client = Client::builder().build()?;
    let url = format!("{}/api/snapshot", base_url);

    let empty: HandSnapshot = client
        .post(&url)
        .json(&json!({"hero": ["As", "Ah"], "board": []}))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(empty.hand_tier, HandTier::Aire);
    assert_eq!(empty.outs, 0);
    assert_eq!(empty.made_category, None);

    let partial = client
        .post(&url)
        .json(&json!({"hero": ["As", "Ah"], "board": ["Kd"]}))
        .send()
        .await?;
    assert_eq!(partial.status(), StatusCode::OK);

    let duplicate = client
        .post(&url)
        .json(&json!({"hero": ["As", "Ah"], "board": ["As", "7d", "2c"]}))
        .send()
        .await?;
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);

    let six = client
        .post(&url)
        .json(&json!({"hero": ["As", "Ah"], "board": ["2c", "3c", "4c", "5c", "6c", "7c"]}))
        .send()
        .await?;
    assert_eq!(six.status(), StatusCode::BAD_REQUEST);

    server.abort();
    let _ = server.await;
    Ok(())
}

#[tokio::test]
async fn hand_flow_deals_street_by_street() -> anyhow::Result<()> {
    let (base_url, server) = spawn_server().await?;
    let client = Client::builder().build()?;

    let mut state: HandState = client
        .post(format!("{}/api/hands", base_url))
        .json(&json!({
            "hero": ["As", "Ad"],
            "heroSeat": "CO",
            "villainProfile": "BAD"
        }))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(state.status, HandStatus::AwaitingFlop);
    let board_url = format!("{}/api/hands/{}/board", base_url, state.hand_id);

    let wrong_count = client
        .post(&board_url)
        .json(&json!({"cards": ["Ac", "7h"]}))
        .send()
        .await?;
    assert_eq!(wrong_count.status(), StatusCode::BAD_REQUEST);

    for cards in [json!(["Ac", "7h", "2d"]), json!(["9s"]), json!(["3c"])] {
        state = client
            .post(&board_url)
            .json(&json!({ "cards": cards }))
            .send()
            .await?
            .json()
            .await?;
    }
    assert_eq!(state.status, HandStatus::Complete);
    assert_eq!(state.streets.len(), 3);
    assert_eq!(
        state.streets[0].decision.rule_id.as_deref(),
        Some("IP_F_OF_SECO")
    );

    let past_river = client
        .post(&board_url)
        .json(&json!({"cards": ["4c"]}))
        .send()
        .await?;
    assert_eq!(past_river.status(), StatusCode::CONFLICT);

    let fetched: HandState = client
        .get(format!("{}/api/hands/{}", base_url, state.hand_id))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(fetched.streets.len(), 3);

    let missing = client
        .get(format!("{}/api/hands/{}", base_url, uuid::Uuid::new_v4()))
        .send()
        .await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    server.abort();
    let _ = server.await;
    Ok(())
}
