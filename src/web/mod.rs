use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use itertools::Itertools;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::advisor::{AdviseError, validate_cards};
use crate::board::{self, BoardType};
use crate::cards::Card;
use crate::config::AdvisorConfig;
use crate::context::DecisionContext;
use crate::game::{ActionDecision, Street};
use crate::preflop::RangeChart;
use crate::rules::{RulesDocument, select};
use crate::session::{HandSession, HandState, NewHand, SessionError};
use crate::snapshot::{HandSnapshot, build_snapshot};

#[derive(Clone)]
pub struct AppState {
    rules: Arc<RulesDocument>,
    chart: Arc<RangeChart>,
    hands: Arc<RwLock<HashMap<Uuid, Arc<Mutex<HandSession>>>>>,
}

impl AppState {
    pub fn new(rules: Arc<RulesDocument>, chart: Arc<RangeChart>) -> Self {
        Self {
            rules,
            chart,
            hands: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn insert_hand(&self, hand: HandSession) -> Arc<Mutex<HandSession>> {
        let id = hand.id();
        let entry = Arc::new(Mutex::new(hand));
        self.hands.write().insert(id, entry.clone());
        entry
    }

    fn get_hand(&self, id: &Uuid) -> Option<Arc<Mutex<HandSession>>> {
        self.hands.read().get(id).cloned()
    }
}

#[derive(Debug, Deserialize)]
struct SnapshotRequest {
    hero: Vec<Card>,
    board: Vec<Card>,
}

#[derive(Debug, Deserialize)]
struct ClassifyRequest {
    flop: Vec<Card>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyResponse {
    pub board_type: BoardType,
}

#[derive(Debug, Deserialize)]
struct DealRequest {
    cards: Vec<Card>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error("hand not found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Folded | SessionError::Complete => ApiError::Conflict(err.to_string()),
            SessionError::DuplicateCard(_) | SessionError::WrongCardCount { .. } => {
                ApiError::BadRequest(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub async fn serve(addr: SocketAddr, config: &AdvisorConfig) -> Result<()> {
    let rules = config.load_rules()?;
    let chart = Arc::new(config.load_ranges()?);
    let app = router(rules, chart);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "advisor API listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/decide", post(decide))
        .route("/snapshot", post(snapshot))
        .route("/classify", post(classify))
        .route("/hands", post(start_hand))
        .route("/hands/:id", get(fetch_hand))
        .route("/hands/:id/board", post(deal_board));

    Router::new()
        .route("/healthz", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn router(rules: Arc<RulesDocument>, chart: Arc<RangeChart>) -> Router {
    build_router(AppState::new(rules, chart))
}

async fn health() -> &'static str {
    "ok"
}

async fn decide(
    State(state): State<AppState>,
    Json(context): Json<DecisionContext>,
) -> Json<ActionDecision> {
    Json(select(&state.rules, &context))
}

async fn snapshot(Json(req): Json<SnapshotRequest>) -> Result<Json<HandSnapshot>, ApiError> {
    if req.hero.len() > 2 {
        return Err(ApiError::BadRequest(format!(
            "hero holds at most 2 cards, got {}",
            req.hero.len()
        )));
    }
    if req.board.len() > Street::River.board_len() {
        return Err(ApiError::BadRequest(format!(
            "board holds at most 5 cards, got {}",
            req.board.len()
        )));
    }
    if let Some(card) = req.hero.iter().chain(&req.board).duplicates().next() {
        return Err(ApiError::BadRequest(
            AdviseError::DuplicateCard(*card).to_string(),
        ));
    }
    Ok(Json(build_snapshot(&req.hero, &req.board)))
}

async fn classify(Json(req): Json<ClassifyRequest>) -> Result<Json<ClassifyResponse>, ApiError> {
    let flop: [Card; 3] = req.flop.as_slice().try_into().map_err(|_| {
        ApiError::BadRequest(format!("flop needs 3 cards, got {}", req.flop.len()))
    })?;
    validate_cards(&[], &flop).map_err(|err| ApiError::BadRequest(err.to_string()))?;
    Ok(Json(ClassifyResponse {
        board_type: board::classify(&flop),
    }))
}

async fn start_hand(
    State(state): State<AppState>,
    Json(req): Json<NewHand>,
) -> Result<Json<HandState>, ApiError> {
    let hand = HandSession::new(state.rules.clone(), &state.chart, req)?;
    let entry = state.insert_hand(hand);
    let guard = entry.lock();
    Ok(Json(guard.state()))
}

async fn fetch_hand(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HandState>, ApiError> {
    let entry = state.get_hand(&id).ok_or(ApiError::NotFound)?;
    let hand = entry.lock();
    Ok(Json(hand.state()))
}

async fn deal_board(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DealRequest>,
) -> Result<Json<HandState>, ApiError> {
    let entry = state.get_hand(&id).ok_or(ApiError::NotFound)?;
    let mut hand = entry.lock();
    hand.deal(&req.cards)?;
    Ok(Json(hand.state()))
}
