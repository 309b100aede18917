use crate::config::AppConfig;
use crate::session::{InMemorySessionStore, SessionStoreError, SessionStoreRef};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use gemini_chat_core::{ExchangeReducer, Turn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Application state shared with all routes
#[derive(Clone)]
pub struct AppState {
    reducer: Arc<ExchangeReducer>,
    sessions: SessionStoreRef,
}

impl AppState {
    pub fn new(reducer: ExchangeReducer, sessions: SessionStoreRef) -> Self {
        Self {
            reducer: Arc::new(reducer),
            sessions,
        }
    }
}

/// Request model for a new user turn
#[derive(Deserialize)]
pub struct TurnRequest {
    text: String,
}

/// Response model for a finished exchange
#[derive(Serialize)]
pub struct TurnResponse {
    reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// One turn as shown in the scrollback
#[derive(Serialize)]
pub struct TurnView {
    role: String,
    text: Option<String>,
}

impl From<&Turn> for TurnView {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role.display_name().to_string(),
            text: turn.text().map(str::to_string),
        }
    }
}

#[derive(Serialize)]
pub struct TurnsResponse {
    turns: Vec<TurnView>,
}

#[derive(Serialize)]
pub struct SessionCreated {
    id: String,
}

#[derive(Serialize)]
pub struct SessionList {
    sessions: Vec<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Error type for HTTP server
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    InternalError(anyhow::Error),
}

impl From<SessionStoreError> for ApiError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(id) => Self::NotFound(format!("Session not found: {}", id)),
            other => Self::InternalError(other.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::InternalError(e) => {
                error!(error = %e, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Internal server error: {}", e),
                )
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Build the router over the given state
pub fn router(state: AppState) -> Router {
    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route("/sessions", get(list_sessions).post(create_session))
        .route("/sessions/:id", axum::routing::delete(delete_session))
        .route("/sessions/:id/turns", get(list_turns).post(post_turn))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Start the HTTP server
pub async fn run_server(config: AppConfig, reducer: ExchangeReducer) -> anyhow::Result<()> {
    info!("Starting HTTP server on {}", config.http_addr);

    let state = AppState::new(reducer, Arc::new(InMemorySessionStore::new()));
    let app = router(state);

    axum::Server::bind(&config.http_addr)
        .serve(app.into_make_service())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start HTTP server: {}", e))
}

/// Health check handler
async fn health() -> impl IntoResponse {
    "gemini-chat-server is running"
}

async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionCreated>), ApiError> {
    let session = state.sessions.create_session().await?;
    let id = session.lock().await.id.clone();
    info!(session = %id, "Session started");
    Ok((StatusCode::CREATED, Json(SessionCreated { id })))
}

async fn list_sessions(State(state): State<AppState>) -> Result<Json<SessionList>, ApiError> {
    let sessions = state.sessions.list_sessions().await?;
    Ok(Json(SessionList { sessions }))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.sessions.delete_session(&id).await?;
    info!(session = %id, "Session ended");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_turns(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TurnsResponse>, ApiError> {
    let session = state.sessions.get_session(&id).await?;
    let session = session.lock().await;
    let turns = session.turns.all().iter().map(TurnView::from).collect();
    Ok(Json(TurnsResponse { turns }))
}

/// Handler for a new user turn: runs one exchange inside the session
async fn post_turn(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    if payload.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Message text must not be empty".to_string()));
    }

    let session = state.sessions.get_session(&id).await?;
    let mut session = session.lock().await;
    let outcome = state
        .reducer
        .handle_user_turn(&mut session.turns, &payload.text)
        .await;
    session.touch();

    if let Some(notice) = &outcome.notice {
        warn!(session = %id, kind = %notice.kind, "Exchange ended with an error notice");
    }

    Ok(Json(TurnResponse {
        reply: outcome.reply_text().to_string(),
        error: outcome.notice.map(|notice| notice.message),
    }))
}
