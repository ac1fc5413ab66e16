use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::session::{
        ActivationResponse, BoardResponse, CreateSessionRequest, DealStatus, SessionSummary,
    },
    error::AppError,
    services::session_service,
    state::SharedState,
};

/// Routes driving a board: session lifecycle, dealing and slot activation.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_board).delete(delete_session))
        .route("/sessions/{id}/deal", post(deal))
        .route("/sessions/{id}/replay", post(replay))
        .route("/sessions/{id}/slots/{index}/activate", post(activate_slot))
}

/// Open a session with an empty board.
#[utoipa::path(
    post,
    path = "/sessions",
    tag = "session",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created", body = SessionSummary),
        (status = 400, description = "Invalid card count"),
        (status = 503, description = "Session limit reached")
    )
)]
pub async fn create_session(
    State(state): State<SharedState>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionSummary>), AppError> {
    payload.validate()?;
    let summary = session_service::create_session(&state, payload)?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// Current board; face-down cards do not reveal their creature.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    tag = "session",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Board snapshot", body = BoardResponse),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn get_board(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BoardResponse>, AppError> {
    Ok(Json(session_service::get_board(&state, id).await?))
}

/// Close a session and cancel its pending timers.
#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    tag = "session",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 204, description = "Session deleted"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn delete_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    session_service::delete_session(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fetch a fresh batch of creatures and seed the board.
#[utoipa::path(
    post,
    path = "/sessions/{id}/deal",
    tag = "session",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Outcome of the deal", body = DealStatus),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn deal(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DealStatus>, AppError> {
    Ok(Json(session_service::start_deal(&state, id).await?))
}

/// Abandon the current game and deal again.
#[utoipa::path(
    post,
    path = "/sessions/{id}/replay",
    tag = "session",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Outcome of the new deal", body = DealStatus),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn replay(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DealStatus>, AppError> {
    Ok(Json(session_service::replay(&state, id).await?))
}

/// Flip a card. Clicks the board cannot accept are reported as ignored, not rejected.
#[utoipa::path(
    post,
    path = "/sessions/{id}/slots/{index}/activate",
    tag = "session",
    params(
        ("id" = Uuid, Path, description = "Session identifier"),
        ("index" = usize, Path, description = "Zero-based slot position")
    ),
    responses(
        (status = 200, description = "What the click did", body = ActivationResponse),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn activate_slot(
    State(state): State<SharedState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<ActivationResponse>, AppError> {
    Ok(Json(
        session_service::activate_slot(&state, id, index).await?,
    ))
}
