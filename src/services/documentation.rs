use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the creature memory backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::session::create_session,
        crate::routes::session::get_board,
        crate::routes::session::delete_session,
        crate::routes::session::deal,
        crate::routes::session::replay,
        crate::routes::session::activate_slot,
        crate::routes::sse::session_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::session::CreateSessionRequest,
            crate::dto::session::SessionSummary,
            crate::dto::session::BoardResponse,
            crate::dto::session::SlotView,
            crate::dto::session::ActivationResponse,
            crate::dto::session::ActivationKind,
            crate::dto::session::DealStatus,
            crate::dto::phase::VisibleBoardPhase,
            crate::dto::sse::Handshake,
            crate::dto::sse::LoadingEvent,
            crate::dto::sse::SeededSlot,
            crate::dto::sse::SlotsSeededEvent,
            crate::dto::sse::VisibilityEvent,
            crate::dto::sse::MatchCountEvent,
            crate::dto::sse::FatalErrorEvent,
            crate::state::creature::Creature,
            crate::state::creature::BaseStats,
            crate::state::board::Visibility,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "session", description = "Board sessions and card activation"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
