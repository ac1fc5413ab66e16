use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use tokio::{
    sync::broadcast,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval},
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dto::{
        session::{ActivationResponse, BoardResponse, CreateSessionRequest, DealStatus, SessionSummary},
        sse::ServerEvent,
    },
    error::ServiceError,
    services::{controller::BoardController, presentation::SseAdapter},
    state::{SessionHandle, SharedState},
};

/// Open a new idle session; the client deals once it is subscribed to the events.
pub fn create_session(
    state: &SharedState,
    request: CreateSessionRequest,
) -> Result<SessionSummary, ServiceError> {
    let limit = state.config().max_sessions;
    if state.sessions().len() >= limit {
        return Err(ServiceError::SessionLimit { limit });
    }

    let settings = match request.card_count {
        Some(card_count) => state.config().board.with_card_count(card_count),
        None => state.config().board,
    };

    let id = Uuid::new_v4();
    let events = state.new_event_hub();
    let adapter = Arc::new(SseAdapter::new(events.clone()));
    let controller = BoardController::new(id, settings, state.catalog(), adapter);
    let created_at = SystemTime::now();

    state.sessions().insert(
        id,
        SessionHandle {
            controller,
            events,
            created_at,
            last_active: Instant::now(),
        },
    );
    info!(session = %id, card_count = settings.card_count, "session created");

    Ok(SessionSummary::new(id, settings.card_count, created_at))
}

fn require_session(state: &SharedState, id: Uuid) -> Result<SessionHandle, ServiceError> {
    state
        .touch_session(id)
        .ok_or_else(|| ServiceError::NotFound(format!("session `{id}` not found")))
}

/// Current board of a session.
pub async fn get_board(state: &SharedState, id: Uuid) -> Result<BoardResponse, ServiceError> {
    let session = require_session(state, id)?;
    let snapshot = session.controller.snapshot().await;
    Ok((id, snapshot).into())
}

/// `startNewDeal()`: fetch, shuffle and seed, waiting for the board to be ready.
pub async fn start_deal(state: &SharedState, id: Uuid) -> Result<DealStatus, ServiceError> {
    let session = require_session(state, id)?;
    Ok(session.controller.start_new_deal().await.into())
}

/// `requestReplay()`: discard the current deal and start over.
pub async fn replay(state: &SharedState, id: Uuid) -> Result<DealStatus, ServiceError> {
    let session = require_session(state, id)?;
    Ok(session.controller.request_replay().await.into())
}

/// `handleSlotActivated(index)`.
pub async fn activate_slot(
    state: &SharedState,
    id: Uuid,
    index: usize,
) -> Result<ActivationResponse, ServiceError> {
    let session = require_session(state, id)?;
    let activation = session.controller.handle_slot_activated(index).await;
    Ok(activation.into())
}

/// Drop a session and abort its timers.
pub async fn delete_session(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let (_, session) = state
        .sessions()
        .remove(&id)
        .ok_or_else(|| ServiceError::NotFound(format!("session `{id}` not found")))?;
    session.controller.shutdown().await;
    let age_secs = session
        .created_at
        .elapsed()
        .map(|age| age.as_secs())
        .unwrap_or_default();
    info!(session = %id, age_secs, "session deleted");
    Ok(())
}

/// Subscribe to the presentation events of a session.
pub fn subscribe(
    state: &SharedState,
    id: Uuid,
) -> Result<broadcast::Receiver<ServerEvent>, ServiceError> {
    let session = require_session(state, id)?;
    let receiver = session.events.subscribe();
    debug!(session = %id, subscribers = session.events.subscriber_count(), "subscribed to session events");
    Ok(receiver)
}

/// Drop every session that has no event subscriber and saw no request within the
/// configured idle timeout. Returns how many were removed.
pub async fn reap_idle_sessions(state: &SharedState) -> usize {
    let timeout = state.config().session_idle_timeout;
    let now = Instant::now();
    let candidates: Vec<Uuid> = state
        .sessions()
        .iter()
        .filter(|entry| entry.value().is_idle(now, timeout))
        .map(|entry| *entry.key())
        .collect();

    let mut reaped = 0;
    for id in candidates {
        // re-checked under the shard lock: a request or subscriber may have arrived
        let Some((_, session)) = state
            .sessions()
            .remove_if(&id, |_, session| session.is_idle(now, timeout))
        else {
            continue;
        };
        session.controller.shutdown().await;
        info!(session = %id, "idle session reaped");
        reaped += 1;
    }
    reaped
}

/// Periodically reap idle sessions so abandoned pages do not exhaust the session limit.
pub fn spawn_session_reaper(state: SharedState) -> JoinHandle<()> {
    let period = (state.config().session_idle_timeout / 4)
        .clamp(Duration::from_secs(1), Duration::from_secs(60));

    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let reaped = reap_idle_sessions(&state).await;
            if reaped > 0 {
                debug!(reaped, remaining = state.sessions().len(), "session sweep finished");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::testing::ScriptedCatalog,
        config::AppConfig,
        dto::{phase::VisibleBoardPhase, session::ActivationKind},
        state::AppState,
    };

    const IDLE: Duration = Duration::from_secs(60);

    fn state(max_sessions: usize) -> SharedState {
        let config = AppConfig {
            max_sessions,
            session_idle_timeout: IDLE,
            ..AppConfig::default()
        };
        AppState::new(config, Arc::new(ScriptedCatalog::new(151)))
    }

    #[tokio::test]
    async fn session_lifecycle() {
        let state = state(4);
        let summary = create_session(&state, CreateSessionRequest { card_count: Some(4) }).unwrap();
        assert_eq!(summary.card_count, 4);
        assert_eq!(summary.total_pairs, 2);

        let board = get_board(&state, summary.id).await.unwrap();
        assert_eq!(board.phase, VisibleBoardPhase::Idle);

        let mut events = subscribe(&state, summary.id).unwrap();
        assert_eq!(
            start_deal(&state, summary.id).await.unwrap(),
            DealStatus::Seeded { pairs_in_play: 2 }
        );
        let first = events.recv().await.unwrap();
        assert_eq!(first.event.as_deref(), Some("loading"));

        let activation = activate_slot(&state, summary.id, 0).await.unwrap();
        assert_eq!(activation.outcome, ActivationKind::FirstPick);

        delete_session(&state, summary.id).await.unwrap();
        assert!(matches!(
            get_board(&state, summary.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn session_limit_is_enforced() {
        let state = state(1);
        create_session(&state, CreateSessionRequest::default()).unwrap();
        let err = create_session(&state, CreateSessionRequest::default()).unwrap_err();
        assert!(matches!(err, ServiceError::SessionLimit { limit: 1 }));
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_sessions_free_their_slot() {
        let state = state(2);
        for _ in 0..2 {
            let summary = create_session(&state, CreateSessionRequest::default()).unwrap();
            drop(subscribe(&state, summary.id).unwrap());
        }
        assert!(matches!(
            create_session(&state, CreateSessionRequest::default()),
            Err(ServiceError::SessionLimit { limit: 2 })
        ));

        tokio::time::advance(IDLE - Duration::from_secs(1)).await;
        assert_eq!(reap_idle_sessions(&state).await, 0);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(reap_idle_sessions(&state).await, 2);
        assert!(state.sessions().is_empty());
        create_session(&state, CreateSessionRequest::default()).unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn listened_or_recently_used_sessions_survive() {
        let state = state(4);
        let listened = create_session(&state, CreateSessionRequest::default()).unwrap();
        let _receiver = subscribe(&state, listened.id).unwrap();
        let used = create_session(&state, CreateSessionRequest::default()).unwrap();
        let abandoned = create_session(&state, CreateSessionRequest::default()).unwrap();

        tokio::time::advance(IDLE / 2).await;
        get_board(&state, used.id).await.unwrap();
        tokio::time::advance(IDLE / 2).await;

        assert_eq!(reap_idle_sessions(&state).await, 1);
        assert!(state.session(listened.id).is_some());
        assert!(state.session(used.id).is_some());
        assert!(state.session(abandoned.id).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn reaper_task_sweeps_in_the_background() {
        let state = state(1);
        create_session(&state, CreateSessionRequest::default()).unwrap();
        let reaper = spawn_session_reaper(state.clone());

        tokio::time::sleep(IDLE * 2).await;
        tokio::task::yield_now().await;

        assert!(state.sessions().is_empty());
        reaper.abort();
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let state = state(1);
        let err = replay(&state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
