use serde::Serialize;
use utoipa::ToSchema;

use crate::state::{board::Visibility, creature::Creature};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Build an event from an already serialised data field.
    pub fn new(event: Option<String>, data: impl Into<String>) -> Self {
        Self {
            event,
            data: data.into(),
        }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a deal starts or stops loading.
pub struct LoadingEvent {
    pub loading: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
/// One grid position and the creature bound to it, if any.
pub struct SeededSlot {
    pub index: usize,
    pub creature: Option<Creature>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast once a deal has been bound to the grid.
pub struct SlotsSeededEvent {
    pub slots: Vec<SeededSlot>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever a card flips or is matched.
pub struct VisibilityEvent {
    pub slot: usize,
    pub visibility: Visibility,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the matched-pair counter changes.
pub struct MatchCountEvent {
    pub count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a deal cannot be played; the client should offer a replay.
pub struct FatalErrorEvent {
    pub message: String,
    pub retryable: bool,
}
