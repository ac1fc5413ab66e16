use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::{
    dto::sse::{
        FatalErrorEvent, LoadingEvent, MatchCountEvent, ServerEvent, SeededSlot, SlotsSeededEvent,
        VisibilityEvent,
    },
    state::{SseHub, board::Visibility},
};

const EVENT_LOADING: &str = "loading";
const EVENT_SLOTS_SEEDED: &str = "slots.seeded";
const EVENT_SLOT_VISIBILITY: &str = "slot.visibility";
const EVENT_MATCH_COUNT: &str = "match_count";
const EVENT_GAME_COMPLETE: &str = "game.complete";
const EVENT_ERROR: &str = "error";

/// Callbacks the board controller uses to reflect its state in a UI.
///
/// Implementations are invoked while the session lock is held and must not block.
pub trait PresentationAdapter: Send + Sync {
    /// A deal started (`true`) or finished loading (`false`).
    fn on_loading_state_changed(&self, loading: bool);
    /// The grid was bound to a new deal; unbound positions carry no creature.
    fn on_slots_seeded(&self, slots: Vec<SeededSlot>);
    /// A card flipped or was matched.
    fn on_slot_visibility_changed(&self, slot: usize, visibility: Visibility);
    /// The matched-pair counter changed.
    fn on_match_count_changed(&self, count: usize);
    /// Every pair in play has been found.
    fn on_game_complete(&self);
    /// The deal cannot be played; the user should be offered a replay.
    fn on_fatal_error(&self, message: &str);
}

/// Adapter that forwards every callback as a named event on a session SSE hub.
pub struct SseAdapter {
    hub: Arc<SseHub>,
}

impl SseAdapter {
    /// Adapter publishing on `hub`.
    pub fn new(hub: Arc<SseHub>) -> Self {
        Self { hub }
    }

    fn send(&self, event: &str, payload: &impl Serialize) {
        match ServerEvent::json(Some(event.to_string()), payload) {
            Ok(event) => self.hub.broadcast(event),
            Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
        }
    }
}

impl PresentationAdapter for SseAdapter {
    fn on_loading_state_changed(&self, loading: bool) {
        self.send(EVENT_LOADING, &LoadingEvent { loading });
    }

    fn on_slots_seeded(&self, slots: Vec<SeededSlot>) {
        self.send(EVENT_SLOTS_SEEDED, &SlotsSeededEvent { slots });
    }

    fn on_slot_visibility_changed(&self, slot: usize, visibility: Visibility) {
        self.send(EVENT_SLOT_VISIBILITY, &VisibilityEvent { slot, visibility });
    }

    fn on_match_count_changed(&self, count: usize) {
        self.send(EVENT_MATCH_COUNT, &MatchCountEvent { count });
    }

    fn on_game_complete(&self) {
        self.hub
            .broadcast(ServerEvent::new(Some(EVENT_GAME_COMPLETE.to_string()), "{}"));
    }

    fn on_fatal_error(&self, message: &str) {
        self.send(
            EVENT_ERROR,
            &FatalErrorEvent {
                message: message.to_string(),
                retryable: true,
            },
        );
    }
}
