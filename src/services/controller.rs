use std::sync::Arc;

use tokio::{sync::Mutex, task::AbortHandle, time::sleep};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    catalog::CreatureCatalog,
    config::BoardSettings,
    dto::sse::SeededSlot,
    services::{batch, pairs, presentation::PresentationAdapter},
    state::{
        board::Visibility,
        state_machine::{
            Activation, BoardStateMachine, CompletionTicket, MismatchTicket, SeedError, Snapshot,
        },
    },
};

const EMPTY_DEAL_MESSAGE: &str = "Could not fetch any creatures. Please try again.";

/// How a deal ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealOutcome {
    /// Cards were bound to the grid.
    Seeded { pairs_in_play: usize },
    /// No creature could be fetched; the board waits for a replay.
    Failed,
    /// A newer deal started before this one finished loading.
    Superseded,
}

struct SessionCore {
    machine: BoardStateMachine,
    timers: Vec<AbortHandle>,
}

impl SessionCore {
    fn abort_timers(&mut self) {
        for timer in self.timers.drain(..) {
            timer.abort();
        }
    }

    fn track(&mut self, timer: AbortHandle) {
        self.timers.retain(|handle| !handle.is_finished());
        self.timers.push(timer);
    }
}

/// Sole owner of one session's board state machine.
///
/// Every transition and the notifications it produces happen under one lock, so
/// clicks never interleave with an in-flight resolution.
pub struct BoardController {
    id: Uuid,
    settings: BoardSettings,
    catalog: Arc<dyn CreatureCatalog>,
    adapter: Arc<dyn PresentationAdapter>,
    core: Mutex<SessionCore>,
}

impl BoardController {
    /// Controller for an idle board; nothing is fetched until the first deal.
    pub fn new(
        id: Uuid,
        settings: BoardSettings,
        catalog: Arc<dyn CreatureCatalog>,
        adapter: Arc<dyn PresentationAdapter>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            settings,
            catalog,
            adapter,
            core: Mutex::new(SessionCore {
                machine: BoardStateMachine::new(settings.card_count),
                timers: Vec::new(),
            }),
        })
    }

    /// Consistent view of the board, taken under the session lock.
    pub async fn snapshot(&self) -> Snapshot {
        self.core.lock().await.machine.snapshot()
    }

    /// Fetch, pair, shuffle and seed a fresh deal.
    ///
    /// Any previous deal is discarded immediately; its timers are aborted and its
    /// late results are ignored.
    pub async fn start_new_deal(&self) -> DealOutcome {
        let ticket = {
            let mut core = self.core.lock().await;
            core.abort_timers();
            let ticket = core.machine.begin_deal();
            self.adapter.on_loading_state_changed(true);
            self.adapter.on_match_count_changed(0);
            ticket
        };
        info!(session = %self.id, epoch = ticket.epoch, "dealing new board");

        let creatures = batch::fetch_many(self.catalog.as_ref(), self.settings.total_pairs()).await;
        let deck = pairs::build_shuffled_pairs(&creatures, &mut rand::rng());

        let mut core = self.core.lock().await;
        match core.machine.seed(ticket, deck) {
            Ok(pairs_in_play) => {
                let slots = core
                    .machine
                    .board()
                    .slots()
                    .iter()
                    .map(|slot| SeededSlot {
                        index: slot.index(),
                        creature: slot.creature().cloned(),
                    })
                    .collect();
                self.adapter.on_loading_state_changed(false);
                self.adapter.on_slots_seeded(slots);
                info!(session = %self.id, epoch = ticket.epoch, pairs_in_play, "board ready");
                DealOutcome::Seeded { pairs_in_play }
            }
            Err(SeedError::EmptyDeck) => {
                self.adapter.on_loading_state_changed(false);
                self.adapter.on_fatal_error(EMPTY_DEAL_MESSAGE);
                warn!(session = %self.id, epoch = ticket.epoch, "deal produced no creatures");
                DealOutcome::Failed
            }
            Err(err) => {
                debug!(session = %self.id, error = %err, "discarding stale deal");
                DealOutcome::Superseded
            }
        }
    }

    /// Reset the session and deal again, from any phase.
    pub async fn request_replay(&self) -> DealOutcome {
        info!(session = %self.id, "replay requested");
        self.start_new_deal().await
    }

    /// Apply a click on `index` and notify the presentation layer.
    pub async fn handle_slot_activated(self: &Arc<Self>, index: usize) -> Activation {
        let mut core = self.core.lock().await;
        let activation = core.machine.activate(index);

        match &activation {
            Activation::Ignored(reason) => {
                debug!(session = %self.id, slot = index, ?reason, "ignored slot activation");
            }
            Activation::FirstPick { slot } => {
                self.adapter
                    .on_slot_visibility_changed(*slot, Visibility::Revealed);
            }
            Activation::Matched {
                slots,
                matched_pairs,
                completion,
            } => {
                self.adapter
                    .on_slot_visibility_changed(slots[1], Visibility::Revealed);
                for slot in slots {
                    self.adapter
                        .on_slot_visibility_changed(*slot, Visibility::Matched);
                }
                self.adapter.on_match_count_changed(*matched_pairs);
                if let Some(ticket) = completion {
                    let timer = self.schedule_completion(*ticket);
                    core.track(timer);
                }
            }
            Activation::Mismatched { slots, ticket } => {
                self.adapter
                    .on_slot_visibility_changed(slots[1], Visibility::Revealed);
                let timer = self.schedule_mismatch(*ticket);
                core.track(timer);
            }
            Activation::Discarded { slots } => {
                for slot in slots {
                    self.adapter
                        .on_slot_visibility_changed(*slot, Visibility::Hidden);
                }
            }
        }

        activation
    }

    /// Abort outstanding timers; used when the session is dropped.
    pub async fn shutdown(&self) {
        self.core.lock().await.abort_timers();
    }

    fn schedule_mismatch(self: &Arc<Self>, ticket: MismatchTicket) -> AbortHandle {
        let controller = Arc::clone(self);
        let delay = self.settings.mismatch_delay;
        tokio::spawn(async move {
            sleep(delay).await;
            let mut core = controller.core.lock().await;
            match core.machine.resolve_mismatch(ticket) {
                Some(slots) => {
                    for slot in slots {
                        controller
                            .adapter
                            .on_slot_visibility_changed(slot, Visibility::Hidden);
                    }
                }
                None => debug!(session = %controller.id, epoch = ticket.epoch, "stale mismatch timer"),
            }
        })
        .abort_handle()
    }

    fn schedule_completion(self: &Arc<Self>, ticket: CompletionTicket) -> AbortHandle {
        let controller = Arc::clone(self);
        let delay = self.settings.completion_delay;
        tokio::spawn(async move {
            sleep(delay).await;
            let mut core = controller.core.lock().await;
            if core.machine.complete(ticket) {
                info!(session = %controller.id, epoch = ticket.epoch, "board complete");
                controller.adapter.on_game_complete();
            } else {
                debug!(session = %controller.id, epoch = ticket.epoch, "stale completion timer");
            }
        })
        .abort_handle()
    }
}
