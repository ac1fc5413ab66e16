use thiserror::Error;
use tracing::warn;

use crate::state::{
    board::{Board, Visibility},
    creature::Creature,
};

/// Monotonic deal counter used to discard stale asynchronous completions.
pub type Epoch = u64;

/// High-level phases a board can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardPhase {
    /// No deal has been started yet.
    Idle,
    /// Creatures are being fetched for the current deal.
    Loading,
    /// Waiting for the first pick.
    Ready,
    /// One card is revealed and waiting for its partner.
    AwaitingSecondPick,
    /// The final pair was matched; completion is shown after a short delay.
    ResolvingMatch,
    /// Two different cards are shown; input is locked until they flip back.
    ResolvingMismatch,
    /// Every pair in play has been matched.
    Complete,
    /// The deal produced no cards; waiting for a replay.
    DealFailed,
}

/// Proof that a deal was started for a given epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DealTicket {
    /// Deal the ticket belongs to.
    pub epoch: Epoch,
}

/// Handle for the delayed flip-back of a mismatched pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MismatchTicket {
    /// Deal the mismatch happened in.
    pub epoch: Epoch,
    /// The two face-up cards to hide again.
    pub slots: [usize; 2],
}

/// Handle for the delayed transition into [`BoardPhase::Complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionTicket {
    /// Deal whose last pair was matched.
    pub epoch: Epoch,
}

/// Why a slot activation had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    /// The board is not accepting picks in its current phase.
    NotPlayable(BoardPhase),
    /// A mismatched pair is still showing.
    InputLocked,
    /// The index is outside the grid.
    OutOfRange,
    /// The slot never received a creature.
    Unbound,
    /// The slot is already face up (this includes picking the same card twice).
    AlreadyRevealed,
    /// The slot belongs to an already matched pair.
    AlreadyMatched,
}

/// Result of activating a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Nothing changed.
    Ignored(IgnoredReason),
    /// The slot is now the sole pending selection.
    FirstPick { slot: usize },
    /// Both slots hold the same creature and are now matched.
    Matched {
        slots: [usize; 2],
        matched_pairs: usize,
        completion: Option<CompletionTicket>,
    },
    /// The slots differ; they flip back once `ticket` is resolved.
    Mismatched { slots: [usize; 2], ticket: MismatchTicket },
    /// Local state was inconsistent; both slots were hidden again.
    Discarded { slots: [usize; 2] },
}

/// Errors returned when seeding a deal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedError {
    /// A newer deal started while this one was loading.
    #[error("deal {got} is stale (current deal is {current})")]
    StaleDeal { current: Epoch, got: Epoch },
    /// The board is not waiting for cards.
    #[error("board is not loading (phase {0:?})")]
    NotLoading(BoardPhase),
    /// Every creature fetch failed.
    #[error("no creatures could be fetched for this deal")]
    EmptyDeck,
}

/// Snapshot of one slot for presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSnapshot {
    /// Grid position.
    pub index: usize,
    /// Current face of the card.
    pub visibility: Visibility,
    /// Whether a creature was dealt to this position.
    pub bound: bool,
    /// Only present while the card is face up.
    pub creature: Option<Creature>,
}

/// Snapshot of the whole board state.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Current phase.
    pub phase: BoardPhase,
    /// Current deal.
    pub epoch: Epoch,
    /// Pairs found so far.
    pub matched_pairs: usize,
    /// `CARD_COUNT / 2`.
    pub total_pairs: usize,
    /// Pairs actually dealt; the game completes once all of them are matched.
    pub pairs_in_play: usize,
    /// Set while a mismatched pair is still face up.
    pub input_locked: bool,
    /// Face-up, unresolved picks in pick order.
    pub pending: Vec<usize>,
    /// Every grid position.
    pub slots: Vec<SlotSnapshot>,
}

/// Pairing state machine for one session.
///
/// Every mutation happens through `&mut self`, so callers serialise access with a
/// single lock and never observe a half-applied transition.
#[derive(Debug, Clone)]
pub struct BoardStateMachine {
    card_count: usize,
    board: Board,
    phase: BoardPhase,
    epoch: Epoch,
    pending: [Option<usize>; 2],
    input_locked: bool,
    matched_pairs: usize,
    pairs_in_play: usize,
}

impl BoardStateMachine {
    /// Create an idle machine for a grid of `card_count` cards.
    pub fn new(card_count: usize) -> Self {
        Self {
            card_count,
            board: Board::new(card_count),
            phase: BoardPhase::Idle,
            epoch: 0,
            pending: [None, None],
            input_locked: false,
            matched_pairs: 0,
            pairs_in_play: 0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> BoardPhase {
        self.phase
    }

    /// Identifier of the current deal, bumped by every [`Self::begin_deal`].
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Pairs matched in the current deal.
    pub fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    /// `CARD_COUNT / 2`.
    pub fn total_pairs(&self) -> usize {
        self.card_count / 2
    }

    /// Number of grid positions.
    pub fn card_count(&self) -> usize {
        self.card_count
    }

    /// Read-only view of the grid.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Whether clicks are currently ignored while a mismatch is shown.
    pub fn is_input_locked(&self) -> bool {
        self.input_locked
    }

    /// Pending selections in pick order.
    pub fn pending(&self) -> Vec<usize> {
        self.pending.iter().flatten().copied().collect()
    }

    /// Start a fresh deal from any phase, discarding the current grid and counters.
    pub fn begin_deal(&mut self) -> DealTicket {
        self.epoch += 1;
        self.board = Board::new(self.card_count);
        self.phase = BoardPhase::Loading;
        self.pending = [None, None];
        self.input_locked = false;
        self.matched_pairs = 0;
        self.pairs_in_play = 0;
        DealTicket { epoch: self.epoch }
    }

    /// Bind a shuffled deck to the grid for the deal identified by `ticket`.
    ///
    /// Returns the number of pairs in play. An empty deck moves the board to
    /// [`BoardPhase::DealFailed`].
    pub fn seed(&mut self, ticket: DealTicket, deck: Vec<Creature>) -> Result<usize, SeedError> {
        if ticket.epoch != self.epoch {
            return Err(SeedError::StaleDeal {
                current: self.epoch,
                got: ticket.epoch,
            });
        }
        if self.phase != BoardPhase::Loading {
            return Err(SeedError::NotLoading(self.phase));
        }
        if deck.is_empty() {
            self.phase = BoardPhase::DealFailed;
            return Err(SeedError::EmptyDeck);
        }

        let bound = self.board.seed(deck);
        self.pairs_in_play = (bound / 2).min(self.total_pairs());
        self.phase = BoardPhase::Ready;
        Ok(self.pairs_in_play)
    }

    /// Handle a click on `index`.
    pub fn activate(&mut self, index: usize) -> Activation {
        if self.input_locked {
            return Activation::Ignored(IgnoredReason::InputLocked);
        }
        if !matches!(
            self.phase,
            BoardPhase::Ready | BoardPhase::AwaitingSecondPick
        ) {
            return Activation::Ignored(IgnoredReason::NotPlayable(self.phase));
        }

        let Some(slot) = self.board.slot(index) else {
            return Activation::Ignored(IgnoredReason::OutOfRange);
        };
        if !slot.is_bound() {
            return Activation::Ignored(IgnoredReason::Unbound);
        }
        match slot.visibility() {
            Visibility::Revealed => return Activation::Ignored(IgnoredReason::AlreadyRevealed),
            Visibility::Matched => return Activation::Ignored(IgnoredReason::AlreadyMatched),
            Visibility::Hidden => {}
        }

        self.board.set_visibility(index, Visibility::Revealed);
        match self.pending[0] {
            None => {
                self.pending = [Some(index), None];
                self.phase = BoardPhase::AwaitingSecondPick;
                Activation::FirstPick { slot: index }
            }
            Some(first) => {
                self.pending[1] = Some(index);
                self.compare(first, index)
            }
        }
    }

    fn compare(&mut self, first: usize, second: usize) -> Activation {
        let slots = [first, second];
        let id_of = |index: usize| {
            self.board
                .slot(index)
                .and_then(|slot| slot.creature())
                .map(|creature| creature.id)
        };

        match (id_of(first), id_of(second)) {
            (Some(a), Some(b)) if a == b => {
                self.board.set_visibility(first, Visibility::Matched);
                self.board.set_visibility(second, Visibility::Matched);
                self.pending = [None, None];
                self.matched_pairs += 1;

                let completion = if self.matched_pairs >= self.pairs_in_play {
                    self.phase = BoardPhase::ResolvingMatch;
                    Some(CompletionTicket { epoch: self.epoch })
                } else {
                    self.phase = BoardPhase::Ready;
                    None
                };

                Activation::Matched {
                    slots,
                    matched_pairs: self.matched_pairs,
                    completion,
                }
            }
            (Some(_), Some(_)) => {
                self.input_locked = true;
                self.phase = BoardPhase::ResolvingMismatch;
                Activation::Mismatched {
                    slots,
                    ticket: MismatchTicket {
                        epoch: self.epoch,
                        slots,
                    },
                }
            }
            (a, b) => {
                warn!(
                    first,
                    second,
                    first_bound = a.is_some(),
                    second_bound = b.is_some(),
                    "pending selection lost its creature; treating as no match"
                );
                self.board.set_visibility(first, Visibility::Hidden);
                self.board.set_visibility(second, Visibility::Hidden);
                self.pending = [None, None];
                self.input_locked = false;
                self.phase = BoardPhase::Ready;
                Activation::Discarded { slots }
            }
        }
    }

    /// Flip a mismatched pair back and release the input lock.
    ///
    /// Returns the hidden slots, or `None` when the ticket no longer applies.
    pub fn resolve_mismatch(&mut self, ticket: MismatchTicket) -> Option<[usize; 2]> {
        let [first, second] = ticket.slots;
        let current = ticket.epoch == self.epoch
            && self.phase == BoardPhase::ResolvingMismatch
            && self.pending == [Some(first), Some(second)];
        if !current {
            return None;
        }

        self.board.set_visibility(first, Visibility::Hidden);
        self.board.set_visibility(second, Visibility::Hidden);
        self.pending = [None, None];
        self.input_locked = false;
        self.phase = BoardPhase::Ready;
        Some(ticket.slots)
    }

    /// Enter [`BoardPhase::Complete`]; returns `false` for stale tickets.
    pub fn complete(&mut self, ticket: CompletionTicket) -> bool {
        if ticket.epoch != self.epoch || self.phase != BoardPhase::ResolvingMatch {
            return false;
        }
        self.phase = BoardPhase::Complete;
        true
    }

    /// Capture the current state; creatures are only exposed on face-up cards.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            epoch: self.epoch,
            matched_pairs: self.matched_pairs,
            total_pairs: self.total_pairs(),
            pairs_in_play: self.pairs_in_play,
            input_locked: self.input_locked,
            pending: self.pending(),
            slots: self
                .board
                .slots()
                .iter()
                .map(|slot| SlotSnapshot {
                    index: slot.index(),
                    visibility: slot.visibility(),
                    bound: slot.is_bound(),
                    creature: match slot.visibility() {
                        Visibility::Hidden => None,
                        _ => slot.creature().cloned(),
                    },
                })
                .collect(),
        }
    }
}
