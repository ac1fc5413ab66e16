use serde::Serialize;
use utoipa::ToSchema;

use crate::state::state_machine::BoardPhase;

/// Publicly visible board phase exposed to clients (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleBoardPhase {
    /// No deal has been requested yet.
    Idle,
    /// Creatures are being fetched.
    Loading,
    /// Waiting for a first pick.
    Ready,
    /// One card is face up.
    AwaitingSecondPick,
    /// The last pair was found; completion is about to be announced.
    ResolvingMatch,
    /// Two different cards are face up; input is locked.
    ResolvingMismatch,
    /// Every pair has been found.
    Complete,
    /// No creature could be fetched; a replay is required.
    DealFailed,
}

impl From<BoardPhase> for VisibleBoardPhase {
    fn from(value: BoardPhase) -> Self {
        match value {
            BoardPhase::Idle => VisibleBoardPhase::Idle,
            BoardPhase::Loading => VisibleBoardPhase::Loading,
            BoardPhase::Ready => VisibleBoardPhase::Ready,
            BoardPhase::AwaitingSecondPick => VisibleBoardPhase::AwaitingSecondPick,
            BoardPhase::ResolvingMatch => VisibleBoardPhase::ResolvingMatch,
            BoardPhase::ResolvingMismatch => VisibleBoardPhase::ResolvingMismatch,
            BoardPhase::Complete => VisibleBoardPhase::Complete,
            BoardPhase::DealFailed => VisibleBoardPhase::DealFailed,
        }
    }
}
