use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{format_system_time, phase::VisibleBoardPhase, validation::validate_card_count},
    services::controller::DealOutcome,
    state::{
        board::Visibility,
        creature::Creature,
        state_machine::{Activation, IgnoredReason, SlotSnapshot, Snapshot},
    },
};

/// Payload used to open a new game session.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    /// Overrides the configured number of cards (even, 2..=40).
    #[serde(default)]
    pub card_count: Option<usize>,
}

impl Validate for CreateSessionRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(card_count) = self.card_count {
            if let Err(e) = validate_card_count(card_count) {
                errors.add("card_count", e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Summary returned once a session has been created.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionSummary {
    pub id: Uuid,
    pub card_count: usize,
    pub total_pairs: usize,
    pub created_at: String,
}

impl SessionSummary {
    pub fn new(id: Uuid, card_count: usize, created_at: SystemTime) -> Self {
        Self {
            id,
            card_count,
            total_pairs: card_count / 2,
            created_at: format_system_time(created_at),
        }
    }
}

/// Card as seen by a client; the creature is only present while face up.
#[derive(Debug, Serialize, ToSchema)]
pub struct SlotView {
    pub index: usize,
    pub visibility: Visibility,
    pub bound: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creature: Option<Creature>,
}

impl From<SlotSnapshot> for SlotView {
    fn from(value: SlotSnapshot) -> Self {
        Self {
            index: value.index,
            visibility: value.visibility,
            bound: value.bound,
            creature: value.creature,
        }
    }
}

/// Full board state for clients that (re)connect mid-game.
#[derive(Debug, Serialize, ToSchema)]
pub struct BoardResponse {
    pub session_id: Uuid,
    pub phase: VisibleBoardPhase,
    pub epoch: u64,
    pub matched_pairs: usize,
    pub total_pairs: usize,
    pub pairs_in_play: usize,
    pub input_locked: bool,
    pub pending: Vec<usize>,
    pub slots: Vec<SlotView>,
}

impl From<(Uuid, Snapshot)> for BoardResponse {
    fn from((session_id, snapshot): (Uuid, Snapshot)) -> Self {
        Self {
            session_id,
            phase: snapshot.phase.into(),
            epoch: snapshot.epoch,
            matched_pairs: snapshot.matched_pairs,
            total_pairs: snapshot.total_pairs,
            pairs_in_play: snapshot.pairs_in_play,
            input_locked: snapshot.input_locked,
            pending: snapshot.pending,
            slots: snapshot.slots.into_iter().map(Into::into).collect(),
        }
    }
}

/// Classifies the result of a slot activation.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivationKind {
    Ignored,
    FirstPick,
    Matched,
    Mismatched,
    Discarded,
}

/// Response to a slot activation.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActivationResponse {
    pub outcome: ActivationKind,
    /// Slots affected by the activation.
    pub slots: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_pairs: Option<usize>,
    /// Present when the activation was ignored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

fn ignored_reason(reason: IgnoredReason) -> &'static str {
    match reason {
        IgnoredReason::NotPlayable(_) => "not_playable",
        IgnoredReason::InputLocked => "input_locked",
        IgnoredReason::OutOfRange => "out_of_range",
        IgnoredReason::Unbound => "unbound",
        IgnoredReason::AlreadyRevealed => "already_revealed",
        IgnoredReason::AlreadyMatched => "already_matched",
    }
}

impl From<Activation> for ActivationResponse {
    fn from(value: Activation) -> Self {
        match value {
            Activation::Ignored(reason) => Self {
                outcome: ActivationKind::Ignored,
                slots: Vec::new(),
                matched_pairs: None,
                reason: Some(ignored_reason(reason).to_string()),
            },
            Activation::FirstPick { slot } => Self {
                outcome: ActivationKind::FirstPick,
                slots: vec![slot],
                matched_pairs: None,
                reason: None,
            },
            Activation::Matched {
                slots,
                matched_pairs,
                ..
            } => Self {
                outcome: ActivationKind::Matched,
                slots: slots.to_vec(),
                matched_pairs: Some(matched_pairs),
                reason: None,
            },
            Activation::Mismatched { slots, .. } => Self {
                outcome: ActivationKind::Mismatched,
                slots: slots.to_vec(),
                matched_pairs: None,
                reason: None,
            },
            Activation::Discarded { slots } => Self {
                outcome: ActivationKind::Discarded,
                slots: slots.to_vec(),
                matched_pairs: None,
                reason: None,
            },
        }
    }
}

/// Result of a deal that was awaited to completion.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DealStatus {
    Seeded { pairs_in_play: usize },
    Failed,
    Superseded,
}

impl From<DealOutcome> for DealStatus {
    fn from(value: DealOutcome) -> Self {
        match value {
            DealOutcome::Seeded { pairs_in_play } => DealStatus::Seeded { pairs_in_play },
            DealOutcome::Failed => DealStatus::Failed,
            DealOutcome::Superseded => DealStatus::Superseded,
        }
    }
}
