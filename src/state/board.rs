use serde::Serialize;
use utoipa::ToSchema;

use crate::state::creature::Creature;

/// Visibility of a single card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Face down.
    Hidden,
    /// Face up, not yet part of a matched pair.
    Revealed,
    /// Face up for good.
    Matched,
}

/// One grid position, optionally bound to a creature.
#[derive(Debug, Clone)]
pub struct Slot {
    index: usize,
    creature: Option<Creature>,
    visibility: Visibility,
}

impl Slot {
    fn new(index: usize) -> Self {
        Self {
            index,
            creature: None,
            visibility: Visibility::Hidden,
        }
    }

    /// Fixed grid position.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Creature bound during seeding, if any.
    pub fn creature(&self) -> Option<&Creature> {
        self.creature.as_ref()
    }

    /// Current visibility.
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Unbound slots can never be picked.
    pub fn is_bound(&self) -> bool {
        self.creature.is_some()
    }
}

/// Fixed-size grid of card slots.
#[derive(Debug, Clone)]
pub struct Board {
    slots: Vec<Slot>,
}

impl Board {
    /// Create `card_count` empty, hidden slots.
    pub fn new(card_count: usize) -> Self {
        Self {
            slots: (0..card_count).map(Slot::new).collect(),
        }
    }

    /// Number of positions on the grid.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the grid has no positions at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All slots in grid order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Slot at `index`, if it is on the grid.
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Unbind every slot and hide it again.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.creature = None;
            slot.visibility = Visibility::Hidden;
        }
    }

    /// Bind cards to slots by index, returning how many slots received one.
    ///
    /// Extra cards beyond the grid size are ignored; surplus slots stay unbound.
    pub fn seed(&mut self, deck: Vec<Creature>) -> usize {
        self.clear();
        let mut bound = 0;
        for (slot, creature) in self.slots.iter_mut().zip(deck) {
            slot.creature = Some(creature);
            bound += 1;
        }
        bound
    }

    pub(crate) fn set_visibility(&mut self, index: usize, visibility: Visibility) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.visibility = visibility;
        }
    }
}
