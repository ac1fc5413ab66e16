use rand::{Rng, seq::SliceRandom};

use crate::state::creature::Creature;

/// Duplicate every creature into a pair and return a uniformly shuffled deck.
///
/// The input is left untouched; each card is an independent clone.
pub fn build_shuffled_pairs<R>(creatures: &[Creature], rng: &mut R) -> Vec<Creature>
where
    R: Rng + ?Sized,
{
    let mut deck: Vec<Creature> = creatures
        .iter()
        .flat_map(|creature| [creature.clone(), creature.clone()])
        .collect();
    // Fisher–Yates: from the last index down to 1, swap with a uniform pick in `0..=i`.
    deck.shuffle(rng);
    deck
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::catalog::testing::creature;

    fn counts(deck: &[Creature]) -> HashMap<u32, usize> {
        let mut map = HashMap::new();
        for card in deck {
            *map.entry(card.id).or_default() += 1;
        }
        map
    }

    #[test]
    fn every_creature_appears_exactly_twice() {
        let mut rng = StdRng::seed_from_u64(3);
        for n in 1..=6u32 {
            let creatures: Vec<Creature> = (1..=n).map(creature).collect();
            let deck = build_shuffled_pairs(&creatures, &mut rng);
            assert_eq!(deck.len(), 2 * n as usize);
            let counts = counts(&deck);
            assert_eq!(counts.len(), n as usize);
            assert!(counts.values().all(|count| *count == 2));
        }
    }

    #[test]
    fn input_is_not_mutated() {
        let creatures: Vec<Creature> = (1..=4).map(creature).collect();
        let before = creatures.clone();
        let _ = build_shuffled_pairs(&creatures, &mut StdRng::seed_from_u64(1));
        assert_eq!(creatures, before);
    }

    #[test]
    fn empty_input_yields_empty_deck() {
        let deck = build_shuffled_pairs(&[], &mut StdRng::seed_from_u64(1));
        assert!(deck.is_empty());
    }

    #[test]
    fn same_seed_reproduces_the_same_order() {
        let creatures: Vec<Creature> = (1..=6).map(creature).collect();
        let first = build_shuffled_pairs(&creatures, &mut StdRng::seed_from_u64(42));
        let second = build_shuffled_pairs(&creatures, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn positions_are_occupied_uniformly() {
        const LEN: usize = 6;
        const TRIALS: usize = 60_000;
        let mut rng = StdRng::seed_from_u64(2024);
        let mut occupancy = [[0usize; LEN]; LEN / 2];

        let creatures: Vec<Creature> = (1..=(LEN / 2) as u32).map(creature).collect();
        for _ in 0..TRIALS {
            let deck = build_shuffled_pairs(&creatures, &mut rng);
            for (position, card) in deck.iter().enumerate() {
                occupancy[card.id as usize - 1][position] += 1;
            }
        }

        // each creature owns two cards, so it lands on a given position twice as often
        let expected = 2.0 * TRIALS as f64 / LEN as f64;
        for row in occupancy {
            for count in row {
                let deviation = (count as f64 - expected).abs() / expected;
                assert!(deviation < 0.05, "occupancy {count} deviates from {expected}");
            }
        }
    }
}
