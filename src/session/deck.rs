use rand::Rng;

use crate::catalog::Catalog;

/// The shuffled working order of identifiers for one session.
///
/// Identifiers are consumed from the end; a deck is never refilled, only
/// replaced by a freshly shuffled one.
#[derive(Clone, Debug, Default)]
pub struct Deck {
    cards: Vec<String>,
}

impl Deck {
    pub fn shuffled<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> Self {
        let mut cards = catalog.entries().to_vec();
        // Fisher-Yates, last index down to 1.
        for i in (1..cards.len()).rev() {
            let j = rng.gen_range(0..=i);
            cards.swap(i, j);
        }
        Self { cards }
    }

    pub fn pop(&mut self) -> Option<String> {
        self.cards.pop()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[String] {
        &self.cards
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    #[test]
    fn shuffled_deck_is_permutation() {
        let catalog = Catalog::bundled();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..20 {
            let deck = Deck::shuffled(&catalog, &mut rng);
            assert_eq!(deck.len(), catalog.len());
            assert_eq!(
                sorted(deck.cards().to_vec()),
                sorted(catalog.entries().to_vec())
            );
        }
    }

    #[test]
    fn shuffle_changes_order_for_large_catalogs() {
        let catalog = Catalog::bundled();
        let mut rng = SmallRng::seed_from_u64(42);
        let deck = Deck::shuffled(&catalog, &mut rng);
        assert_ne!(deck.cards(), catalog.entries());
    }

    #[test]
    fn every_position_is_reachable() {
        // With 3 items and many shuffles, each item should land on top at least once.
        let catalog = Catalog::new(["a", "b", "c"]);
        let mut rng = SmallRng::seed_from_u64(1);
        let mut tops = std::collections::HashSet::new();
        for _ in 0..200 {
            let mut deck = Deck::shuffled(&catalog, &mut rng);
            tops.insert(deck.pop().unwrap());
        }
        assert_eq!(tops.len(), 3);
    }

    #[test]
    fn pop_drains_then_stays_empty() {
        let catalog = Catalog::new(["x", "y"]);
        let mut rng = SmallRng::seed_from_u64(3);
        let mut deck = Deck::shuffled(&catalog, &mut rng);
        assert!(deck.pop().is_some());
        assert!(deck.pop().is_some());
        assert!(deck.is_empty());
        assert_eq!(deck.pop(), None);
        assert_eq!(deck.pop(), None);
    }

    #[test]
    fn empty_catalog_gives_empty_deck() {
        let catalog = Catalog::new(Vec::<String>::new());
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(Deck::shuffled(&catalog, &mut rng).is_empty());
    }
}
