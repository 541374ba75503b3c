use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::catalog::Catalog;
use crate::session::deck::Deck;

/// Monotonic tag bumped on every reset. Fetches carry the generation they were
/// drawn under so results from a previous deck can be recognised and dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

/// One identifier handed out by the session, tagged with the deck generation
/// it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Draw {
    pub identifier: String,
    pub generation: Generation,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    pub taken: usize,
    pub total: usize,
}

impl Progress {
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.taken as f64 / self.total as f64
    }

    pub fn is_complete(&self) -> bool {
        self.taken >= self.total
    }
}

pub struct SessionController {
    catalog: Arc<Catalog>,
    deck: Deck,
    generation: Generation,
    rng: SmallRng,
}

impl SessionController {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_rng(catalog, SmallRng::from_entropy())
    }

    pub fn with_rng(catalog: Arc<Catalog>, mut rng: SmallRng) -> Self {
        let deck = Deck::shuffled(&catalog, &mut rng);
        Self {
            catalog,
            deck,
            generation: Generation::default(),
            rng,
        }
    }

    /// Reshuffles the full catalog and starts a new generation.
    pub fn reset(&mut self) {
        self.deck = Deck::shuffled(&self.catalog, &mut self.rng);
        self.generation = self.generation.next();
        tracing::info!(
            generation = self.generation.value(),
            size = self.deck.len(),
            "session reset"
        );
    }

    /// Removes one identifier from the deck. `None` once the deck is exhausted.
    pub fn take_next(&mut self) -> Option<Draw> {
        let identifier = self.deck.pop()?;
        Some(Draw {
            identifier,
            generation: self.generation,
        })
    }

    pub fn progress(&self) -> Progress {
        let total = self.catalog.len();
        Progress {
            taken: total - self.deck.len(),
            total,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn remaining(&self) -> usize {
        self.deck.len()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

/// Cloneable handle to the one session both study modes draw from.
///
/// Every operation takes the lock for its whole duration and never suspends,
/// so a take and its progress update are observed together.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<SessionController>>,
}

impl SharedSession {
    pub fn new(controller: SessionController) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionController> {
        // The deck stays consistent even if a holder panicked.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    pub fn take_next(&self) -> Option<Draw> {
        self.lock().take_next()
    }

    pub fn progress(&self) -> Progress {
        self.lock().progress()
    }

    pub fn generation(&self) -> Generation {
        self.lock().generation()
    }

    pub fn remaining(&self) -> usize {
        self.lock().remaining()
    }
}
