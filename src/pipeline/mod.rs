//! One-slot look-ahead over a study session.
//!
//! A [`PrefetchPipeline`] shows one item at a time and keeps the fetch for the
//! following item running in the background, so "next" usually resolves from
//! an already-finished request. At most two fetches are outstanding per
//! pipeline: the one being awaited for display and the look-ahead.
//!
//! Results are only applied when their [`Generation`] still matches the
//! session's and the pipeline has not been retired; anything else is dropped.

pub mod fetcher;
pub mod slot;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::content::ContentError;
use crate::session::{Draw, Generation, SharedSession};
pub use fetcher::{Fetcher, FlashcardFetcher, QuizFetcher};
pub use slot::Lookahead;

/// An item on screen and where it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Shown<T> {
    pub identifier: String,
    pub generation: Generation,
    pub content: T,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PipelineState<T> {
    /// Nothing displayed yet.
    Loading,
    Displaying(Shown<T>),
    /// The last fetch failed; `advance` retries with a fresh identifier.
    Error(ContentError),
    /// Deck exhausted. Only a session reset followed by `start` leaves this.
    Finished,
}

impl<T> PipelineState<T> {
    pub fn shown(&self) -> Option<&Shown<T>> {
        match self {
            PipelineState::Displaying(shown) => Some(shown),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, PipelineState::Finished)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PipelineState::Loading => "loading",
            PipelineState::Displaying(_) => "displaying",
            PipelineState::Error(_) => "error",
            PipelineState::Finished => "finished",
        }
    }
}

/// Teardown flag shared between a pipeline and whoever owns its screen.
#[derive(Clone, Debug, Default)]
pub struct RetireHandle(Arc<AtomicBool>);

impl RetireHandle {
    pub fn retire(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_retired(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub struct PrefetchPipeline<F: Fetcher> {
    session: SharedSession,
    fetcher: Arc<F>,
    state: PipelineState<F::Item>,
    lookahead: Option<Lookahead<F::Item>>,
    retired: RetireHandle,
}

impl<F: Fetcher> PrefetchPipeline<F> {
    pub fn new(session: SharedSession, fetcher: Arc<F>) -> Self {
        Self {
            session,
            fetcher,
            state: PipelineState::Loading,
            lookahead: None,
            retired: RetireHandle::default(),
        }
    }

    pub fn state(&self) -> &PipelineState<F::Item> {
        &self.state
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn has_lookahead(&self) -> bool {
        self.lookahead.is_some()
    }

    pub fn lookahead_identifier(&self) -> Option<&str> {
        self.lookahead.as_ref().map(Lookahead::identifier)
    }

    pub fn retire_handle(&self) -> RetireHandle {
        self.retired.clone()
    }

    pub fn is_retired(&self) -> bool {
        self.retired.is_retired()
    }

    /// Stops applying results. A pending look-ahead is detached, not cancelled.
    pub fn retire(&mut self) {
        self.retired.retire();
        self.lookahead = None;
    }

    /// Shows the first item of the current deck, starting the look-ahead
    /// before waiting on it.
    pub async fn start(&mut self) -> &PipelineState<F::Item> {
        if self.is_retired() {
            return &self.state;
        }
        self.lookahead = None;
        self.state = PipelineState::Loading;
        self.show_next().await;
        &self.state
    }

    /// Moves to the next item. Also the retry path out of `Error`.
    pub async fn advance(&mut self) -> &PipelineState<F::Item> {
        if self.is_retired() || self.state.is_finished() {
            return &self.state;
        }

        match self.lookahead.take() {
            Some(slot) if self.is_current(slot.generation()) => {
                let (draw, result) = slot.resolve().await;
                let succeeded = result.is_ok();
                if self.settle(draw, result) && succeeded {
                    self.schedule_lookahead();
                }
            }
            superseded => {
                if let Some(slot) = superseded {
                    tracing::debug!(
                        identifier = slot.identifier(),
                        generation = slot.generation().value(),
                        "dropping superseded lookahead"
                    );
                }
                self.show_next().await;
            }
        }
        &self.state
    }

    async fn show_next(&mut self) {
        let Some(current) = self.session.take_next() else {
            tracing::info!("deck exhausted");
            self.state = PipelineState::Finished;
            return;
        };
        self.schedule_lookahead();
        tracing::debug!(identifier = %current.identifier, "fetching for display");
        let result = self.fetcher.fetch(&current.identifier).await;
        self.settle(current, result);
    }

    fn schedule_lookahead(&mut self) {
        self.lookahead = self
            .session
            .take_next()
            .map(|draw| Lookahead::spawn(&self.fetcher, draw));
    }

    fn is_current(&self, generation: Generation) -> bool {
        !self.is_retired() && self.session.generation() == generation
    }

    /// Applies a fetch result. Returns false if it was stale and dropped.
    fn settle(&mut self, draw: Draw, result: Result<F::Item, ContentError>) -> bool {
        if !self.is_current(draw.generation) {
            tracing::debug!(
                identifier = %draw.identifier,
                generation = draw.generation.value(),
                "discarding stale result"
            );
            return false;
        }
        self.state = match result {
            Ok(content) => PipelineState::Displaying(Shown {
                identifier: draw.identifier,
                generation: draw.generation,
                content,
            }),
            Err(err) => {
                tracing::warn!(identifier = %draw.identifier, error = %err, "fetch failed");
                PipelineState::Error(err)
            }
        };
        true
    }
}
