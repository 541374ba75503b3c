//! End-to-end behaviour of the session and the look-ahead pipeline, driven
//! through the public API with in-process fetchers.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pharmtutor::catalog::Catalog;
use pharmtutor::content::ContentError;
use pharmtutor::pipeline::{Fetcher, PipelineState, PrefetchPipeline};
use pharmtutor::session::{SessionController, SharedSession};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tokio::sync::Semaphore;

const DRUGS: [&str; 8] = [
    "Atorvastatin",
    "Levothyroxine",
    "Lisinopril",
    "Metformin",
    "Amlodipine",
    "Metoprolol",
    "Omeprazole",
    "Simvastatin",
];

fn session(names: &[&str], seed: u64) -> SharedSession {
    SharedSession::new(SessionController::with_rng(
        Arc::new(Catalog::new(names.iter().copied())),
        SmallRng::seed_from_u64(seed),
    ))
}

/// Answers every identifier with `"<identifier>#<call number>"`. Call numbers
/// start at 1 and follow the order fetches begin. Optionally fails one call,
/// and optionally waits on a gate before answering.
#[derive(Default)]
struct Stub {
    calls: AtomicUsize,
    fail_on_call: Option<usize>,
    gate: Option<Arc<Semaphore>>,
    fetched: Mutex<Vec<String>>,
}

impl Stub {
    fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for Stub {
    type Item = String;

    async fn fetch(&self, identifier: &str) -> Result<String, ContentError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.fetched.lock().unwrap().push(identifier.to_string());
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.fail_on_call == Some(call) {
            return Err(ContentError::Status {
                status: 500,
                body: "upstream exploded".to_string(),
            });
        }
        Ok(format!("{identifier}#{call}"))
    }
}

fn shown_identifier(state: &PipelineState<String>) -> String {
    state
        .shown()
        .map(|shown| shown.identifier.clone())
        .unwrap_or_else(|| panic!("expected a displayed item, got {}", state.label()))
}

#[test]
fn every_reset_deals_a_permutation_of_the_catalog() {
    let session = session(&DRUGS, 1);
    let expected: HashSet<&str> = DRUGS.iter().copied().collect();

    for round in 0..5 {
        assert_eq!(session.progress().taken, 0, "round {round}");
        let mut dealt = Vec::new();
        while let Some(draw) = session.take_next() {
            assert_eq!(draw.generation, session.generation());
            dealt.push(draw.identifier);
            assert_eq!(session.progress().taken, dealt.len());
        }
        assert_eq!(dealt.len(), DRUGS.len());
        let unique: HashSet<&str> = dealt.iter().map(String::as_str).collect();
        assert_eq!(unique, expected);
        assert!(session.take_next().is_none());

        session.reset();
    }
}

#[tokio::test]
async fn always_succeeding_fetcher_walks_the_whole_deck() {
    let session = session(&DRUGS, 2);
    let stub = Arc::new(Stub::default());
    let mut pipeline = PrefetchPipeline::new(session.clone(), stub.clone());

    let mut seen = vec![shown_identifier(pipeline.start().await)];
    loop {
        let state = pipeline.advance().await;
        if state.is_finished() {
            break;
        }
        seen.push(shown_identifier(state));
    }

    assert_eq!(seen.len(), DRUGS.len());
    assert_eq!(seen.iter().collect::<HashSet<_>>().len(), DRUGS.len());
    assert!(stub.calls() <= DRUGS.len() + 1);
    assert_eq!(stub.calls(), DRUGS.len());
    assert!(pipeline.advance().await.is_finished());
    assert_eq!(stub.calls(), DRUGS.len());
}

#[tokio::test]
async fn single_failure_surfaces_once_and_advance_recovers() {
    let session = session(&DRUGS, 3);
    let stub = Arc::new(Stub::failing_on(3));
    let mut pipeline = PrefetchPipeline::new(session.clone(), stub.clone());

    let mut states = vec![pipeline.start().await.clone()];
    while !states.last().is_some_and(PipelineState::is_finished) {
        states.push(pipeline.advance().await.clone());
    }

    let errors: Vec<usize> = states
        .iter()
        .enumerate()
        .filter(|(_, state)| matches!(state, PipelineState::Error(_)))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(errors.len(), 1);
    let after_error = &states[errors[0] + 1];
    assert!(after_error.shown().is_some());

    match &states[errors[0]] {
        PipelineState::Error(ContentError::Status { status, .. }) => assert_eq!(*status, 500),
        other => panic!("unexpected state {other:?}"),
    }

    // The failed identifier is spent, so one fewer item is displayed.
    let displayed = states.iter().filter(|s| s.shown().is_some()).count();
    assert_eq!(displayed, DRUGS.len() - 1);
}

#[tokio::test]
async fn reset_while_lookahead_pending_never_shows_its_content() {
    let session = session(&DRUGS, 4);
    let gate = Arc::new(Semaphore::new(0));
    let stub = Arc::new(Stub::gated(gate.clone()));
    let mut pipeline = PrefetchPipeline::new(session.clone(), stub.clone());

    // Enough for the item to display; the look-ahead stays blocked.
    gate.add_permits(1);
    let first = pipeline.start().await.shown().cloned().unwrap();
    let stale_identifier = pipeline.lookahead_identifier().unwrap().to_string();
    let old_generation = session.generation();

    session.reset();
    let new_generation = session.generation();
    assert_ne!(old_generation, new_generation);

    // Let the stale look-ahead finish before anyone asks for it.
    gate.add_permits(100);
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    let shown = pipeline.advance().await.shown().cloned().unwrap();
    assert_eq!(shown.generation, new_generation);
    // Call #2 was the look-ahead drawn before the reset.
    assert_ne!(shown.content, format!("{stale_identifier}#2"));
    assert_ne!(shown.content, first.content);
    assert!(pipeline.has_lookahead());
    assert_eq!(session.progress().taken, 2);
}

#[tokio::test]
async fn reset_during_advance_drops_the_result_it_was_waiting_for() {
    let session = session(&DRUGS, 5);
    let gate = Arc::new(Semaphore::new(0));
    let stub = Arc::new(Stub::gated(gate.clone()));
    let mut pipeline = PrefetchPipeline::new(session.clone(), stub.clone());

    gate.add_permits(1);
    let first = pipeline.start().await.clone();

    let resetter = session.clone();
    let opener = gate.clone();
    let (after_advance, ()) = tokio::join!(
        async { pipeline.advance().await.clone() },
        async move {
            tokio::task::yield_now().await;
            resetter.reset();
            opener.add_permits(100);
        }
    );

    // The resolved look-ahead was from the old deck: nothing changes.
    assert_eq!(after_advance, first);
    assert!(!pipeline.has_lookahead());

    let shown = pipeline.advance().await.shown().cloned().unwrap();
    assert_eq!(shown.generation, session.generation());
}

#[tokio::test]
async fn two_item_catalog() {
    let session = session(&["X", "Y"], 6);
    let stub = Arc::new(Stub::default());
    let mut pipeline = PrefetchPipeline::new(session.clone(), stub.clone());

    let first = shown_identifier(pipeline.start().await);
    assert!(pipeline.has_lookahead());
    let second = shown_identifier(pipeline.advance().await);
    assert_ne!(first, second);
    assert_eq!(
        [first.as_str(), second.as_str()].into_iter().collect::<HashSet<_>>(),
        ["X", "Y"].into_iter().collect::<HashSet<_>>()
    );
    assert!(!pipeline.has_lookahead());

    assert!(pipeline.advance().await.is_finished());
    assert_eq!(stub.calls(), 2);
}

#[tokio::test]
async fn two_pipelines_share_one_deck_without_repeats() {
    let session = session(&DRUGS, 7);
    let cards = Arc::new(Stub::default());
    let quiz = Arc::new(Stub::default());
    let mut flashcards = PrefetchPipeline::new(session.clone(), cards.clone());
    let mut questions = PrefetchPipeline::new(session.clone(), quiz.clone());

    flashcards.start().await;
    questions.start().await;
    while !flashcards.advance().await.is_finished() {}
    while !questions.advance().await.is_finished() {}

    let mut all = cards.fetched.lock().unwrap().clone();
    all.extend(quiz.fetched.lock().unwrap().iter().cloned());
    assert_eq!(all.len(), DRUGS.len());
    assert_eq!(all.iter().collect::<HashSet<_>>().len(), DRUGS.len());
}
