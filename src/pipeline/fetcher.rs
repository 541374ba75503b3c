use std::sync::Arc;

use async_trait::async_trait;

use crate::content::{ContentError, ContentProvider, Flashcard, QuizQuestion};

/// The one capability a [`PrefetchPipeline`](super::PrefetchPipeline) needs:
/// turn an identifier into a displayable item.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    type Item: Send + 'static;

    async fn fetch(&self, identifier: &str) -> Result<Self::Item, ContentError>;
}

pub struct FlashcardFetcher {
    provider: Arc<dyn ContentProvider>,
}

impl FlashcardFetcher {
    pub fn new(provider: Arc<dyn ContentProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Fetcher for FlashcardFetcher {
    type Item = Flashcard;

    async fn fetch(&self, identifier: &str) -> Result<Flashcard, ContentError> {
        self.provider.flashcard(identifier).await
    }
}

pub struct QuizFetcher {
    provider: Arc<dyn ContentProvider>,
}

impl QuizFetcher {
    pub fn new(provider: Arc<dyn ContentProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Fetcher for QuizFetcher {
    type Item = QuizQuestion;

    async fn fetch(&self, identifier: &str) -> Result<QuizQuestion, ContentError> {
        self.provider.quiz_question(identifier).await
    }
}
