use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::content::ContentError;
use crate::pipeline::Fetcher;
use crate::session::{Draw, Generation};

/// A background fetch for the item after the one on screen.
///
/// The fetch runs as its own task from the moment it is scheduled. Dropping a
/// `Lookahead` detaches that task instead of cancelling it; whoever resolves a
/// slot must compare [`generation`](Self::generation) against the session
/// before using the result.
pub struct Lookahead<T> {
    draw: Draw,
    handle: JoinHandle<Result<T, ContentError>>,
}

impl<T: Send + 'static> Lookahead<T> {
    pub fn spawn<F>(fetcher: &Arc<F>, draw: Draw) -> Self
    where
        F: Fetcher<Item = T>,
    {
        let fetcher = Arc::clone(fetcher);
        let identifier = draw.identifier.clone();
        tracing::debug!(
            identifier = %identifier,
            generation = draw.generation.value(),
            "lookahead scheduled"
        );
        let handle = tokio::spawn(async move { fetcher.fetch(&identifier).await });
        Self { draw, handle }
    }

    pub fn generation(&self) -> Generation {
        self.draw.generation
    }

    pub fn identifier(&self) -> &str {
        &self.draw.identifier
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the fetch. A panicked task surfaces as a fetch failure.
    pub async fn resolve(self) -> (Draw, Result<T, ContentError>) {
        let result = match self.handle.await {
            Ok(result) => result,
            Err(join_err) => Err(ContentError::TaskFailed(join_err.to_string())),
        };
        (self.draw, result)
    }
}
