//! Study content and the service that generates it.
//!
//! Everything a study mode displays comes from a [`ContentProvider`]. The rest
//! of the crate treats a provider as a black box that may be slow or fail;
//! failures are surfaced as [`ContentError`] and never retried here.

#[cfg(feature = "network")]
pub mod gemini;
pub mod model;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;
pub use model::{DetailSheet, Flashcard, QuizQuestion, Side};

/// Opaque upstream failure. Every variant is all-or-nothing for its call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("no API key configured (set GEMINI_API_KEY or api_key in config.toml)")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("service returned no content")]
    EmptyResponse,
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("content generation is not available in this build")]
    Unavailable,
    #[error("fetch task failed: {0}")]
    TaskFailed(String),
}

#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn flashcard(&self, identifier: &str) -> Result<Flashcard, ContentError>;

    async fn quiz_question(&self, identifier: &str) -> Result<QuizQuestion, ContentError>;

    /// Free-text lookup; the query need not be a catalog identifier.
    async fn detail_sheet(&self, query: &str) -> Result<DetailSheet, ContentError>;
}

/// Stand-in used when the crate is built without the `network` feature.
pub struct UnavailableProvider;

#[async_trait]
impl ContentProvider for UnavailableProvider {
    async fn flashcard(&self, _identifier: &str) -> Result<Flashcard, ContentError> {
        Err(ContentError::Unavailable)
    }

    async fn quiz_question(&self, _identifier: &str) -> Result<QuizQuestion, ContentError> {
        Err(ContentError::Unavailable)
    }

    async fn detail_sheet(&self, _query: &str) -> Result<DetailSheet, ContentError> {
        Err(ContentError::Unavailable)
    }
}

#[cfg(feature = "network")]
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn ContentProvider>> {
    Ok(Arc::new(gemini::GeminiProvider::from_config(config)?))
}

#[cfg(not(feature = "network"))]
pub fn provider_from_config(_config: &Config) -> anyhow::Result<Arc<dyn ContentProvider>> {
    Ok(Arc::new(UnavailableProvider))
}
