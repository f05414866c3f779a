use crate::error::AppResult;

pub mod gemini;

pub use gemini::GeminiClient;

/// Text-generation capability used to rank recommendations
///
/// Implementations send a single prompt to a generative backend and return its
/// textual reply. The recommender only depends on this trait, so tests can
/// substitute a deterministic model without touching global state.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ModelClient: Send + Sync {
    /// Generate a reply for the prompt
    async fn generate(&self, prompt: &str) -> AppResult<String>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
